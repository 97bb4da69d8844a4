//! Subscription checkout via the Stripe REST API (no SDK dependency)

use async_trait::async_trait;
use shared::models::TenantPlan;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

const STRIPE_API: &str = "https://api.stripe.com/v1";

/// Checkout session as seen after the customer returns from payment
#[derive(Debug, Clone, PartialEq)]
pub struct CheckoutSession {
    pub id: String,
    pub paid: bool,
    pub customer_email: Option<String>,
    pub plan: Option<TenantPlan>,
    pub subdomain: Option<String>,
}

#[async_trait]
pub trait PaymentProvider: Send + Sync {
    /// Start a subscription checkout and return the hosted payment page URL
    async fn create_checkout_session(
        &self,
        email: &str,
        plan: TenantPlan,
        subdomain: &str,
    ) -> Result<String, BoxError>;

    async fn retrieve_session(&self, session_id: &str) -> Result<CheckoutSession, BoxError>;
}

/// Stripe price ids per plan
#[derive(Debug, Clone)]
pub struct StripePrices {
    pub basic: String,
    pub pro: String,
}

pub struct StripePayments {
    http: reqwest::Client,
    secret_key: String,
    prices: StripePrices,
    success_url: String,
    cancel_url: String,
}

impl StripePayments {
    pub fn new(
        secret_key: String,
        prices: StripePrices,
        success_url: String,
        cancel_url: String,
    ) -> Self {
        Self {
            http: reqwest::Client::new(),
            secret_key,
            prices,
            success_url,
            cancel_url,
        }
    }

    fn price_for(&self, plan: TenantPlan) -> Result<&str, BoxError> {
        match plan {
            TenantPlan::Basic => Ok(&self.prices.basic),
            TenantPlan::Pro => Ok(&self.prices.pro),
            TenantPlan::Enterprise => Err("Enterprise plan is not sold through checkout".into()),
        }
    }
}

/// Stripe substitutes `{CHECKOUT_SESSION_ID}` when redirecting back
fn success_url_with_session(success_url: &str) -> String {
    let sep = if success_url.contains('?') { '&' } else { '?' };
    format!("{success_url}{sep}session_id={{CHECKOUT_SESSION_ID}}")
}

fn parse_session(resp: &serde_json::Value) -> Result<CheckoutSession, BoxError> {
    let id = resp["id"]
        .as_str()
        .ok_or_else(|| format!("Stripe retrieve_session failed: {resp}"))?;
    let customer_email = resp["customer_details"]["email"]
        .as_str()
        .or_else(|| resp["customer_email"].as_str())
        .map(String::from);
    Ok(CheckoutSession {
        id: id.to_string(),
        paid: resp["payment_status"].as_str() == Some("paid"),
        customer_email,
        plan: resp["metadata"]["plan"].as_str().and_then(TenantPlan::parse),
        subdomain: resp["metadata"]["subdomain"].as_str().map(String::from),
    })
}

#[async_trait]
impl PaymentProvider for StripePayments {
    async fn create_checkout_session(
        &self,
        email: &str,
        plan: TenantPlan,
        subdomain: &str,
    ) -> Result<String, BoxError> {
        let price_id = self.price_for(plan)?;
        let success_url = success_url_with_session(&self.success_url);
        let resp: serde_json::Value = self
            .http
            .post(format!("{STRIPE_API}/checkout/sessions"))
            .basic_auth(&self.secret_key, None::<&str>)
            .form(&[
                ("mode", "subscription"),
                ("customer_email", email),
                ("line_items[0][price]", price_id),
                ("line_items[0][quantity]", "1"),
                ("success_url", success_url.as_str()),
                ("cancel_url", self.cancel_url.as_str()),
                ("allow_promotion_codes", "true"),
                ("metadata[plan]", plan.as_str()),
                ("metadata[subdomain]", subdomain),
            ])
            .send()
            .await?
            .json()
            .await?;

        resp["url"]
            .as_str()
            .map(String::from)
            .ok_or_else(|| format!("Stripe create_checkout failed: {resp}").into())
    }

    async fn retrieve_session(&self, session_id: &str) -> Result<CheckoutSession, BoxError> {
        let well_formed = session_id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_');
        if session_id.is_empty() || !well_formed {
            return Err(format!("Invalid checkout session id: {session_id}").into());
        }
        let resp: serde_json::Value = self
            .http
            .get(format!("{STRIPE_API}/checkout/sessions/{session_id}"))
            .basic_auth(&self.secret_key, None::<&str>)
            .send()
            .await?
            .json()
            .await?;
        parse_session(&resp)
    }
}
