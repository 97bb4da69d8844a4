//! Restaurant provisioning: signup + payment → usable tenant
//!
//! Steps run in a fixed order. Everything up to the tenant insert is
//! mandatory and compensated on failure; the steps after it are
//! best-effort and only produce warnings.

use std::fmt;
use std::sync::Arc;

use serde::Serialize;
use shared::error::{AppError, ErrorCode};
use shared::models::{
    SubscriptionStatus, Tenant, TenantPlan, normalize_subdomain, validate_subdomain,
};
use sqlx::SqlitePool;
use thiserror::Error;

use super::saga::Saga;
use crate::db::repository::tenant::NewTenant;
use crate::db::repository::{RepoError, category, settings, tenant, tenant_user};
use crate::services::email::welcome_email;
use crate::services::{
    AuthProvider, AuthProviderError, EmailSender, ObjectStorage, QrGenerator, QrImage,
};
use crate::util::{MIN_PASSWORD_LEN, is_valid_email, normalize_email};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ProvisionStep {
    ValidateInput,
    CheckUserExists,
    CheckSubdomainAvailable,
    CreateOrReuseAuthAccount,
    CreateTenantRecord,
    CreateAdminUserRecord,
    CreateSettingsRecord,
    CreateDefaultCategories,
    GenerateQrCode,
    SendWelcomeEmail,
    Done,
}

impl ProvisionStep {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ValidateInput => "validate_input",
            Self::CheckUserExists => "check_user_exists",
            Self::CheckSubdomainAvailable => "check_subdomain_available",
            Self::CreateOrReuseAuthAccount => "create_or_reuse_auth_account",
            Self::CreateTenantRecord => "create_tenant_record",
            Self::CreateAdminUserRecord => "create_admin_user_record",
            Self::CreateSettingsRecord => "create_settings_record",
            Self::CreateDefaultCategories => "create_default_categories",
            Self::GenerateQrCode => "generate_qr_code",
            Self::SendWelcomeEmail => "send_welcome_email",
            Self::Done => "done",
        }
    }
}

impl fmt::Display for ProvisionStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone)]
pub struct ProvisionRequest {
    pub email: String,
    pub password: String,
    pub restaurant_name: String,
    pub subdomain: String,
    pub plan: TenantPlan,
    pub status: SubscriptionStatus,
}

/// Best-effort step that did not complete
#[derive(Debug, Clone, Serialize)]
pub struct ProvisionWarning {
    pub step: ProvisionStep,
    pub message: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProvisionOutcome {
    pub tenant: Tenant,
    pub account_id: String,
    /// An existing account without a tenant was reused
    pub resumed: bool,
    pub warnings: Vec<ProvisionWarning>,
}

#[derive(Debug, Error)]
#[error("provisioning failed at {step}: {error}")]
pub struct ProvisioningError {
    pub step: ProvisionStep,
    pub error: AppError,
    /// Compensators ran (successfully or not)
    pub compensated: bool,
    pub compensation_failures: Vec<String>,
}

impl ProvisioningError {
    fn at(step: ProvisionStep, error: AppError) -> Self {
        Self {
            step,
            error,
            compensated: false,
            compensation_failures: Vec::new(),
        }
    }
}

impl From<ProvisioningError> for AppError {
    fn from(err: ProvisioningError) -> Self {
        let mut app = err.error.with_detail("step", err.step.as_str());
        if err.compensated {
            app = app.with_detail("compensated", true);
        }
        if !err.compensation_failures.is_empty() {
            tracing::error!(
                step = %err.step,
                failures = ?err.compensation_failures,
                "Provisioning left partial state behind"
            );
            app = AppError::new(ErrorCode::ProvisioningFailed)
                .with_detail("step", err.step.as_str());
        }
        app
    }
}

fn backend(step: ProvisionStep, message: impl fmt::Display) -> ProvisioningError {
    tracing::error!(step = %step, error = %message, "Provisioning backend failure");
    ProvisioningError::at(step, AppError::new(ErrorCode::ProvisioningFailed))
}

pub struct Provisioner {
    pool: SqlitePool,
    auth: Arc<dyn AuthProvider>,
    storage: Arc<dyn ObjectStorage>,
    qr: Arc<dyn QrGenerator>,
    email: Arc<dyn EmailSender>,
    base_domain: String,
}

impl Provisioner {
    pub fn new(
        pool: SqlitePool,
        auth: Arc<dyn AuthProvider>,
        storage: Arc<dyn ObjectStorage>,
        qr: Arc<dyn QrGenerator>,
        email: Arc<dyn EmailSender>,
        base_domain: String,
    ) -> Self {
        Self {
            pool,
            auth,
            storage,
            qr,
            email,
            base_domain,
        }
    }

    pub fn menu_url(&self, subdomain: &str) -> String {
        format!("https://{subdomain}.{}", self.base_domain)
    }

    pub async fn provision(
        &self,
        req: ProvisionRequest,
    ) -> Result<ProvisionOutcome, ProvisioningError> {
        let req = validate(req)?;
        let mut saga: Saga<ProvisionStep> = Saga::new();

        // ── CheckUserExists ──
        let existing = self
            .auth
            .find_by_email(&req.email)
            .await
            .map_err(|e| backend(ProvisionStep::CheckUserExists, e))?;
        if let Some(account) = &existing {
            let linked = tenant_user::find_by_account(&self.pool, &account.id)
                .await
                .map_err(|e| backend(ProvisionStep::CheckUserExists, e))?;
            if linked.is_some() {
                return Err(ProvisioningError::at(
                    ProvisionStep::CheckUserExists,
                    AppError::new(ErrorCode::EmailTaken),
                ));
            }
            tracing::info!(account_id = %account.id, "Resuming incomplete signup");
        }
        saga.record(ProvisionStep::CheckUserExists);

        // ── CheckSubdomainAvailable ──
        self.ensure_subdomain_free(&req.subdomain, ProvisionStep::CheckSubdomainAvailable)
            .await?;
        saga.record(ProvisionStep::CheckSubdomainAvailable);

        // ── CreateOrReuseAuthAccount ──
        let resumed = existing.is_some();
        let account = match existing {
            Some(account) => {
                let verified = self
                    .auth
                    .verify_credentials(&req.email, &req.password)
                    .await
                    .map_err(|e| backend(ProvisionStep::CreateOrReuseAuthAccount, e))?;
                if verified.is_none_or(|v| v.id != account.id) {
                    return Err(ProvisioningError::at(
                        ProvisionStep::CreateOrReuseAuthAccount,
                        AppError::invalid_credentials(),
                    ));
                }
                saga.record(ProvisionStep::CreateOrReuseAuthAccount);
                account
            }
            None => {
                let account = self
                    .auth
                    .create_account(&req.email, &req.password)
                    .await
                    .map_err(|e| match e {
                        AuthProviderError::EmailTaken => ProvisioningError::at(
                            ProvisionStep::CreateOrReuseAuthAccount,
                            AppError::new(ErrorCode::EmailTaken),
                        ),
                        other => backend(ProvisionStep::CreateOrReuseAuthAccount, other),
                    })?;
                let auth = self.auth.clone();
                let account_id = account.id.clone();
                saga.record_with_compensator(ProvisionStep::CreateOrReuseAuthAccount, move || {
                    async move {
                        auth.delete_account(&account_id)
                            .await
                            .map_err(|e| Box::new(e) as Box<dyn std::error::Error + Send + Sync>)
                    }
                });
                account
            }
        };

        // ── CreateTenantRecord ──
        let mut tenant = match self.create_tenant(&req).await {
            Ok(tenant) => tenant,
            Err(mut err) => {
                let report = saga.compensate().await;
                err.compensated = !report.compensated.is_empty() || !report.is_clean();
                if resumed {
                    tracing::error!(
                        account_id = %account.id,
                        step = %err.step,
                        error = %err.error,
                        "Tenant creation failed for a resumed account; manual intervention needed"
                    );
                }
                err.compensation_failures = report
                    .failures
                    .into_iter()
                    .map(|(step, msg)| format!("{step}: {msg}"))
                    .collect();
                return Err(err);
            }
        };
        saga.record(ProvisionStep::CreateTenantRecord);
        tracing::info!(
            tenant_id = %tenant.id,
            subdomain = %tenant.subdomain,
            resumed,
            "Tenant created"
        );

        // ── Best-effort steps ──
        let mut warnings = Vec::new();

        if let Err(e) = tenant_user::create(
            &self.pool,
            &tenant.id,
            &account.id,
            &req.email,
            tenant_user::ROLE_OWNER,
        )
        .await
        {
            warn(&mut warnings, ProvisionStep::CreateAdminUserRecord, e);
        }
        saga.record(ProvisionStep::CreateAdminUserRecord);

        if let Err(e) = settings::create_default(&self.pool, &tenant.id).await {
            warn(&mut warnings, ProvisionStep::CreateSettingsRecord, e);
        }
        saga.record(ProvisionStep::CreateSettingsRecord);

        if let Err(e) = category::create_defaults(&self.pool, &tenant.id).await {
            warn(&mut warnings, ProvisionStep::CreateDefaultCategories, e);
        }
        saga.record(ProvisionStep::CreateDefaultCategories);

        let menu_url = self.menu_url(&tenant.subdomain);
        let qr = match self.publish_qr(&tenant.id, &menu_url).await {
            Ok((qr, url)) => {
                tenant.qr_code_url = Some(url);
                Some(qr)
            }
            Err(e) => {
                warn(&mut warnings, ProvisionStep::GenerateQrCode, e);
                None
            }
        };
        saga.record(ProvisionStep::GenerateQrCode);

        let message = welcome_email(&req.email, &tenant.name, &menu_url, qr.as_ref());
        if let Err(e) = self.email.send(&message).await {
            warn(&mut warnings, ProvisionStep::SendWelcomeEmail, e);
        }
        saga.record(ProvisionStep::SendWelcomeEmail);

        saga.record(ProvisionStep::Done);
        tracing::info!(
            tenant_id = %tenant.id,
            warnings = warnings.len(),
            steps = saga.completed().len(),
            "Provisioning complete"
        );

        Ok(ProvisionOutcome {
            tenant,
            account_id: account.id,
            resumed,
            warnings,
        })
    }

    async fn ensure_subdomain_free(
        &self,
        subdomain: &str,
        step: ProvisionStep,
    ) -> Result<(), ProvisioningError> {
        let taken = tenant::subdomain_taken(&self.pool, subdomain)
            .await
            .map_err(|e| backend(step, e))?;
        if taken {
            return Err(ProvisioningError::at(
                step,
                AppError::new(ErrorCode::SubdomainTaken),
            ));
        }
        Ok(())
    }

    async fn create_tenant(&self, req: &ProvisionRequest) -> Result<Tenant, ProvisioningError> {
        let step = ProvisionStep::CreateTenantRecord;
        self.ensure_subdomain_free(&req.subdomain, step).await?;
        tenant::create(
            &self.pool,
            NewTenant {
                id: uuid::Uuid::new_v4().to_string(),
                subdomain: req.subdomain.clone(),
                name: req.restaurant_name.clone(),
                email: req.email.clone(),
                plan: req.plan,
                status: req.status,
            },
        )
        .await
        .map_err(|e| match e {
            RepoError::Duplicate(_) => {
                ProvisioningError::at(step, AppError::new(ErrorCode::SubdomainTaken))
            }
            other => backend(step, other),
        })
    }

    /// Render the menu QR, upload it and store its URL on the tenant
    async fn publish_qr(
        &self,
        tenant_id: &str,
        menu_url: &str,
    ) -> Result<(QrImage, String), Box<dyn std::error::Error + Send + Sync>> {
        let qr = self.qr.generate(menu_url)?;
        let url = self
            .storage
            .upload(
                qr.bytes.clone(),
                qr.content_type,
                &format!("{tenant_id}/qr"),
                "menu.svg",
            )
            .await?;
        tenant::set_qr_code_url(&self.pool, tenant_id, &url).await?;
        Ok((qr, url))
    }
}

fn warn(warnings: &mut Vec<ProvisionWarning>, step: ProvisionStep, error: impl fmt::Display) {
    tracing::warn!(step = %step, error = %error, "Provisioning step skipped");
    warnings.push(ProvisionWarning {
        step,
        message: error.to_string(),
    });
}

/// Normalise and check the request before touching any state
fn validate(mut req: ProvisionRequest) -> Result<ProvisionRequest, ProvisioningError> {
    let fail = |code: ErrorCode, message: String| {
        ProvisioningError::at(
            ProvisionStep::ValidateInput,
            AppError::with_message(code, message),
        )
    };

    req.email = normalize_email(&req.email);
    if !is_valid_email(&req.email) {
        return Err(fail(
            ErrorCode::ValidationFailed,
            "A valid email is required".into(),
        ));
    }
    if req.password.chars().count() < MIN_PASSWORD_LEN {
        return Err(fail(
            ErrorCode::PasswordTooShort,
            ErrorCode::PasswordTooShort.message().into(),
        ));
    }
    req.subdomain = normalize_subdomain(&req.subdomain);
    if let Err(e) = validate_subdomain(&req.subdomain) {
        return Err(fail(ErrorCode::SubdomainInvalid, e.to_string()));
    }
    req.restaurant_name = req.restaurant_name.trim().to_string();
    if req.restaurant_name.is_empty() {
        return Err(fail(
            ErrorCode::ValidationFailed,
            "Restaurant name is required".into(),
        ));
    }
    Ok(req)
}
