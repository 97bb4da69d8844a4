//! Service configuration from environment variables

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Where uploaded images and QR codes are stored
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    /// Filesystem under `UPLOAD_DIR`, served at `/uploads`
    Local,
    S3,
}

/// How outgoing email is delivered
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmailBackend {
    /// Log only
    Log,
    Ses,
}

#[derive(Debug, Clone)]
pub struct Config {
    /// SQLite URL, e.g. `sqlite:menu.db`
    pub database_url: String,
    pub http_port: u16,
    /// Environment: development | staging | production
    pub environment: String,
    /// JWT secret for tenant authentication
    pub jwt_secret: String,
    /// Menus are served at `{subdomain}.{base_domain}`
    pub base_domain: String,
    pub storage_backend: StorageBackend,
    pub s3_bucket: String,
    /// Root directory of the local storage backend
    pub upload_dir: String,
    /// Public URL prefix of stored objects
    pub public_asset_base_url: String,
    pub email_backend: EmailBackend,
    /// SES sender email address
    pub ses_from_email: String,
    pub stripe_secret_key: String,
    /// Stripe Price ID for the Basic plan
    pub stripe_basic_price_id: String,
    /// Stripe Price ID for the Pro plan
    pub stripe_pro_price_id: String,
    /// Redirect after a successful checkout (`session_id` is appended)
    pub checkout_success_url: String,
    /// Redirect after a cancelled checkout
    pub checkout_cancel_url: String,
    pub log_level: String,
    pub log_json: bool,
    /// Daily-rolling log files when set; stdout otherwise
    pub log_dir: Option<String>,
}

fn env_or(name: &str, default: &str) -> String {
    std::env::var(name)
        .ok()
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| default.to_string())
}

fn env_bool(name: &str) -> bool {
    std::env::var(name)
        .map(|v| matches!(v.to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on"))
        .unwrap_or(false)
}

impl Config {
    /// Require a secret env var: must be set and non-empty in non-development environments.
    fn require_secret(name: &str, environment: &str) -> Result<String, BoxError> {
        let val = match std::env::var(name) {
            Ok(v) => v,
            Err(_) => {
                if environment != "development" {
                    return Err(format!("{name} must be set in {environment} environment").into());
                }
                format!("dev-{name}-not-for-production")
            }
        };
        if val.is_empty() && environment != "development" {
            return Err(format!("{name} must not be empty in {environment} environment").into());
        }
        Ok(val)
    }

    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }

    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, BoxError> {
        let environment = env_or("ENVIRONMENT", "development");
        let http_port: u16 = match std::env::var("HTTP_PORT") {
            Ok(p) => p
                .parse()
                .map_err(|_| format!("HTTP_PORT is not a valid port: {p}"))?,
            Err(_) => 8080,
        };

        let storage_backend = match env_or("STORAGE_BACKEND", "local").as_str() {
            "local" => StorageBackend::Local,
            "s3" => StorageBackend::S3,
            other => return Err(format!("Unknown STORAGE_BACKEND: {other}").into()),
        };
        let default_email = if environment == "development" { "log" } else { "ses" };
        let email_backend = match env_or("EMAIL_BACKEND", default_email).as_str() {
            "log" => EmailBackend::Log,
            "ses" => EmailBackend::Ses,
            other => return Err(format!("Unknown EMAIL_BACKEND: {other}").into()),
        };

        Ok(Self {
            database_url: env_or("DATABASE_URL", "sqlite:menu.db"),
            http_port,
            jwt_secret: Self::require_secret("JWT_SECRET", &environment)?,
            base_domain: env_or("BASE_DOMAIN", "menu.localhost"),
            storage_backend,
            s3_bucket: env_or("S3_BUCKET", "menu-cloud-assets"),
            upload_dir: env_or("UPLOAD_DIR", "uploads"),
            public_asset_base_url: env_or(
                "PUBLIC_ASSET_BASE_URL",
                &format!("http://localhost:{http_port}/uploads"),
            ),
            email_backend,
            ses_from_email: env_or("SES_FROM_EMAIL", "noreply@menu.localhost"),
            stripe_secret_key: Self::require_secret("STRIPE_SECRET_KEY", &environment)?,
            stripe_basic_price_id: env_or("STRIPE_PRICE_BASIC", "price_basic_dev"),
            stripe_pro_price_id: env_or("STRIPE_PRICE_PRO", "price_pro_dev"),
            checkout_success_url: env_or(
                "CHECKOUT_SUCCESS_URL",
                "http://localhost:3000/signup/success",
            ),
            checkout_cancel_url: env_or(
                "CHECKOUT_CANCEL_URL",
                "http://localhost:3000/signup/cancel",
            ),
            log_level: env_or("LOG_LEVEL", "info"),
            log_json: env_bool("LOG_JSON"),
            log_dir: std::env::var("LOG_DIR").ok().filter(|d| !d.is_empty()),
            environment,
        })
    }
}
