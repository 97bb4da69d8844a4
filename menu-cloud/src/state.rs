//! Application state for menu-cloud

use std::path::PathBuf;
use std::sync::Arc;

use aws_sdk_s3::Client as S3Client;
use aws_sdk_sesv2::Client as SesClient;
use sqlx::SqlitePool;

use crate::config::{Config, EmailBackend, StorageBackend};
use crate::db::DbService;
use crate::provisioning::Provisioner;
use crate::services::{
    AuthProvider, EmailSender, LocalAuthProvider, LocalStorage, LogEmailSender, ObjectStorage,
    PaymentProvider, QrGenerator, S3Storage, SesEmailSender, StripePayments, StripePrices,
    SvgQrGenerator,
};

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// SQLite connection pool
    pub pool: SqlitePool,
    /// JWT secret for tenant authentication
    pub jwt_secret: String,
    /// Menus are served at `{subdomain}.{base_domain}`
    pub base_domain: String,
    /// Served at `/uploads` when objects are stored on the local filesystem
    pub local_upload_dir: Option<PathBuf>,
    pub auth: Arc<dyn AuthProvider>,
    pub storage: Arc<dyn ObjectStorage>,
    pub qr: Arc<dyn QrGenerator>,
    pub email: Arc<dyn EmailSender>,
    pub payments: Arc<dyn PaymentProvider>,
}

impl AppState {
    /// Create a new AppState
    pub async fn new(config: &Config) -> Result<Self, BoxError> {
        let pool = DbService::new(&config.database_url).await?.pool;

        let needs_aws = config.storage_backend == StorageBackend::S3
            || config.email_backend == EmailBackend::Ses;
        let aws_config = if needs_aws {
            Some(aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await)
        } else {
            None
        };

        let (storage, local_upload_dir): (Arc<dyn ObjectStorage>, Option<PathBuf>) =
            match (&aws_config, config.storage_backend) {
                (Some(aws), StorageBackend::S3) => {
                    tracing::info!(bucket = %config.s3_bucket, "Object storage: S3");
                    (
                        Arc::new(S3Storage::new(
                            S3Client::new(aws),
                            config.s3_bucket.clone(),
                            config.public_asset_base_url.clone(),
                        )),
                        None,
                    )
                }
                _ => {
                    tracing::info!(dir = %config.upload_dir, "Object storage: local filesystem");
                    tokio::fs::create_dir_all(&config.upload_dir).await?;
                    (
                        Arc::new(LocalStorage::new(
                            &config.upload_dir,
                            config.public_asset_base_url.clone(),
                        )),
                        Some(PathBuf::from(&config.upload_dir)),
                    )
                }
            };

        let email: Arc<dyn EmailSender> = match (&aws_config, config.email_backend) {
            (Some(aws), EmailBackend::Ses) => Arc::new(SesEmailSender::new(
                SesClient::new(aws),
                config.ses_from_email.clone(),
            )),
            _ => Arc::new(LogEmailSender),
        };

        let payments = Arc::new(StripePayments::new(
            config.stripe_secret_key.clone(),
            StripePrices {
                basic: config.stripe_basic_price_id.clone(),
                pro: config.stripe_pro_price_id.clone(),
            },
            config.checkout_success_url.clone(),
            config.checkout_cancel_url.clone(),
        ));

        Ok(Self {
            auth: Arc::new(LocalAuthProvider::new(pool.clone())),
            pool,
            jwt_secret: config.jwt_secret.clone(),
            base_domain: config.base_domain.clone(),
            local_upload_dir,
            storage,
            qr: Arc::new(SvgQrGenerator::default()),
            email,
            payments,
        })
    }

    pub fn provisioner(&self) -> Provisioner {
        Provisioner::new(
            self.pool.clone(),
            self.auth.clone(),
            self.storage.clone(),
            self.qr.clone(),
            self.email.clone(),
            self.base_domain.clone(),
        )
    }
}
