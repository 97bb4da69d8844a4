//! Owner account authentication

use async_trait::async_trait;
use shared::error::{AppError, ErrorCode};
use sqlx::SqlitePool;
use thiserror::Error;

use crate::db::repository::{RepoError, account};
use crate::util::{hash_password, normalize_email, verify_password};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthAccount {
    pub id: String,
    pub email: String,
    pub created_at: i64,
}

#[derive(Debug, Error)]
pub enum AuthProviderError {
    #[error("email already registered")]
    EmailTaken,
    #[error("account not found")]
    NotFound,
    #[error("auth backend error: {0}")]
    Backend(String),
}

impl From<RepoError> for AuthProviderError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::Duplicate(_) => Self::EmailTaken,
            RepoError::NotFound { .. } => Self::NotFound,
            other => Self::Backend(other.to_string()),
        }
    }
}

impl From<AuthProviderError> for AppError {
    fn from(err: AuthProviderError) -> Self {
        match err {
            AuthProviderError::EmailTaken => AppError::new(ErrorCode::EmailTaken),
            AuthProviderError::NotFound => AppError::not_found("Account"),
            AuthProviderError::Backend(msg) => {
                tracing::error!(error = %msg, "Auth backend error");
                AppError::new(ErrorCode::InternalError)
            }
        }
    }
}

#[async_trait]
pub trait AuthProvider: Send + Sync {
    async fn create_account(&self, email: &str, password: &str)
    -> Result<AuthAccount, AuthProviderError>;

    async fn delete_account(&self, account_id: &str) -> Result<(), AuthProviderError>;

    async fn find_by_email(&self, email: &str) -> Result<Option<AuthAccount>, AuthProviderError>;

    async fn list_accounts(&self) -> Result<Vec<AuthAccount>, AuthProviderError>;

    /// `Ok(None)` for an unknown email or a wrong password
    async fn verify_credentials(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Option<AuthAccount>, AuthProviderError>;
}

/// Accounts stored in the service database with argon2 hashes
pub struct LocalAuthProvider {
    pool: SqlitePool,
}

impl LocalAuthProvider {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

fn to_account(row: account::AuthAccountRow) -> AuthAccount {
    AuthAccount {
        id: row.id,
        email: row.email,
        created_at: row.created_at,
    }
}

#[async_trait]
impl AuthProvider for LocalAuthProvider {
    async fn create_account(
        &self,
        email: &str,
        password: &str,
    ) -> Result<AuthAccount, AuthProviderError> {
        let email = normalize_email(email);
        let hash = hash_password(password)
            .map_err(|e| AuthProviderError::Backend(format!("Password hashing failed: {e}")))?;
        let id = uuid::Uuid::new_v4().to_string();
        let row = account::create(&self.pool, &id, &email, &hash).await?;
        tracing::info!(account_id = %row.id, "Auth account created");
        Ok(to_account(row))
    }

    async fn delete_account(&self, account_id: &str) -> Result<(), AuthProviderError> {
        account::delete(&self.pool, account_id).await?;
        tracing::info!(account_id = %account_id, "Auth account deleted");
        Ok(())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<AuthAccount>, AuthProviderError> {
        let row = account::find_by_email(&self.pool, &normalize_email(email)).await?;
        Ok(row.map(to_account))
    }

    async fn list_accounts(&self) -> Result<Vec<AuthAccount>, AuthProviderError> {
        let rows = account::list(&self.pool).await?;
        Ok(rows.into_iter().map(to_account).collect())
    }

    async fn verify_credentials(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Option<AuthAccount>, AuthProviderError> {
        let Some(row) = account::find_by_email(&self.pool, &normalize_email(email)).await? else {
            return Ok(None);
        };
        if !verify_password(password, &row.password_hash) {
            return Ok(None);
        }
        Ok(Some(to_account(row)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repository::test_support::pool;

    #[tokio::test]
    async fn create_verify_delete() {
        let auth = LocalAuthProvider::new(pool().await);

        let account = auth
            .create_account(" Owner@Luna.test ", "supersecret")
            .await
            .unwrap();
        assert_eq!(account.email, "owner@luna.test");

        assert!(matches!(
            auth.create_account("owner@luna.test", "another-pass").await,
            Err(AuthProviderError::EmailTaken)
        ));

        let verified = auth
            .verify_credentials("OWNER@luna.test", "supersecret")
            .await
            .unwrap();
        assert_eq!(verified.map(|a| a.id), Some(account.id.clone()));
        assert!(
            auth.verify_credentials("owner@luna.test", "wrong-password")
                .await
                .unwrap()
                .is_none()
        );

        assert_eq!(auth.list_accounts().await.unwrap().len(), 1);
        auth.delete_account(&account.id).await.unwrap();
        assert!(auth.find_by_email("owner@luna.test").await.unwrap().is_none());
        assert!(matches!(
            auth.delete_account(&account.id).await,
            Err(AuthProviderError::NotFound)
        ));
    }
}
