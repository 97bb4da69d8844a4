//! Auth account storage backing the local auth provider

use super::{RepoError, RepoResult};
use shared::error::ErrorCode;
use sqlx::SqlitePool;

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct AuthAccountRow {
    pub id: String,
    pub email: String,
    pub password_hash: String,
    pub created_at: i64,
}

/// Insert an account; an email already in use is `RepoError::Duplicate`
pub async fn create(
    pool: &SqlitePool,
    id: &str,
    email: &str,
    password_hash: &str,
) -> RepoResult<AuthAccountRow> {
    let row = sqlx::query_as::<_, AuthAccountRow>(
        "INSERT INTO auth_account (id, email, password_hash, created_at) VALUES (?, ?, ?, ?) \
         RETURNING id, email, password_hash, created_at",
    )
    .bind(id)
    .bind(email)
    .bind(password_hash)
    .bind(shared::util::now_millis())
    .fetch_one(pool)
    .await?;
    Ok(row)
}

pub async fn find_by_email(pool: &SqlitePool, email: &str) -> RepoResult<Option<AuthAccountRow>> {
    let row = sqlx::query_as::<_, AuthAccountRow>(
        "SELECT id, email, password_hash, created_at FROM auth_account WHERE email = ?",
    )
    .bind(email)
    .fetch_optional(pool)
    .await?;
    Ok(row)
}

pub async fn list(pool: &SqlitePool) -> RepoResult<Vec<AuthAccountRow>> {
    let rows = sqlx::query_as::<_, AuthAccountRow>(
        "SELECT id, email, password_hash, created_at FROM auth_account ORDER BY created_at, id",
    )
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

pub async fn delete(pool: &SqlitePool, id: &str) -> RepoResult<()> {
    let rows = sqlx::query("DELETE FROM auth_account WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    if rows.rows_affected() == 0 {
        return Err(RepoError::not_found(
            ErrorCode::NotFound,
            format!("Account {id} not found"),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repository::test_support::pool;

    #[tokio::test]
    async fn email_is_unique() {
        let pool = pool().await;
        create(&pool, "a1", "owner@luna.test", "hash").await.unwrap();
        let err = create(&pool, "a2", "owner@luna.test", "hash").await.unwrap_err();
        assert!(matches!(err, RepoError::Duplicate(_)));
    }

    #[tokio::test]
    async fn delete_removes_account() {
        let pool = pool().await;
        create(&pool, "a1", "owner@luna.test", "hash").await.unwrap();
        delete(&pool, "a1").await.unwrap();
        assert!(find_by_email(&pool, "owner@luna.test").await.unwrap().is_none());
        assert!(matches!(
            delete(&pool, "a1").await,
            Err(RepoError::NotFound { .. })
        ));
    }
}
