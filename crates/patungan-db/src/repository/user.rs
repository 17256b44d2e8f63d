//! # User Repository
//!
//! Database operations for accounts.
//!
//! Stores the argon2 password hash alongside the profile; the plaintext
//! password never reaches this crate. The public [`patungan_core::User`]
//! type is derived from a record via [`UserRecord::user`] so hashes cannot
//! leak into API responses by accident.

use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use tracing::debug;
use uuid::Uuid;

use crate::error::DbResult;
use patungan_core::User;

/// A stored account row.
#[derive(Debug, Clone)]
pub struct UserRecord {
    pub id: String,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl UserRecord {
    /// The public view of this account (no credential material).
    pub fn user(&self) -> User {
        User {
            id: self.id.clone(),
            name: self.name.clone(),
            email: self.email.clone(),
        }
    }
}

/// Repository for user database operations.
#[derive(Debug, Clone)]
pub struct UserRepository {
    pool: SqlitePool,
}

impl UserRepository {
    /// Creates a new UserRepository.
    pub fn new(pool: SqlitePool) -> Self {
        UserRepository { pool }
    }

    /// Creates an account.
    ///
    /// Email uniqueness is enforced by the schema (case-insensitive);
    /// a duplicate surfaces as [`crate::DbError::UniqueViolation`].
    pub async fn create(
        &self,
        name: &str,
        email: &str,
        password_hash: &str,
    ) -> DbResult<UserRecord> {
        let record = UserRecord {
            id: Uuid::new_v4().to_string(),
            name: name.to_string(),
            email: email.to_string(),
            password_hash: password_hash.to_string(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        debug!(id = %record.id, email = %record.email, "Creating user");

        sqlx::query(
            r#"
            INSERT INTO users (id, name, email, password_hash, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
        )
        .bind(&record.id)
        .bind(&record.name)
        .bind(&record.email)
        .bind(&record.password_hash)
        .bind(record.created_at)
        .bind(record.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(record)
    }

    /// Finds an account by email (case-insensitive).
    pub async fn find_by_email(&self, email: &str) -> DbResult<Option<UserRecord>> {
        let row = sqlx::query(
            r#"
            SELECT id, name, email, password_hash, created_at, updated_at
            FROM users
            WHERE email = ?1 COLLATE NOCASE
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(row_to_record).transpose()?)
    }

    /// Finds an account by id.
    pub async fn find_by_id(&self, id: &str) -> DbResult<Option<UserRecord>> {
        let row = sqlx::query(
            r#"
            SELECT id, name, email, password_hash, created_at, updated_at
            FROM users
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(row_to_record).transpose()?)
    }
}

fn row_to_record(row: SqliteRow) -> Result<UserRecord, sqlx::Error> {
    Ok(UserRecord {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        email: row.try_get("email")?,
        password_hash: row.try_get("password_hash")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DbError;
    use crate::pool::{Database, DbConfig};

    async fn test_db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    #[tokio::test]
    async fn test_create_and_find() {
        let db = test_db().await;

        let created = db
            .users()
            .create("Adi", "adi@example.com", "argon2-hash")
            .await
            .unwrap();

        let by_email = db
            .users()
            .find_by_email("adi@example.com")
            .await
            .unwrap()
            .expect("user should exist");
        assert_eq!(by_email.id, created.id);

        let by_id = db
            .users()
            .find_by_id(&created.id)
            .await
            .unwrap()
            .expect("user should exist");
        assert_eq!(by_id.email, "adi@example.com");
    }

    #[tokio::test]
    async fn test_email_lookup_is_case_insensitive() {
        let db = test_db().await;
        db.users()
            .create("Adi", "Adi@Example.com", "argon2-hash")
            .await
            .unwrap();

        assert!(db
            .users()
            .find_by_email("adi@example.com")
            .await
            .unwrap()
            .is_some());
    }

    #[tokio::test]
    async fn test_duplicate_email_rejected() {
        let db = test_db().await;
        db.users()
            .create("Adi", "adi@example.com", "hash-1")
            .await
            .unwrap();

        let err = db
            .users()
            .create("Imposter", "adi@example.com", "hash-2")
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::UniqueViolation { .. }));
    }

    #[tokio::test]
    async fn test_public_view_has_no_hash() {
        let db = test_db().await;
        let record = db
            .users()
            .create("Adi", "adi@example.com", "argon2-hash")
            .await
            .unwrap();

        let user = record.user();
        let json = serde_json::to_string(&user).unwrap();
        assert!(!json.contains("argon2-hash"));
        assert!(!json.contains("passwordHash"));
    }
}
