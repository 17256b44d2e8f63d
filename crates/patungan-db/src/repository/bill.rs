//! # Bill Repository
//!
//! Database operations for bills.
//!
//! ## Storage Model
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       bills table                                       │
//! │                                                                         │
//! │  Scalar columns            JSON aggregate columns                       │
//! │  ──────────────            ──────────────────────                       │
//! │  id, user_id, title,       participants  [{id, name, avatarColor}..]   │
//! │  date, host_id,            items         [{id, name, quantity,...}..]  │
//! │  currency, timestamps      extras        [{id, type, mode,...}..]      │
//! │                                                                         │
//! │  The aggregates round-trip losslessly: whatever the frontend sent is   │
//! │  exactly what comes back, ids included. Only calculation RESULTS are   │
//! │  never stored - a breakdown is recomputed from this row every time.    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Queries are owner-scoped: every read/write carries the requesting user's
//! id in the WHERE clause, so one account can never touch another's bills.

use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use patungan_core::Bill;

/// Repository for bill database operations.
#[derive(Debug, Clone)]
pub struct BillRepository {
    pool: SqlitePool,
}

impl BillRepository {
    /// Creates a new BillRepository.
    pub fn new(pool: SqlitePool) -> Self {
        BillRepository { pool }
    }

    /// Inserts a new bill owned by `user_id`.
    ///
    /// ## Id assignment
    /// Unsaved bills arrive with a client-generated `temp_` id; the store
    /// replaces it with a fresh UUID. Bills that already carry a store id
    /// keep it. The returned bill is the persisted version.
    pub async fn insert(&self, user_id: &str, bill: &Bill) -> DbResult<Bill> {
        let mut stored = bill.clone();
        if !stored.is_saved() {
            stored.id = Uuid::new_v4().to_string();
        }

        debug!(id = %stored.id, user_id = %user_id, title = %stored.title, "Inserting bill");

        let now = Utc::now();
        sqlx::query(
            r#"
            INSERT INTO bills (
                id, user_id, title, date, host_id, currency,
                participants, items, extras,
                created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
            "#,
        )
        .bind(&stored.id)
        .bind(user_id)
        .bind(&stored.title)
        .bind(stored.date)
        .bind(&stored.host_id)
        .bind(&stored.currency)
        .bind(encode_aggregate(&stored.participants)?)
        .bind(encode_aggregate(&stored.items)?)
        .bind(encode_aggregate(&stored.extras)?)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(stored)
    }

    /// Updates a bill in place, scoped to its owner.
    ///
    /// Returns NotFound when the bill doesn't exist or belongs to someone
    /// else - the two cases are indistinguishable on purpose.
    pub async fn update(&self, user_id: &str, bill: &Bill) -> DbResult<()> {
        debug!(id = %bill.id, user_id = %user_id, "Updating bill");

        let now = Utc::now();
        let result = sqlx::query(
            r#"
            UPDATE bills SET
                title = ?3,
                date = ?4,
                host_id = ?5,
                currency = ?6,
                participants = ?7,
                items = ?8,
                extras = ?9,
                updated_at = ?10
            WHERE id = ?1 AND user_id = ?2
            "#,
        )
        .bind(&bill.id)
        .bind(user_id)
        .bind(&bill.title)
        .bind(bill.date)
        .bind(&bill.host_id)
        .bind(&bill.currency)
        .bind(encode_aggregate(&bill.participants)?)
        .bind(encode_aggregate(&bill.items)?)
        .bind(encode_aggregate(&bill.extras)?)
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Bill", &bill.id));
        }

        Ok(())
    }

    /// Gets a bill by id, scoped to its owner.
    pub async fn get_for_user(&self, id: &str, user_id: &str) -> DbResult<Option<Bill>> {
        let row = sqlx::query(
            r#"
            SELECT id, title, date, host_id, currency, participants, items, extras
            FROM bills
            WHERE id = ?1 AND user_id = ?2
            "#,
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(row_to_bill).transpose()
    }

    /// Lists all bills for a user, newest bill date first.
    pub async fn list_for_user(&self, user_id: &str) -> DbResult<Vec<Bill>> {
        debug!(user_id = %user_id, "Listing bills");

        let rows = sqlx::query(
            r#"
            SELECT id, title, date, host_id, currency, participants, items, extras
            FROM bills
            WHERE user_id = ?1
            ORDER BY date DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(row_to_bill).collect()
    }
}

// =============================================================================
// Row Mapping
// =============================================================================

/// Serializes one of the bill's aggregate lists for its JSON column.
fn encode_aggregate<T: serde::Serialize>(value: &T) -> DbResult<String> {
    serde_json::to_string(value).map_err(|e| DbError::Internal(e.to_string()))
}

/// Rebuilds a [`Bill`] from a row, decoding the JSON aggregate columns.
fn row_to_bill(row: SqliteRow) -> DbResult<Bill> {
    let id: String = row.try_get("id")?;

    Ok(Bill {
        title: row.try_get("title")?,
        date: row.try_get::<DateTime<Utc>, _>("date")?,
        host_id: row.try_get("host_id")?,
        currency: row.try_get("currency")?,
        participants: decode_aggregate(&id, "participants", row.try_get("participants")?)?,
        items: decode_aggregate(&id, "items", row.try_get("items")?)?,
        extras: decode_aggregate(&id, "extras", row.try_get("extras")?)?,
        id,
    })
}

/// Deserializes a JSON aggregate column, surfacing corruption with context.
fn decode_aggregate<T: serde::de::DeserializeOwned>(
    bill_id: &str,
    column: &str,
    raw: String,
) -> DbResult<T> {
    serde_json::from_str(&raw).map_err(|e| DbError::CorruptAggregate {
        bill_id: bill_id.to_string(),
        column: column.to_string(),
        reason: e.to_string(),
    })
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use chrono::TimeZone;
    use patungan_core::{Extra, ExtraMode, ExtraSplitMode, ExtraType, Item, Participant};

    async fn test_db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    async fn test_user(db: &Database) -> String {
        let record = db
            .users()
            .create("Adi", "adi@example.com", "argon2-hash")
            .await
            .unwrap();
        record.id
    }

    fn sample_bill(id: &str, date: DateTime<Utc>) -> Bill {
        let p1 = Participant {
            id: "p-1".to_string(),
            name: "Adi".to_string(),
            avatar_color: "#f94144".to_string(),
        };
        let p2 = Participant {
            id: "p-2".to_string(),
            name: "Budi".to_string(),
            avatar_color: "#f3722c".to_string(),
        };
        Bill {
            id: id.to_string(),
            title: "Dinner".to_string(),
            date,
            host_id: "p-1".to_string(),
            participants: vec![p1, p2],
            items: vec![Item {
                id: "i-1".to_string(),
                name: "Pizza".to_string(),
                quantity: 1,
                price: 100000.0,
                participant_ids: vec!["p-1".to_string(), "p-2".to_string()],
            }],
            extras: vec![Extra {
                id: "e-1".to_string(),
                extra_type: ExtraType::Tax,
                mode: ExtraMode::Percentage,
                value: 10.0,
                split_mode: ExtraSplitMode::Proportionally,
            }],
            currency: "IDR".to_string(),
        }
    }

    #[tokio::test]
    async fn test_insert_replaces_temp_id() {
        let db = test_db().await;
        let user_id = test_user(&db).await;

        let bill = sample_bill("temp_1723", Utc::now());
        let stored = db.bills().insert(&user_id, &bill).await.unwrap();

        assert!(stored.is_saved());
        assert_ne!(stored.id, "temp_1723");
        // Everything else is untouched
        assert_eq!(stored.title, bill.title);
        assert_eq!(stored.items, bill.items);
    }

    #[tokio::test]
    async fn test_round_trip_is_lossless() {
        let db = test_db().await;
        let user_id = test_user(&db).await;

        let date = Utc.with_ymd_and_hms(2026, 7, 14, 19, 30, 0).unwrap();
        let bill = sample_bill("temp_1", date);
        let stored = db.bills().insert(&user_id, &bill).await.unwrap();

        let fetched = db
            .bills()
            .get_for_user(&stored.id, &user_id)
            .await
            .unwrap()
            .expect("bill should exist");

        // Field-for-field identical, nested aggregates included
        assert_eq!(fetched, stored);
    }

    #[tokio::test]
    async fn test_list_orders_by_bill_date_desc() {
        let db = test_db().await;
        let user_id = test_user(&db).await;

        let older = Utc.with_ymd_and_hms(2026, 1, 1, 12, 0, 0).unwrap();
        let newer = Utc.with_ymd_and_hms(2026, 6, 1, 12, 0, 0).unwrap();
        let mut first = sample_bill("temp_a", older);
        first.title = "January".to_string();
        let mut second = sample_bill("temp_b", newer);
        second.title = "June".to_string();

        db.bills().insert(&user_id, &first).await.unwrap();
        db.bills().insert(&user_id, &second).await.unwrap();

        let bills = db.bills().list_for_user(&user_id).await.unwrap();
        assert_eq!(bills.len(), 2);
        assert_eq!(bills[0].title, "June");
        assert_eq!(bills[1].title, "January");
    }

    #[tokio::test]
    async fn test_update_rewrites_aggregates() {
        let db = test_db().await;
        let user_id = test_user(&db).await;

        let mut stored = db
            .bills()
            .insert(&user_id, &sample_bill("temp_1", Utc::now()))
            .await
            .unwrap();

        stored.items[0].participant_ids.pop();
        stored.extras.clear();
        db.bills().update(&user_id, &stored).await.unwrap();

        let fetched = db
            .bills()
            .get_for_user(&stored.id, &user_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(fetched.items[0].participant_ids, vec!["p-1".to_string()]);
        assert!(fetched.extras.is_empty());
    }

    #[tokio::test]
    async fn test_bills_are_owner_scoped() {
        let db = test_db().await;
        let owner = test_user(&db).await;
        let other = db
            .users()
            .create("Budi", "budi@example.com", "argon2-hash")
            .await
            .unwrap()
            .id;

        let stored = db
            .bills()
            .insert(&owner, &sample_bill("temp_1", Utc::now()))
            .await
            .unwrap();

        // Reads come back empty for the other account
        assert!(db
            .bills()
            .get_for_user(&stored.id, &other)
            .await
            .unwrap()
            .is_none());
        assert!(db.bills().list_for_user(&other).await.unwrap().is_empty());

        // And writes bounce
        let err = db.bills().update(&other, &stored).await.unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }
}
