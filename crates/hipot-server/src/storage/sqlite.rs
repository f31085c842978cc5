//! SQLite storage backend
//!
//! Durable storage using sqlx. Also holds the login accounts so a single
//! database file carries all service state.
//!
//! # Schema
//!
//! ```sql
//! users(id, username UNIQUE, password_hash)
//! pdf_logs(id, work_order_number, operator, test_date, serial_number, pdf_data, created_at)
//! ```
//!
//! `created_at` is stored as RFC 3339 text with millisecond precision, which
//! sorts chronologically as text.

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions, SqliteRow};
use sqlx::Row;
use std::str::FromStr;
use tracing::{error, info};

use hipot_core::{AuditRecord, NewAuditRecord};
use hipot_gate::{AuthError, CredentialStore, UserRecord};

use super::{now_millis, AuditStore, StorageError};

const MIGRATIONS: [&str; 3] = [
    r#"
    CREATE TABLE IF NOT EXISTS users (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        username TEXT UNIQUE NOT NULL,
        password_hash TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS pdf_logs (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        work_order_number TEXT NOT NULL,
        operator TEXT NOT NULL,
        test_date TEXT NOT NULL,
        serial_number TEXT NOT NULL,
        pdf_data TEXT NOT NULL,
        created_at TEXT NOT NULL
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_pdf_logs_created_at ON pdf_logs(created_at)",
];

const SELECT_LOGS: &str = r#"
    SELECT id, work_order_number, operator, test_date, serial_number, pdf_data, created_at
    FROM pdf_logs
"#;

/// SQLite audit and credential store
#[derive(Debug, Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Connect to a SQLite database, creating the file and tables if needed
    ///
    /// `sqlite::memory:` gives a private in-memory database that lives as
    /// long as the store.
    pub async fn new(database_url: &str) -> Result<Self, StorageError> {
        let options = SqliteConnectOptions::from_str(database_url)
            .map_err(|e| StorageError::Connection(e.to_string()))?
            .create_if_missing(true);

        let pool_options = if database_url.contains(":memory:") {
            // every connection would otherwise see its own empty database
            SqlitePoolOptions::new()
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
        } else {
            SqlitePoolOptions::new().max_connections(5)
        };

        let pool = pool_options
            .connect_with(options)
            .await
            .map_err(|e| StorageError::Connection(e.to_string()))?;

        info!(url = %database_url, "Connected to SQLite database");

        let store = Self { pool };
        store.run_migrations().await?;
        Ok(store)
    }

    /// Create from an existing pool; tables must already exist
    pub fn from_pool(pool: SqlitePool) -> Self {
        Self { pool }
    }

    async fn run_migrations(&self) -> Result<(), StorageError> {
        for statement in MIGRATIONS {
            sqlx::query(statement)
                .execute(&self.pool)
                .await
                .map_err(|e| StorageError::Database(e.to_string()))?;
        }

        info!("Database migrations complete");
        Ok(())
    }

    /// Get the connection pool for direct access if needed
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

fn record_from_row(row: &SqliteRow) -> Result<AuditRecord, StorageError> {
    let db = |e: sqlx::Error| StorageError::Database(e.to_string());

    let created_at: String = row.try_get("created_at").map_err(db)?;
    let created_at = DateTime::parse_from_rfc3339(&created_at)
        .map_err(|e| StorageError::Database(format!("bad created_at '{created_at}': {e}")))?
        .with_timezone(&Utc);

    Ok(AuditRecord {
        id: row.try_get("id").map_err(db)?,
        work_order_number: row.try_get("work_order_number").map_err(db)?,
        operator: row.try_get("operator").map_err(db)?,
        test_date: row.try_get("test_date").map_err(db)?,
        serial_number: row.try_get("serial_number").map_err(db)?,
        pdf_data: row.try_get("pdf_data").map_err(db)?,
        created_at,
    })
}

#[async_trait]
impl AuditStore for SqliteStore {
    // =========================================================================
    // Writes
    // =========================================================================

    async fn insert_batch(
        &self,
        records: Vec<NewAuditRecord>,
    ) -> Result<Vec<AuditRecord>, StorageError> {
        let write_failure = |e: sqlx::Error| StorageError::WriteFailure(e.to_string());

        let created_at = now_millis();
        let stamp = created_at.to_rfc3339_opts(SecondsFormat::Millis, true);

        // dropping the transaction on an early return rolls it back
        let mut tx = self.pool.begin().await.map_err(write_failure)?;
        let mut saved = Vec::with_capacity(records.len());

        for record in records {
            let result = sqlx::query(
                r#"
                INSERT INTO pdf_logs
                    (work_order_number, operator, test_date, serial_number, pdf_data, created_at)
                VALUES (?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(&record.work_order_number)
            .bind(&record.operator)
            .bind(&record.test_date)
            .bind(&record.serial_number)
            .bind(&record.pdf_data)
            .bind(&stamp)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                error!(
                    work_order = %record.work_order_number,
                    serial_number = %record.serial_number,
                    error = %e,
                    "Failed to insert audit record"
                );
                write_failure(e)
            })?;

            saved.push(record.into_record(result.last_insert_rowid(), created_at));
        }

        tx.commit().await.map_err(write_failure)?;

        info!(rows = saved.len(), "Stored audit records in database");
        Ok(saved)
    }

    async fn delete_by_id(&self, id: i64) -> Result<(), StorageError> {
        let result = sqlx::query("DELETE FROM pdf_logs WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| StorageError::Database(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(StorageError::NotFound(id));
        }

        info!(id = id, "Deleted audit record from database");
        Ok(())
    }

    // =========================================================================
    // Reads
    // =========================================================================

    async fn list(&self) -> Result<Vec<AuditRecord>, StorageError> {
        let rows = sqlx::query(&format!("{SELECT_LOGS} ORDER BY created_at DESC, id DESC"))
            .fetch_all(&self.pool)
            .await
            .map_err(|e| StorageError::Database(e.to_string()))?;

        rows.iter().map(record_from_row).collect()
    }

    async fn get(&self, id: i64) -> Result<Option<AuditRecord>, StorageError> {
        let row = sqlx::query(&format!("{SELECT_LOGS} WHERE id = ?"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| StorageError::Database(e.to_string()))?;

        row.as_ref().map(record_from_row).transpose()
    }

    async fn count(&self) -> Result<usize, StorageError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM pdf_logs")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| StorageError::Database(e.to_string()))?;

        Ok(count as usize)
    }
}

#[async_trait]
impl CredentialStore for SqliteStore {
    async fn find_user(&self, username: &str) -> Result<Option<UserRecord>, AuthError> {
        let row = sqlx::query("SELECT id, username, password_hash FROM users WHERE username = ?")
            .bind(username)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AuthError::Backend(e.to_string()))?;

        row.map(|row| -> Result<UserRecord, sqlx::Error> {
            Ok(UserRecord {
                id: row.try_get("id")?,
                username: row.try_get("username")?,
                password_hash: row.try_get("password_hash")?,
            })
        })
        .transpose()
        .map_err(|e| AuthError::Backend(e.to_string()))
    }

    async fn create_user(&self, username: &str, password_hash: &str) -> Result<UserRecord, AuthError> {
        let result = sqlx::query("INSERT INTO users (username, password_hash) VALUES (?, ?)")
            .bind(username)
            .bind(password_hash)
            .execute(&self.pool)
            .await
            .map_err(|e| match &e {
                sqlx::Error::Database(db) if db.is_unique_violation() => {
                    AuthError::UserExists(username.to_string())
                }
                _ => AuthError::Backend(e.to_string()),
            })?;

        Ok(UserRecord {
            id: result.last_insert_rowid(),
            username: username.to_string(),
            password_hash: password_hash.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn store() -> SqliteStore {
        SqliteStore::new("sqlite::memory:").await.unwrap()
    }

    fn record(serial: &str) -> NewAuditRecord {
        NewAuditRecord {
            work_order_number: "WO-1001".into(),
            operator: "J.Smith".into(),
            test_date: "2024-05-01".into(),
            serial_number: serial.into(),
            pdf_data: "data:application/pdf;base64,JVBERi0xLjUK".into(),
        }
    }

    // =========================================================================
    // Audit records
    // =========================================================================

    #[tokio::test]
    async fn test_insert_then_list_round_trips() {
        let store = store().await;
        let saved = store
            .insert_batch(vec![record("SN-01"), record("SN-02")])
            .await
            .unwrap();

        let listed = store.list().await.unwrap();
        assert_eq!(listed.len(), 2);
        // same created_at, so the higher id comes first
        assert_eq!(listed[0], saved[1]);
        assert_eq!(listed[1], saved[0]);
    }

    #[tokio::test]
    async fn test_get_and_delete() {
        let store = store().await;
        let saved = store.insert(record("SN-01")).await.unwrap();

        assert_eq!(store.get(saved.id).await.unwrap(), Some(saved.clone()));
        store.delete_by_id(saved.id).await.unwrap();
        assert_eq!(store.get(saved.id).await.unwrap(), None);
        assert_eq!(
            store.delete_by_id(saved.id).await,
            Err(StorageError::NotFound(saved.id))
        );
    }

    #[tokio::test]
    async fn test_failed_row_rolls_back_whole_batch() {
        let store = store().await;
        sqlx::query(
            r#"
            CREATE TRIGGER reject_bad_serial BEFORE INSERT ON pdf_logs
            WHEN NEW.serial_number = 'SN-BAD'
            BEGIN
                SELECT RAISE(ABORT, 'rejected serial');
            END
            "#,
        )
        .execute(store.pool())
        .await
        .unwrap();

        let result = store
            .insert_batch(vec![record("SN-01"), record("SN-BAD"), record("SN-03")])
            .await;

        assert!(matches!(result, Err(StorageError::WriteFailure(_))));
        assert_eq!(store.count().await.unwrap(), 0);
    }

    // =========================================================================
    // Credentials
    // =========================================================================

    #[tokio::test]
    async fn test_users() {
        let store = store().await;
        assert!(store.find_user("admin").await.unwrap().is_none());

        let created = store.create_user("admin", "$2b$04$hash").await.unwrap();
        let found = store.find_user("admin").await.unwrap().unwrap();
        assert_eq!(found, created);

        assert_eq!(
            store.create_user("admin", "other").await,
            Err(AuthError::UserExists("admin".into()))
        );
    }
}
