pub mod number_set_store;
pub mod payment_store;

pub use number_set_store::NumberSetStore;
pub use payment_store::PaymentStore;

use crate::error::{PalpiteError, Result};
use crate::types::{NumberSetRecord, Payment};
use async_trait::async_trait;
use rusqlite::Connection;
use std::path::Path;
use tokio::sync::Mutex;

/// Get/put access to persisted records, keyed by their opaque id.
///
/// `put_*` is an upsert: writing an existing id replaces the record.
#[async_trait]
pub trait RecordStore: Send + Sync {
    async fn put_payment(&self, payment: &Payment) -> Result<()>;

    async fn get_payment(&self, id: &str) -> Result<Option<Payment>>;

    async fn put_number_set(&self, record: &NumberSetRecord) -> Result<()>;

    async fn get_number_set(&self, id: &str) -> Result<Option<NumberSetRecord>>;
}

pub struct Storage {
    conn: Mutex<Connection>,
}

impl Storage {
    pub async fn new(db_path: &Path) -> Result<Self> {
        // Create parent directory if it doesn't exist
        if let Some(parent) = db_path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| PalpiteError::internal(format!("Failed to create directory: {}", e)))?;
        }

        let conn = Connection::open(db_path)?;
        let storage = Self {
            conn: Mutex::new(conn),
        };

        storage.init_schema().await?;
        tracing::debug!("Opened record storage at {}", db_path.display());
        Ok(storage)
    }

    async fn init_schema(&self) -> Result<()> {
        let conn = self.conn.lock().await;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS payments (
                id TEXT PRIMARY KEY,
                payer TEXT NOT NULL,
                price_cents INTEGER NOT NULL,
                status TEXT NOT NULL,
                created_at INTEGER NOT NULL,
                confirmed_at INTEGER,
                qr_payload TEXT
            )",
            [],
        )?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS number_sets (
                id TEXT PRIMARY KEY,
                payment_id TEXT,
                numbers TEXT NOT NULL,
                created_at INTEGER NOT NULL,
                paid INTEGER NOT NULL DEFAULT 0,
                FOREIGN KEY (payment_id) REFERENCES payments(id)
            )",
            [],
        )?;

        Ok(())
    }

    pub async fn get_connection(&self) -> tokio::sync::MutexGuard<'_, Connection> {
        self.conn.lock().await
    }

    /// Removes every payment and number set
    pub async fn purge(&self) -> Result<(usize, usize)> {
        let conn = self.get_connection().await;

        let number_sets = conn.execute("DELETE FROM number_sets", [])?;
        let payments = conn.execute("DELETE FROM payments", [])?;

        tracing::info!(
            "Purged {} payments and {} number sets",
            payments,
            number_sets
        );
        Ok((payments, number_sets))
    }
}

#[async_trait]
impl RecordStore for Storage {
    async fn put_payment(&self, payment: &Payment) -> Result<()> {
        PaymentStore::new(self).save_payment(payment).await
    }

    async fn get_payment(&self, id: &str) -> Result<Option<Payment>> {
        PaymentStore::new(self).load_payment(id).await
    }

    async fn put_number_set(&self, record: &NumberSetRecord) -> Result<()> {
        NumberSetStore::new(self).save_number_set(record).await
    }

    async fn get_number_set(&self, id: &str) -> Result<Option<NumberSetRecord>> {
        NumberSetStore::new(self).load_number_set(id).await
    }
}

/// Epoch seconds back to a timestamp, tolerating corrupt values
pub(crate) fn from_timestamp(secs: i64) -> chrono::DateTime<chrono::Utc> {
    chrono::DateTime::from_timestamp(secs, 0).unwrap_or_else(chrono::Utc::now)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{NumberSet, PaymentStatus, Price};
    use chrono::Utc;
    use tempfile::tempdir;

    fn payment(id: &str) -> Payment {
        Payment {
            id: id.to_string(),
            payer: "Cliente".to_string(),
            price: Price::from_cents(399),
            status: PaymentStatus::Pending,
            created_at: Utc::now(),
            confirmed_at: None,
            qr_payload: Some("000201".to_string()),
        }
    }

    fn number_set(id: &str) -> NumberSetRecord {
        NumberSetRecord {
            id: id.to_string(),
            payment_id: None,
            numbers: "1,2,3,4,5,6,7,8,9,10,11,12,13,14,15".parse::<NumberSet>().unwrap(),
            created_at: Utc::now(),
            paid: false,
        }
    }

    #[tokio::test]
    async fn test_schema_creates_data_dir() {
        let temp_dir = tempdir().unwrap();
        let db_path = temp_dir.path().join("nested").join("lotofacil.db");

        let storage = Storage::new(&db_path).await.unwrap();
        assert!(db_path.exists());

        // reopening keeps existing tables
        storage.put_payment(&payment("p1")).await.unwrap();
        drop(storage);
        let storage = Storage::new(&db_path).await.unwrap();
        assert!(storage.get_payment("p1").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_record_store_round_trip() {
        let temp_dir = tempdir().unwrap();
        let storage = Storage::new(&temp_dir.path().join("lotofacil.db"))
            .await
            .unwrap();

        assert!(storage.get_payment("missing").await.unwrap().is_none());
        assert!(storage.get_number_set("missing").await.unwrap().is_none());

        let mut p = payment("p1");
        storage.put_payment(&p).await.unwrap();
        p.confirm();
        storage.put_payment(&p).await.unwrap();

        let loaded = storage.get_payment("p1").await.unwrap().unwrap();
        assert!(loaded.is_confirmed());
        assert!(loaded.confirmed_at.is_some());
        assert_eq!(loaded.price.cents(), 399);

        let mut record = number_set("n1");
        storage.put_number_set(&record).await.unwrap();
        record.numbers = "11,12,13,14,15,16,17,18,19,20,21,22,23,24,25"
            .parse()
            .unwrap();
        record.payment_id = Some("p1".to_string());
        record.paid = true;
        storage.put_number_set(&record).await.unwrap();

        let loaded = storage.get_number_set("n1").await.unwrap().unwrap();
        assert_eq!(loaded.numbers, record.numbers);
        assert_eq!(loaded.payment_id.as_deref(), Some("p1"));
        assert!(loaded.paid);
    }

    #[tokio::test]
    async fn test_purge() {
        let temp_dir = tempdir().unwrap();
        let storage = Storage::new(&temp_dir.path().join("lotofacil.db"))
            .await
            .unwrap();

        storage.put_payment(&payment("p1")).await.unwrap();
        storage.put_number_set(&number_set("n1")).await.unwrap();
        storage.put_number_set(&number_set("n2")).await.unwrap();

        let (payments, number_sets) = storage.purge().await.unwrap();
        assert_eq!(payments, 1);
        assert_eq!(number_sets, 2);
        assert!(storage.get_number_set("n1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_payment_reference_is_not_enforced() {
        let temp_dir = tempdir().unwrap();
        let storage = Storage::new(&temp_dir.path().join("lotofacil.db"))
            .await
            .unwrap();

        let mut record = number_set("n1");
        record.payment_id = Some("never-saved".to_string());
        record.paid = true;
        storage.put_number_set(&record).await.unwrap();

        let loaded = storage.get_number_set("n1").await.unwrap().unwrap();
        assert_eq!(loaded.payment_id.as_deref(), Some("never-saved"));
        assert!(storage.get_payment("never-saved").await.unwrap().is_none());

        // payments can go first even while number sets still point at them
        let conn = storage.get_connection().await;
        conn.execute(
            "INSERT INTO payments (id, payer, price_cents, status, created_at)
             VALUES ('p1', 'Cliente', 399, 'pending', 0)",
            [],
        )
        .unwrap();
        conn.execute("UPDATE number_sets SET payment_id = 'p1'", []).unwrap();
        assert_eq!(conn.execute("DELETE FROM payments", []).unwrap(), 1);
    }
}
