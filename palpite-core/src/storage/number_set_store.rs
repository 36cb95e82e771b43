use crate::error::Result;
use crate::storage::{from_timestamp, Storage};
use crate::types::{NumberSet, NumberSetRecord};
use rusqlite::{params, OptionalExtension, Row};

pub struct NumberSetStore<'a> {
    storage: &'a Storage,
}

fn record_from_row(row: &Row<'_>) -> rusqlite::Result<NumberSetRecord> {
    let numbers_str: String = row.get(2)?;
    let numbers = numbers_str.parse::<NumberSet>().map_err(|_| {
        rusqlite::Error::InvalidColumnType(2, "numbers".to_string(), rusqlite::types::Type::Text)
    })?;

    Ok(NumberSetRecord {
        id: row.get(0)?,
        payment_id: row.get(1)?,
        numbers,
        created_at: from_timestamp(row.get(3)?),
        paid: row.get(4)?,
    })
}

impl<'a> NumberSetStore<'a> {
    pub fn new(storage: &'a Storage) -> Self {
        Self { storage }
    }

    pub async fn save_number_set(&self, record: &NumberSetRecord) -> Result<()> {
        let conn = self.storage.get_connection().await;

        conn.execute(
            "INSERT OR REPLACE INTO number_sets (id, payment_id, numbers, created_at, paid)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                record.id,
                record.payment_id,
                record.numbers.to_csv(),
                record.created_at.timestamp(),
                record.paid,
            ],
        )?;

        tracing::info!(
            "Saved {} number set {}",
            if record.paid { "premium" } else { "free" },
            record.id
        );
        Ok(())
    }

    pub async fn load_number_set(&self, id: &str) -> Result<Option<NumberSetRecord>> {
        let conn = self.storage.get_connection().await;

        let record = conn
            .query_row(
                "SELECT id, payment_id, numbers, created_at, paid
                 FROM number_sets WHERE id = ?1",
                params![id],
                record_from_row,
            )
            .optional()?;

        Ok(record)
    }

    pub async fn list_number_sets(&self, limit: usize) -> Result<Vec<NumberSetRecord>> {
        let conn = self.storage.get_connection().await;

        let mut stmt = conn.prepare(
            "SELECT id, payment_id, numbers, created_at, paid
             FROM number_sets ORDER BY created_at DESC LIMIT ?1",
        )?;

        let record_iter = stmt.query_map(params![limit as i64], record_from_row)?;

        let mut records = Vec::new();
        for record in record_iter {
            records.push(record?);
        }

        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use tempfile::tempdir;

    fn record(id: &str, age_secs: i64, paid: bool) -> NumberSetRecord {
        NumberSetRecord {
            id: id.to_string(),
            payment_id: paid.then(|| "p1".to_string()),
            numbers: "2,4,6,8,10,12,14,16,18,19,20,21,22,24,25".parse().unwrap(),
            created_at: Utc::now() - Duration::seconds(age_secs),
            paid,
        }
    }

    #[tokio::test]
    async fn test_list_is_newest_first_and_limited() {
        let temp_dir = tempdir().unwrap();
        let storage = Storage::new(&temp_dir.path().join("lotofacil.db"))
            .await
            .unwrap();
        let store = NumberSetStore::new(&storage);

        store.save_number_set(&record("a", 30, false)).await.unwrap();
        store.save_number_set(&record("b", 20, true)).await.unwrap();
        store.save_number_set(&record("c", 10, false)).await.unwrap();

        let records = store.list_number_sets(2).await.unwrap();
        let ids: Vec<&str> = records.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["c", "b"]);
        assert!(records[1].paid);
        assert_eq!(records[1].payment_id.as_deref(), Some("p1"));
    }

    #[tokio::test]
    async fn test_corrupt_numbers_are_rejected() {
        let temp_dir = tempdir().unwrap();
        let storage = Storage::new(&temp_dir.path().join("lotofacil.db"))
            .await
            .unwrap();

        {
            let conn = storage.get_connection().await;
            conn.execute(
                "INSERT INTO number_sets (id, numbers, created_at) VALUES ('bad', '1,2,3', 0)",
                [],
            )
            .unwrap();
        }

        let store = NumberSetStore::new(&storage);
        assert!(store.load_number_set("bad").await.is_err());
    }
}
