use crate::error::Result;
use crate::storage::{from_timestamp, Storage};
use crate::types::{Payment, PaymentStatus, Price};
use rusqlite::{params, OptionalExtension, Row};
use std::str::FromStr;

pub struct PaymentStore<'a> {
    storage: &'a Storage,
}

fn payment_from_row(row: &Row<'_>) -> rusqlite::Result<Payment> {
    let status_str: String = row.get(3)?;
    let status = PaymentStatus::from_str(&status_str).map_err(|_| {
        rusqlite::Error::InvalidColumnType(3, "status".to_string(), rusqlite::types::Type::Text)
    })?;
    let confirmed_at: Option<i64> = row.get(5)?;

    Ok(Payment {
        id: row.get(0)?,
        payer: row.get(1)?,
        price: Price::from_cents(row.get(2)?),
        status,
        created_at: from_timestamp(row.get(4)?),
        confirmed_at: confirmed_at.map(from_timestamp),
        qr_payload: row.get(6)?,
    })
}

impl<'a> PaymentStore<'a> {
    pub fn new(storage: &'a Storage) -> Self {
        Self { storage }
    }

    pub async fn save_payment(&self, payment: &Payment) -> Result<()> {
        let conn = self.storage.get_connection().await;

        conn.execute(
            "INSERT OR REPLACE INTO payments
             (id, payer, price_cents, status, created_at, confirmed_at, qr_payload)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                payment.id,
                payment.payer,
                payment.price.cents(),
                payment.status.as_str(),
                payment.created_at.timestamp(),
                payment.confirmed_at.map(|t| t.timestamp()),
                payment.qr_payload,
            ],
        )?;

        tracing::info!(
            "Saved payment {} ({}, R$ {})",
            payment.id,
            payment.status.as_str(),
            payment.price
        );
        Ok(())
    }

    pub async fn load_payment(&self, payment_id: &str) -> Result<Option<Payment>> {
        let conn = self.storage.get_connection().await;

        let payment = conn
            .query_row(
                "SELECT id, payer, price_cents, status, created_at, confirmed_at, qr_payload
                 FROM payments WHERE id = ?1",
                params![payment_id],
                payment_from_row,
            )
            .optional()?;

        Ok(payment)
    }

    pub async fn list_payments(&self) -> Result<Vec<Payment>> {
        let conn = self.storage.get_connection().await;

        let mut stmt = conn.prepare(
            "SELECT id, payer, price_cents, status, created_at, confirmed_at, qr_payload
             FROM payments ORDER BY created_at DESC",
        )?;

        let payment_iter = stmt.query_map([], payment_from_row)?;

        let mut payments = Vec::new();
        for payment in payment_iter {
            payments.push(payment?);
        }

        Ok(payments)
    }

    pub async fn count_by_status(&self, status: PaymentStatus) -> Result<i64> {
        let conn = self.storage.get_connection().await;

        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM payments WHERE status = ?1",
            params![status.as_str()],
            |row| row.get(0),
        )?;

        Ok(count)
    }
}
