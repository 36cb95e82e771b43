//! Free/premium issuance per session.
//!
//! A session moves `NoSet -> FreeIssued -> PaymentRequested -> PremiumIssued`
//! and stays premium until it is cleared. Once premium, `generate` only
//! reads the stored set back.

use crate::config::ServiceConfig;
use crate::error::{PalpiteError, Result};
use crate::generator::NumberGenerator;
use crate::pix::PixPayload;
use crate::session::{IssuanceState, SessionState};
use crate::storage::RecordStore;
use crate::types::{NumberSet, NumberSetRecord, Payment, PaymentStatus, Price};
use crate::verifier::PaymentVerifier;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Issued {
    pub number_set_id: String,
    pub numbers: NumberSet,
    pub paid: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentRequest {
    pub payment_id: String,
    pub price: Price,
    pub pix_key: String,
    pub qr_payload: String,
}

pub struct IssuanceService {
    store: Arc<dyn RecordStore>,
    verifier: Arc<dyn PaymentVerifier>,
    generator: NumberGenerator,
    config: ServiceConfig,
}

impl IssuanceService {
    pub fn new(
        store: Arc<dyn RecordStore>,
        verifier: Arc<dyn PaymentVerifier>,
        config: ServiceConfig,
    ) -> Result<Self> {
        config.validate()?;
        let generator = NumberGenerator::new(config.premium_policy.clone())?;

        Ok(Self {
            store,
            verifier,
            generator,
            config,
        })
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    pub fn generator(&self) -> &NumberGenerator {
        &self.generator
    }

    /// Returns the stored premium set for paid sessions, a new free set
    /// otherwise
    pub async fn generate(&self, session: &mut SessionState) -> Result<Issued> {
        if session.paid {
            if let Some(id) = session.number_set_id.as_deref() {
                if let Some(record) = self.store.get_number_set(id).await? {
                    tracing::debug!("Returning stored premium set {}", record.id);
                    return Ok(Issued {
                        number_set_id: record.id,
                        numbers: record.numbers,
                        paid: true,
                    });
                }
            }

            tracing::warn!("Paid session lost its number set, issuing a free one");
        }

        let numbers = self.generator.generate_free(&mut rand::rng());
        let record = NumberSetRecord {
            id: Uuid::new_v4().to_string(),
            payment_id: None,
            numbers,
            created_at: Utc::now(),
            paid: false,
        };
        self.store.put_number_set(&record).await?;

        session.number_set_id = Some(record.id.clone());
        session.paid = false;

        tracing::info!("Issued free number set {}", record.id);
        Ok(Issued {
            number_set_id: record.id,
            numbers: record.numbers,
            paid: false,
        })
    }

    /// Creates a pending payment with a PIX payload
    pub async fn request_payment(&self, session: &mut SessionState) -> Result<PaymentRequest> {
        if session.state() == IssuanceState::PremiumIssued {
            return Err(PalpiteError::invalid_state(
                "Session already holds a premium number set",
            ));
        }

        let qr_payload = PixPayload::with_random_reference(
            &self.config.pix_key,
            &self.config.merchant_name,
            &self.config.merchant_city,
            self.config.price,
            &mut rand::rng(),
        )
        .encode()?;

        let payment = Payment {
            id: Uuid::new_v4().to_string(),
            payer: self.config.payer_label.clone(),
            price: self.config.price,
            status: PaymentStatus::Pending,
            created_at: Utc::now(),
            confirmed_at: None,
            qr_payload: Some(qr_payload.clone()),
        };
        self.store.put_payment(&payment).await?;

        session.payment_id = Some(payment.id.clone());
        session.payment_pending = true;

        tracing::info!("Payment {} requested for R$ {}", payment.id, payment.price);
        Ok(PaymentRequest {
            payment_id: payment.id,
            price: payment.price,
            pix_key: self.config.pix_key.clone(),
            qr_payload,
        })
    }

    /// Marks the payment confirmed and replaces the session's set with a
    /// premium one. Confirming an already paid session draws again.
    pub async fn confirm_payment(
        &self,
        session: &mut SessionState,
        payment_id: Option<&str>,
    ) -> Result<Issued> {
        let payment_id = payment_id.map(str::trim).filter(|id| !id.is_empty());
        let (payment_id, number_set_id) = match (payment_id, session.number_set_id.clone()) {
            (Some(payment_id), Some(number_set_id)) => (payment_id, number_set_id),
            _ => {
                tracing::warn!("Payment confirmation without payment or number set id");
                return Err(PalpiteError::MissingIdentifiers);
            }
        };

        let mut payment = self.store.get_payment(payment_id).await?.ok_or_else(|| {
            PalpiteError::PaymentNotFound {
                id: payment_id.to_string(),
            }
        })?;

        if !self.verifier.verify(&payment).await? {
            tracing::warn!("Payment {} was not verified", payment.id);
            return Err(PalpiteError::PaymentRejected { id: payment.id });
        }

        payment.confirm();
        self.store.put_payment(&payment).await?;

        let numbers = self.generator.generate_premium(&mut rand::rng());
        let created_at = match self.store.get_number_set(&number_set_id).await? {
            Some(existing) => existing.created_at,
            None => Utc::now(),
        };
        let record = NumberSetRecord {
            id: number_set_id,
            payment_id: Some(payment.id.clone()),
            numbers,
            created_at,
            paid: true,
        };
        self.store.put_number_set(&record).await?;

        session.payment_id = Some(payment.id.clone());
        session.paid = true;
        session.payment_pending = false;

        tracing::info!(
            "Payment {} confirmed, premium set {} issued",
            payment.id,
            record.id
        );
        Ok(Issued {
            number_set_id: record.id,
            numbers: record.numbers,
            paid: true,
        })
    }

    pub fn clear(&self, session: &mut SessionState) {
        session.clear();
        tracing::debug!("Session cleared");
    }
}
