use crate::error::Result;
use crate::types::Payment;
use async_trait::async_trait;

/// Decides whether a payment the client claims to have made is settled
#[async_trait]
pub trait PaymentVerifier: Send + Sync {
    async fn verify(&self, payment: &Payment) -> Result<bool>;
}

/// Accepts every confirmation. No settlement check is performed.
#[derive(Debug, Clone, Copy, Default)]
pub struct TrustingVerifier;

#[async_trait]
impl PaymentVerifier for TrustingVerifier {
    async fn verify(&self, payment: &Payment) -> Result<bool> {
        tracing::debug!("Trusting client confirmation for payment {}", payment.id);
        Ok(true)
    }
}
