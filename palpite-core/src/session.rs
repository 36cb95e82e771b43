use serde::{Deserialize, Serialize};

/// Issuance progress, derived from [`SessionState`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IssuanceState {
    NoSet,
    FreeIssued,
    PaymentRequested,
    PremiumIssued,
}

/// Per-client state. Holds references to records, never the records.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionState {
    pub number_set_id: Option<String>,
    pub payment_id: Option<String>,
    pub paid: bool,
    pub payment_pending: bool,
}

impl SessionState {
    pub fn state(&self) -> IssuanceState {
        if self.paid {
            IssuanceState::PremiumIssued
        } else if self.payment_pending {
            IssuanceState::PaymentRequested
        } else if self.number_set_id.is_some() {
            IssuanceState::FreeIssued
        } else {
            IssuanceState::NoSet
        }
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_derivation() {
        let mut session = SessionState::default();
        assert_eq!(session.state(), IssuanceState::NoSet);

        session.number_set_id = Some("n1".to_string());
        assert_eq!(session.state(), IssuanceState::FreeIssued);

        session.payment_id = Some("p1".to_string());
        session.payment_pending = true;
        assert_eq!(session.state(), IssuanceState::PaymentRequested);

        session.payment_pending = false;
        session.paid = true;
        assert_eq!(session.state(), IssuanceState::PremiumIssued);

        session.clear();
        assert_eq!(session, SessionState::default());
        assert_eq!(session.state(), IssuanceState::NoSet);
    }
}
