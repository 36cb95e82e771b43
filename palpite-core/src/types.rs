use crate::error::{PalpiteError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub const NUMBERS_PER_SET: usize = 15;
pub const MIN_NUMBER: u8 = 1;
pub const MAX_NUMBER: u8 = 25;

/// 15 distinct numbers in [1, 25], sorted ascending
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "Vec<u8>", into = "Vec<u8>")]
pub struct NumberSet(Vec<u8>);

impl NumberSet {
    /// Validates arbitrary input. Unsorted input is rejected rather than
    /// silently reordered.
    pub fn new(numbers: Vec<u8>) -> Result<Self> {
        if numbers.len() != NUMBERS_PER_SET {
            return Err(PalpiteError::invalid_number_set(format!(
                "expected {} numbers, got {}",
                NUMBERS_PER_SET,
                numbers.len()
            )));
        }

        if let Some(n) = numbers
            .iter()
            .find(|n| !(MIN_NUMBER..=MAX_NUMBER).contains(*n))
        {
            return Err(PalpiteError::invalid_number_set(format!(
                "{} is outside {}..={}",
                n, MIN_NUMBER, MAX_NUMBER
            )));
        }

        // strictly increasing covers both ordering and uniqueness
        if numbers.windows(2).any(|w| w[0] >= w[1]) {
            return Err(PalpiteError::invalid_number_set(
                "numbers must be distinct and sorted ascending",
            ));
        }

        Ok(Self(numbers))
    }

    /// Sorts a fresh draw. Callers guarantee distinct in-range values.
    pub(crate) fn from_draw(mut numbers: Vec<u8>) -> Self {
        numbers.sort_unstable();
        debug_assert!(Self::new(numbers.clone()).is_ok());
        Self(numbers)
    }

    pub fn numbers(&self) -> &[u8] {
        &self.0
    }

    pub fn contains(&self, n: u8) -> bool {
        self.0.binary_search(&n).is_ok()
    }

    /// Persisted form, e.g. `1,2,5,...`
    pub fn to_csv(&self) -> String {
        self.0
            .iter()
            .map(|n| n.to_string())
            .collect::<Vec<_>>()
            .join(",")
    }
}

impl FromStr for NumberSet {
    type Err = PalpiteError;

    fn from_str(s: &str) -> Result<Self> {
        let numbers = s
            .split(',')
            .map(|part| {
                part.trim().parse::<u8>().map_err(|e| {
                    PalpiteError::invalid_number_set(format!("'{}': {}", part.trim(), e))
                })
            })
            .collect::<Result<Vec<u8>>>()?;

        Self::new(numbers)
    }
}

impl TryFrom<Vec<u8>> for NumberSet {
    type Error = PalpiteError;

    fn try_from(numbers: Vec<u8>) -> Result<Self> {
        Self::new(numbers)
    }
}

impl From<NumberSet> for Vec<u8> {
    fn from(set: NumberSet) -> Self {
        set.0
    }
}

impl fmt::Display for NumberSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.0.iter().map(|n| format!("{:02}", n)).collect();
        write!(f, "{}", parts.join(" "))
    }
}

/// Price in centavos
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Price(u32);

impl Price {
    pub const fn from_cents(cents: u32) -> Self {
        Self(cents)
    }

    pub fn cents(&self) -> u32 {
        self.0
    }

    pub fn as_f64(&self) -> f64 {
        f64::from(self.0) / 100.0
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:02}", self.0 / 100, self.0 % 100)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Pending,
    Confirmed,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "pending",
            PaymentStatus::Confirmed => "confirmed",
        }
    }
}

impl FromStr for PaymentStatus {
    type Err = PalpiteError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "pending" => Ok(PaymentStatus::Pending),
            "confirmed" => Ok(PaymentStatus::Confirmed),
            other => Err(PalpiteError::internal(format!(
                "Unknown payment status: {}",
                other
            ))),
        }
    }
}

/// Simulated payment. Nothing is ever settled.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Payment {
    pub id: String,
    pub payer: String,
    pub price: Price,
    pub status: PaymentStatus,
    pub created_at: DateTime<Utc>,
    pub confirmed_at: Option<DateTime<Utc>>,
    pub qr_payload: Option<String>,
}

impl Payment {
    pub fn is_confirmed(&self) -> bool {
        self.status == PaymentStatus::Confirmed
    }

    pub fn confirm(&mut self) {
        self.status = PaymentStatus::Confirmed;
        self.confirmed_at = Some(Utc::now());
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NumberSetRecord {
    pub id: String,
    pub payment_id: Option<String>, // None for free sets
    pub numbers: NumberSet,
    pub created_at: DateTime<Utc>,
    pub paid: bool,
}
