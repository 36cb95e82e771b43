//! Number-set generation policies.
//!
//! The free policy is a plain uniform draw. The premium policy first draws a
//! fixed number of values from each configured band, then fills the rest of
//! the set from whatever values in [1, 25] are still unused.

use crate::error::{PalpiteError, Result};
use crate::types::{NumberSet, MAX_NUMBER, MIN_NUMBER, NUMBERS_PER_SET};
use rand::seq::IndexedRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;

/// Contiguous sub-range of [1, 25] with a minimum draw count
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Band {
    pub name: String,
    pub low: u8,
    pub high: u8,
    pub count: usize,
}

impl Band {
    pub fn new(name: impl Into<String>, low: u8, high: u8, count: usize) -> Self {
        Self {
            name: name.into(),
            low,
            high,
            count,
        }
    }

    pub fn range(&self) -> RangeInclusive<u8> {
        self.low..=self.high
    }

    pub fn size(&self) -> usize {
        if self.high < self.low {
            0
        } else {
            usize::from(self.high - self.low) + 1
        }
    }

    pub fn contains(&self, n: u8) -> bool {
        self.range().contains(&n)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PremiumPolicy {
    pub bands: Vec<Band>,
}

impl Default for PremiumPolicy {
    fn default() -> Self {
        Self {
            bands: vec![
                Band::new("low", 1, 8, 4),
                Band::new("mid", 9, 16, 5),
                Band::new("high", 17, 25, 5),
            ],
        }
    }
}

impl PremiumPolicy {
    pub fn band_total(&self) -> usize {
        self.bands.iter().map(|b| b.count).sum()
    }

    pub fn validate(&self) -> Result<()> {
        for band in &self.bands {
            if band.low > band.high {
                return Err(PalpiteError::config(format!(
                    "Band '{}' has an empty range {}..={}",
                    band.name, band.low, band.high
                )));
            }

            if band.low < MIN_NUMBER || band.high > MAX_NUMBER {
                return Err(PalpiteError::config(format!(
                    "Band '{}' must lie within {}..={}",
                    band.name, MIN_NUMBER, MAX_NUMBER
                )));
            }

            if band.count > band.size() {
                return Err(PalpiteError::config(format!(
                    "Band '{}' draws {} values from only {}",
                    band.name,
                    band.count,
                    band.size()
                )));
            }
        }

        for (i, a) in self.bands.iter().enumerate() {
            for b in &self.bands[i + 1..] {
                if a.low <= b.high && b.low <= a.high {
                    return Err(PalpiteError::config(format!(
                        "Bands '{}' and '{}' overlap",
                        a.name, b.name
                    )));
                }
            }
        }

        if self.band_total() > NUMBERS_PER_SET {
            return Err(PalpiteError::config(format!(
                "Band counts sum to {}, more than {}",
                self.band_total(),
                NUMBERS_PER_SET
            )));
        }

        Ok(())
    }
}

#[derive(Debug, Clone, Default)]
pub struct NumberGenerator {
    policy: PremiumPolicy,
}

impl NumberGenerator {
    pub fn new(policy: PremiumPolicy) -> Result<Self> {
        policy.validate()?;
        Ok(Self { policy })
    }

    pub fn policy(&self) -> &PremiumPolicy {
        &self.policy
    }

    /// Uniform draw without replacement
    pub fn generate_free<R: Rng + ?Sized>(&self, rng: &mut R) -> NumberSet {
        let pool: Vec<u8> = (MIN_NUMBER..=MAX_NUMBER).collect();
        let drawn = pool.choose_multiple(rng, NUMBERS_PER_SET).copied().collect();
        NumberSet::from_draw(drawn)
    }

    /// Band draws first, then fill from the shrinking pool of unused values
    pub fn generate_premium<R: Rng + ?Sized>(&self, rng: &mut R) -> NumberSet {
        let mut drawn: Vec<u8> = Vec::with_capacity(NUMBERS_PER_SET);

        for band in &self.policy.bands {
            let pool: Vec<u8> = band.range().collect();
            drawn.extend(pool.choose_multiple(rng, band.count).copied());
        }

        let remaining: Vec<u8> = (MIN_NUMBER..=MAX_NUMBER)
            .filter(|n| !drawn.contains(n))
            .collect();
        let missing = NUMBERS_PER_SET - drawn.len();
        drawn.extend(remaining.choose_multiple(rng, missing).copied());

        NumberSet::from_draw(drawn)
    }
}
