use crate::error::{PalpiteError, Result};
use crate::generator::PremiumPolicy;
use crate::types::Price;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    pub price: Price,
    pub pix_key: String,
    pub merchant_name: String,
    pub merchant_city: String,
    pub payer_label: String,
    pub premium_policy: PremiumPolicy,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            price: Price::from_cents(399),
            pix_key: "19668d66-72cb-44cb-b7fc-fe3d1b8c559b".to_string(),
            merchant_name: "PALPITEIRO PREMIUM LTDA".to_string(),
            merchant_city: "BRASILIA".to_string(),
            payer_label: "Cliente".to_string(),
            premium_policy: PremiumPolicy::default(),
        }
    }
}

impl ServiceConfig {
    /// Missing fields fall back to the defaults
    pub async fn load(path: &Path) -> Result<Self> {
        let raw = tokio::fs::read_to_string(path).await?;
        let config: Self = serde_json::from_str(&raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.price.cents() == 0 {
            return Err(PalpiteError::config("Price must be greater than 0"));
        }

        if self.pix_key.trim().is_empty() {
            return Err(PalpiteError::config("PIX key cannot be empty"));
        }

        if self.merchant_name.trim().is_empty() {
            return Err(PalpiteError::config("Merchant name cannot be empty"));
        }

        if self.merchant_city.trim().is_empty() {
            return Err(PalpiteError::config("Merchant city cannot be empty"));
        }

        self.premium_policy.validate()
    }
}
