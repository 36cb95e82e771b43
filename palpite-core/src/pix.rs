//! PIX "copia e cola" payload (EMV BR Code) for the simulated checkout.
//!
//! Only the static-key fields are emitted. The payload is never registered
//! with any bank; it only has the right shape for a wallet app to parse.

use crate::error::{PalpiteError, Result};
use crate::types::Price;
use rand::Rng;

const PIX_GUI: &str = "br.gov.bcb.pix";

/// Field values are limited to two decimal digits of length
fn tlv(id: &str, value: &str) -> Result<String> {
    if value.len() > 99 {
        return Err(PalpiteError::config(format!(
            "PIX field {} is too long ({} bytes)",
            id,
            value.len()
        )));
    }
    Ok(format!("{}{:02}{}", id, value.len(), value))
}

/// CRC-16/CCITT-FALSE (poly 0x1021, init 0xFFFF)
pub fn crc16(data: &[u8]) -> u16 {
    let mut crc: u16 = 0xFFFF;
    for byte in data {
        crc ^= u16::from(*byte) << 8;
        for _ in 0..8 {
            crc = if crc & 0x8000 != 0 {
                (crc << 1) ^ 0x1021
            } else {
                crc << 1
            };
        }
    }
    crc
}

#[derive(Debug, Clone)]
pub struct PixPayload<'a> {
    pub key: &'a str,
    pub merchant_name: &'a str,
    pub merchant_city: &'a str,
    pub amount: Price,
    pub reference: String,
}

impl<'a> PixPayload<'a> {
    /// Reference is a random 5-digit number, as the checkout page shows it
    pub fn with_random_reference<R: Rng + ?Sized>(
        key: &'a str,
        merchant_name: &'a str,
        merchant_city: &'a str,
        amount: Price,
        rng: &mut R,
    ) -> Self {
        Self {
            key,
            merchant_name,
            merchant_city,
            amount,
            reference: rng.random_range(10000..=99999u32).to_string(),
        }
    }

    pub fn encode(&self) -> Result<String> {
        let account = format!("{}{}", tlv("00", PIX_GUI)?, tlv("01", self.key)?);
        let additional = tlv("05", &self.reference)?;

        let mut payload = String::new();
        payload.push_str(&tlv("00", "01")?);
        payload.push_str(&tlv("26", &account)?);
        payload.push_str(&tlv("52", "0000")?);
        payload.push_str(&tlv("53", "986")?);
        payload.push_str(&tlv("54", &self.amount.to_string())?);
        payload.push_str(&tlv("58", "BR")?);
        payload.push_str(&tlv("59", self.merchant_name)?);
        payload.push_str(&tlv("60", self.merchant_city)?);
        payload.push_str(&tlv("62", &additional)?);

        // checksum covers its own id and length
        payload.push_str("6304");
        let crc = crc16(payload.as_bytes());
        payload.push_str(&format!("{:04X}", crc));

        Ok(payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    const KEY: &str = "19668d66-72cb-44cb-b7fc-fe3d1b8c559b";

    #[test]
    fn test_crc16_check_value() {
        assert_eq!(crc16(b"123456789"), 0x29B1);
    }

    #[test]
    fn test_payload_layout() {
        let payload = PixPayload {
            key: KEY,
            merchant_name: "PALPITEIRO PREMIUM LTDA",
            merchant_city: "BRASILIA",
            amount: Price::from_cents(399),
            reference: "12345".to_string(),
        }
        .encode()
        .unwrap();

        assert!(payload.starts_with("000201"));
        assert!(payload.contains("0014br.gov.bcb.pix0136"));
        assert!(payload.contains(KEY));
        assert!(payload.contains("54043.99"));
        assert!(payload.contains("5802BR"));
        assert!(payload.contains("5923PALPITEIRO PREMIUM LTDA"));
        assert!(payload.contains("6008BRASILIA"));
        assert!(payload.contains("62090505123456304"));

        let (body, checksum) = payload.split_at(payload.len() - 4);
        assert_eq!(checksum, format!("{:04X}", crc16(body.as_bytes())));
    }

    #[test]
    fn test_random_reference_is_five_digits() {
        let mut rng = StdRng::seed_from_u64(1);
        for _ in 0..50 {
            let payload = PixPayload::with_random_reference(
                KEY,
                "X",
                "Y",
                Price::from_cents(100),
                &mut rng,
            );
            assert_eq!(payload.reference.len(), 5);
            assert!(payload.reference.chars().all(|c| c.is_ascii_digit()));
        }
    }

    #[test]
    fn test_oversized_field_is_rejected() {
        let long_name = "N".repeat(100);
        let payload = PixPayload {
            key: KEY,
            merchant_name: &long_name,
            merchant_city: "BRASILIA",
            amount: Price::from_cents(399),
            reference: "12345".to_string(),
        };
        assert!(payload.encode().is_err());
    }
}
