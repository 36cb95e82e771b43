//! Palpiteiro core - Lotofácil number suggestions with a simulated PIX checkout
//!
//! This library holds the number generators, the per-session issuance state
//! machine and the SQLite record storage. HTTP and CLI surfaces live in
//! `palpite-server`.

pub mod config;
pub mod error;
pub mod generator;
pub mod issuance;
pub mod pix;
pub mod session;
pub mod storage;
pub mod types;
pub mod verifier;

pub use config::ServiceConfig;
pub use error::{PalpiteError, Result};
pub use generator::{Band, NumberGenerator, PremiumPolicy};
pub use issuance::{IssuanceService, Issued, PaymentRequest};
pub use session::{IssuanceState, SessionState};
pub use storage::{RecordStore, Storage};
pub use types::{NumberSet, NumberSetRecord, Payment, PaymentStatus, Price};
pub use verifier::{PaymentVerifier, TrustingVerifier};

/// Database file inside the data directory
pub const DB_FILE_NAME: &str = "lotofacil.db";
