use thiserror::Error;

pub type Result<T> = std::result::Result<T, PalpiteError>;

#[derive(Error, Debug)]
pub enum PalpiteError {
    #[error("Storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Invalid number set: {0}")]
    InvalidNumberSet(String),

    #[error("IDs necessários não fornecidos")]
    MissingIdentifiers,

    #[error("Payment not found: {id}")]
    PaymentNotFound { id: String },

    #[error("Number set not found: {id}")]
    NumberSetNotFound { id: String },

    #[error("Payment rejected: {id}")]
    PaymentRejected { id: String },

    #[error("Invalid session state: {0}")]
    InvalidState(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Dialog error: {0}")]
    Dialog(String),
}

impl PalpiteError {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    pub fn invalid_number_set(msg: impl Into<String>) -> Self {
        Self::InvalidNumberSet(msg.into())
    }

    pub fn invalid_state(msg: impl Into<String>) -> Self {
        Self::InvalidState(msg.into())
    }
}

// conversion from dialoguer::Error
impl From<dialoguer::Error> for PalpiteError {
    fn from(err: dialoguer::Error) -> Self {
        PalpiteError::Dialog(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dialoguer_error_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::Other, "terminal closed");
        let err = PalpiteError::from(dialoguer::Error::IO(io));

        assert!(matches!(err, PalpiteError::Dialog(_)));
        assert!(err.to_string().starts_with("Dialog error:"));
    }
}
