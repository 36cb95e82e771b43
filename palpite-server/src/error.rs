use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use palpite_core::PalpiteError;
use serde_json::json;
use thiserror::Error;

/// Every failure becomes `{status: "error", message}`. Callers must read the
/// body: missing identifiers on confirmation still answer 200.
#[derive(Error, Debug)]
#[error(transparent)]
pub struct ApiError(#[from] PalpiteError);

impl ApiError {
    pub fn inner(&self) -> &PalpiteError {
        &self.0
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self.0 {
            PalpiteError::MissingIdentifiers => StatusCode::OK,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!("Request failed: {}", self.0);
        }

        HttpResponse::build(status).json(json!({
            "status": "error",
            "message": self.0.to_string(),
        }))
    }
}
