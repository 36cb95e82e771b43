use crate::error::ApiError;
use crate::session::session_cookie;
use crate::{ui, AppState};
use actix_web::web::{self, Bytes, Data};
use actix_web::{HttpRequest, HttpResponse};
use palpite_core::{Issued, NumberSet, PalpiteError, PaymentRequest};
use serde::{Deserialize, Serialize};
use serde_json::json;

#[derive(Debug, Serialize)]
struct NumbersResponse {
    status: &'static str,
    numeros: NumberSet,
    pago: bool,
}

impl From<Issued> for NumbersResponse {
    fn from(issued: Issued) -> Self {
        Self {
            status: "success",
            numeros: issued.numbers,
            pago: issued.paid,
        }
    }
}

#[derive(Debug, Serialize)]
struct PaymentResponse {
    status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pagamento_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    transacao_id: Option<String>,
    valor: f64,
    chave_pix: String,
    qrcode_texto: String,
}

/// Which key carries the payment id in the response
#[derive(Debug, Clone, Copy)]
enum PaymentIdKey {
    PagamentoId,
    TransacaoId,
}

impl PaymentResponse {
    fn new(request: PaymentRequest, key: PaymentIdKey) -> Self {
        let (pagamento_id, transacao_id) = match key {
            PaymentIdKey::PagamentoId => (Some(request.payment_id), None),
            PaymentIdKey::TransacaoId => (None, Some(request.payment_id)),
        };

        Self {
            status: "success",
            pagamento_id,
            transacao_id,
            valor: request.price.as_f64(),
            chave_pix: request.pix_key,
            qrcode_texto: request.qr_payload,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct ConfirmPaymentBody {
    pub pagamento_id: Option<String>,
}

impl ConfirmPaymentBody {
    /// An empty body means no id. Anything else must be valid JSON.
    fn parse(body: &[u8]) -> Result<Self, PalpiteError> {
        if body.iter().all(u8::is_ascii_whitespace) {
            return Ok(Self::default());
        }
        Ok(serde_json::from_slice(body)?)
    }
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health))
        .route("/gerar-palpite", web::post().to(generate_numbers))
        .route("/gerar-palpite-premium", web::post().to(generate_numbers))
        .route("/iniciar-pagamento", web::post().to(start_payment))
        .route("/solicitar-pagamento", web::post().to(request_payment))
        .route("/confirmar-pagamento", web::post().to(confirm_payment))
        .route("/limpar-sessao", web::post().to(clear_session))
        .route("/{path:.*}", web::get().to(ui::index));
}

async fn health() -> HttpResponse {
    HttpResponse::Ok().json(json!({ "status": "healthy" }))
}

async fn generate_numbers(
    req: HttpRequest,
    state: Data<AppState>,
) -> Result<HttpResponse, ApiError> {
    let (session_id, mut session) = state.sessions.checkout(&req);
    let issued = state.issuance.generate(&mut session).await?;
    state.sessions.store(&session_id, session);

    Ok(HttpResponse::Ok()
        .cookie(session_cookie(&session_id))
        .json(NumbersResponse::from(issued)))
}

async fn start_payment(req: HttpRequest, state: Data<AppState>) -> Result<HttpResponse, ApiError> {
    payment(req, state, PaymentIdKey::PagamentoId).await
}

async fn request_payment(
    req: HttpRequest,
    state: Data<AppState>,
) -> Result<HttpResponse, ApiError> {
    payment(req, state, PaymentIdKey::TransacaoId).await
}

async fn payment(
    req: HttpRequest,
    state: Data<AppState>,
    key: PaymentIdKey,
) -> Result<HttpResponse, ApiError> {
    let (session_id, mut session) = state.sessions.checkout(&req);
    let request = state.issuance.request_payment(&mut session).await?;
    state.sessions.store(&session_id, session);

    Ok(HttpResponse::Ok()
        .cookie(session_cookie(&session_id))
        .json(PaymentResponse::new(request, key)))
}

async fn confirm_payment(
    req: HttpRequest,
    body: Bytes,
    state: Data<AppState>,
) -> Result<HttpResponse, ApiError> {
    let body = ConfirmPaymentBody::parse(&body)?;
    let (session_id, mut session) = state.sessions.checkout(&req);
    let issued = state
        .issuance
        .confirm_payment(&mut session, body.pagamento_id.as_deref())
        .await?;
    state.sessions.store(&session_id, session);

    Ok(HttpResponse::Ok()
        .cookie(session_cookie(&session_id))
        .json(NumbersResponse::from(issued)))
}

async fn clear_session(req: HttpRequest, state: Data<AppState>) -> HttpResponse {
    let (session_id, mut session) = state.sessions.checkout(&req);
    state.issuance.clear(&mut session);
    state.sessions.remove(&session_id);

    HttpResponse::Ok().json(json!({ "status": "success" }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_confirm_body_parsing() {
        assert!(ConfirmPaymentBody::parse(b"").unwrap().pagamento_id.is_none());
        assert!(ConfirmPaymentBody::parse(b"  \n").unwrap().pagamento_id.is_none());
        assert!(ConfirmPaymentBody::parse(b"{}").unwrap().pagamento_id.is_none());
        assert_eq!(
            ConfirmPaymentBody::parse(br#"{"pagamento_id": "p1"}"#)
                .unwrap()
                .pagamento_id
                .as_deref(),
            Some("p1")
        );
        assert!(ConfirmPaymentBody::parse(b"{not json").is_err());
    }
}
