use crate::AppState;
use actix_web::web::Data;
use actix_web::HttpResponse;

const SHELL: &str = include_str!("../assets/index.html");

pub fn render_shell(price: &str) -> String {
    SHELL.replace("{{preco}}", price)
}

/// Same page for `/` and every unknown GET path
pub async fn index(state: Data<AppState>) -> HttpResponse {
    let price = state.issuance.config().price.to_string();
    HttpResponse::Ok()
        .content_type("text/html; charset=utf-8")
        .body(render_shell(&price))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shell_renders_price() {
        let html = render_shell("3.99");
        assert!(html.contains("R$ 3.99"));
        assert!(!html.contains("{{preco}}"));
    }
}
