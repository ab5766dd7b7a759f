use actix_web::{web, HttpResponse};
use serde::Serialize;
use serde_json::{Map, Value};

use crate::services::token_service::TokenService;
use crate::utils::AppError;

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct TokenResponse {
    pub token: String,
}

/// Signs whatever identity the client posts. The server does not check the
/// claims against stored credentials.
#[utoipa::path(
    post,
    path = "/api/set-token",
    tag = "Auth",
    responses(
        (status = 200, description = "Token issued for the posted claims (24h expiry)", body = TokenResponse),
        (status = 400, description = "Body is not a JSON object or carries a reserved claim")
    )
)]
pub async fn set_token(
    tokens: web::Data<TokenService>,
    claims: web::Json<Map<String, Value>>,
) -> Result<HttpResponse, AppError> {
    let email = claims
        .get("email")
        .and_then(Value::as_str)
        .unwrap_or("N/A")
        .to_string();
    log::info!("🔐 POST /api/set-token - email: {}", email);

    let token = tokens.issue(claims.into_inner())?;
    Ok(HttpResponse::Ok().json(TokenResponse { token }))
}
