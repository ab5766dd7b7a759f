use actix_web::{web, HttpResponse, Responder};
use serde::{Deserialize, Serialize};

use crate::database::Store;

#[derive(Serialize, Deserialize, utoipa::ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
    pub version: String,
    pub store: String,
    pub timestamp: i64,
}

pub async fn root() -> impl Responder {
    HttpResponse::Ok().content_type("text/plain").body("Hello World")
}

#[utoipa::path(
    get,
    path = "/health",
    tag = "Health",
    responses(
        (status = 200, description = "Service and store are healthy", body = HealthResponse),
        (status = 503, description = "Store unreachable", body = HealthResponse)
    )
)]
pub async fn health_check(store: web::Data<dyn Store>) -> impl Responder {
    let (status, store_status) = match store.ping().await {
        Ok(()) => ("healthy", "up".to_string()),
        Err(e) => {
            log::error!("❌ Health check: {}", e);
            ("degraded", "down".to_string())
        }
    };

    let body = HealthResponse {
        status: status.to_string(),
        service: "course-marketplace".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        store: store_status,
        timestamp: chrono::Utc::now().timestamp(),
    };

    if status == "healthy" {
        HttpResponse::Ok().json(body)
    } else {
        HttpResponse::ServiceUnavailable().json(body)
    }
}
