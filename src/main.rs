mod api;
mod config;
mod database;
mod middleware;
mod models;
mod services;
mod utils;

#[cfg(test)]
mod test_support;

use actix_cors::Cors;
use actix_web::{http::header, middleware::Logger, web, App, HttpServer};
use dotenv::dotenv;
use std::io;
use std::sync::Arc;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use config::{AppConfig, StoreBackend};
use database::{MemoryStore, Store};
use services::token_service::TokenService;

fn startup_error<E: std::fmt::Display>(err: E) -> io::Error {
    log::error!("❌ {}", err);
    io::Error::new(io::ErrorKind::Other, err.to_string())
}

#[actix_web::main]
async fn main() -> io::Result<()> {
    dotenv().ok();
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let config = AppConfig::from_env().map_err(startup_error)?;
    log::info!("🚀 Starting Course Marketplace...");

    let store: Arc<dyn Store> = match config.store_backend {
        StoreBackend::MongoDB => {
            let url = config
                .database_url
                .as_deref()
                .ok_or_else(|| startup_error("DATABASE_URL must be set"))?;
            let db = database::MongoDB::new(url).await.map_err(startup_error)?;
            log::info!("✅ MongoDB connected successfully");
            Arc::new(db)
        }
        StoreBackend::Memory => {
            log::warn!("⚠️  Using the in-memory store; data is lost on restart");
            Arc::new(MemoryStore::new())
        }
    };
    let store_data: web::Data<dyn Store> = web::Data::from(store);
    let ttl = chrono::Duration::try_hours(config.token_ttl_hours)
        .ok_or_else(|| startup_error("TOKEN_TTL_HOURS is out of range"))?;
    let tokens = web::Data::new(TokenService::new(&config.access_secret, ttl));

    let (host, port) = (config.host.clone(), config.port);
    log::info!("🌐 Server starting on {}:{}", host, port);
    log::info!("📚 Swagger UI available at: http://{}:{}/swagger-ui/", host, port);

    let openapi = api::swagger::ApiDoc::openapi();
    let origins = config.allowed_origins.clone();

    HttpServer::new(move || {
        let cors = origins
            .iter()
            .fold(Cors::default(), |cors, origin| cors.allowed_origin(origin))
            .allowed_methods(vec!["GET", "POST", "PUT", "PATCH", "DELETE", "OPTIONS"])
            .allowed_headers(vec![header::AUTHORIZATION, header::CONTENT_TYPE, header::ACCEPT])
            .expose_headers(vec![header::CONTENT_TYPE])
            .supports_credentials()
            .max_age(3600);

        App::new()
            .app_data(store_data.clone())
            .app_data(tokens.clone())
            .wrap(cors)
            .wrap(Logger::default())
            .service(SwaggerUi::new("/swagger-ui/{_:.*}").url("/api-docs/openapi.json", openapi.clone()))
            .configure(api::configure)
    })
    .bind((host.as_str(), port))?
    .run()
    .await
}
