use actix_web::{
    body::EitherBody,
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    http::header::AUTHORIZATION,
    web, Error, HttpMessage,
};
use futures::future::LocalBoxFuture;
use std::future::{ready, Ready};

use crate::services::token_service::TokenService;
use crate::utils::AppError;

pub use crate::services::token_service::Claims;

/// Identity gate. Verifies the bearer token and stores the decoded
/// `Claims` in request extensions for handlers and the role gates.
pub struct AuthMiddleware;

impl<S, B> Transform<S, ServiceRequest> for AuthMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = AuthMiddlewareService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AuthMiddlewareService { service }))
    }
}

pub struct AuthMiddlewareService<S> {
    service: S,
}

impl<S, B> Service<ServiceRequest> for AuthMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        match authenticate(&req) {
            Ok(claims) => {
                req.extensions_mut().insert(claims);
                let fut = self.service.call(req);
                Box::pin(async move {
                    let res = fut.await?;
                    Ok(res.map_into_left_body())
                })
            }
            Err(err) => {
                log::warn!("🔒 {} {} rejected: {}", req.method(), req.path(), err);
                let res = req.error_response(err).map_into_right_body();
                Box::pin(async move { Ok(res) })
            }
        }
    }
}

/// Header absent or blank is a missing credential (401); anything else
/// that fails to verify is forbidden (403).
fn authenticate(req: &ServiceRequest) -> Result<Claims, AppError> {
    let header = req
        .headers()
        .get(AUTHORIZATION)
        .ok_or(AppError::Unauthenticated)?;
    let value = header.to_str().map_err(|_| AppError::Forbidden)?;
    if value.trim().is_empty() {
        return Err(AppError::Unauthenticated);
    }

    let token = value
        .split(' ')
        .nth(1)
        .filter(|t| !t.is_empty())
        .ok_or(AppError::Forbidden)?;

    let tokens = req
        .app_data::<web::Data<TokenService>>()
        .ok_or_else(|| AppError::Internal("token service not configured".to_string()))?;

    tokens.verify(token).map_err(|e| {
        log::debug!("token verification failed: {}", e);
        AppError::Forbidden
    })
}
