use actix_web::{
    body::EitherBody,
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    web, Error, HttpMessage,
};
use futures::future::LocalBoxFuture;
use std::future::{ready, Ready};
use std::rc::Rc;

use crate::database::Store;
use crate::models::Role;
use crate::services::token_service::Claims;
use crate::services::user_service;
use crate::utils::AppError;

/// Role gate. Must be wrapped inside `AuthMiddleware` so the claims are
/// already on the request.
pub struct RoleGate {
    role: Role,
}

impl RoleGate {
    pub fn admin() -> Self {
        Self { role: Role::Admin }
    }

    pub fn instructor() -> Self {
        Self { role: Role::Instructor }
    }
}

impl<S, B> Transform<S, ServiceRequest> for RoleGate
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = RoleGateService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RoleGateService {
            service: Rc::new(service),
            role: self.role,
        }))
    }
}

pub struct RoleGateService<S> {
    service: Rc<S>,
    role: Role,
}

impl<S, B> Service<ServiceRequest> for RoleGateService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);
        let role = self.role;

        Box::pin(async move {
            match authorize(&req, role).await {
                Ok(()) => {
                    let res = service.call(req).await?;
                    Ok(res.map_into_left_body())
                }
                Err(err) => Ok(req.error_response(err).map_into_right_body()),
            }
        })
    }
}

async fn authorize(req: &ServiceRequest, role: Role) -> Result<(), AppError> {
    let claims = req
        .extensions()
        .get::<Claims>()
        .cloned()
        .ok_or(AppError::Unauthenticated)?;
    let store = req
        .app_data::<web::Data<dyn Store>>()
        .cloned()
        .ok_or_else(|| AppError::Internal("store not configured".to_string()))?;

    user_service::require_role(store.get_ref(), &claims, role).await?;
    Ok(())
}
