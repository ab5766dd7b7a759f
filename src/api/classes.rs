use actix_web::{web, HttpResponse};
use serde_json::{Map, Value};

use crate::database::{InsertOutcome, Store, UpdateOutcome};
use crate::models::{ChangeStatusRequest, UpdateClassRequest};
use crate::services::class_service;
use crate::services::token_service::Claims;
use crate::utils::json::{document_to_json, documents_to_json};
use crate::utils::AppError;

#[utoipa::path(
    post,
    path = "/new-class",
    tag = "Classes",
    responses(
        (status = 200, description = "Class stored as pending", body = InsertOutcome),
        (status = 400, description = "availableSeats is not a non-negative integer"),
        (status = 401, description = "Missing token or caller is not an instructor")
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_class(
    store: web::Data<dyn Store>,
    claims: web::ReqData<Claims>,
    body: web::Json<Map<String, Value>>,
) -> Result<HttpResponse, AppError> {
    log::info!("📚 POST /new-class - instructor: {}", claims.email().unwrap_or("N/A"));
    let outcome = class_service::create_class(store.get_ref(), claims.email(), body.into_inner()).await?;
    Ok(HttpResponse::Ok().json(outcome))
}

/// Every class regardless of status.
#[utoipa::path(
    get,
    path = "/classes",
    tag = "Classes",
    responses((status = 200, description = "All classes"))
)]
pub async fn list_classes(store: web::Data<dyn Store>) -> Result<HttpResponse, AppError> {
    let classes = class_service::list_classes(store.get_ref()).await?;
    Ok(HttpResponse::Ok().json(documents_to_json(classes)))
}

#[utoipa::path(
    get,
    path = "/classes-manage",
    tag = "Classes",
    responses((status = 200, description = "All classes, for the admin review screen"))
)]
pub async fn manage_classes(store: web::Data<dyn Store>) -> Result<HttpResponse, AppError> {
    let classes = class_service::list_classes(store.get_ref()).await?;
    Ok(HttpResponse::Ok().json(documents_to_json(classes)))
}

#[utoipa::path(
    get,
    path = "/classes/{email}",
    tag = "Classes",
    params(("email" = String, Path, description = "Instructor email")),
    responses(
        (status = 200, description = "Classes taught by the instructor"),
        (status = 401, description = "Missing token or caller is not an instructor")
    ),
    security(("bearer_auth" = []))
)]
pub async fn classes_by_instructor(
    store: web::Data<dyn Store>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let classes = class_service::classes_by_instructor(store.get_ref(), &path).await?;
    Ok(HttpResponse::Ok().json(documents_to_json(classes)))
}

#[utoipa::path(
    patch,
    path = "/change-status/{id}",
    tag = "Classes",
    params(("id" = String, Path, description = "Class ObjectId")),
    request_body = ChangeStatusRequest,
    responses(
        (status = 200, description = "Update result", body = UpdateOutcome),
        (status = 400, description = "Malformed id or unknown status"),
        (status = 401, description = "Missing token or caller is not an admin")
    ),
    security(("bearer_auth" = []))
)]
pub async fn change_status(
    store: web::Data<dyn Store>,
    path: web::Path<String>,
    body: web::Json<ChangeStatusRequest>,
) -> Result<HttpResponse, AppError> {
    let request = body.into_inner();
    log::info!("🔄 PATCH /change-status/{} -> {}", path, request.status.as_str());
    let outcome = class_service::change_status(store.get_ref(), &path, request).await?;
    Ok(HttpResponse::Ok().json(outcome))
}

#[utoipa::path(
    get,
    path = "/approved-classes",
    tag = "Classes",
    responses((status = 200, description = "Classes approved for sale"))
)]
pub async fn approved_classes(store: web::Data<dyn Store>) -> Result<HttpResponse, AppError> {
    let classes = class_service::approved_classes(store.get_ref()).await?;
    Ok(HttpResponse::Ok().json(documents_to_json(classes)))
}

#[utoipa::path(
    get,
    path = "/class/{id}",
    tag = "Classes",
    params(("id" = String, Path, description = "Class ObjectId")),
    responses(
        (status = 200, description = "Class record"),
        (status = 400, description = "Malformed id"),
        (status = 404, description = "No such class")
    )
)]
pub async fn get_class(store: web::Data<dyn Store>, path: web::Path<String>) -> Result<HttpResponse, AppError> {
    let class = class_service::get_class(store.get_ref(), &path).await?;
    Ok(HttpResponse::Ok().json(document_to_json(class)))
}

#[utoipa::path(
    put,
    path = "/update-class/{id}",
    tag = "Classes",
    params(("id" = String, Path, description = "Class ObjectId")),
    request_body = UpdateClassRequest,
    responses(
        (status = 200, description = "Update result; the class returns to pending", body = UpdateOutcome),
        (status = 400, description = "Malformed id or invalid availableSeats"),
        (status = 401, description = "Missing token or caller is not an instructor")
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_class(
    store: web::Data<dyn Store>,
    path: web::Path<String>,
    body: web::Json<UpdateClassRequest>,
) -> Result<HttpResponse, AppError> {
    log::info!("✏️ PUT /update-class/{}", path);
    let outcome = class_service::update_class(store.get_ref(), &path, body.into_inner()).await?;
    Ok(HttpResponse::Ok().json(outcome))
}
