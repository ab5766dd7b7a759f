use actix_web::{web, HttpResponse};
use serde_json::{Map, Value};

use crate::database::{DeleteOutcome, InsertOutcome, Store};
use crate::models::EmailQuery;
use crate::services::cart_service;
use crate::services::token_service::Claims;
use crate::utils::json::{document_to_json, documents_to_json};
use crate::utils::AppError;

#[utoipa::path(
    post,
    path = "/add-to-cart",
    tag = "Cart",
    responses(
        (status = 200, description = "Cart row stored", body = InsertOutcome),
        (status = 400, description = "classId or userMail missing, or classId malformed"),
        (status = 404, description = "Referenced class does not exist")
    ),
    security(("bearer_auth" = []))
)]
pub async fn add_to_cart(
    store: web::Data<dyn Store>,
    body: web::Json<Map<String, Value>>,
) -> Result<HttpResponse, AppError> {
    log::info!("🛒 POST /add-to-cart");
    let outcome = cart_service::add_to_cart(store.get_ref(), body.into_inner()).await?;
    Ok(HttpResponse::Ok().json(outcome))
}

/// The cart row for class `id`. The owner comes from `?email=`, or from the
/// token when the query omits it.
#[utoipa::path(
    get,
    path = "/cart-item/{id}",
    tag = "Cart",
    params(("id" = String, Path, description = "Class id"), EmailQuery),
    responses(
        (status = 200, description = "`{_id, classId}` of the row, or null"),
        (status = 400, description = "No email in the query or the token")
    ),
    security(("bearer_auth" = []))
)]
pub async fn cart_item(
    store: web::Data<dyn Store>,
    claims: web::ReqData<Claims>,
    path: web::Path<String>,
    query: web::Query<EmailQuery>,
) -> Result<HttpResponse, AppError> {
    let email = query
        .email
        .as_deref()
        .filter(|e| !e.is_empty())
        .or_else(|| claims.email())
        .ok_or_else(|| AppError::InvalidRequest("email is required".to_string()))?;

    let item = cart_service::find_cart_item(store.get_ref(), &path, email).await?;
    Ok(HttpResponse::Ok().json(item.map(document_to_json)))
}

#[utoipa::path(
    get,
    path = "/cart/{email}",
    tag = "Cart",
    params(("email" = String, Path, description = "Cart owner")),
    responses((status = 200, description = "Classes in the user's cart")),
    security(("bearer_auth" = []))
)]
pub async fn cart_classes(store: web::Data<dyn Store>, path: web::Path<String>) -> Result<HttpResponse, AppError> {
    let classes = cart_service::cart_classes(store.get_ref(), &path).await?;
    Ok(HttpResponse::Ok().json(documents_to_json(classes)))
}

#[utoipa::path(
    delete,
    path = "/delete-cart-item/{id}",
    tag = "Cart",
    params(("id" = String, Path, description = "Class id of the row to remove")),
    responses((status = 200, description = "Delete result", body = DeleteOutcome)),
    security(("bearer_auth" = []))
)]
pub async fn delete_cart_item(
    store: web::Data<dyn Store>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    log::info!("🗑️ DELETE /delete-cart-item/{}", path);
    let outcome = cart_service::delete_cart_item(store.get_ref(), &path).await?;
    Ok(HttpResponse::Ok().json(outcome))
}
