use mongodb::bson::{doc, Bson, Document};
use serde_json::{Map, Value};

use crate::database::{Collection, InsertOutcome, QueryOptions, Store, UpdateOutcome};
use crate::models::{parse_seats, ChangeStatusRequest, ClassStatus, UpdateClassRequest};
use crate::utils::json::{body_to_document, value_to_bson};
use crate::utils::{parse_object_id, AppError};

/// Inserts a class posted by an instructor. New classes always start pending
/// with no enrollments and belong to the caller; those fields in the body are
/// overwritten.
pub async fn create_class(
    store: &dyn Store,
    caller_email: Option<&str>,
    mut body: Map<String, Value>,
) -> Result<InsertOutcome, AppError> {
    if let Some(seats) = body.get("availableSeats") {
        let seats = parse_seats(seats).map_err(AppError::InvalidRequest)?;
        body.insert("availableSeats".to_string(), Value::from(seats));
    }

    body.insert("status".to_string(), Value::from(ClassStatus::Pending.as_str()));
    body.insert("totalEnrolled".to_string(), Value::from(0));
    match caller_email {
        Some(email) => body.insert("instructorEmail".to_string(), Value::from(email)),
        None => body.remove("instructorEmail"),
    };

    let outcome = store.insert_one(Collection::Classes, body_to_document(body)?).await?;
    log::info!("✅ Class created by {}", caller_email.unwrap_or("unknown"));
    Ok(outcome)
}

pub async fn list_classes(store: &dyn Store) -> Result<Vec<Document>, AppError> {
    Ok(store.find(Collection::Classes, doc! {}, QueryOptions::default()).await?)
}

pub async fn classes_by_instructor(store: &dyn Store, email: &str) -> Result<Vec<Document>, AppError> {
    Ok(store
        .find(Collection::Classes, doc! { "instructorEmail": email }, QueryOptions::default())
        .await?)
}

pub async fn approved_classes(store: &dyn Store) -> Result<Vec<Document>, AppError> {
    Ok(store
        .find(
            Collection::Classes,
            doc! { "status": ClassStatus::Approved.as_str() },
            QueryOptions::default(),
        )
        .await?)
}

pub async fn get_class(store: &dyn Store, id: &str) -> Result<Document, AppError> {
    let oid = parse_object_id(id)?;
    store
        .find_one(Collection::Classes, doc! { "_id": oid }, None)
        .await?
        .ok_or_else(|| AppError::NotFound("Class not found".to_string()))
}

pub async fn change_status(
    store: &dyn Store,
    id: &str,
    request: ChangeStatusRequest,
) -> Result<UpdateOutcome, AppError> {
    let oid = parse_object_id(id)?;
    let fields = doc! {
        "status": request.status.as_str(),
        "reason": request.reason,
    };
    Ok(store.upsert_fields(Collection::Classes, doc! { "_id": oid }, fields).await?)
}

/// Replaces the editable fields of a class and sends it back to review.
pub async fn update_class(
    store: &dyn Store,
    id: &str,
    request: UpdateClassRequest,
) -> Result<UpdateOutcome, AppError> {
    let oid = parse_object_id(id)?;
    let seats = parse_seats(&request.available_seats).map_err(AppError::InvalidRequest)?;
    let price = match request.price {
        Some(value) => value_to_bson(&value)?,
        None => Bson::Null,
    };

    let fields = doc! {
        "name": request.name,
        "description": request.description,
        "price": price,
        "availableSeats": seats,
        "videoLink": request.video_link,
        "status": ClassStatus::Pending.as_str(),
    };
    Ok(store.upsert_fields(Collection::Classes, doc! { "_id": oid }, fields).await?)
}
