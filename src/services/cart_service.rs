use mongodb::bson::{doc, oid::ObjectId, Bson, Document};
use serde_json::{Map, Value};

use crate::database::{Collection, DeleteOutcome, InsertOutcome, QueryOptions, Store};
use crate::utils::json::body_to_document;
use crate::utils::{parse_object_id, AppError};

fn required_str<'a>(body: &'a Map<String, Value>, field: &str) -> Result<&'a str, AppError> {
    body.get(field)
        .and_then(Value::as_str)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| AppError::InvalidRequest(format!("{} is required", field)))
}

/// Adds a cart row. Rows are not deduplicated: adding the same class twice
/// stores two rows.
pub async fn add_to_cart(store: &dyn Store, body: Map<String, Value>) -> Result<InsertOutcome, AppError> {
    let class_id = required_str(&body, "classId")?;
    let user_mail = required_str(&body, "userMail")?.to_string();
    let oid = parse_object_id(class_id)?;

    if store.count(Collection::Classes, doc! { "_id": oid }).await? == 0 {
        return Err(AppError::NotFound(format!("Class {} not found", class_id)));
    }

    let outcome = store.insert_one(Collection::Cart, body_to_document(body)?).await?;
    log::info!("🛒 Cart item added for {}", user_mail);
    Ok(outcome)
}

/// The caller's cart row for one class, projected to its class id.
pub async fn find_cart_item(store: &dyn Store, class_id: &str, email: &str) -> Result<Option<Document>, AppError> {
    Ok(store
        .find_one(
            Collection::Cart,
            doc! { "classId": class_id, "userMail": email },
            Some(doc! { "classId": 1 }),
        )
        .await?)
}

/// Classes referenced by the user's cart rows. Rows holding an id that is
/// not an ObjectId are skipped.
pub async fn cart_classes(store: &dyn Store, email: &str) -> Result<Vec<Document>, AppError> {
    let rows = store
        .find(
            Collection::Cart,
            doc! { "userMail": email },
            QueryOptions::default().projection(doc! { "classId": 1 }),
        )
        .await?;

    let class_ids: Vec<Bson> = rows
        .iter()
        .filter_map(|row| row.get_str("classId").ok())
        .filter_map(|id| match ObjectId::parse_str(id) {
            Ok(oid) => Some(Bson::ObjectId(oid)),
            Err(_) => {
                log::warn!("⚠️  Skipping cart row with invalid classId {} for {}", id, email);
                None
            }
        })
        .collect();

    if class_ids.is_empty() {
        return Ok(Vec::new());
    }

    Ok(store
        .find(Collection::Classes, doc! { "_id": { "$in": class_ids } }, QueryOptions::default())
        .await?)
}

pub async fn delete_cart_item(store: &dyn Store, class_id: &str) -> Result<DeleteOutcome, AppError> {
    Ok(store.delete_one(Collection::Cart, doc! { "classId": class_id }).await?)
}
