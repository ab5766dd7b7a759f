use mongodb::bson::{doc, Document};
use serde_json::{Map, Value};

use crate::database::{Collection, InsertOutcome, Store};
use crate::utils::json::body_to_document;
use crate::utils::AppError;

/// Stores an instructor application as posted.
pub async fn submit_application(store: &dyn Store, body: Map<String, Value>) -> Result<InsertOutcome, AppError> {
    let applicant = body
        .get("email")
        .and_then(Value::as_str)
        .unwrap_or("unknown")
        .to_string();
    let outcome = store.insert_one(Collection::Applied, body_to_document(body)?).await?;
    log::info!("📝 Instructor application received from {}", applicant);
    Ok(outcome)
}

pub async fn find_application(store: &dyn Store, email: &str) -> Result<Option<Document>, AppError> {
    Ok(store.find_one(Collection::Applied, doc! { "email": email }, None).await?)
}
