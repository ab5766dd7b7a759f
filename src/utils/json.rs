//! Conversions between request/response JSON and stored BSON documents.
//!
//! Responses render ObjectIds as plain hex strings and dates as RFC 3339,
//! which is what the web client consumes.

use mongodb::bson::{self, Bson, Document};
use serde_json::{Map, Value};

use crate::utils::error::AppError;

pub fn bson_to_json(value: Bson) -> Value {
    match value {
        Bson::ObjectId(oid) => Value::String(oid.to_hex()),
        Bson::String(s) => Value::String(s),
        Bson::Boolean(b) => Value::Bool(b),
        Bson::Null | Bson::Undefined => Value::Null,
        Bson::Int32(n) => Value::from(n),
        Bson::Int64(n) => Value::from(n),
        Bson::Double(f) => serde_json::Number::from_f64(f)
            .map(Value::Number)
            .unwrap_or(Value::Null),
        Bson::DateTime(dt) => dt
            .try_to_rfc3339_string()
            .map(Value::String)
            .unwrap_or(Value::Null),
        Bson::Array(items) => Value::Array(items.into_iter().map(bson_to_json).collect()),
        Bson::Document(doc) => document_to_json(doc),
        other => other.into_relaxed_extjson(),
    }
}

pub fn document_to_json(doc: Document) -> Value {
    let map: Map<String, Value> = doc
        .into_iter()
        .map(|(key, value)| (key, bson_to_json(value)))
        .collect();
    Value::Object(map)
}

pub fn documents_to_json(docs: Vec<Document>) -> Value {
    Value::Array(docs.into_iter().map(document_to_json).collect())
}

/// Turns a posted JSON object into a document ready for insertion.
/// A client supplied `_id` is dropped; the store assigns one.
pub fn body_to_document(mut body: Map<String, Value>) -> Result<Document, AppError> {
    body.remove("_id");
    bson::to_document(&body)
        .map_err(|e| AppError::InvalidRequest(format!("Unsupported body value: {}", e)))
}

pub fn value_to_bson(value: &Value) -> Result<Bson, AppError> {
    bson::to_bson(value).map_err(|e| AppError::InvalidRequest(format!("Unsupported value: {}", e)))
}

/// Reads a numeric BSON value as an integer, accepting the three numeric
/// encodings documents end up with.
pub fn bson_as_i64(value: Option<&Bson>) -> Option<i64> {
    match value? {
        Bson::Int32(n) => Some(*n as i64),
        Bson::Int64(n) => Some(*n),
        Bson::Double(f) if f.is_finite() => Some(*f as i64),
        _ => None,
    }
}
