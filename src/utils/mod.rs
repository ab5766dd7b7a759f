pub mod error;
pub mod json;

pub use error::*;

use mongodb::bson::oid::ObjectId;

/// Parses a path id, rejecting anything that is not a 24-char hex ObjectId.
pub fn parse_object_id(id: &str) -> Result<ObjectId, AppError> {
    ObjectId::parse_str(id).map_err(|_| AppError::InvalidRequest(format!("Invalid id: {}", id)))
}
