use async_trait::async_trait;
use mongodb::bson::{Bson, Document};
use serde::Serialize;
use std::fmt;

use crate::utils::json::bson_to_json;

/// The six collections the marketplace keeps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    Users,
    Classes,
    Cart,
    Payments,
    Enrolled,
    Applied,
}

impl Collection {
    pub const ALL: [Collection; 6] = [
        Collection::Users,
        Collection::Classes,
        Collection::Cart,
        Collection::Payments,
        Collection::Enrolled,
        Collection::Applied,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Collection::Users => "users",
            Collection::Classes => "classes",
            Collection::Cart => "cart",
            Collection::Payments => "payments",
            Collection::Enrolled => "enrolled",
            Collection::Applied => "applied",
        }
    }

    /// Field carrying a unique index, if any.
    pub fn unique_key(&self) -> Option<&'static str> {
        match self {
            Collection::Users => Some("email"),
            _ => None,
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone)]
pub enum StoreError {
    Duplicate(String),
    Serialization(String),
    Unavailable(String),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::Duplicate(msg) => write!(f, "Duplicate key: {}", msg),
            StoreError::Serialization(msg) => write!(f, "Serialization error: {}", msg),
            StoreError::Unavailable(msg) => write!(f, "Store unavailable: {}", msg),
        }
    }
}

impl std::error::Error for StoreError {}

#[derive(Debug, Clone, Default)]
pub struct QueryOptions {
    pub sort: Option<Document>,
    pub limit: Option<i64>,
    pub projection: Option<Document>,
}

impl QueryOptions {
    pub fn sorted(sort: Document) -> Self {
        Self { sort: Some(sort), ..Default::default() }
    }

    pub fn limit(mut self, limit: i64) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn projection(mut self, projection: Document) -> Self {
        self.projection = Some(projection);
        self
    }
}

fn serialize_id<S: serde::Serializer>(id: &Option<Bson>, s: S) -> Result<S::Ok, S::Error> {
    match id {
        Some(value) => bson_to_json(value.clone()).serialize(s),
        None => s.serialize_none(),
    }
}

fn serialize_required_id<S: serde::Serializer>(id: &Bson, s: S) -> Result<S::Ok, S::Error> {
    bson_to_json(id.clone()).serialize(s)
}

#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InsertOutcome {
    pub acknowledged: bool,
    #[serde(serialize_with = "serialize_required_id")]
    #[schema(value_type = String)]
    pub inserted_id: Bson,
}

#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateOutcome {
    pub acknowledged: bool,
    pub matched_count: u64,
    pub modified_count: u64,
    pub upserted_count: u64,
    #[serde(serialize_with = "serialize_id")]
    #[schema(value_type = Option<String>)]
    pub upserted_id: Option<Bson>,
}

#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DeleteOutcome {
    pub acknowledged: bool,
    pub deleted_count: u64,
}

/// Document store the route layer talks to. Handlers receive it as
/// `web::Data<dyn Store>`; filters use the MongoDB query dialect.
#[async_trait]
pub trait Store: Send + Sync {
    async fn insert_one(&self, collection: Collection, document: Document) -> Result<InsertOutcome, StoreError>;

    async fn find_one(
        &self,
        collection: Collection,
        filter: Document,
        projection: Option<Document>,
    ) -> Result<Option<Document>, StoreError>;

    async fn find(
        &self,
        collection: Collection,
        filter: Document,
        options: QueryOptions,
    ) -> Result<Vec<Document>, StoreError>;

    async fn count(&self, collection: Collection, filter: Document) -> Result<u64, StoreError>;

    /// `$set`s `fields` on the first match, creating the record when nothing matches.
    async fn upsert_fields(
        &self,
        collection: Collection,
        filter: Document,
        fields: Document,
    ) -> Result<UpdateOutcome, StoreError>;

    async fn delete_one(&self, collection: Collection, filter: Document) -> Result<DeleteOutcome, StoreError>;

    async fn ping(&self) -> Result<(), StoreError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use mongodb::bson::oid::ObjectId;

    #[test]
    fn test_outcomes_use_driver_field_names() {
        let oid = ObjectId::new();
        let update = UpdateOutcome {
            acknowledged: true,
            matched_count: 0,
            modified_count: 0,
            upserted_count: 1,
            upserted_id: Some(Bson::ObjectId(oid)),
        };
        let json = serde_json::to_value(&update).unwrap();
        assert_eq!(json["upsertedId"], oid.to_hex());
        assert_eq!(json["matchedCount"], 0);

        let delete = serde_json::to_value(DeleteOutcome { acknowledged: true, deleted_count: 2 }).unwrap();
        assert_eq!(delete, serde_json::json!({ "acknowledged": true, "deletedCount": 2 }));
    }
}
