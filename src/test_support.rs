//! Shared fixtures for the HTTP tests: an in-memory store, a token service
//! and helpers that seed records and mint bearer headers.

use actix_web::web;
use async_trait::async_trait;
use chrono::Duration;
use mongodb::bson::{doc, Document};
use serde_json::{Map, Value};
use std::sync::Arc;

use crate::database::{
    Collection, DeleteOutcome, InsertOutcome, MemoryStore, QueryOptions, Store, StoreError, UpdateOutcome,
};
use crate::services::token_service::TokenService;

pub const TEST_SECRET: &str = "test-access-secret";

pub struct TestContext {
    pub store: Arc<MemoryStore>,
    pub tokens: web::Data<TokenService>,
}

impl TestContext {
    pub fn new() -> Self {
        Self {
            store: Arc::new(MemoryStore::new()),
            tokens: web::Data::new(TokenService::new(TEST_SECRET, Duration::hours(24))),
        }
    }

    pub fn store_data(&self) -> web::Data<dyn Store> {
        let store: Arc<dyn Store> = self.store.clone();
        web::Data::from(store)
    }

    pub fn token_for(&self, email: &str) -> String {
        let mut identity = Map::new();
        identity.insert("email".to_string(), Value::from(email));
        self.tokens.issue(identity).unwrap()
    }

    pub fn bearer(&self, email: &str) -> String {
        format!("Bearer {}", self.token_for(email))
    }

    /// Returns the new user's id as hex.
    pub async fn seed_user(&self, email: &str, role: &str) -> String {
        let outcome = self
            .store
            .insert_one(Collection::Users, doc! { "name": email, "email": email, "role": role })
            .await
            .unwrap();
        outcome.inserted_id.as_object_id().unwrap().to_hex()
    }

    /// Seeds a pending class and returns its id as hex.
    pub async fn seed_class(&self, name: &str, instructor_email: &str, total_enrolled: i64) -> String {
        let outcome = self
            .store
            .insert_one(
                Collection::Classes,
                doc! {
                    "name": name,
                    "instructorEmail": instructor_email,
                    "status": "pending",
                    "availableSeats": 10_i64,
                    "price": 20,
                    "totalEnrolled": total_enrolled,
                },
            )
            .await
            .unwrap();
        outcome.inserted_id.as_object_id().unwrap().to_hex()
    }
}

/// A store whose every call fails as if the database were unreachable.
pub struct DownStore;

impl DownStore {
    pub fn data() -> web::Data<dyn Store> {
        let store: Arc<dyn Store> = Arc::new(DownStore);
        web::Data::from(store)
    }

    fn down<T>() -> Result<T, StoreError> {
        Err(StoreError::Unavailable("connection refused".to_string()))
    }
}

#[async_trait]
impl Store for DownStore {
    async fn insert_one(&self, _: Collection, _: Document) -> Result<InsertOutcome, StoreError> {
        Self::down()
    }

    async fn find_one(&self, _: Collection, _: Document, _: Option<Document>) -> Result<Option<Document>, StoreError> {
        Self::down()
    }

    async fn find(&self, _: Collection, _: Document, _: QueryOptions) -> Result<Vec<Document>, StoreError> {
        Self::down()
    }

    async fn count(&self, _: Collection, _: Document) -> Result<u64, StoreError> {
        Self::down()
    }

    async fn upsert_fields(&self, _: Collection, _: Document, _: Document) -> Result<UpdateOutcome, StoreError> {
        Self::down()
    }

    async fn delete_one(&self, _: Collection, _: Document) -> Result<DeleteOutcome, StoreError> {
        Self::down()
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Self::down()
    }
}

/// Builds the full route table over a `TestContext`, optionally with a
/// different store.
macro_rules! test_app {
    ($ctx:expr) => {
        actix_web::test::init_service(
            actix_web::App::new()
                .app_data($ctx.store_data())
                .app_data($ctx.tokens.clone())
                .configure(crate::api::configure),
        )
        .await
    };
    ($ctx:expr, $store:expr) => {
        actix_web::test::init_service(
            actix_web::App::new()
                .app_data($store)
                .app_data($ctx.tokens.clone())
                .configure(crate::api::configure),
        )
        .await
    };
}

pub(crate) use test_app;
