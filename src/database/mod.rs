pub mod memory;
pub mod store;

pub use memory::MemoryStore;
pub use store::*;

use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::bson::{doc, Document};
use mongodb::error::{ErrorKind, WriteFailure};
use mongodb::options::IndexOptions;
use mongodb::{Client, Database, IndexModel};

const DEFAULT_DB_NAME: &str = "course-marketplace";
const DUPLICATE_KEY_CODE: i32 = 11000;

#[derive(Clone)]
pub struct MongoDB {
    db: Database,
}

impl MongoDB {
    pub async fn new(uri: &str) -> Result<Self, StoreError> {
        let mut client_options = mongodb::options::ClientOptions::parse(uri)
            .await
            .map_err(to_store_error)?;

        // Connection pool
        client_options.max_pool_size = Some(20);
        client_options.min_pool_size = Some(5);
        client_options.max_idle_time = Some(std::time::Duration::from_secs(300));

        // Fail fast when the cluster is unreachable
        client_options.connect_timeout = Some(std::time::Duration::from_secs(5));
        client_options.server_selection_timeout = Some(std::time::Duration::from_secs(5));

        let client = Client::with_options(client_options).map_err(to_store_error)?;
        let db = client.database(&database_name(uri));

        let mongodb = Self { db };
        mongodb.ping().await?;
        mongodb.ensure_indexes().await?;

        Ok(mongodb)
    }

    /// Creates the indexes the route filters rely on.
    async fn ensure_indexes(&self) -> Result<(), StoreError> {
        log::info!("🔧 Creating database indexes...");

        let users_email = IndexModel::builder()
            .keys(doc! { "email": 1 })
            .options(IndexOptions::builder().unique(true).build())
            .build();

        match self.documents(Collection::Users).create_index(users_email).await {
            Ok(_) => log::info!("   ✅ Index created: users(email) unique"),
            Err(e) => log::warn!("   ⚠️  users(email) unique index not created: {}", e),
        }

        let plain = [
            (Collection::Classes, "status"),
            (Collection::Classes, "instructorEmail"),
            (Collection::Cart, "userMail"),
            (Collection::Enrolled, "userEmail"),
            (Collection::Applied, "email"),
        ];

        for (collection, field) in plain {
            let mut keys = Document::new();
            keys.insert(field, 1);
            let index = IndexModel::builder().keys(keys).build();
            match self.documents(collection).create_index(index).await {
                Ok(_) => log::info!("   ✅ Index created: {}({})", collection, field),
                Err(e) => log::debug!("   ℹ️  Index already exists: {}", e),
            }
        }

        log::info!("✅ Database indexes ready");

        Ok(())
    }

    fn documents(&self, collection: Collection) -> mongodb::Collection<Document> {
        self.db.collection(collection.name())
    }
}

/// Database name from the URI path, e.g. `mongodb://host/marketplace?retryWrites=true`.
fn database_name(uri: &str) -> String {
    let without_scheme = uri.split_once("://").map(|(_, rest)| rest).unwrap_or(uri);
    without_scheme
        .split_once('/')
        .map(|(_, path)| path.split('?').next().unwrap_or_default())
        .filter(|name| !name.is_empty())
        .unwrap_or(DEFAULT_DB_NAME)
        .to_string()
}

fn to_store_error(err: mongodb::error::Error) -> StoreError {
    if let ErrorKind::Write(WriteFailure::WriteError(ref write_error)) = *err.kind {
        if write_error.code == DUPLICATE_KEY_CODE {
            return StoreError::Duplicate(write_error.message.clone());
        }
    }
    StoreError::Unavailable(err.to_string())
}

#[async_trait]
impl Store for MongoDB {
    async fn insert_one(&self, collection: Collection, document: Document) -> Result<InsertOutcome, StoreError> {
        let result = self
            .documents(collection)
            .insert_one(document)
            .await
            .map_err(to_store_error)?;
        Ok(InsertOutcome { acknowledged: true, inserted_id: result.inserted_id })
    }

    async fn find_one(
        &self,
        collection: Collection,
        filter: Document,
        projection: Option<Document>,
    ) -> Result<Option<Document>, StoreError> {
        let documents = self.documents(collection);
        let mut action = documents.find_one(filter);
        if let Some(projection) = projection {
            action = action.projection(projection);
        }
        action.await.map_err(to_store_error)
    }

    async fn find(
        &self,
        collection: Collection,
        filter: Document,
        options: QueryOptions,
    ) -> Result<Vec<Document>, StoreError> {
        let documents = self.documents(collection);
        let mut action = documents.find(filter);
        if let Some(sort) = options.sort {
            action = action.sort(sort);
        }
        if let Some(limit) = options.limit {
            action = action.limit(limit);
        }
        if let Some(projection) = options.projection {
            action = action.projection(projection);
        }
        let cursor = action.await.map_err(to_store_error)?;
        cursor.try_collect().await.map_err(to_store_error)
    }

    async fn count(&self, collection: Collection, filter: Document) -> Result<u64, StoreError> {
        self.documents(collection)
            .count_documents(filter)
            .await
            .map_err(to_store_error)
    }

    async fn upsert_fields(
        &self,
        collection: Collection,
        filter: Document,
        fields: Document,
    ) -> Result<UpdateOutcome, StoreError> {
        let result = self
            .documents(collection)
            .update_one(filter, doc! { "$set": fields })
            .upsert(true)
            .await
            .map_err(to_store_error)?;

        Ok(UpdateOutcome {
            acknowledged: true,
            matched_count: result.matched_count,
            modified_count: result.modified_count,
            upserted_count: u64::from(result.upserted_id.is_some()),
            upserted_id: result.upserted_id,
        })
    }

    async fn delete_one(&self, collection: Collection, filter: Document) -> Result<DeleteOutcome, StoreError> {
        let result = self
            .documents(collection)
            .delete_one(filter)
            .await
            .map_err(to_store_error)?;
        Ok(DeleteOutcome { acknowledged: true, deleted_count: result.deleted_count })
    }

    async fn ping(&self) -> Result<(), StoreError> {
        self.db
            .run_command(doc! { "ping": 1 })
            .await
            .map(|_| ())
            .map_err(to_store_error)
    }
}
