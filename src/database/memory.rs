//! In-process document store.
//!
//! Understands the subset of the MongoDB query dialect the services use:
//! equality on (dotted) fields with array-contains semantics, `$in`, `$ne`,
//! multi-key stable sorts, and inclusion or exclusion projections.

use async_trait::async_trait;
use mongodb::bson::{oid::ObjectId, Bson, Document};
use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::RwLock;

use super::store::{Collection, DeleteOutcome, InsertOutcome, QueryOptions, Store, StoreError, UpdateOutcome};

pub struct MemoryStore {
    collections: RwLock<HashMap<Collection, Vec<Document>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        let collections = Collection::ALL.iter().map(|c| (*c, Vec::new())).collect();
        Self {
            collections: RwLock::new(collections),
        }
    }

    fn poisoned() -> StoreError {
        StoreError::Unavailable("memory store lock poisoned".to_string())
    }

    fn check_unique(
        rows: &[Document],
        collection: Collection,
        candidate: &Document,
        skip: Option<usize>,
    ) -> Result<(), StoreError> {
        let Some(key) = collection.unique_key() else {
            return Ok(());
        };
        let value = candidate.get(key).cloned().unwrap_or(Bson::Null);
        let clash = rows
            .iter()
            .enumerate()
            .filter(|(idx, _)| Some(*idx) != skip)
            .any(|(_, row)| values_equal(row.get(key).unwrap_or(&Bson::Null), &value));
        if clash {
            return Err(StoreError::Duplicate(format!("{}.{} already holds {}", collection, key, value)));
        }
        Ok(())
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn insert_one(&self, collection: Collection, mut document: Document) -> Result<InsertOutcome, StoreError> {
        if !document.contains_key("_id") {
            document.insert("_id", ObjectId::new());
        }
        let inserted_id = document.get("_id").cloned().unwrap_or(Bson::Null);

        let mut guard = self.collections.write().map_err(|_| Self::poisoned())?;
        let rows = guard.entry(collection).or_default();
        Self::check_unique(rows, collection, &document, None)?;
        rows.push(document);

        Ok(InsertOutcome { acknowledged: true, inserted_id })
    }

    async fn find_one(
        &self,
        collection: Collection,
        filter: Document,
        projection: Option<Document>,
    ) -> Result<Option<Document>, StoreError> {
        let guard = self.collections.read().map_err(|_| Self::poisoned())?;
        let found = guard
            .get(&collection)
            .and_then(|rows| rows.iter().find(|row| matches(row, &filter)))
            .map(|row| project(row, projection.as_ref()));
        Ok(found)
    }

    async fn find(
        &self,
        collection: Collection,
        filter: Document,
        options: QueryOptions,
    ) -> Result<Vec<Document>, StoreError> {
        let guard = self.collections.read().map_err(|_| Self::poisoned())?;
        let mut rows: Vec<&Document> = guard
            .get(&collection)
            .map(|rows| rows.iter().filter(|row| matches(row, &filter)).collect())
            .unwrap_or_default();

        if let Some(sort) = options.sort.as_ref() {
            // Vec::sort_by is stable, so ties keep insertion order.
            rows.sort_by(|a, b| compare_by(a, b, sort));
        }
        if let Some(limit) = options.limit.filter(|l| *l > 0) {
            rows.truncate(limit as usize);
        }

        Ok(rows.into_iter().map(|row| project(row, options.projection.as_ref())).collect())
    }

    async fn count(&self, collection: Collection, filter: Document) -> Result<u64, StoreError> {
        let guard = self.collections.read().map_err(|_| Self::poisoned())?;
        let count = guard
            .get(&collection)
            .map(|rows| rows.iter().filter(|row| matches(row, &filter)).count())
            .unwrap_or(0);
        Ok(count as u64)
    }

    async fn upsert_fields(
        &self,
        collection: Collection,
        filter: Document,
        fields: Document,
    ) -> Result<UpdateOutcome, StoreError> {
        let mut guard = self.collections.write().map_err(|_| Self::poisoned())?;
        let rows = guard.entry(collection).or_default();

        if let Some(idx) = rows.iter().position(|row| matches(row, &filter)) {
            let mut updated = rows[idx].clone();
            for (key, value) in fields {
                updated.insert(key, value);
            }
            Self::check_unique(rows, collection, &updated, Some(idx))?;
            let modified = updated != rows[idx];
            rows[idx] = updated;
            return Ok(UpdateOutcome {
                acknowledged: true,
                matched_count: 1,
                modified_count: u64::from(modified),
                upserted_count: 0,
                upserted_id: None,
            });
        }

        // Seed the new record with the filter's plain equality fields.
        let mut created = Document::new();
        for (key, value) in filter.iter() {
            let is_operator = matches!(value, Bson::Document(d) if d.keys().any(|k| k.starts_with('$')));
            if !key.starts_with('$') && !key.contains('.') && !is_operator {
                created.insert(key.clone(), value.clone());
            }
        }
        for (key, value) in fields {
            created.insert(key, value);
        }
        if !created.contains_key("_id") {
            created.insert("_id", ObjectId::new());
        }
        Self::check_unique(rows, collection, &created, None)?;
        let upserted_id = created.get("_id").cloned();
        rows.push(created);

        Ok(UpdateOutcome {
            acknowledged: true,
            matched_count: 0,
            modified_count: 0,
            upserted_count: 1,
            upserted_id,
        })
    }

    async fn delete_one(&self, collection: Collection, filter: Document) -> Result<DeleteOutcome, StoreError> {
        let mut guard = self.collections.write().map_err(|_| Self::poisoned())?;
        let deleted_count = match guard.get_mut(&collection) {
            Some(rows) => match rows.iter().position(|row| matches(row, &filter)) {
                Some(idx) => {
                    rows.remove(idx);
                    1
                }
                None => 0,
            },
            None => 0,
        };
        Ok(DeleteOutcome { acknowledged: true, deleted_count })
    }

    async fn ping(&self) -> Result<(), StoreError> {
        self.collections.read().map(|_| ()).map_err(|_| Self::poisoned())
    }
}

fn lookup<'a>(doc: &'a Document, path: &str) -> Option<&'a Bson> {
    let mut segments = path.split('.');
    let mut current = doc.get(segments.next()?)?;
    for segment in segments {
        current = match current {
            Bson::Document(inner) => inner.get(segment)?,
            _ => return None,
        };
    }
    Some(current)
}

fn as_f64(value: &Bson) -> Option<f64> {
    match value {
        Bson::Int32(n) => Some(*n as f64),
        Bson::Int64(n) => Some(*n as f64),
        Bson::Double(f) => Some(*f),
        _ => None,
    }
}

fn values_equal(a: &Bson, b: &Bson) -> bool {
    match (as_f64(a), as_f64(b)) {
        (Some(x), Some(y)) => x == y,
        _ => a == b,
    }
}

/// Equality with MongoDB's array semantics: an array field matches when any
/// element does.
fn field_equals(field: Option<&Bson>, expected: &Bson) -> bool {
    let field = field.unwrap_or(&Bson::Null);
    if values_equal(field, expected) {
        return true;
    }
    match field {
        Bson::Array(items) => items.iter().any(|item| values_equal(item, expected)),
        _ => false,
    }
}

fn matches(doc: &Document, filter: &Document) -> bool {
    filter.iter().all(|(key, condition)| {
        let field = lookup(doc, key);
        match condition {
            Bson::Document(ops) if ops.keys().next().is_some_and(|k| k.starts_with('$')) => {
                ops.iter().all(|(op, arg)| match (op.as_str(), arg) {
                    ("$in", Bson::Array(candidates)) => candidates.iter().any(|c| field_equals(field, c)),
                    ("$ne", other) => !field_equals(field, other),
                    _ => false,
                })
            }
            expected => field_equals(field, expected),
        }
    })
}

fn type_rank(value: Option<&Bson>) -> u8 {
    match value {
        None | Some(Bson::Null) | Some(Bson::Undefined) => 0,
        Some(Bson::Int32(_)) | Some(Bson::Int64(_)) | Some(Bson::Double(_)) => 1,
        Some(Bson::String(_)) => 2,
        Some(Bson::Document(_)) => 3,
        Some(Bson::Array(_)) => 4,
        Some(Bson::ObjectId(_)) => 5,
        Some(Bson::Boolean(_)) => 6,
        Some(Bson::DateTime(_)) => 7,
        Some(_) => 8,
    }
}

fn compare_values(a: Option<&Bson>, b: Option<&Bson>) -> Ordering {
    let rank = type_rank(a).cmp(&type_rank(b));
    if rank != Ordering::Equal {
        return rank;
    }
    match (a, b) {
        (Some(x), Some(y)) => match (as_f64(x), as_f64(y)) {
            (Some(fx), Some(fy)) => fx.partial_cmp(&fy).unwrap_or(Ordering::Equal),
            _ => match (x, y) {
                (Bson::String(sx), Bson::String(sy)) => sx.cmp(sy),
                (Bson::ObjectId(ox), Bson::ObjectId(oy)) => ox.bytes().cmp(&oy.bytes()),
                (Bson::Boolean(bx), Bson::Boolean(by)) => bx.cmp(by),
                (Bson::DateTime(dx), Bson::DateTime(dy)) => dx.cmp(dy),
                _ => Ordering::Equal,
            },
        },
        _ => Ordering::Equal,
    }
}

fn compare_by(a: &Document, b: &Document, sort: &Document) -> Ordering {
    for (key, direction) in sort {
        let descending = as_f64(direction).is_some_and(|d| d < 0.0);
        let ord = compare_values(lookup(a, key), lookup(b, key));
        let ord = if descending { ord.reverse() } else { ord };
        if ord != Ordering::Equal {
            return ord;
        }
    }
    Ordering::Equal
}

fn truthy(value: &Bson) -> bool {
    match value {
        Bson::Boolean(b) => *b,
        other => as_f64(other).is_some_and(|n| n != 0.0),
    }
}

fn project(doc: &Document, projection: Option<&Document>) -> Document {
    let Some(projection) = projection else {
        return doc.clone();
    };
    let keep_id = projection.get("_id").map(truthy).unwrap_or(true);
    let inclusive: Vec<&String> = projection
        .iter()
        .filter(|(key, value)| key.as_str() != "_id" && truthy(value))
        .map(|(key, _)| key)
        .collect();

    if inclusive.is_empty() {
        let mut out = doc.clone();
        for (key, value) in projection {
            if !truthy(value) {
                out.remove(key);
            }
        }
        return out;
    }

    let mut out = Document::new();
    if keep_id {
        if let Some(id) = doc.get("_id") {
            out.insert("_id", id.clone());
        }
    }
    for key in inclusive {
        if let Some(value) = doc.get(key) {
            out.insert(key.clone(), value.clone());
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use mongodb::bson::doc;

    #[tokio::test]
    async fn test_insert_assigns_object_id() {
        let store = MemoryStore::new();
        let outcome = store
            .insert_one(Collection::Classes, doc! { "name": "Guitar" })
            .await
            .unwrap();

        let oid = outcome.inserted_id.as_object_id().unwrap();
        let found = store
            .find_one(Collection::Classes, doc! { "_id": oid }, None)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.get_str("name").unwrap(), "Guitar");
    }

    #[tokio::test]
    async fn test_sort_is_stable_and_limited() {
        let store = MemoryStore::new();
        for (name, enrolled) in [("a", 5), ("b", 9), ("c", 5), ("d", 1)] {
            store
                .insert_one(Collection::Classes, doc! { "name": name, "totalEnrolled": enrolled })
                .await
                .unwrap();
        }

        let rows = store
            .find(
                Collection::Classes,
                doc! {},
                QueryOptions::sorted(doc! { "totalEnrolled": -1 }).limit(3),
            )
            .await
            .unwrap();
        let names: Vec<&str> = rows.iter().map(|r| r.get_str("name").unwrap()).collect();
        assert_eq!(names, vec!["b", "a", "c"]);
    }

    #[tokio::test]
    async fn test_in_filter_and_projection() {
        let store = MemoryStore::new();
        store
            .insert_one(Collection::Cart, doc! { "classId": "1", "userMail": "a@x.com", "price": 10 })
            .await
            .unwrap();
        store
            .insert_one(Collection::Cart, doc! { "classId": "2", "userMail": "b@x.com" })
            .await
            .unwrap();

        let rows = store
            .find(
                Collection::Cart,
                doc! { "userMail": { "$in": ["a@x.com", "z@x.com"] } },
                QueryOptions::default().projection(doc! { "classId": 1 }),
            )
            .await
            .unwrap();
        assert_eq!(rows.len(), 1);
        assert!(rows[0].contains_key("_id"));
        assert!(rows[0].contains_key("classId"));
        assert!(!rows[0].contains_key("price"));
    }

    #[tokio::test]
    async fn test_upsert_creates_then_updates() {
        let store = MemoryStore::new();
        let oid = ObjectId::new();

        let first = store
            .upsert_fields(Collection::Classes, doc! { "_id": oid }, doc! { "status": "approved" })
            .await
            .unwrap();
        assert_eq!(first.upserted_count, 1);
        assert_eq!(first.upserted_id, Some(Bson::ObjectId(oid)));

        let second = store
            .upsert_fields(Collection::Classes, doc! { "_id": oid }, doc! { "status": "approved" })
            .await
            .unwrap();
        assert_eq!(second.matched_count, 1);
        assert_eq!(second.modified_count, 0);
        assert_eq!(store.count(Collection::Classes, doc! {}).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_unique_email_rejected() {
        let store = MemoryStore::new();
        store
            .insert_one(Collection::Users, doc! { "email": "a@x.com" })
            .await
            .unwrap();
        let err = store
            .insert_one(Collection::Users, doc! { "email": "a@x.com" })
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Duplicate(_)));
    }

    #[tokio::test]
    async fn test_delete_removes_first_match_only() {
        let store = MemoryStore::new();
        for _ in 0..2 {
            store
                .insert_one(Collection::Cart, doc! { "classId": "c1" })
                .await
                .unwrap();
        }
        let outcome = store
            .delete_one(Collection::Cart, doc! { "classId": "c1" })
            .await
            .unwrap();
        assert_eq!(outcome.deleted_count, 1);
        assert_eq!(store.count(Collection::Cart, doc! {}).await.unwrap(), 1);
    }

    #[test]
    fn test_array_field_equality() {
        let row = doc! { "skills": ["rust", "yoga"] };
        assert!(matches(&row, &doc! { "skills": "yoga" }));
        assert!(!matches(&row, &doc! { "skills": "chess" }));
    }
}
