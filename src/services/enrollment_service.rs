//! Read-side compositions across collections: popular classes and
//! instructors, and a user's enrolled classes joined with their instructors.
//!
//! Joins are resolved here over the `Store` primitives so every backend
//! returns the same rows in the same order.

use mongodb::bson::{doc, oid::ObjectId, Bson, Document};
use std::collections::HashMap;

use crate::database::{Collection, QueryOptions, Store};
use crate::models::{EnrolledClass, PopularInstructor, Role};
use crate::utils::json::{bson_as_i64, document_to_json};
use crate::utils::AppError;

pub const POPULAR_LIMIT: usize = 6;

/// Classes by `totalEnrolled`, highest first. Ties keep insertion order.
pub async fn popular_classes(store: &dyn Store) -> Result<Vec<Document>, AppError> {
    Ok(store
        .find(
            Collection::Classes,
            doc! {},
            QueryOptions::sorted(doc! { "totalEnrolled": -1, "_id": 1 }).limit(POPULAR_LIMIT as i64),
        )
        .await?)
}

/// Instructors ranked by the enrollments summed over their classes.
pub async fn popular_instructors(store: &dyn Store) -> Result<Vec<PopularInstructor>, AppError> {
    let classes = store
        .find(
            Collection::Classes,
            doc! {},
            QueryOptions::default().projection(doc! { "instructorEmail": 1, "totalEnrolled": 1 }),
        )
        .await?;

    // Group in first-seen order so equal totals rank deterministically.
    let mut order: Vec<String> = Vec::new();
    let mut totals: HashMap<String, i64> = HashMap::new();
    for class in &classes {
        let Ok(email) = class.get_str("instructorEmail") else {
            continue;
        };
        let enrolled = bson_as_i64(class.get("totalEnrolled")).unwrap_or(0);
        match totals.get_mut(email) {
            Some(total) => *total = total.saturating_add(enrolled),
            None => {
                order.push(email.to_string());
                totals.insert(email.to_string(), enrolled);
            }
        }
    }

    if order.is_empty() {
        return Ok(Vec::new());
    }

    let emails: Vec<Bson> = order.iter().map(|e| Bson::String(e.clone())).collect();
    let users = store
        .find(
            Collection::Users,
            doc! { "email": { "$in": emails }, "role": Role::Instructor.as_str() },
            QueryOptions::default(),
        )
        .await?;

    let mut by_email: HashMap<String, Document> = HashMap::new();
    for user in users {
        if let Ok(email) = user.get_str("email") {
            let email = email.to_string();
            by_email.entry(email).or_insert(user);
        }
    }

    let mut ranked: Vec<PopularInstructor> = order
        .into_iter()
        .filter_map(|email| {
            let user = by_email.remove(&email)?;
            Some(PopularInstructor {
                instructor: document_to_json(user),
                total_enrolled: totals.get(&email).copied().unwrap_or(0),
            })
        })
        .collect();

    ranked.sort_by(|a, b| b.total_enrolled.cmp(&a.total_enrolled));
    ranked.truncate(POPULAR_LIMIT);
    Ok(ranked)
}

fn class_ref(value: Option<&Bson>) -> Option<ObjectId> {
    match value? {
        Bson::ObjectId(oid) => Some(*oid),
        Bson::String(hex) => ObjectId::parse_str(hex).ok(),
        _ => None,
    }
}

/// The user's enrollments, each joined with its class and the class's
/// instructor. Enrollments pointing at a missing class are dropped.
pub async fn enrolled_classes(store: &dyn Store, email: &str) -> Result<Vec<EnrolledClass>, AppError> {
    let enrollments = store
        .find(Collection::Enrolled, doc! { "userEmail": email }, QueryOptions::default())
        .await?;

    let class_ids: Vec<ObjectId> = enrollments
        .iter()
        .filter_map(|e| class_ref(e.get("classesId")))
        .collect();
    if class_ids.is_empty() {
        return Ok(Vec::new());
    }

    let id_filter: Vec<Bson> = class_ids.iter().map(|id| Bson::ObjectId(*id)).collect();
    let classes: HashMap<ObjectId, Document> = store
        .find(Collection::Classes, doc! { "_id": { "$in": id_filter } }, QueryOptions::default())
        .await?
        .into_iter()
        .filter_map(|class| class.get_object_id("_id").ok().map(|id| (id, class)))
        .collect();

    let instructor_emails: Vec<Bson> = classes
        .values()
        .filter_map(|class| class.get_str("instructorEmail").ok())
        .map(|e| Bson::String(e.to_string()))
        .collect();

    let mut instructors: HashMap<String, Document> = HashMap::new();
    if !instructor_emails.is_empty() {
        let users = store
            .find(
                Collection::Users,
                doc! { "email": { "$in": instructor_emails } },
                QueryOptions::default(),
            )
            .await?;
        for user in users {
            if let Ok(email) = user.get_str("email") {
                let email = email.to_string();
                instructors.entry(email).or_insert(user);
            }
        }
    }

    let rows = enrollments
        .iter()
        .filter_map(|enrollment| {
            let class = classes.get(&class_ref(enrollment.get("classesId"))?)?;
            let instructor = class
                .get_str("instructorEmail")
                .ok()
                .and_then(|e| instructors.get(e))
                .cloned()
                .map(document_to_json);
            Some(EnrolledClass {
                classes: document_to_json(class.clone()),
                instructor,
            })
        })
        .collect();

    Ok(rows)
}
