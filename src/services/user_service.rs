use mongodb::bson::{doc, Bson, Document};
use serde_json::{Map, Value};

use crate::database::{Collection, DeleteOutcome, InsertOutcome, QueryOptions, Store, UpdateOutcome};
use crate::models::{Role, UpdateUserRequest};
use crate::services::token_service::Claims;
use crate::utils::json::{body_to_document, value_to_bson};
use crate::utils::{parse_object_id, AppError};

/// Registers a user. Email is required and unique; a role, when given,
/// must be one of the known roles.
pub async fn create_user(store: &dyn Store, body: Map<String, Value>) -> Result<InsertOutcome, AppError> {
    let email = body
        .get("email")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|e| !e.is_empty())
        .ok_or_else(|| AppError::InvalidRequest("Email is required".to_string()))?
        .to_string();

    if let Some(role) = body.get("role") {
        let role = role
            .as_str()
            .ok_or_else(|| AppError::InvalidRequest("Role must be a string".to_string()))?;
        role.parse::<Role>().map_err(AppError::InvalidRequest)?;
    }

    if find_user_by_email(store, &email).await?.is_some() {
        return Err(AppError::Conflict("User already exists".to_string()));
    }

    let outcome = store.insert_one(Collection::Users, body_to_document(body)?).await?;
    log::info!("✅ User registered: {}", email);
    Ok(outcome)
}

pub async fn list_users(store: &dyn Store) -> Result<Vec<Document>, AppError> {
    Ok(store.find(Collection::Users, doc! {}, QueryOptions::default()).await?)
}

pub async fn list_instructors(store: &dyn Store) -> Result<Vec<Document>, AppError> {
    Ok(store
        .find(Collection::Users, doc! { "role": Role::Instructor.as_str() }, QueryOptions::default())
        .await?)
}

pub async fn get_user(store: &dyn Store, id: &str) -> Result<Document, AppError> {
    let oid = parse_object_id(id)?;
    store
        .find_one(Collection::Users, doc! { "_id": oid }, None)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))
}

pub async fn find_user_by_email(store: &dyn Store, email: &str) -> Result<Option<Document>, AppError> {
    Ok(store.find_one(Collection::Users, doc! { "email": email }, None).await?)
}

pub async fn delete_user(store: &dyn Store, id: &str) -> Result<DeleteOutcome, AppError> {
    let oid = parse_object_id(id)?;
    Ok(store.delete_one(Collection::Users, doc! { "_id": oid }).await?)
}

/// Replaces the profile field set of a user, creating the record when the
/// id is unknown. Fields missing from the request are stored as null.
pub async fn update_user(store: &dyn Store, id: &str, request: UpdateUserRequest) -> Result<UpdateOutcome, AppError> {
    let oid = parse_object_id(id)?;
    let skills = match request.skills {
        Some(value) => value_to_bson(&value)?,
        None => Bson::Null,
    };

    let fields = doc! {
        "name": request.name,
        "email": request.email,
        "role": request.option.as_str(),
        "address": request.address,
        "about": request.about,
        "photoUrl": request.photo_url,
        "skills": skills,
    };

    Ok(store.upsert_fields(Collection::Users, doc! { "_id": oid }, fields).await?)
}

/// Resolves the caller's stored record and checks its role. An unknown
/// caller is treated the same as a caller with the wrong role.
pub async fn require_role(store: &dyn Store, claims: &Claims, role: Role) -> Result<Document, AppError> {
    let email = claims.email().ok_or(AppError::Unauthorized)?;

    let user = find_user_by_email(store, email).await?.ok_or_else(|| {
        log::warn!("🚫 No user record for {} (requires {})", email, role);
        AppError::Unauthorized
    })?;

    match user.get_str("role") {
        Ok(actual) if actual == role.as_str() => Ok(user),
        _ => {
            log::warn!("🚫 {} denied: requires {}", email, role);
            Err(AppError::Unauthorized)
        }
    }
}
