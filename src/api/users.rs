use actix_web::{web, HttpResponse};
use serde_json::{Map, Value};

use crate::database::{DeleteOutcome, InsertOutcome, Store, UpdateOutcome};
use crate::models::UpdateUserRequest;
use crate::services::user_service;
use crate::utils::json::{document_to_json, documents_to_json};
use crate::utils::AppError;

#[utoipa::path(
    post,
    path = "/new-user",
    tag = "Users",
    responses(
        (status = 200, description = "User stored", body = InsertOutcome),
        (status = 400, description = "Missing email or unknown role"),
        (status = 409, description = "Email already registered")
    )
)]
pub async fn create_user(
    store: web::Data<dyn Store>,
    body: web::Json<Map<String, Value>>,
) -> Result<HttpResponse, AppError> {
    log::info!("📝 POST /new-user");
    let outcome = user_service::create_user(store.get_ref(), body.into_inner()).await?;
    Ok(HttpResponse::Ok().json(outcome))
}

#[utoipa::path(
    get,
    path = "/users",
    tag = "Users",
    responses((status = 200, description = "Every user record"))
)]
pub async fn list_users(store: web::Data<dyn Store>) -> Result<HttpResponse, AppError> {
    let users = user_service::list_users(store.get_ref()).await?;
    Ok(HttpResponse::Ok().json(documents_to_json(users)))
}

#[utoipa::path(
    get,
    path = "/users/{id}",
    tag = "Users",
    params(("id" = String, Path, description = "User ObjectId")),
    responses(
        (status = 200, description = "User record"),
        (status = 400, description = "Malformed id"),
        (status = 404, description = "No such user")
    )
)]
pub async fn get_user(store: web::Data<dyn Store>, path: web::Path<String>) -> Result<HttpResponse, AppError> {
    let user = user_service::get_user(store.get_ref(), &path).await?;
    Ok(HttpResponse::Ok().json(document_to_json(user)))
}

#[utoipa::path(
    get,
    path = "/user/{email}",
    tag = "Users",
    params(("email" = String, Path, description = "User email")),
    responses(
        (status = 200, description = "User record, or null when unknown"),
        (status = 401, description = "Missing token"),
        (status = 403, description = "Invalid token")
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_user_by_email(
    store: web::Data<dyn Store>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let user = user_service::find_user_by_email(store.get_ref(), &path).await?;
    Ok(HttpResponse::Ok().json(user.map(document_to_json)))
}

#[utoipa::path(
    delete,
    path = "/delete-user/{id}",
    tag = "Users",
    params(("id" = String, Path, description = "User ObjectId")),
    responses(
        (status = 200, description = "Delete result", body = DeleteOutcome),
        (status = 401, description = "Missing token or caller is not an admin")
    ),
    security(("bearer_auth" = []))
)]
pub async fn delete_user(store: web::Data<dyn Store>, path: web::Path<String>) -> Result<HttpResponse, AppError> {
    log::info!("🗑️ DELETE /delete-user/{}", path);
    let outcome = user_service::delete_user(store.get_ref(), &path).await?;
    Ok(HttpResponse::Ok().json(outcome))
}

#[utoipa::path(
    put,
    path = "/update-user/{id}",
    tag = "Users",
    params(("id" = String, Path, description = "User ObjectId")),
    request_body = UpdateUserRequest,
    responses(
        (status = 200, description = "Update result; creates the user when the id is unknown", body = UpdateOutcome),
        (status = 401, description = "Missing token or caller is not an admin")
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_user(
    store: web::Data<dyn Store>,
    path: web::Path<String>,
    body: web::Json<UpdateUserRequest>,
) -> Result<HttpResponse, AppError> {
    log::info!("✏️ PUT /update-user/{}", path);
    let outcome = user_service::update_user(store.get_ref(), &path, body.into_inner()).await?;
    Ok(HttpResponse::Ok().json(outcome))
}

#[utoipa::path(
    get,
    path = "/instructors",
    tag = "Users",
    responses((status = 200, description = "Users whose role is instructor"))
)]
pub async fn list_instructors(store: web::Data<dyn Store>) -> Result<HttpResponse, AppError> {
    let instructors = user_service::list_instructors(store.get_ref()).await?;
    Ok(HttpResponse::Ok().json(documents_to_json(instructors)))
}

#[cfg(test)]
mod tests {
    use crate::test_support::{test_app, TestContext};
    use actix_web::{http::header::AUTHORIZATION, test};
    use serde_json::{json, Value};

    #[actix_rt::test]
    async fn test_register_then_fetch_by_email() {
        let ctx = TestContext::new();
        let app = test_app!(ctx);

        let req = test::TestRequest::post()
            .uri("/new-user")
            .set_json(json!({ "email": "a@x.com", "role": "student" }))
            .to_request();
        let created: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(created["acknowledged"], true);
        let id = created["insertedId"].as_str().unwrap().to_string();

        let req = test::TestRequest::get()
            .uri("/user/a@x.com")
            .insert_header((AUTHORIZATION, ctx.bearer("a@x.com")))
            .to_request();
        let user: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(user["email"], "a@x.com");
        assert_eq!(user["role"], "student");
        assert_eq!(user["_id"], id);

        let req = test::TestRequest::get().uri(&format!("/users/{}", id)).to_request();
        let by_id: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(by_id, user);
    }

    #[actix_rt::test]
    async fn test_unknown_email_is_null() {
        let ctx = TestContext::new();
        let app = test_app!(ctx);

        let req = test::TestRequest::get()
            .uri("/user/nobody@x.com")
            .insert_header((AUTHORIZATION, ctx.bearer("a@x.com")))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body, Value::Null);
    }

    #[actix_rt::test]
    async fn test_user_by_id_errors() {
        let ctx = TestContext::new();
        let app = test_app!(ctx);

        let req = test::TestRequest::get().uri("/users/not-an-id").to_request();
        assert_eq!(test::call_service(&app, req).await.status(), 400);

        let missing = mongodb::bson::oid::ObjectId::new().to_hex();
        let req = test::TestRequest::get().uri(&format!("/users/{}", missing)).to_request();
        assert_eq!(test::call_service(&app, req).await.status(), 404);
    }

    #[actix_rt::test]
    async fn test_admin_updates_and_deletes() {
        let ctx = TestContext::new();
        ctx.seed_user("boss@x.com", "admin").await;
        let target = ctx.seed_user("kid@x.com", "student").await;
        let app = test_app!(ctx);

        let req = test::TestRequest::put()
            .uri(&format!("/update-user/{}", target))
            .insert_header((AUTHORIZATION, ctx.bearer("boss@x.com")))
            .set_json(json!({ "name": "Kid", "email": "kid@x.com", "option": "instructor" }))
            .to_request();
        let updated: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(updated["matchedCount"], 1);
        assert_eq!(updated["upsertedId"], Value::Null);

        let req = test::TestRequest::get().uri("/instructors").to_request();
        let instructors: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(instructors.as_array().unwrap().len(), 1);
        assert_eq!(instructors[0]["name"], "Kid");

        let req = test::TestRequest::delete()
            .uri(&format!("/delete-user/{}", target))
            .insert_header((AUTHORIZATION, ctx.bearer("boss@x.com")))
            .to_request();
        let deleted: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(deleted["deletedCount"], 1);
    }

    #[actix_rt::test]
    async fn test_non_admin_cannot_delete() {
        let ctx = TestContext::new();
        let target = ctx.seed_user("kid@x.com", "student").await;
        ctx.seed_user("teach@x.com", "instructor").await;
        let app = test_app!(ctx);

        for caller in ["kid@x.com", "teach@x.com", "ghost@x.com"] {
            let req = test::TestRequest::delete()
                .uri(&format!("/delete-user/{}", target))
                .insert_header((AUTHORIZATION, ctx.bearer(caller)))
                .to_request();
            let res = test::call_service(&app, req).await;
            assert_eq!(res.status(), 401, "caller {}", caller);
            let body: Value = test::read_body_json(res).await;
            assert_eq!(body["message"], "Unauthorized access");
        }

        let req = test::TestRequest::get().uri("/users").to_request();
        let users: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(users.as_array().unwrap().len(), 2);
    }
}
