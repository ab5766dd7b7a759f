use actix_web::{web, HttpResponse};
use serde_json::{Map, Value};

use crate::database::{InsertOutcome, Store};
use crate::services::application_service;
use crate::utils::json::document_to_json;
use crate::utils::AppError;

#[utoipa::path(
    post,
    path = "/ass-instructor",
    tag = "Applications",
    responses((status = 200, description = "Application stored", body = InsertOutcome))
)]
pub async fn submit_application(
    store: web::Data<dyn Store>,
    body: web::Json<Map<String, Value>>,
) -> Result<HttpResponse, AppError> {
    let outcome = application_service::submit_application(store.get_ref(), body.into_inner()).await?;
    Ok(HttpResponse::Ok().json(outcome))
}

#[utoipa::path(
    get,
    path = "/applied-instructors/{email}",
    tag = "Applications",
    params(("email" = String, Path, description = "Applicant email")),
    responses((status = 200, description = "The application, or null"))
)]
pub async fn find_application(
    store: web::Data<dyn Store>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let application = application_service::find_application(store.get_ref(), &path).await?;
    Ok(HttpResponse::Ok().json(application.map(document_to_json)))
}

#[cfg(test)]
mod tests {
    use crate::test_support::{test_app, TestContext};
    use actix_web::test;
    use serde_json::{json, Value};

    #[actix_rt::test]
    async fn test_apply_then_lookup() {
        let ctx = TestContext::new();
        let app = test_app!(ctx);

        let req = test::TestRequest::get().uri("/applied-instructors/a@x.com").to_request();
        let none: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(none, Value::Null);

        let req = test::TestRequest::post()
            .uri("/ass-instructor")
            .set_json(json!({ "name": "Ada", "email": "a@x.com", "experience": "10 years" }))
            .to_request();
        let stored: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(stored["acknowledged"], true);

        let req = test::TestRequest::get().uri("/applied-instructors/a@x.com").to_request();
        let found: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(found["experience"], "10 years");
        assert_eq!(found["_id"], stored["insertedId"]);
    }
}
