use actix_web::{web, HttpResponse};

use crate::database::Store;
use crate::models::{AdminStats, EnrolledClass, PopularInstructor};
use crate::services::{enrollment_service, stats_service};
use crate::utils::json::documents_to_json;
use crate::utils::AppError;

#[utoipa::path(
    get,
    path = "/popular_classes",
    tag = "Enrollment",
    responses((status = 200, description = "Up to six classes with the most enrollments"))
)]
pub async fn popular_classes(store: web::Data<dyn Store>) -> Result<HttpResponse, AppError> {
    let classes = enrollment_service::popular_classes(store.get_ref()).await?;
    Ok(HttpResponse::Ok().json(documents_to_json(classes)))
}

#[utoipa::path(
    get,
    path = "/popular-instructors",
    tag = "Enrollment",
    responses((status = 200, description = "Up to six instructors by summed enrollments", body = [PopularInstructor]))
)]
pub async fn popular_instructors(store: web::Data<dyn Store>) -> Result<HttpResponse, AppError> {
    let instructors = enrollment_service::popular_instructors(store.get_ref()).await?;
    Ok(HttpResponse::Ok().json(instructors))
}

#[utoipa::path(
    get,
    path = "/admin-stats",
    tag = "Enrollment",
    responses(
        (status = 200, description = "Dashboard counts", body = AdminStats),
        (status = 401, description = "Missing token or caller is not an admin")
    ),
    security(("bearer_auth" = []))
)]
pub async fn admin_stats(store: web::Data<dyn Store>) -> Result<HttpResponse, AppError> {
    let stats = stats_service::admin_stats(store.get_ref()).await?;
    log::debug!("📊 Admin stats: {:?}", stats);
    Ok(HttpResponse::Ok().json(stats))
}

#[utoipa::path(
    get,
    path = "/enrolled-classes/{email}",
    tag = "Enrollment",
    params(("email" = String, Path, description = "Student email")),
    responses((status = 200, description = "Enrolled classes with their instructors", body = [EnrolledClass])),
    security(("bearer_auth" = []))
)]
pub async fn enrolled_classes(
    store: web::Data<dyn Store>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let rows = enrollment_service::enrolled_classes(store.get_ref(), &path).await?;
    Ok(HttpResponse::Ok().json(rows))
}

#[cfg(test)]
mod tests {
    use crate::database::{Collection, Store};
    use crate::test_support::{test_app, TestContext};
    use actix_web::{http::header::AUTHORIZATION, test};
    use mongodb::bson::{doc, oid::ObjectId};
    use serde_json::{json, Value};

    #[actix_rt::test]
    async fn test_popular_classes_capped_and_ordered() {
        let ctx = TestContext::new();
        for (i, enrolled) in [3, 9, 1, 7, 7, 0, 5, 2].into_iter().enumerate() {
            ctx.seed_class(&format!("Class {}", i), "teach@x.com", enrolled).await;
        }
        let app = test_app!(ctx);

        let req = test::TestRequest::get().uri("/popular_classes").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        let totals: Vec<i64> = body
            .as_array()
            .unwrap()
            .iter()
            .map(|c| c["totalEnrolled"].as_i64().unwrap())
            .collect();
        assert_eq!(totals, vec![9, 7, 7, 5, 3, 2]);
        assert_eq!(body[1]["name"], "Class 3");
    }

    #[actix_rt::test]
    async fn test_popular_instructors_shape() {
        let ctx = TestContext::new();
        ctx.seed_user("ann@x.com", "instructor").await;
        ctx.seed_user("bob@x.com", "instructor").await;
        ctx.seed_class("A", "ann@x.com", 2).await;
        ctx.seed_class("B", "bob@x.com", 5).await;
        ctx.seed_class("C", "ann@x.com", 4).await;
        let app = test_app!(ctx);

        let req = test::TestRequest::get().uri("/popular-instructors").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body[0]["instructor"]["email"], "ann@x.com");
        assert_eq!(body[0]["totalEnrolled"], 6);
        assert_eq!(body[1]["instructor"]["email"], "bob@x.com");
        assert_eq!(body[1]["totalEnrolled"], 5);
    }

    #[actix_rt::test]
    async fn test_admin_stats_counts() {
        let ctx = TestContext::new();
        ctx.seed_user("boss@x.com", "admin").await;
        ctx.seed_user("ann@x.com", "instructor").await;
        ctx.seed_user("bob@x.com", "instructor").await;
        for _ in 0..3 {
            let id = ctx.seed_class("Approved", "ann@x.com", 0).await;
            ctx.store
                .upsert_fields(
                    Collection::Classes,
                    doc! { "_id": ObjectId::parse_str(&id).unwrap() },
                    doc! { "status": "approved" },
                )
                .await
                .unwrap();
        }
        let pending = ctx.seed_class("Pending", "bob@x.com", 0).await;
        for email in ["s1@x.com", "s2@x.com"] {
            ctx.store
                .insert_one(Collection::Enrolled, doc! { "userEmail": email, "classesId": pending.as_str() })
                .await
                .unwrap();
        }
        let app = test_app!(ctx);

        let req = test::TestRequest::get()
            .uri("/admin-stats")
            .insert_header((AUTHORIZATION, ctx.bearer("boss@x.com")))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(
            body,
            json!({
                "approvedClases": 3,
                "pendingClases": 1,
                "instructors": 2,
                "totalClases": 4,
                "totalEnrolled": 2
            })
        );

        let req = test::TestRequest::get()
            .uri("/admin-stats")
            .insert_header((AUTHORIZATION, ctx.bearer("ann@x.com")))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), 401);
    }

    #[actix_rt::test]
    async fn test_enrolled_classes_join() {
        let ctx = TestContext::new();
        ctx.seed_user("ann@x.com", "instructor").await;
        let class_id = ctx.seed_class("Piano", "ann@x.com", 1).await;
        ctx.store
            .insert_one(
                Collection::Enrolled,
                doc! { "userEmail": "s@x.com", "classesId": ObjectId::parse_str(&class_id).unwrap() },
            )
            .await
            .unwrap();
        let app = test_app!(ctx);

        let req = test::TestRequest::get()
            .uri("/enrolled-classes/s@x.com")
            .insert_header((AUTHORIZATION, ctx.bearer("s@x.com")))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body.as_array().unwrap().len(), 1);
        assert_eq!(body[0]["classes"]["name"], "Piano");
        assert_eq!(body[0]["instructor"]["email"], "ann@x.com");
    }
}
