use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Course Marketplace API",
        version = "1.0.0",
        description = "Backend for an online course marketplace: users, classes, carts, enrollments and instructor applications.\n\n**Authentication:** protected endpoints take `Authorization: Bearer <token>` from `POST /api/set-token`. Admin and instructor endpoints also check the caller's stored role."
    ),
    paths(
        // Auth
        crate::api::auth::set_token,

        // Health
        crate::api::health::health_check,

        // Users
        crate::api::users::create_user,
        crate::api::users::list_users,
        crate::api::users::get_user,
        crate::api::users::get_user_by_email,
        crate::api::users::delete_user,
        crate::api::users::update_user,
        crate::api::users::list_instructors,

        // Classes
        crate::api::classes::create_class,
        crate::api::classes::list_classes,
        crate::api::classes::manage_classes,
        crate::api::classes::classes_by_instructor,
        crate::api::classes::change_status,
        crate::api::classes::approved_classes,
        crate::api::classes::get_class,
        crate::api::classes::update_class,

        // Cart
        crate::api::cart::add_to_cart,
        crate::api::cart::cart_item,
        crate::api::cart::cart_classes,
        crate::api::cart::delete_cart_item,

        // Enrollment
        crate::api::enrollment::popular_classes,
        crate::api::enrollment::popular_instructors,
        crate::api::enrollment::admin_stats,
        crate::api::enrollment::enrolled_classes,

        // Applications
        crate::api::applications::submit_application,
        crate::api::applications::find_application,
    ),
    components(
        schemas(
            crate::api::auth::TokenResponse,
            crate::api::health::HealthResponse,
            crate::database::InsertOutcome,
            crate::database::UpdateOutcome,
            crate::database::DeleteOutcome,
            crate::models::Role,
            crate::models::UpdateUserRequest,
            crate::models::ClassStatus,
            crate::models::ChangeStatusRequest,
            crate::models::UpdateClassRequest,
            crate::models::AdminStats,
            crate::models::PopularInstructor,
            crate::models::EnrolledClass,
        )
    ),
    tags(
        (name = "Auth", description = "Token issuance."),
        (name = "Health", description = "Liveness and store connectivity."),
        (name = "Users", description = "User registration, lookup and admin management."),
        (name = "Classes", description = "Class catalog, instructor authoring and admin review."),
        (name = "Cart", description = "Per-user cart rows referencing classes."),
        (name = "Enrollment", description = "Popularity rankings, enrolled classes and admin statistics."),
        (name = "Applications", description = "Instructor applications."),
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .description(Some("Token from POST /api/set-token"))
                        .build(),
                ),
            );
        }
    }
}
