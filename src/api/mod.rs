pub mod applications;
pub mod auth;
pub mod cart;
pub mod classes;
pub mod enrollment;
pub mod health;
pub mod swagger;
pub mod users;

use actix_web::web;

use crate::middleware::{AuthMiddleware, RoleGate};
use crate::utils::AppError;

/// Registers every route. Protected resources stack the role gate inside
/// `AuthMiddleware`; the last `wrap` runs first.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(
        web::JsonConfig::default()
            .error_handler(|err, _req| AppError::InvalidRequest(err.to_string()).into()),
    )
    .app_data(
        web::QueryConfig::default()
            .error_handler(|err, _req| AppError::InvalidRequest(err.to_string()).into()),
    );

    // Public
    cfg.route("/", web::get().to(health::root))
        .route("/health", web::get().to(health::health_check))
        .route("/api/set-token", web::post().to(auth::set_token))
        .route("/new-user", web::post().to(users::create_user))
        .route("/users", web::get().to(users::list_users))
        .route("/users/{id}", web::get().to(users::get_user))
        .route("/instructors", web::get().to(users::list_instructors))
        .route("/classes", web::get().to(classes::list_classes))
        .route("/classes-manage", web::get().to(classes::manage_classes))
        .route("/approved-classes", web::get().to(classes::approved_classes))
        .route("/class/{id}", web::get().to(classes::get_class))
        .route("/popular_classes", web::get().to(enrollment::popular_classes))
        .route("/popular-instructors", web::get().to(enrollment::popular_instructors))
        .route("/ass-instructor", web::post().to(applications::submit_application))
        .route("/applied-instructors/{email}", web::get().to(applications::find_application));

    // Identity
    cfg.service(
        web::resource("/user/{email}")
            .wrap(AuthMiddleware)
            .route(web::get().to(users::get_user_by_email)),
    )
    .service(
        web::resource("/add-to-cart")
            .wrap(AuthMiddleware)
            .route(web::post().to(cart::add_to_cart)),
    )
    .service(
        web::resource("/cart-item/{id}")
            .wrap(AuthMiddleware)
            .route(web::get().to(cart::cart_item)),
    )
    .service(
        web::resource("/cart/{email}")
            .wrap(AuthMiddleware)
            .route(web::get().to(cart::cart_classes)),
    )
    .service(
        web::resource("/delete-cart-item/{id}")
            .wrap(AuthMiddleware)
            .route(web::delete().to(cart::delete_cart_item)),
    )
    .service(
        web::resource("/enrolled-classes/{email}")
            .wrap(AuthMiddleware)
            .route(web::get().to(enrollment::enrolled_classes)),
    );

    // Identity + admin
    cfg.service(
        web::resource("/delete-user/{id}")
            .wrap(RoleGate::admin())
            .wrap(AuthMiddleware)
            .route(web::delete().to(users::delete_user)),
    )
    .service(
        web::resource("/update-user/{id}")
            .wrap(RoleGate::admin())
            .wrap(AuthMiddleware)
            .route(web::put().to(users::update_user)),
    )
    .service(
        web::resource("/change-status/{id}")
            .wrap(RoleGate::admin())
            .wrap(AuthMiddleware)
            .route(web::patch().to(classes::change_status)),
    )
    .service(
        web::resource("/admin-stats")
            .wrap(RoleGate::admin())
            .wrap(AuthMiddleware)
            .route(web::get().to(enrollment::admin_stats)),
    );

    // Identity + instructor
    cfg.service(
        web::resource("/new-class")
            .wrap(RoleGate::instructor())
            .wrap(AuthMiddleware)
            .route(web::post().to(classes::create_class)),
    )
    .service(
        web::resource("/classes/{email}")
            .wrap(RoleGate::instructor())
            .wrap(AuthMiddleware)
            .route(web::get().to(classes::classes_by_instructor)),
    )
    .service(
        web::resource("/update-class/{id}")
            .wrap(RoleGate::instructor())
            .wrap(AuthMiddleware)
            .route(web::put().to(classes::update_class)),
    );
}
