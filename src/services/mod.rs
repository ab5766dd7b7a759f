pub mod application_service;
pub mod cart_service;
pub mod class_service;
pub mod enrollment_service;
pub mod stats_service;
pub mod token_service;
pub mod user_service;
