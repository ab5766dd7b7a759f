pub mod auth;
pub mod role_gate;

pub use auth::AuthMiddleware;
pub use role_gate::RoleGate;
