pub mod class;
pub mod enrollment;
pub mod user;

pub use class::*;
pub use enrollment::*;
pub use user::*;
