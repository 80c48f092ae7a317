// HTTP surface: one router per resource, all under /api/v1

pub mod auth;
pub mod dashboard;
pub mod error;
pub mod goals;
pub mod health;
pub mod notifications;
pub mod nutrition;
pub mod profile;
pub mod routes;
pub mod steps;
pub mod workouts;

pub use error::{ApiError, ApiResult};
pub use routes::create_routes;
