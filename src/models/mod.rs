// Persisted records, request payloads and derived views

pub mod dashboard;
pub mod goal;
pub mod notification;
pub mod nutrition;
pub mod step;
pub mod user;
pub mod validation;
pub mod workout;

pub use dashboard::*;
pub use goal::*;
pub use notification::*;
pub use nutrition::*;
pub use step::*;
pub use user::*;
pub use validation::*;
pub use workout::*;
