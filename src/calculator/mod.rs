// Closed-form fitness arithmetic: calorie estimation, step conversion, goal progress

pub mod calories;
pub mod progress;
pub mod steps;

pub use calories::{estimate_calories, met_value, CalculationError, REFERENCE_WEIGHT_KG};
pub use progress::{body_mass_index, days_remaining, is_achieved, progress_percentage};
pub use steps::StepConversion;
