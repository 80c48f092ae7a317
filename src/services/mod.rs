pub mod dashboard_service;
pub mod goal_service;
pub mod mailer;
pub mod notification_service;
pub mod nutrition_service;
pub mod reminder_scheduler;
pub mod step_service;
pub mod user_service;
pub mod workout_service;

pub use dashboard_service::DashboardService;
pub use goal_service::GoalService;
pub use mailer::Mailer;
pub use notification_service::NotificationService;
pub use nutrition_service::NutritionService;
pub use reminder_scheduler::{ReminderDispatcher, ReminderRunStats, ReminderScheduler};
pub use step_service::StepService;
pub use user_service::UserService;
pub use workout_service::WorkoutService;
