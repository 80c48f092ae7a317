use axum::{routing::get, Router};
use sqlx::PgPool;
use tower_http::trace::TraceLayer;

use super::auth::auth_routes;
use super::dashboard::dashboard_routes;
use super::goals::goal_routes;
use super::health::health_check;
use super::notifications::notification_routes;
use super::nutrition::nutrition_routes;
use super::profile::profile_routes;
use super::steps::step_routes;
use super::workouts::workout_routes;
use crate::auth::{cors_layer, security_headers_layer, AuthService};
use crate::services::{
    DashboardService, GoalService, Mailer, NotificationService, NutritionService, StepService,
    UserService, WorkoutService,
};

pub fn create_routes(db: PgPool, jwt_secret: &str, mailer: Option<Mailer>) -> Router {
    let auth_service = AuthService::new(db.clone(), jwt_secret, mailer);

    let api = Router::new()
        .nest("/auth", auth_routes(auth_service.clone()))
        .nest(
            "/profile",
            profile_routes(UserService::new(db.clone()), auth_service.clone()),
        )
        .nest(
            "/workouts",
            workout_routes(WorkoutService::new(db.clone()), auth_service.clone()),
        )
        .nest(
            "/steps",
            step_routes(StepService::new(db.clone()), auth_service.clone()),
        )
        .nest(
            "/goals",
            goal_routes(GoalService::new(db.clone()), auth_service.clone()),
        )
        .nest(
            "/nutrition",
            nutrition_routes(NutritionService::new(db.clone()), auth_service.clone()),
        )
        .nest(
            "/notifications",
            notification_routes(NotificationService::new(db.clone()), auth_service.clone()),
        )
        .nest(
            "/dashboard",
            dashboard_routes(DashboardService::new(db), auth_service),
        );

    Router::new()
        .route("/health", get(health_check))
        .nest("/api/v1", api)
        .layer(security_headers_layer())
        .layer(cors_layer())
        .layer(TraceLayer::new_for_http())
}
