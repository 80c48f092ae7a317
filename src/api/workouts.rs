use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    middleware,
    response::Json,
    routing::{get, post},
    Extension, Router,
};
use axum_extra::extract::WithRejection;
use uuid::Uuid;

use super::error::{ApiError, ApiResult};
use crate::auth::{jwt_auth_middleware, AuthService, UserSession};
use crate::models::{
    CalorieEstimate, CreateWorkoutRequest, DateRangeQuery, EstimateCaloriesRequest,
    UpdateWorkoutRequest, Workout, WorkoutQuery, WorkoutSummary,
};
use crate::services::WorkoutService;

pub fn workout_routes(workouts: WorkoutService, auth_service: AuthService) -> Router {
    Router::new()
        .route("/", get(list_workouts).post(create_workout))
        .route("/summary", get(get_summary))
        .route("/estimate", post(estimate_calories))
        .route(
            "/:id",
            get(get_workout).put(update_workout).delete(delete_workout),
        )
        .route_layer(middleware::from_fn_with_state(auth_service, jwt_auth_middleware))
        .with_state(workouts)
}

#[tracing::instrument(skip(workouts, session, request), fields(user_id = %session.user_id))]
async fn create_workout(
    State(workouts): State<WorkoutService>,
    Extension(session): Extension<UserSession>,
    WithRejection(Json(request), _): WithRejection<Json<CreateWorkoutRequest>, ApiError>,
) -> ApiResult<(StatusCode, Json<Workout>)> {
    request.validate()?;

    let workout = workouts.create_workout(session.user_id, request).await?;
    Ok((StatusCode::CREATED, Json(workout)))
}

#[tracing::instrument(skip(workouts, session, query), fields(user_id = %session.user_id))]
async fn list_workouts(
    State(workouts): State<WorkoutService>,
    Extension(session): Extension<UserSession>,
    WithRejection(Query(query), _): WithRejection<Query<WorkoutQuery>, ApiError>,
) -> ApiResult<Json<Vec<Workout>>> {
    DateRangeQuery {
        from: query.from,
        to: query.to,
    }
    .validate()?;

    let list = workouts.list_workouts(session.user_id, query).await?;
    Ok(Json(list))
}

#[tracing::instrument(skip(workouts, session), fields(user_id = %session.user_id))]
async fn get_workout(
    State(workouts): State<WorkoutService>,
    Extension(session): Extension<UserSession>,
    WithRejection(Path(workout_id), _): WithRejection<Path<Uuid>, ApiError>,
) -> ApiResult<Json<Workout>> {
    let workout = workouts
        .get_workout(workout_id, session.user_id)
        .await?
        .ok_or(ApiError::NotFound("Workout"))?;

    Ok(Json(workout))
}

#[tracing::instrument(skip(workouts, session, request), fields(user_id = %session.user_id))]
async fn update_workout(
    State(workouts): State<WorkoutService>,
    Extension(session): Extension<UserSession>,
    WithRejection(Path(workout_id), _): WithRejection<Path<Uuid>, ApiError>,
    WithRejection(Json(request), _): WithRejection<Json<UpdateWorkoutRequest>, ApiError>,
) -> ApiResult<Json<Workout>> {
    request.validate()?;

    let workout = workouts
        .update_workout(workout_id, session.user_id, request)
        .await?
        .ok_or(ApiError::NotFound("Workout"))?;

    Ok(Json(workout))
}

#[tracing::instrument(skip(workouts, session), fields(user_id = %session.user_id))]
async fn delete_workout(
    State(workouts): State<WorkoutService>,
    Extension(session): Extension<UserSession>,
    WithRejection(Path(workout_id), _): WithRejection<Path<Uuid>, ApiError>,
) -> ApiResult<StatusCode> {
    if !workouts.delete_workout(workout_id, session.user_id).await? {
        return Err(ApiError::NotFound("Workout"));
    }

    Ok(StatusCode::NO_CONTENT)
}

#[tracing::instrument(skip(workouts, session, range), fields(user_id = %session.user_id))]
async fn get_summary(
    State(workouts): State<WorkoutService>,
    Extension(session): Extension<UserSession>,
    WithRejection(Query(range), _): WithRejection<Query<DateRangeQuery>, ApiError>,
) -> ApiResult<Json<WorkoutSummary>> {
    range.validate()?;

    let summary = workouts.get_summary(session.user_id, range).await?;
    Ok(Json(summary))
}

#[tracing::instrument(skip(workouts, session, request), fields(user_id = %session.user_id))]
async fn estimate_calories(
    State(workouts): State<WorkoutService>,
    Extension(session): Extension<UserSession>,
    WithRejection(Json(request), _): WithRejection<Json<EstimateCaloriesRequest>, ApiError>,
) -> ApiResult<Json<CalorieEstimate>> {
    request.validate()?;

    let estimate = workouts.estimate(session.user_id, request).await?;
    Ok(Json(estimate))
}
