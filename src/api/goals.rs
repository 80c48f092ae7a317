use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    middleware,
    response::Json,
    routing::{get, post},
    Extension, Router,
};
use axum_extra::extract::WithRejection;
use chrono::Utc;
use uuid::Uuid;

use super::error::{ApiError, ApiResult};
use crate::auth::{jwt_auth_middleware, AuthService, UserSession};
use crate::models::{
    CreateGoalRequest, GoalProgressHistory, GoalQuery, GoalView, GoalsSummary,
    RecordProgressRequest, UpdateGoalRequest,
};
use crate::services::GoalService;

pub fn goal_routes(goals: GoalService, auth_service: AuthService) -> Router {
    Router::new()
        .route("/", get(list_goals).post(create_goal))
        .route("/summary", get(get_summary))
        .route("/:id", get(get_goal).put(update_goal).delete(delete_goal))
        .route("/:id/progress", get(get_progress).post(record_progress))
        .route("/:id/sync", post(sync_progress))
        .route_layer(middleware::from_fn_with_state(auth_service, jwt_auth_middleware))
        .with_state(goals)
}

#[tracing::instrument(skip(goals, session, request), fields(user_id = %session.user_id))]
async fn create_goal(
    State(goals): State<GoalService>,
    Extension(session): Extension<UserSession>,
    WithRejection(Json(request), _): WithRejection<Json<CreateGoalRequest>, ApiError>,
) -> ApiResult<(StatusCode, Json<GoalView>)> {
    let today = Utc::now().date_naive();
    request.validate(today)?;

    let goal = goals.create_goal(session.user_id, request).await?;
    Ok((StatusCode::CREATED, Json(GoalView::new(goal, today))))
}

#[tracing::instrument(skip(goals, session, query), fields(user_id = %session.user_id))]
async fn list_goals(
    State(goals): State<GoalService>,
    Extension(session): Extension<UserSession>,
    WithRejection(Query(query), _): WithRejection<Query<GoalQuery>, ApiError>,
) -> ApiResult<Json<Vec<GoalView>>> {
    let today = Utc::now().date_naive();

    let views = goals
        .list_goals(session.user_id, query)
        .await?
        .into_iter()
        .map(|goal| GoalView::new(goal, today))
        .collect();

    Ok(Json(views))
}

#[tracing::instrument(skip(goals, session), fields(user_id = %session.user_id))]
async fn get_goal(
    State(goals): State<GoalService>,
    Extension(session): Extension<UserSession>,
    WithRejection(Path(goal_id), _): WithRejection<Path<Uuid>, ApiError>,
) -> ApiResult<Json<GoalView>> {
    let goal = goals
        .get_goal(goal_id, session.user_id)
        .await?
        .ok_or(ApiError::NotFound("Goal"))?;

    Ok(Json(GoalView::new(goal, Utc::now().date_naive())))
}

#[tracing::instrument(skip(goals, session, request), fields(user_id = %session.user_id))]
async fn update_goal(
    State(goals): State<GoalService>,
    Extension(session): Extension<UserSession>,
    WithRejection(Path(goal_id), _): WithRejection<Path<Uuid>, ApiError>,
    WithRejection(Json(request), _): WithRejection<Json<UpdateGoalRequest>, ApiError>,
) -> ApiResult<Json<GoalView>> {
    let existing = goals
        .get_goal(goal_id, session.user_id)
        .await?
        .ok_or(ApiError::NotFound("Goal"))?;
    request.validate(existing.start_date)?;

    let goal = goals
        .update_goal(goal_id, session.user_id, request)
        .await?
        .ok_or(ApiError::NotFound("Goal"))?;

    Ok(Json(GoalView::new(goal, Utc::now().date_naive())))
}

#[tracing::instrument(skip(goals, session), fields(user_id = %session.user_id))]
async fn delete_goal(
    State(goals): State<GoalService>,
    Extension(session): Extension<UserSession>,
    WithRejection(Path(goal_id), _): WithRejection<Path<Uuid>, ApiError>,
) -> ApiResult<StatusCode> {
    if !goals.delete_goal(goal_id, session.user_id).await? {
        return Err(ApiError::NotFound("Goal"));
    }

    Ok(StatusCode::NO_CONTENT)
}

#[tracing::instrument(skip(goals, session, request), fields(user_id = %session.user_id))]
async fn record_progress(
    State(goals): State<GoalService>,
    Extension(session): Extension<UserSession>,
    WithRejection(Path(goal_id), _): WithRejection<Path<Uuid>, ApiError>,
    WithRejection(Json(request), _): WithRejection<Json<RecordProgressRequest>, ApiError>,
) -> ApiResult<Json<GoalView>> {
    request.validate()?;

    let goal = goals
        .record_progress(goal_id, session.user_id, request)
        .await?
        .ok_or(ApiError::NotFound("Goal"))?;

    Ok(Json(GoalView::new(goal, Utc::now().date_naive())))
}

#[tracing::instrument(skip(goals, session), fields(user_id = %session.user_id))]
async fn get_progress(
    State(goals): State<GoalService>,
    Extension(session): Extension<UserSession>,
    WithRejection(Path(goal_id), _): WithRejection<Path<Uuid>, ApiError>,
) -> ApiResult<Json<GoalProgressHistory>> {
    let history = goals
        .progress_history(goal_id, session.user_id)
        .await?
        .ok_or(ApiError::NotFound("Goal"))?;

    Ok(Json(history))
}

#[tracing::instrument(skip(goals, session), fields(user_id = %session.user_id))]
async fn sync_progress(
    State(goals): State<GoalService>,
    Extension(session): Extension<UserSession>,
    WithRejection(Path(goal_id), _): WithRejection<Path<Uuid>, ApiError>,
) -> ApiResult<Json<GoalView>> {
    let goal = goals
        .get_goal(goal_id, session.user_id)
        .await?
        .ok_or(ApiError::NotFound("Goal"))?;

    if !goal.goal_type.is_tracked() {
        return Err(ApiError::BadRequest(
            "progress for this goal type is recorded manually".to_string(),
        ));
    }

    let today = Utc::now().date_naive();
    let goal = goals.sync_progress(goal, today).await?;
    Ok(Json(GoalView::new(goal, today)))
}

#[tracing::instrument(skip(goals, session), fields(user_id = %session.user_id))]
async fn get_summary(
    State(goals): State<GoalService>,
    Extension(session): Extension<UserSession>,
) -> ApiResult<Json<GoalsSummary>> {
    let summary = goals.summary(session.user_id).await?;
    Ok(Json(summary))
}
