use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    middleware,
    response::Json,
    routing::get,
    Extension, Router,
};
use axum_extra::extract::WithRejection;
use chrono::{NaiveDate, Utc};
use serde::Deserialize;
use uuid::Uuid;

use super::error::{ApiError, ApiResult};
use crate::auth::{jwt_auth_middleware, AuthService, UserSession};
use crate::models::{
    CreateFoodEntryRequest, DailyNutritionSummary, DateRangeQuery, FoodEntry, FoodQuery,
    UpdateFoodEntryRequest,
};
use crate::services::NutritionService;

#[derive(Debug, Deserialize)]
pub struct DayQuery {
    pub date: Option<NaiveDate>,
}

pub fn nutrition_routes(nutrition: NutritionService, auth_service: AuthService) -> Router {
    Router::new()
        .route("/entries", get(list_entries).post(create_entry))
        .route(
            "/entries/:id",
            get(get_entry).put(update_entry).delete(delete_entry),
        )
        .route("/summary", get(daily_summary))
        .route_layer(middleware::from_fn_with_state(auth_service, jwt_auth_middleware))
        .with_state(nutrition)
}

#[tracing::instrument(skip(nutrition, session, request), fields(user_id = %session.user_id))]
async fn create_entry(
    State(nutrition): State<NutritionService>,
    Extension(session): Extension<UserSession>,
    WithRejection(Json(request), _): WithRejection<Json<CreateFoodEntryRequest>, ApiError>,
) -> ApiResult<(StatusCode, Json<FoodEntry>)> {
    request.validate()?;

    let entry = nutrition.create_entry(session.user_id, request).await?;
    Ok((StatusCode::CREATED, Json(entry)))
}

#[tracing::instrument(skip(nutrition, session, query), fields(user_id = %session.user_id))]
async fn list_entries(
    State(nutrition): State<NutritionService>,
    Extension(session): Extension<UserSession>,
    WithRejection(Query(query), _): WithRejection<Query<FoodQuery>, ApiError>,
) -> ApiResult<Json<Vec<FoodEntry>>> {
    DateRangeQuery {
        from: query.from,
        to: query.to,
    }
    .validate()?;

    let entries = nutrition.list_entries(session.user_id, query).await?;
    Ok(Json(entries))
}

#[tracing::instrument(skip(nutrition, session), fields(user_id = %session.user_id))]
async fn get_entry(
    State(nutrition): State<NutritionService>,
    Extension(session): Extension<UserSession>,
    WithRejection(Path(entry_id), _): WithRejection<Path<Uuid>, ApiError>,
) -> ApiResult<Json<FoodEntry>> {
    let entry = nutrition
        .get_entry(entry_id, session.user_id)
        .await?
        .ok_or(ApiError::NotFound("Food entry"))?;

    Ok(Json(entry))
}

#[tracing::instrument(skip(nutrition, session, request), fields(user_id = %session.user_id))]
async fn update_entry(
    State(nutrition): State<NutritionService>,
    Extension(session): Extension<UserSession>,
    WithRejection(Path(entry_id), _): WithRejection<Path<Uuid>, ApiError>,
    WithRejection(Json(request), _): WithRejection<Json<UpdateFoodEntryRequest>, ApiError>,
) -> ApiResult<Json<FoodEntry>> {
    request.validate()?;

    let entry = nutrition
        .update_entry(entry_id, session.user_id, request)
        .await?
        .ok_or(ApiError::NotFound("Food entry"))?;

    Ok(Json(entry))
}

#[tracing::instrument(skip(nutrition, session), fields(user_id = %session.user_id))]
async fn delete_entry(
    State(nutrition): State<NutritionService>,
    Extension(session): Extension<UserSession>,
    WithRejection(Path(entry_id), _): WithRejection<Path<Uuid>, ApiError>,
) -> ApiResult<StatusCode> {
    if !nutrition.delete_entry(entry_id, session.user_id).await? {
        return Err(ApiError::NotFound("Food entry"));
    }

    Ok(StatusCode::NO_CONTENT)
}

/// Totals for `date`, today when omitted
#[tracing::instrument(skip(nutrition, session, query), fields(user_id = %session.user_id))]
async fn daily_summary(
    State(nutrition): State<NutritionService>,
    Extension(session): Extension<UserSession>,
    WithRejection(Query(query), _): WithRejection<Query<DayQuery>, ApiError>,
) -> ApiResult<Json<DailyNutritionSummary>> {
    let date = query.date.unwrap_or_else(|| Utc::now().date_naive());

    let summary = nutrition.daily_summary(session.user_id, date).await?;
    Ok(Json(summary))
}
