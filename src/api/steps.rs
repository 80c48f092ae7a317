use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    middleware,
    response::Json,
    routing::get,
    Extension, Router,
};
use axum_extra::extract::WithRejection;
use chrono::{Duration, NaiveDate, Utc};

use super::error::{ApiError, ApiResult};
use crate::auth::{jwt_auth_middleware, AuthService, UserSession};
use crate::models::{DailyStepSummary, DateRangeQuery, RecordStepsRequest, StepEntry, StepStats};
use crate::services::StepService;

/// Days covered by history and stats when no range is given
const DEFAULT_RANGE_DAYS: i64 = 30;

pub fn step_routes(steps: StepService, auth_service: AuthService) -> Router {
    Router::new()
        .route("/", get(get_history).post(record_steps))
        .route("/stats", get(get_stats))
        .route("/:date", get(get_day).delete(delete_day))
        .route_layer(middleware::from_fn_with_state(auth_service, jwt_auth_middleware))
        .with_state(steps)
}

/// `to` defaults to today and `from` to the 30 days ending at `to`
fn resolve_range(range: &DateRangeQuery) -> Result<(NaiveDate, NaiveDate), ApiError> {
    range.validate()?;
    let to = range.to.unwrap_or_else(|| Utc::now().date_naive());
    let from = range
        .from
        .unwrap_or_else(|| to - Duration::days(DEFAULT_RANGE_DAYS - 1));
    if from > to {
        return Err(ApiError::BadRequest("from cannot be after to".to_string()));
    }
    Ok((from, to))
}

#[tracing::instrument(skip(steps, session, request), fields(user_id = %session.user_id))]
async fn record_steps(
    State(steps): State<StepService>,
    Extension(session): Extension<UserSession>,
    WithRejection(Json(request), _): WithRejection<Json<RecordStepsRequest>, ApiError>,
) -> ApiResult<Json<DailyStepSummary>> {
    request.validate(Utc::now().date_naive())?;

    let summary = steps.record_steps(session.user_id, request).await?;
    Ok(Json(summary))
}

#[tracing::instrument(skip(steps, session), fields(user_id = %session.user_id))]
async fn get_day(
    State(steps): State<StepService>,
    Extension(session): Extension<UserSession>,
    WithRejection(Path(date), _): WithRejection<Path<NaiveDate>, ApiError>,
) -> ApiResult<Json<DailyStepSummary>> {
    let summary = steps.get_day(session.user_id, date).await?;
    Ok(Json(summary))
}

#[tracing::instrument(skip(steps, session, range), fields(user_id = %session.user_id))]
async fn get_history(
    State(steps): State<StepService>,
    Extension(session): Extension<UserSession>,
    WithRejection(Query(range), _): WithRejection<Query<DateRangeQuery>, ApiError>,
) -> ApiResult<Json<Vec<StepEntry>>> {
    let (from, to) = resolve_range(&range)?;

    let history = steps.history(session.user_id, from, to).await?;
    Ok(Json(history))
}

#[tracing::instrument(skip(steps, session, range), fields(user_id = %session.user_id))]
async fn get_stats(
    State(steps): State<StepService>,
    Extension(session): Extension<UserSession>,
    WithRejection(Query(range), _): WithRejection<Query<DateRangeQuery>, ApiError>,
) -> ApiResult<Json<StepStats>> {
    let (from, to) = resolve_range(&range)?;

    let stats = steps.stats(session.user_id, from, to).await?;
    Ok(Json(stats))
}

#[tracing::instrument(skip(steps, session), fields(user_id = %session.user_id))]
async fn delete_day(
    State(steps): State<StepService>,
    Extension(session): Extension<UserSession>,
    WithRejection(Path(date), _): WithRejection<Path<NaiveDate>, ApiError>,
) -> ApiResult<StatusCode> {
    if !steps.delete_day(session.user_id, date).await? {
        return Err(ApiError::NotFound("Step entry"));
    }

    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn test_default_range_is_thirty_days() {
        let to = NaiveDate::from_ymd_opt(2024, 5, 31).unwrap();
        let (from, resolved_to) = resolve_range(&DateRangeQuery {
            from: None,
            to: Some(to),
        })
        .unwrap();

        assert_eq!(resolved_to, to);
        assert_eq!(from, NaiveDate::from_ymd_opt(2024, 5, 2).unwrap());
    }

    #[test]
    fn test_from_after_defaulted_to_is_rejected() {
        let future = Utc::now().date_naive() + Duration::days(3);
        assert_matches!(
            resolve_range(&DateRangeQuery {
                from: Some(future),
                to: None,
            }),
            Err(ApiError::BadRequest(_))
        );
    }
}
