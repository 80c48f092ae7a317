use axum::{
    extract::{Query, State},
    middleware,
    response::Json,
    routing::get,
    Extension, Router,
};
use axum_extra::extract::WithRejection;
use chrono::Utc;

use super::error::{ApiError, ApiResult};
use super::nutrition::DayQuery;
use crate::auth::{jwt_auth_middleware, AuthService, UserSession};
use crate::models::DailyOverview;
use crate::services::DashboardService;

pub fn dashboard_routes(dashboard: DashboardService, auth_service: AuthService) -> Router {
    Router::new()
        .route("/", get(daily_overview))
        .route_layer(middleware::from_fn_with_state(auth_service, jwt_auth_middleware))
        .with_state(dashboard)
}

#[tracing::instrument(skip(dashboard, session, query), fields(user_id = %session.user_id))]
async fn daily_overview(
    State(dashboard): State<DashboardService>,
    Extension(session): Extension<UserSession>,
    WithRejection(Query(query), _): WithRejection<Query<DayQuery>, ApiError>,
) -> ApiResult<Json<DailyOverview>> {
    let date = query.date.unwrap_or_else(|| Utc::now().date_naive());

    let overview = dashboard.daily_overview(session.user_id, date).await?;
    Ok(Json(overview))
}
