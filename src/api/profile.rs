use axum::{
    extract::State,
    http::StatusCode,
    middleware,
    response::Json,
    routing::get,
    Extension, Router,
};
use axum_extra::extract::WithRejection;

use super::error::{ApiError, ApiResult};
use crate::auth::{jwt_auth_middleware, AuthService, UserSession};
use crate::models::{UpdateProfileRequest, UserProfile};
use crate::services::UserService;

pub fn profile_routes(users: UserService, auth_service: AuthService) -> Router {
    Router::new()
        .route("/", get(get_profile).put(update_profile).delete(delete_account))
        .route_layer(middleware::from_fn_with_state(auth_service, jwt_auth_middleware))
        .with_state(users)
}

#[tracing::instrument(skip(users, session), fields(user_id = %session.user_id))]
async fn get_profile(
    State(users): State<UserService>,
    Extension(session): Extension<UserSession>,
) -> ApiResult<Json<UserProfile>> {
    let user = users
        .get_user_by_id(session.user_id)
        .await?
        .ok_or(ApiError::NotFound("User"))?;

    Ok(Json(UserProfile::from(user)))
}

#[tracing::instrument(skip(users, session, request), fields(user_id = %session.user_id))]
async fn update_profile(
    State(users): State<UserService>,
    Extension(session): Extension<UserSession>,
    WithRejection(Json(request), _): WithRejection<Json<UpdateProfileRequest>, ApiError>,
) -> ApiResult<Json<UserProfile>> {
    request.validate()?;

    let user = users
        .update_profile(session.user_id, request)
        .await?
        .ok_or(ApiError::NotFound("User"))?;

    Ok(Json(UserProfile::from(user)))
}

/// Deletes the account together with all of its data
#[tracing::instrument(skip(users, session), fields(user_id = %session.user_id))]
async fn delete_account(
    State(users): State<UserService>,
    Extension(session): Extension<UserSession>,
) -> ApiResult<StatusCode> {
    if !users.delete_user(session.user_id).await? {
        return Err(ApiError::NotFound("User"));
    }

    tracing::info!("Deleted account {}", session.user_id);
    Ok(StatusCode::NO_CONTENT)
}
