use axum::{
    extract::State,
    http::StatusCode,
    middleware,
    response::Json,
    routing::post,
    Extension, Router,
};
use axum_extra::{
    extract::WithRejection,
    headers::{authorization::Bearer, Authorization},
    TypedHeader,
};

use super::error::{ApiError, ApiResult};
use crate::auth::{
    jwt_auth_middleware, AuthResponse, AuthService, ChangePasswordRequest, ForgotPasswordRequest,
    LoginRequest, MessageResponse, RefreshTokenRequest, RegisterRequest, ResetPasswordRequest,
    TokenResponse, UserSession,
};

/// Authentication routes
pub fn auth_routes(auth_service: AuthService) -> Router {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/refresh", post(refresh_token))
        .route("/forgot-password", post(forgot_password))
        .route("/reset-password", post(reset_password))
        .route(
            "/logout",
            post(logout).route_layer(middleware::from_fn_with_state(
                auth_service.clone(),
                jwt_auth_middleware,
            )),
        )
        .route(
            "/change-password",
            post(change_password).route_layer(middleware::from_fn_with_state(
                auth_service.clone(),
                jwt_auth_middleware,
            )),
        )
        .with_state(auth_service)
}

#[tracing::instrument(skip(auth_service, request))]
async fn register(
    State(auth_service): State<AuthService>,
    WithRejection(Json(request), _): WithRejection<Json<RegisterRequest>, ApiError>,
) -> ApiResult<(StatusCode, Json<AuthResponse>)> {
    let response = auth_service.register(request).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

#[tracing::instrument(skip(auth_service, request))]
async fn login(
    State(auth_service): State<AuthService>,
    WithRejection(Json(request), _): WithRejection<Json<LoginRequest>, ApiError>,
) -> ApiResult<Json<AuthResponse>> {
    let response = auth_service.login(request).await?;
    Ok(Json(response))
}

#[tracing::instrument(skip(auth_service, request))]
async fn refresh_token(
    State(auth_service): State<AuthService>,
    WithRejection(Json(request), _): WithRejection<Json<RefreshTokenRequest>, ApiError>,
) -> ApiResult<Json<TokenResponse>> {
    let response = auth_service.refresh_token(request).await?;
    Ok(Json(response))
}

/// The middleware has already validated the token; it is blacklisted here
#[tracing::instrument(skip(auth_service, bearer))]
async fn logout(
    State(auth_service): State<AuthService>,
    TypedHeader(Authorization(bearer)): TypedHeader<Authorization<Bearer>>,
) -> ApiResult<Json<MessageResponse>> {
    let response = auth_service.logout(bearer.token()).await?;
    Ok(Json(response))
}

#[tracing::instrument(skip(auth_service, session, request), fields(user_id = %session.user_id))]
async fn change_password(
    State(auth_service): State<AuthService>,
    Extension(session): Extension<UserSession>,
    WithRejection(Json(request), _): WithRejection<Json<ChangePasswordRequest>, ApiError>,
) -> ApiResult<Json<MessageResponse>> {
    let response = auth_service.change_password(session.user_id, request).await?;
    Ok(Json(response))
}

#[tracing::instrument(skip(auth_service, request))]
async fn forgot_password(
    State(auth_service): State<AuthService>,
    WithRejection(Json(request), _): WithRejection<Json<ForgotPasswordRequest>, ApiError>,
) -> ApiResult<Json<MessageResponse>> {
    let response = auth_service.forgot_password(request).await?;
    Ok(Json(response))
}

#[tracing::instrument(skip(auth_service, request))]
async fn reset_password(
    State(auth_service): State<AuthService>,
    WithRejection(Json(request), _): WithRejection<Json<ResetPasswordRequest>, ApiError>,
) -> ApiResult<Json<MessageResponse>> {
    let response = auth_service.reset_password(request).await?;
    Ok(Json(response))
}
