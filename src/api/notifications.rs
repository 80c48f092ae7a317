use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    middleware,
    response::Json,
    routing::{delete, get, put},
    Extension, Router,
};
use axum_extra::extract::WithRejection;
use uuid::Uuid;

use super::error::{ApiError, ApiResult};
use crate::auth::{jwt_auth_middleware, AuthService, MessageResponse, UserSession};
use crate::models::{
    Notification, NotificationQuery, ReminderSettings, UnreadCount, UpdateReminderSettingsRequest,
};
use crate::services::NotificationService;

pub fn notification_routes(notifications: NotificationService, auth_service: AuthService) -> Router {
    Router::new()
        .route("/", get(list_notifications))
        .route("/unread-count", get(unread_count))
        .route("/read-all", put(mark_all_read))
        .route("/reminders", get(get_reminder_settings).put(update_reminder_settings))
        .route("/:id", delete(delete_notification))
        .route("/:id/read", put(mark_read))
        .route_layer(middleware::from_fn_with_state(auth_service, jwt_auth_middleware))
        .with_state(notifications)
}

#[tracing::instrument(skip(notifications, session, query), fields(user_id = %session.user_id))]
async fn list_notifications(
    State(notifications): State<NotificationService>,
    Extension(session): Extension<UserSession>,
    WithRejection(Query(query), _): WithRejection<Query<NotificationQuery>, ApiError>,
) -> ApiResult<Json<Vec<Notification>>> {
    let list = notifications.list(session.user_id, query).await?;
    Ok(Json(list))
}

#[tracing::instrument(skip(notifications, session), fields(user_id = %session.user_id))]
async fn unread_count(
    State(notifications): State<NotificationService>,
    Extension(session): Extension<UserSession>,
) -> ApiResult<Json<UnreadCount>> {
    let unread = notifications.unread_count(session.user_id).await?;
    Ok(Json(UnreadCount { unread }))
}

#[tracing::instrument(skip(notifications, session), fields(user_id = %session.user_id))]
async fn mark_read(
    State(notifications): State<NotificationService>,
    Extension(session): Extension<UserSession>,
    WithRejection(Path(notification_id), _): WithRejection<Path<Uuid>, ApiError>,
) -> ApiResult<Json<Notification>> {
    let notification = notifications
        .mark_read(notification_id, session.user_id)
        .await?
        .ok_or(ApiError::NotFound("Notification"))?;

    Ok(Json(notification))
}

#[tracing::instrument(skip(notifications, session), fields(user_id = %session.user_id))]
async fn mark_all_read(
    State(notifications): State<NotificationService>,
    Extension(session): Extension<UserSession>,
) -> ApiResult<Json<MessageResponse>> {
    let updated = notifications.mark_all_read(session.user_id).await?;
    Ok(Json(MessageResponse::new(format!(
        "{} notifications marked as read",
        updated
    ))))
}

#[tracing::instrument(skip(notifications, session), fields(user_id = %session.user_id))]
async fn delete_notification(
    State(notifications): State<NotificationService>,
    Extension(session): Extension<UserSession>,
    WithRejection(Path(notification_id), _): WithRejection<Path<Uuid>, ApiError>,
) -> ApiResult<StatusCode> {
    if !notifications.delete(notification_id, session.user_id).await? {
        return Err(ApiError::NotFound("Notification"));
    }

    Ok(StatusCode::NO_CONTENT)
}

#[tracing::instrument(skip(notifications, session), fields(user_id = %session.user_id))]
async fn get_reminder_settings(
    State(notifications): State<NotificationService>,
    Extension(session): Extension<UserSession>,
) -> ApiResult<Json<ReminderSettings>> {
    let settings = notifications.get_reminder_settings(session.user_id).await?;
    Ok(Json(settings))
}

#[tracing::instrument(skip(notifications, session, request), fields(user_id = %session.user_id))]
async fn update_reminder_settings(
    State(notifications): State<NotificationService>,
    Extension(session): Extension<UserSession>,
    WithRejection(Json(request), _): WithRejection<Json<UpdateReminderSettingsRequest>, ApiError>,
) -> ApiResult<Json<ReminderSettings>> {
    request.validate()?;

    let settings = notifications
        .update_reminder_settings(session.user_id, request)
        .await?;
    Ok(Json(settings))
}
