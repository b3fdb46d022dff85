//! HTTP API endpoint handlers.

use std::{str::FromStr, sync::Arc};

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::{
    domain::{
        DomainEvent, MessageContent, MessageId, NotificationId, ProjectId, ValueObjectError,
    },
    infrastructure::dto::{
        http::{
            ErrorResponse, EventAcceptedResponse, MarkAllReadResponse, MarkReadRequest,
            MessageDeletedResponse, SendMessageRequest, SuccessResponse,
        },
        resource::{MessageDto, NotificationDto},
    },
    ui::{auth::AuthenticatedUser, state::AppState},
    usecase::{ErrorKind, UseCaseError},
};

/// HTTP API のエラー
#[derive(Debug)]
pub enum ApiError {
    /// `x-user-id` が無い、または不正
    Unauthenticated,
    /// リクエストの値が不正
    BadRequest(String),
    /// 認証済みユーザーと本文のユーザーが一致しない
    Forbidden(String),
    /// UseCase のエラー
    UseCase { kind: ErrorKind, message: String },
}

impl<E: UseCaseError> From<E> for ApiError {
    fn from(error: E) -> Self {
        Self::UseCase {
            kind: error.kind(),
            message: error.to_string(),
        }
    }
}

impl From<ValueObjectError> for ApiError {
    fn from(error: ValueObjectError) -> Self {
        Self::BadRequest(error.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            Self::Unauthenticated => (
                StatusCode::UNAUTHORIZED,
                "missing or invalid x-user-id header".to_string(),
            ),
            Self::BadRequest(message) => (StatusCode::BAD_REQUEST, message),
            Self::Forbidden(message) => (StatusCode::FORBIDDEN, message),
            Self::UseCase { kind, message } => {
                let status = match kind {
                    ErrorKind::Validation => StatusCode::BAD_REQUEST,
                    ErrorKind::Authorization => StatusCode::FORBIDDEN,
                    ErrorKind::NotFound => StatusCode::NOT_FOUND,
                    ErrorKind::Transient => StatusCode::SERVICE_UNAVAILABLE,
                };
                if status == StatusCode::SERVICE_UNAVAILABLE {
                    tracing::error!("Request failed: {}", message);
                }
                (status, message)
            }
        };
        (status, Json(ErrorResponse { error: message })).into_response()
    }
}

/// Health check endpoint
pub async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({"status": "ok"}))
}

/// `GET /api/projects/{project_id}/messages`
pub async fn list_messages(
    State(state): State<Arc<AppState>>,
    AuthenticatedUser(user_id): AuthenticatedUser,
    Path(project_id): Path<String>,
) -> Result<Json<Vec<MessageDto>>, ApiError> {
    let project_id = ProjectId::try_from(project_id)?;
    let views = state
        .get_messages_usecase
        .execute(&user_id, &project_id)
        .await?;
    Ok(Json(views.iter().map(MessageDto::from).collect()))
}

/// `POST /api/messages`
pub async fn send_message(
    State(state): State<Arc<AppState>>,
    AuthenticatedUser(user_id): AuthenticatedUser,
    Json(request): Json<SendMessageRequest>,
) -> Result<(StatusCode, Json<MessageDto>), ApiError> {
    let project_id = ProjectId::try_from(request.project_id)?;
    let content = MessageContent::from_parts(request.text, request.image, request.video)?;
    let sent = state
        .send_message_usecase
        .execute(user_id, project_id, content)
        .await?;
    Ok((StatusCode::CREATED, Json(MessageDto::from(&sent.view))))
}

/// `PUT /api/messages/read`
pub async fn mark_messages_read(
    State(state): State<Arc<AppState>>,
    AuthenticatedUser(user_id): AuthenticatedUser,
    Json(request): Json<MarkReadRequest>,
) -> Result<Json<SuccessResponse>, ApiError> {
    let message_ids = request
        .message_ids
        .iter()
        .map(|id| MessageId::from_str(id))
        .collect::<Result<Vec<_>, _>>()?;
    state
        .mark_messages_read_usecase
        .execute(&user_id, &message_ids, None)
        .await?;
    Ok(Json(SuccessResponse { success: true }))
}

/// `DELETE /api/messages/{message_id}`
pub async fn delete_message(
    State(state): State<Arc<AppState>>,
    AuthenticatedUser(user_id): AuthenticatedUser,
    Path(message_id): Path<String>,
) -> Result<Json<MessageDeletedResponse>, ApiError> {
    let message_id = MessageId::from_str(&message_id)?;
    let deleted = state
        .delete_message_usecase
        .execute(&message_id, &user_id)
        .await?;
    Ok(Json(MessageDeletedResponse {
        message_id: deleted.id.to_string(),
    }))
}

/// `GET /api/notifications`
pub async fn list_notifications(
    State(state): State<Arc<AppState>>,
    AuthenticatedUser(user_id): AuthenticatedUser,
) -> Result<Json<Vec<NotificationDto>>, ApiError> {
    let notifications = state.get_notifications_usecase.execute(&user_id).await?;
    Ok(Json(
        notifications.iter().map(NotificationDto::from).collect(),
    ))
}

/// `PUT /api/notifications/{notification_id}/read`
pub async fn mark_notification_read(
    State(state): State<Arc<AppState>>,
    AuthenticatedUser(user_id): AuthenticatedUser,
    Path(notification_id): Path<String>,
) -> Result<Json<NotificationDto>, ApiError> {
    let notification_id = NotificationId::from_str(&notification_id)?;
    let notification = state
        .update_notification_usecase
        .mark_read(&notification_id, &user_id)
        .await?;
    Ok(Json(NotificationDto::from(&notification)))
}

/// `PUT /api/notifications/read-all`
pub async fn mark_all_notifications_read(
    State(state): State<Arc<AppState>>,
    AuthenticatedUser(user_id): AuthenticatedUser,
) -> Result<Json<MarkAllReadResponse>, ApiError> {
    let updated = state
        .update_notification_usecase
        .mark_all_read(&user_id)
        .await?;
    Ok(Json(MarkAllReadResponse { updated }))
}

/// `DELETE /api/notifications/{notification_id}`
pub async fn delete_notification(
    State(state): State<Arc<AppState>>,
    AuthenticatedUser(user_id): AuthenticatedUser,
    Path(notification_id): Path<String>,
) -> Result<Json<SuccessResponse>, ApiError> {
    let notification_id = NotificationId::from_str(&notification_id)?;
    state
        .delete_notification_usecase
        .execute(&notification_id, &user_id)
        .await?;
    Ok(Json(SuccessResponse { success: true }))
}

/// `POST /api/events`
///
/// プロジェクト管理側で起きたイベントの通知を開始する（配信の完了は待たない）。
pub async fn post_event(
    State(state): State<Arc<AppState>>,
    AuthenticatedUser(user_id): AuthenticatedUser,
    Json(event): Json<DomainEvent>,
) -> Result<(StatusCode, Json<EventAcceptedResponse>), ApiError> {
    if event.actor_id() != &user_id {
        return Err(ApiError::Forbidden(format!(
            "event actor '{}' does not match the authenticated user",
            event.actor_id()
        )));
    }
    let dispatch = state.notify_domain_event_usecase.execute(event).await?;
    Ok((
        StatusCode::ACCEPTED,
        Json(EventAcceptedResponse {
            accepted: true,
            recipients: dispatch.recipients,
        }),
    ))
}
