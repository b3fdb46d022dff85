//! WebSocket connection handlers.
//!
//! 接続ごとに 2 つのタスクを動かします。
//!
//! - 受信タスク: クライアントのイベントを 1 つずつ順に処理する（同じ接続の送信は順序通りに永続化・配信される）
//! - pusher タスク: 送信キューのイベントをソケットに書き込む
//!
//! どちらかが終了したらもう一方を止め、切断処理を行います。

use std::{str::FromStr, sync::Arc};

use axum::{
    extract::{
        Query, State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    http::StatusCode,
    response::IntoResponse,
};
use futures_util::{sink::SinkExt, stream::StreamExt};
use serde::Deserialize;
use tokio::sync::mpsc;

use crate::{
    domain::{MessageContent, MessageId, ProjectId, RoomEvent, UserId, ValueObjectError},
    infrastructure::dto::websocket::{
        ClientEvent, DeleteMessagePayload, MarkReadPayload, SendMessagePayload,
    },
    ui::{MAX_INBOUND_BYTES, state::AppState},
    usecase::{ConnectedSession, ErrorKind, UseCaseError},
};

/// Query parameters for WebSocket connection
#[derive(Debug, Deserialize)]
pub struct ConnectQuery {
    pub user_id: String,
}

/// 受信イベントの拒否理由（`error` イベントとして接続に返す）
#[derive(Debug, Clone, PartialEq, Eq)]
struct Rejection {
    code: &'static str,
    message: String,
}

impl Rejection {
    fn bad_request(message: impl Into<String>) -> Self {
        Self {
            code: "bad_request",
            message: message.into(),
        }
    }

    fn forbidden(message: impl Into<String>) -> Self {
        Self {
            code: "forbidden",
            message: message.into(),
        }
    }
}

impl<E: UseCaseError> From<E> for Rejection {
    fn from(error: E) -> Self {
        let code = match error.kind() {
            ErrorKind::Validation => "validation",
            ErrorKind::Authorization => "forbidden",
            ErrorKind::NotFound => "not_found",
            ErrorKind::Transient => "unavailable",
        };
        Self {
            code,
            message: error.to_string(),
        }
    }
}

impl From<ValueObjectError> for Rejection {
    fn from(error: ValueObjectError) -> Self {
        Self {
            code: "validation",
            message: error.to_string(),
        }
    }
}

pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
    Query(query): Query<ConnectQuery>,
) -> Result<impl IntoResponse, StatusCode> {
    let user_id = match UserId::try_from(query.user_id.as_str()) {
        Ok(id) => id,
        Err(e) => {
            tracing::warn!("Rejected WebSocket connection: {}", e);
            return Err(StatusCode::BAD_REQUEST);
        }
    };

    // メディアを含む send_message は 1 フレームで既定の上限（16 MiB）を超えうる
    Ok(ws
        .max_frame_size(MAX_INBOUND_BYTES)
        .max_message_size(MAX_INBOUND_BYTES)
        .on_upgrade(move |socket| handle_socket(socket, state, user_id)))
}

/// Spawns a task that drains the outbound queue into the WebSocket sink.
///
/// # Returns
///
/// A `JoinHandle` for the spawned task
fn pusher_loop(
    mut rx: mpsc::Receiver<String>,
    mut sender: futures_util::stream::SplitSink<WebSocket, Message>,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            if sender.send(Message::Text(msg.into())).await.is_err() {
                break;
            }
        }
    })
}

async fn handle_socket(socket: WebSocket, state: Arc<AppState>, user_id: UserId) {
    let (tx, rx) = mpsc::channel(state.outbound_buffer);
    let session = state.connect_session_usecase.execute(user_id, tx).await;
    let connection_id = session.connection_id;

    let (sender, mut receiver) = socket.split();

    let state_clone = state.clone();
    let mut recv_task = tokio::spawn(async move {
        while let Some(msg) = receiver.next().await {
            let msg = match msg {
                Ok(msg) => msg,
                Err(e) => {
                    tracing::warn!("WebSocket error on '{}': {}", session.connection_id, e);
                    break;
                }
            };

            match msg {
                Message::Text(text) => {
                    tracing::debug!("Received from '{}': {}", session.user_id, text.as_str());
                    handle_text(&state_clone, &session, text.as_str()).await;
                }
                Message::Ping(_) => {
                    tracing::debug!("Received ping");
                    // Ping/pong is handled automatically by the WebSocket protocol
                }
                Message::Close(_) => {
                    tracing::info!("'{}' requested close", session.user_id);
                    break;
                }
                _ => {}
            }
        }
    });

    let mut send_task = pusher_loop(rx, sender);

    // If any one of the tasks completes, abort the other
    tokio::select! {
        _ = &mut recv_task => send_task.abort(),
        _ = &mut send_task => recv_task.abort(),
    };

    state
        .disconnect_session_usecase
        .execute(&connection_id)
        .await;
}

/// 1 つのテキストフレームを処理し、拒否した場合は `error` を返す
async fn handle_text(state: &AppState, session: &ConnectedSession, text: &str) {
    let result = match serde_json::from_str::<ClientEvent>(text) {
        Ok(event) => dispatch(state, session, event).await,
        Err(e) => Err(Rejection::bad_request(format!("unreadable event: {}", e))),
    };

    if let Err(rejection) = result {
        tracing::info!(
            "Rejected event from '{}': {} ({})",
            session.user_id,
            rejection.message,
            rejection.code
        );
        let event = RoomEvent::Rejected {
            code: rejection.code.to_string(),
            message: rejection.message,
        };
        if let Err(e) = state
            .message_pusher
            .push_to(&session.connection_id, &event)
            .await
        {
            tracing::warn!("Failed to send error to '{}': {}", session.connection_id, e);
        }
    }
}

async fn dispatch(
    state: &AppState,
    session: &ConnectedSession,
    event: ClientEvent,
) -> Result<(), Rejection> {
    let connection_id = &session.connection_id;
    match event {
        ClientEvent::JoinUser(user_id) => {
            state
                .join_channel_usecase
                .join_user(connection_id, UserId::try_from(user_id)?)
                .await?;
        }
        ClientEvent::JoinProject(project_id) => {
            state
                .join_channel_usecase
                .join_project(connection_id, ProjectId::try_from(project_id)?)
                .await?;
        }
        ClientEvent::LeaveProject(project_id) => {
            state
                .join_channel_usecase
                .leave_project(connection_id, ProjectId::try_from(project_id)?)
                .await?;
        }
        ClientEvent::SendMessage(payload) => send_message(state, session, payload).await?,
        ClientEvent::DeleteMessage(payload) => delete_message(state, session, payload).await?,
        ClientEvent::MarkRead(payload) => mark_read(state, session, payload).await?,
    }
    Ok(())
}

/// 本文のユーザーが接続のユーザーと一致することを確認する
fn ensure_self(session: &ConnectedSession, claimed: Option<&str>) -> Result<(), Rejection> {
    match claimed {
        Some(claimed) if claimed.trim() != session.user_id.as_str() => Err(Rejection::forbidden(
            format!("'{}' cannot act as '{}'", session.user_id, claimed),
        )),
        _ => Ok(()),
    }
}

async fn send_message(
    state: &AppState,
    session: &ConnectedSession,
    payload: SendMessagePayload,
) -> Result<(), Rejection> {
    ensure_self(session, payload.sender_id.as_deref())?;
    let project_id = ProjectId::try_from(payload.project_id)?;
    let content = MessageContent::from_parts(payload.text, payload.image, payload.video)?;

    // 通知ファンアウトは待たずに次のイベントへ進む
    state
        .send_message_usecase
        .execute(session.user_id.clone(), project_id, content)
        .await?;
    Ok(())
}

async fn delete_message(
    state: &AppState,
    session: &ConnectedSession,
    payload: DeleteMessagePayload,
) -> Result<(), Rejection> {
    let message_id = MessageId::from_str(&payload.message_id)?;
    let deleted = state
        .delete_message_usecase
        .execute(&message_id, &session.user_id)
        .await?;
    if let Some(claimed) = payload.project_id
        && claimed != deleted.project_id.as_str()
    {
        tracing::debug!(
            "delete_message named project '{}' but message belonged to '{}'",
            claimed,
            deleted.project_id
        );
    }
    Ok(())
}

async fn mark_read(
    state: &AppState,
    session: &ConnectedSession,
    payload: MarkReadPayload,
) -> Result<(), Rejection> {
    ensure_self(session, payload.user_id.as_deref())?;
    let message_ids = payload
        .message_ids
        .iter()
        .map(|id| MessageId::from_str(id))
        .collect::<Result<Vec<_>, _>>()?;
    state
        .mark_messages_read_usecase
        .execute(&session.user_id, &message_ids, Some(&session.connection_id))
        .await?;
    Ok(())
}
