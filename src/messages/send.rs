use axum::{Json, debug_handler, extract::State, http::StatusCode};
use serde::Deserialize;
use tracing::{debug, info, instrument};
use uuid::Uuid;

use crate::{
    AppError, AppResult, AppState, Store,
    db::{Message, now_millis},
    extract::JsonBody,
    store::is_foreign_key_violation,
};

use super::gate::is_authorized;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SendMessageBody {
    sender_id: Uuid,
    receiver_id: Uuid,
    content: String,
}

/// Stores a message if the two users share an approved connection.
///
/// The authorization read and the insert are separate statements. A decision
/// landing between them is not observed by this send.
#[instrument(skip(store, content), fields(len = content.len()))]
pub async fn send_message(
    store: &Store,
    sender_id: Uuid,
    receiver_id: Uuid,
    content: &str,
) -> AppResult<Message> {
    let content = content.trim();
    if content.is_empty() {
        return Err(AppError::EmptyContent);
    }
    if sender_id == receiver_id {
        return Err(AppError::SelfMessage);
    }
    if !is_authorized(store, sender_id, receiver_id).await? {
        debug!("no approved connection, rejecting");
        return Err(AppError::Unauthorized);
    }

    let message = Message {
        id: Uuid::now_v7(),
        sender_id,
        receiver_id,
        content: content.to_owned(),
        created_at: now_millis(),
    };

    let insert = sqlx::query(
        "INSERT INTO messages (id,sender_id,receiver_id,content,created_at) VALUES (?,?,?,?,?)",
    )
    .bind(message.id)
    .bind(message.sender_id)
    .bind(message.receiver_id)
    .bind(&message.content)
    .bind(message.created_at)
    .execute(store.pool());

    store.timed(insert).await.map_err(|e| {
        // a party was deleted after the check; no connection can exist for them now
        if is_foreign_key_violation(&e) {
            AppError::Unauthorized
        } else {
            e
        }
    })?;

    info!(message_id = %message.id, "message sent");
    Ok(message)
}

#[debug_handler(state = AppState)]
pub(crate) async fn send_handler(
    State(store): State<Store>,
    JsonBody(SendMessageBody {
        sender_id,
        receiver_id,
        content,
    }): JsonBody<SendMessageBody>,
) -> AppResult<(StatusCode, Json<Message>)> {
    let message = send_message(&store, sender_id, receiver_id, &content).await?;
    Ok((StatusCode::CREATED, Json(message)))
}
