use std::sync::Arc;

use axum::{Json, debug_handler, extract::State};
use serde::Deserialize;
use uuid::Uuid;

use crate::{AppResult, AppState, Config, Store, db::Message, extract::Query};

use super::MESSAGE_COLUMNS;

/// A 1-based page of a conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub number: u32,
    pub size: u32,
}

impl Page {
    /// Fills in defaults and clamps `size` to `[1, max_size]`.
    pub fn new(number: Option<u32>, size: Option<u32>, default_size: u32, max_size: u32) -> Self {
        let max_size = max_size.max(1);
        Self {
            number: number.unwrap_or(1).max(1),
            size: size.unwrap_or(default_size).clamp(1, max_size),
        }
    }

    pub fn first(size: u32) -> Self {
        Self::new(None, Some(size), size, size)
    }

    fn offset(&self) -> i64 {
        (self.number as i64 - 1) * self.size as i64
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ConversationQuery {
    user_a: Uuid,
    user_b: Uuid,
    page: Option<u32>,
    per_page: Option<u32>,
}

/// Messages in both directions between two users, oldest first.
///
/// Not gated on authorization: history stays visible after the connection
/// that allowed it is gone.
pub async fn list_conversation(
    store: &Store,
    user_a: Uuid,
    user_b: Uuid,
    page: Page,
) -> AppResult<Vec<Message>> {
    let sql = format!(
        "SELECT {MESSAGE_COLUMNS} FROM messages \
         WHERE (sender_id=? AND receiver_id=?) OR (sender_id=? AND receiver_id=?) \
         ORDER BY created_at, id \
         LIMIT ? OFFSET ?"
    );
    let query = sqlx::query_as::<_, Message>(&sql)
        .bind(user_a)
        .bind(user_b)
        .bind(user_b)
        .bind(user_a)
        .bind(page.size as i64)
        .bind(page.offset())
        .fetch_all(store.pool());
    store.timed(query).await
}

#[debug_handler(state = AppState)]
pub(crate) async fn list_handler(
    State(store): State<Store>,
    State(config): State<Arc<Config>>,
    Query(ConversationQuery {
        user_a,
        user_b,
        page,
        per_page,
    }): Query<ConversationQuery>,
) -> AppResult<Json<Vec<Message>>> {
    let page = Page::new(page, per_page, config.page_size, config.max_page_size);
    Ok(Json(list_conversation(&store, user_a, user_b, page).await?))
}
