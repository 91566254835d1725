//! Direct messages, gated on approved connections.
//!
//! Whether two users may talk is derived from connection rows on every send;
//! nothing about it is cached. The gate only guards new messages: conversations
//! stay readable no matter what happens to the connection afterwards.

mod conversation;
mod gate;
mod send;

use axum::{Router, routing::get};

use crate::AppState;

pub use conversation::{Page, list_conversation};
pub use gate::{is_authorized, list_partners};
pub use send::send_message;

pub(crate) const MESSAGE_COLUMNS: &str = "id,sender_id,receiver_id,content,created_at";

pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/messages",
            get(conversation::list_handler).post(send::send_handler),
        )
        .route("/messages/authorized", get(gate::authorized_handler))
        .route("/users/{id}/partners", get(gate::partners_handler))
}
