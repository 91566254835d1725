//! Join requests and their single-decision lifecycle.
//!
//! A connection is created `pending` by the requester and moved to `approved`
//! or `denied` exactly once by the owner of the project. The move is a
//! compare-and-swap on the status column, so concurrent decisions have one
//! winner. One row per (project, requester) is guaranteed by the store's
//! unique constraint; a denied request stays denied and cannot be resubmitted.

mod decide;
mod list;
mod request;

use axum::{
    Router,
    routing::{get, post},
};

use crate::AppState;

pub use decide::{Decision, decide};
pub use list::{get_connection, list_for_project, list_incoming, list_outgoing};
pub use request::create_request;

pub(crate) const CONNECTION_COLUMNS: &str =
    "id,project_id,requester_id,status,created_at,decided_at";

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/connections", post(request::create_handler))
        .route(
            "/connections/{id}",
            get(list::get_handler).patch(decide::decide_handler),
        )
        .route("/projects/{id}/connections", get(list::project_handler))
        .route("/users/{id}/connections", get(list::outgoing_handler))
        .route("/users/{id}/incoming", get(list::incoming_handler))
}
