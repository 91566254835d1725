use axum::{Json, debug_handler, extract::State, http::StatusCode};
use serde::Deserialize;
use tracing::{debug, info, instrument};
use uuid::Uuid;

use crate::{
    AppError, AppResult, AppState, Store,
    db::{Connection, ConnectionStatus, now_millis},
    extract::JsonBody,
    store::{is_foreign_key_violation, is_unique_violation},
};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CreateRequestBody {
    project_id: Uuid,
    requester_id: Uuid,
}

/// Files a `pending` request from `requester_id` to join `project_id`.
///
/// Any existing row for the pair, whatever its status, makes this fail with
/// [`AppError::DuplicateRequest`]. The check is the insert itself hitting the
/// `(project_id, requester_id)` unique constraint, so racing callers cannot
/// produce two rows.
#[instrument(skip(store))]
pub async fn create_request(
    store: &Store,
    project_id: Uuid,
    requester_id: Uuid,
) -> AppResult<Connection> {
    let requester = store
        .timed(
            sqlx::query("SELECT 1 FROM users WHERE id=?")
                .bind(requester_id)
                .fetch_optional(store.pool()),
        )
        .await?;
    if requester.is_none() {
        return Err(AppError::NotFound("user"));
    }

    let owner: Option<(Uuid,)> = store
        .timed(
            sqlx::query_as("SELECT owner_id FROM projects WHERE id=?")
                .bind(project_id)
                .fetch_optional(store.pool()),
        )
        .await?;
    let Some((owner_id,)) = owner else {
        return Err(AppError::NotFound("project"));
    };

    if owner_id == requester_id {
        return Err(AppError::SelfRequest);
    }

    let connection = Connection {
        id: Uuid::now_v7(),
        project_id,
        requester_id,
        status: ConnectionStatus::Pending,
        created_at: now_millis(),
        decided_at: None,
    };

    let insert = sqlx::query(
        "INSERT INTO connections (id,project_id,requester_id,status,created_at) \
         VALUES (?,?,?,?,?)",
    )
    .bind(connection.id)
    .bind(connection.project_id)
    .bind(connection.requester_id)
    .bind(connection.status)
    .bind(connection.created_at)
    .execute(store.pool());

    store.timed(insert).await.map_err(|e| {
        if is_unique_violation(&e) {
            debug!("request already exists for this pair");
            AppError::DuplicateRequest
        } else if is_foreign_key_violation(&e) {
            // project or requester deleted after the lookups above
            AppError::NotFound("project or user")
        } else {
            e
        }
    })?;

    info!(connection_id = %connection.id, "join request created");
    Ok(connection)
}

#[debug_handler(state = AppState)]
pub(crate) async fn create_handler(
    State(store): State<Store>,
    JsonBody(CreateRequestBody {
        project_id,
        requester_id,
    }): JsonBody<CreateRequestBody>,
) -> AppResult<(StatusCode, Json<Connection>)> {
    let connection = create_request(&store, project_id, requester_id).await?;
    Ok((StatusCode::CREATED, Json(connection)))
}
