use axum::{Json, debug_handler, extract::State};
use serde::Deserialize;
use serde_with::{NoneAsEmptyString, serde_as};
use uuid::Uuid;

use crate::{
    AppError, AppResult, AppState, Store,
    db::{Connection, ConnectionStatus},
    extract::{Path, Query},
};

use super::CONNECTION_COLUMNS;

/// `?status=` with no value means no filter.
#[serde_as]
#[derive(Debug, Deserialize)]
pub(crate) struct StatusQuery {
    #[serde_as(as = "NoneAsEmptyString")]
    #[serde(default)]
    status: Option<ConnectionStatus>,
}

async fn exists(store: &Store, table: &'static str, id: Uuid) -> AppResult<bool> {
    let sql = format!("SELECT 1 FROM {table} WHERE id=?");
    let row = store
        .timed(sqlx::query(&sql).bind(id).fetch_optional(store.pool()))
        .await?;
    Ok(row.is_some())
}

/// `scope` is a predicate on one bound id; results are oldest first.
async fn select(
    store: &Store,
    scope: &str,
    id: Uuid,
    status: Option<ConnectionStatus>,
) -> AppResult<Vec<Connection>> {
    let sql = format!(
        "SELECT {CONNECTION_COLUMNS} FROM connections \
         WHERE {scope} AND (? IS NULL OR status=?) \
         ORDER BY created_at, id"
    );
    store
        .timed(
            sqlx::query_as::<_, Connection>(&sql)
                .bind(id)
                .bind(status)
                .bind(status)
                .fetch_all(store.pool()),
        )
        .await
}

pub async fn get_connection(store: &Store, id: Uuid) -> AppResult<Connection> {
    let sql = format!("SELECT {CONNECTION_COLUMNS} FROM connections WHERE id=?");
    store
        .timed(sqlx::query_as::<_, Connection>(&sql).bind(id).fetch_optional(store.pool()))
        .await?
        .ok_or(AppError::NotFound("connection"))
}

/// Requests against one project.
pub async fn list_for_project(
    store: &Store,
    project_id: Uuid,
    status: Option<ConnectionStatus>,
) -> AppResult<Vec<Connection>> {
    if !exists(store, "projects", project_id).await? {
        return Err(AppError::NotFound("project"));
    }
    select(store, "project_id=?", project_id, status).await
}

/// Requests the user has filed.
pub async fn list_outgoing(
    store: &Store,
    requester_id: Uuid,
    status: Option<ConnectionStatus>,
) -> AppResult<Vec<Connection>> {
    if !exists(store, "users", requester_id).await? {
        return Err(AppError::NotFound("user"));
    }
    select(store, "requester_id=?", requester_id, status).await
}

/// Requests against any project the user owns.
pub async fn list_incoming(
    store: &Store,
    owner_id: Uuid,
    status: Option<ConnectionStatus>,
) -> AppResult<Vec<Connection>> {
    if !exists(store, "users", owner_id).await? {
        return Err(AppError::NotFound("user"));
    }
    select(
        store,
        "project_id IN (SELECT id FROM projects WHERE owner_id=?)",
        owner_id,
        status,
    )
    .await
}

#[debug_handler(state = AppState)]
pub(crate) async fn get_handler(
    State(store): State<Store>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<Connection>> {
    Ok(Json(get_connection(&store, id).await?))
}

#[debug_handler(state = AppState)]
pub(crate) async fn project_handler(
    State(store): State<Store>,
    Path(id): Path<Uuid>,
    Query(StatusQuery { status }): Query<StatusQuery>,
) -> AppResult<Json<Vec<Connection>>> {
    Ok(Json(list_for_project(&store, id, status).await?))
}

#[debug_handler(state = AppState)]
pub(crate) async fn outgoing_handler(
    State(store): State<Store>,
    Path(id): Path<Uuid>,
    Query(StatusQuery { status }): Query<StatusQuery>,
) -> AppResult<Json<Vec<Connection>>> {
    Ok(Json(list_outgoing(&store, id, status).await?))
}

#[debug_handler(state = AppState)]
pub(crate) async fn incoming_handler(
    State(store): State<Store>,
    Path(id): Path<Uuid>,
    Query(StatusQuery { status }): Query<StatusQuery>,
) -> AppResult<Json<Vec<Connection>>> {
    Ok(Json(list_incoming(&store, id, status).await?))
}
