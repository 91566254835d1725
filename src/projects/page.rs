use axum::{Json, debug_handler, extract::State, http::StatusCode};
use serde::Deserialize;
use sqlx::types::Json as SqlJson;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::{
    AppError, AppResult, AppState, Store,
    db::{Project, normalize_set},
    extract::{JsonBody, Path, Query},
};

use super::PROJECT_COLUMNS;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub skills_needed: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ProjectUpdate {
    actor_id: Uuid,
    #[serde(flatten)]
    patch: ProjectPatch,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ActorQuery {
    actor_id: Uuid,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ListQuery {
    owner_id: Option<Uuid>,
}

pub async fn get_project(store: &Store, id: Uuid) -> AppResult<Project> {
    let sql = format!("SELECT {PROJECT_COLUMNS} FROM projects WHERE id=?");
    store
        .timed(sqlx::query_as::<_, Project>(&sql).bind(id).fetch_optional(store.pool()))
        .await?
        .ok_or(AppError::NotFound("project"))
}

pub async fn list_projects(store: &Store, owner_id: Option<Uuid>) -> AppResult<Vec<Project>> {
    let sql = format!(
        "SELECT {PROJECT_COLUMNS} FROM projects \
         WHERE (? IS NULL OR owner_id=?) \
         ORDER BY created_at, id"
    );
    store
        .timed(
            sqlx::query_as::<_, Project>(&sql)
                .bind(owner_id)
                .bind(owner_id)
                .fetch_all(store.pool()),
        )
        .await
}

async fn ensure_owner(store: &Store, id: Uuid, actor_id: Uuid) -> AppResult<Project> {
    let project = get_project(store, id).await?;
    if project.owner_id != actor_id {
        warn!(project_id = %id, %actor_id, "non-owner tried to modify project");
        return Err(AppError::Forbidden);
    }
    Ok(project)
}

#[instrument(skip(store, patch))]
pub async fn update_project(
    store: &Store,
    id: Uuid,
    actor_id: Uuid,
    patch: ProjectPatch,
) -> AppResult<Project> {
    let title = match patch.title.map(|t| t.trim().to_owned()) {
        Some(t) if t.is_empty() => return Err(AppError::invalid("title must not be blank")),
        title => title,
    };
    let description = patch.description.map(|d| d.trim().to_owned());
    let skills_needed = patch.skills_needed.map(|s| SqlJson(normalize_set(s)));

    ensure_owner(store, id, actor_id).await?;

    let sql = format!(
        "UPDATE projects SET \
            title=COALESCE(?,title), \
            description=COALESCE(?,description), \
            skills_needed=COALESCE(?,skills_needed) \
         WHERE id=? AND owner_id=? RETURNING {PROJECT_COLUMNS}"
    );
    let query = sqlx::query_as::<_, Project>(&sql)
        .bind(&title)
        .bind(&description)
        .bind(&skills_needed)
        .bind(id)
        .bind(actor_id)
        .fetch_optional(store.pool());
    let project = store.timed(query).await?.ok_or(AppError::NotFound("project"))?;

    info!("updated project");
    Ok(project)
}

/// Connections on the project are removed by the store's cascade.
#[instrument(skip(store))]
pub async fn delete_project(store: &Store, id: Uuid, actor_id: Uuid) -> AppResult<()> {
    ensure_owner(store, id, actor_id).await?;

    let deleted = store
        .timed(
            sqlx::query("DELETE FROM projects WHERE id=? AND owner_id=?")
                .bind(id)
                .bind(actor_id)
                .execute(store.pool()),
        )
        .await?;

    if deleted.rows_affected() == 0 {
        return Err(AppError::NotFound("project"));
    }

    info!("deleted project");
    Ok(())
}

#[debug_handler(state = AppState)]
pub(crate) async fn get_handler(
    State(store): State<Store>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<Project>> {
    Ok(Json(get_project(&store, id).await?))
}

#[debug_handler(state = AppState)]
pub(crate) async fn list_handler(
    State(store): State<Store>,
    Query(ListQuery { owner_id }): Query<ListQuery>,
) -> AppResult<Json<Vec<Project>>> {
    Ok(Json(list_projects(&store, owner_id).await?))
}

#[debug_handler(state = AppState)]
pub(crate) async fn update_handler(
    State(store): State<Store>,
    Path(id): Path<Uuid>,
    JsonBody(ProjectUpdate { actor_id, patch }): JsonBody<ProjectUpdate>,
) -> AppResult<Json<Project>> {
    Ok(Json(update_project(&store, id, actor_id, patch).await?))
}

#[debug_handler(state = AppState)]
pub(crate) async fn delete_handler(
    State(store): State<Store>,
    Path(id): Path<Uuid>,
    Query(ActorQuery { actor_id }): Query<ActorQuery>,
) -> AppResult<StatusCode> {
    delete_project(&store, id, actor_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
