use axum::{Json, debug_handler, extract::State, http::StatusCode};
use serde::Deserialize;
use sqlx::types::Json as SqlJson;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::{
    AppError, AppResult, AppState, Store,
    db::{Project, normalize_set, now_millis},
    extract::JsonBody,
    store::is_foreign_key_violation,
};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewProject {
    pub owner_id: Uuid,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub skills_needed: Vec<String>,
}

#[instrument(skip(store, new), fields(owner_id = %new.owner_id))]
pub async fn create_project(store: &Store, new: NewProject) -> AppResult<Project> {
    let title = new.title.trim().to_owned();
    if title.is_empty() {
        return Err(AppError::invalid("title must not be blank"));
    }

    let project = Project {
        id: Uuid::now_v7(),
        title,
        description: new.description.trim().to_owned(),
        skills_needed: SqlJson(normalize_set(new.skills_needed)),
        owner_id: new.owner_id,
        created_at: now_millis(),
    };

    let insert = sqlx::query(
        "INSERT INTO projects (id,title,description,skills_needed,owner_id,created_at) \
         VALUES (?,?,?,?,?,?)",
    )
    .bind(project.id)
    .bind(&project.title)
    .bind(&project.description)
    .bind(&project.skills_needed)
    .bind(project.owner_id)
    .bind(project.created_at)
    .execute(store.pool());

    store.timed(insert).await.map_err(|e| {
        if is_foreign_key_violation(&e) {
            AppError::NotFound("user")
        } else {
            e
        }
    })?;

    info!(project_id = %project.id, "created project");
    Ok(project)
}

#[debug_handler(state = AppState)]
pub(crate) async fn create_handler(
    State(store): State<Store>,
    JsonBody(new): JsonBody<NewProject>,
) -> AppResult<(StatusCode, Json<Project>)> {
    let project = create_project(&store, new).await?;
    Ok((StatusCode::CREATED, Json(project)))
}
