use axum::{Json, debug_handler, extract::State, http::StatusCode};
use serde::Deserialize;
use sqlx::types::Json as SqlJson;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::{
    AppError, AppResult, AppState, Store,
    db::{User, normalize_set},
    extract::{JsonBody, Path},
};

use super::USER_COLUMNS;

/// Absent fields stay as they are; an empty string clears an optional field.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfilePatch {
    pub name: Option<String>,
    pub college: Option<String>,
    pub skills: Option<Vec<String>>,
    pub interests: Option<String>,
    pub bio: Option<String>,
    pub profile_url: Option<String>,
}

pub async fn get_user(store: &Store, id: Uuid) -> AppResult<User> {
    let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id=?");
    store
        .timed(sqlx::query_as::<_, User>(&sql).bind(id).fetch_optional(store.pool()))
        .await?
        .ok_or(AppError::NotFound("user"))
}

#[instrument(skip(store, patch))]
pub async fn update_profile(store: &Store, id: Uuid, patch: ProfilePatch) -> AppResult<User> {
    let name = match patch.name.map(|n| n.trim().to_owned()) {
        Some(n) if n.is_empty() => return Err(AppError::invalid("name must not be blank")),
        name => name,
    };
    let skills = patch.skills.map(|s| SqlJson(normalize_set(s)));
    let trimmed = |s: Option<String>| s.map(|s| s.trim().to_owned());
    let (college, interests, bio, profile_url) = (
        trimmed(patch.college),
        trimmed(patch.interests),
        trimmed(patch.bio),
        trimmed(patch.profile_url),
    );

    // each optional column is bound twice: once for presence, once for the value
    let sql = format!(
        "UPDATE users SET \
            name=COALESCE(?,name), \
            skills=COALESCE(?,skills), \
            college=CASE WHEN ? IS NULL THEN college ELSE NULLIF(?,'') END, \
            interests=CASE WHEN ? IS NULL THEN interests ELSE NULLIF(?,'') END, \
            bio=CASE WHEN ? IS NULL THEN bio ELSE NULLIF(?,'') END, \
            profile_url=CASE WHEN ? IS NULL THEN profile_url ELSE NULLIF(?,'') END \
         WHERE id=? RETURNING {USER_COLUMNS}"
    );

    let query = sqlx::query_as::<_, User>(&sql)
        .bind(&name)
        .bind(&skills)
        .bind(&college)
        .bind(&college)
        .bind(&interests)
        .bind(&interests)
        .bind(&bio)
        .bind(&bio)
        .bind(&profile_url)
        .bind(&profile_url)
        .bind(id)
        .fetch_optional(store.pool());
    let user = store.timed(query).await?.ok_or(AppError::NotFound("user"))?;

    info!("updated profile");
    Ok(user)
}

/// Owned projects, their connections, the user's own requests and every
/// message they sent or received go with them via `ON DELETE CASCADE`.
#[instrument(skip(store))]
pub async fn delete_user(store: &Store, id: Uuid) -> AppResult<()> {
    let deleted = store
        .timed(sqlx::query("DELETE FROM users WHERE id=?").bind(id).execute(store.pool()))
        .await?;

    if deleted.rows_affected() == 0 {
        return Err(AppError::NotFound("user"));
    }

    info!("deleted user");
    Ok(())
}

#[debug_handler(state = AppState)]
pub(crate) async fn get_handler(
    State(store): State<Store>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<User>> {
    Ok(Json(get_user(&store, id).await?))
}

#[debug_handler(state = AppState)]
pub(crate) async fn update_handler(
    State(store): State<Store>,
    Path(id): Path<Uuid>,
    JsonBody(patch): JsonBody<ProfilePatch>,
) -> AppResult<Json<User>> {
    Ok(Json(update_profile(&store, id, patch).await?))
}

#[debug_handler(state = AppState)]
pub(crate) async fn delete_handler(
    State(store): State<Store>,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    delete_user(&store, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
