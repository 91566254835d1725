use axum::{Json, debug_handler, extract::State, http::StatusCode};
use serde::Deserialize;
use sqlx::types::Json as SqlJson;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::{
    AppError, AppResult, AppState, Store,
    db::{User, non_blank, normalize_set, now_millis},
    extract::JsonBody,
    store::is_unique_violation,
};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewUser {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub password: String,

    pub college: Option<String>,
    #[serde(default)]
    pub skills: Vec<String>,
    pub interests: Option<String>,
    pub bio: Option<String>,
    pub profile_url: Option<String>,
}

pub(crate) fn validate_email(email: &str) -> AppResult<()> {
    let well_formed = email
        .split_once('@')
        .is_some_and(|(local, domain)| {
            !local.is_empty() && !domain.is_empty() && !domain.contains('@')
        })
        && !email.chars().any(char::is_whitespace);

    if well_formed {
        Ok(())
    } else {
        Err(AppError::invalid(format!("`{email}` is not an email address")))
    }
}

#[instrument(skip(store, new), fields(email = %new.email))]
pub async fn register(store: &Store, new: NewUser) -> AppResult<User> {
    let name = new.name.trim().to_owned();
    if name.is_empty() {
        return Err(AppError::invalid("name must not be blank"));
    }
    let email = new.email.trim().to_owned();
    validate_email(&email)?;

    let user = User {
        id: Uuid::now_v7(),
        name,
        email,
        credential: new.password,
        college: non_blank(new.college),
        skills: SqlJson(normalize_set(new.skills)),
        interests: non_blank(new.interests),
        bio: non_blank(new.bio),
        profile_url: non_blank(new.profile_url),
        created_at: now_millis(),
    };

    let insert = sqlx::query(
        "INSERT INTO users (id,name,email,credential,college,skills,interests,bio,profile_url,created_at) \
         VALUES (?,?,?,?,?,?,?,?,?,?)",
    )
    .bind(user.id)
    .bind(&user.name)
    .bind(&user.email)
    .bind(&user.credential)
    .bind(&user.college)
    .bind(&user.skills)
    .bind(&user.interests)
    .bind(&user.bio)
    .bind(&user.profile_url)
    .bind(user.created_at)
    .execute(store.pool());

    store.timed(insert).await.map_err(|e| {
        if is_unique_violation(&e) {
            AppError::EmailTaken
        } else {
            e
        }
    })?;

    info!(user_id = %user.id, "registered user");
    Ok(user)
}

#[debug_handler(state = AppState)]
pub(crate) async fn register_handler(
    State(store): State<Store>,
    JsonBody(new): JsonBody<NewUser>,
) -> AppResult<(StatusCode, Json<User>)> {
    let user = register(&store, new).await?;
    Ok((StatusCode::CREATED, Json(user)))
}
