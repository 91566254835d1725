use axum::{Json, debug_handler, extract::State};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    AppResult, AppState, Store,
    db::User,
    extract::{Path, Query},
    users::USER_COLUMNS,
};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct PairQuery {
    user_a: Uuid,
    user_b: Uuid,
}

#[derive(Debug, Serialize)]
pub(crate) struct Authorized {
    authorized: bool,
}

/// True while some project owned by one of the two has an `approved` request
/// from the other. Symmetric in its arguments.
pub async fn is_authorized(store: &Store, user_a: Uuid, user_b: Uuid) -> AppResult<bool> {
    let query = sqlx::query_scalar::<_, bool>(
        "SELECT EXISTS(\
            SELECT 1 FROM connections c JOIN projects p ON p.id=c.project_id \
            WHERE c.status='approved' \
              AND ((p.owner_id=? AND c.requester_id=?) OR (p.owner_id=? AND c.requester_id=?))\
         )",
    )
    .bind(user_a)
    .bind(user_b)
    .bind(user_b)
    .bind(user_a)
    .fetch_one(store.pool());
    store.timed(query).await
}

/// Everyone `user_id` may currently message, by name.
pub async fn list_partners(store: &Store, user_id: Uuid) -> AppResult<Vec<User>> {
    let sql = format!(
        "SELECT {USER_COLUMNS} FROM users WHERE id IN (\
            SELECT c.requester_id FROM connections c JOIN projects p ON p.id=c.project_id \
            WHERE c.status='approved' AND p.owner_id=? \
            UNION \
            SELECT p.owner_id FROM connections c JOIN projects p ON p.id=c.project_id \
            WHERE c.status='approved' AND c.requester_id=?\
         ) ORDER BY name, id"
    );
    store
        .timed(
            sqlx::query_as::<_, User>(&sql)
                .bind(user_id)
                .bind(user_id)
                .fetch_all(store.pool()),
        )
        .await
}

#[debug_handler(state = AppState)]
pub(crate) async fn authorized_handler(
    State(store): State<Store>,
    Query(PairQuery { user_a, user_b }): Query<PairQuery>,
) -> AppResult<Json<Authorized>> {
    let authorized = is_authorized(&store, user_a, user_b).await?;
    Ok(Json(Authorized { authorized }))
}

#[debug_handler(state = AppState)]
pub(crate) async fn partners_handler(
    State(store): State<Store>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<Vec<User>>> {
    Ok(Json(list_partners(&store, id).await?))
}
