use axum::{Json, debug_handler, extract::State};
use serde::Deserialize;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::{
    AppError, AppResult, AppState, Store,
    db::{Connection, ConnectionStatus, now_millis},
    extract::{JsonBody, Path},
};

use super::CONNECTION_COLUMNS;

/// The two terminal outcomes an owner can record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Approved,
    Denied,
}

impl From<Decision> for ConnectionStatus {
    fn from(decision: Decision) -> Self {
        match decision {
            Decision::Approved => ConnectionStatus::Approved,
            Decision::Denied => ConnectionStatus::Denied,
        }
    }
}

impl TryFrom<ConnectionStatus> for Decision {
    type Error = AppError;

    fn try_from(status: ConnectionStatus) -> Result<Self, Self::Error> {
        match status {
            ConnectionStatus::Approved => Ok(Decision::Approved),
            ConnectionStatus::Denied => Ok(Decision::Denied),
            ConnectionStatus::Pending => {
                Err(AppError::invalid("outcome must be `approved` or `denied`"))
            }
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct DecideBody {
    decider_id: Uuid,
    outcome: ConnectionStatus,
}

/// Records the owner's decision on a pending request.
///
/// Authority is checked before state: a non-owner gets [`AppError::Forbidden`]
/// even for an already decided request. The write only matches rows still in
/// `pending`, so of two concurrent calls exactly one updates and the other
/// reports [`AppError::InvalidTransition`].
#[instrument(skip(store))]
pub async fn decide(
    store: &Store,
    connection_id: Uuid,
    decider_id: Uuid,
    decision: Decision,
) -> AppResult<Connection> {
    let target = ConnectionStatus::from(decision);

    let row: Option<(ConnectionStatus, Uuid)> = store
        .timed(
            sqlx::query_as(
                "SELECT c.status,p.owner_id FROM connections c \
                 JOIN projects p ON p.id=c.project_id WHERE c.id=?",
            )
            .bind(connection_id)
            .fetch_optional(store.pool()),
        )
        .await?;
    let Some((current, owner_id)) = row else {
        return Err(AppError::NotFound("connection"));
    };

    if owner_id != decider_id {
        warn!(%owner_id, "decision attempted by non-owner");
        return Err(AppError::Forbidden);
    }
    if current.is_terminal() {
        return Err(AppError::InvalidTransition(current));
    }

    let sql = format!(
        "UPDATE connections SET status=?,decided_at=? \
         WHERE id=? AND status='pending' RETURNING {CONNECTION_COLUMNS}"
    );
    let swap = sqlx::query_as::<_, Connection>(&sql)
        .bind(target)
        .bind(now_millis())
        .bind(connection_id)
        .fetch_optional(store.pool());

    let Some(connection) = store.timed(swap).await? else {
        // lost a race: someone decided (or the row was cascaded away) between the read and the swap
        let now: Option<(ConnectionStatus,)> = store
            .timed(
                sqlx::query_as("SELECT status FROM connections WHERE id=?")
                    .bind(connection_id)
                    .fetch_optional(store.pool()),
            )
            .await?;
        return Err(match now {
            Some((status,)) => AppError::InvalidTransition(status),
            None => AppError::NotFound("connection"),
        });
    };

    info!(status = %connection.status, "join request decided");
    Ok(connection)
}

#[debug_handler(state = AppState)]
pub(crate) async fn decide_handler(
    State(store): State<Store>,
    Path(id): Path<Uuid>,
    JsonBody(DecideBody {
        decider_id,
        outcome,
    }): JsonBody<DecideBody>,
) -> AppResult<Json<Connection>> {
    let decision = Decision::try_from(outcome)?;
    Ok(Json(decide(&store, id, decider_id, decision).await?))
}
