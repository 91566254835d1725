//! collabhub: users publish projects, ask to join each other's projects, and
//! message one another once the project owner approves a join request.
//!
//! Connection requests move `pending -> approved | denied` exactly once, and
//! only the owner of the project may make that move. Direct messages between
//! two users are accepted only while an approved connection links them; reading
//! a conversation is never gated.

pub mod appresult;
pub mod config;
pub mod connections;
pub mod db;
pub mod extract;
pub mod messages;
pub mod projects;
pub mod res;
pub mod store;
pub mod users;

use std::{sync::Arc, time::Duration};

use axum::{
    Router, debug_handler,
    extract::{FromRef, State},
    http::{Method, header::CONTENT_TYPE},
    routing::get,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

pub use appresult::{AppError, AppResult};
pub use config::Config;
pub use store::Store;

#[derive(Clone, FromRef)]
pub struct AppState {
    pub store: Store,
    pub config: Arc<Config>,
}

impl AppState {
    pub async fn new(config: Config) -> AppResult<Self> {
        let store = Store::connect(&config).await?;
        Ok(Self {
            store,
            config: Arc::new(config),
        })
    }
}

pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::PATCH, Method::DELETE, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE])
        .max_age(Duration::from_secs(60 * 60));

    Router::new()
        .route("/health", get(health))
        .merge(users::router())
        .merge(projects::router())
        .merge(connections::router())
        .merge(messages::router())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

#[debug_handler(state = AppState)]
async fn health(State(store): State<Store>) -> AppResult<&'static str> {
    store.ping().await?;
    Ok("ok")
}
