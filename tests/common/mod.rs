#![allow(dead_code)]

use std::{ops::Deref, sync::Arc, time::Duration};

use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode, header::CONTENT_TYPE},
};
use collabhub::{
    AppState, Config, Store,
    db::{Project, User},
    projects::{NewProject, create_project},
    users::{NewUser, register},
};
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

/// A store backed by a throwaway database file, removed on drop.
pub struct TestStore {
    pub store: Store,
    pub config: Config,
    _dir: TempDir,
}

impl Deref for TestStore {
    type Target = Store;

    fn deref(&self) -> &Store {
        &self.store
    }
}

pub async fn store() -> TestStore {
    store_with(|_| {}).await
}

pub async fn store_with(tweak: impl FnOnce(&mut Config)) -> TestStore {
    let dir = tempfile::tempdir().expect("tempdir");
    let mut config = Config {
        database_url: format!("sqlite://{}", dir.path().join("collabhub.db").display()),
        max_connections: 8,
        store_timeout: Duration::from_secs(5),
        ..Config::default()
    };
    tweak(&mut config);

    let store = Store::connect(&config).await.expect("open store");
    TestStore {
        store,
        config,
        _dir: dir,
    }
}

pub fn app(store: &TestStore) -> Router {
    collabhub::router(AppState {
        store: store.store.clone(),
        config: Arc::new(store.config.clone()),
    })
}

pub async fn user(store: &Store, name: &str) -> User {
    register(
        store,
        NewUser {
            name: name.to_owned(),
            email: format!("{}@example.com", name.to_lowercase()),
            password: "secret".to_owned(),
            college: None,
            skills: vec![],
            interests: None,
            bio: None,
            profile_url: None,
        },
    )
    .await
    .expect("register user")
}

pub async fn project(store: &Store, owner: &User, title: &str) -> Project {
    create_project(
        store,
        NewProject {
            owner_id: owner.id,
            title: title.to_owned(),
            description: String::new(),
            skills_needed: vec!["rust".to_owned()],
        },
    )
    .await
    .expect("create project")
}

pub async fn count(store: &Store, table: &str) -> i64 {
    sqlx::query_scalar::<_, i64>(&format!("SELECT COUNT(*) FROM {table}"))
        .fetch_one(store.pool())
        .await
        .expect("count rows")
}

/// Sends one request through the router and decodes the body as JSON when possible.
pub async fn call(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(json) => builder
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string())),
        None => builder.body(Body::empty()),
    }
    .expect("build request");

    let response = app.clone().oneshot(request).await.expect("router call");
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("read body");

    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes)
            .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
    };
    (status, json)
}
