//! Demo resource served behind the cache
//!
//! An in-memory `/users` collection: `GET /users` is cached under the
//! `users` tag, `POST /users` invalidates it.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    middleware::from_fn_with_state,
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::api::{cache_response, AppState, CachedRoute};
use crate::error::{CacheError, Result};
use crate::intercept::RoutePolicy;

/// Tag shared by every cached view of the user collection
pub const USERS_TAG: &str = "users";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct User {
    pub id: u64,
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct NewUser {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct ListParams {
    pub limit: Option<usize>,
}

/// Backing store for the demo resource.
#[derive(Default)]
pub struct UserDirectory {
    users: RwLock<Vec<User>>,
    next_id: AtomicU64,
    reads: AtomicU64,
}

impl UserDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of times the list handler actually ran.
    pub fn reads(&self) -> u64 {
        self.reads.load(Ordering::Relaxed)
    }
}

async fn list_users(
    State(directory): State<Arc<UserDirectory>>,
    Query(params): Query<ListParams>,
) -> Json<Vec<User>> {
    directory.reads.fetch_add(1, Ordering::Relaxed);
    let users = directory.users.read().await;
    let limit = params.limit.unwrap_or(users.len());
    Json(users.iter().take(limit).cloned().collect())
}

async fn create_user(
    State(directory): State<Arc<UserDirectory>>,
    Json(req): Json<NewUser>,
) -> Result<(StatusCode, Json<User>)> {
    if req.name.trim().is_empty() {
        return Err(CacheError::InvalidRequest("Name cannot be empty".to_string()));
    }

    let user = User {
        id: directory.next_id.fetch_add(1, Ordering::Relaxed) + 1,
        name: req.name,
    };
    directory.users.write().await.push(user.clone());
    info!(id = user.id, "User created");

    Ok((StatusCode::CREATED, Json(user)))
}

/// Builds the `/users` routes with the cache middleware applied.
pub fn users_router(state: &AppState, directory: Arc<UserDirectory>) -> Router {
    let route = CachedRoute::new(
        state.interceptor.clone(),
        RoutePolicy::new().with_tags([USERS_TAG]),
    );

    Router::new()
        .route("/users", get(list_users).post(create_user))
        .route_layer(from_fn_with_state(route, cache_response))
        .layer(TraceLayer::new_for_http())
        .with_state(directory)
}
