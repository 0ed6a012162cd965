//! Read-only admin API.
//!
//! Served on its own listener, behind a bearer token.

pub mod auth;
pub mod handlers;

use std::sync::Arc;

use axum::{middleware, routing::get, Router};

use crate::mount::MountRouter;

use self::auth::admin_auth_middleware;
use self::handlers::{get_mounts, get_status};

#[derive(Clone)]
pub struct AdminState {
    pub mounts: Arc<MountRouter>,
    pub api_key: Arc<str>,
}

impl AdminState {
    pub fn new(mounts: Arc<MountRouter>, api_key: &str) -> Self {
        Self {
            mounts,
            api_key: Arc::from(api_key),
        }
    }
}

pub fn setup_admin_router(state: AdminState) -> Router {
    Router::new()
        .route("/admin/status", get(get_status))
        .route("/admin/mounts", get(get_mounts))
        .layer(middleware::from_fn_with_state(state.clone(), admin_auth_middleware))
        .with_state(state)
}
