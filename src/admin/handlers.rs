use axum::{extract::State, Json};
use serde::Serialize;

use crate::admin::AdminState;
use crate::load_balancer::backend::HealthState;

#[derive(Debug, Serialize)]
pub struct SystemStatus {
    pub version: &'static str,
    pub status: &'static str,
    pub mounts: usize,
}

#[derive(Debug, Serialize)]
pub struct MountStatus {
    pub prefix: String,
    pub group: String,
    pub strip_prefix: bool,
    pub upstreams: Vec<UpstreamStatus>,
}

#[derive(Debug, Serialize)]
pub struct UpstreamStatus {
    pub url: String,
    pub health: &'static str,
    pub active_connections: usize,
    pub max_connections: usize,
}

pub async fn get_status(State(state): State<AdminState>) -> Json<SystemStatus> {
    Json(SystemStatus {
        version: env!("CARGO_PKG_VERSION"),
        status: "operational",
        mounts: state.mounts.len(),
    })
}

/// Mounts in registration order.
pub async fn get_mounts(State(state): State<AdminState>) -> Json<Vec<MountStatus>> {
    let mounts = state
        .mounts
        .bindings()
        .map(|binding| {
            let group = binding.handlers();
            MountStatus {
                prefix: binding.prefix().to_string(),
                group: group.name().to_string(),
                strip_prefix: group.strip_prefix(),
                upstreams: group
                    .upstreams()
                    .iter()
                    .map(|u| UpstreamStatus {
                        url: u.base_url().to_string(),
                        health: health_label(u.health()),
                        active_connections: u.active_connections(),
                        max_connections: u.max_connections(),
                    })
                    .collect(),
            }
        })
        .collect();

    Json(mounts)
}

fn health_label(state: HealthState) -> &'static str {
    match state {
        HealthState::Unknown => "unknown",
        HealthState::Healthy => "healthy",
        HealthState::Unhealthy => "unhealthy",
    }
}
