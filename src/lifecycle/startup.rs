//! Startup orchestration.
//!
//! # Responsibilities
//! - Register every configured mount and seal the prefix router
//! - Start background services (metrics, admin)
//! - Bind the main listener and begin accepting traffic
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - Listeners start last (traffic only when ready)

use std::net::SocketAddr;
use std::sync::Arc;

use thiserror::Error;
use tokio::net::TcpListener;

use crate::admin::{setup_admin_router, AdminState};
use crate::config::GatewayConfig;
use crate::http::HttpServer;
use crate::lifecycle::Shutdown;
use crate::mount::{MountGroup, MountRouter};
use crate::observability::metrics;
use crate::routing::{RegisterError, RouterBuilder};

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("mount `{mount}`: {source}")]
    Register {
        mount: String,
        #[source]
        source: RegisterError,
    },

    #[error("mount `{mount}`: invalid upstream `{url}`: {reason}")]
    Upstream {
        mount: String,
        url: String,
        reason: String,
    },

    #[error("{field}: invalid socket address `{value}`")]
    Address { field: &'static str, value: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Register every mount in configuration order and seal the router.
pub fn build_mount_router(config: &GatewayConfig) -> Result<MountRouter, StartupError> {
    let mut builder = RouterBuilder::with_overlap(config.routing.overlap);

    for mount in &config.mounts {
        let group = Arc::new(MountGroup::from_config(mount, &config.upstream)?);
        builder
            .register(&mount.prefix, group)
            .map_err(|source| StartupError::Register {
                mount: mount.name.clone(),
                source,
            })?;

        tracing::info!(
            mount = %mount.name,
            prefix = %mount.prefix,
            upstreams = ?mount.upstreams,
            strip_prefix = mount.strip_prefix,
            "Mounted handler group"
        );
    }

    Ok(builder.seal())
}

/// Start every service described by `config` and serve until `shutdown` fires.
pub async fn run(config: GatewayConfig, shutdown: &Shutdown) -> Result<(), StartupError> {
    let server = HttpServer::new(config.clone())?;

    if config.observability.metrics_enabled {
        let addr = parse_addr("observability.metrics_address", &config.observability.metrics_address)?;
        metrics::init_metrics(addr);
    }

    if config.admin.enabled {
        let listener = TcpListener::bind(&config.admin.bind_address).await?;
        tracing::info!(address = %listener.local_addr()?, "Admin API listening");

        let app = setup_admin_router(AdminState::new(server.mounts().clone(), &config.admin.api_key));
        let mut admin_shutdown = shutdown.subscribe();
        tokio::spawn(async move {
            let served = axum::serve(listener, app)
                .with_graceful_shutdown(async move {
                    let _ = admin_shutdown.recv().await;
                })
                .await;
            if let Err(e) = served {
                tracing::error!(error = %e, "Admin API stopped with error");
            }
        });
    }

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    server.run(listener, shutdown.subscribe()).await?;
    Ok(())
}

fn parse_addr(field: &'static str, value: &str) -> Result<SocketAddr, StartupError> {
    value.parse().map_err(|_| StartupError::Address {
        field,
        value: value.to_string(),
    })
}
