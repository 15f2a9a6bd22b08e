//! Libris application library
//!
//! Wires the catalog, recommendation and reader modules onto the shared
//! stores and runs them behind the HTTP server.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use libris_authz::{MemorySessionStore, Sessions};
use libris_kernel::{settings::Settings, InitCtx, ModuleRegistry};

pub mod error;
pub mod modules;

pub use error::ServiceError;
pub use modules::Services;

/// Connect the stores and register every application module
pub async fn build_registry(settings: &Settings) -> anyhow::Result<ModuleRegistry> {
    let db = libris_db::connect(&settings.database)
        .await
        .context("failed to connect to the catalog store")?;
    let idle_timeout = Duration::from_secs(settings.auth.session_idle_secs);
    let sessions = Sessions::new(
        Arc::new(MemorySessionStore::with_idle_timeout(idle_timeout)),
        &settings.auth,
    );
    let services = Services::new(&db, sessions, settings);

    let mut registry = ModuleRegistry::new();
    modules::register_all(&mut registry, &services, settings);
    Ok(registry)
}

/// Run the full server lifecycle until shutdown
pub async fn run(settings: Settings) -> anyhow::Result<()> {
    let registry = build_registry(&settings).await?;
    let ctx = InitCtx {
        settings: &settings,
    };

    registry.init_all(&ctx).await?;
    registry.start_all(&ctx).await?;

    let served = libris_http::start_server(&registry, &settings).await;

    registry.stop_all().await?;
    served
}
