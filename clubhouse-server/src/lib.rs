pub mod auth;
pub mod config;
pub mod error;
pub mod http;
pub mod models;
pub mod state;
pub mod telemetry;

use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;
use tracing::{info, warn};

use clubhouse_core::cipher::SecretCipher;
use clubhouse_core::gate::AccessGate;
use clubhouse_core::principal::Role;
use clubhouse_core::session::MemorySessions;
use clubhouse_core::store::{MemoryClubStore, UserRecord};
use clubhouse_core::vault::SecretVault;

use config::StoreKind;
use state::{SharedSessions, SharedStore};

pub use config::ServerConfig;
pub use state::AppState;
pub use telemetry::CorrelationId;

pub async fn run(config: ServerConfig) -> anyhow::Result<()> {
    let state = build_state(&config)?;

    let listener = TcpListener::bind(config.bind_addr).await.with_context(|| {
        format!(
            "failed to bind http listener on {addr}",
            addr = config.bind_addr
        )
    })?;

    let addr = listener.local_addr()?;
    info!(%addr, "http server listening");

    axum::serve(listener, http::router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

pub fn build_state(config: &ServerConfig) -> anyhow::Result<AppState> {
    let sessions = Arc::new(MemorySessions::new());
    let store = match config.store {
        StoreKind::Memory => Arc::new(MemoryClubStore::new()),
    };

    if let Some(token) = &config.dev_admin_token {
        seed_dev_admin(&sessions, &store, token)?;
    }

    let cipher = SecretCipher::new(&config.master_key);
    let sessions: SharedSessions = sessions;
    let store: SharedStore = store;

    Ok(AppState::new(
        Arc::new(AccessGate::new(sessions)),
        Arc::new(SecretVault::new(cipher, Arc::clone(&store))),
        store,
    ))
}

fn seed_dev_admin(
    sessions: &MemorySessions,
    store: &MemoryClubStore,
    token: &str,
) -> anyhow::Result<()> {
    let admin = UserRecord::new("dev-admin", "Dev Admin", "admin@clubhouse.local")
        .with_role(Role::Admin)
        .with_approval(true);
    let principal = admin.principal()?;
    store.insert_user(admin);
    sessions.insert(token, principal);
    warn!("dev admin session enabled");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            warn!(?err, "failed to install ctrl-c handler");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(err) => warn!(?err, "failed to install sigterm handler"),
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
