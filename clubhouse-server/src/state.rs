use std::sync::Arc;

use clubhouse_core::gate::AccessGate;
use clubhouse_core::session::SessionProvider;
use clubhouse_core::store::ClubStore;
use clubhouse_core::vault::SecretVault;

pub type SharedSessions = Arc<dyn SessionProvider>;
pub type SharedStore = Arc<dyn ClubStore>;
pub type SharedGate = Arc<AccessGate<SharedSessions>>;
pub type SharedVault = Arc<SecretVault<SharedStore>>;

#[derive(Clone)]
pub struct AppState {
    pub gate: SharedGate,
    pub vault: SharedVault,
    pub store: SharedStore,
}

impl AppState {
    pub fn new(gate: SharedGate, vault: SharedVault, store: SharedStore) -> Self {
        Self { gate, vault, store }
    }
}
