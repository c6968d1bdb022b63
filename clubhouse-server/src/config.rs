use std::net::SocketAddr;
use std::str::FromStr;

use anyhow::{anyhow, Context, Result};
use clubhouse_core::keys::MasterKey;

pub const MASTER_KEY_ENV: &str = "CLUBHOUSE_MASTER_KEY";
pub const BIND_ADDRESS_ENV: &str = "CLUBHOUSE_BIND_ADDRESS";
pub const STORE_ENV: &str = "CLUBHOUSE_STORE";
pub const DEV_ADMIN_TOKEN_ENV: &str = "CLUBHOUSE_DEV_ADMIN_TOKEN";

const DEFAULT_BIND: ([u8; 4], u16) = ([0, 0, 0, 0], 8080);

/// Which `ClubStore` implementation the server wires up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreKind {
    Memory,
}

impl FromStr for StoreKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "memory" => Ok(StoreKind::Memory),
            other => Err(anyhow!("unsupported store `{other}`")),
        }
    }
}

/// Startup configuration, resolved once from the environment.
///
/// No `Debug` impl: `dev_admin_token` is a live credential.
#[derive(Clone)]
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
    pub master_key: MasterKey,
    pub store: StoreKind,
    pub dev_admin_token: Option<String>,
}

impl ServerConfig {
    /// Read configuration from `CLUBHOUSE_*` variables.
    ///
    /// A missing or malformed master key is fatal here, before any
    /// listener binds; the error names the variable but never echoes its
    /// value.
    pub fn from_env() -> Result<Self> {
        let master_key = std::env::var(MASTER_KEY_ENV)
            .map_err(|_| anyhow!("{MASTER_KEY_ENV} must be set to the 64-hex-char master key"))?
            .parse::<MasterKey>()
            .with_context(|| format!("{MASTER_KEY_ENV} is not usable key material"))?;

        let bind_addr = match std::env::var(BIND_ADDRESS_ENV) {
            Ok(raw) => raw
                .parse()
                .with_context(|| format!("{BIND_ADDRESS_ENV} is not a socket address"))?,
            Err(_) => SocketAddr::from(DEFAULT_BIND),
        };

        let store = match std::env::var(STORE_ENV) {
            Ok(raw) => raw.parse()?,
            Err(_) => StoreKind::Memory,
        };

        let dev_admin_token = std::env::var(DEV_ADMIN_TOKEN_ENV)
            .ok()
            .filter(|token| !token.is_empty());

        Ok(Self {
            bind_addr,
            master_key,
            store,
            dev_admin_token,
        })
    }

    pub fn with_bind(mut self, addr: SocketAddr) -> Self {
        self.bind_addr = addr;
        self
    }
}
