//! Process configuration read from environment variables.
//!
//! | variable | default | meaning |
//! |----------|---------|---------|
//! | `BIND_ADDR` | `0.0.0.0:8080` | listen address |
//! | `USE_PERSISTENT_STORES` | `false` | Postgres instead of the in-memory store |
//! | `DATABASE_URL` | (none) | required when persistent |
//! | `DATABASE_MAX_CONNECTIONS` | `10` | pool size |

use std::net::SocketAddr;

use invoicer_core::{InvoiceError, InvoiceResult};

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
pub const DEFAULT_MAX_CONNECTIONS: u32 = 10;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreConfig {
    InMemory,
    Postgres {
        database_url: String,
        max_connections: u32,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    pub store: StoreConfig,
}

impl AppConfig {
    pub fn from_env() -> InvoiceResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> InvoiceResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let bind_addr = get("BIND_ADDR")
            .unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string())
            .parse::<SocketAddr>()
            .map_err(|e| InvoiceError::config(format!("BIND_ADDR is not a socket address: {e}")))?;

        let persistent = match get("USE_PERSISTENT_STORES") {
            None => false,
            Some(v) => parse_bool(&v).ok_or_else(|| {
                InvoiceError::config(format!("USE_PERSISTENT_STORES must be true or false (got '{v}')"))
            })?,
        };

        let store = if persistent {
            let database_url = get("DATABASE_URL").ok_or_else(|| {
                InvoiceError::config("DATABASE_URL must be set when USE_PERSISTENT_STORES=true")
            })?;
            let max_connections = match get("DATABASE_MAX_CONNECTIONS") {
                None => DEFAULT_MAX_CONNECTIONS,
                Some(v) => v
                    .parse::<u32>()
                    .ok()
                    .filter(|n| *n > 0)
                    .ok_or_else(|| {
                        InvoiceError::config(format!(
                            "DATABASE_MAX_CONNECTIONS must be a positive integer (got '{v}')"
                        ))
                    })?,
            };
            StoreConfig::Postgres {
                database_url,
                max_connections,
            }
        } else {
            StoreConfig::InMemory
        };

        Ok(Self { bind_addr, store })
    }

    /// In-memory store on an ephemeral loopback port.
    pub fn in_memory() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 0)),
            store: StoreConfig::InMemory,
        }
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config(vars: &[(&str, &str)]) -> InvoiceResult<AppConfig> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_to_in_memory_on_8080() {
        let cfg = config(&[]).unwrap();
        assert_eq!(cfg.bind_addr.to_string(), "0.0.0.0:8080");
        assert_eq!(cfg.store, StoreConfig::InMemory);
    }

    #[test]
    fn persistent_requires_database_url() {
        let err = config(&[("USE_PERSISTENT_STORES", "true")]).unwrap_err();
        assert_eq!(err.code(), "CONFIG_ERROR");

        let cfg = config(&[
            ("USE_PERSISTENT_STORES", "TRUE"),
            ("DATABASE_URL", "postgres://localhost/invoices"),
        ])
        .unwrap();
        assert_eq!(
            cfg.store,
            StoreConfig::Postgres {
                database_url: "postgres://localhost/invoices".to_string(),
                max_connections: DEFAULT_MAX_CONNECTIONS,
            }
        );
    }

    #[test]
    fn malformed_values_are_config_errors() {
        assert!(config(&[("BIND_ADDR", "nowhere")]).is_err());
        assert!(config(&[("USE_PERSISTENT_STORES", "maybe")]).is_err());
        assert!(
            config(&[
                ("USE_PERSISTENT_STORES", "1"),
                ("DATABASE_URL", "postgres://x"),
                ("DATABASE_MAX_CONNECTIONS", "0"),
            ])
            .is_err()
        );
    }

    #[test]
    fn blank_values_count_as_unset() {
        let cfg = config(&[("BIND_ADDR", "  "), ("USE_PERSISTENT_STORES", "")]).unwrap();
        assert_eq!(cfg, config(&[]).unwrap());
    }
}
