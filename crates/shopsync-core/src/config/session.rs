//! RPC session configuration.

use serde::{Deserialize, Serialize};

/// Settings for sessions opened by the secondary RPC layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Lifetime of an RPC session token in minutes.
    #[serde(default = "default_rpc_ttl")]
    pub rpc_ttl_minutes: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            rpc_ttl_minutes: default_rpc_ttl(),
        }
    }
}

fn default_rpc_ttl() -> u64 {
    30
}
