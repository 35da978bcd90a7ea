//! Cache key builders.

const PREFIX: &str = "shopsync";

/// Key of an RPC session opened by the secondary protocol.
pub fn rpc_session(token: &str) -> String {
    format!("{PREFIX}:rpc_session:{token}")
}
