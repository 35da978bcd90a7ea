//! Shop-level switches read by the dispatcher.

use serde::{Deserialize, Serialize};

/// Gateway behaviour switches.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    /// When set, every sync request is answered with the maintenance
    /// marker before authentication.
    #[serde(default)]
    pub maintenance_mode: bool,
    /// Keep uploaded archives and extraction directories after the
    /// request. Diagnostics only.
    #[serde(default)]
    pub retain_sync_files: bool,
    /// Echo captured error diagnostics into the response body.
    #[serde(default)]
    pub display_errors: bool,
    /// User-Agent product token identifying the ERP client.
    #[serde(default = "default_agent_marker")]
    pub client_agent_marker: String,
    /// First client version that understands UTF-8 payloads.
    #[serde(default = "default_utf8_min_version")]
    pub utf8_min_client_version: String,
    /// Request types staged into the inbox by the built-in pull handler.
    #[serde(default = "default_pull_identifiers")]
    pub pull_identifiers: Vec<String>,
    /// Request types served from the outbox by the built-in push handler.
    #[serde(default = "default_push_identifiers")]
    pub push_identifiers: Vec<String>,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            maintenance_mode: false,
            retain_sync_files: false,
            display_errors: false,
            client_agent_marker: default_agent_marker(),
            utf8_min_client_version: default_utf8_min_version(),
            pull_identifiers: default_pull_identifiers(),
            push_identifiers: default_push_identifiers(),
        }
    }
}

fn default_agent_marker() -> String {
    "JTL-Wawi".to_string()
}

fn default_utf8_min_version() -> String {
    "1.0".to_string()
}

fn default_pull_identifiers() -> Vec<String> {
    [
        "Artikel_xml",
        "Kategorien_xml",
        "Hersteller_xml",
        "Merkmal_xml",
        "Globals_xml",
        "Bilder_xml",
        "Bilder_upload",
        "QuickSync_xml",
        "SetKunde_xml",
        "Bestellungen_xml",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

fn default_push_identifiers() -> Vec<String> {
    ["GetBestellungen_xml", "GetKunden_xml", "GetZahlungen_xml"]
        .into_iter()
        .map(String::from)
        .collect()
}
