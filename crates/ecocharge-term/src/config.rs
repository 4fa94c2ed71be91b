use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Terminal configuration, loadable from a JSON file
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TerminalConfig {
    /// Base URL of the charging-network backend
    pub base_url: String,
    /// Directory holding the persisted operator credential; the
    /// platform data directory when unset
    pub credential_dir: Option<PathBuf>,
    /// Dashboard polling period in seconds
    pub poll_interval_secs: u64,
}

impl Default for TerminalConfig {
    fn default() -> Self {
        TerminalConfig {
            base_url: ecocharge_client::DEFAULT_BASE_URL.to_string(),
            credential_dir: None,
            poll_interval_secs: 2,
        }
    }
}
