use std::collections::HashMap;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Per-step kill timeout, in seconds.
    pub tool_timeout: u64,
    /// Optional tool-name → executable-path substitutions. The tool set
    /// itself is fixed; only where a binary resolves from is overridable.
    pub tool_overrides: HashMap<String, String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            tool_timeout: 900,
            tool_overrides: HashMap::new(),
        }
    }
}
