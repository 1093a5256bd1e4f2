use std::path::Path;

use anyhow::{Context, Result};

use super::types::Config;

pub const CONFIG_FILE: &str = ".lintrc";

/// Load config from a `.lintrc` file in the given directory.
///
/// A missing file yields the defaults; a file that exists but does not parse
/// is an error, surfaced before any pipeline step runs.
pub fn load(dir: &Path) -> Result<Config> {
    let path = dir.join(CONFIG_FILE);
    if !path.exists() {
        return Ok(Config::default());
    }
    let contents = std::fs::read_to_string(&path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let config: Config = serde_yaml::from_str(&contents)
        .with_context(|| format!("malformed config in {}", path.display()))?;
    Ok(config)
}
