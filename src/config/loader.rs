//! Static configuration loader
//!
//! Builds the effective `StaticConfig` from the built-in defaults plus an
//! optional user TOML file. Lookup order:
//! 1. ./wandbox.toml (project-specific)
//! 2. $WANDBOX_CONFIG (environment variable)
//! 3. <config-dir>/wandbox/config.toml (user-global)
//!
//! Mapping tables in the user file extend the built-in tables entry by
//! entry; the server list and boolean flags replace the defaults.

use crate::config::defaults::{CompilerDefaults, StaticConfig};
use crate::types::WandboxError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UserConfig {
    pub servers: Option<Vec<String>>,
    pub simplify_post_data: Option<bool>,
    pub auto_open_url: Option<bool>,
    #[serde(default)]
    pub language_id_to_compiler: HashMap<String, String>,
    #[serde(default)]
    pub language_id_to_language: HashMap<String, String>,
    #[serde(default)]
    pub extension_to_compiler: HashMap<String, String>,
    #[serde(default)]
    pub extension_to_language: HashMap<String, String>,
    #[serde(default)]
    pub language_to_compiler: HashMap<String, String>,
    #[serde(default)]
    pub compiler_options: HashMap<String, CompilerDefaults>,
}

/// Load the effective configuration: defaults plus the first user config
/// file found, if any.
pub fn load() -> Result<StaticConfig, WandboxError> {
    let mut config = StaticConfig::default();

    for path in candidate_paths() {
        if path.exists() {
            debug!("loading user config from: {}", path.display());
            let user = read_user_config(&path)?;
            apply(&mut config, user);
            info!("loaded user configuration from {}", path.display());
            return Ok(config);
        }
    }

    debug!("no user config file found");
    Ok(config)
}

fn candidate_paths() -> Vec<PathBuf> {
    let mut candidates = Vec::new();

    if let Ok(cwd) = std::env::current_dir() {
        candidates.push(cwd.join("wandbox.toml"));
    }

    if let Ok(path) = std::env::var("WANDBOX_CONFIG") {
        candidates.push(PathBuf::from(path));
    }

    if let Some(config_dir) = dirs::config_dir() {
        candidates.push(config_dir.join("wandbox").join("config.toml"));
    }

    candidates
}

pub fn read_user_config(path: &Path) -> Result<UserConfig, WandboxError> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| WandboxError::Config(format!("failed to read {}: {}", path.display(), e)))?;

    toml::from_str(&content)
        .map_err(|e| WandboxError::Config(format!("failed to parse {}: {}", path.display(), e)))
}

pub fn apply(config: &mut StaticConfig, user: UserConfig) {
    if let Some(servers) = user.servers {
        if !servers.is_empty() {
            config.servers = servers;
        }
    }
    if let Some(simplify) = user.simplify_post_data {
        config.simplify_post_data = simplify;
    }
    if let Some(auto_open) = user.auto_open_url {
        config.auto_open_url = auto_open;
    }

    config
        .language_id_to_compiler
        .extend(user.language_id_to_compiler);
    config
        .language_id_to_language
        .extend(user.language_id_to_language);
    config.extension_to_compiler.extend(user.extension_to_compiler);
    config.extension_to_language.extend(user.extension_to_language);
    config.language_to_compiler.extend(user.language_to_compiler);
    config.compiler_defaults.extend(user.compiler_options);
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_user_config_overrides_and_extends() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"
servers = ["http://localhost:3500"]
auto_open_url = true

[extension_to_compiler]
nim = "nim-head"
cpp = "gcc-head"
"#
        )
        .unwrap();

        let user = read_user_config(file.path()).unwrap();
        let mut config = StaticConfig::default();
        apply(&mut config, user);

        assert_eq!(config.servers, vec!["http://localhost:3500".to_string()]);
        assert!(config.auto_open_url);
        assert!(!config.simplify_post_data);

        // New entry added, existing entry overridden, others untouched
        assert_eq!(
            config.extension_to_compiler.get("nim").map(String::as_str),
            Some("nim-head")
        );
        assert_eq!(
            config.extension_to_compiler.get("cpp").map(String::as_str),
            Some("gcc-head")
        );
        assert_eq!(
            config.extension_to_compiler.get("rs").map(String::as_str),
            Some("rust-head")
        );
    }

    #[test]
    fn test_malformed_user_config_is_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "servers = 12").unwrap();

        let result = read_user_config(file.path());
        assert!(matches!(result, Err(WandboxError::Config(_))));
    }

    #[test]
    fn test_unknown_key_is_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "serverz = [\"http://x\"]").unwrap();

        assert!(read_user_config(file.path()).is_err());
    }
}
