//! Configuration system
//!
//! Layered resolution, lowest to highest priority:
//! 1. Built-in defaults (mapping tables, server list, templates)
//! 2. User TOML config file
//! 3. Per-file settings in the process-wide store

mod defaults;
mod loader;
mod resolver;
mod settings;

pub use defaults::{CompilerDefaults, StaticConfig, Template};
pub use loader::{apply, load, read_user_config, UserConfig};
pub use resolver::{normalize_server, resolve_options, resolve_server, ResolvedOptions};
pub use settings::{FileSettings, SettingsStore, DEFAULT_KEY};
