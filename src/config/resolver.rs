//! Configuration resolver
//!
//! Merges per-file overrides with the static defaults into the effective
//! values for one compile invocation. Resolution is synchronous and
//! pure apart from reading the settings store; per field, the first
//! non-empty source wins:
//!
//! 1. the FileSettings entry for the file
//! 2. the static per-compiler default (keyed by the already-resolved
//!    compiler id)
//! 3. absent — the field is omitted from the outgoing request

use crate::config::defaults::StaticConfig;
use crate::config::settings::SettingsStore;

/// The option bundle attached to one compile request.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResolvedOptions {
    pub options: Option<String>,
    pub stdin: Option<String>,
    pub compiler_option_raw: Option<String>,
    pub runtime_option_raw: Option<String>,
    pub companion_files: Vec<String>,
}

/// Strip exactly one trailing `/`.
pub fn normalize_server(url: &str) -> &str {
    url.strip_suffix('/').unwrap_or(url)
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

/// Effective server URL for the file, normalized.
pub async fn resolve_server(store: &SettingsStore, config: &StaticConfig, key: &str) -> String {
    let configured = store
        .get(key)
        .await
        .and_then(|s| non_empty(s.server))
        .unwrap_or_else(|| config.default_server().to_string());

    normalize_server(&configured).to_string()
}

/// Effective option bundle for the file. Compiler resolution must have
/// completed first: the static defaults are keyed by compiler id.
pub async fn resolve_options(
    store: &SettingsStore,
    config: &StaticConfig,
    key: &str,
    compiler: &str,
) -> ResolvedOptions {
    let settings = store.get(key).await.unwrap_or_default();
    let defaults = config.compiler_defaults.get(compiler);

    ResolvedOptions {
        options: non_empty(settings.options)
            .or_else(|| defaults.and_then(|d| non_empty(d.options.clone()))),
        stdin: non_empty(settings.stdin),
        compiler_option_raw: non_empty(settings.compiler_option_raw)
            .or_else(|| defaults.and_then(|d| non_empty(d.compiler_option_raw.clone()))),
        runtime_option_raw: non_empty(settings.runtime_option_raw)
            .or_else(|| defaults.and_then(|d| non_empty(d.runtime_option_raw.clone()))),
        companion_files: settings.additionals.unwrap_or_default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_server() {
        assert_eq!(normalize_server("http://x/"), "http://x");
        assert_eq!(normalize_server("http://x"), "http://x");
        // exactly one trailing slash is stripped
        assert_eq!(normalize_server("http://x//"), "http://x/");
    }

    #[tokio::test]
    async fn test_resolve_server_prefers_file_setting() {
        let store = SettingsStore::new();
        let config = StaticConfig::default();

        assert_eq!(
            resolve_server(&store, &config, "a.cpp").await,
            "https://wandbox.org"
        );

        store
            .update("a.cpp", |s| s.server = Some("http://localhost:3500/".to_string()))
            .await;
        assert_eq!(
            resolve_server(&store, &config, "a.cpp").await,
            "http://localhost:3500"
        );
    }

    #[tokio::test]
    async fn test_resolve_options_precedence() {
        let store = SettingsStore::new();
        let config = StaticConfig::default();

        // No file entry: the clang-head static default applies
        let resolved = resolve_options(&store, &config, "a.cpp", "clang-head").await;
        assert_eq!(
            resolved.options.as_deref(),
            Some("warning,gnu++1y,cpp-pedantic-errors,boost-1.60")
        );
        assert!(resolved.stdin.is_none());

        // A per-file override beats the static default
        store
            .update("a.cpp", |s| {
                s.options = Some("warning,c++2a".to_string());
                s.stdin = Some("7\n".to_string());
            })
            .await;
        let resolved = resolve_options(&store, &config, "a.cpp", "clang-head").await;
        assert_eq!(resolved.options.as_deref(), Some("warning,c++2a"));
        assert_eq!(resolved.stdin.as_deref(), Some("7\n"));
    }

    #[tokio::test]
    async fn test_empty_field_falls_through() {
        let store = SettingsStore::new();
        let config = StaticConfig::default();

        store
            .update("a.cpp", |s| s.options = Some(String::new()))
            .await;
        let resolved = resolve_options(&store, &config, "a.cpp", "clang-head").await;
        assert_eq!(
            resolved.options.as_deref(),
            Some("warning,gnu++1y,cpp-pedantic-errors,boost-1.60")
        );
    }

    #[tokio::test]
    async fn test_unknown_compiler_has_no_defaults() {
        let store = SettingsStore::new();
        let config = StaticConfig::default();

        let resolved = resolve_options(&store, &config, "a.xyz", "mystery-1.0").await;
        assert_eq!(resolved, ResolvedOptions::default());
    }
}
