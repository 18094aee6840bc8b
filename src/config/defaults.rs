//! Built-in static configuration
//!
//! Mapping tables from editor language ids and file extensions to
//! Wandbox compiler ids and language names, per-compiler default option
//! bundles, the default server list, and the bundled hello-world
//! templates (embedded at compile time).

use include_dir::{include_dir, Dir};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// Embed the template directory at compile time
static HELLOS_DIR: Dir = include_dir!("$CARGO_MANIFEST_DIR/hellos");

/// Static per-compiler option defaults, keyed by compiler id.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CompilerDefaults {
    pub options: Option<String>,
    pub compiler_option_raw: Option<String>,
    pub runtime_option_raw: Option<String>,
}

/// A bundled hello-world template.
#[derive(Debug, Clone)]
pub struct Template {
    /// File name shown in the template picker, e.g. "hello.cpp"
    pub name: String,
    /// Inferred extension, drives default-compiler inference on injection
    pub extension: String,
    pub text: String,
}

/// The read-only configuration surface consumed by the engine.
#[derive(Debug, Clone)]
pub struct StaticConfig {
    /// Ordered server list; the first entry is the default
    pub servers: Vec<String>,
    pub language_id_to_compiler: HashMap<String, String>,
    pub language_id_to_language: HashMap<String, String>,
    pub extension_to_compiler: HashMap<String, String>,
    pub extension_to_language: HashMap<String, String>,
    pub language_to_compiler: HashMap<String, String>,
    pub compiler_defaults: HashMap<String, CompilerDefaults>,
    /// Log a simplified payload (file names instead of contents)
    pub simplify_post_data: bool,
    /// Open the share URL automatically when the server returns one
    pub auto_open_url: bool,
    pub templates: Vec<Template>,
}

impl StaticConfig {
    pub fn default_server(&self) -> &str {
        self.servers
            .first()
            .map(String::as_str)
            .unwrap_or("https://wandbox.org")
    }
}

impl Default for StaticConfig {
    fn default() -> Self {
        Self {
            servers: vec!["https://wandbox.org".to_string()],
            language_id_to_compiler: language_id_to_compiler(),
            language_id_to_language: language_id_to_language(),
            extension_to_compiler: extension_to_compiler(),
            extension_to_language: extension_to_language(),
            language_to_compiler: language_to_compiler(),
            compiler_defaults: compiler_defaults(),
            simplify_post_data: false,
            auto_open_url: false,
            templates: bundled_templates(),
        }
    }
}

fn to_map(pairs: &[(&str, &str)]) -> HashMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

fn language_id_to_compiler() -> HashMap<String, String> {
    to_map(&[
        ("c", "clang-3.3-c"),
        ("coffeescript", "coffee-script-head"),
        ("cpp", "clang-head"),
        ("csharp", "mcs-head"),
        ("groovy", "groovy-2.2.1"),
        ("java", "java8-openjdk"),
        ("javascript", "node-head"),
        ("lua", "lua-5.3.0"),
        ("perl", "perl-head"),
        ("php", "php-head"),
        ("python", "python-head"),
        ("ruby", "ruby-head"),
        ("rust", "rust-head"),
        ("shellscript", "bash"),
        ("sql", "sqlite-head"),
        ("swift", "swift-2.2"),
    ])
}

fn language_id_to_language() -> HashMap<String, String> {
    to_map(&[
        ("c", "C"),
        ("coffeescript", "CoffeeScript"),
        ("cpp", "C++"),
        ("csharp", "C#"),
        ("groovy", "Groovy"),
        ("haskell", "Haskell"),
        ("java", "Java"),
        ("javascript", "JavaScript"),
        ("lua", "Lua"),
        ("perl", "Perl"),
        ("php", "PHP"),
        ("python", "Python"),
        ("ruby", "Ruby"),
        ("rust", "Rust"),
        ("shellscript", "Bash script"),
        ("sql", "SQL"),
        ("swift", "Swift"),
    ])
}

fn extension_to_compiler() -> HashMap<String, String> {
    to_map(&[
        ("c", "clang-3.3-c"),
        ("cc", "clang-head"),
        ("coffee", "coffee-script-head"),
        ("cpp", "clang-head"),
        ("cxx", "clang-head"),
        ("d", "dmd-head"),
        ("erl", "erlang-head"),
        ("ex", "elixir-head"),
        ("exs", "elixir-head"),
        ("groovy", "groovy-2.2.1"),
        ("gvy", "groovy-2.2.1"),
        ("hs", "ghc-head"),
        ("java", "java8-openjdk"),
        ("js", "node-head"),
        ("lazy", "lazyk"),
        ("lisp", "clisp-2.49.0"),
        ("lua", "lua-5.3.0"),
        ("pas", "fpc-2.6.2"),
        ("php", "php-head"),
        ("pl", "perl-head"),
        ("py", "python-head"),
        ("rb", "ruby-head"),
        ("rill", "rill-head"),
        ("rs", "rust-head"),
        ("scala", "scala-2.12.x"),
        ("sh", "bash"),
        ("sql", "sqlite-head"),
        ("swift", "swift-2.2"),
        ("vim", "vim-7.4.1714"),
    ])
}

fn extension_to_language() -> HashMap<String, String> {
    to_map(&[
        ("c", "C"),
        ("cc", "C++"),
        ("coffee", "CoffeeScript"),
        ("cpp", "C++"),
        ("cxx", "C++"),
        ("d", "D"),
        ("erl", "Erlang"),
        ("ex", "Elixir"),
        ("exs", "Elixir"),
        ("groovy", "Groovy"),
        ("hs", "Haskell"),
        ("java", "Java"),
        ("js", "JavaScript"),
        ("lisp", "Lisp"),
        ("lua", "Lua"),
        ("pas", "Pascal"),
        ("php", "PHP"),
        ("pl", "Perl"),
        ("py", "Python"),
        ("rb", "Ruby"),
        ("rs", "Rust"),
        ("scala", "Scala"),
        ("sh", "Bash script"),
        ("sql", "SQL"),
        ("swift", "Swift"),
        ("vim", "Vim script"),
    ])
}

fn language_to_compiler() -> HashMap<String, String> {
    to_map(&[
        ("Bash script", "bash"),
        ("C", "clang-3.3-c"),
        ("C#", "mcs-head"),
        ("C++", "clang-head"),
        ("CoffeeScript", "coffee-script-head"),
        ("D", "dmd-head"),
        ("Elixir", "elixir-head"),
        ("Erlang", "erlang-head"),
        ("Groovy", "groovy-2.2.1"),
        ("Haskell", "ghc-head"),
        ("Java", "java8-openjdk"),
        ("JavaScript", "node-head"),
        ("Lisp", "clisp-2.49.0"),
        ("Lua", "lua-5.3.0"),
        ("PHP", "php-head"),
        ("Pascal", "fpc-2.6.2"),
        ("Perl", "perl-head"),
        ("Python", "python-head"),
        ("Ruby", "ruby-head"),
        ("Rust", "rust-head"),
        ("SQL", "sqlite-head"),
        ("Scala", "scala-2.12.x"),
        ("Swift", "swift-2.2"),
        ("Vim script", "vim-7.4.1714"),
    ])
}

fn compiler_defaults() -> HashMap<String, CompilerDefaults> {
    let mut defaults = HashMap::new();

    defaults.insert(
        "clang-head".to_string(),
        CompilerDefaults {
            options: Some("warning,gnu++1y,cpp-pedantic-errors,boost-1.60".to_string()),
            ..Default::default()
        },
    );
    defaults.insert(
        "gcc-head".to_string(),
        CompilerDefaults {
            options: Some("warning,gnu++1y,cpp-pedantic-errors,boost-1.60".to_string()),
            ..Default::default()
        },
    );
    defaults.insert(
        "clang-3.3-c".to_string(),
        CompilerDefaults {
            options: Some("warning,c11".to_string()),
            ..Default::default()
        },
    );
    defaults.insert(
        "ghc-head".to_string(),
        CompilerDefaults {
            compiler_option_raw: Some("-O2".to_string()),
            ..Default::default()
        },
    );

    defaults
}

fn bundled_templates() -> Vec<Template> {
    let mut templates = Vec::new();

    for file in HELLOS_DIR.files() {
        let Some(name) = file.path().file_name() else {
            continue;
        };
        let name = name.to_string_lossy().to_string();
        let extension = file
            .path()
            .extension()
            .map(|e| e.to_string_lossy().to_string())
            .unwrap_or_default();

        if let Some(text) = file.contents_utf8() {
            templates.push(Template {
                name,
                extension,
                text: text.to_string(),
            });
        }
    }

    templates.sort_by(|a, b| a.name.cmp(&b.name));
    templates
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_tables() {
        let config = StaticConfig::default();
        assert_eq!(
            config.extension_to_compiler.get("cpp").map(String::as_str),
            Some("clang-head")
        );
        assert_eq!(
            config.language_id_to_language.get("cpp").map(String::as_str),
            Some("C++")
        );
        assert_eq!(
            config.language_to_compiler.get("C++").map(String::as_str),
            Some("clang-head")
        );
    }

    #[test]
    fn test_default_server() {
        let config = StaticConfig::default();
        assert_eq!(config.default_server(), "https://wandbox.org");
    }

    #[test]
    fn test_bundled_templates() {
        let templates = bundled_templates();
        assert!(!templates.is_empty());
        let cpp = templates
            .iter()
            .find(|t| t.name == "hello.cpp")
            .expect("hello.cpp template should be bundled");
        assert_eq!(cpp.extension, "cpp");
        assert!(cpp.text.contains("Hello, Wandbox!"));
    }

    #[test]
    fn test_compiler_defaults() {
        let defaults = compiler_defaults();
        let clang = defaults.get("clang-head").unwrap();
        assert!(clang.options.as_deref().unwrap().contains("warning"));
        assert!(clang.compiler_option_raw.is_none());
    }
}
