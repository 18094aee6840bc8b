//! Language/compiler picker
//!
//! Resolves a compiler id for one document through a linear fallback
//! chain, each step short-circuiting on first match:
//!
//! 1. the per-file compiler override
//! 2. the static language-id→compiler, then extension→compiler mapping
//! 3. infer a language name (language-id→language, extension→language,
//!    else an interactive pick over the server's directory languages),
//!    then language→compiler default, else the first descriptor whose
//!    language matches
//!
//! Ids from steps 1–2 must exist in the resolved server's current
//! directory; stale ids are logged and discarded so a changed compiler
//! catalog never silently breaks per-file settings.

use crate::compile::directory::DirectoryCache;
use crate::config::{SettingsStore, StaticConfig};
use crate::host::{Document, EditorHost, LogSink};
use crate::types::{Result, WandboxError};
use tracing::debug;

pub struct CompilerPicker<'a> {
    pub config: &'a StaticConfig,
    pub settings: &'a SettingsStore,
    pub directory: &'a DirectoryCache,
    pub host: &'a dyn EditorHost,
    pub log: &'a dyn LogSink,
}

impl CompilerPicker<'_> {
    /// Resolve a compiler id for `document` against `server`, or fail
    /// with `UnknownLanguage` once the chain is exhausted. Never issues
    /// a compile call.
    pub async fn resolve_compiler(&self, document: &Document, server: &str) -> Result<String> {
        let directory = self.directory.get_directory(server).await?;
        let in_directory = |name: &str| directory.iter().any(|d| d.name == name);

        // 1. per-file override
        if let Some(compiler) = self
            .settings
            .get(&document.id)
            .await
            .and_then(|s| s.compiler)
            .filter(|c| !c.is_empty())
        {
            if in_directory(&compiler) {
                debug!("compiler from file settings: {}", compiler);
                return Ok(compiler);
            }
            self.report_unknown(&compiler);
        }

        // 2. static mappings, language id before extension
        if let Some(compiler) = document
            .language_id
            .as_ref()
            .and_then(|id| self.config.language_id_to_compiler.get(id))
        {
            if in_directory(compiler) {
                debug!("compiler from language-id mapping: {}", compiler);
                return Ok(compiler.clone());
            }
            self.report_unknown(compiler);
        }

        if let Some(compiler) = document
            .extension()
            .and_then(|ext| self.config.extension_to_compiler.get(ext))
        {
            if in_directory(compiler) {
                debug!("compiler from extension mapping: {}", compiler);
                return Ok(compiler.clone());
            }
            self.report_unknown(compiler);
        }

        // 3. infer a language name, then map it to a compiler
        let language = match self.infer_language(document) {
            Some(language) => language,
            None => {
                let mut languages: Vec<String> =
                    directory.iter().map(|d| d.language.clone()).collect();
                languages.sort();
                languages.dedup();

                match self.host.show_quick_pick("Select language", &languages).await {
                    Some(language) => language,
                    None => return Err(WandboxError::UnknownLanguage(document.id.clone())),
                }
            }
        };

        if let Some(compiler) = self.config.language_to_compiler.get(&language) {
            if in_directory(compiler) {
                debug!("compiler from language default: {}", compiler);
                return Ok(compiler.clone());
            }
            self.report_unknown(compiler);
        }

        if let Some(descriptor) = directory.iter().find(|d| d.language == language) {
            debug!("first directory match for {}: {}", language, descriptor.name);
            return Ok(descriptor.name.clone());
        }

        Err(WandboxError::UnknownLanguage(document.id.clone()))
    }

    fn infer_language(&self, document: &Document) -> Option<String> {
        document
            .language_id
            .as_ref()
            .and_then(|id| self.config.language_id_to_language.get(id))
            .or_else(|| {
                document
                    .extension()
                    .and_then(|ext| self.config.extension_to_language.get(ext))
            })
            .cloned()
    }

    fn report_unknown(&self, compiler: &str) {
        self.log
            .append_line(&format!("🚫 Unknown compiler: {}", compiler));
    }
}
