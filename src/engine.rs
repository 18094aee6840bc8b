//! Engine command surface
//!
//! One method per user-facing operation. Every operation starts by
//! bringing the log channel to the foreground and stamping a dated
//! header line; every failure is reported to the log at the point of
//! detection and handed back to the caller without panicking.

use crate::api::{CompileResult, WandboxApi, CLIENT_ID};
use crate::compile::{build_request, simplified_payload, CompilerPicker, DirectoryCache, Orchestrator};
use crate::config::{
    resolve_options, resolve_server, FileSettings, SettingsStore, StaticConfig,
};
use crate::host::{Document, EditorHost, LogSink};
use crate::pending::PendingCoordinator;
use crate::types::{Result, WandboxError};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::info;
use url::Url;

/// Quick-pick escape entry for entering a server URL by hand.
const OTHER_SERVER: &str = "Enter another server URL...";

pub struct Engine {
    config: StaticConfig,
    api: Arc<dyn WandboxApi>,
    host: Arc<dyn EditorHost>,
    log: Arc<dyn LogSink>,
    settings: SettingsStore,
    directory: DirectoryCache,
    pending: PendingCoordinator,
    headed: AtomicBool,
}

impl Engine {
    pub fn new(
        config: StaticConfig,
        api: Arc<dyn WandboxApi>,
        host: Arc<dyn EditorHost>,
        log: Arc<dyn LogSink>,
    ) -> Self {
        info!("engine ready, default server {}", config.default_server());
        Self {
            directory: DirectoryCache::new(api.clone()),
            config,
            api,
            host,
            log,
            settings: SettingsStore::new(),
            pending: PendingCoordinator::new(),
            headed: AtomicBool::new(false),
        }
    }

    pub fn settings(&self) -> &SettingsStore {
        &self.settings
    }

    pub fn config(&self) -> &StaticConfig {
        &self.config
    }

    /// Flush the log to the foreground and stamp a dated header, at the
    /// start of every user-initiated action. A blank separator precedes
    /// every action after the first.
    fn bow_wow(&self) {
        self.log.show();
        if self.headed.swap(true, Ordering::Relaxed) {
            self.log.append_line("");
        }
        self.log.append_line(&format!(
            "🐾 Bow-wow! {}",
            chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
        ));
    }

    fn hint(&self, text: &str) {
        self.log.append_line(&format!("👉 {}", text));
    }

    fn active_or_report(&self) -> Result<Document> {
        match self.host.active_document() {
            Some(document) => Ok(document),
            None => {
                self.log.append_line("🚫 No active document!");
                Err(WandboxError::NoActiveFile)
            }
        }
    }

    /// Settings key and effective server for the current context.
    async fn context(&self) -> (String, String) {
        let key = SettingsStore::key_for(self.host.active_document().as_ref());
        let server = resolve_server(&self.settings, &self.config, &key).await;
        (key, server)
    }

    fn picker(&self) -> CompilerPicker<'_> {
        CompilerPicker {
            config: &self.config,
            settings: &self.settings,
            directory: &self.directory,
            host: &*self.host,
            log: &*self.log,
        }
    }

    // ---- directory commands ------------------------------------------

    /// Open the service's web front end externally.
    pub async fn open_web(&self) -> Result<()> {
        self.bow_wow();
        let (_, server) = self.context().await;
        self.host
            .open_external(&format!("{}/?from={}", server, CLIENT_ID))
            .await
    }

    /// Print the cached compiler directory as a `name<TAB>language`
    /// table.
    pub async fn show_list(&self) -> Result<()> {
        self.bow_wow();
        let (_, server) = self.context().await;

        match self.directory.get_directory(&server).await {
            Ok(directory) => {
                self.log.append_line("compiler\tlanguage");
                for descriptor in directory.iter() {
                    self.log
                        .append_line(&format!("{}\t{}", descriptor.name, descriptor.language));
                }
                Ok(())
            }
            Err(e) => {
                self.log.append_line(&format!("🚫 {}", e));
                self.hint("Check the server setting or your network, then run the list command again.");
                Err(e)
            }
        }
    }

    /// Always refetch the directory (overwriting the cache) and display
    /// the raw JSON as a read-only document.
    pub async fn show_raw_list(&self) -> Result<()> {
        self.bow_wow();
        let (_, server) = self.context().await;
        self.log
            .append_line(&format!("HTTP GET {}/api/list.json?from={}", server, CLIENT_ID));

        match self.directory.refresh(&server).await {
            Ok(directory) => {
                let json = serde_json::to_string_pretty(&*directory)?;
                self.host
                    .show_readonly_document("wandbox-api-list.json", &json)
                    .await
            }
            Err(e) => {
                self.log.append_line(&format!("🚫 {}", e));
                self.hint("Check the server setting or your network, then run the list command again.");
                Err(e)
            }
        }
    }

    /// Look one compiler up by name and pretty-print its descriptor.
    pub async fn show_item(&self) -> Result<()> {
        self.bow_wow();
        let name = match self.host.show_input_box("Enter compiler name", None).await {
            Some(name) if !name.is_empty() => name,
            _ => {
                self.hint("You can see the compiler list with the list command.");
                return Ok(());
            }
        };

        let (_, server) = self.context().await;
        let directory = match self.directory.get_directory(&server).await {
            Ok(directory) => directory,
            Err(e) => {
                self.log.append_line(&format!("🚫 {}", e));
                self.hint("Check the server setting or your network, then try again.");
                return Err(e);
            }
        };

        match directory.iter().find(|d| d.name == name) {
            Some(descriptor) => {
                self.log.append_line(&serde_json::to_string_pretty(descriptor)?);
                Ok(())
            }
            None => {
                self.log.append_line(&format!("🚫 Unknown compiler: {}", name));
                self.hint("You can see the compiler list with the list command.");
                Err(WandboxError::UnknownCompiler(name))
            }
        }
    }

    // ---- settings commands -------------------------------------------

    /// Choose the server used for the current file.
    pub async fn set_server(&self) -> Result<()> {
        self.bow_wow();
        let (key, current) = self.context().await;

        // The pick always carries a free-input escape so a server outside
        // the configured list stays reachable
        let reply = if self.config.servers.len() > 1 {
            let mut items = self.config.servers.clone();
            items.push(OTHER_SERVER.to_string());
            match self.host.show_quick_pick("Select a server", &items).await {
                Some(choice) if choice == OTHER_SERVER => {
                    self.host
                        .show_input_box("Enter server URL", Some(&current))
                        .await
                }
                other => other,
            }
        } else {
            self.host
                .show_input_box("Enter server URL", Some(&current))
                .await
        };

        let Some(server) = reply.filter(|s| !s.is_empty()) else {
            self.hint("Set a server URL such as https://wandbox.org to compile against.");
            return Ok(());
        };

        if let Err(e) = Url::parse(&server) {
            self.log.append_line(&format!("🚫 Invalid server URL: {}", e));
            self.hint("Use an absolute URL such as https://wandbox.org.");
            return Err(WandboxError::Config(format!("invalid server URL: {}", e)));
        }

        self.settings
            .update(&key, |s| s.server = Some(server.clone()))
            .await;
        self.log
            .append_line(&format!("Set server \"{}\" for \"{}\"", server, key));
        Ok(())
    }

    /// Set the per-file compiler override. Validated against the live
    /// directory at compile time, not here.
    pub async fn set_compiler(&self) -> Result<()> {
        self.bow_wow();
        let key = SettingsStore::key_for(self.host.active_document().as_ref());

        match self.host.show_input_box("Enter compiler name", None).await {
            Some(compiler) if !compiler.is_empty() => {
                self.settings
                    .update(&key, |s| s.compiler = Some(compiler.clone()))
                    .await;
                self.log
                    .append_line(&format!("Set compiler \"{}\" for \"{}\"", compiler, key));
                Ok(())
            }
            _ => {
                self.hint("You can see the compiler list with the list command.");
                Ok(())
            }
        }
    }

    pub async fn set_options(&self) -> Result<()> {
        self.set_text_field("Enter compile options", "options", |s, v| s.options = v)
            .await
    }

    pub async fn set_stdin(&self) -> Result<()> {
        self.set_text_field("Enter stdin text", "stdin", |s, v| s.stdin = v)
            .await
    }

    pub async fn set_compiler_option_raw(&self) -> Result<()> {
        self.set_text_field(
            "Enter raw compiler options",
            "compiler-option-raw",
            |s, v| s.compiler_option_raw = v,
        )
        .await
    }

    pub async fn set_runtime_option_raw(&self) -> Result<()> {
        self.set_text_field(
            "Enter raw runtime options",
            "runtime-option-raw",
            |s, v| s.runtime_option_raw = v,
        )
        .await
    }

    async fn set_text_field<F>(&self, prompt: &str, label: &str, apply: F) -> Result<()>
    where
        F: FnOnce(&mut FileSettings, Option<String>),
    {
        self.bow_wow();
        let key = SettingsStore::key_for(self.host.active_document().as_ref());

        match self.host.show_input_box(prompt, None).await {
            Some(value) if value.is_empty() => {
                self.settings.update(&key, |s| apply(s, None)).await;
                self.hint(&format!("Cleared {} for \"{}\"", label, key));
                Ok(())
            }
            Some(value) => {
                self.log
                    .append_line(&format!("Set {} \"{}\" for \"{}\"", label, value, key));
                self.settings.update(&key, |s| apply(s, Some(value))).await;
                Ok(())
            }
            None => {
                self.hint(&format!("Enter a value to set {} for this file.", label));
                Ok(())
            }
        }
    }

    /// Edit the whole FileSettings record as raw JSON. A malformed blob
    /// fails closed: nothing is applied.
    pub async fn set_settings_json(&self) -> Result<()> {
        self.bow_wow();
        let key = SettingsStore::key_for(self.host.active_document().as_ref());
        let current = self.settings.get(&key).await.unwrap_or_default();
        let prefill = serde_json::to_string(&current)?;

        let Some(reply) = self
            .host
            .show_input_box("Edit file settings (JSON)", Some(&prefill))
            .await
        else {
            self.hint("Edit the JSON to change every setting for this file at once.");
            return Ok(());
        };

        match serde_json::from_str::<FileSettings>(&reply) {
            Ok(parsed) => {
                self.settings.replace(&key, parsed).await;
                self.log.append_line(&format!("Set settings for \"{}\"", key));
                Ok(())
            }
            Err(e) => {
                self.log.append_line(&format!("🚫 Invalid settings JSON: {}", e));
                self.hint("Fix the JSON and run the command again; nothing was applied.");
                Err(WandboxError::SettingParse(e))
            }
        }
    }

    /// Remove the per-file settings entry. Missing entries are a no-op.
    pub async fn reset_file_settings(&self) -> Result<()> {
        self.bow_wow();
        let key = SettingsStore::key_for(self.host.active_document().as_ref());

        if self.settings.reset(&key).await {
            self.log.append_line(&format!("Reset settings for \"{}\"", key));
        } else {
            self.log
                .append_line(&format!("⚠️ Not found settings for \"{}\"", key));
        }
        Ok(())
    }

    // ---- pending-document commands -----------------------------------

    /// Pick a bundled hello-world template and inject it into a fresh
    /// untitled buffer.
    pub async fn new_document_from_template(&self) -> Result<()> {
        self.bow_wow();
        let names: Vec<String> = self.config.templates.iter().map(|t| t.name.clone()).collect();

        let Some(choice) = self.host.show_quick_pick("Select a template", &names).await else {
            self.hint("Pick a template to start a new document from.");
            return Ok(());
        };
        let Some(template) = self.config.templates.iter().find(|t| t.name == choice) else {
            return Err(WandboxError::Config(format!("unknown template: {}", choice)));
        };

        if let Err(e) = self
            .pending
            .begin_template(template.text.clone(), template.extension.clone())
            .await
        {
            self.log.append_line(&format!("🚫 {}", e));
            return Err(e);
        }
        self.host.create_untitled_document().await
    }

    /// Register the next untitled buffer as a companion of the active
    /// file.
    pub async fn add_companion_document(&self) -> Result<()> {
        self.bow_wow();
        let document = self.active_or_report()?;

        if let Err(e) = self.pending.begin_companion(document.id.clone()).await {
            self.log.append_line(&format!("🚫 {}", e));
            return Err(e);
        }
        self.host.create_untitled_document().await
    }

    // ---- compile ------------------------------------------------------

    /// Resolve, build and send one compile request. With `save` the
    /// server stores the run and returns a share URL.
    pub async fn compile(&self, save: bool) -> Result<CompileResult> {
        self.bow_wow();
        let document = self.active_or_report()?;
        let key = document.id.clone();
        let server = resolve_server(&self.settings, &self.config, &key).await;

        let compiler = match self.picker().resolve_compiler(&document, &server).await {
            Ok(compiler) => compiler,
            Err(e) => {
                match &e {
                    WandboxError::UnknownLanguage(_) => {
                        self.log.append_line("🚫 Unknown language!");
                        self.hint("You can set a compiler with the set-compiler command.");
                        self.hint("You can see the compiler list with the list command.");
                    }
                    other => {
                        self.log.append_line(&format!("🚫 {}", other));
                        self.hint("Check the server setting or your network, then try again.");
                    }
                }
                return Err(e);
            }
        };

        let resolved = resolve_options(&self.settings, &self.config, &key, &compiler).await;
        self.log
            .append_line(&format!("HTTP POST {}/api/compile.json", server));

        // In simplify mode the display form is logged before any file
        // contents are resolved
        if self.config.simplify_post_data {
            let simplified = simplified_payload(&compiler, &document, &resolved, save);
            self.log.append_line(&serde_json::to_string_pretty(&simplified)?);
        }

        let open_documents = self.host.open_documents();
        let request = match build_request(&compiler, &document, &resolved, &open_documents, save) {
            Ok(request) => request,
            Err(e) => {
                if let WandboxError::CompanionFileNotOpen(names) = &e {
                    for name in names {
                        self.log
                            .append_line(&format!("🚫 Not found open document: {}", name));
                    }
                    self.hint("A companion file must be open in the editor; open it or remove it from the settings.");
                }
                return Err(e);
            }
        };

        if !self.config.simplify_post_data {
            self.log.append_line(&serde_json::to_string_pretty(&request)?);
        }

        Orchestrator {
            api: &*self.api,
            host: &*self.host,
            log: &*self.log,
            auto_open_url: self.config.auto_open_url,
        }
        .compile(&server, &request)
        .await
    }

    // ---- host events --------------------------------------------------

    /// "Active buffer changed" event: dispatches any pending template or
    /// companion registration.
    pub async fn document_activated(&self, document: &Document) -> Result<()> {
        self.pending
            .document_activated(document, &self.settings, &self.config, &*self.host, &*self.log)
            .await
    }

    /// "Buffer closed" event: transient buffers drop their settings.
    pub async fn document_closed(&self, document: &Document) {
        self.settings.document_closed(document).await;
    }
}
