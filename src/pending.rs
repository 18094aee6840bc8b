//! Pending-document coordinator
//!
//! Bridges two decoupled asynchronous operations: a command that
//! requests a new untitled buffer, and the later "a buffer became
//! active" event. At most one pending purpose is active at a time —
//! either inject template text into the next-activated untitled buffer,
//! or register it as a companion file of an existing one. If no
//! activation event ever fires, the stale state is harmless and simply
//! leaks until process end.

use crate::config::{SettingsStore, StaticConfig};
use crate::host::{Document, EditorHost, LogSink};
use crate::types::{Result, WandboxError};
use tokio::sync::Mutex;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Default)]
pub enum PendingDocument {
    #[default]
    None,
    /// Inject `text` and, if `extension` maps to a static default
    /// compiler, set it as the new buffer's compiler override
    Template { text: String, extension: String },
    /// Register the next untitled buffer as a companion of `target`
    Companion { target: String },
}

#[derive(Default)]
pub struct PendingCoordinator {
    state: Mutex<PendingDocument>,
}

impl PendingCoordinator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arm template injection. Starting a new pending operation while
    /// one is active is a sequencing error.
    pub async fn begin_template(&self, text: String, extension: String) -> Result<()> {
        let mut state = self.state.lock().await;
        if *state != PendingDocument::None {
            return Err(WandboxError::PendingDocumentBusy);
        }
        *state = PendingDocument::Template { text, extension };
        Ok(())
    }

    /// Arm companion registration for `target`.
    pub async fn begin_companion(&self, target: String) -> Result<()> {
        let mut state = self.state.lock().await;
        if *state != PendingDocument::None {
            return Err(WandboxError::PendingDocumentBusy);
        }
        *state = PendingDocument::Companion { target };
        Ok(())
    }

    /// Activation event handler: a single dispatch over the pending
    /// variant. Only untitled buffers consume pending state.
    pub async fn document_activated(
        &self,
        document: &Document,
        settings: &SettingsStore,
        config: &StaticConfig,
        host: &dyn EditorHost,
        log: &dyn LogSink,
    ) -> Result<()> {
        if !document.untitled {
            return Ok(());
        }

        let pending = {
            let mut state = self.state.lock().await;
            std::mem::take(&mut *state)
        };

        match pending {
            PendingDocument::None => Ok(()),
            PendingDocument::Template { text, extension } => {
                debug!("injecting template into {}", document.id);
                host.insert_at_start(&document.id, &text).await?;

                if let Some(compiler) = config.extension_to_compiler.get(&extension) {
                    let compiler = compiler.clone();
                    settings
                        .update(&document.id, |s| s.compiler = Some(compiler.clone()))
                        .await;
                    log.append_line(&format!(
                        "Set compiler \"{}\" for \"{}\"",
                        compiler, document.id
                    ));
                }
                Ok(())
            }
            PendingDocument::Companion { target } => {
                debug!("registering {} as companion of {}", document.id, target);
                settings.push_companion(&target, document.file_name()).await;
                log.append_line(&format!(
                    "Added \"{}\" to companion files of \"{}\"",
                    document.file_name(),
                    target
                ));
                Ok(())
            }
        }
    }
}
