//! Compile orchestrator
//!
//! Issues the compile POST, measures the elapsed wall time, and renders
//! the structured response (or the transport/protocol failure) into the
//! log sink. Single attempt, no retry, no cancellation: once the POST is
//! issued there is no cancel path, and closing the source buffer does
//! not abort the in-flight request.

use crate::api::{CompileRequest, CompileResult, WandboxApi};
use crate::host::{EditorHost, LogSink};
use crate::types::{Result, WandboxError};
use std::time::Instant;
use tracing::warn;

pub struct Orchestrator<'a> {
    pub api: &'a dyn WandboxApi,
    pub host: &'a dyn EditorHost,
    pub log: &'a dyn LogSink,
    /// Open the share URL automatically when the server returns one
    pub auto_open_url: bool,
}

impl Orchestrator<'_> {
    pub async fn compile(&self, server: &str, request: &CompileRequest) -> Result<CompileResult> {
        let started = Instant::now();
        let outcome = self.api.post_compile(server, request).await;
        let elapsed = started.elapsed().as_secs_f64();

        // Elapsed time is always logged, success or not
        self.log.append_line(&format!("🏁 time: {:.3} s", elapsed));

        match outcome {
            Ok(result) => {
                self.log.append_line("HTTP statusCode: 200");
                self.report(&result).await;
                Ok(result)
            }
            Err(e) => {
                self.report_failure(&e);
                Err(e)
            }
        }
    }

    /// Log the present fields in their fixed order. Absence of a field
    /// is not an error; empty fields are skipped too.
    async fn report(&self, result: &CompileResult) {
        if let Some(status) = present(&result.status) {
            self.log.append_line(&format!("status: {}", status));
        }
        if let Some(signal) = present(&result.signal) {
            self.log.append_line(&format!("🚦 signal: {}", signal));
        }
        if let Some(output) = present(&result.compiler_output) {
            self.log.append_line("compiler_output: ");
            self.log.append_line(output);
        }
        if let Some(error) = present(&result.compiler_error) {
            self.log.append_line("🚫 compiler_error: ");
            self.log.append_line(error);
        }
        if let Some(output) = present(&result.program_output) {
            self.log.append_line("program_output: ");
            self.log.append_line(output);
        }
        if let Some(error) = present(&result.program_error) {
            self.log.append_line("🚫 program_error: ");
            self.log.append_line(error);
        }
        if let Some(permlink) = present(&result.permlink) {
            self.log.append_line(&format!("🔗 permlink: {}", permlink));
        }
        if let Some(url) = present(&result.url) {
            self.log.append_line(&format!("🔗 url: {}", url));
            if self.auto_open_url {
                if let Err(e) = self.host.open_external(url).await {
                    warn!("failed to open share url: {}", e);
                }
            }
        }
    }

    /// Raw diagnosis dump: status if known, body if present, error
    /// otherwise. The body is never interpreted as a compile result.
    fn report_failure(&self, error: &WandboxError) {
        match error {
            WandboxError::Protocol { status, body } => {
                self.log.append_line(&format!("HTTP statusCode: {}", status));
                if !body.is_empty() {
                    self.log.append_line(body);
                }
            }
            other => {
                self.log.append_line(&format!("error: {}", other));
            }
        }
    }
}

fn present(field: &Option<String>) -> Option<&String> {
    field.as_ref().filter(|v| !v.is_empty())
}
