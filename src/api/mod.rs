//! Remote Wandbox API surface
//!
//! The engine talks to the compile service through the `WandboxApi`
//! trait so tests can substitute a scripted transport.

mod http;
mod types;

pub use http::{HttpApi, CLIENT_ID};
pub use types::{
    CompanionSource, CompileRequest, CompileResult, CompilerDescriptor, SwitchGroup, SwitchOption,
};

use crate::types::WandboxError;
use async_trait::async_trait;

#[async_trait]
pub trait WandboxApi: Send + Sync {
    /// GET `<server>/api/list.json` — the server's compiler directory.
    async fn get_list(&self, server: &str) -> Result<Vec<CompilerDescriptor>, WandboxError>;

    /// POST `<server>/api/compile.json` — one compile run, single attempt.
    async fn post_compile(
        &self,
        server: &str,
        request: &CompileRequest,
    ) -> Result<CompileResult, WandboxError>;
}
