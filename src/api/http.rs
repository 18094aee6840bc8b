//! HTTP transport for the Wandbox API
//!
//! Single attempt per call, no retry. Every network failure is terminal
//! for that invocation and must be re-triggered by the user.

use crate::api::types::{CompileRequest, CompileResult, CompilerDescriptor};
use crate::api::WandboxApi;
use crate::types::WandboxError;
use async_trait::async_trait;
use tracing::{debug, warn};

/// Identifies this client in the `from` query parameter and `User-Agent`.
pub const CLIENT_ID: &str = "wandbox-rust";

pub struct HttpApi {
    client: reqwest::Client,
}

impl HttpApi {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }
}

impl Default for HttpApi {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl WandboxApi for HttpApi {
    async fn get_list(&self, server: &str) -> Result<Vec<CompilerDescriptor>, WandboxError> {
        let url = format!("{}/api/list.json?from={}", server, CLIENT_ID);
        debug!("GET {}", url);

        let response = self.client.get(&url).send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            warn!("list.json returned HTTP {}", status.as_u16());
            return Err(WandboxError::Protocol {
                status: status.as_u16(),
                body,
            });
        }

        // A 200 with an unparseable body is still a protocol failure
        serde_json::from_str(&body).map_err(|e| {
            warn!("failed to parse list.json: {}", e);
            WandboxError::Protocol {
                status: status.as_u16(),
                body,
            }
        })
    }

    async fn post_compile(
        &self,
        server: &str,
        request: &CompileRequest,
    ) -> Result<CompileResult, WandboxError> {
        let url = format!("{}/api/compile.json", server);
        debug!("POST {} compiler={}", url, request.compiler);

        let response = self
            .client
            .post(&url)
            .header(reqwest::header::USER_AGENT, CLIENT_ID)
            .json(request)
            .send()
            .await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            warn!("compile.json returned HTTP {}", status.as_u16());
            return Err(WandboxError::Protocol {
                status: status.as_u16(),
                body,
            });
        }

        serde_json::from_str(&body).map_err(|e| {
            warn!("failed to parse compile.json response: {}", e);
            WandboxError::Protocol {
                status: status.as_u16(),
                body,
            }
        })
    }
}
