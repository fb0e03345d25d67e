// ABOUTME: Protocol client trait and its HTTP implementation.
// ABOUTME: Probes go through this seam so tests can run without a network.

use async_trait::async_trait;
use std::time::Duration;

use super::error::ProbeError;
use super::protocol::{JsonRpcRequest, JsonRpcResponse};

/// One request/response exchange with the deployed service.
#[async_trait]
pub trait ProtocolClient: Send + Sync {
    async fn call(&self, request: &JsonRpcRequest) -> Result<JsonRpcResponse, ProbeError>;
}

/// HTTP client posting JSON-RPC to the deployed endpoint.
pub struct HttpProtocolClient {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpProtocolClient {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self, ProbeError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ProbeError::Transport(e.to_string()))?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }
}

#[async_trait]
impl ProtocolClient for HttpProtocolClient {
    async fn call(&self, request: &JsonRpcRequest) -> Result<JsonRpcResponse, ProbeError> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(request)
            .send()
            .await
            .map_err(|e| ProbeError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProbeError::Transport(format!(
                "endpoint returned {status}: {body}"
            )));
        }

        response
            .json::<JsonRpcResponse>()
            .await
            .map_err(|e| ProbeError::Malformed(e.to_string()))
    }
}
