// ABOUTME: Typed JSON-RPC 2.0 messages for the application protocol surface.
// ABOUTME: Responses decode into a result/error sum; fields are read by name, not substring.

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::collections::BTreeMap;

use super::error::ProbeError;

/// Protocol version sent in the handshake.
pub const PROTOCOL_VERSION: &str = "2024-11-05";

const JSONRPC_VERSION: &str = "2.0";

/// One request: version tag, request id, method, and argument map.
#[derive(Debug, Clone, Serialize)]
pub struct JsonRpcRequest {
    pub jsonrpc: &'static str,
    pub id: u64,
    pub method: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub params: Option<Value>,
}

impl JsonRpcRequest {
    pub fn new(id: u64, method: impl Into<String>, params: Option<Value>) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION,
            id,
            method: method.into(),
            params,
        }
    }

    /// Session-initialize request with the fixed protocol version and a
    /// minimal capability set.
    pub fn initialize(id: u64) -> Self {
        Self::new(
            id,
            "initialize",
            Some(json!({
                "protocolVersion": PROTOCOL_VERSION,
                "capabilities": {},
                "clientInfo": {
                    "name": "skylift",
                    "version": env!("CARGO_PKG_VERSION"),
                },
            })),
        )
    }

    /// Request the set of invocable operations.
    pub fn tools_list(id: u64) -> Self {
        Self::new(id, "tools/list", None)
    }

    /// Invoke one operation with concrete arguments.
    pub fn tools_call(id: u64, tool: &str, arguments: &BTreeMap<String, String>) -> Self {
        Self::new(
            id,
            "tools/call",
            Some(json!({
                "name": tool,
                "arguments": arguments,
            })),
        )
    }
}

/// Error object carried by a failed response.
#[derive(Debug, Clone, Deserialize)]
pub struct RpcError {
    pub code: i64,
    pub message: String,
}

/// One response: either a result object or an error object.
#[derive(Debug, Clone, Deserialize)]
pub struct JsonRpcResponse {
    #[allow(dead_code)]
    pub jsonrpc: String,
    #[serde(default)]
    pub id: Option<Value>,
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<RpcError>,
}

impl JsonRpcResponse {
    /// Resolve the result/error sum. A response carrying neither is
    /// malformed.
    pub fn outcome(&self) -> Result<&Value, ProbeError> {
        if let Some(error) = &self.error {
            return Err(ProbeError::Rpc {
                code: error.code,
                message: error.message.clone(),
            });
        }
        self.result
            .as_ref()
            .ok_or_else(|| ProbeError::Malformed("neither result nor error present".to_string()))
    }

    /// Decode the result object into a typed shape.
    pub fn decode<T: serde::de::DeserializeOwned>(&self) -> Result<T, ProbeError> {
        let result = self.outcome()?;
        serde_json::from_value(result.clone()).map_err(|e| ProbeError::Malformed(e.to_string()))
    }
}

/// Handshake result: the server identifies itself.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitializeResult {
    #[serde(default)]
    pub protocol_version: Option<String>,
    pub server_info: ServerInfo,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerInfo {
    pub name: String,
    pub version: String,
}

/// Capability enumeration result: the advertised operations.
#[derive(Debug, Clone, Deserialize)]
pub struct ToolsListResult {
    pub tools: Vec<ToolDescriptor>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ToolDescriptor {
    pub name: String,
}

/// Operation invocation result: content blocks plus an error marker.
#[derive(Debug, Clone, Deserialize)]
pub struct CallToolResult {
    #[serde(default)]
    pub content: Vec<ContentBlock>,
    #[serde(default, rename = "isError")]
    pub is_error: bool,
}

impl CallToolResult {
    /// All text content joined, for keyword checks.
    pub fn text(&self) -> String {
        self.content
            .iter()
            .filter(|b| b.kind == "text")
            .map(|b| b.text.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ContentBlock {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub text: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(body: &str) -> JsonRpcResponse {
        serde_json::from_str(body).unwrap()
    }

    #[test]
    fn result_response_resolves_to_result() {
        let resp = response(r#"{"jsonrpc":"2.0","id":1,"result":{"ok":true}}"#);
        assert!(resp.outcome().is_ok());
    }

    #[test]
    fn error_response_resolves_to_error() {
        let resp = response(
            r#"{"jsonrpc":"2.0","id":1,"error":{"code":-32601,"message":"Method not found"}}"#,
        );
        match resp.outcome() {
            Err(ProbeError::Rpc { code, message }) => {
                assert_eq!(code, -32601);
                assert_eq!(message, "Method not found");
            }
            other => panic!("expected rpc error, got {other:?}"),
        }
    }

    #[test]
    fn response_with_neither_is_malformed() {
        let resp = response(r#"{"jsonrpc":"2.0","id":1}"#);
        assert!(matches!(resp.outcome(), Err(ProbeError::Malformed(_))));
    }

    #[test]
    fn handshake_result_decodes_server_info() {
        let resp = response(
            r#"{"jsonrpc":"2.0","id":1,"result":{
                "protocolVersion":"2024-11-05",
                "serverInfo":{"name":"svc","version":"1.0"}
            }}"#,
        );
        let init: InitializeResult = resp.decode().unwrap();
        assert_eq!(init.server_info.name, "svc");
        assert_eq!(init.server_info.version, "1.0");
        assert_eq!(init.protocol_version.as_deref(), Some(PROTOCOL_VERSION));
    }

    #[test]
    fn nested_name_fields_do_not_confuse_extraction() {
        // Substring scanning would trip on the inner "name"; typed decoding
        // reads only the named serverInfo fields.
        let resp = response(
            r#"{"jsonrpc":"2.0","id":1,"result":{
                "instructions":"say \"name\":\"decoy\" to confuse parsers",
                "capabilities":{"tools":{"name":"inner"}},
                "serverInfo":{"name":"svc","version":"1.0"}
            }}"#,
        );
        let init: InitializeResult = resp.decode().unwrap();
        assert_eq!(init.server_info.name, "svc");
        assert_eq!(init.server_info.version, "1.0");
    }

    #[test]
    fn tools_list_counts_name_markers() {
        let resp = response(
            r#"{"jsonrpc":"2.0","id":2,"result":{"tools":[
                {"name":"search","description":"d"},
                {"name":"open"},
                {"name":"find"}
            ]}}"#,
        );
        let tools: ToolsListResult = resp.decode().unwrap();
        assert_eq!(tools.tools.len(), 3);
        assert_eq!(tools.tools[0].name, "search");
    }

    #[test]
    fn call_result_joins_text_blocks() {
        let resp = response(
            r#"{"jsonrpc":"2.0","id":3,"result":{"content":[
                {"type":"text","text":"Rust is a systems language"},
                {"type":"image","data":"..."},
                {"type":"text","text":"with fearless concurrency"}
            ]}}"#,
        );
        let call: CallToolResult = resp.decode().unwrap();
        assert!(!call.is_error);
        assert_eq!(
            call.text(),
            "Rust is a systems language\nwith fearless concurrency"
        );
    }

    #[test]
    fn initialize_request_carries_fixed_version() {
        let request = JsonRpcRequest::initialize(1);
        let body = serde_json::to_value(&request).unwrap();
        assert_eq!(body["jsonrpc"], "2.0");
        assert_eq!(body["method"], "initialize");
        assert_eq!(body["params"]["protocolVersion"], PROTOCOL_VERSION);
    }
}
