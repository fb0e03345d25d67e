// ABOUTME: Protocol smoke-test harness for the deployed endpoint.
// ABOUTME: Typed JSON-RPC probes plus the platform's own status channel.

mod client;
mod error;
mod probes;
mod protocol;

pub use client::{HttpProtocolClient, ProtocolClient};
pub use error::ProbeError;
pub use probes::{ProbeId, ProbeOutcome, ValidationResult, Validator};
pub use protocol::{
    CallToolResult, ContentBlock, InitializeResult, JsonRpcRequest, JsonRpcResponse,
    PROTOCOL_VERSION, RpcError, ServerInfo, ToolDescriptor, ToolsListResult,
};
