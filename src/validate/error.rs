// ABOUTME: Probe error types for the validation harness.
// ABOUTME: Transport, protocol-level, and malformed-response failures.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("request failed: {0}")]
    Transport(String),

    #[error("protocol error {code}: {message}")]
    Rpc { code: i64, message: String },

    #[error("malformed response: {0}")]
    Malformed(String),
}
