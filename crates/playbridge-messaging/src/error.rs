use thiserror::Error;

/// A malformed, truncated or unsendable frame.
#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("input closed inside the length prefix ({received} of 4 bytes)")]
    TruncatedPrefix { received: usize },

    #[error("frame declared {expected} bytes but input closed after {received}")]
    TruncatedPayload { expected: u32, received: usize },

    #[error("frame payload is not valid UTF-8: {0}")]
    InvalidUtf8(#[from] std::string::FromUtf8Error),

    #[error("frame payload is not valid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("outbound frame of {len} bytes exceeds the {max} byte limit")]
    Oversized { len: usize, max: usize },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
