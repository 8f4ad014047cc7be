//! Error types for linkscope

use thiserror::Error;

/// Result type alias for linkscope operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for linkscope
#[derive(Error, Debug)]
pub enum Error {
    /// Network I/O error
    #[error("Network I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Frame could not be decoded (truncated, oversized or inconsistent)
    #[error("Malformed frame: {0}")]
    Malformed(String),

    /// Frame is not a discovery PDU even though it reached a discovery address
    #[error("Not a discovery frame: {0}")]
    NotDiscovery(String),

    /// Packet construction error
    #[error("Packet construction error: {0}")]
    PacketConstruction(String),

    /// Invalid parameter error
    #[error("Invalid parameter '{name}': {reason}")]
    InvalidParameter { name: String, reason: String },

    /// Interface not found
    #[error("Interface '{0}' not found")]
    InterfaceNotFound(String),

    /// Interface error
    #[error("Interface error: {0}")]
    Interface(String),

    /// Capture error
    #[error("Packet capture error: {0}")]
    Capture(String),

    /// Frame transmission rejected by the transport
    #[error("Transmit error: {0}")]
    Transmit(String),
}

impl Error {
    /// Create a malformed-frame error with a custom message
    pub fn malformed<S: Into<String>>(msg: S) -> Self {
        Error::Malformed(msg.into())
    }

    /// Create a not-a-discovery-frame error with a custom message
    pub fn not_discovery<S: Into<String>>(msg: S) -> Self {
        Error::NotDiscovery(msg.into())
    }

    /// Create a transmit error with a custom message
    pub fn transmit<S: Into<String>>(msg: S) -> Self {
        Error::Transmit(msg.into())
    }

    /// Create an invalid parameter error
    pub fn invalid_parameter<S: Into<String>>(name: S, reason: S) -> Self {
        Error::InvalidParameter {
            name: name.into(),
            reason: reason.into(),
        }
    }

    /// True for decode failures caused by the frame contents
    pub fn is_malformed(&self) -> bool {
        matches!(self, Error::Malformed(_))
    }
}
