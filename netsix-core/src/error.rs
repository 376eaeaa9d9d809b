//! Error types shared across the netsix stack

use thiserror::Error;

/// Main error type for netsix operations
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error from a link-layer implementation
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A packet or header was shorter than its minimum size
    #[error("Truncated packet: {0}")]
    Truncated(String),

    /// An NDP option had a zero length or ran past the option area
    #[error("Malformed NDP option: {0}")]
    MalformedOption(String),

    /// The link layer rejected an outgoing packet
    #[error("Transmit failed: {0}")]
    Transmit(String),

    /// Network interface error
    #[error("Interface error: {0}")]
    Interface(String),
}

/// Result type alias for netsix operations
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Create a truncated-packet error
    pub fn truncated<S: Into<String>>(msg: S) -> Self {
        Error::Truncated(msg.into())
    }

    /// Create a malformed-option error
    pub fn malformed_option<S: Into<String>>(msg: S) -> Self {
        Error::MalformedOption(msg.into())
    }

    /// Create a transmit error
    pub fn transmit<S: Into<String>>(msg: S) -> Self {
        Error::Transmit(msg.into())
    }

    /// Create an interface error
    pub fn interface<S: Into<String>>(msg: S) -> Self {
        Error::Interface(msg.into())
    }
}
