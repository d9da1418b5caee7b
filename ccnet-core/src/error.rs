//! Error types for ccnet-core



/// Result type alias for ccnet operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core protocol errors
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Frame would not fit the single-byte length field
    #[error("Frame too large: payload of {size} bytes (max: {max} bytes)")]
    FrameTooLarge {
        size: usize,
        max: usize,
    },

    /// Unknown command code
    #[error("Unknown command code: 0x{0:02X}")]
    UnknownCommand(u8),

    /// Session is already open
    #[error("Session already open - close it first")]
    AlreadyOpen,

    /// Session is closed
    #[error("Session not open - open the device first")]
    NotOpen,

    /// Poll loop is already running
    #[error("Session is already polling")]
    AlreadyPolling,
}

impl Error {
    /// Check if error comes from calling an operation in the wrong lifecycle state
    pub fn is_state_error(&self) -> bool {
        matches!(
            self,
            Self::AlreadyOpen
                | Self::NotOpen
                | Self::AlreadyPolling
        )
    }
}
