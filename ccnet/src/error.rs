//! High-level error types

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Core protocol error: {0}")]
    Core(#[from] ccnet_core::Error),
    
    #[error("Transport error: {0}")]
    Transport(#[from] ccnet_transport::Error),
}

impl Error {
    /// Check if the underlying channel failed
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_))
    }
    
    /// Check if the operation was called in the wrong lifecycle state
    pub fn is_state_error(&self) -> bool {
        matches!(self, Self::Core(e) if e.is_state_error())
    }
    
    /// Check if the device has to be opened again before further use
    pub fn requires_reopen(&self) -> bool {
        matches!(
            self,
            Self::Transport(_) | Self::Core(ccnet_core::Error::NotOpen)
        )
    }
}
