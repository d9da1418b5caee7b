//! Transport errors

use std::io;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Not connected")]
    NotConnected,
    
    #[error("Already connected")]
    AlreadyConnected,
    
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    
    #[error("Serial port error: {0}")]
    Serial(#[from] tokio_serial::Error),
    
    #[error("Invalid configuration: {0}")]
    Config(#[from] ccnet_types::Error),
}
