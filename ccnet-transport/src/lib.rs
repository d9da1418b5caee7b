//! Transport layer for the CCNET protocol
//!
//! Provides the byte channel a device session writes frames to and receives
//! raw replies from.

pub mod error;
pub mod memory;
pub mod serial;

pub use error::{Error, Result};
pub use memory::MemoryTransport;
pub use serial::{available_ports, SerialTransport};

use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;

/// Callback invoked with every chunk of bytes the transport receives
///
/// Chunk boundaries are whatever the underlying channel delivers; they carry
/// no framing meaning.
pub type ReceiveHandler = Arc<dyn Fn(Bytes) + Send + Sync>;

/// Transport trait for different communication methods
#[async_trait]
pub trait Transport: Send + Sync {
    /// Open the channel
    async fn connect(&mut self) -> Result<()>;
    
    /// Close the channel
    async fn disconnect(&mut self) -> Result<()>;
    
    /// Check if connected
    fn is_connected(&self) -> bool;
    
    /// Write exactly `data`, or fail
    async fn send(&mut self, data: &[u8]) -> Result<()>;
    
    /// Register the receive callback, replacing any previous one
    fn on_bytes_received(&mut self, handler: ReceiveHandler);
    
    /// Human-readable channel name for logs
    fn port_name(&self) -> String;
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for Box<T> {
    async fn connect(&mut self) -> Result<()> {
        (**self).connect().await
    }

    async fn disconnect(&mut self) -> Result<()> {
        (**self).disconnect().await
    }

    fn is_connected(&self) -> bool {
        (**self).is_connected()
    }

    async fn send(&mut self, data: &[u8]) -> Result<()> {
        (**self).send(data).await
    }

    fn on_bytes_received(&mut self, handler: ReceiveHandler) {
        (**self).on_bytes_received(handler)
    }

    fn port_name(&self) -> String {
        (**self).port_name()
    }
}
