//! In-process transport
//!
//! Stands in for a serial line: records everything written and lets the
//! caller play the device side by injecting received bytes. Clones share the
//! same channel, so a test can keep one handle and give another to a device.

use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use parking_lot::{Mutex, RwLock};
use tracing::trace;

use crate::{error::*, ReceiveHandler, Transport};

/// In-memory transport
///
/// # Examples
///
/// ```
/// use ccnet_transport::{MemoryTransport, Transport};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> ccnet_transport::Result<()> {
/// let wire = MemoryTransport::new();
/// let mut transport = wire.clone();
///
/// transport.connect().await?;
/// transport.send(&[0x02, 0x03, 0x06, 0x33, 0xDA, 0x81]).await?;
///
/// assert_eq!(wire.writes().len(), 1);
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Default)]
pub struct MemoryTransport {
    inner: Arc<MemoryInner>,
}

#[derive(Default)]
struct MemoryInner {
    connected: AtomicBool,
    fail_connect: AtomicBool,
    fail_writes: AtomicBool,

    /// One entry per successful `send`
    writes: Mutex<Vec<Bytes>>,

    /// Byte stream as it would appear on the line
    wire: Mutex<Vec<u8>>,

    handler: RwLock<Option<ReceiveHandler>>,
}

impl MemoryTransport {
    /// Create a disconnected transport
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a transport that is already connected
    pub fn connected() -> Self {
        let transport = Self::new();
        transport.inner.connected.store(true, Ordering::Release);
        transport
    }

    /// Make subsequent `connect` calls fail
    pub fn fail_connect(&self, fail: bool) {
        self.inner.fail_connect.store(fail, Ordering::Release);
    }

    /// Make subsequent `send` calls fail
    pub fn fail_writes(&self, fail: bool) {
        self.inner.fail_writes.store(fail, Ordering::Release);
    }

    /// Payloads of all successful `send` calls, oldest first
    pub fn writes(&self) -> Vec<Bytes> {
        self.inner.writes.lock().clone()
    }

    /// Every byte written so far, in line order
    pub fn wire(&self) -> Vec<u8> {
        self.inner.wire.lock().clone()
    }

    /// Forget recorded writes
    pub fn clear(&self) {
        self.inner.writes.lock().clear();
        self.inner.wire.lock().clear();
    }

    /// Deliver bytes as if the device had sent them
    ///
    /// Returns `false` when no handler is registered.
    pub fn inject(&self, data: impl Into<Bytes>) -> bool {
        let handler = self.inner.handler.read().clone();

        match handler {
            Some(handler) => {
                handler(data.into());
                true
            }
            None => false,
        }
    }
}

#[async_trait]
impl Transport for MemoryTransport {
    async fn connect(&mut self) -> Result<()> {
        if self.inner.fail_connect.load(Ordering::Acquire) {
            return Err(Error::Io(io::Error::new(
                io::ErrorKind::NotFound,
                "memory transport refused to connect",
            )));
        }

        if self.inner.connected.swap(true, Ordering::AcqRel) {
            return Err(Error::AlreadyConnected);
        }

        Ok(())
    }

    async fn disconnect(&mut self) -> Result<()> {
        self.inner.connected.store(false, Ordering::Release);
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.inner.connected.load(Ordering::Acquire)
    }

    async fn send(&mut self, data: &[u8]) -> Result<()> {
        if !self.is_connected() {
            return Err(Error::NotConnected);
        }

        if self.inner.fail_writes.load(Ordering::Acquire) {
            return Err(Error::Io(io::Error::new(
                io::ErrorKind::BrokenPipe,
                "memory transport write failed",
            )));
        }

        trace!("Sending {} bytes to memory: {}", data.len(), hex::encode(data));

        // Byte at a time with a yield in between, like a slow UART, so
        // unsynchronized writers would show up as interleaved bytes
        for &byte in data {
            self.inner.wire.lock().push(byte);
            tokio::task::yield_now().await;
        }

        self.inner.writes.lock().push(Bytes::copy_from_slice(data));
        Ok(())
    }

    fn on_bytes_received(&mut self, handler: ReceiveHandler) {
        *self.inner.handler.write() = Some(handler);
    }

    fn port_name(&self) -> String {
        "memory".to_string()
    }
}
