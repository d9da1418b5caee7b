//! Single-writer access to the transport
//!
//! Every frame goes through [`Link`]. The lock is held for the write and the
//! pacing wait after it, so frames never interleave on the line and two
//! consecutive frames are always at least one pacing interval apart.

use std::time::Duration;

use ccnet_core::Session;
use ccnet_transport::{Result, Transport};
use tokio::sync::Mutex;
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;
use tracing::trace;

/// Owner of an open transport, shared by command callers and the poll loop
pub(crate) struct Link {
    transport: Mutex<Box<dyn Transport>>,
    session: Session,
    pacing: Duration,
    port_name: String,
}

impl Link {
    /// Wrap a connected transport; frames written through it are counted on `session`
    pub(crate) fn new(transport: Box<dyn Transport>, session: Session, pacing: Duration) -> Self {
        let port_name = transport.port_name();

        Self {
            transport: Mutex::new(transport),
            session,
            pacing,
            port_name,
        }
    }

    /// Name of the underlying port, captured when the link was created
    pub(crate) fn port_name(&self) -> &str {
        &self.port_name
    }

    /// Write one frame, then wait out the pacing interval
    ///
    /// The wait runs whether or not the write succeeded.
    pub(crate) async fn transmit(&self, frame: &[u8]) -> Result<()> {
        let mut transport = self.transport.lock().await;
        self.write_paced(&mut **transport, frame).await
    }

    /// Like [`Link::transmit`], but gives up without writing if `cancel` fired
    /// while waiting for the line
    ///
    /// Returns `Ok(false)` when nothing was written.
    pub(crate) async fn transmit_unless_cancelled(
        &self,
        frame: &[u8],
        cancel: &CancellationToken,
    ) -> Result<bool> {
        let mut transport = self.transport.lock().await;

        if cancel.is_cancelled() {
            return Ok(false);
        }

        self.write_paced(&mut **transport, frame).await?;
        Ok(true)
    }

    /// Disconnect the transport if it is still connected
    pub(crate) async fn release(&self) -> Result<()> {
        let mut transport = self.transport.lock().await;

        if transport.is_connected() {
            transport.disconnect().await?;
        }

        Ok(())
    }

    async fn write_paced(&self, transport: &mut dyn Transport, frame: &[u8]) -> Result<()> {
        let result = transport.send(frame).await;

        if result.is_ok() {
            self.session.record_frame();
        }
        trace!(port = %self.port_name, len = frame.len(), ok = result.is_ok(), "Frame written");

        sleep(self.pacing).await;
        result
    }
}
