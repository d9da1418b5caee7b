//! High-level device interface

use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use parking_lot::{Mutex, RwLock};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace, warn};

use ccnet_core::constants::PACING_INTERVAL;
use ccnet_core::{Command, Frame, Session, SessionState};
use ccnet_transport::{ReceiveHandler, Transport};
use ccnet_types::BillTypes;

use crate::error::{Error, Result};
use crate::link::Link;

/// Callback receiving the error that terminated the poll loop
pub type ErrorHandler = Arc<dyn Fn(Error) + Send + Sync>;

/// CCNET bill acceptor
///
/// High-level interface for driving one bill acceptor. Every method takes
/// `&self`, so a device can be shared behind an [`Arc`] between the task
/// that polls it and the tasks that react to what it reports.
///
/// # Examples
///
/// ```no_run
/// use ccnet::{BillTypes, Device, SerialTransport};
///
/// #[tokio::main]
/// async fn main() -> ccnet::Result<()> {
///     let device = Device::new();
///     device.on_receive(|bytes| println!("<- {:02X?}", &bytes[..]));
///
///     device.open(SerialTransport::new("/dev/ttyUSB0")).await?;
///     device.send_enable_bill_types(BillTypes::from(0x7Cu8)).await?;
///     device.start_polling().await?;
///
///     tokio::time::sleep(std::time::Duration::from_secs(30)).await;
///
///     device.close().await?;
///     Ok(())
/// }
/// ```
pub struct Device {
    session: Session,
    pacing: Duration,
    link: RwLock<Option<Arc<Link>>>,
    poller: Mutex<Option<Poller>>,
    /// Serializes open/close/start/stop
    lifecycle: tokio::sync::Mutex<()>,
    observer: Arc<RwLock<Option<ReceiveHandler>>>,
    error_sink: Arc<RwLock<Option<ErrorHandler>>>,
}

struct Poller {
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

impl Poller {
    async fn stop(self) {
        self.cancel.cancel();

        if let Err(e) = self.handle.await {
            warn!("Poll task ended abnormally: {}", e);
        }
    }
}

impl Device {
    /// Create a closed device with the standard 350 ms pacing interval
    pub fn new() -> Self {
        Self {
            session: Session::new(),
            pacing: PACING_INTERVAL,
            link: RwLock::new(None),
            poller: Mutex::new(None),
            lifecycle: tokio::sync::Mutex::new(()),
            observer: Arc::new(RwLock::new(None)),
            error_sink: Arc::new(RwLock::new(None)),
        }
    }

    /// Set the settle time waited after every frame
    pub fn with_pacing(mut self, pacing: Duration) -> Self {
        self.pacing = pacing;
        self
    }

    /// Settle time waited after every frame
    pub fn pacing(&self) -> Duration {
        self.pacing
    }

    /// Register the observer for raw bytes received from the device
    ///
    /// Bytes are forwarded exactly as the transport delivers them: no
    /// framing, no CRC check, no matching against the command that caused
    /// them.
    pub fn on_receive(&self, observer: impl Fn(Bytes) + Send + Sync + 'static) {
        *self.observer.write() = Some(Arc::new(observer));
    }

    /// Register the sink for the error that stops a running poll loop
    pub fn on_poll_error(&self, sink: impl Fn(Error) + Send + Sync + 'static) {
        *self.error_sink.write() = Some(Arc::new(sink));
    }

    /// Get current lifecycle state
    pub fn state(&self) -> SessionState {
        self.session.state()
    }

    /// Check if a transport is held
    pub fn is_open(&self) -> bool {
        self.session.is_open()
    }

    /// Check if the poll loop is running
    pub fn is_polling(&self) -> bool {
        self.session.is_polling()
    }

    /// Frames written since the device was opened
    pub fn frames_sent(&self) -> u64 {
        self.session.frames_sent()
    }

    /// Name of the held transport
    pub fn port_name(&self) -> Option<String> {
        if !self.is_open() {
            return None;
        }
        let link = self.link.read().clone();
        link.map(|link| link.port_name().to_string())
    }

    /// Open the device over `transport`
    ///
    /// Connects the transport unless it is connected already, hooks up the
    /// receive path and resets the device.
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - The device is already open
    /// - The transport fails to connect
    /// - The reset frame cannot be written (the transport is released again)
    pub async fn open<T: Transport + 'static>(&self, transport: T) -> Result<()> {
        let _lifecycle = self.lifecycle.lock().await;

        if self.session.is_open() {
            return Err(ccnet_core::Error::AlreadyOpen.into());
        }

        // Left over from a poll loop that died on a write error
        self.reap_poller().await;

        let mut transport: Box<dyn Transport> = Box::new(transport);

        info!("Opening device on {}...", transport.port_name());

        if !transport.is_connected() {
            transport.connect().await?;
        }

        let observer = Arc::clone(&self.observer);
        transport.on_bytes_received(Arc::new(move |data: Bytes| {
            trace!("Forwarding {} received bytes", data.len());

            let observer = observer.read().clone();
            if let Some(observer) = observer {
                observer(data);
            }
        }));

        if let Err(e) = self.session.open() {
            if let Err(e) = transport.disconnect().await {
                warn!("Failed to release transport: {}", e);
            }
            return Err(e.into());
        }

        let link = Arc::new(Link::new(transport, self.session.clone(), self.pacing));
        *self.link.write() = Some(Arc::clone(&link));

        if let Err(e) = Self::transmit(&link, &Frame::new(Command::Reset)).await {
            warn!("Reset failed on {}, closing: {}", link.port_name(), e);

            self.link.write().take();
            if let Err(e) = self.session.close() {
                warn!("Failed to close session: {}", e);
            }
            if let Err(e) = link.release().await {
                warn!("Failed to release transport: {}", e);
            }

            return Err(e);
        }

        info!("Device open on {}", link.port_name());
        Ok(())
    }

    /// Open the device, enable `bill_types` and start polling
    ///
    /// The usual start-up sequence of an acceptor that should take money
    /// right away.
    pub async fn start_accepting<T: Transport + 'static>(
        &self,
        transport: T,
        bill_types: impl Into<BillTypes>,
    ) -> Result<()> {
        self.open(transport).await?;
        self.send_enable_bill_types(bill_types).await?;
        self.start_polling().await
    }

    /// Close the device
    ///
    /// Stops polling if active and releases the transport.
    ///
    /// # Errors
    ///
    /// Fails with `NotOpen` on a closed device, or with the transport error
    /// if disconnecting fails (the device is closed either way).
    pub async fn close(&self) -> Result<()> {
        let _lifecycle = self.lifecycle.lock().await;

        if !self.session.is_open() {
            return Err(ccnet_core::Error::NotOpen.into());
        }

        self.halt_polling().await;

        let link = self.link.write().take();

        // A poll that failed while stopping has already closed and released
        if !self.session.is_open() {
            info!("Device closed");
            return Ok(());
        }

        self.session.close()?;

        if let Some(link) = link {
            info!("Closing device on {}...", link.port_name());
            link.release().await?;
        }

        info!("Device closed");
        Ok(())
    }

    /// Start sending `Poll` once per pacing interval in a background task
    ///
    /// Returns as soon as the task is spawned. Other commands can be sent
    /// while polling; they take turns with the poll loop on the line.
    ///
    /// # Errors
    ///
    /// Fails with `NotOpen` on a closed device and `AlreadyPolling` when the
    /// loop is already running.
    pub async fn start_polling(&self) -> Result<()> {
        let _lifecycle = self.lifecycle.lock().await;

        let link = self.link()?;
        self.session.start_polling()?;

        let cancel = CancellationToken::new();
        let handle = tokio::spawn(poll_loop(
            link,
            self.session.clone(),
            cancel.clone(),
            Arc::clone(&self.error_sink),
        ));

        *self.poller.lock() = Some(Poller { cancel, handle });

        info!("Polling started");
        Ok(())
    }

    /// Stop the poll loop
    ///
    /// Waits until the loop has exited, at most one pacing interval plus the
    /// write in flight. No poll frame is sent after this returns. Does
    /// nothing when not polling.
    pub async fn stop_polling(&self) {
        let _lifecycle = self.lifecycle.lock().await;
        self.halt_polling().await;
    }

    /// Request device identification (part number, serial number, asset number)
    pub async fn send_identification(&self) -> Result<()> {
        self.send_command(Command::Identification, &[]).await
    }

    /// Reset the device
    pub async fn send_reset(&self) -> Result<()> {
        self.send_command(Command::Reset, &[]).await
    }

    /// Move the bill held in escrow to the cassette
    pub async fn send_stack(&self) -> Result<()> {
        self.send_command(Command::Stack, &[]).await
    }

    /// Negative acknowledge of the last reply (NSC)
    pub async fn send_nsc(&self) -> Result<()> {
        self.send_command(Command::Nack, &[]).await
    }

    /// Acknowledge the last reply (ASC)
    pub async fn send_ack(&self) -> Result<()> {
        self.send_command(Command::Ack, &[]).await
    }

    /// Request the device status
    pub async fn send_status(&self) -> Result<()> {
        self.send_command(Command::Status, &[]).await
    }

    /// Set high-security mode for the given denomination slots
    pub async fn send_security(&self, bill_types: impl Into<BillTypes>) -> Result<()> {
        let mask = bill_types.into().bits();
        self.send_command(Command::SetSecurity, &[0, 0, mask]).await
    }

    /// Enable acceptance of the given denomination slots
    ///
    /// Escrow is left disabled for every slot.
    pub async fn send_enable_bill_types(&self, bill_types: impl Into<BillTypes>) -> Result<()> {
        let mask = bill_types.into().bits();
        self.send_command(Command::EnableBillTypes, &[0, 0, mask, 0, 0, 0]).await
    }

    /// Return the bill held in escrow to the customer
    pub async fn send_return_bill(&self) -> Result<()> {
        self.send_command(Command::ReturnBill, &[]).await
    }

    /// Send a single poll
    pub async fn send_poll(&self) -> Result<()> {
        self.send_command(Command::Poll, &[]).await
    }

    // Helper methods

    fn link(&self) -> Result<Arc<Link>> {
        if !self.session.is_open() {
            return Err(ccnet_core::Error::NotOpen.into());
        }

        let link = self.link.read().clone();
        link.ok_or(Error::Core(ccnet_core::Error::NotOpen))
    }

    async fn send_command(&self, command: Command, payload: &[u8]) -> Result<()> {
        // Encoding errors must surface before any I/O
        let frame = Frame::with_payload(command, Bytes::copy_from_slice(payload))?;
        let link = self.link()?;

        Self::transmit(&link, &frame).await
    }

    async fn transmit(link: &Link, frame: &Frame) -> Result<()> {
        debug!("Sending {} to {}", frame, link.port_name());

        link.transmit(&frame.encode()).await?;
        Ok(())
    }

    async fn halt_polling(&self) {
        self.reap_poller().await;

        if self.session.stop_polling() {
            info!("Polling stopped");
        }
    }

    async fn reap_poller(&self) {
        let poller = self.poller.lock().take();

        if let Some(poller) = poller {
            poller.stop().await;
        }
    }
}

impl Default for Device {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for Device {
    fn drop(&mut self) {
        if let Some(poller) = self.poller.get_mut().take() {
            poller.cancel.cancel();
        }
        if self.session.is_open() {
            warn!("Device dropped while still open");
        }
    }
}

async fn poll_loop(
    link: Arc<Link>,
    session: Session,
    cancel: CancellationToken,
    error_sink: Arc<RwLock<Option<ErrorHandler>>>,
) {
    let frame = Frame::new(Command::Poll).encode();

    debug!("Poll loop running on {}", link.port_name());

    loop {
        match link.transmit_unless_cancelled(&frame, &cancel).await {
            Ok(true) => {}
            Ok(false) => break,
            Err(e) => {
                warn!("Poll failed on {}, closing device: {}", link.port_name(), e);

                if let Err(e) = session.close() {
                    warn!("Failed to close session: {}", e);
                }
                if let Err(e) = link.release().await {
                    warn!("Failed to release transport: {}", e);
                }

                let sink = error_sink.read().clone();
                if let Some(sink) = sink {
                    sink(e.into());
                }
                break;
            }
        }
    }

    debug!("Poll loop on {} finished", link.port_name());
}
