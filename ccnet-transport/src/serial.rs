//! Serial transport for CCNET devices
//!
//! Bill acceptors hang off an RS-232 line (or a USB adapter) at 9600-8-N-1.
//! Received bytes are pushed to the registered handler from a reader task.

use std::sync::Arc;

use async_trait::async_trait;
use bytes::BytesMut;
use ccnet_types::{DataBits, Parity, SerialConfig, StopBits};
use parking_lot::RwLock;
use tokio::io::{AsyncReadExt, AsyncWriteExt, ReadHalf, WriteHalf};
use tokio::task::JoinHandle;
use tokio_serial::{ClearBuffer, SerialPort, SerialPortBuilderExt, SerialStream};
use tracing::{debug, trace, warn};

use crate::{error::*, ReceiveHandler, Transport};

/// Read buffer reserved per chunk
const READ_CHUNK: usize = 256;

/// Serial transport for CCNET devices
pub struct SerialTransport {
    path: String,
    config: SerialConfig,
    writer: Option<WriteHalf<SerialStream>>,
    reader: Option<JoinHandle<()>>,
    handler: Arc<RwLock<Option<ReceiveHandler>>>,
}

impl SerialTransport {
    /// Create new serial transport with the CCNET default line settings
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            config: SerialConfig::default(),
            writer: None,
            reader: None,
            handler: Arc::new(RwLock::new(None)),
        }
    }

    /// Set line settings
    pub fn with_config(mut self, config: SerialConfig) -> Self {
        self.config = config;
        self
    }

    /// Current line settings
    pub fn config(&self) -> SerialConfig {
        self.config
    }

    /// Change line settings
    ///
    /// Settings are applied when the port is opened, so this fails with
    /// [`Error::AlreadyConnected`] on an open port.
    pub fn set_config(&mut self, config: SerialConfig) -> Result<()> {
        if self.is_connected() {
            return Err(Error::AlreadyConnected);
        }

        config.validate()?;
        self.config = config;
        Ok(())
    }

    fn open_stream(&self) -> Result<SerialStream> {
        self.config.validate()?;

        let stream = tokio_serial::new(&self.path, self.config.baud_rate)
            .data_bits(data_bits(self.config.data_bits))
            .stop_bits(stop_bits(self.config.stop_bits))
            .parity(parity(self.config.parity))
            .flow_control(tokio_serial::FlowControl::None)
            .open_native_async()?;

        // Stale bytes from before we opened would look like a reply
        if let Err(e) = stream.clear(ClearBuffer::All) {
            warn!("Failed to clear {} buffers: {}", self.path, e);
        }

        Ok(stream)
    }

    fn spawn_reader(&self, mut reader: ReadHalf<SerialStream>) -> JoinHandle<()> {
        let handler = Arc::clone(&self.handler);
        let path = self.path.clone();

        tokio::spawn(async move {
            let mut buf = BytesMut::with_capacity(READ_CHUNK);

            loop {
                buf.reserve(READ_CHUNK);

                match reader.read_buf(&mut buf).await {
                    Ok(0) => {
                        debug!("{} reached end of stream", path);
                        break;
                    }
                    Ok(n) => {
                        trace!("Received {} bytes from {}: {}", n, path, hex::encode(&buf[..n]));

                        let chunk = buf.split().freeze();
                        let handler = handler.read().clone();
                        if let Some(handler) = handler {
                            handler(chunk);
                        }
                    }
                    Err(e) => {
                        warn!("Read error on {}: {}", path, e);
                        break;
                    }
                }
            }
        })
    }
}

#[async_trait]
impl Transport for SerialTransport {
    async fn connect(&mut self) -> Result<()> {
        if self.is_connected() {
            return Err(Error::AlreadyConnected);
        }

        debug!("Opening {} ({})...", self.path, self.config);

        let stream = self.open_stream()?;
        let (reader, writer) = tokio::io::split(stream);

        self.reader = Some(self.spawn_reader(reader));
        self.writer = Some(writer);

        debug!("Opened {}", self.path);
        Ok(())
    }

    async fn disconnect(&mut self) -> Result<()> {
        if let Some(reader) = self.reader.take() {
            stop_reader(reader).await;
        }

        if let Some(mut writer) = self.writer.take() {
            debug!("Closing {}...", self.path);

            writer.flush().await?;
        }

        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.writer.is_some()
    }

    async fn send(&mut self, data: &[u8]) -> Result<()> {
        let writer = self.writer.as_mut().ok_or(Error::NotConnected)?;

        trace!("Sending {} bytes to {}: {}", data.len(), self.path, hex::encode(data));

        writer.write_all(data).await?;
        writer.flush().await?;

        Ok(())
    }

    fn on_bytes_received(&mut self, handler: ReceiveHandler) {
        *self.handler.write() = Some(handler);
    }

    fn port_name(&self) -> String {
        self.path.clone()
    }
}

impl Drop for SerialTransport {
    fn drop(&mut self) {
        if let Some(reader) = self.reader.take() {
            reader.abort();
        }
        if self.writer.is_some() {
            warn!("Serial transport dropped while still connected");
        }
    }
}

/// Abort the reader task and wait until it is gone
///
/// The task owns the read half, so the port stays open until it is dropped.
async fn stop_reader(reader: JoinHandle<()>) {
    reader.abort();

    if let Err(e) = reader.await {
        if !e.is_cancelled() {
            warn!("Reader task failed: {}", e);
        }
    }
}

/// Names of the serial ports present on this machine
pub fn available_ports() -> Result<Vec<String>> {
    let mut names: Vec<String> = tokio_serial::available_ports()?
        .into_iter()
        .map(|info| info.port_name)
        .collect();

    names.sort();
    Ok(names)
}

fn data_bits(bits: DataBits) -> tokio_serial::DataBits {
    match bits {
        DataBits::Five => tokio_serial::DataBits::Five,
        DataBits::Six => tokio_serial::DataBits::Six,
        DataBits::Seven => tokio_serial::DataBits::Seven,
        DataBits::Eight => tokio_serial::DataBits::Eight,
    }
}

fn stop_bits(bits: StopBits) -> tokio_serial::StopBits {
    match bits {
        StopBits::One => tokio_serial::StopBits::One,
        StopBits::Two => tokio_serial::StopBits::Two,
    }
}

fn parity(parity: Parity) -> tokio_serial::Parity {
    match parity {
        Parity::None => tokio_serial::Parity::None,
        Parity::Odd => tokio_serial::Parity::Odd,
        Parity::Even => tokio_serial::Parity::Even,
    }
}
