//! # ccnet
//!
//! Rust driver for bill acceptors speaking the CCNET (Cashcode Network)
//! serial protocol.
//!
//! ## Features
//!
//! - Bit-exact frame encoding and CRC-16
//! - Async/await API using Tokio
//! - Background poll loop with per-device cancellation
//! - Raw pass-through of everything the device sends back
//!
//! ## Quick Start
//!
//! ```no_run
//! use ccnet::{Device, SerialTransport};
//!
//! #[tokio::main]
//! async fn main() -> ccnet::Result<()> {
//!     let device = Device::new();
//!     device.on_receive(|bytes| println!("{:02X?}", &bytes[..]));
//!
//!     // Reset, enable slots 2-6, then keep polling
//!     device.start_accepting(SerialTransport::new("/dev/ttyUSB0"), 0x7Cu8).await?;
//!
//!     tokio::signal::ctrl_c().await.ok();
//!
//!     device.close().await?;
//!     Ok(())
//! }
//! ```

pub mod device;
pub mod error;

mod link;

// Re-exports
pub use device::{Device, ErrorHandler};
pub use error::{Error, Result};

pub use ccnet_core::{build_frame, crc16, Command, Frame, Session, SessionState};
pub use ccnet_transport::{
    available_ports, MemoryTransport, ReceiveHandler, SerialTransport, Transport,
};
pub use ccnet_types::{BillTypes, SerialConfig};
