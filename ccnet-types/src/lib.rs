//! Type definitions for ccnet

pub mod bill_types;
pub mod error;
pub mod serial_config;

pub use bill_types::BillTypes;
pub use error::{Error, Result};
pub use serial_config::{DataBits, Parity, SerialConfig, StopBits};
