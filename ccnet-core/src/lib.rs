//! # ccnet-core
//!
//! Core protocol implementation for CCNET (Cashcode Network) bill acceptors.
//!
//! This crate provides the low-level protocol primitives:
//! - Frame structure and encoding
//! - CRC-16 calculation
//! - Command definitions
//! - Session lifecycle state
//! - Protocol constants

pub mod checksum;
pub mod command;
pub mod constants;
pub mod error;
pub mod frame;
pub mod session;

pub use checksum::crc16;
pub use command::Command;
pub use error::{Error, Result};
pub use frame::{build_frame, Frame};
pub use session::{Session, SessionState};

/// Maximum frame size, bounded by the single-byte length field
pub const MAX_FRAME_SIZE: usize = 255;

/// Bytes a frame carries besides its payload (sync, address, length, command, CRC)
pub const FRAME_OVERHEAD: usize = 6;
