//! CCNET command definitions

use std::fmt;

use crate::error::{Error, Result};

/// Protocol command codes
///
/// The subset of CCNET controller commands this driver issues.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Command {
    // Handshake
    Ack = 0x00,
    Nack = 0xFF,

    // Device control
    Reset = 0x30,
    Status = 0x31,
    SetSecurity = 0x32,
    Poll = 0x33,
    EnableBillTypes = 0x34,

    // Escrow handling
    Stack = 0x35,
    ReturnBill = 0x36,

    // Device information
    Identification = 0x37,
}

impl Command {
    /// Check if this is a handshake reply (ACK/NSC) rather than a request
    pub fn is_handshake(self) -> bool {
        matches!(self, Self::Ack | Self::Nack)
    }

    /// Get command name
    pub fn name(self) -> &'static str {
        match self {
            Self::Ack => "ACK",
            Self::Nack => "NSC",
            Self::Reset => "RESET",
            Self::Status => "GET_STATUS",
            Self::SetSecurity => "SET_SECURITY",
            Self::Poll => "POLL",
            Self::EnableBillTypes => "ENABLE_BILL_TYPES",
            Self::Stack => "STACK",
            Self::ReturnBill => "RETURN",
            Self::Identification => "IDENTIFICATION",
        }
    }
}

impl From<Command> for u8 {
    fn from(cmd: Command) -> u8 {
        cmd as u8
    }
}

impl TryFrom<u8> for Command {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self> {
        match value {
            0x00 => Ok(Self::Ack),
            0xFF => Ok(Self::Nack),
            0x30 => Ok(Self::Reset),
            0x31 => Ok(Self::Status),
            0x32 => Ok(Self::SetSecurity),
            0x33 => Ok(Self::Poll),
            0x34 => Ok(Self::EnableBillTypes),
            0x35 => Ok(Self::Stack),
            0x36 => Ok(Self::ReturnBill),
            0x37 => Ok(Self::Identification),
            _ => Err(Error::UnknownCommand(value)),
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(0x{:02X})", self.name(), *self as u8)
    }
}
