//! Protocol constants

use std::time::Duration;

/// Synchronization byte opening every frame
pub const SYNC: u8 = 0x02;

/// Peripheral address of a bill validator on the CCNET bus
pub const BILL_VALIDATOR_ADDRESS: u8 = 0x03;

/// CRC-16 polynomial (CCITT, reversed form)
pub const CRC_POLYNOMIAL: u16 = 0x8408;

/// Settle time the device needs after every command (milliseconds)
pub const PACING_INTERVAL_MS: u64 = 350;

/// Settle time the device needs after every command
pub const PACING_INTERVAL: Duration = Duration::from_millis(PACING_INTERVAL_MS);

/// Frame byte offsets
pub mod offsets {
    pub const SYNC: usize = 0;
    pub const ADDRESS: usize = 1;
    pub const LENGTH: usize = 2;
    pub const COMMAND: usize = 3;
    pub const PAYLOAD: usize = 4;
}
