//! CCNET checksum algorithm
//!
//! CRC-16 with the reversed CCITT polynomial `0x8408`, initial value 0, no
//! final XOR. The device silently drops any frame whose trailer does not
//! match, so this has to be reproduced bit for bit.

use byteorder::{ByteOrder, LittleEndian};
use tracing::trace;

use crate::constants::CRC_POLYNOMIAL;

/// Calculate the CCNET CRC-16 of `data`
///
/// # Algorithm
///
/// ```text
/// crc = 0
/// for each byte b:
///     crc ^= b
///     repeat 8 times:
///         if crc & 1: crc = (crc >> 1) ^ 0x8408
///         else:       crc = crc >> 1
/// ```
///
/// # Examples
///
/// ```
/// use ccnet_core::checksum;
///
/// // RESET frame header
/// let crc = checksum::crc16(&[0x02, 0x03, 0x06, 0x30]);
/// assert_eq!(crc, 0xB341);
/// ```
pub fn crc16(data: &[u8]) -> u16 {
    let mut crc: u16 = 0;

    for &byte in data {
        crc ^= u16::from(byte);

        for _ in 0..8 {
            if crc & 0x0001 != 0 {
                crc = (crc >> 1) ^ CRC_POLYNOMIAL;
            } else {
                crc >>= 1;
            }
        }
    }

    trace!(
        len = data.len(),
        crc = format!("0x{:04X}", crc),
        "Calculated CRC"
    );

    crc
}

/// Verify the little-endian CRC trailer of a complete frame
///
/// Returns `false` for buffers too short to hold a trailer.
pub fn verify(frame: &[u8]) -> bool {
    if frame.len() < 2 {
        return false;
    }

    let (body, trailer) = frame.split_at(frame.len() - 2);
    crc16(body) == LittleEndian::read_u16(trailer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_crc_empty() {
        assert_eq!(crc16(&[]), 0);
    }

    #[test]
    fn test_crc_known_frames() {
        // Captured from a working CCNET host
        assert_eq!(crc16(&[0x02, 0x03, 0x06, 0x30]), 0xB341);
        assert_eq!(crc16(&[0x02, 0x03, 0x06, 0x33]), 0x81DA);
        assert_eq!(crc16(&[0x02, 0x03, 0x06, 0x00]), 0x82C2);
        assert_eq!(crc16(&[0x02, 0x03, 0x06, 0xFF]), 0x8DBA);
        assert_eq!(
            crc16(&[0x02, 0x03, 0x0C, 0x34, 0x00, 0x00, 0x7C, 0x00, 0x00, 0x00]),
            0xC166
        );
    }

    #[test]
    fn test_crc_different_commands() {
        let cs1 = crc16(&[0x02, 0x03, 0x06, 0x30]);
        let cs2 = crc16(&[0x02, 0x03, 0x06, 0x31]);

        assert_ne!(cs1, cs2);
    }

    #[test]
    fn test_verify() {
        let frame = [0x02, 0x03, 0x06, 0x30, 0x41, 0xB3];
        assert!(verify(&frame));

        let mut corrupted = frame;
        corrupted[3] = 0x31;
        assert!(!verify(&corrupted));
    }

    #[test]
    fn test_verify_short_buffer() {
        assert!(!verify(&[]));
        assert!(!verify(&[0x00]));
        // Empty body has CRC 0
        assert!(verify(&[0x00, 0x00]));
    }

    proptest! {
        #[test]
        fn prop_crc_deterministic(data in proptest::collection::vec(any::<u8>(), 0..512)) {
            prop_assert_eq!(crc16(&data), crc16(&data));
        }

        #[test]
        fn prop_appended_trailer_verifies(data in proptest::collection::vec(any::<u8>(), 0..256)) {
            let mut frame = data.clone();
            frame.extend_from_slice(&crc16(&data).to_le_bytes());
            prop_assert!(verify(&frame));
        }
    }
}
