//! CCNET frame structure and encoding

use bytes::{BufMut, Bytes, BytesMut};
use std::fmt;

use crate::{
    checksum,
    command::Command,
    constants::{BILL_VALIDATOR_ADDRESS, SYNC},
    error::{Error, Result},
    FRAME_OVERHEAD, MAX_FRAME_SIZE,
};

/// CCNET command frame
///
/// # Frame Structure
///
/// ```text
/// ┌──────┬─────────┬────────┬─────────┬─────────────┬─────────┬──────────┐
/// │ SYNC │ ADDRESS │ LENGTH │ COMMAND │   Payload   │ CRC low │ CRC high │
/// │ 0x02 │  0x03   │ 1 byte │ 1 byte  │   N bytes   │ 1 byte  │  1 byte  │
/// └──────┴─────────┴────────┴─────────┴─────────────┴─────────┴──────────┘
/// ```
///
/// `LENGTH` counts the whole frame, CRC included. The CRC covers every byte
/// before the trailer.
///
/// # Examples
///
/// ```
/// use ccnet_core::{Command, Frame};
///
/// let frame = Frame::new(Command::Reset);
/// let encoded = frame.encode();
/// assert_eq!(&encoded[..], &[0x02, 0x03, 0x06, 0x30, 0x41, 0xB3]);
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct Frame {
    /// Command code
    pub command: Command,

    /// Command-specific data
    payload: Bytes,
}

impl Frame {
    /// Maximum payload size
    pub const MAX_PAYLOAD_SIZE: usize = MAX_FRAME_SIZE - FRAME_OVERHEAD;

    /// Create a frame with empty payload
    pub fn new(command: Command) -> Self {
        Self {
            command,
            payload: Bytes::new(),
        }
    }

    /// Create a frame with payload
    ///
    /// # Errors
    ///
    /// Returns [`Error::FrameTooLarge`] when the payload would push the frame
    /// past 255 bytes.
    ///
    /// # Examples
    ///
    /// ```
    /// use ccnet_core::{Command, Frame};
    ///
    /// let frame = Frame::with_payload(Command::SetSecurity, vec![0u8, 0, 0x7C]).unwrap();
    /// assert_eq!(frame.len(), 9);
    ///
    /// assert!(Frame::with_payload(Command::Poll, vec![0u8; 250]).is_err());
    /// ```
    pub fn with_payload(command: Command, payload: impl Into<Bytes>) -> Result<Self> {
        let payload = payload.into();

        if payload.len() > Self::MAX_PAYLOAD_SIZE {
            return Err(Error::FrameTooLarge {
                size: payload.len(),
                max: Self::MAX_PAYLOAD_SIZE,
            });
        }

        Ok(Self { command, payload })
    }

    /// Command-specific data
    pub fn payload(&self) -> &Bytes {
        &self.payload
    }

    /// Total encoded size, which is also the value of the length byte
    pub fn len(&self) -> usize {
        self.payload.len() + FRAME_OVERHEAD
    }

    /// Frames always carry at least header and trailer
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Encode frame to bytes
    ///
    /// Deterministic: the same command and payload always give the same bytes.
    pub fn encode(&self) -> BytesMut {
        let total_size = self.len();
        let mut buf = BytesMut::with_capacity(total_size);

        buf.put_u8(SYNC);
        buf.put_u8(BILL_VALIDATOR_ADDRESS);
        // Bounded by MAX_PAYLOAD_SIZE at construction
        buf.put_u8(total_size as u8);
        buf.put_u8(self.command.into());
        buf.put_slice(&self.payload);

        let crc = checksum::crc16(&buf);
        buf.put_u16_le(crc);

        buf
    }
}

/// Build the wire bytes for `command` carrying `payload`
///
/// Validates the payload size before anything is allocated.
///
/// # Examples
///
/// ```
/// use ccnet_core::{build_frame, Command};
///
/// let frame = build_frame(Command::EnableBillTypes, &[0, 0, 0x7C, 0, 0, 0]).unwrap();
/// assert_eq!(frame.len(), 12);
/// assert_eq!(frame[3], 0x34);
/// ```
pub fn build_frame(command: Command, payload: &[u8]) -> Result<BytesMut> {
    let frame = Frame::with_payload(command, Bytes::copy_from_slice(payload))?;
    Ok(frame.encode())
}

impl fmt::Debug for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Frame")
            .field("command", &self.command)
            .field("length", &self.len())
            .field("payload", &hex::encode(&self.payload))
            .field("wire", &hex::encode(self.encode()))
            .finish()
    }
}

impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Frame[{}](len={})", self.command, self.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::offsets;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    fn any_command() -> impl Strategy<Value = Command> {
        prop_oneof![
            Just(Command::Ack),
            Just(Command::Nack),
            Just(Command::Reset),
            Just(Command::Status),
            Just(Command::SetSecurity),
            Just(Command::Poll),
            Just(Command::EnableBillTypes),
            Just(Command::Stack),
            Just(Command::ReturnBill),
            Just(Command::Identification),
        ]
    }

    #[test]
    fn test_reset_frame() {
        let encoded = build_frame(Command::Reset, &[]).unwrap();
        assert_eq!(&encoded[..], &[0x02, 0x03, 0x06, 0x30, 0x41, 0xB3]);
    }

    #[test]
    fn test_poll_frame() {
        let encoded = Frame::new(Command::Poll).encode();
        assert_eq!(&encoded[..], &[0x02, 0x03, 0x06, 0x33, 0xDA, 0x81]);
    }

    #[test]
    fn test_enable_bill_types_frame() {
        let encoded = build_frame(Command::EnableBillTypes, &[0, 0, 0x7C, 0, 0, 0]).unwrap();

        assert_eq!(encoded.len(), 12);
        assert_eq!(encoded[offsets::LENGTH], 12);
        assert_eq!(encoded[offsets::COMMAND], 0x34);
        assert_eq!(&encoded[4..10], &[0, 0, 0x7C, 0, 0, 0]);
        assert_eq!(&encoded[10..], &[0x66, 0xC1]);
    }

    #[test]
    fn test_largest_payload() {
        let payload = vec![0xAB; Frame::MAX_PAYLOAD_SIZE];
        let encoded = build_frame(Command::Status, &payload).unwrap();

        assert_eq!(encoded.len(), MAX_FRAME_SIZE);
        assert_eq!(encoded[offsets::LENGTH], 0xFF);
        assert!(checksum::verify(&encoded));
    }

    #[test]
    fn test_payload_too_large() {
        let payload = vec![0; Frame::MAX_PAYLOAD_SIZE + 1];
        let result = build_frame(Command::Status, &payload);

        assert!(matches!(
            result,
            Err(Error::FrameTooLarge { size: 250, max: 249 })
        ));
    }

    #[test]
    fn test_frame_display() {
        let frame = Frame::new(Command::Stack);
        assert_eq!(frame.to_string(), "Frame[STACK(0x35)](len=6)");
    }

    proptest! {
        #[test]
        fn prop_frame_layout(
            command in any_command(),
            payload in proptest::collection::vec(any::<u8>(), 0..=Frame::MAX_PAYLOAD_SIZE),
        ) {
            let encoded = build_frame(command, &payload).unwrap();
            let len = payload.len() + FRAME_OVERHEAD;

            prop_assert_eq!(encoded.len(), len);
            prop_assert_eq!(encoded[offsets::SYNC], 0x02);
            prop_assert_eq!(encoded[offsets::ADDRESS], 0x03);
            prop_assert_eq!(encoded[offsets::LENGTH] as usize, len);
            prop_assert_eq!(encoded[offsets::COMMAND], u8::from(command));
            prop_assert_eq!(&encoded[offsets::PAYLOAD..offsets::PAYLOAD + payload.len()], &payload[..]);
        }

        #[test]
        fn prop_trailer_is_crc_of_body(
            command in any_command(),
            payload in proptest::collection::vec(any::<u8>(), 0..=Frame::MAX_PAYLOAD_SIZE),
        ) {
            let encoded = build_frame(command, &payload).unwrap();
            let (body, trailer) = encoded.split_at(encoded.len() - 2);

            prop_assert_eq!(u16::from_le_bytes([trailer[0], trailer[1]]), checksum::crc16(body));
        }

        #[test]
        fn prop_encoding_is_deterministic(
            command in any_command(),
            payload in proptest::collection::vec(any::<u8>(), 0..64),
        ) {
            prop_assert_eq!(build_frame(command, &payload).unwrap(), build_frame(command, &payload).unwrap());
        }

        #[test]
        fn prop_oversized_payload_rejected(extra in 1usize..64) {
            let payload = vec![0u8; Frame::MAX_PAYLOAD_SIZE + extra];
            let is_too_large = matches!(
                build_frame(Command::Status, &payload),
                Err(Error::FrameTooLarge { .. })
            );
            prop_assert!(is_too_large);
        }
    }
}
