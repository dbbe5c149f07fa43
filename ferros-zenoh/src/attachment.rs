//! Message attachment encoding.
//!
//! rmw_zenoh attaches 33 bytes of metadata to every sample and service
//! message: a sequence number, the source timestamp, and the sender GID.
//!
//! | Offset | Size | Content                                  |
//! |--------|------|------------------------------------------|
//! | 0      | 8    | sequence number (i64 LE)                 |
//! | 8      | 8    | timestamp, ns since UNIX epoch (i64 LE)  |
//! | 16     | 1    | GID length (always 16)                   |
//! | 17     | 16   | sender GID                               |

use crate::error::{Error, Result};
use ferros_core::message::{GID_SIZE, MessageInfo};
use std::time::{SystemTime, UNIX_EPOCH};

/// Encoded size of an attachment.
pub const ATTACHMENT_SIZE: usize = 33;

/// Sample metadata carried next to the payload.
#[derive(Debug, Clone, Copy)]
pub struct Attachment {
    /// Sender-side sequence number.
    pub sequence_number: i64,
    /// Source timestamp, nanoseconds since the UNIX epoch.
    pub timestamp_ns: i64,
    /// Sender GID.
    pub gid: [u8; GID_SIZE],
}

impl Attachment {
    /// Build an attachment stamped with the current time.
    pub fn now(sequence_number: i64, gid: [u8; GID_SIZE]) -> Self {
        let timestamp_ns = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos() as i64)
            .unwrap_or(0);
        Self {
            sequence_number,
            timestamp_ns,
            gid,
        }
    }

    /// Encode to the 33-byte wire form.
    pub fn encode(&self) -> [u8; ATTACHMENT_SIZE] {
        let mut out = [0u8; ATTACHMENT_SIZE];
        out[0..8].copy_from_slice(&self.sequence_number.to_le_bytes());
        out[8..16].copy_from_slice(&self.timestamp_ns.to_le_bytes());
        out[16] = GID_SIZE as u8;
        out[17..].copy_from_slice(&self.gid);
        out
    }

    /// Decode from wire bytes.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidAttachment`] when the input is shorter than
    /// [`ATTACHMENT_SIZE`] or declares an unexpected GID length.
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < ATTACHMENT_SIZE {
            return Err(Error::InvalidAttachment(format!(
                "expected {ATTACHMENT_SIZE} bytes, got {}",
                bytes.len()
            )));
        }

        let (head, tail) = bytes.split_at(16);
        let sequence_number = i64::from_le_bytes(head[0..8].try_into().unwrap_or_default());
        let timestamp_ns = i64::from_le_bytes(head[8..16].try_into().unwrap_or_default());

        if tail[0] as usize != GID_SIZE {
            return Err(Error::InvalidAttachment(format!(
                "unexpected GID length {}",
                tail[0]
            )));
        }

        let mut gid = [0u8; GID_SIZE];
        gid.copy_from_slice(&tail[1..1 + GID_SIZE]);

        Ok(Self {
            sequence_number,
            timestamp_ns,
            gid,
        })
    }

    /// Best-effort decode: a missing or malformed attachment degrades to
    /// zeroed metadata instead of dropping the sample.
    pub fn decode_or_default(bytes: Option<&[u8]>) -> Self {
        bytes
            .and_then(|b| Self::decode(b).ok())
            .unwrap_or(Self {
                sequence_number: 0,
                timestamp_ns: 0,
                gid: [0; GID_SIZE],
            })
    }
}

impl From<Attachment> for MessageInfo {
    fn from(att: Attachment) -> Self {
        Self {
            sequence_number: att.sequence_number,
            source_timestamp_ns: att.timestamp_ns,
            publisher_gid: att.gid,
        }
    }
}

/// Generate a random entity GID.
pub fn generate_gid() -> [u8; GID_SIZE] {
    *uuid::Uuid::new_v4().as_bytes()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_decode_roundtrip() {
        let gid = generate_gid();
        let att = Attachment::now(99, gid);
        let bytes = att.encode();
        assert_eq!(bytes.len(), ATTACHMENT_SIZE);

        let back = Attachment::decode(&bytes).unwrap();
        assert_eq!(back.sequence_number, 99);
        assert_eq!(back.timestamp_ns, att.timestamp_ns);
        assert_eq!(back.gid, gid);
    }

    #[test]
    fn short_input_is_rejected() {
        assert!(matches!(
            Attachment::decode(&[0u8; 20]),
            Err(Error::InvalidAttachment(_))
        ));
    }

    #[test]
    fn wrong_gid_length_is_rejected() {
        let mut bytes = [0u8; ATTACHMENT_SIZE];
        bytes[16] = 4;
        assert!(matches!(
            Attachment::decode(&bytes),
            Err(Error::InvalidAttachment(_))
        ));
    }

    #[test]
    fn default_decode_never_fails() {
        let att = Attachment::decode_or_default(None);
        assert_eq!(att.sequence_number, 0);

        let att = Attachment::decode_or_default(Some(&[1, 2, 3]));
        assert_eq!(att.gid, [0; GID_SIZE]);
    }
}
