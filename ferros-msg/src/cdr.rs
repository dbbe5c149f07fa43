//! CDR (Common Data Representation) encoding.
//!
//! Every serialized payload carries the 4-byte RTPS encapsulation header
//! (representation identifier + options) followed by the plain CDR v1 body.
//! Only `CDR_LE` (`0x0001`) and `CDR_BE` (`0x0000`) are produced or
//! accepted; Parameter List and XCDR v2 encapsulations are rejected.

use ferros_core::error::{Error, Result};
use serde::{Serialize, de::DeserializeOwned};

/// Size of the CDR encapsulation header in bytes.
pub const HEADER_SIZE: usize = 4;

/// Representation identifier for CDR big endian.
pub const CDR_BE: [u8; 2] = [0x00, 0x00];

/// Representation identifier for CDR little endian.
pub const CDR_LE: [u8; 2] = [0x00, 0x01];

/// Serialize `value` to CDR little-endian bytes with an encapsulation
/// header.
///
/// # Errors
///
/// Returns [`Error::Serialization`] when encoding fails.
pub fn encode<T: Serialize>(value: &T) -> Result<Vec<u8>> {
    let body = cdr_encoding::to_vec::<T, byteorder::LittleEndian>(value)
        .map_err(|e| Error::Serialization(e.to_string()))?;

    let mut out = Vec::with_capacity(HEADER_SIZE + body.len());
    out.extend_from_slice(&CDR_LE);
    out.extend_from_slice(&[0x00, 0x00]); // options
    out.extend_from_slice(&body);
    Ok(out)
}

/// Deserialize a value from CDR bytes, honoring the encapsulation header's
/// endianness.
///
/// # Errors
///
/// Returns [`Error::Serialization`] when the header is missing, the
/// encapsulation is unsupported, or decoding fails.
pub fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T> {
    if bytes.len() < HEADER_SIZE {
        return Err(Error::Serialization(format!(
            "payload too short for CDR header: {} bytes",
            bytes.len()
        )));
    }

    let rep_id = [bytes[0], bytes[1]];
    let body = &bytes[HEADER_SIZE..];

    if rep_id == CDR_LE {
        let (value, _) = cdr_encoding::from_bytes::<T, byteorder::LittleEndian>(body)
            .map_err(|e| Error::Serialization(e.to_string()))?;
        Ok(value)
    } else if rep_id == CDR_BE {
        let (value, _) = cdr_encoding::from_bytes::<T, byteorder::BigEndian>(body)
            .map_err(|e| Error::Serialization(e.to_string()))?;
        Ok(value)
    } else {
        Err(Error::Serialization(format!(
            "unsupported CDR encapsulation: 0x{:02x}{:02x}",
            rep_id[0], rep_id[1]
        )))
    }
}
