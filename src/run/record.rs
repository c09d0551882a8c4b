use crate::error::{Error, Result};

// Header sizes
pub const CRC_SIZE: usize = 4;
pub const LEN_SIZE: usize = 4;
pub const HEADER_SIZE: usize = CRC_SIZE + LEN_SIZE;

/// Largest payload a record may carry.
pub const MAX_PAYLOAD_SIZE: usize = 256 * 1024 * 1024;

/// Framing of one block in a run file.
///
/// On-disk format:
/// ```text
/// ┌──────────┬──────────┬─────────────────┐
/// │ CRC (4B) │ Len (4B) │ Payload (Len B) │
/// └──────────┴──────────┴─────────────────┘
/// ```
///
/// CRC covers the length field and the payload. Unlike a write-ahead log, a
/// run file is written once and sealed, so a bad record is corruption rather
/// than a torn tail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordHeader {
    pub crc: u32,
    pub len: u32,
}

impl RecordHeader {
    /// Parse a header, rejecting lengths no writer could have produced.
    pub fn decode(data: &[u8; HEADER_SIZE]) -> Result<Self> {
        let crc = u32::from_le_bytes([data[0], data[1], data[2], data[3]]);
        let len = u32::from_le_bytes([data[4], data[5], data[6], data[7]]);
        if len as usize > MAX_PAYLOAD_SIZE {
            return Err(Error::Corruption(format!(
                "record length {len} exceeds limit of {MAX_PAYLOAD_SIZE} bytes"
            )));
        }
        Ok(RecordHeader { crc, len })
    }

    /// Check the payload against the stored CRC.
    pub fn verify(&self, payload: &[u8]) -> Result<()> {
        let computed = checksum(self.len, payload);
        if computed != self.crc {
            return Err(Error::Corruption(format!(
                "CRC mismatch: stored {:#010x}, computed {computed:#010x}",
                self.crc
            )));
        }
        Ok(())
    }
}

/// Append a framed record for `payload` to `out`.
pub fn encode_record(payload: &[u8], out: &mut Vec<u8>) -> Result<()> {
    if payload.len() > MAX_PAYLOAD_SIZE {
        return Err(Error::RecordTooLarge(payload.len()));
    }
    let len = payload.len() as u32;

    out.reserve(HEADER_SIZE + payload.len());
    out.extend_from_slice(&checksum(len, payload).to_le_bytes());
    out.extend_from_slice(&len.to_le_bytes());
    out.extend_from_slice(payload);
    Ok(())
}

fn checksum(len: u32, payload: &[u8]) -> u32 {
    let mut hasher = crc32fast::Hasher::new();
    hasher.update(&len.to_le_bytes());
    hasher.update(payload);
    hasher.finalize()
}
