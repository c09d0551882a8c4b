use std::mem::size_of;

use crate::error::{Error, Result};

/// Serializes a block into a run file record payload.
pub trait Encode {
    /// Append the encoded block to `buf`.
    fn encode(&self, buf: &mut Vec<u8>);
}

/// Deserializes a block from a run file record payload.
///
/// Decodes in place so pool cells (and their heap buffers) get reused from
/// one record to the next.
pub trait Decode {
    /// Overwrite `self` with the block encoded in `payload`, which holds
    /// exactly one record.
    fn decode_into(&mut self, payload: &[u8]) -> Result<()>;
}

macro_rules! int_codec {
    ($($t:ty),*) => {$(
        impl Encode for $t {
            fn encode(&self, buf: &mut Vec<u8>) {
                buf.extend_from_slice(&self.to_le_bytes());
            }
        }

        impl Decode for $t {
            fn decode_into(&mut self, payload: &[u8]) -> Result<()> {
                let bytes: [u8; size_of::<$t>()] = payload.try_into().map_err(|_| {
                    Error::Corruption(format!(
                        "{} payload must be {} bytes, got {}",
                        stringify!($t),
                        size_of::<$t>(),
                        payload.len()
                    ))
                })?;
                *self = <$t>::from_le_bytes(bytes);
                Ok(())
            }
        }
    )*};
}

int_codec!(u32, u64, i32, i64);

impl Encode for Vec<u8> {
    fn encode(&self, buf: &mut Vec<u8>) {
        buf.extend_from_slice(self);
    }
}

impl Decode for Vec<u8> {
    fn decode_into(&mut self, payload: &[u8]) -> Result<()> {
        self.clear();
        self.extend_from_slice(payload);
        Ok(())
    }
}

impl Encode for String {
    fn encode(&self, buf: &mut Vec<u8>) {
        buf.extend_from_slice(self.as_bytes());
    }
}

impl Decode for String {
    fn decode_into(&mut self, payload: &[u8]) -> Result<()> {
        let s = std::str::from_utf8(payload)
            .map_err(|e| Error::Corruption(format!("invalid UTF-8 in string payload: {e}")))?;
        self.clear();
        self.push_str(s);
        Ok(())
    }
}
