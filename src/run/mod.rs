pub mod codec;
pub mod reader;
pub mod record;
pub mod writer;

pub use codec::{Decode, Encode};
pub use reader::RunReader;
pub use writer::RunWriter;

/// Magic number at the start of every run file.
pub const RUN_MAGIC: u64 = 0x4D52_475F_5255_4E00; // "MRG_RUN\0"

/// Size of the magic header in bytes.
pub const MAGIC_SIZE: usize = 8;

/// Default read buffer per run file. One buffer is held per merged source.
pub const DEFAULT_BUFFER_SIZE: usize = 64 * 1024;

/// How run files are read.
///
/// Trade-off: memory vs syscalls. Every source of a merge holds its own
/// buffer, so a merge over N runs uses N * `buffer_size` bytes of buffers.
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Read buffer size per run file.
    pub buffer_size: usize,
    /// Check each record's CRC before decoding it.
    pub verify_checksums: bool,
}

impl Default for RunOptions {
    fn default() -> Self {
        RunOptions {
            buffer_size: DEFAULT_BUFFER_SIZE,
            verify_checksums: true,
        }
    }
}

impl RunOptions {
    pub fn buffer_size(mut self, buffer_size: usize) -> Self {
        self.buffer_size = buffer_size;
        self
    }

    pub fn verify_checksums(mut self, verify: bool) -> Self {
        self.verify_checksums = verify;
        self
    }
}
