use std::fs::File;
use std::io::{self, BufRead, BufReader, Read};
use std::marker::PhantomData;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::run::codec::Decode;
use crate::run::record::{HEADER_SIZE, RecordHeader};
use crate::run::{MAGIC_SIZE, RUN_MAGIC, RunOptions};
use crate::source::BlockSource;

/// Streams blocks out of one sorted run file.
///
/// Reads sequentially through a buffered file handle, one record per
/// [`read_next`](BlockSource::read_next), decoding straight into the caller's
/// block. End of file on a record boundary is the normal end of the run;
/// anything cut short or failing its CRC is [`Error::Corruption`].
pub struct RunReader<B> {
    /// Path to the run file (for debugging/error messages).
    path: PathBuf,
    reader: BufReader<File>,
    /// Scratch buffer for the current payload, reused across records.
    payload: Vec<u8>,
    verify_checksums: bool,
    records_read: u64,
    _block: PhantomData<fn(&mut B)>,
}

impl<B> RunReader<B> {
    /// Open a run file with default options.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Self::open_with(path, &RunOptions::default())
    }

    /// Open a run file and check its magic header.
    pub fn open_with(path: impl AsRef<Path>, options: &RunOptions) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)?;
        // An empty buffer would make every fill_buf look like end of file.
        let capacity = options.buffer_size.max(HEADER_SIZE);
        let mut reader = BufReader::with_capacity(capacity, file);

        let mut magic = [0u8; MAGIC_SIZE];
        read_exact_or_corrupt(&mut reader, &mut magic, "run header")?;
        if u64::from_le_bytes(magic) != RUN_MAGIC {
            return Err(Error::Corruption(format!(
                "{} is not a run file (bad magic)",
                path.display()
            )));
        }

        Ok(RunReader {
            path: path.to_path_buf(),
            reader,
            payload: Vec::new(),
            verify_checksums: options.verify_checksums,
            records_read: 0,
            _block: PhantomData,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of records decoded so far.
    pub fn records_read(&self) -> u64 {
        self.records_read
    }
}

impl<B: Decode> BlockSource<B> for RunReader<B> {
    fn read_next(&mut self, into: &mut B) -> Result<bool> {
        if self.reader.fill_buf()?.is_empty() {
            return Ok(false);
        }

        let mut header = [0u8; HEADER_SIZE];
        read_exact_or_corrupt(&mut self.reader, &mut header, "record header")?;
        let header = RecordHeader::decode(&header)?;

        self.payload.resize(header.len as usize, 0);
        read_exact_or_corrupt(&mut self.reader, &mut self.payload, "record payload")?;

        if self.verify_checksums {
            header.verify(&self.payload)?;
        }

        into.decode_into(&self.payload)?;
        self.records_read += 1;
        Ok(true)
    }
}

/// `read_exact` that reports a short read as corruption instead of IO failure.
fn read_exact_or_corrupt(reader: &mut impl Read, buf: &mut [u8], what: &str) -> Result<()> {
    match reader.read_exact(buf) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => {
            Err(Error::Corruption(format!("{what} truncated")))
        }
        Err(e) => Err(e.into()),
    }
}
