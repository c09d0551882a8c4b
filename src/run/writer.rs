use std::fs::File;
use std::io::{BufWriter, Write};
use std::marker::PhantomData;
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::run::codec::Encode;
use crate::run::record::encode_record;
use crate::run::RUN_MAGIC;

/// Writes blocks to a run file, in the order they are appended.
///
/// The writer does not sort or check order: appending blocks out of order
/// produces a run that merges into unspecified order.
///
/// Two layers of buffering:
///   BufWriter.flush()  → Rust buffer → OS page cache
///   file.sync_all()    → OS page cache → physical disk
/// [`finish`](Self::finish) does both; dropping the writer without it only
/// flushes on a best-effort basis.
pub struct RunWriter<B> {
    path: PathBuf,
    writer: BufWriter<File>,
    /// Encoded payload of the block being appended.
    payload: Vec<u8>,
    /// Framed record ready for the file.
    record: Vec<u8>,
    records: u64,
    _block: PhantomData<fn(&B)>,
}

impl<B: Encode> RunWriter<B> {
    /// Create (or truncate) a run file and write its header.
    pub fn create(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let mut writer = BufWriter::new(File::create(path)?);
        writer.write_all(&RUN_MAGIC.to_le_bytes())?;

        Ok(RunWriter {
            path: path.to_path_buf(),
            writer,
            payload: Vec::new(),
            record: Vec::new(),
            records: 0,
            _block: PhantomData,
        })
    }

    /// Append one block.
    pub fn append(&mut self, block: &B) -> Result<()> {
        self.payload.clear();
        block.encode(&mut self.payload);

        self.record.clear();
        encode_record(&self.payload, &mut self.record)?;
        self.writer.write_all(&self.record)?;
        self.records += 1;
        Ok(())
    }

    /// Append every block of `blocks`.
    pub fn append_all<'a, I>(&mut self, blocks: I) -> Result<()>
    where
        I: IntoIterator<Item = &'a B>,
        B: 'a,
    {
        for block in blocks {
            self.append(block)?;
        }
        Ok(())
    }

    /// Flush and fsync. Returns the number of records written.
    pub fn finish(mut self) -> Result<u64> {
        self.writer.flush()?;
        self.writer.get_ref().sync_all()?;
        Ok(self.records)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Records appended so far.
    pub fn records(&self) -> u64 {
        self.records
    }
}
