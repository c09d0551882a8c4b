use std::cmp::Ordering;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};

use log::{debug, trace, warn};

use crate::compare::{BlockCompare, NaturalOrder};
use crate::error::{Error, Result};
use crate::merge::selection::{Entry, Selection};
use crate::pool::{BlockPool, HeapPool, RingPool};
use crate::run::{Decode, RunOptions, RunReader};
use crate::source::BlockSource;
use crate::types::{Block, SourceIndex};

/// Merge reader that boxes every block; handed-out blocks live forever.
pub type HeapMergeReader<B, S, C = NaturalOrder> = MergeReader<B, S, C, HeapPool<B>>;

/// Merge reader over a `2 * N` cell ring; handed-out blocks are recycled.
pub type RingMergeReader<B, S, C = NaturalOrder> = MergeReader<B, S, C, RingPool<B>>;

/// Merges N individually sorted sources into one sorted stream.
///
/// Holds exactly one buffered block per non-exhausted source, so memory stays
/// O(N) blocks whatever the input size. Each extraction takes the smallest
/// buffered block and immediately refills its source.
///
/// Equal blocks come out in the order they were buffered: at construction
/// that is ascending source index, afterwards the order in which refills
/// happened. Re-running the same merge gives the same (block, source) stream.
///
/// Sources must already be sorted by `C`; this is assumed, never checked.
/// Dropping the reader closes every source, exhausted or not.
pub struct MergeReader<B, S, C = NaturalOrder, P = HeapPool<B>>
where
    P: BlockPool<B>,
{
    /// One slot per input; `None` once the source is exhausted or failed.
    sources: Vec<Option<S>>,
    selection: Selection<P::Cell>,
    pool: P,
    compare: C,
    next_seq: u64,
    count: u64,
    _block: PhantomData<fn() -> B>,
}

impl<B, S, C, P> MergeReader<B, S, C, P>
where
    S: BlockSource<B>,
    C: BlockCompare<B>,
    P: BlockPool<B>,
{
    /// Build a reader over pre-opened sources. Source `i` of the vector is
    /// reported as index `i`.
    ///
    /// Reads the first block of every source. Sources that are already empty
    /// are closed straight away. Fails with [`Error::NoSources`] on an empty
    /// list and with [`Error::Open`] if any first read fails.
    pub fn new(sources: Vec<S>, compare: C) -> Result<Self> {
        if sources.is_empty() {
            return Err(Error::NoSources);
        }

        let n = sources.len();
        let mut reader = MergeReader {
            sources: sources.into_iter().map(Some).collect(),
            selection: Selection::with_capacity(n),
            pool: P::with_sources(n),
            compare,
            next_seq: 0,
            count: 0,
            _block: PhantomData,
        };

        for index in 0..n {
            reader
                .load(index)
                .map_err(|e| Error::open(index, None, e))?;
        }

        debug!(
            "merge reader ready: {} sources, {} non-empty",
            n,
            reader.selection.len()
        );
        Ok(reader)
    }

    /// The block the next extraction will return, if any. No side effects.
    pub fn peek(&self) -> Option<&B> {
        self.selection.first().map(|entry| self.pool.block(&entry.cell))
    }

    /// Remove the smallest block and hand its storage to the caller, together
    /// with the index of the source it came from. `Ok(None)` once every source
    /// is drained.
    ///
    /// What the caller gets depends on the pool:
    /// - [`HeapPool`]: a `Box<B>`, owned outright; dropping it releases it.
    /// - [`RingPool`]: a [`RingHandle`](crate::pool::RingHandle) read through
    ///   [`resolve`](Self::resolve). The cell is recycled by later reads: the
    ///   block is guaranteed intact only for the next `N - 1` extractions and
    ///   is gone after at most `2 * N`. Use [`extract_into`](Self::extract_into)
    ///   when a lasting copy is needed.
    ///
    /// An upstream read error while refilling is returned as is; see
    /// [`extract_into`](Self::extract_into) for the state it leaves behind.
    pub fn extract_owned(&mut self) -> Result<Option<(P::Owned, SourceIndex)>> {
        match self.take_next()? {
            Some((cell, source)) => Ok(Some((self.pool.hand_out(cell), source))),
            None => Ok(None),
        }
    }

    /// Remove the smallest block, copy it into `out` and return its source
    /// index. `Ok(None)` once every source is drained, leaving `out` untouched.
    ///
    /// The copy is the caller's to keep regardless of pool strategy; the pool
    /// cell is released right away.
    ///
    /// If refilling the source fails, the error is returned unmodified, the
    /// failing source is closed for good, and the popped block goes back to
    /// the front of the merge: nothing is lost and [`count`](Self::count) is
    /// unchanged. The next call returns that block.
    pub fn extract_into(&mut self, out: &mut B) -> Result<Option<SourceIndex>>
    where
        B: Clone,
    {
        let Some((cell, source)) = self.take_next()? else {
            return Ok(None);
        };
        out.clone_from(self.pool.block(&cell));
        self.pool.release(cell);
        Ok(Some(source))
    }

    /// Read a block handed out by [`extract_owned`](Self::extract_owned).
    ///
    /// For a ring pool the handle must come from this reader, and the result
    /// is only meaningful inside its validity window.
    pub fn resolve<'a>(&'a self, owned: &'a P::Owned) -> &'a B {
        self.pool.resolve(owned)
    }

    /// Number of blocks extracted so far.
    pub fn count(&self) -> u64 {
        self.count
    }

    /// Number of inputs the reader was built with.
    pub fn num_sources(&self) -> usize {
        self.sources.len()
    }

    /// Number of blocks currently buffered, one per live source.
    pub fn pending(&self) -> usize {
        self.selection.len()
    }

    /// True once every source is drained.
    pub fn is_exhausted(&self) -> bool {
        self.selection.is_empty()
    }

    pub fn pool(&self) -> &P {
        &self.pool
    }

    /// Iterate over the remaining blocks as owned copies.
    pub fn blocks(&mut self) -> Blocks<'_, B, S, C, P>
    where
        B: Block,
    {
        Blocks { reader: self }
    }

    /// Pop the minimum and refill its source. On a refill error the popped
    /// entry is put back unchanged.
    fn take_next(&mut self) -> Result<Option<(P::Cell, SourceIndex)>> {
        let Some(entry) = self.pop_entry() else {
            return Ok(None);
        };

        let source = entry.source;
        if let Err(e) = self.load(source) {
            self.push_entry(entry);
            return Err(e);
        }

        self.count += 1;
        Ok(Some((entry.cell, source)))
    }

    /// Read the next block of `index` into a fresh cell and register it.
    fn load(&mut self, index: SourceIndex) -> Result<()> {
        let Some(source) = self.sources[index].as_mut() else {
            return Ok(());
        };

        let mut cell = self.pool.acquire();
        match source.read_next(self.pool.block_mut(&mut cell)) {
            Ok(true) => {
                trace!("source {index} refilled");
                self.register(cell, index);
                Ok(())
            }
            Ok(false) => {
                self.pool.release(cell);
                self.sources[index] = None;
                debug!("source {index} exhausted after {} blocks emitted", self.count);
                Ok(())
            }
            Err(e) => {
                self.pool.release(cell);
                self.sources[index] = None;
                warn!("source {index} closed on read failure: {e}");
                Err(e)
            }
        }
    }

    fn register(&mut self, cell: P::Cell, source: SourceIndex) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.push_entry(Entry { cell, source, seq });
    }

    fn push_entry(&mut self, entry: Entry<P::Cell>) {
        let Self {
            selection,
            pool,
            compare,
            ..
        } = self;
        selection.push(entry, |a, b| precedes::<B, _, _>(&*pool, &*compare, a, b));
    }

    fn pop_entry(&mut self) -> Option<Entry<P::Cell>> {
        let Self {
            selection,
            pool,
            compare,
            ..
        } = self;
        selection.pop(|a, b| precedes::<B, _, _>(&*pool, &*compare, a, b))
    }
}

impl<B, C, P> MergeReader<B, RunReader<B>, C, P>
where
    B: Decode,
    C: BlockCompare<B>,
    P: BlockPool<B>,
{
    /// Open sorted run files and merge them. Path `i` is reported as index `i`.
    pub fn open<I, Q>(paths: I, compare: C) -> Result<Self>
    where
        I: IntoIterator<Item = Q>,
        Q: AsRef<Path>,
    {
        Self::open_with(paths, RunOptions::default(), compare)
    }

    /// Like [`open`](Self::open), with explicit run file options.
    ///
    /// Fails with [`Error::Open`] naming the first path that cannot be opened,
    /// has a bad header, or fails on its first record.
    pub fn open_with<I, Q>(paths: I, options: RunOptions, compare: C) -> Result<Self>
    where
        I: IntoIterator<Item = Q>,
        Q: AsRef<Path>,
    {
        let paths: Vec<PathBuf> = paths
            .into_iter()
            .map(|p| p.as_ref().to_path_buf())
            .collect();

        let mut runs = Vec::with_capacity(paths.len());
        for (index, path) in paths.iter().enumerate() {
            let run = RunReader::open_with(path, &options)
                .map_err(|e| Error::open(index, Some(path.clone()), e))?;
            runs.push(run);
        }

        Self::new(runs, compare).map_err(|e| match e {
            Error::Open {
                index,
                path: None,
                source,
            } => Error::Open {
                index,
                path: paths.get(index).cloned(),
                source,
            },
            other => other,
        })
    }
}

/// Block order first, registration order second.
fn precedes<B, C, P>(pool: &P, compare: &C, a: &Entry<P::Cell>, b: &Entry<P::Cell>) -> bool
where
    C: BlockCompare<B>,
    P: BlockPool<B>,
{
    match compare.compare(pool.block(&a.cell), pool.block(&b.cell)) {
        Ordering::Less => true,
        Ordering::Greater => false,
        Ordering::Equal => a.seq < b.seq,
    }
}

/// Iterator over the remaining blocks of a [`MergeReader`], yielding owned
/// copies with their source index. Built on
/// [`extract_into`](MergeReader::extract_into).
pub struct Blocks<'a, B, S, C, P>
where
    P: BlockPool<B>,
{
    reader: &'a mut MergeReader<B, S, C, P>,
}

impl<B, S, C, P> Iterator for Blocks<'_, B, S, C, P>
where
    B: Block,
    S: BlockSource<B>,
    C: BlockCompare<B>,
    P: BlockPool<B>,
{
    type Item = Result<(B, SourceIndex)>;

    fn next(&mut self) -> Option<Self::Item> {
        let mut block = B::default();
        match self.reader.extract_into(&mut block) {
            Ok(Some(source)) => Some(Ok((block, source))),
            Ok(None) => None,
            Err(e) => Some(Err(e)),
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.reader.pending(), None)
    }
}
