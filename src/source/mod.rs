use crate::error::Result;

/// A sequential reader of pre-sorted blocks.
///
/// Every input of a [`MergeReader`](crate::MergeReader) implements this trait:
/// run files on disk, in-memory runs, or anything else that can deserialize
/// one block at a time. Closing the source is dropping it.
pub trait BlockSource<B> {
    /// Read the next block into `into`, overwriting its previous contents.
    ///
    /// Returns `Ok(true)` if a block was read and `Ok(false)` at end of stream.
    /// After `Ok(false)` the contents of `into` are unspecified. Unrecoverable
    /// failures (I/O errors, corrupt data) must be reported as `Err` rather
    /// than as end of stream, so the merge reader can propagate them.
    fn read_next(&mut self, into: &mut B) -> Result<bool>;
}

impl<B, S: BlockSource<B> + ?Sized> BlockSource<B> for Box<S> {
    fn read_next(&mut self, into: &mut B) -> Result<bool> {
        (**self).read_next(into)
    }
}

impl<B, S: BlockSource<B> + ?Sized> BlockSource<B> for &mut S {
    fn read_next(&mut self, into: &mut B) -> Result<bool> {
        (**self).read_next(into)
    }
}

/// In-memory source over any iterator of blocks.
///
/// Never fails; it ends when the iterator does.
#[derive(Debug, Clone)]
pub struct IterSource<I> {
    iter: I,
}

impl<I: Iterator> IterSource<I> {
    pub fn new<T>(blocks: T) -> Self
    where
        T: IntoIterator<IntoIter = I>,
    {
        IterSource {
            iter: blocks.into_iter(),
        }
    }
}

impl<I: Iterator> BlockSource<I::Item> for IterSource<I> {
    fn read_next(&mut self, into: &mut I::Item) -> Result<bool> {
        match self.iter.next() {
            Some(block) => {
                *into = block;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}
