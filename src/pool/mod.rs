pub mod heap;
pub mod ring;

pub use heap::HeapPool;
pub use ring::{RingCell, RingHandle, RingPool};

/// Storage strategy for the blocks a merge reader buffers.
///
/// The merge reader acquires one cell per read, keeps it while the block is
/// buffered, then either releases it (value copied out) or hands it out to
/// the caller. Both strategies run the exact same merge logic; they differ
/// only in what a handed-out block is and how long it stays valid:
///
/// | Strategy     | `Owned`       | Validity of a handed-out block            |
/// |--------------|---------------|-------------------------------------------|
/// | [`HeapPool`] | `Box<B>`      | Permanent. Dropping it releases it.       |
/// | [`RingPool`] | [`RingHandle`]| Bounded. Recycled after a few more reads. |
pub trait BlockPool<B> {
    /// Engine-side handle to one cell of storage.
    type Cell;
    /// What [`MergeReader::extract_owned`](crate::MergeReader::extract_owned)
    /// hands to the caller.
    type Owned;

    /// Build a pool for a merge over `sources` inputs.
    fn with_sources(sources: usize) -> Self;

    /// Take a cell to read a block into.
    fn acquire(&mut self) -> Self::Cell;

    /// Give a cell back. Its contents are no longer referenced.
    fn release(&mut self, cell: Self::Cell);

    fn block<'a>(&'a self, cell: &'a Self::Cell) -> &'a B;

    fn block_mut<'a>(&'a mut self, cell: &'a mut Self::Cell) -> &'a mut B;

    /// Transfer a buffered cell to the caller.
    fn hand_out(&mut self, cell: Self::Cell) -> Self::Owned;

    /// Read a block previously returned by [`hand_out`](Self::hand_out).
    fn resolve<'a>(&'a self, owned: &'a Self::Owned) -> &'a B;
}
