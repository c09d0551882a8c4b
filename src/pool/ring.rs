use std::collections::VecDeque;

use crate::pool::BlockPool;
use crate::types::Block;

/// Fixed ring of `2 * N` reusable cells for a merge over N sources.
///
/// All cells are allocated up front and never freed individually; a cell is
/// only ever overwritten when it comes round again. Free cells are taken in
/// ring order: the first `2 * N` acquisitions walk the ring from cell 0, after
/// that cells come back in the order they were released or handed out. A cell
/// that backs a block still buffered by the merge reader is never handed to
/// another read.
///
/// ```text
///  free:  [ c3 ][ c4 ][ c5 ][ c0 ]  <- released / handed-out cells join here
///            ^
///            next acquire
/// ```
///
/// # Stale handles
///
/// A [`RingHandle`] returned by `extract_owned` points into the ring. The
/// merge reader holds at most N cells at once, so after `extract_owned`
/// returns, the handle's cell has at least `N - 1` free cells ahead of it and
/// at most `2 * N - 1`. The block therefore survives at least the next
/// `N - 1` acquisitions (one per extraction while sources last) and is
/// overwritten no later than the `2 * N`-th. Reading a handle after that
/// returns whatever block now occupies the cell; this is not detected. Copy
/// the block out, or use `extract_into`, to keep it longer.
#[derive(Debug)]
pub struct RingPool<B> {
    cells: Vec<B>,
    free: VecDeque<usize>,
}

/// Engine-side claim on one ring cell. Not `Clone`: exactly one owner at a time.
#[derive(Debug, PartialEq, Eq)]
pub struct RingCell(usize);

/// A handed-out block living in a [`RingPool`] cell.
///
/// Valid only within the window described on [`RingPool`]. Resolve it with
/// [`MergeReader::resolve`](crate::MergeReader::resolve) on the reader that
/// produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RingHandle {
    cell: usize,
}

impl RingHandle {
    /// Ring position of the cell this handle points at.
    pub fn cell(&self) -> usize {
        self.cell
    }
}

impl<B> RingPool<B> {
    /// Total number of cells in the ring.
    pub fn capacity(&self) -> usize {
        self.cells.len()
    }

    /// Cells currently acquired and neither released nor handed out.
    pub fn outstanding(&self) -> usize {
        self.cells.len() - self.free.len()
    }
}

impl<B: Block> BlockPool<B> for RingPool<B> {
    type Cell = RingCell;
    type Owned = RingHandle;

    fn with_sources(sources: usize) -> Self {
        let size = sources * 2;
        RingPool {
            cells: (0..size).map(|_| B::default()).collect(),
            free: (0..size).collect(),
        }
    }

    fn acquire(&mut self) -> RingCell {
        match self.free.pop_front() {
            Some(cell) => RingCell(cell),
            None => {
                // A merge reader never holds more than N + 1 cells, so this
                // only happens when the pool is driven directly.
                self.cells.push(B::default());
                RingCell(self.cells.len() - 1)
            }
        }
    }

    fn release(&mut self, cell: RingCell) {
        self.free.push_back(cell.0);
    }

    fn block<'a>(&'a self, cell: &'a RingCell) -> &'a B {
        &self.cells[cell.0]
    }

    fn block_mut<'a>(&'a mut self, cell: &'a mut RingCell) -> &'a mut B {
        &mut self.cells[cell.0]
    }

    fn hand_out(&mut self, cell: RingCell) -> RingHandle {
        self.free.push_back(cell.0);
        RingHandle { cell: cell.0 }
    }

    fn resolve<'a>(&'a self, owned: &'a RingHandle) -> &'a B {
        &self.cells[owned.cell]
    }
}
