use std::marker::PhantomData;

use crate::pool::BlockPool;
use crate::types::Block;

/// One heap allocation per block read.
///
/// `acquire` boxes a fresh block and `release` drops it. A block handed out by
/// `extract_owned` is a plain `Box<B>`: the caller owns it exclusively and
/// for as long as it likes, and releases it exactly once by dropping it.
#[derive(Debug)]
pub struct HeapPool<B> {
    outstanding: usize,
    _block: PhantomData<fn() -> B>,
}

impl<B> HeapPool<B> {
    /// Cells currently acquired and neither released nor handed out.
    pub fn outstanding(&self) -> usize {
        self.outstanding
    }
}

impl<B: Block> BlockPool<B> for HeapPool<B> {
    type Cell = Box<B>;
    type Owned = Box<B>;

    fn with_sources(_sources: usize) -> Self {
        HeapPool {
            outstanding: 0,
            _block: PhantomData,
        }
    }

    fn acquire(&mut self) -> Box<B> {
        self.outstanding += 1;
        Box::default()
    }

    fn release(&mut self, cell: Box<B>) {
        self.outstanding = self.outstanding.saturating_sub(1);
        drop(cell);
    }

    fn block<'a>(&'a self, cell: &'a Box<B>) -> &'a B {
        cell
    }

    fn block_mut<'a>(&'a mut self, cell: &'a mut Box<B>) -> &'a mut B {
        cell
    }

    fn hand_out(&mut self, cell: Box<B>) -> Box<B> {
        self.outstanding = self.outstanding.saturating_sub(1);
        cell
    }

    fn resolve<'a>(&'a self, owned: &'a Box<B>) -> &'a B {
        owned
    }
}
