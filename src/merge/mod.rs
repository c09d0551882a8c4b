pub mod reader;
pub(crate) mod selection;

pub use reader::{Blocks, HeapMergeReader, MergeReader, RingMergeReader};
