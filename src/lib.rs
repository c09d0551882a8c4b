//! # Merge Reader
//!
//! A k-way merge engine: given N individually sorted sources of blocks, it
//! produces one globally sorted stream, holding just one buffered block per
//! source at any time.
//!
//! ## Core idea
//! Every source has its smallest unread block buffered. Emitting the global
//! minimum means taking the smallest buffered block and reading one more
//! block from the source it came from. Memory is O(N) blocks no matter how
//! large the inputs are, which is what lets sorted run files be combined
//! into one sorted stream without loading them.
//!
//! ```
//! use merge_reader::{HeapMergeReader, IterSource, NaturalOrder};
//!
//! let sources = vec![
//!     IterSource::new(vec![1u32, 4, 7]),
//!     IterSource::new(vec![2, 5]),
//!     IterSource::new(vec![3, 6, 8, 9]),
//! ];
//! let mut reader: HeapMergeReader<u32, _> = HeapMergeReader::new(sources, NaturalOrder)?;
//!
//! let mut block = 0;
//! let mut merged = Vec::new();
//! while let Some(source) = reader.extract_into(&mut block)? {
//!     merged.push((block, source));
//! }
//! assert_eq!(merged[..3], [(1, 0), (2, 1), (3, 2)]);
//! assert_eq!(reader.count(), 9);
//! # Ok::<(), merge_reader::Error>(())
//! ```

pub mod compare;
pub mod error;
pub mod merge;
pub mod pool;
pub mod run;
pub mod source;
pub mod types;

// Public re-exports for the top-level API
pub use compare::{BlockCompare, Descending, NaturalOrder};
pub use error::{Error, Result};
pub use merge::{Blocks, HeapMergeReader, MergeReader, RingMergeReader};
pub use pool::{BlockPool, HeapPool, RingHandle, RingPool};
pub use run::{Decode, Encode, RunOptions, RunReader, RunWriter};
pub use source::{BlockSource, IterSource};
pub use types::{Block, SourceIndex};
