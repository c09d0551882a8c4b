/// Position of a source in the list handed to the merge reader (0..N-1).
///
/// Construction order fixes these indices; they are the only indices ever
/// reported back to the caller.
pub type SourceIndex = usize;

/// A record the merge reader can buffer and hand out.
///
/// `Default` provides fresh storage for pool cells, which sources then
/// overwrite in place. `Clone` backs the value copy made by
/// [`extract_into`](crate::MergeReader::extract_into); `clone_from` is used
/// so heap-backed blocks can reuse the caller's allocation.
pub trait Block: Default + Clone {}

impl<T: Default + Clone> Block for T {}
