use std::cmp::Ordering;

/// Strict weak order over blocks. Defines "smallest" for merge selection.
///
/// Must agree with the order every source was sorted in. The merge reader
/// assumes this and never checks it; violating it gives an unspecified
/// output order, never a panic.
pub trait BlockCompare<B: ?Sized> {
    fn compare(&self, a: &B, b: &B) -> Ordering;
}

/// Ascending order by the block's own `Ord`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NaturalOrder;

impl<B: Ord + ?Sized> BlockCompare<B> for NaturalOrder {
    fn compare(&self, a: &B, b: &B) -> Ordering {
        a.cmp(b)
    }
}

/// Descending order by the block's own `Ord`, for runs sorted largest first.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Descending;

impl<B: Ord + ?Sized> BlockCompare<B> for Descending {
    fn compare(&self, a: &B, b: &B) -> Ordering {
        b.cmp(a)
    }
}

impl<B: ?Sized, F> BlockCompare<B> for F
where
    F: Fn(&B, &B) -> Ordering,
{
    fn compare(&self, a: &B, b: &B) -> Ordering {
        self(a, b)
    }
}
