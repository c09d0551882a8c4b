use crate::types::SourceIndex;

/// One buffered block registered for selection.
#[derive(Debug)]
pub(crate) struct Entry<H> {
    pub cell: H,
    pub source: SourceIndex,
    /// Registration order; breaks ties between equal blocks.
    pub seq: u64,
}

/// Binary min-heap of buffered blocks.
///
/// The heap itself knows nothing about block contents: every operation takes
/// a `less` predicate. The merge reader's predicate orders by block first and
/// by `seq` second, which makes the order total, so equal blocks come out in
/// registration order.
#[derive(Debug)]
pub(crate) struct Selection<H> {
    heap: Vec<Entry<H>>,
}

impl<H> Selection<H> {
    pub fn with_capacity(capacity: usize) -> Self {
        Selection {
            heap: Vec::with_capacity(capacity),
        }
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    /// Smallest entry, without removing it.
    pub fn first(&self) -> Option<&Entry<H>> {
        self.heap.first()
    }

    pub fn push<F>(&mut self, entry: Entry<H>, less: F)
    where
        F: Fn(&Entry<H>, &Entry<H>) -> bool,
    {
        self.heap.push(entry);
        self.sift_up(self.heap.len() - 1, &less);
    }

    /// Remove and return the smallest entry.
    pub fn pop<F>(&mut self, less: F) -> Option<Entry<H>>
    where
        F: Fn(&Entry<H>, &Entry<H>) -> bool,
    {
        if self.heap.is_empty() {
            return None;
        }
        let entry = self.heap.swap_remove(0);
        if !self.heap.is_empty() {
            self.sift_down(0, &less);
        }
        Some(entry)
    }

    fn sift_up<F>(&mut self, mut pos: usize, less: &F)
    where
        F: Fn(&Entry<H>, &Entry<H>) -> bool,
    {
        while pos > 0 {
            let parent = (pos - 1) / 2;
            if !less(&self.heap[pos], &self.heap[parent]) {
                break;
            }
            self.heap.swap(pos, parent);
            pos = parent;
        }
    }

    fn sift_down<F>(&mut self, mut pos: usize, less: &F)
    where
        F: Fn(&Entry<H>, &Entry<H>) -> bool,
    {
        let len = self.heap.len();
        loop {
            let left = 2 * pos + 1;
            if left >= len {
                break;
            }
            let right = left + 1;
            let child = if right < len && less(&self.heap[right], &self.heap[left]) {
                right
            } else {
                left
            };
            if !less(&self.heap[child], &self.heap[pos]) {
                break;
            }
            self.heap.swap(pos, child);
            pos = child;
        }
    }
}
