//! A fixed-capacity trailing window.
//!
//! [`TrailingWindow`] keeps the last `N` items pushed into it and forgets older ones. Storage
//! is an inline array plus a head index, so pushing never allocates and the window can live on
//! the stack of a scan loop.
//!
//! # Example
//!
//! ```rust
//! use privscope::utils::TrailingWindow;
//!
//! let mut window: TrailingWindow<u32, 3> = TrailingWindow::new();
//! for value in 1..=5 {
//!     window.push(value);
//! }
//!
//! assert_eq!(window.len(), 3);
//! assert_eq!(window.iter().copied().collect::<Vec<_>>(), vec![3, 4, 5]);
//! ```

/// Ring buffer over the most recent `N` items, iterated oldest first.
#[derive(Debug, Clone)]
pub struct TrailingWindow<T: Copy, const N: usize> {
    slots: [Option<T>; N],
    /// Slot the next push writes to. Once full, this is also the oldest item.
    head: usize,
    len: usize,
}

impl<T: Copy, const N: usize> TrailingWindow<T, N> {
    const NON_EMPTY: () = assert!(N > 0, "a trailing window needs a capacity of at least 1");

    /// Creates an empty window.
    #[must_use]
    pub fn new() -> Self {
        #[allow(clippy::let_unit_value)]
        let () = Self::NON_EMPTY;

        TrailingWindow {
            slots: [None; N],
            head: 0,
            len: 0,
        }
    }

    /// Appends an item, returning the evicted oldest item if the window was full.
    pub fn push(&mut self, item: T) -> Option<T> {
        let evicted = self.slots[self.head].replace(item);
        self.head = (self.head + 1) % N;
        if self.len < N {
            self.len += 1;
        }

        evicted
    }

    /// Number of items currently held, never more than `N`.
    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if nothing has been pushed since creation or the last [`Self::clear`].
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns `true` if the next push evicts an item.
    #[must_use]
    pub fn is_full(&self) -> bool {
        self.len == N
    }

    /// Maximum number of items the window retains.
    #[must_use]
    pub const fn capacity(&self) -> usize {
        N
    }

    /// The most recently pushed item.
    #[must_use]
    pub fn newest(&self) -> Option<&T> {
        if self.len == 0 {
            return None;
        }

        self.slots[(self.head + N - 1) % N].as_ref()
    }

    /// The oldest retained item.
    #[must_use]
    pub fn oldest(&self) -> Option<&T> {
        self.iter().next()
    }

    /// Iterates the retained items in push order, oldest first.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &T> + '_ {
        let start = (self.head + N - self.len) % N;
        (0..self.len).filter_map(move |i| self.slots[(start + i) % N].as_ref())
    }

    /// Copies the retained items into a vector, oldest first.
    #[must_use]
    pub fn to_vec(&self) -> Vec<T> {
        self.iter().copied().collect()
    }

    /// Drops every item.
    pub fn clear(&mut self) {
        self.slots = [None; N];
        self.head = 0;
        self.len = 0;
    }
}

impl<T: Copy, const N: usize> Default for TrailingWindow<T, N> {
    fn default() -> Self {
        Self::new()
    }
}
