use constants::loading_screen::LOG_CAPACITY;

/// Circular buffer keeping the most recent `N` entries.
///
/// Pushing into a full log overwrites the oldest entry in O(1).
#[derive(Debug, Clone)]
pub struct EventLog<const N: usize> {
    slots: [Option<String>; N],
    head: usize,
    len: usize,
}

/// Log sized for the boot screen.
pub type LoadLog = EventLog<LOG_CAPACITY>;

impl<const N: usize> Default for EventLog<N> {
    fn default() -> Self {
        Self {
            slots: std::array::from_fn(|_| None),
            head: 0,
            len: 0,
        }
    }
}

impl<const N: usize> EventLog<N> {
    pub fn new() -> Self {
        Self::default()
    }

    pub const fn capacity(&self) -> usize {
        N
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Append `entry`, returning the evicted oldest entry when full.
    pub fn push(&mut self, entry: String) -> Option<String> {
        if N == 0 {
            return Some(entry);
        }

        if self.len < N {
            let tail = (self.head + self.len) % N;
            self.slots[tail] = Some(entry);
            self.len += 1;
            None
        } else {
            let evicted = self.slots[self.head].replace(entry);
            self.head = (self.head + 1) % N;
            evicted
        }
    }

    /// Entries oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &str> + '_ {
        (0..self.len).filter_map(move |i| self.slots[(self.head + i) % N].as_deref())
    }
}
