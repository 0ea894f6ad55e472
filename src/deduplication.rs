use crate::types::EventId;
use std::collections::HashSet;

pub const DEFAULT_CAPACITY: usize = 1000;

/// Bounded memory of event ids that already produced an alert.
///
/// Once an insert pushes the window past its capacity the whole window is
/// forgotten, not just the oldest entry. An id alerted just before a reset
/// can therefore alert again if the stream delivers it a second time.
#[derive(Debug, Clone)]
pub struct DedupWindow {
    order: Vec<EventId>,
    seen: HashSet<EventId>,
    capacity: usize,
}

impl DedupWindow {
    pub fn new(capacity: usize) -> Self {
        Self {
            order: Vec::new(),
            seen: HashSet::new(),
            capacity,
        }
    }

    pub fn contains(&self, id: EventId) -> bool {
        self.seen.contains(&id)
    }

    pub fn add(&mut self, id: EventId) {
        if self.seen.insert(id) {
            self.order.push(id);
        }

        if self.order.len() > self.capacity {
            self.order.clear();
            self.seen.clear();
        }
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Ids in the order they were added.
    pub fn iter(&self) -> impl Iterator<Item = &EventId> {
        self.order.iter()
    }
}

impl Default for DedupWindow {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repeated_add_does_not_grow() {
        let mut window = DedupWindow::new(3);
        window.add(7);
        window.add(7);
        assert_eq!(window.len(), 1);
        assert!(window.contains(7));
    }

    #[test]
    fn preserves_insertion_order() {
        let mut window = DedupWindow::new(10);
        for id in [5, 1, 9] {
            window.add(id);
        }
        assert_eq!(window.iter().copied().collect::<Vec<_>>(), vec![5, 1, 9]);
    }

    #[test]
    fn clears_everything_past_capacity() {
        let mut window = DedupWindow::new(2);
        window.add(1);
        window.add(2);
        assert_eq!(window.len(), 2);

        window.add(3);
        assert!(window.is_empty());
        assert!(!window.contains(1));
        assert!(!window.contains(3));
    }
}
