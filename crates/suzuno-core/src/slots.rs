//! A fixed-capacity ring binding logical window positions to physical slots.

use std::iter::FusedIterator;

// ============================================================================
// SlotRing
// ============================================================================

/// A full circular buffer whose rotation moves the head, never the contents.
///
/// Logical index 0 is the front (the leftmost page of the window). Rotating
/// forward moves the front element to the back, exactly like detaching the
/// first child of a container and appending it again.
#[derive(Clone)]
pub struct SlotRing<T> {
    data: Vec<T>,
    head: usize,
}

impl<T> SlotRing<T> {
    /// Creates a ring holding `items` in order.
    ///
    /// # Panics
    ///
    /// Panics if `items` is empty.
    pub fn new(items: Vec<T>) -> Self {
        assert!(!items.is_empty(), "SlotRing capacity must be greater than 0");
        Self {
            data: items,
            head: 0,
        }
    }

    /// Move the front element to the back. O(1).
    #[cfg(test)]
    pub fn rotate_forward(&mut self) {
        self.head = (self.head + 1) % self.data.len();
    }

    /// Move the back element to the front. O(1).
    #[cfg(test)]
    pub fn rotate_backward(&mut self) {
        self.head = (self.head + self.data.len() - 1) % self.data.len();
    }

    /// Rotate by a signed number of steps; positive rotates forward.
    pub fn rotate_by(&mut self, steps: isize) {
        let len = self.data.len() as isize;
        self.head = (self.head as isize + steps).rem_euclid(len) as usize;
    }

    #[inline]
    pub fn get(&self, index: usize) -> Option<&T> {
        if index >= self.data.len() {
            return None;
        }
        self.data.get((self.head + index) % self.data.len())
    }

    #[inline]
    pub fn get_mut(&mut self, index: usize) -> Option<&mut T> {
        if index >= self.data.len() {
            return None;
        }
        let len = self.data.len();
        self.data.get_mut((self.head + index) % len)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Iterate from front to back.
    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            ring: self,
            front: 0,
            back: self.data.len(),
        }
    }

    /// Iterate mutably in storage order, paired with the logical index.
    pub fn iter_mut_logical(&mut self) -> impl Iterator<Item = (usize, &mut T)> {
        let len = self.data.len();
        let head = self.head;
        self.data
            .iter_mut()
            .enumerate()
            .map(move |(physical, item)| ((physical + len - head) % len, item))
    }
}

impl<T: std::fmt::Debug> std::fmt::Debug for SlotRing<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SlotRing")
            .field("head", &self.head)
            .field("elements", &self.iter().collect::<Vec<_>>())
            .finish()
    }
}

// ============================================================================
// Iterator Implementation
// ============================================================================

pub struct Iter<'a, T> {
    ring: &'a SlotRing<T>,
    front: usize,
    back: usize,
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        if self.front >= self.back {
            return None;
        }
        let item = self.ring.get(self.front);
        self.front += 1;
        item
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.back.saturating_sub(self.front);
        (remaining, Some(remaining))
    }
}

impl<T> DoubleEndedIterator for Iter<'_, T> {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.front >= self.back {
            return None;
        }
        self.back -= 1;
        self.ring.get(self.back)
    }
}

impl<T> ExactSizeIterator for Iter<'_, T> {}
impl<T> FusedIterator for Iter<'_, T> {}

impl<'a, T> IntoIterator for &'a SlotRing<T> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn ring() -> SlotRing<usize> {
        SlotRing::new(vec![0, 1, 2, 3, 4])
    }

    #[test]
    #[should_panic(expected = "capacity must be greater than 0")]
    fn test_empty_ring_panics() {
        let _: SlotRing<i32> = SlotRing::new(Vec::new());
    }

    #[test]
    fn test_rotate_forward_moves_front_to_back() {
        let mut r = ring();
        r.rotate_forward();
        assert_eq!(r.iter().copied().collect::<Vec<_>>(), vec![1, 2, 3, 4, 0]);
        assert_eq!(r.len(), 5);
    }

    #[test]
    fn test_rotate_backward_moves_back_to_front() {
        let mut r = ring();
        r.rotate_backward();
        assert_eq!(r.iter().copied().collect::<Vec<_>>(), vec![4, 0, 1, 2, 3]);
    }

    #[test]
    fn test_rotate_by_wraps() {
        let mut r = ring();
        r.rotate_by(7);
        assert_eq!(r.get(0), Some(&2));
        r.rotate_by(-9);
        assert_eq!(r.get(0), Some(&3));
        assert_eq!(r.get(5), None);
    }

    #[test]
    fn test_iter_reverse() {
        let mut r = ring();
        r.rotate_forward();
        let back: Vec<_> = r.iter().rev().copied().collect();
        assert_eq!(back, vec![0, 4, 3, 2, 1]);
    }

    #[test]
    fn test_iter_mut_logical_reports_positions() {
        let mut r = ring();
        r.rotate_by(2);
        for (logical, item) in r.iter_mut_logical() {
            *item = logical * 10;
        }
        assert_eq!(r.iter().copied().collect::<Vec<_>>(), vec![0, 10, 20, 30, 40]);
    }

    #[test]
    fn test_get_mut() {
        let mut r = ring();
        r.rotate_forward();
        if let Some(front) = r.get_mut(0) {
            *front = 9;
        }
        assert_eq!(r.get(0), Some(&9));
        assert_eq!(r.get(4), Some(&0));
    }
}
