//! Coalescing queue of visual updates, drained one per rendering opportunity.
//!
//! The scheduler never talks to the host itself: enqueueing returns a
//! [`FrameRequest`] telling the caller whether a frame must be requested, and
//! the host calls [`FrameScheduler::take`] once per frame.

use std::collections::VecDeque;

/// Whether the caller must ask the host for a rendering opportunity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use]
pub enum FrameRequest {
    /// The queue went from empty to non-empty.
    Schedule,
    /// A frame is already pending.
    Pending,
}

#[derive(Debug, Clone)]
pub struct FrameScheduler<T> {
    queue: VecDeque<T>,
}

impl<T> FrameScheduler<T> {
    pub fn new() -> Self {
        Self {
            queue: VecDeque::new(),
        }
    }

    /// Enqueue `payload`, dropping a queued payload that has not been applied.
    pub fn push(&mut self, payload: T) -> FrameRequest {
        let was_empty = self.queue.is_empty();
        if !was_empty {
            self.queue.pop_back();
        }
        self.queue.push_back(payload);
        Self::request(was_empty)
    }

    /// Enqueue `payload` after every queued payload; each lands on its own frame.
    pub fn push_after(&mut self, payload: T) -> FrameRequest {
        let was_empty = self.queue.is_empty();
        self.queue.push_back(payload);
        Self::request(was_empty)
    }

    /// Payload to apply on this frame.
    pub fn take(&mut self) -> Option<T> {
        self.queue.pop_front()
    }

    /// Whether no further frame is needed.
    pub fn is_idle(&self) -> bool {
        self.queue.is_empty()
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    fn request(was_empty: bool) -> FrameRequest {
        if was_empty {
            FrameRequest::Schedule
        } else {
            FrameRequest::Pending
        }
    }
}

impl<T> Default for FrameScheduler<T> {
    fn default() -> Self {
        Self::new()
    }
}
