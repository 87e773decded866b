//! Drag, swipe and tap interpretation for the pager.
//!
//! Pointer events arrive already normalized to `(id, x, y)`. Only the first
//! pointer of a gesture counts; a second pointer going down cancels it.

use crate::config::PagerConfig;

pub type PointerId = i64;

/// Page direction requested by a swipe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwipeDirection {
    /// Dragged right: the previous page.
    Backward,
    /// Dragged left: the next page.
    Forward,
}

impl SwipeDirection {
    /// Signed page delta of this direction.
    pub fn page_delta(self) -> isize {
        match self {
            Self::Backward => -1,
            Self::Forward => 1,
        }
    }
}

/// What a pointer event meant.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GestureEvent {
    Started,
    /// Displacement from the start point.
    Moved { dx: f64, dy: f64 },
    Swiped(SwipeDirection),
    Tapped,
    Canceled,
}

/// Dimensions the thresholds are relative to.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

#[derive(Debug, Clone, Copy)]
struct Track {
    id: PointerId,
    start_x: f64,
    start_y: f64,
    x: f64,
    y: f64,
    max_dx: f64,
    max_dy: f64,
}

/// Tracks at most one effective pointer at a time.
#[derive(Debug, Clone)]
pub struct GestureTracker {
    pointers: usize,
    effective: Option<Track>,
    swipe_ratio: f64,
    tap_ratio: f64,
}

impl GestureTracker {
    pub fn new(config: &PagerConfig) -> Self {
        Self {
            pointers: 0,
            effective: None,
            swipe_ratio: config.swipe_ratio,
            tap_ratio: config.tap_ratio,
        }
    }

    pub fn start(&mut self, id: PointerId, x: f64, y: f64) -> Option<GestureEvent> {
        self.pointers += 1;

        if self.pointers == 1 {
            self.effective = Some(Track {
                id,
                start_x: x,
                start_y: y,
                x,
                y,
                max_dx: 0.0,
                max_dy: 0.0,
            });
            return Some(GestureEvent::Started);
        }

        self.effective.take().map(|_| GestureEvent::Canceled)
    }

    pub fn move_to(&mut self, id: PointerId, x: f64, y: f64) -> Option<GestureEvent> {
        let track = self.effective.as_mut().filter(|t| t.id == id)?;

        track.x = x;
        track.y = y;
        let dx = x - track.start_x;
        let dy = y - track.start_y;
        track.max_dx = track.max_dx.max(dx.abs());
        track.max_dy = track.max_dy.max(dy.abs());

        Some(GestureEvent::Moved { dx, dy })
    }

    /// Pointer released. The largest deviation seen during the gesture
    /// decides a tap before the final horizontal delta is considered.
    pub fn end(&mut self, id: PointerId, viewport: Viewport) -> Option<GestureEvent> {
        self.pointers = self.pointers.saturating_sub(1);
        let track = self.take_effective(id)?;

        let dx = track.x - track.start_x;
        let deviation = track.max_dx.hypot(track.max_dy);
        let tap_limit = viewport.width.min(viewport.height) * self.tap_ratio;
        let swipe_limit = viewport.width * self.swipe_ratio;

        let event = if deviation < tap_limit {
            GestureEvent::Tapped
        } else if dx.abs() > swipe_limit {
            GestureEvent::Swiped(if dx > 0.0 {
                SwipeDirection::Backward
            } else {
                SwipeDirection::Forward
            })
        } else {
            GestureEvent::Canceled
        };
        Some(event)
    }

    /// The host aborted the pointer.
    pub fn cancel(&mut self, id: PointerId) -> Option<GestureEvent> {
        self.pointers = self.pointers.saturating_sub(1);
        self.take_effective(id).map(|_| GestureEvent::Canceled)
    }

    #[cfg(test)]
    pub fn is_tracking(&self) -> bool {
        self.effective.is_some()
    }

    fn take_effective(&mut self, id: PointerId) -> Option<Track> {
        if self.effective.is_some_and(|t| t.id == id) {
            self.effective.take()
        } else {
            None
        }
    }
}
