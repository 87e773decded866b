//! Core configuration.
//!
//! Centralizes the constants shared by the navigation controller, the paging
//! window and the resource routes.

// =============================================================================
// Address Query Keys
// =============================================================================

/// Query key holding the page index.
pub const PAGE_KEY: &str = "p";

/// Query key holding the sort key.
pub const SORT_KEY: &str = "s";

/// Query key holding the filter text.
pub const FILTER_KEY: &str = "f";

// =============================================================================
// Resource Routes
// =============================================================================

/// Address prefix of directory listings.
pub const VIEW_PREFIX: &str = "/view";

/// Address prefix of bookmark listings.
pub const BOOKMARK_PREFIX: &str = "/bookmark";

/// Metadata endpoint for a single directory.
pub const DIRECTORY_ENDPOINT: &str = "/meta/directory";

/// Metadata endpoint for a batch of paths.
pub const BATCH_ENDPOINT: &str = "/meta/batch";

// =============================================================================
// Bookmark Storage
// =============================================================================

/// Storage key prefix of a bookmark record (`bookmark:<tag>:<path>`).
pub const BOOKMARK_RECORD_KIND: &str = "bookmark";

/// Storage key prefix of a tag record (`tag:<tag>`).
pub const TAG_RECORD_KIND: &str = "tag";

// =============================================================================
// Paging Window
// =============================================================================

/// Number of pages kept on each side of the current one (`k`).
pub const EXTRA_PAGES: usize = 2;

/// Slots within this distance of the current page are loaded eagerly.
pub const EAGER_BAND: usize = 1;

/// Horizontal swipe threshold as a fraction of the viewport width.
pub const SWIPE_THRESHOLD_RATIO: f64 = 0.1;

/// Tap threshold as a fraction of the viewport's shorter dimension.
pub const TAP_THRESHOLD_RATIO: f64 = 0.05;

/// Toolbox auto-hide delay in milliseconds.
pub const TOOLBOX_TIMEOUT_MS: f64 = 5000.0;

/// Tunables of the paging window.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PagerConfig {
    /// Half-width `k` of the window; the ring holds `2k + 1` slots.
    pub extra_pages: usize,
    /// Distance from the current page that is loaded eagerly.
    pub eager_band: usize,
    pub swipe_ratio: f64,
    pub tap_ratio: f64,
    pub toolbox_timeout_ms: f64,
}

impl PagerConfig {
    /// Number of slots in the ring.
    pub fn slot_count(&self) -> usize {
        self.extra_pages * 2 + 1
    }
}

impl Default for PagerConfig {
    fn default() -> Self {
        Self {
            extra_pages: EXTRA_PAGES,
            eager_band: EAGER_BAND,
            swipe_ratio: SWIPE_THRESHOLD_RATIO,
            tap_ratio: TAP_THRESHOLD_RATIO,
            toolbox_timeout_ms: TOOLBOX_TIMEOUT_MS,
        }
    }
}
