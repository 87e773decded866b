//! Collaborator interfaces the controller drives.
//!
//! Views never hold a reference to the controller. They report intents to
//! whoever owns the controller, and receive already-derived values here.

use std::rc::Rc;

use crate::error::FetchError;
use crate::path::{Address, SortKey};
use crate::resource::{Listing, Resource};
use crate::route::FetchRequest;

// =============================================================================
// Fetching and History
// =============================================================================

/// Identifies one issued fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FetchTicket(pub u64);

/// Result delivered back to the controller for a ticket.
pub type FetchOutcome = Result<Listing, FetchError>;

/// Issues listing requests. Completion is reported back through
/// `NavigationController::fetch_completed` with the same ticket.
pub trait ResourceFetcher {
    fn fetch(&mut self, ticket: FetchTicket, request: FetchRequest);
    fn abort(&mut self, ticket: FetchTicket);
}

/// Records controller-initiated navigations in the browser history.
pub trait HistorySink {
    fn record(&mut self, location: &Address, replacing: bool);
}

/// Wall clock in milliseconds.
pub trait Clock {
    fn now_ms(&self) -> f64;
}

// =============================================================================
// List
// =============================================================================

pub trait ListView {
    /// Show the loading placeholder.
    fn reset(&mut self);
    fn update(&mut self, resources: Rc<[Resource]>);
    fn reset_scroll(&mut self);
    fn set_error_message(&mut self, text: &str);
    fn dump_scroll_state(&self) -> f64;
    fn restore_scroll_state(&mut self, offset: f64);
    /// Scroll to and flash the entry at `index`.
    fn scroll_to(&mut self, index: usize);
    fn activate_thumbnails(&mut self);
    fn deactivate_partial_thumbnails(&mut self);
}

// =============================================================================
// Header and Menu
// =============================================================================

pub trait NaviView {
    fn update_title(&mut self, name: &str, suffix: &str);
    fn update_back_link(&mut self, link: &Address);
    fn update_sort_key_link(&mut self, key: SortKey, link: &Address);
    fn update_filter_text(&mut self, text: &str);
    fn update_tag_list_path(&mut self, path: Option<&str>);
    fn close_menu(&mut self);
    fn menu_expanded(&self) -> bool;
}

// =============================================================================
// Pager
// =============================================================================

/// Horizontal placement of the slot container.
///
/// Rendered as `translateX((k + page_shift) * -100%) translateX(offset_px)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SlideFrame {
    pub page_shift: isize,
    pub offset_px: f64,
    pub animated: bool,
}

/// Content of one page slot.
#[derive(Debug, Clone, PartialEq)]
pub enum SlotRender {
    /// Bound to a page outside the file set.
    Blank,
    Page(PageRender),
}

#[derive(Debug, Clone, PartialEq)]
pub struct PageRender {
    pub page: usize,
    pub name: String,
    pub size_text: String,
    pub download_url: Option<String>,
    /// Image source to load; `None` keeps the image cleared.
    pub source: Option<String>,
    /// Within the eager band around the current page.
    pub visible: bool,
    /// Quarter turns applied to the image.
    pub turns: u32,
    /// Whether rotation changes animate.
    pub animated: bool,
}

impl PageRender {
    pub fn rotation_deg(&self) -> u32 {
        self.turns * 90
    }

    /// Odd turn counts swap the image orientation.
    pub fn landscape(&self) -> bool {
        self.turns % 2 == 1
    }
}

pub trait PagerSurface {
    /// Physical slot ids, first to last, in display order.
    fn arrange(&mut self, order: &[usize]);
    fn render_slot(&mut self, slot: usize, render: &SlotRender);
    /// Ask for one `on_animation_frame` callback.
    fn request_frame(&mut self);
    fn apply_slide(&mut self, frame: SlideFrame);
    fn set_active(&mut self, active: bool);
    fn set_toolbox_visible(&mut self, visible: bool);
    /// Ask for an `on_toolbox_timer` callback after `delay_ms`.
    fn schedule_toolbox_check(&mut self, delay_ms: f64);
    fn set_back_link(&mut self, link: &Address);
}

// =============================================================================
// Tagger
// =============================================================================

/// One main-tag button for the current path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagButton {
    pub id: String,
    pub name: String,
    pub tagged: bool,
}

pub trait TagView {
    /// `path` is the resource being tagged, `None` when nothing is taggable.
    fn update_buttons(&mut self, path: Option<&str>, buttons: &[TagButton]);
    fn open_dialog(&mut self, path: &str);
}
