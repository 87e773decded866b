//! Paging window: `2k + 1` page slots bound around the current page.
//!
//! Nearby page changes rotate the slot ring so already rendered slots stay
//! in place, then slide the container back to neutral in two frames. Distant
//! changes snap to neutral and redraw everything.

use std::collections::HashMap;
use std::rc::Rc;

use log::debug;

use crate::config::PagerConfig;
use crate::format::format_size;
use crate::frame::{FrameRequest, FrameScheduler};
use crate::gesture::GestureEvent;
use crate::path::Address;
use crate::resource::ResourceEntry;
use crate::slots::SlotRing;
use crate::view::{Clock, PageRender, PagerSurface, SlideFrame, SlotRender};

/// Physical slot state. The ring maps logical positions onto these.
#[derive(Debug, Clone, Copy)]
struct Slot {
    id: usize,
    /// Page the slot's image was granted a source for.
    granted: Option<usize>,
    /// The granted image finished loading or failed.
    settled: bool,
}

impl Slot {
    fn revoke(&mut self) {
        self.granted = None;
        self.settled = false;
    }
}

pub struct PagingWindow {
    config: PagerConfig,
    surface: Box<dyn PagerSurface>,
    clock: Rc<dyn Clock>,
    slots: SlotRing<Slot>,
    frames: FrameScheduler<SlideFrame>,
    files: Vec<Rc<ResourceEntry>>,
    current: Option<usize>,
    offset_px: f64,
    active: bool,
    initial_loading: bool,
    toolbox_activated_at: Option<f64>,
    turns: HashMap<usize, u32>,
}

impl PagingWindow {
    pub fn new(config: PagerConfig, surface: Box<dyn PagerSurface>, clock: Rc<dyn Clock>) -> Self {
        let slots = (0..config.slot_count())
            .map(|id| Slot {
                id,
                granted: None,
                settled: false,
            })
            .collect();

        let mut pager = Self {
            config,
            surface,
            clock,
            slots: SlotRing::new(slots),
            frames: FrameScheduler::new(),
            files: Vec::new(),
            current: None,
            offset_px: 0.0,
            active: false,
            initial_loading: false,
            toolbox_activated_at: None,
            turns: HashMap::new(),
        };
        pager.arrange();
        pager.snap_to_base();
        pager.redraw();
        pager
    }

    // =========================================================================
    // Queries
    // =========================================================================

    pub fn current_page(&self) -> Option<usize> {
        self.current
    }

    pub fn file_count(&self) -> usize {
        self.files.len()
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn is_toolbox_visible(&self) -> bool {
        self.toolbox_activated_at.is_some()
    }

    /// Page bound to logical `position` (`0..2k+1`), possibly past the last
    /// file. `None` before the first page.
    pub fn bound_index(&self, position: usize) -> Option<usize> {
        self.current?
            .checked_add(position)?
            .checked_sub(self.config.extra_pages)
    }

    /// Quarter turns recorded for `page`.
    pub fn turns_of(&self, page: usize) -> u32 {
        self.turns.get(&page).copied().unwrap_or(0)
    }

    // =========================================================================
    // Lifecycle
    // =========================================================================

    /// Replace the file set. The rotation log is cleared and the current page
    /// forgotten, so the next page change redraws from scratch.
    pub fn update(&mut self, files: Vec<Rc<ResourceEntry>>) {
        self.files = files;
        self.turns.clear();
        self.current = None;
        for (_, slot) in self.slots.iter_mut_logical() {
            slot.revoke();
        }
        self.redraw();
    }

    pub fn activate(&mut self) {
        if self.active {
            return;
        }
        self.active = true;
        self.initial_loading = true;
        self.surface.set_active(true);
        self.redraw();
    }

    pub fn deactivate(&mut self) {
        if !self.active {
            return;
        }
        self.active = false;
        self.surface.set_active(false);
        self.redraw();
    }

    pub fn update_back_link(&mut self, link: &Address) {
        self.surface.set_back_link(link);
    }

    // =========================================================================
    // Page Changes
    // =========================================================================

    pub fn change_page(&mut self, page: usize) {
        let moved = self.current.is_some_and(|current| current != page);
        let diff = self.current.and_then(|current| page_distance(current, page));
        self.current = Some(page);

        if self.active && moved {
            self.initial_loading = false;
        }

        match diff {
            Some(diff) if diff.unsigned_abs() <= self.config.extra_pages => {
                debug!("pager: near transition to {page} ({diff:+})");
                self.slots.rotate_by(diff);
                self.arrange();
                if self.active {
                    self.slide(self.offset_px, -diff, false, false);
                    self.slide(0.0, 0, true, true);
                } else {
                    self.snap_to_base();
                }
            }
            _ => {
                debug!("pager: far transition to {page}");
                self.snap_to_base();
            }
        }

        self.redraw();
    }

    /// Add a quarter turn to the current page.
    pub fn rotate_current(&mut self) {
        let Some(page) = self.current else {
            return;
        };
        *self.turns.entry(page).or_default() += 1;
        self.redraw();
    }

    /// A slot's image finished loading or failed.
    pub fn on_image_settled(&mut self, slot_id: usize) {
        let k = self.config.extra_pages;
        let mut is_current = false;
        for (position, slot) in self.slots.iter_mut_logical() {
            if slot.id == slot_id && slot.granted.is_some() {
                slot.settled = true;
                is_current = position == k;
            }
        }
        if is_current && self.initial_loading {
            self.initial_loading = false;
            self.redraw();
        }
    }

    /// Interpret a gesture over the pager.
    ///
    /// Returns the page the user asked to move to; the window itself does not
    /// change page until `change_page` is called.
    pub fn handle_gesture(&mut self, event: GestureEvent) -> Option<usize> {
        match event {
            GestureEvent::Started => None,
            GestureEvent::Moved { dx, .. } => {
                self.slide(dx, 0, false, false);
                None
            }
            GestureEvent::Swiped(direction) => {
                let next = self
                    .current
                    .and_then(|current| current.checked_add_signed(direction.page_delta()))
                    .filter(|next| *next < self.files.len() && Some(*next) != self.current);
                if next.is_none() {
                    self.slide_to_base_animated();
                }
                next
            }
            GestureEvent::Tapped => {
                self.slide_to_base_animated();
                self.toggle_toolbox();
                None
            }
            GestureEvent::Canceled => {
                self.slide_to_base_animated();
                None
            }
        }
    }

    // =========================================================================
    // Frames
    // =========================================================================

    /// Apply the next queued slide.
    pub fn on_animation_frame(&mut self) {
        if let Some(frame) = self.frames.take() {
            self.surface.apply_slide(frame);
        }
        if !self.frames.is_idle() {
            self.surface.request_frame();
        }
    }

    fn slide(&mut self, offset_px: f64, page_shift: isize, animated: bool, queued: bool) {
        self.offset_px = offset_px;
        let frame = SlideFrame {
            page_shift,
            offset_px,
            animated,
        };
        let request = if queued {
            self.frames.push_after(frame)
        } else {
            self.frames.push(frame)
        };
        if request == FrameRequest::Schedule {
            self.surface.request_frame();
        }
    }

    fn snap_to_base(&mut self) {
        self.slide(0.0, 0, false, false);
    }

    fn slide_to_base_animated(&mut self) {
        self.slide(0.0, 0, true, false);
    }

    // =========================================================================
    // Toolbox
    // =========================================================================

    pub fn show_toolbox(&mut self) {
        self.toolbox_activated_at = Some(self.clock.now_ms());
        self.surface.set_toolbox_visible(true);
        self.surface
            .schedule_toolbox_check(self.config.toolbox_timeout_ms);
    }

    pub fn hide_toolbox(&mut self) {
        self.toolbox_activated_at = None;
        self.surface.set_toolbox_visible(false);
    }

    pub fn toggle_toolbox(&mut self) {
        if self.toolbox_activated_at.is_some() {
            self.hide_toolbox();
        } else {
            self.show_toolbox();
        }
    }

    /// Hide the toolbox if it has been idle for the whole timeout.
    pub fn on_toolbox_timer(&mut self) {
        let Some(activated_at) = self.toolbox_activated_at else {
            return;
        };
        if activated_at + self.config.toolbox_timeout_ms > self.clock.now_ms() {
            return;
        }
        self.hide_toolbox();
    }

    // =========================================================================
    // Rendering
    // =========================================================================

    fn arrange(&mut self) {
        let order: Vec<usize> = self.slots.iter().map(|slot| slot.id).collect();
        self.surface.arrange(&order);
    }

    fn redraw(&mut self) {
        let k = self.config.extra_pages;

        self.redraw_position(k, self.active);
        let current_settled = self
            .slots
            .get(k)
            .is_some_and(|slot| slot.settled && slot.granted.is_some());
        let neighbors_may_load = self.active && (!self.initial_loading || current_settled);

        for position in (0..self.slots.len()).filter(|p| *p != k) {
            let in_band = position.abs_diff(k) <= self.config.eager_band;
            self.redraw_position(position, in_band && neighbors_may_load);
        }
    }

    fn redraw_position(&mut self, position: usize, eligible: bool) {
        let k = self.config.extra_pages;
        let page = self
            .bound_index(position)
            .filter(|page| *page < self.files.len());

        let Some(slot) = self.slots.get_mut(position) else {
            return;
        };
        let id = slot.id;

        let render = match page {
            None => {
                slot.revoke();
                SlotRender::Blank
            }
            Some(page) => {
                if slot.granted != Some(page) {
                    slot.revoke();
                    if eligible {
                        slot.granted = Some(page);
                    }
                }
                let granted = slot.granted.is_some();
                let entry = &self.files[page];
                let turns = self.turns.get(&page).copied().unwrap_or(0);
                SlotRender::Page(PageRender {
                    page,
                    name: entry.name.clone(),
                    size_text: format_size(entry.size),
                    download_url: entry.file_url.clone(),
                    source: entry.file_url.clone().filter(|_| granted),
                    visible: position.abs_diff(k) <= self.config.eager_band,
                    turns,
                    animated: self.active,
                })
            }
        };

        self.surface.render_slot(id, &render);
    }
}

/// Signed distance from `from` to `to`, `None` when it does not fit `isize`.
fn page_distance(from: usize, to: usize) -> Option<isize> {
    if to >= from {
        isize::try_from(to - from).ok()
    } else {
        isize::try_from(from - to).ok().map(|d| -d)
    }
}
