//! Navigation controller: the address is the single source of truth.
//!
//! Every address change and every fetch completion goes through [`reduce`],
//! a pure function from the previous [`NavigationState`] to the next one.
//! The controller then pushes the derived values into its collaborators in a
//! fixed order:
//!
//! 1. listing change: reset the list and issue the single fetch
//! 2. reprocessed resources: list and pager contents
//! 3. scroll history and highlight
//! 4. list or pager mode
//! 5. header text and links, tagger

use std::collections::{HashMap, VecDeque};
use std::rc::Rc;

use log::{debug, warn};

use crate::bookmark::BookmarkList;
use crate::error::FetchError;
use crate::gesture::GestureEvent;
use crate::pager::PagingWindow;
use crate::path::{
    Address, SortKey, canonical_listing, filtered_address, get_filter_text, get_page,
    get_sort_key, is_parent, is_parent_list, list_address, page_address, parent_address,
    same_address, sorted_address,
};
use crate::resource::{Listing, Resource, ResourceEntry, process};
use crate::route::{FetchPlan, apply_link_segments, plan_fetch, resource_title};
use crate::tagger::Tagger;
use crate::view::{FetchOutcome, FetchTicket, HistorySink, ListView, NaviView, ResourceFetcher};

// =============================================================================
// State
// =============================================================================

/// Immutable snapshot of what is being shown.
///
/// `resources` and `processed` are both `None` while the listing loads.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct NavigationState {
    pub location: Option<Address>,
    pub resources: Option<Rc<[Rc<ResourceEntry>]>>,
    pub processed: Option<Rc<[Resource]>>,
    pub highlighted: Option<Address>,
}

/// Input of one reconciliation.
#[derive(Clone, Debug, PartialEq)]
pub enum NavEvent {
    AddressChanged(Address),
    /// A listing arrived for `location`.
    ResourcesLoaded {
        location: Address,
        resources: Rc<[Rc<ResourceEntry>]>,
    },
}

/// Next state plus the facts the controller acts on.
#[derive(Clone, Debug, PartialEq)]
pub struct Transition {
    pub state: NavigationState,
    /// The canonical listing differs from the previous one.
    pub listing_changed: bool,
    /// `processed` was recomputed.
    pub reprocessed: bool,
    /// Previous address, when the new address is one of its children.
    pub descended_from: Option<Address>,
}

/// Pure reconciliation step. `None` means the event is stale and must not
/// touch anything.
pub fn reduce(prev: &NavigationState, event: &NavEvent) -> Option<Transition> {
    let mut next = prev.clone();
    let mut location_updated = false;
    let mut resources_updated = false;

    match event {
        NavEvent::AddressChanged(location) => {
            next.location = Some(location.clone());
            location_updated = true;
        }
        NavEvent::ResourcesLoaded {
            location,
            resources,
        } => {
            let current = next.location.as_ref()?;
            if !same_address(&canonical_listing(current), &canonical_listing(location)) {
                return None;
            }
            next.resources = Some(resources.clone());
            next.processed = None;
            resources_updated = true;
        }
    }

    let location = next.location.clone()?;
    let current_listing = canonical_listing(&location);
    let prev_location = prev.location.as_ref();

    let listing_changed = prev_location
        .map(canonical_listing)
        .is_none_or(|prev_listing| !same_address(&prev_listing, &current_listing));
    if listing_changed {
        next.resources = None;
        next.processed = None;
    }

    let sort_key = get_sort_key(&location);
    let filter = get_filter_text(&location);
    let query_changed = prev_location.and_then(get_sort_key) != sort_key
        || prev_location.and_then(get_filter_text) != filter;

    let reprocess = resources_updated || (next.resources.is_some() && query_changed);
    let mut reprocessed = false;
    if reprocess {
        if let Some(resources) = &next.resources {
            let processed = process(resources, sort_key, filter.as_deref(), &location);
            next.processed = Some(processed.into());
            reprocessed = true;
        }
    }

    let mut descended_from = None;
    if location_updated {
        next.highlighted = prev_location
            .filter(|prev| is_parent(prev, &location))
            .map(|prev| {
                if get_page(prev).is_some() {
                    prev.clone()
                } else {
                    canonical_listing(prev)
                }
            });
        descended_from = prev_location
            .filter(|prev| is_parent_list(&location, prev))
            .cloned();
    }

    Some(Transition {
        state: next,
        listing_changed,
        reprocessed,
        descended_from,
    })
}

// =============================================================================
// History Log
// =============================================================================

/// What to restore when returning to a listing.
#[derive(Clone, Debug, PartialEq)]
pub struct HistoryEntry {
    pub scroll_offset: f64,
    /// Exact address the user left the listing from.
    pub return_address: Address,
}

/// Canonical listing → entry recorded on the way down.
#[derive(Clone, Debug, Default)]
pub struct HistoryLog {
    entries: HashMap<String, HistoryEntry>,
}

impl HistoryLog {
    fn key(listing: &Address) -> String {
        canonical_listing(listing).to_string()
    }

    pub fn record(&mut self, listing: &Address, entry: HistoryEntry) {
        self.entries.insert(Self::key(listing), entry);
    }

    pub fn get(&self, listing: &Address) -> Option<&HistoryEntry> {
        self.entries.get(&Self::key(listing))
    }

    /// Remove and return the entry; entries restore at most once.
    pub fn take(&mut self, listing: &Address) -> Option<HistoryEntry> {
        self.entries.remove(&Self::key(listing))
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// =============================================================================
// Controller
// =============================================================================

/// Everything the controller drives.
pub struct Collaborators {
    pub list: Box<dyn ListView>,
    pub navi: Box<dyn NaviView>,
    pub pager: PagingWindow,
    pub tagger: Tagger,
    pub fetcher: Box<dyn ResourceFetcher>,
    pub history: Box<dyn HistorySink>,
    pub bookmarks: BookmarkList,
}

struct InFlight {
    ticket: FetchTicket,
    location: Address,
    link_segments: Option<Vec<String>>,
}

pub struct NavigationController {
    list: Box<dyn ListView>,
    navi: Box<dyn NaviView>,
    pager: PagingWindow,
    tagger: Tagger,
    fetcher: Box<dyn ResourceFetcher>,
    history_sink: Box<dyn HistorySink>,
    bookmarks: BookmarkList,

    state: NavigationState,
    history: HistoryLog,
    in_flight: Option<InFlight>,
    next_ticket: u64,
    /// Locally built listings, delivered once the current event completes.
    immediate: VecDeque<(FetchTicket, Listing)>,
}

impl NavigationController {
    pub fn new(collaborators: Collaborators) -> Self {
        let Collaborators {
            list,
            navi,
            pager,
            tagger,
            fetcher,
            history,
            bookmarks,
        } = collaborators;

        Self {
            list,
            navi,
            pager,
            tagger,
            fetcher,
            history_sink: history,
            bookmarks,
            state: NavigationState::default(),
            history: HistoryLog::default(),
            in_flight: None,
            next_ticket: 0,
            immediate: VecDeque::new(),
        }
    }

    pub fn state(&self) -> &NavigationState {
        &self.state
    }

    pub fn history(&self) -> &HistoryLog {
        &self.history
    }

    pub fn bookmarks(&self) -> &BookmarkList {
        &self.bookmarks
    }

    // =========================================================================
    // Entry Points
    // =========================================================================

    /// Reconcile with `location` without recording history (boot, popstate).
    pub fn rewrite_with(&mut self, location: Address) {
        self.dispatch(NavEvent::AddressChanged(location));
    }

    /// Navigate to `location` and record it.
    pub fn refresh_with(&mut self, location: Address, replacing: bool) {
        self.dispatch(NavEvent::AddressChanged(location.clone()));
        self.history_sink.record(&location, replacing);
    }

    /// A fetch issued through [`ResourceFetcher::fetch`] finished.
    pub fn fetch_completed(&mut self, ticket: FetchTicket, outcome: FetchOutcome) {
        self.complete(ticket, outcome);
        self.deliver_immediate();
    }

    fn dispatch(&mut self, event: NavEvent) {
        self.update(event);
        self.deliver_immediate();
    }

    fn deliver_immediate(&mut self) {
        while let Some((ticket, listing)) = self.immediate.pop_front() {
            self.complete(ticket, Ok(listing));
        }
    }

    fn complete(&mut self, ticket: FetchTicket, outcome: FetchOutcome) {
        let Some(in_flight) = self.in_flight.take_if(|f| f.ticket == ticket) else {
            debug!("ignoring superseded fetch {ticket:?}");
            return;
        };

        match outcome {
            Ok(mut listing) => {
                if let Some(segments) = &in_flight.link_segments {
                    apply_link_segments(&mut listing, segments);
                }
                let resources: Rc<[Rc<ResourceEntry>]> =
                    listing.resources.into_iter().map(Rc::new).collect();
                self.update(NavEvent::ResourcesLoaded {
                    location: in_flight.location,
                    resources,
                });
            }
            Err(err) if err.is_cancellation() => {
                debug!("fetch {ticket:?} canceled");
            }
            Err(err) => self.report_failure(&err),
        }
    }

    fn report_failure(&mut self, err: &FetchError) {
        warn!("failed to load listing: {err}");
        self.list.set_error_message(&format!("failed to load: {err}"));
    }

    fn request_resources(&mut self, location: &Address) {
        if let Some(previous) = self.in_flight.take() {
            debug!("aborting fetch {:?}", previous.ticket);
            self.fetcher.abort(previous.ticket);
        }

        self.next_ticket += 1;
        let ticket = FetchTicket(self.next_ticket);

        match plan_fetch(location, &self.bookmarks) {
            Ok(FetchPlan::Remote {
                request,
                link_segments,
            }) => {
                debug!("fetch {ticket:?}: {request:?}");
                self.in_flight = Some(InFlight {
                    ticket,
                    location: location.clone(),
                    link_segments,
                });
                self.fetcher.fetch(ticket, request);
            }
            Ok(FetchPlan::Immediate(listing)) => {
                self.in_flight = Some(InFlight {
                    ticket,
                    location: location.clone(),
                    link_segments: None,
                });
                self.immediate.push_back((ticket, listing));
            }
            Err(err) => self.report_failure(&err.into()),
        }
    }

    // =========================================================================
    // Reconciliation
    // =========================================================================

    fn update(&mut self, event: NavEvent) {
        let Some(transition) = reduce(&self.state, &event) else {
            debug!("discarding stale listing");
            return;
        };
        let Transition {
            state,
            listing_changed,
            reprocessed,
            descended_from,
        } = transition;

        let scroll_before = descended_from
            .as_ref()
            .map(|_| self.list.dump_scroll_state());
        self.state = state;
        let Some(location) = self.state.location.clone() else {
            return;
        };
        let current_listing = canonical_listing(&location);

        if listing_changed {
            self.list.reset();
            self.request_resources(&location);
        }

        if reprocessed {
            if let Some(processed) = self.state.processed.clone() {
                let files = processed
                    .iter()
                    .filter(|r| r.entry.is_file())
                    .map(|r| r.entry.clone())
                    .collect();
                self.list.update(processed);
                self.list.reset_scroll();
                self.pager.update(files);
            }
        }

        if let (Some(from), Some(scroll_offset)) = (descended_from, scroll_before) {
            self.history.record(
                &from,
                HistoryEntry {
                    scroll_offset,
                    return_address: from.clone(),
                },
            );
        }

        self.scroll_to_highlight(&current_listing);
        self.apply_mode(&location);
        self.redraw_navigation(&location);
    }

    fn scroll_to_highlight(&mut self, current_listing: &Address) {
        let (Some(processed), Some(highlighted)) = (&self.state.processed, &self.state.highlighted)
        else {
            return;
        };
        let Some(index) = processed
            .iter()
            .position(|r| r.link.as_ref().is_some_and(|l| same_address(l, highlighted)))
        else {
            return;
        };

        if let Some(entry) = self.history.take(current_listing) {
            self.list.restore_scroll_state(entry.scroll_offset);
        }
        self.list.scroll_to(index);
    }

    fn apply_mode(&mut self, location: &Address) {
        match get_page(location) {
            Some(page) => {
                if self.state.resources.is_some() {
                    self.pager.change_page(page);
                }
                self.pager.activate();
                self.list.deactivate_partial_thumbnails();
            }
            None => {
                self.pager.deactivate();
                self.list.activate_thumbnails();
            }
        }
    }

    fn redraw_navigation(&mut self, location: &Address) {
        let sort_key = get_sort_key(location);
        let filter = get_filter_text(location);

        let mut suffix_items = Vec::new();
        if let Some(key) = sort_key {
            suffix_items.push(key.label().to_string());
        }
        if let Some(filter) = &filter {
            suffix_items.push(format!("[{filter}]"));
        }
        if let (Some(resources), Some(processed)) = (&self.state.resources, &self.state.processed) {
            if resources.len() != processed.len() {
                suffix_items.push(format!("({}/{})", processed.len(), resources.len()));
            } else {
                suffix_items.push(format!("({})", resources.len()));
            }
        }

        let title = resource_title(location, &self.bookmarks);
        self.navi
            .update_title(title.as_deref().unwrap_or_default(), &suffix_items.join(", "));

        let back = self.parent_or_return(location);
        self.navi.update_back_link(&back);

        for key in SortKey::ALL {
            self.navi.update_sort_key_link(key, &sorted_address(location, key));
        }
        self.navi.update_filter_text(filter.as_deref().unwrap_or_default());
        self.pager.update_back_link(&list_address(location));

        self.navi.update_tag_list_path(title.as_deref());
        self.tagger.set_path(title);
        self.tagger.redraw(&self.bookmarks);
    }

    /// Parent of `location`, or the address the parent was left from.
    fn parent_or_return(&self, location: &Address) -> Address {
        let parent = parent_address(location);
        match self.history.get(&parent) {
            Some(entry) => entry.return_address.clone(),
            None => parent,
        }
    }

    // =========================================================================
    // Intents
    // =========================================================================

    /// A list entry was chosen.
    pub fn select(&mut self, link: Address) {
        self.refresh_with(link, false);
    }

    pub fn back_requested(&mut self, link: Address) {
        self.refresh_with(link, false);
    }

    pub fn link_clicked(&mut self, link: Address) {
        self.refresh_with(link, false);
    }

    pub fn sort_key_clicked(&mut self, key: SortKey) {
        if let Some(location) = &self.state.location {
            let next = sorted_address(location, key);
            self.refresh_with(next, false);
        }
    }

    pub fn filter_updated(&mut self, text: &str) {
        if let Some(location) = &self.state.location {
            let next = filtered_address(location, Some(text));
            self.refresh_with(next, false);
        }
    }

    pub fn page_changed(&mut self, page: usize) {
        if let Some(location) = &self.state.location {
            let next = page_address(location, page);
            self.refresh_with(next, false);
        }
    }

    pub fn pager_gesture(&mut self, event: GestureEvent) {
        if let Some(page) = self.pager.handle_gesture(event) {
            self.page_changed(page);
        }
    }

    pub fn rotate_current_page(&mut self) {
        self.pager.rotate_current();
    }

    pub fn toggle_tag(&mut self, tag_id: &str) {
        // failures are logged by the tagger and leave the store as it was
        let _ = self.tagger.toggle(&mut self.bookmarks, tag_id);
    }

    pub fn open_tag_dialog(&mut self) {
        self.tagger.open_dialog();
    }

    pub fn on_animation_frame(&mut self) {
        self.pager.on_animation_frame();
    }

    pub fn on_image_settled(&mut self, slot: usize) {
        self.pager.on_image_settled(slot);
    }

    pub fn on_toolbox_timer(&mut self) {
        self.pager.on_toolbox_timer();
    }

    // =========================================================================
    // Keyboard Commands
    // =========================================================================

    pub fn in_pager(&self) -> bool {
        self.state.location.as_ref().and_then(get_page).is_some()
    }

    pub fn menu_expanded(&self) -> bool {
        self.navi.menu_expanded()
    }

    fn move_page(&mut self, diff: isize) {
        if self.state.resources.is_none() {
            return;
        }
        let Some(location) = &self.state.location else {
            return;
        };
        let target = get_page(location)
            .and_then(|page| page.checked_add_signed(diff))
            .filter(|page| *page < self.pager.file_count());
        if let Some(page) = target {
            let next = page_address(location, page);
            self.refresh_with(next, false);
        }
    }

    pub fn move_to_next_page(&mut self) {
        self.move_page(1);
    }

    pub fn move_to_prev_page(&mut self) {
        self.move_page(-1);
    }

    pub fn toggle_toolbox(&mut self) {
        self.pager.toggle_toolbox();
    }

    pub fn switch_to_list(&mut self) {
        if let Some(location) = &self.state.location {
            let next = list_address(location);
            self.refresh_with(next, false);
        }
    }

    pub fn close_menu(&mut self) {
        self.navi.close_menu();
    }

    pub fn move_to_parent(&mut self) {
        if let Some(location) = &self.state.location {
            let next = self.parent_or_return(location);
            self.refresh_with(next, false);
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use std::cell::{Cell, RefCell};

    use pretty_assertions::assert_eq;

    use super::*;
    use crate::bookmark::MemoryStorage;
    use crate::config::PagerConfig;
    use crate::gesture::SwipeDirection;
    use crate::resource::ResourceKind;
    use crate::route::FetchRequest;
    use crate::view::{Clock, PagerSurface, SlideFrame, SlotRender, TagButton, TagView};

    // -------------------------------------------------------------------------
    // Recording fakes
    // -------------------------------------------------------------------------

    #[derive(Default)]
    struct World {
        // list
        items: Option<Vec<String>>,
        loading: bool,
        error: Option<String>,
        scroll: f64,
        restored: Vec<f64>,
        scrolled_to: Vec<usize>,
        thumbnails_active: bool,
        // navi
        title: String,
        suffix: String,
        back_link: String,
        sort_links: Vec<(SortKey, String)>,
        filter_text: String,
        tag_list_path: Option<String>,
        menu_expanded: bool,
        // pager
        pager_active: bool,
        pager_back_link: String,
        // tagger
        tag_buttons: Vec<TagButton>,
        dialog: Option<String>,
        // fetch and history
        fetches: Vec<(FetchTicket, FetchRequest)>,
        aborted: Vec<FetchTicket>,
        recorded: Vec<(String, bool)>,
    }

    type Shared = Rc<RefCell<World>>;

    struct FakeList(Shared);

    impl ListView for FakeList {
        fn reset(&mut self) {
            let mut w = self.0.borrow_mut();
            w.loading = true;
            w.error = None;
        }
        fn update(&mut self, resources: Rc<[Resource]>) {
            let mut w = self.0.borrow_mut();
            w.loading = false;
            w.items = Some(resources.iter().map(|r| r.entry.name.clone()).collect());
        }
        fn reset_scroll(&mut self) {
            self.0.borrow_mut().scroll = 0.0;
        }
        fn set_error_message(&mut self, text: &str) {
            self.0.borrow_mut().error = Some(text.to_string());
        }
        fn dump_scroll_state(&self) -> f64 {
            self.0.borrow().scroll
        }
        fn restore_scroll_state(&mut self, offset: f64) {
            let mut w = self.0.borrow_mut();
            w.scroll = offset;
            w.restored.push(offset);
        }
        fn scroll_to(&mut self, index: usize) {
            self.0.borrow_mut().scrolled_to.push(index);
        }
        fn activate_thumbnails(&mut self) {
            self.0.borrow_mut().thumbnails_active = true;
        }
        fn deactivate_partial_thumbnails(&mut self) {
            self.0.borrow_mut().thumbnails_active = false;
        }
    }

    struct FakeNavi(Shared);

    impl NaviView for FakeNavi {
        fn update_title(&mut self, name: &str, suffix: &str) {
            let mut w = self.0.borrow_mut();
            w.title = name.to_string();
            w.suffix = suffix.to_string();
        }
        fn update_back_link(&mut self, link: &Address) {
            self.0.borrow_mut().back_link = link.to_string();
        }
        fn update_sort_key_link(&mut self, key: SortKey, link: &Address) {
            let mut w = self.0.borrow_mut();
            w.sort_links.retain(|(k, _)| *k != key);
            w.sort_links.push((key, link.to_string()));
        }
        fn update_filter_text(&mut self, text: &str) {
            self.0.borrow_mut().filter_text = text.to_string();
        }
        fn update_tag_list_path(&mut self, path: Option<&str>) {
            self.0.borrow_mut().tag_list_path = path.map(str::to_string);
        }
        fn close_menu(&mut self) {
            self.0.borrow_mut().menu_expanded = false;
        }
        fn menu_expanded(&self) -> bool {
            self.0.borrow().menu_expanded
        }
    }

    struct FakeSurface(Shared);

    impl PagerSurface for FakeSurface {
        fn arrange(&mut self, _order: &[usize]) {}
        fn render_slot(&mut self, _slot: usize, _render: &SlotRender) {}
        fn request_frame(&mut self) {}
        fn apply_slide(&mut self, _frame: SlideFrame) {}
        fn set_active(&mut self, active: bool) {
            self.0.borrow_mut().pager_active = active;
        }
        fn set_toolbox_visible(&mut self, _visible: bool) {}
        fn schedule_toolbox_check(&mut self, _delay_ms: f64) {}
        fn set_back_link(&mut self, link: &Address) {
            self.0.borrow_mut().pager_back_link = link.to_string();
        }
    }

    struct FakeTagView(Shared);

    impl TagView for FakeTagView {
        fn update_buttons(&mut self, _path: Option<&str>, buttons: &[TagButton]) {
            self.0.borrow_mut().tag_buttons = buttons.to_vec();
        }
        fn open_dialog(&mut self, path: &str) {
            self.0.borrow_mut().dialog = Some(path.to_string());
        }
    }

    struct FakeFetcher(Shared);

    impl ResourceFetcher for FakeFetcher {
        fn fetch(&mut self, ticket: FetchTicket, request: FetchRequest) {
            self.0.borrow_mut().fetches.push((ticket, request));
        }
        fn abort(&mut self, ticket: FetchTicket) {
            self.0.borrow_mut().aborted.push(ticket);
        }
    }

    struct FakeHistory(Shared);

    impl HistorySink for FakeHistory {
        fn record(&mut self, location: &Address, replacing: bool) {
            self.0.borrow_mut().recorded.push((location.to_string(), replacing));
        }
    }

    struct FakeClock(Cell<f64>);

    impl Clock for FakeClock {
        fn now_ms(&self) -> f64 {
            self.0.get()
        }
    }

    // -------------------------------------------------------------------------
    // Helpers
    // -------------------------------------------------------------------------

    fn setup_with(storage: MemoryStorage) -> (NavigationController, Shared) {
        let world = Shared::default();
        let clock = Rc::new(FakeClock(Cell::new(42.0)));
        let controller = NavigationController::new(Collaborators {
            list: Box::new(FakeList(world.clone())),
            navi: Box::new(FakeNavi(world.clone())),
            pager: PagingWindow::new(
                PagerConfig::default(),
                Box::new(FakeSurface(world.clone())),
                clock.clone(),
            ),
            tagger: Tagger::new(Box::new(FakeTagView(world.clone())), clock),
            fetcher: Box::new(FakeFetcher(world.clone())),
            history: Box::new(FakeHistory(world.clone())),
            bookmarks: BookmarkList::load(Box::new(storage)),
        });
        (controller, world)
    }

    fn setup() -> (NavigationController, Shared) {
        setup_with(MemoryStorage::new())
    }

    fn addr(s: &str) -> Address {
        Address::parse(s)
    }

    fn entry(kind: ResourceKind, name: &str, modified_at: i64) -> ResourceEntry {
        ResourceEntry {
            kind,
            name: name.to_string(),
            modified_at: Some(modified_at),
            file_url: Some(format!("/file/{name}")),
            ..Default::default()
        }
    }

    fn listing(entries: &[(ResourceKind, &str)]) -> Listing {
        Listing {
            resources: entries
                .iter()
                .enumerate()
                .map(|(i, (kind, name))| entry(*kind, name, i as i64))
                .collect(),
        }
    }

    fn photos() -> Listing {
        listing(&[
            (ResourceKind::File, "b.jpg"),
            (ResourceKind::Directory, "sub"),
            (ResourceKind::File, "a.jpg"),
            (ResourceKind::File, "c.png"),
        ])
    }

    fn last_ticket(world: &Shared) -> FetchTicket {
        world.borrow().fetches.last().expect("a fetch was issued").0
    }

    fn complete_last(c: &mut NavigationController, world: &Shared, listing: Listing) {
        let ticket = last_ticket(world);
        c.fetch_completed(ticket, Ok(listing));
    }

    fn items(world: &Shared) -> Option<Vec<String>> {
        world.borrow().items.clone()
    }

    fn names(v: &[&str]) -> Option<Vec<String>> {
        Some(v.iter().map(|s| s.to_string()).collect())
    }

    // -------------------------------------------------------------------------
    // Reducer
    // -------------------------------------------------------------------------

    #[test]
    fn test_reduce_first_address_is_listing_change() {
        let t = reduce(
            &NavigationState::default(),
            &NavEvent::AddressChanged(addr("/view/a")),
        )
        .expect("transition");
        assert!(t.listing_changed);
        assert!(!t.reprocessed);
        assert_eq!(t.state.resources, None);
        assert_eq!(t.state.processed, None);
        assert_eq!(t.state.highlighted, None);
    }

    #[test]
    fn test_reduce_discards_listing_for_other_address() {
        let state = NavigationState {
            location: Some(addr("/view/b")),
            ..Default::default()
        };
        let event = NavEvent::ResourcesLoaded {
            location: addr("/view/a?p=1"),
            resources: Rc::from(Vec::new()),
        };
        assert_eq!(reduce(&state, &event), None);

        let same_listing = NavEvent::ResourcesLoaded {
            location: addr("/view/b/?s=date_up"),
            resources: Rc::from(vec![Rc::new(entry(ResourceKind::File, "x", 0))]),
        };
        let t = reduce(&state, &same_listing).expect("relevant");
        assert!(t.reprocessed);
        assert_eq!(t.state.processed.map(|p| p.len()), Some(1));
    }

    #[test]
    fn test_reduce_query_change_reprocesses_without_refetch() {
        let resources: Rc<[Rc<ResourceEntry>]> = Rc::from(vec![
            Rc::new(entry(ResourceKind::File, "cat", 0)),
            Rc::new(entry(ResourceKind::File, "dog", 1)),
        ]);
        let state = NavigationState {
            location: Some(addr("/view/a")),
            resources: Some(resources.clone()),
            processed: None,
            highlighted: None,
        };
        let t = reduce(&state, &NavEvent::AddressChanged(addr("/view/a?f=do")))
            .expect("transition");
        assert!(!t.listing_changed);
        assert!(t.reprocessed);
        let processed = t.state.processed.expect("processed");
        assert!(processed.len() <= resources.len());
        assert_eq!(processed[0].entry.name, "dog");
    }

    #[test]
    fn test_reduce_tracks_direction() {
        let state = NavigationState {
            location: Some(addr("/view/a")),
            ..Default::default()
        };
        let down = reduce(&state, &NavEvent::AddressChanged(addr("/view/a/sub")))
            .expect("transition");
        assert_eq!(down.descended_from, Some(addr("/view/a")));
        assert_eq!(down.state.highlighted, None);

        let state = NavigationState {
            location: Some(addr("/view/a/sub?s=date_up")),
            ..Default::default()
        };
        let up = reduce(&state, &NavEvent::AddressChanged(addr("/view/a")))
            .expect("transition");
        assert_eq!(up.descended_from, None);
        assert_eq!(up.state.highlighted, Some(addr("/view/a/sub")));

        let state = NavigationState {
            location: Some(addr("/view/a?p=3")),
            ..Default::default()
        };
        let to_list = reduce(&state, &NavEvent::AddressChanged(addr("/view/a")))
            .expect("transition");
        assert_eq!(to_list.state.highlighted, Some(addr("/view/a?p=3")));
    }

    // -------------------------------------------------------------------------
    // Fetching
    // -------------------------------------------------------------------------

    #[test]
    fn test_boot_fetches_and_shows_listing() {
        let (mut c, world) = setup();
        c.rewrite_with(addr("/view/photos"));

        {
            let w = world.borrow();
            assert!(w.loading);
            assert_eq!(
                w.fetches[0].1,
                FetchRequest::Get {
                    url: "/meta/directory/photos".into()
                }
            );
            assert!(w.recorded.is_empty());
            assert_eq!(w.title, "/photos");
            assert_eq!(w.suffix, "");
        }

        complete_last(&mut c, &world, photos());
        assert_eq!(items(&world), names(&["a.jpg", "b.jpg", "c.png", "sub"]));
        assert_eq!(world.borrow().suffix, "(4)");
        assert_eq!(c.state().resources.as_ref().map(|r| r.len()), Some(4));
    }

    #[test]
    fn test_superseded_fetch_is_discarded() {
        let (mut c, world) = setup();
        c.refresh_with(addr("/view/a/"), false);
        let ticket_a = last_ticket(&world);
        c.refresh_with(addr("/view/b/"), false);
        let ticket_b = last_ticket(&world);

        assert_eq!(world.borrow().aborted, vec![ticket_a]);

        c.fetch_completed(ticket_b, Ok(listing(&[(ResourceKind::File, "from-b")])));
        c.fetch_completed(ticket_a, Ok(listing(&[(ResourceKind::File, "from-a")])));

        assert_eq!(items(&world), names(&["from-b"]));
        assert_eq!(world.borrow().fetches.len(), 2);
    }

    #[test]
    fn test_same_listing_keeps_single_fetch() {
        let (mut c, world) = setup();
        c.rewrite_with(addr("/view/a"));
        c.refresh_with(addr("/view/a?s=date_down"), false);
        c.refresh_with(addr("/view/a/?s=date_down&p=0"), false);

        assert_eq!(world.borrow().fetches.len(), 1);
        assert!(world.borrow().aborted.is_empty());

        complete_last(&mut c, &world, photos());
        assert_eq!(items(&world), names(&["c.png", "a.jpg", "sub", "b.jpg"]));
    }

    #[test]
    fn test_fetch_failure_is_reported() {
        let (mut c, world) = setup();
        c.rewrite_with(addr("/view/missing"));
        let ticket = last_ticket(&world);
        c.fetch_completed(
            ticket,
            Err(FetchError::HttpError {
                status: 404,
                text: "Not Found".into(),
            }),
        );

        assert_eq!(world.borrow().error.as_deref(), Some("failed to load: 404 Not Found"));
        assert_eq!(c.state().resources, None);
        assert_eq!(c.state().processed, None);
    }

    #[test]
    fn test_cancellation_is_silent() {
        let (mut c, world) = setup();
        c.rewrite_with(addr("/view/a"));
        let ticket = last_ticket(&world);
        c.fetch_completed(ticket, Err(FetchError::Aborted));
        assert_eq!(world.borrow().error, None);
        assert!(world.borrow().loading);
    }

    #[test]
    fn test_unknown_ticket_is_ignored() {
        let (mut c, world) = setup();
        c.rewrite_with(addr("/view/a"));
        complete_last(&mut c, &world, photos());
        let before = c.state().clone();

        c.fetch_completed(FetchTicket(99), Err(FetchError::NetworkError("offline".into())));
        assert_eq!(world.borrow().error, None);
        assert_eq!(c.state(), &before);
    }

    #[test]
    fn test_unsupported_address_fails_without_fetch() {
        let (mut c, world) = setup();
        c.rewrite_with(addr("/other/x"));
        let w = world.borrow();
        assert!(w.fetches.is_empty());
        assert_eq!(
            w.error.as_deref(),
            Some("failed to load: unsupported resource url: /other/x")
        );
    }

    // -------------------------------------------------------------------------
    // History and highlight
    // -------------------------------------------------------------------------

    #[test]
    fn test_history_restores_scroll_once() {
        let (mut c, world) = setup();
        c.rewrite_with(addr("/view/dir/"));
        complete_last(&mut c, &world, photos());
        world.borrow_mut().scroll = 120.0;

        c.select(addr("/view/dir/sub"));
        assert_eq!(
            c.history().get(&addr("/view/dir")).map(|e| e.scroll_offset),
            Some(120.0)
        );
        complete_last(&mut c, &world, listing(&[(ResourceKind::File, "inner.jpg")]));
        world.borrow_mut().scroll = 0.0;

        c.back_requested(addr("/view/dir/"));
        complete_last(&mut c, &world, photos());
        {
            let w = world.borrow();
            assert_eq!(w.restored, vec![120.0]);
            assert_eq!(w.scrolled_to, vec![3]);
        }
        assert!(c.history().is_empty());

        // arrive at the child from elsewhere, then go back up again
        c.refresh_with(addr("/view/x"), false);
        c.refresh_with(addr("/view/dir/sub"), false);
        c.refresh_with(addr("/view/dir"), false);
        complete_last(&mut c, &world, photos());
        let w = world.borrow();
        assert_eq!(w.restored, vec![120.0]);
        assert_eq!(w.scrolled_to, vec![3, 3]);
    }

    #[test]
    fn test_back_link_uses_return_address() {
        let (mut c, world) = setup();
        c.rewrite_with(addr("/view/dir?s=date_up&f=s"));
        complete_last(&mut c, &world, photos());

        c.select(addr("/view/dir/sub"));
        assert_eq!(world.borrow().back_link, "/view/dir?s=date_up&f=s");

        c.move_to_parent();
        let recorded = world.borrow().recorded.last().cloned();
        assert_eq!(recorded, Some(("/view/dir?s=date_up&f=s".to_string(), false)));
    }

    #[test]
    fn test_back_link_defaults_to_parent() {
        let (mut c, world) = setup();
        c.rewrite_with(addr("/view/a/b/c"));
        assert_eq!(world.borrow().back_link, "/view/a/b");
        c.rewrite_with(addr("/view/a"));
        assert_eq!(world.borrow().back_link, "/view/");
    }

    #[test]
    fn test_returning_from_page_highlights_file() {
        let (mut c, world) = setup();
        c.rewrite_with(addr("/view/dir?p=2"));
        complete_last(&mut c, &world, photos());

        c.switch_to_list();
        assert_eq!(world.borrow().scrolled_to, vec![2]);
        assert_eq!(
            world.borrow().recorded.last().map(|r| r.0.clone()).as_deref(),
            Some("/view/dir")
        );
    }

    // -------------------------------------------------------------------------
    // Derived text, links and modes
    // -------------------------------------------------------------------------

    #[test]
    fn test_title_suffix_and_links() {
        let (mut c, world) = setup();
        c.rewrite_with(addr("/view/my%20photos?s=date_down&f=.jpg"));
        complete_last(&mut c, &world, photos());

        let w = world.borrow();
        assert_eq!(w.title, "/my photos");
        assert_eq!(w.suffix, "date:down, [.jpg], (2/4)");
        assert_eq!(w.filter_text, ".jpg");
        assert_eq!(w.sort_links.len(), 4);
        assert!(w.sort_links.contains(&(
            SortKey::NameUp,
            "/view/my%20photos?s=name_up&f=.jpg".to_string()
        )));
        assert_eq!(w.pager_back_link, "/view/my%20photos?s=date_down&f=.jpg");
        assert_eq!(w.tag_list_path.as_deref(), Some("/my photos"));
    }

    #[test]
    fn test_sort_and_filter_intents() {
        let (mut c, world) = setup();
        c.rewrite_with(addr("/view/a"));
        complete_last(&mut c, &world, photos());

        c.sort_key_clicked(SortKey::NameDown);
        assert_eq!(items(&world), names(&["sub", "c.png", "b.jpg", "a.jpg"]));
        c.filter_updated("png");
        assert_eq!(items(&world), names(&["c.png"]));
        c.filter_updated("");
        assert_eq!(items(&world).map(|i| i.len()), Some(4));

        let recorded: Vec<_> = world.borrow().recorded.iter().map(|r| r.0.clone()).collect();
        assert_eq!(
            recorded,
            vec!["/view/a?s=name_down", "/view/a?s=name_down&f=png", "/view/a?s=name_down"]
        );
        assert_eq!(world.borrow().fetches.len(), 1);
    }

    #[test]
    fn test_page_mode_toggles_pager_and_thumbnails() {
        let (mut c, world) = setup();
        c.rewrite_with(addr("/view/a?p=1"));
        assert!(c.in_pager());
        assert!(world.borrow().pager_active);
        assert!(!world.borrow().thumbnails_active);

        complete_last(&mut c, &world, photos());
        assert_eq!(c.pager.current_page(), Some(1));

        c.switch_to_list();
        assert!(!c.in_pager());
        assert!(!world.borrow().pager_active);
        assert!(world.borrow().thumbnails_active);
    }

    #[test]
    fn test_page_moves_stay_in_range() {
        let (mut c, world) = setup();
        c.rewrite_with(addr("/view/a?p=1"));
        c.move_to_next_page();
        assert!(world.borrow().recorded.is_empty());

        complete_last(&mut c, &world, photos());
        c.move_to_next_page();
        c.move_to_next_page();
        assert_eq!(get_page(c.state().location.as_ref().expect("location")), Some(2));

        c.move_to_prev_page();
        c.move_to_prev_page();
        c.move_to_prev_page();
        assert_eq!(get_page(c.state().location.as_ref().expect("location")), Some(0));
        assert_eq!(world.borrow().recorded.len(), 3);
    }

    #[test]
    fn test_page_past_last_file_keeps_pager_still() {
        let (mut c, world) = setup();
        c.rewrite_with(addr("/view/a?p=7"));
        complete_last(&mut c, &world, photos());
        assert!(world.borrow().pager_active);

        c.move_to_next_page();
        c.move_to_prev_page();
        c.pager_gesture(GestureEvent::Swiped(SwipeDirection::Forward));
        assert!(world.borrow().recorded.is_empty());
        assert_eq!(get_page(c.state().location.as_ref().expect("location")), Some(7));
    }

    #[test]
    fn test_page_beyond_isize_is_out_of_range() {
        let (mut c, world) = setup();
        c.rewrite_with(addr("/view/a?p=9223372036854775807"));
        complete_last(&mut c, &world, photos());
        assert!(world.borrow().pager_active);

        c.refresh_with(addr("/view/a?p=9223372036854775808"), false);
        c.refresh_with(addr("/view/a?p=18446744073709551615"), false);
        c.move_to_next_page();
        assert_eq!(world.borrow().recorded.len(), 2);

        c.refresh_with(addr("/view/a?p=1"), false);
        c.move_to_next_page();
        assert_eq!(get_page(c.state().location.as_ref().expect("location")), Some(2));
        assert_eq!(world.borrow().fetches.len(), 1);
    }

    #[test]
    fn test_swipe_requests_next_page() {
        let (mut c, world) = setup();
        c.rewrite_with(addr("/view/a?p=0"));
        complete_last(&mut c, &world, photos());

        c.pager_gesture(GestureEvent::Swiped(SwipeDirection::Forward));
        assert_eq!(
            world.borrow().recorded.last().map(|r| r.0.clone()).as_deref(),
            Some("/view/a?p=1")
        );
        c.pager_gesture(GestureEvent::Swiped(SwipeDirection::Backward));
        c.pager_gesture(GestureEvent::Swiped(SwipeDirection::Backward));
        assert_eq!(world.borrow().recorded.len(), 2);
    }

    #[test]
    fn test_menu_commands() {
        let (mut c, world) = setup();
        world.borrow_mut().menu_expanded = true;
        assert!(c.menu_expanded());
        c.close_menu();
        assert!(!c.menu_expanded());
    }

    // -------------------------------------------------------------------------
    // Bookmarks
    // -------------------------------------------------------------------------

    fn tagged_storage() -> MemoryStorage {
        MemoryStorage::with_entries([
            ("tag:t1", "main:Fav"),
            ("tag:t2", "sub:Later"),
            ("bookmark:t1:/trips", "10"),
        ])
    }

    #[test]
    fn test_bookmark_root_is_listed_without_network() {
        let (mut c, world) = setup_with(tagged_storage());
        c.rewrite_with(addr("/bookmark/"));

        let w = world.borrow();
        assert!(w.fetches.is_empty());
        assert_eq!(w.items, names(&["Fav", "Later"]));
        assert_eq!(w.title, "");
        assert_eq!(w.tag_list_path, None);
    }

    #[test]
    fn test_bookmark_tag_links_by_number() {
        let (mut c, world) = setup_with(tagged_storage());
        c.rewrite_with(addr("/bookmark/Fav"));
        complete_last(
            &mut c,
            &world,
            listing(&[(ResourceKind::Directory, "trips")]),
        );

        let processed = c.state().processed.clone().expect("processed");
        assert_eq!(
            processed[0].link.as_ref().map(|l| l.to_string()).as_deref(),
            Some("/bookmark/Fav/10")
        );
    }

    #[test]
    fn test_toggle_tag_on_current_resource() {
        let (mut c, world) = setup_with(tagged_storage());
        c.rewrite_with(addr("/view/trips/day1"));
        assert_eq!(
            world.borrow().tag_buttons,
            vec![TagButton {
                id: "t1".into(),
                name: "Fav".into(),
                tagged: false
            }]
        );

        c.toggle_tag("t1");
        assert!(world.borrow().tag_buttons[0].tagged);
        assert_eq!(c.bookmarks().tags_of("/trips/day1"), vec!["t1".to_string()]);

        c.open_tag_dialog();
        assert_eq!(world.borrow().dialog.as_deref(), Some("/trips/day1"));
    }
}
