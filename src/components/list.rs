//! Directory listing view.
//!
//! [`ListSurface`] is the controller-facing side: it turns processed
//! resources into [`ListEntry`] rows held in [`ListState`] signals, which the
//! [`List`] component renders.

use std::rc::Rc;

use leptos::html;
use leptos::prelude::*;
use leptos_icons::Icon;
use suzuno_core::view::ListView;
use suzuno_core::{Address, Resource, ResourceKind};

use crate::app::AppContext;
use crate::components::icons as ic;
use crate::config::SCROLL_MARGIN_RATIO;
use crate::utils::dom::request_after_redraw;

stylance::import_crate_style!(css, "src/components/list.module.css");

// =============================================================================
// State
// =============================================================================

/// One rendered row.
#[derive(Clone, Debug, PartialEq)]
pub struct ListEntry {
    pub index: usize,
    pub name: String,
    pub kind: ResourceKind,
    pub link: Option<String>,
    pub thumbnail: Option<String>,
}

impl ListEntry {
    fn from_resource(index: usize, resource: &Resource) -> Self {
        let entry = &resource.entry;
        Self {
            index,
            name: entry.name.clone(),
            kind: entry.kind,
            link: resource.link.as_ref().map(Address::to_string),
            thumbnail: entry.thumbnail_url.clone(),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub enum ListStatus {
    #[default]
    Loading,
    Failed(String),
    Loaded,
}

/// Reactive state of the listing.
#[derive(Clone, Copy)]
pub struct ListState {
    pub status: RwSignal<ListStatus>,
    pub entries: RwSignal<Vec<ListEntry>>,
    pub highlighted: RwSignal<Option<usize>>,
    /// Thumbnails not loaded yet are only requested while this is set.
    pub thumbnails_active: RwSignal<bool>,
    pub container: NodeRef<html::Div>,
}

impl ListState {
    pub fn new() -> Self {
        Self {
            status: RwSignal::new(ListStatus::Loading),
            entries: RwSignal::new(Vec::new()),
            highlighted: RwSignal::new(None),
            thumbnails_active: RwSignal::new(true),
            container: NodeRef::new(),
        }
    }
}

impl Default for ListState {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Controller Adapter
// =============================================================================

pub struct ListSurface(pub ListState);

impl ListSurface {
    fn container(&self) -> Option<web_sys::HtmlDivElement> {
        self.0.container.get_untracked()
    }
}

impl ListView for ListSurface {
    fn reset(&mut self) {
        self.0.status.set(ListStatus::Loading);
    }

    fn update(&mut self, resources: Rc<[Resource]>) {
        let entries = resources
            .iter()
            .enumerate()
            .map(|(index, resource)| ListEntry::from_resource(index, resource))
            .collect();
        self.0.entries.set(entries);
        self.0.highlighted.set(None);
        self.0.status.set(ListStatus::Loaded);
    }

    fn reset_scroll(&mut self) {
        self.0.highlighted.set(None);
        let container = self.0.container;
        request_after_redraw(move || {
            if let Some(element) = container.get_untracked() {
                element.scroll_to_with_x_and_y(0.0, 0.0);
            }
        });
    }

    fn set_error_message(&mut self, text: &str) {
        self.0.status.set(ListStatus::Failed(text.to_string()));
    }

    fn dump_scroll_state(&self) -> f64 {
        self.container()
            .map(|element| f64::from(element.scroll_top()))
            .unwrap_or_default()
    }

    fn restore_scroll_state(&mut self, offset: f64) {
        let container = self.0.container;
        request_after_redraw(move || {
            if let Some(element) = container.get_untracked() {
                element.scroll_to_with_x_and_y(0.0, offset);
            }
        });
    }

    fn scroll_to(&mut self, index: usize) {
        if index >= self.0.entries.with_untracked(Vec::len) {
            return;
        }
        self.0.highlighted.set(None);

        let container = self.0.container;
        let highlighted = self.0.highlighted;
        request_after_redraw(move || {
            if let Some(element) = container.get_untracked() {
                bring_into_view(&element, index);
            }
            highlighted.set(Some(index));
        });
    }

    fn activate_thumbnails(&mut self) {
        self.0.thumbnails_active.set(true);
    }

    fn deactivate_partial_thumbnails(&mut self) {
        self.0.thumbnails_active.set(false);
    }
}

/// Scroll `container` just enough to show row `index`, plus a margin.
fn bring_into_view(container: &web_sys::HtmlDivElement, index: usize) {
    use wasm_bindgen::JsCast;

    let selector = format!("[data-index=\"{index}\"]");
    let Some(item) = container
        .query_selector(&selector)
        .ok()
        .flatten()
        .and_then(|e| e.dyn_into::<web_sys::HtmlElement>().ok())
    else {
        return;
    };

    let item_height = f64::from(item.offset_height());
    let item_top = f64::from(item.offset_top());
    let item_bottom = item_top + item_height;

    let view_top = f64::from(container.scroll_top());
    let view_bottom = view_top + f64::from(container.offset_height());

    let margin = item_height * SCROLL_MARGIN_RATIO;
    let diff = if view_top > item_top {
        -(view_top - item_top + margin)
    } else if item_bottom > view_bottom {
        item_bottom - view_bottom + margin
    } else {
        0.0
    };
    container.scroll_by_with_x_and_y(0.0, diff);
}

// =============================================================================
// Components
// =============================================================================

#[component]
pub fn List() -> impl IntoView {
    let ctx = use_context::<AppContext>().expect("AppContext must be provided");
    let list = ctx.list;

    let root_class = move || match list.status.get() {
        ListStatus::Loading => format!("{} {}", css::list, css::loading),
        ListStatus::Failed(_) => format!("{} {}", css::list, css::failed),
        ListStatus::Loaded => css::list.to_string(),
    };
    let description = move || match list.status.get() {
        ListStatus::Failed(text) => text,
        _ => String::new(),
    };

    view! {
        <main class=root_class>
            <div class=css::container node_ref=list.container role="list">
                <For
                    each=move || list.entries.get()
                    key=|entry| (entry.index, entry.name.clone(), entry.link.clone())
                    children=move |entry| view! { <ListItem entry=entry /> }
                />
            </div>
            <p class=css::description>{description}</p>
        </main>
    }
}

#[component]
fn ListItem(entry: ListEntry) -> impl IntoView {
    let ctx = use_context::<AppContext>().expect("AppContext must be provided");
    let list = ctx.list;
    let index = entry.index;

    // thumbnails that finished loading survive deactivation
    let loaded = RwSignal::new(false);
    let thumbnail = entry.thumbnail.clone();
    let thumbnail_src = move || {
        let wanted = list.thumbnails_active.get() || loaded.get();
        wanted.then(|| thumbnail.clone()).flatten()
    };

    let item_class = move || {
        let kind = match entry.kind {
            ResourceKind::File => css::fileItem,
            ResourceKind::Directory => css::dirItem,
            ResourceKind::Empty => css::emptyItem,
        };
        if list.highlighted.get() == Some(index) {
            format!("{} {} {}", css::item, kind, css::highlighted)
        } else {
            format!("{} {}", css::item, kind)
        }
    };

    let link = entry.link.clone();
    let on_click = move |ev: leptos::ev::MouseEvent| {
        ev.prevent_default();
        if let Some(link) = &link {
            let target = Address::parse(link);
            ctx.dispatcher.dispatch(move |c| c.select(target));
        }
    };

    let icon = match entry.kind {
        ResourceKind::Directory => ic::FOLDER,
        ResourceKind::File => ic::IMAGE,
        ResourceKind::Empty => ic::FILE,
    };
    let has_thumbnail = entry.thumbnail.is_some();

    view! {
        <div class=item_class data-index=index.to_string() role="listitem">
            <a class=css::link href=entry.link.clone().unwrap_or_default() on:click=on_click>
                <span class=css::thumbnail>
                    {if has_thumbnail {
                        view! {
                            <img
                                src=thumbnail_src
                                alt=""
                                on:load=move |_| loaded.set(true)
                            />
                        }
                        .into_any()
                    } else {
                        view! { <Icon icon=icon /> }.into_any()
                    }}
                </span>
                <span class=css::name>{entry.name.clone()}</span>
            </a>
        </div>
    }
}
