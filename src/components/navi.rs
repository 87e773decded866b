//! Header bar and navigation menu.

use leptos::prelude::*;
use leptos_icons::Icon;
use suzuno_core::config::{BOOKMARK_PREFIX, VIEW_PREFIX};
use suzuno_core::view::NaviView;
use suzuno_core::{Address, SortKey};

use crate::app::AppContext;
use crate::components::icons as ic;
use crate::components::tagger::TagButtons;
use crate::config::APP_NAME;
use crate::utils::dom::set_document_title;

stylance::import_crate_style!(css, "src/components/navi.module.css");

// =============================================================================
// State
// =============================================================================

#[derive(Clone, Copy)]
pub struct NaviState {
    pub title: RwSignal<String>,
    pub suffix: RwSignal<String>,
    pub back_link: RwSignal<String>,
    pub sort_links: RwSignal<Vec<(SortKey, String)>>,
    pub filter_text: RwSignal<String>,
    /// Path shown above the tag buttons; `None` hides the section.
    pub tag_list_path: RwSignal<Option<String>>,
    pub menu_expanded: RwSignal<bool>,
}

impl NaviState {
    pub fn new() -> Self {
        Self {
            title: RwSignal::new(String::new()),
            suffix: RwSignal::new(String::new()),
            back_link: RwSignal::new(String::new()),
            sort_links: RwSignal::new(Vec::new()),
            filter_text: RwSignal::new(String::new()),
            tag_list_path: RwSignal::new(None),
            menu_expanded: RwSignal::new(false),
        }
    }
}

impl Default for NaviState {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Controller Adapter
// =============================================================================

pub struct NaviSurface(pub NaviState);

impl NaviView for NaviSurface {
    fn update_title(&mut self, name: &str, suffix: &str) {
        self.0.title.set(name.to_string());
        self.0.suffix.set(suffix.to_string());
        if name.is_empty() {
            set_document_title(APP_NAME);
        } else {
            set_document_title(&format!("{name} - {APP_NAME}"));
        }
    }

    fn update_back_link(&mut self, link: &Address) {
        self.0.back_link.set(link.to_string());
    }

    fn update_sort_key_link(&mut self, key: SortKey, link: &Address) {
        let link = link.to_string();
        self.0.sort_links.update(|links| {
            match links.iter_mut().find(|(k, _)| *k == key) {
                Some(entry) => entry.1 = link,
                None => links.push((key, link)),
            }
        });
    }

    fn update_filter_text(&mut self, text: &str) {
        self.0.filter_text.set(text.to_string());
    }

    fn update_tag_list_path(&mut self, path: Option<&str>) {
        self.0.tag_list_path.set(path.map(str::to_string));
    }

    fn close_menu(&mut self) {
        self.0.menu_expanded.set(false);
    }

    fn menu_expanded(&self) -> bool {
        self.0.menu_expanded.get_untracked()
    }
}

// =============================================================================
// Components
// =============================================================================

/// Title bar with the back link and the menu button.
#[component]
pub fn Header() -> impl IntoView {
    let ctx = use_context::<AppContext>().expect("AppContext must be provided");
    let navi = ctx.navi;

    let on_back = move |ev: leptos::ev::MouseEvent| {
        ev.prevent_default();
        let target = Address::parse(&navi.back_link.get_untracked());
        ctx.dispatcher.dispatch(move |c| c.back_requested(target));
    };

    view! {
        <header class=css::header>
            <a class=css::backLink href=move || navi.back_link.get() on:click=on_back>
                <Icon icon=ic::BACK />
            </a>
            <h1 class=css::title>
                <span class=css::titleName>{move || navi.title.get()}</span>
                <span class=css::titleSuffix>{move || navi.suffix.get()}</span>
            </h1>
            <button
                class=css::menuButton
                aria-label="Open menu"
                on:click=move |_| navi.menu_expanded.set(true)
            >
                <Icon icon=ic::MENU />
            </button>
        </header>
    }
}

/// Slide-in menu: locations, sort keys, filter and tags.
#[component]
pub fn Menu() -> impl IntoView {
    let ctx = use_context::<AppContext>().expect("AppContext must be provided");
    let navi = ctx.navi;

    let close = move || navi.menu_expanded.set(false);

    let menu_class = move || {
        if navi.menu_expanded.get() {
            format!("{} {}", css::menu, css::expanded)
        } else {
            css::menu.to_string()
        }
    };

    let location_link = move |href: String, label: &'static str, icon: icondata::Icon| {
        let target = Address::parse(&href);
        let on_click = move |ev: leptos::ev::MouseEvent| {
            ev.prevent_default();
            let target = target.clone();
            ctx.dispatcher.dispatch(move |c| c.link_clicked(target));
            close();
        };
        view! {
            <a class=css::menuLink href=href on:click=on_click>
                <Icon icon=icon />
                <span>{label}</span>
            </a>
        }
    };

    let on_filter_change = move |ev: leptos::ev::Event| {
        let text = event_target_value(&ev);
        ctx.dispatcher.dispatch(move |c| c.filter_updated(&text));
        close();
    };

    view! {
        <div class=menu_class on:click=move |_| close()>
            <nav class=css::content on:click=|ev| ev.stop_propagation()>
                <section class=css::section>
                    {location_link(format!("{VIEW_PREFIX}/"), "Files", ic::FOLDER)}
                    {location_link(format!("{BOOKMARK_PREFIX}/"), "Bookmarks", ic::BOOKMARK)}
                </section>

                <section class=css::section>
                    <h2 class=css::sectionTitle><Icon icon=ic::SORT />"Sort"</h2>
                    <For
                        each=move || navi.sort_links.get()
                        key=|(key, link)| (*key, link.clone())
                        children=move |(key, link)| {
                            view! { <SortKeyLink sort_key=key link=link /> }
                        }
                    />
                </section>

                <section class=css::section>
                    <h2 class=css::sectionTitle><Icon icon=ic::FILTER />"Filter"</h2>
                    <input
                        class=css::filterInput
                        type="search"
                        prop:value=move || navi.filter_text.get()
                        on:change=on_filter_change
                    />
                </section>

                <Show when=move || navi.tag_list_path.with(Option::is_some)>
                    <section class=css::section>
                        <h2 class=css::sectionTitle><Icon icon=ic::TAG_LIST />"Tags"</h2>
                        <p class=css::tagPath>
                            {move || navi.tag_list_path.get().unwrap_or_default()}
                        </p>
                        <TagButtons />
                    </section>
                </Show>
            </nav>
        </div>
    }
}

#[component]
fn SortKeyLink(sort_key: SortKey, link: String) -> impl IntoView {
    let ctx = use_context::<AppContext>().expect("AppContext must be provided");
    let navi = ctx.navi;

    let on_click = move |ev: leptos::ev::MouseEvent| {
        ev.prevent_default();
        ctx.dispatcher.dispatch(move |c| c.sort_key_clicked(sort_key));
        navi.menu_expanded.set(false);
    };

    view! {
        <a class=css::menuLink data-key=sort_key.as_str() href=link on:click=on_click>
            {sort_key.label()}
        </a>
    }
}
