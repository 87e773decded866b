//! Tag buttons and the tag dialog.

use leptos::prelude::*;
use leptos_icons::Icon;
use suzuno_core::view::{TagButton, TagView};

use crate::app::AppContext;
use crate::components::icons as ic;

stylance::import_crate_style!(css, "src/components/tagger.module.css");

#[derive(Clone, Copy)]
pub struct TagState {
    pub path: RwSignal<Option<String>>,
    pub buttons: RwSignal<Vec<TagButton>>,
    /// Path shown by the open dialog.
    pub dialog: RwSignal<Option<String>>,
}

impl TagState {
    pub fn new() -> Self {
        Self {
            path: RwSignal::new(None),
            buttons: RwSignal::new(Vec::new()),
            dialog: RwSignal::new(None),
        }
    }
}

impl Default for TagState {
    fn default() -> Self {
        Self::new()
    }
}

pub struct TagSurface(pub TagState);

impl TagView for TagSurface {
    fn update_buttons(&mut self, path: Option<&str>, buttons: &[TagButton]) {
        self.0.path.set(path.map(str::to_string));
        self.0.buttons.set(buttons.to_vec());
    }

    fn open_dialog(&mut self, path: &str) {
        self.0.dialog.set(Some(path.to_string()));
    }
}

/// One button per main tag, plus the dialog opener.
#[component]
pub fn TagButtons() -> impl IntoView {
    let ctx = use_context::<AppContext>().expect("AppContext must be provided");
    let tags = ctx.tags;

    let disabled = move || tags.path.with(Option::is_none);

    view! {
        <div class=css::buttons>
            <For
                each=move || tags.buttons.get()
                key=|button| (button.id.clone(), button.tagged)
                children=move |button| {
                    let id = button.id.clone();
                    let class = if button.tagged {
                        format!("{} {}", css::tag, css::tagged)
                    } else {
                        css::tag.to_string()
                    };
                    view! {
                        <button
                            class=class
                            data-tag=button.id.clone()
                            disabled=disabled
                            on:click=move |_| {
                                let id = id.clone();
                                ctx.dispatcher.dispatch(move |c| c.toggle_tag(&id));
                            }
                        >
                            <Icon icon=ic::TAG />
                            {button.name.clone()}
                        </button>
                    }
                }
            />
            <button
                class=css::dialogButton
                aria-label="Show path"
                disabled=disabled
                on:click=move |_| ctx.dispatcher.dispatch(|c| c.open_tag_dialog())
            >
                <Icon icon=ic::TAG_LIST />
            </button>
        </div>
    }
}

/// Overlay showing the tagged path; closes on a click outside its content.
#[component]
pub fn TagDialog() -> impl IntoView {
    let ctx = use_context::<AppContext>().expect("AppContext must be provided");
    let tags = ctx.tags;

    view! {
        <Show when=move || tags.dialog.with(Option::is_some)>
            <div class=css::dialog on:click=move |_| tags.dialog.set(None)>
                <div class=css::dialogContent on:click=|ev| ev.stop_propagation()>
                    <p class=css::dialogPath>
                        {move || tags.dialog.get().unwrap_or_default()}
                    </p>
                    <TagButtons />
                    <button class=css::closeButton on:click=move |_| tags.dialog.set(None)>
                        <Icon icon=ic::CLOSE />
                    </button>
                </div>
            </div>
        </Show>
    }
}
