//! Root application module.
//!
//! Builds the [`NavigationController`] with its browser collaborators,
//! provides [`AppContext`] to the component tree and routes window events
//! (history navigation and key presses) into the controller.

use std::cell::RefCell;
use std::rc::Rc;

use leptos::prelude::*;
use log::warn;
use suzuno_core::config::PagerConfig;
use suzuno_core::{BookmarkList, Collaborators, NavigationController, PagingWindow, Tagger};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::Closure;

use crate::components::list::{List, ListState, ListSurface};
use crate::components::navi::{Header, Menu, NaviState, NaviSurface};
use crate::components::pager::{Pager, PagerDom, PagerState};
use crate::components::tagger::{TagDialog, TagState, TagSurface};
use crate::utils::{BrowserHistory, HttpFetcher, SystemClock, dom, open_bookmark_storage};

// ============================================================================
// Dispatcher
// ============================================================================

/// Handle through which components and callbacks reach the controller.
///
/// Events arriving while the controller is already handling one are
/// dropped with a warning; every browser callback runs on a later task, so
/// this only happens on a reentrant call.
#[derive(Clone, Copy)]
pub struct Dispatcher(StoredValue<Option<Rc<RefCell<NavigationController>>>, LocalStorage>);

impl Dispatcher {
    fn new() -> Self {
        Self(StoredValue::new_local(None))
    }

    fn install(&self, controller: NavigationController) {
        self.0.set_value(Some(Rc::new(RefCell::new(controller))));
    }

    pub fn dispatch(&self, f: impl FnOnce(&mut NavigationController)) {
        let Some(controller) = self.0.get_value() else {
            warn!("event before the controller was installed");
            return;
        };
        match controller.try_borrow_mut() {
            Ok(mut controller) => f(&mut controller),
            Err(_) => warn!("controller busy; dropping event"),
        }
    }
}

// ============================================================================
// AppContext
// ============================================================================

/// Application-wide reactive context.
///
/// The view states are written by the controller through their adapters and
/// read by the components; components report intents via `dispatcher`.
#[derive(Clone, Copy)]
pub struct AppContext {
    pub dispatcher: Dispatcher,
    pub pager_config: PagerConfig,
    pub list: ListState,
    pub navi: NaviState,
    pub pager: PagerState,
    pub tags: TagState,
}

impl AppContext {
    pub fn new(pager_config: PagerConfig) -> Self {
        Self {
            dispatcher: Dispatcher::new(),
            pager_config,
            list: ListState::new(),
            navi: NaviState::new(),
            pager: PagerState::new(pager_config.extra_pages),
            tags: TagState::new(),
        }
    }

    /// Wire the controller to this context's view states.
    fn build_controller(&self) -> NavigationController {
        let clock = Rc::new(SystemClock);
        let dispatcher = self.dispatcher;

        let pager = PagingWindow::new(
            self.pager_config,
            Box::new(PagerDom::new(self.pager, dispatcher)),
            clock.clone(),
        );
        let tagger = Tagger::new(Box::new(TagSurface(self.tags)), clock);
        let fetcher = HttpFetcher::new(Rc::new(move |ticket, outcome| {
            dispatcher.dispatch(move |c| c.fetch_completed(ticket, outcome));
        }));

        NavigationController::new(Collaborators {
            list: Box::new(ListSurface(self.list)),
            navi: Box::new(NaviSurface(self.navi)),
            pager,
            tagger,
            fetcher: Box::new(fetcher),
            history: Box::new(BrowserHistory),
            bookmarks: BookmarkList::load(open_bookmark_storage()),
        })
    }
}

// ============================================================================
// Key Bindings
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum KeyCommand {
    NextPage,
    PrevPage,
    ToggleToolbox,
    RotatePage,
    CloseMenu,
    SwitchToList,
    MoveToParent,
}

/// Map a `KeyboardEvent.key` value to a command for the current mode.
fn key_command(key: &str, in_pager: bool, menu_expanded: bool) -> Option<KeyCommand> {
    if menu_expanded {
        return (key == "Escape").then_some(KeyCommand::CloseMenu);
    }
    if in_pager {
        return match key {
            "ArrowRight" | "l" | "j" => Some(KeyCommand::NextPage),
            "ArrowLeft" | "h" | "k" => Some(KeyCommand::PrevPage),
            " " | "t" => Some(KeyCommand::ToggleToolbox),
            "r" => Some(KeyCommand::RotatePage),
            "Escape" | "Backspace" => Some(KeyCommand::SwitchToList),
            _ => None,
        };
    }
    match key {
        "Backspace" => Some(KeyCommand::MoveToParent),
        _ => None,
    }
}

fn run_key_command(controller: &mut NavigationController, command: KeyCommand) {
    match command {
        KeyCommand::NextPage => controller.move_to_next_page(),
        KeyCommand::PrevPage => controller.move_to_prev_page(),
        KeyCommand::ToggleToolbox => controller.toggle_toolbox(),
        KeyCommand::RotatePage => controller.rotate_current_page(),
        KeyCommand::CloseMenu => controller.close_menu(),
        KeyCommand::SwitchToList => controller.switch_to_list(),
        KeyCommand::MoveToParent => controller.move_to_parent(),
    }
}

fn on_key_down(dispatcher: Dispatcher, ev: web_sys::KeyboardEvent) {
    if ev.ctrl_key() || ev.meta_key() || ev.alt_key() {
        return;
    }
    // typing into the filter box is not a command
    let typing = ev
        .target()
        .and_then(|t| t.dyn_into::<web_sys::HtmlInputElement>().ok())
        .is_some();
    if typing {
        return;
    }

    let key = ev.key();
    dispatcher.dispatch(|c| {
        if let Some(command) = key_command(&key, c.in_pager(), c.menu_expanded()) {
            ev.prevent_default();
            run_key_command(c, command);
        }
    });
}

/// Forward history navigation and key presses to the controller.
fn listen_window_events(dispatcher: Dispatcher) {
    let Some(window) = dom::window() else {
        return;
    };

    let on_pop_state = Closure::wrap(Box::new(move || {
        dispatcher.dispatch(|c| c.rewrite_with(dom::current_address()));
    }) as Box<dyn Fn()>);
    let on_key = Closure::wrap(Box::new(move |ev: web_sys::KeyboardEvent| {
        on_key_down(dispatcher, ev);
    }) as Box<dyn Fn(web_sys::KeyboardEvent)>);

    let _ = window.add_event_listener_with_callback("popstate", on_pop_state.as_ref().unchecked_ref());
    let _ = window.add_event_listener_with_callback("keydown", on_key.as_ref().unchecked_ref());

    // Keep the closures alive for the lifetime of the app
    on_pop_state.forget();
    on_key.forget();
}

// ============================================================================
// App
// ============================================================================

/// Root application component with error boundary.
///
/// This component:
/// - Creates and provides the global AppContext
/// - Installs the controller and reconciles it with the current address
/// - Forwards `popstate` and `keydown` from the window
#[component]
pub fn App() -> impl IntoView {
    let ctx = AppContext::new(PagerConfig::default());
    provide_context(ctx);

    let dispatcher = ctx.dispatcher;
    dispatcher.install(ctx.build_controller());

    listen_window_events(dispatcher);

    dispatcher.dispatch(|c| c.rewrite_with(dom::current_address()));

    view! {
        <ErrorBoundary
            fallback=|errors| view! {
                <div class="fatal">
                    <h1>"Something went wrong"</h1>
                    <ul>
                        {move || errors.get()
                            .into_iter()
                            .map(|(_, e)| view! { <li>{e.to_string()}</li> })
                            .collect::<Vec<_>>()
                        }
                    </ul>
                    <button
                        on:click=move |_| {
                            if let Some(window) = web_sys::window() {
                                let _ = window.location().reload();
                            }
                        }
                    >
                        "Reload Page"
                    </button>
                </div>
            }
        >
            <Header />
            <List />
            <Pager />
            <Menu />
            <TagDialog />
        </ErrorBoundary>
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pager_keys() {
        assert_eq!(key_command("ArrowRight", true, false), Some(KeyCommand::NextPage));
        assert_eq!(key_command("h", true, false), Some(KeyCommand::PrevPage));
        assert_eq!(key_command(" ", true, false), Some(KeyCommand::ToggleToolbox));
        assert_eq!(key_command("Escape", true, false), Some(KeyCommand::SwitchToList));
    }

    #[test]
    fn test_list_keys() {
        assert_eq!(key_command("Backspace", false, false), Some(KeyCommand::MoveToParent));
        assert_eq!(key_command("ArrowRight", false, false), None);
    }

    #[test]
    fn test_open_menu_only_closes() {
        assert_eq!(key_command("Escape", true, true), Some(KeyCommand::CloseMenu));
        assert_eq!(key_command("ArrowRight", true, true), None);
        assert_eq!(key_command("Backspace", false, true), None);
    }
}
