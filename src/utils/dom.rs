//! DOM and Web API utility functions.
//!
//! Provides safe, consistent access to browser APIs with proper error handling.

use suzuno_core::{Address, Viewport};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::Closure;
use web_sys::{Storage, Window};

/// Get the browser window object.
#[inline]
pub fn window() -> Option<Window> {
    web_sys::window()
}

/// Get localStorage.
#[inline]
pub fn local_storage() -> Option<Storage> {
    window()?.local_storage().ok()?
}

/// Inner size of the window, used to classify pointer gestures.
pub fn viewport() -> Viewport {
    let dimension = |value: Option<wasm_bindgen::JsValue>| {
        value.and_then(|v| v.as_f64()).unwrap_or_default()
    };
    let window = window();
    Viewport {
        width: dimension(window.as_ref().and_then(|w| w.inner_width().ok())),
        height: dimension(window.as_ref().and_then(|w| w.inner_height().ok())),
    }
}

// =============================================================================
// Browser Navigation
// =============================================================================

/// The address currently shown in the address bar.
pub fn current_address() -> Address {
    let location = window().map(|w| w.location());
    let path = location
        .as_ref()
        .and_then(|l| l.pathname().ok())
        .unwrap_or_else(|| "/".to_string());
    let search = location
        .as_ref()
        .and_then(|l| l.search().ok())
        .unwrap_or_default();
    Address::parse(&format!("{path}{search}"))
}

/// Set the document title.
pub fn set_document_title(title: &str) {
    if let Some(document) = window().and_then(|w| w.document()) {
        document.set_title(title);
    }
}

// =============================================================================
// Frame Callbacks
// =============================================================================

/// Run `f` once before the next repaint.
///
/// Leptos flushes pending DOM updates in a microtask, so by the time `f`
/// runs the nodes for signals set earlier in the same event exist.
pub fn request_after_redraw(f: impl FnOnce() + 'static) {
    let Some(window) = window() else {
        return;
    };
    let closure = Closure::once_into_js(f);
    let _ = window.request_animation_frame(closure.unchecked_ref());
}
