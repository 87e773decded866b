//! Session history and wall clock adapters.

use log::warn;
use suzuno_core::Address;
use suzuno_core::view::{Clock, HistorySink};
use wasm_bindgen::JsValue;

use crate::utils::dom;

/// Records navigations with `pushState` / `replaceState`.
pub struct BrowserHistory;

impl HistorySink for BrowserHistory {
    fn record(&mut self, location: &Address, replacing: bool) {
        let Some(history) = dom::window().and_then(|w| w.history().ok()) else {
            return;
        };

        let url = location.to_string();
        let result = if replacing {
            history.replace_state_with_url(&JsValue::NULL, "", Some(&url))
        } else {
            history.push_state_with_url(&JsValue::NULL, "", Some(&url))
        };
        if let Err(err) = result {
            warn!("failed to record {url} in history: {err:?}");
        }
    }
}

/// `Date.now()`.
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> f64 {
        js_sys::Date::now()
    }
}
