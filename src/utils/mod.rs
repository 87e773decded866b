//! Host adapters over browser APIs.
//!
//! Provides:
//! - [`HttpFetcher`] - listing requests with per-ticket abort
//! - [`BrowserHistory`], [`SystemClock`] - history and time sources
//! - [`open_bookmark_storage`] - `localStorage` with an in-memory fallback
//! - [`logger`] - console backend for the `log` facade

pub mod dom;
mod fetch;
mod history;
pub mod logger;
mod storage;

pub use fetch::{CompletionFn, HttpFetcher};
pub use history::{BrowserHistory, SystemClock};
pub use storage::open_bookmark_storage;
