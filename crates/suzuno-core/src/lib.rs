//! Target-independent core of the suzuno gallery browser.
//!
//! Everything here is plain Rust: the browser front end implements the
//! collaborator traits in [`view`] and feeds events into
//! [`controller::NavigationController`].

pub mod bookmark;
pub mod config;
pub mod controller;
pub mod error;
pub mod format;
pub mod frame;
pub mod gesture;
pub mod pager;
pub mod path;
pub mod resource;
pub mod route;
pub mod slots;
pub mod tagger;
pub mod view;

pub use bookmark::{BookmarkItem, BookmarkList, KeyValueStorage, MemoryStorage, Tag};
pub use controller::{Collaborators, NavigationController, NavigationState};
pub use error::{FetchError, RouteError, StorageError};
pub use gesture::{GestureEvent, GestureTracker, Viewport};
pub use pager::PagingWindow;
pub use path::{Address, SortKey};
pub use resource::{Listing, Resource, ResourceEntry, ResourceKind};
pub use tagger::Tagger;
