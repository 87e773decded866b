//! UI components built with Leptos.
//!
//! Each view module pairs a component with the adapter the controller
//! drives it through:
//!
//! - [`list`] - directory listing ([`ListView`](suzuno_core::view::ListView))
//! - [`navi`] - header and menu ([`NaviView`](suzuno_core::view::NaviView))
//! - [`pager`] - image pager ([`PagerSurface`](suzuno_core::view::PagerSurface))
//! - [`tagger`] - tag buttons and dialog ([`TagView`](suzuno_core::view::TagView))
//! - [`icons`] - Centralized icon definitions (change theme here)

pub mod icons;
pub mod list;
pub mod navi;
pub mod pager;
pub mod tagger;
