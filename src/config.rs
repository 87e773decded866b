//! Browser front-end configuration.
//!
//! Constants shared by the components and the host adapters. Behavioral
//! tunables of the gallery itself live in `suzuno_core::config`.

// =============================================================================
// Application Metadata
// =============================================================================

/// Application name shown as the document title prefix.
pub const APP_NAME: &str = "suzuno";

/// Id of the element the application is mounted on.
pub const MOUNT_ELEMENT_ID: &str = "app";

// =============================================================================
// Logging
// =============================================================================

/// Maximum level forwarded to the browser console.
pub const LOG_LEVEL: log::LevelFilter = if cfg!(debug_assertions) {
    log::LevelFilter::Debug
} else {
    log::LevelFilter::Info
};

// =============================================================================
// List Configuration
// =============================================================================

/// Extra scroll applied past an entry brought into view, as a fraction of
/// the entry height.
pub const SCROLL_MARGIN_RATIO: f64 = 0.2;

// =============================================================================
// Storage
// =============================================================================

/// Logged when bookmarks fall back to in-memory storage.
pub const STORAGE_FALLBACK_NOTICE: &str = "localStorage unavailable; bookmarks will not persist";

// =============================================================================
// UI Configuration
// =============================================================================

/// Icon theme selection.
///
/// Available themes:
/// - `Bootstrap` - Familiar, slightly bolder (default)
/// - `Lucide` - Minimal, thin strokes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[allow(dead_code)]
pub enum IconTheme {
    #[default]
    Bootstrap,
    Lucide,
}

/// Current icon theme used throughout the application.
pub const ICON_THEME: IconTheme = IconTheme::Bootstrap;
