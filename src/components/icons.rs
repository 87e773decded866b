//! Centralized icon definitions.
//!
//! Icon theme is configured in `config.rs` via `ICON_THEME`.

use icondata::Icon;

use crate::config::IconTheme;

// =============================================================================
// Theme Imports
// =============================================================================

mod lucide {
    pub use icondata::{
        LuArrowDownUp as Sort, LuChevronLeft as Back, LuDownload as Download,
        LuFile as File, LuFolder as Folder, LuImage as Image, LuMenu as Menu,
        LuRotateCw as Rotate, LuSearch as Filter, LuStar as Bookmark, LuTag as Tag,
        LuTags as TagList, LuX as Close,
    };
}

mod bootstrap {
    pub use icondata::{
        BsArrowClockwise as Rotate, BsChevronLeft as Back, BsDownload as Download,
        BsFileEarmark as File, BsFileEarmarkImage as Image, BsFolderFill as Folder,
        BsFunnel as Filter, BsList as Menu, BsSortDown as Sort, BsStarFill as Bookmark,
        BsTag as Tag, BsTags as TagList, BsXLg as Close,
    };
}

// =============================================================================
// Icon Constants (selected based on theme)
// =============================================================================

macro_rules! themed_icon {
    ($name:ident, $theme_name:ident) => {
        pub const $name: Icon = match crate::config::ICON_THEME {
            IconTheme::Lucide => lucide::$theme_name,
            IconTheme::Bootstrap => bootstrap::$theme_name,
        };
    };
}

themed_icon!(BACK, Back);
themed_icon!(MENU, Menu);
themed_icon!(CLOSE, Close);
themed_icon!(FOLDER, Folder);
themed_icon!(FILE, File);
themed_icon!(IMAGE, Image);
themed_icon!(SORT, Sort);
themed_icon!(FILTER, Filter);
themed_icon!(BOOKMARK, Bookmark);
themed_icon!(TAG, Tag);
themed_icon!(TAG_LIST, TagList);
themed_icon!(ROTATE, Rotate);
themed_icon!(DOWNLOAD, Download);
