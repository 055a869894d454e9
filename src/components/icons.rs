//! Centralized icon definitions.
//!
//! Icon theme is configured in `config.rs` via `ICON_THEME`.
//! This module maps semantic icon names to the selected theme's icons.

use icondata::Icon;

use crate::config::IconTheme;

// =============================================================================
// Theme Imports
// =============================================================================

mod lucide {
    pub use icondata::{
        LuChevronDown as ChevronDown, LuChevronRight as ChevronRight, LuDownload as Download,
        LuEye as Eye, LuEyeOff as EyeOff, LuFile as File, LuFolder as Folder,
        LuFolderOpen as FolderOpen, LuKeyRound as Key, LuPencil as Edit, LuRefreshCw as Refresh,
        LuTriangleAlert as Warning, LuX as Close,
    };
}

mod bootstrap {
    pub use icondata::{
        BsArrowClockwise as Refresh, BsChevronDown as ChevronDown,
        BsChevronRight as ChevronRight, BsDownload as Download, BsExclamationTriangle as Warning,
        BsEye as Eye, BsEyeSlash as EyeOff, BsFileEarmark as File, BsFolder2Open as FolderOpen,
        BsFolderFill as Folder, BsKeyFill as Key, BsPencil as Edit, BsXLg as Close,
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

themed_icon!(CHEVRON_DOWN, ChevronDown);
themed_icon!(CHEVRON_RIGHT, ChevronRight);
themed_icon!(FOLDER, Folder);
themed_icon!(FOLDER_OPEN, FolderOpen);
themed_icon!(FILE, File);
themed_icon!(DOWNLOAD, Download);
themed_icon!(REFRESH, Refresh);
themed_icon!(WARNING, Warning);
themed_icon!(KEY, Key);
themed_icon!(EYE, Eye);
themed_icon!(EYE_OFF, EyeOff);
themed_icon!(EDIT, Edit);
themed_icon!(CLOSE, Close);
