//! Application configuration.
//!
//! Centralizes all configuration constants used throughout the application.

// =============================================================================
// Application Metadata
// =============================================================================

/// Application name shown in the header.
pub const APP_NAME: &str = "filete";

// =============================================================================
// Network Configuration
// =============================================================================

/// Prefix for API requests. Empty means same origin as the page.
pub const API_BASE_URL: &str = "";

/// Listing request timeout in milliseconds. Downloads are not timed out.
pub const LISTING_TIMEOUT_MS: i32 = 10000;

// =============================================================================
// Session Configuration
// =============================================================================

/// Message of the token prompt.
pub const TOKEN_PROMPT: &str = "Enter the session key:";

// =============================================================================
// UI Configuration
// =============================================================================

/// How long a download failure notice stays visible, in milliseconds.
pub const NOTICE_DISMISS_MS: u32 = 5000;

/// Most verbose level forwarded to the browser console.
pub const LOG_LEVEL: log::LevelFilter = log::LevelFilter::Info;

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
/// Change this value to switch icon styles globally.
pub const ICON_THEME: IconTheme = IconTheme::Bootstrap;
