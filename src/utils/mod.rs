//! Browser bindings and display helpers.
//!
//! Provides:
//! - [`FetchTransport`] - `HttpTransport` over the Fetch API with timeout
//! - [`PromptDialog`] - session token prompt using `window.prompt`
//! - [`BrowserDownloads`] - object URLs and the save trigger
//! - [`logger`] - `log` backend for the browser console
//! - [`format`] - size formatting

mod blob;
pub mod dom;
mod fetch;
pub mod format;
pub mod logger;

pub use blob::BrowserDownloads;
pub use dom::PromptDialog;
pub use fetch::FetchTransport;
