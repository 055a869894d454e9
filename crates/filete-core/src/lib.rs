//! Core logic for the Filete shared-directory browser.
//!
//! Everything here is independent of the browser so it can be tested on the
//! host. The web crate plugs in the concrete pieces:
//!
//! - [`HttpTransport`] - performs one authenticated GET
//! - [`TokenPrompt`] - asks the user for a session token
//! - [`ObjectUrlHost`] - turns bytes into a saved file
//! - [`TreeStore`] - owns the [`SharedTree`] (a reactive signal in the UI)
//!
//! [`TreeBrowser`] ties them together: refresh, lazy expansion and downloads.

pub mod api;
pub mod browser;
pub mod credential;
pub mod dispatch;
pub mod download;
pub mod error;
pub mod models;
pub mod tree;
pub mod view;

#[cfg(any(test, feature = "mock"))]
pub mod mock;

pub use api::{ApiConfig, ApiRequest, DirectoryFetcher, HttpResponse, HttpTransport};
pub use browser::{EventOutcome, RefreshOutcome, ToggleOutcome, TreeBrowser};
pub use credential::{
    CredentialProvider, PromptReply, SessionCredential, TokenPrompt, acquire_token, change_token,
};
pub use dispatch::{NodeAction, NodeEvent, resolve_event};
pub use download::{DownloadController, DownloadReport, ObjectUrl, ObjectUrlHost};
pub use error::{CredentialError, DownloadError, FetchError, SaveError, TreeError};
pub use models::{EntryKind, EntryRef, ListingPayload, SharedEntry};
pub use tree::{
    ChildrenState, ExpandStep, ForestState, NodeBody, NodeId, RefreshApplied, RefreshTicket,
    SharedTree, ToggleStep, TreeNode, TreeStore,
};
pub use view::{ChildrenView, ForestStatus, ForestView, ViewNode, render_forest, render_node};
