//! Root application module.
//!
//! Contains the main App component, the AppContext definition and the
//! signal-backed handles that plug the reactive state into `filete-core`.

use leptos::prelude::*;

use filete_core::{
    ApiConfig, CredentialProvider, DirectoryFetcher, SessionCredential, SharedTree, TreeBrowser,
    TreeStore,
};

use crate::components::Layout;
use crate::config::{API_BASE_URL, NOTICE_DISMISS_MS};
use crate::utils::{BrowserDownloads, FetchTransport, PromptDialog};

// ============================================================================
// Signal Handles
// ============================================================================

/// Session token held in a signal, so the session bar redraws on change.
#[derive(Clone, Copy)]
pub struct SessionHandle(pub RwSignal<SessionCredential>);

impl CredentialProvider for SessionHandle {
    fn token(&self) -> String {
        self.0.with_untracked(|c| c.get().to_string())
    }

    fn store_token(&self, token: &str) -> bool {
        // Subscribers are only notified when the token actually changes.
        self.0
            .try_maybe_update(|c| {
                let changed = c.set(token);
                (changed, changed)
            })
            .unwrap_or(false)
    }
}

/// Shared tree held in a signal; every update redraws the browser panel.
#[derive(Clone, Copy)]
pub struct TreeHandle(pub RwSignal<SharedTree>);

impl TreeStore for TreeHandle {
    fn read_tree<R>(&self, f: impl FnOnce(&SharedTree) -> R) -> R {
        f(&self.0.read_untracked())
    }

    fn update_tree<R>(&self, f: impl FnOnce(&mut SharedTree) -> R) -> R {
        f(&mut self.0.write())
    }
}

/// Browsing session wired to the browser platform.
pub type WebBrowser =
    TreeBrowser<TreeHandle, FetchTransport, SessionHandle, PromptDialog, BrowserDownloads>;

// ============================================================================
// Notice
// ============================================================================

/// A transient message shown above the tree.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Notice {
    pub seq: u64,
    pub text: String,
}

// ============================================================================
// AppContext
// ============================================================================

/// Application-wide reactive context.
///
/// Provided at the root of the component tree and read by children with
/// `use_context::<AppContext>()`. All fields are signals, so the context is
/// `Copy`.
#[derive(Clone, Copy)]
pub struct AppContext {
    /// Session token and its display mode.
    pub session: SessionHandle,

    /// The shared-directory forest.
    pub tree: TreeHandle,

    /// Current download failure notice, if any.
    pub notice: RwSignal<Option<Notice>>,
}

impl AppContext {
    pub fn new() -> Self {
        Self {
            session: SessionHandle(RwSignal::new(SessionCredential::new())),
            tree: TreeHandle(RwSignal::new(SharedTree::new())),
            notice: RwSignal::new(None),
        }
    }

    /// Browsing session over this context's state.
    ///
    /// Built per interaction; every part is a cheap handle.
    pub fn browser(&self) -> WebBrowser {
        let fetcher = DirectoryFetcher::new(
            FetchTransport::new(),
            self.session,
            ApiConfig::new(API_BASE_URL),
        );
        TreeBrowser::new(self.tree, fetcher, PromptDialog::new(), BrowserDownloads)
    }

    /// Show `text` until dismissed or until `NOTICE_DISMISS_MS` elapse.
    pub fn show_notice(&self, text: String) {
        let seq = self
            .notice
            .with_untracked(|n| n.as_ref().map_or(0, |n| n.seq + 1));
        self.notice.set(Some(Notice { seq, text }));

        let notice = self.notice;
        wasm_bindgen_futures::spawn_local(async move {
            gloo_timers::future::TimeoutFuture::new(NOTICE_DISMISS_MS).await;
            // A newer notice owns its own timer.
            if notice.with_untracked(|n| n.as_ref().is_some_and(|n| n.seq == seq)) {
                notice.set(None);
            }
        });
    }

    pub fn dismiss_notice(&self) {
        self.notice.set(None);
    }
}

impl Default for AppContext {
    fn default() -> Self {
        Self::new()
    }
}

/// Root application component.
///
/// Creates and provides the global [`AppContext`], then renders the page.
#[component]
pub fn App() -> impl IntoView {
    let ctx = AppContext::new();
    provide_context(ctx);

    view! { <Layout /> }
}
