//! Browsing session: refresh, lazy expansion and downloads over one tree.
//!
//! [`TreeBrowser`] owns no state of its own. The tree lives behind a
//! [`TreeStore`] and the token behind a [`CredentialProvider`]; every await
//! point sits between two short synchronous updates of the store, so user
//! interaction can interleave with requests in flight.

use crate::api::{DirectoryFetcher, HttpTransport};
use crate::credential::{CredentialProvider, TokenPrompt, acquire_token};
use crate::dispatch::{NodeAction, NodeEvent, resolve_event};
use crate::download::{DownloadController, DownloadReport, ObjectUrlHost};
use crate::error::{DownloadError, TreeError};
use crate::tree::{ExpandStep, NodeId, RefreshApplied, ToggleStep, TreeStore};
use crate::view::{ForestView, render_forest};

/// Result of a refresh.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// Token entry was dismissed; nothing was requested or changed.
    Cancelled,
    /// The forest was replaced by this many roots.
    Loaded(usize),
    /// The forest was replaced by a failure placeholder.
    Failed(String),
    /// A later refresh owns the forest; this result was dropped.
    Superseded,
}

/// Result of opening or closing a directory.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ToggleOutcome {
    Collapsed,
    /// Opened with children already in memory
    Expanded,
    /// Opened while an earlier request for it is still pending
    InFlight,
    /// Opened after fetching this many children
    Loaded(usize),
    /// Opened, but the listing failed
    Failed(String),
    /// Token entry was dismissed; the directory is closed again
    Cancelled,
    /// The forest was refreshed while the listing was in flight
    Discarded,
}

/// Result of a node event.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EventOutcome {
    Toggled(ToggleOutcome),
    Downloaded(Result<DownloadReport, DownloadError>),
    Ignored,
}

/// Drives a [`SharedTree`](crate::SharedTree) against the API.
pub struct TreeBrowser<S, T, C, P, H> {
    store: S,
    fetcher: DirectoryFetcher<T, C>,
    prompt: P,
    downloads: DownloadController<T, C, P, H>,
}

impl<S, T, C, P, H> TreeBrowser<S, T, C, P, H>
where
    S: TreeStore,
    T: HttpTransport + Clone,
    C: CredentialProvider + Clone,
    P: TokenPrompt + Clone,
    H: ObjectUrlHost,
{
    pub fn new(store: S, fetcher: DirectoryFetcher<T, C>, prompt: P, host: H) -> Self {
        let downloads = DownloadController::new(fetcher.clone(), prompt.clone(), host);
        Self {
            store,
            fetcher,
            prompt,
            downloads,
        }
    }

    /// Current render model.
    pub fn view(&self) -> ForestView {
        self.store.read_tree(render_forest)
    }

    /// Discard the forest and list the roots again.
    ///
    /// A token is acquired first; if the user backs out, the forest is left
    /// exactly as it was.
    pub async fn refresh(&self) -> RefreshOutcome {
        if acquire_token(self.fetcher.credential(), &self.prompt)
            .await
            .is_err()
        {
            return RefreshOutcome::Cancelled;
        }

        let ticket = self.store.update_tree(|tree| tree.begin_refresh());
        let result = self.fetcher.list_forest_roots().await;
        if let Err(err) = &result {
            log::error!("Failed to load shared directories: {}", err);
        }

        match self
            .store
            .update_tree(|tree| tree.complete_refresh(ticket, result))
        {
            RefreshApplied::Loaded { roots } => {
                log::info!("Loaded {} shared directories", roots);
                RefreshOutcome::Loaded(roots)
            }
            RefreshApplied::Failed(message) => RefreshOutcome::Failed(message),
            RefreshApplied::Superseded => RefreshOutcome::Superseded,
        }
    }

    /// Open a closed directory or close an open one.
    pub async fn toggle(&self, id: NodeId) -> Result<ToggleOutcome, TreeError> {
        match self.store.update_tree(|tree| tree.toggle(id))? {
            ToggleStep::Collapsed => Ok(ToggleOutcome::Collapsed),
            ToggleStep::Expanded(step) => Ok(self.follow_expand(id, step).await),
        }
    }

    /// Open a directory; a no-op apart from the open flag if it is already
    /// loaded or loading.
    pub async fn expand(&self, id: NodeId) -> Result<ToggleOutcome, TreeError> {
        let step = self.store.update_tree(|tree| tree.begin_expand(id))?;
        Ok(self.follow_expand(id, step).await)
    }

    async fn follow_expand(&self, id: NodeId, step: ExpandStep) -> ToggleOutcome {
        match step {
            ExpandStep::AlreadyLoaded => ToggleOutcome::Expanded,
            ExpandStep::InFlight => ToggleOutcome::InFlight,
            ExpandStep::Fetch {
                path,
                root_dir_hash,
            } => self.load_children(id, &path, &root_dir_hash).await,
        }
    }

    async fn load_children(&self, id: NodeId, path: &str, root_dir_hash: &str) -> ToggleOutcome {
        if acquire_token(self.fetcher.credential(), &self.prompt)
            .await
            .is_err()
        {
            if let Err(err) = self.store.update_tree(|tree| tree.abort_expand(id)) {
                log::debug!("Nothing to revert for {}: {}", id, err);
            }
            return ToggleOutcome::Cancelled;
        }

        let result = self.fetcher.list_children(path, root_dir_hash).await;
        let failure = result.as_ref().err().map(ToString::to_string);
        if let Some(message) = &failure {
            log::error!("Failed to list '{}': {}", path, message);
        }

        match self
            .store
            .update_tree(|tree| tree.complete_expand(id, result))
        {
            Ok(count) => match failure {
                Some(message) => ToggleOutcome::Failed(message),
                None => {
                    log::debug!("Listed {} children of '{}'", count, path);
                    ToggleOutcome::Loaded(count)
                }
            },
            Err(err) => {
                log::warn!("Dropping listing of '{}': {}", path, err);
                ToggleOutcome::Discarded
            }
        }
    }

    /// Run whatever `event` on `id` means for that node.
    pub async fn handle_event(
        &self,
        id: NodeId,
        event: NodeEvent,
    ) -> Result<EventOutcome, TreeError> {
        let action = self.store.read_tree(|tree| resolve_event(tree, id, event))?;
        let outcome = match action {
            NodeAction::Toggle(id) => EventOutcome::Toggled(self.toggle(id).await?),
            NodeAction::Download(entry) => {
                EventOutcome::Downloaded(self.downloads.download(&entry).await)
            }
            NodeAction::DownloadArchive(entry) => {
                EventOutcome::Downloaded(self.downloads.download_archive(&entry).await)
            }
            NodeAction::Ignore => EventOutcome::Ignored,
        };
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use crate::api::{ApiConfig, HttpResponse};
    use crate::credential::{PromptReply, SessionCredential};
    use crate::mock::{RecordingHost, ScriptedPrompt, ScriptedTransport};
    use crate::tree::{ChildrenState, NodeBody, SharedTree};
    use crate::view::{ChildrenView, ForestStatus, ViewNode};
    use pretty_assertions::assert_eq;

    const ROOTS_URL: &str = "/api/shared-dir?root-dir-hash=";
    const DOCS_URL: &str = "/api/shared-dir?root-dir-hash=h1&path=docs";

    const ROOTS_JSON: &str = r#"[
        {"fType": 0, "name": "a.txt", "path": "a.txt", "size": 3, "rootDirHash": "h1", "children": null},
        {"fType": 1, "name": "docs", "path": "docs", "size": 0, "rootDirHash": "h1", "children": null}
    ]"#;

    const DOCS_JSON: &str = r#"{
        "fType": 1, "name": "docs", "path": "docs", "size": 9, "rootDirHash": "h1",
        "children": [{"fType": 0, "name": "a.pdf", "path": "docs/a.pdf", "size": 9, "rootDirHash": "h1"}]
    }"#;

    type TestBrowser = TreeBrowser<
        Rc<RefCell<SharedTree>>,
        Rc<ScriptedTransport>,
        Rc<RefCell<SessionCredential>>,
        Rc<ScriptedPrompt>,
        Rc<RecordingHost>,
    >;

    struct Fixture {
        tree: Rc<RefCell<SharedTree>>,
        transport: Rc<ScriptedTransport>,
        credential: Rc<RefCell<SessionCredential>>,
        prompt: Rc<ScriptedPrompt>,
        host: Rc<RecordingHost>,
        browser: TestBrowser,
    }

    fn fixture(token: &str) -> Fixture {
        let tree = Rc::new(RefCell::new(SharedTree::new()));
        let transport = Rc::new(ScriptedTransport::new());
        let credential = Rc::new(RefCell::new(SessionCredential::with_token(token)));
        let prompt = Rc::new(ScriptedPrompt::new(vec![]));
        let host = Rc::new(RecordingHost::new());
        let fetcher =
            DirectoryFetcher::new(transport.clone(), credential.clone(), ApiConfig::default());
        let browser = TreeBrowser::new(tree.clone(), fetcher, prompt.clone(), host.clone());

        transport.respond_json(ROOTS_URL, ROOTS_JSON);
        transport.respond_json(DOCS_URL, DOCS_JSON);

        Fixture {
            tree,
            transport,
            credential,
            prompt,
            host,
            browser,
        }
    }

    impl Fixture {
        fn root(&self, name: &str) -> NodeId {
            let tree = self.tree.borrow();
            tree.roots()
                .iter()
                .copied()
                .find(|id| tree.node(*id).is_some_and(|n| n.name == name))
                .unwrap()
        }
    }

    #[tokio::test]
    async fn test_refresh_prompts_then_sends_token() {
        let fx = fixture("");
        fx.prompt.push(PromptReply::Entered("abc123".to_string()));

        assert_eq!(fx.browser.refresh().await, RefreshOutcome::Loaded(2));

        let requests = fx.transport.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].url, ROOTS_URL);
        assert_eq!(requests[0].authorization, "Bearer abc123");
        assert_eq!(fx.credential.borrow().get(), "abc123");
    }

    #[tokio::test]
    async fn test_cancelled_refresh_sends_nothing() {
        let fx = fixture("");

        assert_eq!(fx.browser.refresh().await, RefreshOutcome::Cancelled);

        assert!(fx.transport.requests().is_empty());
        assert_eq!(fx.browser.view().status, ForestStatus::Empty);
    }

    #[tokio::test]
    async fn test_cancelled_refresh_keeps_forest() {
        let fx = fixture("t");
        fx.browser.refresh().await;
        let before = fx.browser.view();

        fx.credential.borrow_mut().set("");
        assert_eq!(fx.browser.refresh().await, RefreshOutcome::Cancelled);

        assert_eq!(fx.browser.view(), before);
        assert_eq!(fx.transport.requests().len(), 1);
    }

    #[tokio::test]
    async fn test_roots_render_leaf_and_closed_directory() {
        let fx = fixture("t");
        fx.browser.refresh().await;

        let view = fx.browser.view();
        assert_eq!(view.status, ForestStatus::Ready);
        assert!(matches!(&view.roots[0], ViewNode::File { name, .. } if name == "a.txt"));
        assert!(matches!(
            &view.roots[1],
            ViewNode::Directory { name, expanded: false, children: ChildrenView::Collapsed, .. }
                if name == "docs"
        ));
        assert_eq!(fx.transport.request_count_for(DOCS_URL), 0);
    }

    #[tokio::test]
    async fn test_first_expansion_lists_once() {
        let fx = fixture("t");
        fx.browser.refresh().await;
        let docs = fx.root("docs");

        assert_eq!(fx.browser.toggle(docs).await, Ok(ToggleOutcome::Loaded(1)));
        assert_eq!(fx.browser.toggle(docs).await, Ok(ToggleOutcome::Collapsed));
        assert_eq!(fx.browser.toggle(docs).await, Ok(ToggleOutcome::Expanded));

        assert_eq!(fx.transport.request_count_for(DOCS_URL), 1);
        assert_eq!(fx.transport.requests().len(), 2);

        let tree = fx.tree.borrow();
        let children = tree.children(docs);
        assert_eq!(children.len(), 1);
        assert_eq!(tree.node(children[0]).unwrap().name, "a.pdf");
    }

    #[tokio::test]
    async fn test_concurrent_expansions_share_one_request() {
        let fx = fixture("t");
        fx.browser.refresh().await;
        let docs = fx.root("docs");
        fx.transport.set_suspend(true);

        let (first, second) = tokio::join!(fx.browser.expand(docs), fx.browser.expand(docs));

        let outcomes = [first.unwrap(), second.unwrap()];
        assert!(outcomes.contains(&ToggleOutcome::Loaded(1)));
        assert!(outcomes.contains(&ToggleOutcome::InFlight));
        assert_eq!(fx.transport.request_count_for(DOCS_URL), 1);
    }

    #[tokio::test]
    async fn test_overlapping_refreshes_keep_latest() {
        let fx = fixture("t");
        fx.transport.set_suspend(true);

        let (first, second) = tokio::join!(fx.browser.refresh(), fx.browser.refresh());

        let outcomes = [first, second];
        assert!(outcomes.contains(&RefreshOutcome::Loaded(2)));
        assert!(outcomes.contains(&RefreshOutcome::Superseded));
        assert!(!fx.tree.borrow().is_refreshing());
        assert_eq!(fx.browser.view().roots.len(), 2);
    }

    #[tokio::test]
    async fn test_failed_listing_is_inline_and_retryable() {
        let fx = fixture("t");
        fx.browser.refresh().await;
        let docs = fx.root("docs");
        let file = fx.root("a.txt");
        fx.transport
            .respond(DOCS_URL, HttpResponse::new(500, "Invalid rootDirHash"));

        assert_eq!(
            fx.browser.toggle(docs).await,
            Ok(ToggleOutcome::Failed(
                "HTTP error 500: Invalid rootDirHash".to_string()
            ))
        );
        // Siblings stay usable.
        assert!(fx.tree.borrow().node(file).is_some());

        fx.transport.respond_json(DOCS_URL, DOCS_JSON);
        fx.browser.toggle(docs).await.unwrap();
        assert_eq!(fx.browser.toggle(docs).await, Ok(ToggleOutcome::Loaded(1)));
        assert_eq!(fx.transport.request_count_for(DOCS_URL), 2);
    }

    #[tokio::test]
    async fn test_cancelled_expansion_reverts() {
        let fx = fixture("t");
        fx.browser.refresh().await;
        let docs = fx.root("docs");
        fx.credential.borrow_mut().set("");

        assert_eq!(fx.browser.toggle(docs).await, Ok(ToggleOutcome::Cancelled));

        assert_eq!(
            fx.tree.borrow().node(docs).unwrap().body,
            NodeBody::Directory {
                children: ChildrenState::NotLoaded,
                expanded: false
            }
        );
        assert_eq!(fx.transport.request_count_for(DOCS_URL), 0);
    }

    #[tokio::test]
    async fn test_file_event_downloads_without_touching_tree() {
        let fx = fixture("t");
        fx.browser.refresh().await;
        let file = fx.root("a.txt");
        fx.transport.respond(
            "/api/download?path=a.txt&root-dir-hash=h1",
            HttpResponse::new(200, "abc"),
        );
        let before = fx.tree.borrow().clone();

        let outcome = fx.browser.handle_event(file, NodeEvent::Activate).await;

        assert_eq!(
            outcome,
            Ok(EventOutcome::Downloaded(Ok(DownloadReport {
                filename: "a.txt".to_string(),
                bytes: 3
            })))
        );
        assert_eq!(*fx.tree.borrow(), before);
        assert_eq!(fx.host.saved().len(), 1);
    }

    #[tokio::test]
    async fn test_rejected_download_leaves_tree_alone() {
        let fx = fixture("t");
        fx.browser.refresh().await;
        let file = fx.root("a.txt");
        fx.transport.respond(
            "/api/download?path=a.txt&root-dir-hash=h1",
            HttpResponse::new(404, "not found"),
        );
        let before = fx.browser.view();

        let outcome = fx.browser.handle_event(file, NodeEvent::Activate).await;

        assert!(matches!(
            outcome,
            Ok(EventOutcome::Downloaded(Err(DownloadError::Rejected { status: 404, .. })))
        ));
        assert!(fx.host.saved().is_empty());
        assert_eq!(fx.browser.view(), before);
    }

    #[tokio::test]
    async fn test_directory_event_toggles() {
        let fx = fixture("t");
        fx.browser.refresh().await;
        let docs = fx.root("docs");

        assert_eq!(
            fx.browser.handle_event(docs, NodeEvent::Activate).await,
            Ok(EventOutcome::Toggled(ToggleOutcome::Loaded(1)))
        );
    }

    const SHARES_JSON: &str = r#"[
        {"fType": 1, "name": "empty", "path": "", "size": 0, "rootDirHash": "h2", "children": []},
        {"fType": 1, "name": "photos", "path": "", "size": 0, "rootDirHash": "p1", "children": null}
    ]"#;

    #[tokio::test]
    async fn test_empty_root_opens_without_listing() {
        let fx = fixture("t");
        fx.transport.respond_json(ROOTS_URL, SHARES_JSON);
        // The server answers any request without a path with every root.
        fx.transport
            .respond_json("/api/shared-dir?root-dir-hash=h2", SHARES_JSON);
        fx.browser.refresh().await;
        let empty = fx.root("empty");

        assert_eq!(fx.browser.toggle(empty).await, Ok(ToggleOutcome::Expanded));

        assert_eq!(fx.transport.requests().len(), 1);
        assert!(fx.tree.borrow().children(empty).is_empty());
        assert_eq!(fx.tree.borrow().len(), 2);
    }

    #[tokio::test]
    async fn test_unread_root_takes_its_own_entry_from_forest() {
        let fx = fixture("t");
        fx.transport.respond_json(ROOTS_URL, SHARES_JSON);
        fx.transport.respond_json(
            "/api/shared-dir?root-dir-hash=p1",
            r#"[
                {"fType": 1, "name": "empty", "path": "", "rootDirHash": "h2", "children": []},
                {"fType": 1, "name": "photos", "path": "", "rootDirHash": "p1", "children": [
                    {"fType": 0, "name": "beach.jpg", "path": "beach.jpg", "size": 5, "rootDirHash": "p1"}
                ]}
            ]"#,
        );
        fx.browser.refresh().await;
        let photos = fx.root("photos");

        assert_eq!(fx.browser.toggle(photos).await, Ok(ToggleOutcome::Loaded(1)));

        let tree = fx.tree.borrow();
        let children = tree.children(photos);
        assert_eq!(children.len(), 1);
        let beach = tree.node(children[0]).unwrap();
        assert_eq!(beach.name, "beach.jpg");
        assert_eq!(beach.root_dir_hash, "p1");
    }

    #[tokio::test]
    async fn test_unknown_kind_renders_diagnostic() {
        let fx = fixture("t");
        fx.transport.respond_json(
            ROOTS_URL,
            r#"[
                {"fType": 7, "name": "mystery", "path": "mystery", "rootDirHash": "h1"},
                {"fType": 0, "name": "a.txt", "path": "a.txt", "rootDirHash": "h1"}
            ]"#,
        );

        assert_eq!(fx.browser.refresh().await, RefreshOutcome::Loaded(2));

        let view = fx.browser.view();
        assert!(matches!(&view.roots[0], ViewNode::Invalid { f_type: 7, .. }));
        assert!(matches!(&view.roots[1], ViewNode::File { .. }));
        assert_eq!(fx.tree.borrow().invalid_nodes().count(), 1);
    }
}
