//! Scripted stand-ins for the platform seams, used by unit and integration
//! tests.

use std::cell::{Cell, RefCell};
use std::collections::{HashMap, VecDeque};

use async_trait::async_trait;

use crate::api::{ApiRequest, HttpResponse, HttpTransport};
use crate::credential::{PromptReply, TokenPrompt};
use crate::download::ObjectUrlHost;
use crate::error::{FetchError, SaveError};

// =============================================================================
// Transport
// =============================================================================

/// Answers requests from a URL-keyed table and records every request.
///
/// Unknown URLs get a 404. With `set_suspend(true)` every request yields to
/// the executor once before answering, so concurrent callers interleave.
#[derive(Default)]
pub struct ScriptedTransport {
    routes: RefCell<HashMap<String, Result<HttpResponse, FetchError>>>,
    requests: RefCell<Vec<ApiRequest>>,
    suspend: Cell<bool>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(&self, url: &str, response: HttpResponse) {
        self.routes
            .borrow_mut()
            .insert(url.to_string(), Ok(response));
    }

    /// 200 response with a JSON body.
    pub fn respond_json(&self, url: &str, json: &str) {
        self.respond(
            url,
            HttpResponse::new(200, json).with_header("content-type", "application/json"),
        );
    }

    pub fn fail(&self, url: &str, err: FetchError) {
        self.routes.borrow_mut().insert(url.to_string(), Err(err));
    }

    pub fn set_suspend(&self, suspend: bool) {
        self.suspend.set(suspend);
    }

    pub fn requests(&self) -> Vec<ApiRequest> {
        self.requests.borrow().clone()
    }

    pub fn request_count_for(&self, url: &str) -> usize {
        self.requests.borrow().iter().filter(|r| r.url == url).count()
    }
}

#[async_trait(?Send)]
impl HttpTransport for ScriptedTransport {
    async fn get(&self, request: ApiRequest) -> Result<HttpResponse, FetchError> {
        let url = request.url.clone();
        self.requests.borrow_mut().push(request);

        if self.suspend.get() {
            tokio::task::yield_now().await;
        }

        self.routes
            .borrow()
            .get(&url)
            .cloned()
            .unwrap_or_else(|| Ok(HttpResponse::new(404, "not found")))
    }
}

// =============================================================================
// Prompt
// =============================================================================

/// Replays a fixed list of answers; cancels once the list runs out.
#[derive(Default)]
pub struct ScriptedPrompt {
    replies: RefCell<VecDeque<PromptReply>>,
    asked: Cell<usize>,
}

impl ScriptedPrompt {
    pub fn new(replies: Vec<PromptReply>) -> Self {
        Self {
            replies: RefCell::new(replies.into()),
            asked: Cell::new(0),
        }
    }

    /// Queue another answer.
    pub fn push(&self, reply: PromptReply) {
        self.replies.borrow_mut().push_back(reply);
    }

    pub fn times_asked(&self) -> usize {
        self.asked.get()
    }
}

#[async_trait(?Send)]
impl TokenPrompt for ScriptedPrompt {
    async fn ask_token(&self) -> PromptReply {
        self.asked.set(self.asked.get() + 1);
        self.replies
            .borrow_mut()
            .pop_front()
            .unwrap_or(PromptReply::Cancelled)
    }
}

// =============================================================================
// Object URLs
// =============================================================================

/// One object URL created through [`RecordingHost`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CreatedUrl {
    pub url: String,
    pub bytes: Vec<u8>,
    pub mime: String,
}

/// Records object URL traffic instead of touching a browser.
#[derive(Default)]
pub struct RecordingHost {
    created: RefCell<Vec<CreatedUrl>>,
    revoked: RefCell<Vec<String>>,
    saved: RefCell<Vec<(String, String)>>,
    fail_save: Cell<bool>,
}

impl RecordingHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every following save fail.
    pub fn set_fail_save(&self, fail: bool) {
        self.fail_save.set(fail);
    }

    pub fn created(&self) -> Vec<CreatedUrl> {
        self.created.borrow().clone()
    }

    pub fn revoked(&self) -> Vec<String> {
        self.revoked.borrow().clone()
    }

    /// `(url, filename)` pairs that were handed to the user.
    pub fn saved(&self) -> Vec<(String, String)> {
        self.saved.borrow().clone()
    }

    /// Created URLs that were never revoked.
    pub fn live_urls(&self) -> Vec<String> {
        let revoked = self.revoked.borrow();
        self.created
            .borrow()
            .iter()
            .filter(|c| !revoked.contains(&c.url))
            .map(|c| c.url.clone())
            .collect()
    }
}

impl ObjectUrlHost for RecordingHost {
    fn create_object_url(&self, bytes: &[u8], mime: &str) -> Result<String, SaveError> {
        let mut created = self.created.borrow_mut();
        let url = format!("blob:mock/{}", created.len());
        created.push(CreatedUrl {
            url: url.clone(),
            bytes: bytes.to_vec(),
            mime: mime.to_string(),
        });
        Ok(url)
    }

    fn trigger_save(&self, url: &str, filename: &str) -> Result<(), SaveError> {
        if self.fail_save.get() {
            return Err(SaveError("save blocked".to_string()));
        }
        self.saved
            .borrow_mut()
            .push((url.to_string(), filename.to_string()));
        Ok(())
    }

    fn revoke_object_url(&self, url: &str) {
        self.revoked.borrow_mut().push(url.to_string());
    }
}
