//! DOM and Web API utility functions.
//!
//! Provides safe, consistent access to browser APIs with proper error handling.

use async_trait::async_trait;
use web_sys::{Document, HtmlElement, Window};

use filete_core::{PromptReply, TokenPrompt};

use crate::config::TOKEN_PROMPT;

/// Get the browser window object.
#[inline]
pub fn window() -> Option<Window> {
    web_sys::window()
}

/// Get the document object.
#[inline]
pub fn document() -> Option<Document> {
    window()?.document()
}

/// Get the document body.
#[inline]
pub fn body() -> Option<HtmlElement> {
    document()?.body()
}

/// Show a native prompt dialog.
///
/// `None` when the user dismissed it or no window is available.
pub fn prompt(message: &str) -> Option<String> {
    window()?.prompt_with_message(message).ok()?
}

// =============================================================================
// Token Prompt
// =============================================================================

/// Asks for the session token with the browser's native prompt.
#[derive(Clone, Copy, Debug)]
pub struct PromptDialog {
    message: &'static str,
}

impl PromptDialog {
    pub fn new() -> Self {
        Self {
            message: TOKEN_PROMPT,
        }
    }
}

impl Default for PromptDialog {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait(?Send)]
impl TokenPrompt for PromptDialog {
    async fn ask_token(&self) -> PromptReply {
        match prompt(self.message) {
            Some(value) => PromptReply::Entered(value),
            None => PromptReply::Cancelled,
        }
    }
}
