//! Session token state and acquisition.
//!
//! The token is an opaque bearer string. An empty token means "unset".
//! Requests read it through [`CredentialProvider`] right before they are
//! sent, so a token changed mid-session is picked up by the next request.

use std::cell::RefCell;
use std::rc::Rc;

use async_trait::async_trait;

use crate::error::CredentialError;

/// Character used for each token character while masked.
pub const MASK_CHAR: char = '*';

/// Display text while no token is set.
pub const UNSET_DISPLAY: &str = "<No Key>";

/// Current session token plus its display mode.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SessionCredential {
    token: String,
    revealed: bool,
}

impl SessionCredential {
    /// Unset, masked credential.
    pub fn new() -> Self {
        Self::default()
    }

    /// Masked credential holding `token`.
    pub fn with_token(token: &str) -> Self {
        Self {
            token: token.to_string(),
            revealed: false,
        }
    }

    /// Current token; empty when unset.
    pub fn get(&self) -> &str {
        &self.token
    }

    pub fn is_set(&self) -> bool {
        !self.token.is_empty()
    }

    /// Overwrite the token. Returns `false` (and changes nothing) when the
    /// value is identical, so callers can skip redrawing.
    pub fn set(&mut self, value: &str) -> bool {
        if self.token == value {
            return false;
        }
        self.token = value.to_string();
        true
    }

    pub fn is_revealed(&self) -> bool {
        self.revealed
    }

    /// Flip between masked and plain display. Returns the new mode.
    pub fn toggle_reveal(&mut self) -> bool {
        self.revealed = !self.revealed;
        self.revealed
    }

    /// Text for the token display node.
    pub fn display_text(&self) -> String {
        if !self.is_set() {
            UNSET_DISPLAY.to_string()
        } else if self.revealed {
            self.token.clone()
        } else {
            self.masked()
        }
    }

    /// One mask character per token character.
    pub fn masked(&self) -> String {
        std::iter::repeat_n(MASK_CHAR, self.token.chars().count()).collect()
    }

    /// Label for the show/hide control.
    pub fn toggle_label(&self) -> &'static str {
        if self.revealed { "Hide" } else { "Show" }
    }
}

// =============================================================================
// Provider and Prompt Seams
// =============================================================================

/// Read/write access to the session token, injected into everything that
/// talks to the server.
pub trait CredentialProvider {
    /// Token at call time; empty when unset.
    fn token(&self) -> String;

    /// Store a token. Returns `true` if the stored value changed.
    fn store_token(&self, token: &str) -> bool;
}

impl CredentialProvider for RefCell<SessionCredential> {
    fn token(&self) -> String {
        self.borrow().get().to_string()
    }

    fn store_token(&self, token: &str) -> bool {
        self.borrow_mut().set(token)
    }
}

impl<T: CredentialProvider + ?Sized> CredentialProvider for Rc<T> {
    fn token(&self) -> String {
        (**self).token()
    }

    fn store_token(&self, token: &str) -> bool {
        (**self).store_token(token)
    }
}

/// User's answer to a token prompt.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PromptReply {
    Entered(String),
    Cancelled,
}

/// Asks the user for a session token.
///
/// The future stays pending until the user answers or dismisses the prompt.
#[async_trait(?Send)]
pub trait TokenPrompt {
    async fn ask_token(&self) -> PromptReply;
}

#[async_trait(?Send)]
impl<T: TokenPrompt + ?Sized> TokenPrompt for Rc<T> {
    async fn ask_token(&self) -> PromptReply {
        (**self).ask_token().await
    }
}

/// Make sure a token is set before any request goes out.
///
/// Returns the stored token immediately when one exists. Otherwise keeps
/// prompting until a value that is not blank is entered, and stores it as
/// typed. A dismissed prompt ends
/// with [`CredentialError::Cancelled`] and the stored token untouched.
pub async fn acquire_token<C, P>(credential: &C, prompt: &P) -> Result<String, CredentialError>
where
    C: CredentialProvider + ?Sized,
    P: TokenPrompt + ?Sized,
{
    loop {
        let current = credential.token();
        if !current.is_empty() {
            return Ok(current);
        }

        match prompt.ask_token().await {
            PromptReply::Cancelled => {
                log::info!("Session token entry cancelled");
                return Err(CredentialError::Cancelled);
            }
            PromptReply::Entered(value) if value.trim().is_empty() => {
                log::debug!("Blank session token entered, asking again");
            }
            PromptReply::Entered(value) => {
                credential.store_token(&value);
            }
        }
    }
}

/// Ask for a replacement token once.
///
/// Returns whether the stored token changed. A dismissed prompt keeps the
/// current token and yields [`CredentialError::Cancelled`].
pub async fn change_token<C, P>(credential: &C, prompt: &P) -> Result<bool, CredentialError>
where
    C: CredentialProvider + ?Sized,
    P: TokenPrompt + ?Sized,
{
    match prompt.ask_token().await {
        PromptReply::Cancelled => Err(CredentialError::Cancelled),
        PromptReply::Entered(value) => {
            let changed = credential.store_token(&value);
            if changed {
                log::info!("Session token changed");
            }
            Ok(changed)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::ScriptedPrompt;

    #[test]
    fn test_unset_display() {
        let cred = SessionCredential::new();
        assert!(!cred.is_set());
        assert_eq!(cred.display_text(), "<No Key>");
        assert_eq!(cred.toggle_label(), "Show");
    }

    #[test]
    fn test_masked_length_matches_token() {
        for token in ["a", "abc123", "päßwörd", "0123456789abcdef"] {
            let cred = SessionCredential::with_token(token);
            assert_eq!(
                cred.display_text().chars().count(),
                token.chars().count(),
                "mask length for {token:?}"
            );
            assert!(cred.display_text().chars().all(|c| c == MASK_CHAR));
        }
    }

    #[test]
    fn test_toggle_reveal() {
        let mut cred = SessionCredential::with_token("abc123");
        assert_eq!(cred.display_text(), "******");

        assert!(cred.toggle_reveal());
        assert_eq!(cred.display_text(), "abc123");
        assert_eq!(cred.toggle_label(), "Hide");

        assert!(!cred.toggle_reveal());
        assert_eq!(cred.display_text(), "******");
        assert_eq!(cred.toggle_label(), "Show");
    }

    #[test]
    fn test_set_only_reports_changes() {
        let mut cred = SessionCredential::new();
        assert!(cred.set("abc"));
        assert!(!cred.set("abc"));
        assert!(cred.set("xyz"));
        assert_eq!(cred.get(), "xyz");
    }

    #[tokio::test]
    async fn test_acquire_returns_existing_token_without_prompting() {
        let cred = RefCell::new(SessionCredential::with_token("abc123"));
        let prompt = ScriptedPrompt::new(vec![]);

        assert_eq!(acquire_token(&cred, &prompt).await, Ok("abc123".to_string()));
        assert_eq!(prompt.times_asked(), 0);
    }

    #[tokio::test]
    async fn test_acquire_reprompts_on_empty_input() {
        let cred = RefCell::new(SessionCredential::new());
        let prompt = ScriptedPrompt::new(vec![
            PromptReply::Entered(String::new()),
            PromptReply::Entered("abc123".to_string()),
        ]);

        assert_eq!(acquire_token(&cred, &prompt).await, Ok("abc123".to_string()));
        assert_eq!(prompt.times_asked(), 2);
        assert_eq!(cred.borrow().get(), "abc123");
    }

    #[tokio::test]
    async fn test_acquire_keeps_entered_token_verbatim() {
        let cred = RefCell::new(SessionCredential::new());
        let prompt = ScriptedPrompt::new(vec![
            PromptReply::Entered("   ".to_string()),
            PromptReply::Entered(" abc123 ".to_string()),
        ]);

        assert_eq!(acquire_token(&cred, &prompt).await, Ok(" abc123 ".to_string()));
        assert_eq!(prompt.times_asked(), 2);
        assert_eq!(cred.borrow().get(), " abc123 ");
    }

    #[tokio::test]
    async fn test_acquire_cancel_leaves_token_unset() {
        let cred = RefCell::new(SessionCredential::new());
        let prompt = ScriptedPrompt::new(vec![PromptReply::Cancelled]);

        assert_eq!(
            acquire_token(&cred, &prompt).await,
            Err(CredentialError::Cancelled)
        );
        assert!(!cred.borrow().is_set());
    }

    #[tokio::test]
    async fn test_change_token_cancel_keeps_token() {
        let cred = RefCell::new(SessionCredential::with_token("old"));
        let prompt = ScriptedPrompt::new(vec![PromptReply::Cancelled]);

        assert_eq!(
            change_token(&cred, &prompt).await,
            Err(CredentialError::Cancelled)
        );
        assert_eq!(cred.borrow().get(), "old");
    }

    #[tokio::test]
    async fn test_change_token_reports_changes() {
        let cred = RefCell::new(SessionCredential::with_token("old"));
        let prompt = ScriptedPrompt::new(vec![
            PromptReply::Entered("old".to_string()),
            PromptReply::Entered("new".to_string()),
        ]);

        assert_eq!(change_token(&cred, &prompt).await, Ok(false));
        assert_eq!(change_token(&cred, &prompt).await, Ok(true));
        assert_eq!(cred.borrow().get(), "new");
    }
}
