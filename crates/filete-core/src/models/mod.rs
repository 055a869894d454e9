//! Data models shared between the fetch layer and the tree.
//!
//! - [`SharedEntry`] - an entry as the server sends it
//! - [`ListingPayload`] - either listing shape the server may answer with
//! - [`EntryKind`] - FILE or DIRECTORY
//! - [`EntryRef`] - the addressing data needed to re-fetch or download an entry

mod entry;

pub use entry::{EntryKind, EntryRef, ListingPayload, SharedEntry, UnknownKind};
