use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::FetchError;

// =============================================================================
// Entry Kind
// =============================================================================

/// Kind discriminator of a shared entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EntryKind {
    File,
    Directory,
}

impl EntryKind {
    /// Wire code for files.
    pub const FILE_CODE: i64 = 0;
    /// Wire code for directories.
    pub const DIRECTORY_CODE: i64 = 1;

    /// The `fType` value sent on the wire.
    pub fn code(self) -> i64 {
        match self {
            Self::File => Self::FILE_CODE,
            Self::Directory => Self::DIRECTORY_CODE,
        }
    }
}

/// An `fType` value outside the known kinds.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct UnknownKind(pub i64);

impl fmt::Display for UnknownKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown entry kind {}", self.0)
    }
}

impl std::error::Error for UnknownKind {}

impl TryFrom<i64> for EntryKind {
    type Error = UnknownKind;

    fn try_from(code: i64) -> Result<Self, Self::Error> {
        match code {
            Self::FILE_CODE => Ok(Self::File),
            Self::DIRECTORY_CODE => Ok(Self::Directory),
            other => Err(UnknownKind(other)),
        }
    }
}

// =============================================================================
// Wire Types
// =============================================================================

/// A file or directory as served by `/api/shared-dir`.
///
/// `children` is `None` when the server did not read the directory and
/// `Some` (possibly empty) when it did. Files never carry meaningful children.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SharedEntry {
    /// Raw kind code; see [`EntryKind`]
    pub f_type: i64,
    /// Display name (not unique among siblings)
    pub name: String,
    /// Path relative to the owning root directory, `""` for the root itself
    #[serde(default)]
    pub path: String,
    /// Size in bytes (sum of listed children for directories)
    #[serde(default)]
    pub size: u64,
    /// Identifies the root directory this entry lives under
    #[serde(default)]
    pub root_dir_hash: String,
    /// Listed children, if the server read this directory
    #[serde(default)]
    pub children: Option<Vec<SharedEntry>>,
}

impl SharedEntry {
    /// Create a file entry.
    pub fn file(name: &str, path: &str, root_dir_hash: &str, size: u64) -> Self {
        Self {
            f_type: EntryKind::FILE_CODE,
            name: name.to_string(),
            path: path.to_string(),
            size,
            root_dir_hash: root_dir_hash.to_string(),
            children: None,
        }
    }

    /// Create a directory entry. `None` children means "not read yet".
    pub fn directory(
        name: &str,
        path: &str,
        root_dir_hash: &str,
        children: Option<Vec<SharedEntry>>,
    ) -> Self {
        let size = children
            .as_ref()
            .map(|c| c.iter().map(|e| e.size).sum::<u64>())
            .unwrap_or(0);
        Self {
            f_type: EntryKind::DIRECTORY_CODE,
            name: name.to_string(),
            path: path.to_string(),
            size,
            root_dir_hash: root_dir_hash.to_string(),
            children,
        }
    }

    /// Directory node standing in for the forest: its children are the roots.
    pub fn synthetic_root(roots: Vec<SharedEntry>) -> Self {
        Self::directory("", "", "", Some(roots))
    }

    /// Decode the kind, failing on codes this client does not know.
    pub fn kind(&self) -> Result<EntryKind, UnknownKind> {
        EntryKind::try_from(self.f_type)
    }

    /// True when the server read this directory, even if it found nothing.
    pub fn is_listed(&self) -> bool {
        self.children.is_some()
    }
}

/// Body of a listing response.
///
/// The forest call answers with an array of roots while a directory call
/// answers with the directory itself. The server also answers any request
/// without a `path` with the forest, whatever hash it was given.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum ListingPayload {
    Forest(Vec<SharedEntry>),
    Node(SharedEntry),
}

impl ListingPayload {
    /// The node addressed by `(path, root_dir_hash)`.
    ///
    /// A forest answering the forest call becomes a synthetic root. A forest
    /// answering a root request resolves to the root with that hash.
    pub fn into_addressed(
        self,
        path: &str,
        root_dir_hash: &str,
    ) -> Result<SharedEntry, FetchError> {
        match self {
            Self::Node(node) => Ok(node),
            Self::Forest(roots) if root_dir_hash.is_empty() => {
                Ok(SharedEntry::synthetic_root(roots))
            }
            Self::Forest(roots) if path.is_empty() => roots
                .into_iter()
                .find(|root| root.root_dir_hash == root_dir_hash)
                .ok_or_else(|| {
                    FetchError::UnexpectedListing(format!(
                        "no shared directory with hash {}",
                        root_dir_hash
                    ))
                }),
            Self::Forest(_) => Err(FetchError::UnexpectedListing(format!(
                "got the shared directory list for '{}'",
                path
            ))),
        }
    }
}

// =============================================================================
// Addressing
// =============================================================================

/// What the fetch layer needs to address an entry: kind, name and the
/// `(path, root_dir_hash)` key.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EntryRef {
    pub kind: EntryKind,
    pub name: String,
    pub path: String,
    pub root_dir_hash: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_kind_codes() {
        assert_eq!(EntryKind::try_from(0), Ok(EntryKind::File));
        assert_eq!(EntryKind::try_from(1), Ok(EntryKind::Directory));
        assert_eq!(EntryKind::try_from(7), Err(UnknownKind(7)));
        assert_eq!(EntryKind::Directory.code(), 1);
    }

    #[test]
    fn test_deserialize_server_entry() {
        let json = r#"{
            "fType": 1,
            "name": "docs",
            "path": "docs",
            "size": 12,
            "rootDirHash": "h1",
            "children": [
                {"fType": 0, "name": "a.pdf", "path": "docs/a.pdf", "size": 12, "rootDirHash": "h1", "children": null}
            ]
        }"#;
        let entry: SharedEntry = serde_json::from_str(json).unwrap();

        assert_eq!(entry.kind(), Ok(EntryKind::Directory));
        assert_eq!(entry.root_dir_hash, "h1");
        assert!(entry.is_listed());
        assert_eq!(
            entry.children.unwrap()[0],
            SharedEntry::file("a.pdf", "docs/a.pdf", "h1", 12)
        );
    }

    #[test]
    fn test_null_children_is_unread() {
        let json = r#"{"fType": 1, "name": "docs", "path": "docs", "size": 0, "rootDirHash": "h1", "children": null}"#;
        let entry: SharedEntry = serde_json::from_str(json).unwrap();
        assert_eq!(entry.children, None);
        assert!(!entry.is_listed());
    }

    #[test]
    fn test_missing_optional_fields() {
        let entry: SharedEntry = serde_json::from_str(r#"{"fType": 0, "name": "a.txt"}"#).unwrap();
        assert_eq!(entry, SharedEntry::file("a.txt", "", "", 0));
    }

    #[test]
    fn test_unknown_kind_survives_parsing() {
        let entry: SharedEntry =
            serde_json::from_str(r#"{"fType": 5, "name": "odd", "path": "odd"}"#).unwrap();
        assert_eq!(entry.kind(), Err(UnknownKind(5)));
    }

    #[test]
    fn test_empty_children_is_listed() {
        let json = r#"{"fType": 1, "name": "empty", "path": "", "rootDirHash": "h2", "children": []}"#;
        let entry: SharedEntry = serde_json::from_str(json).unwrap();
        assert_eq!(entry.children, Some(vec![]));
        assert!(entry.is_listed());
    }

    const FOREST_JSON: &str = r#"[
        {"fType": 1, "name": "share", "path": "", "rootDirHash": "h1", "children": [
            {"fType": 0, "name": "a.txt", "path": "a.txt", "size": 3, "rootDirHash": "h1"}
        ]},
        {"fType": 1, "name": "empty", "path": "", "rootDirHash": "h2", "children": []}
    ]"#;

    fn forest() -> ListingPayload {
        serde_json::from_str(FOREST_JSON).unwrap()
    }

    #[test]
    fn test_forest_call_yields_synthetic_root() {
        let node = forest().into_addressed("", "").unwrap();

        assert_eq!(node.kind(), Ok(EntryKind::Directory));
        assert_eq!(node.path, "");
        let names: Vec<_> = node.children.unwrap().into_iter().map(|c| c.name).collect();
        assert_eq!(names, vec!["share", "empty"]);
    }

    #[test]
    fn test_forest_for_root_request_picks_matching_root() {
        let node = forest().into_addressed("", "h1").unwrap();

        assert_eq!(node.name, "share");
        assert_eq!(
            node.children,
            Some(vec![SharedEntry::file("a.txt", "a.txt", "h1", 3)])
        );
    }

    #[test]
    fn test_forest_without_requested_root_is_an_error() {
        let err = forest().into_addressed("", "gone").unwrap_err();
        assert!(matches!(err, FetchError::UnexpectedListing(_)));
    }

    #[test]
    fn test_forest_for_subdirectory_is_an_error() {
        let err = forest().into_addressed("docs", "h1").unwrap_err();
        assert!(matches!(err, FetchError::UnexpectedListing(_)));
    }

    #[test]
    fn test_listing_payload_node_shape() {
        let json = r#"{"fType": 1, "name": "docs", "path": "docs", "rootDirHash": "h1", "children": []}"#;
        let payload = serde_json::from_str::<ListingPayload>(json).unwrap();
        let node = payload.into_addressed("docs", "h1").unwrap();

        assert_eq!(node.name, "docs");
        assert_eq!(node.children, Some(vec![]));
    }

    #[test]
    fn test_directory_size_sums_children() {
        let dir = SharedEntry::directory(
            "docs",
            "docs",
            "h1",
            Some(vec![
                SharedEntry::file("a", "docs/a", "h1", 10),
                SharedEntry::file("b", "docs/b", "h1", 5),
            ]),
        );
        assert_eq!(dir.size, 15);
    }
}
