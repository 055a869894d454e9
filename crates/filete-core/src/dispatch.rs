//! Maps user events on a node to the action they trigger.

use crate::error::TreeError;
use crate::models::{EntryKind, EntryRef};
use crate::tree::{NodeBody, NodeId, SharedTree};

/// A user interaction on a rendered node.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NodeEvent {
    /// Click on the node's label
    Activate,
    /// Explicit request to download a directory as a zip
    DownloadArchive,
}

/// What an event resolves to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NodeAction {
    /// Open or close a directory
    Toggle(NodeId),
    /// Save a file
    Download(EntryRef),
    /// Save a directory as a zip archive
    DownloadArchive(EntryRef),
    /// The event has no effect on this node
    Ignore,
}

/// Decide what `event` on `id` does.
///
/// Activating a directory toggles it and activating a file downloads it.
/// Archive download only applies to directories. Invalid nodes ignore
/// everything.
pub fn resolve_event(
    tree: &SharedTree,
    id: NodeId,
    event: NodeEvent,
) -> Result<NodeAction, TreeError> {
    let node = tree.lookup(id)?;

    let action = match (&node.body, event) {
        (NodeBody::Directory { .. }, NodeEvent::Activate) => NodeAction::Toggle(id),
        (NodeBody::File, NodeEvent::Activate) => {
            node.entry_ref().map_or(NodeAction::Ignore, NodeAction::Download)
        }
        (NodeBody::Directory { .. }, NodeEvent::DownloadArchive) => node
            .entry_ref()
            .filter(|e| e.kind == EntryKind::Directory)
            .map_or(NodeAction::Ignore, NodeAction::DownloadArchive),
        (NodeBody::File, NodeEvent::DownloadArchive) | (NodeBody::Invalid { .. }, _) => {
            NodeAction::Ignore
        }
    };
    Ok(action)
}
