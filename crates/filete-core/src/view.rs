//! Render model of the forest.
//!
//! Pure functions turning a [`SharedTree`] into a nested description the UI
//! draws one-to-one. Collapsed directories render no children, so hidden
//! subtrees cost nothing.

use crate::tree::{ChildrenState, ForestState, NodeBody, NodeId, SharedTree};

/// What the forest area shows.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ForestStatus {
    /// Nothing requested yet
    Empty,
    Ready,
    /// Last refresh failed with this message
    Failed(String),
}

/// Whole forest ready to draw.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ForestView {
    pub status: ForestStatus,
    /// A refresh is in flight (the UI disables the refresh button)
    pub refreshing: bool,
    pub roots: Vec<ViewNode>,
}

/// Children area of an expanded directory.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ChildrenView {
    /// Directory is closed
    Collapsed,
    Loading,
    Failed(String),
    Loaded(Vec<ViewNode>),
}

/// One drawable node.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ViewNode {
    File {
        id: NodeId,
        name: String,
        size: u64,
    },
    Directory {
        id: NodeId,
        name: String,
        size: u64,
        expanded: bool,
        children: ChildrenView,
    },
    Invalid {
        id: NodeId,
        name: String,
        f_type: i64,
    },
}

impl ViewNode {
    pub fn id(&self) -> NodeId {
        match self {
            Self::File { id, .. } | Self::Directory { id, .. } | Self::Invalid { id, .. } => *id,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Self::File { name, .. } | Self::Directory { name, .. } | Self::Invalid { name, .. } => {
                name
            }
        }
    }
}

pub fn render_forest(tree: &SharedTree) -> ForestView {
    let status = match tree.forest() {
        ForestState::Unloaded => ForestStatus::Empty,
        ForestState::Loaded(_) => ForestStatus::Ready,
        ForestState::Failed(message) => ForestStatus::Failed(message.clone()),
    };
    ForestView {
        status,
        refreshing: tree.is_refreshing(),
        roots: tree
            .roots()
            .iter()
            .filter_map(|id| render_node(tree, *id))
            .collect(),
    }
}

/// Render `id` and its visible descendants. `None` for ids outside the
/// current forest.
pub fn render_node(tree: &SharedTree, id: NodeId) -> Option<ViewNode> {
    let node = tree.node(id)?;
    let view = match &node.body {
        NodeBody::File => ViewNode::File {
            id,
            name: node.name.clone(),
            size: node.size,
        },
        NodeBody::Invalid { f_type } => ViewNode::Invalid {
            id,
            name: node.name.clone(),
            f_type: *f_type,
        },
        NodeBody::Directory { children, expanded } => {
            let children = if !expanded {
                ChildrenView::Collapsed
            } else {
                match children {
                    // Only reachable through abort_expand races; show as closed.
                    ChildrenState::NotLoaded => ChildrenView::Collapsed,
                    ChildrenState::Loading => ChildrenView::Loading,
                    ChildrenState::Failed(message) => ChildrenView::Failed(message.clone()),
                    ChildrenState::Loaded(ids) => ChildrenView::Loaded(
                        ids.iter().filter_map(|c| render_node(tree, *c)).collect(),
                    ),
                }
            };
            ViewNode::Directory {
                id,
                name: node.name.clone(),
                size: node.size,
                expanded: *expanded,
                children,
            }
        }
    };
    Some(view)
}
