//! In-memory forest of shared entries with lazily loaded directories.
//!
//! Nodes live in an arena owned by [`SharedTree`] and are addressed by
//! [`NodeId`]. Every id carries the generation of the forest it was created
//! in; a completed refresh starts a new generation, so results addressed to
//! nodes of a replaced forest are recognised and dropped.
//!
//! # Directory lifecycle
//!
//! ```text
//! NotLoaded --begin_expand--> Loading --complete_expand(Ok)--> Loaded
//!     ^                          |
//!     +------abort_expand--------+--complete_expand(Err)--> Failed
//!                                                             |
//!                      Loading <-----begin_expand-------------+
//! ```
//!
//! `Loaded` is final: children are never re-fetched. Only a refresh, which
//! replaces the whole forest, observes later changes on the server.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use crate::error::{FetchError, TreeError};
use crate::models::{EntryKind, EntryRef, SharedEntry};

// =============================================================================
// Identity
// =============================================================================

/// Identity of a node: forest generation plus arena slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId {
    generation: u32,
    index: u32,
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.generation, self.index)
    }
}

/// Handed out by [`SharedTree::begin_refresh`]; only the newest ticket may
/// replace the forest.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RefreshTicket(u64);

// =============================================================================
// Nodes
// =============================================================================

/// Load state of a directory's children.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ChildrenState {
    NotLoaded,
    /// A listing request is in flight
    Loading,
    Loaded(Vec<NodeId>),
    /// The last listing attempt failed
    Failed(String),
}

/// What a node is.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NodeBody {
    File,
    Directory {
        children: ChildrenState,
        expanded: bool,
    },
    /// The server sent an `fType` this client does not know.
    Invalid { f_type: i64 },
}

/// One entry in the forest.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TreeNode {
    pub id: NodeId,
    pub parent: Option<NodeId>,
    pub name: String,
    pub path: String,
    pub size: u64,
    pub root_dir_hash: String,
    pub body: NodeBody,
}

impl TreeNode {
    /// Addressing data for requests. `None` for invalid nodes.
    pub fn entry_ref(&self) -> Option<EntryRef> {
        let kind = match self.body {
            NodeBody::File => EntryKind::File,
            NodeBody::Directory { .. } => EntryKind::Directory,
            NodeBody::Invalid { .. } => return None,
        };
        Some(EntryRef {
            kind,
            name: self.name.clone(),
            path: self.path.clone(),
            root_dir_hash: self.root_dir_hash.clone(),
        })
    }
}

/// Load state of the forest itself.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum ForestState {
    /// Nothing fetched yet
    #[default]
    Unloaded,
    Loaded(Vec<NodeId>),
    /// The last refresh failed
    Failed(String),
}

// =============================================================================
// Transitions
// =============================================================================

/// Outcome of asking a directory to expand.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ExpandStep {
    /// Children must be fetched for this `(path, root_dir_hash)`.
    Fetch { path: String, root_dir_hash: String },
    /// Children are already in memory.
    AlreadyLoaded,
    /// Another expansion of this directory is still waiting on the server.
    InFlight,
}

/// Outcome of a toggle.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ToggleStep {
    Collapsed,
    Expanded(ExpandStep),
}

/// How a completed refresh was applied.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RefreshApplied {
    Loaded { roots: usize },
    Failed(String),
    /// A newer refresh was started meanwhile; the result was dropped.
    Superseded,
}

/// The shared-directory forest.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SharedTree {
    generation: u32,
    nodes: Vec<TreeNode>,
    forest: ForestState,
    issued_ticket: u64,
    pending: Option<RefreshTicket>,
}

impl SharedTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Forest built from already fetched roots.
    pub fn from_roots(roots: Vec<SharedEntry>) -> Self {
        let mut tree = Self::new();
        let ticket = tree.begin_refresh();
        tree.complete_refresh(ticket, Ok(roots));
        tree
    }

    pub fn forest(&self) -> &ForestState {
        &self.forest
    }

    /// Root ids; empty unless the forest is loaded.
    pub fn roots(&self) -> &[NodeId] {
        match &self.forest {
            ForestState::Loaded(roots) => roots,
            _ => &[],
        }
    }

    /// True while a refresh is waiting on the server.
    pub fn is_refreshing(&self) -> bool {
        self.pending.is_some()
    }

    /// Number of nodes in the current forest.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, id: NodeId) -> Option<&TreeNode> {
        if id.generation != self.generation {
            return None;
        }
        self.nodes.get(id.index as usize)
    }

    /// Like [`node`](Self::node), but says why the id does not resolve.
    pub fn lookup(&self, id: NodeId) -> Result<&TreeNode, TreeError> {
        self.node(id).ok_or_else(|| self.missing(id))
    }

    fn node_mut(&mut self, id: NodeId) -> Result<&mut TreeNode, TreeError> {
        if id.generation != self.generation {
            return Err(TreeError::StaleNode(id));
        }
        self.nodes
            .get_mut(id.index as usize)
            .ok_or(TreeError::UnknownNode(id))
    }

    /// Children of a loaded directory; empty otherwise.
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        match self.node(id).map(|n| &n.body) {
            Some(NodeBody::Directory {
                children: ChildrenState::Loaded(children),
                ..
            }) => children,
            _ => &[],
        }
    }

    /// Nodes whose kind the server reported as unknown.
    pub fn invalid_nodes(&self) -> impl Iterator<Item = &TreeNode> {
        self.nodes
            .iter()
            .filter(|n| matches!(n.body, NodeBody::Invalid { .. }))
    }

    // -------------------------------------------------------------------------
    // Refresh
    // -------------------------------------------------------------------------

    /// Mark a refresh as started. The current forest stays visible until the
    /// result arrives.
    pub fn begin_refresh(&mut self) -> RefreshTicket {
        self.issued_ticket += 1;
        let ticket = RefreshTicket(self.issued_ticket);
        self.pending = Some(ticket);
        ticket
    }

    /// Replace the forest with a refresh result.
    ///
    /// Success or failure, the previous forest is discarded and a new
    /// generation starts. Results for any ticket but the newest are dropped.
    pub fn complete_refresh(
        &mut self,
        ticket: RefreshTicket,
        result: Result<Vec<SharedEntry>, FetchError>,
    ) -> RefreshApplied {
        if self.pending != Some(ticket) {
            log::warn!("Dropping result of superseded refresh {:?}", ticket);
            return RefreshApplied::Superseded;
        }
        self.pending = None;
        self.generation = self.generation.wrapping_add(1);
        self.nodes.clear();

        match result {
            Ok(entries) => {
                let roots: Vec<NodeId> = entries
                    .into_iter()
                    .map(|entry| self.insert(entry, None))
                    .collect();
                log::debug!(
                    "Forest generation {} loaded: {} roots, {} nodes",
                    self.generation,
                    roots.len(),
                    self.nodes.len()
                );
                let count = roots.len();
                self.forest = ForestState::Loaded(roots);
                RefreshApplied::Loaded { roots: count }
            }
            Err(err) => {
                let message = err.to_string();
                self.forest = ForestState::Failed(message.clone());
                RefreshApplied::Failed(message)
            }
        }
    }

    /// Add `entry` (and any children it carries) under `parent`.
    fn insert(&mut self, entry: SharedEntry, parent: Option<NodeId>) -> NodeId {
        let id = NodeId {
            generation: self.generation,
            index: self.nodes.len() as u32,
        };

        // Descendants always share their root's hash.
        let root_dir_hash = match parent.and_then(|p| self.node(p)) {
            Some(p) => {
                if !entry.root_dir_hash.is_empty() && entry.root_dir_hash != p.root_dir_hash {
                    log::debug!(
                        "Entry '{}' reported root hash {} under {}, using parent's",
                        entry.path,
                        entry.root_dir_hash,
                        p.root_dir_hash
                    );
                }
                p.root_dir_hash.clone()
            }
            None => entry.root_dir_hash.clone(),
        };

        let kind = entry.kind();
        let prefetched = match kind {
            Ok(EntryKind::Directory) if entry.is_listed() => entry.children,
            _ => None,
        };
        let body = match kind {
            Ok(EntryKind::File) => NodeBody::File,
            Ok(EntryKind::Directory) => NodeBody::Directory {
                children: ChildrenState::NotLoaded,
                expanded: false,
            },
            Err(unknown) => {
                log::error!("Entry '{}' has {}", entry.path, unknown);
                NodeBody::Invalid { f_type: unknown.0 }
            }
        };

        self.nodes.push(TreeNode {
            id,
            parent,
            name: entry.name,
            path: entry.path,
            size: entry.size,
            root_dir_hash,
            body,
        });

        if let Some(children) = prefetched {
            let ids = children
                .into_iter()
                .map(|child| self.insert(child, Some(id)))
                .collect();
            if let Some(NodeBody::Directory { children, .. }) =
                self.nodes.get_mut(id.index as usize).map(|n| &mut n.body)
            {
                *children = ChildrenState::Loaded(ids);
            }
        }

        id
    }

    // -------------------------------------------------------------------------
    // Expansion
    // -------------------------------------------------------------------------

    /// Open a directory, deciding whether its children must be fetched.
    ///
    /// A `Fetch` answer moves the directory to `Loading`, which turns every
    /// further expansion into `InFlight` until the result is applied.
    pub fn begin_expand(&mut self, id: NodeId) -> Result<ExpandStep, TreeError> {
        let node = self.node_mut(id)?;
        let path = node.path.clone();
        let root_dir_hash = node.root_dir_hash.clone();

        let NodeBody::Directory { children, expanded } = &mut node.body else {
            return Err(TreeError::NotADirectory(id));
        };
        *expanded = true;

        let step = match children {
            ChildrenState::Loaded(_) => ExpandStep::AlreadyLoaded,
            ChildrenState::Loading => ExpandStep::InFlight,
            ChildrenState::NotLoaded | ChildrenState::Failed(_) => {
                *children = ChildrenState::Loading;
                ExpandStep::Fetch {
                    path,
                    root_dir_hash,
                }
            }
        };
        Ok(step)
    }

    /// Undo a `Fetch` that never went out (token entry was cancelled).
    pub fn abort_expand(&mut self, id: NodeId) -> Result<(), TreeError> {
        let node = self.node_mut(id)?;
        let NodeBody::Directory { children, expanded } = &mut node.body else {
            return Err(TreeError::NotADirectory(id));
        };
        if *children == ChildrenState::Loading {
            *children = ChildrenState::NotLoaded;
            *expanded = false;
        }
        Ok(())
    }

    /// Apply a listing result to a directory in `Loading` state.
    ///
    /// Returns the number of children inserted. A failure is stored on the
    /// directory and rendered in place of its children.
    pub fn complete_expand(
        &mut self,
        id: NodeId,
        result: Result<SharedEntry, FetchError>,
    ) -> Result<usize, TreeError> {
        let node = self.node_mut(id)?;
        let NodeBody::Directory { children, .. } = &mut node.body else {
            return Err(TreeError::NotADirectory(id));
        };
        if *children != ChildrenState::Loading {
            log::warn!("Ignoring listing for {} which is not loading", id);
            return Ok(0);
        }

        match result {
            Ok(listed) => {
                let entries = listed.children.unwrap_or_default();
                let ids: Vec<NodeId> = entries
                    .into_iter()
                    .map(|child| self.insert(child, Some(id)))
                    .collect();
                let count = ids.len();
                if let NodeBody::Directory { children, .. } = &mut self.node_mut(id)?.body {
                    *children = ChildrenState::Loaded(ids);
                }
                Ok(count)
            }
            Err(err) => {
                *children = ChildrenState::Failed(err.to_string());
                Ok(0)
            }
        }
    }

    pub fn collapse(&mut self, id: NodeId) -> Result<(), TreeError> {
        match &mut self.node_mut(id)?.body {
            NodeBody::Directory { expanded, .. } => {
                *expanded = false;
                Ok(())
            }
            _ => Err(TreeError::NotADirectory(id)),
        }
    }

    /// Collapse an open directory or expand a closed one.
    pub fn toggle(&mut self, id: NodeId) -> Result<ToggleStep, TreeError> {
        let expanded = match &self.lookup(id)?.body {
            NodeBody::Directory { expanded, .. } => *expanded,
            _ => return Err(TreeError::NotADirectory(id)),
        };
        if expanded {
            self.collapse(id)?;
            Ok(ToggleStep::Collapsed)
        } else {
            self.begin_expand(id).map(ToggleStep::Expanded)
        }
    }

    fn missing(&self, id: NodeId) -> TreeError {
        if id.generation != self.generation {
            TreeError::StaleNode(id)
        } else {
            TreeError::UnknownNode(id)
        }
    }
}

// =============================================================================
// Storage Seam
// =============================================================================

/// Owner of the [`SharedTree`].
///
/// Async operations never hold the tree across a request: they read or
/// update it in short synchronous sections around each await.
pub trait TreeStore {
    fn read_tree<R>(&self, f: impl FnOnce(&SharedTree) -> R) -> R;
    fn update_tree<R>(&self, f: impl FnOnce(&mut SharedTree) -> R) -> R;
}

impl TreeStore for RefCell<SharedTree> {
    fn read_tree<R>(&self, f: impl FnOnce(&SharedTree) -> R) -> R {
        f(&self.borrow())
    }

    fn update_tree<R>(&self, f: impl FnOnce(&mut SharedTree) -> R) -> R {
        f(&mut self.borrow_mut())
    }
}

impl<T: TreeStore + ?Sized> TreeStore for Rc<T> {
    fn read_tree<R>(&self, f: impl FnOnce(&SharedTree) -> R) -> R {
        (**self).read_tree(f)
    }

    fn update_tree<R>(&self, f: impl FnOnce(&mut SharedTree) -> R) -> R {
        (**self).update_tree(f)
    }
}
