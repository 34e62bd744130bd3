#![forbid(unsafe_code)]

//! DOM-like node tree.
//!
//! Nodes are reference counted: the rendering layer owns them through
//! [`NodeRef`] (strong) and everything else observes them through
//! [`WeakNode`]. Parent links are weak, child links are strong, so a detached
//! subtree is freed as soon as its owner drops it.
//!
//! # Invariants
//!
//! 1. A node has at most one parent.
//! 2. `append_child` never creates a cycle; appending an ancestor is refused.
//! 3. `contains` is inclusive: every node contains itself.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fmt;
use std::rc::{Rc, Weak};
use std::sync::atomic::{AtomicU64, Ordering};

/// Strong reference to a node.
pub type NodeRef = Rc<Node>;

/// Weak reference to a node.
pub type WeakNode = Weak<Node>;

/// Global counter for unique node IDs.
static NODE_ID_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Unique identifier for a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(u64);

impl NodeId {
    fn new() -> Self {
        Self(NODE_ID_COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    /// Get the raw ID value.
    #[inline]
    pub const fn id(self) -> u64 {
        self.0
    }
}

/// A single element in the tree.
pub struct Node {
    id: NodeId,
    tag: String,
    parent: RefCell<WeakNode>,
    children: RefCell<Vec<NodeRef>>,
    attributes: RefCell<BTreeMap<String, String>>,
}

impl Node {
    /// Create a detached node with the given tag name.
    #[must_use]
    pub fn new(tag: impl Into<String>) -> NodeRef {
        Rc::new(Self {
            id: NodeId::new(),
            tag: tag.into(),
            parent: RefCell::new(Weak::new()),
            children: RefCell::new(Vec::new()),
            attributes: RefCell::new(BTreeMap::new()),
        })
    }

    #[inline]
    pub fn id(&self) -> NodeId {
        self.id
    }

    #[inline]
    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// The parent node, if attached and still alive.
    pub fn parent(&self) -> Option<NodeRef> {
        self.parent.borrow().upgrade()
    }

    /// Snapshot of the children in document order.
    pub fn children(&self) -> Vec<NodeRef> {
        self.children.borrow().clone()
    }

    /// Whether `other` is this node or one of its descendants.
    pub fn contains(&self, other: &Node) -> bool {
        if self.id == other.id {
            return true;
        }
        let mut cursor = other.parent();
        while let Some(node) = cursor {
            if node.id == self.id {
                return true;
            }
            cursor = node.parent();
        }
        false
    }

    /// Append `child` as the last child, moving it from its previous parent.
    ///
    /// Returns `false` (and does nothing) if `child` is this node or one of
    /// its ancestors.
    pub fn append_child(self: &Rc<Self>, child: &NodeRef) -> bool {
        if child.contains(self) {
            return false;
        }
        child.detach();
        *child.parent.borrow_mut() = Rc::downgrade(self);
        self.children.borrow_mut().push(Rc::clone(child));
        true
    }

    /// Remove `child` from this node. Returns `false` if it was not a child.
    pub fn remove_child(&self, child: &Node) -> bool {
        let mut children = self.children.borrow_mut();
        let Some(idx) = children.iter().position(|c| c.id == child.id) else {
            return false;
        };
        let removed = children.remove(idx);
        *removed.parent.borrow_mut() = Weak::new();
        true
    }

    /// Detach this node from its parent. No-op when already detached.
    pub fn detach(&self) {
        if let Some(parent) = self.parent() {
            parent.remove_child(self);
        }
    }

    pub fn attribute(&self, name: &str) -> Option<String> {
        self.attributes.borrow().get(name).cloned()
    }

    pub fn set_attribute(&self, name: impl Into<String>, value: impl Into<String>) {
        self.attributes.borrow_mut().insert(name.into(), value.into());
    }

    /// Remove an attribute, returning its previous value.
    pub fn remove_attribute(&self, name: &str) -> Option<String> {
        self.attributes.borrow_mut().remove(name)
    }
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Node")
            .field("id", &self.id)
            .field("tag", &self.tag)
            .field("children", &self.children.borrow().len())
            .finish()
    }
}
