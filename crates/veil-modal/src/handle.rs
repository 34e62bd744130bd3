#![forbid(unsafe_code)]

//! Weak handles to rendered nodes.
//!
//! The rendering layer owns the nodes; the controller only observes them.
//! A handle is unset before mount, after unmount, and once the node has been
//! freed. Every consumer treats "unset" as a valid state.

use std::rc::Rc;

use veil_core::{Node, NodeRef, WeakNode};

#[derive(Debug, Clone, Default)]
struct NodeHandle(Option<WeakNode>);

impl NodeHandle {
    fn bind(&mut self, node: &NodeRef) {
        self.0 = Some(Rc::downgrade(node));
    }

    fn clear(&mut self) {
        self.0 = None;
    }

    fn get(&self) -> Option<NodeRef> {
        self.0.as_ref().and_then(WeakNode::upgrade)
    }
}

/// Root node of the rendered dialog panel.
#[derive(Debug, Clone, Default)]
pub struct FrameHandle(NodeHandle);

impl FrameHandle {
    pub fn bind(&mut self, node: &NodeRef) {
        self.0.bind(node);
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }

    pub fn get(&self) -> Option<NodeRef> {
        self.0.get()
    }

    /// Bound and still alive.
    pub fn is_set(&self) -> bool {
        self.0.get().is_some()
    }

    /// Whether `target` lies inside the frame's subtree.
    ///
    /// An unset frame or an unresolved target counts as outside.
    pub fn contains(&self, target: Option<&Node>) -> bool {
        match (self.get(), target) {
            (Some(frame), Some(target)) => frame.contains(target),
            _ => false,
        }
    }
}

/// Focusable content region inside the panel.
#[derive(Debug, Clone, Default)]
pub struct ContentHandle(NodeHandle);

impl ContentHandle {
    pub fn bind(&mut self, node: &NodeRef) {
        self.0.bind(node);
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }

    pub fn get(&self) -> Option<NodeRef> {
        self.0.get()
    }

    pub fn is_set(&self) -> bool {
        self.0.get().is_some()
    }
}
