#![forbid(unsafe_code)]

//! Deterministic in-memory document.
//!
//! The tree is `html > body > div#root` (the root is optional). Side effects
//! are stored where a browser would keep them so tests can assert on the
//! tree itself:
//!
//! | Capability | Storage |
//! |------------|---------|
//! | scroll lock | `style="overflow: hidden"` on `body` |
//! | background inert | `aria-hidden="true"` on `#root` |
//! | focus | weak pointer to the focused node |
//!
//! # Dispatch
//!
//! `dispatch` snapshots matching listeners first and re-checks that each is
//! still registered right before invoking it, so a listener removed earlier
//! in the same dispatch never fires. No internal borrow is held while a
//! listener runs.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use veil_core::{
    BackgroundInert, Environment, Event, EventMask, FocusTarget, InputEventSource, KeyCode,
    KeyEvent, Listener, ListenerId, Node, NodeRef, PointerButton, PointerEvent, PointerEventKind,
    ScrollLock, WeakNode,
};

pub const ROOT_ID: &str = "root";
const SCROLL_LOCK_STYLE: &str = "overflow: hidden";

struct Registered {
    id: ListenerId,
    mask: EventMask,
    listener: Listener,
}

#[derive(Default)]
struct DocState {
    listeners: Vec<Registered>,
    next_id: u64,
    focused: Option<WeakNode>,
    subscribed_total: u64,
}

pub struct FakeDocument {
    html: NodeRef,
    body: NodeRef,
    root: Option<NodeRef>,
    state: RefCell<DocState>,
}

impl FakeDocument {
    /// Document with an application root element.
    pub fn new() -> Rc<Self> {
        Self::build(true)
    }

    /// Document without the application root element.
    pub fn without_root() -> Rc<Self> {
        Self::build(false)
    }

    fn build(with_root: bool) -> Rc<Self> {
        let html = Node::new("html");
        let body = Node::new("body");
        html.append_child(&body);
        let root = with_root.then(|| {
            let root = Node::new("div");
            root.set_attribute("id", ROOT_ID);
            body.append_child(&root);
            root
        });
        Rc::new(Self {
            html,
            body,
            root,
            state: RefCell::new(DocState::default()),
        })
    }

    pub fn environment(self: &Rc<Self>) -> Environment {
        Environment::from_document(Rc::clone(self))
    }

    pub fn body(&self) -> &NodeRef {
        &self.body
    }

    pub fn root(&self) -> Option<&NodeRef> {
        self.root.as_ref()
    }

    /// Whether `node` is attached to this document.
    pub fn is_connected(&self, node: &Node) -> bool {
        self.html.contains(node)
    }

    /// Create an element under the root (or body when there is no root).
    pub fn create_in_page(&self, tag: &str) -> NodeRef {
        let node = Node::new(tag);
        self.root.as_ref().unwrap_or(&self.body).append_child(&node);
        node
    }

    /// Deliver `event` to every matching listener. Returns how many ran.
    pub fn dispatch(&self, event: impl Into<Event>) -> usize {
        let event = event.into();
        let mask = event.mask();
        let matching: Vec<(ListenerId, Listener)> = self
            .state
            .borrow()
            .listeners
            .iter()
            .filter(|r| r.mask.intersects(mask))
            .map(|r| (r.id, Rc::clone(&r.listener)))
            .collect();

        let mut delivered = 0;
        for (id, listener) in matching {
            if !self.is_registered(id) {
                continue;
            }
            listener(&event);
            delivered += 1;
        }
        tracing::trace!(?mask, delivered, "event dispatched");
        delivered
    }

    /// Primary-button press on `target`.
    pub fn pointer_down(&self, target: &NodeRef) -> usize {
        self.dispatch(PointerEvent::down(target))
    }

    /// Press whose target could not be resolved.
    pub fn pointer_down_nowhere(&self) -> usize {
        self.dispatch(PointerEvent::new(
            PointerEventKind::Down(PointerButton::Primary),
            None,
        ))
    }

    pub fn click(&self, target: &NodeRef) -> usize {
        self.dispatch(PointerEvent::new(
            PointerEventKind::Click(PointerButton::Primary),
            Some(target),
        ))
    }

    pub fn key_down(&self, code: KeyCode) -> usize {
        self.dispatch(KeyEvent::new(code))
    }

    pub fn listener_count(&self) -> usize {
        self.state.borrow().listeners.len()
    }

    /// Subscriptions ever made, including released ones.
    pub fn subscribed_total(&self) -> u64 {
        self.state.borrow().subscribed_total
    }

    pub fn root_aria_hidden(&self) -> Option<String> {
        self.root.as_ref().and_then(|root| root.attribute("aria-hidden"))
    }

    pub fn body_style(&self) -> Option<String> {
        self.body.attribute("style")
    }

    pub fn focused(&self) -> Option<NodeRef> {
        self.state
            .borrow()
            .focused
            .as_ref()
            .and_then(WeakNode::upgrade)
            .filter(|node| self.is_connected(node))
    }

    fn is_registered(&self, id: ListenerId) -> bool {
        self.state.borrow().listeners.iter().any(|r| r.id == id)
    }
}

impl InputEventSource for FakeDocument {
    fn subscribe(&self, mask: EventMask, listener: Listener) -> ListenerId {
        let mut state = self.state.borrow_mut();
        state.next_id += 1;
        state.subscribed_total += 1;
        let id = ListenerId::new(state.next_id);
        state.listeners.push(Registered { id, mask, listener });
        id
    }

    fn unsubscribe(&self, id: ListenerId) -> bool {
        let mut state = self.state.borrow_mut();
        let before = state.listeners.len();
        state.listeners.retain(|r| r.id != id);
        state.listeners.len() != before
    }
}

impl ScrollLock for FakeDocument {
    fn is_scroll_locked(&self) -> bool {
        self.body.attribute("style").as_deref() == Some(SCROLL_LOCK_STYLE)
    }

    fn set_scroll_locked(&self, locked: bool) {
        if locked {
            self.body.set_attribute("style", SCROLL_LOCK_STYLE);
        } else {
            self.body.remove_attribute("style");
        }
    }
}

impl BackgroundInert for FakeDocument {
    fn background_inert(&self) -> Option<bool> {
        let root = self.root.as_ref()?;
        Some(root.attribute("aria-hidden").as_deref() == Some("true"))
    }

    fn set_background_inert(&self, inert: bool) -> bool {
        let Some(root) = self.root.as_ref() else {
            return false;
        };
        if inert {
            root.set_attribute("aria-hidden", "true");
        } else {
            root.remove_attribute("aria-hidden");
        }
        true
    }
}

impl FocusTarget for FakeDocument {
    fn active_element(&self) -> Option<NodeRef> {
        self.focused()
    }

    /// Only connected nodes can take focus.
    fn focus(&self, node: &NodeRef) -> bool {
        if !self.is_connected(node) {
            return false;
        }
        self.state.borrow_mut().focused = Some(Rc::downgrade(node));
        true
    }
}

impl fmt::Debug for FakeDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FakeDocument")
            .field("has_root", &self.root.is_some())
            .field("listeners", &self.listener_count())
            .field("scroll_locked", &self.is_scroll_locked())
            .finish()
    }
}
