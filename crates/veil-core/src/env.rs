#![forbid(unsafe_code)]

//! Capabilities a controller consumes from its host document.
//!
//! Each capability is a narrow trait so controllers depend on behaviour, not
//! on a particular global object. A browser adapter, a test document, or a
//! terminal host can implement them independently; [`Environment`] bundles
//! one implementation of each.
//!
//! # Contract
//!
//! - `InputEventSource::unsubscribe` is idempotent and a listener removed
//!   during a dispatch must not be invoked later in that same dispatch.
//! - `BackgroundInert` reports `None` when the well-known root element is
//!   absent; setting it is then a no-op returning `false`.
//! - `ScrollLock::set_scroll_locked` is idempotent.

use std::cell::Cell;
use std::fmt;
use std::rc::Rc;

use crate::event::{Event, EventMask};
use crate::node::NodeRef;

/// Callback invoked for every event matching the subscription mask.
pub type Listener = Rc<dyn Fn(&Event)>;

/// Identifier of an active subscription, issued by the source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ListenerId(u64);

impl ListenerId {
    #[inline]
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    #[inline]
    pub const fn id(self) -> u64 {
        self.0
    }
}

/// Document-scoped input event bus.
pub trait InputEventSource {
    /// Register `listener` for events whose kind intersects `mask`.
    fn subscribe(&self, mask: EventMask, listener: Listener) -> ListenerId;

    /// Remove a subscription. Returns `false` if it was not registered.
    fn unsubscribe(&self, id: ListenerId) -> bool;
}

/// Body-level scroll lock.
pub trait ScrollLock {
    fn is_scroll_locked(&self) -> bool;

    fn set_scroll_locked(&self, locked: bool);
}

/// Accessibility-hidden flag of the application root container.
pub trait BackgroundInert {
    /// Current flag, or `None` if the root element is absent.
    fn background_inert(&self) -> Option<bool>;

    /// Set the flag. Returns `false` if the root element is absent.
    fn set_background_inert(&self, inert: bool) -> bool;
}

/// Keyboard focus.
pub trait FocusTarget {
    /// Element that currently holds focus.
    fn active_element(&self) -> Option<NodeRef>;

    /// Move focus to `node`. Returns `false` if the node cannot take focus.
    fn focus(&self, node: &NodeRef) -> bool;
}

/// One implementation of each capability.
#[derive(Clone)]
pub struct Environment {
    pub input: Rc<dyn InputEventSource>,
    pub scroll: Rc<dyn ScrollLock>,
    pub inert: Rc<dyn BackgroundInert>,
    pub focus: Rc<dyn FocusTarget>,
}

impl Environment {
    /// Use a single document object for every capability.
    pub fn from_document<D>(document: Rc<D>) -> Self
    where
        D: InputEventSource + ScrollLock + BackgroundInert + FocusTarget + 'static,
    {
        Self {
            input: document.clone(),
            scroll: document.clone(),
            inert: document.clone(),
            focus: document,
        }
    }

    /// An environment with no document: subscriptions never fire, there is
    /// no root element, and focus requests are refused.
    pub fn detached() -> Self {
        Self::from_document(Rc::new(Detached::default()))
    }
}

impl fmt::Debug for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Environment").finish_non_exhaustive()
    }
}

#[derive(Debug, Default)]
struct Detached {
    next_id: Cell<u64>,
    scroll_locked: Cell<bool>,
}

impl InputEventSource for Detached {
    fn subscribe(&self, _mask: EventMask, _listener: Listener) -> ListenerId {
        let id = self.next_id.get() + 1;
        self.next_id.set(id);
        ListenerId::new(id)
    }

    fn unsubscribe(&self, _id: ListenerId) -> bool {
        false
    }
}

impl ScrollLock for Detached {
    fn is_scroll_locked(&self) -> bool {
        self.scroll_locked.get()
    }

    fn set_scroll_locked(&self, locked: bool) {
        self.scroll_locked.set(locked);
    }
}

impl BackgroundInert for Detached {
    fn background_inert(&self) -> Option<bool> {
        None
    }

    fn set_background_inert(&self, _inert: bool) -> bool {
        false
    }
}

impl FocusTarget for Detached {
    fn active_element(&self) -> Option<NodeRef> {
        None
    }

    fn focus(&self, _node: &NodeRef) -> bool {
        false
    }
}
