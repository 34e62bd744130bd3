#![forbid(unsafe_code)]

//! Open/closed state with change notification.
//!
//! [`StateCell`] is the single source of truth for a controller's
//! [`OpenState`]. Hosts subscribe to it to learn when they must re-render.
//!
//! # Invariants
//!
//! 1. Version increments exactly once per transition that changes the state.
//! 2. Replacing the state with its current value is a no-op (no version
//!    bump, no notification).
//! 3. Subscribers are notified in registration order.
//! 4. Dropping a [`Subscription`] removes the callback before the next
//!    notification.
//! 5. The subscriber list is not borrowed while callbacks run, so a callback
//!    may subscribe, unsubscribe, or trigger another transition.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

/// Whether the dialog is shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum OpenState {
    #[default]
    Closed,
    Open,
}

impl OpenState {
    #[inline]
    pub const fn is_open(self) -> bool {
        matches!(self, Self::Open)
    }

    #[inline]
    pub const fn flipped(self) -> Self {
        match self {
            Self::Open => Self::Closed,
            Self::Closed => Self::Open,
        }
    }
}

/// What requested a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransitionReason {
    /// `toggle_or_open` in toggle mode, or an explicit `toggle`.
    Toggle,
    /// Explicit open, or `toggle_or_open` in open-only mode.
    Open,
    /// Explicit close.
    Close,
    /// Pointer pressed outside the dialog frame.
    OutsidePointer,
    /// Escape pressed while open.
    EscapeKey,
    /// Close affordance activated by pointer or keyboard.
    CloseButton,
    /// The controller was dropped.
    Teardown,
}

/// A completed state change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub from: OpenState,
    pub to: OpenState,
    pub reason: TransitionReason,
    /// State version after the change.
    pub version: u64,
}

type Callback = dyn Fn(&Transition);

/// Version-tracked open state with subscriber callbacks.
#[derive(Default)]
pub struct StateCell {
    state: Cell<OpenState>,
    version: Cell<u64>,
    subscribers: RefCell<Vec<Weak<Callback>>>,
}

impl StateCell {
    #[must_use]
    pub fn new(state: OpenState) -> Self {
        Self {
            state: Cell::new(state),
            ..Self::default()
        }
    }

    #[inline]
    pub fn get(&self) -> OpenState {
        self.state.get()
    }

    #[inline]
    pub fn version(&self) -> u64 {
        self.version.get()
    }

    /// Store `to` without notifying. Returns the transition if the state
    /// changed.
    pub fn replace(&self, to: OpenState, reason: TransitionReason) -> Option<Transition> {
        let from = self.state.get();
        if from == to {
            return None;
        }
        self.state.set(to);
        let version = self.version.get() + 1;
        self.version.set(version);
        Some(Transition {
            from,
            to,
            reason,
            version,
        })
    }

    /// Store `to` and notify subscribers if it changed.
    pub fn set(&self, to: OpenState, reason: TransitionReason) -> Option<Transition> {
        let transition = self.replace(to, reason)?;
        self.notify(&transition);
        Some(transition)
    }

    /// Invoke every live subscriber with `transition`.
    pub fn notify(&self, transition: &Transition) {
        let live: Vec<Rc<Callback>> = {
            let mut subscribers = self.subscribers.borrow_mut();
            subscribers.retain(|weak| weak.strong_count() > 0);
            subscribers.iter().filter_map(Weak::upgrade).collect()
        };
        for callback in live {
            callback(transition);
        }
    }

    /// Register a callback for future transitions.
    #[must_use = "dropping the subscription unsubscribes immediately"]
    pub fn subscribe(&self, callback: impl Fn(&Transition) + 'static) -> Subscription {
        let callback: Rc<Callback> = Rc::new(callback);
        self.subscribers.borrow_mut().push(Rc::downgrade(&callback));
        Subscription {
            _callback: callback,
        }
    }

    /// Number of live subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.subscribers
            .borrow()
            .iter()
            .filter(|weak| weak.strong_count() > 0)
            .count()
    }
}

impl fmt::Debug for StateCell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StateCell")
            .field("state", &self.state.get())
            .field("version", &self.version.get())
            .field("subscribers", &self.subscriber_count())
            .finish()
    }
}

/// RAII guard for a state subscription.
#[must_use = "dropping the subscription unsubscribes immediately"]
pub struct Subscription {
    _callback: Rc<Callback>,
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription").finish_non_exhaustive()
    }
}
