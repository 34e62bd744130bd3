#![forbid(unsafe_code)]

//! The modal controller state machine.
//!
//! # State Machine
//!
//! | From | Trigger | To | Effects |
//! |------|---------|----|---------|
//! | Closed | toggle / open | Open | subscribe input, inert root, focus content, lock scroll |
//! | Open | toggle / close / outside pointer / Escape / close button | Closed | unsubscribe, restore root flag, unlock scroll, return focus |
//! | Open | re-render | Open | none |
//!
//! # Invariants
//!
//! 1. A listener registration is held iff the state is `Open`, and never
//!    more than one.
//! 2. `project_content` is non-empty iff the state is `Open`.
//! 3. Side effects for a transition are applied before the state is stored
//!    and before observers are notified, so the next input event already
//!    sees the new subscription set. Focus moves last, after observers.
//! 4. No internal borrow is held while the focus capability runs, so focus
//!    handlers may call back into the controller. A transition requested
//!    while some other capability call is in progress is ignored.
//! 5. Dropping the controller releases every side effect and notifies
//!    observers with [`TransitionReason::Teardown`] if it was open.
//!
//! # Failure Modes
//!
//! | Situation | Behaviour |
//! |-----------|-----------|
//! | Frame not mounted when a pointer goes down | treated as outside, dialog closes |
//! | Root element absent | inert flag skipped, dialog still works |
//! | Content not mounted when opening | focus moves once `attach_content` is called |
//! | Handle used after controller dropped | operation is a no-op |

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

use veil_core::{Environment, Event, KeyCode, Listener, NodeRef, PointerEventKind};

use crate::config::{ModalConfig, ToggleMode};
use crate::guard::{FocusReturn, InertGuard, ScrollLockGuard};
use crate::handle::{ContentHandle, FrameHandle};
use crate::listener::ListenerRegistration;
use crate::projection::{Overlay, Projection};
use crate::state::{OpenState, StateCell, Subscription, Transition, TransitionReason};

/// Controller for a single modal dialog.
///
/// Dropping the controller tears it down. Use [`handle`](Self::handle) to give
/// hosts and callbacks access without extending its lifetime.
pub struct ModalController {
    shared: Rc<Shared>,
}

/// Weak, cloneable access to a [`ModalController`].
///
/// Every operation is a no-op once the controller has been dropped.
#[derive(Debug, Clone)]
pub struct ModalHandle {
    shared: Weak<Shared>,
}

struct Shared {
    config: ModalConfig,
    state: StateCell,
    torn_down: Cell<bool>,
    core: RefCell<Core>,
}

struct Core {
    env: Environment,
    frame: FrameHandle,
    content: ContentHandle,
    registration: Option<ListenerRegistration>,
    inert: Option<InertGuard>,
    scroll: Option<ScrollLockGuard>,
    focus_return: Option<FocusReturn>,
    focus_pending: bool,
}

impl ModalController {
    pub fn new(env: Environment) -> Self {
        Self::with_config(env, ModalConfig::default())
    }

    pub fn with_config(env: Environment, config: ModalConfig) -> Self {
        tracing::trace!(?config, "modal controller created");
        Self {
            shared: Rc::new(Shared {
                config,
                state: StateCell::new(OpenState::Closed),
                torn_down: Cell::new(false),
                core: RefCell::new(Core {
                    env,
                    frame: FrameHandle::default(),
                    content: ContentHandle::default(),
                    registration: None,
                    inert: None,
                    scroll: None,
                    focus_return: None,
                    focus_pending: false,
                }),
            }),
        }
    }

    pub fn handle(&self) -> ModalHandle {
        ModalHandle {
            shared: Rc::downgrade(&self.shared),
        }
    }

    pub fn config(&self) -> ModalConfig {
        self.shared.config.clone()
    }

    #[inline]
    pub fn state(&self) -> OpenState {
        self.shared.state.get()
    }

    #[inline]
    pub fn is_open(&self) -> bool {
        self.state().is_open()
    }

    /// Number of transitions so far.
    #[inline]
    pub fn version(&self) -> u64 {
        self.shared.state.version()
    }

    /// Project `content` into the dialog structure for the current state.
    ///
    /// Closed: returns [`Projection::Empty`] and releases any scroll lock.
    /// Open: returns the overlay and (re)applies the scroll lock.
    pub fn project_content<C>(&self, content: C) -> Projection<C> {
        self.shared.project(content)
    }

    /// Flip the state, or force it open in [`ToggleMode::OpenOnly`].
    pub fn toggle_or_open(&self) {
        self.shared.toggle_or_open();
    }

    pub fn toggle(&self) {
        let target = self.state().flipped();
        self.shared.request(target, TransitionReason::Toggle);
    }

    pub fn open(&self) {
        self.shared.request(OpenState::Open, TransitionReason::Open);
    }

    pub fn close(&self) {
        self.shared.request(OpenState::Closed, TransitionReason::Close);
    }

    /// Bind the mounted panel root. Ignored while closed.
    pub fn attach_frame(&self, node: &NodeRef) -> bool {
        self.shared.attach_frame(node)
    }

    /// Bind the mounted content region, moving focus into it if an open
    /// transition is still waiting for it. Ignored while closed.
    pub fn attach_content(&self, node: &NodeRef) -> bool {
        self.shared.attach_content(node)
    }

    /// Forget both node handles (the host unmounted the panel).
    pub fn detach_nodes(&self) {
        self.shared.detach_nodes();
    }

    /// Whether an input subscription is currently held.
    pub fn listener_active(&self) -> bool {
        self.shared
            .core
            .try_borrow()
            .is_ok_and(|core| core.listener_active())
    }

    /// Observe transitions. The host re-renders from here.
    pub fn subscribe(&self, callback: impl Fn(&Transition) + 'static) -> Subscription {
        self.shared.state.subscribe(callback)
    }

    /// Explicit teardown; equivalent to dropping the controller.
    pub fn teardown(self) {
        drop(self);
    }
}

impl Drop for ModalController {
    fn drop(&mut self) {
        self.shared.teardown();
    }
}

impl fmt::Debug for ModalController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModalController")
            .field("state", &self.state())
            .field("version", &self.version())
            .field("listener_active", &self.listener_active())
            .finish()
    }
}

impl ModalHandle {
    /// Whether the controller still exists.
    pub fn is_alive(&self) -> bool {
        self.upgrade().is_some()
    }

    /// Current state; `Closed` once the controller is gone.
    pub fn state(&self) -> OpenState {
        self.upgrade()
            .map_or(OpenState::Closed, |shared| shared.state.get())
    }

    pub fn project_content<C>(&self, content: C) -> Projection<C> {
        match self.upgrade() {
            Some(shared) => shared.project(content),
            None => Projection::Empty,
        }
    }

    pub fn toggle_or_open(&self) {
        if let Some(shared) = self.upgrade() {
            shared.toggle_or_open();
        }
    }

    pub fn open(&self) {
        if let Some(shared) = self.upgrade() {
            shared.request(OpenState::Open, TransitionReason::Open);
        }
    }

    pub fn close(&self) {
        if let Some(shared) = self.upgrade() {
            shared.request(OpenState::Closed, TransitionReason::Close);
        }
    }

    pub fn attach_frame(&self, node: &NodeRef) -> bool {
        self.upgrade().is_some_and(|shared| shared.attach_frame(node))
    }

    pub fn attach_content(&self, node: &NodeRef) -> bool {
        self.upgrade()
            .is_some_and(|shared| shared.attach_content(node))
    }

    pub fn detach_nodes(&self) {
        if let Some(shared) = self.upgrade() {
            shared.detach_nodes();
        }
    }

    /// Close affordance activation. Closes in every toggle mode.
    pub(crate) fn dismiss_from_close_button(&self) -> bool {
        let Some(shared) = self.upgrade() else {
            return false;
        };
        shared.request(OpenState::Closed, TransitionReason::CloseButton);
        true
    }

    fn upgrade(&self) -> Option<Rc<Shared>> {
        self.shared.upgrade()
    }
}

impl Shared {
    fn toggle_or_open(self: &Rc<Self>) {
        match self.config.toggle_mode {
            ToggleMode::Toggle => {
                let target = self.state.get().flipped();
                self.request(target, TransitionReason::Toggle);
            }
            ToggleMode::OpenOnly => self.request(OpenState::Open, TransitionReason::Open),
        }
    }

    /// Perform a transition. Side effects first, then state, then observers,
    /// then focus.
    fn request(self: &Rc<Self>, target: OpenState, reason: TransitionReason) {
        if self.torn_down.get() {
            return;
        }
        if self.state.get() == target {
            tracing::trace!(state = ?target, ?reason, "modal transition skipped; already in state");
            return;
        }
        let Ok(mut core) = self.core.try_borrow_mut() else {
            tracing::debug!(
                ?target,
                ?reason,
                "modal transition requested from inside a capability call; ignored"
            );
            return;
        };
        let focus_return = match target {
            OpenState::Open => {
                core.enter_open(&self.config, Rc::downgrade(self));
                None
            }
            OpenState::Closed => core.enter_closed(),
        };
        drop(core);

        if let Some(transition) = self.state.replace(target, reason) {
            log_transition(&transition);
            self.state.notify(&transition);
        }
        match target {
            OpenState::Open => self.focus_content(),
            OpenState::Closed => self.return_focus(focus_return),
        }
    }

    fn on_event(self: &Rc<Self>, event: &Event) {
        if self.torn_down.get() || !self.state.get().is_open() {
            return;
        }
        let Ok(core) = self.core.try_borrow() else {
            tracing::trace!("input event delivered during a transition; ignored");
            return;
        };
        let reason = core.dismissal_for(&self.config, event);
        drop(core);
        if let Some(reason) = reason {
            self.request(OpenState::Closed, reason);
        }
    }

    fn project<C>(self: &Rc<Self>, content: C) -> Projection<C> {
        let Ok(mut core) = self.core.try_borrow_mut() else {
            tracing::debug!("projection requested inside a capability call; rendering nothing");
            return Projection::Empty;
        };
        if self.torn_down.get() || !self.state.get().is_open() {
            core.release_scroll();
            return Projection::Empty;
        }
        if self.config.lock_scroll {
            core.lock_scroll();
        }
        let handle = ModalHandle {
            shared: Rc::downgrade(self),
        };
        Projection::Overlay(Overlay::new(content, &self.config, handle))
    }

    fn attach_frame(&self, node: &NodeRef) -> bool {
        if !self.state.get().is_open() {
            tracing::trace!("frame attach ignored while closed");
            return false;
        }
        let Ok(mut core) = self.core.try_borrow_mut() else {
            tracing::debug!("frame attach from inside a capability call; ignored");
            return false;
        };
        core.frame.bind(node);
        true
    }

    fn attach_content(&self, node: &NodeRef) -> bool {
        if !self.state.get().is_open() {
            tracing::trace!("content attach ignored while closed");
            return false;
        }
        match self.core.try_borrow_mut() {
            Ok(mut core) => core.content.bind(node),
            Err(_) => {
                tracing::debug!("content attach from inside a capability call; ignored");
                return false;
            }
        }
        self.focus_content();
        true
    }

    fn detach_nodes(&self) {
        let Ok(mut core) = self.core.try_borrow_mut() else {
            tracing::debug!("node detach from inside a capability call; ignored");
            return;
        };
        core.frame.clear();
        core.content.clear();
    }

    /// Move focus into the content region if a focus request is pending.
    ///
    /// The focus capability runs with no borrow held; it may call back in.
    fn focus_content(&self) {
        let (focus, node) = {
            let Ok(core) = self.core.try_borrow() else {
                return;
            };
            if !core.focus_pending {
                return;
            }
            let Some(node) = core.content.get() else {
                return;
            };
            (Rc::clone(&core.env.focus), node)
        };
        if !focus.focus(&node) {
            tracing::trace!("content region refused focus; still pending");
            return;
        }
        if let Ok(mut core) = self.core.try_borrow_mut()
            && core.content.get().is_some_and(|current| Rc::ptr_eq(&current, &node))
        {
            core.focus_pending = false;
        }
    }

    fn return_focus(&self, focus_return: Option<FocusReturn>) {
        let Some(focus_return) = focus_return else {
            return;
        };
        if self.state.get().is_open() {
            tracing::trace!("focus not returned; reopened before restore");
            return;
        }
        let Ok(focus) = self.core.try_borrow().map(|core| Rc::clone(&core.env.focus)) else {
            return;
        };
        if !focus_return.restore(focus.as_ref()) {
            tracing::trace!("focus not returned; previous element gone or unfocusable");
        }
    }

    fn teardown(&self) {
        if self.torn_down.replace(true) {
            return;
        }
        // A borrow here means the controller is being dropped from inside one
        // of its own capability calls; the guards still release on drop.
        let focus_return = match self.core.try_borrow_mut() {
            Ok(mut core) => core.enter_closed(),
            Err(_) => None,
        };
        if let Some(transition) = self.state.replace(OpenState::Closed, TransitionReason::Teardown)
        {
            log_transition(&transition);
            self.state.notify(&transition);
        }
        self.return_focus(focus_return);
        tracing::trace!("modal controller torn down");
    }
}

impl Core {
    fn listener_active(&self) -> bool {
        self.registration
            .as_ref()
            .is_some_and(ListenerRegistration::is_active)
    }

    fn enter_open(&mut self, config: &ModalConfig, shared: Weak<Shared>) {
        if let Some(mut stale) = self.registration.take() {
            tracing::warn!("listener registration outlived the open state; releasing");
            stale.release();
        }
        let listener: Listener = Rc::new(move |event: &Event| {
            if let Some(shared) = shared.upgrade() {
                shared.on_event(event);
            }
        });
        self.registration = Some(ListenerRegistration::acquire(
            &self.env.input,
            config.listen_mask(),
            listener,
        ));

        if config.accessible {
            self.inert = InertGuard::acquire(&self.env.inert);
            if config.focus_return_enabled() {
                self.focus_return = Some(FocusReturn::capture(self.env.focus.as_ref()));
            }
            self.focus_pending = true;
        }

        if config.lock_scroll {
            self.lock_scroll();
        }
    }

    /// Release every open-state side effect. Focus return is handed back to
    /// the caller so it runs after the borrow ends.
    fn enter_closed(&mut self) -> Option<FocusReturn> {
        if let Some(mut registration) = self.registration.take() {
            registration.release();
        }
        if let Some(mut inert) = self.inert.take() {
            inert.release();
        }
        self.release_scroll();
        self.focus_pending = false;
        self.frame.clear();
        self.content.clear();
        self.focus_return.take()
    }

    fn lock_scroll(&mut self) {
        if self.scroll.is_none() {
            self.scroll = Some(ScrollLockGuard::acquire(&self.env.scroll));
        }
    }

    fn release_scroll(&mut self) {
        if let Some(mut scroll) = self.scroll.take() {
            scroll.release();
        }
    }

    /// Which dismissal, if any, `event` triggers.
    fn dismissal_for(&self, config: &ModalConfig, event: &Event) -> Option<TransitionReason> {
        match event {
            Event::Pointer(pointer)
                if config.close_on_outside_pointer
                    && matches!(pointer.kind, PointerEventKind::Down(_)) =>
            {
                let target = pointer.target();
                if self.frame.contains(target.as_deref()) {
                    tracing::trace!("pointer down inside dialog frame");
                    None
                } else {
                    tracing::trace!(
                        frame_set = self.frame.is_set(),
                        "pointer down outside dialog frame"
                    );
                    Some(TransitionReason::OutsidePointer)
                }
            }
            Event::Key(key)
                if config.escape_enabled()
                    && key.code == KeyCode::Escape
                    && key.is_press() =>
            {
                Some(TransitionReason::EscapeKey)
            }
            _ => None,
        }
    }
}

fn log_transition(transition: &Transition) {
    tracing::debug!(
        from = ?transition.from,
        to = ?transition.to,
        reason = ?transition.reason,
        version = transition.version,
        "modal transition"
    );
}
