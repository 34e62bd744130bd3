#![forbid(unsafe_code)]

//! Scoped document side effects.
//!
//! Each guard captures the value it overwrites and puts it back on release
//! or drop, whichever comes first. Release is idempotent.
//!
//! | Guard | Applies | Restores |
//! |-------|---------|----------|
//! | [`ScrollLockGuard`] | body scroll lock | prior lock state |
//! | [`InertGuard`] | root `aria-hidden=true` | prior flag |
//! | [`FocusReturn`] | nothing | focus to the element focused before open |

use std::fmt;
use std::rc::Rc;

use veil_core::{BackgroundInert, FocusTarget, NodeRef, ScrollLock, WeakNode};

/// Body scroll lock held while the dialog is open.
#[must_use = "dropping the guard releases the scroll lock"]
pub struct ScrollLockGuard {
    scroll: Rc<dyn ScrollLock>,
    prior: Option<bool>,
}

impl ScrollLockGuard {
    pub fn acquire(scroll: &Rc<dyn ScrollLock>) -> Self {
        let prior = scroll.is_scroll_locked();
        scroll.set_scroll_locked(true);
        Self {
            scroll: Rc::clone(scroll),
            prior: Some(prior),
        }
    }

    #[inline]
    pub fn is_held(&self) -> bool {
        self.prior.is_some()
    }

    /// Restore the prior lock state. Returns `false` if already released.
    pub fn release(&mut self) -> bool {
        let Some(prior) = self.prior.take() else {
            return false;
        };
        self.scroll.set_scroll_locked(prior);
        true
    }
}

impl Drop for ScrollLockGuard {
    fn drop(&mut self) {
        self.release();
    }
}

impl fmt::Debug for ScrollLockGuard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScrollLockGuard")
            .field("prior", &self.prior)
            .finish()
    }
}

/// Background marked hidden from assistive technology.
#[must_use = "dropping the guard restores the root's hidden flag"]
pub struct InertGuard {
    inert: Rc<dyn BackgroundInert>,
    prior: Option<bool>,
}

impl InertGuard {
    /// Mark the root inert.
    ///
    /// Returns `None` when the root element is absent; nothing is changed.
    pub fn acquire(inert: &Rc<dyn BackgroundInert>) -> Option<Self> {
        let Some(prior) = inert.background_inert() else {
            tracing::debug!("application root absent; background not marked inert");
            return None;
        };
        if !inert.set_background_inert(true) {
            tracing::debug!("application root refused aria-hidden");
            return None;
        }
        Some(Self {
            inert: Rc::clone(inert),
            prior: Some(prior),
        })
    }

    #[inline]
    pub fn is_held(&self) -> bool {
        self.prior.is_some()
    }

    /// Restore the prior flag. Returns `false` if already released.
    pub fn release(&mut self) -> bool {
        let Some(prior) = self.prior.take() else {
            return false;
        };
        self.inert.set_background_inert(prior);
        true
    }
}

impl Drop for InertGuard {
    fn drop(&mut self) {
        self.release();
    }
}

impl fmt::Debug for InertGuard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InertGuard")
            .field("prior", &self.prior)
            .finish()
    }
}

/// Element to hand focus back to when the dialog closes.
#[derive(Debug, Default)]
pub struct FocusReturn {
    previous: Option<WeakNode>,
}

impl FocusReturn {
    /// Remember the currently focused element.
    pub fn capture(focus: &dyn FocusTarget) -> Self {
        Self {
            previous: focus.active_element().as_ref().map(Rc::downgrade),
        }
    }

    pub fn previous(&self) -> Option<NodeRef> {
        self.previous.as_ref().and_then(WeakNode::upgrade)
    }

    /// Focus the remembered element if it still exists.
    pub fn restore(self, focus: &dyn FocusTarget) -> bool {
        match self.previous() {
            Some(node) => focus.focus(&node),
            None => false,
        }
    }
}
