#![forbid(unsafe_code)]

//! Scoped input subscription.
//!
//! A [`ListenerRegistration`] is held exactly while a dialog is open. Release
//! happens on every exit path: an explicit [`release`](ListenerRegistration::release)
//! on close, or `Drop` when the owning controller is torn down. Release is
//! idempotent.

use std::fmt;
use std::rc::Rc;

use veil_core::{EventMask, InputEventSource, Listener, ListenerId};

/// Active subscription to a document-level input source.
#[must_use = "dropping the registration unsubscribes immediately"]
pub struct ListenerRegistration {
    source: Rc<dyn InputEventSource>,
    id: Option<ListenerId>,
    mask: EventMask,
}

impl ListenerRegistration {
    /// Subscribe `listener` to `source` for `mask`.
    pub fn acquire(source: &Rc<dyn InputEventSource>, mask: EventMask, listener: Listener) -> Self {
        let id = source.subscribe(mask, listener);
        tracing::trace!(listener = id.id(), ?mask, "input listener registered");
        Self {
            source: Rc::clone(source),
            id: Some(id),
            mask,
        }
    }

    #[inline]
    pub fn id(&self) -> Option<ListenerId> {
        self.id
    }

    #[inline]
    pub fn mask(&self) -> EventMask {
        self.mask
    }

    #[inline]
    pub fn is_active(&self) -> bool {
        self.id.is_some()
    }

    /// Unsubscribe. Returns `false` if already released.
    pub fn release(&mut self) -> bool {
        let Some(id) = self.id.take() else {
            return false;
        };
        if !self.source.unsubscribe(id) {
            tracing::debug!(listener = id.id(), "input source had already dropped listener");
        }
        tracing::trace!(listener = id.id(), "input listener released");
        true
    }
}

impl Drop for ListenerRegistration {
    fn drop(&mut self) {
        self.release();
    }
}

impl fmt::Debug for ListenerRegistration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListenerRegistration")
            .field("id", &self.id)
            .field("mask", &self.mask)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::collections::BTreeSet;

    #[derive(Default)]
    struct CountingSource {
        active: RefCell<BTreeSet<u64>>,
        next: RefCell<u64>,
    }

    impl InputEventSource for CountingSource {
        fn subscribe(&self, _mask: EventMask, _listener: Listener) -> ListenerId {
            let mut next = self.next.borrow_mut();
            *next += 1;
            self.active.borrow_mut().insert(*next);
            ListenerId::new(*next)
        }

        fn unsubscribe(&self, id: ListenerId) -> bool {
            self.active.borrow_mut().remove(&id.id())
        }
    }

    fn source() -> (Rc<CountingSource>, Rc<dyn InputEventSource>) {
        let concrete = Rc::new(CountingSource::default());
        let dynamic: Rc<dyn InputEventSource> = concrete.clone();
        (concrete, dynamic)
    }

    #[test]
    fn release_is_idempotent() {
        let (counting, source) = source();
        let mut reg = ListenerRegistration::acquire(&source, EventMask::POINTER_DOWN, Rc::new(|_| {}));
        assert!(reg.is_active());
        assert_eq!(counting.active.borrow().len(), 1);

        assert!(reg.release());
        assert!(!reg.release());
        assert!(!reg.is_active());
        assert!(counting.active.borrow().is_empty());
    }

    #[test]
    fn drop_releases() {
        let (counting, source) = source();
        {
            let _reg = ListenerRegistration::acquire(&source, EventMask::KEY_DOWN, Rc::new(|_| {}));
            assert_eq!(counting.active.borrow().len(), 1);
        }
        assert!(counting.active.borrow().is_empty());
    }

    #[test]
    fn drop_after_release_does_not_double_unsubscribe() {
        let (counting, source) = source();
        let mut reg = ListenerRegistration::acquire(&source, EventMask::KEY_DOWN, Rc::new(|_| {}));
        let id = reg.id().unwrap();
        reg.release();
        // Re-insert to detect a second unsubscribe of the same id.
        counting.active.borrow_mut().insert(id.id());
        drop(reg);
        assert!(counting.active.borrow().contains(&id.id()));
    }
}
