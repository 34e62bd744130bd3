#![forbid(unsafe_code)]

//! Input events delivered by a document-scoped event source.
//!
//! Only the event kinds a modal controller reacts to are modelled: pointer
//! presses/releases/clicks and key presses. Every event carries its target
//! node (if the host could resolve one) as a [`WeakNode`] so an event never
//! keeps an unmounted subtree alive.

use bitflags::bitflags;

use crate::node::{NodeRef, WeakNode};

bitflags! {
    /// Keyboard modifier state.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Modifiers: u8 {
        const SHIFT = 0b0001;
        const ALT   = 0b0010;
        const CTRL  = 0b0100;
        const META  = 0b1000;
    }
}

bitflags! {
    /// Event kinds a listener is interested in.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct EventMask: u8 {
        const POINTER_DOWN = 0b0001;
        const POINTER_UP   = 0b0010;
        const CLICK        = 0b0100;
        const KEY_DOWN     = 0b1000;
    }
}

/// Pointer button.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PointerButton {
    #[default]
    Primary,
    Secondary,
    Auxiliary,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PointerEventKind {
    Down(PointerButton),
    Up(PointerButton),
    Click(PointerButton),
}

/// A pointer event with its (possibly unresolved) target.
#[derive(Debug, Clone)]
pub struct PointerEvent {
    pub kind: PointerEventKind,
    pub target: Option<WeakNode>,
}

impl PointerEvent {
    pub fn new(kind: PointerEventKind, target: Option<&NodeRef>) -> Self {
        Self {
            kind,
            target: target.map(std::rc::Rc::downgrade),
        }
    }

    /// Primary-button press on `target`.
    pub fn down(target: &NodeRef) -> Self {
        Self::new(PointerEventKind::Down(PointerButton::Primary), Some(target))
    }

    /// The target node, if one was resolved and it is still alive.
    pub fn target(&self) -> Option<NodeRef> {
        self.target.as_ref().and_then(WeakNode::upgrade)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyCode {
    Escape,
    Enter,
    Tab,
    Space,
    Backspace,
    Char(char),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum KeyEventKind {
    #[default]
    Press,
    Repeat,
    Release,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyEvent {
    pub code: KeyCode,
    pub modifiers: Modifiers,
    pub kind: KeyEventKind,
}

impl KeyEvent {
    pub const fn new(code: KeyCode) -> Self {
        Self {
            code,
            modifiers: Modifiers::empty(),
            kind: KeyEventKind::Press,
        }
    }

    pub const fn with_kind(mut self, kind: KeyEventKind) -> Self {
        self.kind = kind;
        self
    }

    pub const fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }

    /// Initial press (not auto-repeat, not release).
    #[inline]
    pub fn is_press(&self) -> bool {
        self.kind == KeyEventKind::Press
    }

    /// Ctrl, Alt or Meta held. Shift alone is not a shortcut.
    #[inline]
    pub fn is_shortcut(&self) -> bool {
        self.modifiers
            .intersects(Modifiers::CTRL | Modifiers::ALT | Modifiers::META)
    }
}

/// Document-level input event.
#[derive(Debug, Clone)]
pub enum Event {
    Pointer(PointerEvent),
    Key(KeyEvent),
}

impl Event {
    /// The mask bit this event is delivered under.
    ///
    /// Key repeats and releases map to no bit; a source only forwards presses
    /// as `KEY_DOWN`.
    pub fn mask(&self) -> EventMask {
        match self {
            Self::Pointer(p) => match p.kind {
                PointerEventKind::Down(_) => EventMask::POINTER_DOWN,
                PointerEventKind::Up(_) => EventMask::POINTER_UP,
                PointerEventKind::Click(_) => EventMask::CLICK,
            },
            Self::Key(k) if k.kind != KeyEventKind::Release => EventMask::KEY_DOWN,
            Self::Key(_) => EventMask::empty(),
        }
    }
}

impl From<PointerEvent> for Event {
    fn from(event: PointerEvent) -> Self {
        Self::Pointer(event)
    }
}

impl From<KeyEvent> for Event {
    fn from(event: KeyEvent) -> Self {
        Self::Key(event)
    }
}
