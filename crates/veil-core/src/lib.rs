#![forbid(unsafe_code)]

//! Environment vocabulary for Veil.
//!
//! This crate provides:
//! - [`node`]: a DOM-like node tree with weak handles for containment checks
//! - [`event`]: pointer and keyboard input events
//! - [`env`]: the narrow capabilities a controller needs from its host
//!   document (input subscription, scroll lock, background inert, focus)
//! - [`logging`]: tracing subscriber setup (feature `tracing-json`)

pub mod env;
pub mod event;
#[cfg(feature = "tracing-json")]
pub mod logging;
pub mod node;

pub use env::{
    BackgroundInert, Environment, FocusTarget, InputEventSource, Listener, ListenerId, ScrollLock,
};
pub use event::{
    Event, EventMask, KeyCode, KeyEvent, KeyEventKind, Modifiers, PointerButton, PointerEvent,
    PointerEventKind,
};
pub use node::{Node, NodeId, NodeRef, WeakNode};
