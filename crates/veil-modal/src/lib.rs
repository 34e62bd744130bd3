#![forbid(unsafe_code)]

//! Modal-dialog controller for Veil.
//!
//! A [`ModalController`] owns the open/closed state of one overlay panel and
//! every side effect attached to the open state:
//!
//! - a document-level input subscription for outside-pointer and Escape
//!   dismissal ([`ListenerRegistration`])
//! - the application root's `aria-hidden` flag ([`InertGuard`])
//! - the body scroll lock ([`ScrollLockGuard`])
//! - focus entry into the content region and focus return on close
//!
//! The caller gets two things back: [`ModalController::project_content`],
//! which turns caller content into a [`Projection`] (empty when closed), and
//! [`ModalController::toggle_or_open`]. State observers registered with
//! [`ModalController::subscribe`] are how the host learns it must re-render.
//!
//! # Example
//!
//! ```
//! use veil_core::Environment;
//! use veil_modal::{ModalController, OpenState};
//!
//! let modal = ModalController::new(Environment::detached());
//! assert!(modal.project_content("hello").is_empty());
//!
//! modal.toggle_or_open();
//! assert_eq!(modal.state(), OpenState::Open);
//! let overlay = modal.project_content("hello");
//! assert_eq!(overlay.content(), Some(&"hello"));
//! ```

pub mod config;
mod controller;
mod guard;
mod handle;
pub mod icon;
mod listener;
pub mod projection;
mod state;

#[cfg(feature = "policy-config")]
pub use config::ConfigError;
pub use config::{ModalConfig, ToggleMode};
pub use controller::{ModalController, ModalHandle};
pub use guard::{FocusReturn, InertGuard, ScrollLockGuard};
pub use handle::{ContentHandle, FrameHandle};
pub use icon::CloseIcon;
pub use listener::ListenerRegistration;
pub use projection::{
    AriaRole, Backdrop, CloseAffordance, ContentRegion, DialogFrame, Overlay, Projection,
};
pub use state::{OpenState, StateCell, Subscription, Transition, TransitionReason};
