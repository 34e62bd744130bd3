#![forbid(unsafe_code)]

//! Projected dialog structure.
//!
//! [`ModalController::project_content`](crate::ModalController::project_content)
//! returns a [`Projection`]: nothing when closed, otherwise an [`Overlay`]
//! describing the four parts a host mounts, outermost first:
//!
//! 1. [`Backdrop`]: full-viewport layer behind the panel
//! 2. [`DialogFrame`]: the panel; bind its node with `attach_frame`
//! 3. [`CloseAffordance`]: keyboard-reachable close control
//! 4. [`ContentRegion`]: focusable wrapper around caller content; bind its
//!    node with `attach_content`
//!
//! Caller content is passed through untouched.

use veil_core::{KeyCode, KeyEvent};

use crate::config::ModalConfig;
use crate::controller::ModalHandle;
use crate::icon::CloseIcon;

pub const BACKDROP_CLASS: &str = "veil-modal";
pub const FRAME_CLASS: &str = "veil-modal-frame";
pub const CLOSE_CLASS: &str = "veil-modal-close";
pub const CONTENT_CLASS: &str = "veil-modal-content";

/// Output of a projection.
#[derive(Debug)]
pub enum Projection<C> {
    Empty,
    Overlay(Overlay<C>),
}

impl<C> Projection<C> {
    #[inline]
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }

    pub fn overlay(&self) -> Option<&Overlay<C>> {
        match self {
            Self::Overlay(overlay) => Some(overlay),
            Self::Empty => None,
        }
    }

    pub fn content(&self) -> Option<&C> {
        self.overlay().map(|overlay| &overlay.content.content)
    }

    pub fn into_content(self) -> Option<C> {
        match self {
            Self::Overlay(overlay) => Some(overlay.content.content),
            Self::Empty => None,
        }
    }
}

/// Full-viewport layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Backdrop {
    pub class: &'static str,
}

/// ARIA role of the panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AriaRole {
    Dialog,
}

impl AriaRole {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Dialog => "dialog",
        }
    }
}

/// The panel container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DialogFrame {
    pub class: &'static str,
    pub role: Option<AriaRole>,
    pub aria_modal: bool,
}

impl DialogFrame {
    /// Attributes a host should set on the frame node.
    pub fn attributes(&self) -> Vec<(&'static str, String)> {
        let mut attrs = vec![("class", self.class.to_owned())];
        if let Some(role) = self.role {
            attrs.push(("role", role.as_str().to_owned()));
        }
        if self.aria_modal {
            attrs.push(("aria-modal", "true".to_owned()));
        }
        attrs
    }
}

/// Close control wired back to its controller.
#[derive(Debug, Clone)]
pub struct CloseAffordance {
    pub class: &'static str,
    pub icon: CloseIcon,
    pub label: String,
    /// Position in the tab order; `0` means natural order.
    pub tab_index: i32,
    trigger: ModalHandle,
}

impl CloseAffordance {
    /// Pointer activation. Returns `false` if the controller is gone.
    pub fn activate(&self) -> bool {
        self.trigger.dismiss_from_close_button()
    }

    /// Keyboard activation on Enter or Space presses. Shortcut chords
    /// (Ctrl, Alt, Meta) are left to the host.
    ///
    /// Returns `true` if the key was consumed.
    pub fn handle_key(&self, key: &KeyEvent) -> bool {
        if !key.is_press() || key.is_shortcut() {
            return false;
        }
        if !matches!(key.code, KeyCode::Enter | KeyCode::Space) {
            return false;
        }
        self.activate()
    }

    pub fn attributes(&self) -> Vec<(&'static str, String)> {
        vec![
            ("class", self.class.to_owned()),
            ("role", "button".to_owned()),
            ("tabindex", self.tab_index.to_string()),
            ("aria-label", self.label.clone()),
        ]
    }
}

/// Focusable wrapper around caller content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentRegion<C> {
    pub class: &'static str,
    /// `-1`: focusable programmatically, skipped by sequential navigation.
    pub tab_index: i32,
    pub content: C,
}

impl<C> ContentRegion<C> {
    pub fn attributes(&self) -> Vec<(&'static str, String)> {
        vec![
            ("class", self.class.to_owned()),
            ("tabindex", self.tab_index.to_string()),
        ]
    }
}

/// The open-state projection.
#[derive(Debug, Clone)]
pub struct Overlay<C> {
    pub backdrop: Backdrop,
    pub frame: DialogFrame,
    pub close: CloseAffordance,
    pub content: ContentRegion<C>,
}

impl<C> Overlay<C> {
    pub(crate) fn new(content: C, config: &ModalConfig, trigger: ModalHandle) -> Self {
        Self {
            backdrop: Backdrop {
                class: BACKDROP_CLASS,
            },
            frame: DialogFrame {
                class: FRAME_CLASS,
                role: config.accessible.then_some(AriaRole::Dialog),
                aria_modal: config.accessible,
            },
            close: CloseAffordance {
                class: CLOSE_CLASS,
                icon: CloseIcon::new(config.close_icon_fill.clone()),
                label: config.close_label.clone(),
                tab_index: 0,
                trigger,
            },
            content: ContentRegion {
                class: CONTENT_CLASS,
                tab_index: -1,
                content,
            },
        }
    }

    /// Transform the caller content, keeping the rest of the structure.
    pub fn map<D>(self, f: impl FnOnce(C) -> D) -> Overlay<D> {
        Overlay {
            backdrop: self.backdrop,
            frame: self.frame,
            close: self.close,
            content: ContentRegion {
                class: self.content.class,
                tab_index: self.content.tab_index,
                content: f(self.content.content),
            },
        }
    }
}
