#![forbid(unsafe_code)]

//! Modal configuration.
//!
//! Defaults describe the accessible, true-toggle dialog. `ToggleMode::OpenOnly`
//! is the named alternate for hosts whose trigger must only ever open.
//!
//! With the `policy-config` feature, a config can be loaded from TOML:
//!
//! ```toml
//! toggle-mode = "open-only"
//! close-on-escape = false
//! close-icon-fill = "currentColor"
//! ```

use veil_core::EventMask;

/// What `toggle_or_open` does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(
    feature = "policy-config",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "kebab-case")
)]
pub enum ToggleMode {
    /// Flip between open and closed.
    #[default]
    Toggle,
    /// Always open; closing is left to dismissal and the close affordance.
    OpenOnly,
}

/// Modal configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(
    feature = "policy-config",
    derive(serde::Serialize, serde::Deserialize),
    serde(default, deny_unknown_fields, rename_all = "kebab-case")
)]
pub struct ModalConfig {
    pub toggle_mode: ToggleMode,
    /// Escape dismissal, dialog semantics, inert background, focus management.
    pub accessible: bool,
    pub close_on_outside_pointer: bool,
    /// Only honoured when `accessible` is set.
    pub close_on_escape: bool,
    pub lock_scroll: bool,
    /// Only honoured when `accessible` is set.
    pub restore_focus: bool,
    pub close_icon_fill: String,
    pub close_label: String,
}

impl Default for ModalConfig {
    fn default() -> Self {
        Self {
            toggle_mode: ToggleMode::Toggle,
            accessible: true,
            close_on_outside_pointer: true,
            close_on_escape: true,
            lock_scroll: true,
            restore_focus: true,
            close_icon_fill: "none".to_owned(),
            close_label: "Close".to_owned(),
        }
    }
}

impl ModalConfig {
    /// The plain variant: outside-pointer dismissal and scroll lock only.
    pub fn basic() -> Self {
        Self {
            accessible: false,
            ..Self::default()
        }
    }

    pub fn toggle_mode(mut self, mode: ToggleMode) -> Self {
        self.toggle_mode = mode;
        self
    }

    pub fn accessible(mut self, accessible: bool) -> Self {
        self.accessible = accessible;
        self
    }

    pub fn close_on_outside_pointer(mut self, close: bool) -> Self {
        self.close_on_outside_pointer = close;
        self
    }

    pub fn close_on_escape(mut self, close: bool) -> Self {
        self.close_on_escape = close;
        self
    }

    pub fn lock_scroll(mut self, lock: bool) -> Self {
        self.lock_scroll = lock;
        self
    }

    pub fn restore_focus(mut self, restore: bool) -> Self {
        self.restore_focus = restore;
        self
    }

    pub fn close_icon_fill(mut self, fill: impl Into<String>) -> Self {
        self.close_icon_fill = fill.into();
        self
    }

    pub fn close_label(mut self, label: impl Into<String>) -> Self {
        self.close_label = label.into();
        self
    }

    #[inline]
    pub fn escape_enabled(&self) -> bool {
        self.accessible && self.close_on_escape
    }

    #[inline]
    pub fn focus_return_enabled(&self) -> bool {
        self.accessible && self.restore_focus
    }

    /// Event kinds the open dialog listens for.
    pub fn listen_mask(&self) -> EventMask {
        let mut mask = EventMask::empty();
        if self.close_on_outside_pointer {
            mask |= EventMask::POINTER_DOWN;
        }
        if self.escape_enabled() {
            mask |= EventMask::KEY_DOWN;
        }
        mask
    }
}

#[cfg(feature = "policy-config")]
pub use loader::ConfigError;

#[cfg(feature = "policy-config")]
mod loader {
    use std::path::{Path, PathBuf};

    use super::ModalConfig;

    /// Errors from loading a [`ModalConfig`].
    #[derive(Debug, thiserror::Error)]
    pub enum ConfigError {
        #[error("failed to read modal config {}: {source}", .path.display())]
        Io {
            path: PathBuf,
            #[source]
            source: std::io::Error,
        },
        #[error("invalid modal config: {0}")]
        Parse(#[from] toml::de::Error),
    }

    impl ModalConfig {
        /// Parse a TOML document. Missing keys take their defaults.
        ///
        /// # Errors
        ///
        /// [`ConfigError::Parse`] on malformed TOML, unknown keys, or
        /// mistyped values.
        pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
            Ok(toml::from_str(source)?)
        }

        /// Read and parse a TOML file.
        ///
        /// # Errors
        ///
        /// [`ConfigError::Io`] if the file cannot be read, otherwise as
        /// [`from_toml_str`](Self::from_toml_str).
        pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
            let path = path.as_ref();
            let source = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
                path: path.to_path_buf(),
                source,
            })?;
            let config = Self::from_toml_str(&source)?;
            tracing::debug!(path = %path.display(), ?config, "modal config loaded");
            Ok(config)
        }
    }
}
