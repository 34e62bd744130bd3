#![forbid(unsafe_code)]

//! Test harness for Veil controllers.
//!
//! - [`FakeDocument`]: deterministic in-memory document implementing every
//!   capability in `veil_core::env`, with helpers to dispatch input.
//! - [`TestHost`]: a host that mounts projections into the document and
//!   re-renders whenever the controller's state changes.
//! - [`init_test_logging`]: route `tracing` output to stderr once per binary.

pub mod document;
pub mod host;

pub use document::FakeDocument;
pub use host::TestHost;

/// Install the stderr subscriber for this test binary.
///
/// Safe to call from every test; only the first call installs.
pub fn init_test_logging() {
    if veil_core::logging::init_tracing(veil_core::logging::LogFormat::Text).is_err() {
        // Installed by an earlier test in this binary.
        tracing::trace!("test subscriber already installed");
    }
}
