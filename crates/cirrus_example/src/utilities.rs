//! Package metadata.

/// The package version, stamped onto resource options that do not set one.
#[must_use]
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
