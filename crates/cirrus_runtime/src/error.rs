//! Error types for the cirrus runtime.

use thiserror::Error;

/// Message used when an options value is not a [`ResourceOptions`](crate::options::ResourceOptions).
pub const OPTIONS_TYPE_MISMATCH: &str =
    "Expected resource options to be a ResourceOptions instance";

/// Message used when a component resource is given an explicit `id`.
pub const COMPONENT_ADOPTION_UNSUPPORTED: &str =
    "ComponentResource classes do not support opts.id";

/// Message used when a pre-built property set is supplied without an `id`.
pub const PROPS_WITHOUT_ID: &str = "__props__ is only valid when passed in combination with a valid opts.id to get an existing resource";

/// Errors surfaced to the caller while constructing or registering a resource.
#[derive(Debug, Clone, Error)]
pub enum ResourceError {
    /// A value of the wrong type was supplied (the options object, a keyword argument).
    #[error("{0}")]
    TypeMismatch(String),

    /// An explicit `id` was supplied for a resource kind that cannot adopt existing objects.
    #[error("{0}")]
    UnsupportedAdoption(String),

    /// A pre-built property set was supplied without an accompanying `id`.
    #[error("{0}")]
    InvalidCombination(String),

    /// A URN string did not have the expected shape.
    #[error("invalid urn '{0}'")]
    InvalidUrn(String),

    /// No resource module is registered for the package of a type token.
    #[error("no resource module registered for package '{0}'")]
    UnknownModule(String),
}

impl ResourceError {
    /// Creates a [`TypeMismatch`](Self::TypeMismatch).
    pub fn type_mismatch(msg: impl Into<String>) -> Self {
        Self::TypeMismatch(msg.into())
    }

    /// Creates an [`UnsupportedAdoption`](Self::UnsupportedAdoption).
    pub fn unsupported_adoption(msg: impl Into<String>) -> Self {
        Self::UnsupportedAdoption(msg.into())
    }

    /// Creates an [`InvalidCombination`](Self::InvalidCombination).
    pub fn invalid_combination(msg: impl Into<String>) -> Self {
        Self::InvalidCombination(msg.into())
    }
}

/// Errors observed when reading a deferred [`Output`](crate::output::Output).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OutputError {
    /// The resolver was dropped before the output was settled.
    #[error("output was abandoned before it was resolved")]
    Abandoned,

    /// The runtime failed the output (registration or input resolution failed).
    #[error("output failed: {0}")]
    Failed(String),

    /// The value is not known during a preview.
    #[error("output value is unknown")]
    Unknown,

    /// The settled wire value could not be decoded into the requested type.
    #[error("failed to decode output: {0}")]
    Decode(String),
}

impl OutputError {
    /// Creates a [`Failed`](Self::Failed).
    pub fn failed(msg: impl Into<String>) -> Self {
        Self::Failed(msg.into())
    }

    /// Creates a [`Decode`](Self::Decode).
    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }
}

/// Errors returned by a [`ResourceMonitor`](crate::monitor::ResourceMonitor).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MonitorError {
    /// The monitor refused the request.
    #[error("monitor rejected request: {0}")]
    Rejected(String),

    /// The requested resource does not exist.
    #[error("resource not found: {0}")]
    NotFound(String),

    /// The monitor could not be reached.
    #[error("monitor unavailable: {0}")]
    Unavailable(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resource_error_messages_are_verbatim() {
        let err = ResourceError::type_mismatch(OPTIONS_TYPE_MISMATCH);
        assert_eq!(err.to_string(), OPTIONS_TYPE_MISMATCH);

        let err = ResourceError::unsupported_adoption(COMPONENT_ADOPTION_UNSUPPORTED);
        assert_eq!(err.to_string(), COMPONENT_ADOPTION_UNSUPPORTED);
    }

    #[test]
    fn monitor_errors_become_failed_outputs() {
        let err = OutputError::failed(MonitorError::Unavailable("connection refused".into()).to_string());
        assert_eq!(err.to_string(), "output failed: monitor unavailable: connection refused");
    }
}
