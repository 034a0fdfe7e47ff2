//! Resource inputs: plain values or deferred outputs.

use crate::output::Output;

/// A resource input that is either known now or produced by another resource.
#[derive(Debug, Clone)]
pub enum Input<T> {
    /// A plain value.
    Value(T),
    /// A value resolved later by the runtime.
    Output(Output<T>),
}

impl<T> From<T> for Input<T> {
    fn from(value: T) -> Self {
        Self::Value(value)
    }
}

impl<T> From<Output<T>> for Input<T> {
    fn from(output: Output<T>) -> Self {
        Self::Output(output)
    }
}

impl From<&str> for Input<String> {
    fn from(value: &str) -> Self {
        Self::Value(value.to_string())
    }
}

impl<T> Input<T> {
    /// Returns the plain value, if this input is not deferred.
    #[must_use]
    pub fn as_value(&self) -> Option<&T> {
        match self {
            Self::Value(value) => Some(value),
            Self::Output(_) => None,
        }
    }

    /// Converts the input into an output, resolving plain values immediately.
    #[must_use]
    pub fn into_output(self) -> Output<T> {
        match self {
            Self::Value(value) => Output::resolved(value),
            Self::Output(output) => output,
        }
    }
}
