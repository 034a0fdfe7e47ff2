//! Deferred output values.
//!
//! An [`Output`] is a value that is not known until the runtime finishes a
//! remote registration. It starts pending and is settled exactly once through
//! its [`OutputResolver`]:
//!
//! - **Resolved**: the value is available
//! - **Unknown**: the value will not be known until the deployment is applied
//! - **Failed**: registration or input resolution failed
//!
//! All clones of an output observe the same settlement.
//!
//! # Example
//!
//! ```
//! use cirrus_runtime::output::{Output, OutputStatus};
//!
//! let (output, resolver) = Output::<String>::pending();
//! assert_eq!(output.status(), OutputStatus::Pending);
//! assert!(output.try_get().is_none());
//!
//! resolver.resolve("urn:cirrus:dev::proj::example::OtherResource::a".into());
//! assert_eq!(output.status(), OutputStatus::Resolved);
//! ```

use crate::error::OutputError;
use tokio::sync::watch;

/// Observable state of an [`Output`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputStatus {
    /// Not settled yet.
    Pending,
    /// Settled with a value.
    Resolved,
    /// Settled, but the value is unknown during a preview.
    Unknown,
    /// Settled with an error.
    Failed,
}

#[derive(Debug, Clone)]
enum Settlement<T> {
    Pending,
    Resolved(T),
    Unknown,
    Failed(OutputError),
}

impl<T> Settlement<T> {
    fn is_pending(&self) -> bool {
        matches!(self, Self::Pending)
    }
}

fn read<T: Clone>(settlement: &Settlement<T>, closed: bool) -> Option<Result<T, OutputError>> {
    match settlement {
        // The resolver went away without settling.
        Settlement::Pending => closed.then_some(Err(OutputError::Abandoned)),
        Settlement::Resolved(value) => Some(Ok(value.clone())),
        Settlement::Unknown => Some(Err(OutputError::Unknown)),
        Settlement::Failed(err) => Some(Err(err.clone())),
    }
}

/// A deferred value resolved by the runtime after registration.
pub struct Output<T> {
    rx: watch::Receiver<Settlement<T>>,
    secret: bool,
}

impl<T> Clone for Output<T> {
    fn clone(&self) -> Self {
        Self {
            rx: self.rx.clone(),
            secret: self.secret,
        }
    }
}

impl<T> core::fmt::Debug for Output<T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Output")
            .field("status", &self.status())
            .field("secret", &self.secret)
            .finish()
    }
}

impl<T> Output<T> {
    fn settled(settlement: Settlement<T>) -> Self {
        let (_tx, rx) = watch::channel(settlement);
        Self { rx, secret: false }
    }

    /// Creates a pending output together with the resolver that settles it.
    #[must_use]
    pub fn pending() -> (Self, OutputResolver<T>) {
        let (tx, rx) = watch::channel(Settlement::Pending);
        (Self { rx, secret: false }, OutputResolver { tx })
    }

    /// Creates an output that is already resolved.
    #[must_use]
    pub fn resolved(value: T) -> Self {
        Self::settled(Settlement::Resolved(value))
    }

    /// Creates an output whose value is unknown.
    #[must_use]
    pub fn unknown() -> Self {
        Self::settled(Settlement::Unknown)
    }

    /// Creates an output that has already failed.
    #[must_use]
    pub fn failed(err: OutputError) -> Self {
        Self::settled(Settlement::Failed(err))
    }

    /// Marks the output as secret.
    #[must_use]
    pub fn with_secret(mut self, secret: bool) -> Self {
        self.secret = secret;
        self
    }

    /// Returns `true` if the output holds a secret value.
    #[must_use]
    pub fn is_secret(&self) -> bool {
        self.secret
    }

    /// Returns the current state without waiting.
    #[must_use]
    pub fn status(&self) -> OutputStatus {
        let closed = self.rx.has_changed().is_err();
        match &*self.rx.borrow() {
            Settlement::Pending if closed => OutputStatus::Failed,
            Settlement::Pending => OutputStatus::Pending,
            Settlement::Resolved(_) => OutputStatus::Resolved,
            Settlement::Unknown => OutputStatus::Unknown,
            Settlement::Failed(_) => OutputStatus::Failed,
        }
    }
}

impl<T: Clone> Output<T> {
    /// Returns the settled value without waiting, or `None` while pending.
    #[must_use]
    pub fn try_get(&self) -> Option<Result<T, OutputError>> {
        let closed = self.rx.has_changed().is_err();
        read(&self.rx.borrow(), closed)
    }

    /// Waits for the output to settle and returns its value.
    ///
    /// # Errors
    ///
    /// - [`OutputError::Unknown`] if the value is unknown during a preview
    /// - [`OutputError::Abandoned`] if the resolver was dropped unsettled
    /// - the error the output was failed with otherwise
    pub async fn value(&self) -> Result<T, OutputError> {
        let mut rx = self.rx.clone();
        let result = match rx.wait_for(|s| !s.is_pending()).await {
            Ok(settled) => read(&settled, false),
            Err(_) => None,
        };
        result.unwrap_or(Err(OutputError::Abandoned))
    }
}

impl<T: Clone + Send + Sync + 'static> Output<T> {
    /// Derives a new output by applying `f` to the resolved value.
    ///
    /// Unknown and failed states propagate unchanged. The secret flag carries
    /// over to the derived output.
    ///
    /// A pending output is mapped on a tokio task. With no runtime running the
    /// derived output fails with [`OutputError::Abandoned`].
    pub fn map<U, F>(&self, f: F) -> Output<U>
    where
        U: Send + Sync + 'static,
        F: FnOnce(T) -> U + Send + 'static,
    {
        self.try_map(move |value| Ok(f(value)))
    }

    /// Like [`map`](Self::map), but `f` may fail the derived output.
    pub fn try_map<U, F>(&self, f: F) -> Output<U>
    where
        U: Send + Sync + 'static,
        F: FnOnce(T) -> Result<U, OutputError> + Send + 'static,
    {
        let settled = self.try_get();
        if let Some(result) = settled {
            let derived = match result.and_then(f) {
                Ok(value) => Output::resolved(value),
                Err(OutputError::Unknown) => Output::unknown(),
                Err(err) => Output::failed(err),
            };
            return derived.with_secret(self.secret);
        }

        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            tracing::error!("no tokio runtime is running; derived output abandoned");
            return Output::failed(OutputError::Abandoned).with_secret(self.secret);
        };
        let (derived, resolver) = Output::pending();
        let source = self.clone();
        runtime.spawn(async move {
            match source.value().await.and_then(f) {
                Ok(value) => resolver.resolve(value),
                Err(OutputError::Unknown) => resolver.resolve_unknown(),
                Err(err) => resolver.reject(err),
            }
        });
        derived.with_secret(self.secret)
    }
}

/// Write side of an [`Output`].
///
/// Each method consumes the resolver, so an output is settled at most once.
/// Dropping the resolver without settling fails the output with
/// [`OutputError::Abandoned`].
pub struct OutputResolver<T> {
    tx: watch::Sender<Settlement<T>>,
}

impl<T> core::fmt::Debug for OutputResolver<T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("OutputResolver").finish_non_exhaustive()
    }
}

impl<T> OutputResolver<T> {
    /// Settles the output with a value.
    pub fn resolve(self, value: T) {
        self.tx.send_replace(Settlement::Resolved(value));
    }

    /// Settles the output as unknown.
    pub fn resolve_unknown(self) {
        self.tx.send_replace(Settlement::Unknown);
    }

    /// Settles the output with an error.
    pub fn reject(self, err: OutputError) {
        self.tx.send_replace(Settlement::Failed(err));
    }
}
