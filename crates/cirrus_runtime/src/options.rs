//! Resource options.
//!
//! [`ResourceOptions`] controls how the runtime registers a resource:
//! versioning, adoption of existing objects, parenting, dependencies and
//! lifecycle flags. Every field is optional; a default value changes nothing.
//!
//! # Example
//!
//! ```
//! use cirrus_runtime::options::ResourceOptions;
//!
//! let opts = ResourceOptions::new()
//!     .with_version("1.2.0")
//!     .with_protect(true)
//!     .with_ignore_changes(["tags"]);
//!
//! assert_eq!(opts.version.as_deref(), Some("1.2.0"));
//! assert!(opts.id.is_none());
//! ```

use crate::input::Input;
use crate::property::ResourceReference;
use crate::urn::Urn;
use core::time::Duration;

/// Timeouts for provider operations.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CustomTimeouts {
    /// Timeout for create operations.
    pub create: Option<Duration>,
    /// Timeout for update operations.
    pub update: Option<Duration>,
    /// Timeout for delete operations.
    pub delete: Option<Duration>,
}

/// Options controlling resource registration.
#[derive(Debug, Clone, Default)]
pub struct ResourceOptions {
    /// Provider plugin version the registration is routed to.
    pub version: Option<String>,
    /// Provider id of an existing object to adopt instead of creating one.
    pub id: Option<Input<String>>,
    /// URN of an already-registered resource to rehydrate.
    pub urn: Option<Urn>,
    /// Parent resource.
    pub parent: Option<ResourceReference>,
    /// Resources that must be registered before this one.
    pub depends_on: Vec<ResourceReference>,
    /// Refuse to delete the resource.
    pub protect: bool,
    /// Explicit provider instance.
    pub provider: Option<ResourceReference>,
    /// Input properties whose changes are ignored on update.
    pub ignore_changes: Vec<String>,
    /// Previous URNs of this resource.
    pub aliases: Vec<Urn>,
    /// Delete the old object before creating its replacement.
    pub delete_before_replace: bool,
    /// Leave the remote object in place when the resource is deleted.
    pub retain_on_delete: bool,
    /// Input properties whose changes force a replacement.
    pub replace_on_changes: Vec<String>,
    /// Timeouts for provider operations.
    pub custom_timeouts: Option<CustomTimeouts>,
    /// Location to download the provider plugin from.
    pub plugin_download_url: Option<String>,
}

impl ResourceOptions {
    /// Creates empty options.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the provider version.
    #[must_use]
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    /// Sets the id of an existing object to adopt.
    #[must_use]
    pub fn with_id(mut self, id: impl Into<Input<String>>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Sets the URN of an existing resource to rehydrate.
    #[must_use]
    pub fn with_urn(mut self, urn: Urn) -> Self {
        self.urn = Some(urn);
        self
    }

    /// Sets the parent resource.
    #[must_use]
    pub fn with_parent(mut self, parent: ResourceReference) -> Self {
        self.parent = Some(parent);
        self
    }

    /// Adds a dependency.
    #[must_use]
    pub fn with_depends_on(mut self, dependency: ResourceReference) -> Self {
        self.depends_on.push(dependency);
        self
    }

    /// Sets the protect flag.
    #[must_use]
    pub fn with_protect(mut self, protect: bool) -> Self {
        self.protect = protect;
        self
    }

    /// Sets the explicit provider instance.
    #[must_use]
    pub fn with_provider(mut self, provider: ResourceReference) -> Self {
        self.provider = Some(provider);
        self
    }

    /// Adds properties whose changes are ignored.
    #[must_use]
    pub fn with_ignore_changes<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.ignore_changes.extend(names.into_iter().map(Into::into));
        self
    }

    /// Adds an alias.
    #[must_use]
    pub fn with_alias(mut self, alias: Urn) -> Self {
        self.aliases.push(alias);
        self
    }

    /// Sets the delete-before-replace flag.
    #[must_use]
    pub fn with_delete_before_replace(mut self, enabled: bool) -> Self {
        self.delete_before_replace = enabled;
        self
    }

    /// Sets the retain-on-delete flag.
    #[must_use]
    pub fn with_retain_on_delete(mut self, enabled: bool) -> Self {
        self.retain_on_delete = enabled;
        self
    }

    /// Adds properties whose changes force a replacement.
    #[must_use]
    pub fn with_replace_on_changes<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.replace_on_changes.extend(names.into_iter().map(Into::into));
        self
    }

    /// Sets operation timeouts.
    #[must_use]
    pub fn with_custom_timeouts(mut self, timeouts: CustomTimeouts) -> Self {
        self.custom_timeouts = Some(timeouts);
        self
    }

    /// Sets the plugin download location.
    #[must_use]
    pub fn with_plugin_download_url(mut self, url: impl Into<String>) -> Self {
        self.plugin_download_url = Some(url.into());
        self
    }

    /// Combines two option sets.
    ///
    /// Scalar fields set in `other` win. List fields are concatenated with
    /// `other`'s entries last. Flags are set if either side sets them.
    #[must_use]
    pub fn merge(mut self, other: Self) -> Self {
        self.version = other.version.or(self.version);
        self.id = other.id.or(self.id);
        self.urn = other.urn.or(self.urn);
        self.parent = other.parent.or(self.parent);
        self.provider = other.provider.or(self.provider);
        self.custom_timeouts = other.custom_timeouts.or(self.custom_timeouts);
        self.plugin_download_url = other.plugin_download_url.or(self.plugin_download_url);

        self.depends_on.extend(other.depends_on);
        self.ignore_changes.extend(other.ignore_changes);
        self.aliases.extend(other.aliases);
        self.replace_on_changes.extend(other.replace_on_changes);

        self.protect |= other.protect;
        self.delete_before_replace |= other.delete_before_replace;
        self.retain_on_delete |= other.retain_on_delete;
        self
    }

    /// URNs of the explicit dependencies.
    #[must_use]
    pub fn dependency_urns(&self) -> Vec<Urn> {
        self.depends_on
            .iter()
            .map(|dependency| dependency.urn.clone())
            .collect()
    }
}
