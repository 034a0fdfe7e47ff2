//! Constructor normalization shared by every generated resource.
//!
//! Both calling conventions end up in a [`ResourceInit`], which
//! [`prepare`](ResourceInit::prepare)s the canonical name and options in a
//! fixed order:
//!
//! 1. Legacy name and options aliases replace the canonical parameters, each
//!    with a deprecation warning.
//! 2. Missing options become [`ResourceOptions::default`].
//! 3. The options value must actually be a [`ResourceOptions`].
//! 4. An unset `version` is stamped with the package version.
//!
//! The resource kind then decides what to do with an `id` and a pre-built
//! property set: components reject both ([`Prepared::into_component`]),
//! custom resources adopt ([`Prepared::into_custom`]). All of this happens
//! before anything reaches the runtime.

use crate::dynamic::DynValue;
use crate::error::{
    COMPONENT_ADOPTION_UNSUPPORTED, OPTIONS_TYPE_MISMATCH, PROPS_WITHOUT_ID, ResourceError,
};
use crate::input::Input;
use crate::options::ResourceOptions;
use crate::property::PropertyMap;

/// A value that can be turned into [`ResourceOptions`].
///
/// Typed callers pass `ResourceOptions` directly. Dynamic callers pass a
/// [`DynValue`], which is type-checked here.
pub trait OptionsSource {
    /// Produces the options, or fails if the value is not an options object.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::TypeMismatch`] if the value is not a [`ResourceOptions`].
    fn into_options(self) -> Result<ResourceOptions, ResourceError>;
}

impl OptionsSource for ResourceOptions {
    fn into_options(self) -> Result<ResourceOptions, ResourceError> {
        Ok(self)
    }
}

impl OptionsSource for DynValue {
    fn into_options(self) -> Result<ResourceOptions, ResourceError> {
        let value = match self.downcast::<ResourceOptions>() {
            Ok(opts) => return Ok(opts),
            Err(value) => value,
        };
        value
            .downcast::<Option<ResourceOptions>>()
            .map(Option::unwrap_or_default)
            .map_err(|_| ResourceError::type_mismatch(OPTIONS_TYPE_MISMATCH))
    }
}

/// A deprecated construction parameter that was used.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Deprecation {
    /// The legacy name alias replaced the resource name.
    LegacyName,
    /// The legacy options alias replaced the options.
    LegacyOptions,
}

impl core::fmt::Display for Deprecation {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::LegacyName => f.write_str("explicit use of __name__ is deprecated"),
            Self::LegacyOptions => {
                f.write_str("explicit use of __opts__ is deprecated, use 'opts' instead")
            }
        }
    }
}

/// Raw construction parameters, before normalization.
#[derive(Debug)]
pub struct ResourceInit<O = ResourceOptions> {
    name: String,
    opts: Option<O>,
    legacy_name: Option<String>,
    legacy_opts: Option<O>,
    props: Option<PropertyMap>,
}

impl<O: OptionsSource> ResourceInit<O> {
    /// Starts construction of a resource with the given logical name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            opts: None,
            legacy_name: None,
            legacy_opts: None,
            props: None,
        }
    }

    /// Sets the options.
    #[must_use]
    pub fn with_options(mut self, opts: Option<O>) -> Self {
        self.opts = opts;
        self
    }

    /// Sets the deprecated name alias.
    #[must_use]
    pub fn with_legacy_name(mut self, name: Option<String>) -> Self {
        self.legacy_name = name;
        self
    }

    /// Sets the deprecated options alias.
    #[must_use]
    pub fn with_legacy_options(mut self, opts: Option<O>) -> Self {
        self.legacy_opts = opts;
        self
    }

    /// Sets a pre-built property set.
    #[must_use]
    pub fn with_props(mut self, props: Option<PropertyMap>) -> Self {
        self.props = props;
        self
    }

    /// Resolves aliases, defaults and validates the options, and stamps the version.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::TypeMismatch`] if the options value is not a
    /// [`ResourceOptions`].
    pub fn prepare(self, version: &str) -> Result<Prepared, ResourceError> {
        let mut deprecations = Vec::new();
        let mut name = self.name;
        let mut opts = self.opts;

        if let Some(legacy_name) = self.legacy_name {
            deprecations.push(Deprecation::LegacyName);
            name = legacy_name;
        }
        if let Some(legacy_opts) = self.legacy_opts {
            deprecations.push(Deprecation::LegacyOptions);
            opts = Some(legacy_opts);
        }
        for deprecation in &deprecations {
            tracing::warn!(target: "cirrus::deprecation", resource = %name, "{deprecation}");
        }

        let mut opts = match opts {
            Some(opts) => opts.into_options()?,
            None => ResourceOptions::default(),
        };

        if opts.version.is_none() {
            opts.version = Some(version.to_string());
        }

        Ok(Prepared {
            name,
            opts,
            props: self.props,
            deprecations,
        })
    }
}

/// Normalized construction parameters.
#[derive(Debug)]
pub struct Prepared {
    /// Logical resource name.
    pub name: String,
    /// Validated, version-stamped options.
    pub opts: ResourceOptions,
    /// Pre-built property set, if one was supplied.
    pub props: Option<PropertyMap>,
    /// Deprecated parameters that were used.
    pub deprecations: Vec<Deprecation>,
}

/// How a custom resource is brought into the deployment.
#[derive(Debug)]
pub enum Construction {
    /// Create a new object from the binding's arguments.
    Fresh {
        /// Logical resource name.
        name: String,
        /// Options for the registration.
        opts: ResourceOptions,
    },
    /// Adopt an existing object by provider id.
    Adopt {
        /// Logical resource name.
        name: String,
        /// Provider id of the existing object.
        id: Input<String>,
        /// Known state of the existing object, if supplied.
        props: Option<PropertyMap>,
        /// Options for the read.
        opts: ResourceOptions,
    },
}

impl Prepared {
    /// Finishes construction of a component resource.
    ///
    /// # Errors
    ///
    /// - [`ResourceError::UnsupportedAdoption`] if the options carry an `id`
    /// - [`ResourceError::InvalidCombination`] if a property set was supplied
    pub fn into_component(self) -> Result<(String, ResourceOptions), ResourceError> {
        if self.opts.id.is_some() {
            return Err(ResourceError::unsupported_adoption(
                COMPONENT_ADOPTION_UNSUPPORTED,
            ));
        }
        if self.props.is_some() {
            return Err(ResourceError::invalid_combination(PROPS_WITHOUT_ID));
        }
        Ok((self.name, self.opts))
    }

    /// Finishes construction of a custom resource.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::InvalidCombination`] if a property set was
    /// supplied without an `id`.
    pub fn into_custom(mut self) -> Result<Construction, ResourceError> {
        match self.opts.id.take() {
            Some(id) => Ok(Construction::Adopt {
                name: self.name,
                id,
                props: self.props,
                opts: self.opts,
            }),
            None if self.props.is_some() => {
                Err(ResourceError::invalid_combination(PROPS_WITHOUT_ID))
            }
            None => Ok(Construction::Fresh {
                name: self.name,
                opts: self.opts,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VERSION: &str = "0.1.0";

    #[test]
    fn defaults_and_stamps_version() {
        let prepared = ResourceInit::<ResourceOptions>::new("a")
            .prepare(VERSION)
            .unwrap();
        assert_eq!(prepared.name, "a");
        assert_eq!(prepared.opts.version.as_deref(), Some(VERSION));
        assert!(prepared.deprecations.is_empty());
    }

    #[test]
    fn explicit_version_is_untouched() {
        let prepared = ResourceInit::new("a")
            .with_options(Some(ResourceOptions::new().with_version("9.9.9")))
            .prepare(VERSION)
            .unwrap();
        assert_eq!(prepared.opts.version.as_deref(), Some("9.9.9"));
    }

    #[test]
    fn legacy_aliases_replace_canonical_values() {
        let prepared = ResourceInit::new("canonical")
            .with_options(Some(ResourceOptions::new().with_protect(false)))
            .with_legacy_name(Some("legacy".into()))
            .with_legacy_options(Some(ResourceOptions::new().with_protect(true)))
            .prepare(VERSION)
            .unwrap();

        assert_eq!(prepared.name, "legacy");
        assert!(prepared.opts.protect);
        assert_eq!(
            prepared.deprecations,
            vec![Deprecation::LegacyName, Deprecation::LegacyOptions]
        );
    }

    #[test]
    fn dynamic_options_of_wrong_type_fail() {
        let err = ResourceInit::new("a")
            .with_options(Some(DynValue::new("opts")))
            .prepare(VERSION)
            .unwrap_err();
        assert!(matches!(err, ResourceError::TypeMismatch(_)));
        assert_eq!(err.to_string(), OPTIONS_TYPE_MISMATCH);
    }

    #[test]
    fn dynamic_none_options_default() {
        let prepared = ResourceInit::new("a")
            .with_options(Some(DynValue::new(None::<ResourceOptions>)))
            .prepare(VERSION)
            .unwrap();
        assert_eq!(prepared.opts.version.as_deref(), Some(VERSION));
    }

    #[test]
    fn wrong_legacy_options_fail_even_with_valid_options() {
        let err = ResourceInit::new("a")
            .with_options(Some(DynValue::new(ResourceOptions::new())))
            .with_legacy_options(Some(DynValue::new(42u8)))
            .prepare(VERSION)
            .unwrap_err();
        assert!(matches!(err, ResourceError::TypeMismatch(_)));
    }

    #[test]
    fn component_rejects_id() {
        let err = ResourceInit::new("a")
            .with_options(Some(ResourceOptions::new().with_id("existing")))
            .prepare(VERSION)
            .unwrap()
            .into_component()
            .unwrap_err();
        assert!(matches!(err, ResourceError::UnsupportedAdoption(_)));
    }

    #[test]
    fn component_rejects_props_without_id() {
        let err = ResourceInit::<ResourceOptions>::new("a")
            .with_props(Some(PropertyMap::new()))
            .prepare(VERSION)
            .unwrap()
            .into_component()
            .unwrap_err();
        assert!(matches!(err, ResourceError::InvalidCombination(_)));
    }

    #[test]
    fn custom_adopts_by_id() {
        let construction = ResourceInit::new("a")
            .with_options(Some(ResourceOptions::new().with_id("existing")))
            .with_props(Some(PropertyMap::new()))
            .prepare(VERSION)
            .unwrap()
            .into_custom()
            .unwrap();

        match construction {
            Construction::Adopt { name, id, props, opts } => {
                assert_eq!(name, "a");
                assert_eq!(id.as_value().map(String::as_str), Some("existing"));
                assert!(props.is_some());
                assert!(opts.id.is_none());
            }
            Construction::Fresh { .. } => panic!("expected adoption"),
        }
    }

    #[test]
    fn custom_rejects_props_without_id() {
        let err = ResourceInit::<ResourceOptions>::new("a")
            .with_props(Some(PropertyMap::new()))
            .prepare(VERSION)
            .unwrap()
            .into_custom()
            .unwrap_err();
        assert!(matches!(err, ResourceError::InvalidCombination(_)));
    }
}
