//! `example::OtherResource`: a component resource whose lifecycle is managed
//! by the provider, with one optional relationship to a [`Resource`].
//!
//! # Example
//!
//! ```ignore
//! let resource = Resource::new(&deployment, "res", ResourceArgs::new(), None)?;
//! let other = OtherResource::new(
//!     &deployment,
//!     "other",
//!     OtherResourceArgs::new().with_foo(resource),
//!     None,
//! )?;
//! let foo = other.foo().value().await?;
//! ```

use crate::resource::Resource;
use crate::{tables, utilities};
use cirrus_runtime::deployment::{Deployment, RegisteredResource};
use cirrus_runtime::dynamic::{
    CallShape, DynamicArgs, LEGACY_NAME_KEYWORD, LEGACY_OPTS_KEYWORD, LEGACY_PROPS_KEYWORD,
    OPTS_KEYWORD, resource_args_opts,
};
use cirrus_runtime::error::ResourceError;
use cirrus_runtime::init::{OptionsSource, ResourceInit};
use cirrus_runtime::input::Input;
use cirrus_runtime::options::ResourceOptions;
use cirrus_runtime::output::Output;
use cirrus_runtime::property::{PropertyMap, ResourceReference};
use cirrus_runtime::resource::ResourceHandle;
use cirrus_runtime::translate::PropertyTranslator;
use cirrus_runtime::urn::Urn;

/// Type token of [`OtherResource`].
pub const OTHER_RESOURCE_TYPE: &str = "example::OtherResource";

/// Parameters of the flattened calling convention, in positional order.
const PARAMS: &[&str] = &[
    OPTS_KEYWORD,
    "foo",
    LEGACY_PROPS_KEYWORD,
    LEGACY_NAME_KEYWORD,
    LEGACY_OPTS_KEYWORD,
];

/// The set of arguments for constructing an [`OtherResource`].
#[derive(Debug, Clone, Default)]
pub struct OtherResourceArgs {
    foo: Option<Input<Resource>>,
}

impl OtherResourceArgs {
    /// Creates an empty argument set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets `foo`.
    #[must_use]
    pub fn with_foo(mut self, foo: impl Into<Input<Resource>>) -> Self {
        self.foo = Some(foo.into());
        self
    }

    /// The `foo` argument, if set.
    #[must_use]
    pub fn foo(&self) -> Option<&Input<Resource>> {
        self.foo.as_ref()
    }

    /// Replaces the `foo` argument.
    pub fn set_foo(&mut self, foo: Option<Input<Resource>>) {
        self.foo = foo;
    }

    /// Builds the registration properties. `foo` is omitted when unset.
    #[must_use]
    pub fn into_properties(self) -> PropertyMap {
        let mut props = PropertyMap::new();
        if let Some(foo) = self.foo {
            props.insert(tables::snake_to_camel("foo"), foo);
        }
        props
    }
}

/// An `example::OtherResource` component.
#[derive(Debug, Clone)]
pub struct OtherResource {
    registered: RegisteredResource,
    foo: Output<Option<Resource>>,
}

impl OtherResource {
    /// Creates a component with the given unique name, arguments and options.
    ///
    /// # Errors
    ///
    /// - [`ResourceError::UnsupportedAdoption`] if `opts.id` is set
    pub fn new(
        deployment: &Deployment,
        name: &str,
        args: OtherResourceArgs,
        opts: Option<ResourceOptions>,
    ) -> Result<Self, ResourceError> {
        Self::init(deployment, ResourceInit::new(name).with_options(opts), args)
    }

    /// Creates a component from a dynamic call.
    ///
    /// Accepts either an argument bundle (positional or `args=`) with optional
    /// options, or `foo` as a separate argument together with `opts` and the
    /// legacy `__props__`, `__name__` and `__opts__` keywords.
    ///
    /// # Errors
    ///
    /// - [`ResourceError::TypeMismatch`] for unexpected arguments, wrongly typed
    ///   values, or options that are not a [`ResourceOptions`]
    /// - [`ResourceError::UnsupportedAdoption`] if `opts.id` is set
    /// - [`ResourceError::InvalidCombination`] if `__props__` is given
    pub fn from_dynamic(
        deployment: &Deployment,
        name: &str,
        args: DynamicArgs,
    ) -> Result<Self, ResourceError> {
        match resource_args_opts::<OtherResourceArgs>(args) {
            CallShape::Bundled { args, opts } => {
                Self::init(deployment, ResourceInit::new(name).with_options(opts), args)
            }
            CallShape::Flattened(args) => {
                let mut bound = args.bind(PARAMS)?;
                let args = OtherResourceArgs {
                    foo: bound.take_input::<Resource>("foo")?,
                };
                let init = ResourceInit::new(name)
                    .with_options(bound.take_raw(OPTS_KEYWORD))
                    .with_props(bound.take::<PropertyMap>(LEGACY_PROPS_KEYWORD)?)
                    .with_legacy_name(bound.take_string(LEGACY_NAME_KEYWORD)?)
                    .with_legacy_options(bound.take_raw(LEGACY_OPTS_KEYWORD));
                Self::init(deployment, init, args)
            }
        }
    }

    fn init<O: OptionsSource>(
        deployment: &Deployment,
        init: ResourceInit<O>,
        args: OtherResourceArgs,
    ) -> Result<Self, ResourceError> {
        crate::module::register(deployment);
        let (name, opts) = init.prepare(utilities::version())?.into_component()?;
        tracing::debug!(name = %name, has_foo = args.foo.is_some(), "constructing {OTHER_RESOURCE_TYPE}");

        let registered = deployment.register_resource(
            OTHER_RESOURCE_TYPE,
            &name,
            args.into_properties(),
            opts,
            false,
            true,
        );
        Ok(Self::from_registered(registered))
    }

    /// Rebuilds a handle for a component that is already part of the deployment.
    #[must_use]
    pub fn rehydrate(deployment: &Deployment, reference: &ResourceReference) -> Self {
        Self::from_registered(deployment.get_resource(reference.urn.clone(), false))
    }

    fn from_registered(registered: RegisteredResource) -> Self {
        let foo = registered.output(tables::snake_to_camel("foo"));
        Self { registered, foo }
    }

    /// The `foo` output property.
    #[must_use]
    pub fn foo(&self) -> &Output<Option<Resource>> {
        &self.foo
    }

    /// The component's URN.
    #[must_use]
    pub fn urn(&self) -> &Output<Urn> {
        self.registered.urn()
    }
}

impl ResourceHandle for OtherResource {
    fn urn(&self) -> &Output<Urn> {
        self.registered.urn()
    }
}

impl PropertyTranslator for OtherResource {
    fn translate_output_property<'a>(&self, prop: &'a str) -> &'a str {
        tables::camel_to_snake(prop)
    }

    fn translate_input_property<'a>(&self, prop: &'a str) -> &'a str {
        tables::snake_to_camel(prop)
    }
}
