//! `example::Resource`: a provider-managed resource with one string property.

use crate::{tables, utilities};
use cirrus_runtime::deployment::{Deployment, RegisteredResource};
use cirrus_runtime::dynamic::{
    CallShape, DynamicArgs, LEGACY_NAME_KEYWORD, LEGACY_OPTS_KEYWORD, LEGACY_PROPS_KEYWORD,
    OPTS_KEYWORD, resource_args_opts,
};
use cirrus_runtime::error::{OutputError, ResourceError};
use cirrus_runtime::init::{Construction, OptionsSource, ResourceInit};
use cirrus_runtime::input::Input;
use cirrus_runtime::options::ResourceOptions;
use cirrus_runtime::output::Output;
use cirrus_runtime::property::{
    FromProperty, IntoProperty, PropertyMap, PropertyValue, ResourceReference,
};
use cirrus_runtime::resource::ResourceHandle;
use cirrus_runtime::translate::PropertyTranslator;
use cirrus_runtime::urn::Urn;

/// Type token of [`Resource`].
pub const RESOURCE_TYPE: &str = "example::Resource";

/// Parameters of the flattened calling convention, in positional order.
const PARAMS: &[&str] = &[
    OPTS_KEYWORD,
    "bar",
    LEGACY_PROPS_KEYWORD,
    LEGACY_NAME_KEYWORD,
    LEGACY_OPTS_KEYWORD,
];

/// The set of arguments for constructing a [`Resource`].
#[derive(Debug, Clone, Default)]
pub struct ResourceArgs {
    bar: Option<Input<String>>,
}

impl ResourceArgs {
    /// Creates an empty argument set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets `bar`.
    #[must_use]
    pub fn with_bar(mut self, bar: impl Into<Input<String>>) -> Self {
        self.bar = Some(bar.into());
        self
    }

    /// The `bar` argument, if set.
    #[must_use]
    pub fn bar(&self) -> Option<&Input<String>> {
        self.bar.as_ref()
    }

    /// Replaces the `bar` argument.
    pub fn set_bar(&mut self, bar: Option<Input<String>>) {
        self.bar = bar;
    }

    /// Builds the registration properties. Unset arguments are omitted.
    #[must_use]
    pub fn into_properties(self) -> PropertyMap {
        let mut props = PropertyMap::new();
        if let Some(bar) = self.bar {
            props.insert(tables::snake_to_camel("bar"), bar);
        }
        props
    }
}

/// A provider-managed `example::Resource`.
#[derive(Debug, Clone)]
pub struct Resource {
    registered: RegisteredResource,
    bar: Output<Option<String>>,
}

impl Resource {
    /// Creates a resource with the given unique name, arguments and options.
    ///
    /// Registration happens in the background; see [`Deployment::register_resource`].
    ///
    /// # Errors
    ///
    /// Returns the normalization error of [`ResourceInit::prepare`], if any.
    pub fn new(
        deployment: &Deployment,
        name: &str,
        args: ResourceArgs,
        opts: Option<ResourceOptions>,
    ) -> Result<Self, ResourceError> {
        Self::init(deployment, ResourceInit::new(name).with_options(opts), args)
    }

    /// Creates a resource from a dynamic call.
    ///
    /// Accepts either an argument bundle (positional or `args=`) with optional
    /// options, or every property as a separate argument together with `opts`
    /// and the legacy `__props__`, `__name__` and `__opts__` keywords.
    ///
    /// # Errors
    ///
    /// - [`ResourceError::TypeMismatch`] for unexpected arguments, wrongly typed
    ///   values, or options that are not a [`ResourceOptions`]
    /// - [`ResourceError::InvalidCombination`] if `__props__` is given without `opts.id`
    pub fn from_dynamic(
        deployment: &Deployment,
        name: &str,
        args: DynamicArgs,
    ) -> Result<Self, ResourceError> {
        match resource_args_opts::<ResourceArgs>(args) {
            CallShape::Bundled { args, opts } => {
                Self::init(deployment, ResourceInit::new(name).with_options(opts), args)
            }
            CallShape::Flattened(args) => {
                let mut bound = args.bind(PARAMS)?;
                let args = ResourceArgs {
                    bar: bound.take_input::<String>("bar")?,
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

    /// Looks up an existing object by provider id and adopts it under `name`.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::TypeMismatch`] if the options are invalid.
    pub fn get(
        deployment: &Deployment,
        name: &str,
        id: impl Into<Input<String>>,
        opts: Option<ResourceOptions>,
    ) -> Result<Self, ResourceError> {
        let opts = opts
            .unwrap_or_default()
            .merge(ResourceOptions::new().with_id(id));
        let mut props = PropertyMap::new();
        props.insert(tables::snake_to_camel("bar"), PropertyValue::Null);

        let init = ResourceInit::new(name)
            .with_options(Some(opts))
            .with_props(Some(props));
        Self::init(deployment, init, ResourceArgs::default())
    }

    fn init<O: OptionsSource>(
        deployment: &Deployment,
        init: ResourceInit<O>,
        args: ResourceArgs,
    ) -> Result<Self, ResourceError> {
        crate::module::register(deployment);

        let registered = match init.prepare(utilities::version())?.into_custom()? {
            Construction::Fresh { name, opts } => deployment.register_resource(
                RESOURCE_TYPE,
                &name,
                args.into_properties(),
                opts,
                true,
                false,
            ),
            Construction::Adopt {
                name,
                id,
                props,
                opts,
            } => {
                tracing::debug!(name = %name, "adopting existing {RESOURCE_TYPE}");
                deployment.read_resource(RESOURCE_TYPE, &name, id, props, opts)
            }
        };
        Ok(Self::from_registered(registered))
    }

    /// Rebuilds a handle for a resource that is already part of the deployment.
    #[must_use]
    pub fn rehydrate(deployment: &Deployment, reference: &ResourceReference) -> Self {
        Self::from_registered(deployment.get_resource(reference.urn.clone(), true))
    }

    fn from_registered(registered: RegisteredResource) -> Self {
        let bar = registered.output(tables::snake_to_camel("bar"));
        Self { registered, bar }
    }

    /// The `bar` output property.
    #[must_use]
    pub fn bar(&self) -> &Output<Option<String>> {
        &self.bar
    }

    /// The provider-assigned id.
    #[must_use]
    pub fn id(&self) -> &Output<Option<String>> {
        self.registered.id()
    }

    /// The resource's URN.
    #[must_use]
    pub fn urn(&self) -> &Output<Urn> {
        self.registered.urn()
    }

    /// A reference to this resource, for use as another resource's input.
    #[must_use]
    pub fn reference(&self) -> &Output<ResourceReference> {
        self.registered.reference()
    }
}

impl ResourceHandle for Resource {
    fn urn(&self) -> &Output<Urn> {
        self.registered.urn()
    }
}

impl PropertyTranslator for Resource {
    fn translate_output_property<'a>(&self, prop: &'a str) -> &'a str {
        tables::camel_to_snake(prop)
    }

    fn translate_input_property<'a>(&self, prop: &'a str) -> &'a str {
        tables::snake_to_camel(prop)
    }
}

impl IntoProperty for Resource {
    fn into_property(self) -> PropertyValue {
        self.registered.reference().clone().into_property()
    }
}

impl FromProperty for Resource {
    fn from_property(value: PropertyValue, deployment: &Deployment) -> Result<Self, OutputError> {
        let reference = match value {
            PropertyValue::Resource(reference) => reference,
            PropertyValue::String(urn) => ResourceReference::new(
                Urn::parse(&urn).map_err(|err| OutputError::decode(err.to_string()))?,
            ),
            PropertyValue::Unknown => return Err(OutputError::Unknown),
            other => {
                return Err(OutputError::decode(format!(
                    "expected a reference to {RESOURCE_TYPE}, got {other:?}"
                )));
            }
        };
        deployment
            .construct::<Self>(&reference)
            .map_err(|err| OutputError::decode(err.to_string()))
    }
}
