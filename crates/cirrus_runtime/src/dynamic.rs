//! The flattened, dynamically-typed calling convention.
//!
//! Typed Rust callers construct resources with a single constructor and an
//! explicit options struct. Hosts that forward untyped arguments (scripting
//! bridges, generic tooling) instead hand over a [`DynamicArgs`]: a list of
//! positional values and a map of keyword values, each type-erased.
//!
//! [`resource_args_opts`] decides which of the two accepted shapes a call has:
//!
//! - **Bundled**: the first positional (or the `args` keyword) is the
//!   resource's argument bundle; options come from the next positional or the
//!   `opts` keyword.
//! - **Flattened**: every property is its own keyword (or positional, in
//!   declaration order), alongside `opts` and the legacy keywords.
//!
//! Values are checked against their expected types when they are taken; a
//! mismatch is a [`ResourceError::TypeMismatch`].

use crate::error::ResourceError;
use crate::input::Input;
use crate::options::ResourceOptions;
use crate::output::Output;
use core::any::{Any, type_name};
use indexmap::IndexMap;
use std::collections::VecDeque;

/// Keyword carrying the argument bundle in the bundled form.
pub const ARGS_KEYWORD: &str = "args";
/// Keyword carrying the options object.
pub const OPTS_KEYWORD: &str = "opts";
/// Deprecated keyword carrying a pre-built property set.
pub const LEGACY_PROPS_KEYWORD: &str = "__props__";
/// Deprecated keyword aliasing the resource name.
pub const LEGACY_NAME_KEYWORD: &str = "__name__";
/// Deprecated keyword aliasing the options object.
pub const LEGACY_OPTS_KEYWORD: &str = "__opts__";

/// A type-erased argument value.
pub struct DynValue {
    value: Box<dyn Any + Send + Sync>,
    type_name: &'static str,
}

impl core::fmt::Debug for DynValue {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_tuple("DynValue").field(&self.type_name).finish()
    }
}

impl DynValue {
    /// Wraps a value.
    #[must_use]
    pub fn new<T: Any + Send + Sync>(value: T) -> Self {
        Self {
            value: Box::new(value),
            type_name: type_name::<T>(),
        }
    }

    /// Returns `true` if the wrapped value is a `T`.
    #[must_use]
    pub fn is<T: Any>(&self) -> bool {
        self.value.is::<T>()
    }

    /// Returns the wrapped value's type name.
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Unwraps the value as a `T`, handing it back unchanged on mismatch.
    ///
    /// # Errors
    ///
    /// Returns `self` if the wrapped value is not a `T`.
    pub fn downcast<T: Any>(self) -> Result<T, Self> {
        let type_name = self.type_name;
        self.value
            .downcast::<T>()
            .map(|boxed| *boxed)
            .map_err(|value| Self { value, type_name })
    }
}

/// Positional and keyword arguments of a dynamic call.
#[derive(Debug, Default)]
pub struct DynamicArgs {
    positional: VecDeque<DynValue>,
    keyword: IndexMap<String, DynValue>,
}

impl DynamicArgs {
    /// Creates an empty argument list.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a positional argument.
    #[must_use]
    pub fn arg<T: Any + Send + Sync>(mut self, value: T) -> Self {
        self.positional.push_back(DynValue::new(value));
        self
    }

    /// Sets a keyword argument.
    #[must_use]
    pub fn kwarg<T: Any + Send + Sync>(mut self, name: impl Into<String>, value: T) -> Self {
        self.keyword.insert(name.into(), DynValue::new(value));
        self
    }

    /// Returns `true` if there are no arguments left.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.positional.is_empty() && self.keyword.is_empty()
    }

    /// Binds positional arguments to `params` in order and merges the
    /// keywords, producing one value per named parameter.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::TypeMismatch`] if there are more positionals
    /// than parameters, a parameter receives both a positional and a keyword
    /// value, or a keyword names no parameter.
    pub fn bind(self, params: &[&str]) -> Result<BoundArgs, ResourceError> {
        if self.positional.len() > params.len() {
            return Err(ResourceError::type_mismatch(format!(
                "takes {} positional arguments but {} were given",
                params.len(),
                self.positional.len()
            )));
        }

        let mut values: IndexMap<String, DynValue> = params
            .iter()
            .zip(self.positional)
            .map(|(param, value)| ((*param).to_string(), value))
            .collect();

        for (name, value) in self.keyword {
            if !params.contains(&name.as_str()) {
                return Err(ResourceError::type_mismatch(format!(
                    "got an unexpected keyword argument '{name}'"
                )));
            }
            if values.contains_key(&name) {
                return Err(ResourceError::type_mismatch(format!(
                    "got multiple values for argument '{name}'"
                )));
            }
            values.insert(name, value);
        }

        Ok(BoundArgs { values })
    }
}

/// Arguments bound to named parameters by [`DynamicArgs::bind`].
#[derive(Debug, Default)]
pub struct BoundArgs {
    values: IndexMap<String, DynValue>,
}

impl BoundArgs {
    /// Takes the untyped value bound to `name`.
    pub fn take_raw(&mut self, name: &str) -> Option<DynValue> {
        self.values.shift_remove(name)
    }

    /// Takes the value bound to `name` as a `T`.
    ///
    /// `Option<T>` is accepted too, with `None` treated as absent.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::TypeMismatch`] if the value has another type.
    pub fn take<T: Any>(&mut self, name: &str) -> Result<Option<T>, ResourceError> {
        let Some(value) = self.take_raw(name) else {
            return Ok(None);
        };
        let value = match value.downcast::<T>() {
            Ok(value) => return Ok(Some(value)),
            Err(value) => value,
        };
        value
            .downcast::<Option<T>>()
            .map_err(|value| mismatch::<T>(name, &value))
    }

    /// Takes the value bound to `name` as a string.
    ///
    /// Accepts a `String`, a `&'static str`, or either wrapped in an `Option`.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::TypeMismatch`] if the value is none of those.
    pub fn take_string(&mut self, name: &str) -> Result<Option<String>, ResourceError> {
        let Some(value) = self.take_raw(name) else {
            return Ok(None);
        };
        let value = match value.downcast::<String>() {
            Ok(text) => return Ok(Some(text)),
            Err(value) => value,
        };
        let value = match value.downcast::<Option<String>>() {
            Ok(text) => return Ok(text),
            Err(value) => value,
        };
        let value = match value.downcast::<&'static str>() {
            Ok(text) => return Ok(Some(text.to_string())),
            Err(value) => value,
        };
        value
            .downcast::<Option<&'static str>>()
            .map(|text| text.map(str::to_string))
            .map_err(|value| mismatch::<String>(name, &value))
    }

    /// Takes the value bound to `name` as an input of `T`.
    ///
    /// Accepts an [`Input<T>`], an [`Output<T>`], a plain `T`, or any of
    /// them wrapped in an `Option`, with `None` treated as absent.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::TypeMismatch`] if the value is none of those.
    pub fn take_input<T: Any>(&mut self, name: &str) -> Result<Option<Input<T>>, ResourceError> {
        let Some(value) = self.take_raw(name) else {
            return Ok(None);
        };
        let value = match value.downcast::<Input<T>>() {
            Ok(input) => return Ok(Some(input)),
            Err(value) => value,
        };
        let value = match value.downcast::<Output<T>>() {
            Ok(output) => return Ok(Some(Input::Output(output))),
            Err(value) => value,
        };
        let value = match value.downcast::<T>() {
            Ok(plain) => return Ok(Some(Input::Value(plain))),
            Err(value) => value,
        };
        let value = match value.downcast::<Option<Input<T>>>() {
            Ok(input) => return Ok(input),
            Err(value) => value,
        };
        let value = match value.downcast::<Option<Output<T>>>() {
            Ok(output) => return Ok(output.map(Input::Output)),
            Err(value) => value,
        };
        value
            .downcast::<Option<T>>()
            .map(|plain| plain.map(Input::Value))
            .map_err(|value| mismatch::<Input<T>>(name, &value))
    }
}

fn mismatch<T>(name: &str, value: &DynValue) -> ResourceError {
    ResourceError::type_mismatch(format!(
        "Expected '{name}' to be {}, got {}",
        type_name::<T>(),
        value.type_name()
    ))
}

/// The two accepted call shapes.
#[derive(Debug)]
pub enum CallShape<A> {
    /// The caller passed an argument bundle.
    Bundled {
        /// The argument bundle.
        args: A,
        /// The untyped options value, if any.
        opts: Option<DynValue>,
    },
    /// The caller passed every property separately.
    Flattened(DynamicArgs),
}

/// Detects whether `args` carries an argument bundle of type `A`.
///
/// Options are only type-checked later, during construction, so a wrongly
/// typed `opts` value is still handed back here. With a bundle, the value
/// after it is taken as the options whatever its type.
#[must_use]
pub fn resource_args_opts<A: Any>(mut args: DynamicArgs) -> CallShape<A> {
    let mut bundle = None;
    if args.positional.front().is_some_and(DynValue::is::<A>) {
        bundle = args
            .positional
            .pop_front()
            .and_then(|value| value.downcast::<A>().ok());
    }

    let mut opts = None;
    if args
        .positional
        .front()
        .is_some_and(DynValue::is::<ResourceOptions>)
    {
        opts = args.positional.pop_front();
    }

    if bundle.is_none() && args.keyword.get(ARGS_KEYWORD).is_some_and(DynValue::is::<A>) {
        bundle = args
            .keyword
            .shift_remove(ARGS_KEYWORD)
            .and_then(|value| value.downcast::<A>().ok());
    }

    match bundle {
        Some(bundle) => {
            if opts.is_none() {
                opts = args
                    .positional
                    .pop_front()
                    .or_else(|| args.keyword.shift_remove(OPTS_KEYWORD));
            }
            CallShape::Bundled { args: bundle, opts }
        }
        None => {
            // Put a positional options value back where the flattened binder expects it.
            if let Some(opts) = opts {
                args.positional.push_front(opts);
            }
            CallShape::Flattened(args)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq)]
    struct Bundle(u32);

    #[test]
    fn downcast_returns_value_on_mismatch() {
        let value = DynValue::new(5u32);
        let value = value.downcast::<String>().unwrap_err();
        assert_eq!(value.type_name(), "u32");
        assert_eq!(value.downcast::<u32>().unwrap(), 5);
    }

    #[test]
    fn detects_positional_bundle_and_options() {
        let args = DynamicArgs::new()
            .arg(Bundle(1))
            .arg(ResourceOptions::new().with_protect(true));

        match resource_args_opts::<Bundle>(args) {
            CallShape::Bundled { args, opts } => {
                assert_eq!(args, Bundle(1));
                let opts = opts.unwrap().downcast::<ResourceOptions>().unwrap();
                assert!(opts.protect);
            }
            CallShape::Flattened(_) => panic!("expected bundled call"),
        }
    }

    #[test]
    fn detects_keyword_bundle_and_keyword_options() {
        let args = DynamicArgs::new()
            .kwarg(ARGS_KEYWORD, Bundle(2))
            .kwarg(OPTS_KEYWORD, "not options");

        match resource_args_opts::<Bundle>(args) {
            CallShape::Bundled { args, opts } => {
                assert_eq!(args, Bundle(2));
                assert!(opts.unwrap().is::<&'static str>());
            }
            CallShape::Flattened(_) => panic!("expected bundled call"),
        }
    }

    #[test]
    fn flattened_call_keeps_positional_options_first() {
        let args = DynamicArgs::new()
            .arg(ResourceOptions::new())
            .kwarg("foo", 3u32);

        let CallShape::Flattened(args) = resource_args_opts::<Bundle>(args) else {
            panic!("expected flattened call");
        };

        let mut bound = args.bind(&[OPTS_KEYWORD, "foo"]).unwrap();
        assert!(bound.take::<ResourceOptions>(OPTS_KEYWORD).unwrap().is_some());
        assert_eq!(bound.take::<u32>("foo").unwrap(), Some(3));
    }

    #[test]
    fn bind_rejects_unknown_and_duplicate_arguments() {
        let err = DynamicArgs::new()
            .kwarg("bar", 1u32)
            .bind(&["foo"])
            .unwrap_err();
        assert_eq!(err.to_string(), "got an unexpected keyword argument 'bar'");

        let err = DynamicArgs::new()
            .arg(1u32)
            .kwarg("foo", 2u32)
            .bind(&["foo"])
            .unwrap_err();
        assert_eq!(err.to_string(), "got multiple values for argument 'foo'");

        let err = DynamicArgs::new()
            .arg(1u32)
            .arg(2u32)
            .bind(&["foo"])
            .unwrap_err();
        assert!(matches!(err, ResourceError::TypeMismatch(_)));
    }

    #[test]
    fn take_accepts_optional_none_as_absent() {
        let mut bound = DynamicArgs::new()
            .kwarg("foo", None::<u32>)
            .bind(&["foo"])
            .unwrap();
        assert_eq!(bound.take::<u32>("foo").unwrap(), None);
    }

    #[test]
    fn take_input_accepts_each_input_shape() {
        let mut bound = DynamicArgs::new()
            .kwarg("plain", "a".to_string())
            .kwarg("input", Input::Value("b".to_string()))
            .kwarg("output", Output::resolved("c".to_string()))
            .kwarg("wrong", 4u32)
            .bind(&["plain", "input", "output", "wrong"])
            .unwrap();

        for name in ["plain", "input", "output"] {
            assert!(bound.take_input::<String>(name).unwrap().is_some());
        }
        assert!(matches!(
            bound.take_input::<String>("wrong"),
            Err(ResourceError::TypeMismatch(_))
        ));
    }

    #[test]
    fn take_input_treats_none_as_absent() {
        let mut bound = DynamicArgs::new()
            .kwarg("plain", None::<String>)
            .kwarg("output", None::<Output<String>>)
            .kwarg("input", None::<Input<String>>)
            .kwarg("some", Some(Output::resolved("d".to_string())))
            .bind(&["plain", "output", "input", "some"])
            .unwrap();

        for name in ["plain", "output", "input"] {
            assert!(bound.take_input::<String>(name).unwrap().is_none());
        }
        assert!(bound.take_input::<String>("some").unwrap().is_some());
    }

    #[test]
    fn take_string_accepts_owned_and_static_strings() {
        let mut bound = DynamicArgs::new()
            .kwarg("owned", "a".to_string())
            .kwarg("borrowed", "b")
            .kwarg("none", None::<String>)
            .kwarg("wrong", 1u8)
            .bind(&["owned", "borrowed", "none", "wrong"])
            .unwrap();

        assert_eq!(bound.take_string("owned").unwrap().as_deref(), Some("a"));
        assert_eq!(bound.take_string("borrowed").unwrap().as_deref(), Some("b"));
        assert_eq!(bound.take_string("none").unwrap(), None);
        assert!(bound.take_string("wrong").is_err());
        assert_eq!(bound.take_string("absent").unwrap(), None);
    }
}
