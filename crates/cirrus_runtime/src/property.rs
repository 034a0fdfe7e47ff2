//! Property values and property maps.
//!
//! A [`PropertyMap`] is the set of named inputs a binding hands to the runtime
//! and the set of named outputs the runtime hands back. Values may still be
//! [`Pending`](PropertyValue::Pending) when the map is built; the runtime
//! awaits them with [`PropertyMap::resolve`] before sending a registration.
//!
//! Absent properties are simply not present in the map. Bindings never insert
//! an explicit [`PropertyValue::Null`] for an argument the caller omitted.

use crate::deployment::Deployment;
use crate::error::OutputError;
use crate::input::Input;
use crate::output::Output;
use crate::urn::Urn;
use futures::future::{BoxFuture, FutureExt};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;

/// Key marking a wire object as a special (signature-carrying) value.
pub const SIGNATURE_KEY: &str = "4dabf18193072939515e22adb298388d";

/// Signature of an encoded resource reference.
pub const RESOURCE_REFERENCE_SIGNATURE: &str = "5cf8f73096256a8f31e491e813e4eb8e";

/// Wire sentinel for a value that is unknown during a preview.
pub const UNKNOWN_VALUE: &str = "04da6b54-80e4-46f7-96ec-b56ff0331ba9";

/// A reference to a registered resource, passed as a property value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResourceReference {
    /// URN of the referenced resource.
    pub urn: Urn,
    /// Provider-assigned id, for custom resources.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

impl ResourceReference {
    /// Creates a reference to the resource with the given URN.
    #[must_use]
    pub fn new(urn: Urn) -> Self {
        Self { urn, id: None }
    }

    /// Sets the provider-assigned id.
    #[must_use]
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Returns the referenced resource's type token.
    #[must_use]
    pub fn type_token(&self) -> &str {
        self.urn.type_token()
    }
}

/// A single property value.
#[derive(Debug, Clone)]
pub enum PropertyValue {
    /// An explicit null.
    Null,
    /// A boolean.
    Bool(bool),
    /// A number.
    Number(f64),
    /// A string.
    String(String),
    /// An ordered list of values.
    Array(Vec<PropertyValue>),
    /// A nested map.
    Object(PropertyMap),
    /// A reference to another resource.
    Resource(ResourceReference),
    /// A value produced by another resource, not yet resolved.
    Pending(PendingProperty),
    /// A value that is unknown during a preview.
    Unknown,
}

/// An unresolved output, converted to a property once it settles.
///
/// Conversion happens when the value is awaited; wrapping an output never
/// spawns a task and needs no running tokio runtime.
#[derive(Clone)]
pub struct PendingProperty {
    source: Arc<dyn PendingSource>,
}

trait PendingSource: Send + Sync {
    fn settle(&self) -> BoxFuture<'static, Result<PropertyValue, OutputError>>;
}

impl<T: IntoProperty + Clone + Send + Sync + 'static> PendingSource for Output<T> {
    fn settle(&self) -> BoxFuture<'static, Result<PropertyValue, OutputError>> {
        let output = self.clone();
        async move { output.value().await.map(IntoProperty::into_property) }.boxed()
    }
}

impl PendingProperty {
    /// Wraps `output`.
    #[must_use]
    pub fn new<T: IntoProperty + Clone + Send + Sync + 'static>(output: Output<T>) -> Self {
        Self {
            source: Arc::new(output),
        }
    }

    /// Waits for the source output and converts its value.
    ///
    /// # Errors
    ///
    /// Returns the error the source output settled with.
    pub async fn value(&self) -> Result<PropertyValue, OutputError> {
        self.source.settle().await
    }
}

impl core::fmt::Debug for PendingProperty {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("PendingProperty").finish_non_exhaustive()
    }
}

impl PartialEq for PropertyValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Null, Self::Null) | (Self::Unknown, Self::Unknown) => true,
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::Number(a), Self::Number(b)) => a == b,
            (Self::String(a), Self::String(b)) => a == b,
            (Self::Array(a), Self::Array(b)) => a == b,
            (Self::Object(a), Self::Object(b)) => a == b,
            (Self::Resource(a), Self::Resource(b)) => a == b,
            // Pending values have no identity to compare.
            _ => false,
        }
    }
}

impl PropertyValue {
    /// Returns `true` if the value and everything nested in it is known.
    #[must_use]
    pub fn is_known(&self) -> bool {
        match self {
            Self::Pending(_) | Self::Unknown => false,
            Self::Array(items) => items.iter().all(Self::is_known),
            Self::Object(map) => map.is_known(),
            _ => true,
        }
    }

    /// Returns the string payload, if this is a string.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the referenced resource, if this is a resource reference.
    #[must_use]
    pub fn as_resource(&self) -> Option<&ResourceReference> {
        match self {
            Self::Resource(reference) => Some(reference),
            _ => None,
        }
    }

    /// Encodes the value in its wire form.
    ///
    /// Pending and unknown values are encoded as the unknown sentinel.
    #[must_use]
    pub fn to_json(&self) -> Value {
        match self {
            Self::Null => Value::Null,
            Self::Bool(b) => Value::Bool(*b),
            Self::Number(n) => serde_json::Number::from_f64(*n).map_or(Value::Null, Value::Number),
            Self::String(s) => Value::String(s.clone()),
            Self::Array(items) => Value::Array(items.iter().map(Self::to_json).collect()),
            Self::Object(map) => map.to_json(),
            Self::Resource(reference) => {
                let mut object = serde_json::Map::new();
                object.insert(
                    SIGNATURE_KEY.to_string(),
                    Value::String(RESOURCE_REFERENCE_SIGNATURE.to_string()),
                );
                object.insert("urn".to_string(), Value::String(reference.urn.to_string()));
                if let Some(id) = &reference.id {
                    object.insert("id".to_string(), Value::String(id.clone()));
                }
                Value::Object(object)
            }
            Self::Pending(_) | Self::Unknown => Value::String(UNKNOWN_VALUE.to_string()),
        }
    }

    /// Decodes a value from its wire form.
    #[must_use]
    pub fn from_json(value: Value) -> Self {
        match value {
            Value::Null => Self::Null,
            Value::Bool(b) => Self::Bool(b),
            Value::Number(n) => n.as_f64().map_or(Self::Null, Self::Number),
            Value::String(s) if s == UNKNOWN_VALUE => Self::Unknown,
            Value::String(s) => Self::String(s),
            Value::Array(items) => Self::Array(items.into_iter().map(Self::from_json).collect()),
            Value::Object(object) => {
                if let Some(reference) = decode_reference(&object) {
                    return Self::Resource(reference);
                }
                Self::Object(PropertyMap {
                    entries: object
                        .into_iter()
                        .map(|(k, v)| (k, Self::from_json(v)))
                        .collect(),
                })
            }
        }
    }
}

fn decode_reference(object: &serde_json::Map<String, Value>) -> Option<ResourceReference> {
    if object.get(SIGNATURE_KEY)?.as_str()? != RESOURCE_REFERENCE_SIGNATURE {
        return None;
    }
    let urn = Urn::parse(object.get("urn")?.as_str()?).ok()?;
    let id = object.get("id").and_then(Value::as_str).map(str::to_string);
    Some(ResourceReference { urn, id })
}

/// An insertion-ordered map of named property values.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PropertyMap {
    entries: IndexMap<String, PropertyValue>,
}

impl PropertyMap {
    /// Creates an empty map.
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: IndexMap::new(),
        }
    }

    /// Inserts a property, returning the previous value under that name.
    pub fn insert(
        &mut self,
        name: impl Into<String>,
        value: impl IntoProperty,
    ) -> Option<PropertyValue> {
        self.entries.insert(name.into(), value.into_property())
    }

    /// Returns the value stored under `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&PropertyValue> {
        self.entries.get(name)
    }

    /// Removes and returns the value stored under `name`.
    pub fn remove(&mut self, name: &str) -> Option<PropertyValue> {
        self.entries.shift_remove(name)
    }

    /// Returns `true` if a value is stored under `name`.
    #[must_use]
    pub fn contains_key(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Returns the number of properties.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the map has no properties.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the property names in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Iterates over the properties in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &PropertyValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Returns `true` if every value in the map is known.
    #[must_use]
    pub fn is_known(&self) -> bool {
        self.entries.values().all(PropertyValue::is_known)
    }

    /// Waits for every pending value and returns the fully resolved map.
    ///
    /// Values that settle as unknown become [`PropertyValue::Unknown`].
    ///
    /// # Errors
    ///
    /// Returns the first error a pending value fails with.
    pub async fn resolve(self) -> Result<Self, OutputError> {
        resolve_map(self).await
    }

    /// Encodes the map in its wire form.
    #[must_use]
    pub fn to_json(&self) -> Value {
        Value::Object(
            self.entries
                .iter()
                .map(|(k, v)| (k.clone(), v.to_json()))
                .collect(),
        )
    }

    /// Decodes a map from its wire form. Non-object values yield an empty map.
    #[must_use]
    pub fn from_json(value: Value) -> Self {
        match PropertyValue::from_json(value) {
            PropertyValue::Object(map) => map,
            _ => Self::new(),
        }
    }
}

impl<K: Into<String>, V: IntoProperty> FromIterator<(K, V)> for PropertyMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            entries: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into_property()))
                .collect(),
        }
    }
}

fn resolve_map(map: PropertyMap) -> BoxFuture<'static, Result<PropertyMap, OutputError>> {
    async move {
        let mut entries = IndexMap::with_capacity(map.entries.len());
        for (name, value) in map.entries {
            entries.insert(name, resolve_value(value).await?);
        }
        Ok(PropertyMap { entries })
    }
    .boxed()
}

fn resolve_value(value: PropertyValue) -> BoxFuture<'static, Result<PropertyValue, OutputError>> {
    async move {
        match value {
            PropertyValue::Pending(pending) => match pending.value().await {
                Ok(inner) => resolve_value(inner).await,
                Err(OutputError::Unknown) => Ok(PropertyValue::Unknown),
                Err(err) => Err(err),
            },
            PropertyValue::Array(items) => {
                let mut resolved = Vec::with_capacity(items.len());
                for item in items {
                    resolved.push(resolve_value(item).await?);
                }
                Ok(PropertyValue::Array(resolved))
            }
            PropertyValue::Object(map) => Ok(PropertyValue::Object(resolve_map(map).await?)),
            other => Ok(other),
        }
    }
    .boxed()
}

/// Conversion into a [`PropertyValue`].
pub trait IntoProperty {
    /// Converts `self` into a property value.
    fn into_property(self) -> PropertyValue;
}

/// Conversion from a resolved [`PropertyValue`].
///
/// The [`Deployment`] is available so resource references can be turned back
/// into typed resource handles.
pub trait FromProperty: Sized {
    /// Decodes a property value.
    ///
    /// # Errors
    ///
    /// Returns [`OutputError::Unknown`] for unknown values and
    /// [`OutputError::Decode`] when the value has the wrong shape.
    fn from_property(value: PropertyValue, deployment: &Deployment) -> Result<Self, OutputError>;
}

fn unexpected(expected: &str, value: &PropertyValue) -> OutputError {
    match value {
        PropertyValue::Unknown => OutputError::Unknown,
        other => OutputError::decode(format!("expected {expected}, got {other:?}")),
    }
}

impl IntoProperty for PropertyValue {
    fn into_property(self) -> PropertyValue {
        self
    }
}

impl IntoProperty for String {
    fn into_property(self) -> PropertyValue {
        PropertyValue::String(self)
    }
}

impl IntoProperty for &str {
    fn into_property(self) -> PropertyValue {
        PropertyValue::String(self.to_string())
    }
}

impl IntoProperty for bool {
    fn into_property(self) -> PropertyValue {
        PropertyValue::Bool(self)
    }
}

impl IntoProperty for f64 {
    fn into_property(self) -> PropertyValue {
        PropertyValue::Number(self)
    }
}

impl IntoProperty for i64 {
    fn into_property(self) -> PropertyValue {
        PropertyValue::Number(self as f64)
    }
}

impl IntoProperty for PropertyMap {
    fn into_property(self) -> PropertyValue {
        PropertyValue::Object(self)
    }
}

impl IntoProperty for ResourceReference {
    fn into_property(self) -> PropertyValue {
        PropertyValue::Resource(self)
    }
}

impl<T: IntoProperty> IntoProperty for Option<T> {
    fn into_property(self) -> PropertyValue {
        self.map_or(PropertyValue::Null, IntoProperty::into_property)
    }
}

impl<T: IntoProperty> IntoProperty for Vec<T> {
    fn into_property(self) -> PropertyValue {
        PropertyValue::Array(self.into_iter().map(IntoProperty::into_property).collect())
    }
}

impl<T: IntoProperty + Clone + Send + Sync + 'static> IntoProperty for Output<T> {
    fn into_property(self) -> PropertyValue {
        match self.try_get() {
            Some(Ok(value)) => value.into_property(),
            _ => PropertyValue::Pending(PendingProperty::new(self)),
        }
    }
}

impl<T: IntoProperty + Clone + Send + Sync + 'static> IntoProperty for Input<T> {
    fn into_property(self) -> PropertyValue {
        match self {
            Self::Value(value) => value.into_property(),
            Self::Output(output) => output.into_property(),
        }
    }
}

impl FromProperty for PropertyValue {
    fn from_property(value: PropertyValue, _deployment: &Deployment) -> Result<Self, OutputError> {
        Ok(value)
    }
}

impl FromProperty for String {
    fn from_property(value: PropertyValue, _deployment: &Deployment) -> Result<Self, OutputError> {
        match value {
            PropertyValue::String(s) => Ok(s),
            other => Err(unexpected("a string", &other)),
        }
    }
}

impl FromProperty for bool {
    fn from_property(value: PropertyValue, _deployment: &Deployment) -> Result<Self, OutputError> {
        match value {
            PropertyValue::Bool(b) => Ok(b),
            other => Err(unexpected("a boolean", &other)),
        }
    }
}

impl FromProperty for f64 {
    fn from_property(value: PropertyValue, _deployment: &Deployment) -> Result<Self, OutputError> {
        match value {
            PropertyValue::Number(n) => Ok(n),
            other => Err(unexpected("a number", &other)),
        }
    }
}

impl FromProperty for i64 {
    fn from_property(value: PropertyValue, _deployment: &Deployment) -> Result<Self, OutputError> {
        match value {
            PropertyValue::Number(n) if n.fract() == 0.0 => Ok(n as i64),
            other => Err(unexpected("an integer", &other)),
        }
    }
}

impl FromProperty for PropertyMap {
    fn from_property(value: PropertyValue, _deployment: &Deployment) -> Result<Self, OutputError> {
        match value {
            PropertyValue::Object(map) => Ok(map),
            other => Err(unexpected("an object", &other)),
        }
    }
}

impl FromProperty for ResourceReference {
    fn from_property(value: PropertyValue, _deployment: &Deployment) -> Result<Self, OutputError> {
        match value {
            PropertyValue::Resource(reference) => Ok(reference),
            other => Err(unexpected("a resource reference", &other)),
        }
    }
}

impl<T: FromProperty> FromProperty for Option<T> {
    fn from_property(value: PropertyValue, deployment: &Deployment) -> Result<Self, OutputError> {
        match value {
            PropertyValue::Null => Ok(None),
            other => T::from_property(other, deployment).map(Some),
        }
    }
}

impl<T: FromProperty> FromProperty for Vec<T> {
    fn from_property(value: PropertyValue, deployment: &Deployment) -> Result<Self, OutputError> {
        match value {
            PropertyValue::Array(items) => items
                .into_iter()
                .map(|item| T::from_property(item, deployment))
                .collect(),
            other => Err(unexpected("an array", &other)),
        }
    }
}
