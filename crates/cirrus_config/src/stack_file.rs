//! Editing a stack's YAML configuration file in place.
//!
//! A stack file is a YAML mapping. Config entries live under nested mappings
//! addressed by a dot-separated key path walked from the document root, e.g.
//! `config` or `config.example`. Entry order is preserved across edits; new
//! entries are appended. Comments are not preserved.

use crate::error::ConfigError;
use serde_yaml::{Mapping, Value};

const SECURE_KEY: &str = "secure";

/// A config value to be written to a stack file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigValue {
    value: String,
    secure: bool,
}

impl ConfigValue {
    /// A plaintext value.
    #[must_use]
    pub fn plain(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            secure: false,
        }
    }

    /// An encrypted value, written as `{secure: <ciphertext>}`.
    #[must_use]
    pub fn secure(ciphertext: impl Into<String>) -> Self {
        Self {
            value: ciphertext.into(),
            secure: true,
        }
    }

    /// Whether the value is encrypted.
    #[must_use]
    pub fn is_secure(&self) -> bool {
        self.secure
    }

    /// The plaintext or ciphertext.
    #[must_use]
    pub fn value(&self) -> &str {
        &self.value
    }

    fn to_yaml(&self) -> Value {
        let text = Value::String(self.value.clone());
        if self.secure {
            let mut wrapper = Mapping::new();
            wrapper.insert(Value::String(SECURE_KEY.to_string()), text);
            Value::Mapping(wrapper)
        } else {
            text
        }
    }
}

/// A parsed stack configuration file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StackConfigFile {
    document: Option<Value>,
}

impl StackConfigFile {
    /// Parses a stack file. Empty input yields an empty file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] if the input is not valid YAML.
    pub fn parse(bytes: &[u8]) -> Result<Self, ConfigError> {
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Self::default());
        }
        let document: Value = serde_yaml::from_slice(bytes)?;
        if document.is_null() {
            return Ok(Self::default());
        }
        Ok(Self {
            document: Some(document),
        })
    }

    /// Whether the file has no document.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.document.is_none()
    }

    /// Serializes the file. An empty file serializes to an empty string.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] if the document cannot be serialized.
    pub fn to_yaml(&self) -> Result<String, ConfigError> {
        match &self.document {
            Some(document) => Ok(serde_yaml::to_string(document)?),
            None => Ok(String::new()),
        }
    }

    /// Sets `key` under the mapping at `key_path`.
    ///
    /// An existing entry is replaced in place; a new one is appended. Does
    /// nothing on an empty file.
    ///
    /// The value is written in the form `value` asks for: a plain value stays a
    /// plain scalar even for a new key, and only [`ConfigValue::secure`] values
    /// are wrapped as `{secure: <ciphertext>}`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::KeyNotFound`] if a key path segment does not name
    /// a nested mapping.
    pub fn set_config(
        &mut self,
        key_path: &str,
        key: &str,
        value: &ConfigValue,
    ) -> Result<(), ConfigError> {
        let Some(root) = self.root_mut() else {
            return Ok(());
        };
        let node = walk(root, key_path)?;
        node.insert(Value::String(key.to_string()), value.to_yaml());
        tracing::debug!(key_path, key, secure = value.is_secure(), "set config value");
        Ok(())
    }

    /// Removes `key` from the mapping at `key_path`.
    ///
    /// Removing a key that is not present does nothing, as does any call on an
    /// empty file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::KeyNotFound`] if a key path segment does not name
    /// a nested mapping.
    pub fn delete_config(&mut self, key_path: &str, key: &str) -> Result<(), ConfigError> {
        let Some(root) = self.root_mut() else {
            return Ok(());
        };
        let node = walk(root, key_path)?;
        if node.shift_remove(key).is_some() {
            tracing::debug!(key_path, key, "deleted config value");
        }
        Ok(())
    }

    fn root_mut(&mut self) -> Option<&mut Mapping> {
        self.document.as_mut().and_then(Value::as_mapping_mut)
    }
}

fn walk<'a>(mut node: &'a mut Mapping, key_path: &str) -> Result<&'a mut Mapping, ConfigError> {
    if key_path.is_empty() {
        return Ok(node);
    }
    for segment in key_path.split('.') {
        node = node
            .get_mut(segment)
            .and_then(Value::as_mapping_mut)
            .ok_or_else(|| ConfigError::KeyNotFound(segment.to_string()))?;
    }
    Ok(node)
}

#[cfg(test)]
mod tests {
    use super::*;

    const STACK: &str = "\
encryptionsalt: v1:abc
config:
  example:region: us-west-2
  example:token:
    secure: AAABAK
  app:
    replicas: \"3\"
";

    fn stack() -> StackConfigFile {
        StackConfigFile::parse(STACK.as_bytes()).unwrap()
    }

    fn get<'a>(file: &'a StackConfigFile, path: &[&str]) -> Option<&'a Value> {
        let mut value = file.document.as_ref()?;
        for segment in path {
            value = value.get(segment)?;
        }
        Some(value)
    }

    #[test]
    fn empty_input_is_an_empty_file() {
        let file = StackConfigFile::parse(b"").unwrap();
        assert!(file.is_empty());
        assert_eq!(file.to_yaml().unwrap(), "");
        assert!(StackConfigFile::parse(b"  \n").unwrap().is_empty());
    }

    #[test]
    fn invalid_yaml_fails_to_parse() {
        let err = StackConfigFile::parse(b"config: [unclosed").unwrap_err();
        assert!(err.to_string().starts_with("failed to parse YAML file"));
    }

    #[test]
    fn edits_on_empty_file_are_no_ops() {
        let mut file = StackConfigFile::default();
        file.set_config("config", "k", &ConfigValue::plain("v"))
            .unwrap();
        file.delete_config("config", "k").unwrap();
        assert!(file.is_empty());
    }

    #[test]
    fn replaces_existing_value_in_place() {
        let mut file = stack();
        file.set_config("config", "example:region", &ConfigValue::plain("eu-west-1"))
            .unwrap();

        assert_eq!(
            get(&file, &["config", "example:region"]).and_then(Value::as_str),
            Some("eu-west-1")
        );
        let keys: Vec<_> = get(&file, &["config"])
            .and_then(Value::as_mapping)
            .unwrap()
            .keys()
            .filter_map(Value::as_str)
            .collect();
        assert_eq!(keys, vec!["example:region", "example:token", "app"]);
    }

    #[test]
    fn secure_values_are_wrapped() {
        let mut file = stack();
        file.set_config("config", "example:region", &ConfigValue::secure("AAABAQ"))
            .unwrap();
        assert_eq!(
            get(&file, &["config", "example:region", "secure"]).and_then(Value::as_str),
            Some("AAABAQ")
        );
    }

    #[test]
    fn new_keys_are_appended() {
        let mut file = stack();
        file.set_config("config.app", "image", &ConfigValue::plain("nginx"))
            .unwrap();

        let app = get(&file, &["config", "app"])
            .and_then(Value::as_mapping)
            .unwrap();
        let keys: Vec<_> = app.keys().filter_map(Value::as_str).collect();
        assert_eq!(keys, vec!["replicas", "image"]);
    }

    #[test]
    fn new_plain_keys_are_not_wrapped() {
        let mut file = stack();
        file.set_config("config", "example:zone", &ConfigValue::plain("b"))
            .unwrap();
        file.set_config("config", "example:secret", &ConfigValue::secure("AAAB"))
            .unwrap();

        assert_eq!(
            get(&file, &["config", "example:zone"]).and_then(Value::as_str),
            Some("b")
        );
        assert_eq!(
            get(&file, &["config", "example:secret", "secure"]).and_then(Value::as_str),
            Some("AAAB")
        );
    }

    #[test]
    fn empty_key_path_targets_the_root() {
        let mut file = stack();
        file.set_config("", "secretsprovider", &ConfigValue::plain("passphrase"))
            .unwrap();
        assert_eq!(
            get(&file, &["secretsprovider"]).and_then(Value::as_str),
            Some("passphrase")
        );
    }

    #[test]
    fn missing_path_segment_is_reported() {
        let mut file = stack();
        let err = file
            .set_config("config.missing", "k", &ConfigValue::plain("v"))
            .unwrap_err();
        assert!(matches!(err, ConfigError::KeyNotFound(ref segment) if segment == "missing"));

        let err = file.delete_config("config.example:region", "k").unwrap_err();
        assert!(matches!(err, ConfigError::KeyNotFound(_)));
    }

    #[test]
    fn delete_removes_and_tolerates_missing_keys() {
        let mut file = stack();
        file.delete_config("config", "example:token").unwrap();
        file.delete_config("config", "not-there").unwrap();

        assert!(get(&file, &["config", "example:token"]).is_none());
        assert!(get(&file, &["config", "app"]).is_some());
    }

    #[test]
    fn serializes_edits() {
        let mut file = stack();
        file.set_config("config", "example:zone", &ConfigValue::plain("a"))
            .unwrap();
        let yaml = file.to_yaml().unwrap();
        let reparsed = StackConfigFile::parse(yaml.as_bytes()).unwrap();
        assert_eq!(reparsed, file);
    }

    mod prop_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn set_then_delete_of_new_key_restores_file(
                key in "[a-z]{1,8}:[a-z]{1,8}",
                value in "[a-zA-Z0-9]{0,16}",
                secure in any::<bool>(),
            ) {
                let original = stack();
                prop_assume!(get(&original, &["config", key.as_str()]).is_none());
                let mut file = original.clone();
                let value = if secure { ConfigValue::secure(value) } else { ConfigValue::plain(value) };

                file.set_config("config", &key, &value).unwrap();
                prop_assert!(get(&file, &["config", key.as_str()]).is_some());

                file.delete_config("config", &key).unwrap();
                prop_assert_eq!(file, original);
            }
        }
    }
}
