//! Resource URNs.
//!
//! A URN names a resource within a stack:
//!
//! ```text
//! urn:cirrus:<stack>::<project>::<qualified type>::<name>
//! ```
//!
//! The qualified type lists the parent chain's type tokens joined with `$`,
//! ending in the resource's own type token. Type tokens have the shape
//! `package:module:Type`, where the module may be empty
//! (`example::OtherResource`).

use crate::error::ResourceError;
use serde::{Deserialize, Serialize};

const URN_PREFIX: &str = "urn:cirrus:";
const DELIMITER: &str = "::";
const TYPE_DELIMITER: char = '$';

/// A parsed resource URN.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Urn {
    raw: String,
    stack_end: usize,
    project_end: usize,
    type_start: usize,
    type_end: usize,
}

impl Urn {
    /// Builds a URN from its parts.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::InvalidUrn`] if `type_token` is not of the form
    /// `package:module:Type` or a segment is empty.
    pub fn new(
        stack: &str,
        project: &str,
        parent_type: Option<&str>,
        type_token: &str,
        name: &str,
    ) -> Result<Self, ResourceError> {
        let qualified = match parent_type {
            Some(parent) => format!("{parent}{TYPE_DELIMITER}{type_token}"),
            None => type_token.to_string(),
        };
        let raw = format!("{URN_PREFIX}{stack}{DELIMITER}{project}{DELIMITER}{qualified}{DELIMITER}{name}");
        Self::parse(&raw)
    }

    /// Parses a URN string.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::InvalidUrn`] if the string is not a well-formed URN.
    pub fn parse(raw: &str) -> Result<Self, ResourceError> {
        let invalid = || ResourceError::InvalidUrn(raw.to_string());

        let body = raw.strip_prefix(URN_PREFIX).ok_or_else(invalid)?;
        let offset = URN_PREFIX.len();

        let stack_len = body.find(DELIMITER).ok_or_else(invalid)?;
        let stack_end = offset + stack_len;
        let after_stack = stack_end + DELIMITER.len();

        let project_len = raw[after_stack..].find(DELIMITER).ok_or_else(invalid)?;
        let project_end = after_stack + project_len;
        let qualified_start = project_end + DELIMITER.len();

        let qualified_end = qualified_start + scan_qualified_type(&raw[qualified_start..]).ok_or_else(invalid)?;
        let type_start = raw[qualified_start..qualified_end]
            .rfind(TYPE_DELIMITER)
            .map_or(qualified_start, |i| qualified_start + i + 1);

        let rest = &raw[qualified_end..];
        let name = rest.strip_prefix(DELIMITER).ok_or_else(invalid)?;
        if stack_len == 0 || project_len == 0 || name.is_empty() {
            return Err(invalid());
        }

        Ok(Self {
            raw: raw.to_string(),
            stack_end,
            project_end,
            type_start,
            type_end: qualified_end,
        })
    }

    /// Returns the stack segment.
    #[must_use]
    pub fn stack(&self) -> &str {
        &self.raw[URN_PREFIX.len()..self.stack_end]
    }

    /// Returns the project segment.
    #[must_use]
    pub fn project(&self) -> &str {
        &self.raw[self.stack_end + DELIMITER.len()..self.project_end]
    }

    /// Returns the full qualified type, including parent types.
    #[must_use]
    pub fn qualified_type(&self) -> &str {
        &self.raw[self.project_end + DELIMITER.len()..self.type_end]
    }

    /// Returns the resource's own type token.
    #[must_use]
    pub fn type_token(&self) -> &str {
        &self.raw[self.type_start..self.type_end]
    }

    /// Returns the logical name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.raw[self.type_end + DELIMITER.len()..]
    }

    /// Returns the URN as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.raw
    }
}

/// Returns the length of the qualified type at the start of `s`.
fn scan_qualified_type(s: &str) -> Option<usize> {
    let mut pos = 0;
    loop {
        pos += scan_type_token(&s[pos..])?;
        if s[pos..].starts_with(TYPE_DELIMITER) {
            pos += TYPE_DELIMITER.len_utf8();
        } else {
            return Some(pos);
        }
    }
}

/// Returns the length of one `package:module:Type` token at the start of `s`.
fn scan_type_token(s: &str) -> Option<usize> {
    let package = s.find(':')?;
    let module = s[package + 1..].find(':')?;
    let type_start = package + 1 + module + 1;
    let type_len = s[type_start..]
        .find([':', TYPE_DELIMITER])
        .unwrap_or(s.len() - type_start);
    (package > 0 && type_len > 0).then_some(type_start + type_len)
}

/// Returns the package segment of a type token.
#[must_use]
pub fn package_of(type_token: &str) -> &str {
    type_token.split(':').next().unwrap_or(type_token)
}

impl core::fmt::Display for Urn {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.raw)
    }
}

impl core::str::FromStr for Urn {
    type Err = ResourceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Urn {
    type Error = ResourceError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Urn> for String {
    fn from(urn: Urn) -> Self {
        urn.raw
    }
}
