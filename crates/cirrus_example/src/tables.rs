//! Property name tables for the `example` package.
//!
//! Every property in this package has the same name in both conventions, so
//! the tables are empty and translation is the identity.

use cirrus_runtime::translate::TranslationTable;
use std::sync::LazyLock;

/// `(camelCase, snake_case)` pairs for property names that differ between conventions.
static NAME_PAIRS: &[(&str, &str)] = &[];

/// The package's translation tables.
pub static TABLES: LazyLock<TranslationTable> = LazyLock::new(|| TranslationTable::new(NAME_PAIRS));

/// Translates a wire name to its binding name.
#[must_use]
pub fn camel_to_snake(name: &str) -> &str {
    TABLES.camel_to_snake(name)
}

/// Translates a binding name to its wire name.
#[must_use]
pub fn snake_to_camel(name: &str) -> &str {
    TABLES.snake_to_camel(name)
}
