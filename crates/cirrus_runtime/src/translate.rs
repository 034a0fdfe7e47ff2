//! Property name translation between the wire convention (camelCase) and the
//! binding convention (snake_case).
//!
//! Each package ships a static list of name pairs. A [`TranslationTable`]
//! indexes it in both directions. Lookups are total: a name with no entry is
//! returned unchanged.
//!
//! ```
//! use cirrus_runtime::translate::TranslationTable;
//!
//! static PAIRS: &[(&str, &str)] = &[("bucketName", "bucket_name")];
//! let table = TranslationTable::new(PAIRS);
//!
//! assert_eq!(table.camel_to_snake("bucketName"), "bucket_name");
//! assert_eq!(table.snake_to_camel("bucket_name"), "bucketName");
//! assert_eq!(table.camel_to_snake("foo"), "foo");
//! ```

use hashbrown::HashMap;

/// Bidirectional lookup of property names.
#[derive(Debug, Clone, Default)]
pub struct TranslationTable {
    camel_to_snake: HashMap<&'static str, &'static str>,
    snake_to_camel: HashMap<&'static str, &'static str>,
}

impl TranslationTable {
    /// Indexes `(camelCase, snake_case)` pairs.
    ///
    /// When a name appears in more than one pair the last one wins.
    #[must_use]
    pub fn new(pairs: &'static [(&'static str, &'static str)]) -> Self {
        let mut table = Self::default();
        for &(camel, snake) in pairs {
            table.camel_to_snake.insert(camel, snake);
            table.snake_to_camel.insert(snake, camel);
        }
        table
    }

    /// Number of name pairs.
    #[must_use]
    pub fn len(&self) -> usize {
        self.camel_to_snake.len()
    }

    /// Returns `true` if the table has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.camel_to_snake.is_empty()
    }

    /// Translates a wire name to its binding name.
    #[must_use]
    pub fn camel_to_snake<'a>(&self, name: &'a str) -> &'a str {
        self.camel_to_snake.get(name).copied().unwrap_or(name)
    }

    /// Translates a binding name to its wire name.
    #[must_use]
    pub fn snake_to_camel<'a>(&self, name: &'a str) -> &'a str {
        self.snake_to_camel.get(name).copied().unwrap_or(name)
    }
}

/// Name translation hooks a resource binding exposes to the runtime.
pub trait PropertyTranslator {
    /// Maps an output property's wire name to the binding's name for it.
    fn translate_output_property<'a>(&self, prop: &'a str) -> &'a str;

    /// Maps an input property's binding name to its wire name.
    fn translate_input_property<'a>(&self, prop: &'a str) -> &'a str;
}

/// Converts `camelCase` to `snake_case`.
#[must_use]
pub fn to_snake_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    for (i, ch) in name.char_indices() {
        if ch.is_ascii_uppercase() {
            if i > 0 {
                out.push('_');
            }
            out.push(ch.to_ascii_lowercase());
        } else {
            out.push(ch);
        }
    }
    out
}

/// Converts `snake_case` to `camelCase`.
#[must_use]
pub fn to_camel_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut upper = false;
    for ch in name.chars() {
        if ch == '_' && !out.is_empty() {
            upper = true;
        } else if upper {
            out.push(ch.to_ascii_uppercase());
            upper = false;
        } else {
            out.push(ch);
        }
    }
    out
}
