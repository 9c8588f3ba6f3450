//! Case-insensitive document attributes.

use std::collections::BTreeMap;

/// Attributes declared in a document's front matter.
///
/// Keys are stored in canonical form (`content-type` becomes `Content-Type`),
/// so lookups are case-insensitive. A key may carry several values in the
/// order they were declared.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Attributes {
    entries: BTreeMap<String, Vec<String>>,
}

impl Attributes {
    /// Create an empty attribute set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// First value for `name`, or an empty string if it was not declared.
    pub fn get(&self, name: &str) -> &str {
        self.entries
            .get(&canonical_key(name))
            .and_then(|values| values.first())
            .map_or("", String::as_str)
    }

    /// All values for `name` in declaration order.
    pub fn get_all(&self, name: &str) -> &[String] {
        self.entries
            .get(&canonical_key(name))
            .map_or(&[], Vec::as_slice)
    }

    /// Append a value for `name`.
    pub fn insert(&mut self, name: &str, value: impl Into<String>) {
        self.entries
            .entry(canonical_key(name))
            .or_default()
            .push(value.into());
    }

    /// Last value stored under an already canonical key.
    pub(crate) fn last_value_mut(&mut self, name: &str) -> Option<&mut String> {
        self.entries.get_mut(name).and_then(|values| values.last_mut())
    }

    /// True if no attributes were declared.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of distinct keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Iterate over canonical keys and their values, sorted by key.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.entries
            .iter()
            .map(|(key, values)| (key.as_str(), values.as_slice()))
    }
}

/// Canonical header form: first letter and letters after `-` uppercased,
/// everything else lowercased.
pub(crate) fn canonical_key(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut upper = true;
    for c in name.chars() {
        if upper {
            out.extend(c.to_uppercase());
        } else {
            out.extend(c.to_lowercase());
        }
        upper = c == '-';
    }
    out
}
