//! Constant table: named, already-resolved values referenced as `|NAME|`.

use crate::value::Value;
use indexmap::IndexMap;

/// Last-write-wins store of constants.
///
/// A table belongs to exactly one parser state. Inline mapping literals get
/// a `snapshot()`; structural nesting shares the table itself.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ConstantTable {
    bindings: IndexMap<String, Value>,
}

impl ConstantTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `name`, replacing any earlier binding.
    pub fn declare(&mut self, name: impl Into<String>, value: Value) {
        self.bindings.insert(name.into(), value);
    }

    /// Look up a binding.
    pub fn resolve(&self, name: &str) -> Option<&Value> {
        self.bindings.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.bindings.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// Names in order of first declaration.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.bindings.keys().map(String::as_str)
    }

    /// Independent copy; later writes to either side are not seen by the other.
    pub fn snapshot(&self) -> Self {
        self.clone()
    }
}
