//! Variable store scoped to one scenario run

use serde_json::Value;
use std::collections::HashMap;

/// New variables produced by one endpoint, keyed by local name
pub type Bindings = Vec<(String, Value)>;

/// Captured variables visible to placeholders
///
/// Created at scenario start and dropped with the run. The runner owns it and
/// lends it out by reference, so there is never more than one writer.
#[derive(Debug, Default, Clone)]
pub struct VariableStore {
    values: HashMap<String, Value>,
}

impl VariableStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    /// Bind a variable, replacing any earlier value of the same name
    pub fn insert(&mut self, name: impl Into<String>, value: Value) {
        self.values.insert(name.into(), value);
    }

    /// Commit a batch of bindings in order
    pub fn extend(&mut self, bindings: Bindings) {
        for (name, value) in bindings {
            tracing::debug!(variable = %name, value = %value, "captured variable");
            self.values.insert(name, value);
        }
    }

    /// Resolve a dotted path: the first segment names a variable, the rest
    /// walk nested mappings
    pub fn lookup_path(&self, path: &[&str]) -> Option<&Value> {
        let (first, rest) = path.split_first()?;
        rest.iter()
            .try_fold(self.values.get(*first)?, |value, segment| match value {
                Value::Object(map) => map.get(*segment),
                _ => None,
            })
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl FromIterator<(String, Value)> for VariableStore {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_later_binding_overwrites() {
        let mut store = VariableStore::new();
        store.insert("id", json!(1));
        store.extend(vec![("id".to_string(), json!(2))]);
        assert_eq!(store.get("id"), Some(&json!(2)));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_lookup_nested_path() {
        let store: VariableStore =
            [("user".to_string(), json!({"profile": {"id": 7}}))].into_iter().collect();
        assert_eq!(store.lookup_path(&["user", "profile", "id"]), Some(&json!(7)));
        assert_eq!(store.lookup_path(&["user", "missing"]), None);
        assert_eq!(store.lookup_path(&["user", "profile", "id", "deeper"]), None);
        assert_eq!(store.lookup_path(&[]), None);
    }
}
