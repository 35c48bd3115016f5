//! Compile-time constant injection into launch templates.

use std::collections::BTreeMap;
use std::fmt;

/// Template placeholder values, stringified on insertion.
///
/// Keys are kept sorted so that the `Display` form is canonical: two key sets
/// with the same contents always print the same way regardless of insertion
/// order. The tuner uses that form as part of its cache key.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct TemplateKeys {
    values: BTreeMap<String, String>,
}

impl TemplateKeys {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl fmt::Display) -> Option<String> {
        self.values.insert(key.into(), value.to_string())
    }

    pub fn with(mut self, key: impl Into<String>, value: impl fmt::Display) -> Self {
        self.insert(key, value);
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    /// Overlay `other` on top of `self`; entries in `other` win.
    pub fn merged(&self, other: &TemplateKeys) -> Self {
        let mut values = self.values.clone();
        values.extend(other.values.iter().map(|(k, v)| (k.clone(), v.clone())));
        Self { values }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl<K: Into<String>, V: fmt::Display> FromIterator<(K, V)> for TemplateKeys {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut keys = Self::new();
        for (key, value) in iter {
            keys.insert(key, value);
        }
        keys
    }
}

impl fmt::Display for TemplateKeys {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (i, (key, value)) in self.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{key:?}: {value:?}")?;
        }
        f.write_str("}")
    }
}

/// Replace every `{key}` token in `template` with its value.
///
/// Plain text substitution: no escaping, no nesting, unknown `{...}` tokens are
/// left alone. Placeholder names must not collide with literal braces in the
/// template (a `{N}` inside a C++ initializer would be substituted too).
pub fn cpp_format(template: &str, keys: &TemplateKeys) -> String {
    keys.iter().fold(template.to_string(), |code, (key, value)| code.replace(&format!("{{{key}}}"), value))
}
