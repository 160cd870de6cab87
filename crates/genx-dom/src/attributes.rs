//! Element Attributes
//!
//! Attribute storage: get, set, remove, has, prefix scans.

use std::collections::HashMap;

/// Named node map (attribute collection)
///
/// Keeps declaration order for iteration and a name index for lookups.
#[derive(Debug, Clone, Default)]
pub struct NamedNodeMap {
    attributes: Vec<Attr>,
    by_name: HashMap<Box<str>, usize>,
    /// Bumped on every set and every successful remove
    generation: u64,
}

/// Single attribute
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attr {
    pub name: Box<str>,
    pub value: String,
}

impl Attr {
    pub fn new(name: impl Into<Box<str>>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

impl NamedNodeMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of attributes
    pub fn len(&self) -> usize {
        self.attributes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }

    /// Attribute by declaration index
    pub fn item(&self, index: usize) -> Option<&Attr> {
        self.attributes.get(index)
    }

    /// Attribute value by name
    pub fn get(&self, name: &str) -> Option<&str> {
        self.by_name
            .get(name)
            .and_then(|&i| self.attributes.get(i))
            .map(|a| a.value.as_str())
    }

    /// Set an attribute, returning the previous value if it existed
    pub fn set(&mut self, name: &str, value: impl Into<String>) -> Option<String> {
        let value = value.into();
        self.generation += 1;
        if let Some(&index) = self.by_name.get(name) {
            return Some(std::mem::replace(&mut self.attributes[index].value, value));
        }
        self.by_name.insert(name.into(), self.attributes.len());
        self.attributes.push(Attr::new(name, value));
        None
    }

    /// Remove an attribute by name, returning its value
    pub fn remove(&mut self, name: &str) -> Option<String> {
        let index = self.by_name.remove(name)?;
        self.generation += 1;
        for idx in self.by_name.values_mut() {
            if *idx > index {
                *idx -= 1;
            }
        }
        Some(self.attributes.remove(index).value)
    }

    /// Change counter; differs whenever the attributes may have changed
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn contains(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    /// True if any attribute name starts with one of `prefixes`
    pub fn has_prefix<S: AsRef<str>>(&self, prefixes: &[S]) -> bool {
        self.attributes
            .iter()
            .any(|a| prefixes.iter().any(|p| a.name.starts_with(p.as_ref())))
    }

    /// Iterate in declaration order
    pub fn iter(&self) -> impl Iterator<Item = &Attr> {
        self.attributes.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_get_attribute() {
        let mut attrs = NamedNodeMap::new();
        attrs.set("class", "fmt-currency");
        attrs.set("fx-format", "currency");

        assert_eq!(attrs.len(), 2);
        assert_eq!(attrs.get("class"), Some("fmt-currency"));
        assert_eq!(attrs.get("fx-format"), Some("currency"));
    }

    #[test]
    fn test_set_returns_previous() {
        let mut attrs = NamedNodeMap::new();
        assert_eq!(attrs.set("fx-decimals", "2"), None);
        assert_eq!(attrs.set("fx-decimals", "4"), Some("2".to_string()));
        assert_eq!(attrs.len(), 1);
    }

    #[test]
    fn test_remove_keeps_index_consistent() {
        let mut attrs = NamedNodeMap::new();
        attrs.set("a", "1");
        attrs.set("b", "2");
        attrs.set("c", "3");

        assert_eq!(attrs.remove("a"), Some("1".to_string()));
        assert!(!attrs.contains("a"));
        assert_eq!(attrs.get("b"), Some("2"));
        assert_eq!(attrs.get("c"), Some("3"));
        assert_eq!(attrs.item(0).map(|a| &*a.name), Some("b"));
    }

    #[test]
    fn test_generation_tracks_changes() {
        let mut attrs = NamedNodeMap::new();
        let start = attrs.generation();
        attrs.set("fx-format", "currency");
        let after_set = attrs.generation();
        assert_ne!(start, after_set);

        attrs.set("fx-format", "currency");
        assert_ne!(attrs.generation(), after_set);

        let before = attrs.generation();
        assert_eq!(attrs.remove("missing"), None);
        assert_eq!(attrs.generation(), before);
        attrs.remove("fx-format");
        assert_ne!(attrs.generation(), before);
    }

    #[test]
    fn test_has_prefix() {
        let mut attrs = NamedNodeMap::new();
        attrs.set("bx-bind", "user.name");

        assert!(attrs.has_prefix(&["fx-", "bx-"]));
        assert!(!attrs.has_prefix(&["fx-"]));
    }
}
