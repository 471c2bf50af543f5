//! Ordered key/value container.

use indexmap::IndexMap;
use serde::Serialize;

/// An insertion-ordered map from string keys to values.
///
/// Views keep their own slots, their inherited values and the request-wide
/// shared data in bags. Every operation is total: reading a missing key gives
/// `None` (or the supplied default), removing one is a no-op.
///
/// Overwriting an existing key keeps its original position.
///
/// # Example
///
/// ```rust
/// use stratum::DataBag;
/// use serde_json::json;
///
/// let mut bag: DataBag = DataBag::new();
/// bag.add([("title", json!("Home")), ("user", json!("ada"))]);
/// bag.add([("title", json!("Profile"))]);
///
/// assert_eq!(bag.get("title"), Some(&json!("Profile")));
/// assert_eq!(bag.get_or("missing", json!(0)), json!(0));
/// assert_eq!(bag.keys(), vec!["title", "user"]);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct DataBag<V = serde_json::Value> {
    items: IndexMap<String, V>,
}

impl<V> Default for DataBag<V> {
    fn default() -> Self {
        Self {
            items: IndexMap::new(),
        }
    }
}

impl<V> DataBag<V> {
    /// Creates an empty bag.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns every entry in insertion order.
    pub fn all(&self) -> &IndexMap<String, V> {
        &self.items
    }

    /// Returns the keys in insertion order.
    pub fn keys(&self) -> Vec<String> {
        self.items.keys().cloned().collect()
    }

    /// Merges `items` into the bag; incoming values win.
    pub fn add<I, K>(&mut self, items: I)
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
    {
        for (key, value) in items {
            self.items.insert(key.into(), value);
        }
    }

    pub fn get(&self, key: &str) -> Option<&V> {
        self.items.get(key)
    }

    /// Returns a copy of the value under `key`, or `default` when absent.
    pub fn get_or(&self, key: &str, default: V) -> V
    where
        V: Clone,
    {
        self.items.get(key).cloned().unwrap_or(default)
    }

    pub fn set(&mut self, key: impl Into<String>, value: V) {
        self.items.insert(key.into(), value);
    }

    pub fn has(&self, key: &str) -> bool {
        self.items.contains_key(key)
    }

    /// Removes `key`, preserving the order of the remaining entries.
    pub fn remove(&mut self, key: &str) -> Option<V> {
        self.items.shift_remove(key)
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Alias for [`len`](Self::len).
    pub fn count(&self) -> usize {
        self.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> indexmap::map::Iter<'_, String, V> {
        self.items.iter()
    }
}

impl<V> From<IndexMap<String, V>> for DataBag<V> {
    fn from(items: IndexMap<String, V>) -> Self {
        Self { items }
    }
}

impl<K: Into<String>, V, const N: usize> From<[(K, V); N]> for DataBag<V> {
    fn from(items: [(K, V); N]) -> Self {
        items.into_iter().collect()
    }
}

impl<K: Into<String>, V> FromIterator<(K, V)> for DataBag<V> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut bag = Self::new();
        bag.add(iter);
        bag
    }
}

impl<K: Into<String>, V> Extend<(K, V)> for DataBag<V> {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        self.add(iter);
    }
}

impl<'a, V> IntoIterator for &'a DataBag<V> {
    type Item = (&'a String, &'a V);
    type IntoIter = indexmap::map::Iter<'a, String, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

impl<V> IntoIterator for DataBag<V> {
    type Item = (String, V);
    type IntoIter = indexmap::map::IntoIter<String, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_new_bag_is_empty() {
        let bag: DataBag = DataBag::new();
        assert!(bag.is_empty());
        assert_eq!(bag.count(), 0);
        assert!(bag.keys().is_empty());
    }

    #[test]
    fn test_from_initial_mapping() {
        let bag = DataBag::from([("foo", json!("bar")), ("baz", json!(1))]);
        assert_eq!(bag.len(), 2);
        assert_eq!(bag.get("foo"), Some(&json!("bar")));
        assert_eq!(bag.keys(), vec!["foo", "baz"]);
    }

    #[test]
    fn test_get_missing_returns_default() {
        let bag = DataBag::from([("foo", json!("bar"))]);
        assert_eq!(bag.get("nope"), None);
        assert_eq!(bag.get_or("nope", json!("fallback")), json!("fallback"));
        assert_eq!(bag.get_or("foo", json!("fallback")), json!("bar"));
    }

    #[test]
    fn test_add_merges_later_wins() {
        let mut bag = DataBag::from([("a", 1), ("b", 2)]);
        bag.add([("a", 10), ("c", 3)]);

        assert_eq!(bag.get("a"), Some(&10));
        assert_eq!(bag.get("b"), Some(&2));
        assert_eq!(bag.get("c"), Some(&3));
        assert_eq!(bag.keys(), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_set_keeps_position() {
        let mut bag = DataBag::from([("a", 1), ("b", 2)]);
        bag.set("a", 5);
        assert_eq!(bag.keys(), vec!["a", "b"]);
        assert_eq!(bag.get("a"), Some(&5));
    }

    #[test]
    fn test_remove_and_has() {
        let mut bag = DataBag::from([("a", 1), ("b", 2), ("c", 3)]);
        assert!(bag.has("b"));
        assert_eq!(bag.remove("b"), Some(2));
        assert!(!bag.has("b"));
        assert_eq!(bag.remove("b"), None);
        assert_eq!(bag.keys(), vec!["a", "c"]);
    }

    #[test]
    fn test_clear() {
        let mut bag = DataBag::from([("a", 1)]);
        bag.clear();
        assert!(bag.is_empty());
    }

    #[test]
    fn test_iteration_order() {
        let bag: DataBag<i32> = [("z", 1), ("a", 2), ("m", 3)].into_iter().collect();
        let seen: Vec<_> = (&bag).into_iter().map(|(k, v)| (k.as_str(), *v)).collect();
        assert_eq!(seen, vec![("z", 1), ("a", 2), ("m", 3)]);
    }

    #[test]
    fn test_extend() {
        let mut bag = DataBag::from([("a", 1)]);
        bag.extend(vec![("b".to_string(), 2)]);
        assert_eq!(bag.count(), 2);
    }

    #[test]
    fn test_serializes_as_object() {
        let bag = DataBag::from([("b", json!(1)), ("a", json!(2))]);
        let json = serde_json::to_string(&bag).unwrap();
        assert_eq!(json, r#"{"b":1,"a":2}"#);
    }
}
