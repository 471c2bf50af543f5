//! Slot values and the context passed into views.

use std::fmt;

use indexmap::IndexMap;
use serde::{Serialize, Serializer};

use crate::bag::DataBag;

use super::{View, ViewNode};

/// A value held in a view slot: plain data or a nested view.
#[derive(Clone)]
pub enum Slot {
    Value(serde_json::Value),
    View(ViewNode),
}

impl Slot {
    pub fn is_view(&self) -> bool {
        matches!(self, Slot::View(_))
    }

    pub fn as_value(&self) -> Option<&serde_json::Value> {
        match self {
            Slot::Value(value) => Some(value),
            Slot::View(_) => None,
        }
    }

    pub fn as_view(&self) -> Option<&ViewNode> {
        match self {
            Slot::View(node) => Some(node),
            Slot::Value(_) => None,
        }
    }

    /// Plain data as is; nested views expanded through `to_array`.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Slot::Value(value) => value.clone(),
            Slot::View(node) => node.to_array(),
        }
    }
}

/// Data compares by value, views by identity.
impl PartialEq for Slot {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Slot::Value(a), Slot::Value(b)) => a == b,
            (Slot::View(a), Slot::View(b)) => a.ptr_eq(b),
            _ => false,
        }
    }
}

impl fmt::Debug for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Slot::Value(value) => write!(f, "{:?}", value),
            Slot::View(node) => write!(f, "{:?}", node),
        }
    }
}

impl Serialize for Slot {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

impl From<serde_json::Value> for Slot {
    fn from(value: serde_json::Value) -> Self {
        Slot::Value(value)
    }
}

impl From<ViewNode> for Slot {
    fn from(node: ViewNode) -> Self {
        Slot::View(node)
    }
}

impl From<View> for Slot {
    fn from(view: View) -> Self {
        Slot::View(ViewNode::new(view))
    }
}

macro_rules! slot_from_json {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for Slot {
                fn from(value: $ty) -> Self {
                    Slot::Value(serde_json::Value::from(value))
                }
            }
        )*
    };
}

slot_from_json!(bool, i32, i64, u32, u64, f64, String, &str);

/// An ordered list of key/slot pairs handed to `with`, `share`, `inherit` and
/// `render`.
///
/// Built from arrays of pairs, iterators or a JSON value. A JSON object
/// contributes its entries and `null` contributes nothing; any other value is
/// stored under the key `"0"`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Context {
    entries: Vec<(String, Slot)>,
}

impl Context {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an entry. Later entries win when the context is applied.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Slot>) {
        self.entries.push((key.into(), value.into()));
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Slot)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl<K: Into<String>, V: Into<Slot>, const N: usize> From<[(K, V); N]> for Context {
    fn from(entries: [(K, V); N]) -> Self {
        entries.into_iter().collect()
    }
}

impl<K: Into<String>, V: Into<Slot>> FromIterator<(K, V)> for Context {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            entries: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

impl From<serde_json::Value> for Context {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Object(map) => map.into_iter().collect(),
            serde_json::Value::Null => Self::new(),
            other => [("0", other)].into(),
        }
    }
}

impl From<DataBag<Slot>> for Context {
    fn from(bag: DataBag<Slot>) -> Self {
        bag.into_iter().collect()
    }
}

impl From<IndexMap<String, Slot>> for Context {
    fn from(map: IndexMap<String, Slot>) -> Self {
        map.into_iter().collect()
    }
}

impl IntoIterator for Context {
    type Item = (String, Slot);
    type IntoIter = std::vec::IntoIter<(String, Slot)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

/// Result of [`all`](super::ViewInterface::all) and
/// [`get_array_copy`](super::ViewInterface::get_array_copy): a slot map for a
/// single view, one entry per member for a collection.
#[derive(Debug, Clone, PartialEq)]
pub enum ViewData {
    Map(IndexMap<String, Slot>),
    List(Vec<ViewData>),
}

impl ViewData {
    pub fn as_map(&self) -> Option<&IndexMap<String, Slot>> {
        match self {
            ViewData::Map(map) => Some(map),
            ViewData::List(_) => None,
        }
    }

    pub fn into_map(self) -> Option<IndexMap<String, Slot>> {
        match self {
            ViewData::Map(map) => Some(map),
            ViewData::List(_) => None,
        }
    }

    pub fn as_list(&self) -> Option<&[ViewData]> {
        match self {
            ViewData::List(list) => Some(list),
            ViewData::Map(_) => None,
        }
    }

    /// Looks up `key` in a map; always `None` for a list.
    pub fn get(&self, key: &str) -> Option<&Slot> {
        self.as_map().and_then(|map| map.get(key))
    }

    pub fn to_json(&self) -> serde_json::Value {
        match self {
            ViewData::Map(map) => serde_json::Value::Object(
                map.iter().map(|(k, v)| (k.clone(), v.to_json())).collect(),
            ),
            ViewData::List(list) => {
                serde_json::Value::Array(list.iter().map(ViewData::to_json).collect())
            }
        }
    }
}
