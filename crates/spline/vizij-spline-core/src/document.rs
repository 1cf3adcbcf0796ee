//! Attribute-bag document nodes consumed by the track persistence protocols.
//!
//! Tracks only ever read and write named attributes on a node and walk or create
//! child nodes. [`DocumentNode`] captures exactly that; [`Element`] is the in-memory
//! implementation shipped with the crate, persisted as JSON through serde.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::TrackError;
use crate::value::Vec2;

/// Typed attribute value.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "data", rename_all = "lowercase")]
pub enum AttrValue {
    Bool(bool),
    Int(i64),
    Float(f32),
    Vec2([f32; 2]),
    Text(String),
}

/// Conversion out of an [`AttrValue`]. Returns `None` when the stored kind does not
/// fit the requested type.
pub trait FromAttr: Sized {
    fn from_attr(value: &AttrValue) -> Option<Self>;
}

impl FromAttr for bool {
    fn from_attr(value: &AttrValue) -> Option<Self> {
        match value {
            AttrValue::Bool(b) => Some(*b),
            AttrValue::Int(i) => Some(*i != 0),
            _ => None,
        }
    }
}

impl FromAttr for i64 {
    fn from_attr(value: &AttrValue) -> Option<Self> {
        match value {
            AttrValue::Int(i) => Some(*i),
            AttrValue::Bool(b) => Some(i64::from(*b)),
            _ => None,
        }
    }
}

impl FromAttr for i32 {
    fn from_attr(value: &AttrValue) -> Option<Self> {
        i64::from_attr(value).and_then(|i| i32::try_from(i).ok())
    }
}

impl FromAttr for u32 {
    fn from_attr(value: &AttrValue) -> Option<Self> {
        i64::from_attr(value).and_then(|i| u32::try_from(i).ok())
    }
}

impl FromAttr for f32 {
    fn from_attr(value: &AttrValue) -> Option<Self> {
        match value {
            AttrValue::Float(f) => Some(*f),
            AttrValue::Int(i) => Some(*i as f32),
            _ => None,
        }
    }
}

impl FromAttr for Vec2 {
    fn from_attr(value: &AttrValue) -> Option<Self> {
        match value {
            AttrValue::Vec2(v) => Some((*v).into()),
            _ => None,
        }
    }
}

impl FromAttr for String {
    fn from_attr(value: &AttrValue) -> Option<Self> {
        match value {
            AttrValue::Text(s) => Some(s.clone()),
            _ => None,
        }
    }
}

impl From<bool> for AttrValue {
    fn from(v: bool) -> Self {
        AttrValue::Bool(v)
    }
}

impl From<i32> for AttrValue {
    fn from(v: i32) -> Self {
        AttrValue::Int(i64::from(v))
    }
}

impl From<u32> for AttrValue {
    fn from(v: u32) -> Self {
        AttrValue::Int(i64::from(v))
    }
}

impl From<i64> for AttrValue {
    fn from(v: i64) -> Self {
        AttrValue::Int(v)
    }
}

impl From<f32> for AttrValue {
    fn from(v: f32) -> Self {
        AttrValue::Float(v)
    }
}

impl From<Vec2> for AttrValue {
    fn from(v: Vec2) -> Self {
        AttrValue::Vec2(v.into())
    }
}

impl From<&str> for AttrValue {
    fn from(v: &str) -> Self {
        AttrValue::Text(v.to_string())
    }
}

impl From<String> for AttrValue {
    fn from(v: String) -> Self {
        AttrValue::Text(v)
    }
}

/// A node in a persisted document tree.
pub trait DocumentNode: Sized {
    fn tag(&self) -> &str;
    fn attr(&self, name: &str) -> Option<&AttrValue>;
    fn set_attr_value(&mut self, name: &str, value: AttrValue);
    fn child_count(&self) -> usize;
    fn child(&self, index: usize) -> Option<&Self>;
    /// Append a child with `tag` and return it for population.
    fn new_child(&mut self, tag: &str) -> &mut Self;

    /// Typed read. `None` if the attribute is absent or has an incompatible kind.
    #[inline]
    fn get_attr<T: FromAttr>(&self, name: &str) -> Option<T> {
        self.attr(name).and_then(T::from_attr)
    }

    #[inline]
    fn set_attr(&mut self, name: &str, value: impl Into<AttrValue>) {
        self.set_attr_value(name, value.into());
    }

    #[inline]
    fn has_attr(&self, name: &str) -> bool {
        self.attr(name).is_some()
    }

    fn children(&self) -> impl Iterator<Item = &Self> {
        (0..self.child_count()).filter_map(move |i| self.child(i))
    }
}

/// In-memory document element.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct Element {
    pub tag: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub attrs: BTreeMap<String, AttrValue>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Element>,
}

impl Element {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            ..Self::default()
        }
    }

    pub fn remove_attr(&mut self, name: &str) -> Option<AttrValue> {
        self.attrs.remove(name)
    }

    pub fn child_mut(&mut self, index: usize) -> Option<&mut Element> {
        self.children.get_mut(index)
    }

    pub fn from_json_str(s: &str) -> Result<Self, TrackError> {
        Ok(serde_json::from_str(s)?)
    }

    pub fn to_json_string(&self) -> Result<String, TrackError> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn to_json_pretty(&self) -> Result<String, TrackError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

impl DocumentNode for Element {
    fn tag(&self) -> &str {
        &self.tag
    }

    fn attr(&self, name: &str) -> Option<&AttrValue> {
        self.attrs.get(name)
    }

    fn set_attr_value(&mut self, name: &str, value: AttrValue) {
        self.attrs.insert(name.to_string(), value);
    }

    fn child_count(&self) -> usize {
        self.children.len()
    }

    fn child(&self, index: usize) -> Option<&Self> {
        self.children.get(index)
    }

    fn new_child(&mut self, tag: &str) -> &mut Self {
        self.children.push(Element::new(tag));
        let last = self.children.len() - 1;
        &mut self.children[last]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn typed_reads_coerce_compatible_kinds() {
        let mut e = Element::new("Track");
        e.set_attr("Flags", 6i32);
        e.set_attr("HasCustomColor", true);
        e.set_attr("time", 1.5f32);
        e.set_attr("value", Vec2::new(1.5, 2.0));

        assert_eq!(e.get_attr::<i32>("Flags"), Some(6));
        assert_eq!(e.get_attr::<f32>("Flags"), Some(6.0));
        assert_eq!(e.get_attr::<bool>("HasCustomColor"), Some(true));
        assert_eq!(e.get_attr::<f32>("time"), Some(1.5));
        assert_eq!(e.get_attr::<Vec2>("value"), Some(Vec2::new(1.5, 2.0)));
        assert_eq!(e.get_attr::<Vec2>("time"), None);
        assert_eq!(e.get_attr::<f32>("missing"), None);
    }

    #[test]
    fn negative_int_does_not_read_as_u32() {
        let mut e = Element::new("Track");
        e.set_attr("CustomColor", -1i64);
        assert_eq!(e.get_attr::<u32>("CustomColor"), None);
        e.set_attr("CustomColor", u32::MAX);
        assert_eq!(e.get_attr::<u32>("CustomColor"), Some(u32::MAX));
    }

    #[test]
    fn json_round_trip_keeps_children_in_order() {
        let mut root = Element::new("Track");
        root.set_attr("Flags", 0i32);
        for t in [0.0f32, 1.0, 2.0] {
            root.new_child("Key").set_attr("time", t);
        }
        let text = root.to_json_string().unwrap();
        let back = Element::from_json_str(&text).unwrap();
        assert_eq!(back, root);
        let times: Vec<f32> = back
            .children()
            .filter_map(|c| c.get_attr::<f32>("time"))
            .collect();
        assert_eq!(times, vec![0.0, 1.0, 2.0]);
    }

    #[test]
    fn attr_json_shape_is_tagged() {
        let v = serde_json::to_value(AttrValue::Vec2([1.0, 2.0])).unwrap();
        assert_eq!(v, serde_json::json!({ "type": "vec2", "data": [1.0, 2.0] }));
    }

    #[test]
    fn bad_json_is_a_document_error() {
        let err = Element::from_json_str("{ not json").unwrap_err();
        assert_eq!(err.category(), "document");
    }
}
