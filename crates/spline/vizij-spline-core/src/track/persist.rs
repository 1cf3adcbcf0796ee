//! Full-state track persistence.
//!
//! Track node attributes: `Flags`, `defaultValue`, `HasCustomColor`, `CustomColor`
//! (packed ABGR, only when set). One `Key` child per key with `time`, `value`,
//! `flags` (tangent modes + unify, omitted when zero), `ds` and `dd`.
//!
//! Loading is strict: `time`, `value`, `ds` and `dd` must be present on every key.
//! Keys are staged and only committed once the whole document parsed.

use log::{debug, warn};

use super::SplineTrack;
use crate::channel::Channel;
use crate::document::{DocumentNode, FromAttr};
use crate::error::TrackError;
use crate::flags::{KeyFlags, TrackFlags};
use crate::key::SplineKey;
use crate::value::{ColorB, Vec2};

pub(crate) const KEY_TAG: &str = "Key";

pub(crate) const ATTR_TRACK_FLAGS: &str = "Flags";
pub(crate) const ATTR_DEFAULT_VALUE: &str = "defaultValue";
pub(crate) const ATTR_HAS_CUSTOM_COLOR: &str = "HasCustomColor";
pub(crate) const ATTR_CUSTOM_COLOR: &str = "CustomColor";

pub(crate) const ATTR_TIME: &str = "time";
pub(crate) const ATTR_VALUE: &str = "value";
pub(crate) const ATTR_KEY_FLAGS: &str = "flags";
pub(crate) const ATTR_TANGENT_IN: &str = "ds";
pub(crate) const ATTR_TANGENT_OUT: &str = "dd";

impl<C: Channel> SplineTrack<C> {
    /// Save (`loading == false`) or load the full track state.
    pub fn serialize<N: DocumentNode>(
        &mut self,
        node: &mut N,
        loading: bool,
        allow_empty: bool,
    ) -> Result<(), TrackError> {
        if loading {
            self.load(node, allow_empty)
        } else {
            self.save(node);
            Ok(())
        }
    }

    /// Write the full track state onto `node`.
    pub fn save<N: DocumentNode>(&mut self, node: &mut N) {
        self.spline.update();

        node.set_attr(ATTR_TRACK_FLAGS, self.flags.bits());
        node.set_attr(ATTR_DEFAULT_VALUE, self.default_value);
        node.set_attr(ATTR_HAS_CUSTOM_COLOR, self.custom_color.is_some());
        if let Some(color) = self.custom_color {
            node.set_attr(ATTR_CUSTOM_COLOR, color.pack_abgr());
        }

        for key in self.spline.keys() {
            write_key(node.new_child(KEY_TAG), key, key.flags.persisted());
        }
        debug!(
            "saved track '{}' ({} keys)",
            self.name,
            self.spline.len()
        );
    }

    /// Replace the track state with the one stored on `node`.
    ///
    /// Fails when a key lacks a required attribute, or when the node has no key
    /// children and `allow_empty` is false. On failure the track is unchanged.
    pub fn load<N: DocumentNode>(&mut self, node: &N, allow_empty: bool) -> Result<(), TrackError> {
        let flags = node
            .get_attr::<u32>(ATTR_TRACK_FLAGS)
            .map(TrackFlags::from_bits_retain)
            .unwrap_or(self.flags);
        let default_value = node
            .get_attr::<Vec2>(ATTR_DEFAULT_VALUE)
            .unwrap_or(self.default_value);
        let has_color = node
            .get_attr::<bool>(ATTR_HAS_CUSTOM_COLOR)
            .unwrap_or(self.custom_color.is_some());
        let custom_color = if has_color {
            let color = node
                .get_attr::<u32>(ATTR_CUSTOM_COLOR)
                .map(ColorB::from_abgr)
                .or(self.custom_color)
                .unwrap_or_default();
            Some(color)
        } else {
            None
        };

        let count = node.child_count();
        let mut keys = Vec::with_capacity(count);
        for (index, key_node) in node.children().enumerate() {
            keys.push(self.read_key(key_node, index)?);
        }

        if count == 0 && !allow_empty {
            warn!("track '{}' has no keys and empty tracks are not allowed", self.name);
            return Err(TrackError::NoKeys {
                track: self.name.clone(),
            });
        }

        self.set_flags(flags);
        self.default_value = default_value;
        self.custom_color = custom_color;
        for key in &keys {
            self.update_value_range(key.y());
        }
        self.spline.replace_keys(keys);
        self.spline.sort_keys();
        debug!("loaded track '{}' ({} keys)", self.name, count);
        Ok(())
    }

    fn read_key<N: DocumentNode>(&self, node: &N, index: usize) -> Result<SplineKey, TrackError> {
        let time: f32 = self.require(node, index, ATTR_TIME)?;
        let value: Vec2 = self.require(node, index, ATTR_VALUE)?;
        // Zero flags are never written.
        let flags = node
            .get_attr::<u32>(ATTR_KEY_FLAGS)
            .map(KeyFlags::from_bits_retain)
            .unwrap_or_default()
            .persisted();
        let ds: f32 = self.require(node, index, ATTR_TANGENT_IN)?;
        let dd: f32 = self.require(node, index, ATTR_TANGENT_OUT)?;

        Ok(SplineKey::new(time, value.y)
            .with_flags(flags)
            .with_tangents(ds, dd))
    }

    pub(super) fn require<T: FromAttr, N: DocumentNode>(
        &self,
        node: &N,
        index: usize,
        field: &'static str,
    ) -> Result<T, TrackError> {
        node.get_attr(field).ok_or_else(|| {
            warn!(
                "ill-formed track '{}': key {} is missing '{}'",
                self.name, index, field
            );
            TrackError::MissingAttribute {
                track: self.name.clone(),
                key: index,
                field,
            }
        })
    }
}

/// Write one key element. `flags` is the already-masked subset to persist.
pub(super) fn write_key<N: DocumentNode>(node: &mut N, key: &SplineKey, flags: KeyFlags) {
    node.set_attr(ATTR_TIME, key.time());
    node.set_attr(ATTR_VALUE, key.value());
    if !flags.is_empty() {
        node.set_attr(ATTR_KEY_FLAGS, flags.bits());
    }
    node.set_attr(ATTR_TANGENT_IN, key.tangent_in);
    node.set_attr(ATTR_TANGENT_OUT, key.tangent_out);
}
