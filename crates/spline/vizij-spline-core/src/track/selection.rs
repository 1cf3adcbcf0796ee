//! Selection (copy/paste) protocol.
//!
//! Differs from the full-state protocol on load: keys are merged after the existing
//! ones instead of replacing them, times are shifted by the paste offset, and the
//! selection state comes from the paste rather than from the document.

use log::{debug, warn};

use super::persist::{
    write_key, ATTR_KEY_FLAGS, ATTR_TANGENT_IN, ATTR_TANGENT_OUT, ATTR_TIME, ATTR_VALUE, KEY_TAG,
};
use super::SplineTrack;
use crate::channel::Channel;
use crate::document::DocumentNode;
use crate::error::TrackError;
use crate::flags::KeyFlags;
use crate::key::SplineKey;
use crate::value::Vec2;

pub(crate) const ATTR_TRACK_TYPE: &str = "TrackType";

impl<C: Channel> SplineTrack<C> {
    /// Save (`loading == false`) or paste a key selection.
    pub fn serialize_selection<N: DocumentNode>(
        &mut self,
        node: &mut N,
        loading: bool,
        copy_selected_only: bool,
        time_offset: f32,
    ) -> Result<(), TrackError> {
        if loading {
            self.load_selection(node, copy_selected_only, time_offset)
        } else {
            self.save_selection(node, copy_selected_only);
            Ok(())
        }
    }

    /// Write the curve type and every key (or only the selected ones) onto `node`.
    pub fn save_selection<N: DocumentNode>(&mut self, node: &mut N, copy_selected_only: bool) {
        self.spline.update();
        node.set_attr(ATTR_TRACK_TYPE, C::CURVE_TYPE.id());

        let mut written = 0usize;
        for key in self.spline.keys() {
            if copy_selected_only && !key.is_selected() {
                continue;
            }
            write_key(node.new_child(KEY_TAG), key, key.flags.clipboard());
            written += 1;
        }
        debug!(
            "copied {written} of {} keys from track '{}'",
            self.spline.len(),
            self.name
        );
    }

    /// Append the keys stored on `node`, shifted by `time_offset`, then re-sort.
    ///
    /// The document must carry this track's curve type; otherwise nothing is merged.
    /// With `copy_selected_only` every pasted key comes in selected. Existing keys are
    /// left untouched.
    pub fn load_selection<N: DocumentNode>(
        &mut self,
        node: &N,
        copy_selected_only: bool,
        time_offset: f32,
    ) -> Result<(), TrackError> {
        let expected = C::CURVE_TYPE.id();
        let found = node.get_attr::<i64>(ATTR_TRACK_TYPE);
        if found != Some(i64::from(expected)) {
            warn!(
                "cannot paste into track '{}': curve type {:?} does not match {}",
                self.name, found, expected
            );
            return Err(TrackError::TrackTypeMismatch { expected, found });
        }

        let mut pasted = Vec::with_capacity(node.child_count());
        for (index, key_node) in node.children().enumerate() {
            let time: f32 = self.require(key_node, index, ATTR_TIME)?;
            let value: Vec2 = self.require(key_node, index, ATTR_VALUE)?;
            let flags = key_node
                .get_attr::<u32>(ATTR_KEY_FLAGS)
                .map(KeyFlags::from_bits_retain)
                .unwrap_or_default()
                .clipboard();
            let ds = key_node.get_attr::<f32>(ATTR_TANGENT_IN).unwrap_or(0.0);
            let dd = key_node.get_attr::<f32>(ATTR_TANGENT_OUT).unwrap_or(0.0);

            let mut key = SplineKey::new(time, value.y)
                .with_flags(flags)
                .with_tangents(ds, dd);
            key.offset_time(time_offset);
            if copy_selected_only {
                key.set_selected(true);
            }
            pasted.push(key);
        }

        let count = pasted.len();
        for key in pasted {
            self.update_value_range(key.y());
            self.spline.push_unsorted(key);
        }
        self.spline.sort_keys();
        debug!(
            "pasted {count} keys into track '{}' at offset {time_offset}",
            self.name
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Element;
    use crate::flags::TangentType;
    use approx::assert_abs_diff_eq;

    fn track_with(points: &[(f32, f32)]) -> SplineTrack {
        let mut track = SplineTrack::new();
        for &(t, y) in points {
            track.set_value(t, y, false);
        }
        track
    }

    #[test]
    fn save_writes_track_type_and_only_selected_keys() {
        let mut track = track_with(&[(0.0, 0.0), (1.0, 1.0), (2.0, 2.0)]);
        track.select_key(0, true).unwrap();
        track.select_key(2, true).unwrap();

        let mut node = Element::new("Track");
        track.save_selection(&mut node, true);
        assert_eq!(node.get_attr::<i64>("TrackType"), Some(4));
        assert!(!node.has_attr("Flags"));
        let times: Vec<f32> = node
            .children()
            .filter_map(|c| c.get_attr::<f32>("time"))
            .collect();
        assert_eq!(times, vec![0.0, 2.0]);

        let mut all = Element::new("Track");
        track.save_selection(&mut all, false);
        assert_eq!(all.child_count(), 3);
    }

    #[test]
    fn clipboard_flags_drop_unify() {
        let mut track = track_with(&[(0.0, 0.0)]);
        let mut key = track.key(0).unwrap();
        key.flags = KeyFlags::TANGENT_UNIFY.with_tangent_out(TangentType::Zero);
        track.set_key(0, key).unwrap();

        let mut node = Element::new("Track");
        track.save_selection(&mut node, false);
        let raw = node.child(0).unwrap().get_attr::<u32>("flags").unwrap();
        let flags = KeyFlags::from_bits_retain(raw);
        assert!(!flags.is_unified());
        assert_eq!(flags.tangent_out(), TangentType::Zero);
    }

    #[test]
    fn mismatched_track_type_merges_nothing() {
        let mut track = track_with(&[(0.0, 0.0)]);
        let mut node = Element::new("Track");
        node.set_attr("TrackType", 1i32);
        let key = node.new_child("Key");
        key.set_attr("time", 3.0f32);
        key.set_attr("value", Vec2::new(3.0, 1.0));

        let err = track.load_selection(&node, true, 0.0).unwrap_err();
        assert_eq!(
            err,
            TrackError::TrackTypeMismatch {
                expected: 4,
                found: Some(1)
            }
        );
        assert_eq!(track.key_count(), 1);

        node.remove_attr("TrackType");
        let err = track.load_selection(&node, true, 0.0).unwrap_err();
        assert_eq!(err.category(), "malformed_document");
        assert_eq!(track.key_count(), 1);
    }

    #[test]
    fn paste_shifts_time_and_value_x() {
        let mut src = track_with(&[(0.5, 2.0)]);
        let mut node = Element::new("Track");
        src.save_selection(&mut node, false);

        let mut dst: SplineTrack = SplineTrack::new();
        dst.load_selection(&node, false, 2.0).unwrap();
        let k = dst.key(0).unwrap();
        assert_abs_diff_eq!(k.time(), 2.5);
        assert_eq!(k.value().x, k.time());
        assert!(!k.is_selected());
    }

    #[test]
    fn serialize_selection_dispatches() {
        let mut src = track_with(&[(0.0, 1.0), (1.0, 2.0)]);
        let mut node = Element::new("Track");
        src.serialize_selection(&mut node, false, false, 0.0).unwrap();
        src.serialize_selection(&mut node, true, false, 10.0).unwrap();
        assert_eq!(src.key_count(), 4);
        assert_eq!(src.time_range(), Some((0.0, 11.0)));
    }
}
