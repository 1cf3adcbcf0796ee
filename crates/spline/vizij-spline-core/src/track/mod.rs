//! Keyframed spline track for one scalar animatable parameter.
//!
//! A [`SplineTrack`] owns its [`BezierSpline`] outright; every key edit goes through
//! the track so sorting, the value range and tangent invalidation stay consistent.
//! The document protocols live in [`persist`] (full state) and [`selection`]
//! (copy/paste merge); [`snapshot`] implements serde for containers that reflect
//! tracks into their own format.

mod persist;
mod selection;
mod snapshot;

pub use snapshot::SNAPSHOT_VERSION;

use std::marker::PhantomData;

use log::warn;
use serde::{Deserialize, Serialize};

use crate::channel::{BezierFloat, Channel, CurveType, ValueType};
use crate::config::TrackConfig;
use crate::error::TrackError;
use crate::flags::TrackFlags;
use crate::key::SplineKey;
use crate::spline::{BezierSpline, OutOfRange};
use crate::value::{ColorB, Vec2};

/// Opaque id of the parameter a track drives. Interpreted by the owning container.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ParamType(pub u32);

/// Opaque parameter payload owned by the container; the track passes it through.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ParamData(pub serde_json::Value);

#[derive(Clone, Debug)]
pub struct SplineTrack<C: Channel = BezierFloat> {
    name: String,
    spline: BezierSpline,
    default_value: Vec2,
    min_key_value: f32,
    max_key_value: f32,
    flags: TrackFlags,
    custom_color: Option<ColorB>,
    param_type: ParamType,
    param_data: ParamData,
    config: TrackConfig,
    _channel: PhantomData<fn() -> C>,
}

impl<C: Channel> Default for SplineTrack<C> {
    fn default() -> Self {
        Self::with_config(TrackConfig::default())
    }
}

impl<C: Channel> SplineTrack<C> {
    /// Empty track: no keys, zero default value, zero value range.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: TrackConfig) -> Self {
        Self {
            name: String::new(),
            spline: BezierSpline::new(config.min_segment_duration),
            default_value: Vec2::default(),
            min_key_value: 0.0,
            max_key_value: 0.0,
            flags: TrackFlags::empty(),
            custom_color: None,
            param_type: ParamType::default(),
            param_data: ParamData::default(),
            config,
            _channel: PhantomData,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    #[inline]
    pub fn config(&self) -> &TrackConfig {
        &self.config
    }

    #[inline]
    pub fn curve_type(&self) -> CurveType {
        C::CURVE_TYPE
    }

    #[inline]
    pub fn value_type(&self) -> ValueType {
        C::VALUE_TYPE
    }

    // ----- evaluation -----

    /// Value at `time`. Falls back to the default value when the track has no keys.
    pub fn get_value(&mut self, time: f32) -> C::Value {
        C::from_payload(self.payload_at(time))
    }

    fn payload_at(&mut self, time: f32) -> f32 {
        if self.spline.is_empty() {
            self.default_value.y
        } else {
            self.spline.interpolate(time)
        }
    }

    /// Set the default value (`is_default`) or key the value at `time`.
    ///
    /// A key already within `key_time_precision` of `time` only has its value
    /// replaced: it keeps its own time, flags and tangent modes.
    ///
    /// Returns the index of the created or updated key; `None` for the default and
    /// for a non-finite `time`, which leaves the keys untouched.
    pub fn set_value(&mut self, time: f32, value: C::Value, is_default: bool) -> Option<usize> {
        let y = C::to_payload(value);
        if is_default {
            self.default_value = Vec2::new(time, y);
            return None;
        }
        let index = match self.find_key(time) {
            Some(index) => index,
            None => match self.create_key(time) {
                Ok(index) => index,
                Err(err) => {
                    warn!("track '{}': ignoring value at {time}: {err}", self.name);
                    return None;
                }
            },
        };
        if let Some(key) = self.spline.key_mut(index) {
            key.set_y(y);
        }
        self.update_value_range(y);
        Some(index)
    }

    #[inline]
    pub fn default_value(&self) -> Vec2 {
        self.default_value
    }

    // ----- key CRUD -----

    #[inline]
    pub fn key_count(&self) -> usize {
        self.spline.len()
    }

    #[inline]
    pub fn keys(&self) -> &[SplineKey] {
        self.spline.keys()
    }

    /// Create a key at `time` that starts on the current curve and return its index.
    pub fn create_key(&mut self, time: f32) -> Result<usize, TrackError> {
        if !time.is_finite() {
            return Err(TrackError::NonFiniteTime { time });
        }
        let y = if self.spline.is_empty() {
            self.default_value.y
        } else {
            self.spline.interpolate(time)
        };
        self.update_value_range(y);
        Ok(self.spline.insert_key(time, y))
    }

    pub fn key(&self, index: usize) -> Result<SplineKey, TrackError> {
        self.spline
            .key(index)
            .copied()
            .ok_or_else(|| self.out_of_range(index))
    }

    /// Overwrite the key at `index`. Does not re-sort; callers moving keys in time
    /// follow up with [`Self::sort_keys`].
    pub fn set_key(&mut self, index: usize, key: SplineKey) -> Result<(), TrackError> {
        let len = self.spline.len();
        let slot = self
            .spline
            .key_mut(index)
            .ok_or(TrackError::IndexOutOfRange { index, len })?;
        *slot = key;
        self.update_value_range(key.y());
        Ok(())
    }

    /// Write `key` at `time`, replacing a key already there (within
    /// `key_time_precision`) or creating one.
    pub fn set_key_at_time(&mut self, time: f32, mut key: SplineKey) -> Result<usize, TrackError> {
        key.set_time(time);
        let index = match self.find_key(time) {
            Some(index) => index,
            None => self.create_key(time)?,
        };
        if let Some(slot) = self.spline.key_mut(index) {
            *slot = key;
        }
        self.update_value_range(key.y());
        Ok(index)
    }

    /// Copy a key from `source`, shifted by `copy_time_offset` so the two never share a
    /// time (coincident keys make tangents singular).
    pub fn copy_key(&mut self, source: &SplineTrack<C>, index: usize) -> Result<usize, TrackError> {
        let key = source.key(index)?;
        self.paste_shifted(key)
    }

    /// [`Self::copy_key`] with this track as the source.
    pub fn duplicate_key(&mut self, index: usize) -> Result<usize, TrackError> {
        let key = self.key(index)?;
        self.paste_shifted(key)
    }

    fn paste_shifted(&mut self, mut key: SplineKey) -> Result<usize, TrackError> {
        let t = key.time() + self.config.copy_time_offset;
        let new_index = self.create_key(t)?;
        key.set_time(t);
        if let Some(slot) = self.spline.key_mut(new_index) {
            *slot = key;
        }
        self.update_value_range(key.y());
        Ok(new_index)
    }

    /// Remove a key. The value range is left as is.
    pub fn remove_key(&mut self, index: usize) -> Result<SplineKey, TrackError> {
        let len = self.spline.len();
        self.spline
            .remove_key(index)
            .ok_or(TrackError::IndexOutOfRange { index, len })
    }

    /// Resize the key array; new keys sit at time zero.
    pub fn set_num_keys(&mut self, count: usize) {
        self.spline.set_num_keys(count);
    }

    pub fn clear_keys(&mut self) {
        self.spline.clear();
    }

    pub fn sort_keys(&mut self) {
        self.spline.sort_keys();
    }

    /// Index of a key within `key_time_precision` of `time`.
    pub fn find_key(&self, time: f32) -> Option<usize> {
        self.spline.find_key(time, self.config.key_time_precision)
    }

    pub fn time_range(&self) -> Option<(f32, f32)> {
        self.spline.time_range()
    }

    /// Description of a key for editor lists, with its duration (always zero for
    /// spline keys).
    pub fn key_info(&self, index: usize) -> Result<(String, f32), TrackError> {
        let key = self.key(index)?;
        Ok((C::describe(key.y()), 0.0))
    }

    // ----- selection -----

    pub fn select_key(&mut self, index: usize, selected: bool) -> Result<(), TrackError> {
        let len = self.spline.len();
        self.spline
            .key_mut(index)
            .ok_or(TrackError::IndexOutOfRange { index, len })?
            .set_selected(selected);
        Ok(())
    }

    pub fn is_key_selected(&self, index: usize) -> Result<bool, TrackError> {
        Ok(self.key(index)?.is_selected())
    }

    pub fn select_all(&mut self, selected: bool) {
        for index in 0..self.spline.len() {
            if let Some(key) = self.spline.key_mut(index) {
                key.set_selected(selected);
            }
        }
    }

    pub fn selected_count(&self) -> usize {
        self.spline.keys().iter().filter(|k| k.is_selected()).count()
    }

    // ----- accessors -----

    /// Running bounds over every key value inserted; never shrinks.
    #[inline]
    pub fn value_range(&self) -> (f32, f32) {
        (self.min_key_value, self.max_key_value)
    }

    pub fn set_value_range(&mut self, min: f32, max: f32) {
        self.min_key_value = min;
        self.max_key_value = max;
    }

    fn update_value_range(&mut self, y: f32) {
        self.min_key_value = self.min_key_value.min(y);
        self.max_key_value = self.max_key_value.max(y);
    }

    #[inline]
    pub fn flags(&self) -> TrackFlags {
        self.flags
    }

    /// Set track flags. `LOOP`/`CYCLE` make evaluation wrap outside the key range.
    pub fn set_flags(&mut self, flags: TrackFlags) {
        self.flags = flags;
        let ort = if flags.wraps() {
            OutOfRange::Wrap
        } else {
            OutOfRange::Constant
        };
        self.spline.set_out_of_range(ort);
    }

    #[inline]
    pub fn custom_color(&self) -> Option<ColorB> {
        self.custom_color
    }

    pub fn set_custom_color(&mut self, color: ColorB) {
        self.custom_color = Some(color);
    }

    pub fn clear_custom_color(&mut self) {
        self.custom_color = None;
    }

    #[inline]
    pub fn param_type(&self) -> ParamType {
        self.param_type
    }

    pub fn set_param_type(&mut self, param_type: ParamType) {
        self.param_type = param_type;
    }

    #[inline]
    pub fn param_data(&self) -> &ParamData {
        &self.param_data
    }

    pub fn set_param_data(&mut self, data: ParamData) {
        self.param_data = data;
    }

    fn out_of_range(&self, index: usize) -> TrackError {
        TrackError::IndexOutOfRange {
            index,
            len: self.spline.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flags::{KeyFlags, TangentType};
    use approx::assert_abs_diff_eq;

    fn track_with(points: &[(f32, f32)]) -> SplineTrack {
        let mut track = SplineTrack::new();
        for &(t, y) in points {
            track.set_value(t, y, false);
        }
        track
    }

    #[test]
    fn empty_track_returns_default_y() {
        let mut track: SplineTrack = SplineTrack::new();
        assert_eq!(track.get_value(3.0), 0.0);
        track.set_value(9.0, 4.5, true);
        assert_eq!(track.default_value(), Vec2::new(9.0, 4.5));
        assert_eq!(track.key_count(), 0);
        for t in [-5.0, 0.0, 9.0, 100.0] {
            assert_eq!(track.get_value(t), 4.5);
        }
    }

    #[test]
    fn first_key_takes_default_value() {
        let mut track: SplineTrack = SplineTrack::new();
        track.set_value(0.0, 2.0, true);
        let i = track.create_key(1.0).unwrap();
        assert_eq!(i, 0);
        assert_eq!(track.key(0).unwrap().y(), 2.0);
    }

    #[test]
    fn create_key_starts_on_curve() {
        let mut track = track_with(&[(0.0, 0.0), (2.0, 4.0)]);
        let expected = track.get_value(1.0);
        let i = track.create_key(1.0).unwrap();
        assert_eq!(i, 1);
        assert_abs_diff_eq!(track.key(1).unwrap().y(), expected, epsilon = 1e-6);
        let k = track.key(1).unwrap();
        assert_eq!(k.time(), k.value().x);
    }

    #[test]
    fn set_value_updates_existing_key_in_place() {
        let mut track = track_with(&[(0.0, 0.0), (1.0, 1.0)]);
        assert_eq!(track.set_value(1.005, 7.0, false), Some(1));
        assert_eq!(track.key_count(), 2);
        assert_eq!(track.key(1).unwrap().y(), 7.0);
        assert_eq!(track.key(1).unwrap().time(), 1.0);
    }

    #[test]
    fn set_value_on_matched_key_keeps_its_tangent_modes() {
        let mut track = track_with(&[(0.0, 0.0), (1.0, 1.0)]);
        let step = KeyFlags::empty().with_tangent_out(TangentType::Step);
        let key = track.key(1).unwrap().with_flags(step);
        track.set_key(1, key).unwrap();

        assert_eq!(track.set_value(1.005, 7.0, false), Some(1));
        let k = track.key(1).unwrap();
        assert_eq!(k.time(), 1.0);
        assert_eq!(k.y(), 7.0);
        assert_eq!(k.flags.tangent_out(), TangentType::Step);
    }

    #[test]
    fn non_finite_times_are_rejected() {
        let mut track = track_with(&[(0.0, 0.0), (1.0, 1.0)]);
        assert!(matches!(
            track.create_key(f32::NAN),
            Err(TrackError::NonFiniteTime { .. })
        ));
        assert!(track.create_key(f32::INFINITY).is_err());
        assert!(track
            .set_key_at_time(f32::NEG_INFINITY, SplineKey::new(0.0, 3.0))
            .is_err());
        assert_eq!(track.set_value(f32::NAN, 9.0, false), None);

        let times: Vec<f32> = track.keys().iter().map(|k| k.time()).collect();
        assert_eq!(times, vec![0.0, 1.0]);
        assert_eq!(track.value_range(), (0.0, 1.0));
        assert_abs_diff_eq!(track.get_value(0.5), 0.5, epsilon = 1e-5);
    }

    #[test]
    fn out_of_range_index_is_an_error() {
        let mut track = track_with(&[(0.0, 0.0)]);
        assert_eq!(
            track.key(1),
            Err(TrackError::IndexOutOfRange { index: 1, len: 1 })
        );
        assert!(track.set_key(5, SplineKey::new(0.0, 0.0)).is_err());
        assert!(track.select_key(1, true).is_err());
        assert!(track.remove_key(1).is_err());
        assert!(track.key_info(1).is_err());
    }

    #[test]
    fn value_range_widens_and_never_shrinks() {
        let mut track = track_with(&[(0.0, -2.0), (1.0, 5.0)]);
        assert_eq!(track.value_range(), (-2.0, 5.0));
        track.remove_key(1).unwrap();
        assert_eq!(track.value_range(), (-2.0, 5.0));
        track.set_key(0, SplineKey::new(0.0, 11.0)).unwrap();
        assert_eq!(track.value_range(), (-2.0, 11.0));
    }

    #[test]
    fn duplicate_key_offsets_time() {
        let mut track = track_with(&[(1.0, 3.0)]);
        let i = track.duplicate_key(0).unwrap();
        let k = track.key(i).unwrap();
        assert_abs_diff_eq!(k.time(), 1.01, epsilon = 1e-6);
        assert_eq!(k.value().x, k.time());
        assert_eq!(k.y(), 3.0);
    }

    #[test]
    fn wrap_flags_change_extrapolation() {
        let mut track = track_with(&[(0.0, 0.0), (2.0, 4.0)]);
        assert_eq!(track.get_value(3.0), 4.0);
        track.set_flags(TrackFlags::LOOP);
        assert_abs_diff_eq!(track.get_value(3.0), track.get_value(1.0), epsilon = 1e-5);
        track.set_flags(TrackFlags::empty());
        assert_eq!(track.get_value(3.0), 4.0);
    }

    #[test]
    fn selection_helpers() {
        let mut track = track_with(&[(0.0, 0.0), (1.0, 0.0), (2.0, 0.0)]);
        track.select_key(1, true).unwrap();
        assert!(track.is_key_selected(1).unwrap());
        assert_eq!(track.selected_count(), 1);
        track.select_all(true);
        assert_eq!(track.selected_count(), 3);
        track.select_all(false);
        assert_eq!(track.selected_count(), 0);
    }

    #[test]
    fn key_info_formats_two_decimals() {
        let track = track_with(&[(0.0, 1.0 / 3.0)]);
        assert_eq!(track.key_info(0).unwrap(), ("0.33".to_string(), 0.0));
    }

    #[test]
    fn accessors_pass_through() {
        let mut track: SplineTrack = SplineTrack::new().with_name("alpha");
        assert_eq!(track.name(), "alpha");
        assert_eq!(track.curve_type(), CurveType::BezierFloat);
        assert_eq!(track.value_type(), ValueType::Float);
        track.set_param_type(ParamType(12));
        track.set_param_data(ParamData(serde_json::json!({ "component": 7 })));
        assert_eq!(track.param_type(), ParamType(12));
        assert_eq!(track.param_data().0["component"], 7);
        track.set_custom_color(ColorB::new(1, 2, 3, 4));
        assert_eq!(track.custom_color(), Some(ColorB::new(1, 2, 3, 4)));
        track.clear_custom_color();
        assert_eq!(track.custom_color(), None);
    }
}
