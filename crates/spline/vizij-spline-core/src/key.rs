//! Spline control point.

use serde::{Deserialize, Serialize};

use crate::flags::KeyFlags;
use crate::value::Vec2;

/// A single Bezier control point.
///
/// The key time is stored as `value.x`, so `time() == value().x` holds for every key
/// no matter which setter touched it.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct SplineKey {
    value: Vec2,
    /// Incoming tangent ("ds"), value units per time unit.
    pub tangent_in: f32,
    /// Outgoing tangent ("dd"), value units per time unit.
    pub tangent_out: f32,
    pub flags: KeyFlags,
}

impl SplineKey {
    #[inline]
    pub fn new(time: f32, y: f32) -> Self {
        Self {
            value: Vec2::new(time, y),
            ..Self::default()
        }
    }

    #[inline]
    pub fn with_tangents(mut self, tangent_in: f32, tangent_out: f32) -> Self {
        self.tangent_in = tangent_in;
        self.tangent_out = tangent_out;
        self
    }

    #[inline]
    pub fn with_flags(mut self, flags: KeyFlags) -> Self {
        self.flags = flags;
        self
    }

    #[inline]
    pub fn time(&self) -> f32 {
        self.value.x
    }

    #[inline]
    pub fn set_time(&mut self, time: f32) {
        self.value.x = time;
    }

    /// Shift the key along the time axis.
    #[inline]
    pub fn offset_time(&mut self, delta: f32) {
        self.value.x += delta;
    }

    #[inline]
    pub fn value(&self) -> Vec2 {
        self.value
    }

    /// Replace the payload. `value.x` is ignored in favour of the current key time.
    #[inline]
    pub fn set_value(&mut self, value: Vec2) {
        self.value.y = value.y;
    }

    #[inline]
    pub fn y(&self) -> f32 {
        self.value.y
    }

    #[inline]
    pub fn set_y(&mut self, y: f32) {
        self.value.y = y;
    }

    #[inline]
    pub fn is_selected(&self) -> bool {
        self.flags.is_selected()
    }

    #[inline]
    pub fn set_selected(&mut self, selected: bool) {
        self.flags.set(KeyFlags::UI_SELECTED, selected);
    }
}
