//! Channel strategies: how a track's stored `Vec2` payload maps to the value its
//! parameter sees.

use std::fmt::Debug;

/// Curve type discriminator written as `TrackType` by the selection protocol.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum CurveType {
    TcbFloat = 1,
    TcbVector = 2,
    TcbQuat = 3,
    BezierFloat = 4,
}

impl CurveType {
    #[inline]
    pub const fn id(self) -> u32 {
        self as u32
    }
}

/// Parameter value type a channel produces.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ValueType {
    Float,
    Vector,
    Quat,
    Bool,
}

/// Maps between the scalar `y` stored on keys and a channel's external value.
///
/// Implementors are zero-sized markers; a track is generic over one of them.
pub trait Channel: Debug + 'static {
    /// Value handed to and returned from the track.
    type Value: Copy + Debug + PartialEq;

    const CURVE_TYPE: CurveType;
    const VALUE_TYPE: ValueType;

    fn to_payload(value: Self::Value) -> f32;
    fn from_payload(y: f32) -> Self::Value;

    /// Short human-readable description of a key payload.
    fn describe(y: f32) -> String {
        format!("{y:.2}")
    }
}

/// Scalar Bezier channel: the key's `y` is the parameter value.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct BezierFloat;

impl Channel for BezierFloat {
    type Value = f32;

    const CURVE_TYPE: CurveType = CurveType::BezierFloat;
    const VALUE_TYPE: ValueType = ValueType::Float;

    #[inline]
    fn to_payload(value: f32) -> f32 {
        value
    }

    #[inline]
    fn from_payload(y: f32) -> f32 {
        y
    }
}
