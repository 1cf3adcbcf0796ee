//! Plain value types stored on keys and tracks.

use serde::{Deserialize, Serialize};

/// 2D vector used as the key payload: `x` mirrors the key time, `y` carries the value.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    #[inline]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

impl From<[f32; 2]> for Vec2 {
    fn from(v: [f32; 2]) -> Self {
        Self { x: v[0], y: v[1] }
    }
}

impl From<Vec2> for [f32; 2] {
    fn from(v: Vec2) -> Self {
        [v.x, v.y]
    }
}

/// 8-bit RGBA color used for the optional custom track color.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct ColorB {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl ColorB {
    #[inline]
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Decode a packed ABGR8888 integer (alpha in the high byte, red in the low byte).
    #[inline]
    pub const fn from_abgr(abgr: u32) -> Self {
        Self {
            r: (abgr & 0xff) as u8,
            g: ((abgr >> 8) & 0xff) as u8,
            b: ((abgr >> 16) & 0xff) as u8,
            a: ((abgr >> 24) & 0xff) as u8,
        }
    }

    #[inline]
    pub const fn pack_abgr(self) -> u32 {
        (self.a as u32) << 24 | (self.b as u32) << 16 | (self.g as u32) << 8 | self.r as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn abgr_packing_matches_byte_layout() {
        let c = ColorB::new(0x11, 0x22, 0x33, 0x44);
        assert_eq!(c.pack_abgr(), 0x4433_2211);
        assert_eq!(ColorB::from_abgr(0x4433_2211), c);
    }

    #[test]
    fn vec2_array_conversions() {
        let v: Vec2 = [1.5, -2.0].into();
        assert_eq!(v, Vec2::new(1.5, -2.0));
        let arr: [f32; 2] = v.into();
        assert_eq!(arr, [1.5, -2.0]);
    }
}
