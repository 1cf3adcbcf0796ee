//! Key and track flag bits.
//!
//! Key flags pack the in/out tangent modes into two 3-bit fields, a "tangents
//! unified" bit, and a block of UI selection bits. Only the tangent fields and the
//! unify bit ever reach a document; selection is editor state.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

const TANGENT_IN_SHIFT: u32 = 0;
const TANGENT_OUT_SHIFT: u32 = 3;
const TANGENT_FIELD: u32 = 0x07;

bitflags! {
    /// Per-key flags.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    pub struct KeyFlags: u32 {
        const TANGENT_IN_MASK  = TANGENT_FIELD << TANGENT_IN_SHIFT;
        const TANGENT_OUT_MASK = TANGENT_FIELD << TANGENT_OUT_SHIFT;
        const TANGENT_UNIFY    = 1 << 6;
        const UI_SELECTED      = 0x0F << 16;
    }
}

bitflags! {
    /// Track-level flags (separate namespace from [`KeyFlags`]).
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    pub struct TrackFlags: u32 {
        const LINEAR   = 1 << 1;
        const LOOP     = 1 << 2;
        const CYCLE    = 1 << 3;
        const DISABLED = 1 << 4;
        const HIDDEN   = 1 << 5;
        const MUTED    = 1 << 8;
    }
}

/// How a key's in or out tangent is derived.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TangentType {
    /// Smooth tangent computed from the neighbouring keys.
    #[default]
    Auto,
    /// Stored tangent is authoritative and never recomputed.
    Custom,
    Zero,
    /// Hold the left key's value across the segment.
    Step,
    /// Slope toward the neighbouring key.
    Linear,
}

impl TangentType {
    #[inline]
    pub const fn to_raw(self) -> u32 {
        match self {
            TangentType::Auto => 0,
            TangentType::Custom => 1,
            TangentType::Zero => 2,
            TangentType::Step => 3,
            TangentType::Linear => 4,
        }
    }

    /// Unknown field values decode as [`TangentType::Auto`].
    #[inline]
    pub const fn from_raw(raw: u32) -> Self {
        match raw {
            1 => TangentType::Custom,
            2 => TangentType::Zero,
            3 => TangentType::Step,
            4 => TangentType::Linear,
            _ => TangentType::Auto,
        }
    }
}

impl KeyFlags {
    /// Bits written by the full-state protocol.
    pub const PERSISTED: KeyFlags = KeyFlags::TANGENT_IN_MASK
        .union(KeyFlags::TANGENT_OUT_MASK)
        .union(KeyFlags::TANGENT_UNIFY);

    /// Bits written by the selection (copy/paste) protocol.
    pub const CLIPBOARD: KeyFlags = KeyFlags::TANGENT_IN_MASK.union(KeyFlags::TANGENT_OUT_MASK);

    #[inline]
    pub fn tangent_in(self) -> TangentType {
        TangentType::from_raw((self.bits() >> TANGENT_IN_SHIFT) & TANGENT_FIELD)
    }

    #[inline]
    pub fn tangent_out(self) -> TangentType {
        TangentType::from_raw((self.bits() >> TANGENT_OUT_SHIFT) & TANGENT_FIELD)
    }

    #[inline]
    pub fn with_tangent_in(self, t: TangentType) -> Self {
        let bits = (self.bits() & !Self::TANGENT_IN_MASK.bits()) | (t.to_raw() << TANGENT_IN_SHIFT);
        Self::from_bits_retain(bits)
    }

    #[inline]
    pub fn with_tangent_out(self, t: TangentType) -> Self {
        let bits =
            (self.bits() & !Self::TANGENT_OUT_MASK.bits()) | (t.to_raw() << TANGENT_OUT_SHIFT);
        Self::from_bits_retain(bits)
    }

    #[inline]
    pub fn is_unified(self) -> bool {
        self.contains(Self::TANGENT_UNIFY)
    }

    #[inline]
    pub fn is_selected(self) -> bool {
        self.intersects(Self::UI_SELECTED)
    }

    #[inline]
    pub fn persisted(self) -> Self {
        self & Self::PERSISTED
    }

    #[inline]
    pub fn clipboard(self) -> Self {
        self & Self::CLIPBOARD
    }
}

impl TrackFlags {
    /// Whether out-of-range query times wrap into the key range.
    #[inline]
    pub fn wraps(self) -> bool {
        self.intersects(Self::LOOP | Self::CYCLE)
    }
}
