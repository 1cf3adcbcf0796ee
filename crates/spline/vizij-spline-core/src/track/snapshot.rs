//! Reflected snapshot of a track for serde formats.
//!
//! Carries the fields a container persists alongside its own state: `Flags`,
//! `DefaultValue`, `ParamType`, `ParamData` and the `Spline` keys, tagged with a
//! `Version`. Name, custom color and config are not part of it; the value range is
//! rebuilt from the keys on the way in.

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::{ParamData, ParamType, SplineTrack};
use crate::channel::Channel;
use crate::flags::TrackFlags;
use crate::spline::BezierSpline;
use crate::value::Vec2;

/// Newest snapshot layout this crate writes and reads.
pub const SNAPSHOT_VERSION: u32 = 1;

fn current_version() -> u32 {
    SNAPSHOT_VERSION
}

#[derive(Serialize)]
struct SnapshotRef<'a> {
    #[serde(rename = "Version")]
    version: u32,
    #[serde(rename = "Flags")]
    flags: TrackFlags,
    #[serde(rename = "DefaultValue")]
    default_value: Vec2,
    #[serde(rename = "ParamType")]
    param_type: ParamType,
    #[serde(rename = "ParamData")]
    param_data: &'a ParamData,
    #[serde(rename = "Spline")]
    spline: &'a BezierSpline,
}

#[derive(Deserialize)]
struct Snapshot {
    #[serde(rename = "Version", default = "current_version")]
    version: u32,
    #[serde(rename = "Flags", default)]
    flags: TrackFlags,
    #[serde(rename = "DefaultValue", default)]
    default_value: Vec2,
    #[serde(rename = "ParamType", default)]
    param_type: ParamType,
    #[serde(rename = "ParamData", default)]
    param_data: ParamData,
    #[serde(rename = "Spline")]
    spline: BezierSpline,
}

impl<C: Channel> Serialize for SplineTrack<C> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        SnapshotRef {
            version: SNAPSHOT_VERSION,
            flags: self.flags,
            default_value: self.default_value,
            param_type: self.param_type,
            param_data: &self.param_data,
            spline: &self.spline,
        }
        .serialize(serializer)
    }
}

impl<'de, C: Channel> Deserialize<'de> for SplineTrack<C> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let snapshot = Snapshot::deserialize(deserializer)?;
        if snapshot.version > SNAPSHOT_VERSION {
            return Err(D::Error::custom(format!(
                "unsupported track snapshot version {} (newest is {SNAPSHOT_VERSION})",
                snapshot.version
            )));
        }
        Ok(Self::from_snapshot(snapshot))
    }
}

impl<C: Channel> SplineTrack<C> {
    fn from_snapshot(snapshot: Snapshot) -> Self {
        let mut track = Self::new();
        track.set_flags(snapshot.flags);
        track.default_value = snapshot.default_value;
        track.param_type = snapshot.param_type;
        track.param_data = snapshot.param_data;
        for key in snapshot.spline.keys() {
            track.update_value_range(key.y());
        }
        track.spline.replace_keys(snapshot.spline.into_keys());
        track
    }
}
