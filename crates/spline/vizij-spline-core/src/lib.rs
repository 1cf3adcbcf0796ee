//! Vizij Spline Core (engine-agnostic)
//!
//! Keyframed Bezier spline tracks for UI animation: one scalar channel per track,
//! sorted keys with in/out tangents, evaluation at arbitrary times, and two document
//! protocols (full snapshot, and selection copy/paste with a time shift), plus a
//! serde snapshot for reflecting tracks into a container's own format.

pub mod channel;
pub mod config;
pub mod document;
pub mod error;
pub mod flags;
pub mod interp;
pub mod key;
pub mod spline;
pub mod track;
pub mod value;

// Re-exports for consumers (containers, editor panels)
pub use channel::{BezierFloat, Channel, CurveType, ValueType};
pub use config::TrackConfig;
pub use document::{AttrValue, DocumentNode, Element, FromAttr};
pub use error::TrackError;
pub use flags::{KeyFlags, TangentType, TrackFlags};
pub use key::SplineKey;
pub use spline::{BezierSpline, OutOfRange};
pub use track::{ParamData, ParamType, SplineTrack, SNAPSHOT_VERSION};
pub use value::{ColorB, Vec2};
