//! Error types for spline tracks.

use thiserror::Error;

/// Failures surfaced by key CRUD and the document protocols.
///
/// Evaluation never fails, so there is no variant for it.
#[derive(Debug, Error, Clone, PartialEq)]
#[non_exhaustive]
pub enum TrackError {
    /// A key element lacks a required attribute during a load.
    #[error("track '{track}': key {key} is missing required attribute '{field}'")]
    MissingAttribute {
        track: String,
        key: usize,
        field: &'static str,
    },

    /// A selection document was produced by a track with a different curve type.
    #[error("track type mismatch: expected {expected}, found {found:?}")]
    TrackTypeMismatch { expected: u32, found: Option<i64> },

    /// The document holds no key elements and the caller forbids empty tracks.
    #[error("track '{track}' has no persisted keys")]
    NoKeys { track: String },

    /// Key index outside `0..len`.
    #[error("key index {index} out of range (track has {len} keys)")]
    IndexOutOfRange { index: usize, len: usize },

    /// Keys can only be placed at finite times.
    #[error("key time {time} is not finite")]
    NonFiniteTime { time: f32 },

    /// The document text itself could not be read.
    #[error("document error: {reason}")]
    Document { reason: String },
}

impl TrackError {
    /// Get error category for logging.
    #[inline]
    pub fn category(&self) -> &'static str {
        match self {
            Self::MissingAttribute { .. } | Self::TrackTypeMismatch { .. } | Self::NoKeys { .. } => {
                "malformed_document"
            }
            Self::IndexOutOfRange { .. } | Self::NonFiniteTime { .. } => "contract",
            Self::Document { .. } => "document",
        }
    }

    /// Whether the failure came from the document rather than from the caller.
    #[inline]
    pub fn is_load_failure(&self) -> bool {
        !matches!(
            self,
            Self::IndexOutOfRange { .. } | Self::NonFiniteTime { .. }
        )
    }
}

impl From<serde_json::Error> for TrackError {
    fn from(err: serde_json::Error) -> Self {
        Self::Document {
            reason: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn categories() {
        let e = TrackError::MissingAttribute {
            track: "alpha".into(),
            key: 2,
            field: "value",
        };
        assert_eq!(e.category(), "malformed_document");
        assert!(e.is_load_failure());

        let e = TrackError::IndexOutOfRange { index: 4, len: 4 };
        assert_eq!(e.category(), "contract");
        assert!(!e.is_load_failure());

        let e = TrackError::NonFiniteTime { time: f32::NAN };
        assert_eq!(e.category(), "contract");
        assert!(!e.is_load_failure());
    }

    #[test]
    fn messages_name_the_field() {
        let e = TrackError::MissingAttribute {
            track: "alpha".into(),
            key: 0,
            field: "ds",
        };
        assert_eq!(
            e.to_string(),
            "track 'alpha': key 0 is missing required attribute 'ds'"
        );
    }

    #[test]
    fn json_errors_convert() {
        let err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let e: TrackError = err.into();
        assert_eq!(e.category(), "document");
    }
}
