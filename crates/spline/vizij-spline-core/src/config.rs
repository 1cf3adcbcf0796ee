//! Tuning constants for spline tracks.

use serde::{Deserialize, Serialize};

/// Per-track tuning. The defaults reproduce the editor's historical behaviour.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TrackConfig {
    /// Time shift applied to a copied key so it never lands on its source time.
    pub copy_time_offset: f32,
    /// Two keys closer than this are considered to be at the same time when
    /// setting a value at a time.
    pub key_time_precision: f32,
    /// Time deltas at or below this are singular; tangents ignore them.
    pub min_segment_duration: f32,
}

impl Default for TrackConfig {
    fn default() -> Self {
        Self {
            copy_time_offset: 0.01,
            key_time_precision: 0.01,
            min_segment_duration: 1e-6,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_falls_back_to_defaults() {
        let cfg: TrackConfig = serde_json::from_str(r#"{ "copy_time_offset": 0.5 }"#).unwrap();
        assert_eq!(cfg.copy_time_offset, 0.5);
        assert_eq!(cfg.key_time_precision, 0.01);
        assert_eq!(cfg.min_segment_duration, 1e-6);
    }
}
