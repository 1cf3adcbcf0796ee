//! Sorted Bezier key storage and evaluation.
//!
//! Model:
//! - Keys are ordered by time. Inserting at an existing time places the new key after
//!   the ones already there, and sorting is stable, so ties keep insertion order.
//! - Segment [Ki -> K(i+1)] is a cubic Bezier in value space using Ki.tangent_out and
//!   K(i+1).tangent_in. A `Step` out-tangent holds Ki's value across the segment.
//! - Before the first and after the last key the curve is flat unless the spline
//!   wraps ([`OutOfRange::Wrap`]).
//! - Non-custom tangents are derived from the neighbourhood. Any mutation marks the
//!   spline dirty; the next evaluation recomputes them.

use std::cmp::Ordering;

use log::trace;
use serde::{Deserialize, Serialize};

use crate::flags::TangentType;
use crate::interp::{bezier_segment, slope};
use crate::key::SplineKey;

/// What evaluation does with times outside the key range.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum OutOfRange {
    /// Hold the first/last key value.
    #[default]
    Constant,
    /// Map the time back into the key range.
    Wrap,
}

/// Sorted keys plus the evaluation state derived from them.
///
/// Only the keys are serialized. A deserialized spline is re-sorted and dirty, so
/// tangents are rebuilt on first evaluation.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(from = "StoredSpline")]
pub struct BezierSpline {
    #[serde(rename = "Keys")]
    keys: Vec<SplineKey>,
    #[serde(skip)]
    out_of_range: OutOfRange,
    #[serde(skip)]
    min_segment_duration: f32,
    #[serde(skip)]
    dirty: bool,
}

#[derive(Deserialize)]
struct StoredSpline {
    #[serde(rename = "Keys", default)]
    keys: Vec<SplineKey>,
}

impl From<StoredSpline> for BezierSpline {
    fn from(stored: StoredSpline) -> Self {
        let mut spline = Self::default();
        spline.replace_keys(stored.keys);
        spline.sort_keys();
        spline
    }
}

impl Default for BezierSpline {
    fn default() -> Self {
        Self::new(1e-6)
    }
}

impl BezierSpline {
    pub fn new(min_segment_duration: f32) -> Self {
        Self {
            keys: Vec::new(),
            out_of_range: OutOfRange::Constant,
            min_segment_duration,
            dirty: false,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    #[inline]
    pub fn keys(&self) -> &[SplineKey] {
        &self.keys
    }

    #[inline]
    pub fn key(&self, index: usize) -> Option<&SplineKey> {
        self.keys.get(index)
    }

    /// Mutable access to a key. Marks the spline dirty.
    #[inline]
    pub fn key_mut(&mut self, index: usize) -> Option<&mut SplineKey> {
        let key = self.keys.get_mut(index)?;
        self.dirty = true;
        Some(key)
    }

    #[inline]
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    #[inline]
    pub fn invalidate(&mut self) {
        self.dirty = true;
    }

    #[inline]
    pub fn out_of_range(&self) -> OutOfRange {
        self.out_of_range
    }

    #[inline]
    pub fn set_out_of_range(&mut self, ort: OutOfRange) {
        self.out_of_range = ort;
    }

    /// Insert a key with zero tangents and return its index.
    pub fn insert_key(&mut self, time: f32, y: f32) -> usize {
        self.insert(SplineKey::new(time, y))
    }

    /// Insert a key at its sorted position (after any keys at the same time).
    ///
    /// Placement uses the same total order as [`Self::sort_keys`].
    pub fn insert(&mut self, key: SplineKey) -> usize {
        let index = self
            .keys
            .partition_point(|k| k.time().total_cmp(&key.time()) != Ordering::Greater);
        self.keys.insert(index, key);
        self.dirty = true;
        index
    }

    /// Append a key without sorting; callers restore order with [`Self::sort_keys`].
    pub fn push_unsorted(&mut self, key: SplineKey) -> usize {
        self.keys.push(key);
        self.dirty = true;
        self.keys.len() - 1
    }

    pub fn remove_key(&mut self, index: usize) -> Option<SplineKey> {
        if index >= self.keys.len() {
            return None;
        }
        self.dirty = true;
        Some(self.keys.remove(index))
    }

    /// Resize the key array. New keys sit at time zero with zero value.
    pub fn set_num_keys(&mut self, count: usize) {
        self.keys.resize(count, SplineKey::default());
        self.dirty = true;
    }

    /// Take the keys out, dropping the derived state.
    pub fn into_keys(self) -> Vec<SplineKey> {
        self.keys
    }

    /// Replace every key at once.
    pub fn replace_keys(&mut self, keys: Vec<SplineKey>) {
        self.keys = keys;
        self.dirty = true;
    }

    pub fn clear(&mut self) {
        self.keys.clear();
        self.dirty = true;
    }

    /// Stable sort by time.
    pub fn sort_keys(&mut self) {
        self.keys.sort_by(|a, b| a.time().total_cmp(&b.time()));
        self.dirty = true;
    }

    /// Index of the first key within `precision` of `time`.
    pub fn find_key(&self, time: f32, precision: f32) -> Option<usize> {
        self.keys
            .iter()
            .position(|k| (k.time() - time).abs() < precision)
    }

    /// Time span covered by the keys.
    pub fn time_range(&self) -> Option<(f32, f32)> {
        let first = self.keys.first()?;
        let last = self.keys.last()?;
        Some((first.time(), last.time()))
    }

    /// Recompute derived tangents if any key changed since the last update.
    pub fn update(&mut self) {
        if !self.dirty {
            return;
        }
        self.compute_tangents();
        self.dirty = false;
    }

    /// Evaluate the curve at `time`, refreshing tangents first when needed.
    pub fn interpolate(&mut self, time: f32) -> f32 {
        self.update();
        self.evaluate(time)
    }

    fn compute_tangents(&mut self) {
        let n = self.keys.len();
        trace!("recomputing tangents for {n} keys");
        let eps = self.min_segment_duration;
        for i in 0..n {
            let cur = self.keys[i];
            let prev = i.checked_sub(1).map(|p| self.keys[p]);
            let next = self.keys.get(i + 1).copied();

            let from_prev = prev.and_then(|p| slope(p.time(), p.y(), cur.time(), cur.y(), eps));
            let to_next = next.and_then(|nx| slope(cur.time(), cur.y(), nx.time(), nx.y(), eps));
            let smooth = match (prev, next) {
                (Some(p), Some(nx)) => slope(p.time(), p.y(), nx.time(), nx.y(), eps).unwrap_or(0.0),
                (None, Some(_)) => to_next.unwrap_or(0.0),
                (Some(_), None) => from_prev.unwrap_or(0.0),
                (None, None) => 0.0,
            };

            let key = &mut self.keys[i];
            key.tangent_in = match key.flags.tangent_in() {
                TangentType::Auto => smooth,
                TangentType::Custom => key.tangent_in,
                TangentType::Zero | TangentType::Step => 0.0,
                TangentType::Linear => from_prev.unwrap_or(0.0),
            };
            key.tangent_out = match key.flags.tangent_out() {
                TangentType::Auto => smooth,
                TangentType::Custom => key.tangent_out,
                TangentType::Zero | TangentType::Step => 0.0,
                TangentType::Linear => to_next.unwrap_or(0.0),
            };
        }
    }

    fn wrap_time(&self, time: f32, first: f32, last: f32) -> f32 {
        let span = last - first;
        if span <= self.min_segment_duration {
            return first;
        }
        first + (time - first).rem_euclid(span)
    }

    /// Evaluate with the tangents as they are now.
    fn evaluate(&self, time: f32) -> f32 {
        let keys = &self.keys;
        let n = keys.len();
        match n {
            0 => return 0.0,
            1 => return keys[0].y(),
            _ => {}
        }
        let first = keys[0].time();
        let last = keys[n - 1].time();
        let t = match self.out_of_range {
            OutOfRange::Constant => time,
            OutOfRange::Wrap => self.wrap_time(time, first, last),
        };
        if t.is_nan() || t <= first {
            return keys[0].y();
        }
        if t >= last {
            return keys[n - 1].y();
        }

        // first < t < last, so 1 <= hi <= n - 1.
        let hi = keys.partition_point(|k| k.time() <= t);
        let left = &keys[hi - 1];
        let right = &keys[hi];
        let duration = right.time() - left.time();
        if duration <= self.min_segment_duration {
            return right.y();
        }
        if left.flags.tangent_out() == TangentType::Step {
            return left.y();
        }
        let u = (t - left.time()) / duration;
        bezier_segment(
            left.y(),
            left.tangent_out,
            right.tangent_in,
            right.y(),
            duration,
            u,
        )
    }
}
