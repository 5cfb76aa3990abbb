//! Keyframe curves for tuning values that vary over time or angle.

use serde::{Deserialize, Serialize};

/// A single curve key: `value` at `time`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Keyframe {
    pub time: f32,
    pub value: f32,
}

impl Keyframe {
    pub const fn new(time: f32, value: f32) -> Self {
        Self { time, value }
    }
}

/// Piecewise-linear curve.
///
/// Keys are kept sorted by time. Evaluating before the first key or after
/// the last key clamps to that key's value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Curve {
    keys: Vec<Keyframe>,
}

impl Curve {
    /// Build a curve from keys in any order.
    pub fn new(mut keys: Vec<Keyframe>) -> Self {
        keys.sort_by(|a, b| a.time.total_cmp(&b.time));
        Self { keys }
    }

    /// A curve that always returns `value`.
    pub fn constant(value: f32) -> Self {
        Self::new(vec![Keyframe::new(0.0, value)])
    }

    /// Straight line from `(0, from)` to `(1, to)`.
    pub fn linear(from: f32, to: f32) -> Self {
        Self::new(vec![Keyframe::new(0.0, from), Keyframe::new(1.0, to)])
    }

    pub fn keys(&self) -> &[Keyframe] {
        &self.keys
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Sample the curve at `time`.
    pub fn evaluate(&self, time: f32) -> f32 {
        let (first, last) = match (self.keys.first(), self.keys.last()) {
            (Some(first), Some(last)) => (first, last),
            _ => return 0.0,
        };

        if time <= first.time {
            return first.value;
        }
        if time >= last.time {
            return last.value;
        }

        // First key strictly after `time`; the one before it starts the segment.
        let upper = self.keys.partition_point(|k| k.time <= time);
        let a = self.keys[upper - 1];
        let b = self.keys[upper];
        let span = b.time - a.time;
        if span <= f32::EPSILON {
            return b.value;
        }
        let t = (time - a.time) / span;
        a.value + (b.value - a.value) * t
    }
}

impl Default for Curve {
    fn default() -> Self {
        Self::linear(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamps_outside_keys() {
        let curve = Curve::linear(2.0, 4.0);
        assert_eq!(curve.evaluate(-1.0), 2.0);
        assert_eq!(curve.evaluate(5.0), 4.0);
    }

    #[test]
    fn test_interpolates_between_keys() {
        let curve = Curve::new(vec![
            Keyframe::new(1.0, 10.0),
            Keyframe::new(0.0, 0.0),
            Keyframe::new(2.0, 0.0),
        ]);
        assert!((curve.evaluate(0.5) - 5.0).abs() < 1e-5);
        assert!((curve.evaluate(1.5) - 5.0).abs() < 1e-5);
        assert_eq!(curve.evaluate(1.0), 10.0);
    }

    #[test]
    fn test_empty_curve_is_zero() {
        let curve = Curve::new(Vec::new());
        assert_eq!(curve.evaluate(0.3), 0.0);
    }
}
