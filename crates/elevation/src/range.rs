use serde::{Deserialize, Serialize};

/// Lowest height covered by the level table (meters, negative is below grade).
pub const GLOBAL_MIN: f64 = -50.0;
/// Highest height covered by the level table (meters).
pub const GLOBAL_MAX: f64 = 200.0;

const GLOBAL_SPAN: f64 = GLOBAL_MAX - GLOBAL_MIN;

/// Closed vertical interval in meters.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElevationRange {
    pub min: f64,
    pub max: f64,
}

impl ElevationRange {
    /// The global bound.
    pub const FULL: ElevationRange = ElevationRange::new(GLOBAL_MIN, GLOBAL_MAX);

    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// Clamps into the global bound keeping at least one meter between the
    /// ends. `max`'s lower bound is computed from the already clamped `min`.
    pub fn clamped(self) -> Self {
        let raw_min = if self.min.is_nan() { GLOBAL_MIN } else { self.min };
        let raw_max = if self.max.is_nan() { GLOBAL_MAX } else { self.max };

        let min = GLOBAL_MIN.max(raw_min.min(raw_max.min(GLOBAL_MAX) - 1.0));
        let max = GLOBAL_MAX.min(raw_max.max(min + 1.0));
        Self { min, max }
    }

    /// Inclusive single-height test.
    pub fn contains(&self, height: f64) -> bool {
        height >= self.min && height <= self.max
    }

    pub fn overlaps(&self, feature_min: f64, feature_max: f64) -> bool {
        is_in_elevation_range(feature_min, feature_max, self)
    }

    pub fn span(&self) -> f64 {
        self.max - self.min
    }
}

impl Default for ElevationRange {
    fn default() -> Self {
        Self::FULL
    }
}

/// True when `[feature_min, feature_max]` and `range` share at least one point.
///
/// Overlap, not containment: a feature straddling either end of the range or
/// spanning all of it counts as visible.
pub fn is_in_elevation_range(feature_min: f64, feature_max: f64, range: &ElevationRange) -> bool {
    feature_max >= range.min && feature_min <= range.max
}

/// Linear map from the global bound onto `[0, 100]`.
pub fn height_to_percent(height: f64) -> f64 {
    (height - GLOBAL_MIN) * 100.0 / GLOBAL_SPAN
}

/// Inverse of [`height_to_percent`].
pub fn percent_to_height(percent: f64) -> f64 {
    GLOBAL_MIN + percent * GLOBAL_SPAN / 100.0
}
