use foundation::LngLatBounds;

use crate::geojson::Feature;

/// Bounds over every position of every feature, or `None` when there are no
/// positions at all.
pub fn calculate_bounds(features: &[Feature]) -> Option<LngLatBounds> {
    features
        .iter()
        .filter_map(Feature::bounds)
        .reduce(|a, b| a.union(&b))
}
