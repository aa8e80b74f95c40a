use elevation::ElevationRange;
use formats::{Feature, FeatureDomain};

/// Keeps features whose vertical extent overlaps `range`.
///
/// Features that carry no extent information are kept.
pub fn filter_by_elevation(
    features: &[Feature],
    domain: FeatureDomain,
    range: &ElevationRange,
) -> Vec<Feature> {
    let out: Vec<Feature> = features
        .iter()
        .filter(|f| match domain.vertical_extent(f) {
            Some((lo, hi)) => range.overlaps(lo, hi),
            None => true,
        })
        .cloned()
        .collect();
    tracing::trace!(
        domain = domain.as_str(),
        kept = out.len(),
        dropped = features.len() - out.len(),
        "elevation filter"
    );
    out
}

/// Applies the optional filter from layer options.
pub(crate) fn prefilter(
    features: &[Feature],
    domain: FeatureDomain,
    range: Option<&ElevationRange>,
) -> Vec<Feature> {
    match range {
        Some(r) => filter_by_elevation(features, domain, r),
        None => features.to_vec(),
    }
}
