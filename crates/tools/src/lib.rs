//! Data preparation steps behind the `strata` command line.

use std::collections::BTreeMap;

use serde::Serialize;

use elevation::{ELEVATION_LEVELS, get_elevation_level};
use formats::{FeatureCollection, FeatureDomain, Geometry};
use foundation::math::{UtmCoord, UtmZone, utm_to_wgs84};
use foundation::{LngLat, simplify_line};

/// Reprojects every position from `zone` easting/northing to WGS84 lng/lat.
pub fn utm_collection_to_wgs84(fc: &FeatureCollection, zone: UtmZone) -> FeatureCollection {
    let mut out = fc.clone();
    for geometry in out.features.iter_mut().filter_map(|f| f.geometry.as_mut()) {
        geometry.map_positions(&mut |[easting, northing]: LngLat| {
            utm_to_wgs84(UtmCoord {
                easting,
                northing,
                zone,
            })
            .to_lng_lat()
        });
    }
    out
}

/// Douglas-Peucker on every line and ring. Rings that would collapse below
/// four positions keep their original shape.
pub fn simplify_collection(fc: &FeatureCollection, tolerance: f64) -> FeatureCollection {
    let mut out = fc.clone();
    for geometry in out.features.iter_mut().filter_map(|f| f.geometry.as_mut()) {
        simplify_geometry(geometry, tolerance);
    }
    out
}

fn simplify_ring(ring: &mut Vec<LngLat>, tolerance: f64) {
    let simplified = simplify_line(ring, tolerance);
    if simplified.len() >= 4 {
        *ring = simplified;
    }
}

fn simplify_geometry(geometry: &mut Geometry, tolerance: f64) {
    match geometry {
        Geometry::Point(_) | Geometry::MultiPoint(_) => {}
        Geometry::LineString(line) => *line = simplify_line(line, tolerance),
        Geometry::MultiLineString(lines) => {
            for line in lines {
                *line = simplify_line(line, tolerance);
            }
        }
        Geometry::Polygon(rings) => rings.iter_mut().for_each(|r| simplify_ring(r, tolerance)),
        Geometry::MultiPolygon(polys) => polys
            .iter_mut()
            .flatten()
            .for_each(|r| simplify_ring(r, tolerance)),
        Geometry::GeometryCollection(members) => {
            for g in members {
                simplify_geometry(g, tolerance);
            }
        }
    }
}

pub fn count_positions(fc: &FeatureCollection) -> usize {
    let mut n = 0;
    for g in fc.features.iter().filter_map(|f| f.geometry.as_ref()) {
        g.for_each_position(&mut |_| n += 1);
    }
    n
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Classification {
    pub domain: &'static str,
    /// Features per band, in band order. Every band is listed.
    pub levels: Vec<(&'static str, usize)>,
    /// Extent known but outside every band.
    pub out_of_range: usize,
    /// No extent information.
    pub unknown: usize,
}

/// Counts features by the band holding the top of their vertical extent.
pub fn classify(fc: &FeatureCollection, domain: FeatureDomain) -> Classification {
    let mut counts: Vec<(&'static str, usize)> =
        ELEVATION_LEVELS.iter().map(|l| (l.id.as_str(), 0)).collect();
    let mut out_of_range = 0;
    let mut unknown = 0;

    for f in &fc.features {
        let Some((_, top)) = domain.vertical_extent(f) else {
            unknown += 1;
            continue;
        };
        match get_elevation_level(top) {
            Some(level) => {
                if let Some(slot) = counts.iter_mut().find(|(id, _)| *id == level.id.as_str()) {
                    slot.1 += 1;
                }
            }
            None => out_of_range += 1,
        }
    }

    Classification {
        domain: domain.as_str(),
        levels: counts,
        out_of_range,
        unknown,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    pub features: usize,
    pub positions: usize,
    pub geometry_types: BTreeMap<&'static str, usize>,
    /// `[minLng, minLat, maxLng, maxLat]`.
    pub bounds: Option<[f64; 4]>,
}

pub fn summarize(fc: &FeatureCollection) -> Summary {
    let mut geometry_types = BTreeMap::new();
    for f in &fc.features {
        *geometry_types.entry(f.geometry_type()).or_insert(0) += 1;
    }
    Summary {
        features: fc.len(),
        positions: count_positions(fc),
        geometry_types,
        bounds: formats::calculate_bounds(&fc.features).map(|b| b.to_array()),
    }
}
