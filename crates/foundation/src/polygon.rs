use crate::LngLat;

/// Unsigned shoelace area of a ring, in squared coordinate units.
///
/// Winding direction does not matter; a closing duplicate vertex is harmless.
pub fn polygon_area(ring: &[LngLat]) -> f64 {
    if ring.len() < 3 {
        return 0.0;
    }
    let mut twice = 0.0;
    for i in 0..ring.len() {
        let a = ring[i];
        let b = ring[(i + 1) % ring.len()];
        twice += a[0] * b[1] - b[0] * a[1];
    }
    (twice / 2.0).abs()
}

/// Even-odd ray casting. Points exactly on an edge may land on either side.
pub fn point_in_polygon(point: LngLat, ring: &[LngLat]) -> bool {
    let n = ring.len();
    if n < 3 {
        return false;
    }

    let [px, py] = point;
    let mut inside = false;
    let mut j = n - 1;
    for i in 0..n {
        let [xi, yi] = ring[i];
        let [xj, yj] = ring[j];
        if (yi > py) != (yj > py) && px < (xj - xi) * (py - yi) / (yj - yi) + xi {
            inside = !inside;
        }
        j = i;
    }
    inside
}

/// Point-in-polygon with holes: inside the outer ring and outside every hole.
pub fn point_in_rings(point: LngLat, rings: &[Vec<LngLat>]) -> bool {
    let Some((outer, holes)) = rings.split_first() else {
        return false;
    };
    point_in_polygon(point, outer) && !holes.iter().any(|h| point_in_polygon(point, h))
}
