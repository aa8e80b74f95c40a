use crate::LngLat;

/// Douglas-Peucker line simplification.
///
/// Sequences of two points or fewer are returned unchanged. The first and last
/// input points are always kept.
pub fn simplify_line(coords: &[LngLat], tolerance: f64) -> Vec<LngLat> {
    if coords.len() <= 2 {
        return coords.to_vec();
    }

    let mut keep = vec![false; coords.len()];
    keep[0] = true;
    keep[coords.len() - 1] = true;
    mark_kept(coords, 0, coords.len() - 1, tolerance, &mut keep);

    coords
        .iter()
        .zip(keep)
        .filter_map(|(p, k)| k.then_some(*p))
        .collect()
}

fn mark_kept(coords: &[LngLat], first: usize, last: usize, tolerance: f64, keep: &mut [bool]) {
    if last <= first + 1 {
        return;
    }

    let mut max_dist = 0.0;
    let mut index = first;
    for i in (first + 1)..last {
        let d = perpendicular_distance(coords[i], coords[first], coords[last]);
        if d > max_dist {
            max_dist = d;
            index = i;
        }
    }

    if max_dist > tolerance {
        keep[index] = true;
        mark_kept(coords, first, index, tolerance, keep);
        mark_kept(coords, index, last, tolerance, keep);
    }
}

/// Distance from `p` to the infinite line through `a` and `b`; falls back to
/// the distance from `a` when the chord has zero length.
pub fn perpendicular_distance(p: LngLat, a: LngLat, b: LngLat) -> f64 {
    let dx = b[0] - a[0];
    let dy = b[1] - a[1];
    let len = (dx * dx + dy * dy).sqrt();
    if len == 0.0 {
        let ex = p[0] - a[0];
        let ey = p[1] - a[1];
        return (ex * ex + ey * ey).sqrt();
    }
    (dy * p[0] - dx * p[1] + b[0] * a[1] - b[1] * a[0]).abs() / len
}
