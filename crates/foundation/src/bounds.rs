use crate::LngLat;

/// Highest zoom level produced by [`zoom_for_bounds`].
pub const MAX_FIT_ZOOM: f64 = 20.0;

/// Tile edge length the zoom estimate is calibrated against.
const TILE_SIZE_PX: f64 = 256.0;

/// Axis-aligned lon/lat box.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct LngLatBounds {
    pub min: LngLat,
    pub max: LngLat,
}

impl LngLatBounds {
    pub fn new(min: LngLat, max: LngLat) -> Self {
        LngLatBounds { min, max }
    }

    /// Degenerate box around a single position.
    pub fn from_point(p: LngLat) -> Self {
        LngLatBounds { min: p, max: p }
    }

    /// Smallest box containing every position, or `None` for an empty input.
    pub fn from_positions<'a, I>(positions: I) -> Option<Self>
    where
        I: IntoIterator<Item = &'a LngLat>,
    {
        let mut out: Option<LngLatBounds> = None;
        for p in positions {
            match out.as_mut() {
                Some(b) => b.extend(*p),
                None => out = Some(LngLatBounds::from_point(*p)),
            }
        }
        out
    }

    pub fn extend(&mut self, p: LngLat) {
        self.min[0] = self.min[0].min(p[0]);
        self.min[1] = self.min[1].min(p[1]);
        self.max[0] = self.max[0].max(p[0]);
        self.max[1] = self.max[1].max(p[1]);
    }

    pub fn union(&self, other: &Self) -> Self {
        let mut out = *self;
        out.extend(other.min);
        out.extend(other.max);
        out
    }

    pub fn width(&self) -> f64 {
        self.max[0] - self.min[0]
    }

    pub fn height(&self) -> f64 {
        self.max[1] - self.min[1]
    }

    pub fn center(&self) -> LngLat {
        [
            (self.min[0] + self.max[0]) / 2.0,
            (self.min[1] + self.max[1]) / 2.0,
        ]
    }

    /// `[minLng, minLat, maxLng, maxLat]`, the order GeoJSON `bbox` members use.
    pub fn to_array(&self) -> [f64; 4] {
        [self.min[0], self.min[1], self.max[0], self.max[1]]
    }

    pub fn from_array(a: [f64; 4]) -> Self {
        LngLatBounds::new([a[0], a[1]], [a[2], a[3]])
    }

    pub fn contains(&self, p: LngLat) -> bool {
        p[0] >= self.min[0] && p[0] <= self.max[0] && p[1] >= self.min[1] && p[1] <= self.max[1]
    }
}

/// Rough zoom level at which `bounds` fits a `width` x `height` pixel viewport
/// with `padding` pixels kept free on every side.
///
/// This is a camera-placement estimate, not an exact fit: longitude and
/// latitude spans are treated linearly and the smaller of the two zooms wins.
pub fn zoom_for_bounds(bounds: &LngLatBounds, width: f64, height: f64, padding: f64) -> f64 {
    let avail_w = (width - 2.0 * padding).max(1.0);
    let avail_h = (height - 2.0 * padding).max(1.0);

    let lng_span = bounds.width().abs();
    let lat_span = bounds.height().abs();

    let zoom_lng = if lng_span > 0.0 {
        ((avail_w / TILE_SIZE_PX) * (360.0 / lng_span)).log2()
    } else {
        f64::INFINITY
    };
    let zoom_lat = if lat_span > 0.0 {
        ((avail_h / TILE_SIZE_PX) * (180.0 / lat_span)).log2()
    } else {
        f64::INFINITY
    };

    zoom_lng.min(zoom_lat).min(MAX_FIT_ZOOM)
}
