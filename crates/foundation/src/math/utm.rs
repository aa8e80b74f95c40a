//! Universal Transverse Mercator <-> WGS84 on the WGS84 ellipsoid.
//!
//! Series expansion after Snyder, "Map Projections: A Working Manual" (1987),
//! accurate to well under a millimetre inside a zone.

use super::geodesy::{Geodetic, WGS84_A, WGS84_E2, WGS84_EP2, meridian_arc};

/// Scale factor on the central meridian.
pub const UTM_K0: f64 = 0.9996;
pub const UTM_FALSE_EASTING: f64 = 500_000.0;
/// Added to northings in the southern hemisphere.
pub const UTM_FALSE_NORTHING_SOUTH: f64 = 10_000_000.0;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct UtmZone {
    pub number: u8,
    pub south: bool,
}

impl UtmZone {
    /// `None` unless `number` is in `1..=60`.
    pub fn new(number: u8, south: bool) -> Option<Self> {
        (1..=60).contains(&number).then_some(Self { number, south })
    }

    pub fn central_meridian_deg(&self) -> f64 {
        (self.number as f64 - 1.0) * 6.0 - 180.0 + 3.0
    }

    /// Zone containing a WGS84 position (no Norway/Svalbard exceptions).
    pub fn containing(lon_deg: f64, lat_deg: f64) -> Self {
        let n = (((lon_deg + 180.0) / 6.0).floor() as i64).rem_euclid(60) + 1;
        Self {
            number: n as u8,
            south: lat_deg < 0.0,
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct UtmCoord {
    pub easting: f64,
    pub northing: f64,
    pub zone: UtmZone,
}

pub fn utm_to_wgs84(utm: UtmCoord) -> Geodetic {
    let e2 = WGS84_E2;
    let ep2 = WGS84_EP2;
    let e4 = e2 * e2;
    let e6 = e4 * e2;

    let x = utm.easting - UTM_FALSE_EASTING;
    let y = if utm.zone.south {
        utm.northing - UTM_FALSE_NORTHING_SOUTH
    } else {
        utm.northing
    };

    let m = y / UTM_K0;
    let mu = m / (WGS84_A * (1.0 - e2 / 4.0 - 3.0 * e4 / 64.0 - 5.0 * e6 / 256.0));

    let sqrt_1_e2 = (1.0 - e2).sqrt();
    let e1 = (1.0 - sqrt_1_e2) / (1.0 + sqrt_1_e2);
    let phi1 = mu
        + (3.0 * e1 / 2.0 - 27.0 * e1.powi(3) / 32.0) * (2.0 * mu).sin()
        + (21.0 * e1 * e1 / 16.0 - 55.0 * e1.powi(4) / 32.0) * (4.0 * mu).sin()
        + (151.0 * e1.powi(3) / 96.0) * (6.0 * mu).sin()
        + (1097.0 * e1.powi(4) / 512.0) * (8.0 * mu).sin();

    let sin1 = phi1.sin();
    let cos1 = phi1.cos();
    let tan1 = phi1.tan();
    let n1 = WGS84_A / (1.0 - e2 * sin1 * sin1).sqrt();
    let t1 = tan1 * tan1;
    let c1 = ep2 * cos1 * cos1;
    let r1 = WGS84_A * (1.0 - e2) / (1.0 - e2 * sin1 * sin1).powf(1.5);
    let d = x / (n1 * UTM_K0);

    let lat = phi1
        - (n1 * tan1 / r1)
            * (d * d / 2.0
                - (5.0 + 3.0 * t1 + 10.0 * c1 - 4.0 * c1 * c1 - 9.0 * ep2) * d.powi(4) / 24.0
                + (61.0 + 90.0 * t1 + 298.0 * c1 + 45.0 * t1 * t1 - 252.0 * ep2 - 3.0 * c1 * c1)
                    * d.powi(6)
                    / 720.0);
    let lon = (d - (1.0 + 2.0 * t1 + c1) * d.powi(3) / 6.0
        + (5.0 - 2.0 * c1 + 28.0 * t1 - 3.0 * c1 * c1 + 8.0 * ep2 + 24.0 * t1 * t1) * d.powi(5)
            / 120.0)
        / cos1;

    Geodetic::new(
        lat.to_degrees(),
        utm.zone.central_meridian_deg() + lon.to_degrees(),
    )
}

pub fn wgs84_to_utm(geo: Geodetic, zone: UtmZone) -> UtmCoord {
    let ep2 = WGS84_EP2;
    let phi = geo.lat_deg.to_radians();
    let dlon = (geo.lon_deg - zone.central_meridian_deg()).to_radians();

    let sin = phi.sin();
    let cos = phi.cos();
    let tan = phi.tan();
    let n = WGS84_A / (1.0 - WGS84_E2 * sin * sin).sqrt();
    let t = tan * tan;
    let c = ep2 * cos * cos;
    let a = dlon * cos;
    let m = meridian_arc(phi);

    let easting = UTM_K0
        * n
        * (a + (1.0 - t + c) * a.powi(3) / 6.0
            + (5.0 - 18.0 * t + t * t + 72.0 * c - 58.0 * ep2) * a.powi(5) / 120.0)
        + UTM_FALSE_EASTING;
    let mut northing = UTM_K0
        * (m + n
            * tan
            * (a * a / 2.0
                + (5.0 - t + 9.0 * c + 4.0 * c * c) * a.powi(4) / 24.0
                + (61.0 - 58.0 * t + t * t + 600.0 * c - 330.0 * ep2) * a.powi(6) / 720.0));
    if zone.south {
        northing += UTM_FALSE_NORTHING_SOUTH;
    }

    UtmCoord {
        easting,
        northing,
        zone,
    }
}

#[cfg(test)]
mod tests {
    use super::{Geodetic, UtmCoord, UtmZone, utm_to_wgs84, wgs84_to_utm};

    fn assert_close(a: f64, b: f64, eps: f64) {
        let diff = (a - b).abs();
        assert!(diff <= eps, "expected {a} ~= {b} (diff {diff})");
    }

    #[test]
    fn zone_numbers_are_validated() {
        assert!(UtmZone::new(0, false).is_none());
        assert!(UtmZone::new(61, false).is_none());
        assert_eq!(UtmZone::new(54, false).map(|z| z.central_meridian_deg()), Some(141.0));
    }

    #[test]
    fn containing_zone() {
        assert_eq!(UtmZone::containing(139.76, 35.68), UtmZone { number: 54, south: false });
        assert_eq!(UtmZone::containing(-58.4, -34.6), UtmZone { number: 21, south: true });
        assert_eq!(UtmZone::containing(180.0, 0.0).number, 1);
    }

    #[test]
    fn central_meridian_on_equator() {
        let zone = UtmZone::new(31, false).expect("zone");
        let geo = utm_to_wgs84(UtmCoord {
            easting: 500_000.0,
            northing: 0.0,
            zone,
        });
        assert_close(geo.lat_deg, 0.0, 1e-12);
        assert_close(geo.lon_deg, 3.0, 1e-12);
    }

    #[test]
    fn round_trip_northern_zone() {
        let zone = UtmZone::new(54, false).expect("zone");
        let geo = Geodetic::new(35.681_236, 139.767_125);
        let utm = wgs84_to_utm(geo, zone);
        assert!(utm.easting > 300_000.0 && utm.easting < 500_000.0);
        assert!(utm.northing > 3_900_000.0 && utm.northing < 4_000_000.0);
        let back = utm_to_wgs84(utm);
        assert_close(back.lat_deg, geo.lat_deg, 1e-7);
        assert_close(back.lon_deg, geo.lon_deg, 1e-7);
    }

    #[test]
    fn round_trip_southern_zone() {
        let zone = UtmZone::containing(-58.38, -34.60);
        let geo = Geodetic::new(-34.60, -58.38);
        let back = utm_to_wgs84(wgs84_to_utm(geo, zone));
        assert_close(back.lat_deg, geo.lat_deg, 1e-7);
        assert_close(back.lon_deg, geo.lon_deg, 1e-7);
    }
}
