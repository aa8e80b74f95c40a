//! Typed views over the property bags of the three data domains.

use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};

use crate::geojson::{Feature, value_as_f64};

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum FeatureDomain {
    Zoning,
    Building,
    Subsurface,
}

impl FeatureDomain {
    pub fn as_str(self) -> &'static str {
        match self {
            FeatureDomain::Zoning => "zoning",
            FeatureDomain::Building => "building",
            FeatureDomain::Subsurface => "subsurface",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "zoning" => Some(FeatureDomain::Zoning),
            "building" | "buildings" => Some(FeatureDomain::Building),
            "subsurface" | "utility" | "utilities" => Some(FeatureDomain::Subsurface),
            _ => None,
        }
    }

    /// Vertical extent of `feature` under this domain's property schema.
    pub fn vertical_extent(self, feature: &Feature) -> Option<(f64, f64)> {
        match self {
            FeatureDomain::Zoning => ZoningProperties::from_feature(feature).vertical_extent(),
            FeatureDomain::Building => BuildingProperties::from_feature(feature).vertical_extent(),
            FeatureDomain::Subsurface => {
                SubsurfaceProperties::from_feature(feature).vertical_extent()
            }
        }
    }
}

/// `[min, max]` height in meters a feature occupies, when its properties say.
pub trait VerticalExtent {
    fn vertical_extent(&self) -> Option<(f64, f64)>;
}

#[derive(Debug, Default, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ZoningProperties {
    #[serde(deserialize_with = "lenient_string")]
    pub zone_id: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub zone_type: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub zone_name: Option<String>,
    #[serde(deserialize_with = "lenient_f64")]
    pub max_height: Option<f64>,
    #[serde(deserialize_with = "lenient_f64")]
    pub floor_area_ratio: Option<f64>,
    #[serde(deserialize_with = "lenient_f64")]
    pub building_coverage_ratio: Option<f64>,
    #[serde(deserialize_with = "lenient_f64")]
    pub area_sqm: Option<f64>,
}

/// Parcels start at grade and reach their height limit.
impl VerticalExtent for ZoningProperties {
    fn vertical_extent(&self) -> Option<(f64, f64)> {
        self.max_height.map(|h| (0.0, h))
    }
}

#[derive(Debug, Default, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct BuildingProperties {
    #[serde(deserialize_with = "lenient_string")]
    pub building_id: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub name: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub building_type: Option<String>,
    #[serde(deserialize_with = "lenient_f64")]
    pub height: Option<f64>,
    #[serde(deserialize_with = "lenient_f64")]
    pub elevation_base: Option<f64>,
    #[serde(deserialize_with = "lenient_f64")]
    pub floors: Option<f64>,
    #[serde(deserialize_with = "lenient_f64")]
    pub underground_floors: Option<f64>,
    #[serde(deserialize_with = "lenient_f64")]
    pub year_built: Option<f64>,
    #[serde(deserialize_with = "lenient_string")]
    pub address: Option<String>,
}

impl VerticalExtent for BuildingProperties {
    fn vertical_extent(&self) -> Option<(f64, f64)> {
        let height = self.height?;
        let base = self.elevation_base.unwrap_or(0.0);
        Some((base, base + height))
    }
}

#[derive(Debug, Default, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct SubsurfaceProperties {
    #[serde(deserialize_with = "lenient_string")]
    pub feature_id: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub network_type: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub facility_type: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub material: Option<String>,
    #[serde(deserialize_with = "lenient_f64")]
    pub diameter_mm: Option<f64>,
    /// Meters below grade.
    #[serde(deserialize_with = "lenient_f64")]
    pub depth: Option<f64>,
    #[serde(deserialize_with = "lenient_f64")]
    pub install_year: Option<f64>,
    #[serde(deserialize_with = "lenient_string")]
    pub status: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub operator: Option<String>,
}

/// Points and lines sit at a single depth; the sign of `depth` is ignored.
impl VerticalExtent for SubsurfaceProperties {
    fn vertical_extent(&self) -> Option<(f64, f64)> {
        let z = -self.depth?.abs();
        Some((z, z))
    }
}

macro_rules! impl_from_properties {
    ($($ty:ty),*) => {$(
        impl $ty {
            /// Never fails: fields that are absent or unusable come back as `None`.
            pub fn from_properties(props: &Map<String, Value>) -> Self {
                match serde_json::from_value(Value::Object(props.clone())) {
                    Ok(v) => v,
                    Err(err) => {
                        tracing::warn!(%err, schema = stringify!($ty), "unreadable feature properties");
                        Self::default()
                    }
                }
            }

            pub fn from_feature(feature: &Feature) -> Self {
                Self::from_properties(&feature.properties)
            }
        }
    )*};
}

impl_from_properties!(ZoningProperties, BuildingProperties, SubsurfaceProperties);

fn lenient_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let v = Value::deserialize(deserializer)?;
    Ok(value_as_f64(&v).filter(|n| n.is_finite()))
}

fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let v = Value::deserialize(deserializer)?;
    Ok(match v {
        Value::String(s) if !s.trim().is_empty() => Some(s),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geojson::Geometry;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn props(v: Value) -> Map<String, Value> {
        v.as_object().cloned().unwrap_or_default()
    }

    #[test]
    fn building_schema_reads_mixed_types() {
        let b = BuildingProperties::from_properties(&props(json!({
            "building_id": 1001,
            "name": "Shinjuku Tower",
            "building_type": "office",
            "height": "182.5",
            "elevation_base": 0,
            "floors": 45,
            "underground_floors": null,
            "unrelated": [1, 2, 3]
        })));
        assert_eq!(b.building_id.as_deref(), Some("1001"));
        assert_eq!(b.height, Some(182.5));
        assert_eq!(b.floors, Some(45.0));
        assert_eq!(b.underground_floors, None);
        assert_eq!(b.vertical_extent(), Some((0.0, 182.5)));
    }

    #[test]
    fn building_without_height_has_no_extent() {
        let b = BuildingProperties::from_properties(&props(json!({ "elevation_base": 5 })));
        assert_eq!(b.vertical_extent(), None);
        let raised = BuildingProperties::from_properties(&props(json!({ "elevation_base": 5, "height": 10 })));
        assert_eq!(raised.vertical_extent(), Some((5.0, 15.0)));
    }

    #[test]
    fn zoning_starts_at_surface() {
        let z = ZoningProperties::from_properties(&props(json!({ "zone_type": "commercial", "max_height": 60 })));
        assert_eq!(z.vertical_extent(), Some((0.0, 60.0)));
        assert_eq!(z.zone_type.as_deref(), Some("commercial"));
    }

    #[test]
    fn subsurface_is_a_single_depth() {
        let s = SubsurfaceProperties::from_properties(&props(json!({ "network_type": "water", "depth": 2.5 })));
        assert_eq!(s.vertical_extent(), Some((-2.5, -2.5)));
        let neg = SubsurfaceProperties::from_properties(&props(json!({ "depth": -8 })));
        assert_eq!(neg.vertical_extent(), Some((-8.0, -8.0)));
    }

    #[test]
    fn blank_strings_are_absent() {
        let s = SubsurfaceProperties::from_properties(&props(json!({ "material": "  ", "depth": "n/a" })));
        assert_eq!(s.material, None);
        assert_eq!(s.depth, None);
        assert_eq!(s.vertical_extent(), None);
    }

    #[test]
    fn domain_dispatch() {
        let f = Feature::new(Geometry::Point([0.0, 0.0])).with_property("depth", 12);
        assert_eq!(FeatureDomain::Subsurface.vertical_extent(&f), Some((-12.0, -12.0)));
        assert_eq!(FeatureDomain::Building.vertical_extent(&f), None);
        assert_eq!(FeatureDomain::parse("buildings"), Some(FeatureDomain::Building));
        assert_eq!(FeatureDomain::parse("sky"), None);
    }
}
