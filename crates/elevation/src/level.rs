use foundation::Color;
use serde::{Deserialize, Serialize};

use crate::range::{ElevationRange, is_in_elevation_range};

/// Returned by [`get_elevation_color`] for heights outside every band.
pub const UNCLASSIFIED_COLOR: Color = Color::GRAY;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ElevationLevelId {
    DeepSubsurface,
    ShallowSubsurface,
    Surface,
    LowRise,
    MidRise,
    HighRise,
}

impl ElevationLevelId {
    pub fn as_str(self) -> &'static str {
        match self {
            ElevationLevelId::DeepSubsurface => "deep_subsurface",
            ElevationLevelId::ShallowSubsurface => "shallow_subsurface",
            ElevationLevelId::Surface => "surface",
            ElevationLevelId::LowRise => "low_rise",
            ElevationLevelId::MidRise => "mid_rise",
            ElevationLevelId::HighRise => "high_rise",
        }
    }

    pub fn level(self) -> &'static ElevationLevel {
        // The table holds exactly one entry per id, in declaration order.
        &ELEVATION_LEVELS[self as usize]
    }
}

impl std::fmt::Display for ElevationLevelId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One fixed vertical band.
#[derive(Debug, Clone, PartialEq)]
pub struct ElevationLevel {
    pub id: ElevationLevelId,
    pub label: &'static str,
    pub short_label: &'static str,
    pub min_height: f64,
    pub max_height: f64,
    pub color: Color,
    pub description: &'static str,
}

impl ElevationLevel {
    pub fn range(&self) -> ElevationRange {
        ElevationRange::new(self.min_height, self.max_height)
    }

    pub fn contains(&self, height: f64) -> bool {
        height >= self.min_height && height <= self.max_height
    }

    /// True when this band shares at least one height with `range`.
    pub fn overlaps(&self, range: &ElevationRange) -> bool {
        is_in_elevation_range(self.min_height, self.max_height, range)
    }
}

/// Bands from deepest to highest. Adjacent bands share their boundary height.
pub static ELEVATION_LEVELS: [ElevationLevel; 6] = [
    ElevationLevel {
        id: ElevationLevelId::DeepSubsurface,
        label: "Deep Subsurface",
        short_label: "Deep",
        min_height: -50.0,
        max_height: -20.0,
        color: Color::rgb(0x1e, 0x3a, 0x5f),
        description: "Subway lines, deep tunnels and trunk conduits",
    },
    ElevationLevel {
        id: ElevationLevelId::ShallowSubsurface,
        label: "Shallow Subsurface",
        short_label: "Shallow",
        min_height: -20.0,
        max_height: 0.0,
        color: Color::rgb(0x3d, 0x6b, 0x8c),
        description: "Water mains, sewers, gas pipes and cable ducts",
    },
    ElevationLevel {
        id: ElevationLevelId::Surface,
        label: "Surface",
        short_label: "Surface",
        min_height: 0.0,
        max_height: 10.0,
        color: Color::rgb(0x4a, 0x7c, 0x59),
        description: "Street level, parcels and single-storey structures",
    },
    ElevationLevel {
        id: ElevationLevelId::LowRise,
        label: "Low-rise",
        short_label: "Low",
        min_height: 10.0,
        max_height: 30.0,
        color: Color::rgb(0xc9, 0xa2, 0x27),
        description: "Buildings up to roughly ten floors",
    },
    ElevationLevel {
        id: ElevationLevelId::MidRise,
        label: "Mid-rise",
        short_label: "Mid",
        min_height: 30.0,
        max_height: 60.0,
        color: Color::rgb(0xd9, 0x82, 0x2b),
        description: "Office blocks and apartment towers",
    },
    ElevationLevel {
        id: ElevationLevelId::HighRise,
        label: "High-rise",
        short_label: "High",
        min_height: 60.0,
        max_height: 200.0,
        color: Color::rgb(0xb8, 0x40, 0x5e),
        description: "Skyscrapers and landmark towers",
    },
];

/// First band in table order whose closed interval contains `height`.
///
/// A height on a shared boundary (for example `0.0`) resolves to the deeper
/// band because it is declared first.
pub fn get_elevation_level(height: f64) -> Option<&'static ElevationLevel> {
    ELEVATION_LEVELS.iter().find(|l| l.contains(height))
}

pub fn get_elevation_color(height: f64) -> Color {
    get_elevation_level(height)
        .map(|l| l.color)
        .unwrap_or(UNCLASSIFIED_COLOR)
}

/// Every band sharing at least one height with `range`, in table order.
pub fn levels_in_range(range: &ElevationRange) -> Vec<&'static ElevationLevel> {
    ELEVATION_LEVELS.iter().filter(|l| l.overlaps(range)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::range::{GLOBAL_MAX, GLOBAL_MIN};

    #[test]
    fn table_is_contiguous_and_spans_global_bound() {
        assert_eq!(ELEVATION_LEVELS[0].min_height, GLOBAL_MIN);
        assert_eq!(ELEVATION_LEVELS[ELEVATION_LEVELS.len() - 1].max_height, GLOBAL_MAX);
        for pair in ELEVATION_LEVELS.windows(2) {
            assert_eq!(pair[0].max_height, pair[1].min_height);
            assert!(pair[0].min_height < pair[0].max_height);
        }
    }

    #[test]
    fn ids_index_the_table() {
        for level in &ELEVATION_LEVELS {
            assert_eq!(level.id.level().id, level.id);
        }
    }

    #[test]
    fn lookup_inside_bands() {
        assert_eq!(get_elevation_level(-35.0).map(|l| l.id), Some(ElevationLevelId::DeepSubsurface));
        assert_eq!(get_elevation_level(-5.0).map(|l| l.id), Some(ElevationLevelId::ShallowSubsurface));
        assert_eq!(get_elevation_level(45.0).map(|l| l.id), Some(ElevationLevelId::MidRise));
        assert_eq!(get_elevation_level(150.0).map(|l| l.id), Some(ElevationLevelId::HighRise));
    }

    #[test]
    fn shared_boundary_resolves_to_earlier_band() {
        assert_eq!(get_elevation_level(0.0).map(|l| l.id), Some(ElevationLevelId::ShallowSubsurface));
        assert_eq!(get_elevation_level(-20.0).map(|l| l.id), Some(ElevationLevelId::DeepSubsurface));
        assert_eq!(get_elevation_level(10.0).map(|l| l.id), Some(ElevationLevelId::Surface));
    }

    #[test]
    fn defined_exactly_on_global_bound() {
        assert!(get_elevation_level(GLOBAL_MIN).is_some());
        assert!(get_elevation_level(GLOBAL_MAX).is_some());
        assert!(get_elevation_level(GLOBAL_MIN - 0.001).is_none());
        assert!(get_elevation_level(GLOBAL_MAX + 0.001).is_none());
        assert!(get_elevation_level(f64::NAN).is_none());

        let mut h = GLOBAL_MIN;
        while h <= GLOBAL_MAX {
            assert!(get_elevation_level(h).is_some(), "{h}");
            h += 0.25;
        }
    }

    #[test]
    fn color_falls_back_to_gray() {
        assert_eq!(get_elevation_color(5.0), Color::rgb(0x4a, 0x7c, 0x59));
        assert_eq!(get_elevation_color(-80.0), UNCLASSIFIED_COLOR);
        assert_eq!(get_elevation_color(500.0), Color::GRAY);
    }

    #[test]
    fn levels_in_range_uses_overlap() {
        let ids: Vec<_> = levels_in_range(&ElevationRange::new(-50.0, 0.0))
            .into_iter()
            .map(|l| l.id)
            .collect();
        assert_eq!(
            ids,
            vec![
                ElevationLevelId::DeepSubsurface,
                ElevationLevelId::ShallowSubsurface,
                ElevationLevelId::Surface,
            ]
        );
    }

    #[test]
    fn ids_serialize_snake_case() {
        let s = serde_json::to_string(&ElevationLevelId::ShallowSubsurface).expect("json");
        assert_eq!(s, "\"shallow_subsurface\"");
        assert_eq!(ElevationLevelId::HighRise.to_string(), "high_rise");
    }
}
