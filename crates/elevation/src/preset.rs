use crate::range::ElevationRange;

/// Named shortcut to a fixed vertical slice.
#[derive(Debug, Clone, PartialEq)]
pub struct ElevationPreset {
    pub id: &'static str,
    pub label: &'static str,
    pub range: ElevationRange,
}

pub static ELEVATION_PRESETS: [ElevationPreset; 4] = [
    ElevationPreset {
        id: "subsurface",
        label: "Underground",
        range: ElevationRange::new(-50.0, 0.0),
    },
    ElevationPreset {
        id: "surface",
        label: "Street level",
        range: ElevationRange::new(0.0, 10.0),
    },
    ElevationPreset {
        id: "buildings",
        label: "Buildings",
        range: ElevationRange::new(0.0, 200.0),
    },
    ElevationPreset {
        id: "all",
        label: "All levels",
        range: ElevationRange::FULL,
    },
];

pub fn get_preset(id: &str) -> Option<&'static ElevationPreset> {
    ELEVATION_PRESETS.iter().find(|p| p.id == id)
}

/// Preset whose range equals `range` exactly.
pub fn preset_for_range(range: &ElevationRange) -> Option<&'static ElevationPreset> {
    ELEVATION_PRESETS.iter().find(|p| p.range == *range)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::range::ElevationRange;

    #[test]
    fn lookup_by_id() {
        assert_eq!(
            get_preset("subsurface").map(|p| p.range),
            Some(ElevationRange::new(-50.0, 0.0))
        );
        assert!(get_preset("stratosphere").is_none());
    }

    #[test]
    fn reverse_lookup_requires_exact_match() {
        assert_eq!(preset_for_range(&ElevationRange::FULL).map(|p| p.id), Some("all"));
        assert!(preset_for_range(&ElevationRange::new(-50.0, 0.5)).is_none());
    }

    #[test]
    fn preset_ranges_are_valid_and_distinct() {
        for (i, p) in ELEVATION_PRESETS.iter().enumerate() {
            assert_eq!(p.range.clamped(), p.range, "{}", p.id);
            for q in &ELEVATION_PRESETS[i + 1..] {
                assert_ne!(p.range, q.range);
                assert_ne!(p.id, q.id);
            }
        }
    }
}
