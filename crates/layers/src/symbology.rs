use foundation::Color;

/// Category key to color. Lookups are exact and case-insensitive.
pub type CategoryTable = [(&'static str, Color)];

/// Color for uncategorized features.
pub const FALLBACK_COLOR: Color = Color::GRAY;

pub static ZONE_COLORS: [(&str, Color); 7] = [
    ("residential", Color::rgb(0xf4, 0xd0, 0x3f)),
    ("commercial", Color::rgb(0xe7, 0x4c, 0x3c)),
    ("industrial", Color::rgb(0x8e, 0x44, 0xad)),
    ("mixed_use", Color::rgb(0xe6, 0x7e, 0x22)),
    ("public", Color::rgb(0x34, 0x98, 0xdb)),
    ("park", Color::rgb(0x27, 0xae, 0x60)),
    ("agricultural", Color::rgb(0xa3, 0xc2, 0x6b)),
];

pub static BUILDING_COLORS: [(&str, Color); 6] = [
    ("residential", Color::rgb(0xf5, 0xe6, 0xb8)),
    ("commercial", Color::rgb(0xf2, 0xa5, 0x9a)),
    ("office", Color::rgb(0x9a, 0xb7, 0xd3)),
    ("industrial", Color::rgb(0xb8, 0xa9, 0xc9)),
    ("public", Color::rgb(0x8f, 0xd1, 0xc0)),
    ("mixed_use", Color::rgb(0xf6, 0xc2, 0x8b)),
];

pub static NETWORK_COLORS: [(&str, Color); 7] = [
    ("water", Color::rgb(0x1f, 0x78, 0xb4)),
    ("sewer", Color::rgb(0x8c, 0x6d, 0x31)),
    ("gas", Color::rgb(0xff, 0xd7, 0x00)),
    ("electric", Color::rgb(0xe3, 0x1a, 0x1c)),
    ("telecom", Color::rgb(0x33, 0xa0, 0x2c)),
    ("district_heating", Color::rgb(0xff, 0x7f, 0x00)),
    ("subway", Color::rgb(0x6a, 0x3d, 0x9a)),
];

pub fn lookup_color(table: &CategoryTable, key: Option<&str>) -> Color {
    let Some(key) = key else {
        return FALLBACK_COLOR;
    };
    let key = key.trim();
    table
        .iter()
        .find(|(k, _)| k.eq_ignore_ascii_case(key))
        .map(|(_, c)| *c)
        .unwrap_or(FALLBACK_COLOR)
}

pub fn zone_color(zone_type: Option<&str>) -> Color {
    lookup_color(&ZONE_COLORS, zone_type)
}

pub fn building_color(building_type: Option<&str>) -> Color {
    lookup_color(&BUILDING_COLORS, building_type)
}

pub fn network_color(network_type: Option<&str>) -> Color {
    lookup_color(&NETWORK_COLORS, network_type)
}

/// Opacity applied to a base color, as used for fills.
pub fn apply_opacity(color: Color, opacity: f32) -> Color {
    color.with_opacity(opacity)
}
