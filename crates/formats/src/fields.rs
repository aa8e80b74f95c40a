//! Display formatting for feature properties.
//!
//! Each domain declares a static table of [`FieldRule`]s. A rule names the
//! property key, its label, an optional unit and formatter, its position in
//! the popup, and whether an empty value hides the row.

use serde_json::{Map, Value};

use crate::geojson::value_as_f64;
use crate::schema::FeatureDomain;

/// Separators and digit policy for number output.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct NumberLocale {
    pub tag: &'static str,
    pub decimal: char,
    pub group: char,
}

impl NumberLocale {
    pub const EN_US: NumberLocale = NumberLocale {
        tag: "en-US",
        decimal: '.',
        group: ',',
    };
    pub const DE_DE: NumberLocale = NumberLocale {
        tag: "de-DE",
        decimal: ',',
        group: '.',
    };
    pub const FR_FR: NumberLocale = NumberLocale {
        tag: "fr-FR",
        decimal: ',',
        group: '\u{202f}',
    };
    pub const JA_JP: NumberLocale = NumberLocale {
        tag: "ja-JP",
        decimal: '.',
        group: ',',
    };

    /// Matches on the language subtag when the exact tag is unknown.
    pub fn from_tag(tag: &str) -> Option<Self> {
        let lang = tag.split(['-', '_']).next().unwrap_or(tag).to_ascii_lowercase();
        match lang.as_str() {
            "en" => Some(Self::EN_US),
            "de" => Some(Self::DE_DE),
            "fr" => Some(Self::FR_FR),
            "ja" => Some(Self::JA_JP),
            _ => None,
        }
    }
}

impl Default for NumberLocale {
    fn default() -> Self {
        Self::EN_US
    }
}

/// Rounds to at most `max_fraction_digits`, drops trailing zeros and groups
/// thousands.
pub fn format_number(n: f64, locale: &NumberLocale, max_fraction_digits: usize) -> String {
    if !n.is_finite() {
        return n.to_string();
    }
    let fixed = format!("{:.*}", max_fraction_digits, n.abs());
    let (int_part, frac_part) = match fixed.split_once('.') {
        Some((i, f)) => (i, f.trim_end_matches('0')),
        None => (fixed.as_str(), ""),
    };

    let mut out = String::with_capacity(fixed.len() + fixed.len() / 3 + 1);
    let negative = n < 0.0 && (int_part.bytes().any(|b| b != b'0') || !frac_part.is_empty());
    if negative {
        out.push('-');
    }
    let digits = int_part.len();
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (digits - i) % 3 == 0 {
            out.push(locale.group);
        }
        out.push(ch);
    }
    if !frac_part.is_empty() {
        out.push(locale.decimal);
        out.push_str(frac_part);
    }
    out
}

pub type Formatter = fn(&Value, &NumberLocale) -> Option<String>;

#[derive(Debug, Clone, Copy)]
pub struct FieldRule {
    pub key: &'static str,
    pub label: &'static str,
    pub unit: Option<&'static str>,
    pub order: u32,
    pub hide_empty: bool,
    pub format: Option<Formatter>,
}

impl FieldRule {
    pub const fn new(key: &'static str, label: &'static str, order: u32) -> Self {
        Self {
            key,
            label,
            unit: None,
            order,
            hide_empty: true,
            format: None,
        }
    }

    pub const fn unit(mut self, unit: &'static str) -> Self {
        self.unit = Some(unit);
        self
    }

    pub const fn formatter(mut self, f: Formatter) -> Self {
        self.format = Some(f);
        self
    }

    pub const fn show_empty(mut self) -> Self {
        self.hide_empty = false;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormattedField {
    pub key: String,
    pub label: String,
    pub value: String,
}

/// Placeholder printed for empty values on rules that keep empty rows.
pub const EMPTY_VALUE: &str = "-";

fn is_empty(v: &Value) -> bool {
    match v {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        Value::Array(a) => a.is_empty(),
        _ => false,
    }
}

/// Formats one value under `rule`; `None` means the value counts as empty.
pub fn format_value(value: &Value, rule: &FieldRule, locale: &NumberLocale) -> Option<String> {
    if is_empty(value) {
        return None;
    }
    let text = match rule.format {
        Some(f) => f(value, locale)?,
        None => default_format(value, locale),
    };
    Some(match rule.unit {
        Some(unit) => format!("{text} {unit}"),
        None => text,
    })
}

fn default_format(value: &Value, locale: &NumberLocale) -> String {
    match value {
        Value::Number(n) => n
            .as_f64()
            .map(|x| format_number(x, locale, 2))
            .unwrap_or_else(|| n.to_string()),
        Value::Bool(true) => "Yes".to_string(),
        Value::Bool(false) => "No".to_string(),
        Value::String(s) => s.trim().to_string(),
        other => other.to_string(),
    }
}

/// Rows for every rule in `rules`, ordered by `order` then declaration order.
/// Keys without a rule are not shown.
pub fn format_properties(
    props: &Map<String, Value>,
    rules: &[FieldRule],
    locale: &NumberLocale,
) -> Vec<FormattedField> {
    let mut ordered: Vec<&FieldRule> = rules.iter().collect();
    ordered.sort_by_key(|r| r.order);

    let mut out = Vec::new();
    for rule in ordered {
        let formatted = props
            .get(rule.key)
            .and_then(|v| format_value(v, rule, locale));
        match formatted {
            Some(value) => out.push(FormattedField {
                key: rule.key.to_string(),
                label: rule.label.to_string(),
                value,
            }),
            None if !rule.hide_empty => out.push(FormattedField {
                key: rule.key.to_string(),
                label: rule.label.to_string(),
                value: EMPTY_VALUE.to_string(),
            }),
            None => {}
        }
    }
    out
}

pub fn rules_for(domain: FeatureDomain) -> &'static [FieldRule] {
    match domain {
        FeatureDomain::Zoning => &ZONING_FIELDS,
        FeatureDomain::Building => &BUILDING_FIELDS,
        FeatureDomain::Subsurface => &SUBSURFACE_FIELDS,
    }
}

pub fn format_height(value: &Value, locale: &NumberLocale) -> Option<String> {
    value_as_f64(value).map(|m| format!("{} m", format_number(m, locale, 1)))
}

pub fn format_depth(value: &Value, locale: &NumberLocale) -> Option<String> {
    value_as_f64(value).map(|m| format!("{} m below grade", format_number(m.abs(), locale, 1)))
}

pub fn format_area(value: &Value, locale: &NumberLocale) -> Option<String> {
    value_as_f64(value).map(|m2| format!("{} m\u{b2}", format_number(m2, locale, 0)))
}

/// Years print without grouping.
pub fn format_year(value: &Value, _locale: &NumberLocale) -> Option<String> {
    value_as_f64(value).map(|y| format!("{}", y.round() as i64))
}

pub fn format_count(value: &Value, locale: &NumberLocale) -> Option<String> {
    value_as_f64(value).map(|n| format_number(n.round(), locale, 0))
}

/// `district_heating` -> `District Heating`.
pub fn format_label(value: &Value, _locale: &NumberLocale) -> Option<String> {
    let s = value.as_str()?;
    let words: Vec<String> = s
        .split(['_', '-', ' '])
        .filter(|w| !w.is_empty())
        .map(|w| {
            let mut chars = w.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect();
    (!words.is_empty()).then(|| words.join(" "))
}

pub static ZONING_FIELDS: [FieldRule; 6] = [
    FieldRule::new("zone_name", "Zone", 0),
    FieldRule::new("zone_type", "Zone type", 1).formatter(format_label),
    FieldRule::new("max_height", "Height limit", 2).formatter(format_height),
    FieldRule::new("floor_area_ratio", "Floor area ratio", 3).unit("%"),
    FieldRule::new("building_coverage_ratio", "Building coverage", 4).unit("%"),
    FieldRule::new("area_sqm", "Area", 5).formatter(format_area),
];

pub static BUILDING_FIELDS: [FieldRule; 8] = [
    FieldRule::new("name", "Name", 0),
    FieldRule::new("building_type", "Use", 1).formatter(format_label),
    FieldRule::new("height", "Height", 2).formatter(format_height).show_empty(),
    FieldRule::new("floors", "Floors", 3).formatter(format_count),
    FieldRule::new("underground_floors", "Basement floors", 4).formatter(format_count),
    FieldRule::new("elevation_base", "Base elevation", 5).formatter(format_height),
    FieldRule::new("year_built", "Built", 6).formatter(format_year),
    FieldRule::new("address", "Address", 7),
];

pub static SUBSURFACE_FIELDS: [FieldRule; 8] = [
    FieldRule::new("network_type", "Network", 0).formatter(format_label),
    FieldRule::new("facility_type", "Facility", 1).formatter(format_label),
    FieldRule::new("depth", "Depth", 2).formatter(format_depth).show_empty(),
    FieldRule::new("diameter_mm", "Diameter", 3).unit("mm"),
    FieldRule::new("material", "Material", 4).formatter(format_label),
    FieldRule::new("install_year", "Installed", 5).formatter(format_year),
    FieldRule::new("status", "Status", 6).formatter(format_label),
    FieldRule::new("operator", "Operator", 7),
];
