pub mod bounds;
pub mod fields;
pub mod geojson;
pub mod schema;

pub use bounds::*;
pub use fields::{FieldRule, FormattedField, NumberLocale, format_properties, format_value};
pub use geojson::*;
pub use schema::*;
