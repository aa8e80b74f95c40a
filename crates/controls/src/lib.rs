//! Interactive map controls: feature popups with optional reverse geocoding,
//! and the layer legend.

pub mod geocode;
pub mod legend;
pub mod popup;

pub use geocode::{GeocodeError, Geocoder, HttpGeocoder};
pub use legend::{LegendConfig, LegendController, LegendEntry, LegendItem, LegendView, elevation_legend_items};
pub use popup::{PopupConfig, PopupContent, PopupController, PopupState, PopupTrigger};
