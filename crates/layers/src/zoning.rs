use std::rc::Rc;

use foundation::Color;
use formats::{Feature, FeatureCollection, FeatureDomain, ZoningProperties};

use crate::filter::prefilter;
use crate::layer::{Accessor, LayerOptions, LayerProps, PolygonProps, RenderLayer};
use crate::symbology::zone_color;

pub const ZONING_LAYER_ID: &str = "zoning";

/// Height limits are drawn at a tenth of their value so parcels stay below
/// the buildings standing on them.
pub const ZONING_HEIGHT_SCALE: f64 = 10.0;

/// Extrusion used when a parcel has no height limit.
pub const ZONING_FALLBACK_ELEVATION: f64 = 0.0;

const ZONE_FILL_ALPHA: u8 = 110;

#[derive(Clone, Default)]
pub struct ZoningLayerOptions {
    pub layer: LayerOptions,
    pub extruded: bool,
    pub get_fill_color: Option<Accessor<Color>>,
    pub get_line_color: Option<Accessor<Color>>,
    pub get_elevation: Option<Accessor<f64>>,
}

impl ZoningLayerOptions {
    pub fn with_layer(mut self, layer: LayerOptions) -> Self {
        self.layer = layer;
        self
    }

    pub fn with_extruded(mut self, extruded: bool) -> Self {
        self.extruded = extruded;
        self
    }

    pub fn with_fill_color(mut self, f: impl Fn(&Feature) -> Color + 'static) -> Self {
        self.get_fill_color = Some(Rc::new(f));
        self
    }

    pub fn with_line_color(mut self, f: impl Fn(&Feature) -> Color + 'static) -> Self {
        self.get_line_color = Some(Rc::new(f));
        self
    }

    pub fn with_elevation(mut self, f: impl Fn(&Feature) -> f64 + 'static) -> Self {
        self.get_elevation = Some(Rc::new(f));
        self
    }
}

pub fn default_zone_fill(feature: &Feature) -> Color {
    let props = ZoningProperties::from_feature(feature);
    zone_color(props.zone_type.as_deref()).with_alpha(ZONE_FILL_ALPHA)
}

pub fn default_zone_elevation(feature: &Feature) -> f64 {
    ZoningProperties::from_feature(feature)
        .max_height
        .map(|h| h / ZONING_HEIGHT_SCALE)
        .unwrap_or(ZONING_FALLBACK_ELEVATION)
}

/// Zoning parcels as a polygon layer.
pub fn create_zoning_layer(data: &FeatureCollection, options: ZoningLayerOptions) -> RenderLayer {
    let features = prefilter(
        &data.features,
        FeatureDomain::Zoning,
        options.layer.elevation_filter.as_ref(),
    );

    let props = PolygonProps {
        get_fill_color: options
            .get_fill_color
            .unwrap_or_else(|| Rc::new(default_zone_fill)),
        get_line_color: options.get_line_color.unwrap_or_else(|| {
            Rc::new(|f: &Feature| {
                zone_color(ZoningProperties::from_feature(f).zone_type.as_deref())
            })
        }),
        get_elevation: options
            .get_elevation
            .unwrap_or_else(|| Rc::new(default_zone_elevation)),
        extruded: options.extruded,
        wireframe: false,
        filled: true,
        stroked: true,
        line_width_min_pixels: 1.0,
    };

    options.layer.build(ZONING_LAYER_ID, features, LayerProps::Polygon(props))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symbology::FALLBACK_COLOR;
    use elevation::ElevationRange;
    use formats::Geometry;

    fn parcel(zone_type: Option<&str>, max_height: Option<f64>) -> Feature {
        let mut f = Feature::new(Geometry::Polygon(vec![vec![
            [139.70, 35.68],
            [139.71, 35.68],
            [139.71, 35.69],
            [139.70, 35.68],
        ]]));
        if let Some(t) = zone_type {
            f = f.with_property("zone_type", t);
        }
        if let Some(h) = max_height {
            f = f.with_property("max_height", h);
        }
        f
    }

    #[test]
    fn defaults_use_category_colors_and_scaled_height() {
        let data = FeatureCollection::new(vec![
            parcel(Some("commercial"), Some(60.0)),
            parcel(Some("volcanic"), None),
        ]);
        let layer = create_zoning_layer(&data, ZoningLayerOptions::default());
        assert_eq!(layer.id, ZONING_LAYER_ID);
        assert_eq!(layer.class_name(), "PolygonLayer");

        let LayerProps::Polygon(p) = &layer.props else {
            panic!("expected polygon props");
        };
        assert_eq!((p.get_fill_color)(&layer.data[0]), Color::rgb(0xe7, 0x4c, 0x3c).with_alpha(110));
        assert_eq!((p.get_fill_color)(&layer.data[1]), FALLBACK_COLOR.with_alpha(110));
        assert_eq!((p.get_elevation)(&layer.data[0]), 6.0);
        assert_eq!((p.get_elevation)(&layer.data[1]), ZONING_FALLBACK_ELEVATION);
    }

    #[test]
    fn overrides_and_filter() {
        let data = FeatureCollection::new(vec![
            parcel(Some("residential"), Some(10.0)),
            parcel(Some("commercial"), Some(120.0)),
        ]);
        let options = ZoningLayerOptions::default()
            .with_layer(
                LayerOptions::default()
                    .with_id("zones-tall")
                    .with_opacity(0.4)
                    .with_elevation_filter(ElevationRange::new(50.0, 200.0)),
            )
            .with_extruded(true)
            .with_fill_color(|_| Color::WHITE);
        let layer = create_zoning_layer(&data, options);

        assert_eq!(layer.id, "zones-tall");
        assert_eq!(layer.opacity, 0.4);
        assert_eq!(layer.len(), 1);
        assert_eq!(layer.color_at(0), Some(Color::WHITE));
        let LayerProps::Polygon(p) = &layer.props else {
            panic!("expected polygon props");
        };
        assert!(p.extruded);
    }
}
