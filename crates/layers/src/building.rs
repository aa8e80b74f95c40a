use std::rc::Rc;

use foundation::Color;
use formats::{BuildingProperties, Feature, FeatureCollection, FeatureDomain};

use crate::filter::prefilter;
use crate::layer::{Accessor, LayerOptions, LayerProps, PolygonProps, RenderLayer};
use crate::symbology::building_color;

pub const BUILDING_LAYER_ID: &str = "buildings";

/// Storey height used when only a floor count is known.
pub const FLOOR_HEIGHT_M: f64 = 3.0;

/// Extrusion for buildings with neither height nor floor count.
pub const DEFAULT_BUILDING_HEIGHT: f64 = 10.0;

#[derive(Clone)]
pub struct BuildingLayerOptions {
    pub layer: LayerOptions,
    pub extruded: bool,
    pub wireframe: bool,
    /// Color buildings by elevation band instead of by use.
    pub color_by_height: bool,
    pub get_fill_color: Option<Accessor<Color>>,
    pub get_line_color: Option<Accessor<Color>>,
    pub get_elevation: Option<Accessor<f64>>,
}

impl Default for BuildingLayerOptions {
    fn default() -> Self {
        Self {
            layer: LayerOptions::default(),
            extruded: true,
            wireframe: false,
            color_by_height: false,
            get_fill_color: None,
            get_line_color: None,
            get_elevation: None,
        }
    }
}

impl BuildingLayerOptions {
    pub fn with_layer(mut self, layer: LayerOptions) -> Self {
        self.layer = layer;
        self
    }

    pub fn with_wireframe(mut self, wireframe: bool) -> Self {
        self.wireframe = wireframe;
        self
    }

    pub fn with_color_by_height(mut self, on: bool) -> Self {
        self.color_by_height = on;
        self
    }

    pub fn with_fill_color(mut self, f: impl Fn(&Feature) -> Color + 'static) -> Self {
        self.get_fill_color = Some(Rc::new(f));
        self
    }

    pub fn with_elevation(mut self, f: impl Fn(&Feature) -> f64 + 'static) -> Self {
        self.get_elevation = Some(Rc::new(f));
        self
    }
}

/// Extrusion height: `height`, else `floors * FLOOR_HEIGHT_M`, else the default.
pub fn default_building_height(feature: &Feature) -> f64 {
    let props = BuildingProperties::from_feature(feature);
    props
        .height
        .or_else(|| props.floors.map(|n| n * FLOOR_HEIGHT_M))
        .unwrap_or(DEFAULT_BUILDING_HEIGHT)
}

pub fn default_building_fill(feature: &Feature) -> Color {
    building_color(BuildingProperties::from_feature(feature).building_type.as_deref())
}

/// Band color of the roof height.
pub fn building_height_fill(feature: &Feature) -> Color {
    let props = BuildingProperties::from_feature(feature);
    let top = props.elevation_base.unwrap_or(0.0) + default_building_height(feature);
    elevation::get_elevation_color(top)
}

pub fn create_building_layer(data: &FeatureCollection, options: BuildingLayerOptions) -> RenderLayer {
    let features = prefilter(
        &data.features,
        FeatureDomain::Building,
        options.layer.elevation_filter.as_ref(),
    );

    let fallback_fill: fn(&Feature) -> Color = if options.color_by_height {
        building_height_fill
    } else {
        default_building_fill
    };

    let props = PolygonProps {
        get_fill_color: options
            .get_fill_color
            .unwrap_or_else(|| Rc::new(fallback_fill)),
        get_line_color: options
            .get_line_color
            .unwrap_or_else(|| Rc::new(|_: &Feature| Color::rgba(60, 60, 60, 160))),
        get_elevation: options
            .get_elevation
            .unwrap_or_else(|| Rc::new(default_building_height)),
        extruded: options.extruded,
        wireframe: options.wireframe,
        filled: true,
        stroked: !options.extruded,
        line_width_min_pixels: 1.0,
    };

    options.layer.build(BUILDING_LAYER_ID, features, LayerProps::Polygon(props))
}

#[cfg(test)]
mod tests {
    use super::*;
    use elevation::ElevationRange;
    use formats::Geometry;

    fn footprint() -> Geometry {
        Geometry::Polygon(vec![vec![[0.0, 0.0], [0.001, 0.0], [0.001, 0.001], [0.0, 0.0]]])
    }

    #[test]
    fn height_fallback_chain() {
        let with_height = Feature::new(footprint()).with_property("height", 45.5);
        let with_floors = Feature::new(footprint()).with_property("floors", 7);
        let bare = Feature::new(footprint());
        assert_eq!(default_building_height(&with_height), 45.5);
        assert_eq!(default_building_height(&with_floors), 21.0);
        assert_eq!(default_building_height(&bare), DEFAULT_BUILDING_HEIGHT);
    }

    #[test]
    fn color_modes() {
        let f = Feature::new(footprint())
            .with_property("building_type", "office")
            .with_property("height", 75.0);
        let data = FeatureCollection::new(vec![f]);

        let by_use = create_building_layer(&data, BuildingLayerOptions::default());
        assert_eq!(by_use.color_at(0), Some(crate::symbology::building_color(Some("office"))));

        let by_height = create_building_layer(&data, BuildingLayerOptions::default().with_color_by_height(true));
        assert_eq!(by_height.color_at(0), Some(elevation::get_elevation_color(75.0)));
    }

    #[test]
    fn subsurface_range_hides_buildings() {
        let data = FeatureCollection::new(vec![
            Feature::new(footprint()).with_property("height", 30.0),
            Feature::new(footprint())
                .with_property("elevation_base", -15.0)
                .with_property("height", 20.0),
        ]);
        let layer = create_building_layer(
            &data,
            BuildingLayerOptions::default()
                .with_layer(LayerOptions::default().with_elevation_filter(ElevationRange::new(-50.0, -1.0))),
        );
        assert_eq!(layer.len(), 1);
        assert_eq!(layer.data[0].number("elevation_base"), Some(-15.0));

        let LayerProps::Polygon(p) = &layer.props else {
            panic!("expected polygon props");
        };
        assert!(p.extruded);
        assert!(!p.stroked);
    }
}
