use std::rc::Rc;

use foundation::Color;
use formats::{Feature, FeatureCollection, FeatureDomain, Geometry, SubsurfaceProperties};

use crate::filter::prefilter;
use crate::layer::{
    Accessor, GeoJsonProps, LayerOptions, LayerProps, PathProps, RenderLayer, ScatterplotProps,
    WidthUnits,
};
use crate::symbology::network_color;

pub const SUBSURFACE_LAYER_ID: &str = "subsurface";
pub const INFRASTRUCTURE_LAYER_ID: &str = "infrastructure";
pub const ACCESS_POINT_LAYER_ID: &str = "access-points";

pub const MM_PER_METER: f64 = 1000.0;
/// Pipe width in meters when `diameter_mm` is missing.
pub const DEFAULT_PIPE_WIDTH: f64 = 0.3;
/// Access point radius in meters when `diameter_mm` is missing.
pub const DEFAULT_ACCESS_RADIUS: f64 = 0.5;
/// Depth assumed for utilities with no recorded depth.
pub const DEFAULT_DEPTH: f64 = 0.0;

#[derive(Clone, Default)]
pub struct SubsurfaceLayerOptions {
    pub layer: LayerOptions,
    pub get_color: Option<Accessor<Color>>,
    pub get_width: Option<Accessor<f64>>,
}

impl SubsurfaceLayerOptions {
    pub fn with_layer(mut self, layer: LayerOptions) -> Self {
        self.layer = layer;
        self
    }

    pub fn with_color(mut self, f: impl Fn(&Feature) -> Color + 'static) -> Self {
        self.get_color = Some(Rc::new(f));
        self
    }

    pub fn with_width(mut self, f: impl Fn(&Feature) -> f64 + 'static) -> Self {
        self.get_width = Some(Rc::new(f));
        self
    }
}

#[derive(Clone, Default)]
pub struct AccessPointLayerOptions {
    pub layer: LayerOptions,
    pub get_fill_color: Option<Accessor<Color>>,
    pub get_radius: Option<Accessor<f64>>,
}

impl AccessPointLayerOptions {
    pub fn with_layer(mut self, layer: LayerOptions) -> Self {
        self.layer = layer;
        self
    }

    pub fn with_fill_color(mut self, f: impl Fn(&Feature) -> Color + 'static) -> Self {
        self.get_fill_color = Some(Rc::new(f));
        self
    }

    pub fn with_radius(mut self, f: impl Fn(&Feature) -> f64 + 'static) -> Self {
        self.get_radius = Some(Rc::new(f));
        self
    }
}

#[derive(Clone, Default)]
pub struct InfrastructureLayerOptions {
    pub layer: LayerOptions,
    pub get_fill_color: Option<Accessor<Color>>,
    pub get_line_color: Option<Accessor<Color>>,
}

impl InfrastructureLayerOptions {
    pub fn with_layer(mut self, layer: LayerOptions) -> Self {
        self.layer = layer;
        self
    }

    pub fn with_line_color(mut self, f: impl Fn(&Feature) -> Color + 'static) -> Self {
        self.get_line_color = Some(Rc::new(f));
        self
    }
}

fn depth_z(feature: &Feature) -> f64 {
    -SubsurfaceProperties::from_feature(feature)
        .depth
        .map(f64::abs)
        .unwrap_or(DEFAULT_DEPTH)
}

fn network_of(feature: &Feature) -> Color {
    network_color(SubsurfaceProperties::from_feature(feature).network_type.as_deref())
}

pub fn default_pipe_width(feature: &Feature) -> f64 {
    SubsurfaceProperties::from_feature(feature)
        .diameter_mm
        .map(|d| d / MM_PER_METER)
        .unwrap_or(DEFAULT_PIPE_WIDTH)
}

pub fn default_access_radius(feature: &Feature) -> f64 {
    SubsurfaceProperties::from_feature(feature)
        .diameter_mm
        .map(|d| d / 2.0 / MM_PER_METER)
        .unwrap_or(DEFAULT_ACCESS_RADIUS)
}

/// Splits multi-part geometries into one feature per part. Parts keep the
/// parent's id and properties; other geometry kinds and unlocated features
/// are dropped.
fn explode(features: Vec<Feature>, keep: fn(&Geometry) -> Option<Vec<Geometry>>) -> Vec<Feature> {
    let mut out = Vec::with_capacity(features.len());
    for f in features {
        match f.geometry.as_ref().and_then(keep) {
            Some(parts) => out.extend(parts.into_iter().map(|geometry| Feature {
                id: f.id.clone(),
                properties: f.properties.clone(),
                geometry: Some(geometry),
            })),
            None => tracing::debug!(kind = f.geometry_type(), "skipping feature of unexpected geometry"),
        }
    }
    out
}

fn line_parts(g: &Geometry) -> Option<Vec<Geometry>> {
    match g {
        Geometry::LineString(_) => Some(vec![g.clone()]),
        Geometry::MultiLineString(lines) => {
            Some(lines.iter().cloned().map(Geometry::LineString).collect())
        }
        _ => None,
    }
}

fn point_parts(g: &Geometry) -> Option<Vec<Geometry>> {
    match g {
        Geometry::Point(_) => Some(vec![g.clone()]),
        Geometry::MultiPoint(points) => Some(points.iter().copied().map(Geometry::Point).collect()),
        _ => None,
    }
}

/// Pipes and cables drawn at their depth below grade.
pub fn create_subsurface_layer(data: &FeatureCollection, options: SubsurfaceLayerOptions) -> RenderLayer {
    let filtered = prefilter(
        &data.features,
        FeatureDomain::Subsurface,
        options.layer.elevation_filter.as_ref(),
    );
    let features = explode(filtered, line_parts);

    let props = PathProps {
        get_path: Rc::new(|f: &Feature| {
            let z = depth_z(f);
            f.geometry
                .iter()
                .flat_map(Geometry::paths)
                .flatten()
                .map(|p| [p[0], p[1], z])
                .collect()
        }),
        get_color: options.get_color.unwrap_or_else(|| Rc::new(network_of)),
        get_width: options.get_width.unwrap_or_else(|| Rc::new(default_pipe_width)),
        width_units: WidthUnits::Meters,
        width_min_pixels: 2.0,
        rounded: true,
    };

    options.layer.build(SUBSURFACE_LAYER_ID, features, LayerProps::Path(props))
}

/// Mixed-geometry utility data passed through as GeoJSON.
pub fn create_infrastructure_layer(
    data: &FeatureCollection,
    options: InfrastructureLayerOptions,
) -> RenderLayer {
    let features = prefilter(
        &data.features,
        FeatureDomain::Subsurface,
        options.layer.elevation_filter.as_ref(),
    );

    let props = GeoJsonProps {
        get_fill_color: options
            .get_fill_color
            .unwrap_or_else(|| Rc::new(|f: &Feature| network_of(f).with_alpha(160))),
        get_line_color: options.get_line_color.unwrap_or_else(|| Rc::new(network_of)),
        get_line_width: Rc::new(default_pipe_width),
        get_point_radius: Rc::new(default_access_radius),
        get_elevation: Rc::new(depth_z),
        filled: true,
        stroked: true,
        extruded: false,
        line_width_min_pixels: 2.0,
    };

    options.layer.build(INFRASTRUCTURE_LAYER_ID, features, LayerProps::GeoJson(props))
}

/// Manholes, shafts and other vertical access points.
pub fn create_access_point_layer(data: &FeatureCollection, options: AccessPointLayerOptions) -> RenderLayer {
    let filtered = prefilter(
        &data.features,
        FeatureDomain::Subsurface,
        options.layer.elevation_filter.as_ref(),
    );
    let features = explode(filtered, point_parts);

    let props = ScatterplotProps {
        get_position: Rc::new(|f: &Feature| {
            let [lng, lat] = f.anchor().unwrap_or([0.0, 0.0]);
            [lng, lat, depth_z(f)]
        }),
        get_radius: options.get_radius.unwrap_or_else(|| Rc::new(default_access_radius)),
        get_fill_color: options.get_fill_color.unwrap_or_else(|| Rc::new(network_of)),
        get_line_color: Rc::new(|_: &Feature| Color::WHITE),
        radius_min_pixels: 3.0,
        stroked: true,
    };

    options.layer.build(ACCESS_POINT_LAYER_ID, features, LayerProps::Scatterplot(props))
}
