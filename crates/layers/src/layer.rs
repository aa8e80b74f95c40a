use std::fmt;
use std::rc::Rc;

use foundation::{Color, LngLat};
use formats::Feature;

/// Per-feature accessor handed to the renderer.
pub type Accessor<T> = Rc<dyn Fn(&Feature) -> T>;

/// Click or hover callback.
pub type PickHandler = Rc<dyn Fn(&PickInfo)>;

/// What the renderer reports for a pointer event over a layer.
#[derive(Debug, Clone, PartialEq)]
pub struct PickInfo {
    pub layer_id: String,
    /// Index into the layer's data, when a feature was hit.
    pub index: Option<usize>,
    pub feature: Option<Feature>,
    pub coordinate: Option<LngLat>,
    /// Pointer position in pixels.
    pub pixel: [f32; 2],
}

impl PickInfo {
    pub fn hit(layer_id: impl Into<String>, index: usize, feature: Feature, coordinate: LngLat) -> Self {
        Self {
            layer_id: layer_id.into(),
            index: Some(index),
            feature: Some(feature),
            coordinate: Some(coordinate),
            pixel: [0.0, 0.0],
        }
    }

    pub fn with_pixel(mut self, pixel: [f32; 2]) -> Self {
        self.pixel = pixel;
        self
    }
}

pub trait Layer {
    fn id(&self) -> &str;
    fn visible(&self) -> bool;
    fn set_visible(&mut self, visible: bool);
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum WidthUnits {
    Meters,
    Pixels,
}

#[derive(Clone)]
pub struct PolygonProps {
    pub get_fill_color: Accessor<Color>,
    pub get_line_color: Accessor<Color>,
    /// Extrusion height in meters.
    pub get_elevation: Accessor<f64>,
    pub extruded: bool,
    pub wireframe: bool,
    pub filled: bool,
    pub stroked: bool,
    pub line_width_min_pixels: f32,
}

#[derive(Clone)]
pub struct PathProps {
    /// `[lng, lat, z]` vertices; z is meters relative to grade.
    pub get_path: Accessor<Vec<[f64; 3]>>,
    pub get_color: Accessor<Color>,
    pub get_width: Accessor<f64>,
    pub width_units: WidthUnits,
    pub width_min_pixels: f32,
    pub rounded: bool,
}

#[derive(Clone)]
pub struct ScatterplotProps {
    pub get_position: Accessor<[f64; 3]>,
    pub get_radius: Accessor<f64>,
    pub get_fill_color: Accessor<Color>,
    pub get_line_color: Accessor<Color>,
    pub radius_min_pixels: f32,
    pub stroked: bool,
}

#[derive(Clone)]
pub struct GeoJsonProps {
    pub get_fill_color: Accessor<Color>,
    pub get_line_color: Accessor<Color>,
    pub get_line_width: Accessor<f64>,
    pub get_point_radius: Accessor<f64>,
    pub get_elevation: Accessor<f64>,
    pub filled: bool,
    pub stroked: bool,
    pub extruded: bool,
    pub line_width_min_pixels: f32,
}

/// Class-specific configuration of the external GPU layer.
#[derive(Clone)]
pub enum LayerProps {
    Polygon(PolygonProps),
    Path(PathProps),
    Scatterplot(ScatterplotProps),
    GeoJson(GeoJsonProps),
}

impl LayerProps {
    /// Name of the renderer class the props are meant for.
    pub fn class_name(&self) -> &'static str {
        match self {
            LayerProps::Polygon(_) => "PolygonLayer",
            LayerProps::Path(_) => "PathLayer",
            LayerProps::Scatterplot(_) => "ScatterplotLayer",
            LayerProps::GeoJson(_) => "GeoJsonLayer",
        }
    }
}

/// Fully configured layer, ready for the renderer's constructor.
#[derive(Clone)]
pub struct RenderLayer {
    pub id: String,
    pub data: Rc<[Feature]>,
    pub visible: bool,
    pub opacity: f32,
    pub pickable: bool,
    pub props: LayerProps,
    pub on_click: Option<PickHandler>,
    pub on_hover: Option<PickHandler>,
}

impl RenderLayer {
    pub fn class_name(&self) -> &'static str {
        self.props.class_name()
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Primary color of the datum at `index`, whatever the layer class.
    pub fn color_at(&self, index: usize) -> Option<Color> {
        let f = self.data.get(index)?;
        Some(match &self.props {
            LayerProps::Polygon(p) => (p.get_fill_color)(f),
            LayerProps::Path(p) => (p.get_color)(f),
            LayerProps::Scatterplot(p) => (p.get_fill_color)(f),
            LayerProps::GeoJson(p) => (p.get_fill_color)(f),
        })
    }

    /// Forwards a renderer click to `on_click`. Returns whether a handler ran.
    pub fn dispatch_click(&self, info: &PickInfo) -> bool {
        match &self.on_click {
            Some(h) => {
                h(info);
                true
            }
            None => false,
        }
    }

    pub fn dispatch_hover(&self, info: &PickInfo) -> bool {
        match &self.on_hover {
            Some(h) => {
                h(info);
                true
            }
            None => false,
        }
    }
}

impl Layer for RenderLayer {
    fn id(&self) -> &str {
        &self.id
    }

    fn visible(&self) -> bool {
        self.visible
    }

    fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }
}

impl fmt::Debug for RenderLayer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RenderLayer")
            .field("id", &self.id)
            .field("class", &self.class_name())
            .field("features", &self.data.len())
            .field("visible", &self.visible)
            .field("opacity", &self.opacity)
            .field("pickable", &self.pickable)
            .finish()
    }
}

/// Options every factory understands.
#[derive(Clone)]
pub struct LayerOptions {
    pub id: Option<String>,
    pub visible: bool,
    pub opacity: f32,
    pub pickable: bool,
    /// When set, features whose vertical extent misses this range are dropped
    /// before the data reaches the renderer.
    pub elevation_filter: Option<elevation::ElevationRange>,
    pub on_click: Option<PickHandler>,
    pub on_hover: Option<PickHandler>,
}

impl Default for LayerOptions {
    fn default() -> Self {
        Self {
            id: None,
            visible: true,
            opacity: 0.8,
            pickable: true,
            elevation_filter: None,
            on_click: None,
            on_hover: None,
        }
    }
}

impl LayerOptions {
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_visible(mut self, visible: bool) -> Self {
        self.visible = visible;
        self
    }

    pub fn with_opacity(mut self, opacity: f32) -> Self {
        self.opacity = opacity.clamp(0.0, 1.0);
        self
    }

    pub fn with_pickable(mut self, pickable: bool) -> Self {
        self.pickable = pickable;
        self
    }

    pub fn with_elevation_filter(mut self, range: elevation::ElevationRange) -> Self {
        self.elevation_filter = Some(range);
        self
    }

    pub fn on_click(mut self, handler: impl Fn(&PickInfo) + 'static) -> Self {
        self.on_click = Some(Rc::new(handler));
        self
    }

    pub fn on_hover(mut self, handler: impl Fn(&PickInfo) + 'static) -> Self {
        self.on_hover = Some(Rc::new(handler));
        self
    }

    pub(crate) fn build(self, default_id: &str, data: Vec<Feature>, props: LayerProps) -> RenderLayer {
        RenderLayer {
            id: self.id.unwrap_or_else(|| default_id.to_string()),
            data: data.into(),
            visible: self.visible,
            opacity: self.opacity,
            pickable: self.pickable,
            props,
            on_click: self.on_click,
            on_hover: self.on_hover,
        }
    }
}
