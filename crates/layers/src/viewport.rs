use foundation::{LngLat, LngLatBounds, zoom_for_bounds};

pub const DEFAULT_STYLE: &str = "https://basemaps.cartocdn.com/gl/dark-matter-gl-style/style.json";
/// Tokyo Station.
pub const DEFAULT_CENTER: LngLat = [139.7671, 35.6812];
pub const DEFAULT_ZOOM: f64 = 14.0;
pub const DEFAULT_PITCH: f64 = 45.0;
pub const MAX_PITCH: f64 = 85.0;
pub const MAX_ZOOM: f64 = 24.0;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum MapError {
    #[error("map container `{0}` not found")]
    ContainerNotFound(String),
    #[error("invalid map option `{name}`: {reason}")]
    InvalidOption { name: &'static str, reason: String },
}

/// Resolves container ids to whatever handle the host map needs.
pub trait ContainerLookup {
    type Handle;

    fn find(&self, id: &str) -> Option<Self::Handle>;
}

/// Construction options for the external interactive map.
#[derive(Debug, Clone, PartialEq)]
pub struct MapOptions {
    pub container: String,
    pub style: String,
    pub center: LngLat,
    pub zoom: f64,
    pub pitch: f64,
    pub bearing: f64,
}

impl Default for MapOptions {
    fn default() -> Self {
        Self {
            container: "map".to_string(),
            style: DEFAULT_STYLE.to_string(),
            center: DEFAULT_CENTER,
            zoom: DEFAULT_ZOOM,
            pitch: DEFAULT_PITCH,
            bearing: 0.0,
        }
    }
}

impl MapOptions {
    pub fn with_container(mut self, id: impl Into<String>) -> Self {
        self.container = id.into();
        self
    }

    pub fn with_camera(mut self, camera: CameraTarget) -> Self {
        self.center = camera.center;
        self.zoom = camera.zoom;
        self.pitch = camera.pitch;
        self.bearing = camera.bearing;
        self
    }

    pub fn validate(&self) -> Result<(), MapError> {
        let [lng, lat] = self.center;
        if !(-180.0..=180.0).contains(&lng) || !(-90.0..=90.0).contains(&lat) {
            return Err(MapError::InvalidOption {
                name: "center",
                reason: format!("[{lng}, {lat}] is not a longitude/latitude pair"),
            });
        }
        if !(0.0..=MAX_ZOOM).contains(&self.zoom) {
            return Err(MapError::InvalidOption {
                name: "zoom",
                reason: format!("{} is outside 0..={MAX_ZOOM}", self.zoom),
            });
        }
        if !(0.0..=MAX_PITCH).contains(&self.pitch) {
            return Err(MapError::InvalidOption {
                name: "pitch",
                reason: format!("{} is outside 0..={MAX_PITCH}", self.pitch),
            });
        }
        Ok(())
    }

    /// Validates the options and looks up the container element.
    pub fn resolve_container<C: ContainerLookup>(&self, lookup: &C) -> Result<C::Handle, MapError> {
        self.validate()?;
        lookup
            .find(&self.container)
            .ok_or_else(|| MapError::ContainerNotFound(self.container.clone()))
    }
}

/// Camera pose for a `flyTo`/`jumpTo` style move.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraTarget {
    pub center: LngLat,
    pub zoom: f64,
    pub pitch: f64,
    pub bearing: f64,
}

impl CameraTarget {
    /// Frames `bounds` in a `width` x `height` pixel viewport, keeping `padding`
    /// pixels free on every side. A single point zooms to the fit limit.
    pub fn fit_bounds(bounds: &LngLatBounds, width: f64, height: f64, padding: f64) -> Self {
        Self {
            center: bounds.center(),
            zoom: zoom_for_bounds(bounds, width, height, padding),
            pitch: 0.0,
            bearing: 0.0,
        }
    }

    pub fn with_pitch(mut self, pitch: f64) -> Self {
        self.pitch = pitch.clamp(0.0, MAX_PITCH);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use foundation::MAX_FIT_ZOOM;
    use std::collections::HashMap;

    struct Page(HashMap<&'static str, u32>);

    impl ContainerLookup for Page {
        type Handle = u32;

        fn find(&self, id: &str) -> Option<u32> {
            self.0.get(id).copied()
        }
    }

    #[test]
    fn container_lookup() {
        let page = Page(HashMap::from([("map", 7)]));
        assert_eq!(MapOptions::default().resolve_container(&page), Ok(7));
        assert_eq!(
            MapOptions::default().with_container("missing").resolve_container(&page),
            Err(MapError::ContainerNotFound("missing".into()))
        );
    }

    #[test]
    fn rejects_out_of_range_pitch() {
        let opts = MapOptions { pitch: 90.0, ..MapOptions::default() };
        assert!(matches!(opts.validate(), Err(MapError::InvalidOption { name: "pitch", .. })));
    }

    #[test]
    fn fit_bounds_centers_and_caps_zoom() {
        let area = LngLatBounds::new([139.70, 35.60], [139.80, 35.70]);
        let cam = CameraTarget::fit_bounds(&area, 1024.0, 768.0, 20.0);
        assert!((cam.center[0] - 139.75).abs() < 1e-9);
        assert!((cam.center[1] - 35.65).abs() < 1e-9);
        assert!(cam.zoom > 10.0 && cam.zoom < 14.0);

        let point = LngLatBounds::from_point([139.7, 35.6]);
        assert_eq!(CameraTarget::fit_bounds(&point, 800.0, 600.0, 0.0).zoom, MAX_FIT_ZOOM);
    }
}
