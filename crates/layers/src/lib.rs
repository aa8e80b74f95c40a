//! Render-layer descriptors for the city map and the factories that build
//! them from zoning, building and subsurface feature collections.

pub mod building;
pub mod filter;
pub mod layer;
pub mod stack;
pub mod subsurface;
pub mod symbology;
pub mod viewport;
pub mod zoning;

pub use building::{BuildingLayerOptions, create_building_layer};
pub use filter::filter_by_elevation;
pub use layer::*;
pub use stack::{LayerError, LayerStack};
pub use subsurface::{
    AccessPointLayerOptions, InfrastructureLayerOptions, SubsurfaceLayerOptions,
    create_access_point_layer, create_infrastructure_layer, create_subsurface_layer,
};
pub use viewport::{CameraTarget, ContainerLookup, MapError, MapOptions};
pub use zoning::{ZoningLayerOptions, create_zoning_layer};
