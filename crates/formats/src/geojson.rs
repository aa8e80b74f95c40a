use std::fmt;

use foundation::{LngLat, LngLatBounds};
use serde_json::{Map, Number, Value};

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum GeometryKind {
    Point,
    Line,
    Area,
    Collection,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Geometry {
    Point(LngLat),
    MultiPoint(Vec<LngLat>),
    LineString(Vec<LngLat>),
    MultiLineString(Vec<Vec<LngLat>>),
    /// Outer ring first, holes after.
    Polygon(Vec<Vec<LngLat>>),
    MultiPolygon(Vec<Vec<Vec<LngLat>>>),
    GeometryCollection(Vec<Geometry>),
}

impl Geometry {
    pub fn type_name(&self) -> &'static str {
        match self {
            Geometry::Point(_) => "Point",
            Geometry::MultiPoint(_) => "MultiPoint",
            Geometry::LineString(_) => "LineString",
            Geometry::MultiLineString(_) => "MultiLineString",
            Geometry::Polygon(_) => "Polygon",
            Geometry::MultiPolygon(_) => "MultiPolygon",
            Geometry::GeometryCollection(_) => "GeometryCollection",
        }
    }

    pub fn kind(&self) -> GeometryKind {
        match self {
            Geometry::Point(_) | Geometry::MultiPoint(_) => GeometryKind::Point,
            Geometry::LineString(_) | Geometry::MultiLineString(_) => GeometryKind::Line,
            Geometry::Polygon(_) | Geometry::MultiPolygon(_) => GeometryKind::Area,
            Geometry::GeometryCollection(_) => GeometryKind::Collection,
        }
    }

    /// Visits every position, holes and collection members included.
    pub fn for_each_position(&self, f: &mut impl FnMut(LngLat)) {
        match self {
            Geometry::Point(p) => f(*p),
            Geometry::MultiPoint(ps) | Geometry::LineString(ps) => ps.iter().for_each(|p| f(*p)),
            Geometry::MultiLineString(lines) | Geometry::Polygon(lines) => {
                lines.iter().flatten().for_each(|p| f(*p))
            }
            Geometry::MultiPolygon(polys) => polys.iter().flatten().flatten().for_each(|p| f(*p)),
            Geometry::GeometryCollection(members) => {
                for g in members {
                    g.for_each_position(&mut *f);
                }
            }
        }
    }

    pub fn bounds(&self) -> Option<LngLatBounds> {
        let mut out: Option<LngLatBounds> = None;
        self.for_each_position(&mut |p| match out.as_mut() {
            Some(b) => b.extend(p),
            None => out = Some(LngLatBounds::from_point(p)),
        });
        out
    }

    /// Line parts (for paths): the line strings, or polygon rings as closed paths.
    pub fn paths(&self) -> Vec<&[LngLat]> {
        match self {
            Geometry::Point(_) | Geometry::MultiPoint(_) => Vec::new(),
            Geometry::LineString(ps) => vec![ps.as_slice()],
            Geometry::MultiLineString(lines) | Geometry::Polygon(lines) => {
                lines.iter().map(Vec::as_slice).collect()
            }
            Geometry::MultiPolygon(polys) => polys.iter().flatten().map(Vec::as_slice).collect(),
            Geometry::GeometryCollection(members) => {
                members.iter().flat_map(|g| g.paths()).collect()
            }
        }
    }

    /// Polygons as ring lists.
    pub fn polygons(&self) -> Vec<&[Vec<LngLat>]> {
        match self {
            Geometry::Polygon(rings) => vec![rings.as_slice()],
            Geometry::MultiPolygon(polys) => polys.iter().map(Vec::as_slice).collect(),
            Geometry::GeometryCollection(members) => {
                members.iter().flat_map(|g| g.polygons()).collect()
            }
            _ => Vec::new(),
        }
    }

    /// A representative position: the point itself, or the center of the bounds.
    pub fn anchor(&self) -> Option<LngLat> {
        match self {
            Geometry::Point(p) => Some(*p),
            other => other.bounds().map(|b| b.center()),
        }
    }

    /// Rewrites every position in place.
    pub fn map_positions(&mut self, f: &mut impl FnMut(LngLat) -> LngLat) {
        match self {
            Geometry::Point(p) => *p = f(*p),
            Geometry::MultiPoint(ps) | Geometry::LineString(ps) => {
                ps.iter_mut().for_each(|p| *p = f(*p))
            }
            Geometry::MultiLineString(lines) | Geometry::Polygon(lines) => {
                lines.iter_mut().flatten().for_each(|p| *p = f(*p))
            }
            Geometry::MultiPolygon(polys) => polys
                .iter_mut()
                .flatten()
                .flatten()
                .for_each(|p| *p = f(*p)),
            Geometry::GeometryCollection(members) => {
                for g in members {
                    g.map_positions(&mut *f);
                }
            }
        }
    }
}

/// Feature id as written in the source; numbers stay numbers on output.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FeatureId {
    Text(String),
    Number(Number),
}

impl FeatureId {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            FeatureId::Text(s) => Some(s),
            FeatureId::Number(_) => None,
        }
    }

    fn to_value(&self) -> Value {
        match self {
            FeatureId::Text(s) => Value::String(s.clone()),
            FeatureId::Number(n) => Value::Number(n.clone()),
        }
    }
}

impl fmt::Display for FeatureId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FeatureId::Text(s) => f.write_str(s),
            FeatureId::Number(n) => write!(f, "{n}"),
        }
    }
}

impl From<&str> for FeatureId {
    fn from(s: &str) -> Self {
        FeatureId::Text(s.to_string())
    }
}

impl From<String> for FeatureId {
    fn from(s: String) -> Self {
        FeatureId::Text(s)
    }
}

impl From<u64> for FeatureId {
    fn from(n: u64) -> Self {
        FeatureId::Number(n.into())
    }
}

impl From<i64> for FeatureId {
    fn from(n: i64) -> Self {
        FeatureId::Number(n.into())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Feature {
    pub id: Option<FeatureId>,
    pub properties: Map<String, Value>,
    /// `None` for unlocated features (`"geometry": null`).
    pub geometry: Option<Geometry>,
}

impl Feature {
    pub fn new(geometry: Geometry) -> Self {
        Self {
            id: None,
            properties: Map::new(),
            geometry: Some(geometry),
        }
    }

    /// A feature with properties but no location.
    pub fn unlocated() -> Self {
        Self {
            id: None,
            properties: Map::new(),
            geometry: None,
        }
    }

    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    pub fn with_id(mut self, id: impl Into<FeatureId>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn property(&self, key: &str) -> Option<&Value> {
        self.properties.get(key)
    }

    /// Numeric property; numeric strings are accepted.
    pub fn number(&self, key: &str) -> Option<f64> {
        value_as_f64(self.properties.get(key)?)
    }

    pub fn string(&self, key: &str) -> Option<&str> {
        self.properties.get(key)?.as_str()
    }

    pub fn bounds(&self) -> Option<LngLatBounds> {
        self.geometry.as_ref()?.bounds()
    }

    pub fn anchor(&self) -> Option<LngLat> {
        self.geometry.as_ref()?.anchor()
    }

    /// GeoJSON type of the geometry, `"null"` for unlocated features.
    pub fn geometry_type(&self) -> &'static str {
        self.geometry.as_ref().map_or("null", Geometry::type_name)
    }
}

pub(crate) fn value_as_f64(v: &Value) -> Option<f64> {
    match v {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct FeatureCollection {
    pub features: Vec<Feature>,
}

#[derive(Debug, thiserror::Error)]
pub enum GeoJsonError {
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("expected GeoJSON FeatureCollection")]
    NotAFeatureCollection,
    #[error("invalid feature at index {index}: {reason}")]
    InvalidFeature { index: usize, reason: String },
}

impl FeatureCollection {
    pub fn new(features: Vec<Feature>) -> Self {
        Self { features }
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    pub fn bounds(&self) -> Option<LngLatBounds> {
        crate::bounds::calculate_bounds(&self.features)
    }

    pub fn from_geojson_str(payload: &str) -> Result<Self, GeoJsonError> {
        let value: Value = serde_json::from_str(payload)?;
        Self::from_geojson_value(value)
    }

    pub fn from_geojson_value(value: Value) -> Result<Self, GeoJsonError> {
        let obj = value
            .as_object()
            .ok_or(GeoJsonError::NotAFeatureCollection)?;
        let ty = obj
            .get("type")
            .and_then(|v| v.as_str())
            .ok_or(GeoJsonError::NotAFeatureCollection)?;
        if ty != "FeatureCollection" {
            return Err(GeoJsonError::NotAFeatureCollection);
        }

        let features_val = obj
            .get("features")
            .and_then(|v| v.as_array())
            .ok_or(GeoJsonError::NotAFeatureCollection)?;

        let mut features = Vec::with_capacity(features_val.len());
        for (index, feat_val) in features_val.iter().enumerate() {
            let feature = parse_feature(feat_val)
                .map_err(|reason| GeoJsonError::InvalidFeature { index, reason })?;
            features.push(feature);
        }

        tracing::debug!(features = features.len(), "parsed feature collection");
        Ok(Self { features })
    }

    /// Property ordering may differ from the original input.
    pub fn to_geojson_value(&self) -> Value {
        let mut root = Map::new();
        root.insert(
            "type".to_string(),
            Value::String("FeatureCollection".to_string()),
        );

        let features: Vec<Value> = self.features.iter().map(feature_to_value).collect();
        root.insert("features".to_string(), Value::Array(features));
        Value::Object(root)
    }

    pub fn to_geojson_string(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(&self.to_geojson_value())
    }

    pub fn to_geojson_string_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(&self.to_geojson_value())
    }
}

fn parse_feature(value: &Value) -> Result<Feature, String> {
    let feat_obj = value
        .as_object()
        .ok_or("feature must be an object".to_string())?;

    let feat_type = feat_obj
        .get("type")
        .and_then(|v| v.as_str())
        .ok_or("feature missing type".to_string())?;
    if feat_type != "Feature" {
        return Err(format!("unexpected feature type: {feat_type}"));
    }

    let id = match feat_obj.get("id") {
        Some(Value::String(s)) => Some(FeatureId::Text(s.clone())),
        Some(Value::Number(n)) => Some(FeatureId::Number(n.clone())),
        _ => None,
    };

    let properties = feat_obj
        .get("properties")
        .and_then(|v| v.as_object())
        .cloned()
        .unwrap_or_default();

    let geometry = match feat_obj.get("geometry") {
        Some(Value::Null) => None,
        Some(v) => Some(parse_geometry(v)?),
        None => return Err("feature missing geometry".to_string()),
    };

    Ok(Feature {
        id,
        properties,
        geometry,
    })
}

fn feature_to_value(feat: &Feature) -> Value {
    let mut fobj = Map::new();
    fobj.insert("type".to_string(), Value::String("Feature".to_string()));
    if let Some(id) = &feat.id {
        fobj.insert("id".to_string(), id.to_value());
    }
    fobj.insert(
        "properties".to_string(),
        Value::Object(feat.properties.clone()),
    );
    fobj.insert(
        "geometry".to_string(),
        feat.geometry.as_ref().map_or(Value::Null, geometry_to_value),
    );
    Value::Object(fobj)
}

pub fn geometry_to_value(geom: &Geometry) -> Value {
    let mut obj = Map::new();
    obj.insert(
        "type".to_string(),
        Value::String(geom.type_name().to_string()),
    );
    match geom {
        Geometry::Point(p) => {
            obj.insert("coordinates".to_string(), position_value(p));
        }
        Geometry::MultiPoint(ps) | Geometry::LineString(ps) => {
            obj.insert("coordinates".to_string(), positions_value(ps));
        }
        Geometry::MultiLineString(lines) | Geometry::Polygon(lines) => {
            let coords = lines.iter().map(|l| positions_value(l)).collect();
            obj.insert("coordinates".to_string(), Value::Array(coords));
        }
        Geometry::MultiPolygon(polys) => {
            let coords = polys
                .iter()
                .map(|poly| Value::Array(poly.iter().map(|r| positions_value(r)).collect()))
                .collect();
            obj.insert("coordinates".to_string(), Value::Array(coords));
        }
        Geometry::GeometryCollection(members) => {
            obj.insert(
                "geometries".to_string(),
                Value::Array(members.iter().map(geometry_to_value).collect()),
            );
        }
    }
    Value::Object(obj)
}

fn position_value(p: &LngLat) -> Value {
    Value::Array(vec![Value::from(p[0]), Value::from(p[1])])
}

fn positions_value(ps: &[LngLat]) -> Value {
    Value::Array(ps.iter().map(position_value).collect())
}

pub fn parse_geometry(value: &Value) -> Result<Geometry, String> {
    let obj = value
        .as_object()
        .ok_or("geometry must be an object".to_string())?;
    let ty = obj
        .get("type")
        .and_then(|v| v.as_str())
        .ok_or("geometry missing type".to_string())?;

    if ty == "GeometryCollection" {
        let members = obj
            .get("geometries")
            .and_then(|v| v.as_array())
            .ok_or("GeometryCollection missing geometries".to_string())?;
        let mut out = Vec::with_capacity(members.len());
        for m in members {
            out.push(parse_geometry(m)?);
        }
        return Ok(Geometry::GeometryCollection(out));
    }

    let coords = obj
        .get("coordinates")
        .ok_or("geometry missing coordinates".to_string())?;

    match ty {
        "Point" => Ok(Geometry::Point(parse_position(coords)?)),
        "MultiPoint" => Ok(Geometry::MultiPoint(parse_positions(coords)?)),
        "LineString" => Ok(Geometry::LineString(parse_positions(coords)?)),
        "MultiLineString" => Ok(Geometry::MultiLineString(parse_rings(coords)?)),
        "Polygon" => Ok(Geometry::Polygon(parse_rings(coords)?)),
        "MultiPolygon" => Ok(Geometry::MultiPolygon(parse_multi_polygon(coords)?)),
        other => Err(format!("unsupported geometry type: {other}")),
    }
}

/// `[x, y]` or `[x, y, z]`; altitude is dropped.
fn parse_position(coords: &Value) -> Result<LngLat, String> {
    let arr = coords
        .as_array()
        .ok_or("position must be an array".to_string())?;
    if arr.len() < 2 {
        return Err("position must have [lon, lat]".to_string());
    }
    let lon = arr[0].as_f64().ok_or("lon must be a number".to_string())?;
    let lat = arr[1].as_f64().ok_or("lat must be a number".to_string())?;
    Ok([lon, lat])
}

/// A bare `[x, y]` where a position list is expected.
fn is_bare_position(coords: &Value) -> bool {
    coords
        .as_array()
        .and_then(|a| a.first())
        .is_some_and(Value::is_number)
}

fn parse_positions(coords: &Value) -> Result<Vec<LngLat>, String> {
    if is_bare_position(coords) {
        return Ok(vec![parse_position(coords)?]);
    }
    let arr = coords
        .as_array()
        .ok_or("coordinates must be an array".to_string())?;
    arr.iter().map(parse_position).collect()
}

fn parse_rings(coords: &Value) -> Result<Vec<Vec<LngLat>>, String> {
    if is_bare_position(coords) {
        return Ok(vec![vec![parse_position(coords)?]]);
    }
    let arr = coords
        .as_array()
        .ok_or("coordinates must be an array of position lists".to_string())?;
    arr.iter().map(parse_positions).collect()
}

fn parse_multi_polygon(coords: &Value) -> Result<Vec<Vec<Vec<LngLat>>>, String> {
    if is_bare_position(coords) {
        return Ok(vec![vec![vec![parse_position(coords)?]]]);
    }
    let polys = coords
        .as_array()
        .ok_or("MultiPolygon coordinates must be an array of polygons".to_string())?;
    polys.iter().map(parse_rings).collect()
}
