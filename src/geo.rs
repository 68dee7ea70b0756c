//! Country boundary layer
//!
//! Vector outlines come from a GeoJSON `FeatureCollection` whose features
//! carry the ISO code in a configurable property. The embedded outlines are
//! coarse but cover every country the mock source knows about.

use crate::config::{MapConfig, DEFAULT_CODE_PROPERTY};
use serde::Deserialize;
use serde_json::{Map, Value};
use std::fmt;
use std::fs;
use std::path::PathBuf;
use thiserror::Error;
use tracing::debug;

const EMBEDDED: &str = include_str!("../assets/countries.geojson");

// Properties tried, in order, for a human-readable name
const NAME_PROPERTIES: [&str; 4] = ["name", "name_en", "NAME", "ADMIN"];

#[derive(Debug, Error)]
pub enum GeoError {
    #[error("cannot read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot fetch boundaries: {0}")]
    Fetch(String),

    #[error("invalid GeoJSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("no feature carries the `{0}` property")]
    NoFeatures(String),
}

#[derive(Deserialize)]
struct RawCollection {
    features: Vec<RawFeature>,
}

#[derive(Deserialize)]
struct RawFeature {
    #[serde(default)]
    properties: Option<Map<String, Value>>,
    #[serde(default)]
    geometry: Option<RawGeometry>,
}

#[derive(Deserialize)]
struct RawGeometry {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    coordinates: Value,
}

/// Axis-aligned bounds in degrees
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BBox {
    pub min_lon: f64,
    pub min_lat: f64,
    pub max_lon: f64,
    pub max_lat: f64,
}

impl BBox {
    fn empty() -> Self {
        Self {
            min_lon: f64::INFINITY,
            min_lat: f64::INFINITY,
            max_lon: f64::NEG_INFINITY,
            max_lat: f64::NEG_INFINITY,
        }
    }

    fn extend(&mut self, (lon, lat): (f64, f64)) {
        self.min_lon = self.min_lon.min(lon);
        self.min_lat = self.min_lat.min(lat);
        self.max_lon = self.max_lon.max(lon);
        self.max_lat = self.max_lat.max(lat);
    }

    pub fn contains(&self, lon: f64, lat: f64) -> bool {
        lon >= self.min_lon && lon <= self.max_lon && lat >= self.min_lat && lat <= self.max_lat
    }
}

/// One polygon: the outer ring followed by any holes
#[derive(Clone, Debug, PartialEq)]
pub struct Polygon {
    pub rings: Vec<Vec<(f64, f64)>>,
}

impl Polygon {
    /// Even-odd test over all rings, so holes punch through
    pub fn contains(&self, lon: f64, lat: f64) -> bool {
        self.rings
            .iter()
            .filter(|ring| ring_contains(ring, lon, lat))
            .count()
            % 2
            == 1
    }
}

/// Ray cast towards +lon; the ring may or may not repeat its first point
fn ring_contains(ring: &[(f64, f64)], lon: f64, lat: f64) -> bool {
    if ring.len() < 3 {
        return false;
    }
    let mut inside = false;
    let mut j = ring.len() - 1;
    for i in 0..ring.len() {
        let (xi, yi) = ring[i];
        let (xj, yj) = ring[j];
        if (yi > lat) != (yj > lat) && lon < (xj - xi) * (lat - yi) / (yj - yi) + xi {
            inside = !inside;
        }
        j = i;
    }
    inside
}

/// A country shape keyed by its ISO code
#[derive(Clone, Debug, PartialEq)]
pub struct Feature {
    pub code: String,
    pub name: String,
    pub polygons: Vec<Polygon>,
    pub bbox: BBox,
}

impl Feature {
    pub fn contains(&self, lon: f64, lat: f64) -> bool {
        self.bbox.contains(lon, lat) && self.polygons.iter().any(|p| p.contains(lon, lat))
    }
}

/// All country features, in source order (later ones draw on top)
#[derive(Clone, Debug, Default, PartialEq)]
pub struct BoundaryLayer {
    features: Vec<Feature>,
}

impl BoundaryLayer {
    /// Parse a GeoJSON document. Features without the code property or
    /// without polygon geometry are skipped.
    pub fn parse(geojson: &str, code_property: &str) -> Result<Self, GeoError> {
        let raw: RawCollection = serde_json::from_str(geojson)?;
        let mut features = Vec::with_capacity(raw.features.len());

        for feature in raw.features {
            let props = feature.properties.unwrap_or_default();
            let Some(code) = props
                .get(code_property)
                .and_then(Value::as_str)
                .map(str::trim)
                .filter(|c| !c.is_empty())
            else {
                continue;
            };
            let Some(geometry) = feature.geometry else {
                continue;
            };
            let polygons = polygons_of(geometry)?;
            if polygons.is_empty() {
                continue;
            }

            let mut bbox = BBox::empty();
            for point in polygons.iter().flat_map(|p| p.rings.iter().flatten()) {
                bbox.extend(*point);
            }

            let name = NAME_PROPERTIES
                .iter()
                .find_map(|key| props.get(*key).and_then(Value::as_str))
                .unwrap_or(code)
                .to_string();

            features.push(Feature {
                code: code.to_string(),
                name,
                polygons,
                bbox,
            });
        }

        if features.is_empty() {
            return Err(GeoError::NoFeatures(code_property.to_string()));
        }
        Ok(Self { features })
    }

    /// The outlines compiled into the binary
    pub fn embedded() -> Result<Self, GeoError> {
        Self::parse(EMBEDDED, DEFAULT_CODE_PROPERTY)
    }

    pub fn features(&self) -> &[Feature] {
        &self.features
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn feature(&self, code: &str) -> Option<&Feature> {
        self.features.iter().find(|f| f.code == code)
    }
}

fn to_ring(positions: Vec<Vec<f64>>) -> Vec<(f64, f64)> {
    positions
        .into_iter()
        .filter(|p| p.len() >= 2)
        .map(|p| (p[0], p[1]))
        .collect()
}

fn polygons_of(geometry: RawGeometry) -> Result<Vec<Polygon>, GeoError> {
    let polygon = |rings: Vec<Vec<Vec<f64>>>| Polygon {
        rings: rings.into_iter().map(to_ring).collect(),
    };
    match geometry.kind.as_str() {
        "Polygon" => {
            let rings: Vec<Vec<Vec<f64>>> = serde_json::from_value(geometry.coordinates)?;
            Ok(vec![polygon(rings)])
        }
        "MultiPolygon" => {
            let parts: Vec<Vec<Vec<Vec<f64>>>> = serde_json::from_value(geometry.coordinates)?;
            Ok(parts.into_iter().map(polygon).collect())
        }
        _ => Ok(Vec::new()),
    }
}

/// Where the boundary layer is loaded from
#[derive(Clone, Debug, PartialEq)]
pub enum BoundarySource {
    Embedded,
    File(PathBuf),
    Url { url: String, token: Option<String> },
}

impl BoundarySource {
    pub fn from_config(config: &MapConfig) -> Self {
        match config.boundaries.as_deref().map(str::trim) {
            None | Some("") => BoundarySource::Embedded,
            Some(s) if s.starts_with("http://") || s.starts_with("https://") => BoundarySource::Url {
                url: s.to_string(),
                token: config.access_token.clone(),
            },
            Some(s) => BoundarySource::File(PathBuf::from(s)),
        }
    }

    pub fn load(&self, code_property: &str) -> Result<BoundaryLayer, GeoError> {
        match self {
            BoundarySource::Embedded => BoundaryLayer::embedded(),
            BoundarySource::File(path) => {
                let text = fs::read_to_string(path).map_err(|source| GeoError::Read {
                    path: path.clone(),
                    source,
                })?;
                BoundaryLayer::parse(&text, code_property)
            }
            BoundarySource::Url { url, token } => {
                let full = authorized_url(url, token.as_deref());
                debug!(%url, "fetching boundaries");
                let text = ureq::get(&full)
                    .call()
                    .map_err(|e| GeoError::Fetch(e.to_string()))?
                    .into_string()
                    .map_err(|e| GeoError::Fetch(e.to_string()))?;
                BoundaryLayer::parse(&text, code_property)
            }
        }
    }
}

impl fmt::Display for BoundarySource {
    // Never prints the access token
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BoundarySource::Embedded => f.write_str("embedded outlines"),
            BoundarySource::File(path) => write!(f, "{}", path.display()),
            BoundarySource::Url { url, .. } => f.write_str(url),
        }
    }
}

/// Append the map access token as an `access_token` query parameter
pub fn authorized_url(url: &str, token: Option<&str>) -> String {
    match token.filter(|t| !t.is_empty()) {
        Some(t) => {
            let sep = if url.contains('?') { '&' } else { '?' };
            format!("{}{}access_token={}", url, sep, urlencoding::encode(t))
        }
        None => url.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    /// Topmost feature containing a point, as the map raster resolves it
    fn feature_at(layer: &BoundaryLayer, lon: f64, lat: f64) -> Option<&Feature> {
        layer.features().iter().rev().find(|f| f.contains(lon, lat))
    }

    const SQUARES: &str = r#"{"type": "FeatureCollection", "features": [
        {"type": "Feature", "properties": {"ISO_A2": "AA", "NAME": "Alpha"},
         "geometry": {"type": "Polygon", "coordinates": [
            [[0, 0], [10, 0], [10, 10], [0, 10], [0, 0]],
            [[4, 4], [6, 4], [6, 6], [4, 6], [4, 4]]]}},
        {"type": "Feature", "properties": {"ISO_A2": "BB"},
         "geometry": {"type": "MultiPolygon", "coordinates": [
            [[[5, 5, 100], [20, 5, 100], [20, 20, 100], [5, 20, 100]]],
            [[[30, 30], [31, 30], [31, 31]]]]}},
        {"type": "Feature", "properties": {"ISO_A2": "CC"},
         "geometry": {"type": "Point", "coordinates": [1, 1]}},
        {"type": "Feature", "properties": {"other": "DD"},
         "geometry": {"type": "Polygon", "coordinates": [[[0, 0], [1, 0], [1, 1]]]}}
    ]}"#;

    #[test]
    fn parses_polygons_and_skips_the_rest() {
        let layer = BoundaryLayer::parse(SQUARES, "ISO_A2").unwrap();
        let codes: Vec<_> = layer.features().iter().map(|f| f.code.as_str()).collect();
        assert_eq!(codes, ["AA", "BB"]);
        assert_eq!(layer.feature("AA").unwrap().name, "Alpha");
        // no name property falls back to the code
        assert_eq!(layer.feature("BB").unwrap().name, "BB");
        assert_eq!(layer.feature("BB").unwrap().polygons.len(), 2);
    }

    #[test]
    fn point_in_polygon_respects_holes() {
        let layer = BoundaryLayer::parse(SQUARES, "ISO_A2").unwrap();
        let aa = layer.feature("AA").unwrap();
        assert!(aa.contains(2.0, 2.0));
        assert!(!aa.contains(5.0, 5.0));
        assert!(!aa.contains(11.0, 2.0));
        assert!(!aa.contains(-0.1, 5.0));
    }

    #[test]
    fn later_features_are_on_top() {
        let layer = BoundaryLayer::parse(SQUARES, "ISO_A2").unwrap();
        assert_eq!(feature_at(&layer, 8.0, 8.0).map(|f| f.code.as_str()), Some("BB"));
        assert_eq!(feature_at(&layer, 1.0, 1.0).map(|f| f.code.as_str()), Some("AA"));
        assert_eq!(feature_at(&layer, 50.0, 50.0), None);
    }

    #[test]
    fn missing_code_property_is_an_error() {
        assert!(matches!(
            BoundaryLayer::parse(SQUARES, "iso_3166_1"),
            Err(GeoError::NoFeatures(p)) if p == "iso_3166_1"
        ));
        assert!(matches!(BoundaryLayer::parse("{", "x"), Err(GeoError::Parse(_))));
    }

    #[test]
    fn embedded_outlines_cover_sample_countries() {
        let layer = BoundaryLayer::embedded().unwrap();
        for code in ["US", "BR", "UA", "JP", "AU", "ZA", "GB", "AE"] {
            assert!(layer.feature(code).is_some(), "{}", code);
        }
        let hit = |lon, lat| feature_at(&layer, lon, lat).map(|f| f.code.clone());
        assert_eq!(hit(-100.0, 40.0).as_deref(), Some("US"));
        assert_eq!(hit(-50.0, -10.0).as_deref(), Some("BR"));
        assert_eq!(hit(2.5, 46.5).as_deref(), Some("FR"));
        assert_eq!(hit(134.0, -25.0).as_deref(), Some("AU"));
        assert_eq!(hit(-30.0, 30.0), None);
    }

    #[test]
    fn source_from_config() {
        let mut config = MapConfig::default();
        assert_eq!(BoundarySource::from_config(&config), BoundarySource::Embedded);

        config.boundaries = Some("/tmp/world.geojson".into());
        assert_eq!(
            BoundarySource::from_config(&config),
            BoundarySource::File(PathBuf::from("/tmp/world.geojson"))
        );

        config.boundaries = Some("https://tiles.example/countries.json".into());
        config.access_token = Some("pk.secret".into());
        let source = BoundarySource::from_config(&config);
        assert!(matches!(&source, BoundarySource::Url { token: Some(t), .. } if t == "pk.secret"));
        assert!(!source.to_string().contains("secret"));
    }

    #[test]
    fn token_is_appended_as_query_parameter() {
        assert_eq!(authorized_url("https://a.example/c.json", None), "https://a.example/c.json");
        assert_eq!(
            authorized_url("https://a.example/c.json", Some("pk.a b")),
            "https://a.example/c.json?access_token=pk.a%20b"
        );
        assert_eq!(
            authorized_url("https://a.example/c.json?v=2", Some("t")),
            "https://a.example/c.json?v=2&access_token=t"
        );
    }

    #[test]
    fn loads_from_file_with_custom_property() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SQUARES.as_bytes()).unwrap();
        let source = BoundarySource::File(file.path().to_path_buf());
        assert_eq!(source.load("ISO_A2").unwrap().len(), 2);
        let missing = BoundarySource::File(PathBuf::from("/nonexistent/world.geojson"));
        assert!(matches!(missing.load("ISO_A2"), Err(GeoError::Read { .. })));
    }
}
