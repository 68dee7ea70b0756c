//! Choropleth world map
//!
//! Countries are filled from a `match` expression keyed by ISO code and
//! drawn into the terminal as block glyphs. The map goes through the same
//! life cycle as a styled web map: created, waiting for its boundary source,
//! then interactive once the fill and border layers exist. Paint set before
//! that point is parked and applied on a later tick.

pub mod expression;
pub mod hover;
pub mod viewport;

use crate::api::types::CountryMood;
use crate::colors::{dim, hex_or_grey, BORDER_LINE, UNPAINTED_FILL};
use crate::config::DEFAULT_CODE_PROPERTY;
use crate::geo::{BoundaryLayer, BoundarySource};
use crate::terminal::Terminal;
use std::collections::HashMap;
use tracing::{debug, info, warn};

pub use expression::FillColorExpression;
pub use hover::{HoverChange, HoverEvent, HoverTracker};
pub use viewport::Viewport;

pub const FILL_LAYER: &str = "country-fills";
pub const BORDER_LAYER: &str = "country-borders";

const HOVER_GLYPH: char = '█';
const FILL_GLYPH: char = '▓';
const COAST_GLYPH: char = '·';

// Relative brightness of countries that are not hovered (0.7 vs 0.9 opacity)
const IDLE_BRIGHTNESS: f32 = 0.7 / 0.9;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MapState {
    Uninitialized,
    StyleLoading,
    Interactive,
}

/// Screen rectangle the map occupies
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Area {
    pub x: u16,
    pub y: u16,
    pub width: u16,
    pub height: u16,
}

impl Area {
    pub fn new(x: u16, y: u16, width: u16, height: u16) -> Self {
        Self { x, y, width, height }
    }

    pub fn contains(&self, x: u16, y: u16) -> bool {
        x >= self.x && y >= self.y && x < self.x + self.width && y < self.y + self.height
    }
}

pub struct MapView {
    state: MapState,
    source: Option<BoundarySource>,
    code_property: String,
    boundaries: BoundaryLayer,
    layers: Vec<&'static str>,
    viewport: Viewport,
    area: Area,
    lookup: HashMap<String, CountryMood>,
    fill: Option<FillColorExpression>,
    pending: Option<FillColorExpression>,
    hover: HoverTracker,
    // feature index per cell, row-major over `area`
    raster: Vec<Option<usize>>,
    raster_valid: bool,
}

impl MapView {
    pub fn new(viewport: Viewport) -> Self {
        Self {
            state: MapState::Uninitialized,
            source: None,
            code_property: DEFAULT_CODE_PROPERTY.to_string(),
            boundaries: BoundaryLayer::default(),
            layers: Vec::new(),
            area: Area::new(0, 0, viewport.width, viewport.height),
            viewport,
            lookup: HashMap::new(),
            fill: None,
            pending: None,
            hover: HoverTracker::new(),
            raster: Vec::new(),
            raster_valid: false,
        }
    }

    #[cfg(test)]
    pub fn state(&self) -> MapState {
        self.state
    }

    /// Point the map at its boundary source. Only the first call counts.
    pub fn init(&mut self, source: BoundarySource, code_property: &str) {
        if self.state != MapState::Uninitialized {
            debug!("map already initialized");
            return;
        }
        debug!(%source, "map style loading");
        self.source = Some(source);
        self.code_property = code_property.to_string();
        self.state = MapState::StyleLoading;
    }

    /// Load the boundary source and add the layers. Returns true when the
    /// map became interactive on this call.
    pub fn poll_load(&mut self) -> bool {
        if self.state != MapState::StyleLoading {
            return false;
        }
        let source = self.source.take().unwrap_or(BoundarySource::Embedded);
        self.boundaries = match source.load(&self.code_property) {
            Ok(layer) => {
                info!(%source, features = layer.len(), "boundaries loaded");
                layer
            }
            Err(e) => {
                warn!(%source, error = %e, "boundary load failed, using embedded outlines");
                BoundaryLayer::embedded().unwrap_or_else(|e| {
                    warn!(error = %e, "embedded outlines unusable");
                    BoundaryLayer::default()
                })
            }
        };

        self.layers = vec![FILL_LAYER, BORDER_LAYER];
        self.state = MapState::Interactive;
        self.raster_valid = false;
        self.apply_pending();
        true
    }

    pub fn has_layer(&self, id: &str) -> bool {
        self.layers.contains(&id)
    }

    #[cfg(test)]
    pub fn boundaries(&self) -> &BoundaryLayer {
        &self.boundaries
    }

    /// Replace the data behind the map. An empty list keeps the current paint.
    pub fn set_countries(&mut self, countries: &[CountryMood]) {
        self.lookup = countries
            .iter()
            .map(|c| (c.country_code.clone(), c.clone()))
            .collect();
        if countries.is_empty() {
            return;
        }

        let expr = FillColorExpression::from_countries(countries).keyed_by(&self.code_property);
        debug!(property = expr.property(), countries = countries.len(), "fill expression built");
        if self.has_layer(FILL_LAYER) {
            self.fill = Some(expr);
            self.pending = None;
        } else {
            debug!("fill layer not ready, deferring paint");
            self.pending = Some(expr);
        }
    }

    /// Apply parked paint once the fill layer exists. Returns true if it did.
    pub fn apply_pending(&mut self) -> bool {
        if self.pending.is_none() || !self.has_layer(FILL_LAYER) {
            return false;
        }
        self.fill = self.pending.take();
        debug!("deferred fill paint applied");
        true
    }

    #[cfg(test)]
    pub fn paint_pending(&self) -> bool {
        self.pending.is_some()
    }

    #[cfg(test)]
    pub fn fill_expression(&self) -> Option<&FillColorExpression> {
        self.fill.as_ref()
    }

    /// Fill color a feature is drawn with right now
    pub fn fill_color(&self, code: &str) -> &str {
        match &self.fill {
            Some(expr) => expr.evaluate(code),
            None => UNPAINTED_FILL,
        }
    }

    pub fn country(&self, code: &str) -> Option<&CountryMood> {
        self.lookup.get(code)
    }

    /// Name the boundary layer gives a feature
    pub fn feature_name(&self, code: &str) -> Option<&str> {
        self.boundaries.feature(code).map(|f| f.name.as_str())
    }

    #[cfg(test)]
    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    /// Mutable viewport; the raster is rebuilt before the next hit test
    pub fn viewport_mut(&mut self) -> &mut Viewport {
        self.raster_valid = false;
        &mut self.viewport
    }

    #[cfg(test)]
    pub fn area(&self) -> Area {
        self.area
    }

    pub fn set_area(&mut self, area: Area) {
        if area != self.area {
            self.area = area;
            self.raster_valid = false;
        }
    }

    pub fn hovered(&self) -> Option<&str> {
        self.hover.hovered()
    }

    /// Project every feature into a per-cell buffer; later features win
    pub fn rasterize(&mut self, width: u16, height: u16) {
        self.viewport.set_size(width, height);
        let (w, h) = (width as usize, height as usize);
        let mut raster = vec![None; w * h];

        for (idx, feature) in self.boundaries.features().iter().enumerate() {
            // copies one world to either side so panning wraps
            for shift in [-360.0, 0.0, 360.0] {
                let b = feature.bbox;
                let (x0, y0) = self.viewport.project(b.min_lon + shift, b.max_lat);
                let (x1, y1) = self.viewport.project(b.max_lon + shift, b.min_lat);
                if x1 < 0.0 || y1 < 0.0 || x0 >= w as f64 || y0 >= h as f64 {
                    continue;
                }
                let cols = (x0.floor().max(0.0) as usize)..(x1.ceil().min(w as f64) as usize);
                let rows = (y0.floor().max(0.0) as usize)..(y1.ceil().min(h as f64) as usize);
                for row in rows {
                    for col in cols.clone() {
                        let Some((lon, lat)) = self.viewport.cell_center(col as u16, row as u16) else {
                            continue;
                        };
                        if feature.contains(lon - shift, lat) {
                            raster[row * w + col] = Some(idx);
                        }
                    }
                }
            }
        }

        self.raster = raster;
        self.raster_valid = true;
    }

    fn ensure_raster(&mut self) {
        if !self.raster_valid || self.raster.len() != self.area.width as usize * self.area.height as usize {
            self.rasterize(self.area.width, self.area.height);
        }
    }

    fn feature_index(&self, x: u16, y: u16) -> Option<usize> {
        if self.state != MapState::Interactive || !self.area.contains(x, y) {
            return None;
        }
        let col = (x - self.area.x) as usize;
        let row = (y - self.area.y) as usize;
        self.raster
            .get(row * self.area.width as usize + col)
            .copied()
            .flatten()
    }

    /// Topmost feature code under a screen cell
    pub fn feature_at(&self, x: u16, y: u16) -> Option<&str> {
        self.feature_index(x, y)
            .and_then(|i| self.boundaries.features().get(i))
            .map(|f| f.code.as_str())
    }

    /// Pointer moved to a screen cell; yields an event only when the
    /// hovered country changes
    pub fn pointer_moved(&mut self, x: u16, y: u16) -> Option<HoverEvent> {
        if self.state != MapState::Interactive {
            return None;
        }
        self.ensure_raster();
        let code = self.feature_at(x, y).map(str::to_string);
        match self.hover.moved(code.as_deref())? {
            HoverChange::Entered(code) => Some(HoverEvent {
                country: self.lookup.get(&code).cloned(),
                code: Some(code),
                point: Some((x, y)),
            }),
            HoverChange::Cleared => Some(HoverEvent::cleared()),
        }
    }

    /// Pointer left the map entirely
    pub fn pointer_left(&mut self) -> HoverEvent {
        self.hover.left();
        HoverEvent::cleared()
    }

    /// Code of the country under a click, if any
    pub fn click(&mut self, x: u16, y: u16) -> Option<String> {
        if self.state != MapState::Interactive {
            return None;
        }
        self.ensure_raster();
        self.feature_at(x, y).map(str::to_string)
    }

    fn is_coast(&self, col: usize, row: usize) -> bool {
        let (w, h) = (self.area.width as usize, self.area.height as usize);
        let land = |c: usize, r: usize| self.raster.get(r * w + c).copied().flatten().is_some();
        (col > 0 && land(col - 1, row))
            || (col + 1 < w && land(col + 1, row))
            || (row > 0 && land(col, row - 1))
            || (row + 1 < h && land(col, row + 1))
    }

    /// Draw the fill and border layers into the map area
    pub fn render(&mut self, term: &mut Terminal) {
        if self.state != MapState::Interactive {
            return;
        }
        self.ensure_raster();

        let border = hex_or_grey(BORDER_LINE);
        let hovered = self.hover.hovered();
        let features = self.boundaries.features();
        let w = self.area.width as usize;

        for row in 0..self.area.height as usize {
            for col in 0..w {
                let x = self.area.x as i32 + col as i32;
                let y = self.area.y as i32 + row as i32;
                match self.raster[row * w + col].and_then(|i| features.get(i)) {
                    Some(feature) => {
                        let color = hex_or_grey(self.fill_color(&feature.code));
                        if hovered == Some(feature.code.as_str()) {
                            term.set(x, y, HOVER_GLYPH, Some(color), false);
                        } else {
                            term.set(x, y, FILL_GLYPH, Some(dim(color, IDLE_BRIGHTNESS)), false);
                        }
                    }
                    None if self.has_layer(BORDER_LAYER) && self.is_coast(col, row) => {
                        term.set(x, y, COAST_GLYPH, Some(border), false);
                    }
                    None => {}
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn mood(code: &str, color: &str) -> CountryMood {
        CountryMood {
            country_code: code.into(),
            country_name: code.into(),
            color_code: color.into(),
            mood_label: "Happy".into(),
            ..Default::default()
        }
    }

    fn ready_map() -> MapView {
        let mut map = MapView::new(Viewport::new(120, 30));
        map.init(BoundarySource::Embedded, DEFAULT_CODE_PROPERTY);
        assert!(map.poll_load());
        map.rasterize(120, 30);
        map
    }

    fn cell_of(map: &MapView, lon: f64, lat: f64) -> (u16, u16) {
        let (x, y) = map.viewport().project(lon, lat);
        (x as u16, y as u16)
    }

    #[test]
    fn life_cycle() {
        let mut map = MapView::new(Viewport::new(80, 24));
        assert_eq!(map.state(), MapState::Uninitialized);
        assert!(!map.poll_load());
        map.init(BoundarySource::Embedded, DEFAULT_CODE_PROPERTY);
        assert_eq!(map.state(), MapState::StyleLoading);
        assert!(!map.has_layer(FILL_LAYER));
        assert!(map.poll_load());
        assert_eq!(map.state(), MapState::Interactive);
        assert!(map.has_layer(FILL_LAYER) && map.has_layer(BORDER_LAYER));
        // a second init is ignored
        map.init(BoundarySource::File(PathBuf::from("elsewhere.geojson")), "x");
        assert_eq!(map.state(), MapState::Interactive);
    }

    #[test]
    fn failed_source_falls_back_to_embedded() {
        let mut map = MapView::new(Viewport::new(80, 24));
        map.init(BoundarySource::File(PathBuf::from("/nonexistent/world.geojson")), "ISO_A2");
        map.poll_load();
        assert_eq!(map.state(), MapState::Interactive);
        assert!(map.boundaries().feature("US").is_some());
    }

    #[test]
    fn fill_expression_uses_configured_property() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("world.geojson");
        std::fs::write(
            &path,
            r#"{"type": "FeatureCollection", "features": [
                {"type": "Feature", "properties": {"ISO_A2": "NO", "ADMIN": "Norway"},
                 "geometry": {"type": "Polygon", "coordinates": [[[5, 58], [30, 58], [30, 71], [5, 71], [5, 58]]]}}]}"#,
        )
        .unwrap();

        let mut map = MapView::new(Viewport::new(80, 24));
        map.init(BoundarySource::File(path), "ISO_A2");
        map.poll_load();
        map.set_countries(&[mood("NO", "#22c55e")]);
        let json = map.fill_expression().unwrap().to_json();
        assert_eq!(json[1], serde_json::json!(["get", "ISO_A2"]));
        assert_eq!(map.feature_name("NO"), Some("Norway"));
        assert_eq!(map.feature_name("SE"), None);
    }

    #[test]
    fn paint_before_load_is_deferred() {
        let mut map = MapView::new(Viewport::new(80, 24));
        map.init(BoundarySource::Embedded, DEFAULT_CODE_PROPERTY);
        map.set_countries(&[mood("US", "#22c55e")]);
        assert!(map.paint_pending());
        assert!(!map.apply_pending());
        assert_eq!(map.fill_color("US"), UNPAINTED_FILL);

        map.poll_load();
        assert!(!map.paint_pending());
        assert_eq!(map.fill_color("US"), "#22c55e");
        assert_eq!(map.fill_color("FR"), expression::DEFAULT_FILL);
    }

    #[test]
    fn empty_update_keeps_paint() {
        let mut map = ready_map();
        map.set_countries(&[mood("BR", "#22c55e")]);
        map.set_countries(&[]);
        assert_eq!(map.fill_color("BR"), "#22c55e");
        assert!(map.country("BR").is_none());
    }

    #[test]
    fn hit_testing_finds_countries() {
        let map = ready_map();
        let (x, y) = cell_of(&map, -100.0, 40.0);
        assert_eq!(map.feature_at(x, y), Some("US"));
        let (x, y) = cell_of(&map, -30.0, 30.0);
        assert_eq!(map.feature_at(x, y), None);
        assert_eq!(map.feature_at(500, 500), None);
    }

    #[test]
    fn hover_events_on_transitions_only() {
        let mut map = ready_map();
        map.set_countries(&[mood("US", "#22c55e")]);
        let (ux, uy) = cell_of(&map, -100.0, 40.0);
        let (bx, by) = cell_of(&map, -50.0, -10.0);
        let (ox, oy) = cell_of(&map, -30.0, 30.0);

        let event = map.pointer_moved(ux, uy).unwrap();
        assert_eq!(event.code.as_deref(), Some("US"));
        assert_eq!(event.country.map(|c| c.country_code), Some("US".to_string()));
        assert_eq!(event.point, Some((ux, uy)));
        assert!(map.pointer_moved(ux, uy).is_none());

        // a country without data still fires, with no payload
        let event = map.pointer_moved(bx, by).unwrap();
        assert_eq!(event.code.as_deref(), Some("BR"));
        assert!(event.country.is_none());

        assert_eq!(map.pointer_moved(ox, oy), Some(HoverEvent::cleared()));
        assert_eq!(map.pointer_moved(ox, oy), None);
        assert_eq!(map.pointer_left(), HoverEvent::cleared());
        assert_eq!(map.hovered(), None);
    }

    #[test]
    fn click_reports_code_under_pointer() {
        let mut map = ready_map();
        let (x, y) = cell_of(&map, 134.0, -25.0);
        assert_eq!(map.click(x, y).as_deref(), Some("AU"));
        let (x, y) = cell_of(&map, -30.0, 30.0);
        assert_eq!(map.click(x, y), None);
    }

    #[test]
    fn hovered_country_uses_solid_glyph() {
        let mut map = ready_map();
        map.set_countries(&[mood("AU", "#22c55e")]);
        let (x, y) = cell_of(&map, 134.0, -25.0);
        let mut term = Terminal::offscreen(120, 30);
        map.render(&mut term);
        assert_eq!(term.cell(x, y).map(|c| c.ch), Some(FILL_GLYPH));

        map.pointer_moved(x, y);
        term.clear();
        map.render(&mut term);
        let cell = term.cell(x, y).unwrap();
        assert_eq!(cell.ch, HOVER_GLYPH);
        assert_eq!(cell.fg, Some(hex_or_grey("#22c55e")));
    }

    #[test]
    fn panning_invalidates_the_raster() {
        let mut map = ready_map();
        let (x, y) = cell_of(&map, -100.0, 40.0);
        map.viewport_mut().pan(0.25, 0.0);
        assert_ne!(map.click(x, y).as_deref(), Some("US"));
    }
}
