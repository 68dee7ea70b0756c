//! Equirectangular projection between lon/lat and terminal cells

/// Map center at startup: `(lon, lat)`
pub const INITIAL_CENTER: (f64, f64) = (20.0, 25.0);
pub const INITIAL_ZOOM: f64 = 1.0;
pub const MIN_ZOOM: f64 = 1.0;
pub const MAX_ZOOM: f64 = 8.0;

// Terminal cells are roughly twice as tall as they are wide
const CELL_ASPECT: f64 = 2.0;

// Keep the poles reachable without scrolling into empty space
const MAX_CENTER_LAT: f64 = 80.0;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    pub center_lon: f64,
    pub center_lat: f64,
    pub zoom: f64,
    pub width: u16,
    pub height: u16,
}

impl Viewport {
    pub fn new(width: u16, height: u16) -> Self {
        Self {
            center_lon: INITIAL_CENTER.0,
            center_lat: INITIAL_CENTER.1,
            zoom: INITIAL_ZOOM,
            width,
            height,
        }
    }

    pub fn set_size(&mut self, width: u16, height: u16) {
        self.width = width;
        self.height = height;
    }

    /// Degrees of longitude per column; at zoom 1 the width spans the globe
    pub fn degrees_per_col(&self) -> f64 {
        360.0 / (self.width.max(1) as f64 * self.zoom)
    }

    pub fn degrees_per_row(&self) -> f64 {
        self.degrees_per_col() * CELL_ASPECT
    }

    /// Fractional cell position of a point, relative to the viewport origin
    pub fn project(&self, lon: f64, lat: f64) -> (f64, f64) {
        let x = (lon - self.center_lon) / self.degrees_per_col() + self.width as f64 / 2.0;
        let y = (self.center_lat - lat) / self.degrees_per_row() + self.height as f64 / 2.0;
        (x, y)
    }

    /// Lon/lat at the center of a cell. Longitude is not wrapped; `None`
    /// past the poles.
    pub fn cell_center(&self, col: u16, row: u16) -> Option<(f64, f64)> {
        let lon = self.center_lon + (col as f64 + 0.5 - self.width as f64 / 2.0) * self.degrees_per_col();
        let lat = self.center_lat - (row as f64 + 0.5 - self.height as f64 / 2.0) * self.degrees_per_row();
        (-90.0..=90.0).contains(&lat).then_some((lon, lat))
    }

    /// Move the center by a fraction of the visible span
    pub fn pan(&mut self, dx: f64, dy: f64) {
        let span_lon = self.degrees_per_col() * self.width as f64;
        let span_lat = self.degrees_per_row() * self.height as f64;
        self.center_lon = wrap_lon(self.center_lon + dx * span_lon);
        self.center_lat = (self.center_lat - dy * span_lat).clamp(-MAX_CENTER_LAT, MAX_CENTER_LAT);
    }

    pub fn zoom_by(&mut self, factor: f64) {
        self.zoom = (self.zoom * factor).clamp(MIN_ZOOM, MAX_ZOOM);
    }

    pub fn reset(&mut self) {
        *self = Self::new(self.width, self.height);
    }
}

/// Normalize a longitude into -180..180
pub fn wrap_lon(lon: f64) -> f64 {
    let wrapped = (lon + 180.0).rem_euclid(360.0) - 180.0;
    if wrapped == -180.0 && lon > 0.0 {
        180.0
    } else {
        wrapped
    }
}
