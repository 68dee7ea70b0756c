//! Dashboard composition root
//!
//! Owns the fetched data and every bit of UI state, wires pointer and key
//! input to the map and overlays, and runs the event loop. All fetches are
//! blocking calls made from here; a frame with the loading state is presented
//! before each one.

use crate::api::types::CountryMood;
use crate::api::MoodApi;
use crate::colors::CURSOR;
use crate::config::Config;
use crate::geo::BoundarySource;
use crate::map::{Area, HoverEvent, MapView, Viewport};
use crate::terminal::Terminal;
use crate::ui::{header, help, legend, panel, spikes, stats, tooltip};
use crate::ui::panel::PanelState;
use crate::ui::spikes::SpikeFeed;
use crate::ui::stats::GlobalStats;
use crossterm::event::{Event, KeyCode, KeyEventKind, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};
use std::io;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Input poll timeout, which is also the frame interval
const FRAME_MS: u64 = 50;

const PAN_STEP: f64 = 0.1;
const ZOOM_STEP: f64 = 1.25;

/// Where each piece goes for a given screen size
#[derive(Clone, Copy, Debug, PartialEq)]
struct Layout {
    map: Area,
    spikes: (i32, i32),
    stats_bottom: i32,
    legend: (i32, i32),
    panel_top: i32,
    panel_x: i32,
}

impl Layout {
    fn new(width: u16, height: u16) -> Self {
        let map = Area::new(0, 1, width, height.saturating_sub(2));
        let legend_y = height as i32 - 2;
        Self {
            map,
            spikes: (1, 2),
            stats_bottom: legend_y - 1,
            legend: (1, legend_y),
            panel_top: 1,
            panel_x: width as i32 - panel::WIDTH.min(width) as i32,
        }
    }
}

pub struct Dashboard {
    api: Box<dyn MoodApi>,
    countries: Vec<CountryMood>,
    updated_at: Option<String>,
    stats: Option<GlobalStats>,
    loading: bool,
    hovered: Option<(CountryMood, (u16, u16))>,
    panel: PanelState,
    detail_due: bool,
    spikes: SpikeFeed,
    stats_expanded: bool,
    show_help: bool,
    map: MapView,
    layout: Layout,
    pointer: (u16, u16),
    cursor_visible: bool,
    refresh_every: Option<Duration>,
    last_refresh: Option<Instant>,
    refresh_requested: bool,
}

impl Dashboard {
    pub fn new(api: Box<dyn MoodApi>, config: &Config, width: u16, height: u16) -> Self {
        let layout = Layout::new(width, height);
        let mut map = MapView::new(Viewport::new(layout.map.width, layout.map.height));
        map.set_area(layout.map);
        map.init(BoundarySource::from_config(&config.map), &config.map.code_property);

        let refresh_every = (config.api.refresh_secs > 0).then(|| Duration::from_secs(config.api.refresh_secs));
        Self {
            api,
            countries: Vec::new(),
            updated_at: None,
            stats: None,
            loading: true,
            hovered: None,
            panel: PanelState::new(),
            detail_due: false,
            spikes: SpikeFeed::new(),
            stats_expanded: true,
            show_help: false,
            map,
            layout,
            pointer: (width / 2, height / 2),
            cursor_visible: false,
            refresh_every,
            last_refresh: None,
            refresh_requested: true,
        }
    }

    #[cfg(test)]
    pub fn countries(&self) -> &[CountryMood] {
        &self.countries
    }

    #[cfg(test)]
    pub fn is_loading(&self) -> bool {
        self.loading
    }

    #[cfg(test)]
    pub fn hovered(&self) -> Option<&(CountryMood, (u16, u16))> {
        self.hovered.as_ref()
    }

    #[cfg(test)]
    pub fn panel(&self) -> &PanelState {
        &self.panel
    }

    #[cfg(test)]
    pub fn spikes(&self) -> &SpikeFeed {
        &self.spikes
    }

    #[cfg(test)]
    pub fn stats(&self) -> Option<&GlobalStats> {
        self.stats.as_ref()
    }

    #[cfg(test)]
    pub fn map(&self) -> &MapView {
        &self.map
    }

    #[cfg(test)]
    pub fn map_mut(&mut self) -> &mut MapView {
        &mut self.map
    }

    /// Fetch the global mood and repaint the map. A failure leaves no data.
    pub fn load_global(&mut self) {
        self.loading = true;
        match self.api.fetch_global_mood() {
            Ok(global) => {
                info!(countries = global.countries.len(), updated_at = %global.updated_at, "global mood loaded");
                self.countries = global.countries;
                self.updated_at = Some(global.updated_at);
            }
            Err(e) => {
                warn!(error = %e, "global mood fetch failed");
                self.countries.clear();
                self.updated_at = None;
            }
        }
        self.map.set_countries(&self.countries);
        self.stats = GlobalStats::compute(&self.countries);

        // keep the tooltip in step with the new data
        if let Some((country, point)) = self.hovered.take() {
            self.hovered = self.map.country(&country.country_code).cloned().map(|c| (c, point));
        }
        self.loading = false;
    }

    /// Fetch the spike list. A failure hides the feed.
    pub fn load_spikes(&mut self) {
        match self.api.fetch_spikes() {
            Ok(list) => {
                info!(spikes = list.spikes.len(), "spikes loaded");
                self.spikes.set(list.spikes);
            }
            Err(e) => {
                warn!(error = %e, "spike fetch failed");
                self.spikes.set(Vec::new());
            }
        }
    }

    /// Global mood and spikes together, as the periodic refresh does
    pub fn refresh(&mut self) {
        self.load_global();
        self.load_spikes();
        self.last_refresh = Some(Instant::now());
        self.refresh_requested = false;
    }

    /// Whether a refresh should run on the next tick
    pub fn refresh_due(&self) -> bool {
        if self.refresh_requested {
            return true;
        }
        match (self.refresh_every, self.last_refresh) {
            (Some(every), Some(last)) => last.elapsed() >= every,
            _ => false,
        }
    }

    /// Hover callback: the tooltip only shows countries with data
    pub fn on_hover(&mut self, event: HoverEvent) {
        self.hovered = match (event.country, event.point) {
            (Some(country), Some(point)) => Some((country, point)),
            _ => None,
        };
    }

    /// Click callback: select the country and load its detail
    #[cfg(test)]
    pub fn on_click(&mut self, code: &str) {
        self.select(code);
        self.load_detail();
    }

    fn select(&mut self, code: &str) {
        debug!(code, "country selected");
        self.panel.open(code, self.map.feature_name(code));
        self.detail_due = true;
    }

    /// Fetch the detail of the selected country, if one is waiting
    pub fn load_detail(&mut self) {
        if !self.detail_due {
            return;
        }
        self.detail_due = false;
        let Some(code) = self.panel.code().map(str::to_string) else {
            return;
        };
        match self.api.fetch_country_detail(&code) {
            Ok(detail) => self.panel.finish(&code, Some(detail)),
            Err(e) => {
                warn!(code = %code, error = %e, "country detail fetch failed");
                self.panel.finish(&code, None);
            }
        }
    }

    pub fn close_panel(&mut self) {
        self.panel.close();
        self.detail_due = false;
    }

    /// Apply a key press. Returns true to quit.
    pub fn handle_key(&mut self, code: KeyCode) -> bool {
        match code {
            KeyCode::Char('q') => return true,
            KeyCode::Esc if self.show_help => self.show_help = false,
            KeyCode::Esc | KeyCode::Char('x') => self.close_panel(),
            KeyCode::Char('?') => self.show_help = !self.show_help,
            KeyCode::Char('s') => self.spikes.toggle(),
            KeyCode::Char('g') => self.stats_expanded = !self.stats_expanded,
            KeyCode::Char('r') => self.refresh_requested = true,

            KeyCode::Char('h') => self.pan(-PAN_STEP, 0.0),
            KeyCode::Char('l') => self.pan(PAN_STEP, 0.0),
            KeyCode::Char('k') => self.pan(0.0, -PAN_STEP),
            KeyCode::Char('j') => self.pan(0.0, PAN_STEP),
            KeyCode::Char('+') | KeyCode::Char('=') => self.zoom(ZOOM_STEP),
            KeyCode::Char('-') | KeyCode::Char('_') => self.zoom(1.0 / ZOOM_STEP),
            KeyCode::Char('0') => {
                self.map.viewport_mut().reset();
                self.refresh_hover();
            }

            KeyCode::Left => self.nudge_pointer(-1, 0),
            KeyCode::Right => self.nudge_pointer(1, 0),
            KeyCode::Up => self.nudge_pointer(0, -1),
            KeyCode::Down => self.nudge_pointer(0, 1),
            KeyCode::Enter | KeyCode::Char(' ') => {
                let (x, y) = self.pointer;
                self.click_at(x, y);
            }
            _ => {}
        }
        false
    }

    pub fn handle_mouse(&mut self, mouse: MouseEvent) {
        let (x, y) = (mouse.column, mouse.row);
        match mouse.kind {
            MouseEventKind::Moved | MouseEventKind::Drag(_) => {
                self.cursor_visible = false;
                self.pointer_moved(x, y);
            }
            MouseEventKind::Down(MouseButton::Left) => self.click_at(x, y),
            MouseEventKind::ScrollUp => self.zoom(ZOOM_STEP),
            MouseEventKind::ScrollDown => self.zoom(1.0 / ZOOM_STEP),
            _ => {}
        }
    }

    /// Is the cell covered by an overlay rather than the map?
    fn over_overlay(&self, x: u16, y: u16) -> bool {
        self.panel.is_open() && y as i32 >= self.layout.panel_top && x as i32 >= self.layout.panel_x
    }

    fn pointer_moved(&mut self, x: u16, y: u16) {
        self.pointer = (x, y);
        if self.over_overlay(x, y) || !self.layout.map.contains(x, y) {
            if self.map.hovered().is_some() {
                let event = self.map.pointer_left();
                self.on_hover(event);
            }
            return;
        }
        match self.map.pointer_moved(x, y) {
            Some(event) => self.on_hover(event),
            None => {
                // same country, the tooltip follows the pointer
                if let Some((_, point)) = &mut self.hovered {
                    *point = (x, y);
                }
            }
        }
    }

    /// Re-evaluate the hover after the map moved under a still pointer
    fn refresh_hover(&mut self) {
        let (x, y) = self.pointer;
        self.pointer_moved(x, y);
    }

    fn click_at(&mut self, x: u16, y: u16) {
        if self.panel.is_open() && y as i32 == self.layout.panel_top && x as i32 >= self.layout.panel_x + panel::WIDTH as i32 - 8 {
            self.close_panel();
            return;
        }
        if self.over_overlay(x, y) {
            return;
        }
        if self.spikes.is_visible() && y as i32 == self.layout.spikes.1 + 1 {
            let sx = self.layout.spikes.0;
            if (x as i32) >= sx && (x as i32) < sx + spikes::WIDTH as i32 {
                self.spikes.toggle();
                return;
            }
        }
        if let Some(code) = self.map.click(x, y) {
            self.select(&code);
        }
    }

    fn nudge_pointer(&mut self, dx: i32, dy: i32) {
        let area = self.layout.map;
        if area.width == 0 || area.height == 0 {
            return;
        }
        let x = (self.pointer.0 as i32 + dx).clamp(area.x as i32, (area.x + area.width - 1) as i32);
        let y = (self.pointer.1 as i32 + dy).clamp(area.y as i32, (area.y + area.height - 1) as i32);
        self.cursor_visible = true;
        self.pointer_moved(x as u16, y as u16);
    }

    fn pan(&mut self, dx: f64, dy: f64) {
        self.map.viewport_mut().pan(dx, dy);
        self.refresh_hover();
    }

    fn zoom(&mut self, factor: f64) {
        self.map.viewport_mut().zoom_by(factor);
        self.refresh_hover();
    }

    /// Follow a terminal size change
    pub fn resize(&mut self, width: u16, height: u16) {
        let layout = Layout::new(width, height);
        if layout == self.layout {
            return;
        }
        self.layout = layout;
        self.map.set_area(layout.map);
        self.hovered = None;
        self.map.pointer_left();
    }

    /// Blocking fetch the next frame needs, if any: `Some(true)` when a
    /// refresh is part of it, `Some(false)` for a detail fetch alone
    fn pending_fetch(&self) -> Option<bool> {
        let refreshing = self.refresh_due();
        (refreshing || self.detail_due).then_some(refreshing)
    }

    /// Per-frame housekeeping: finish loading the map, apply parked paint,
    /// run the periodic refresh
    pub fn tick(&mut self) {
        if self.map.poll_load() {
            self.refresh_hover();
        }
        self.map.apply_pending();
        if self.refresh_due() {
            self.refresh();
        }
    }

    pub fn render(&mut self, term: &mut Terminal) {
        let (w, h) = term.size();
        self.resize(w, h);
        let layout = self.layout;

        self.map.render(term);
        header::draw(term, self.updated_at.as_deref());
        header::draw_status(term, help::HINTS);

        if self.loading && self.countries.is_empty() {
            header::draw_loading(term);
        }

        self.spikes.draw(term, layout.spikes.0, layout.spikes.1);
        if !self.loading {
            if let Some(stats) = &self.stats {
                stats::draw(term, stats, self.stats_expanded, 1, layout.stats_bottom);
            }
        }
        legend::draw(term, layout.legend.0, layout.legend.1);

        self.panel.draw(term, layout.panel_top);

        if let Some((country, point)) = &self.hovered {
            tooltip::draw(term, country, *point);
        }
        if self.cursor_visible {
            let (x, y) = self.pointer;
            term.set(x as i32, y as i32, '✚', Some(CURSOR), true);
        }
        if self.show_help {
            help::render_help_overlay(term, help::KEYS);
        }
    }

    fn draw(&mut self, term: &mut Terminal) -> io::Result<()> {
        term.clear();
        self.render(term);
        term.present()
    }

    /// Event loop: input, resize, tick, draw, until quit
    pub fn run(&mut self, term: &mut Terminal) -> io::Result<()> {
        self.draw(term)?;
        loop {
            if let Some(event) = term.poll_event(FRAME_MS)? {
                if self.handle_event(event) {
                    break;
                }
                // drain whatever else queued up during the last frame
                let mut quit = false;
                while let Some(event) = term.poll_event(0)? {
                    if self.handle_event(event) {
                        quit = true;
                        break;
                    }
                }
                if quit {
                    break;
                }
            }

            term.sync_size()?;

            if let Some(refreshing) = self.pending_fetch() {
                // show the loading state before blocking on the fetch
                self.loading = refreshing;
                self.draw(term)?;
                self.load_detail();
            }
            self.tick();
            self.draw(term)?;
        }
        Ok(())
    }

    fn handle_event(&mut self, event: Event) -> bool {
        match event {
            Event::Key(key) if key.kind == KeyEventKind::Press => {
                if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
                    return true;
                }
                self.handle_key(key.code)
            }
            Event::Mouse(mouse) => {
                self.handle_mouse(mouse);
                false
            }
            _ => false,
        }
    }
}
