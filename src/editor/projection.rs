use crate::model::LatLng;
use eframe::egui;
use std::f64::consts::PI;

/// Pixel size of one slippy-map tile at integer zoom levels.
pub const TILE_SIZE: f64 = 256.0;
pub const MIN_ZOOM: f64 = 2.0;
pub const MAX_ZOOM: f64 = 20.0;
/// Web Mercator cuts the poles off here.
const MAX_LATITUDE: f64 = 85.051_128_78;

/// Conversion between geographic and screen coordinates.
///
/// Both directions return `None` while the surface has no viewport yet
/// (before the first frame is laid out); callers treat that as "ignore".
pub trait Projection {
    fn project(&self, at: LatLng) -> Option<egui::Pos2>;
    fn unproject(&self, screen: egui::Pos2) -> Option<LatLng>;
}

/// Spherical Web Mercator view: a geographic center, a fractional zoom, and
/// the screen rect the map occupies.
#[derive(Clone, Copy, Debug)]
pub struct MapView {
    center: LatLng,
    zoom: f64,
    viewport: Option<egui::Rect>,
}

impl MapView {
    pub fn new(center: LatLng, zoom: f64) -> Self {
        Self {
            center,
            zoom: zoom.clamp(MIN_ZOOM, MAX_ZOOM),
            viewport: None,
        }
    }

    pub fn center(&self) -> LatLng {
        self.center
    }

    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    pub fn viewport(&self) -> Option<egui::Rect> {
        self.viewport
    }

    pub fn set_viewport(&mut self, rect: egui::Rect) {
        if rect.width() > 0.0 && rect.height() > 0.0 {
            self.viewport = Some(rect);
        } else {
            self.viewport = None;
        }
    }

    pub fn recenter(&mut self, center: LatLng, zoom: f64) {
        self.center = center;
        self.zoom = zoom.clamp(MIN_ZOOM, MAX_ZOOM);
    }

    /// Moves the map so that content follows a pointer drag of `delta` pixels.
    pub fn pan_by(&mut self, delta: egui::Vec2) {
        let (cx, cy) = world_px(self.center, self.zoom);
        self.center = from_world_px(cx - delta.x as f64, cy - delta.y as f64, self.zoom);
    }

    /// Zooms by `steps` zoom levels keeping the geographic point under
    /// `anchor` fixed on screen.
    pub fn zoom_about(&mut self, anchor: egui::Pos2, steps: f64) {
        let Some(before) = self.unproject(anchor) else {
            self.zoom = (self.zoom + steps).clamp(MIN_ZOOM, MAX_ZOOM);
            return;
        };
        self.zoom = (self.zoom + steps).clamp(MIN_ZOOM, MAX_ZOOM);
        if let Some(after) = self.project(before) {
            self.pan_by(anchor - after);
        }
    }
}

impl Projection for MapView {
    fn project(&self, at: LatLng) -> Option<egui::Pos2> {
        let viewport = self.viewport?;
        if !at.is_finite() {
            return None;
        }
        let (cx, cy) = world_px(self.center, self.zoom);
        let (x, y) = world_px(at, self.zoom);
        let c = viewport.center();
        Some(egui::pos2(
            c.x + (x - cx) as f32,
            c.y + (y - cy) as f32,
        ))
    }

    fn unproject(&self, screen: egui::Pos2) -> Option<LatLng> {
        let viewport = self.viewport?;
        let (cx, cy) = world_px(self.center, self.zoom);
        let c = viewport.center();
        Some(from_world_px(
            cx + (screen.x - c.x) as f64,
            cy + (screen.y - c.y) as f64,
            self.zoom,
        ))
    }
}

fn world_size(zoom: f64) -> f64 {
    TILE_SIZE * 2f64.powf(zoom)
}

/// Global pixel coordinates of `at` at `zoom`.
pub fn world_px(at: LatLng, zoom: f64) -> (f64, f64) {
    let size = world_size(zoom);
    let x = (at.lng + 180.0) / 360.0 * size;
    let lat = at.lat.clamp(-MAX_LATITUDE, MAX_LATITUDE).to_radians();
    let y = (1.0 - (lat.tan() + 1.0 / lat.cos()).ln() / PI) / 2.0 * size;
    (x, y)
}

pub fn from_world_px(x: f64, y: f64, zoom: f64) -> LatLng {
    let size = world_size(zoom);
    let lng = x / size * 360.0 - 180.0;
    let n = PI - 2.0 * PI * y / size;
    let lat = n.sinh().atan().to_degrees();
    LatLng::new(lat, lng)
}

#[cfg(test)]
pub(crate) fn test_view() -> MapView {
    let mut view = MapView::new(LatLng::new(-2.14898719, -79.60420553), 18.0);
    view.set_viewport(egui::Rect::from_min_size(egui::pos2(0.0, 0.0), egui::vec2(800.0, 600.0)));
    view
}
