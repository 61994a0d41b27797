//! # Map View Transform
//!
//! Maps between map meters and screen points. The map is first fitted into
//! the available area keeping its aspect ratio (the *frame*), then zoomed and
//! panned inside that frame. Meters grow to the right and downwards, the same
//! way image pixels do, so the mapping is a plain `egui::lerp` per axis.

use crate::planner::{Extent, Point};
use eframe::egui;

pub const MIN_ZOOM: f32 = 1.0;
pub const MAX_ZOOM: f32 = 20.0;

/// Largest rectangle with `aspect_ratio` (width / height) centered in `avail`.
pub fn fit_rect(avail: egui::Rect, aspect_ratio: f32) -> egui::Rect {
    let (width, height) = if avail.width() / avail.height() > aspect_ratio {
        // Wider than the map: constrain by height
        (avail.height() * aspect_ratio, avail.height())
    } else {
        (avail.width(), avail.width() / aspect_ratio)
    };
    egui::Rect::from_center_size(avail.center(), egui::vec2(width, height))
}

/// New pan offset that keeps `cursor` over the same map point while zooming
/// from `old_zoom` to `new_zoom`. `cursor` and `pan` are relative to the frame.
fn zoom_pan_at_cursor(cursor: egui::Vec2, old_zoom: f32, new_zoom: f32, old_pan: egui::Vec2) -> egui::Vec2 {
    let content = (cursor - old_pan) / old_zoom;
    cursor - content * new_zoom
}

/// Keep the zoomed map covering the whole frame.
fn clamp_pan(pan: egui::Vec2, zoom: f32, frame_size: egui::Vec2) -> egui::Vec2 {
    let min = -(frame_size * zoom - frame_size).max(egui::Vec2::ZERO);
    egui::vec2(pan.x.clamp(min.x, 0.0), pan.y.clamp(min.y, 0.0))
}

/// Zoom and pan state of the map canvas.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MapView {
    zoom: f32,
    pan: egui::Vec2,
}

impl Default for MapView {
    fn default() -> Self {
        Self { zoom: 1.0, pan: egui::Vec2::ZERO }
    }
}

impl MapView {
    pub fn zoom(&self) -> f32 {
        self.zoom
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Screen rectangle covered by the whole map for the given frame.
    pub fn map_rect(&self, frame: egui::Rect) -> egui::Rect {
        egui::Rect::from_min_size(frame.min + self.pan, frame.size() * self.zoom)
    }

    /// Multiply the zoom by `factor` around `cursor`.
    pub fn zoom_at(&mut self, frame: egui::Rect, cursor: egui::Pos2, factor: f32) {
        let new_zoom = (self.zoom * factor).clamp(MIN_ZOOM, MAX_ZOOM);
        if new_zoom == self.zoom {
            return;
        }
        let pan = zoom_pan_at_cursor(cursor - frame.min, self.zoom, new_zoom, self.pan);
        self.zoom = new_zoom;
        self.pan = clamp_pan(pan, new_zoom, frame.size());
    }

    pub fn pan_by(&mut self, frame: egui::Rect, delta: egui::Vec2) {
        self.pan = clamp_pan(self.pan + delta, self.zoom, frame.size());
    }
}

pub fn to_screen(extent: &Extent, map_rect: egui::Rect, p: &Point) -> egui::Pos2 {
    egui::pos2(
        egui::lerp(map_rect.left()..=map_rect.right(), (p.x / extent.width()) as f32),
        egui::lerp(map_rect.top()..=map_rect.bottom(), (p.y / extent.height()) as f32),
    )
}

pub fn to_world(extent: &Extent, map_rect: egui::Rect, pos: egui::Pos2) -> Point {
    Point::new(
        ((pos.x - map_rect.left()) / map_rect.width()) as f64 * extent.width(),
        ((pos.y - map_rect.top()) / map_rect.height()) as f64 * extent.height(),
    )
}

/// Meters covered by one screen point at the current zoom.
pub fn meters_per_point(extent: &Extent, map_rect: egui::Rect) -> f64 {
    extent.width() / map_rect.width().max(f32::EPSILON) as f64
}
