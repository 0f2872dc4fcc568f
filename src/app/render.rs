use crate::editor::layers::{LayerSet, MarkerShape, MarkerStyle, OverlayShape, badge_rect};
use crate::editor::mode::ModeKind;
use crate::editor::projection::{MapView, Projection};
use crate::editor::{Notice, NoticeLevel};
use eframe::egui;

use super::tiles::{TileCache, visible_tiles};

pub(super) fn mode_button(ui: &mut egui::Ui, label: &str, mode: ModeKind, current: ModeKind) -> bool {
    ui.selectable_label(current == mode, label)
        .on_hover_text(mode.label())
        .clicked()
}

/// Background, basemap tiles if enabled, and the tile grid.
pub(super) fn draw_basemap(
    painter: &egui::Painter,
    rect: egui::Rect,
    view: &MapView,
    mut tiles: Option<&mut TileCache>,
) {
    let bg = painter.ctx().style().visuals.extreme_bg_color;
    painter.rect_filled(rect, 0.0, bg);
    let placed = visible_tiles(view);
    if let Some(cache) = tiles.as_deref_mut() {
        let uv = egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0));
        for tile in &placed {
            if let Some(texture) = cache.get(tile.id) {
                painter.image(texture.id(), tile.rect, uv, egui::Color32::WHITE);
            }
        }
        cache.evict();
    }
    let grid = egui::Stroke::new(1.0, egui::Color32::from_gray(70).gamma_multiply(0.5));
    for tile in &placed {
        painter.rect_stroke(tile.rect, 0.0, grid, egui::StrokeKind::Inside);
    }
}

/// Paints every overlay in layer order.
pub(super) fn draw_overlays(painter: &egui::Painter, view: &MapView, layers: &LayerSet) {
    for overlay in layers.iter() {
        match &overlay.shape {
            OverlayShape::Polyline { points, stroke } => {
                let pts: Vec<egui::Pos2> = points.iter().filter_map(|p| view.project(*p)).collect();
                if pts.len() < 2 {
                    continue;
                }
                let egui_stroke = egui::Stroke::new(stroke.width, stroke.color.to_color32());
                if stroke.dashed {
                    let clip = painter.clip_rect().expand(stroke.width);
                    for pair in pts.windows(2) {
                        draw_dashed_line(painter, clip, pair[0], pair[1], egui_stroke, 8.0, 6.0);
                    }
                } else {
                    painter.add(egui::Shape::line(pts, egui_stroke));
                }
            }
            OverlayShape::Marker { at, style } => {
                if let Some(center) = view.project(*at) {
                    draw_marker(painter, center, style);
                }
            }
        }
    }
}

fn draw_marker(painter: &egui::Painter, center: egui::Pos2, style: &MarkerStyle) {
    let fill = style.fill.to_color32();
    let outline = style
        .outline
        .map(|c| egui::Stroke::new(2.0, c.to_color32()))
        .unwrap_or(egui::Stroke::NONE);
    match style.shape {
        MarkerShape::Circle => {
            let radius = style.size_px * 0.5;
            painter.circle(center, radius, fill, outline);
        }
        MarkerShape::Badge => {
            let rect = badge_rect(center, style.size_px);
            painter.rect(rect, 4.0, fill, outline, egui::StrokeKind::Outside);
        }
    }
    if let Some(label) = &style.label {
        let font = egui::FontId::proportional((style.size_px * 0.5).clamp(8.0, 14.0));
        painter.text(
            center,
            egui::Align2::CENTER_CENTER,
            label,
            font,
            style.label_color.to_color32(),
        );
    }
}

/// Dashes only the part of `a..b` inside `clip`. The pattern is anchored at
/// `a`, so it does not crawl when the visible part changes.
fn draw_dashed_line(
    painter: &egui::Painter,
    clip: egui::Rect,
    a: egui::Pos2,
    b: egui::Pos2,
    stroke: egui::Stroke,
    dash_len: f32,
    gap_len: f32,
) {
    let v = b - a;
    let len = v.length();
    if len <= f32::EPSILON {
        return;
    }
    let Some((t0, t1)) = clip_segment(a, b, clip) else {
        return;
    };
    let (start, end) = (t0 * len, t1 * len);
    let dir = v / len;
    let period = dash_len + gap_len;
    let mut pos = (start / period).floor() * period;
    while pos < end {
        let dash_start = pos.max(start);
        let dash_end = (pos + dash_len).min(end);
        if dash_end > dash_start {
            painter.line_segment([a + dir * dash_start, a + dir * dash_end], stroke);
        }
        pos += period;
    }
}

/// Liang-Barsky: the parameter range `[t0, t1]` of `a..b` that lies inside
/// `rect`, or `None` when the segment misses it.
fn clip_segment(a: egui::Pos2, b: egui::Pos2, rect: egui::Rect) -> Option<(f32, f32)> {
    let d = b - a;
    let mut t0 = 0.0_f32;
    let mut t1 = 1.0_f32;
    for (p, q) in [
        (-d.x, a.x - rect.min.x),
        (d.x, rect.max.x - a.x),
        (-d.y, a.y - rect.min.y),
        (d.y, rect.max.y - a.y),
    ] {
        if p == 0.0 {
            if q < 0.0 {
                return None;
            }
            continue;
        }
        let r = q / p;
        if p < 0.0 {
            t0 = t0.max(r);
        } else {
            t1 = t1.min(r);
        }
        if t0 > t1 {
            return None;
        }
    }
    Some((t0, t1))
}

/// Mode banner pinned to the top of the map.
pub(super) fn draw_banner(painter: &egui::Painter, rect: egui::Rect, text: &str) {
    let font = egui::FontId::proportional(14.0);
    let galley = painter.layout_no_wrap(text.to_string(), font, egui::Color32::WHITE);
    let size = galley.size() + egui::vec2(20.0, 10.0);
    let banner = egui::Rect::from_center_size(
        egui::pos2(rect.center().x, rect.top() + 12.0 + size.y * 0.5),
        size,
    );
    painter.rect_filled(banner, 6.0, egui::Color32::from_rgba_unmultiplied(17, 17, 17, 220));
    painter.galley(banner.min + egui::vec2(10.0, 5.0), galley, egui::Color32::WHITE);
}

pub(super) fn notice_color(notice: &Notice) -> egui::Color32 {
    match notice.level {
        NoticeLevel::Info => egui::Color32::from_gray(200),
        NoticeLevel::Success => egui::Color32::from_rgb(16, 185, 129),
        NoticeLevel::Warning => egui::Color32::from_rgb(245, 158, 11),
        NoticeLevel::Error => egui::Color32::from_rgb(239, 68, 68),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use eframe::egui::{Rect, pos2};

    fn screen() -> Rect {
        Rect::from_min_max(pos2(0.0, 0.0), pos2(800.0, 600.0))
    }

    #[test]
    fn segment_inside_is_left_whole() {
        assert_eq!(
            clip_segment(pos2(10.0, 10.0), pos2(700.0, 500.0), screen()),
            Some((0.0, 1.0))
        );
    }

    #[test]
    fn far_endpoint_is_pulled_to_the_border() {
        let a = pos2(400.0, 300.0);
        let b = pos2(1_000_400.0, 300.0);
        let (t0, t1) = clip_segment(a, b, screen()).unwrap();
        assert_eq!(t0, 0.0);
        let end = a + (b - a) * t1;
        assert!((end.x - 800.0).abs() < 0.5, "{end:?}");
    }

    #[test]
    fn segment_crossing_the_screen_is_clipped_both_ends() {
        let a = pos2(-5_000.0, 300.0);
        let b = pos2(5_000.0, 300.0);
        let (t0, t1) = clip_segment(a, b, screen()).unwrap();
        let (start, end) = (a + (b - a) * t0, a + (b - a) * t1);
        assert!(start.x.abs() < 0.5 && (end.x - 800.0).abs() < 0.5);
    }

    #[test]
    fn segment_outside_is_dropped() {
        assert_eq!(clip_segment(pos2(-50.0, -50.0), pos2(-10.0, 900.0), screen()), None);
        assert_eq!(clip_segment(pos2(900.0, 10.0), pos2(2_000.0, 20.0), screen()), None);
    }
}
