use crate::model::LatLng;

use super::projection::Projection;

/// Default pick radius around existing vertices, in screen pixels.
pub const DEFAULT_SNAP_RADIUS_PX: f32 = 10.0;

/// Replaces `at` with the nearest vertex within `radius_px` on screen.
///
/// Returns `None` when `at` itself cannot be projected (map not ready), the
/// unchanged input when nothing is close enough, otherwise the vertex's exact
/// geographic coordinate. On equal distances the first vertex wins.
pub fn snap(
    at: LatLng,
    vertices: impl IntoIterator<Item = LatLng>,
    projection: &dyn Projection,
    radius_px: f32,
) -> Option<LatLng> {
    let click = projection.project(at)?;
    let mut best: Option<(LatLng, f32)> = None;
    for v in vertices {
        let Some(p) = projection.project(v) else {
            continue;
        };
        let d = (p - click).length();
        if d <= radius_px && best.is_none_or(|(_, best_d)| d < best_d) {
            best = Some((v, d));
        }
    }
    Some(best.map_or(at, |(v, _)| v))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::editor::projection::test_view;
    use eframe::egui;

    #[test]
    fn click_within_radius_returns_exact_vertex() {
        let view = test_view();
        let vertex = view.unproject(egui::pos2(400.0, 300.0)).unwrap();
        let click = view.unproject(egui::pos2(406.0, 304.0)).unwrap();
        let got = snap(click, [vertex], &view, DEFAULT_SNAP_RADIUS_PX).unwrap();
        assert_eq!(got, vertex);
    }

    #[test]
    fn click_beyond_radius_is_unchanged() {
        let view = test_view();
        let vertex = view.unproject(egui::pos2(400.0, 300.0)).unwrap();
        let click = view.unproject(egui::pos2(411.0, 300.0)).unwrap();
        let got = snap(click, [vertex], &view, DEFAULT_SNAP_RADIUS_PX).unwrap();
        assert_eq!(got, click);
    }

    #[test]
    fn nearest_of_several_candidates_wins() {
        let view = test_view();
        let far = view.unproject(egui::pos2(408.0, 300.0)).unwrap();
        let near = view.unproject(egui::pos2(397.0, 300.0)).unwrap();
        let click = view.unproject(egui::pos2(400.0, 300.0)).unwrap();
        let got = snap(click, [far, near], &view, DEFAULT_SNAP_RADIUS_PX).unwrap();
        assert_eq!(got, near);
    }

    /// Longitude maps to x and latitude to y, one pixel per degree.
    struct Flat;

    impl Projection for Flat {
        fn project(&self, at: LatLng) -> Option<egui::Pos2> {
            Some(egui::pos2(at.lng as f32, at.lat as f32))
        }

        fn unproject(&self, screen: egui::Pos2) -> Option<LatLng> {
            Some(LatLng::new(screen.y as f64, screen.x as f64))
        }
    }

    #[test]
    fn equal_distance_keeps_first_vertex() {
        let click = LatLng::new(300.0, 400.0);
        let left = LatLng::new(300.0, 395.0);
        let right = LatLng::new(300.0, 405.0);
        assert_eq!(snap(click, [left, right], &Flat, DEFAULT_SNAP_RADIUS_PX), Some(left));
        assert_eq!(snap(click, [right, left], &Flat, DEFAULT_SNAP_RADIUS_PX), Some(right));
    }

    #[test]
    fn radius_is_configurable() {
        let view = test_view();
        let vertex = view.unproject(egui::pos2(400.0, 300.0)).unwrap();
        let click = view.unproject(egui::pos2(420.0, 300.0)).unwrap();
        assert_eq!(snap(click, [vertex], &view, 25.0).unwrap(), vertex);
        assert_eq!(snap(click, [vertex], &view, 10.0).unwrap(), click);
    }

    #[test]
    fn unready_projection_yields_none() {
        let view = crate::editor::projection::MapView::new(LatLng::new(0.0, 0.0), 12.0);
        assert!(snap(LatLng::new(0.0, 0.0), [], &view, DEFAULT_SNAP_RADIUS_PX).is_none());
    }
}
