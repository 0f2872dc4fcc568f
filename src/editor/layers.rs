use crate::model::{
    self, Building, BuildingStatus, CampusData, EntityKind, EntityRef, EntranceType, Footway,
    FootwayState, LatLng, Rgba, TransitKind,
};
use eframe::egui;
use std::collections::{BTreeMap, HashMap};

use super::mode::Mode;
use super::projection::Projection;

const PRIMARY: Rgba = Rgba::rgb(37, 99, 235);
const AMBER: Rgba = Rgba::rgb(245, 158, 11);
const EMERALD: Rgba = Rgba::rgb(16, 185, 129);
const SKY: Rgba = Rgba::rgb(14, 165, 233);
const RED: Rgba = Rgba::rgb(239, 68, 68);
const PURPLE: Rgba = Rgba::rgb(147, 51, 234);
const ORANGE: Rgba = Rgba::rgb(234, 88, 12);
const WHITE: Rgba = Rgba::rgb(255, 255, 255);
const INK: Rgba = Rgba::rgb(17, 17, 17);
const INACTIVE_OPACITY: f32 = 0.4;
const FOOTWAY_OPACITY: f32 = 0.95;
const FOOTWAY_WIDTH: f32 = 4.0;

/// Overlay groups, in paint order (later layers sit on top and are hit first).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum LayerKind {
    Footways,
    Buildings,
    Entrances,
    Parkings,
    Landmarks,
    Vertices,
    Draft,
}

impl LayerKind {
    /// Layers whose content derives from `kind`'s collection.
    pub fn for_entity(kind: EntityKind) -> &'static [LayerKind] {
        match kind {
            EntityKind::Building => &[LayerKind::Buildings],
            EntityKind::Footway => &[LayerKind::Footways, LayerKind::Vertices],
            EntityKind::Entrance => &[LayerKind::Entrances],
            EntityKind::Parking => &[LayerKind::Parkings],
            EntityKind::Landmark => &[LayerKind::Landmarks],
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum OverlayKey {
    Entity(EntityKind, String),
    Vertex(usize),
    DraftA,
    DraftB,
    DraftLine,
    DraftPoint,
}

/// What a click on an overlay asks for.
#[derive(Clone, Debug, PartialEq)]
pub enum ClickTarget {
    Edit(EntityRef),
    Vertex(LatLng),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MarkerShape {
    Circle,
    Badge,
}

#[derive(Clone, Debug, PartialEq)]
pub struct MarkerStyle {
    pub shape: MarkerShape,
    pub fill: Rgba,
    pub outline: Option<Rgba>,
    pub label: Option<String>,
    pub label_color: Rgba,
    /// Diameter for circles, width for badges.
    pub size_px: f32,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Stroke {
    pub color: Rgba,
    pub width: f32,
    pub dashed: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub enum OverlayShape {
    Marker { at: LatLng, style: MarkerStyle },
    Polyline { points: Vec<LatLng>, stroke: Stroke },
}

#[derive(Clone, Debug, PartialEq)]
pub struct Overlay {
    pub key: OverlayKey,
    pub shape: OverlayShape,
    pub title: String,
    pub click: Option<ClickTarget>,
}

impl Overlay {
    fn hit(&self, screen: egui::Pos2, projection: &dyn Projection) -> bool {
        match &self.shape {
            OverlayShape::Marker { at, style } => {
                let Some(center) = projection.project(*at) else {
                    return false;
                };
                match style.shape {
                    MarkerShape::Circle => (screen - center).length() <= style.size_px * 0.5 + 2.0,
                    MarkerShape::Badge => badge_rect(center, style.size_px)
                        .expand(2.0)
                        .contains(screen),
                }
            }
            OverlayShape::Polyline { points, stroke } => {
                let pts: Vec<egui::Pos2> =
                    points.iter().filter_map(|p| projection.project(*p)).collect();
                let tolerance = stroke.width * 0.5 + 4.0;
                pts.windows(2)
                    .any(|w| distance_to_segment(screen, w[0], w[1]) <= tolerance)
            }
        }
    }
}

/// Screen rect of a badge marker centered on `center`.
pub fn badge_rect(center: egui::Pos2, width: f32) -> egui::Rect {
    egui::Rect::from_center_size(center, egui::vec2(width, width * 0.75))
}

pub fn distance_to_segment(p: egui::Pos2, a: egui::Pos2, b: egui::Pos2) -> f32 {
    let ab = b - a;
    let ap = p - a;
    let ab_len2 = ab.x * ab.x + ab.y * ab.y;
    if ab_len2 <= f32::EPSILON {
        return (p - a).length();
    }
    let t = ((ap.x * ab.x + ap.y * ab.y) / ab_len2).clamp(0.0, 1.0);
    let closest = a + ab * t;
    (p - closest).length()
}

/// Overlays that appeared, disappeared, or changed between two passes.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct LayerDiff {
    pub added: Vec<OverlayKey>,
    pub removed: Vec<OverlayKey>,
    pub changed: Vec<OverlayKey>,
}

impl LayerDiff {
    pub fn between(prev: &[Overlay], next: &[Overlay]) -> Self {
        let before: HashMap<&OverlayKey, &Overlay> = prev.iter().map(|o| (&o.key, o)).collect();
        let after: HashMap<&OverlayKey, &Overlay> = next.iter().map(|o| (&o.key, o)).collect();
        let mut diff = LayerDiff::default();
        for o in next {
            match before.get(&o.key) {
                None => diff.added.push(o.key.clone()),
                Some(old) if *old != o => diff.changed.push(o.key.clone()),
                Some(_) => {}
            }
        }
        for o in prev {
            if !after.contains_key(&o.key) {
                diff.removed.push(o.key.clone());
            }
        }
        diff
    }

    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty() && self.changed.is_empty()
    }
}

/// Every overlay currently on the map, grouped by layer.
///
/// A layer is only ever replaced wholesale: the previous pass is dropped
/// before the next one is stored, so no overlay outlives its data.
#[derive(Default)]
pub struct LayerSet {
    layers: BTreeMap<LayerKind, Vec<Overlay>>,
}

impl LayerSet {
    pub fn render_layer(&mut self, kind: LayerKind, next: Vec<Overlay>) -> LayerDiff {
        let prev = self.layers.remove(&kind).unwrap_or_default();
        let diff = LayerDiff::between(&prev, &next);
        drop(prev);
        if !diff.is_empty() {
            tracing::trace!(
                ?kind,
                added = diff.added.len(),
                removed = diff.removed.len(),
                changed = diff.changed.len(),
                "layer rendered"
            );
        }
        self.layers.insert(kind, next);
        diff
    }

    /// Re-renders the layers fed by `entity`'s collection.
    pub fn refresh(&mut self, entity: EntityKind, data: &CampusData) {
        for layer in LayerKind::for_entity(entity) {
            let overlays = match layer {
                LayerKind::Footways => footway_overlays(&data.footways),
                LayerKind::Vertices => vertex_overlays(&data.footways),
                LayerKind::Buildings => building_overlays(&data.buildings),
                LayerKind::Entrances => entrance_overlays(&data.entrances),
                LayerKind::Parkings => parking_overlays(&data.parkings),
                LayerKind::Landmarks => landmark_overlays(&data.landmarks),
                LayerKind::Draft => continue,
            };
            self.render_layer(*layer, overlays);
        }
    }

    pub fn refresh_all(&mut self, data: &CampusData) {
        for kind in EntityKind::ALL {
            self.refresh(kind, data);
        }
    }

    pub fn layer(&self, kind: LayerKind) -> &[Overlay] {
        self.layers.get(&kind).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Total overlays across all layers.
    pub fn len(&self) -> usize {
        self.layers.values().map(Vec::len).sum()
    }

    /// Overlays in paint order.
    pub fn iter(&self) -> impl Iterator<Item = &Overlay> {
        self.layers.values().flatten()
    }

    /// Click target of the topmost clickable overlay under `screen`.
    pub fn hit_test(&self, screen: egui::Pos2, projection: &dyn Projection) -> Option<&ClickTarget> {
        self.layers
            .values()
            .rev()
            .flat_map(|layer| layer.iter().rev())
            .filter(|o| o.click.is_some())
            .find(|o| o.hit(screen, projection))
            .and_then(|o| o.click.as_ref())
    }

    /// Topmost overlay under `screen`, clickable or not.
    pub fn hovered(&self, screen: egui::Pos2, projection: &dyn Projection) -> Option<&Overlay> {
        self.layers
            .values()
            .rev()
            .flat_map(|layer| layer.iter().rev())
            .find(|o| o.hit(screen, projection))
    }
}

pub fn building_style(b: &Building) -> MarkerStyle {
    let fill = match b.state {
        BuildingStatus::Enabled => PRIMARY,
        BuildingStatus::UnderRepair => AMBER,
    };
    MarkerStyle {
        shape: MarkerShape::Circle,
        fill,
        outline: Some(WHITE),
        label: Some(b.total_floors.to_string()),
        label_color: WHITE,
        size_px: 32.0,
    }
}

pub fn footway_stroke(f: &Footway) -> Stroke {
    let base = match f.access_type {
        TransitKind::Pedestrian => EMERALD,
        TransitKind::Vehicular => SKY,
        TransitKind::Both => AMBER,
    };
    let closed = f.state == FootwayState::Closed;
    Stroke {
        color: if closed { RED } else { base }.faded(FOOTWAY_OPACITY),
        width: FOOTWAY_WIDTH,
        dashed: closed,
    }
}

pub fn entrance_style(kind: EntranceType, active: bool) -> MarkerStyle {
    let fill = match kind {
        EntranceType::Vehicular => RED,
        EntranceType::Both => AMBER,
        EntranceType::Pedestrian => EMERALD,
    };
    muted(
        MarkerStyle {
            shape: MarkerShape::Circle,
            fill,
            outline: Some(WHITE),
            label: None,
            label_color: WHITE,
            size_px: 12.0,
        },
        active,
    )
}

pub fn parking_style(active: bool) -> MarkerStyle {
    muted(badge(PRIMARY, "P"), active)
}

pub fn landmark_style(kind: model::LandmarkType, active: bool) -> MarkerStyle {
    muted(badge(PURPLE, kind.badge()), active)
}

fn badge(fill: Rgba, label: &str) -> MarkerStyle {
    MarkerStyle {
        shape: MarkerShape::Badge,
        fill,
        outline: None,
        label: Some(label.to_string()),
        label_color: WHITE,
        size_px: 24.0,
    }
}

fn muted(mut style: MarkerStyle, active: bool) -> MarkerStyle {
    if !active {
        style.fill = style.fill.faded(INACTIVE_OPACITY);
        style.outline = style.outline.map(|c| c.faded(INACTIVE_OPACITY));
        style.label_color = style.label_color.faded(INACTIVE_OPACITY);
    }
    style
}

fn edit(kind: EntityKind, id: &str) -> Option<ClickTarget> {
    Some(ClickTarget::Edit(EntityRef {
        kind,
        id: id.to_string(),
    }))
}

fn title_or(name: &Option<String>, fallback: impl FnOnce() -> String) -> String {
    name.clone()
        .filter(|n| !n.trim().is_empty())
        .unwrap_or_else(fallback)
}

pub fn building_overlays(buildings: &[Building]) -> Vec<Overlay> {
    buildings
        .iter()
        .filter(|b| b.location().is_finite())
        .map(|b| Overlay {
            key: OverlayKey::Entity(EntityKind::Building, b.id.clone()),
            shape: OverlayShape::Marker {
                at: b.location(),
                style: building_style(b),
            },
            title: if b.name.trim().is_empty() {
                "Building".to_string()
            } else {
                b.name.clone()
            },
            click: edit(EntityKind::Building, &b.id),
        })
        .collect()
}

pub fn footway_overlays(footways: &[Footway]) -> Vec<Overlay> {
    footways
        .iter()
        .filter_map(|f| {
            let points: Vec<LatLng> = f.geom.points().collect();
            if points.len() < 2 {
                return None;
            }
            Some(Overlay {
                key: OverlayKey::Entity(EntityKind::Footway, f.id.clone()),
                shape: OverlayShape::Polyline {
                    points,
                    stroke: footway_stroke(f),
                },
                title: title_or(&f.name, || format!("Footway ({})", f.access_type.label())),
                click: edit(EntityKind::Footway, &f.id),
            })
        })
        .collect()
}

/// Numbered snap handles, one per footway point, numbered from 1 across all
/// footways in collection order.
pub fn vertex_overlays(footways: &[Footway]) -> Vec<Overlay> {
    footways
        .iter()
        .flat_map(|f| f.geom.points())
        .enumerate()
        .map(|(i, at)| Overlay {
            key: OverlayKey::Vertex(i + 1),
            shape: OverlayShape::Marker {
                at,
                style: MarkerStyle {
                    shape: MarkerShape::Circle,
                    fill: AMBER,
                    outline: None,
                    label: Some((i + 1).to_string()),
                    label_color: INK,
                    size_px: 20.0,
                },
            },
            title: format!("Vertex {}", i + 1),
            click: Some(ClickTarget::Vertex(at)),
        })
        .collect()
}

pub fn entrance_overlays(entrances: &[model::Entrance]) -> Vec<Overlay> {
    entrances
        .iter()
        .map(|e| Overlay {
            key: OverlayKey::Entity(EntityKind::Entrance, e.id.clone()),
            shape: OverlayShape::Marker {
                at: e.location.latlng(),
                style: entrance_style(e.kind, model::is_active(e.is_active)),
            },
            title: title_or(&e.name, || format!("Entrance ({})", e.kind.label())),
            click: edit(EntityKind::Entrance, &e.id),
        })
        .filter(|o| marker_is_finite(o))
        .collect()
}

pub fn parking_overlays(parkings: &[model::Parking]) -> Vec<Overlay> {
    parkings
        .iter()
        .map(|p| Overlay {
            key: OverlayKey::Entity(EntityKind::Parking, p.id.clone()),
            shape: OverlayShape::Marker {
                at: p.location.latlng(),
                style: parking_style(model::is_active(p.is_active)),
            },
            title: title_or(&p.name, || "Parking".to_string()),
            click: edit(EntityKind::Parking, &p.id),
        })
        .filter(|o| marker_is_finite(o))
        .collect()
}

pub fn landmark_overlays(landmarks: &[model::Landmark]) -> Vec<Overlay> {
    landmarks
        .iter()
        .map(|l| Overlay {
            key: OverlayKey::Entity(EntityKind::Landmark, l.id.clone()),
            shape: OverlayShape::Marker {
                at: l.location.latlng(),
                style: landmark_style(l.kind, model::is_active(l.is_active)),
            },
            title: title_or(&l.name, || format!("Landmark: {}", l.kind.label())),
            click: edit(EntityKind::Landmark, &l.id),
        })
        .filter(|o| marker_is_finite(o))
        .collect()
}

fn marker_is_finite(o: &Overlay) -> bool {
    match &o.shape {
        OverlayShape::Marker { at, .. } => at.is_finite(),
        OverlayShape::Polyline { .. } => true,
    }
}

fn draft_pin(key: OverlayKey, at: LatLng, label: Option<&str>) -> Overlay {
    let size_px = if label.is_some() { 32.0 } else { 16.0 };
    Overlay {
        key,
        shape: OverlayShape::Marker {
            at,
            style: MarkerStyle {
                shape: MarkerShape::Circle,
                fill: ORANGE,
                outline: Some(WHITE),
                label: label.map(str::to_string),
                label_color: WHITE,
                size_px,
            },
        },
        title: label.unwrap_or("New point").to_string(),
        click: None,
    }
}

/// Markers for whatever the active mode is holding. Derived from the mode
/// itself, so clearing the mode clears the markers.
pub fn draft_overlays(mode: &Mode) -> Vec<Overlay> {
    let mut out = Vec::new();
    match mode {
        Mode::FootwayAb(ab) => {
            if let Some(a) = ab.a {
                out.push(draft_pin(OverlayKey::DraftA, a, Some("A")));
            }
            if let (Some(a), Some(b)) = (ab.a, ab.b) {
                out.push(Overlay {
                    key: OverlayKey::DraftLine,
                    shape: OverlayShape::Polyline {
                        points: vec![a, b],
                        stroke: Stroke {
                            color: ORANGE,
                            width: FOOTWAY_WIDTH,
                            dashed: true,
                        },
                    },
                    title: "A→B".to_string(),
                    click: None,
                });
                out.push(draft_pin(OverlayKey::DraftB, b, Some("B")));
            }
        }
        Mode::Place {
            draft: Some(draft), ..
        } => out.push(draft_pin(OverlayKey::DraftPoint, draft.location(), None)),
        _ => {}
    }
    out
}
