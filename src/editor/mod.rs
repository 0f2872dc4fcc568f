//! Map editing core: interprets clicks on the campus map according to the
//! active mode and turns them into insert requests for the store.
//!
//! The editor never talks to the store or the UI directly. Every entry point
//! returns a list of [`Effect`]s for the host to carry out, and the host
//! reports insert outcomes back through [`Editor::insert_finished`].

use crate::model::{
    CampusData, EntityKind, EntityRef, FootwayState, InsertTicket, LatLng, LineGeom, NewEntity,
    NewFootway,
};

pub mod interaction;
pub mod layers;
pub mod mode;
pub mod pending;
pub mod projection;
pub mod snap;

use layers::ClickTarget;
use mode::{AbDraft, Mode, ModeKind, TypeSelection};
use pending::PendingDraft;
use projection::Projection;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Success,
    Warning,
    Error,
}

/// A short user-facing message.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub text: String,
}

impl Notice {
    pub fn info(text: impl Into<String>) -> Self {
        Self { level: NoticeLevel::Info, text: text.into() }
    }

    pub fn success(text: impl Into<String>) -> Self {
        Self { level: NoticeLevel::Success, text: text.into() }
    }

    pub fn warning(text: impl Into<String>) -> Self {
        Self { level: NoticeLevel::Warning, text: text.into() }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self { level: NoticeLevel::Error, text: text.into() }
    }
}

/// Side effects requested by the editor.
#[derive(Clone, Debug, PartialEq)]
pub enum Effect {
    /// `addBuilding` picked a location; the host opens its building form.
    LocationSelected(LatLng),
    /// An existing entity was clicked; the host opens its edit dialog.
    EditRequested(EntityRef),
    /// Single-row insert. Answer with [`Editor::insert_finished`], passing
    /// the ticket back.
    Insert(InsertTicket, NewEntity),
    /// Re-read a collection from the store.
    Reload(EntityKind),
    Notify(Notice),
}

/// Mode state machine plus the settings it consults.
#[derive(Clone, Debug)]
pub struct Editor {
    mode: Mode,
    pub selection: TypeSelection,
    snap_radius_px: f32,
    last_ticket: u64,
}

impl Default for Editor {
    fn default() -> Self {
        Self::new(TypeSelection::default(), snap::DEFAULT_SNAP_RADIUS_PX)
    }
}

impl Editor {
    pub fn new(selection: TypeSelection, snap_radius_px: f32) -> Self {
        Self {
            mode: Mode::Idle,
            selection,
            snap_radius_px,
            last_ticket: 0,
        }
    }

    /// Next insert ticket. The host uses this too for inserts it starts
    /// itself, so tickets stay unique across both.
    pub fn issue_ticket(&mut self) -> InsertTicket {
        self.last_ticket += 1;
        InsertTicket(self.last_ticket)
    }

    pub fn mode(&self) -> &Mode {
        &self.mode
    }

    pub fn mode_kind(&self) -> ModeKind {
        self.mode.kind()
    }

    pub fn snap_radius_px(&self) -> f32 {
        self.snap_radius_px
    }

    pub fn set_snap_radius_px(&mut self, radius: f32) {
        self.snap_radius_px = radius.max(0.0);
    }

    pub fn banner(&self) -> Option<String> {
        self.mode.banner(&self.selection)
    }

    pub fn pending(&self) -> Option<&PendingDraft> {
        self.mode.pending()
    }

    /// Mini-form access for name and building edits.
    pub fn pending_mut(&mut self) -> Option<&mut PendingDraft> {
        match &mut self.mode {
            Mode::Place { draft, .. } => draft.as_mut(),
            _ => None,
        }
    }

    /// Switches mode. Any draft owned by the previous mode is dropped with it.
    /// Selecting the mode that is already active keeps its drafts.
    pub fn set_mode(&mut self, next: ModeKind) -> Vec<Effect> {
        if self.mode.kind() == next {
            return Vec::new();
        }
        tracing::debug!(from = ?self.mode.kind(), to = ?next, "mode change");
        self.mode = Mode::from_kind(next);
        match next {
            ModeKind::FootwayAb => vec![Effect::Notify(Notice::info(format!(
                "Draw {} footway (A→B): click vertices or the map.",
                self.selection.transit.label()
            )))],
            _ => Vec::new(),
        }
    }

    /// Global cancel (Escape / cancel button). Idempotent: with nothing
    /// active it does nothing at all.
    pub fn cancel(&mut self) -> Vec<Effect> {
        if !self.mode.has_side_state() {
            return Vec::new();
        }
        tracing::debug!(mode = ?self.mode.kind(), "cancelled");
        self.mode = Mode::Idle;
        vec![Effect::Notify(Notice::info("Mode cancelled"))]
    }

    /// A click on empty map at `raw`. Clicks arriving before the map can
    /// project coordinates are ignored.
    pub fn handle_map_click(
        &mut self,
        raw: LatLng,
        projection: &dyn Projection,
        data: &CampusData,
    ) -> Vec<Effect> {
        if matches!(self.mode, Mode::Idle) {
            return Vec::new();
        }
        let Some(at) = snap::snap(raw, data.vertices(), projection, self.snap_radius_px) else {
            tracing::debug!("map click ignored: projection not ready");
            return Vec::new();
        };
        match self.mode.kind() {
            ModeKind::Idle => Vec::new(),
            ModeKind::AddBuilding => {
                self.mode = Mode::Idle;
                vec![Effect::LocationSelected(at)]
            }
            ModeKind::FootwayAb => self.pick_ab(at),
            ModeKind::Entrance | ModeKind::Parking | ModeKind::Landmark => {
                if let Mode::Place { kind, draft } = &mut self.mode {
                    match draft {
                        Some(d) if d.is_submitting() => {
                            tracing::debug!("map click ignored: draft is being saved");
                        }
                        Some(d) => d.relocate(at, &data.buildings),
                        None => *draft = Some(PendingDraft::new(*kind, at, &data.buildings)),
                    }
                }
                Vec::new()
            }
        }
    }

    /// A click directly on a rendered vertex. Only meaningful while drawing a
    /// footway; the coordinate is already exact so no snapping happens.
    pub fn pick_vertex_as_ab(&mut self, vertex: LatLng) -> Vec<Effect> {
        if !matches!(self.mode, Mode::FootwayAb(_)) {
            return Vec::new();
        }
        self.pick_ab(vertex)
    }

    /// Routes a click that landed on an overlay.
    pub fn handle_overlay_click(&mut self, target: &ClickTarget) -> Vec<Effect> {
        match target {
            ClickTarget::Vertex(at) => self.pick_vertex_as_ab(*at),
            ClickTarget::Edit(entity) => vec![Effect::EditRequested(entity.clone())],
        }
    }

    fn pick_ab(&mut self, at: LatLng) -> Vec<Effect> {
        let Mode::FootwayAb(ab) = &mut self.mode else {
            return Vec::new();
        };
        match *ab {
            AbDraft { ticket: Some(_), .. } => {
                tracing::debug!("footway click ignored: insert in flight");
                Vec::new()
            }
            AbDraft { a: None, .. } => {
                ab.a = Some(at);
                vec![Effect::Notify(Notice::info(
                    "Point A set. Click for point B or pick a vertex.",
                ))]
            }
            AbDraft { a: Some(a), .. } => {
                if a == at {
                    return vec![Effect::Notify(Notice::warning(
                        "Point B must differ from point A.",
                    ))];
                }
                self.last_ticket += 1;
                let ticket = InsertTicket(self.last_ticket);
                ab.b = Some(at);
                ab.ticket = Some(ticket);
                let row = NewFootway {
                    name: None,
                    state: FootwayState::Open,
                    access_type: self.selection.transit,
                    geom: LineGeom::segment(a, at),
                };
                vec![Effect::Insert(ticket, NewEntity::Footway(row))]
            }
        }
    }

    /// Submits the open mini-form. No-op without a draft or while one
    /// submission is already in flight.
    pub fn submit_pending(&mut self) -> Vec<Effect> {
        if self.pending().is_none_or(|d| d.is_submitting()) {
            return Vec::new();
        }
        let ticket = self.issue_ticket();
        let selection = self.selection;
        let Some(draft) = self.pending_mut() else {
            return Vec::new();
        };
        draft.mark_submitting(ticket);
        vec![Effect::Insert(ticket, draft.to_new_entity(&selection))]
    }

    /// Discards the mini-form without inserting.
    pub fn cancel_pending(&mut self) -> Vec<Effect> {
        if self.pending().is_none() {
            return Vec::new();
        }
        self.mode = Mode::Idle;
        Vec::new()
    }

    /// Outcome of an [`Effect::Insert`] the editor requested.
    ///
    /// Only the draft holding `ticket` is affected. On success it is closed
    /// and the mode returns to idle. On failure the draft is cleared too, but
    /// the mode stays so the user can retry straight away. Replies for drafts
    /// that were cancelled or replaced only notify and reload.
    pub fn insert_finished(
        &mut self,
        ticket: InsertTicket,
        kind: EntityKind,
        result: Result<(), String>,
    ) -> Vec<Effect> {
        let owns_draft = match &self.mode {
            Mode::FootwayAb(ab) => ab.ticket == Some(ticket),
            Mode::Place { draft: Some(d), .. } => d.ticket() == Some(ticket),
            _ => false,
        };
        match result {
            Ok(()) => {
                if owns_draft {
                    self.mode = Mode::Idle;
                }
                tracing::info!(?kind, "entity created");
                vec![
                    Effect::Notify(Notice::success(format!("{} saved", kind.label()))),
                    Effect::Reload(kind),
                ]
            }
            Err(err) => {
                if owns_draft {
                    self.mode = Mode::from_kind(self.mode.kind());
                }
                tracing::warn!(?kind, %err, "insert failed");
                vec![Effect::Notify(Notice::error(format!(
                    "Could not save {}: {err}",
                    kind.label().to_lowercase()
                )))]
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{
        Building, BuildingStatus, EntranceType, Footway, NewEntrance, PointGeom, TransitKind,
    };
    use eframe::egui;
    use pretty_assertions::assert_eq;
    use projection::{MapView, test_view};

    const M: f64 = 1.0 / 111_195.0;

    fn building(id: &str, at: LatLng) -> Building {
        Building {
            id: id.into(),
            name: id.to_uppercase(),
            latitude: at.lat,
            longitude: at.lng,
            total_floors: 1,
            building_code: None,
            description: None,
            state: BuildingStatus::Enabled,
        }
    }

    fn inserts(effects: &[Effect]) -> Vec<&NewEntity> {
        effects
            .iter()
            .filter_map(|e| match e {
                Effect::Insert(_, row) => Some(row),
                _ => None,
            })
            .collect()
    }

    fn ticket_of(effects: &[Effect]) -> InsertTicket {
        effects
            .iter()
            .find_map(|e| match e {
                Effect::Insert(ticket, _) => Some(*ticket),
                _ => None,
            })
            .expect("no insert in effects")
    }

    fn at(view: &MapView, x: f32, y: f32) -> LatLng {
        view.unproject(egui::pos2(x, y)).unwrap()
    }

    #[test]
    fn idle_clicks_create_nothing() {
        let view = test_view();
        let mut editor = Editor::default();
        let fx = editor.handle_map_click(at(&view, 10.0, 10.0), &view, &CampusData::default());
        assert!(fx.is_empty());
        assert_eq!(editor.mode_kind(), ModeKind::Idle);
    }

    #[test]
    fn add_building_emits_location_and_resets() {
        let view = test_view();
        let mut editor = Editor::default();
        editor.set_mode(ModeKind::AddBuilding);
        let p = at(&view, 120.0, 80.0);
        let fx = editor.handle_map_click(p, &view, &CampusData::default());
        assert_eq!(fx, vec![Effect::LocationSelected(p)]);
        assert_eq!(editor.mode_kind(), ModeKind::Idle);
    }

    #[test]
    fn footway_first_click_records_a_without_insert() {
        let view = test_view();
        let mut editor = Editor::default();
        editor.set_mode(ModeKind::FootwayAb);
        let a = at(&view, 100.0, 100.0);
        let fx = editor.handle_map_click(a, &view, &CampusData::default());
        assert!(inserts(&fx).is_empty());
        assert_eq!(editor.mode(), &Mode::FootwayAb(AbDraft { a: Some(a), ..AbDraft::default() }));
    }

    #[test]
    fn footway_end_to_end_pedestrian() {
        let view = test_view();
        let data = CampusData::default();
        let mut editor = Editor::default();
        editor.selection.transit = TransitKind::Pedestrian;
        editor.set_mode(ModeKind::FootwayAb);
        let a = at(&view, 100.0, 100.0);
        let b = at(&view, 300.0, 250.0);
        editor.handle_map_click(a, &view, &data);
        let fx = editor.handle_map_click(b, &view, &data);

        let rows = inserts(&fx);
        assert_eq!(rows.len(), 1);
        let NewEntity::Footway(row) = rows[0] else {
            panic!("expected footway insert");
        };
        assert_eq!(row.geom.coordinates, vec![[a.lng, a.lat], [b.lng, b.lat]]);
        assert_eq!(row.state, FootwayState::Open);
        assert_eq!(row.access_type, TransitKind::Pedestrian);
        assert_eq!(row.name, None);

        let fx = editor.insert_finished(ticket_of(&fx), EntityKind::Footway, Ok(()));
        assert!(fx.contains(&Effect::Reload(EntityKind::Footway)));
        assert_eq!(editor.mode_kind(), ModeKind::Idle);
    }

    #[test]
    fn rapid_third_click_does_not_double_submit() {
        let view = test_view();
        let data = CampusData::default();
        let mut editor = Editor::default();
        editor.set_mode(ModeKind::FootwayAb);
        editor.handle_map_click(at(&view, 100.0, 100.0), &view, &data);
        let first = editor.handle_map_click(at(&view, 200.0, 100.0), &view, &data);
        let second = editor.handle_map_click(at(&view, 200.0, 101.0), &view, &data);
        assert_eq!(inserts(&first).len(), 1);
        assert!(second.is_empty());
    }

    #[test]
    fn footway_insert_failure_clears_points_but_keeps_mode() {
        let view = test_view();
        let data = CampusData::default();
        let mut editor = Editor::default();
        editor.set_mode(ModeKind::FootwayAb);
        editor.handle_map_click(at(&view, 100.0, 100.0), &view, &data);
        let fx = editor.handle_map_click(at(&view, 200.0, 100.0), &view, &data);
        let fx = editor.insert_finished(ticket_of(&fx), EntityKind::Footway, Err("offline".into()));
        assert!(matches!(&fx[..], [Effect::Notify(n)] if n.level == NoticeLevel::Error));
        assert_eq!(editor.mode(), &Mode::FootwayAb(AbDraft::default()));
        assert!(layers::draft_overlays(editor.mode()).is_empty());
    }

    #[test]
    fn cancel_after_point_a_inserts_nothing_and_clears_marker() {
        let view = test_view();
        let mut editor = Editor::default();
        editor.set_mode(ModeKind::FootwayAb);
        editor.handle_map_click(at(&view, 100.0, 100.0), &view, &CampusData::default());
        assert_eq!(layers::draft_overlays(editor.mode()).len(), 1);
        let fx = editor.cancel();
        assert!(inserts(&fx).is_empty());
        assert_eq!(editor.mode(), &Mode::Idle);
        assert!(layers::draft_overlays(editor.mode()).is_empty());
    }

    #[test]
    fn cancel_when_idle_is_a_silent_no_op() {
        let mut editor = Editor::default();
        assert!(editor.cancel().is_empty());
        assert!(editor.cancel().is_empty());
    }

    #[test]
    fn leaving_footway_mode_drops_point_a() {
        let view = test_view();
        let mut editor = Editor::default();
        editor.set_mode(ModeKind::FootwayAb);
        editor.handle_map_click(at(&view, 100.0, 100.0), &view, &CampusData::default());
        editor.set_mode(ModeKind::Parking);
        editor.set_mode(ModeKind::FootwayAb);
        assert_eq!(editor.mode(), &Mode::FootwayAb(AbDraft::default()));
    }

    #[test]
    fn footway_endpoint_snaps_to_existing_vertex() {
        let view = test_view();
        let vertex = at(&view, 400.0, 300.0);
        let other = at(&view, 450.0, 300.0);
        let mut data = CampusData::default();
        data.footways.push(Footway {
            id: "f1".into(),
            name: None,
            state: FootwayState::Open,
            access_type: TransitKind::Both,
            geom: LineGeom::segment(vertex, other),
        });
        let mut editor = Editor::default();
        editor.set_mode(ModeKind::FootwayAb);
        editor.handle_map_click(at(&view, 404.0, 297.0), &view, &data);
        assert_eq!(editor.mode(), &Mode::FootwayAb(AbDraft { a: Some(vertex), ..AbDraft::default() }));
    }

    #[test]
    fn vertex_pick_only_works_while_drawing() {
        let mut editor = Editor::default();
        let v = LatLng::new(-2.1, -79.6);
        assert!(editor.pick_vertex_as_ab(v).is_empty());
        assert_eq!(editor.mode(), &Mode::Idle);

        editor.set_mode(ModeKind::FootwayAb);
        editor.pick_vertex_as_ab(v);
        let w = LatLng::new(-2.2, -79.7);
        let fx = editor.pick_vertex_as_ab(w);
        let NewEntity::Footway(row) = inserts(&fx)[0] else {
            panic!("expected footway insert");
        };
        assert_eq!(row.geom, LineGeom::segment(v, w));
    }

    #[test]
    fn same_point_twice_is_rejected() {
        let mut editor = Editor::default();
        editor.set_mode(ModeKind::FootwayAb);
        let v = LatLng::new(-2.1, -79.6);
        editor.pick_vertex_as_ab(v);
        let fx = editor.pick_vertex_as_ab(v);
        assert!(inserts(&fx).is_empty());
        assert_eq!(editor.mode(), &Mode::FootwayAb(AbDraft { a: Some(v), ..AbDraft::default() }));
    }

    #[test]
    fn overlay_edit_click_routes_to_host() {
        let mut editor = Editor::default();
        let target = ClickTarget::Edit(EntityRef {
            kind: EntityKind::Parking,
            id: "p7".into(),
        });
        let fx = editor.handle_overlay_click(&target);
        assert_eq!(
            fx,
            vec![Effect::EditRequested(EntityRef {
                kind: EntityKind::Parking,
                id: "p7".into()
            })]
        );
    }

    #[test]
    fn entrance_end_to_end_with_nearest_building() {
        let view = test_view();
        let p = at(&view, 400.0, 300.0);
        let mut data = CampusData::default();
        data.buildings.push(building("far", LatLng::new(p.lat + 30.0 * M, p.lng)));
        data.buildings.push(building("near", LatLng::new(p.lat + 3.0 * M, p.lng)));

        let mut editor = Editor::default();
        editor.selection.entrance = EntranceType::Vehicular;
        editor.set_mode(ModeKind::Entrance);
        let fx = editor.handle_map_click(p, &view, &data);
        assert!(fx.is_empty());

        let draft = editor.pending().unwrap();
        assert_eq!(draft.kind(), mode::PointKind::Entrance);
        assert_eq!(draft.building_id(), Some("near"));
        assert_eq!(draft.name, "");
        assert_eq!(editor.banner(), None);

        editor.pending_mut().unwrap().update_name("Gate 1");
        let submitted = editor.submit_pending();
        assert_eq!(
            inserts(&submitted),
            vec![&NewEntity::Entrance(NewEntrance {
                name: Some("Gate 1".into()),
                building_id: Some("near".into()),
                kind: EntranceType::Vehicular,
                is_active: true,
                location: PointGeom::at(p),
            })]
        );
        assert!(editor.submit_pending().is_empty());

        let fx = editor.insert_finished(ticket_of(&submitted), EntityKind::Entrance, Ok(()));
        assert!(fx.contains(&Effect::Reload(EntityKind::Entrance)));
        assert_eq!(editor.mode_kind(), ModeKind::Idle);
        assert!(editor.pending().is_none());
    }

    #[test]
    fn pending_failure_clears_draft_keeps_mode() {
        let view = test_view();
        let mut editor = Editor::default();
        editor.set_mode(ModeKind::Landmark);
        editor.handle_map_click(at(&view, 10.0, 10.0), &view, &CampusData::default());
        let fx = editor.submit_pending();
        editor.insert_finished(ticket_of(&fx), EntityKind::Landmark, Err("denied".into()));
        assert!(editor.pending().is_none());
        assert_eq!(editor.mode_kind(), ModeKind::Landmark);
    }

    #[test]
    fn cancel_pending_returns_to_idle_without_insert() {
        let view = test_view();
        let mut editor = Editor::default();
        editor.set_mode(ModeKind::Parking);
        editor.handle_map_click(at(&view, 10.0, 10.0), &view, &CampusData::default());
        let fx = editor.cancel_pending();
        assert!(inserts(&fx).is_empty());
        assert_eq!(editor.mode(), &Mode::Idle);
    }

    #[test]
    fn second_click_moves_open_draft() {
        let view = test_view();
        let mut editor = Editor::default();
        editor.set_mode(ModeKind::Landmark);
        let data = CampusData::default();
        editor.handle_map_click(at(&view, 10.0, 10.0), &view, &data);
        editor.pending_mut().unwrap().update_name("Fountain");
        let q = at(&view, 50.0, 60.0);
        editor.handle_map_click(q, &view, &data);
        let draft = editor.pending().unwrap();
        assert_eq!(draft.location(), q);
        assert_eq!(draft.name, "Fountain");
    }

    #[test]
    fn clicks_before_map_ready_are_ignored() {
        let view = MapView::new(LatLng::new(0.0, 0.0), 16.0);
        let mut editor = Editor::default();
        editor.set_mode(ModeKind::AddBuilding);
        assert!(editor.handle_map_click(LatLng::new(0.0, 0.0), &view, &CampusData::default()).is_empty());
        assert_eq!(editor.mode_kind(), ModeKind::AddBuilding);
    }

    #[test]
    fn late_insert_reply_after_cancel_leaves_mode_alone() {
        let view = test_view();
        let data = CampusData::default();
        let mut editor = Editor::default();
        editor.set_mode(ModeKind::FootwayAb);
        editor.handle_map_click(at(&view, 100.0, 100.0), &view, &data);
        let fx = editor.handle_map_click(at(&view, 200.0, 100.0), &view, &data);
        editor.cancel();
        editor.set_mode(ModeKind::Entrance);
        let fx = editor.insert_finished(ticket_of(&fx), EntityKind::Footway, Ok(()));
        assert!(fx.contains(&Effect::Reload(EntityKind::Footway)));
        assert_eq!(editor.mode_kind(), ModeKind::Entrance);
    }

    #[test]
    fn stale_reply_after_redraw_keeps_new_draft() {
        let view = test_view();
        let data = CampusData::default();
        let mut editor = Editor::default();
        editor.set_mode(ModeKind::FootwayAb);
        editor.handle_map_click(at(&view, 100.0, 100.0), &view, &data);
        let first = ticket_of(&editor.handle_map_click(at(&view, 200.0, 100.0), &view, &data));
        editor.cancel();

        editor.set_mode(ModeKind::FootwayAb);
        editor.handle_map_click(at(&view, 300.0, 100.0), &view, &data);
        let second = ticket_of(&editor.handle_map_click(at(&view, 400.0, 100.0), &view, &data));
        assert_ne!(first, second);

        editor.insert_finished(first, EntityKind::Footway, Ok(()));
        assert_eq!(editor.mode_kind(), ModeKind::FootwayAb);
        assert!(matches!(editor.mode(), Mode::FootwayAb(ab) if ab.ticket == Some(second)));

        editor.insert_finished(first, EntityKind::Footway, Err("timeout".into()));
        let blocked = editor.handle_map_click(at(&view, 500.0, 100.0), &view, &data);
        assert!(inserts(&blocked).is_empty());

        editor.insert_finished(second, EntityKind::Footway, Ok(()));
        assert_eq!(editor.mode(), &Mode::Idle);
    }

    #[test]
    fn stale_reply_leaves_resubmitted_point_draft() {
        let view = test_view();
        let data = CampusData::default();
        let mut editor = Editor::default();
        editor.set_mode(ModeKind::Parking);
        editor.handle_map_click(at(&view, 10.0, 10.0), &view, &data);
        let first = ticket_of(&editor.submit_pending());
        editor.cancel();

        editor.set_mode(ModeKind::Parking);
        editor.handle_map_click(at(&view, 20.0, 20.0), &view, &data);
        let second = ticket_of(&editor.submit_pending());

        editor.insert_finished(first, EntityKind::Parking, Err("denied".into()));
        assert_eq!(editor.pending().and_then(|d| d.ticket()), Some(second));
    }
}
