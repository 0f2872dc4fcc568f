use crate::editor::mode::PointKind;
use crate::editor::{Editor, Effect};
use crate::model::{
    self, BuildingStatus, CampusData, EntityKind, EntityRef, InsertTicket, LatLng, NewBuilding,
};
use eframe::egui;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub(super) enum FormError {
    #[error("name is required")]
    MissingName,
    #[error("a building needs at least one floor")]
    NoFloors,
    #[error("{0} must be a number")]
    NotANumber(&'static str),
    #[error("{0} is out of range")]
    OutOfRange(&'static str),
}

/// Host side of the location-selection callback: collects the rest of a
/// building before it is inserted.
#[derive(Clone, Debug)]
pub(super) struct BuildingForm {
    pub name: String,
    pub code: String,
    pub description: String,
    pub floors: u32,
    pub latitude: String,
    pub longitude: String,
    pub state: BuildingStatus,
    /// Insert in flight for this form, if any.
    pub pending_insert: Option<InsertTicket>,
    pub error: Option<String>,
}

impl BuildingForm {
    pub fn at(location: LatLng) -> Self {
        Self {
            name: String::new(),
            code: String::new(),
            description: String::new(),
            floors: 1,
            latitude: format!("{:.6}", location.lat),
            longitude: format!("{:.6}", location.lng),
            state: BuildingStatus::Enabled,
            pending_insert: None,
            error: None,
        }
    }

    pub fn validate(&self) -> Result<NewBuilding, FormError> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(FormError::MissingName);
        }
        if self.floors < 1 {
            return Err(FormError::NoFloors);
        }
        let latitude = parse_coordinate(&self.latitude, "latitude", 90.0)?;
        let longitude = parse_coordinate(&self.longitude, "longitude", 180.0)?;
        Ok(NewBuilding {
            name: name.to_string(),
            building_code: optional(&self.code),
            description: optional(&self.description),
            total_floors: self.floors,
            latitude,
            longitude,
            state: self.state,
        })
    }
}

fn optional(s: &str) -> Option<String> {
    Some(s.trim()).filter(|s| !s.is_empty()).map(str::to_string)
}

fn parse_coordinate(s: &str, field: &'static str, limit: f64) -> Result<f64, FormError> {
    let v: f64 = s.trim().parse().map_err(|_| FormError::NotANumber(field))?;
    if !v.is_finite() || v.abs() > limit {
        return Err(FormError::OutOfRange(field));
    }
    Ok(v)
}

pub(super) enum FormAction {
    Submit(NewBuilding),
    Cancel,
}

pub(super) fn building_form_window(ctx: &egui::Context, form: &mut BuildingForm) -> Option<FormAction> {
    let mut action = None;
    let mut open = true;
    egui::Window::new("New building")
        .open(&mut open)
        .collapsible(false)
        .resizable(false)
        .anchor(egui::Align2::CENTER_CENTER, egui::vec2(0.0, 0.0))
        .show(ctx, |ui| {
            egui::Grid::new("building_form").num_columns(2).show(ui, |ui| {
                ui.label("Name *");
                ui.text_edit_singleline(&mut form.name);
                ui.end_row();
                ui.label("Code");
                ui.text_edit_singleline(&mut form.code);
                ui.end_row();
                ui.label("Description");
                ui.text_edit_multiline(&mut form.description);
                ui.end_row();
                ui.label("Floors");
                ui.add(egui::DragValue::new(&mut form.floors).range(1..=200));
                ui.end_row();
                ui.label("Latitude");
                ui.text_edit_singleline(&mut form.latitude);
                ui.end_row();
                ui.label("Longitude");
                ui.text_edit_singleline(&mut form.longitude);
                ui.end_row();
                ui.label("Status");
                egui::ComboBox::from_id_salt("building_state")
                    .selected_text(form.state.label())
                    .show_ui(ui, |ui| {
                        for state in BuildingStatus::ALL {
                            ui.selectable_value(&mut form.state, state, state.label());
                        }
                    });
                ui.end_row();
            });
            if let Some(err) = &form.error {
                ui.colored_label(egui::Color32::from_rgb(239, 68, 68), err);
            }
            ui.separator();
            ui.horizontal(|ui| {
                let save = ui.add_enabled(form.pending_insert.is_none(), egui::Button::new("Save"));
                if save.clicked() {
                    match form.validate() {
                        Ok(row) => {
                            form.error = None;
                            action = Some(FormAction::Submit(row));
                        }
                        Err(err) => form.error = Some(err.to_string()),
                    }
                }
                if ui.button("Cancel").clicked() {
                    action = Some(FormAction::Cancel);
                }
                if form.pending_insert.is_some() {
                    ui.spinner();
                }
            });
        });
    if !open {
        action = Some(FormAction::Cancel);
    }
    action
}

/// Mini-form for the pending entrance/parking/landmark. Returns whatever the
/// editor asked for when the user saved or cancelled.
pub(super) fn pending_form_window(ctx: &egui::Context, editor: &mut Editor) -> Vec<Effect> {
    let selection = editor.selection;
    let Some(draft) = editor.pending_mut() else {
        return Vec::new();
    };
    let type_label = match draft.kind() {
        PointKind::Entrance => selection.entrance.label(),
        PointKind::Parking => selection.parking.label(),
        PointKind::Landmark => selection.landmark.label(),
    };
    let at = draft.location();
    let mut submit = false;
    let mut cancel = false;
    let mut open = true;
    egui::Window::new(draft.kind().title())
        .id(egui::Id::new("pending_form"))
        .open(&mut open)
        .collapsible(false)
        .resizable(false)
        .show(ctx, |ui| {
            ui.label(format!("Type: {type_label}"));
            ui.small(format!("{:.6}, {:.6}", at.lat, at.lng));
            ui.separator();
            let mut name = draft.name.clone();
            let resp = ui.add(
                egui::TextEdit::singleline(&mut name).hint_text("Name (optional)"),
            );
            if resp.changed() {
                draft.update_name(name);
            }
            let current = draft
                .building_id()
                .and_then(|id| draft.choices().iter().find(|c| c.id == id))
                .map(|c| c.name.clone())
                .unwrap_or_else(|| "No building".to_string());
            let mut chosen: Option<Option<String>> = None;
            egui::ComboBox::from_label("Building")
                .selected_text(current)
                .show_ui(ui, |ui| {
                    if ui.selectable_label(draft.building_id().is_none(), "No building").clicked() {
                        chosen = Some(None);
                    }
                    for choice in draft.choices() {
                        let selected = draft.building_id() == Some(choice.id.as_str());
                        let label = format!("{} · {:.0} m", choice.name, choice.distance_m);
                        if ui.selectable_label(selected, label).clicked() {
                            chosen = Some(Some(choice.id.clone()));
                        }
                    }
                });
            if let Some(id) = chosen {
                draft.update_building_id(id);
            }
            ui.separator();
            ui.horizontal(|ui| {
                let busy = draft.is_submitting();
                if ui.add_enabled(!busy, egui::Button::new("Save")).clicked() {
                    submit = true;
                }
                if ui.add_enabled(!busy, egui::Button::new("Cancel")).clicked() {
                    cancel = true;
                }
                if busy {
                    ui.spinner();
                }
            });
        });
    if submit {
        editor.submit_pending()
    } else if cancel || !open {
        editor.cancel_pending()
    } else {
        Vec::new()
    }
}

/// Read-only details for an entity whose edit was requested.
pub(super) fn inspector_window(ctx: &egui::Context, target: &EntityRef, data: &CampusData, open: &mut bool) {
    egui::Window::new(format!("{} details", target.kind.label()))
        .id(egui::Id::new("inspector"))
        .open(open)
        .collapsible(false)
        .resizable(false)
        .show(ctx, |ui| {
            let rows = entity_rows(target, data);
            if rows.is_empty() {
                ui.label("This entity is no longer loaded.");
                return;
            }
            egui::Grid::new("inspector_grid").num_columns(2).striped(true).show(ui, |ui| {
                for (key, value) in rows {
                    ui.label(egui::RichText::new(key).strong());
                    ui.label(value);
                    ui.end_row();
                }
            });
        });
}

fn point_rows(
    id: &str,
    name: &Option<String>,
    kind: &str,
    active: Option<bool>,
    building: Option<&str>,
    at: LatLng,
    data: &CampusData,
) -> Vec<(&'static str, String)> {
    let building = building
        .map(|id| data.building(id).map(|b| b.name.clone()).unwrap_or_else(|| id.to_string()))
        .unwrap_or_else(|| "—".to_string());
    vec![
        ("Id", id.to_string()),
        ("Name", name.clone().unwrap_or_else(|| "—".to_string())),
        ("Type", kind.to_string()),
        ("Active", if model::is_active(active) { "yes" } else { "no" }.to_string()),
        ("Building", building),
        ("Location", format!("{:.6}, {:.6}", at.lat, at.lng)),
    ]
}

fn entity_rows(target: &EntityRef, data: &CampusData) -> Vec<(&'static str, String)> {
    let id = target.id.as_str();
    match target.kind {
        EntityKind::Building => data
            .building(id)
            .map(|b| {
                vec![
                    ("Id", b.id.clone()),
                    ("Name", b.name.clone()),
                    ("Code", b.building_code.clone().unwrap_or_else(|| "—".to_string())),
                    ("Floors", b.total_floors.to_string()),
                    ("Status", b.state.label().to_string()),
                    ("Location", format!("{:.6}, {:.6}", b.latitude, b.longitude)),
                ]
            })
            .unwrap_or_default(),
        EntityKind::Footway => data
            .footways
            .iter()
            .find(|f| f.id == id)
            .map(|f| {
                vec![
                    ("Id", f.id.clone()),
                    ("Name", f.name.clone().unwrap_or_else(|| "—".to_string())),
                    ("Access", f.access_type.label().to_string()),
                    ("State", format!("{:?}", f.state).to_uppercase()),
                    ("Points", f.geom.points().count().to_string()),
                ]
            })
            .unwrap_or_default(),
        EntityKind::Entrance => data
            .entrances
            .iter()
            .find(|e| e.id == id)
            .map(|e| {
                point_rows(
                    &e.id,
                    &e.name,
                    e.kind.label(),
                    e.is_active,
                    e.building_id.as_deref(),
                    e.location.latlng(),
                    data,
                )
            })
            .unwrap_or_default(),
        EntityKind::Parking => data
            .parkings
            .iter()
            .find(|p| p.id == id)
            .map(|p| {
                let mut rows = point_rows(
                    &p.id,
                    &p.name,
                    p.kind.label(),
                    p.is_active,
                    p.building_id.as_deref(),
                    p.location.latlng(),
                    data,
                );
                rows.push((
                    "Capacity",
                    p.capacity.map(|c| c.to_string()).unwrap_or_else(|| "—".to_string()),
                ));
                rows
            })
            .unwrap_or_default(),
        EntityKind::Landmark => data
            .landmarks
            .iter()
            .find(|l| l.id == id)
            .map(|l| {
                point_rows(
                    &l.id,
                    &l.name,
                    l.kind.label(),
                    l.is_active,
                    l.building_id.as_deref(),
                    l.location.latlng(),
                    data,
                )
            })
            .unwrap_or_default(),
    }
}
