use crate::editor::mode::ModeKind;
use crate::editor::projection::Projection;
use crate::model::{EntityKind, EntranceType, LandmarkType, NewEntity, ParkingType, TransitKind};
use eframe::egui;

use super::command_palette::{CommandContext, CommandPalette};
use super::forms::{self, FormAction};
use super::render::{draw_banner, draw_basemap, draw_overlays, mode_button, notice_color};
use super::CampusApp;

fn type_combo<T: Copy + PartialEq>(
    ui: &mut egui::Ui,
    id: &str,
    value: &mut T,
    all: &[T],
    label: fn(T) -> &'static str,
) -> bool {
    let mut changed = false;
    egui::ComboBox::from_id_salt(id)
        .selected_text(label(*value))
        .width(96.0)
        .show_ui(ui, |ui| {
            for option in all {
                changed |= ui.selectable_value(value, *option, label(*option)).changed();
            }
        });
    changed
}

impl CampusApp {
    fn handle_keys(&mut self, ctx: &egui::Context) {
        let wants_keyboard = ctx.wants_keyboard_input();
        let mut escape = false;
        ctx.input_mut(|i| {
            if !self.command_palette.open
                && i.consume_key(egui::Modifiers::COMMAND | egui::Modifiers::SHIFT, egui::Key::P)
            {
                self.command_palette.open("");
            }
            if i.consume_key(egui::Modifiers::NONE, egui::Key::F1) {
                self.show_help = true;
            }
            if self.command_palette.open {
                return;
            }
            escape = i.consume_key(egui::Modifiers::NONE, egui::Key::Escape);
            if wants_keyboard {
                return;
            }
            if i.consume_key(egui::Modifiers::NONE, egui::Key::Space) {
                self.command_palette.open("");
            }
            let modes = [
                (egui::Key::B, ModeKind::AddBuilding),
                (egui::Key::F, ModeKind::FootwayAb),
                (egui::Key::E, ModeKind::Entrance),
                (egui::Key::P, ModeKind::Parking),
                (egui::Key::L, ModeKind::Landmark),
            ];
            for (key, mode) in modes {
                if i.consume_key(egui::Modifiers::NONE, key) {
                    self.set_mode(mode);
                }
            }
            if i.consume_key(egui::Modifiers::NONE, egui::Key::R) {
                self.reload_all();
            }
            if i.consume_key(egui::Modifiers::NONE, egui::Key::Home) {
                self.recenter();
            }
        });
        if escape {
            self.inspecting = None;
            self.building_form = None;
            self.cancel();
        }
    }

    fn top_bar(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            egui::menu::bar(ui, |ui| {
                ui.menu_button("Map", |ui| {
                    if ui.button("Open campus file...").clicked() {
                        self.open_campus_file_dialog(ctx);
                        ui.close_menu();
                    }
                    if ui.button("Reload all (R)").clicked() {
                        self.reload_all();
                        ui.close_menu();
                    }
                    if ui.button("Recenter (Home)").clicked() {
                        self.recenter();
                        ui.close_menu();
                    }
                    ui.separator();
                    if ui.checkbox(&mut self.settings.show_tiles, "Show basemap").changed() {
                        self.persist_settings();
                    }
                    let mut radius = self.editor.snap_radius_px();
                    let slider = ui.add(egui::Slider::new(&mut radius, 0.0..=40.0).text("Snap radius (px)"));
                    if slider.changed() {
                        self.editor.set_snap_radius_px(radius);
                    }
                    if slider.drag_stopped() || slider.lost_focus() {
                        self.persist_settings();
                    }
                });
                ui.menu_button("Help", |ui| {
                    if ui.button("Show Help (F1)").clicked() {
                        self.show_help = true;
                        ui.close_menu();
                    }
                    if ui.button("Command Palette (⌘⇧P)").clicked() {
                        self.command_palette.open("");
                        ui.close_menu();
                    }
                });
                ui.separator();
                let current = self.editor.mode_kind();
                let modes = [
                    ("Browse", ModeKind::Idle),
                    ("Building", ModeKind::AddBuilding),
                    ("Footway", ModeKind::FootwayAb),
                    ("Entrance", ModeKind::Entrance),
                    ("Parking", ModeKind::Parking),
                    ("Landmark", ModeKind::Landmark),
                ];
                for (label, mode) in modes {
                    if mode_button(ui, label, mode, current) {
                        self.set_mode(mode);
                    }
                }
                ui.separator();
                let mut selection = self.editor.selection;
                let mut changed = false;
                ui.label("Transit");
                changed |= type_combo(ui, "transit", &mut selection.transit, &TransitKind::ALL, TransitKind::label);
                ui.label("Entrance");
                changed |= type_combo(ui, "entrance", &mut selection.entrance, &EntranceType::ALL, EntranceType::label);
                ui.label("Parking");
                changed |= type_combo(ui, "parking", &mut selection.parking, &ParkingType::ALL, ParkingType::label);
                ui.label("Landmark");
                changed |= type_combo(ui, "landmark", &mut selection.landmark, &LandmarkType::ALL, LandmarkType::label);
                if changed {
                    self.update_selection(|s| *s = selection);
                }
            });
        });
    }

    fn status_bar(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                let color = self
                    .status
                    .as_ref()
                    .map(notice_color)
                    .unwrap_or(egui::Color32::from_gray(200));
                ui.colored_label(color, self.status_text());
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    ui.label(format!("Zoom: {:.1}", self.view.zoom()));
                    ui.separator();
                    let counts: Vec<String> = EntityKind::ALL
                        .iter()
                        .map(|&kind| format!("{} {}", kind.label(), self.data.count(kind)))
                        .collect();
                    ui.label(counts.join(" · "));
                    ui.separator();
                    match &self.store {
                        Some(store) => ui.label(store.description()),
                        None => ui.colored_label(egui::Color32::from_rgb(239, 68, 68), "no store"),
                    };
                    ui.separator();
                    ui.label(self.editor.mode_kind().label());
                });
            });
        });
    }

    fn map_canvas(&mut self, ctx: &egui::Context) {
        egui::CentralPanel::default()
            .frame(egui::Frame::new())
            .show(ctx, |ui| {
                let (rect, response) =
                    ui.allocate_exact_size(ui.available_size(), egui::Sense::click_and_drag());
                self.view.set_viewport(rect);

                let hover = response.hover_pos();
                if let Some(pos) = hover {
                    if self.interaction.scroll_zoom {
                        let scroll = ctx.input(|i| i.raw_scroll_delta.y);
                        if scroll.abs() > 0.0 {
                            let steps = (scroll as f64 * 0.002).clamp(-0.5, 0.5);
                            self.view.zoom_about(pos, steps);
                        }
                    }
                    if self.interaction.touch_zoom {
                        let pinch = ctx.input(|i| i.zoom_delta());
                        if (pinch - 1.0).abs() > f32::EPSILON {
                            self.view.zoom_about(pos, (pinch as f64).log2());
                        }
                    }
                }
                if self.interaction.dragging && response.dragged() {
                    self.view.pan_by(response.drag_delta());
                }
                if self.interaction.double_click_zoom
                    && response.double_clicked()
                    && self.editor.mode_kind() == ModeKind::Idle
                {
                    if let Some(pos) = response.interact_pointer_pos() {
                        self.view.zoom_about(pos, 1.0);
                    }
                }

                if response.clicked() && self.interaction.accepts_clicks() {
                    if let Some(pos) = response.interact_pointer_pos() {
                        let effects = match self.layers.hit_test(pos, &self.view).cloned() {
                            Some(target) => self.editor.handle_overlay_click(&target),
                            None => match self.view.unproject(pos) {
                                Some(at) => self.editor.handle_map_click(at, &self.view, &self.data),
                                None => Vec::new(),
                            },
                        };
                        self.apply_effects(effects);
                        self.sync_frame_state();
                    }
                }

                let painter = ui.painter_at(rect);
                let tiles = self.settings.show_tiles.then_some(&mut self.tiles);
                draw_basemap(&painter, rect, &self.view, tiles);
                draw_overlays(&painter, &self.view, &self.layers);
                if let Some(text) = self.editor.banner() {
                    draw_banner(&painter, rect, &text);
                }

                if self.editor.mode_kind() != ModeKind::Idle {
                    if hover.is_some() {
                        ctx.set_cursor_icon(egui::CursorIcon::Crosshair);
                    }
                } else if let Some(pos) = hover {
                    if let Some(overlay) = self.layers.hovered(pos, &self.view) {
                        let title = overlay.title.clone();
                        response.on_hover_text_at_pointer(title);
                    }
                }
            });
    }

    fn dialogs(&mut self, ctx: &egui::Context) {
        let effects = forms::pending_form_window(ctx, &mut self.editor);
        self.apply_effects(effects);

        let action = self
            .building_form
            .as_mut()
            .and_then(|form| forms::building_form_window(ctx, form));
        match action {
            Some(FormAction::Submit(row)) => {
                let ticket = self.editor.issue_ticket();
                if let Some(form) = &mut self.building_form {
                    form.pending_insert = Some(ticket);
                }
                self.submit(ticket, NewEntity::Building(row));
            }
            Some(FormAction::Cancel) => self.building_form = None,
            None => {}
        }

        let close_inspector = match &self.inspecting {
            Some(target) => {
                let mut open = true;
                forms::inspector_window(ctx, target, &self.data, &mut open);
                !open
            }
            None => false,
        };
        if close_inspector {
            self.inspecting = None;
        }

        let cx = CommandContext {
            mode: self.editor.mode_kind(),
            can_cancel: self.editor.mode().has_side_state(),
            has_store: self.store.is_some(),
        };
        if let Some(cmd) = self.command_palette.ui(ctx, cx) {
            CommandPalette::execute(self, ctx, cmd);
        }

        super::help::draw_help_window(ctx, &mut self.show_help);
    }
}

impl eframe::App for CampusApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.poll_store();
        self.tiles.poll(ctx);
        self.handle_keys(ctx);
        self.sync_frame_state();

        self.top_bar(ctx);
        self.status_bar(ctx);
        self.map_canvas(ctx);
        self.dialogs(ctx);
    }
}
