use crate::editor::mode::ModeKind;
use crate::model::{EntranceType, LandmarkType, ParkingType, TransitKind};
use eframe::egui;
use fuzzy_matcher::FuzzyMatcher;
use fuzzy_matcher::skim::SkimMatcherV2;

use super::CampusApp;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(super) enum CommandId {
    Mode(ModeKind),
    Transit(TransitKind),
    Entrance(EntranceType),
    Parking(ParkingType),
    Landmark(LandmarkType),
    Cancel,
    OpenFile,
    ReloadAll,
    Recenter,
    ToggleTiles,
    Help,
}

pub(super) struct CommandSpec {
    pub id: CommandId,
    pub name: &'static str,
    pub search: &'static str,
}

const COMMANDS: &[CommandSpec] = &[
    CommandSpec { id: CommandId::Mode(ModeKind::Idle), name: "Mode: Browse", search: "browse idle select mode" },
    CommandSpec { id: CommandId::Mode(ModeKind::AddBuilding), name: "Mode: Add building", search: "add building place mode b" },
    CommandSpec { id: CommandId::Mode(ModeKind::FootwayAb), name: "Mode: Draw footway (A→B)", search: "draw footway path line ab mode f" },
    CommandSpec { id: CommandId::Mode(ModeKind::Entrance), name: "Mode: Add entrance", search: "add entrance gate door mode e" },
    CommandSpec { id: CommandId::Mode(ModeKind::Parking), name: "Mode: Add parking", search: "add parking lot mode p" },
    CommandSpec { id: CommandId::Mode(ModeKind::Landmark), name: "Mode: Add landmark", search: "add landmark poi mode l" },
    CommandSpec { id: CommandId::Transit(TransitKind::Pedestrian), name: "Footway: Pedestrian", search: "footway transit pedestrian walk" },
    CommandSpec { id: CommandId::Transit(TransitKind::Vehicular), name: "Footway: Vehicular", search: "footway transit vehicular car road" },
    CommandSpec { id: CommandId::Transit(TransitKind::Both), name: "Footway: Mixed", search: "footway transit both mixed" },
    CommandSpec { id: CommandId::Entrance(EntranceType::Pedestrian), name: "Entrance: Pedestrian", search: "entrance type pedestrian" },
    CommandSpec { id: CommandId::Entrance(EntranceType::Vehicular), name: "Entrance: Vehicular", search: "entrance type vehicular" },
    CommandSpec { id: CommandId::Entrance(EntranceType::Both), name: "Entrance: Mixed", search: "entrance type both mixed" },
    CommandSpec { id: CommandId::Parking(ParkingType::Car), name: "Parking: Car", search: "parking type car" },
    CommandSpec { id: CommandId::Parking(ParkingType::Motorcycle), name: "Parking: Motorcycle", search: "parking type motorcycle moto" },
    CommandSpec { id: CommandId::Parking(ParkingType::Mixed), name: "Parking: Mixed", search: "parking type mixed" },
    CommandSpec { id: CommandId::Landmark(LandmarkType::Plaza), name: "Landmark: Plaza", search: "landmark type plaza square" },
    CommandSpec { id: CommandId::Landmark(LandmarkType::Bar), name: "Landmark: Bar", search: "landmark type bar cafe" },
    CommandSpec { id: CommandId::Landmark(LandmarkType::Corridor), name: "Landmark: Corridor", search: "landmark type corridor hall" },
    CommandSpec { id: CommandId::Landmark(LandmarkType::Other), name: "Landmark: Reference", search: "landmark type other reference" },
    CommandSpec { id: CommandId::Cancel, name: "Edit: Cancel action", search: "cancel escape abort" },
    CommandSpec { id: CommandId::OpenFile, name: "Data: Open campus file...", search: "open campus file json store" },
    CommandSpec { id: CommandId::ReloadAll, name: "Data: Reload all", search: "reload refresh fetch data r" },
    CommandSpec { id: CommandId::Recenter, name: "View: Recenter", search: "recenter home center view" },
    CommandSpec { id: CommandId::ToggleTiles, name: "View: Toggle basemap", search: "tiles basemap toggle map background" },
    CommandSpec { id: CommandId::Help, name: "Help: Keyboard shortcuts", search: "help shortcuts keys f1" },
];

#[derive(Default)]
pub(super) struct CommandPalette {
    pub open: bool,
    pub query: String,
    pub selected: usize,
    request_focus: bool,
}

#[derive(Clone, Copy)]
pub(super) struct CommandContext {
    pub mode: ModeKind,
    pub can_cancel: bool,
    pub has_store: bool,
}

impl CommandPalette {
    pub fn open(&mut self, query: impl Into<String>) {
        self.open = true;
        self.query = query.into();
        self.selected = 0;
        self.request_focus = true;
    }

    pub fn close(&mut self) {
        self.open = false;
        self.query.clear();
        self.selected = 0;
        self.request_focus = false;
    }

    fn is_enabled(cx: CommandContext, id: CommandId) -> bool {
        match id {
            CommandId::Mode(kind) => kind != cx.mode,
            CommandId::Cancel => cx.can_cancel,
            CommandId::ReloadAll => cx.has_store,
            _ => true,
        }
    }

    pub(super) fn execute(app: &mut CampusApp, ctx: &egui::Context, id: CommandId) {
        match id {
            CommandId::Mode(kind) => app.set_mode(kind),
            CommandId::Transit(kind) => app.update_selection(|s| s.transit = kind),
            CommandId::Entrance(kind) => app.update_selection(|s| s.entrance = kind),
            CommandId::Parking(kind) => app.update_selection(|s| s.parking = kind),
            CommandId::Landmark(kind) => app.update_selection(|s| s.landmark = kind),
            CommandId::Cancel => app.cancel(),
            CommandId::OpenFile => app.open_campus_file_dialog(ctx),
            CommandId::ReloadAll => app.reload_all(),
            CommandId::Recenter => app.recenter(),
            CommandId::ToggleTiles => {
                app.settings.show_tiles = !app.settings.show_tiles;
                app.persist_settings();
            }
            CommandId::Help => app.show_help = true,
        }
        ctx.request_repaint();
    }

    fn filtered(&self) -> Vec<(&'static CommandSpec, i64)> {
        let matcher = SkimMatcherV2::default();
        let q = self.query.trim();
        if q.is_empty() {
            return COMMANDS.iter().map(|c| (c, 0)).collect();
        }
        let mut out = Vec::new();
        for c in COMMANDS {
            if let Some(score) = matcher.fuzzy_match(c.search, q) {
                out.push((c, score));
            }
        }
        out.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.name.cmp(b.0.name)));
        out
    }

    pub fn ui(&mut self, ctx: &egui::Context, cx: CommandContext) -> Option<CommandId> {
        if !self.open {
            return None;
        }
        let matches = self.filtered();
        if self.selected >= matches.len() {
            self.selected = matches.len().saturating_sub(1);
        }
        if ctx.input(|i| i.key_pressed(egui::Key::Escape)) {
            self.close();
            return None;
        }
        if ctx.input(|i| i.key_pressed(egui::Key::ArrowDown)) && !matches.is_empty() {
            self.selected = (self.selected + 1).min(matches.len() - 1);
        }
        if ctx.input(|i| i.key_pressed(egui::Key::ArrowUp)) && !matches.is_empty() {
            self.selected = self.selected.saturating_sub(1);
        }
        let mut run_selected = ctx.input(|i| i.key_pressed(egui::Key::Enter));

        let screen = ctx.content_rect();
        let width = 480.0;
        let height = 300.0;
        let pos = egui::pos2(screen.center().x - width * 0.5, screen.top() + 48.0);
        egui::Area::new(egui::Id::new("command_palette"))
            .fixed_pos(pos)
            .order(egui::Order::Foreground)
            .show(ctx, |ui| {
                let frame = egui::Frame::new()
                    .fill(egui::Color32::from_rgba_unmultiplied(20, 20, 20, 240))
                    .stroke(egui::Stroke::new(1.0, egui::Color32::from_rgb(37, 99, 235)))
                    .inner_margin(10.0)
                    .corner_radius(egui::CornerRadius::same(8));
                frame.show(ui, |ui| {
                    ui.set_min_size(egui::vec2(width, height));
                    let resp = ui.add(
                        egui::TextEdit::singleline(&mut self.query)
                            .desired_width(f32::INFINITY)
                            .hint_text("Search commands"),
                    );
                    if self.request_focus {
                        resp.request_focus();
                        self.request_focus = false;
                    }
                    ui.separator();
                    egui::ScrollArea::vertical().max_height(height - 64.0).show(ui, |ui| {
                        for (idx, (spec, _score)) in matches.iter().take(24).enumerate() {
                            let enabled = CommandPalette::is_enabled(cx, spec.id);
                            let selected = idx == self.selected;
                            let resp = ui.add_enabled(
                                enabled,
                                egui::Button::new(spec.name).selected(selected),
                            );
                            if resp.clicked() {
                                self.selected = idx;
                                run_selected = true;
                            }
                        }
                    });
                });
            });

        if run_selected {
            if let Some((spec, _)) = matches.get(self.selected) {
                if CommandPalette::is_enabled(cx, spec.id) {
                    let cmd = spec.id;
                    self.close();
                    return Some(cmd);
                }
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn palette(query: &str) -> CommandPalette {
        let mut p = CommandPalette::default();
        p.open(query);
        p
    }

    #[test]
    fn empty_query_lists_every_command() {
        assert_eq!(palette("").filtered().len(), COMMANDS.len());
    }

    #[test]
    fn fuzzy_query_finds_footway_mode() {
        let matches = palette("draw footway").filtered();
        assert_eq!(matches[0].0.id, CommandId::Mode(ModeKind::FootwayAb));
    }

    #[test]
    fn active_mode_and_idle_cancel_are_disabled() {
        let cx = CommandContext {
            mode: ModeKind::Parking,
            can_cancel: false,
            has_store: true,
        };
        assert!(!CommandPalette::is_enabled(cx, CommandId::Mode(ModeKind::Parking)));
        assert!(CommandPalette::is_enabled(cx, CommandId::Mode(ModeKind::Landmark)));
        assert!(!CommandPalette::is_enabled(cx, CommandId::Cancel));
    }
}
