use eframe::egui;

pub(super) fn draw_help_window(ctx: &egui::Context, open: &mut bool) {
    egui::Window::new("Help & Commands")
        .open(open)
        .resizable(true)
        .default_width(520.0)
        .default_height(460.0)
        .show(ctx, |ui| {
            egui::ScrollArea::vertical().show(ui, |ui| {
                ui.heading("Keyboard Shortcuts");
                ui.separator();

                ui.label("General");
                help_row(ui, "Space", "Open command palette");
                help_row(ui, "⌘⇧P", "Open command palette");
                help_row(ui, "F1", "Show this window");
                help_row(ui, "Escape", "Cancel the current action");
                help_row(ui, "R", "Reload all collections");
                help_row(ui, "Home", "Recenter on the campus");

                ui.add_space(10.0);
                ui.label("Modes");
                help_row(ui, "B", "Add building");
                help_row(ui, "F", "Draw footway (A→B)");
                help_row(ui, "E", "Add entrance");
                help_row(ui, "P", "Add parking");
                help_row(ui, "L", "Add landmark");

                ui.add_space(10.0);
                ui.label("Map");
                help_row(ui, "Drag", "Pan");
                help_row(ui, "Scroll wheel", "Zoom in/out");
                help_row(ui, "Double-click", "Zoom in");
                help_row(ui, "Click marker", "Inspect (browse mode)");

                ui.add_space(20.0);
                ui.heading("Drawing footways");
                ui.separator();
                ui.label("Click point A, then point B. Clicks within the snap radius of an existing vertex land exactly on it.");
                ui.label("Numbered circles are footway vertices; click one to use it directly.");

                ui.add_space(20.0);
                ui.heading("Placing points");
                ui.separator();
                ui.label("Entrances, parkings and landmarks open a small form. The nearest building is preselected; name is optional.");
                ui.label("Type selections (footway transit, entrance, parking, landmark) live in the toolbar and the command palette.");

                ui.add_space(20.0);
                ui.heading("Settings");
                ui.separator();
                ui.label("Settings are read from ~/.config/campusmap.toml, then ./settings.toml:");
                ui.add_space(5.0);
                ui.code(r##"zoom = 18.0
show_tiles = true
snap_radius_px = 10.0

[store]
kind = "rest"
url = "https://campus.example.org"
# or set CAMPUSMAP_API_KEY
api_key = "...""##);
                ui.add_space(5.0);
                ui.label("Use kind = \"file\" with a path to keep the campus in a local JSON file.");
                ui.label("Map > Open campus file... switches to another JSON file and remembers it.");
            });
        });
}

fn help_row(ui: &mut egui::Ui, shortcut: &str, description: &str) {
    ui.horizontal(|ui| {
        ui.add_sized([100.0, 16.0], egui::Label::new(
            egui::RichText::new(shortcut).monospace().strong()
        ));
        ui.label(description);
    });
}
