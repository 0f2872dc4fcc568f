use crate::editor::interaction::MapInteraction;
use crate::editor::layers::{LayerKind, LayerSet, draft_overlays};
use crate::editor::mode::{ModeKind, TypeSelection};
use crate::editor::projection::MapView;
use crate::editor::{Editor, Effect, Notice};
use crate::model::{CampusData, EntityKind, EntityRef, InsertTicket, LatLng, NewEntity};
use crate::store::{StoreError, StoreReply, StoreRequest, StoreWorker};
use eframe::egui;

mod command_palette;
mod forms;
mod help;
mod render;
mod settings;
mod tiles;
mod update;

use settings::StoreConfig;

fn spawn_store(ctx: &egui::Context, config: &StoreConfig) -> Result<StoreWorker, StoreError> {
    let backend = config.open()?;
    let ctx = ctx.clone();
    let worker = StoreWorker::spawn(backend, move || ctx.request_repaint());
    tracing::info!(store = worker.description(), "store ready");
    Ok(worker)
}

/// Whether the open dialogs take the map away from the user. The pending
/// mini-form is left out: clicks while it is open relocate its draft.
fn dialogs_block_map(building_form: bool, inspector: bool, palette: bool, help: bool) -> bool {
    building_form || inspector || palette || help
}

pub struct CampusApp {
    editor: Editor,
    data: CampusData,
    layers: LayerSet,
    view: MapView,
    interaction: MapInteraction,
    store: Option<StoreWorker>,
    tiles: tiles::TileCache,
    settings: settings::AppSettings,
    settings_path: String,
    status: Option<Notice>,
    command_palette: command_palette::CommandPalette,
    show_help: bool,
    building_form: Option<forms::BuildingForm>,
    inspecting: Option<EntityRef>,
}

impl CampusApp {
    fn config_path() -> Option<String> {
        if let Some(home) = std::env::var_os("HOME") {
            let path = std::path::PathBuf::from(home).join(".config").join("campusmap.toml");
            if path.exists() {
                return Some(path.display().to_string());
            }
        }
        if std::path::Path::new("settings.toml").exists() {
            return Some("settings.toml".to_string());
        }
        None
    }

    pub fn new(cc: &eframe::CreationContext<'_>) -> Self {
        let settings_path = Self::config_path().unwrap_or_else(|| "settings.toml".to_string());
        let settings = settings::load_settings(&settings_path)
            .or_else(|| settings::load_settings("settings.json"))
            .unwrap_or_default();
        tracing::info!(path = %settings_path, "settings loaded");

        let (store, status) = match spawn_store(&cc.egui_ctx, &settings.store) {
            Ok(worker) => (Some(worker), None),
            Err(err) => {
                tracing::error!(%err, "store unavailable");
                (None, Some(Notice::error(format!("Store unavailable: {err}"))))
            }
        };

        let center = LatLng::new(settings.center_latitude, settings.center_longitude);
        let mut app = Self {
            editor: Editor::new(settings.selection, settings.snap_radius_px),
            data: CampusData::default(),
            layers: LayerSet::default(),
            view: MapView::new(center, settings.zoom),
            interaction: MapInteraction::default(),
            store,
            tiles: tiles::TileCache::new(&cc.egui_ctx, settings.tile_url.clone()),
            settings,
            settings_path,
            status,
            command_palette: command_palette::CommandPalette::default(),
            show_help: false,
            building_form: None,
            inspecting: None,
        };
        app.layers.refresh_all(&app.data);
        app.reload_all();
        app
    }

    fn persist_settings(&mut self) {
        self.settings.selection = self.editor.selection;
        self.settings.snap_radius_px = self.editor.snap_radius_px();
        if let Err(err) = settings::save_settings(&self.settings_path, &self.settings) {
            tracing::warn!(%err, path = %self.settings_path, "settings not saved");
            self.status = Some(Notice::warning(format!("Settings not saved: {err}")));
        }
    }

    fn open_campus_file_dialog(&mut self, ctx: &egui::Context) {
        if let Some(path) = rfd::FileDialog::new()
            .add_filter("JSON", &["json"])
            .pick_file()
        {
            let path = path.display().to_string();
            self.switch_store(ctx, StoreConfig::File { path });
        }
    }

    /// Points the editor at another store. Drafts and dialogs belong to the
    /// old data and are dropped.
    fn switch_store(&mut self, ctx: &egui::Context, config: StoreConfig) {
        match spawn_store(ctx, &config) {
            Ok(worker) => {
                self.status = Some(Notice::info(format!("Using {}", worker.description())));
                self.store = Some(worker);
                self.settings.store = config;
                self.editor.cancel();
                self.building_form = None;
                self.inspecting = None;
                self.data = CampusData::default();
                self.layers.refresh_all(&self.data);
                self.persist_settings();
                self.reload_all();
            }
            Err(err) => {
                tracing::warn!(%err, "could not switch store");
                self.status = Some(Notice::error(format!("Could not open store: {err}")));
            }
        }
    }

    fn set_mode(&mut self, kind: ModeKind) {
        let effects = self.editor.set_mode(kind);
        self.apply_effects(effects);
    }

    fn cancel(&mut self) {
        let effects = self.editor.cancel();
        self.apply_effects(effects);
    }

    fn update_selection(&mut self, change: impl FnOnce(&mut TypeSelection)) {
        change(&mut self.editor.selection);
        self.persist_settings();
    }

    fn recenter(&mut self) {
        let center = LatLng::new(self.settings.center_latitude, self.settings.center_longitude);
        self.view.recenter(center, self.settings.zoom);
    }

    fn request(&mut self, req: StoreRequest) -> bool {
        let Some(store) = &self.store else {
            return false;
        };
        match store.request(req) {
            Ok(()) => true,
            Err(err) => {
                tracing::error!(%err, "store request dropped");
                false
            }
        }
    }

    fn reload(&mut self, kind: EntityKind) {
        if self.request(StoreRequest::Fetch(kind)) {
            tracing::debug!(table = kind.table(), "reload requested");
        }
    }

    fn reload_all(&mut self) {
        for kind in EntityKind::ALL {
            self.reload(kind);
        }
    }

    /// Carries out what the editor asked for.
    fn apply_effects(&mut self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::LocationSelected(at) => {
                    self.building_form = Some(forms::BuildingForm::at(at));
                }
                Effect::EditRequested(target) => {
                    tracing::debug!(kind = ?target.kind, id = %target.id, "edit requested");
                    self.inspecting = Some(target);
                }
                Effect::Insert(ticket, row) => self.submit(ticket, row),
                Effect::Reload(kind) => self.reload(kind),
                Effect::Notify(notice) => self.status = Some(notice),
            }
        }
    }

    fn submit(&mut self, ticket: InsertTicket, row: NewEntity) {
        let kind = row.kind();
        tracing::info!(table = kind.table(), ?ticket, "inserting");
        if !self.request(StoreRequest::Insert { ticket, row }) {
            self.finish_insert(ticket, kind, Err("store unavailable".to_string()));
        }
    }

    fn finish_insert(&mut self, ticket: InsertTicket, kind: EntityKind, result: Result<(), String>) {
        let form_owns = self
            .building_form
            .as_ref()
            .is_some_and(|f| f.pending_insert == Some(ticket));
        if form_owns {
            match &result {
                Ok(()) => self.building_form = None,
                Err(err) => {
                    if let Some(form) = &mut self.building_form {
                        form.pending_insert = None;
                        form.error = Some(err.clone());
                    }
                }
            }
        }
        let effects = self.editor.insert_finished(ticket, kind, result);
        self.apply_effects(effects);
    }

    /// Applies store replies that arrived since the last frame.
    fn poll_store(&mut self) {
        let replies = match &self.store {
            Some(store) => store.poll(),
            None => return,
        };
        for reply in replies {
            match reply {
                StoreReply::Fetched { kind, result } => match result {
                    Ok(collection) => {
                        tracing::debug!(table = kind.table(), rows = collection.len(), "collection loaded");
                        self.data.replace(collection);
                        self.layers.refresh(kind, &self.data);
                    }
                    Err(err) => {
                        tracing::warn!(table = kind.table(), %err, "load failed, keeping previous rows");
                    }
                },
                StoreReply::Inserted { ticket, kind, result } => {
                    self.finish_insert(ticket, kind, result.map_err(|err| err.to_string()));
                }
            }
        }
    }

    /// Keeps the draft layer and the map's interactivity in step with the
    /// editor and the open dialogs.
    fn sync_frame_state(&mut self) {
        self.layers
            .render_layer(LayerKind::Draft, draft_overlays(self.editor.mode()));
        let modal = dialogs_block_map(
            self.building_form.is_some(),
            self.inspecting.is_some(),
            self.command_palette.open,
            self.show_help,
        );
        self.interaction.set_modal_open(modal);
    }

    fn status_text(&self) -> String {
        match &self.status {
            Some(notice) => notice.text.clone(),
            None => "Ready".to_string(),
        }
    }
}
