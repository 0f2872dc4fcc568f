use crate::editor::mode::TypeSelection;
use crate::editor::snap::DEFAULT_SNAP_RADIUS_PX;
use crate::store::{FileStore, GeoStore, RestStore, StoreError};
use serde::{Deserialize, Serialize};

/// Environment variable that overrides `store.api_key` for the REST backend.
pub(super) const API_KEY_ENV: &str = "CAMPUSMAP_API_KEY";

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub(super) enum StoreConfig {
    File {
        path: String,
    },
    Rest {
        url: String,
        #[serde(default)]
        api_key: String,
    },
}

impl Default for StoreConfig {
    fn default() -> Self {
        StoreConfig::File {
            path: "campus.json".to_string(),
        }
    }
}

impl StoreConfig {
    pub(super) fn open(&self) -> Result<Box<dyn GeoStore>, StoreError> {
        match self {
            StoreConfig::File { path } => Ok(Box::new(FileStore::open(path.as_str())?)),
            StoreConfig::Rest { url, api_key } => {
                let key = std::env::var(API_KEY_ENV).unwrap_or_else(|_| api_key.clone());
                Ok(Box::new(RestStore::new(url, key)?))
            }
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub(super) struct AppSettings {
    pub center_latitude: f64,
    pub center_longitude: f64,
    pub zoom: f64,
    pub tile_url: String,
    pub show_tiles: bool,
    pub snap_radius_px: f32,
    pub store: StoreConfig,
    pub selection: TypeSelection,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            center_latitude: -2.148_987_19,
            center_longitude: -79.604_205_53,
            zoom: 18.0,
            tile_url: "https://tile.openstreetmap.org/{z}/{x}/{y}.png".to_string(),
            show_tiles: true,
            snap_radius_px: DEFAULT_SNAP_RADIUS_PX,
            store: StoreConfig::default(),
            selection: TypeSelection::default(),
        }
    }
}

pub(super) fn load_settings(path: &str) -> Option<AppSettings> {
    let s = std::fs::read_to_string(path).ok()?;
    let parsed = if path.ends_with(".toml") {
        toml::from_str::<AppSettings>(&s)
            .ok()
            .or_else(|| serde_json::from_str::<AppSettings>(&s).ok())
    } else {
        serde_json::from_str::<AppSettings>(&s)
            .ok()
            .or_else(|| toml::from_str::<AppSettings>(&s).ok())
    };
    if parsed.is_none() {
        tracing::warn!(path, "settings file could not be parsed, using defaults");
    }
    parsed
}

pub(super) fn save_settings(path: &str, settings: &AppSettings) -> Result<(), String> {
    if path.ends_with(".toml") {
        let toml = toml::to_string_pretty(settings).map_err(|e| e.to_string())?;
        std::fs::write(path, toml).map_err(|e| e.to_string())
    } else {
        let json = serde_json::to_string_pretty(settings).map_err(|e| e.to_string())?;
        std::fs::write(path, json).map_err(|e| e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::TransitKind;
    use pretty_assertions::assert_eq;

    #[test]
    fn partial_toml_fills_in_defaults() {
        let settings: AppSettings = toml::from_str(
            r#"
            zoom = 16.0

            [store]
            kind = "rest"
            url = "https://campus.example.org"

            [selection]
            transit = "vehicular"
            "#,
        )
        .unwrap();
        assert_eq!(settings.zoom, 16.0);
        assert_eq!(
            settings.store,
            StoreConfig::Rest {
                url: "https://campus.example.org".to_string(),
                api_key: String::new(),
            }
        );
        assert_eq!(settings.selection.transit, TransitKind::Vehicular);
        assert_eq!(settings.snap_radius_px, DEFAULT_SNAP_RADIUS_PX);
    }

    #[test]
    fn save_then_load_keeps_settings() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.toml");
        let path = path.to_str().unwrap();
        let settings = AppSettings {
            show_tiles: false,
            snap_radius_px: 14.0,
            ..AppSettings::default()
        };
        save_settings(path, &settings).unwrap();
        assert_eq!(load_settings(path), Some(settings));
    }

    #[test]
    fn unreadable_settings_yield_none() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.toml");
        std::fs::write(&path, "zoom = [").unwrap();
        assert_eq!(load_settings(path.to_str().unwrap()), None);
    }
}
