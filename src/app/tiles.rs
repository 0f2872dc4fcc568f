//! Slippy-map basemap: tiles are downloaded and decoded on a background
//! thread and uploaded as egui textures when they arrive.

use crate::editor::projection::{MapView, TILE_SIZE, world_px};
use eframe::egui;
use reqwest::blocking::Client;
use std::collections::HashMap;
use std::sync::mpsc::{self, Receiver, Sender};
use std::time::Duration;

/// Tiles kept before the least recently requested ones are evicted.
const MAX_CACHED_TILES: usize = 384;
/// Highest zoom most public tile servers publish.
const MAX_TILE_ZOOM: u32 = 19;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub(super) struct TileId {
    pub z: u32,
    pub x: u32,
    pub y: u32,
}

enum TileState {
    Pending,
    Ready(egui::TextureHandle),
    Failed,
}

struct CachedTile {
    state: TileState,
    last_used: u64,
}

type TileResult = (TileId, Result<egui::ColorImage, String>);

pub(super) struct TileCache {
    tiles: HashMap<TileId, CachedTile>,
    /// Bumped on every lookup; orders tiles for eviction.
    clock: u64,
    tx: Sender<TileId>,
    rx: Receiver<TileResult>,
}

impl TileCache {
    pub fn new(ctx: &egui::Context, template: String) -> Self {
        let (req_tx, req_rx) = mpsc::channel::<TileId>();
        let (res_tx, res_rx) = mpsc::channel::<TileResult>();
        let ctx = ctx.clone();
        let spawned = std::thread::Builder::new()
            .name("tile-fetch".to_string())
            .spawn(move || {
                let client = match Client::builder()
                    .user_agent(concat!("campusmap/", env!("CARGO_PKG_VERSION")))
                    .timeout(Duration::from_secs(15))
                    .build()
                {
                    Ok(client) => client,
                    Err(err) => {
                        tracing::error!(%err, "tile client unavailable");
                        return;
                    }
                };
                while let Ok(id) = req_rx.recv() {
                    let url = tile_url(&template, id);
                    let result = fetch_tile(&client, &url);
                    if let Err(err) = &result {
                        tracing::warn!(z = id.z, x = id.x, y = id.y, %err, "tile failed");
                    }
                    if res_tx.send((id, result)).is_err() {
                        break;
                    }
                    ctx.request_repaint();
                }
            });
        if let Err(err) = spawned {
            tracing::error!(%err, "could not start tile fetcher");
        }
        Self::with_channels(req_tx, res_rx)
    }

    fn with_channels(tx: Sender<TileId>, rx: Receiver<TileResult>) -> Self {
        Self {
            tiles: HashMap::new(),
            clock: 0,
            tx,
            rx,
        }
    }

    /// Uploads tiles that finished downloading since the last frame. Tiles
    /// evicted while in flight are dropped on arrival.
    pub fn poll(&mut self, ctx: &egui::Context) {
        let arrived: Vec<TileResult> = self.rx.try_iter().collect();
        for (id, result) in arrived {
            let Some(entry) = self.tiles.get_mut(&id) else {
                continue;
            };
            entry.state = match result {
                Ok(image) => {
                    let name = format!("tile-{}-{}-{}", id.z, id.x, id.y);
                    TileState::Ready(ctx.load_texture(name, image, egui::TextureOptions::LINEAR))
                }
                Err(_) => TileState::Failed,
            };
        }
    }

    /// Texture for `id`, requesting it the first time it is asked for.
    pub fn get(&mut self, id: TileId) -> Option<&egui::TextureHandle> {
        self.clock += 1;
        let clock = self.clock;
        let tx = &self.tx;
        let entry = self.tiles.entry(id).or_insert_with(|| {
            let state = if tx.send(id).is_err() {
                TileState::Failed
            } else {
                TileState::Pending
            };
            CachedTile { state, last_used: clock }
        });
        entry.last_used = clock;
        match &entry.state {
            TileState::Ready(texture) => Some(texture),
            _ => None,
        }
    }

    /// Drops the least recently requested tiles, whatever their zoom, until
    /// the cache is back within its limit.
    pub fn evict(&mut self) {
        let excess = self.tiles.len().saturating_sub(MAX_CACHED_TILES);
        if excess == 0 {
            return;
        }
        let mut by_age: Vec<(u64, TileId)> = self
            .tiles
            .iter()
            .map(|(id, entry)| (entry.last_used, *id))
            .collect();
        by_age.sort_unstable_by_key(|(last_used, _)| *last_used);
        for (_, id) in by_age.into_iter().take(excess) {
            self.tiles.remove(&id);
        }
        tracing::debug!(evicted = excess, "tile cache trimmed");
    }
}

/// A tile and where it lands on screen.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(super) struct PlacedTile {
    pub id: TileId,
    pub rect: egui::Rect,
}

/// Tiles covering the viewport at the integer zoom just below the view's.
pub(super) fn visible_tiles(view: &MapView) -> Vec<PlacedTile> {
    let Some(viewport) = view.viewport() else {
        return Vec::new();
    };
    let z = (view.zoom().floor().max(0.0) as u32).min(MAX_TILE_ZOOM);
    let scale = 2f64.powf(view.zoom() - z as f64);
    let tile_px = TILE_SIZE * scale;
    let (cx, cy) = world_px(view.center(), z as f64);
    let half_w = viewport.width() as f64 * 0.5 / scale;
    let half_h = viewport.height() as f64 * 0.5 / scale;
    let n = 1_i64 << z;

    let x0 = ((cx - half_w) / TILE_SIZE).floor() as i64;
    let x1 = ((cx + half_w) / TILE_SIZE).floor() as i64;
    let y0 = (((cy - half_h) / TILE_SIZE).floor() as i64).max(0);
    let y1 = (((cy + half_h) / TILE_SIZE).floor() as i64).min(n - 1);

    let center = viewport.center();
    let mut out = Vec::new();
    for ty in y0..=y1 {
        for tx in x0..=x1 {
            let min = egui::pos2(
                center.x + ((tx as f64 * TILE_SIZE - cx) * scale) as f32,
                center.y + ((ty as f64 * TILE_SIZE - cy) * scale) as f32,
            );
            let id = TileId {
                z,
                x: tx.rem_euclid(n) as u32,
                y: ty as u32,
            };
            out.push(PlacedTile {
                id,
                rect: egui::Rect::from_min_size(min, egui::vec2(tile_px as f32, tile_px as f32)),
            });
        }
    }
    out
}

fn fetch_tile(client: &Client, url: &str) -> Result<egui::ColorImage, String> {
    let response = client
        .get(url)
        .send()
        .map_err(|err| format!("request error: {err}"))?;
    if !response.status().is_success() {
        return Err(format!("tile server responded with {}", response.status()));
    }
    let bytes = response
        .bytes()
        .map_err(|err| format!("failed to read tile response: {err}"))?;
    let rgba = image::load_from_memory(&bytes)
        .map_err(|err| format!("failed to decode tile: {err}"))?
        .into_rgba8();
    let size = [rgba.width() as usize, rgba.height() as usize];
    Ok(egui::ColorImage::from_rgba_unmultiplied(size, rgba.as_raw()))
}

/// Fills a `{s}`/`{z}`/`{x}`/`{y}`/`{r}` URL template.
fn tile_url(template: &str, id: TileId) -> String {
    let values: [(&str, String); 5] = [
        ("s", "a".to_string()),
        ("z", id.z.to_string()),
        ("x", id.x.to_string()),
        ("y", id.y.to_string()),
        ("r", String::new()),
    ];
    let mut url = template.to_string();
    for (key, value) in &values {
        url = url.replace(&format!("{{{key}}}"), value);
    }
    url
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::editor::projection::{Projection, from_world_px, test_view};

    fn tile_origin(view: &MapView, id: TileId) -> Option<egui::Pos2> {
        let at = from_world_px(id.x as f64 * TILE_SIZE, id.y as f64 * TILE_SIZE, id.z as f64);
        view.project(at)
    }

    #[test]
    fn template_placeholders_are_filled() {
        let id = TileId { z: 18, x: 73_560, y: 131_636 };
        assert_eq!(
            tile_url("https://{s}.tile.example.org/{z}/{x}/{y}{r}.png", id),
            "https://a.tile.example.org/18/73560/131636.png"
        );
    }

    #[test]
    fn visible_tiles_cover_the_viewport() {
        let view = test_view();
        let viewport = view.viewport().unwrap();
        let tiles = visible_tiles(&view);
        assert!(!tiles.is_empty());
        let covered = tiles
            .iter()
            .fold(egui::Rect::NOTHING, |acc, t| acc.union(t.rect));
        assert!(covered.contains_rect(viewport), "{covered:?} vs {viewport:?}");
    }

    #[test]
    fn tile_rects_line_up_with_projection() {
        let view = test_view();
        for tile in visible_tiles(&view) {
            let origin = tile_origin(&view, tile.id).unwrap();
            assert!((origin - tile.rect.min).length() < 0.5, "{tile:?}");
        }
    }

    /// Cache whose fetcher is gone, so every lookup settles as failed.
    fn offline_cache() -> TileCache {
        let (tx, _) = mpsc::channel();
        let (_, rx) = mpsc::channel();
        TileCache::with_channels(tx, rx)
    }

    #[test]
    fn eviction_drops_least_recently_requested_tiles() {
        let mut cache = offline_cache();
        let ids: Vec<TileId> = (0..MAX_CACHED_TILES as u32 + 16)
            .map(|x| TileId { z: 18, x, y: 0 })
            .collect();
        for id in &ids {
            assert!(cache.get(*id).is_none());
        }
        // Touch the oldest tile again so it survives.
        cache.get(ids[0]);
        cache.evict();

        assert_eq!(cache.tiles.len(), MAX_CACHED_TILES);
        assert!(cache.tiles.contains_key(&ids[0]));
        assert!(!cache.tiles.contains_key(&ids[1]));
        assert!(!cache.tiles.contains_key(&ids[16]));
        assert!(cache.tiles.contains_key(&ids[17]));
        assert!(cache.tiles.contains_key(ids.last().unwrap()));
    }

    #[test]
    fn eviction_ignores_zoom_level() {
        let mut cache = offline_cache();
        for x in 0..MAX_CACHED_TILES as u32 {
            cache.get(TileId { z: 18, x, y: 0 });
        }
        let fresh = TileId { z: 17, x: 0, y: 0 };
        cache.get(fresh);
        cache.evict();
        assert_eq!(cache.tiles.len(), MAX_CACHED_TILES);
        assert!(cache.tiles.contains_key(&fresh));
        assert!(!cache.tiles.contains_key(&TileId { z: 18, x: 0, y: 0 }));
    }

    #[test]
    fn no_view_means_no_tiles() {
        let view = MapView::new(crate::model::LatLng::new(0.0, 0.0), 3.0);
        assert!(visible_tiles(&view).is_empty());
    }
}
