//! Geo-entity persistence: read-all and single-row insert against the five
//! campus tables, plus a worker thread so the UI never blocks on the store.

use crate::model::{Collection, EntityKind, InsertTicket, NewEntity};
use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver, Sender};
use thiserror::Error;

mod file;
mod rest;

pub use file::FileStore;
pub use rest::RestStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("malformed data: {0}")]
    Json(#[from] serde_json::Error),
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("{table} responded with {status}: {body}")]
    Status {
        table: &'static str,
        status: u16,
        body: String,
    },
    #[error("store worker is not running")]
    Disconnected,
}

/// Backend holding buildings, footways, entrances, parkings and landmarks.
pub trait GeoStore: Send {
    /// Every row of `kind`'s table.
    fn fetch(&mut self, kind: EntityKind) -> Result<Collection, StoreError>;
    fn insert(&mut self, row: &NewEntity) -> Result<(), StoreError>;
    /// Human-readable location for the status bar.
    fn describe(&self) -> String;
}

#[derive(Debug)]
pub enum StoreRequest {
    Fetch(EntityKind),
    Insert {
        ticket: InsertTicket,
        row: NewEntity,
    },
}

#[derive(Debug)]
pub enum StoreReply {
    Fetched {
        kind: EntityKind,
        result: Result<Collection, StoreError>,
    },
    /// Carries the request's ticket back unchanged.
    Inserted {
        ticket: InsertTicket,
        kind: EntityKind,
        result: Result<(), StoreError>,
    },
}

/// Runs a [`GeoStore`] on its own thread. Requests are served in order;
/// replies are collected with [`StoreWorker::poll`] once per frame.
pub struct StoreWorker {
    tx: Sender<StoreRequest>,
    rx: Receiver<StoreReply>,
    description: String,
}

impl StoreWorker {
    pub fn spawn(mut store: Box<dyn GeoStore>, wake: impl Fn() + Send + 'static) -> Self {
        let description = store.describe();
        let (req_tx, req_rx) = mpsc::channel::<StoreRequest>();
        let (reply_tx, reply_rx) = mpsc::channel::<StoreReply>();
        let spawned = std::thread::Builder::new()
            .name("geo-store".to_string())
            .spawn(move || {
                while let Ok(req) = req_rx.recv() {
                    let reply = match req {
                        StoreRequest::Fetch(kind) => StoreReply::Fetched {
                            kind,
                            result: store.fetch(kind),
                        },
                        StoreRequest::Insert { ticket, row } => StoreReply::Inserted {
                            ticket,
                            kind: row.kind(),
                            result: store.insert(&row),
                        },
                    };
                    if reply_tx.send(reply).is_err() {
                        break;
                    }
                    wake();
                }
                tracing::debug!("store worker stopped");
            });
        if let Err(err) = spawned {
            tracing::error!(%err, "could not start store worker");
        }
        Self {
            tx: req_tx,
            rx: reply_rx,
            description,
        }
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn request(&self, req: StoreRequest) -> Result<(), StoreError> {
        self.tx.send(req).map_err(|_| StoreError::Disconnected)
    }

    /// Replies that have arrived since the last call.
    pub fn poll(&self) -> Vec<StoreReply> {
        self.rx.try_iter().collect()
    }

    #[cfg(test)]
    fn wait(&self) -> Option<StoreReply> {
        self.rx.recv_timeout(std::time::Duration::from_secs(5)).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{FootwayState, LatLng, LineGeom, NewFootway, TransitKind};

    #[test]
    fn worker_serves_requests_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::open(dir.path().join("campus.json")).unwrap();
        let worker = StoreWorker::spawn(Box::new(store), || {});

        let row = NewEntity::Footway(NewFootway {
            name: None,
            state: FootwayState::Open,
            access_type: TransitKind::Vehicular,
            geom: LineGeom::segment(LatLng::new(0.0, 0.0), LatLng::new(0.0, 0.001)),
        });
        worker
            .request(StoreRequest::Insert {
                ticket: InsertTicket(7),
                row,
            })
            .unwrap();
        worker.request(StoreRequest::Fetch(EntityKind::Footway)).unwrap();

        match worker.wait() {
            Some(StoreReply::Inserted { ticket, kind, result }) => {
                assert_eq!(ticket, InsertTicket(7));
                assert_eq!(kind, EntityKind::Footway);
                assert!(result.is_ok());
            }
            other => panic!("unexpected reply {other:?}"),
        }
        match worker.wait() {
            Some(StoreReply::Fetched {
                result: Ok(Collection::Footways(rows)),
                ..
            }) => {
                assert_eq!(rows.len(), 1);
                assert_eq!(rows[0].access_type, TransitKind::Vehicular);
            }
            other => panic!("unexpected reply {other:?}"),
        }
    }
}
