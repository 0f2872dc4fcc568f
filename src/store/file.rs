use super::{GeoStore, StoreError};
use crate::model::{
    Building, CampusData, Collection, EntityKind, Entrance, Footway, Landmark, NewEntity, Parking,
};
use std::path::PathBuf;

/// All five tables in one pretty-printed JSON document. Every insert
/// rewrites the file.
pub struct FileStore {
    path: PathBuf,
    data: CampusData,
    next_id: u64,
}

impl FileStore {
    /// Loads `path`; a missing file starts an empty campus.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let data = match std::fs::read_to_string(&path) {
            Ok(text) => serde_json::from_str::<CampusData>(&text)?,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!(path = %path.display(), "store file missing, starting empty");
                CampusData::default()
            }
            Err(source) => return Err(StoreError::Read { path, source }),
        };
        let next_id = max_numeric_id(&data) + 1;
        Ok(Self {
            path,
            data,
            next_id,
        })
    }

    fn allocate_id(&mut self, kind: EntityKind) -> String {
        let id = format!("{}-{}", kind.table(), self.next_id);
        self.next_id += 1;
        id
    }

    fn rollback(&mut self, kind: EntityKind) {
        match kind {
            EntityKind::Building => drop(self.data.buildings.pop()),
            EntityKind::Footway => drop(self.data.footways.pop()),
            EntityKind::Entrance => drop(self.data.entrances.pop()),
            EntityKind::Parking => drop(self.data.parkings.pop()),
            EntityKind::Landmark => drop(self.data.landmarks.pop()),
        }
    }

    fn persist(&self) -> Result<(), StoreError> {
        let text = serde_json::to_string_pretty(&self.data)?;
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|source| StoreError::Write {
                path: self.path.clone(),
                source,
            })?;
        }
        std::fs::write(&self.path, text).map_err(|source| StoreError::Write {
            path: self.path.clone(),
            source,
        })
    }
}

/// Largest trailing number over every id, so generated ids never collide
/// with rows already in the file.
fn max_numeric_id(data: &CampusData) -> u64 {
    let ids = data
        .buildings
        .iter()
        .map(|b| b.id.as_str())
        .chain(data.footways.iter().map(|f| f.id.as_str()))
        .chain(data.entrances.iter().map(|e| e.id.as_str()))
        .chain(data.parkings.iter().map(|p| p.id.as_str()))
        .chain(data.landmarks.iter().map(|l| l.id.as_str()));
    ids.filter_map(|id| id.rsplit('-').next()?.parse::<u64>().ok())
        .max()
        .unwrap_or(0)
}

impl GeoStore for FileStore {
    fn fetch(&mut self, kind: EntityKind) -> Result<Collection, StoreError> {
        Ok(self.data.collection(kind))
    }

    fn insert(&mut self, row: &NewEntity) -> Result<(), StoreError> {
        let id = self.allocate_id(row.kind());
        match row.clone() {
            NewEntity::Building(b) => self.data.buildings.push(Building {
                id,
                name: b.name,
                latitude: b.latitude,
                longitude: b.longitude,
                total_floors: b.total_floors,
                building_code: b.building_code,
                description: b.description,
                state: b.state,
            }),
            NewEntity::Footway(f) => self.data.footways.push(Footway {
                id,
                name: f.name,
                state: f.state,
                access_type: f.access_type,
                geom: f.geom,
            }),
            NewEntity::Entrance(e) => self.data.entrances.push(Entrance {
                id,
                name: e.name,
                building_id: e.building_id,
                kind: e.kind,
                is_active: Some(e.is_active),
                location: e.location,
            }),
            NewEntity::Parking(p) => self.data.parkings.push(Parking {
                id,
                name: p.name,
                building_id: p.building_id,
                kind: p.kind,
                is_active: Some(p.is_active),
                capacity: p.capacity,
                location: p.location,
            }),
            NewEntity::Landmark(l) => self.data.landmarks.push(Landmark {
                id,
                name: l.name,
                building_id: l.building_id,
                kind: l.kind,
                is_active: Some(l.is_active),
                location: l.location,
            }),
        }
        if let Err(err) = self.persist() {
            // The row only exists once it is on disk.
            self.rollback(row.kind());
            return Err(err);
        }
        tracing::debug!(table = row.kind().table(), "row inserted");
        Ok(())
    }

    fn describe(&self) -> String {
        format!("file {}", self.path.display())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{
        BuildingStatus, LandmarkType, LatLng, NewBuilding, NewLandmark, PointGeom,
    };
    use pretty_assertions::assert_eq;

    fn library() -> NewEntity {
        NewEntity::Building(NewBuilding {
            name: "Library".to_string(),
            building_code: Some("LIB".to_string()),
            description: None,
            total_floors: 3,
            latitude: -2.1489,
            longitude: -79.6042,
            state: BuildingStatus::Enabled,
        })
    }

    #[test]
    fn missing_file_opens_empty() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = FileStore::open(dir.path().join("none.json")).unwrap();
        assert_eq!(store.fetch(EntityKind::Building).unwrap().len(), 0);
    }

    #[test]
    fn inserts_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("campus.json");
        let mut store = FileStore::open(&path).unwrap();
        store.insert(&library()).unwrap();
        store
            .insert(&NewEntity::Landmark(NewLandmark {
                name: Some("Main plaza".to_string()),
                building_id: None,
                kind: LandmarkType::Plaza,
                is_active: true,
                location: PointGeom::at(LatLng::new(-2.149, -79.604)),
            }))
            .unwrap();

        let mut reopened = FileStore::open(&path).unwrap();
        let Collection::Buildings(buildings) = reopened.fetch(EntityKind::Building).unwrap() else {
            panic!("wrong collection");
        };
        assert_eq!(buildings.len(), 1);
        assert_eq!(buildings[0].name, "Library");
        assert_eq!(buildings[0].id, "buildings-1");
        let Collection::Landmarks(landmarks) = reopened.fetch(EntityKind::Landmark).unwrap() else {
            panic!("wrong collection");
        };
        assert_eq!(landmarks[0].is_active, Some(true));
    }

    #[test]
    fn ids_continue_after_existing_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("campus.json");
        std::fs::write(
            &path,
            r#"{"buildings":[{"id":"b-41","name":"Old","latitude":0,"longitude":0,"total_floors":1}]}"#,
        )
        .unwrap();
        let mut store = FileStore::open(&path).unwrap();
        store.insert(&library()).unwrap();
        let Collection::Buildings(buildings) = store.fetch(EntityKind::Building).unwrap() else {
            panic!("wrong collection");
        };
        assert_eq!(buildings[1].id, "buildings-42");
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("campus.json");
        std::fs::write(&path, "{ not json").unwrap();
        assert!(matches!(FileStore::open(&path), Err(StoreError::Json(_))));
    }
}
