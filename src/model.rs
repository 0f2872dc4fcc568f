use eframe::egui;
use serde::{Deserialize, Serialize};

/// Mean Earth radius in meters, the same sphere slippy-map clients measure on.
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl LatLng {
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// GeoJSON positions are `[longitude, latitude]`.
    pub fn from_position(p: [f64; 2]) -> Self {
        Self { lat: p[1], lng: p[0] }
    }

    pub fn to_position(self) -> [f64; 2] {
        [self.lng, self.lat]
    }

    pub fn is_finite(self) -> bool {
        self.lat.is_finite() && self.lng.is_finite()
    }

    /// Great-circle distance in meters (haversine).
    pub fn distance_to(self, other: LatLng) -> f64 {
        let lat1 = self.lat.to_radians();
        let lat2 = other.lat.to_radians();
        let dlat = lat2 - lat1;
        let dlng = (other.lng - self.lng).to_radians();
        let a = (dlat * 0.5).sin().powi(2) + lat1.cos() * lat2.cos() * (dlng * 0.5).sin().powi(2);
        2.0 * EARTH_RADIUS_M * a.sqrt().atan2((1.0 - a).sqrt())
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename = "Point")]
pub struct PointGeom {
    pub coordinates: [f64; 2],
}

impl PointGeom {
    pub fn at(p: LatLng) -> Self {
        Self {
            coordinates: p.to_position(),
        }
    }

    pub fn latlng(&self) -> LatLng {
        LatLng::from_position(self.coordinates)
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename = "LineString")]
pub struct LineGeom {
    pub coordinates: Vec<[f64; 2]>,
}

impl LineGeom {
    pub fn segment(a: LatLng, b: LatLng) -> Self {
        Self {
            coordinates: vec![a.to_position(), b.to_position()],
        }
    }

    /// Finite points only; malformed rows never reach the map.
    pub fn points(&self) -> impl Iterator<Item = LatLng> + '_ {
        self.coordinates
            .iter()
            .map(|p| LatLng::from_position(*p))
            .filter(|p| p.is_finite())
    }
}

#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub fn to_color32(self) -> egui::Color32 {
        egui::Color32::from_rgba_unmultiplied(self.r, self.g, self.b, self.a)
    }

    /// Same hue at `factor` of the current opacity.
    pub fn faded(self, factor: f32) -> Self {
        let a = (self.a as f32 * factor.clamp(0.0, 1.0)).round() as u8;
        Self { a, ..self }
    }
}

#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BuildingStatus {
    #[default]
    Enabled,
    UnderRepair,
}

impl BuildingStatus {
    pub const ALL: [BuildingStatus; 2] = [BuildingStatus::Enabled, BuildingStatus::UnderRepair];

    pub fn label(self) -> &'static str {
        match self {
            BuildingStatus::Enabled => "Enabled",
            BuildingStatus::UnderRepair => "Under repair",
        }
    }
}

#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "UPPERCASE")]
pub enum FootwayState {
    #[default]
    Open,
    Closed,
}

#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum TransitKind {
    #[default]
    Pedestrian,
    Vehicular,
    Both,
}

impl TransitKind {
    pub const ALL: [TransitKind; 3] = [TransitKind::Pedestrian, TransitKind::Vehicular, TransitKind::Both];

    pub fn label(self) -> &'static str {
        match self {
            TransitKind::Pedestrian => "pedestrian",
            TransitKind::Vehicular => "vehicular",
            TransitKind::Both => "mixed",
        }
    }
}

#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum EntranceType {
    #[default]
    Pedestrian,
    Vehicular,
    Both,
}

impl EntranceType {
    pub const ALL: [EntranceType; 3] = [EntranceType::Pedestrian, EntranceType::Vehicular, EntranceType::Both];

    pub fn label(self) -> &'static str {
        match self {
            EntranceType::Pedestrian => "pedestrian",
            EntranceType::Vehicular => "vehicular",
            EntranceType::Both => "pedestrian + vehicular",
        }
    }
}

#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ParkingType {
    #[default]
    Car,
    Motorcycle,
    Mixed,
}

impl ParkingType {
    pub const ALL: [ParkingType; 3] = [ParkingType::Car, ParkingType::Motorcycle, ParkingType::Mixed];

    pub fn label(self) -> &'static str {
        match self {
            ParkingType::Car => "car",
            ParkingType::Motorcycle => "motorcycle",
            ParkingType::Mixed => "mixed",
        }
    }
}

#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum LandmarkType {
    #[default]
    Plaza,
    Bar,
    Corridor,
    Other,
}

impl LandmarkType {
    pub const ALL: [LandmarkType; 4] = [
        LandmarkType::Plaza,
        LandmarkType::Bar,
        LandmarkType::Corridor,
        LandmarkType::Other,
    ];

    pub fn label(self) -> &'static str {
        match self {
            LandmarkType::Plaza => "plaza",
            LandmarkType::Bar => "bar",
            LandmarkType::Corridor => "corridor",
            LandmarkType::Other => "other",
        }
    }

    /// Three-letter badge drawn on the marker.
    pub fn badge(self) -> &'static str {
        match self {
            LandmarkType::Plaza => "Plz",
            LandmarkType::Bar => "Bar",
            LandmarkType::Corridor => "Cor",
            LandmarkType::Other => "Ref",
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Building {
    pub id: String,
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub total_floors: u32,
    #[serde(default)]
    pub building_code: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub state: BuildingStatus,
}

impl Building {
    pub fn location(&self) -> LatLng {
        LatLng::new(self.latitude, self.longitude)
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Footway {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub state: FootwayState,
    #[serde(default)]
    pub access_type: TransitKind,
    #[serde(default)]
    pub geom: LineGeom,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Entrance {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub building_id: Option<String>,
    #[serde(rename = "type")]
    pub kind: EntranceType,
    #[serde(default)]
    pub is_active: Option<bool>,
    pub location: PointGeom,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Parking {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub building_id: Option<String>,
    #[serde(rename = "type")]
    pub kind: ParkingType,
    #[serde(default)]
    pub is_active: Option<bool>,
    #[serde(default)]
    pub capacity: Option<u32>,
    pub location: PointGeom,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Landmark {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub building_id: Option<String>,
    #[serde(rename = "type")]
    pub kind: LandmarkType,
    #[serde(default)]
    pub is_active: Option<bool>,
    pub location: PointGeom,
}

/// Rows written before the active flag existed count as active.
pub fn is_active(flag: Option<bool>) -> bool {
    flag != Some(false)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EntityKind {
    Building,
    Footway,
    Entrance,
    Parking,
    Landmark,
}

impl EntityKind {
    pub const ALL: [EntityKind; 5] = [
        EntityKind::Building,
        EntityKind::Footway,
        EntityKind::Entrance,
        EntityKind::Parking,
        EntityKind::Landmark,
    ];

    pub fn table(self) -> &'static str {
        match self {
            EntityKind::Building => "buildings",
            EntityKind::Footway => "footways",
            EntityKind::Entrance => "entrances",
            EntityKind::Parking => "parkings",
            EntityKind::Landmark => "landmarks",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            EntityKind::Building => "Building",
            EntityKind::Footway => "Footway",
            EntityKind::Entrance => "Entrance",
            EntityKind::Parking => "Parking",
            EntityKind::Landmark => "Landmark",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct EntityRef {
    pub kind: EntityKind,
    pub id: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct NewBuilding {
    pub name: String,
    pub building_code: Option<String>,
    pub description: Option<String>,
    pub total_floors: u32,
    pub latitude: f64,
    pub longitude: f64,
    pub state: BuildingStatus,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct NewFootway {
    pub name: Option<String>,
    pub state: FootwayState,
    pub access_type: TransitKind,
    pub geom: LineGeom,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct NewEntrance {
    pub name: Option<String>,
    pub building_id: Option<String>,
    #[serde(rename = "type")]
    pub kind: EntranceType,
    pub is_active: bool,
    pub location: PointGeom,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct NewParking {
    pub name: Option<String>,
    pub building_id: Option<String>,
    #[serde(rename = "type")]
    pub kind: ParkingType,
    pub capacity: Option<u32>,
    pub is_active: bool,
    pub location: PointGeom,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct NewLandmark {
    pub name: Option<String>,
    pub building_id: Option<String>,
    #[serde(rename = "type")]
    pub kind: LandmarkType,
    pub is_active: bool,
    pub location: PointGeom,
}

/// Identifies one insert from request to reply. Issued in increasing order,
/// so a reply can be matched to the draft that asked for it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct InsertTicket(pub u64);

/// A single-row insert against one of the five tables.
#[derive(Clone, Debug, PartialEq)]
pub enum NewEntity {
    Building(NewBuilding),
    Footway(NewFootway),
    Entrance(NewEntrance),
    Parking(NewParking),
    Landmark(NewLandmark),
}

impl NewEntity {
    pub fn kind(&self) -> EntityKind {
        match self {
            NewEntity::Building(_) => EntityKind::Building,
            NewEntity::Footway(_) => EntityKind::Footway,
            NewEntity::Entrance(_) => EntityKind::Entrance,
            NewEntity::Parking(_) => EntityKind::Parking,
            NewEntity::Landmark(_) => EntityKind::Landmark,
        }
    }

    /// Row body as sent over the wire (no id; the store assigns one).
    pub fn to_json(&self) -> serde_json::Result<serde_json::Value> {
        match self {
            NewEntity::Building(b) => serde_json::to_value(b),
            NewEntity::Footway(f) => serde_json::to_value(f),
            NewEntity::Entrance(e) => serde_json::to_value(e),
            NewEntity::Parking(p) => serde_json::to_value(p),
            NewEntity::Landmark(l) => serde_json::to_value(l),
        }
    }
}

/// One full read of a table.
#[derive(Clone, Debug, PartialEq)]
pub enum Collection {
    Buildings(Vec<Building>),
    Footways(Vec<Footway>),
    Entrances(Vec<Entrance>),
    Parkings(Vec<Parking>),
    Landmarks(Vec<Landmark>),
}

impl Collection {
    pub fn len(&self) -> usize {
        match self {
            Collection::Buildings(v) => v.len(),
            Collection::Footways(v) => v.len(),
            Collection::Entrances(v) => v.len(),
            Collection::Parkings(v) => v.len(),
            Collection::Landmarks(v) => v.len(),
        }
    }
}

/// Everything the map shows, as last loaded from the store.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct CampusData {
    #[serde(default)]
    pub buildings: Vec<Building>,
    #[serde(default)]
    pub footways: Vec<Footway>,
    #[serde(default)]
    pub entrances: Vec<Entrance>,
    #[serde(default)]
    pub parkings: Vec<Parking>,
    #[serde(default)]
    pub landmarks: Vec<Landmark>,
}

impl CampusData {
    pub fn replace(&mut self, collection: Collection) {
        match collection {
            Collection::Buildings(v) => self.buildings = v,
            Collection::Footways(v) => self.footways = v,
            Collection::Entrances(v) => self.entrances = v,
            Collection::Parkings(v) => self.parkings = v,
            Collection::Landmarks(v) => self.landmarks = v,
        }
    }

    pub fn collection(&self, kind: EntityKind) -> Collection {
        match kind {
            EntityKind::Building => Collection::Buildings(self.buildings.clone()),
            EntityKind::Footway => Collection::Footways(self.footways.clone()),
            EntityKind::Entrance => Collection::Entrances(self.entrances.clone()),
            EntityKind::Parking => Collection::Parkings(self.parkings.clone()),
            EntityKind::Landmark => Collection::Landmarks(self.landmarks.clone()),
        }
    }

    pub fn count(&self, kind: EntityKind) -> usize {
        match kind {
            EntityKind::Building => self.buildings.len(),
            EntityKind::Footway => self.footways.len(),
            EntityKind::Entrance => self.entrances.len(),
            EntityKind::Parking => self.parkings.len(),
            EntityKind::Landmark => self.landmarks.len(),
        }
    }

    /// Snap targets: every finite point of every footway, in render order.
    pub fn vertices(&self) -> impl Iterator<Item = LatLng> + '_ {
        self.footways.iter().flat_map(|f| f.geom.points())
    }

    pub fn building(&self, id: &str) -> Option<&Building> {
        self.buildings.iter().find(|b| b.id == id)
    }
}
