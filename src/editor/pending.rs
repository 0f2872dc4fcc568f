use crate::model::{self, Building, InsertTicket, LatLng, NewEntity, PointGeom};

use super::mode::{PointKind, TypeSelection};

/// A building offered for association, with its distance from the draft.
#[derive(Clone, Debug, PartialEq)]
pub struct BuildingChoice {
    pub id: String,
    pub name: String,
    pub distance_m: f64,
}

/// Buildings ordered nearest-first from `at`. The sort is stable, so equal
/// distances keep collection order.
pub fn buildings_by_distance(at: LatLng, buildings: &[Building]) -> Vec<BuildingChoice> {
    let mut out: Vec<BuildingChoice> = buildings
        .iter()
        .filter(|b| b.location().is_finite())
        .map(|b| BuildingChoice {
            id: b.id.clone(),
            name: b.name.clone(),
            distance_m: at.distance_to(b.location()),
        })
        .collect();
    out.sort_by(|a, b| a.distance_m.total_cmp(&b.distance_m));
    out
}

/// Unsaved point entity waiting for the mini-form to be confirmed.
#[derive(Clone, Debug, PartialEq)]
pub struct PendingDraft {
    kind: PointKind,
    at: LatLng,
    pub name: String,
    building_id: Option<String>,
    choices: Vec<BuildingChoice>,
    ticket: Option<InsertTicket>,
}

impl PendingDraft {
    pub fn new(kind: PointKind, at: LatLng, buildings: &[Building]) -> Self {
        let choices = buildings_by_distance(at, buildings);
        let building_id = choices.first().map(|c| c.id.clone());
        Self {
            kind,
            at,
            name: String::new(),
            building_id,
            choices,
            ticket: None,
        }
    }

    pub fn kind(&self) -> PointKind {
        self.kind
    }

    pub fn location(&self) -> LatLng {
        self.at
    }

    pub fn building_id(&self) -> Option<&str> {
        self.building_id.as_deref()
    }

    /// Nearest-first association list for the current location.
    pub fn choices(&self) -> &[BuildingChoice] {
        &self.choices
    }

    pub fn is_submitting(&self) -> bool {
        self.ticket.is_some()
    }

    /// Insert in flight for this draft, if any.
    pub fn ticket(&self) -> Option<InsertTicket> {
        self.ticket
    }

    pub fn update_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    /// `None` unlinks the draft from any building.
    pub fn update_building_id(&mut self, id: Option<String>) {
        self.building_id = id;
    }

    /// Moves the draft, recomputing the association list and resetting the
    /// default link to the new nearest building.
    pub fn relocate(&mut self, at: LatLng, buildings: &[Building]) {
        self.at = at;
        self.choices = buildings_by_distance(at, buildings);
        self.building_id = self.choices.first().map(|c| c.id.clone());
    }

    pub(super) fn mark_submitting(&mut self, ticket: InsertTicket) {
        self.ticket = Some(ticket);
    }

    /// Insert payload for this draft. Blank names are stored as `null`.
    pub fn to_new_entity(&self, selection: &TypeSelection) -> NewEntity {
        let name = Some(self.name.trim())
            .filter(|n| !n.is_empty())
            .map(str::to_string);
        let building_id = self.building_id.clone();
        let location = PointGeom::at(self.at);
        match self.kind {
            PointKind::Entrance => NewEntity::Entrance(model::NewEntrance {
                name,
                building_id,
                kind: selection.entrance,
                is_active: true,
                location,
            }),
            PointKind::Parking => NewEntity::Parking(model::NewParking {
                name,
                building_id,
                kind: selection.parking,
                capacity: None,
                is_active: true,
                location,
            }),
            PointKind::Landmark => NewEntity::Landmark(model::NewLandmark {
                name,
                building_id,
                kind: selection.landmark,
                is_active: true,
                location,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{BuildingStatus, EntranceType};
    use pretty_assertions::assert_eq;

    /// Roughly one meter of latitude near the equator.
    const M: f64 = 1.0 / 111_195.0;

    fn building(id: &str, at: LatLng) -> Building {
        Building {
            id: id.into(),
            name: format!("Building {id}"),
            latitude: at.lat,
            longitude: at.lng,
            total_floors: 2,
            building_code: None,
            description: None,
            state: BuildingStatus::Enabled,
        }
    }

    #[test]
    fn nearest_building_is_default_link() {
        let at = LatLng::new(0.0, 0.0);
        let buildings = vec![
            building("far", LatLng::new(500.0 * M, 0.0)),
            building("near", LatLng::new(5.0 * M, 0.0)),
            building("mid", LatLng::new(50.0 * M, 0.0)),
        ];
        let draft = PendingDraft::new(PointKind::Entrance, at, &buildings);
        assert_eq!(draft.building_id(), Some("near"));
        let order: Vec<_> = draft.choices().iter().map(|c| c.id.as_str()).collect();
        assert_eq!(order, vec!["near", "mid", "far"]);
    }

    #[test]
    fn no_buildings_means_no_link() {
        let draft = PendingDraft::new(PointKind::Landmark, LatLng::new(1.0, 1.0), &[]);
        assert_eq!(draft.building_id(), None);
        assert!(draft.choices().is_empty());
    }

    #[test]
    fn equal_distances_keep_collection_order() {
        let buildings = vec![
            building("first", LatLng::new(10.0 * M, 0.0)),
            building("second", LatLng::new(-10.0 * M, 0.0)),
        ];
        let draft = PendingDraft::new(PointKind::Entrance, LatLng::new(0.0, 0.0), &buildings);
        assert_eq!(draft.building_id(), Some("first"));
    }

    #[test]
    fn relocate_recomputes_order() {
        let a = building("a", LatLng::new(0.0, 0.0));
        let b = building("b", LatLng::new(100.0 * M, 0.0));
        let buildings = vec![a, b];
        let mut draft = PendingDraft::new(PointKind::Parking, LatLng::new(1.0 * M, 0.0), &buildings);
        assert_eq!(draft.building_id(), Some("a"));
        draft.relocate(LatLng::new(99.0 * M, 0.0), &buildings);
        assert_eq!(draft.choices()[0].id, "b");
        assert_eq!(draft.building_id(), Some("b"));
    }

    #[test]
    fn blank_name_is_stored_as_null() {
        let mut draft = PendingDraft::new(PointKind::Entrance, LatLng::new(0.0, 0.0), &[]);
        draft.update_name("   ");
        let selection = TypeSelection {
            entrance: EntranceType::Both,
            ..TypeSelection::default()
        };
        let NewEntity::Entrance(row) = draft.to_new_entity(&selection) else {
            panic!("expected an entrance");
        };
        assert_eq!(row.name, None);
        assert_eq!(row.kind, EntranceType::Both);
        assert!(row.is_active);
    }

    #[test]
    fn parking_payload_has_no_capacity() {
        let mut draft = PendingDraft::new(PointKind::Parking, LatLng::new(0.5, 0.25), &[]);
        draft.update_name("North lot");
        draft.update_building_id(Some("b9".into()));
        let NewEntity::Parking(row) = draft.to_new_entity(&TypeSelection::default()) else {
            panic!("expected a parking");
        };
        assert_eq!(row.name.as_deref(), Some("North lot"));
        assert_eq!(row.building_id.as_deref(), Some("b9"));
        assert_eq!(row.capacity, None);
        assert_eq!(row.location.coordinates, [0.25, 0.5]);
    }
}
