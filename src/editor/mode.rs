use crate::model::{
    EntityKind, EntranceType, InsertTicket, LandmarkType, LatLng, ParkingType, TransitKind,
};
use serde::{Deserialize, Serialize};

use super::pending::PendingDraft;

/// Editing intent as chosen from the host's menus.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ModeKind {
    Idle,
    AddBuilding,
    FootwayAb,
    Entrance,
    Parking,
    Landmark,
}

impl ModeKind {
    pub fn label(self) -> &'static str {
        match self {
            ModeKind::Idle => "Browse",
            ModeKind::AddBuilding => "Add building",
            ModeKind::FootwayAb => "Draw footway",
            ModeKind::Entrance => "Add entrance",
            ModeKind::Parking => "Add parking",
            ModeKind::Landmark => "Add landmark",
        }
    }
}

/// Point entities placed through the mini-form.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PointKind {
    Entrance,
    Parking,
    Landmark,
}

impl PointKind {
    pub fn entity(self) -> EntityKind {
        match self {
            PointKind::Entrance => EntityKind::Entrance,
            PointKind::Parking => EntityKind::Parking,
            PointKind::Landmark => EntityKind::Landmark,
        }
    }

    pub fn mode(self) -> ModeKind {
        match self {
            PointKind::Entrance => ModeKind::Entrance,
            PointKind::Parking => ModeKind::Parking,
            PointKind::Landmark => ModeKind::Landmark,
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            PointKind::Entrance => "New entrance",
            PointKind::Parking => "New parking",
            PointKind::Landmark => "New landmark",
        }
    }
}

/// Type pickers the host menu sets alongside the mode. Read at completion
/// time, so changing them mid-draft affects the row that gets inserted.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TypeSelection {
    pub transit: TransitKind,
    pub entrance: EntranceType,
    pub parking: ParkingType,
    pub landmark: LandmarkType,
}

/// Endpoints of a footway being drawn. `b` and `ticket` are only set while
/// the insert for `[a, b]` is in flight.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct AbDraft {
    pub a: Option<LatLng>,
    pub b: Option<LatLng>,
    pub ticket: Option<InsertTicket>,
}

impl AbDraft {
    pub fn is_submitting(&self) -> bool {
        self.ticket.is_some()
    }
}

/// The active mode together with the transient state only that mode owns.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum Mode {
    #[default]
    Idle,
    AddBuilding,
    FootwayAb(AbDraft),
    Place {
        kind: PointKind,
        draft: Option<PendingDraft>,
    },
}

impl Mode {
    pub fn from_kind(kind: ModeKind) -> Self {
        match kind {
            ModeKind::Idle => Mode::Idle,
            ModeKind::AddBuilding => Mode::AddBuilding,
            ModeKind::FootwayAb => Mode::FootwayAb(AbDraft::default()),
            ModeKind::Entrance => Mode::Place {
                kind: PointKind::Entrance,
                draft: None,
            },
            ModeKind::Parking => Mode::Place {
                kind: PointKind::Parking,
                draft: None,
            },
            ModeKind::Landmark => Mode::Place {
                kind: PointKind::Landmark,
                draft: None,
            },
        }
    }

    pub fn kind(&self) -> ModeKind {
        match self {
            Mode::Idle => ModeKind::Idle,
            Mode::AddBuilding => ModeKind::AddBuilding,
            Mode::FootwayAb(_) => ModeKind::FootwayAb,
            Mode::Place { kind, .. } => kind.mode(),
        }
    }

    pub fn pending(&self) -> Option<&PendingDraft> {
        match self {
            Mode::Place { draft, .. } => draft.as_ref(),
            _ => None,
        }
    }

    /// Whether anything would be lost by resetting to idle.
    pub fn has_side_state(&self) -> bool {
        match self {
            Mode::Idle => false,
            Mode::AddBuilding => true,
            Mode::FootwayAb(_) => true,
            Mode::Place { .. } => true,
        }
    }

    /// Status line for the active action; hidden while a mini-form is open.
    pub fn banner(&self, selection: &TypeSelection) -> Option<String> {
        match self {
            Mode::Idle => None,
            Mode::AddBuilding => Some("Add building • click the map".to_string()),
            Mode::FootwayAb(ab) => Some(match ab.a {
                None => format!(
                    "Draw {} footway (A→B) • click vertices or map",
                    selection.transit.label()
                ),
                Some(_) => format!(
                    "Draw {} footway (A→B) • pick point B",
                    selection.transit.label()
                ),
            }),
            Mode::Place { draft: Some(_), .. } => None,
            Mode::Place { kind, draft: None } => Some(match kind {
                PointKind::Entrance => {
                    format!("New entrance ({}) • click the map", selection.entrance.label())
                }
                PointKind::Parking => {
                    format!("New parking ({}) • click the map", selection.parking.label())
                }
                PointKind::Landmark => {
                    format!("New landmark ({}) • click the map", selection.landmark.label())
                }
            }),
        }
    }
}
