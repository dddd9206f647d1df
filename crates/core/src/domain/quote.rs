use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::domain::stay::{AgeBracketId, RoomTypeId, StayId, SubPeriodId};
use crate::flows::states::ConfigurationStep;

/// One concrete unit of a selected room type, addressed by its position.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomInstanceId {
    pub room_type_id: RoomTypeId,
    pub index: u32,
}

impl RoomInstanceId {
    pub fn new(room_type_id: RoomTypeId, index: u32) -> Self {
        Self { room_type_id, index }
    }
}

impl fmt::Display for RoomInstanceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.room_type_id, self.index)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomInstance {
    pub id: RoomInstanceId,
    pub capacity: u32,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParticipantAllocation {
    pub age_bracket_id: AgeBracketId,
    pub count: u32,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomSelection {
    pub room_type_id: RoomTypeId,
    pub quantity: u32,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomAssignment {
    pub instance: RoomInstanceId,
    #[serde(default)]
    pub occupants: BTreeMap<AgeBracketId, u32>,
    #[serde(default)]
    pub sub_period_id: Option<SubPeriodId>,
}

impl RoomAssignment {
    pub fn new(instance: RoomInstanceId) -> Self {
        Self { instance, occupants: BTreeMap::new(), sub_period_id: None }
    }

    pub fn occupancy(&self) -> u32 {
        self.occupants.values().fold(0u32, |total, count| total.saturating_add(*count))
    }

    pub fn count(&self, bracket: &AgeBracketId) -> u32 {
        self.occupants.get(bracket).copied().unwrap_or(0)
    }

    pub(crate) fn set_count(&mut self, bracket: &AgeBracketId, count: u32) {
        if count == 0 {
            self.occupants.remove(bracket);
        } else {
            self.occupants.insert(bracket.clone(), count);
        }
    }

    /// Empty assignments carry no information and are not kept.
    pub(crate) fn is_vacant(&self) -> bool {
        self.occupancy() == 0 && self.sub_period_id.is_none()
    }
}

/// Canonical state of one quote session.
///
/// Only the choices are stored. Instances, capacity, assigned totals and
/// prices are all derived from this value and the stay snapshot.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteConfiguration {
    pub stay_id: StayId,
    pub step: ConfigurationStep,
    pub(crate) allocations: BTreeMap<AgeBracketId, u32>,
    pub(crate) selections: BTreeMap<RoomTypeId, u32>,
    pub(crate) assignments: Vec<RoomAssignment>,
    pub(crate) default_sub_period: Option<SubPeriodId>,
}

impl QuoteConfiguration {
    pub fn new(stay_id: StayId) -> Self {
        Self {
            stay_id,
            step: ConfigurationStep::Participants,
            allocations: BTreeMap::new(),
            selections: BTreeMap::new(),
            assignments: Vec::new(),
            default_sub_period: None,
        }
    }

    pub fn allocation(&self, bracket: &AgeBracketId) -> u32 {
        self.allocations.get(bracket).copied().unwrap_or(0)
    }

    pub fn allocations(&self) -> Vec<ParticipantAllocation> {
        self.allocations
            .iter()
            .map(|(bracket, count)| ParticipantAllocation {
                age_bracket_id: bracket.clone(),
                count: *count,
            })
            .collect()
    }

    pub fn total_participants(&self) -> u32 {
        self.allocations.values().fold(0u32, |total, count| total.saturating_add(*count))
    }

    pub fn quantity(&self, room_type: &RoomTypeId) -> u32 {
        self.selections.get(room_type).copied().unwrap_or(0)
    }

    pub fn selections(&self) -> Vec<RoomSelection> {
        self.selections
            .iter()
            .map(|(room_type, quantity)| RoomSelection {
                room_type_id: room_type.clone(),
                quantity: *quantity,
            })
            .collect()
    }

    pub fn has_selections(&self) -> bool {
        self.selections.values().any(|quantity| *quantity > 0)
    }

    pub fn assignments(&self) -> &[RoomAssignment] {
        &self.assignments
    }

    pub fn assignment(&self, instance: &RoomInstanceId) -> Option<&RoomAssignment> {
        self.assignments.iter().find(|assignment| &assignment.instance == instance)
    }

    pub fn default_sub_period(&self) -> Option<&SubPeriodId> {
        self.default_sub_period.as_ref()
    }

    /// Occupants of `bracket` placed in any instance.
    pub fn assigned(&self, bracket: &AgeBracketId) -> u32 {
        self.assignments
            .iter()
            .map(|assignment| assignment.count(bracket))
            .fold(0u32, u32::saturating_add)
    }

    pub fn total_assigned(&self) -> u32 {
        self.assignments.iter().map(RoomAssignment::occupancy).fold(0u32, u32::saturating_add)
    }

    pub(crate) fn assignment_mut(&mut self, instance: &RoomInstanceId) -> &mut RoomAssignment {
        let position =
            match self.assignments.iter().position(|assignment| &assignment.instance == instance) {
                Some(position) => position,
                None => {
                    let position = self
                        .assignments
                        .binary_search_by(|assignment| assignment.instance.cmp(instance))
                        .unwrap_or_else(|insert_at| insert_at);
                    self.assignments.insert(position, RoomAssignment::new(instance.clone()));
                    position
                }
            };
        &mut self.assignments[position]
    }

    pub(crate) fn prune_vacant(&mut self) {
        self.assignments.retain(|assignment| !assignment.is_vacant());
    }

    /// Folds entries naming the same instance into one and restores the
    /// sorted order `assignment_mut` relies on. Saved configurations may
    /// violate both.
    pub(crate) fn merge_duplicate_assignments(&mut self) {
        let mut merged: BTreeMap<RoomInstanceId, RoomAssignment> = BTreeMap::new();
        for assignment in self.assignments.drain(..) {
            match merged.get_mut(&assignment.instance) {
                Some(existing) => {
                    for (bracket, count) in assignment.occupants {
                        let total = existing.count(&bracket).saturating_add(count);
                        existing.set_count(&bracket, total);
                    }
                    if existing.sub_period_id.is_none() {
                        existing.sub_period_id = assignment.sub_period_id;
                    }
                }
                None => {
                    merged.insert(assignment.instance.clone(), assignment);
                }
            }
        }
        self.assignments = merged.into_values().collect();
    }
}
