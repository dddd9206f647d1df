use crate::domain::quote::RoomInstanceId;
use crate::domain::stay::{
    AgeBracket, AgeBracketId, RoomType, RoomTypeId, StaySnapshot, SubPeriod, SubPeriodId,
};
use crate::errors::DomainError;

/// Id lookups over a stay snapshot.
///
/// An id that the snapshot does not know means the caller holds a stale
/// snapshot or mixed up ids, so every lookup returns an error instead of a
/// default.
#[derive(Clone, Copy, Debug)]
pub struct Catalog<'a> {
    snapshot: &'a StaySnapshot,
}

impl<'a> Catalog<'a> {
    pub fn new(snapshot: &'a StaySnapshot) -> Self {
        Self { snapshot }
    }

    pub fn snapshot(&self) -> &'a StaySnapshot {
        self.snapshot
    }

    pub fn room_type(&self, id: &RoomTypeId) -> Result<&'a RoomType, DomainError> {
        self.snapshot
            .rooms
            .iter()
            .find(|room| &room.id == id)
            .ok_or_else(|| DomainError::UnknownRoomType(id.clone()))
    }

    pub fn age_bracket(&self, id: &AgeBracketId) -> Result<&'a AgeBracket, DomainError> {
        self.snapshot
            .age_brackets
            .iter()
            .find(|bracket| &bracket.id == id)
            .ok_or_else(|| DomainError::UnknownAgeBracket(id.clone()))
    }

    pub fn sub_period(&self, id: &SubPeriodId) -> Result<&'a SubPeriod, DomainError> {
        self.snapshot
            .sub_periods
            .iter()
            .find(|period| &period.id == id)
            .ok_or_else(|| DomainError::UnknownSubPeriod(id.clone()))
    }

    pub fn has_room_type(&self, id: &RoomTypeId) -> bool {
        self.room_type(id).is_ok()
    }

    pub fn has_age_bracket(&self, id: &AgeBracketId) -> bool {
        self.age_bracket(id).is_ok()
    }

    pub fn has_sub_period(&self, id: &SubPeriodId) -> bool {
        self.sub_period(id).is_ok()
    }

    /// Capacity of an instance, checked against the selected quantity.
    pub fn instance_capacity(
        &self,
        instance: &RoomInstanceId,
        selected_quantity: u32,
    ) -> Result<u32, DomainError> {
        let room = self.room_type(&instance.room_type_id)?;
        if instance.index >= selected_quantity {
            return Err(DomainError::UnknownRoomInstance(instance.clone()));
        }
        Ok(room.capacity)
    }
}
