use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use tracing::debug;

use crate::cpq::allocation::clamp_to_u32;
use crate::cpq::assignment::instance_ids;
use crate::cpq::catalog::Catalog;
use crate::domain::quote::{QuoteConfiguration, RoomInstance};
use crate::domain::stay::RoomTypeId;
use crate::errors::DomainError;

/// Upper bound on the quantity of a single room type. Instances are
/// materialized per unit, so the quantity must stay small.
pub const MAX_ROOM_QUANTITY: u32 = 1_000;

/// Chosen quantity per room type and the instances derived from it.
///
/// Removing instances cascades: their assignments are deleted and the
/// occupants go back to the unassigned pool.
#[derive(Clone, Copy, Debug)]
pub struct RoomInventorySelector<'a> {
    catalog: Catalog<'a>,
    capacity_safety_factor: Option<Decimal>,
}

impl<'a> RoomInventorySelector<'a> {
    /// `capacity_safety_factor` bounds how much capacity may be selected
    /// relative to the headcount; `None` leaves selection unbounded.
    pub fn new(catalog: Catalog<'a>, capacity_safety_factor: Option<Decimal>) -> Self {
        Self { catalog, capacity_safety_factor }
    }

    pub fn set_quantity(
        &self,
        configuration: &mut QuoteConfiguration,
        room_type: &RoomTypeId,
        quantity: i64,
    ) -> Result<u32, DomainError> {
        self.catalog.room_type(room_type)?;
        let mut requested = clamp_to_u32(quantity);
        if requested > MAX_ROOM_QUANTITY {
            debug!(
                event_name = "cpq.inventory.capped",
                room_type = %room_type,
                requested,
                limit = MAX_ROOM_QUANTITY,
                "room quantity capped"
            );
            requested = MAX_ROOM_QUANTITY;
        }
        let quantity = match self.max_quantity(configuration, room_type)? {
            Some(limit) if requested > limit => {
                debug!(
                    event_name = "cpq.inventory.limited",
                    room_type = %room_type,
                    requested,
                    limit,
                    "room quantity limited by capacity safety factor"
                );
                limit
            }
            _ => requested,
        };

        let previous = configuration.quantity(room_type);
        if quantity < previous {
            let before = configuration.total_assigned();
            configuration.assignments.retain(|assignment| {
                let instance = &assignment.instance;
                &instance.room_type_id != room_type || instance.index < quantity
            });
            let freed = before - configuration.total_assigned();
            if freed > 0 {
                debug!(
                    event_name = "cpq.inventory.cascade",
                    room_type = %room_type,
                    previous,
                    quantity,
                    freed,
                    "removed room instances returned their occupants to the unassigned pool"
                );
            }
        }

        if quantity == 0 {
            configuration.selections.remove(room_type);
        } else {
            configuration.selections.insert(room_type.clone(), quantity);
        }

        Ok(quantity)
    }

    /// Σ quantity × capacity over room types the catalog knows.
    pub fn total_capacity(&self, configuration: &QuoteConfiguration) -> u32 {
        self.catalog
            .snapshot()
            .rooms
            .iter()
            .map(|room| configuration.quantity(&room.id).saturating_mul(room.capacity))
            .fold(0u32, u32::saturating_add)
    }

    pub fn instances(&self, configuration: &QuoteConfiguration) -> Vec<RoomInstance> {
        instance_ids(self.catalog, configuration)
            .into_iter()
            .filter_map(|id| {
                let capacity = self.catalog.room_type(&id.room_type_id).ok()?.capacity;
                Some(RoomInstance { id, capacity })
            })
            .collect()
    }

    /// `ceil(participants × factor)` when a safety factor is configured and
    /// there is at least one participant.
    pub fn capacity_limit(&self, configuration: &QuoteConfiguration) -> Option<u32> {
        let factor = self.capacity_safety_factor?;
        let participants = configuration.total_participants();
        if participants == 0 {
            return None;
        }
        (Decimal::from(participants) * factor).ceil().to_u32()
    }

    /// Largest quantity of `room_type` the safety factor allows, given the
    /// other selections. Never lower than what is needed to house everybody.
    pub fn max_quantity(
        &self,
        configuration: &QuoteConfiguration,
        room_type: &RoomTypeId,
    ) -> Result<Option<u32>, DomainError> {
        let capacity = self.catalog.room_type(room_type)?.capacity;
        let Some(limit) = self.capacity_limit(configuration) else {
            return Ok(None);
        };
        if capacity == 0 {
            return Ok(Some(0));
        }

        let own = configuration.quantity(room_type).saturating_mul(capacity);
        let others = self.total_capacity(configuration).saturating_sub(own);
        let allowed = limit.saturating_sub(others) / capacity;
        let needed = configuration.total_participants().saturating_sub(others).div_ceil(capacity);

        Ok(Some(allowed.max(needed)))
    }
}
