use tracing::debug;

use crate::cpq::catalog::Catalog;
use crate::domain::quote::{QuoteConfiguration, RoomInstanceId};
use crate::domain::stay::{AgeBracketId, SubPeriodId};
use crate::errors::DomainError;

/// Places participants into room instances.
///
/// Every change is clamped so that an instance never holds more than its
/// capacity and a bracket never has more occupants than participants.
#[derive(Clone, Copy, Debug)]
pub struct RoomAssignmentEngine<'a> {
    catalog: Catalog<'a>,
}

impl<'a> RoomAssignmentEngine<'a> {
    pub fn new(catalog: Catalog<'a>) -> Self {
        Self { catalog }
    }

    /// Adds `delta` occupants of `bracket` to `instance` (negative removes),
    /// clamped to `[0, current + remaining]` and to the free capacity of the
    /// instance. Returns the delta that was actually applied.
    pub fn assign(
        &self,
        configuration: &mut QuoteConfiguration,
        instance: &RoomInstanceId,
        bracket: &AgeBracketId,
        delta: i64,
    ) -> Result<i64, DomainError> {
        self.catalog.age_bracket(bracket)?;
        let capacity = self.capacity(configuration, instance)?;

        let assignment = configuration.assignment(instance);
        let current = assignment.map_or(0, |assignment| assignment.count(bracket));
        let others = assignment.map_or(0, |assignment| assignment.occupancy()) - current;

        let allocated = i64::from(configuration.allocation(bracket));
        let remaining = allocated - i64::from(configuration.assigned(bracket));
        let allocation_bound = (i64::from(current) + remaining).max(0);
        let capacity_bound = i64::from(capacity.saturating_sub(others));
        let upper = allocation_bound.min(capacity_bound);

        let proposed = i64::from(current).saturating_add(delta);
        let next = proposed.clamp(0, upper);
        if next != proposed {
            debug!(
                event_name = "cpq.assignment.clamped",
                instance = %instance,
                age_bracket = %bracket,
                requested = proposed,
                applied = next,
                "assignment clamped to allocation and capacity bounds"
            );
        }

        let next = u32::try_from(next).unwrap_or(0);
        configuration.assignment_mut(instance).set_count(bracket, next);
        configuration.prune_vacant();

        Ok(i64::from(next) - i64::from(current))
    }

    pub fn occupancy(&self, configuration: &QuoteConfiguration, instance: &RoomInstanceId) -> u32 {
        configuration.assignment(instance).map_or(0, |assignment| assignment.occupancy())
    }

    /// Only reachable after the snapshot shrank a room type; regular
    /// assignment never exceeds capacity.
    pub fn is_over_capacity(
        &self,
        configuration: &QuoteConfiguration,
        instance: &RoomInstanceId,
    ) -> Result<bool, DomainError> {
        let capacity = self.catalog.room_type(&instance.room_type_id)?.capacity;
        Ok(self.occupancy(configuration, instance) > capacity)
    }

    pub fn set_sub_period(
        &self,
        configuration: &mut QuoteConfiguration,
        instance: &RoomInstanceId,
        sub_period: Option<SubPeriodId>,
    ) -> Result<(), DomainError> {
        self.capacity(configuration, instance)?;
        if let Some(sub_period) = &sub_period {
            self.catalog.sub_period(sub_period)?;
        }

        configuration.assignment_mut(instance).sub_period_id = sub_period;
        configuration.prune_vacant();
        Ok(())
    }

    /// The instance override, else the configuration-wide sub-period.
    pub fn active_sub_period<'c>(
        &self,
        configuration: &'c QuoteConfiguration,
        instance: &RoomInstanceId,
    ) -> Option<&'c SubPeriodId> {
        configuration
            .assignment(instance)
            .and_then(|assignment| assignment.sub_period_id.as_ref())
            .or(configuration.default_sub_period())
    }

    /// Greedily places every unassigned participant: brackets in display
    /// order, instances in catalog order. Returns how many were placed.
    pub fn auto_assign(&self, configuration: &mut QuoteConfiguration) -> Result<u32, DomainError> {
        let mut placed = 0;
        for bracket in self.catalog.snapshot().ordered_age_brackets() {
            for instance in instance_ids(self.catalog, configuration) {
                let remaining = configuration
                    .allocation(&bracket.id)
                    .saturating_sub(configuration.assigned(&bracket.id));
                if remaining == 0 {
                    break;
                }
                let applied =
                    self.assign(configuration, &instance, &bracket.id, i64::from(remaining))?;
                placed += u32::try_from(applied).unwrap_or(0);
            }
        }
        Ok(placed)
    }

    fn capacity(
        &self,
        configuration: &QuoteConfiguration,
        instance: &RoomInstanceId,
    ) -> Result<u32, DomainError> {
        self.catalog.instance_capacity(instance, configuration.quantity(&instance.room_type_id))
    }
}

/// Instance ids of the current selection, room types in catalog order.
pub(crate) fn instance_ids(
    catalog: Catalog<'_>,
    configuration: &QuoteConfiguration,
) -> Vec<RoomInstanceId> {
    catalog
        .snapshot()
        .rooms
        .iter()
        .flat_map(|room| {
            (0..configuration.quantity(&room.id))
                .map(move |index| RoomInstanceId::new(room.id.clone(), index))
        })
        .collect()
}

/// Takes up to `amount` occupants of `bracket` out of the instances, last
/// instance first. Returns how many were released.
pub(crate) fn release_occupants(
    catalog: Catalog<'_>,
    configuration: &mut QuoteConfiguration,
    bracket: &AgeBracketId,
    amount: u32,
) -> u32 {
    let mut outstanding = amount;
    let mut order: Vec<RoomInstanceId> =
        configuration.assignments().iter().map(|assignment| assignment.instance.clone()).collect();
    order.sort_by_key(|instance| {
        let position = catalog
            .snapshot()
            .rooms
            .iter()
            .position(|room| room.id == instance.room_type_id)
            .unwrap_or(usize::MAX);
        (position, instance.index)
    });

    for instance in order.iter().rev() {
        if outstanding == 0 {
            break;
        }
        let assignment = configuration.assignment_mut(instance);
        let current = assignment.count(bracket);
        let taken = current.min(outstanding);
        assignment.set_count(bracket, current - taken);
        outstanding -= taken;
    }

    configuration.prune_vacant();
    amount - outstanding
}
