use tracing::debug;

use crate::cpq::assignment::release_occupants;
use crate::cpq::catalog::Catalog;
use crate::domain::quote::QuoteConfiguration;
use crate::domain::stay::AgeBracketId;
use crate::errors::DomainError;

/// Participant headcount per age bracket.
#[derive(Clone, Copy, Debug)]
pub struct AgeBracketAllocator<'a> {
    catalog: Catalog<'a>,
}

impl<'a> AgeBracketAllocator<'a> {
    pub fn new(catalog: Catalog<'a>) -> Self {
        Self { catalog }
    }

    /// Sets the headcount of a bracket, clamping negative input to zero.
    ///
    /// Lowering a count below what is already placed in rooms releases the
    /// surplus occupants, last instance first, so `remaining` never goes
    /// negative.
    pub fn set_count(
        &self,
        configuration: &mut QuoteConfiguration,
        bracket: &AgeBracketId,
        count: i64,
    ) -> Result<u32, DomainError> {
        self.catalog.age_bracket(bracket)?;
        let count = clamp_to_u32(count);

        if count == 0 {
            configuration.allocations.remove(bracket);
        } else {
            configuration.allocations.insert(bracket.clone(), count);
        }

        let assigned = configuration.assigned(bracket);
        if assigned > count {
            let surplus = assigned - count;
            let released = release_occupants(self.catalog, configuration, bracket, surplus);
            debug!(
                event_name = "cpq.allocation.cascade",
                age_bracket = %bracket,
                released,
                "released occupants after headcount was lowered"
            );
        }

        Ok(count)
    }

    pub fn total_participants(&self, configuration: &QuoteConfiguration) -> u32 {
        configuration.total_participants()
    }

    /// Participants of `bracket` not yet placed in a room.
    pub fn remaining(&self, configuration: &QuoteConfiguration, bracket: &AgeBracketId) -> i64 {
        i64::from(configuration.allocation(bracket)) - i64::from(configuration.assigned(bracket))
    }

    /// Participants of all brackets not yet placed in a room.
    pub fn total_remaining(&self, configuration: &QuoteConfiguration) -> i64 {
        i64::from(configuration.total_participants()) - i64::from(configuration.total_assigned())
    }
}

pub(crate) fn clamp_to_u32(value: i64) -> u32 {
    u32::try_from(value.max(0)).unwrap_or(u32::MAX)
}
