pub mod allocation;
pub mod assignment;
pub mod catalog;
pub mod constraints;
pub mod estimate;
pub mod inventory;
pub mod pricing;
pub mod tariffs;

#[cfg(test)]
pub(crate) mod fixtures;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::EngineConfig;
use crate::domain::quote::{QuoteConfiguration, RoomInstanceId};
use crate::domain::stay::{AgeBracketId, RoomTypeId, StaySnapshot, SubPeriodId};
use crate::domain::submission::{validate_dates, QuoteSubmission, SubmissionRequest};
use crate::errors::DomainError;
use crate::flows::{
    ConfigurationStep, FlowContext, FlowEngine, FlowEvent, QuoteFlow, StepStatus,
};

use self::{
    allocation::AgeBracketAllocator,
    assignment::RoomAssignmentEngine,
    catalog::Catalog,
    constraints::{ConstraintEngine, ConstraintResult, DeterministicConstraintEngine},
    estimate::PriceEstimate,
    inventory::{RoomInventorySelector, MAX_ROOM_QUANTITY},
    pricing::{PriceAggregator, PriceBreakdown, PricingEngine},
};

/// Every way a quote session can change its configuration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum QuoteAction {
    SetParticipants { age_bracket_id: AgeBracketId, count: i64 },
    SetRoomQuantity { room_type_id: RoomTypeId, quantity: i64 },
    Assign { instance: RoomInstanceId, age_bracket_id: AgeBracketId, delta: i64 },
    SetInstanceSubPeriod { instance: RoomInstanceId, sub_period_id: Option<SubPeriodId> },
    SetDefaultSubPeriod { sub_period_id: Option<SubPeriodId> },
    AutoAssign,
    Navigate { event: FlowEvent },
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstanceSummary {
    pub instance: RoomInstanceId,
    pub capacity: u32,
    pub occupancy: u32,
    pub sub_period_id: Option<SubPeriodId>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BracketSummary {
    pub age_bracket_id: AgeBracketId,
    pub allocated: u32,
    pub assigned: u32,
    pub remaining: i64,
}

/// Aggregates derived from a configuration; never stored alongside it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteSummary {
    pub step: ConfigurationStep,
    pub total_participants: u32,
    pub total_capacity: u32,
    pub total_assigned: u32,
    pub brackets: Vec<BracketSummary>,
    pub instances: Vec<InstanceSummary>,
    pub steps: Vec<StepStatus>,
    pub price: PriceBreakdown,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionOutcome {
    pub submission: QuoteSubmission,
    pub nights: u32,
    /// Carries `has_undefined_pricing` so the quote can be flagged for
    /// manual pricing downstream.
    pub price: PriceBreakdown,
}

/// Pure reducer over [`QuoteConfiguration`] for one stay snapshot.
pub struct QuoteEngine<'a> {
    snapshot: &'a StaySnapshot,
    config: EngineConfig,
    flow: FlowEngine<QuoteFlow>,
}

impl<'a> QuoteEngine<'a> {
    pub fn new(snapshot: &'a StaySnapshot, config: EngineConfig) -> Self {
        Self { snapshot, config, flow: FlowEngine::default() }
    }

    pub fn snapshot(&self) -> &'a StaySnapshot {
        self.snapshot
    }

    pub fn catalog(&self) -> Catalog<'a> {
        Catalog::new(self.snapshot)
    }

    pub fn allocator(&self) -> AgeBracketAllocator<'a> {
        AgeBracketAllocator::new(self.catalog())
    }

    pub fn inventory(&self) -> RoomInventorySelector<'a> {
        RoomInventorySelector::new(self.catalog(), self.config.capacity_safety_factor)
    }

    pub fn assignments(&self) -> RoomAssignmentEngine<'a> {
        RoomAssignmentEngine::new(self.catalog())
    }

    pub fn pricing(&self) -> PriceAggregator<'a> {
        PriceAggregator::new(self.catalog())
    }

    pub fn flow(&self) -> &FlowEngine<QuoteFlow> {
        &self.flow
    }

    /// Empty configuration bound to this snapshot.
    pub fn start(&self) -> QuoteConfiguration {
        QuoteConfiguration::new(self.snapshot.id.clone())
    }

    pub fn validate_snapshot(&self) -> ConstraintResult {
        DeterministicConstraintEngine.validate(self.snapshot)
    }

    pub fn apply(
        &self,
        configuration: &QuoteConfiguration,
        action: &QuoteAction,
    ) -> Result<QuoteConfiguration, DomainError> {
        let mut next = configuration.clone();
        match action {
            QuoteAction::SetParticipants { age_bracket_id, count } => {
                self.allocator().set_count(&mut next, age_bracket_id, *count)?;
            }
            QuoteAction::SetRoomQuantity { room_type_id, quantity } => {
                self.inventory().set_quantity(&mut next, room_type_id, *quantity)?;
            }
            QuoteAction::Assign { instance, age_bracket_id, delta } => {
                self.assignments().assign(&mut next, instance, age_bracket_id, *delta)?;
            }
            QuoteAction::SetInstanceSubPeriod { instance, sub_period_id } => {
                self.assignments().set_sub_period(&mut next, instance, sub_period_id.clone())?;
            }
            QuoteAction::SetDefaultSubPeriod { sub_period_id } => {
                if let Some(sub_period_id) = sub_period_id {
                    self.catalog().sub_period(sub_period_id)?;
                }
                next.default_sub_period = sub_period_id.clone();
            }
            QuoteAction::AutoAssign => {
                self.assignments().auto_assign(&mut next)?;
            }
            QuoteAction::Navigate { event } => {
                let outcome = self.flow.apply(next.step, event, &self.flow_context(&next))?;
                next.step = outcome.to;
            }
        }
        Ok(next)
    }

    /// Replays `actions` from `configuration`, stopping at the first error.
    pub fn apply_all<'b>(
        &self,
        configuration: &QuoteConfiguration,
        actions: impl IntoIterator<Item = &'b QuoteAction>,
    ) -> Result<QuoteConfiguration, DomainError> {
        actions.into_iter().try_fold(configuration.clone(), |current, action| {
            self.apply(&current, action)
        })
    }

    /// Re-points a configuration at this engine's snapshot.
    ///
    /// Choices referring to ids the snapshot no longer has are dropped,
    /// instances beyond the selected quantity lose their assignment, and
    /// occupants beyond a room's capacity or a bracket's headcount return to
    /// the unassigned pool. Duplicate entries for one instance are merged
    /// before those limits apply. The step is kept; guards are re-checked on the
    /// next forward move.
    pub fn reconcile(&self, configuration: &QuoteConfiguration) -> QuoteConfiguration {
        let catalog = self.catalog();
        let mut next = configuration.clone();
        next.stay_id = self.snapshot.id.clone();

        next.allocations.retain(|bracket, _| catalog.has_age_bracket(bracket));
        next.selections
            .retain(|room_type, quantity| *quantity > 0 && catalog.has_room_type(room_type));
        for quantity in next.selections.values_mut() {
            *quantity = (*quantity).min(MAX_ROOM_QUANTITY);
        }
        next.merge_duplicate_assignments();
        if next.default_sub_period.as_ref().is_some_and(|id| !catalog.has_sub_period(id)) {
            next.default_sub_period = None;
        }

        let selections = next.selections.clone();
        let brackets = self.snapshot.ordered_age_brackets();
        next.assignments.retain(|assignment| {
            let instance = &assignment.instance;
            selections
                .get(&instance.room_type_id)
                .is_some_and(|quantity| instance.index < *quantity)
        });
        for assignment in &mut next.assignments {
            assignment
                .occupants
                .retain(|bracket, count| *count > 0 && catalog.has_age_bracket(bracket));
            if assignment.sub_period_id.as_ref().is_some_and(|id| !catalog.has_sub_period(id)) {
                assignment.sub_period_id = None;
            }

            let capacity = catalog
                .room_type(&assignment.instance.room_type_id)
                .map_or(0, |room| room.capacity);
            let mut excess = assignment.occupancy().saturating_sub(capacity);
            for bracket in brackets.iter().rev() {
                if excess == 0 {
                    break;
                }
                let current = assignment.count(&bracket.id);
                let taken = current.min(excess);
                assignment.set_count(&bracket.id, current - taken);
                excess -= taken;
            }
        }
        next.prune_vacant();

        for bracket in &brackets {
            let assigned = next.assigned(&bracket.id);
            let allocated = next.allocation(&bracket.id);
            if assigned > allocated {
                let surplus = assigned - allocated;
                assignment::release_occupants(catalog, &mut next, &bracket.id, surplus);
            }
        }

        if &next != configuration {
            debug!(
                event_name = "cpq.reconcile.adjusted",
                stay_id = %next.stay_id,
                assignments = next.assignments.len(),
                "configuration adjusted to the current stay snapshot"
            );
        }
        next
    }

    pub fn flow_context(&self, configuration: &QuoteConfiguration) -> FlowContext {
        let assignments = self.assignments();
        let over_capacity = configuration
            .assignments()
            .iter()
            .filter(|assignment| {
                assignments.is_over_capacity(configuration, &assignment.instance).unwrap_or(true)
            })
            .map(|assignment| assignment.instance.clone())
            .collect();

        FlowContext {
            total_participants: configuration.total_participants(),
            has_selections: configuration.has_selections(),
            total_capacity: self.inventory().total_capacity(configuration),
            total_assigned: configuration.total_assigned(),
            over_capacity,
        }
    }

    pub fn summary(&self, configuration: &QuoteConfiguration) -> Result<QuoteSummary, DomainError> {
        let allocator = self.allocator();
        let assignments = self.assignments();
        let context = self.flow_context(configuration);

        let brackets = self
            .snapshot
            .ordered_age_brackets()
            .into_iter()
            .map(|bracket| BracketSummary {
                age_bracket_id: bracket.id.clone(),
                allocated: configuration.allocation(&bracket.id),
                assigned: configuration.assigned(&bracket.id),
                remaining: allocator.remaining(configuration, &bracket.id),
            })
            .collect();

        let instances = self
            .inventory()
            .instances(configuration)
            .into_iter()
            .map(|instance| InstanceSummary {
                occupancy: assignments.occupancy(configuration, &instance.id),
                sub_period_id: assignments.active_sub_period(configuration, &instance.id).cloned(),
                capacity: instance.capacity,
                instance: instance.id,
            })
            .collect();

        let steps =
            ConfigurationStep::ALL.iter().map(|step| self.flow.status(*step, &context)).collect();

        Ok(QuoteSummary {
            step: configuration.step,
            total_participants: context.total_participants,
            total_capacity: context.total_capacity,
            total_assigned: context.total_assigned,
            brackets,
            instances,
            steps,
            price: self.pricing().total_price(configuration)?,
        })
    }

    /// Averaged estimate, for contexts without room assignments.
    pub fn estimate(&self, configuration: &QuoteConfiguration) -> PriceEstimate {
        estimate::estimated_total(self.catalog(), configuration)
    }

    /// The sub-period wholly covering the requested dates, if any.
    pub fn default_sub_period_for(
        &self,
        check_in: NaiveDate,
        check_out: NaiveDate,
    ) -> Option<SubPeriodId> {
        self.snapshot.sub_period_covering(check_in, check_out).map(|period| period.id.clone())
    }

    /// Builds the submission payload of a completed configuration.
    pub fn submit(
        &self,
        configuration: &QuoteConfiguration,
        request: &SubmissionRequest,
    ) -> Result<SubmissionOutcome, DomainError> {
        self.flow.ensure_complete(&self.flow_context(configuration))?;
        let submission = QuoteSubmission::build(request, self.snapshot, configuration)?;
        let nights = validate_dates(self.snapshot, request.check_in, request.check_out)?;
        let price = self.pricing().total_price(configuration)?;

        info!(
            event_name = "cpq.submission.built",
            stay_id = %submission.stay_id,
            nights,
            total = %price.total,
            has_undefined_pricing = price.has_undefined_pricing,
            "quote submission built"
        );

        Ok(SubmissionOutcome { submission, nights, price })
    }
}
