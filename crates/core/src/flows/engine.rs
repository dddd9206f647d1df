use thiserror::Error;
use tracing::{debug, info};

use crate::cpq::constraints::ConstraintViolation;
use crate::flows::states::{
    ConfigurationStep, FlowContext, FlowEvent, StepStatus, TransitionOutcome,
};

pub trait FlowDefinition {
    fn initial_state(&self) -> ConfigurationStep;
    /// Conditions that must hold before leaving `step` forward. Empty means
    /// the step is complete.
    fn guard(&self, step: ConfigurationStep, context: &FlowContext) -> Vec<ConstraintViolation>;
    fn transition(
        &self,
        current: ConfigurationStep,
        event: &FlowEvent,
        context: &FlowContext,
    ) -> Result<TransitionOutcome, FlowTransitionError>;
}

/// Participants, then rooms, then assignment. Going back is always allowed
/// and keeps later choices; going forward requires the current step's guard.
#[derive(Clone, Copy, Debug, Default)]
pub struct QuoteFlow;

impl FlowDefinition for QuoteFlow {
    fn initial_state(&self) -> ConfigurationStep {
        ConfigurationStep::Participants
    }

    fn guard(&self, step: ConfigurationStep, context: &FlowContext) -> Vec<ConstraintViolation> {
        match step {
            ConfigurationStep::Participants => participants_guard(context),
            ConfigurationStep::Rooms => rooms_guard(context),
            ConfigurationStep::Assignment => assignment_guard(context),
        }
    }

    fn transition(
        &self,
        current: ConfigurationStep,
        event: &FlowEvent,
        context: &FlowContext,
    ) -> Result<TransitionOutcome, FlowTransitionError> {
        let invalid = || FlowTransitionError::InvalidTransition { state: current, event: *event };

        let to = match event {
            FlowEvent::Back => current.previous().ok_or_else(invalid)?,
            FlowEvent::Advance => {
                let next = current.next().ok_or_else(invalid)?;
                self.check(current, context)?;
                next
            }
            FlowEvent::JumpTo(target) => {
                let mut step = current;
                while step < *target {
                    self.check(step, context)?;
                    step = step.next().ok_or_else(invalid)?;
                }
                *target
            }
        };

        Ok(TransitionOutcome { from: current, to, event: *event })
    }
}

impl QuoteFlow {
    fn check(
        &self,
        step: ConfigurationStep,
        context: &FlowContext,
    ) -> Result<(), FlowTransitionError> {
        let unmet = self.guard(step, context);
        if unmet.is_empty() {
            Ok(())
        } else {
            Err(FlowTransitionError::GuardFailed { step, unmet })
        }
    }
}

pub struct FlowEngine<F> {
    flow: F,
}

impl<F> FlowEngine<F>
where
    F: FlowDefinition,
{
    pub fn new(flow: F) -> Self {
        Self { flow }
    }

    pub fn initial_state(&self) -> ConfigurationStep {
        self.flow.initial_state()
    }

    pub fn apply(
        &self,
        current: ConfigurationStep,
        event: &FlowEvent,
        context: &FlowContext,
    ) -> Result<TransitionOutcome, FlowTransitionError> {
        let result = self.flow.transition(current, event, context);
        match &result {
            Ok(outcome) => info!(
                event_name = "flow.transition_applied",
                from = %outcome.from,
                to = %outcome.to,
                event = ?outcome.event,
                "configuration step changed"
            ),
            Err(error) => debug!(
                event_name = "flow.transition_rejected",
                from = %current,
                event = ?event,
                error = %error,
                "configuration step change rejected"
            ),
        }
        result
    }

    pub fn status(&self, step: ConfigurationStep, context: &FlowContext) -> StepStatus {
        let unmet = self.flow.guard(step, context);
        StepStatus { step, ready: unmet.is_empty(), unmet }
    }

    /// Every step guard holds, i.e. the configuration can be submitted.
    pub fn ensure_complete(&self, context: &FlowContext) -> Result<(), FlowTransitionError> {
        for step in ConfigurationStep::ALL {
            let unmet = self.flow.guard(step, context);
            if !unmet.is_empty() {
                return Err(FlowTransitionError::GuardFailed { step, unmet });
            }
        }
        Ok(())
    }
}

impl Default for FlowEngine<QuoteFlow> {
    fn default() -> Self {
        Self::new(QuoteFlow)
    }
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum FlowTransitionError {
    #[error("cannot leave the {step} step: {}", describe(.unmet))]
    GuardFailed { step: ConfigurationStep, unmet: Vec<ConstraintViolation> },
    #[error("invalid transition from {state} using event {event:?}")]
    InvalidTransition { state: ConfigurationStep, event: FlowEvent },
}

impl FlowTransitionError {
    pub fn unmet(&self) -> &[ConstraintViolation] {
        match self {
            Self::GuardFailed { unmet, .. } => unmet,
            Self::InvalidTransition { .. } => &[],
        }
    }
}

fn describe(unmet: &[ConstraintViolation]) -> String {
    unmet.iter().map(|violation| violation.message.as_str()).collect::<Vec<_>>().join("; ")
}

fn participants_guard(context: &FlowContext) -> Vec<ConstraintViolation> {
    if context.total_participants > 0 {
        return Vec::new();
    }
    vec![ConstraintViolation::new(
        "NO_PARTICIPANTS",
        "No participants added",
        Some("Add at least one participant to an age bracket"),
    )]
}

fn rooms_guard(context: &FlowContext) -> Vec<ConstraintViolation> {
    let mut unmet = Vec::new();
    if !context.has_selections {
        unmet.push(ConstraintViolation::new(
            "NO_ROOMS_SELECTED",
            "No rooms selected",
            Some("Select at least one room"),
        ));
    }
    if context.total_capacity < context.total_participants {
        unmet.push(ConstraintViolation::new(
            "INSUFFICIENT_CAPACITY",
            format!(
                "Selected rooms sleep {} of {} participants",
                context.total_capacity, context.total_participants
            ),
            Some("Add rooms or choose larger room types"),
        ));
    }
    unmet
}

fn assignment_guard(context: &FlowContext) -> Vec<ConstraintViolation> {
    let mut unmet = Vec::new();
    if context.total_assigned < context.total_participants {
        let missing = context.total_participants - context.total_assigned;
        let noun = if missing == 1 { "participant" } else { "participants" };
        unmet.push(ConstraintViolation::new(
            "UNASSIGNED_PARTICIPANTS",
            format!("{missing} {noun} unassigned"),
            Some("Place every participant in a room"),
        ));
    }
    if context.total_assigned > context.total_participants {
        unmet.push(ConstraintViolation::new(
            "OVER_ASSIGNED",
            format!(
                "{} occupants assigned for {} participants",
                context.total_assigned, context.total_participants
            ),
            None,
        ));
    }
    for instance in &context.over_capacity {
        unmet.push(ConstraintViolation::new(
            "OVER_CAPACITY",
            format!("Room {instance} holds more occupants than it sleeps"),
            Some("Move occupants to another room"),
        ));
    }
    unmet
}
