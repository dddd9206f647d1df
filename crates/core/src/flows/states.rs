use std::fmt;

use serde::{Deserialize, Serialize};

use crate::cpq::constraints::ConstraintViolation;
use crate::domain::quote::RoomInstanceId;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfigurationStep {
    Participants,
    Rooms,
    Assignment,
}

impl ConfigurationStep {
    pub const ALL: [ConfigurationStep; 3] = [Self::Participants, Self::Rooms, Self::Assignment];

    pub fn next(self) -> Option<Self> {
        match self {
            Self::Participants => Some(Self::Rooms),
            Self::Rooms => Some(Self::Assignment),
            Self::Assignment => None,
        }
    }

    pub fn previous(self) -> Option<Self> {
        match self {
            Self::Participants => None,
            Self::Rooms => Some(Self::Participants),
            Self::Assignment => Some(Self::Rooms),
        }
    }
}

impl fmt::Display for ConfigurationStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Participants => "participants",
            Self::Rooms => "rooms",
            Self::Assignment => "assignment",
        };
        f.write_str(label)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlowEvent {
    Advance,
    Back,
    JumpTo(ConfigurationStep),
}

/// Aggregates the step guards look at, computed from the configuration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct FlowContext {
    pub total_participants: u32,
    pub has_selections: bool,
    pub total_capacity: u32,
    pub total_assigned: u32,
    pub over_capacity: Vec<RoomInstanceId>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitionOutcome {
    pub from: ConfigurationStep,
    pub to: ConfigurationStep,
    pub event: FlowEvent,
}

/// Whether the forward guard of `step` currently holds.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepStatus {
    pub step: ConfigurationStep,
    pub ready: bool,
    pub unmet: Vec<ConstraintViolation>,
}
