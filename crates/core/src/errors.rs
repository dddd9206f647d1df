use thiserror::Error;

use crate::config::ConfigError;

use crate::domain::quote::RoomInstanceId;
use crate::domain::stay::{AgeBracketId, RoomTypeId, SubPeriodId};
use crate::domain::submission::SubmissionError;
use crate::flows::FlowTransitionError;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum DomainError {
    #[error("unknown room type `{0}` (stale snapshot or mismatched ids)")]
    UnknownRoomType(RoomTypeId),
    #[error("unknown age bracket `{0}` (stale snapshot or mismatched ids)")]
    UnknownAgeBracket(AgeBracketId),
    #[error("unknown sub-period `{0}` (stale snapshot or mismatched ids)")]
    UnknownSubPeriod(SubPeriodId),
    #[error("room instance `{0}` is not part of the current selection")]
    UnknownRoomInstance(RoomInstanceId),
    #[error("sub-period reorder must list each of {expected} periods once, got {received:?}")]
    InvalidReorder { expected: usize, received: Vec<String> },
    #[error(transparent)]
    FlowTransition(#[from] FlowTransitionError),
    #[error(transparent)]
    Submission(#[from] SubmissionError),
    #[error("domain invariant violation: {0}")]
    InvariantViolation(String),
}

impl DomainError {
    /// Unknown ids point at an integration defect rather than a user mistake.
    pub fn is_programmer_error(&self) -> bool {
        matches!(
            self,
            Self::UnknownRoomType(_)
                | Self::UnknownAgeBracket(_)
                | Self::UnknownSubPeriod(_)
                | Self::UnknownRoomInstance(_)
                | Self::InvariantViolation(_)
        )
    }
}

#[derive(Debug, Error)]
pub enum ApplicationError {
    #[error(transparent)]
    Domain(#[from] DomainError),
    #[error("stay snapshot failure: {0}")]
    Snapshot(String),
    #[error("input failure: {0}")]
    Input(String),
    #[error("configuration issue: {0}")]
    Configuration(#[from] ConfigError),
}

impl ApplicationError {
    /// Short machine-readable class used in structured command output.
    pub fn error_class(&self) -> &'static str {
        match self {
            Self::Domain(DomainError::FlowTransition(_)) => "flow_guard",
            Self::Domain(DomainError::Submission(_)) => "submission_validation",
            Self::Domain(error) if error.is_programmer_error() => "integration",
            Self::Domain(_) => "domain_validation",
            Self::Snapshot(_) => "snapshot_validation",
            Self::Input(_) => "input",
            Self::Configuration(_) => "config_validation",
        }
    }
}
