pub mod config;
pub mod cpq;
pub mod domain;
pub mod errors;
pub mod flows;

pub use config::{AppConfig, EngineConfig, LogFormat, LoggingConfig};
pub use cpq::constraints::{ConstraintResult, ConstraintViolation};
pub use cpq::pricing::{PriceAggregator, PriceBreakdown, PricingEngine};
pub use cpq::tariffs::{PeriodKey, PricingTable, TariffResolver};
pub use cpq::{QuoteAction, QuoteEngine, QuoteSummary, SubmissionOutcome};
pub use domain::quote::{QuoteConfiguration, RoomAssignment, RoomInstance, RoomInstanceId};
pub use domain::stay::{
    AgeBracket, AgeBracketId, RoomTariff, RoomType, RoomTypeId, StayId, StaySnapshot, SubPeriod,
    SubPeriodId,
};
pub use domain::submission::{ContactDetails, QuoteSubmission, SubmissionError, SubmissionRequest};
pub use errors::{ApplicationError, DomainError};
pub use flows::{ConfigurationStep, FlowEvent, FlowTransitionError};
