pub mod engine;
pub mod states;

pub use engine::{FlowDefinition, FlowEngine, FlowTransitionError, QuoteFlow};
pub use states::{ConfigurationStep, FlowContext, FlowEvent, StepStatus, TransitionOutcome};
