pub mod quote;
pub mod stay;
pub mod submission;
