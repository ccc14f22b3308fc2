//! Invoice field extraction module.

pub mod normalize;
mod parser;
pub mod rules;

pub use normalize::normalize;
pub use parser::{ExtractionResult, InvoiceParser, RuleBasedParser};
