//! Valuation replay: daily total-value reconstruction over a date window.

mod valuation_calculator;
mod valuation_model;


pub use valuation_calculator::replay;
pub use valuation_model::{ReplayOutput, ReplayWindow, ValuationIssue, ValueSeries};
