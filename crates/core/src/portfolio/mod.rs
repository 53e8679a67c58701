//! Portfolio accounting: positions, ledger, valuation replay, performance
//! statistics, allocation and reporting.

pub mod allocation;
pub mod ledger;
pub mod performance;
pub mod positions;
pub mod reporting;
pub mod valuation;
