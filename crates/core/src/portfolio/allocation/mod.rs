//! Portfolio allocation module for per-asset breakdowns.

mod allocation_model;

#[cfg(test)]
mod allocation_model_tests;

pub use allocation_model::{AllocationEntry, PortfolioAllocation};
