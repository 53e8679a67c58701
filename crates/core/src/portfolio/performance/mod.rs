//! Performance statistics over a replayed value series.

mod metrics_calculator;
mod performance_model;

#[cfg(test)]
mod metrics_calculator_tests;

pub use metrics_calculator::MetricsEngine;
pub use performance_model::{CashFlowTotals, MetricsConfig, MonthlyReturn, PerformanceMetrics};
