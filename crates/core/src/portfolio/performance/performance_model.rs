//! Performance metrics domain models.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_RISK_FREE_RATE, MIN_RISK_OBSERVATIONS};
use crate::portfolio::valuation::ValueSeries;

/// Parameters for one metrics computation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricsConfig {
    /// Annual risk-free rate used for excess-return statistics.
    pub risk_free_rate: Decimal,
    /// Benchmark daily returns aligned to the series, for beta. `None`
    /// disables beta (reported as zero).
    #[serde(default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub benchmark_returns: Option<Vec<Decimal>>,
    /// Daily-return observations required before a risk statistic is
    /// computed instead of reported as zero.
    pub min_observations: usize,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            risk_free_rate: DEFAULT_RISK_FREE_RATE,
            benchmark_returns: None,
            min_observations: MIN_RISK_OBSERVATIONS,
        }
    }
}

/// Month-over-month change of the series' month-end values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyReturn {
    /// Calendar month, `YYYY-MM`.
    pub month: String,
    /// Change as a fraction of the previous month-end value.
    #[serde(rename = "return")]
    pub value: Decimal,
}

/// Window totals derived from the transaction log, consumed alongside the
/// replayed series.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CashFlowTotals {
    /// Base-currency deposits minus withdrawals inside the window.
    pub net_invested: Decimal,
    /// Every fee paid inside the window, regardless of kind.
    pub fees: Decimal,
    /// Buy and Sell transactions inside the window.
    pub trade_count: usize,
}

/// Complete statistics over one replayed series.
///
/// Ratios carry calculation precision; percentage fields are display-rounded
/// and run 0-100. Serializable as-is for presentation and export callers; the
/// raw series rides along.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceMetrics {
    /// `last value - net invested` (the last value itself when nothing was
    /// net-invested).
    pub total_return: Decimal,
    /// Total return as a percentage of net invested capital.
    pub total_return_pct: Decimal,
    /// Compound annual growth rate over the window, as a fraction.
    pub cagr: Decimal,
    pub sharpe_ratio: Decimal,
    /// Capped at 10 for display; 10 means no downside was observed.
    pub sortino_ratio: Decimal,
    /// Largest peak-to-trough decline, as a positive fraction.
    pub max_drawdown: Decimal,
    pub beta: Decimal,
    /// Fraction of daily returns above zero.
    pub win_rate: Decimal,
    pub winning_months_pct: Decimal,
    pub losing_months_pct: Decimal,
    pub monthly_returns: Vec<MonthlyReturn>,
    /// Window value change minus fees paid inside the window.
    pub net_profit: Decimal,
    pub trade_count: usize,
    pub current_value: Decimal,
    pub net_invested: Decimal,
    pub series: ValueSeries,
}

impl PerformanceMetrics {
    /// Fully-zeroed result for series too thin to measure.
    pub fn empty() -> Self {
        Self::default()
    }
}
