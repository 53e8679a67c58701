//! Statistics over a replayed value series.
//!
//! All arithmetic stays in `Decimal`; annualization follows 24/7 crypto
//! markets (365 periods per year). Thin data never raises: a series under two
//! points returns the zeroed result, and each risk statistic degrades to zero
//! (Sortino to its cap) when its own inputs are insufficient.

use chrono::Datelike;
use rust_decimal::{Decimal, MathematicalOps};
use rust_decimal_macros::dec;
use std::collections::BTreeMap;

use super::performance_model::{CashFlowTotals, MetricsConfig, MonthlyReturn, PerformanceMetrics};
use crate::constants::{
    DAYS_PER_YEAR, DECIMAL_PRECISION, DISPLAY_DECIMAL_PRECISION, PERIODS_PER_YEAR,
    SORTINO_DISPLAY_CAP,
};
use crate::portfolio::valuation::{ReplayWindow, ValueSeries};
use crate::transactions::{RawTransaction, TransactionKind};

/// sqrt(365), fallback when Decimal sqrt fails
const SQRT_PERIODS_APPROX: Decimal = dec!(19.1049731745428);

impl CashFlowTotals {
    /// Sums the window's cash flows from the transaction log: base-currency
    /// deposits minus withdrawals, every fee, and the Buy/Sell count.
    pub fn from_transactions(
        transactions: &[RawTransaction],
        base_currency: &str,
        window: ReplayWindow,
    ) -> Self {
        let mut totals = CashFlowTotals::default();
        for tx in transactions {
            if !window.contains(tx.effective_date()) {
                continue;
            }
            totals.fees += tx.fee_amount();
            if tx.kind.is_trade() {
                totals.trade_count += 1;
            }
            if tx.asset == base_currency {
                match tx.kind {
                    TransactionKind::Deposit => totals.net_invested += tx.amount,
                    TransactionKind::Withdrawal => totals.net_invested -= tx.amount,
                    _ => {}
                }
            }
        }
        totals
    }
}

/// Pure metrics computation over a replayed series plus window cash flows.
#[derive(Debug, Default)]
pub struct MetricsEngine {
    config: MetricsConfig,
}

impl MetricsEngine {
    pub fn new(config: MetricsConfig) -> Self {
        Self { config }
    }

    /// Computes the full metrics record.
    ///
    /// A series with fewer than two points yields
    /// [`PerformanceMetrics::empty`].
    pub fn calculate(&self, series: &ValueSeries, flows: &CashFlowTotals) -> PerformanceMetrics {
        if series.len() < 2 {
            return PerformanceMetrics::empty();
        }

        let first_value = series.first_value().unwrap_or(Decimal::ZERO);
        let last_value = series.last_value().unwrap_or(Decimal::ZERO);

        let (total_return, total_return_pct) = total_return(last_value, flows.net_invested);
        let cagr = compound_annual_growth_rate(first_value, last_value, series.days_elapsed());

        let excess = self.excess_returns(&series.daily_returns);
        let enough = series.daily_returns.len() > self.config.min_observations;
        let sharpe_ratio = if enough {
            sharpe(&excess)
        } else {
            Decimal::ZERO
        };
        let sortino_ratio = if enough {
            sortino(&excess)
        } else {
            Decimal::ZERO
        };
        let beta = if enough {
            self.beta(&series.daily_returns)
        } else {
            Decimal::ZERO
        };

        let (winning_months_pct, losing_months_pct, monthly_returns) = monthly_statistics(series);

        PerformanceMetrics {
            total_return,
            total_return_pct,
            cagr: cagr.round_dp(DECIMAL_PRECISION),
            sharpe_ratio: sharpe_ratio.round_dp(DECIMAL_PRECISION),
            sortino_ratio: sortino_ratio.round_dp(DECIMAL_PRECISION),
            max_drawdown: max_drawdown(&series.values).round_dp(DECIMAL_PRECISION),
            beta: beta.round_dp(DECIMAL_PRECISION),
            win_rate: win_rate(&series.daily_returns).round_dp(DECIMAL_PRECISION),
            winning_months_pct,
            losing_months_pct,
            monthly_returns,
            net_profit: last_value - first_value - flows.fees,
            trade_count: flows.trade_count,
            current_value: last_value,
            net_invested: flows.net_invested,
            series: series.clone(),
        }
    }

    /// Daily returns minus the daily risk-free rate,
    /// `(1 + annual)^(1/365) - 1`.
    fn excess_returns(&self, daily_returns: &[Decimal]) -> Vec<Decimal> {
        let periods = Decimal::from(PERIODS_PER_YEAR);
        let daily_rf = (Decimal::ONE + self.config.risk_free_rate).powd(Decimal::ONE / periods)
            - Decimal::ONE;
        daily_returns.iter().map(|r| *r - daily_rf).collect()
    }

    /// Covariance of portfolio and benchmark returns over benchmark
    /// variance, both population-normalized, aligned to the shorter series.
    fn beta(&self, portfolio_returns: &[Decimal]) -> Decimal {
        let benchmark = match &self.config.benchmark_returns {
            Some(returns) if !returns.is_empty() => returns,
            _ => return Decimal::ZERO,
        };

        let len = portfolio_returns.len().min(benchmark.len());
        if len < 2 {
            return Decimal::ZERO;
        }
        let portfolio = &portfolio_returns[..len];
        let benchmark = &benchmark[..len];

        let count = Decimal::from(len);
        let portfolio_mean = mean(portfolio);
        let benchmark_mean = mean(benchmark);

        let covariance: Decimal = portfolio
            .iter()
            .zip(benchmark)
            .map(|(p, b)| (*p - portfolio_mean) * (*b - benchmark_mean))
            .sum::<Decimal>()
            / count;
        let variance: Decimal = benchmark
            .iter()
            .map(|b| {
                let diff = *b - benchmark_mean;
                diff * diff
            })
            .sum::<Decimal>()
            / count;

        if variance.is_zero() {
            return Decimal::ZERO;
        }
        covariance / variance
    }
}

fn total_return(last_value: Decimal, net_invested: Decimal) -> (Decimal, Decimal) {
    if net_invested > Decimal::ZERO {
        let total = last_value - net_invested;
        let pct = (total / net_invested * Decimal::ONE_HUNDRED)
            .round_dp(DISPLAY_DECIMAL_PRECISION);
        (total, pct)
    } else {
        // Nothing (or negative capital) net-invested: the absolute figure is
        // still meaningful, the percentage is not.
        (last_value, Decimal::ZERO)
    }
}

/// `(last/first)^(365.25/days) - 1`, zero when the window or the starting
/// value cannot support the exponent.
fn compound_annual_growth_rate(
    first_value: Decimal,
    last_value: Decimal,
    days_elapsed: i64,
) -> Decimal {
    if days_elapsed <= 0 || first_value <= Decimal::ZERO || last_value <= Decimal::ZERO {
        return Decimal::ZERO;
    }
    let growth = last_value / first_value;
    let exponent = DAYS_PER_YEAR / Decimal::from(days_elapsed);
    growth.powd(exponent) - Decimal::ONE
}

/// Annualized mean excess return over annualized population deviation.
fn sharpe(excess: &[Decimal]) -> Decimal {
    if excess.is_empty() {
        return Decimal::ZERO;
    }
    let periods = Decimal::from(PERIODS_PER_YEAR);
    let annualized_mean = mean(excess) * periods;
    let annualized_dev = population_stdev(excess) * sqrt_periods();
    if annualized_dev.is_zero() {
        return Decimal::ZERO;
    }
    annualized_mean / annualized_dev
}

/// Same numerator as Sharpe; the denominator only counts downside excess.
/// Capped for display, and the cap is the answer when no downside exists.
fn sortino(excess: &[Decimal]) -> Decimal {
    if excess.is_empty() {
        return Decimal::ZERO;
    }
    let periods = Decimal::from(PERIODS_PER_YEAR);
    let annualized_mean = mean(excess) * periods;

    let count = Decimal::from(excess.len());
    let downside_variance: Decimal = excess
        .iter()
        .map(|e| {
            let downside = (*e).min(Decimal::ZERO);
            downside * downside
        })
        .sum::<Decimal>()
        / count;
    let downside_dev = downside_variance.sqrt().unwrap_or(Decimal::ZERO) * sqrt_periods();

    if downside_dev.is_zero() {
        return SORTINO_DISPLAY_CAP;
    }
    (annualized_mean / downside_dev).min(SORTINO_DISPLAY_CAP)
}

/// Largest `(peak - value) / peak` over the strictly positive values.
fn max_drawdown(values: &[Decimal]) -> Decimal {
    let positive: Vec<Decimal> = values.iter().copied().filter(|v| *v > Decimal::ZERO).collect();
    if positive.len() < 2 {
        return Decimal::ZERO;
    }

    let mut peak = positive[0];
    let mut max_dd = Decimal::ZERO;
    for value in &positive[1..] {
        if *value > peak {
            peak = *value;
        } else {
            max_dd = max_dd.max((peak - *value) / peak);
        }
    }
    max_dd
}

/// Fraction of daily returns above zero.
fn win_rate(daily_returns: &[Decimal]) -> Decimal {
    if daily_returns.is_empty() {
        return Decimal::ZERO;
    }
    let winning = daily_returns.iter().filter(|r| **r > Decimal::ZERO).count();
    Decimal::from(winning) / Decimal::from(daily_returns.len())
}

/// Month-end values compared month over month. Returns winning/losing
/// percentages (0-100) and the per-month return table.
fn monthly_statistics(series: &ValueSeries) -> (Decimal, Decimal, Vec<MonthlyReturn>) {
    let mut month_end: BTreeMap<(i32, u32), Decimal> = BTreeMap::new();
    for (date, value) in series.dates.iter().zip(&series.values) {
        if *value > Decimal::ZERO {
            month_end.insert((date.year(), date.month()), *value);
        }
    }

    let ends: Vec<((i32, u32), Decimal)> = month_end.into_iter().collect();
    let mut monthly_returns = Vec::new();
    let mut winning = 0usize;
    let mut losing = 0usize;

    for pair in ends.windows(2) {
        let (_, prev_value) = pair[0];
        let ((year, month), curr_value) = pair[1];
        if prev_value <= Decimal::ZERO {
            continue;
        }
        let change = (curr_value - prev_value) / prev_value;
        monthly_returns.push(MonthlyReturn {
            month: format!("{year:04}-{month:02}"),
            value: change.round_dp(DECIMAL_PRECISION),
        });
        if change > Decimal::ZERO {
            winning += 1;
        } else {
            losing += 1;
        }
    }

    let total = winning + losing;
    if total == 0 {
        return (Decimal::ZERO, Decimal::ZERO, monthly_returns);
    }
    let winning_pct = (Decimal::from(winning) / Decimal::from(total) * Decimal::ONE_HUNDRED)
        .round_dp(DISPLAY_DECIMAL_PRECISION);
    let losing_pct = (Decimal::from(losing) / Decimal::from(total) * Decimal::ONE_HUNDRED)
        .round_dp(DISPLAY_DECIMAL_PRECISION);
    (winning_pct, losing_pct, monthly_returns)
}

fn mean(values: &[Decimal]) -> Decimal {
    if values.is_empty() {
        return Decimal::ZERO;
    }
    values.iter().sum::<Decimal>() / Decimal::from(values.len())
}

fn population_stdev(values: &[Decimal]) -> Decimal {
    if values.is_empty() {
        return Decimal::ZERO;
    }
    let avg = mean(values);
    let variance: Decimal = values
        .iter()
        .map(|v| {
            let diff = *v - avg;
            diff * diff
        })
        .sum::<Decimal>()
        / Decimal::from(values.len());
    variance.sqrt().unwrap_or(Decimal::ZERO)
}

fn sqrt_periods() -> Decimal {
    Decimal::from(PERIODS_PER_YEAR)
        .sqrt()
        .unwrap_or(SQRT_PERIODS_APPROX)
}
