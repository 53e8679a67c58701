//! Allocation models for portfolio breakdown by asset.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::constants::{is_stablecoin, DISPLAY_DECIMAL_PRECISION};
use crate::portfolio::ledger::Portfolio;

/// Row label for the base-currency cash line.
const CASH_LINE: &str = "CASH";

/// Allocation line for a single asset, or the cash row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AllocationEntry {
    /// Asset symbol, or `CASH` for the base-currency cash row.
    pub asset: String,
    /// Held quantity. Equals the cash balance on the cash row.
    pub quantity: Decimal,
    /// Market value in base currency.
    pub value: Decimal,
    /// Share of total portfolio value (0-100), display-rounded.
    pub percentage: Decimal,
}

/// Complete per-asset allocation breakdown, sorted by value descending.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioAllocation {
    pub entries: Vec<AllocationEntry>,
    /// Total portfolio value in base currency.
    pub total_value: Decimal,
}

impl PortfolioAllocation {
    /// Breaks the portfolio's current value down per asset plus a cash row.
    ///
    /// Positions are valued at their last externally supplied price;
    /// stablecoins and the base currency at face amount. A position with no
    /// known price shows up with zero value rather than disappearing. Empty
    /// when the total value is zero.
    pub fn from_portfolio(portfolio: &Portfolio) -> Self {
        let mut lines: Vec<(String, Decimal, Decimal)> = Vec::new();
        let mut total_value = Decimal::ZERO;

        for (asset, position) in portfolio.positions() {
            if !position.has_significant_quantity() {
                continue;
            }
            let value = if asset == portfolio.base_currency() || is_stablecoin(asset) {
                position.quantity
            } else {
                position.current_value().unwrap_or(Decimal::ZERO)
            };
            total_value += value;
            lines.push((asset.clone(), position.quantity, value));
        }

        if !portfolio.cash_balance().is_zero() {
            total_value += portfolio.cash_balance();
            lines.push((
                CASH_LINE.to_string(),
                portfolio.cash_balance(),
                portfolio.cash_balance(),
            ));
        }

        if total_value.is_zero() {
            return PortfolioAllocation::default();
        }

        let mut entries: Vec<AllocationEntry> = lines
            .into_iter()
            .map(|(asset, quantity, value)| AllocationEntry {
                asset,
                quantity,
                value,
                percentage: (value / total_value * Decimal::ONE_HUNDRED)
                    .round_dp(DISPLAY_DECIMAL_PRECISION),
            })
            .collect();
        entries.sort_by(|a, b| b.value.cmp(&a.value).then_with(|| a.asset.cmp(&b.asset)));

        PortfolioAllocation {
            entries,
            total_value,
        }
    }
}
