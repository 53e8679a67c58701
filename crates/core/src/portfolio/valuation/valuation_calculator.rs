//! Day-by-day valuation replay over a transaction log.
//!
//! The replay is a pure function of (transaction log, price book, window).
//! It starts the window with zero balances, applies each day's transactions
//! to an in-memory balance map, and values the result against the pre-fetched
//! price book. The real portfolio ledger is never touched and no outcomes are
//! written, so a replay can run on a worker thread against a read-only copy
//! of the log while the ledger keeps mutating.

use rust_decimal::Decimal;
use std::collections::HashMap;

use super::valuation_model::{ReplayOutput, ReplayWindow, ValuationIssue, ValueSeries};
use crate::constants::is_stablecoin;
use crate::market_data::PriceBook;
use crate::transactions::{RawTransaction, TransactionKind};

/// Reconstructs the daily total-value series for `window`.
///
/// Balances start at zero on `window.start`; the window is a fresh baseline,
/// not a view of the portfolio's historical state. The base currency and
/// stablecoins are valued at face amount; other assets at the book's price
/// for the day, which already falls back to the last known price before it.
/// An asset holding a positive balance with no usable price is excluded from
/// that day's total and recorded as a [`ValuationIssue::PriceUnavailable`]
/// gap, one entry per affected day.
pub fn replay(
    transactions: &[RawTransaction],
    window: ReplayWindow,
    base_currency: &str,
    prices: &PriceBook,
) -> ReplayOutput {
    let mut in_window: Vec<&RawTransaction> = transactions
        .iter()
        .filter(|tx| window.contains(tx.effective_date()))
        .collect();
    in_window.sort_by_key(|tx| tx.timestamp);

    let mut balances: HashMap<String, Decimal> = HashMap::new();
    let mut dates = Vec::new();
    let mut values = Vec::new();
    let mut issues = Vec::new();

    let mut tx_index = 0;
    for day in window.days() {
        while tx_index < in_window.len() && in_window[tx_index].effective_date() == day {
            apply_to_balances(&mut balances, in_window[tx_index], base_currency);
            tx_index += 1;
        }

        let mut total_value = Decimal::ZERO;
        for (asset, balance) in &balances {
            if *balance <= Decimal::ZERO {
                continue;
            }
            if asset == base_currency || is_stablecoin(asset) {
                total_value += *balance;
            } else if let Some(price) = prices.price_on(asset, day) {
                total_value += *balance * price;
            } else {
                issues.push(ValuationIssue::PriceUnavailable {
                    asset: asset.clone(),
                    date: day,
                });
            }
        }

        dates.push(day);
        values.push(total_value);
    }

    let daily_returns = compute_daily_returns(&values);

    ReplayOutput {
        series: ValueSeries {
            dates,
            values,
            daily_returns,
        },
        issues,
    }
}

/// Applies one transaction to the running balance map using the same
/// classification the ledger routes by, minus lot accounting.
fn apply_to_balances(
    balances: &mut HashMap<String, Decimal>,
    tx: &RawTransaction,
    base_currency: &str,
) {
    let cash = base_currency.to_string();
    match tx.kind {
        TransactionKind::Buy => {
            *balances.entry(tx.asset.clone()).or_default() += tx.amount;
            *balances.entry(cash).or_default() -= tx.gross();
        }
        TransactionKind::Sell => {
            *balances.entry(tx.asset.clone()).or_default() -= tx.amount;
            *balances.entry(cash).or_default() += tx.gross();
        }
        TransactionKind::Deposit => {
            // Base-currency deposits move cash; anything else arrives as the
            // asset itself.
            *balances.entry(tx.asset.clone()).or_default() += tx.amount;
        }
        TransactionKind::Withdrawal => {
            *balances.entry(tx.asset.clone()).or_default() -= tx.amount;
        }
        TransactionKind::Send | TransactionKind::ConvertFrom => {
            *balances.entry(tx.asset.clone()).or_default() -= tx.amount;
        }
        TransactionKind::Receive
        | TransactionKind::ConvertTo
        | TransactionKind::Reward
        | TransactionKind::Interest
        | TransactionKind::Airdrop => {
            *balances.entry(tx.asset.clone()).or_default() += tx.amount;
        }
        // Custody movements between wallets, no quantity effect.
        TransactionKind::Staking | TransactionKind::Unstaking => {}
    }
}

fn compute_daily_returns(values: &[Decimal]) -> Vec<Decimal> {
    values
        .windows(2)
        .map(|pair| {
            if pair[0] > Decimal::ZERO {
                (pair[1] - pair[0]) / pair[0]
            } else {
                Decimal::ZERO
            }
        })
        .collect()
}
