//! Reporting passes over a processed ledger: tax lots, reconciliation,
//! transfer summary, JSON/CSV export.
//!
//! Every pass is read-only. Findings travel in the returned reports; nothing
//! here mutates the ledger or raises on data-quality problems.

use chrono::{Datelike, Utc};
use rust_decimal::Decimal;
use std::collections::{BTreeMap, HashSet};

use super::reporting_model::{
    AssetTransferSummary, ExportFormat, HoldingPeriod, PortfolioExport, PositionRow,
    ReconciliationIssue, ReconciliationReport, TaxLotEntry, TaxReport, TaxSummary,
    TransferSummary,
};
use crate::constants::is_stablecoin;
use crate::errors::Result;
use crate::portfolio::allocation::PortfolioAllocation;
use crate::portfolio::ledger::{LedgerWarning, Portfolio};
use crate::portfolio::positions::is_quantity_significant;
use crate::transactions::{ConversionMatches, RawTransaction, TransactionKind, TransferMatches};

/// Days a lot must be held past acquisition to classify as long-term.
const LONG_TERM_HOLDING_DAYS: i64 = 365;

/// Builds the per-lot disposal report for one calendar year.
///
/// Each consumed lot slice of every disposal in the year becomes one entry,
/// classified by its own holding period. Proceeds and quantity come from the
/// recorded processing outcome; the slice's proceeds share is its fraction of
/// the disposed quantity.
pub fn tax_report(portfolio: &Portfolio, year: i32) -> TaxReport {
    let mut entries = Vec::new();

    for outcome in portfolio.outcomes().values() {
        if outcome.disposed_at.year() != year {
            continue;
        }
        for lot in &outcome.consumed_lots {
            let proceeds = if outcome.quantity.is_zero() {
                Decimal::ZERO
            } else {
                (outcome.net_proceeds * lot.quantity) / outcome.quantity
            };
            let gain_loss = proceeds - lot.cost_basis;
            let held_days = (outcome.disposed_at - lot.acquired_at).num_days();
            let holding_period = if held_days > LONG_TERM_HOLDING_DAYS {
                HoldingPeriod::Long
            } else {
                HoldingPeriod::Short
            };

            entries.push(TaxLotEntry {
                disposed_at: outcome.disposed_at,
                acquired_at: lot.acquired_at,
                asset: outcome.asset.clone(),
                quantity: lot.quantity,
                proceeds,
                cost_basis: lot.cost_basis,
                gain_loss,
                holding_period,
                transaction_id: outcome.transaction_id.clone(),
            });
        }
    }

    entries.sort_by(|a, b| {
        a.disposed_at
            .cmp(&b.disposed_at)
            .then_with(|| a.asset.cmp(&b.asset))
    });

    let mut summary = TaxSummary::default();
    for entry in &entries {
        match (entry.holding_period, entry.gain_loss >= Decimal::ZERO) {
            (HoldingPeriod::Short, true) => summary.short_term_gains += entry.gain_loss,
            (HoldingPeriod::Short, false) => summary.short_term_losses += entry.gain_loss.abs(),
            (HoldingPeriod::Long, true) => summary.long_term_gains += entry.gain_loss,
            (HoldingPeriod::Long, false) => summary.long_term_losses += entry.gain_loss.abs(),
        }
    }
    summary.net_short_term = summary.short_term_gains - summary.short_term_losses;
    summary.net_long_term = summary.long_term_gains - summary.long_term_losses;
    summary.total_gain_loss = summary.net_short_term + summary.net_long_term;

    TaxReport {
        year,
        entries,
        summary,
    }
}

/// Runs every reconciliation check over the ledger and its chronological log.
///
/// Checks: running balances per asset, negative ledger cash, active
/// positions with quantity but no price, conversion legs the matcher left
/// unmatched, and duplicate suspects (same timestamp, kind, asset, amount).
pub fn reconcile(
    portfolio: &Portfolio,
    transactions: &[RawTransaction],
    conversions: &ConversionMatches,
) -> ReconciliationReport {
    let mut issues = Vec::new();

    let mut sorted: Vec<&RawTransaction> = transactions.iter().collect();
    sorted.sort_by_key(|tx| tx.timestamp);

    // running asset balances over the log; base-currency cash moves are
    // checked through the ledger's own warnings below
    let mut balances: BTreeMap<&str, Decimal> = BTreeMap::new();
    for tx in &sorted {
        if tx.kind.is_cash_kind() && tx.asset == portfolio.base_currency() {
            continue;
        }
        let balance = balances.entry(tx.asset.as_str()).or_default();
        if tx.kind.is_acquisition() {
            *balance += tx.amount;
        } else if tx.kind.is_disposal() {
            *balance -= tx.amount;
            if *balance < Decimal::ZERO && is_quantity_significant(balance) {
                issues.push(ReconciliationIssue::NegativeBalance {
                    asset: tx.asset.clone(),
                    timestamp: tx.timestamp,
                    balance: *balance,
                    transaction_id: tx.id.clone(),
                });
            }
        }
    }

    if portfolio.cash_balance() < Decimal::ZERO
        || portfolio
            .warnings()
            .iter()
            .any(|w| matches!(w, LedgerWarning::NegativeCash { .. }))
    {
        issues.push(ReconciliationIssue::NegativeCash {
            balance: portfolio.cash_balance(),
        });
    }

    for (asset, position) in portfolio.positions() {
        if position.has_significant_quantity()
            && position.current_price.is_none()
            && asset != portfolio.base_currency()
            && !is_stablecoin(asset)
        {
            issues.push(ReconciliationIssue::MissingPrice {
                asset: asset.clone(),
                quantity: position.quantity,
            });
        }
    }

    let unmatched: Vec<String> = sorted
        .iter()
        .filter(|tx| tx.kind.is_conversion() && !conversions.matched.contains_key(&tx.id))
        .map(|tx| tx.id.clone())
        .collect();
    if !unmatched.is_empty() {
        issues.push(ReconciliationIssue::UnmatchedConversions {
            count: unmatched.len(),
            transaction_ids: unmatched,
        });
    }

    let mut seen = HashSet::new();
    for tx in &sorted {
        let signature = (tx.timestamp, tx.kind, tx.asset.clone(), tx.amount);
        if !seen.insert(signature) {
            issues.push(ReconciliationIssue::DuplicateSuspect {
                timestamp: tx.timestamp,
                kind: tx.kind,
                asset: tx.asset.clone(),
                amount: tx.amount,
                transaction_id: tx.id.clone(),
            });
        }
    }

    ReconciliationReport {
        is_valid: issues.is_empty(),
        issues,
        checked_at: Utc::now(),
    }
}

/// Sums transfer flows per asset and estimates what sits in self-custody.
///
/// The cold-storage estimate is `sent - received` when positive, valued at
/// the position's last known price where one exists. Assets whose net flow
/// is below the dust threshold are skipped.
pub fn transfer_summary(
    portfolio: &Portfolio,
    transactions: &[RawTransaction],
    transfers: &TransferMatches,
) -> TransferSummary {
    let mut sent: BTreeMap<&str, Decimal> = BTreeMap::new();
    let mut received: BTreeMap<&str, Decimal> = BTreeMap::new();

    for tx in transactions {
        match tx.kind {
            TransactionKind::Send => {
                *sent.entry(tx.asset.as_str()).or_default() += tx.amount;
            }
            TransactionKind::Receive => {
                *received.entry(tx.asset.as_str()).or_default() += tx.amount;
            }
            _ => {}
        }
    }

    let all_assets: HashSet<&str> = sent.keys().chain(received.keys()).copied().collect();
    let mut assets = Vec::new();
    let mut in_cold_storage = 0usize;
    let mut estimated_value = Decimal::ZERO;

    for asset in all_assets {
        let out_amount = sent.get(asset).copied().unwrap_or(Decimal::ZERO);
        let in_amount = received.get(asset).copied().unwrap_or(Decimal::ZERO);
        let net = in_amount - out_amount;
        if !is_quantity_significant(&net) {
            continue;
        }

        let cold_estimate = (out_amount - in_amount).max(Decimal::ZERO);
        let cold_value = if cold_estimate > Decimal::ZERO {
            portfolio
                .position(asset)
                .and_then(|p| p.current_price)
                .map(|price| cold_estimate * price)
        } else {
            None
        };

        if cold_estimate > Decimal::ZERO {
            in_cold_storage += 1;
            estimated_value += cold_value.unwrap_or(Decimal::ZERO);
        }

        assets.push(AssetTransferSummary {
            asset: asset.to_string(),
            sent: out_amount,
            received: in_amount,
            net,
            cold_storage_estimate: cold_estimate,
            cold_storage_value: cold_value,
        });
    }

    assets.sort_by(|a, b| a.asset.cmp(&b.asset));

    TransferSummary {
        assets,
        assets_in_cold_storage: in_cold_storage,
        estimated_cold_storage_value: estimated_value,
        unmatched_sends: transfers.unmatched_sends.len(),
    }
}

/// Serializes the portfolio in the requested format: the full export payload
/// as pretty JSON, or the position rows as CSV.
pub fn export_portfolio(portfolio: &Portfolio, format: ExportFormat) -> Result<String> {
    match format {
        ExportFormat::Json => export_portfolio_json(portfolio),
        ExportFormat::Csv => export_positions_csv(portfolio),
    }
}

fn position_rows(portfolio: &Portfolio) -> Vec<PositionRow> {
    let mut rows: Vec<PositionRow> = portfolio
        .positions()
        .values()
        .filter(|p| p.has_significant_quantity())
        .map(|p| PositionRow {
            asset: p.asset.clone(),
            quantity: p.quantity,
            average_cost: p.average_cost(),
            cost_basis: p.total_lot_cost(),
            current_price: p.current_price,
            current_value: p.current_value(),
            unrealized_gain_loss: p.unrealized_gain_loss(),
            realized_gain_loss: p.realized_net(),
            total_fees_paid: p.total_fees_paid,
        })
        .collect();
    rows.sort_by(|a, b| a.asset.cmp(&b.asset));
    rows
}

fn export_portfolio_json(portfolio: &Portfolio) -> Result<String> {
    let export = PortfolioExport {
        exported_at: Utc::now(),
        base_currency: portfolio.base_currency().to_string(),
        disposal_method: portfolio.disposal_method().to_string(),
        total_value: portfolio.cash_balance()
            + position_rows(portfolio)
                .iter()
                .filter_map(|row| row.current_value)
                .sum::<Decimal>(),
        net_invested: portfolio.total_deposits() - portfolio.total_withdrawals(),
        realized_pnl: portfolio.realized_pnl(),
        total_fees: portfolio.total_fees(),
        positions: position_rows(portfolio),
        allocation: PortfolioAllocation::from_portfolio(portfolio),
    };
    Ok(serde_json::to_string_pretty(&export)?)
}

fn export_positions_csv(portfolio: &Portfolio) -> Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    for row in position_rows(portfolio) {
        writer.serialize(row)?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|e| crate::errors::Error::Export(e.to_string()))?;
    String::from_utf8(bytes).map_err(|e| crate::errors::Error::Export(e.to_string()))
}
