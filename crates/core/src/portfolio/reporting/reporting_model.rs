//! Reporting domain models: tax lots, reconciliation findings, transfer
//! summaries, export formats.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::transactions::TransactionKind;

/// Tax classification of one consumed lot slice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HoldingPeriod {
    /// Held 365 days or fewer at disposal.
    Short,
    /// Held longer than 365 days at disposal.
    Long,
}

/// One consumed lot slice of a disposal in the report year.
///
/// Proceeds are apportioned to the slice by its share of the disposed
/// quantity; the cost basis is the slice's own.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaxLotEntry {
    pub disposed_at: DateTime<Utc>,
    pub acquired_at: DateTime<Utc>,
    pub asset: String,
    pub quantity: Decimal,
    pub proceeds: Decimal,
    pub cost_basis: Decimal,
    pub gain_loss: Decimal,
    pub holding_period: HoldingPeriod,
    pub transaction_id: String,
}

/// Gain/loss totals split by holding period. Losses are stored as positive
/// magnitudes; the net figures carry sign.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaxSummary {
    pub short_term_gains: Decimal,
    pub short_term_losses: Decimal,
    pub long_term_gains: Decimal,
    pub long_term_losses: Decimal,
    pub net_short_term: Decimal,
    pub net_long_term: Decimal,
    pub total_gain_loss: Decimal,
}

/// Per-lot disposal report for one calendar year.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaxReport {
    pub year: i32,
    pub entries: Vec<TaxLotEntry>,
    pub summary: TaxSummary,
}

/// One finding from a reconciliation pass. Findings are reported, never
/// auto-corrected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ReconciliationIssue {
    /// The running balance for an asset went below zero mid-log.
    #[serde(rename_all = "camelCase")]
    NegativeBalance {
        asset: String,
        timestamp: DateTime<Utc>,
        balance: Decimal,
        transaction_id: String,
    },
    /// The ledger cash account is below zero.
    #[serde(rename_all = "camelCase")]
    NegativeCash { balance: Decimal },
    /// An active position holds quantity with no known price.
    #[serde(rename_all = "camelCase")]
    MissingPrice { asset: String, quantity: Decimal },
    /// Conversion legs the matcher could not pair.
    #[serde(rename_all = "camelCase")]
    UnmatchedConversions {
        count: usize,
        transaction_ids: Vec<String>,
    },
    /// Two transactions share timestamp, kind, asset and amount.
    #[serde(rename_all = "camelCase")]
    DuplicateSuspect {
        timestamp: DateTime<Utc>,
        kind: TransactionKind,
        asset: String,
        amount: Decimal,
        transaction_id: String,
    },
}

/// Result of a reconciliation pass over the ledger and its log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReconciliationReport {
    pub issues: Vec<ReconciliationIssue>,
    pub is_valid: bool,
    pub checked_at: DateTime<Utc>,
}

/// Per-asset transfer flow totals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetTransferSummary {
    pub asset: String,
    pub sent: Decimal,
    pub received: Decimal,
    /// `received - sent`; negative means more left than came back.
    pub net: Decimal,
    /// `sent - received` when positive, the self-custody estimate.
    pub cold_storage_estimate: Decimal,
    /// Estimate valued at the position's last known price, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    #[serde(default)]
    pub cold_storage_value: Option<Decimal>,
}

/// Transfer and cold-storage summary across the whole log.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferSummary {
    pub assets: Vec<AssetTransferSummary>,
    pub assets_in_cold_storage: usize,
    pub estimated_cold_storage_value: Decimal,
    /// Sends the matcher found no Receive for inside its window.
    pub unmatched_sends: usize,
}

/// Export encodings the reporting layer can produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Json,
    Csv,
}

/// Top-level JSON export payload: metadata, summary figures, position rows
/// and the allocation breakdown.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioExport {
    pub exported_at: DateTime<Utc>,
    pub base_currency: String,
    pub disposal_method: String,
    pub total_value: Decimal,
    pub net_invested: Decimal,
    pub realized_pnl: Decimal,
    pub total_fees: Decimal,
    pub positions: Vec<PositionRow>,
    pub allocation: crate::portfolio::allocation::PortfolioAllocation,
}

/// Flat per-position row shared by the JSON and CSV exports.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PositionRow {
    pub asset: String,
    pub quantity: Decimal,
    pub average_cost: Decimal,
    pub cost_basis: Decimal,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[serde(default)]
    pub current_price: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[serde(default)]
    pub current_value: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[serde(default)]
    pub unrealized_gain_loss: Option<Decimal>,
    pub realized_gain_loss: Decimal,
    pub total_fees_paid: Decimal,
}
