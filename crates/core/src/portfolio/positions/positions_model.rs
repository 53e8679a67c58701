use chrono::{DateTime, Utc};
use log::warn;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::constants::QUANTITY_THRESHOLD;
use crate::errors::{CalculatorError, Result, ValidationError};
use crate::transactions::{RawTransaction, TransactionKind};

/// Whether a quantity is above the dust threshold.
pub fn is_quantity_significant(quantity: &Decimal) -> bool {
    quantity.abs() >= QUANTITY_THRESHOLD
}

/// Lot selection order applied at disposal time. Fixed per portfolio at
/// construction so every disposal in one ledger uses the same rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum DisposalMethod {
    /// Oldest lots first (ascending `acquired_at`).
    #[default]
    Fifo,
    /// Newest lots first (descending `acquired_at`).
    Lifo,
    /// Most expensive lots first (descending `unit_cost`).
    Hifo,
}

impl DisposalMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            DisposalMethod::Fifo => "FIFO",
            DisposalMethod::Lifo => "LIFO",
            DisposalMethod::Hifo => "HIFO",
        }
    }
}

impl fmt::Display for DisposalMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DisposalMethod {
    type Err = ValidationError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "FIFO" => Ok(DisposalMethod::Fifo),
            "LIFO" => Ok(DisposalMethod::Lifo),
            "HIFO" => Ok(DisposalMethod::Hifo),
            other => Err(ValidationError::UnknownDisposalMethod(other.to_string())),
        }
    }
}

/// Quantity of an asset acquired at one cost and time.
///
/// Immutable except for partial consumption, which keeps `unit_cost` and
/// `acquired_at` and reduces `amount`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Lot {
    pub id: String,
    pub amount: Decimal,
    /// Cost per unit including the pro-rated acquisition fee.
    pub unit_cost: Decimal,
    pub acquired_at: DateTime<Utc>,
    /// Originating transaction id.
    pub source_id: String,
}

impl Lot {
    pub fn total_cost(&self) -> Decimal {
        self.amount * self.unit_cost
    }
}

/// Slice of a lot consumed by one disposal. Kept on the outcome record so
/// tax reporting can reclassify each slice by its own holding period.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ConsumedLot {
    pub lot_id: String,
    pub quantity: Decimal,
    pub cost_basis: Decimal,
    pub acquired_at: DateTime<Utc>,
}

/// Accounting result of a single disposal.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DisposalResult {
    pub asset: String,
    pub quantity: Decimal,
    /// Gross value minus fee.
    pub net_proceeds: Decimal,
    pub consumed_cost_basis: Decimal,
    /// `net_proceeds - consumed_cost_basis`; negative is a loss.
    pub realized_gain_loss: Decimal,
    pub consumed_lots: Vec<ConsumedLot>,
}

/// Processed-transaction record kept on the position for audit. Full
/// transaction records stay in the ledger log.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    pub transaction_id: String,
    pub kind: TransactionKind,
    pub amount: Decimal,
}

/// Lot-based holding of a single asset.
///
/// Created lazily on the first transaction referencing the asset; moved to
/// the portfolio's closed list when quantity reaches zero. `quantity` always
/// equals the sum of lot amounts, checked after every mutation.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Position {
    pub asset: String,
    pub quantity: Decimal,
    /// Last externally supplied market price, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    #[serde(default)]
    pub current_price: Option<Decimal>,
    #[serde(default)]
    pub lots: VecDeque<Lot>,
    /// Sum of positive realized results. Non-decreasing.
    pub realized_gains: Decimal,
    /// Sum of negative realized results, stored as a positive magnitude.
    /// Non-decreasing.
    pub realized_losses: Decimal,
    pub total_fees_paid: Decimal,
    #[serde(default)]
    pub history: Vec<HistoryEntry>,
}

impl Position {
    pub fn new(asset: impl Into<String>) -> Self {
        Position {
            asset: asset.into(),
            quantity: Decimal::ZERO,
            current_price: None,
            lots: VecDeque::new(),
            realized_gains: Decimal::ZERO,
            realized_losses: Decimal::ZERO,
            total_fees_paid: Decimal::ZERO,
            history: Vec::new(),
        }
    }

    /// Applies one transaction to this position.
    ///
    /// Acquisitions append a lot, disposals consume lots in the order the
    /// method dictates, neutral custody kinds only accrue their fee. A
    /// disposal larger than the tracked quantity fails with
    /// `InsufficientBalance` and leaves the position untouched.
    pub fn apply(
        &mut self,
        transaction: &RawTransaction,
        method: DisposalMethod,
    ) -> Result<Option<DisposalResult>> {
        let disposal = if transaction.kind.is_acquisition() {
            self.acquire(transaction);
            None
        } else if transaction.kind.is_disposal() {
            Some(self.dispose(transaction, method)?)
        } else {
            None
        };

        self.total_fees_paid += transaction.fee_amount();
        self.history.push(HistoryEntry {
            transaction_id: transaction.id.clone(),
            kind: transaction.kind,
            amount: transaction.amount,
        });
        self.validate_lot_parity();

        Ok(disposal)
    }

    fn acquire(&mut self, transaction: &RawTransaction) {
        // Fee is pro-rated across the acquired amount. A transaction with no
        // price information at all yields a zero-cost lot (reward-style
        // income that was never bought).
        let unit_cost = if transaction.amount.is_zero() {
            Decimal::ZERO
        } else {
            transaction.effective_cost() / transaction.amount
        };

        self.lots.push_back(Lot {
            id: Uuid::new_v4().to_string(),
            amount: transaction.amount,
            unit_cost,
            acquired_at: transaction.timestamp,
            source_id: transaction.id.clone(),
        });
        self.quantity += transaction.amount;

        // Keep the book in acquisition order even for out-of-order input.
        let mut lots: Vec<_> = self.lots.drain(..).collect();
        lots.sort_by_key(|lot| lot.acquired_at);
        self.lots = lots.into();
    }

    fn dispose(
        &mut self,
        transaction: &RawTransaction,
        method: DisposalMethod,
    ) -> Result<DisposalResult> {
        // Strict: even a dust overdraw would consume quantity no lot backs,
        // inflating the realized gain by the uncovered slice.
        let requested = transaction.amount;
        if requested > self.quantity {
            return Err(CalculatorError::InsufficientBalance {
                asset: self.asset.clone(),
                requested,
                available: self.quantity,
            }
            .into());
        }

        let mut ordered: Vec<Lot> = self.lots.drain(..).collect();
        match method {
            DisposalMethod::Fifo => ordered.sort_by_key(|lot| lot.acquired_at),
            DisposalMethod::Lifo => ordered.sort_by(|a, b| b.acquired_at.cmp(&a.acquired_at)),
            DisposalMethod::Hifo => ordered.sort_by(|a, b| b.unit_cost.cmp(&a.unit_cost)),
        }

        let mut remaining = requested;
        let mut consumed_cost_basis = Decimal::ZERO;
        let mut consumed_lots = Vec::new();
        let mut kept: Vec<Lot> = Vec::with_capacity(ordered.len());

        for mut lot in ordered {
            if remaining <= Decimal::ZERO {
                kept.push(lot);
                continue;
            }

            let take = lot.amount.min(remaining);
            let cost = take * lot.unit_cost;
            consumed_cost_basis += cost;
            remaining -= take;
            consumed_lots.push(ConsumedLot {
                lot_id: lot.id.clone(),
                quantity: take,
                cost_basis: cost,
                acquired_at: lot.acquired_at,
            });

            let left = lot.amount - take;
            if is_quantity_significant(&left) {
                lot.amount = left;
                kept.push(lot);
            } else if !left.is_zero() {
                warn!(
                    "dropping dust remainder {} on lot {} of {}",
                    left, lot.id, self.asset
                );
            }
        }

        kept.sort_by_key(|lot| lot.acquired_at);
        self.lots = kept.into();
        self.quantity = self.lots.iter().map(|lot| lot.amount).sum();

        let net_proceeds = transaction.gross() - transaction.fee_amount();
        let realized_gain_loss = net_proceeds - consumed_cost_basis;
        if realized_gain_loss >= Decimal::ZERO {
            self.realized_gains += realized_gain_loss;
        } else {
            self.realized_losses += realized_gain_loss.abs();
        }

        Ok(DisposalResult {
            asset: self.asset.clone(),
            quantity: requested,
            net_proceeds,
            consumed_cost_basis,
            realized_gain_loss,
            consumed_lots,
        })
    }

    /// Sum of the remaining lots' cost.
    pub fn total_lot_cost(&self) -> Decimal {
        self.lots.iter().map(|lot| lot.total_cost()).sum()
    }

    /// Average cost per unit over the remaining lots.
    pub fn average_cost(&self) -> Decimal {
        if is_quantity_significant(&self.quantity) {
            self.total_lot_cost() / self.quantity
        } else {
            Decimal::ZERO
        }
    }

    /// Market value at the last known price, if one was supplied.
    pub fn current_value(&self) -> Option<Decimal> {
        self.current_price.map(|price| self.quantity * price)
    }

    /// Paper gain or loss against the remaining cost basis, if a price is
    /// known.
    pub fn unrealized_gain_loss(&self) -> Option<Decimal> {
        self.current_value().map(|value| value - self.total_lot_cost())
    }

    /// Net realized result (gains minus losses).
    pub fn realized_net(&self) -> Decimal {
        self.realized_gains - self.realized_losses
    }

    /// Whether any quantity above the dust threshold remains.
    pub fn has_significant_quantity(&self) -> bool {
        is_quantity_significant(&self.quantity)
    }

    // quantity must mirror the lot book exactly; divergence is a programming
    // error, not recoverable state
    fn validate_lot_parity(&self) {
        let lot_sum: Decimal = self.lots.iter().map(|lot| lot.amount).sum();
        assert_eq!(
            self.quantity, lot_sum,
            "position {} quantity diverged from lot sum",
            self.asset
        );
    }
}
