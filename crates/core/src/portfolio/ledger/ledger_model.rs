use chrono::{DateTime, Utc};
use log::warn;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use uuid::Uuid;

use crate::constants::{is_stablecoin, BASE_CURRENCY};
use crate::errors::Result;
use crate::market_data::PriceProvider;
use crate::portfolio::positions::{DisposalMethod, DisposalResult, Position};
use crate::transactions::{ProcessingOutcome, RawTransaction, TransactionKind};

/// Anomaly detected while the ledger processed a transaction. Appended to the
/// portfolio's warning list, never silently swallowed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum LedgerWarning {
    /// A base-currency withdrawal drove the cash account below zero. The
    /// withdrawal still applies; the divergence is reported, not corrected.
    #[serde(rename_all = "camelCase")]
    NegativeCash {
        transaction_id: String,
        balance: Decimal,
    },
}

/// Immutable point-in-time view of the ledger, produced on demand.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    pub total_value: Decimal,
    pub cash_balance: Decimal,
    /// Market value per active asset. Assets with no known price are absent
    /// and contribute nothing to `total_value`.
    pub per_asset_value: HashMap<String, Decimal>,
    /// Realized result across active and closed positions.
    pub realized_pnl: Decimal,
    /// Paper result across active positions only.
    pub unrealized_pnl: Decimal,
}

/// Aggregate root of the accounting ledger: one instance per tracked account.
///
/// Owns the asset positions, the cash account and its transaction log, the
/// per-transaction processing outcomes, and every warning raised along the
/// way. Cash moves only on base-currency deposits and withdrawals; trade cash
/// flows are reconstructed by the valuation replayer, not booked here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Portfolio {
    base_currency: String,
    disposal_method: DisposalMethod,
    #[serde(default)]
    positions: HashMap<String, Position>,
    #[serde(default)]
    closed_positions: Vec<Position>,
    cash_balance: Decimal,
    #[serde(default)]
    cash_transactions: Vec<RawTransaction>,
    total_deposits: Decimal,
    total_withdrawals: Decimal,
    total_fees: Decimal,
    #[serde(default)]
    snapshots: Vec<Snapshot>,
    #[serde(default)]
    outcomes: HashMap<String, ProcessingOutcome>,
    #[serde(default)]
    warnings: Vec<LedgerWarning>,
}

impl Default for Portfolio {
    fn default() -> Self {
        Portfolio::new(BASE_CURRENCY, DisposalMethod::default())
    }
}

impl Portfolio {
    pub fn new(base_currency: impl Into<String>, disposal_method: DisposalMethod) -> Self {
        Portfolio {
            base_currency: base_currency.into(),
            disposal_method,
            positions: HashMap::new(),
            closed_positions: Vec::new(),
            cash_balance: Decimal::ZERO,
            cash_transactions: Vec::new(),
            total_deposits: Decimal::ZERO,
            total_withdrawals: Decimal::ZERO,
            total_fees: Decimal::ZERO,
            snapshots: Vec::new(),
            outcomes: HashMap::new(),
            warnings: Vec::new(),
        }
    }

    /// Routes one validated transaction through the ledger.
    ///
    /// Base-currency deposits and withdrawals move cash; everything else goes
    /// to the asset's position, created lazily on first reference. A rejected
    /// transaction (insufficient balance) leaves the ledger exactly as it
    /// was.
    pub fn process(&mut self, transaction: &RawTransaction) -> Result<Option<DisposalResult>> {
        let disposal = if transaction.kind.is_cash_kind()
            && transaction.asset == self.base_currency
        {
            self.process_cash(transaction);
            None
        } else {
            let created = !self.positions.contains_key(&transaction.asset);
            let position = self
                .positions
                .entry(transaction.asset.clone())
                .or_insert_with(|| Position::new(transaction.asset.clone()));

            let applied = match position.apply(transaction, self.disposal_method) {
                Ok(applied) => applied,
                Err(err) => {
                    if created {
                        self.positions.remove(&transaction.asset);
                    }
                    return Err(err);
                }
            };

            // A disposal that empties the book freezes the position. A later
            // acquisition of the same asset starts a fresh one. The base
            // currency stays active; it doubles as the cash asset.
            if applied.is_some()
                && !position.has_significant_quantity()
                && transaction.asset != self.base_currency
            {
                if let Some(closed) = self.positions.remove(&transaction.asset) {
                    self.closed_positions.push(closed);
                }
            }
            applied
        };

        self.total_fees += transaction.fee_amount();

        if let Some(result) = &disposal {
            self.record_outcome(transaction, result);
        }

        Ok(disposal)
    }

    fn process_cash(&mut self, transaction: &RawTransaction) {
        if transaction.kind == TransactionKind::Deposit {
            self.cash_balance += transaction.amount;
            self.total_deposits += transaction.amount;
        } else {
            self.cash_balance -= transaction.amount;
            self.total_withdrawals += transaction.amount;
            if self.cash_balance < Decimal::ZERO {
                warn!(
                    "cash balance went negative ({}) on withdrawal {}",
                    self.cash_balance, transaction.id
                );
                self.warnings.push(LedgerWarning::NegativeCash {
                    transaction_id: transaction.id.clone(),
                    balance: self.cash_balance,
                });
            }
        }
        self.cash_transactions.push(transaction.clone());
    }

    // outcomes are written exactly once per transaction; a second write means
    // the same transaction was processed twice
    fn record_outcome(&mut self, transaction: &RawTransaction, result: &DisposalResult) {
        let outcome = ProcessingOutcome {
            transaction_id: transaction.id.clone(),
            asset: result.asset.clone(),
            disposed_at: transaction.timestamp,
            quantity: result.quantity,
            net_proceeds: result.net_proceeds,
            consumed_cost_basis: result.consumed_cost_basis,
            realized_gain_loss: result.realized_gain_loss,
            consumed_lots: result.consumed_lots.clone(),
        };
        let previous = self.outcomes.insert(transaction.id.clone(), outcome);
        assert!(
            previous.is_none(),
            "outcome already recorded for transaction {}",
            transaction.id
        );
    }

    /// Values the ledger at `at` and appends the result to the snapshot list.
    ///
    /// The base currency and stablecoins are valued at face amount. Other
    /// active positions are valued at the provider's price for that day,
    /// falling back to the position's last externally supplied price. A
    /// position with no price from either source is left out of the total.
    pub fn snapshot(&mut self, at: DateTime<Utc>, prices: &dyn PriceProvider) -> Snapshot {
        let date = at.naive_utc().date();
        let mut total_value = self.cash_balance;
        let mut per_asset_value = HashMap::new();
        let mut unrealized_pnl = Decimal::ZERO;

        for (asset, position) in &self.positions {
            if !position.has_significant_quantity() {
                continue;
            }
            let price = if asset == &self.base_currency || is_stablecoin(asset) {
                Some(Decimal::ONE)
            } else {
                prices.get_price(asset, date).or(position.current_price)
            };
            if let Some(price) = price {
                let value = position.quantity * price;
                total_value += value;
                unrealized_pnl += value - position.total_lot_cost();
                per_asset_value.insert(asset.clone(), value);
            }
        }

        let realized_pnl = self
            .positions
            .values()
            .chain(self.closed_positions.iter())
            .map(Position::realized_net)
            .sum();

        let snapshot = Snapshot {
            id: Uuid::new_v4().to_string(),
            timestamp: at,
            total_value,
            cash_balance: self.cash_balance,
            per_asset_value,
            realized_pnl,
            unrealized_pnl,
        };
        self.snapshots.push(snapshot.clone());
        snapshot
    }

    /// Refreshes `current_price` on matching active positions.
    pub fn update_prices(&mut self, prices: &HashMap<String, Decimal>) {
        for (asset, price) in prices {
            if let Some(position) = self.positions.get_mut(asset) {
                position.current_price = Some(*price);
            }
        }
    }

    pub fn base_currency(&self) -> &str {
        &self.base_currency
    }

    pub fn disposal_method(&self) -> DisposalMethod {
        self.disposal_method
    }

    pub fn positions(&self) -> &HashMap<String, Position> {
        &self.positions
    }

    pub fn position(&self, asset: &str) -> Option<&Position> {
        self.positions.get(asset)
    }

    pub fn closed_positions(&self) -> &[Position] {
        &self.closed_positions
    }

    pub fn cash_balance(&self) -> Decimal {
        self.cash_balance
    }

    /// Base-currency deposits and withdrawals, in processing order.
    pub fn cash_transactions(&self) -> &[RawTransaction] {
        &self.cash_transactions
    }

    pub fn total_deposits(&self) -> Decimal {
        self.total_deposits
    }

    pub fn total_withdrawals(&self) -> Decimal {
        self.total_withdrawals
    }

    pub fn total_fees(&self) -> Decimal {
        self.total_fees
    }

    pub fn snapshots(&self) -> &[Snapshot] {
        &self.snapshots
    }

    pub fn outcome(&self, transaction_id: &str) -> Option<&ProcessingOutcome> {
        self.outcomes.get(transaction_id)
    }

    pub fn outcomes(&self) -> &HashMap<String, ProcessingOutcome> {
        &self.outcomes
    }

    pub fn warnings(&self) -> &[LedgerWarning] {
        &self.warnings
    }

    /// Net realized result across active and closed positions.
    pub fn realized_pnl(&self) -> Decimal {
        self.positions
            .values()
            .chain(self.closed_positions.iter())
            .map(Position::realized_net)
            .sum()
    }
}
