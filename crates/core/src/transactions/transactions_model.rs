//! Transaction domain models.
//!
//! A transaction enters the core as a [`NewTransaction`], is validated and
//! normalized into an immutable [`RawTransaction`], and never changes after
//! that. Accounting results produced while the ledger processes it live in a
//! separately-owned [`ProcessingOutcome`] keyed by transaction id, so the
//! event log itself stays append-only and audit-friendly.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use std::str::FromStr;

use super::transactions_constants::*;
use crate::errors::{Result, ValidationError};
use crate::portfolio::positions::ConsumedLot;

/// Largest tolerated gap between a provided gross value and
/// `amount * unit_price` before the pair is flagged as inconsistent.
const PRICE_GROSS_TOLERANCE: Decimal = dec!(0.01);

/// Closed set of economic event kinds the ledger understands.
///
/// Each kind classifies as exactly one of acquisition, disposal, cash
/// movement, or neutral custody movement. Unrecognized input strings are a
/// [`ValidationError`], never inferred.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransactionKind {
    #[serde(rename = "Buy")]
    Buy,
    #[serde(rename = "Sell")]
    Sell,
    #[serde(rename = "Deposit")]
    Deposit,
    #[serde(rename = "Withdrawal")]
    Withdrawal,
    #[serde(rename = "Send")]
    Send,
    #[serde(rename = "Receive")]
    Receive,
    #[serde(rename = "Convert (from)")]
    ConvertFrom,
    #[serde(rename = "Convert (to)")]
    ConvertTo,
    #[serde(rename = "Reward / Bonus")]
    Reward,
    #[serde(rename = "Staking")]
    Staking,
    #[serde(rename = "Unstaking")]
    Unstaking,
    #[serde(rename = "Interest")]
    Interest,
    #[serde(rename = "Airdrop")]
    Airdrop,
}

impl TransactionKind {
    pub const ALL: [TransactionKind; 13] = [
        TransactionKind::Buy,
        TransactionKind::Sell,
        TransactionKind::Deposit,
        TransactionKind::Withdrawal,
        TransactionKind::Send,
        TransactionKind::Receive,
        TransactionKind::ConvertFrom,
        TransactionKind::ConvertTo,
        TransactionKind::Reward,
        TransactionKind::Staking,
        TransactionKind::Unstaking,
        TransactionKind::Interest,
        TransactionKind::Airdrop,
    ];

    /// Canonical wire string for this kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionKind::Buy => TRANSACTION_KIND_BUY,
            TransactionKind::Sell => TRANSACTION_KIND_SELL,
            TransactionKind::Deposit => TRANSACTION_KIND_DEPOSIT,
            TransactionKind::Withdrawal => TRANSACTION_KIND_WITHDRAWAL,
            TransactionKind::Send => TRANSACTION_KIND_SEND,
            TransactionKind::Receive => TRANSACTION_KIND_RECEIVE,
            TransactionKind::ConvertFrom => TRANSACTION_KIND_CONVERT_FROM,
            TransactionKind::ConvertTo => TRANSACTION_KIND_CONVERT_TO,
            TransactionKind::Reward => TRANSACTION_KIND_REWARD,
            TransactionKind::Staking => TRANSACTION_KIND_STAKING,
            TransactionKind::Unstaking => TRANSACTION_KIND_UNSTAKING,
            TransactionKind::Interest => TRANSACTION_KIND_INTEREST,
            TransactionKind::Airdrop => TRANSACTION_KIND_AIRDROP,
        }
    }

    /// Kinds that add quantity to a position.
    ///
    /// Deposit counts: a deposit of a non-base asset reaches the ledger as an
    /// acquisition. Base-currency deposits are routed to cash before this
    /// classification matters.
    pub fn is_acquisition(&self) -> bool {
        matches!(
            self,
            TransactionKind::Buy
                | TransactionKind::Receive
                | TransactionKind::ConvertTo
                | TransactionKind::Reward
                | TransactionKind::Interest
                | TransactionKind::Airdrop
                | TransactionKind::Deposit
        )
    }

    /// Kinds that remove quantity from a position.
    pub fn is_disposal(&self) -> bool {
        matches!(
            self,
            TransactionKind::Sell
                | TransactionKind::Send
                | TransactionKind::ConvertFrom
                | TransactionKind::Withdrawal
        )
    }

    /// Custody movements that leave quantity untouched.
    pub fn is_neutral(&self) -> bool {
        matches!(self, TransactionKind::Staking | TransactionKind::Unstaking)
    }

    /// Kinds the ledger may route to the cash account (when the asset is the
    /// base currency).
    pub fn is_cash_kind(&self) -> bool {
        matches!(self, TransactionKind::Deposit | TransactionKind::Withdrawal)
    }

    pub fn is_trade(&self) -> bool {
        matches!(self, TransactionKind::Buy | TransactionKind::Sell)
    }

    pub fn is_conversion(&self) -> bool {
        matches!(
            self,
            TransactionKind::ConvertFrom | TransactionKind::ConvertTo
        )
    }

    /// Income kinds that arrive without a purchase: these may carry no price
    /// information at all and book as a zero-cost lot.
    pub fn is_income(&self) -> bool {
        matches!(
            self,
            TransactionKind::Reward | TransactionKind::Interest | TransactionKind::Airdrop
        )
    }

    /// Whether this kind participates in cost-basis accounting.
    pub fn affects_cost_basis(&self) -> bool {
        !self.is_cash_kind()
    }
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransactionKind {
    type Err = ValidationError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let trimmed = s.trim();
        Self::ALL
            .iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(trimmed))
            .copied()
            .ok_or_else(|| ValidationError::UnknownKind(trimmed.to_string()))
    }
}

/// Immutable, validated economic event.
///
/// Constructed only through [`NewTransaction::build`]. Fields are public for
/// read access; nothing in the core mutates a transaction after construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawTransaction {
    /// External id from the source system, or a deterministic fingerprint.
    pub id: String,
    pub timestamp: DateTime<Utc>,
    pub kind: TransactionKind,
    /// Asset symbol, normalized uppercase.
    pub asset: String,
    /// Quantity moved by the event. Always strictly positive.
    pub amount: Decimal,
    #[serde(default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit_price: Option<Decimal>,
    #[serde(default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gross_value: Option<Decimal>,
    #[serde(default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fee: Option<Decimal>,
    #[serde(default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub venue: Option<String>,
    #[serde(default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl RawTransaction {
    /// Calendar day of the event, UTC.
    pub fn effective_date(&self) -> NaiveDate {
        self.timestamp.naive_utc().date()
    }

    /// Unit price, defaulting to zero if not set.
    pub fn price(&self) -> Decimal {
        self.unit_price.unwrap_or(Decimal::ZERO)
    }

    /// Gross value, defaulting to zero if not set.
    pub fn gross(&self) -> Decimal {
        self.gross_value.unwrap_or(Decimal::ZERO)
    }

    /// Fee, defaulting to zero if not set.
    pub fn fee_amount(&self) -> Decimal {
        self.fee.unwrap_or(Decimal::ZERO)
    }

    /// Cash value of the event including fees: acquisitions cost gross plus
    /// fee, disposals net gross minus fee. Zero for custody movements.
    pub fn effective_cost(&self) -> Decimal {
        if self.kind.is_acquisition() {
            self.gross() + self.fee_amount()
        } else if self.kind.is_disposal() {
            self.gross() - self.fee_amount()
        } else {
            Decimal::ZERO
        }
    }
}

/// Unvalidated transaction input from the ingestion boundary.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTransaction {
    pub timestamp: DateTime<Utc>,
    pub kind: TransactionKind,
    pub asset: String,
    pub amount: Decimal,
    #[serde(default)]
    pub unit_price: Option<Decimal>,
    #[serde(default)]
    pub gross_value: Option<Decimal>,
    #[serde(default)]
    pub fee: Option<Decimal>,
    #[serde(default)]
    pub venue: Option<String>,
    #[serde(default)]
    pub external_id: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl NewTransaction {
    /// Validates and normalizes the input into an immutable [`RawTransaction`].
    ///
    /// Rules enforced here, before anything reaches the ledger:
    /// - `amount` must be strictly positive;
    /// - `fee`, when present, must not be negative;
    /// - acquisitions and disposals need a usable `unit_price` or
    ///   `gross_value` (a missing side is derived from the other), except
    ///   income kinds, which may book as a zero-cost lot;
    /// - the asset symbol is trimmed and uppercased;
    /// - a missing `external_id` is replaced by a deterministic fingerprint.
    pub fn build(self) -> Result<RawTransaction> {
        let asset = self.asset.trim().to_uppercase();
        if asset.is_empty() {
            return Err(ValidationError::MissingField("asset".to_string()).into());
        }
        if self.amount <= Decimal::ZERO {
            return Err(ValidationError::InvalidInput(format!(
                "transaction amount must be positive, got {}",
                self.amount
            ))
            .into());
        }
        if let Some(fee) = self.fee {
            if fee < Decimal::ZERO {
                return Err(ValidationError::InvalidInput(format!(
                    "transaction fee must not be negative, got {fee}"
                ))
                .into());
            }
        }

        let mut unit_price = self.unit_price;
        let mut gross_value = self.gross_value;
        match (unit_price, gross_value) {
            (Some(price), None) => gross_value = Some(price * self.amount),
            (None, Some(gross)) => unit_price = Some(gross / self.amount),
            (Some(price), Some(gross)) => {
                let calculated = price * self.amount;
                if (calculated - gross).abs() > PRICE_GROSS_TOLERANCE {
                    log::warn!(
                        "price/gross mismatch for {} {}: {} * {} = {} vs provided {}",
                        self.kind,
                        asset,
                        self.amount,
                        price,
                        calculated,
                        gross
                    );
                }
            }
            (None, None) => {}
        }

        if (self.kind.is_acquisition() || self.kind.is_disposal())
            && !self.kind.is_income()
            && unit_price.unwrap_or(Decimal::ZERO).is_zero()
            && gross_value.unwrap_or(Decimal::ZERO).is_zero()
        {
            return Err(
                ValidationError::MissingField("unitPrice or grossValue".to_string()).into(),
            );
        }

        let venue = self
            .venue
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty());
        let notes = self
            .notes
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty());

        let id = match self.external_id {
            Some(external) if !external.trim().is_empty() => external.trim().to_string(),
            _ => compute_fingerprint(
                &self.timestamp,
                self.kind,
                &asset,
                self.amount,
                venue.as_deref(),
            ),
        };

        Ok(RawTransaction {
            id,
            timestamp: self.timestamp,
            kind: self.kind,
            asset,
            amount: self.amount,
            unit_price,
            gross_value,
            fee: self.fee,
            venue,
            notes,
        })
    }
}

/// Accounting results for one processed disposal, owned by the ledger.
///
/// Written exactly once, at disposal time; writing a second outcome for the
/// same transaction id is an invariant violation. The consumed-lot detail
/// feeds the tax report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessingOutcome {
    pub transaction_id: String,
    pub asset: String,
    pub disposed_at: DateTime<Utc>,
    /// Quantity disposed.
    pub quantity: Decimal,
    /// Gross value minus fee.
    pub net_proceeds: Decimal,
    /// Total cost basis of the consumed lots.
    pub consumed_cost_basis: Decimal,
    /// `net_proceeds - consumed_cost_basis`.
    pub realized_gain_loss: Decimal,
    pub consumed_lots: Vec<ConsumedLot>,
}

/// Computes a deterministic fingerprint for a transaction without an
/// external id.
///
/// SHA-256 over the identifying fields (timestamp, kind, asset, amount,
/// venue), truncated to 16 hex chars so it stays short enough for audit
/// output. Amounts are normalized so `1.50` and `1.5` hash identically.
pub fn compute_fingerprint(
    timestamp: &DateTime<Utc>,
    kind: TransactionKind,
    asset: &str,
    amount: Decimal,
    venue: Option<&str>,
) -> String {
    let mut hasher = Sha256::new();
    hasher.update(timestamp.to_rfc3339().as_bytes());
    hasher.update(b"|");
    hasher.update(kind.as_str().as_bytes());
    hasher.update(b"|");
    hasher.update(asset.as_bytes());
    hasher.update(b"|");
    hasher.update(amount.normalize().to_string().as_bytes());
    hasher.update(b"|");
    hasher.update(venue.unwrap_or("unknown").as_bytes());

    let mut encoded = hex::encode(hasher.finalize());
    encoded.truncate(16);
    encoded
}
