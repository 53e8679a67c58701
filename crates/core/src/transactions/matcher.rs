//! Heuristic pairing of related transactions.
//!
//! Two families of pairings are produced:
//! - conversions: the two legs of an asset-to-asset swap, grouped by exact
//!   `(timestamp, venue)`;
//! - self-custody transfers: a Send and a later Receive of roughly the same
//!   amount of the same asset.
//!
//! Transfer matching uses a first-match-within-window policy, not best-match.
//! When several candidate receives exist inside the window the earliest wins,
//! which can mis-pair transfers, and a Receive is not consumed by a match, so
//! one Receive can satisfy two Sends. Known heuristic limitations; the result
//! is informational and never blocks ledger processing. All findings are
//! returned in the match results rather than logged from inside the pass.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

use super::transactions_model::{RawTransaction, TransactionKind};

/// Bounds for the transfer pairing scan.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatcherConfig {
    /// Upper bound of transactions scanned forward from a Send.
    pub scan_limit: usize,
    /// Largest tolerated gap between a Send and its Receive, in whole days.
    pub max_gap_days: i64,
    /// Relative amount tolerance, absorbs network fees.
    pub amount_tolerance: Decimal,
}

impl Default for MatcherConfig {
    fn default() -> Self {
        Self {
            scan_limit: 20,
            max_gap_days: 7,
            amount_tolerance: dec!(0.01),
        }
    }
}

/// Linked conversion pair sharing a synthetic conversion id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversionPair {
    pub conversion_id: String,
    pub from_id: String,
    pub to_id: String,
    pub timestamp: DateTime<Utc>,
    pub venue: Option<String>,
}

/// Conversion group that could not be paired unambiguously.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AmbiguousConversionGroup {
    pub timestamp: DateTime<Utc>,
    pub venue: Option<String>,
    pub from_count: usize,
    pub to_count: usize,
    pub transaction_ids: Vec<String>,
}

/// Result of conversion pairing: matched ids per transaction leg plus the
/// groups left unmatched. Ambiguity is reported, never guessed at.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversionMatches {
    pub pairs: Vec<ConversionPair>,
    /// Transaction id to shared conversion id, both legs present.
    pub matched: HashMap<String, String>,
    pub ambiguous: Vec<AmbiguousConversionGroup>,
}

/// Result of transfer pairing.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferMatches {
    /// Send transaction id to the Receive it was paired with.
    pub pairs: HashMap<String, String>,
    /// Sends with no Receive inside the scan window.
    pub unmatched_sends: Vec<String>,
}

/// Stateless pairing service over an immutable transaction slice.
#[derive(Debug, Default)]
pub struct TransactionMatcher {
    config: MatcherConfig,
}

impl TransactionMatcher {
    pub fn new(config: MatcherConfig) -> Self {
        Self { config }
    }

    /// Pairs ConvertFrom/ConvertTo legs that share an exact timestamp and
    /// venue. A group with exactly one leg of each side gets a shared
    /// synthetic id; any other count is ambiguous and left unmatched.
    pub fn match_conversions(&self, transactions: &[RawTransaction]) -> ConversionMatches {
        let mut grouped: BTreeMap<(DateTime<Utc>, Option<String>), Vec<&RawTransaction>> =
            BTreeMap::new();
        for tx in transactions {
            if tx.kind.is_conversion() {
                grouped
                    .entry((tx.timestamp, tx.venue.clone()))
                    .or_default()
                    .push(tx);
            }
        }

        let mut result = ConversionMatches::default();
        for ((timestamp, venue), group) in grouped {
            let from_legs: Vec<&RawTransaction> = group
                .iter()
                .copied()
                .filter(|tx| tx.kind == TransactionKind::ConvertFrom)
                .collect();
            let to_legs: Vec<&RawTransaction> = group
                .iter()
                .copied()
                .filter(|tx| tx.kind == TransactionKind::ConvertTo)
                .collect();

            if from_legs.len() == 1 && to_legs.len() == 1 {
                let from_tx = from_legs[0];
                let to_tx = to_legs[0];
                let conversion_id = conversion_id(&from_tx.id);

                result
                    .matched
                    .insert(from_tx.id.clone(), conversion_id.clone());
                result
                    .matched
                    .insert(to_tx.id.clone(), conversion_id.clone());
                result.pairs.push(ConversionPair {
                    conversion_id,
                    from_id: from_tx.id.clone(),
                    to_id: to_tx.id.clone(),
                    timestamp,
                    venue,
                });
            } else {
                result.ambiguous.push(AmbiguousConversionGroup {
                    timestamp,
                    venue,
                    from_count: from_legs.len(),
                    to_count: to_legs.len(),
                    transaction_ids: group.iter().map(|tx| tx.id.clone()).collect(),
                });
            }
        }

        result
    }

    /// Pairs each Send with the first later Receive of the same asset whose
    /// amount falls within the configured tolerance, scanning at most
    /// `scan_limit` transactions and `max_gap_days` days forward.
    pub fn match_transfers(&self, transactions: &[RawTransaction]) -> TransferMatches {
        let mut by_asset: BTreeMap<&str, Vec<&RawTransaction>> = BTreeMap::new();
        for tx in transactions {
            by_asset.entry(tx.asset.as_str()).or_default().push(tx);
        }

        let mut result = TransferMatches::default();
        for asset_txs in by_asset.values_mut() {
            asset_txs.sort_by_key(|tx| tx.timestamp);

            for (i, send) in asset_txs.iter().enumerate() {
                if send.kind != TransactionKind::Send {
                    continue;
                }

                let upper = (i + self.config.scan_limit).min(asset_txs.len());
                let mut matched = false;
                for candidate in &asset_txs[i + 1..upper] {
                    if (candidate.timestamp - send.timestamp).num_days() > self.config.max_gap_days
                    {
                        break;
                    }
                    if candidate.kind == TransactionKind::Receive
                        && (candidate.amount - send.amount).abs()
                            < send.amount * self.config.amount_tolerance
                    {
                        result.pairs.insert(send.id.clone(), candidate.id.clone());
                        matched = true;
                        break;
                    }
                }

                if !matched {
                    result.unmatched_sends.push(send.id.clone());
                }
            }
        }

        result
    }
}

fn conversion_id(from_id: &str) -> String {
    let prefix: String = from_id.chars().take(8).collect();
    format!("conv_{prefix}")
}
