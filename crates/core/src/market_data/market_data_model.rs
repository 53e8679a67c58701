//! Market data domain models.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};

use super::market_data_traits::PriceProvider;
use crate::utils::time_utils::get_days_between;

/// In-memory price table keyed by asset symbol and day.
///
/// Ships with the crate for tests and offline runs. Production callers put
/// their own repository behind `PriceProvider` instead.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HistoricalPriceMap {
    prices: HashMap<String, BTreeMap<NaiveDate, Decimal>>,
}

impl HistoricalPriceMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, asset: &str, date: NaiveDate, price: Decimal) {
        self.prices
            .entry(asset.to_string())
            .or_default()
            .insert(date, price);
    }

    /// Most recent recorded price for the asset, if any.
    pub fn latest(&self, asset: &str) -> Option<Decimal> {
        self.prices
            .get(asset)
            .and_then(|days| days.values().next_back().copied())
    }

    /// Most recent recorded price for every asset in the map.
    pub fn latest_prices(&self) -> HashMap<String, Decimal> {
        self.prices
            .iter()
            .filter_map(|(asset, days)| {
                days.values().next_back().map(|p| (asset.clone(), *p))
            })
            .collect()
    }
}

impl PriceProvider for HistoricalPriceMap {
    fn get_price(&self, asset: &str, date: NaiveDate) -> Option<Decimal> {
        self.prices.get(asset).and_then(|days| days.get(&date).copied())
    }
}

/// Per-replay price table filled in one pass before the replay starts, so the
/// replay loop itself never blocks on the provider.
#[derive(Debug, Clone, Default)]
pub struct PriceBook {
    prices: HashMap<String, BTreeMap<NaiveDate, Decimal>>,
}

impl PriceBook {
    /// Queries every `(asset, day)` cell of the window up front. Assets the
    /// provider knows nothing about end up with no entry at all, which
    /// `has_prices` exposes for exclusion reporting.
    pub fn prefetch(
        provider: &dyn PriceProvider,
        assets: &HashSet<String>,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Self {
        let days = get_days_between(start, end);
        let mut prices: HashMap<String, BTreeMap<NaiveDate, Decimal>> = HashMap::new();
        for asset in assets {
            let known: BTreeMap<NaiveDate, Decimal> = days
                .iter()
                .filter_map(|day| provider.get_price(asset, *day).map(|p| (*day, p)))
                .collect();
            if !known.is_empty() {
                prices.insert(asset.clone(), known);
            }
        }
        Self { prices }
    }

    /// Price for the asset on `date`, falling back to the last known price
    /// before it. `None` when nothing at or before `date` was fetched.
    pub fn price_on(&self, asset: &str, date: NaiveDate) -> Option<Decimal> {
        self.prices
            .get(asset)
            .and_then(|days| days.range(..=date).next_back().map(|(_, p)| *p))
    }

    pub fn has_prices(&self, asset: &str) -> bool {
        self.prices.contains_key(asset)
    }
}
