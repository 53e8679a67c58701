#[cfg(test)]
mod tests {
    use crate::market_data::HistoricalPriceMap;
    use crate::portfolio::ledger::{JsonPortfolioStore, Portfolio, PortfolioStore};
    use crate::portfolio::positions::DisposalMethod;
    use crate::transactions::{NewTransaction, RawTransaction, TransactionKind};
    use chrono::{DateTime, TimeZone, Utc};
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;
    use tempfile::tempdir;

    fn day(d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 4, d, 16, 0, 0).unwrap()
    }

    fn tx(
        kind: TransactionKind,
        asset: &str,
        amount: Decimal,
        price: Option<Decimal>,
        fee: Option<Decimal>,
        at: DateTime<Utc>,
    ) -> RawTransaction {
        NewTransaction {
            timestamp: at,
            kind,
            asset: asset.to_string(),
            amount,
            unit_price: price,
            gross_value: None,
            fee,
            venue: Some("Kraken".to_string()),
            external_id: None,
            notes: None,
        }
        .build()
        .unwrap()
    }

    /// A ledger exercising every persisted collection: cash log, active and
    /// closed positions, outcomes, snapshots and warnings.
    fn populated_ledger() -> Portfolio {
        let mut ledger = Portfolio::new("USD", DisposalMethod::Hifo);
        ledger
            .process(&tx(
                TransactionKind::Deposit,
                "USD",
                dec!(5000),
                Some(dec!(1)),
                None,
                day(1),
            ))
            .unwrap();
        ledger
            .process(&tx(
                TransactionKind::Buy,
                "BTC",
                dec!(0.25),
                Some(dec!(40000)),
                Some(dec!(12.5)),
                day(2),
            ))
            .unwrap();
        ledger
            .process(&tx(
                TransactionKind::Buy,
                "ETH",
                dec!(2),
                Some(dec!(2200)),
                None,
                day(3),
            ))
            .unwrap();
        ledger
            .process(&tx(
                TransactionKind::Sell,
                "ETH",
                dec!(2),
                Some(dec!(2500)),
                Some(dec!(3)),
                day(8),
            ))
            .unwrap();
        ledger
            .process(&tx(
                TransactionKind::Withdrawal,
                "USD",
                dec!(6000),
                Some(dec!(1)),
                None,
                day(9),
            ))
            .unwrap();

        let mut prices = HistoricalPriceMap::new();
        prices.insert("BTC", day(10).naive_utc().date(), dec!(61000));
        ledger.snapshot(day(10), &prices);
        ledger
    }

    #[test]
    fn test_round_trip_preserves_full_ledger() {
        let dir = tempdir().expect("Failed to create temp directory");
        let store = JsonPortfolioStore::new(dir.path().join("ledger.json"));

        let original = populated_ledger();
        store.save(&original).unwrap();
        let loaded = store.load().unwrap().expect("saved ledger should load");

        assert_eq!(loaded, original);
        // spot-check the interesting corners survived the trip
        assert_eq!(loaded.closed_positions().len(), 1);
        assert_eq!(loaded.warnings().len(), 1);
        assert_eq!(loaded.snapshots().len(), 1);
        assert_eq!(loaded.outcomes().len(), 1);
        assert_eq!(loaded.position("BTC").unwrap().lots.len(), 1);
        assert_eq!(loaded.disposal_method(), DisposalMethod::Hifo);
    }

    #[test]
    fn test_load_missing_file_returns_none() {
        let dir = tempdir().expect("Failed to create temp directory");
        let store = JsonPortfolioStore::new(dir.path().join("absent.json"));

        assert!(store.load().unwrap().is_none());
    }

    #[test]
    fn test_save_creates_parent_directories() {
        let dir = tempdir().expect("Failed to create temp directory");
        let store = JsonPortfolioStore::new(dir.path().join("nested/dir/ledger.json"));

        store.save(&populated_ledger()).unwrap();
        assert!(store.path().exists());
    }
}
