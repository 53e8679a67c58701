#[cfg(test)]
mod tests {
    use crate::portfolio::allocation::PortfolioAllocation;
    use crate::portfolio::ledger::Portfolio;
    use crate::portfolio::positions::DisposalMethod;
    use crate::transactions::{NewTransaction, RawTransaction, TransactionKind};
    use chrono::{DateTime, TimeZone, Utc};
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;
    use std::collections::HashMap;

    fn at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 2, 10, 0, 0).unwrap()
    }

    fn tx(
        kind: TransactionKind,
        asset: &str,
        amount: Decimal,
        price: Decimal,
    ) -> RawTransaction {
        NewTransaction {
            timestamp: at(),
            kind,
            asset: asset.to_string(),
            amount,
            unit_price: Some(price),
            gross_value: None,
            fee: None,
            venue: None,
            external_id: None,
            notes: None,
        }
        .build()
        .unwrap()
    }

    #[test]
    fn test_breakdown_includes_cash_row() {
        let mut ledger = Portfolio::new("USD", DisposalMethod::Fifo);
        ledger
            .process(&tx(TransactionKind::Deposit, "USD", dec!(1000), dec!(1)))
            .unwrap();
        ledger
            .process(&tx(TransactionKind::Buy, "BTC", dec!(1), dec!(40000)))
            .unwrap();

        let mut prices = HashMap::new();
        prices.insert("BTC".to_string(), dec!(3000));
        ledger.update_prices(&prices);

        let allocation = PortfolioAllocation::from_portfolio(&ledger);

        assert_eq!(allocation.total_value, dec!(4000));
        assert_eq!(allocation.entries.len(), 2);
        assert_eq!(allocation.entries[0].asset, "BTC");
        assert_eq!(allocation.entries[0].value, dec!(3000));
        assert_eq!(allocation.entries[0].percentage, dec!(75));
        assert_eq!(allocation.entries[1].asset, "CASH");
        assert_eq!(allocation.entries[1].quantity, dec!(1000));
        assert_eq!(allocation.entries[1].percentage, dec!(25));
    }

    #[test]
    fn test_empty_when_total_value_is_zero() {
        let ledger = Portfolio::new("USD", DisposalMethod::Fifo);
        let allocation = PortfolioAllocation::from_portfolio(&ledger);

        assert!(allocation.entries.is_empty());
        assert_eq!(allocation.total_value, Decimal::ZERO);
    }

    #[test]
    fn test_stablecoins_value_at_face_without_a_price() {
        let mut ledger = Portfolio::new("USD", DisposalMethod::Fifo);
        ledger
            .process(&tx(TransactionKind::Buy, "USDT", dec!(500), dec!(1)))
            .unwrap();

        let allocation = PortfolioAllocation::from_portfolio(&ledger);

        assert_eq!(allocation.total_value, dec!(500));
        assert_eq!(allocation.entries[0].asset, "USDT");
        assert_eq!(allocation.entries[0].value, dec!(500));
        assert_eq!(allocation.entries[0].percentage, dec!(100));
    }

    #[test]
    fn test_unpriced_position_shows_zero_value() {
        let mut ledger = Portfolio::new("USD", DisposalMethod::Fifo);
        ledger
            .process(&tx(TransactionKind::Deposit, "USD", dec!(100), dec!(1)))
            .unwrap();
        ledger
            .process(&tx(TransactionKind::Buy, "DOT", dec!(20), dec!(7)))
            .unwrap();

        let allocation = PortfolioAllocation::from_portfolio(&ledger);

        let dot = allocation
            .entries
            .iter()
            .find(|entry| entry.asset == "DOT")
            .unwrap();
        assert_eq!(dot.quantity, dec!(20));
        assert_eq!(dot.value, Decimal::ZERO);
        assert_eq!(dot.percentage, Decimal::ZERO);
        assert_eq!(allocation.total_value, dec!(100));
    }

    #[test]
    fn test_entries_sorted_by_value_descending() {
        let mut ledger = Portfolio::new("USD", DisposalMethod::Fifo);
        ledger
            .process(&tx(TransactionKind::Buy, "BTC", dec!(1), dec!(100)))
            .unwrap();
        ledger
            .process(&tx(TransactionKind::Buy, "ETH", dec!(1), dec!(100)))
            .unwrap();

        let mut prices = HashMap::new();
        prices.insert("BTC".to_string(), dec!(200));
        prices.insert("ETH".to_string(), dec!(800));
        ledger.update_prices(&prices);

        let allocation = PortfolioAllocation::from_portfolio(&ledger);

        let order: Vec<&str> = allocation
            .entries
            .iter()
            .map(|entry| entry.asset.as_str())
            .collect();
        assert_eq!(order, vec!["ETH", "BTC"]);
        assert_eq!(allocation.entries[0].percentage, dec!(80));
    }
}
