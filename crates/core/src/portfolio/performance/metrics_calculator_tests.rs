#[cfg(test)]
mod tests {
    use crate::portfolio::performance::{
        CashFlowTotals, MetricsConfig, MetricsEngine, PerformanceMetrics,
    };
    use crate::portfolio::valuation::{ReplayWindow, ValueSeries};
    use crate::transactions::{NewTransaction, RawTransaction, TransactionKind};
    use chrono::{Duration, NaiveDate, TimeZone, Utc};
    use rust_decimal::prelude::ToPrimitive;
    use rust_decimal::Decimal;
    use rust_decimal::MathematicalOps;
    use rust_decimal_macros::dec;

    fn series_from_values(start: NaiveDate, values: Vec<Decimal>) -> ValueSeries {
        let dates: Vec<NaiveDate> = (0..values.len())
            .map(|i| start + Duration::days(i as i64))
            .collect();
        let daily_returns = values
            .windows(2)
            .map(|pair| {
                if pair[0] > Decimal::ZERO {
                    (pair[1] - pair[0]) / pair[0]
                } else {
                    Decimal::ZERO
                }
            })
            .collect();
        ValueSeries {
            dates,
            values,
            daily_returns,
        }
    }

    fn day_one() -> NaiveDate {
        NaiveDate::from_ymd_opt(2023, 7, 1).unwrap()
    }

    fn engine_with_min(min_observations: usize) -> MetricsEngine {
        MetricsEngine::new(MetricsConfig {
            min_observations,
            ..MetricsConfig::default()
        })
    }

    #[test]
    fn test_thin_series_returns_empty_metrics() {
        let engine = MetricsEngine::default();
        let series = series_from_values(day_one(), vec![dec!(1000)]);

        let metrics = engine.calculate(&series, &CashFlowTotals::default());

        assert_eq!(metrics, PerformanceMetrics::empty());
    }

    #[test]
    fn test_total_return_against_net_invested() {
        let engine = MetricsEngine::default();
        let series = series_from_values(day_one(), vec![dec!(10150), dec!(46559)]);
        let flows = CashFlowTotals {
            net_invested: dec!(10150),
            ..CashFlowTotals::default()
        };

        let metrics = engine.calculate(&series, &flows);

        assert_eq!(metrics.total_return, dec!(36409));
        assert_eq!(metrics.total_return_pct, dec!(358.71));
        assert_eq!(metrics.current_value, dec!(46559));
        assert_eq!(metrics.net_invested, dec!(10150));
    }

    #[test]
    fn test_total_return_without_net_invested_falls_back() {
        let engine = MetricsEngine::default();
        let series = series_from_values(day_one(), vec![dec!(500), dec!(800)]);

        let metrics = engine.calculate(&series, &CashFlowTotals::default());

        assert_eq!(metrics.total_return, dec!(800));
        assert_eq!(metrics.total_return_pct, Decimal::ZERO);
    }

    #[test]
    fn test_cagr_matches_direct_computation() {
        // 10,150 -> 46,559 over 603 days
        let engine = MetricsEngine::default();
        let start = day_one();
        let end = start + Duration::days(603);
        let series = ValueSeries {
            dates: vec![start, end],
            values: vec![dec!(10150), dec!(46559)],
            daily_returns: vec![(dec!(46559) - dec!(10150)) / dec!(10150)],
        };

        let metrics = engine.calculate(&series, &CashFlowTotals::default());

        let expected = (46559f64 / 10150f64).powf(365.25 / 603.0) - 1.0;
        let actual = metrics.cagr.to_f64().unwrap();
        assert!(
            (actual - expected).abs() < 1e-4,
            "cagr {actual} vs direct {expected}"
        );
    }

    #[test]
    fn test_cagr_is_zero_for_zero_start_value() {
        let engine = MetricsEngine::default();
        let series = series_from_values(day_one(), vec![dec!(0), dec!(100), dec!(200)]);

        let metrics = engine.calculate(&series, &CashFlowTotals::default());

        assert_eq!(metrics.cagr, Decimal::ZERO);
    }

    #[test]
    fn test_constant_returns_yield_zero_sharpe() {
        let engine = engine_with_min(0);
        // flat value series, every daily return exactly zero
        let series = series_from_values(day_one(), vec![dec!(1000); 41]);

        let metrics = engine.calculate(&series, &CashFlowTotals::default());

        assert_eq!(metrics.sharpe_ratio, Decimal::ZERO);
    }

    #[test]
    fn test_sortino_caps_when_no_downside() {
        let engine = engine_with_min(0);
        let mut values = vec![dec!(1000)];
        for i in 1..40u32 {
            values.push(dec!(1000) + Decimal::from(i * 10));
        }
        let series = series_from_values(day_one(), values);

        let metrics = engine.calculate(&series, &CashFlowTotals::default());

        assert_eq!(metrics.sortino_ratio, dec!(10.0));
    }

    #[test]
    fn test_risk_statistics_gate_on_observation_count() {
        let engine = MetricsEngine::default();
        // 10 observations, below the default gate of 30
        let values: Vec<Decimal> = (0..11u32)
            .map(|i| dec!(1000) + Decimal::from(i * 37))
            .collect();
        let series = series_from_values(day_one(), values);

        let metrics = engine.calculate(&series, &CashFlowTotals::default());

        assert_eq!(metrics.sharpe_ratio, Decimal::ZERO);
        assert_eq!(metrics.sortino_ratio, Decimal::ZERO);
        assert_eq!(metrics.beta, Decimal::ZERO);
    }

    #[test]
    fn test_monotone_series_has_zero_drawdown() {
        let engine = MetricsEngine::default();
        let series = series_from_values(
            day_one(),
            vec![dec!(100), dec!(100), dec!(150), dec!(180), dec!(180), dec!(250)],
        );

        let metrics = engine.calculate(&series, &CashFlowTotals::default());

        assert_eq!(metrics.max_drawdown, Decimal::ZERO);
    }

    #[test]
    fn test_drawdown_measures_peak_to_trough() {
        let engine = MetricsEngine::default();
        let series = series_from_values(
            day_one(),
            vec![dec!(100), dec!(200), dec!(50), dec!(120)],
        );

        let metrics = engine.calculate(&series, &CashFlowTotals::default());

        // 200 -> 50 is a 75% decline
        assert_eq!(metrics.max_drawdown, dec!(0.75));
    }

    #[test]
    fn test_drawdown_ignores_zero_values() {
        let engine = MetricsEngine::default();
        let series = series_from_values(
            day_one(),
            vec![dec!(100), dec!(0), dec!(100), dec!(90)],
        );

        let metrics = engine.calculate(&series, &CashFlowTotals::default());

        assert_eq!(metrics.max_drawdown, dec!(0.1));
    }

    #[test]
    fn test_win_rate_counts_positive_days() {
        let engine = MetricsEngine::default();
        let series = series_from_values(
            day_one(),
            vec![dec!(100), dec!(110), dec!(105), dec!(105), dec!(120)],
        );

        let metrics = engine.calculate(&series, &CashFlowTotals::default());

        // 2 of 4 daily returns are positive
        assert_eq!(metrics.win_rate, dec!(0.5));
    }

    #[test]
    fn test_beta_of_identical_series_is_one() {
        let values: Vec<Decimal> = (0..40u32)
            .map(|i| dec!(1000) * dec!(1.01).powu(u64::from(i)) + Decimal::from(i % 3))
            .collect();
        let series = series_from_values(day_one(), values);
        let engine = MetricsEngine::new(MetricsConfig {
            benchmark_returns: Some(series.daily_returns.clone()),
            min_observations: 0,
            ..MetricsConfig::default()
        });

        let metrics = engine.calculate(&series, &CashFlowTotals::default());

        assert!((metrics.beta - Decimal::ONE).abs() < dec!(0.000001));
    }

    #[test]
    fn test_beta_is_zero_without_benchmark() {
        let engine = engine_with_min(0);
        let series = series_from_values(day_one(), vec![dec!(100), dec!(110), dec!(90)]);

        let metrics = engine.calculate(&series, &CashFlowTotals::default());

        assert_eq!(metrics.beta, Decimal::ZERO);
    }

    #[test]
    fn test_beta_is_zero_for_flat_benchmark() {
        let series = series_from_values(day_one(), vec![dec!(100), dec!(110), dec!(90), dec!(95)]);
        let engine = MetricsEngine::new(MetricsConfig {
            benchmark_returns: Some(vec![dec!(0.01); 3]),
            min_observations: 0,
            ..MetricsConfig::default()
        });

        let metrics = engine.calculate(&series, &CashFlowTotals::default());

        assert_eq!(metrics.beta, Decimal::ZERO);
    }

    #[test]
    fn test_monthly_statistics_group_by_month_end() {
        let engine = MetricsEngine::default();
        // ~3 months of slow growth, then a losing month
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let mut values = Vec::new();
        for i in 0..91i64 {
            values.push(dec!(1000) + Decimal::from(i * 10));
        }
        for i in 0..30i64 {
            values.push(dec!(1900) - Decimal::from(i * 5));
        }
        let series = series_from_values(start, values);

        let metrics = engine.calculate(&series, &CashFlowTotals::default());

        assert_eq!(metrics.monthly_returns.len(), 3);
        assert_eq!(metrics.monthly_returns[0].month, "2024-02");
        assert!(metrics.monthly_returns[0].value > Decimal::ZERO);
        assert!(metrics.monthly_returns[2].value < Decimal::ZERO);
        assert_eq!(metrics.winning_months_pct, dec!(66.67));
        assert_eq!(metrics.losing_months_pct, dec!(33.33));
    }

    #[test]
    fn test_net_profit_subtracts_fees() {
        let engine = MetricsEngine::default();
        let series = series_from_values(day_one(), vec![dec!(1000), dec!(1500)]);
        let flows = CashFlowTotals {
            net_invested: dec!(1000),
            fees: dec!(42),
            trade_count: 3,
        };

        let metrics = engine.calculate(&series, &flows);

        assert_eq!(metrics.net_profit, dec!(458));
        assert_eq!(metrics.trade_count, 3);
    }

    #[test]
    fn test_cash_flow_totals_from_transactions() {
        fn tx(
            kind: TransactionKind,
            asset: &str,
            amount: Decimal,
            fee: Option<Decimal>,
            day: u32,
        ) -> RawTransaction {
            NewTransaction {
                timestamp: Utc.with_ymd_and_hms(2024, 5, day, 10, 0, 0).unwrap(),
                kind,
                asset: asset.to_string(),
                amount,
                unit_price: Some(dec!(1)),
                gross_value: None,
                fee,
                venue: None,
                external_id: None,
                notes: None,
            }
            .build()
            .unwrap()
        }

        let transactions = vec![
            tx(TransactionKind::Deposit, "USD", dec!(5000), None, 1),
            tx(TransactionKind::Buy, "BTC", dec!(0.1), Some(dec!(10)), 2),
            tx(TransactionKind::Sell, "BTC", dec!(0.05), Some(dec!(5)), 3),
            tx(TransactionKind::Withdrawal, "USD", dec!(1000), None, 4),
            // outside the window, must not count
            tx(TransactionKind::Deposit, "USD", dec!(9999), Some(dec!(1)), 20),
        ];
        let window = ReplayWindow::new(
            NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(),
            NaiveDate::from_ymd_opt(2024, 5, 10).unwrap(),
        )
        .unwrap();

        let totals = CashFlowTotals::from_transactions(&transactions, "USD", window);

        assert_eq!(totals.net_invested, dec!(4000));
        assert_eq!(totals.fees, dec!(15));
        assert_eq!(totals.trade_count, 2);
    }
}
