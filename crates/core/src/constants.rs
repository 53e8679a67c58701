use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// Base fiat currency for cash accounting
pub const BASE_CURRENCY: &str = "USD";

/// Decimal precision for valuation calculations
pub const DECIMAL_PRECISION: u32 = 6;

/// Decimal precision for display
pub const DISPLAY_DECIMAL_PRECISION: u32 = 2;

/// Dust threshold below which a quantity counts as zero
pub const QUANTITY_THRESHOLD: Decimal = dec!(0.00000001);

/// Stablecoins valued at face amount during valuation
pub const STABLECOINS: &[&str] = &[
    "USDC", "USDT", "DAI", "BUSD", "UST", "TUSD", "USDP", "FRAX",
];

/// Whether the symbol is a tracked stablecoin.
pub fn is_stablecoin(asset: &str) -> bool {
    STABLECOINS.contains(&asset)
}

/// Calendar days used to annualize daily crypto returns (24/7 markets)
pub const PERIODS_PER_YEAR: u32 = 365;

/// Days per year including leap years, for CAGR exponents
pub const DAYS_PER_YEAR: Decimal = dec!(365.25);

/// Default annual risk-free rate for excess-return statistics
pub const DEFAULT_RISK_FREE_RATE: Decimal = dec!(0.04248);

/// Default benchmark asset for beta
pub const DEFAULT_BENCHMARK_ASSET: &str = "BTC";

/// Minimum daily-return observations required for risk statistics
pub const MIN_RISK_OBSERVATIONS: usize = 30;

/// Display cap for the Sortino ratio when downside is tiny or absent
pub const SORTINO_DISPLAY_CAP: Decimal = dec!(10.0);
