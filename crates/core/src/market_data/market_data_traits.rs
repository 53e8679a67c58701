use chrono::NaiveDate;
use rust_decimal::Decimal;

/// Read-side price lookup the valuation layer depends on.
///
/// `None` means the price is unknown for that asset and day, never zero.
/// Callers decide what to do about gaps; the replay path pre-fetches a whole
/// window into a price book and falls back to the last known price there.
/// Caching and retry policy belong to the implementation, not the core.
pub trait PriceProvider: Send + Sync {
    fn get_price(&self, asset: &str, date: NaiveDate) -> Option<Decimal>;
}
