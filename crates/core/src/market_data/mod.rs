//! Market data module - price lookup trait and pre-fetched price tables.

mod market_data_model;
mod market_data_traits;


// Re-export the public interface
pub use market_data_model::{HistoricalPriceMap, PriceBook};
pub use market_data_traits::PriceProvider;
