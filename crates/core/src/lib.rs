//! Coinfolio Core - crypto portfolio accounting and analytics.
//!
//! This crate reconstructs the economic state of a crypto-asset portfolio
//! from a validated transaction log: tax-lot position tracking under
//! selectable disposal methods, cash bookkeeping, heuristic matching of
//! paired transactions, day-by-day valuation replay, and the performance
//! statistics derived from that replay. It performs no I/O of its own;
//! prices arrive through the [`market_data::PriceProvider`] trait and
//! persistence through [`portfolio::ledger::PortfolioStore`].

pub mod constants;
pub mod errors;
pub mod market_data;
pub mod portfolio;
pub mod transactions;
pub mod utils;

// Re-export the main entry points
pub use portfolio::ledger::{JsonPortfolioStore, Portfolio, PortfolioStore, Snapshot};
pub use portfolio::performance::{MetricsConfig, MetricsEngine, PerformanceMetrics};
pub use portfolio::positions::{DisposalMethod, Lot, Position};
pub use portfolio::valuation::{replay, ReplayWindow, ValueSeries};
pub use transactions::{NewTransaction, RawTransaction, TransactionKind, TransactionMatcher};

// Re-export error types
pub use errors::Error;
pub use errors::Result;
