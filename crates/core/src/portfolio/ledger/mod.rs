mod ledger_model;
mod ledger_store;
mod ledger_traits;

#[cfg(test)]
mod ledger_store_tests;

pub use ledger_model::{LedgerWarning, Portfolio, Snapshot};
pub use ledger_store::JsonPortfolioStore;
pub use ledger_traits::PortfolioStore;
