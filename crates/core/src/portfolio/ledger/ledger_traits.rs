use super::ledger_model::Portfolio;
use crate::errors::Result;

/// Persistence boundary for one portfolio ledger.
pub trait PortfolioStore: Send + Sync {
    fn save(&self, portfolio: &Portfolio) -> Result<()>;
    /// `Ok(None)` when nothing was ever saved.
    fn load(&self) -> Result<Option<Portfolio>>;
}
