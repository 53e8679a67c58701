use log::debug;
use std::fs;
use std::path::{Path, PathBuf};

use super::ledger_model::Portfolio;
use super::ledger_traits::PortfolioStore;
use crate::errors::Result;

/// Single-file JSON persistence for one portfolio.
///
/// The whole ledger round-trips through serde with full fidelity: positions
/// and their lots, closed positions, cash log, outcomes, snapshots and
/// warnings all come back exactly as saved.
pub struct JsonPortfolioStore {
    path: PathBuf,
}

impl JsonPortfolioStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl PortfolioStore for JsonPortfolioStore {
    fn save(&self, portfolio: &Portfolio) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let json = serde_json::to_string_pretty(portfolio)?;
        fs::write(&self.path, json)?;
        debug!("saved portfolio ledger to {}", self.path.display());
        Ok(())
    }

    fn load(&self) -> Result<Option<Portfolio>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let contents = fs::read_to_string(&self.path)?;
        let portfolio = serde_json::from_str(&contents)?;
        debug!("loaded portfolio ledger from {}", self.path.display());
        Ok(Some(portfolio))
    }
}
