//! Read-only reporting over a processed ledger.

mod reporting_model;
mod reporting_service;


pub use reporting_model::{
    AssetTransferSummary, ExportFormat, HoldingPeriod, PortfolioExport, PositionRow,
    ReconciliationIssue, ReconciliationReport, TaxLotEntry, TaxReport, TaxSummary,
    TransferSummary,
};
pub use reporting_service::{export_portfolio, reconcile, tax_report, transfer_summary};
