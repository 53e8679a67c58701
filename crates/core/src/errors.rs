//! Core error types for the coinfolio ledger.
//!
//! This module defines storage-agnostic error types. Adapter-specific errors
//! (filesystem, serialization backends) are converted to these types at the
//! storage boundary.

use chrono::ParseError as ChronoParseError;
use rust_decimal::Decimal;
use std::num::ParseFloatError;
use thiserror::Error;

/// Type alias for Result using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Root error type for the ledger and analytics engine.
///
/// Data-quality findings (missing prices, ambiguous matches, thin series) are
/// not errors; they travel as structured warnings on the results that produce
/// them. This enum covers genuine failures only.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Storage operation failed: {0}")]
    Storage(#[from] StorageError),

    #[error("Input validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error("Ledger calculation failed: {0}")]
    Calculation(#[from] CalculatorError),

    #[error("Export failed: {0}")]
    Export(String),

    #[error("Unexpected error: {0}")]
    Unexpected(String),
}

/// Storage-agnostic error type for persistence operations.
///
/// Uses `String` payloads so adapters can fold backend-specific errors into
/// this format without leaking their types.
#[derive(Error, Debug)]
pub enum StorageError {
    /// Reading or writing the backing file failed.
    #[error("Storage I/O failed: {0}")]
    Io(String),

    /// Encoding or decoding the persisted portfolio failed.
    #[error("Serialization failed: {0}")]
    Serialization(String),

    /// The requested record was not found.
    #[error("Record not found: {0}")]
    NotFound(String),
}

/// Errors that occur during ledger accounting.
#[derive(Error, Debug)]
pub enum CalculatorError {
    #[error("Insufficient balance for {asset}: requested {requested}, available {available}")]
    InsufficientBalance {
        asset: String,
        requested: Decimal,
        available: Decimal,
    },

    #[error("Position not found for asset {0}")]
    PositionNotFound(String),

    #[error("Invalid transaction data: {0}")]
    InvalidTransaction(String),

    #[error("Calculation failed: {0}")]
    Calculation(String),
}

/// Validation errors for transaction input and enum parsing.
#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("Failed to parse number: {0}")]
    NumberParse(#[from] ParseFloatError),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Required field '{0}' is missing")]
    MissingField(String),

    #[error("Failed to parse decimal number: {0}")]
    DecimalParse(#[from] rust_decimal::Error),

    #[error("Failed to parse date/time: {0}")]
    DateTimeParse(#[from] ChronoParseError),

    #[error("Unknown transaction kind: '{0}'")]
    UnknownKind(String),

    #[error("Unknown disposal method: '{0}'")]
    UnknownDisposalMethod(String),
}

// === From implementations for common error types ===

impl From<rust_decimal::Error> for Error {
    fn from(err: rust_decimal::Error) -> Self {
        Error::Validation(ValidationError::DecimalParse(err))
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Storage(StorageError::Io(err.to_string()))
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Storage(StorageError::Serialization(err.to_string()))
    }
}

impl From<csv::Error> for Error {
    fn from(err: csv::Error) -> Self {
        Error::Export(err.to_string())
    }
}

impl From<ChronoParseError> for Error {
    fn from(err: ChronoParseError) -> Self {
        Error::Validation(ValidationError::DateTimeParse(err))
    }
}

impl From<Error> for String {
    fn from(err: Error) -> Self {
        err.to_string()
    }
}
