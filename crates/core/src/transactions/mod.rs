mod matcher;
mod transactions_constants;
mod transactions_model;


pub use matcher::{
    AmbiguousConversionGroup, ConversionMatches, ConversionPair, MatcherConfig,
    TransactionMatcher, TransferMatches,
};
pub use transactions_constants::*;
pub use transactions_model::{
    compute_fingerprint, NewTransaction, ProcessingOutcome, RawTransaction, TransactionKind,
};
