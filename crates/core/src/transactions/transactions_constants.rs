//! Transaction kind wire strings.
//!
//! Each constant is the canonical string for one supported transaction kind,
//! as produced by the ingestion collaborator. [`TransactionKind`] maps these
//! to a closed enum; anything outside this set is a validation error.

/// Purchase of an asset with base currency. Increases quantity.
pub const TRANSACTION_KIND_BUY: &str = "Buy";

/// Disposal of an asset for base currency. Decreases quantity.
pub const TRANSACTION_KIND_SELL: &str = "Sell";

/// Incoming funds or assets from outside the tracked portfolio.
/// Base-currency deposits increase cash; asset deposits increase quantity.
pub const TRANSACTION_KIND_DEPOSIT: &str = "Deposit";

/// Outgoing funds or assets to an external destination.
/// Base-currency withdrawals decrease cash; asset withdrawals decrease quantity.
pub const TRANSACTION_KIND_WITHDRAWAL: &str = "Withdrawal";

/// On-chain transfer out of a tracked venue (self-custody or otherwise).
pub const TRANSACTION_KIND_SEND: &str = "Send";

/// On-chain transfer into a tracked venue.
pub const TRANSACTION_KIND_RECEIVE: &str = "Receive";

/// Source side of an asset-to-asset conversion. Decreases quantity.
pub const TRANSACTION_KIND_CONVERT_FROM: &str = "Convert (from)";

/// Destination side of an asset-to-asset conversion. Increases quantity.
pub const TRANSACTION_KIND_CONVERT_TO: &str = "Convert (to)";

/// Promotional or loyalty payout received as an asset.
pub const TRANSACTION_KIND_REWARD: &str = "Reward / Bonus";

/// Asset locked for staking. Custody movement only, no quantity effect.
pub const TRANSACTION_KIND_STAKING: &str = "Staking";

/// Asset released from staking. Custody movement only, no quantity effect.
pub const TRANSACTION_KIND_UNSTAKING: &str = "Unstaking";

/// Interest or yield received as an asset.
pub const TRANSACTION_KIND_INTEREST: &str = "Interest";

/// Unsolicited token distribution received as an asset.
pub const TRANSACTION_KIND_AIRDROP: &str = "Airdrop";
