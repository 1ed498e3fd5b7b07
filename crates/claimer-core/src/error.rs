//! Error types for the prize claimer.
use alloy_primitives::{I256, U256};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PricingError {
    #[error("ln undefined for non-positive input: {0}")] NonPositiveLn(I256),
    #[error("exponent out of bounds: {0}")] ExponentOutOfBounds(I256),
    #[error("zero duration")] ZeroDuration,
    #[error("zero minimum price")] ZeroMinimum,
    #[error("per-time-unit rate must be positive: {0}")] NonPositiveRate(I256),
    #[error("arithmetic overflow")] Overflow,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("ledger address is zero")] ZeroLedgerAddress,
    #[error("time to reach max fee is zero")] ZeroTimeToReachMaxFee,
    #[error("max fee portion of prize out of range: {0}")] MaxFeePortionOutOfRange(U256),
    #[error("minimum fee is zero")] ZeroMinimumFee,
    #[error("minimum fee {min} not below maximum fee {max}")] MinFeeNotBelowMaxFee { min: U256, max: U256 },
    #[error("invalid reference tiers: target offset {target_offset}, maximum offset {maximum_offset}")] InvalidReferenceTiers { target_offset: u8, maximum_offset: u8 },
    #[error("fee curve calibration: {0}")] Calibration(PricingError),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BatchError {
    #[error("winners ({winners}) and prize indices ({prize_indices}) length mismatch")] LengthMismatch { winners: usize, prize_indices: usize },
    #[error("fee recipient is zero address with minimum fee {min_fee}")] FeeRecipientZeroAddress { min_fee: U256 },
    #[error("fee per claim {fee} below minimum {min_fee}")] FeeBelowMin { min_fee: U256, fee: U256 },
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    #[error("tier {tier} out of range ({number_of_tiers} tiers)")] TierOutOfRange { tier: u8, number_of_tiers: u8 },
    #[error("ledger unavailable: {0}")] Unavailable(String),
}

/// Per-item failure reported by a vault. Never aborts a batch.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VaultError {
    #[error("did not win")] DidNotWin,
    #[error("fee {fee} exceeds prize {prize}")] FeeExceedsPrize { fee: U256, prize: U256 },
    #[error("reverted: {0}")] Reverted(String),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ClaimerError {
    #[error(transparent)] Config(#[from] ConfigError),
    #[error(transparent)] Batch(#[from] BatchError),
    #[error(transparent)] Ledger(#[from] LedgerError),
    #[error(transparent)] Pricing(#[from] PricingError),
    #[error("reference tier offset {offset} unavailable with {number_of_tiers} tiers")] ReferenceTier { number_of_tiers: u8, offset: u8 },
}
