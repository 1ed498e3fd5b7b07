//! Claimer configuration.

use alloy_primitives::U256;
use claimer_core::constants::{
    DEFAULT_MAX_FEE_PORTION_OF_PRIZE, DEFAULT_MAXIMUM_TIER_OFFSET, DEFAULT_TARGET_TIER_OFFSET,
    DEFAULT_TIME_TO_REACH_MAX_FEE, WAD_U256,
};
use claimer_core::error::{ClaimerError, ConfigError};
use claimer_core::u256_decimal;
use serde::{Deserialize, Serialize};

/// Immutable settings of a [`Claimer`](crate::Claimer).
///
/// Loaded from TOML by the CLI; amounts are decimal strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClaimerConfig {
    /// Seconds for the fee to climb from target to maximum when no claims land.
    pub time_to_reach_max_fee: u64,
    /// Wad fraction of a tier's prize the fee may take, in `[0, 1e18]`.
    #[serde(with = "u256_decimal")]
    pub max_fee_portion_of_prize: U256,
    pub fee_curve: FeeCurve,
}

impl Default for ClaimerConfig {
    fn default() -> Self {
        Self {
            time_to_reach_max_fee: DEFAULT_TIME_TO_REACH_MAX_FEE,
            max_fee_portion_of_prize: U256::from(DEFAULT_MAX_FEE_PORTION_OF_PRIZE),
            fee_curve: FeeCurve::TierDerived(ReferenceTiers::default()),
        }
    }
}

impl ClaimerConfig {
    /// A fixed curve from `minimum_fee` to `maximum_fee`.
    pub fn fixed(
        minimum_fee: U256,
        maximum_fee: U256,
        time_to_reach_max_fee: u64,
        max_fee_portion_of_prize: U256,
    ) -> Self {
        Self {
            time_to_reach_max_fee,
            max_fee_portion_of_prize,
            fee_curve: FeeCurve::Fixed {
                minimum_fee,
                maximum_fee,
            },
        }
    }

    /// A curve read from the ledger's reference tiers on every quote.
    pub fn tier_derived(
        reference_tiers: ReferenceTiers,
        time_to_reach_max_fee: u64,
        max_fee_portion_of_prize: U256,
    ) -> Self {
        Self {
            time_to_reach_max_fee,
            max_fee_portion_of_prize,
            fee_curve: FeeCurve::TierDerived(reference_tiers),
        }
    }

    /// Check every field invariant. Does not touch the ledger.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.time_to_reach_max_fee == 0 {
            return Err(ConfigError::ZeroTimeToReachMaxFee);
        }
        if self.max_fee_portion_of_prize > WAD_U256 {
            return Err(ConfigError::MaxFeePortionOutOfRange(
                self.max_fee_portion_of_prize,
            ));
        }
        match &self.fee_curve {
            FeeCurve::Fixed {
                minimum_fee,
                maximum_fee,
            } => {
                if minimum_fee.is_zero() {
                    return Err(ConfigError::ZeroMinimumFee);
                }
                if minimum_fee >= maximum_fee {
                    return Err(ConfigError::MinFeeNotBelowMaxFee {
                        min: *minimum_fee,
                        max: *maximum_fee,
                    });
                }
            }
            FeeCurve::TierDerived(tiers) => tiers.validate()?,
        }
        Ok(())
    }
}

/// Where the auction's target and maximum fee come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FeeCurve {
    /// Constant fees; the decay constant is calibrated once at construction.
    Fixed {
        #[serde(with = "u256_decimal")]
        minimum_fee: U256,
        #[serde(with = "u256_decimal")]
        maximum_fee: U256,
    },
    /// Fees follow the prize sizes of two reference tiers.
    TierDerived(ReferenceTiers),
}

/// Reference tiers, as offsets back from the ledger's tier count.
///
/// With `n` tiers the target fee is the prize of tier `n - target_offset`
/// and the maximum fee the prize of tier `n - maximum_offset`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct ReferenceTiers {
    pub target_offset: u8,
    pub maximum_offset: u8,
}

impl Default for ReferenceTiers {
    fn default() -> Self {
        Self {
            target_offset: DEFAULT_TARGET_TIER_OFFSET,
            maximum_offset: DEFAULT_MAXIMUM_TIER_OFFSET,
        }
    }
}

impl ReferenceTiers {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.target_offset == 0 || self.target_offset >= self.maximum_offset {
            return Err(ConfigError::InvalidReferenceTiers {
                target_offset: self.target_offset,
                maximum_offset: self.maximum_offset,
            });
        }
        Ok(())
    }

    /// Resolve to `(target_tier, maximum_tier)` for a ledger with
    /// `number_of_tiers` tiers.
    pub fn resolve(&self, number_of_tiers: u8) -> Result<(u8, u8), ClaimerError> {
        if number_of_tiers < self.maximum_offset {
            return Err(ClaimerError::ReferenceTier {
                number_of_tiers,
                offset: self.maximum_offset,
            });
        }
        Ok((
            number_of_tiers - self.target_offset,
            number_of_tiers - self.maximum_offset,
        ))
    }
}
