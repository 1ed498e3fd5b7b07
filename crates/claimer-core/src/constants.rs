//! Protocol constants. All fixed-point values carry 18 decimals ("wad").

use alloy_primitives::U256;

/// Decimal places of every fixed-point value.
pub const WAD_DECIMALS: u32 = 18;

/// `1.0` in wad units.
pub const WAD: u128 = 1_000_000_000_000_000_000;

/// `1.0` in wad units as a [`U256`].
pub const WAD_U256: U256 = U256::from_limbs([WAD as u64, 0, 0, 0]);

/// Number of canary tiers at the end of the ledger's tier list.
///
/// Canary tiers pay their whole prize to the claimer and bypass the auction.
pub const CANARY_TIER_COUNT: u8 = 2;

/// Default ramp time: six hours from target fee to maximum fee.
pub const DEFAULT_TIME_TO_REACH_MAX_FEE: u64 = 6 * 60 * 60;

/// Default fee ceiling: half of the prize being claimed.
pub const DEFAULT_MAX_FEE_PORTION_OF_PRIZE: u128 = WAD / 2;

/// Default target reference tier, counted back from the number of tiers.
///
/// `1` selects the last tier, the smallest canary prize.
pub const DEFAULT_TARGET_TIER_OFFSET: u8 = 1;

/// Default maximum reference tier, counted back from the number of tiers.
///
/// `3` selects the lowest normal tier, the one right before the canaries.
pub const DEFAULT_MAXIMUM_TIER_OFFSET: u8 = 3;
