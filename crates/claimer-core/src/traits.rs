//! Trait interfaces for the prize claimer.
//!
//! These traits define the contracts between crates and collaborators:
//! - [`PrizeLedger`]: read-only draw and tier state (external, or [`MemoryLedger`](crate::memory::MemoryLedger))
//! - [`ClaimableVault`]: per-prize payout (external, or [`MemoryVault`](crate::memory::MemoryVault))
//! - [`AuctionPricing`]: VRGDA fee curve (claimer-vrgda implements)

use alloy_primitives::{Address, I256, U256};

use crate::constants::CANARY_TIER_COUNT;
use crate::error::{LedgerError, PricingError, VaultError};

/// Read-only view of the reward ledger.
///
/// Every batch reads these values fresh; nothing is cached across calls.
pub trait PrizeLedger: Send + Sync {
    /// Identity of the ledger. Must be non-zero for a claimer to accept it.
    fn address(&self) -> Address;

    /// Id of the most recently awarded draw.
    fn last_awarded_draw_id(&self) -> Result<u32, LedgerError>;

    /// Unix timestamp (seconds) at which the last draw was awarded.
    fn last_awarded_draw_awarded_at(&self) -> Result<u64, LedgerError>;

    /// Prizes already claimed for the current draw.
    fn claim_count(&self) -> Result<u64, LedgerError>;

    /// Estimated number of claimable prizes for the draw, canaries included.
    fn estimated_prize_count(&self) -> Result<u64, LedgerError>;

    /// Number of tiers, canaries included.
    fn number_of_tiers(&self) -> Result<u8, LedgerError>;

    /// Size of a single prize in `tier`.
    fn tier_prize_size(&self, tier: u8) -> Result<U256, LedgerError>;

    /// Whether `tier` pays its whole prize to the claimer.
    ///
    /// Default implementation: the last [`CANARY_TIER_COUNT`] tiers.
    fn is_canary_tier(&self, tier: u8) -> Result<bool, LedgerError> {
        let tiers = self.number_of_tiers()?;
        Ok(tier >= tiers.saturating_sub(CANARY_TIER_COUNT) && tier < tiers)
    }
}

/// A vault able to pay out one prize on behalf of a winner.
pub trait ClaimableVault: Send + Sync {
    fn address(&self) -> Address;

    /// Claim one prize, paying `fee` of it to `fee_recipient`.
    ///
    /// Returns the prize amount paid, or zero if the prize was already
    /// claimed. An `Err` concerns this prize only.
    fn claim_prize(
        &self,
        winner: Address,
        tier: u8,
        prize_index: u32,
        fee: U256,
        fee_recipient: Address,
    ) -> Result<U256, VaultError>;
}

/// Linear VRGDA fee curve in 18-decimal fixed point.
///
/// Implemented by the pricing engine (claimer-vrgda).
pub trait AuctionPricing: Send + Sync {
    /// `ln(price_delta_scale)`, the per-second log growth of the price.
    fn decay_constant(&self, price_delta_scale: U256) -> Result<I256, PricingError>;

    /// Target sale rate `count / duration_secs`.
    fn per_time_unit(&self, count: u64, duration_secs: u64) -> Result<I256, PricingError>;

    /// Price of the `(sold + 1)`-th unit `elapsed_secs` after the schedule
    /// started. Saturates to zero or `U256::MAX` instead of overflowing.
    fn price(
        &self,
        target_price: U256,
        elapsed_secs: u64,
        sold: u64,
        per_time_unit: I256,
        decay_constant: I256,
    ) -> Result<U256, PricingError>;

    /// Price delta scale that grows `min_price` into `max_price` over `time_secs`.
    fn maximum_price_delta_scale(
        &self,
        min_price: U256,
        max_price: U256,
        time_secs: u64,
    ) -> Result<U256, PricingError>;
}
