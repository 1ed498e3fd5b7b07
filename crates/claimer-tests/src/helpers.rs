//! Shared fixtures for the integration tests.

use std::sync::Arc;

use claimer_core::constants::WAD_U256;
use claimer_core::memory::{LedgerState, MemoryLedger, MemoryVault};
use claimer_core::types::{ClaimItem, ClaimRequest, WinnerPrizes};
use claimer_core::{Address, U256};
use claimer_engine::{Claimer, ClaimerConfig};
use claimer_vrgda::VrgdaEngine;

/// 0.0001 in wad: the target fee of the reference scenario.
pub const TARGET_FEE: u64 = 100_000_000_000_000;

/// 0.00011 in wad: one second of 1.1x growth above [`TARGET_FEE`].
pub const SCENARIO_MAX_FEE: u64 = 110_000_000_000_000;

/// Address from a seed byte.
pub fn addr(seed: u8) -> Address {
    Address::repeat_byte(seed)
}

pub fn wad(v: u64) -> U256 {
    U256::from(v) * WAD_U256
}

/// Half a wad, the default fee portion.
pub fn half() -> U256 {
    WAD_U256 / U256::from(2u64)
}

/// Four tiers of 1, 0.1, 0.01 and 0.001; the last two are canaries.
/// One prize expected, awarded at t = 0.
pub fn ledger_state() -> LedgerState {
    LedgerState {
        address: addr(0x11),
        last_awarded_draw_id: 1,
        last_awarded_draw_awarded_at: 0,
        claim_count: 0,
        estimated_prize_count: 1,
        tier_prize_sizes: vec![
            wad(1),
            U256::from(100_000_000_000_000_000u64),
            U256::from(10_000_000_000_000_000u64),
            U256::from(1_000_000_000_000_000u64),
        ],
    }
}

/// Target 0.0001 growing 1.1x per second behind schedule.
pub fn scenario_config() -> ClaimerConfig {
    ClaimerConfig::fixed(
        U256::from(TARGET_FEE),
        U256::from(SCENARIO_MAX_FEE),
        1,
        half(),
    )
}

/// A ledger, a vault over it and a claimer with a frozen clock.
pub struct World {
    pub ledger: Arc<MemoryLedger>,
    pub vault: Arc<MemoryVault>,
    pub claimer: Claimer,
}

impl World {
    pub fn new(state: LedgerState, config: ClaimerConfig, now: u64) -> Self {
        Self::with_vault(state, config, now, |vault| vault)
    }

    /// Like [`World::new`], letting the caller register winners and failures.
    pub fn with_vault(
        state: LedgerState,
        config: ClaimerConfig,
        now: u64,
        build: impl FnOnce(MemoryVault) -> MemoryVault,
    ) -> Self {
        let ledger = Arc::new(MemoryLedger::new(state));
        let vault = Arc::new(build(MemoryVault::new(addr(0xaa), Arc::clone(&ledger))));
        let claimer = Claimer::with_clock(
            ledger.clone(),
            Arc::new(VrgdaEngine::new()),
            config,
            move || now,
        )
        .expect("valid test config");
        Self {
            ledger,
            vault,
            claimer,
        }
    }
}

/// Every `(winner, tier, index)` in `request`.
pub fn items_of(request: &ClaimRequest) -> Vec<ClaimItem> {
    request.items().collect()
}

/// A request on `tier` for `winners`, one index list each.
pub fn request(
    tier: u8,
    winners: Vec<(u8, Vec<u32>)>,
    fee_recipient: Address,
    min_fee_per_claim: U256,
) -> ClaimRequest {
    let entries = winners
        .into_iter()
        .map(|(seed, prize_indices)| WinnerPrizes {
            winner: addr(seed),
            prize_indices,
        })
        .collect();
    ClaimRequest::from_winners(tier, entries, fee_recipient, min_fee_per_claim)
}
