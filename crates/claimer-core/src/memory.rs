//! In-memory ledger and vault.
//!
//! [`MemoryLedger`] and [`MemoryVault`] implement the collaborator traits
//! over plain data. They back the CLI simulator and the test suites; a
//! production deployment supplies its own ledger and vault.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use alloy_primitives::{Address, U256};
use parking_lot::{Mutex, RwLock};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{LedgerError, VaultError};
use crate::traits::{ClaimableVault, PrizeLedger};
use crate::types::ClaimItem;

/// Plain ledger state, as read from a snapshot file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerState {
    pub address: Address,
    pub last_awarded_draw_id: u32,
    /// Unix seconds.
    pub last_awarded_draw_awarded_at: u64,
    #[serde(default)]
    pub claim_count: u64,
    pub estimated_prize_count: u64,
    /// Prize size per tier, tier 0 first. The last two are canary tiers.
    #[serde(with = "crate::u256_decimal::vec")]
    pub tier_prize_sizes: Vec<U256>,
}

/// A [`PrizeLedger`] over a [`LedgerState`].
///
/// Thread-safe; the claim count advances as a [`MemoryVault`] pays prizes.
#[derive(Debug)]
pub struct MemoryLedger {
    state: RwLock<LedgerState>,
}

impl MemoryLedger {
    pub fn new(state: LedgerState) -> Self {
        Self {
            state: RwLock::new(state),
        }
    }

    /// Copy of the current state.
    pub fn state(&self) -> LedgerState {
        self.state.read().clone()
    }

    /// Start a new draw: reset the claim count and move the award time.
    pub fn award_draw(&self, draw_id: u32, awarded_at: u64) {
        let mut state = self.state.write();
        state.last_awarded_draw_id = draw_id;
        state.last_awarded_draw_awarded_at = awarded_at;
        state.claim_count = 0;
    }

    pub fn set_claim_count(&self, claim_count: u64) {
        self.state.write().claim_count = claim_count;
    }

    /// Count `n` more claimed prizes.
    pub fn record_claims(&self, n: u64) {
        let mut state = self.state.write();
        state.claim_count = state.claim_count.saturating_add(n);
    }
}

impl PrizeLedger for MemoryLedger {
    fn address(&self) -> Address {
        self.state.read().address
    }

    fn last_awarded_draw_id(&self) -> Result<u32, LedgerError> {
        Ok(self.state.read().last_awarded_draw_id)
    }

    fn last_awarded_draw_awarded_at(&self) -> Result<u64, LedgerError> {
        Ok(self.state.read().last_awarded_draw_awarded_at)
    }

    fn claim_count(&self) -> Result<u64, LedgerError> {
        Ok(self.state.read().claim_count)
    }

    fn estimated_prize_count(&self) -> Result<u64, LedgerError> {
        Ok(self.state.read().estimated_prize_count)
    }

    fn number_of_tiers(&self) -> Result<u8, LedgerError> {
        let tiers = self.state.read().tier_prize_sizes.len();
        u8::try_from(tiers).map_err(|_| LedgerError::Unavailable(format!("{tiers} tiers")))
    }

    fn tier_prize_size(&self, tier: u8) -> Result<U256, LedgerError> {
        let state = self.state.read();
        state
            .tier_prize_sizes
            .get(usize::from(tier))
            .copied()
            .ok_or(LedgerError::TierOutOfRange {
                tier,
                number_of_tiers: u8::try_from(state.tier_prize_sizes.len()).unwrap_or(u8::MAX),
            })
    }
}

/// One recorded call to [`MemoryVault::claim_prize`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VaultCall {
    pub item: ClaimItem,
    pub fee: U256,
    pub fee_recipient: Address,
}

#[derive(Debug, Default)]
struct VaultState {
    claimed: HashSet<ClaimItem>,
    calls: Vec<VaultCall>,
    fee_balances: HashMap<Address, U256>,
    winner_balances: HashMap<Address, U256>,
}

/// A [`ClaimableVault`] paying prizes from a [`MemoryLedger`]'s tier sizes.
///
/// Only registered winners can claim. Each prize pays once; later attempts
/// return zero. Every call is recorded for inspection.
#[derive(Debug)]
pub struct MemoryVault {
    address: Address,
    ledger: Arc<MemoryLedger>,
    winners: HashSet<ClaimItem>,
    forced_failures: HashMap<ClaimItem, VaultError>,
    state: Mutex<VaultState>,
}

impl MemoryVault {
    pub fn new(address: Address, ledger: Arc<MemoryLedger>) -> Self {
        Self {
            address,
            ledger,
            winners: HashSet::new(),
            forced_failures: HashMap::new(),
            state: Mutex::new(VaultState::default()),
        }
    }

    /// Register winning items.
    pub fn with_winners(mut self, winners: impl IntoIterator<Item = ClaimItem>) -> Self {
        self.winners.extend(winners);
        self
    }

    /// Make `item` fail with `reason` regardless of its winning status.
    pub fn with_failure(mut self, item: ClaimItem, reason: VaultError) -> Self {
        self.forced_failures.insert(item, reason);
        self
    }

    /// Mark `item` as already claimed elsewhere.
    pub fn mark_claimed(&self, item: ClaimItem) {
        self.state.lock().claimed.insert(item);
    }

    pub fn is_claimed(&self, item: &ClaimItem) -> bool {
        self.state.lock().claimed.contains(item)
    }

    pub fn calls(&self) -> Vec<VaultCall> {
        self.state.lock().calls.clone()
    }

    pub fn call_count(&self) -> usize {
        self.state.lock().calls.len()
    }

    /// Fees credited to `recipient` so far.
    pub fn fee_balance(&self, recipient: &Address) -> U256 {
        self.state
            .lock()
            .fee_balances
            .get(recipient)
            .copied()
            .unwrap_or_default()
    }

    /// Prize amounts (net of fees) credited to `winner` so far.
    pub fn winner_balance(&self, winner: &Address) -> U256 {
        self.state
            .lock()
            .winner_balances
            .get(winner)
            .copied()
            .unwrap_or_default()
    }
}

impl ClaimableVault for MemoryVault {
    fn address(&self) -> Address {
        self.address
    }

    fn claim_prize(
        &self,
        winner: Address,
        tier: u8,
        prize_index: u32,
        fee: U256,
        fee_recipient: Address,
    ) -> Result<U256, VaultError> {
        let item = ClaimItem::new(winner, tier, prize_index);
        let mut state = self.state.lock();
        state.calls.push(VaultCall {
            item,
            fee,
            fee_recipient,
        });

        if let Some(reason) = self.forced_failures.get(&item) {
            return Err(reason.clone());
        }
        if !self.winners.contains(&item) {
            return Err(VaultError::DidNotWin);
        }
        if state.claimed.contains(&item) {
            return Ok(U256::ZERO);
        }

        let prize = self
            .ledger
            .tier_prize_size(tier)
            .map_err(|e| VaultError::Reverted(e.to_string()))?;
        if fee > prize {
            return Err(VaultError::FeeExceedsPrize { fee, prize });
        }

        state.claimed.insert(item);
        let fee_balance = state.fee_balances.entry(fee_recipient).or_default();
        *fee_balance = fee_balance.saturating_add(fee);
        let winner_balance = state.winner_balances.entry(winner).or_default();
        *winner_balance = winner_balance.saturating_add(prize - fee);
        drop(state);

        self.ledger.record_claims(1);
        debug!(%winner, tier, prize_index, %prize, %fee, "prize paid");
        Ok(prize)
    }
}
