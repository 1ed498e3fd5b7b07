//! Claim batch types: items, requests, quotes and batch results.

use std::fmt;

use alloy_primitives::{Address, U256};
use serde::{Deserialize, Serialize};

use crate::error::{BatchError, VaultError};

/// One unit of reward eligible for a payout attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ClaimItem {
    pub winner: Address,
    pub tier: u8,
    pub prize_index: u32,
}

impl ClaimItem {
    pub fn new(winner: Address, tier: u8, prize_index: u32) -> Self {
        Self {
            winner,
            tier,
            prize_index,
        }
    }
}

impl fmt::Display for ClaimItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.winner, self.tier, self.prize_index)
    }
}

/// A winner together with the prize indices claimed for it in one batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WinnerPrizes {
    pub winner: Address,
    pub prize_indices: Vec<u32>,
}

/// Caller input for one batch claim.
///
/// `winners[i]` is paired with `prize_indices[i]`; the two lists must have
/// the same length. A zero `fee_recipient` with a zero `min_fee_per_claim`
/// opts the batch out of fees entirely.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaimRequest {
    pub tier: u8,
    pub winners: Vec<Address>,
    pub prize_indices: Vec<Vec<u32>>,
    pub fee_recipient: Address,
    #[serde(with = "crate::u256_decimal")]
    pub min_fee_per_claim: U256,
}

impl ClaimRequest {
    /// Build a request from per-winner entries. Always well-formed.
    pub fn from_winners(
        tier: u8,
        entries: Vec<WinnerPrizes>,
        fee_recipient: Address,
        min_fee_per_claim: U256,
    ) -> Self {
        let (winners, prize_indices) = entries
            .into_iter()
            .map(|entry| (entry.winner, entry.prize_indices))
            .unzip();
        Self {
            tier,
            winners,
            prize_indices,
            fee_recipient,
            min_fee_per_claim,
        }
    }

    /// Check that the parallel lists line up.
    pub fn validate(&self) -> Result<(), BatchError> {
        if self.winners.len() != self.prize_indices.len() {
            return Err(BatchError::LengthMismatch {
                winners: self.winners.len(),
                prize_indices: self.prize_indices.len(),
            });
        }
        Ok(())
    }

    /// Total number of prize indices across all winners.
    pub fn claim_count(&self) -> u64 {
        self.prize_indices.iter().map(|indices| indices.len() as u64).sum()
    }

    /// Flatten into claim items in submission order.
    ///
    /// Pairs are zipped, so a malformed request yields only the overlapping
    /// prefix; call [`validate`](Self::validate) first.
    pub fn items(&self) -> impl Iterator<Item = ClaimItem> + '_ {
        self.winners
            .iter()
            .zip(&self.prize_indices)
            .flat_map(move |(winner, indices)| {
                indices
                    .iter()
                    .map(move |&index| ClaimItem::new(*winner, self.tier, index))
            })
    }
}

/// Fee quote computed fresh from ledger state. Never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeQuote {
    #[serde(with = "crate::u256_decimal")]
    pub fee_per_claim: U256,
    #[serde(with = "crate::u256_decimal")]
    pub max_fee: U256,
}

/// Diagnostic record for one item the vault rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClaimFailure {
    pub vault: Address,
    pub item: ClaimItem,
    pub reason: VaultError,
}

impl fmt::Display for ClaimFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "vault {} item {}: {}", self.vault, self.item, self.reason)
    }
}

/// Outcome of one batch claim.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BatchResult {
    /// Items that paid out a non-zero prize.
    pub claim_count: u32,
    /// Uniform fee applied to every item of the batch.
    pub fee_per_claim: U256,
    /// `fee_per_claim * claim_count`.
    pub total_fees: U256,
    /// Items another claimer got to first.
    pub already_claimed: Vec<ClaimItem>,
    pub failures: Vec<ClaimFailure>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn addr(seed: u8) -> Address {
        Address::repeat_byte(seed)
    }

    fn request(winners: Vec<Address>, prize_indices: Vec<Vec<u32>>) -> ClaimRequest {
        ClaimRequest {
            tier: 1,
            winners,
            prize_indices,
            fee_recipient: addr(0xFE),
            min_fee_per_claim: U256::ZERO,
        }
    }

    #[test]
    fn validate_accepts_matching_lengths() {
        let req = request(vec![addr(1), addr(2)], vec![vec![0], vec![1, 2]]);
        assert!(req.validate().is_ok());
    }

    #[test]
    fn validate_rejects_mismatch() {
        let req = request(vec![addr(1), addr(2)], vec![vec![0]]);
        assert_eq!(
            req.validate(),
            Err(BatchError::LengthMismatch {
                winners: 2,
                prize_indices: 1
            })
        );
    }

    #[test]
    fn claim_count_sums_indices() {
        let req = request(
            vec![addr(1), addr(2), addr(3)],
            vec![vec![0, 1], vec![], vec![4, 5, 6]],
        );
        assert_eq!(req.claim_count(), 5);
    }

    #[test]
    fn items_preserve_order() {
        let req = request(vec![addr(1), addr(2)], vec![vec![3, 0], vec![7]]);
        let items: Vec<_> = req.items().collect();
        assert_eq!(
            items,
            vec![
                ClaimItem::new(addr(1), 1, 3),
                ClaimItem::new(addr(1), 1, 0),
                ClaimItem::new(addr(2), 1, 7),
            ]
        );
    }

    #[test]
    fn from_winners_builds_parallel_lists() {
        let req = ClaimRequest::from_winners(
            2,
            vec![
                WinnerPrizes {
                    winner: addr(1),
                    prize_indices: vec![0],
                },
                WinnerPrizes {
                    winner: addr(2),
                    prize_indices: vec![1, 2],
                },
            ],
            addr(9),
            U256::from(5u64),
        );
        assert_eq!(req.winners, vec![addr(1), addr(2)]);
        assert_eq!(req.prize_indices, vec![vec![0], vec![1, 2]]);
        assert!(req.validate().is_ok());
        assert_eq!(req.claim_count(), 3);
    }

    #[test]
    fn request_serde_uses_decimal_amounts() {
        let req = request(vec![addr(1)], vec![vec![0]]);
        let json = serde_json::to_string(&req).unwrap();
        assert!(json.contains("\"min_fee_per_claim\":\"0\""), "{json}");
        let back: ClaimRequest = serde_json::from_str(&json).unwrap();
        assert_eq!(back, req);
    }

    #[test]
    fn failure_display_names_item_and_reason() {
        let failure = ClaimFailure {
            vault: addr(0xAA),
            item: ClaimItem::new(addr(1), 0, 4),
            reason: VaultError::DidNotWin,
        };
        let text = failure.to_string();
        assert!(text.contains("did not win"), "{text}");
        assert!(text.contains(":0:4"), "{text}");
    }

    // --- proptest ---

    proptest! {
        #[test]
        fn items_match_claim_count(
            prize_indices in prop::collection::vec(prop::collection::vec(any::<u32>(), 0..8), 0..8),
        ) {
            let winners: Vec<_> = (0..prize_indices.len()).map(|i| addr(i as u8 + 1)).collect();
            let req = request(winners.clone(), prize_indices.clone());
            prop_assert!(req.validate().is_ok());

            let items: Vec<_> = req.items().collect();
            prop_assert_eq!(items.len() as u64, req.claim_count());

            let expected: Vec<_> = winners
                .iter()
                .zip(&prize_indices)
                .flat_map(|(w, indices)| indices.iter().map(move |&i| ClaimItem::new(*w, 1, i)))
                .collect();
            prop_assert_eq!(items, expected);
        }

        #[test]
        fn mismatched_lengths_never_validate(
            winners in 0usize..8,
            indices in 0usize..8,
        ) {
            prop_assume!(winners != indices);
            let req = request(
                (0..winners).map(|i| addr(i as u8 + 1)).collect(),
                vec![vec![0]; indices],
            );
            prop_assert!(req.validate().is_err());
        }
    }
}
