//! Batch claim orchestrator implementing the VRGDA fee policy.
//!
//! Reads live draw state from a [`PrizeLedger`], prices one uniform fee per
//! batch through an [`AuctionPricing`] curve, and drives a
//! [`ClaimableVault`] item by item. A failing item is recorded and skipped;
//! it never aborts the rest of the batch.

use std::fmt;
use std::sync::Arc;

use alloy_primitives::{I256, U256};
use claimer_core::constants::WAD_U256;
use claimer_core::error::{BatchError, ClaimerError, ConfigError};
use claimer_core::traits::{AuctionPricing, ClaimableVault, PrizeLedger};
use claimer_core::types::{BatchResult, ClaimFailure, ClaimRequest, FeeQuote};
use tracing::{debug, info, warn};

use crate::config::{ClaimerConfig, FeeCurve, ReferenceTiers};

/// Target fee and decay constant of the auction at one point in time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CurveParams {
    pub target_fee: U256,
    pub decay_constant: I256,
}

/// Fee curve resolved at construction.
#[derive(Debug, Clone, Copy)]
enum Curve {
    Fixed(CurveParams),
    TierDerived(ReferenceTiers),
}

/// The production claimer.
///
/// Holds no mutable state; every quote and batch reads the ledger fresh.
pub struct Claimer {
    ledger: Arc<dyn PrizeLedger>,
    pricing: Arc<dyn AuctionPricing>,
    config: ClaimerConfig,
    curve: Curve,
    clock: Box<dyn Fn() -> u64 + Send + Sync>,
}

impl fmt::Debug for Claimer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Claimer")
            .field("ledger", &self.ledger.address())
            .field("config", &self.config)
            .field("curve", &self.curve)
            .finish_non_exhaustive()
    }
}

impl Claimer {
    /// Create a claimer with the system clock.
    pub fn new(
        ledger: Arc<dyn PrizeLedger>,
        pricing: Arc<dyn AuctionPricing>,
        config: ClaimerConfig,
    ) -> Result<Self, ConfigError> {
        Self::with_clock(ledger, pricing, config, || {
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .unwrap_or_default()
                .as_secs()
        })
    }

    /// Create a claimer with a custom clock returning unix seconds.
    pub fn with_clock(
        ledger: Arc<dyn PrizeLedger>,
        pricing: Arc<dyn AuctionPricing>,
        config: ClaimerConfig,
        clock: impl Fn() -> u64 + Send + Sync + 'static,
    ) -> Result<Self, ConfigError> {
        if ledger.address().is_zero() {
            return Err(ConfigError::ZeroLedgerAddress);
        }
        config.validate()?;

        let curve = match config.fee_curve {
            FeeCurve::Fixed {
                minimum_fee,
                maximum_fee,
            } => {
                let decay_constant = pricing
                    .maximum_price_delta_scale(
                        minimum_fee,
                        maximum_fee,
                        config.time_to_reach_max_fee,
                    )
                    .and_then(|scale| pricing.decay_constant(scale))
                    .map_err(ConfigError::Calibration)?;
                debug!(%minimum_fee, %maximum_fee, %decay_constant, "calibrated fixed fee curve");
                Curve::Fixed(CurveParams {
                    target_fee: minimum_fee,
                    decay_constant,
                })
            }
            FeeCurve::TierDerived(tiers) => Curve::TierDerived(tiers),
        };

        Ok(Self {
            ledger,
            pricing,
            config,
            curve,
            clock: Box::new(clock),
        })
    }

    pub fn config(&self) -> &ClaimerConfig {
        &self.config
    }

    pub fn ledger(&self) -> &Arc<dyn PrizeLedger> {
        &self.ledger
    }

    /// Seconds since the last draw was awarded. Zero if the clock lags.
    pub fn elapsed(&self) -> Result<u64, ClaimerError> {
        let awarded_at = self.ledger.last_awarded_draw_awarded_at()?;
        Ok((self.clock)().saturating_sub(awarded_at))
    }

    /// Current target fee and decay constant.
    ///
    /// A tier-derived curve is flat (zero decay) unless
    /// `0 < target < maximum`.
    pub fn curve_params(&self) -> Result<CurveParams, ClaimerError> {
        let tiers = match self.curve {
            Curve::Fixed(params) => return Ok(params),
            Curve::TierDerived(tiers) => tiers,
        };

        let (target_tier, maximum_tier) = tiers.resolve(self.ledger.number_of_tiers()?)?;
        let target_fee = self.ledger.tier_prize_size(target_tier)?;
        let maximum_fee = self.ledger.tier_prize_size(maximum_tier)?;

        let decay_constant = if !target_fee.is_zero() && target_fee < maximum_fee {
            let scale = self.pricing.maximum_price_delta_scale(
                target_fee,
                maximum_fee,
                self.config.time_to_reach_max_fee,
            )?;
            self.pricing.decay_constant(scale)?
        } else {
            I256::ZERO
        };

        Ok(CurveParams {
            target_fee,
            decay_constant,
        })
    }

    /// Fee ceiling for `tier`: the full prize for a canary tier, otherwise
    /// `max_fee_portion_of_prize` of it.
    pub fn compute_max_fee(&self, tier: u8) -> Result<U256, ClaimerError> {
        if self.ledger.is_canary_tier(tier)? {
            return Ok(self.ledger.tier_prize_size(tier)?);
        }
        self.capped_max_fee(tier)
    }

    /// Fee per claim for `claim_count` claims on top of the ledger's current
    /// claim count.
    pub fn compute_fee_per_claim(&self, tier: u8, claim_count: u64) -> Result<U256, ClaimerError> {
        let claimed = self.ledger.claim_count()?;
        self.fee_per_claim(tier, claim_count, claimed)
    }

    /// Total fee earned by `claim_count` claims at the current claim count.
    pub fn compute_total_fees(&self, tier: u8, claim_count: u64) -> Result<U256, ClaimerError> {
        let claimed = self.ledger.claim_count()?;
        self.compute_total_fees_with_claimed(tier, claim_count, claimed)
    }

    /// Total fee earned by `claim_count` claims after `claimed_count`
    /// claims already landed this draw.
    pub fn compute_total_fees_with_claimed(
        &self,
        tier: u8,
        claim_count: u64,
        claimed_count: u64,
    ) -> Result<U256, ClaimerError> {
        let fee = self.fee_per_claim(tier, claim_count, claimed_count)?;
        Ok(fee.saturating_mul(U256::from(claim_count)))
    }

    /// Read-only quote for a batch of `claim_count` claims.
    pub fn quote(&self, tier: u8, claim_count: u64) -> Result<FeeQuote, ClaimerError> {
        let quote = FeeQuote {
            fee_per_claim: self.compute_fee_per_claim(tier, claim_count)?,
            max_fee: self.compute_max_fee(tier)?,
        };
        debug!(tier, claim_count, fee_per_claim = %quote.fee_per_claim, max_fee = %quote.max_fee, "quoted");
        Ok(quote)
    }

    /// Claim every prize in `request` through `vault`.
    ///
    /// Fails before any vault call on a malformed request, a zero fee
    /// recipient with a non-zero minimum, or a fee below the minimum. After
    /// that the batch always completes; vault errors land in
    /// [`BatchResult::failures`].
    pub fn claim_batch(
        &self,
        vault: &dyn ClaimableVault,
        request: &ClaimRequest,
    ) -> Result<BatchResult, ClaimerError> {
        request.validate()?;

        let fees_disabled = request.fee_recipient.is_zero();
        if fees_disabled && !request.min_fee_per_claim.is_zero() {
            return Err(BatchError::FeeRecipientZeroAddress {
                min_fee: request.min_fee_per_claim,
            }
            .into());
        }

        let fee_per_claim = if fees_disabled {
            U256::ZERO
        } else {
            let fee = self.compute_fee_per_claim(request.tier, request.claim_count())?;
            if fee < request.min_fee_per_claim {
                return Err(BatchError::FeeBelowMin {
                    min_fee: request.min_fee_per_claim,
                    fee,
                }
                .into());
            }
            fee
        };

        let vault_address = vault.address();
        let mut result = BatchResult {
            fee_per_claim,
            ..BatchResult::default()
        };

        for item in request.items() {
            match vault.claim_prize(
                item.winner,
                item.tier,
                item.prize_index,
                fee_per_claim,
                request.fee_recipient,
            ) {
                Ok(paid) if paid.is_zero() => {
                    debug!(%item, "prize already claimed");
                    result.already_claimed.push(item);
                }
                Ok(paid) => {
                    debug!(%item, %paid, "prize claimed");
                    result.claim_count = result.claim_count.saturating_add(1);
                }
                Err(reason) => {
                    warn!(
                        vault = %vault_address,
                        tier = item.tier,
                        winner = %item.winner,
                        prize_index = item.prize_index,
                        %reason,
                        "claim failed"
                    );
                    result.failures.push(ClaimFailure {
                        vault: vault_address,
                        item,
                        reason,
                    });
                }
            }
        }

        result.total_fees = fee_per_claim.saturating_mul(U256::from(result.claim_count));
        info!(
            vault = %vault_address,
            tier = request.tier,
            claimed = result.claim_count,
            already_claimed = result.already_claimed.len(),
            failed = result.failures.len(),
            total_fees = %result.total_fees,
            "batch complete"
        );
        Ok(result)
    }

    /// Averaged, capped VRGDA fee for claims `claimed_count..claimed_count + claim_count`.
    fn fee_per_claim(
        &self,
        tier: u8,
        claim_count: u64,
        claimed_count: u64,
    ) -> Result<U256, ClaimerError> {
        if claim_count == 0 {
            return Ok(U256::ZERO);
        }
        if self.ledger.is_canary_tier(tier)? {
            return Ok(self.ledger.tier_prize_size(tier)?);
        }

        let max_fee = self.capped_max_fee(tier)?;
        let curve = self.curve_params()?;
        let rate = self.pricing.per_time_unit(
            self.ledger.estimated_prize_count()?,
            self.config.time_to_reach_max_fee,
        )?;
        let elapsed = self.elapsed()?;

        let mut total = U256::ZERO;
        for i in 0..claim_count {
            let price = self.pricing.price(
                curve.target_fee,
                elapsed,
                claimed_count.saturating_add(i),
                rate,
                curve.decay_constant,
            )?;
            total = total.saturating_add(price.min(max_fee));
        }
        Ok(total / U256::from(claim_count))
    }

    /// `floor(max_fee_portion_of_prize * prize / 1e18)` without overflow.
    fn capped_max_fee(&self, tier: u8) -> Result<U256, ClaimerError> {
        let prize = self.ledger.tier_prize_size(tier)?;
        let portion = self.config.max_fee_portion_of_prize;
        // portion <= 1e18, so neither product can overflow.
        let whole = prize / WAD_U256 * portion;
        let rest = prize % WAD_U256 * portion / WAD_U256;
        Ok(whole + rest)
    }
}
