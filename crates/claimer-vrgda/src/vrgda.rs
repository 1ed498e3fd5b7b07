//! Linear VRGDA pricing.
//!
//! `price = target * e^(decay * (elapsed - (sold + 1) / rate))`
//!
//! Claims are expected at a constant `rate`. When the `(sold + 1)`-th claim
//! is late the exponent is positive and the price climbs above `target`;
//! when it is early the price drops below. Every value is 18-decimal fixed
//! point; times and counts enter as plain integers.

use alloy_primitives::{I256, U256};
use claimer_core::constants::WAD_U256;
use claimer_core::error::PricingError;
use claimer_core::traits::AuctionPricing;
use tracing::trace;

use crate::wad::{
    MAX_NATURAL_EXPONENT, MIN_NATURAL_EXPONENT, div_wad, exp_wad, ln_wad, mul_wad, to_signed,
    to_wad,
};

/// Decay constant for a per-second price growth ratio: `ln(price_delta_scale)`.
///
/// `price_delta_scale` is a wad; `1.1e18` means the price grows 10% for
/// every second claims fall behind schedule.
pub fn decay_constant(price_delta_scale: U256) -> Result<I256, PricingError> {
    let scale = to_signed(price_delta_scale).ok_or(PricingError::Overflow)?;
    ln_wad(scale)
}

/// Claims per second needed to process `count` claims in `duration_secs`.
pub fn per_time_unit(count: u64, duration_secs: u64) -> Result<I256, PricingError> {
    if duration_secs == 0 {
        return Err(PricingError::ZeroDuration);
    }
    Ok(I256::from_raw(
        U256::from(count) * WAD_U256 / U256::from(duration_secs),
    ))
}

/// VRGDA price of the next claim after `sold` claims, `elapsed_secs` into
/// the schedule.
///
/// Never wraps. Overflow saturates:
/// - exponent overflow toward `+inf`, or above the `exp` domain: `U256::MAX`
/// - exponent overflow toward `-inf`, or below the `exp` domain: `0`
/// - `target_price * exp` overflow: `U256::MAX`
pub fn price(
    target_price: U256,
    elapsed_secs: u64,
    sold: u64,
    per_time_unit: I256,
    decay_constant: I256,
) -> Result<U256, PricingError> {
    if per_time_unit <= I256::ZERO {
        return Err(PricingError::NonPositiveRate(per_time_unit));
    }

    let target_time =
        div_wad(to_wad(u128::from(sold) + 1), per_time_unit).ok_or(PricingError::Overflow)?;
    let time_delta = to_wad(u128::from(elapsed_secs))
        .checked_sub(target_time)
        .ok_or(PricingError::Overflow)?;

    let exponent = match mul_wad(decay_constant, time_delta) {
        Some(exponent) => exponent,
        None if decay_constant.is_negative() == time_delta.is_negative() => {
            return Ok(U256::MAX);
        }
        None => return Ok(U256::ZERO),
    };

    if exponent > *MAX_NATURAL_EXPONENT {
        return Ok(U256::MAX);
    }
    if exponent < *MIN_NATURAL_EXPONENT {
        return Ok(U256::ZERO);
    }

    let growth = exp_wad(exponent)?.into_raw();
    if growth.is_zero() {
        return Ok(U256::ZERO);
    }

    Ok(target_price
        .checked_mul(growth)
        .map_or(U256::MAX, |scaled| scaled / WAD_U256))
}

/// Per-second price delta scale growing `min_price` to `max_price` over
/// `time_secs`: `e^(ln(max / min) / time)`.
///
/// Feeding the result through [`decay_constant`] gives a curve that reaches
/// `max_price` once claims are `time_secs` behind schedule.
pub fn maximum_price_delta_scale(
    min_price: U256,
    max_price: U256,
    time_secs: u64,
) -> Result<U256, PricingError> {
    if min_price.is_zero() {
        return Err(PricingError::ZeroMinimum);
    }
    if time_secs == 0 {
        return Err(PricingError::ZeroDuration);
    }

    let ratio = max_price
        .checked_mul(WAD_U256)
        .ok_or(PricingError::Overflow)?
        / min_price;
    let ln_ratio = ln_wad(to_signed(ratio).ok_or(PricingError::Overflow)?)?;
    let per_second = ln_ratio / I256::from_raw(U256::from(time_secs));
    let scale = exp_wad(per_second)?.into_raw();
    trace!(%min_price, %max_price, time_secs, %scale, "calibrated price delta scale");

    Ok(scale)
}

/// The production pricing engine.
///
/// Implements [`AuctionPricing`] with the linear VRGDA functions of this
/// module.
#[derive(Debug, Clone, Default)]
pub struct VrgdaEngine;

impl VrgdaEngine {
    pub fn new() -> Self {
        Self
    }
}

impl AuctionPricing for VrgdaEngine {
    fn decay_constant(&self, price_delta_scale: U256) -> Result<I256, PricingError> {
        decay_constant(price_delta_scale)
    }

    fn per_time_unit(&self, count: u64, duration_secs: u64) -> Result<I256, PricingError> {
        per_time_unit(count, duration_secs)
    }

    fn price(
        &self,
        target_price: U256,
        elapsed_secs: u64,
        sold: u64,
        per_time_unit: I256,
        decay_constant: I256,
    ) -> Result<U256, PricingError> {
        price(
            target_price,
            elapsed_secs,
            sold,
            per_time_unit,
            decay_constant,
        )
    }

    fn maximum_price_delta_scale(
        &self,
        min_price: U256,
        max_price: U256,
        time_secs: u64,
    ) -> Result<U256, PricingError> {
        maximum_price_delta_scale(min_price, max_price, time_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wad::one;
    use proptest::prelude::*;

    /// 0.0001 in wad.
    const TARGET: u64 = 100_000_000_000_000;

    fn wad_u256(v: u64) -> U256 {
        U256::from(v) * WAD_U256
    }

    fn scale_1_1() -> U256 {
        U256::from(1_100_000_000_000_000_000u64)
    }

    fn one_per_second() -> I256 {
        per_time_unit(1, 1).unwrap()
    }

    fn assert_close(actual: U256, expected: u64, tolerance: u64) {
        let expected = U256::from(expected);
        let diff = if actual > expected {
            actual - expected
        } else {
            expected - actual
        };
        assert!(
            diff <= U256::from(tolerance),
            "{actual} not within {tolerance} of {expected}"
        );
    }

    // --- decay_constant ---

    #[test]
    fn decay_constant_of_one_is_zero() {
        assert_eq!(decay_constant(WAD_U256).unwrap(), I256::ZERO);
    }

    #[test]
    fn decay_constant_of_1_1() {
        // ln(1.1) = 0.0953101798043248600439...
        let k = decay_constant(scale_1_1()).unwrap();
        let expected = I256::from_dec_str("95310179804324860").unwrap();
        assert!((k - expected).unsigned_abs() <= U256::from(2u64), "k = {k}");
    }

    #[test]
    fn decay_constant_below_one_is_negative() {
        let k = decay_constant(U256::from(900_000_000_000_000_000u64)).unwrap();
        assert!(k.is_negative());
    }

    #[test]
    fn decay_constant_rejects_zero_and_huge() {
        assert_eq!(
            decay_constant(U256::ZERO),
            Err(PricingError::NonPositiveLn(I256::ZERO))
        );
        assert_eq!(decay_constant(U256::MAX), Err(PricingError::Overflow));
    }

    // --- per_time_unit ---

    #[test]
    fn per_time_unit_divides() {
        assert_eq!(per_time_unit(1, 1).unwrap(), one());
        assert_eq!(
            per_time_unit(10, 4).unwrap(),
            I256::from_dec_str("2500000000000000000").unwrap()
        );
        assert_eq!(
            per_time_unit(1, 3).unwrap(),
            I256::from_dec_str("333333333333333333").unwrap()
        );
    }

    #[test]
    fn per_time_unit_rejects_zero_duration() {
        assert_eq!(per_time_unit(5, 0), Err(PricingError::ZeroDuration));
    }

    #[test]
    fn per_time_unit_zero_count() {
        assert_eq!(per_time_unit(0, 60).unwrap(), I256::ZERO);
    }

    // --- price: concrete scenario ---

    #[test]
    fn price_on_schedule_is_target() {
        let k = decay_constant(scale_1_1()).unwrap();
        let p = price(U256::from(TARGET), 1, 0, one_per_second(), k).unwrap();
        assert_eq!(p, U256::from(TARGET));
    }

    #[test]
    fn price_one_second_ahead() {
        // 0.0001 / 1.1 = 0.0000909090909090909...
        let k = decay_constant(scale_1_1()).unwrap();
        let p = price(U256::from(TARGET), 0, 0, one_per_second(), k).unwrap();
        assert_close(p, 90_909_090_909_090, 2);
    }

    #[test]
    fn price_one_second_behind() {
        // 0.0001 * 1.1 = 0.00011
        let k = decay_constant(scale_1_1()).unwrap();
        let p = price(U256::from(TARGET), 2, 0, one_per_second(), k).unwrap();
        assert_close(p, 110_000_000_000_000, 2);
    }

    #[test]
    fn second_sale_on_same_clock_is_one_ahead() {
        let k = decay_constant(scale_1_1()).unwrap();
        let second = price(U256::from(TARGET), 1, 1, one_per_second(), k).unwrap();
        let ahead = price(U256::from(TARGET), 0, 0, one_per_second(), k).unwrap();
        assert_eq!(second, ahead);
    }

    #[test]
    fn zero_decay_is_flat() {
        for elapsed in [0, 1, 1_000, 1_000_000] {
            let p = price(U256::from(TARGET), elapsed, 3, one_per_second(), I256::ZERO).unwrap();
            assert_eq!(p, U256::from(TARGET));
        }
    }

    #[test]
    fn price_rejects_non_positive_rate() {
        assert_eq!(
            price(U256::from(TARGET), 1, 0, I256::ZERO, one()),
            Err(PricingError::NonPositiveRate(I256::ZERO))
        );
        assert!(price(U256::from(TARGET), 1, 0, -one(), one()).is_err());
    }

    // --- price: saturation ---

    #[test]
    fn exponent_product_overflow_toward_positive_saturates_high() {
        let p = price(U256::from(TARGET), u64::MAX, 0, one_per_second(), I256::MAX).unwrap();
        assert_eq!(p, U256::MAX);
    }

    #[test]
    fn exponent_product_overflow_toward_negative_saturates_zero() {
        let p = price(U256::from(TARGET), 0, u64::MAX, one_per_second(), I256::MAX).unwrap();
        assert_eq!(p, U256::ZERO);
    }

    #[test]
    fn negative_decay_with_late_claims_saturates_zero() {
        let p = price(U256::from(TARGET), u64::MAX, 0, one_per_second(), I256::MIN).unwrap();
        assert_eq!(p, U256::ZERO);
    }

    #[test]
    fn exponent_above_exp_domain_saturates_high() {
        let k = decay_constant(scale_1_1()).unwrap();
        // ~953 in the exponent, far past 130.
        let p = price(U256::from(TARGET), 10_001, 0, one_per_second(), k).unwrap();
        assert_eq!(p, U256::MAX);
    }

    #[test]
    fn exponent_below_exp_domain_is_zero() {
        let k = decay_constant(scale_1_1()).unwrap();
        let p = price(U256::from(TARGET), 0, 10_000, one_per_second(), k).unwrap();
        assert_eq!(p, U256::ZERO);
    }

    #[test]
    fn tiny_growth_rounds_price_to_zero() {
        // exp(-41) is a single wei; any target below 1.0 prices to zero.
        let k = one();
        let p = price(U256::from(TARGET), 0, 40, one_per_second(), k).unwrap();
        assert_eq!(p, U256::ZERO);
    }

    #[test]
    fn final_multiply_overflow_saturates_high() {
        let p = price(U256::MAX / U256::from(2u64), 2, 0, one_per_second(), one()).unwrap();
        assert_eq!(p, U256::MAX);
    }

    #[test]
    fn huge_target_on_schedule_does_not_overflow() {
        let target = U256::MAX / WAD_U256;
        let p = price(target, 1, 0, one_per_second(), one()).unwrap();
        assert_eq!(p, target);
    }

    // --- maximum_price_delta_scale ---

    #[test]
    fn calibration_reaches_max_price() {
        let min = U256::from(TARGET);
        let max = U256::from(100_000_000_000_000_000u64);
        let time = 3_600;

        let scale = maximum_price_delta_scale(min, max, time).unwrap();
        let k = decay_constant(scale).unwrap();
        // A very fast schedule puts the first claim's target time near zero.
        let rate = per_time_unit(1_000_000, 1).unwrap();
        let p = price(min, time, 0, rate, k).unwrap();

        assert_close(p, 100_000_000_000_000_000, 100_000_000_000);
    }

    #[test]
    fn calibration_equal_prices_is_one() {
        let scale = maximum_price_delta_scale(U256::from(TARGET), U256::from(TARGET), 60).unwrap();
        assert_eq!(scale, WAD_U256);
    }

    #[test]
    fn calibration_rejects_bad_input() {
        assert_eq!(
            maximum_price_delta_scale(U256::ZERO, U256::from(1u64), 60),
            Err(PricingError::ZeroMinimum)
        );
        assert_eq!(
            maximum_price_delta_scale(U256::from(1u64), U256::from(2u64), 0),
            Err(PricingError::ZeroDuration)
        );
        assert_eq!(
            maximum_price_delta_scale(U256::from(1u64), U256::MAX, 60),
            Err(PricingError::Overflow)
        );
    }

    #[test]
    fn calibration_over_one_second_is_ratio() {
        let scale =
            maximum_price_delta_scale(wad_u256(1), U256::from(1_100_000_000_000_000_000u64), 1)
                .unwrap();
        let diff = if scale > scale_1_1() {
            scale - scale_1_1()
        } else {
            scale_1_1() - scale
        };
        assert!(diff <= U256::from(100u64), "scale = {scale}");
    }

    // --- engine ---

    #[test]
    fn engine_matches_free_functions() {
        let e = VrgdaEngine::new();
        let k = e.decay_constant(scale_1_1()).unwrap();
        assert_eq!(k, decay_constant(scale_1_1()).unwrap());
        let rate = e.per_time_unit(1, 1).unwrap();
        assert_eq!(
            e.price(U256::from(TARGET), 2, 0, rate, k).unwrap(),
            price(U256::from(TARGET), 2, 0, rate, k).unwrap()
        );
    }

    #[test]
    fn engine_is_object_safe() {
        let e = VrgdaEngine::new();
        let dyn_e: &dyn AuctionPricing = &e;
        assert_eq!(dyn_e.per_time_unit(2, 1).unwrap(), to_wad(2));
    }

    // --- proptest ---

    proptest! {
        #[test]
        fn decay_constant_positive_above_one(
            scale in 1_000_001_000_000_000_000u64..=u64::MAX,
        ) {
            let k = decay_constant(U256::from(scale)).unwrap();
            prop_assert!(k > I256::ZERO, "ln({}) = {}", scale, k);
        }

        #[test]
        fn price_non_decreasing_in_elapsed(
            a in 0u64..5_000,
            b in 0u64..5_000,
            sold in 0u64..1_000,
            target in 1u64..=u64::MAX,
        ) {
            let k = decay_constant(scale_1_1()).unwrap();
            let rate = per_time_unit(10, 1).unwrap();
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            let p_lo = price(U256::from(target), lo, sold, rate, k).unwrap();
            let p_hi = price(U256::from(target), hi, sold, rate, k).unwrap();
            prop_assert!(p_lo <= p_hi, "p({}) = {} > p({}) = {}", lo, p_lo, hi, p_hi);
        }

        #[test]
        fn price_non_increasing_in_sold(
            elapsed in 0u64..5_000,
            a in 0u64..50_000,
            b in 0u64..50_000,
            target in 1u64..=u64::MAX,
        ) {
            let k = decay_constant(scale_1_1()).unwrap();
            let rate = per_time_unit(10, 1).unwrap();
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            let p_lo = price(U256::from(target), elapsed, lo, rate, k).unwrap();
            let p_hi = price(U256::from(target), elapsed, hi, rate, k).unwrap();
            prop_assert!(p_lo >= p_hi, "sold {} -> {}, sold {} -> {}", lo, p_lo, hi, p_hi);
        }

        #[test]
        fn on_schedule_price_is_target(
            sold in 0u64..100_000,
            target in 1u64..=u64::MAX,
        ) {
            // One claim per second: the (sold + 1)-th claim is due at sold + 1.
            let k = decay_constant(scale_1_1()).unwrap();
            let p = price(U256::from(target), sold + 1, sold, one_per_second(), k).unwrap();
            prop_assert_eq!(p, U256::from(target));
        }

        #[test]
        fn price_never_panics(
            target in any::<u128>(),
            elapsed in any::<u64>(),
            sold in any::<u64>(),
            rate in 1u64..=u64::MAX,
            decay in any::<i64>(),
        ) {
            let magnitude = I256::from_raw(U256::from(decay.unsigned_abs()));
            let decay = if decay < 0 { -magnitude } else { magnitude };
            let rate = I256::from_raw(U256::from(rate));
            prop_assert!(price(U256::from(target), elapsed, sold, rate, decay).is_ok());
        }
    }
}
