//! Signed 18-decimal fixed-point `exp` and `ln` over 256-bit integers.
//!
//! All computation uses integer arithmetic only. `exp` decomposes its
//! argument into powers of two with precomputed `e^x` constants and finishes
//! with a Taylor series; `ln` runs the same decomposition in reverse and
//! finishes with the `atanh` series. Inputs close to `1.0` take a 36-decimal
//! path for extra precision.
//!
//! Valid `exp` arguments lie in `[-41, 130]`: below that the result rounds to
//! zero, above it the result no longer fits.

use std::sync::LazyLock;

use alloy_primitives::{I256, U256};
use claimer_core::constants::WAD;
use claimer_core::error::PricingError;

/// Largest argument accepted by [`exp_wad`] (130.0).
pub static MAX_NATURAL_EXPONENT: LazyLock<I256> = LazyLock::new(|| int(130 * WAD));

/// Smallest argument accepted by [`exp_wad`] (-41.0).
pub static MIN_NATURAL_EXPONENT: LazyLock<I256> = LazyLock::new(|| -int(41 * WAD));

/// `x_n` in 20 decimals for `n = 2..=11` (`2^5` down to `2^-4`).
const X20: [u128; 10] = [
    3_200_000_000_000_000_000_000,
    1_600_000_000_000_000_000_000,
    800_000_000_000_000_000_000,
    400_000_000_000_000_000_000,
    200_000_000_000_000_000_000,
    100_000_000_000_000_000_000,
    50_000_000_000_000_000_000,
    25_000_000_000_000_000_000,
    12_500_000_000_000_000_000,
    6_250_000_000_000_000_000,
];

/// `e^(x_n)` in 20 decimals, matching [`X20`].
const A20: [u128; 10] = [
    7_896_296_018_268_069_516_100_000_000_000_000,
    888_611_052_050_787_263_676_000_000,
    298_095_798_704_172_827_474_000,
    5_459_815_003_314_423_907_810,
    738_905_609_893_065_022_723,
    271_828_182_845_904_523_536,
    164_872_127_070_012_814_685,
    128_402_541_668_774_148_407,
    113_314_845_306_682_631_683,
    106_449_445_891_785_942_956,
];

/// Terms of [`X20`] used by `exp` (`x2..=x9`); `ln` uses all ten.
const EXP_TERMS: usize = 8;

struct Constants {
    one_18: I256,
    one_20: I256,
    one_36: I256,
    /// `2^7` and `2^6` in 18 decimals.
    x0: I256,
    x1: I256,
    /// `e^128` and `e^64` without decimals.
    a0: I256,
    a1: I256,
    ln_36_lower_bound: I256,
    ln_36_upper_bound: I256,
    x20: [I256; 10],
    a20: [I256; 10],
}

static C: LazyLock<Constants> = LazyLock::new(|| Constants {
    one_18: int(WAD),
    one_20: int(100 * WAD),
    one_36: int(WAD * WAD),
    x0: int(128 * WAD),
    x1: int(64 * WAD),
    a0: I256::from_raw(
        U256::from(388_770_840_599_459_509_222u128) * U256::from(10u128.pow(35)),
    ),
    a1: int(6_235_149_080_811_616_882_910_000_000),
    ln_36_lower_bound: int(WAD - WAD / 10),
    ln_36_upper_bound: int(WAD + WAD / 10),
    x20: X20.map(int),
    a20: A20.map(int),
});

fn int(v: u128) -> I256 {
    I256::from_raw(U256::from(v))
}

/// `1.0` in 18 decimals.
pub fn one() -> I256 {
    C.one_18
}

/// Integer `v` as a wad. Cannot overflow: `u128::MAX * 1e18 < 2^255`.
pub fn to_wad(v: u128) -> I256 {
    I256::from_raw(U256::from(v) * U256::from(WAD))
}

/// Unsigned amount as a signed value, if it fits.
pub fn to_signed(v: U256) -> Option<I256> {
    if v > I256::MAX.into_raw() {
        None
    } else {
        Some(I256::from_raw(v))
    }
}

/// `a * b / 1e18`, `None` on overflow.
pub fn mul_wad(a: I256, b: I256) -> Option<I256> {
    a.checked_mul(b)?.checked_div(C.one_18)
}

/// `a * 1e18 / b`, `None` on overflow or division by zero.
pub fn div_wad(a: I256, b: I256) -> Option<I256> {
    a.checked_mul(C.one_18)?.checked_div(b)
}

/// Natural exponential of a wad.
///
/// Errors outside `[MIN_NATURAL_EXPONENT, MAX_NATURAL_EXPONENT]`.
pub fn exp_wad(x: I256) -> Result<I256, PricingError> {
    if x < *MIN_NATURAL_EXPONENT || x > *MAX_NATURAL_EXPONENT {
        return Err(PricingError::ExponentOutOfBounds(x));
    }
    if x.is_negative() {
        // e^(-x) = 1 / e^x
        return Ok(C.one_36 / exp_wad(-x)?);
    }

    let mut x = x;
    let first_an = if x >= C.x0 {
        x -= C.x0;
        C.a0
    } else if x >= C.x1 {
        x -= C.x1;
        C.a1
    } else {
        I256::ONE
    };

    // Switch to 20 decimals for the remaining terms.
    x *= int(100);

    let mut product = C.one_20;
    for (xn, an) in C.x20.iter().zip(&C.a20).take(EXP_TERMS) {
        if x >= *xn {
            x -= *xn;
            product = product * *an / C.one_20;
        }
    }

    // x < 0.25 here; twelve Taylor terms are enough for 18 decimals.
    let mut series_sum = C.one_20 + x;
    let mut term = x;
    for i in 2..=12u128 {
        term = term * x / C.one_20 / int(i);
        series_sum += term;
    }

    Ok(product * series_sum / C.one_20 * first_an / int(100))
}

/// Natural logarithm of a positive wad.
pub fn ln_wad(a: I256) -> Result<I256, PricingError> {
    if a <= I256::ZERO {
        return Err(PricingError::NonPositiveLn(a));
    }
    if C.ln_36_lower_bound < a && a < C.ln_36_upper_bound {
        Ok(ln_36(a) / C.one_18)
    } else {
        Ok(ln_18(a))
    }
}

/// `ln(a)` in 18 decimals. `a` must be positive.
fn ln_18(a: I256) -> I256 {
    if a < C.one_18 {
        // ln(a) = -ln(1/a)
        return -ln_18(C.one_36 / a);
    }

    let mut a = a;
    let mut sum = I256::ZERO;
    if a >= C.a0 * C.one_18 {
        a /= C.a0;
        sum += C.x0;
    }
    if a >= C.a1 * C.one_18 {
        a /= C.a1;
        sum += C.x1;
    }

    sum *= int(100);
    a *= int(100);

    for (xn, an) in C.x20.iter().zip(&C.a20) {
        if a >= *an {
            a = a * C.one_20 / *an;
            sum += *xn;
        }
    }

    // ln(a) = 2 * atanh(z), z = (a - 1) / (a + 1)
    let z = (a - C.one_20) * C.one_20 / (a + C.one_20);
    let z_squared = z * z / C.one_20;

    let mut num = z;
    let mut series_sum = num;
    for i in (3..=11u128).step_by(2) {
        num = num * z_squared / C.one_20;
        series_sum += num / int(i);
    }
    series_sum *= int(2);

    (sum + series_sum) / int(100)
}

/// `ln(x)` in 36 decimals, for `x` close to `1.0`.
fn ln_36(x: I256) -> I256 {
    let x = x * C.one_18;

    let z = (x - C.one_36) * C.one_36 / (x + C.one_36);
    let z_squared = z * z / C.one_36;

    let mut num = z;
    let mut series_sum = num;
    for i in (3..=15u128).step_by(2) {
        num = num * z_squared / C.one_36;
        series_sum += num / int(i);
    }

    series_sum * int(2)
}
