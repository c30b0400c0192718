/// LEX Core Fixed-Point Primitives
///
/// Building blocks shared by the curve math and the market state calculator.
/// Every value here is an unsigned integer, either a plain token amount or a
/// Q96 fixed-point number (`value / 2^96`). Products are formed in 256- or
/// 512-bit intermediates and narrowed back to `u128` with an explicit overflow
/// check, so no function in this module can silently wrap.
use crate::constants::{DECAY_EXPONENT_BITS, MAX_DECAY_HALVINGS, Q96};
use crate::errors::ErrorCode;
use anchor_lang::prelude::*;
use primitive_types::{U256, U512};

/// Direction a division result is rounded in.
///
/// Amounts owed to the pool round `Up`; amounts paid out of the pool and
/// liquidity credited to depositors round `Down`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Rounding {
    Down,
    Up,
}

/// Narrows a 512-bit intermediate to `u128`.
#[inline(always)]
pub(crate) fn narrow_u512(x: U512) -> Result<u128> {
    if x > U512::from(u128::MAX) {
        return err!(ErrorCode::ArithmeticOverflow);
    }
    Ok(x.low_u128())
}

/// Divides two 512-bit values with the requested rounding.
#[inline(always)]
pub(crate) fn div_rounding_u512(num: U512, den: U512, rounding: Rounding) -> Result<U512> {
    if den.is_zero() {
        return err!(ErrorCode::DivisionByZero);
    }
    let q = num / den;
    match rounding {
        Rounding::Up if !(num % den).is_zero() => {
            q.checked_add(U512::one())
                .ok_or_else(|| error!(ErrorCode::ArithmeticOverflow))
        }
        _ => Ok(q),
    }
}

/// Computes `a * b / c` with a 256-bit intermediate, rounded down.
#[inline(always)]
pub fn mul_div(a: u128, b: u128, c: u128) -> Result<u128> {
    require!(c != 0, ErrorCode::DivisionByZero);
    let result = U256::from(a) * U256::from(b) / U256::from(c);
    if result > U256::from(u128::MAX) {
        return err!(ErrorCode::ArithmeticOverflow);
    }
    Ok(result.as_u128())
}

/// Computes `a * b / c` with a 256-bit intermediate, rounded up.
///
/// Only use this where an amount is owed to the pool so rounding never
/// under-charges the caller.
#[inline(always)]
pub fn mul_div_round_up(a: u128, b: u128, c: u128) -> Result<u128> {
    require!(c != 0, ErrorCode::DivisionByZero);
    let prod = U256::from(a) * U256::from(b);
    let div = U256::from(c);
    let (q, r) = (prod / div, prod % div);
    let res = if r.is_zero() { q } else { q + U256::one() };
    if res > U256::from(u128::MAX) {
        return err!(ErrorCode::ArithmeticOverflow);
    }
    Ok(res.as_u128())
}

/// `a * b / c` with explicit rounding.
#[inline(always)]
pub fn mul_div_rounding(a: u128, b: u128, c: u128, rounding: Rounding) -> Result<u128> {
    match rounding {
        Rounding::Down => mul_div(a, b, c),
        Rounding::Up => mul_div_round_up(a, b, c),
    }
}

/// Multiplies two Q96 numbers, rounded down.
#[inline(always)]
pub fn mul_q96(a: u128, b: u128) -> Result<u128> {
    mul_div(a, b, Q96)
}

/// Absolute difference and sign of `a - b`.
#[inline(always)]
pub(crate) fn signed_delta(a: u128, b: u128) -> (u128, bool) {
    if a >= b {
        (a - b, false)
    } else {
        (b - a, true)
    }
}

// ---------- Power-of-two decay ---------------------------------------------

/// `2^(-1/2^k)` in Q96 for k = 1..=32, indexed from k = 1.
///
/// Multiplying together the entries for every set bit of a fractional
/// exponent yields `2^(-fraction)`.
const NEG_POW2_FRACTION_Q96: [u128; 32] = [
    0xb504f333f9de6484597d89b3, // 2^(-1/2)
    0xd744fccad69d6af439a68bb9, // 2^(-1/4)
    0xeac0c6e7dd24392ed02d75b3, // 2^(-1/8)
    0xf5257d152486cc2c7b9d0c7a, // 2^(-1/16)
    0xfa83b2db722a033a7c25bb14, // 2^(-1/32)
    0xfd3e0c0cf486c174853f3a59, // 2^(-1/64)
    0xfe9e115c7b8f884badd25995, // 2^(-1/128)
    0xff4ecb59511ec8a5301ba217, // 2^(-1/256)
    0xffa756521c8daed19f3a1b48, // 2^(-1/512)
    0xffd3a751c0f7e10bd3b9f8ae, // 2^(-1/1024)
    0xffe9d2b2f7db2755ddf1d28a, // 2^(-1/2048)
    0xfff4e91bff1b8c3d88338e0e, // 2^(-1/4096)
    0xfffa747ea0040664238f92f7, // 2^(-1/8192)
    0xfffd3a3b7814eb53cd7629d7, // 2^(-1/16384)
    0xfffe9d1cc60ddab126de1aec, // 2^(-1/32768)
    0xffff4e8e25879bfa09ea2633, // 2^(-1/65536)
    0xffffa7470363f4515426d76c, // 2^(-1/2^17)
    0xffffd3a37dda03133bde87a8, // 2^(-1/2^18)
    0xffffe9d1bdf703aef21ea4dc, // 2^(-1/2^19)
    0xfffff4e8debe025e24128a3d, // 2^(-1/2^20)
    0xfffffa746f4fa1506788fbc8, // 2^(-1/2^21)
    0xfffffd3a37a3f8b07e7c4871, // 2^(-1/2^22)
    0xfffffe9d1bd1065a50971275, // 2^(-1/2^23)
    0xffffff4e8de845adac77243c, // 2^(-1/2^24)
    0xffffffa746f41376f74124cd, // 2^(-1/2^25)
    0xffffffd3a37a05e383e14c90, // 2^(-1/2^26)
    0xffffffe9d1bd01fbc400bf82, // 2^(-1/2^27)
    0xfffffff4e8de80c062846365, // 2^(-1/2^28)
    0xfffffffa746f4050d1633246, // 2^(-1/2^29)
    0xfffffffd3a37a02490b9d93d, // 2^(-1/2^30)
    0xfffffffe9d1bd011525efca4, // 2^(-1/2^31)
    0xffffffff4e8de8086bb00253, // 2^(-1/2^32)
];

/// Computes `2^(-x)` in Q96 for an exponent `x` given in Q64 fixed point.
///
/// The integer part of `x` is applied as an exact right shift and the top 32
/// fractional bits through `NEG_POW2_FRACTION_Q96`, so the result is exact
/// whenever `x` is a whole number. Exponents of `MAX_DECAY_HALVINGS` or more
/// return zero.
pub fn neg_pow2_q96(exponent_q64: u128) -> Result<u128> {
    let whole = exponent_q64 >> DECAY_EXPONENT_BITS;
    if whole >= MAX_DECAY_HALVINGS {
        return Ok(0);
    }
    let fraction = exponent_q64 & ((1u128 << DECAY_EXPONENT_BITS) - 1);

    let mut result = Q96;
    for (k, factor) in NEG_POW2_FRACTION_Q96.iter().enumerate() {
        // bit 63 of the fraction carries weight 1/2, bit 62 weight 1/4, ...
        if fraction & (1u128 << (DECAY_EXPONENT_BITS - 1 - k as u32)) != 0 {
            result = mul_q96(result, *factor)?;
        }
    }

    Ok(result >> whole)
}
