/// LEX Bounded Curve Math
///
/// Pure, stateless functions over a single concentrated-liquidity range
/// `[edge_low, edge_high]`. Every sqrt price is Q96 (`sqrt(P) * 2^96`) and every
/// reserve is a base-token amount.
///
/// Per unit of liquidity `L`, at sqrt price `P`, the two internal reserves are:
///
/// - leverage side (`Z`): `z / L = 1/P - 1/edge_high`, empty at `edge_high`
/// - debt side (`A`):     `a / L = P - edge_low`,      empty at `edge_low`
///
/// Rounding always favours the pool: amounts the pool receives round up,
/// amounts it pays out and liquidity it credits round down.
use crate::asset::AssetType;
use crate::constants::Q96;
use crate::errors::ErrorCode;
use crate::math::{
    div_rounding_u512, mul_div, mul_div_rounding, narrow_u512, Rounding,
};
use anchor_lang::prelude::*;
use primitive_types::U512;

/// Outcome of a single-range swap step.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SwapStep {
    /// Portion of the specified amount that fits inside the range.
    pub amount_specified_used: u128,
    /// Counter amount: paid out for exact-in, owed to the pool for exact-out.
    pub amount_calculated: u128,
    /// Sqrt price after the step, always inside `[edge_low, edge_high]`.
    pub next_sqrt_price: u128,
    /// True when the step stopped at an edge before using the full amount.
    pub limited_by_range: bool,
}

/// Outcome of burning liquidity against offered claim amounts.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RedeemResult {
    pub liquidity_out: u128,
    /// Leverage-side reserve released, rounded down.
    pub leverage_out: u128,
    /// Debt-side reserve released, rounded down.
    pub debt_out: u128,
    pub next_sqrt_price: u128,
}

// ---------- Validation -------------------------------------------------------

#[inline(always)]
pub fn validate_edges(edge_low: u128, edge_high: u128) -> Result<()> {
    require!(
        edge_low > 0 && edge_low < edge_high,
        ErrorCode::InvalidRange
    );
    Ok(())
}

#[inline(always)]
pub fn validate_sqrt_price(sqrt_price: u128, edge_low: u128, edge_high: u128) -> Result<()> {
    validate_edges(edge_low, edge_high)?;
    require!(
        (edge_low..=edge_high).contains(&sqrt_price),
        ErrorCode::InvalidRange
    );
    Ok(())
}

// ---------- Reserve deltas ---------------------------------------------------

/// Leverage-side reserve between two sqrt prices:
/// `L * (1/p_lo - 1/p_hi) = L * Q96 * (p_hi - p_lo) / (p_lo * p_hi)`.
#[inline(always)]
pub(crate) fn leverage_delta(
    liquidity: u128,
    p_lo: u128,
    p_hi: u128,
    rounding: Rounding,
) -> Result<u128> {
    require!(p_lo <= p_hi, ErrorCode::InvalidRange);
    if p_lo == p_hi || liquidity == 0 {
        return Ok(0);
    }
    require!(p_lo > 0, ErrorCode::InvalidRange);
    let num = U512::from(liquidity) * U512::from(Q96) * U512::from(p_hi - p_lo);
    let den = U512::from(p_lo) * U512::from(p_hi);
    narrow_u512(div_rounding_u512(num, den, rounding)?)
}

/// Debt-side reserve between two sqrt prices: `L * (p_hi - p_lo)`.
#[inline(always)]
pub(crate) fn debt_delta(
    liquidity: u128,
    p_lo: u128,
    p_hi: u128,
    rounding: Rounding,
) -> Result<u128> {
    require!(p_lo <= p_hi, ErrorCode::InvalidRange);
    mul_div_rounding(liquidity, p_hi - p_lo, Q96, rounding)
}

/// Reserve-to-liquidity ratio of `asset` at `sqrt_price`, in Q96.
pub(crate) fn x_vs_l(
    sqrt_price: u128,
    edge_low: u128,
    edge_high: u128,
    asset: AssetType,
    rounding: Rounding,
) -> Result<u128> {
    validate_sqrt_price(sqrt_price, edge_low, edge_high)?;
    match asset {
        AssetType::Leverage => leverage_delta(Q96, sqrt_price, edge_high, rounding),
        AssetType::Debt => debt_delta(Q96, edge_low, sqrt_price, rounding),
        AssetType::Base => {
            let leverage = leverage_delta(Q96, sqrt_price, edge_high, rounding)?;
            let debt = debt_delta(Q96, edge_low, sqrt_price, rounding)?;
            leverage
                .checked_add(debt)
                .ok_or_else(|| error!(ErrorCode::ArithmeticOverflow))
        }
    }
}

/// Returns the Q96 ratio of `asset`'s virtual reserve to liquidity at `sqrt_price`.
///
/// `Base` is the sum of the `Debt` and `Leverage` ratios. Rounded down.
pub fn get_x_vs_l(
    sqrt_price: u128,
    edge_low: u128,
    edge_high: u128,
    asset: AssetType,
) -> Result<u128> {
    x_vs_l(sqrt_price, edge_low, edge_high, asset, Rounding::Down)
}

// ---------- Liquidity <-> reserves ------------------------------------------

/// Positive root of `L²(pb - pa) - L(a + z·pa·pb) - z·a·pb = 0`, rounded down.
///
/// All terms are carried scaled by Q96 in 512-bit intermediates:
/// `L = (b + sqrt(b² + 4·z·a·(pb - pa)·pb)) / (2·(pb - pa))` with
/// `b = a·Q96 + z·pa·pb / Q96`.
pub(crate) fn solve_liquidity(
    edge_low: u128,
    edge_high: u128,
    leverage_amount: u128,
    debt_amount: u128,
) -> Result<u128> {
    validate_edges(edge_low, edge_high)?;
    if leverage_amount == 0 && debt_amount == 0 {
        return Ok(0);
    }
    let overflow = || error!(ErrorCode::ArithmeticOverflow);

    let q = U512::from(Q96);
    let z = U512::from(leverage_amount);
    let a = U512::from(debt_amount);
    let pa = U512::from(edge_low);
    let pb = U512::from(edge_high);
    let width = U512::from(edge_high - edge_low);

    let b = a
        .checked_mul(q)
        .ok_or_else(overflow)?
        .checked_add(z.checked_mul(pa * pb).ok_or_else(overflow)? / q)
        .ok_or_else(overflow)?;

    let four_zab = U512::from(4u8)
        .checked_mul(z)
        .and_then(|v| v.checked_mul(a))
        .and_then(|v| v.checked_mul(width))
        .and_then(|v| v.checked_mul(pb))
        .ok_or_else(overflow)?;
    let discriminant = b
        .checked_mul(b)
        .and_then(|v| v.checked_add(four_zab))
        .ok_or_else(overflow)?;

    let numerator = b
        .checked_add(discriminant.integer_sqrt())
        .ok_or_else(overflow)?;
    let denominator = width * U512::from(2u8);

    narrow_u512(div_rounding_u512(numerator, denominator, Rounding::Down)?)
}

/// Computes the liquidity represented by a deposit of both internal reserves.
///
/// Amounts produced by [`compute_mint`] are rounded up, so each non-empty side
/// may carry up to one unit more than the liquidity it was minted for. The
/// result is the smallest liquidity consistent with that rounding: one above
/// the exact root for the deposit with one unit held back per side, and never
/// above the exact root for the full deposit.
///
/// # Errors
/// * `ZeroLiquidity` - both amounts are zero, or the deposit is dust
/// * `InvalidRange` - edges are mis-ordered
/// * `ArithmeticOverflow` - amounts too large for the 512-bit solution
pub fn compute_liquidity(
    edge_low: u128,
    edge_high: u128,
    leverage_amount: u128,
    debt_amount: u128,
) -> Result<u128> {
    validate_edges(edge_low, edge_high)?;
    require!(
        leverage_amount > 0 || debt_amount > 0,
        ErrorCode::ZeroLiquidity
    );

    let covered = solve_liquidity(edge_low, edge_high, leverage_amount, debt_amount)?;
    let held_back = solve_liquidity(
        edge_low,
        edge_high,
        leverage_amount.saturating_sub(1),
        debt_amount.saturating_sub(1),
    )?;
    let liquidity = covered.min(held_back.saturating_add(1));
    require!(liquidity > 0, ErrorCode::ZeroLiquidity);

    Ok(liquidity)
}

/// Recovers the sqrt price implied by two reserve balances and their liquidity.
///
/// The side with the larger linear term drives the solution, which keeps
/// precision where that side's reserve dominates. The result is clamped into
/// the edges.
pub fn compute_sqrt_price(
    edge_low: u128,
    edge_high: u128,
    leverage_amount: u128,
    debt_amount: u128,
    liquidity: u128,
) -> Result<u128> {
    validate_edges(edge_low, edge_high)?;
    require!(liquidity > 0, ErrorCode::ZeroLiquidity);

    if debt_amount == 0 {
        return Ok(edge_low);
    }
    if leverage_amount == 0 {
        return Ok(edge_high);
    }

    let q = U512::from(Q96);
    let debt_term = U512::from(debt_amount) * q;
    let leverage_term =
        U512::from(leverage_amount) * U512::from(edge_low) * U512::from(edge_high) / q;

    let sqrt_price = if debt_term >= leverage_term {
        // P = pa + a / L
        let step = div_rounding_u512(debt_term, U512::from(liquidity), Rounding::Down)?;
        let price = U512::from(edge_low) + step;
        if price > U512::from(edge_high) {
            edge_high
        } else {
            price.low_u128()
        }
    } else {
        // 1/P = z / L + 1/pb  =>  P = L·pb·Q96 / (z·pb + L·Q96)
        let num = U512::from(liquidity) * U512::from(edge_high) * q;
        let den = U512::from(leverage_amount) * U512::from(edge_high) + U512::from(liquidity) * q;
        narrow_u512(div_rounding_u512(num, den, Rounding::Down)?)?
    };

    Ok(sqrt_price.clamp(edge_low, edge_high))
}

/// Reserve amounts required to mint `liquidity` at `sqrt_price`.
///
/// Returns `(leverage_amount, debt_amount)`, each rounded up.
pub fn compute_mint(
    sqrt_price: u128,
    edge_low: u128,
    edge_high: u128,
    liquidity: u128,
) -> Result<(u128, u128)> {
    validate_sqrt_price(sqrt_price, edge_low, edge_high)?;
    require!(liquidity > 0, ErrorCode::ZeroLiquidity);

    let leverage_amount = leverage_delta(liquidity, sqrt_price, edge_high, Rounding::Up)?;
    let debt_amount = debt_delta(liquidity, edge_low, sqrt_price, Rounding::Up)?;

    Ok((leverage_amount, debt_amount))
}

/// Burns the liquidity-equivalent of the offered claim amounts.
///
/// `leverage_in` and `debt_in` are upper bounds; only the proportional mixture
/// at `sqrt_price` is consumed. Liquidity is capped at `current_liquidity`.
/// The next price is re-derived from the remaining reserves.
pub fn compute_redeem(
    current_liquidity: u128,
    sqrt_price: u128,
    edge_low: u128,
    edge_high: u128,
    leverage_in: u128,
    debt_in: u128,
) -> Result<RedeemResult> {
    validate_sqrt_price(sqrt_price, edge_low, edge_high)?;
    require!(current_liquidity > 0, ErrorCode::ZeroLiquidity);

    let leverage_ratio = x_vs_l(sqrt_price, edge_low, edge_high, AssetType::Leverage, Rounding::Up)?;
    let debt_ratio = x_vs_l(sqrt_price, edge_low, edge_high, AssetType::Debt, Rounding::Up)?;

    // A side with a zero ratio places no constraint.
    let from_leverage = if leverage_ratio == 0 {
        u128::MAX
    } else {
        mul_div(leverage_in, Q96, leverage_ratio).unwrap_or(u128::MAX)
    };
    let from_debt = if debt_ratio == 0 {
        u128::MAX
    } else {
        mul_div(debt_in, Q96, debt_ratio).unwrap_or(u128::MAX)
    };

    let liquidity_out = from_leverage.min(from_debt).min(current_liquidity);
    require!(liquidity_out > 0, ErrorCode::ZeroLiquidity);

    let leverage_out = leverage_delta(liquidity_out, sqrt_price, edge_high, Rounding::Down)?;
    let debt_out = debt_delta(liquidity_out, edge_low, sqrt_price, Rounding::Down)?;

    let remaining_liquidity = current_liquidity - liquidity_out;
    let next_sqrt_price = if remaining_liquidity == 0 {
        sqrt_price
    } else {
        let leverage_total = leverage_delta(current_liquidity, sqrt_price, edge_high, Rounding::Down)?;
        let debt_total = debt_delta(current_liquidity, edge_low, sqrt_price, Rounding::Down)?;
        compute_sqrt_price(
            edge_low,
            edge_high,
            leverage_total.saturating_sub(leverage_out),
            debt_total.saturating_sub(debt_out),
            remaining_liquidity,
        )?
    };

    Ok(RedeemResult {
        liquidity_out,
        leverage_out,
        debt_out,
        next_sqrt_price,
    })
}

/// Loan-to-value implied by the position of `sqrt_price` inside the edges.
///
/// `(edge_high - P) / (edge_high - edge_low)` in Q96: exactly `Q96` at
/// `edge_low`, zero at `edge_high`, non-increasing in between.
pub fn compute_ltv(edge_low: u128, edge_high: u128, sqrt_price: u128) -> Result<u128> {
    validate_sqrt_price(sqrt_price, edge_low, edge_high)?;
    mul_div(edge_high - sqrt_price, Q96, edge_high - edge_low)
}

// ---------- Swaps ------------------------------------------------------------

/// `amount * Q96 / L`, or `None` when the step does not fit in `u128`.
///
/// `liquidity` is non-zero here, so overflow is the only failure.
#[inline(always)]
fn price_step(amount: u128, liquidity: u128, rounding: Rounding) -> Option<u128> {
    mul_div_rounding(amount, Q96, liquidity, rounding).ok()
}

/// Sqrt price after the leverage reserve changes by `amount`, rounded up.
///
/// `P' = L·Q96·P / (L·Q96 ± amount·P)`. `None` when removing `amount` would
/// take the price past infinity or out of `u128`.
fn next_price_from_leverage(
    liquidity: u128,
    sqrt_price: u128,
    amount: u128,
    add: bool,
) -> Result<Option<u128>> {
    let lq = U512::from(liquidity) * U512::from(Q96);
    let product = U512::from(amount) * U512::from(sqrt_price);
    let den = if add {
        lq + product
    } else if lq > product {
        lq - product
    } else {
        return Ok(None);
    };
    let next = div_rounding_u512(lq * U512::from(sqrt_price), den, Rounding::Up)?;
    Ok(narrow_u512(next).ok())
}

/// Solves a single-range swap of `amount_specified` of `asset_specified`.
///
/// For exact-in the specified asset is paid into the pool; for exact-out it is
/// taken out. Debt in (or leverage out) raises the price toward `edge_high`;
/// leverage in (or debt out) lowers it toward `edge_low`. When the unclamped
/// solution crosses an edge the step stops at that edge, reports only the
/// fillable portion and sets `limited_by_range`.
///
/// # Errors
/// * `UnsupportedAsset` - `asset_specified` is `Base`
/// * `ZeroLiquidity` - `liquidity` is zero
/// * `InvalidRange` - price outside the edges or edges mis-ordered
pub fn compute_swap(
    liquidity: u128,
    sqrt_price: u128,
    edge_low: u128,
    edge_high: u128,
    asset_specified: AssetType,
    amount_specified: u128,
    is_exact_in: bool,
) -> Result<SwapStep> {
    validate_sqrt_price(sqrt_price, edge_low, edge_high)?;
    require!(asset_specified != AssetType::Base, ErrorCode::UnsupportedAsset);
    require!(liquidity > 0, ErrorCode::ZeroLiquidity);

    if amount_specified == 0 {
        return Ok(SwapStep {
            amount_specified_used: 0,
            amount_calculated: 0,
            next_sqrt_price: sqrt_price,
            limited_by_range: false,
        });
    }

    let (next_sqrt_price, amount_specified_used, limited_by_range) =
        match (asset_specified, is_exact_in) {
            // Debt in: P' = P + amount / L
            (AssetType::Debt, true) => {
                let next = price_step(amount_specified, liquidity, Rounding::Down)
                    .and_then(|step| sqrt_price.checked_add(step))
                    .filter(|p| *p <= edge_high);
                match next {
                    Some(p) => (p, amount_specified, false),
                    None => (
                        edge_high,
                        debt_delta(liquidity, sqrt_price, edge_high, Rounding::Up)?,
                        true,
                    ),
                }
            }
            // Debt out: P' = P - amount / L
            (AssetType::Debt, false) => {
                let next = price_step(amount_specified, liquidity, Rounding::Up)
                    .and_then(|step| sqrt_price.checked_sub(step))
                    .filter(|p| *p >= edge_low);
                match next {
                    Some(p) => (p, amount_specified, false),
                    None => (
                        edge_low,
                        debt_delta(liquidity, edge_low, sqrt_price, Rounding::Down)?,
                        true,
                    ),
                }
            }
            (AssetType::Leverage, true) => {
                let next = next_price_from_leverage(liquidity, sqrt_price, amount_specified, true)?
                    .filter(|p| *p >= edge_low);
                match next {
                    Some(p) => (p, amount_specified, false),
                    None => (
                        edge_low,
                        leverage_delta(liquidity, edge_low, sqrt_price, Rounding::Up)?,
                        true,
                    ),
                }
            }
            (AssetType::Leverage, false) => {
                let next =
                    next_price_from_leverage(liquidity, sqrt_price, amount_specified, false)?
                        .filter(|p| *p <= edge_high);
                match next {
                    Some(p) => (p, amount_specified, false),
                    None => (
                        edge_high,
                        leverage_delta(liquidity, sqrt_price, edge_high, Rounding::Down)?,
                        true,
                    ),
                }
            }
            (AssetType::Base, _) => return err!(ErrorCode::UnsupportedAsset),
        };

    let amount_calculated = match (asset_specified, is_exact_in) {
        (AssetType::Debt, true) => {
            leverage_delta(liquidity, sqrt_price, next_sqrt_price, Rounding::Down)?
        }
        (AssetType::Debt, false) => {
            leverage_delta(liquidity, next_sqrt_price, sqrt_price, Rounding::Up)?
        }
        (AssetType::Leverage, true) => {
            debt_delta(liquidity, next_sqrt_price, sqrt_price, Rounding::Down)?
        }
        (AssetType::Leverage, false) => {
            debt_delta(liquidity, sqrt_price, next_sqrt_price, Rounding::Up)?
        }
        (AssetType::Base, _) => return err!(ErrorCode::UnsupportedAsset),
    };

    Ok(SwapStep {
        amount_specified_used: amount_specified_used.min(amount_specified),
        amount_calculated,
        next_sqrt_price,
        limited_by_range,
    })
}
