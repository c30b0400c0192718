/// LEX Market State Calculator
///
/// Turns (market config, engine config, persisted state, live supply, time)
/// into a fully derived `LexFullState`. Nothing here writes state: the
/// converged debt notional price is returned for the orchestrator to commit.
use crate::asset::AssetType;
use crate::constants::{BPS_DENOMINATOR, DECAY_EXPONENT_BITS, MAX_DECAY_HALVINGS, PAR_SQRT_PRICE, Q96};
use crate::curve_math::{
    compute_ltv, compute_sqrt_price, get_x_vs_l, solve_liquidity, validate_sqrt_price,
};
use crate::errors::ErrorCode;
use crate::math::{mul_div, mul_q96, neg_pow2_q96, signed_delta};
use crate::state::{BaseSupply, EngineConfig, LexFullState, LexMarketState, MarketConfig};
use anchor_lang::prelude::*;

/// Derives the current snapshot of a market.
///
/// The sqrt price and liquidity are re-derived from `supply`; an empty market
/// keeps its last committed price with zero liquidity. The debt notional
/// price is advanced from its committed value toward the current target by
/// the time elapsed since the last update.
///
/// # Parameters
/// * `strict_mode` - fail instead of flagging when the price has reached a soft limit
///
/// # Errors
/// * `ErrorCode::InvalidTimestamp` - `now` precedes the last update
/// * `ErrorCode::UnderCollateralized` - strict mode and the price is at or past a limit
/// * `ErrorCode::ArithmeticOverflow` - supply too large for the curve domain
pub fn calculate_market_state(
    market_config: &MarketConfig,
    engine: &EngineConfig,
    state: &LexMarketState,
    supply: BaseSupply,
    now: i64,
    strict_mode: bool,
) -> Result<LexFullState> {
    let elapsed = state.elapsed_since_update(now)?;

    let (sqrt_price, liquidity) = derive_curve(engine, state, supply)?;
    validate_sqrt_price(sqrt_price, engine.edge_low, engine.edge_high)?;

    let under_collateralized = engine.is_under_collateralized(sqrt_price);
    if strict_mode && under_collateralized {
        msg!(
            "Strict mode rejected: sqrt price {} at or above limit {}",
            sqrt_price,
            engine.lim_high
        );
        return err!(ErrorCode::UnderCollateralized);
    }

    let ltv = compute_ltv(engine.edge_low, engine.edge_high, sqrt_price)?;
    let debt_price_discount = capped_debt_discount(engine, sqrt_price)?;
    let target = mul_q96(PAR_SQRT_PRICE, debt_price_discount)?;
    let debt_notional_price = converge_debt_notional_price(
        state.last_debt_notional_price,
        target,
        elapsed,
        market_config,
    )?;

    let debt_value = mul_div(supply.debt, debt_notional_price, Q96)?;
    let leverage_value = supply.total()?.saturating_sub(debt_value);

    Ok(LexFullState {
        sqrt_price,
        liquidity,
        ltv,
        under_collateralized,
        debt_price_discount,
        debt_notional_price,
        debt_value,
        leverage_value,
        supply,
        timestamp: now,
    })
}

/// Sqrt price and liquidity implied by the live supply.
fn derive_curve(
    engine: &EngineConfig,
    state: &LexMarketState,
    supply: BaseSupply,
) -> Result<(u128, u128)> {
    if supply.is_empty() {
        return Ok((state.last_sqrt_price, 0));
    }
    let liquidity = solve_liquidity(
        engine.edge_low,
        engine.edge_high,
        supply.leverage,
        supply.debt,
    )?;
    // Dust balances carry no liquidity; the committed price stands.
    if liquidity == 0 {
        return Ok((state.last_sqrt_price, 0));
    }
    let sqrt_price = compute_sqrt_price(
        engine.edge_low,
        engine.edge_high,
        supply.leverage,
        supply.debt,
        liquidity,
    )?;
    Ok((sqrt_price, liquidity))
}

/// Ratio of the debt reserve per unit liquidity at `target_price` to the
/// same ratio at `current_price`, in Q96.
///
/// `target_price` is clamped into the edges first. Exactly `Q96` when both
/// prices coincide; below `Q96` once the current price rises past the target.
///
/// # Errors
/// * `ErrorCode::ZeroLiquidity` - the debt side is empty at `current_price` (i.e. `edge_low`)
pub fn get_debt_price_discount(
    edge_low: u128,
    edge_high: u128,
    current_price: u128,
    target_price: u128,
) -> Result<u128> {
    let reference = target_price.clamp(edge_low, edge_high);
    let numerator = get_x_vs_l(reference, edge_low, edge_high, AssetType::Debt)?;
    let denominator = get_x_vs_l(current_price, edge_low, edge_high, AssetType::Debt)?;
    require!(denominator > 0, ErrorCode::ZeroLiquidity);
    mul_div(numerator, Q96, denominator)
}

/// Discount against par, capped at `Q96`. An empty debt side counts as no discount.
pub(crate) fn capped_debt_discount(engine: &EngineConfig, sqrt_price: u128) -> Result<u128> {
    if get_x_vs_l(sqrt_price, engine.edge_low, engine.edge_high, AssetType::Debt)? == 0 {
        return Ok(Q96);
    }
    let discount = get_debt_price_discount(
        engine.edge_low,
        engine.edge_high,
        sqrt_price,
        engine.par_reference_price(),
    )?;
    Ok(discount.min(Q96))
}

/// `2^(-elapsed * rate / (10_000 * debt_duration))` in Q96.
pub fn decay_factor(elapsed: u64, market_config: &MarketConfig) -> Result<u128> {
    require!(market_config.debt_duration > 0, ErrorCode::InvalidConfig);
    let weighted = (elapsed as u128)
        .checked_mul(market_config.effective_rate_bps())
        .ok_or_else(|| error!(ErrorCode::ArithmeticOverflow))?;
    let half_life = BPS_DENOMINATOR as u128 * market_config.debt_duration as u128;

    if weighted / half_life >= MAX_DECAY_HALVINGS {
        return Ok(0);
    }
    let exponent_q64 = mul_div(weighted, 1u128 << DECAY_EXPONENT_BITS, half_life)?;
    neg_pow2_q96(exponent_q64)
}

/// Advances a debt notional price toward `target`.
///
/// `notional' = target + (notional - target) * 2^(-elapsed / half_life)`, where
/// the residual distance is rounded toward the target.
pub fn converge_debt_notional_price(
    notional: u128,
    target: u128,
    elapsed: u64,
    market_config: &MarketConfig,
) -> Result<u128> {
    if elapsed == 0 || notional == target {
        return Ok(notional);
    }
    let factor = decay_factor(elapsed, market_config)?;
    let (distance, below_target) = signed_delta(notional, target);
    let remaining = mul_q96(distance, factor)?;

    let next = if below_target {
        target.checked_sub(remaining)
    } else {
        target.checked_add(remaining)
    };
    next.ok_or_else(|| error!(ErrorCode::ArithmeticOverflow))
}

/// Exchange ratio between two asset types at a derived state, in Q96.
///
/// Units of `asset_to` backed by the same liquidity as one unit of
/// `asset_from`.
///
/// # Errors
/// * `ErrorCode::UnsupportedAsset` - `asset_from == asset_to`
/// * `ErrorCode::ZeroLiquidity` - `asset_from` has an empty reserve at this price
pub fn calc_ratio(
    engine: &EngineConfig,
    full_state: &LexFullState,
    asset_from: AssetType,
    asset_to: AssetType,
) -> Result<u128> {
    require!(asset_from != asset_to, ErrorCode::UnsupportedAsset);
    let from = get_x_vs_l(full_state.sqrt_price, engine.edge_low, engine.edge_high, asset_from)?;
    let to = get_x_vs_l(full_state.sqrt_price, engine.edge_low, engine.edge_high, asset_to)?;
    require!(from > 0, ErrorCode::ZeroLiquidity);
    mul_div(to, Q96, from)
}
