/// Engine and Market Configuration
///
/// `EngineConfig` holds the curve geometry shared by every market an engine
/// services. It is validated once at construction and never mutated.
/// `MarketConfig` holds the per-market parameters fixed at market creation.
use crate::constants::{
    BPS_DENOMINATOR, MAX_EDGE_SQRT_PRICE, MAX_FEE_BPS, MAX_RATE_BIAS_BPS, MIN_EDGE_SQRT_PRICE,
    MIN_RATE_BIAS_BPS, PAR_SQRT_PRICE, Q96,
};
use crate::curve_math::validate_edges;
use crate::errors::ErrorCode;
use crate::math::mul_div_round_up;
use anchor_lang::prelude::*;
use primitive_types::U256;

/// Curve edges and soft limits, all Q96 sqrt prices.
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct EngineConfig {
    /// Sqrt price at which the debt reserve is empty.
    pub edge_low: u128,
    /// Sqrt price at which the leverage reserve is empty.
    pub edge_high: u128,
    /// First soft threshold; at or above it the market is under-collateralized.
    pub lim_high: u128,
    /// Outer soft threshold, between `lim_high` and `edge_high`. Validated
    /// and carried for callers; the flag itself is raised at `lim_high`.
    pub lim_max: u128,
}

impl EngineConfig {
    /// Builds a validated engine configuration from explicit edges and limits.
    ///
    /// # Errors
    /// * `ErrorCode::InvalidRange` - `edge_low` is zero or not below `edge_high`
    /// * `ErrorCode::InvalidConfig` - an edge is outside the supported sqrt price
    ///   domain, or the limits are not ordered `edge_low < lim_high <= lim_max <= edge_high`
    pub fn new(edge_low: u128, edge_high: u128, lim_high: u128, lim_max: u128) -> Result<Self> {
        let config = Self {
            edge_low,
            edge_high,
            lim_high,
            lim_max,
        };
        config.validate()?;
        Ok(config)
    }

    /// Builds a configuration whose upper edge is the reciprocal of `edge_low`
    /// around par, i.e. `edge_high = Q96² / edge_low`.
    ///
    /// The reciprocal is computed once here and stored, never re-derived.
    pub fn reciprocal(edge_low: u128, lim_high: u128, lim_max: u128) -> Result<Self> {
        require!(edge_low > 0, ErrorCode::InvalidRange);
        let edge_high = U256::from(Q96) * U256::from(Q96) / U256::from(edge_low);
        require!(edge_high <= U256::from(u128::MAX), ErrorCode::InvalidConfig);
        Self::new(edge_low, edge_high.as_u128(), lim_high, lim_max)
    }

    pub fn validate(&self) -> Result<()> {
        validate_edges(self.edge_low, self.edge_high)?;
        require!(
            self.edge_low >= MIN_EDGE_SQRT_PRICE && self.edge_high <= MAX_EDGE_SQRT_PRICE,
            ErrorCode::InvalidConfig
        );
        require!(
            self.edge_low < self.lim_high
                && self.lim_high <= self.lim_max
                && self.lim_max <= self.edge_high,
            ErrorCode::InvalidConfig
        );
        Ok(())
    }

    /// Par clamped into the edges; the reference point for the debt discount.
    pub fn par_reference_price(&self) -> u128 {
        PAR_SQRT_PRICE.clamp(self.edge_low, self.edge_high)
    }

    /// True once `sqrt_price` has reached the soft limits.
    ///
    /// `lim_max` never sits below `lim_high`, so reaching `lim_high` is the
    /// trigger. Independent of the hard edges: a price can be
    /// under-collateralized while the curve is still well defined.
    pub fn is_under_collateralized(&self, sqrt_price: u128) -> bool {
        sqrt_price >= self.lim_high
    }
}

/// Per-market parameters, immutable after the market is created.
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct MarketConfig {
    /// Mint of the collateral token backing both claims.
    pub base_token: Pubkey,
    pub base_decimals: u8,
    /// Swap fee charged on the input side, in basis points.
    pub fee_bps: u16,
    /// Half-life of the debt notional price convergence, in seconds.
    pub debt_duration: u64,
    /// Rate bias in basis points. Positive values converge faster than the
    /// nominal half-life, negative values slower.
    pub rate_bias_bps: i32,
}

impl MarketConfig {
    pub fn validate(&self) -> Result<()> {
        require!(self.fee_bps <= MAX_FEE_BPS, ErrorCode::InvalidConfig);
        require!(self.debt_duration > 0, ErrorCode::InvalidConfig);
        require!(
            (MIN_RATE_BIAS_BPS..=MAX_RATE_BIAS_BPS).contains(&self.rate_bias_bps),
            ErrorCode::InvalidConfig
        );
        Ok(())
    }

    /// Convergence speed relative to the nominal half-life, in basis points.
    ///
    /// `10_000` means exactly one halving per `debt_duration`.
    pub fn effective_rate_bps(&self) -> u128 {
        (BPS_DENOMINATOR as i64 + self.rate_bias_bps as i64).max(0) as u128
    }

    /// Fee owed on a gross input amount, rounded up.
    pub fn fee_on_gross(&self, amount: u128) -> Result<u128> {
        mul_div_round_up(amount, self.fee_bps as u128, BPS_DENOMINATOR as u128)
    }

    /// Gross input needed so that `net` remains after the fee, rounded up.
    pub fn gross_up(&self, net: u128) -> Result<u128> {
        mul_div_round_up(
            net,
            BPS_DENOMINATOR as u128,
            (BPS_DENOMINATOR - self.fee_bps as u32) as u128,
        )
    }
}
