/// LEX Core Protocol Constants
///
/// Fixed-point scales and protocol-wide bounds shared by the curve math,
/// the market state calculator and the orchestrator.
/// Number of fractional bits carried by every sqrt price and ratio.
pub const RESOLUTION: u32 = 96;

/// 1.0 in Q96 fixed-point representation.
///
/// Doubles as the par sqrt price (an exchange rate of exactly 1) and as the
/// unit factor for LTV, discounts and the debt notional price.
pub const Q96: u128 = 1u128 << RESOLUTION;

/// Par reference sqrt price used for the debt notional price.
pub const PAR_SQRT_PRICE: u128 = Q96;

/// Smallest sqrt price an edge may take.
///
/// Keeps `1 / P` representable in Q96 without exceeding `u128`.
pub const MIN_EDGE_SQRT_PRICE: u128 = 1u128 << 64;

/// Largest sqrt price an edge may take.
///
/// Leaves headroom for `P * 2^96` products inside the 512-bit intermediates.
pub const MAX_EDGE_SQRT_PRICE: u128 = 1u128 << 127;

/// Basis point denominator used for fees and the rate bias.
pub const BPS_DENOMINATOR: u32 = 10_000;

/// Highest accepted swap fee (50%).
pub const MAX_FEE_BPS: u16 = 5_000;

/// Lowest accepted rate bias. At -10_000 bps the effective half-life is infinite.
pub const MIN_RATE_BIAS_BPS: i32 = -9_999;

/// Highest accepted rate bias (10x faster convergence).
pub const MAX_RATE_BIAS_BPS: i32 = 90_000;

/// Fractional bits of the decay exponent (`elapsed / half_life`).
pub const DECAY_EXPONENT_BITS: u32 = 64;

/// Whole half-lives after which the residual distance to target is treated as zero.
pub const MAX_DECAY_HALVINGS: u128 = 96;
