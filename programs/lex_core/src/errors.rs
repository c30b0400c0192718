/// LEX Core Error Definitions
///
/// Every failure the curve math, the market state calculator and the
/// orchestrator can report. Errors are returned synchronously to the
/// immediate caller; nothing is retried internally and no state is written
/// when one is raised.
use anchor_lang::prelude::*;

#[error_code]
pub enum ErrorCode {
    /// Returned when price bounds are mis-ordered or a price lies outside them
    ///
    /// This error occurs when:
    /// - `edge_low >= edge_high`
    /// - A sqrt price is below `edge_low` or above `edge_high`
    /// - Limits are not inside the edges
    #[msg("Sqrt price or edge ordering is outside the valid range")]
    InvalidRange,

    /// Returned when a fixed-point product or sum exceeds its representable range
    #[msg("Fixed-point arithmetic overflow")]
    ArithmeticOverflow,

    /// Returned when an operation needs non-zero liquidity or a non-empty reserve
    #[msg("Operation requires non-zero liquidity")]
    ZeroLiquidity,

    /// Returned when an asset argument is not usable for the requested operation
    ///
    /// Swapping an asset against itself, asking for a ratio between identical
    /// assets, and swapping BASE all land here.
    #[msg("Unsupported asset type for this operation")]
    UnsupportedAsset,

    /// Returned by strict-mode operations when the market crossed a soft limit
    #[msg("Market is under-collateralized")]
    UnderCollateralized,

    #[msg("Division by zero attempted")]
    DivisionByZero,

    /// Returned when a swap can only be partially filled before reaching an edge
    /// and the caller did not accept a partial fill
    #[msg("Swap would move the price beyond the curve edge")]
    SwapExceedsRange,

    #[msg("Invalid engine or market configuration")]
    InvalidConfig,

    #[msg("Market not found")]
    MarketNotFound,

    #[msg("Market already exists")]
    MarketAlreadyExists,

    /// Returned when the supplied time is earlier than the market's last update
    #[msg("Timestamp precedes the last market update")]
    InvalidTimestamp,

    #[msg("Amount must be greater than zero")]
    ZeroAmount,

    #[msg("Price oracle could not provide a quote")]
    OracleQuoteFailed,
}
