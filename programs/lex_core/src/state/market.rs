use crate::errors::ErrorCode;
use crate::state::config::{EngineConfig, MarketConfig};
use anchor_lang::prelude::*;

/// Persisted per-market record.
///
/// Written only by the orchestrator after a mint, redeem or swap commits.
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct LexMarketState {
    /// Sqrt price at the last commit, Q96.
    pub last_sqrt_price: u128,
    /// Converged debt notional price at the last commit, Q96.
    pub last_debt_notional_price: u128,
    /// Caller-supplied time of the last commit, in seconds.
    pub last_update_ts: i64,
}

impl LexMarketState {
    /// Initial record: price and notional price at par, stamped with the creation time.
    pub fn new(engine: &EngineConfig, created_at: i64) -> Self {
        let par = engine.par_reference_price();
        Self {
            last_sqrt_price: par,
            last_debt_notional_price: par,
            last_update_ts: created_at,
        }
    }

    /// Seconds elapsed since the last commit.
    ///
    /// # Errors
    /// * `ErrorCode::InvalidTimestamp` - `now` precedes the last update
    pub fn elapsed_since_update(&self, now: i64) -> Result<u64> {
        require!(now >= self.last_update_ts, ErrorCode::InvalidTimestamp);
        Ok(now.abs_diff(self.last_update_ts))
    }
}

/// Live base-token balances backing each claim side.
///
/// Supplied by the caller on every operation; the curve is always re-derived
/// from these rather than from the last committed price.
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BaseSupply {
    /// Base tokens behind outstanding debt claims (the `A` reserve).
    pub debt: u128,
    /// Base tokens behind outstanding leverage claims (the `Z` reserve).
    pub leverage: u128,
}

impl BaseSupply {
    pub fn new(debt: u128, leverage: u128) -> Self {
        Self { debt, leverage }
    }

    pub fn is_empty(&self) -> bool {
        self.debt == 0 && self.leverage == 0
    }

    pub fn total(&self) -> Result<u128> {
        self.debt
            .checked_add(self.leverage)
            .ok_or_else(|| error!(ErrorCode::ArithmeticOverflow))
    }
}

/// Fully derived market snapshot. Never persisted.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LexFullState {
    /// Sqrt price re-derived from the live supply, Q96.
    pub sqrt_price: u128,
    pub liquidity: u128,
    /// Loan-to-value at `sqrt_price`, Q96.
    pub ltv: u128,
    pub under_collateralized: bool,
    /// Instantaneous debt discount at `sqrt_price`, Q96.
    pub debt_price_discount: u128,
    /// Debt notional price converged up to `timestamp`, Q96.
    pub debt_notional_price: u128,
    /// Value of the debt side in base units at the notional price.
    pub debt_value: u128,
    /// Remaining base value attributable to leverage holders.
    pub leverage_value: u128,
    pub supply: BaseSupply,
    pub timestamp: i64,
}

impl LexFullState {
    /// The record the orchestrator would persist for this snapshot at `sqrt_price`.
    pub fn next_market_state(&self, sqrt_price: u128) -> LexMarketState {
        LexMarketState {
            last_sqrt_price: sqrt_price,
            last_debt_notional_price: self.debt_notional_price,
            last_update_ts: self.timestamp,
        }
    }
}

/// One registry entry: immutable configuration plus the mutable record.
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct LexMarket {
    pub config: MarketConfig,
    pub state: LexMarketState,
}
