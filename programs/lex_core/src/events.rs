use crate::asset::AssetType;
use anchor_lang::prelude::*;

/// Which orchestrator operation produced a `MarketUpdated` event.
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub enum LexOperation {
    Mint,
    Redeem,
    Swap { asset_in: AssetType },
}

/// Event emitted when a market record is created
#[event]
pub struct MarketInitialized {
    /// The market id
    pub market: Pubkey,

    /// Collateral token backing the market
    pub base_token: Pubkey,

    /// Starting sqrt price (par, clamped into the edges)
    pub sqrt_price: u128,

    /// Starting debt notional price
    pub debt_notional_price: u128,

    pub timestamp: i64,
}

/// Event emitted after every committed mint, redeem or swap
#[event]
pub struct MarketUpdated {
    pub market: Pubkey,

    pub operation: LexOperation,

    /// Committed sqrt price after the operation
    pub sqrt_price: u128,

    /// Liquidity after the operation
    pub liquidity: u128,

    /// Committed debt notional price
    pub debt_notional_price: u128,

    /// Whether the committed price sits at or past a soft limit
    pub under_collateralized: bool,

    pub timestamp: i64,
}
