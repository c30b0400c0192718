#![allow(unexpected_cfgs)]

//! LEX core: bounded concentrated-liquidity curve math, the derived market
//! state calculator and the market orchestrator.

// Constants, errors and fixed-point primitives
pub mod constants;
pub mod errors;
pub mod math;

// Curve math and the asset views over its reserves
pub mod asset;
pub mod curve_math;

// Persisted records, configuration and the derived snapshot
pub mod market_state;
pub mod state;

// Orchestration and its collaborators
pub mod events;
pub mod lex;
pub mod oracle;

pub use asset::AssetType;
pub use errors::ErrorCode;
pub use lex::{Lex, MintOutcome, RedeemOutcome, SwapOutcome, SwapParams};
pub use oracle::PriceOracle;
pub use state::{BaseSupply, EngineConfig, LexFullState, LexMarket, LexMarketState, MarketConfig};

#[cfg(test)]
pub mod unit_test;
