pub mod config;
pub mod market;

pub use config::{EngineConfig, MarketConfig};
pub use market::{BaseSupply, LexFullState, LexMarket, LexMarketState};
