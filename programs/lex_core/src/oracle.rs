/// Price Oracle Collaborator
///
/// The engine never reads a price feed itself. Valuations in a foreign quote
/// token go through this seam; feed freshness, confidence and update fees are
/// the implementor's concern.
use anchor_lang::prelude::*;

pub trait PriceOracle {
    /// Amount of `quote` token worth `amount` of `base` token.
    ///
    /// Must be side-effect-free and must fail rather than return a stale or
    /// low-confidence number, or when either token is unsupported.
    fn preview_quote(&self, amount: u128, base: &Pubkey, quote: &Pubkey) -> Result<u128>;
}
