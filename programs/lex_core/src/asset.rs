use anchor_lang::prelude::*;

/// The three views over a LEX market's internal reserves.
///
/// - `Base`: the collateral unit, backing both claim sides.
/// - `Debt`: the safe claim. Its reserve is the `A` side of the curve, which
///   grows with the sqrt price and depletes at `edge_low`.
/// - `Leverage`: the leveraged claim. Its reserve is the `Z` side, which
///   shrinks with the sqrt price and depletes at `edge_high`.
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum AssetType {
    Base,
    Debt,
    Leverage,
}

impl AssetType {
    /// The claim on the opposite side of the curve, if this is a claim asset.
    pub fn counterpart(self) -> Option<AssetType> {
        match self {
            AssetType::Base => None,
            AssetType::Debt => Some(AssetType::Leverage),
            AssetType::Leverage => Some(AssetType::Debt),
        }
    }
}
