/// LEX Market Orchestrator
///
/// Owns the engine-wide configuration and one persisted record per market,
/// and mediates every state transition. Each mutating operation follows the
/// same sequence:
///
/// 1. derive a full snapshot from the committed record and the live supply
/// 2. run the curve step against the snapshot's price and liquidity
/// 3. build the complete next record and only then write it back
///
/// A failure at any step leaves the registry untouched. Callers are expected
/// to serialize operations on the same market; different markets share no
/// mutable state.
use std::collections::BTreeMap;

use crate::asset::AssetType;
use crate::constants::Q96;
use crate::curve_math::{compute_mint, compute_redeem, compute_swap};
use crate::errors::ErrorCode;
use crate::events::{LexOperation, MarketInitialized, MarketUpdated};
use crate::market_state::{calc_ratio, calculate_market_state, get_debt_price_discount};
use crate::math::mul_div;
use crate::oracle::PriceOracle;
use crate::state::{BaseSupply, EngineConfig, LexFullState, LexMarket, LexMarketState, MarketConfig};
use anchor_lang::prelude::*;

/// Parameters for a DEBT <-> LEVERAGE swap.
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct SwapParams {
    pub asset_in: AssetType,
    pub asset_out: AssetType,
    /// Input amount for exact-in, output amount for exact-out.
    pub amount: u128,
    pub is_exact_in: bool,
    /// Accept a fill that stops at an edge before using the full amount.
    pub allow_partial_fill: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MintOutcome {
    /// Liquidity added.
    pub liquidity: u128,
    /// Base tokens the caller must place behind new leverage claims.
    pub leverage_amount: u128,
    /// Base tokens the caller must place behind new debt claims.
    pub debt_amount: u128,
    pub under_collateralized: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RedeemOutcome {
    /// Liquidity burned.
    pub liquidity: u128,
    /// Leverage-side base tokens released to the caller.
    pub leverage_amount: u128,
    /// Debt-side base tokens released to the caller.
    pub debt_amount: u128,
    pub under_collateralized: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SwapOutcome {
    /// Gross amount paid in, fee included.
    pub amount_in: u128,
    pub amount_out: u128,
    /// Portion of `amount_in` kept by the pool as fee.
    pub fee_amount: u128,
    pub next_sqrt_price: u128,
    pub limited_by_range: bool,
    pub under_collateralized: bool,
}

/// Registry of LEX markets sharing one engine configuration.
#[derive(Clone, Debug)]
pub struct Lex {
    engine: EngineConfig,
    markets: BTreeMap<Pubkey, LexMarket>,
}

impl Lex {
    pub fn new(engine: EngineConfig) -> Result<Self> {
        engine.validate()?;
        Ok(Self {
            engine,
            markets: BTreeMap::new(),
        })
    }

    pub fn engine_config(&self) -> &EngineConfig {
        &self.engine
    }

    pub fn market(&self, market_id: &Pubkey) -> Result<&LexMarket> {
        self.markets
            .get(market_id)
            .ok_or_else(|| error!(ErrorCode::MarketNotFound))
    }

    /// Creates the persisted record for a new market at par.
    ///
    /// # Errors
    /// * `ErrorCode::InvalidConfig` - `config` fails validation
    /// * `ErrorCode::MarketAlreadyExists` - `market_id` is already registered
    pub fn initialize_market(
        &mut self,
        market_id: Pubkey,
        config: MarketConfig,
        now: i64,
    ) -> Result<LexMarketState> {
        config.validate()?;
        require!(
            !self.markets.contains_key(&market_id),
            ErrorCode::MarketAlreadyExists
        );

        let state = LexMarketState::new(&self.engine, now);
        self.markets.insert(market_id, LexMarket { config, state });

        msg!(
            "Market initialized: id={}, base_token={}, sqrt_price={}, fee_bps={}, debt_duration={}",
            market_id,
            config.base_token,
            state.last_sqrt_price,
            config.fee_bps,
            config.debt_duration
        );
        emit!(MarketInitialized {
            market: market_id,
            base_token: config.base_token,
            sqrt_price: state.last_sqrt_price,
            debt_notional_price: state.last_debt_notional_price,
            timestamp: now,
        });

        Ok(state)
    }

    /// Adds `liquidity` at the current price.
    ///
    /// Returns the base amounts the caller must deposit behind each claim
    /// side, rounded up.
    pub fn mint(
        &mut self,
        market_id: Pubkey,
        supply: BaseSupply,
        liquidity: u128,
        now: i64,
        strict_mode: bool,
    ) -> Result<MintOutcome> {
        require!(liquidity > 0, ErrorCode::ZeroAmount);
        let (_, full) = self.snapshot(&market_id, supply, now, strict_mode)?;

        let (leverage_amount, debt_amount) = compute_mint(
            full.sqrt_price,
            self.engine.edge_low,
            self.engine.edge_high,
            liquidity,
        )?;
        let next_liquidity = full
            .liquidity
            .checked_add(liquidity)
            .ok_or_else(|| error!(ErrorCode::ArithmeticOverflow))?;

        let under_collateralized = self.commit(
            market_id,
            &full,
            full.sqrt_price,
            next_liquidity,
            LexOperation::Mint,
            strict_mode,
        )?;

        Ok(MintOutcome {
            liquidity,
            leverage_amount,
            debt_amount,
            under_collateralized,
        })
    }

    /// Burns the liquidity-equivalent of the offered claim amounts.
    ///
    /// `leverage_in` and `debt_in` are upper bounds; any excess is left with
    /// the caller.
    pub fn redeem(
        &mut self,
        market_id: Pubkey,
        supply: BaseSupply,
        leverage_in: u128,
        debt_in: u128,
        now: i64,
        strict_mode: bool,
    ) -> Result<RedeemOutcome> {
        require!(leverage_in > 0 || debt_in > 0, ErrorCode::ZeroAmount);
        let (_, full) = self.snapshot(&market_id, supply, now, strict_mode)?;

        let result = compute_redeem(
            full.liquidity,
            full.sqrt_price,
            self.engine.edge_low,
            self.engine.edge_high,
            leverage_in,
            debt_in,
        )?;

        let under_collateralized = self.commit(
            market_id,
            &full,
            result.next_sqrt_price,
            full.liquidity - result.liquidity_out,
            LexOperation::Redeem,
            strict_mode,
        )?;

        Ok(RedeemOutcome {
            liquidity: result.liquidity_out,
            leverage_amount: result.leverage_out,
            debt_amount: result.debt_out,
            under_collateralized,
        })
    }

    /// Swaps between the debt and leverage claims.
    ///
    /// The fee is charged on the input side: deducted before the curve step
    /// for exact-in, grossed up after it for exact-out.
    ///
    /// # Errors
    /// * `ErrorCode::UnsupportedAsset` - same asset on both sides, or BASE involved
    /// * `ErrorCode::SwapExceedsRange` - the step stopped at an edge and
    ///   `allow_partial_fill` is false
    /// * `ErrorCode::ZeroLiquidity` - the market holds no liquidity
    pub fn swap(
        &mut self,
        market_id: Pubkey,
        supply: BaseSupply,
        params: SwapParams,
        now: i64,
        strict_mode: bool,
    ) -> Result<SwapOutcome> {
        require!(
            params.asset_in != params.asset_out,
            ErrorCode::UnsupportedAsset
        );
        require!(
            params.asset_in.counterpart() == Some(params.asset_out),
            ErrorCode::UnsupportedAsset
        );
        require!(params.amount > 0, ErrorCode::ZeroAmount);

        let (market, full) = self.snapshot(&market_id, supply, now, strict_mode)?;
        let config = market.config;
        let (edge_low, edge_high) = (self.engine.edge_low, self.engine.edge_high);

        let (step, amount_in, amount_out, fee_amount) = if params.is_exact_in {
            let fee = config.fee_on_gross(params.amount)?;
            let net = params.amount - fee;
            require!(net > 0, ErrorCode::ZeroAmount);

            let step = compute_swap(
                full.liquidity,
                full.sqrt_price,
                edge_low,
                edge_high,
                params.asset_in,
                net,
                true,
            )?;
            let (gross, fee) = if step.limited_by_range {
                let gross = config.gross_up(step.amount_specified_used)?;
                (gross, gross - step.amount_specified_used)
            } else {
                (params.amount, fee)
            };
            (step, gross, step.amount_calculated, fee)
        } else {
            let step = compute_swap(
                full.liquidity,
                full.sqrt_price,
                edge_low,
                edge_high,
                params.asset_out,
                params.amount,
                false,
            )?;
            let gross = config.gross_up(step.amount_calculated)?;
            (
                step,
                gross,
                step.amount_specified_used,
                gross - step.amount_calculated,
            )
        };

        if step.limited_by_range && !params.allow_partial_fill {
            msg!(
                "Swap rejected: would cross edge, fillable {} of {}",
                step.amount_specified_used,
                params.amount
            );
            return err!(ErrorCode::SwapExceedsRange);
        }

        let under_collateralized = self.commit(
            market_id,
            &full,
            step.next_sqrt_price,
            full.liquidity,
            LexOperation::Swap {
                asset_in: params.asset_in,
            },
            strict_mode,
        )?;

        Ok(SwapOutcome {
            amount_in,
            amount_out,
            fee_amount,
            next_sqrt_price: step.next_sqrt_price,
            limited_by_range: step.limited_by_range,
            under_collateralized,
        })
    }

    // ---------- Queries --------------------------------------------------------

    pub fn get_full_state(
        &self,
        market_id: &Pubkey,
        supply: BaseSupply,
        now: i64,
    ) -> Result<LexFullState> {
        self.snapshot(market_id, supply, now, false)
            .map(|(_, full)| full)
    }

    pub fn get_ltv(&self, market_id: &Pubkey, supply: BaseSupply, now: i64) -> Result<u128> {
        Ok(self.get_full_state(market_id, supply, now)?.ltv)
    }

    /// Uncapped discount of the debt claim against par at the current price.
    pub fn get_debt_price_discount(
        &self,
        market_id: &Pubkey,
        supply: BaseSupply,
        now: i64,
    ) -> Result<u128> {
        let full = self.get_full_state(market_id, supply, now)?;
        get_debt_price_discount(
            self.engine.edge_low,
            self.engine.edge_high,
            full.sqrt_price,
            self.engine.par_reference_price(),
        )
    }

    pub fn calc_ratio(
        &self,
        market_id: &Pubkey,
        supply: BaseSupply,
        now: i64,
        asset_from: AssetType,
        asset_to: AssetType,
    ) -> Result<u128> {
        let full = self.get_full_state(market_id, supply, now)?;
        calc_ratio(&self.engine, &full, asset_from, asset_to)
    }

    /// Values `amount` of `asset` in `quote_token` through the oracle.
    ///
    /// Claim amounts are first converted to base units at the derived state.
    #[allow(clippy::too_many_arguments)]
    pub fn quote_value<O: PriceOracle>(
        &self,
        market_id: &Pubkey,
        supply: BaseSupply,
        now: i64,
        asset: AssetType,
        amount: u128,
        quote_token: &Pubkey,
        oracle: &O,
    ) -> Result<u128> {
        let (market, full) = self.snapshot(market_id, supply, now, false)?;
        let base_amount = match asset {
            AssetType::Base => amount,
            AssetType::Debt | AssetType::Leverage => {
                let ratio = calc_ratio(&self.engine, &full, asset, AssetType::Base)?;
                mul_div(amount, ratio, Q96)?
            }
        };

        oracle
            .preview_quote(base_amount, &market.config.base_token, quote_token)
            .map_err(|e| {
                msg!("Oracle quote failed for market {}: {}", market_id, e);
                error!(ErrorCode::OracleQuoteFailed)
            })
    }

    // ---------- Internals ------------------------------------------------------

    fn snapshot(
        &self,
        market_id: &Pubkey,
        supply: BaseSupply,
        now: i64,
        strict_mode: bool,
    ) -> Result<(LexMarket, LexFullState)> {
        let market = *self.market(market_id)?;
        let full = calculate_market_state(
            &market.config,
            &self.engine,
            &market.state,
            supply,
            now,
            strict_mode,
        )?;
        Ok((market, full))
    }

    /// Writes the next record for `market_id` and reports whether the
    /// committed price is under-collateralized.
    ///
    /// In strict mode an operation that would leave the market past a soft
    /// limit is rejected before anything is written.
    fn commit(
        &mut self,
        market_id: Pubkey,
        full: &LexFullState,
        next_sqrt_price: u128,
        next_liquidity: u128,
        operation: LexOperation,
        strict_mode: bool,
    ) -> Result<bool> {
        let under_collateralized = self.engine.is_under_collateralized(next_sqrt_price);
        if strict_mode && under_collateralized {
            msg!(
                "Strict mode rejected {:?}: next sqrt price {} at or above limit {}",
                operation,
                next_sqrt_price,
                self.engine.lim_high
            );
            return err!(ErrorCode::UnderCollateralized);
        }

        let next_state = full.next_market_state(next_sqrt_price);
        let market = self
            .markets
            .get_mut(&market_id)
            .ok_or_else(|| error!(ErrorCode::MarketNotFound))?;
        market.state = next_state;

        msg!(
            "Market updated: id={}, op={:?}, sqrt_price={}, liquidity={}, debt_notional_price={}",
            market_id,
            operation,
            next_state.last_sqrt_price,
            next_liquidity,
            next_state.last_debt_notional_price
        );
        emit!(MarketUpdated {
            market: market_id,
            operation,
            sqrt_price: next_state.last_sqrt_price,
            liquidity: next_liquidity,
            debt_notional_price: next_state.last_debt_notional_price,
            under_collateralized,
            timestamp: next_state.last_update_ts,
        });

        Ok(under_collateralized)
    }
}
