use crate::asset::AssetType;
use crate::constants::Q96;
use crate::curve_math::compute_mint;
use crate::errors::ErrorCode;
use crate::market_state::*;
use crate::state::*;
use anchor_lang::prelude::*;

const EDGE_LOW: u128 = Q96 / 2;
const EDGE_HIGH: u128 = 2 * Q96;
const DAY: u64 = 86_400;

fn engine() -> EngineConfig {
    EngineConfig::new(EDGE_LOW, EDGE_HIGH, 3 * Q96 / 2, 2 * Q96).unwrap()
}

fn market_config(rate_bias_bps: i32) -> MarketConfig {
    MarketConfig {
        base_token: Pubkey::new_unique(),
        base_decimals: 6,
        fee_bps: 30,
        debt_duration: DAY,
        rate_bias_bps,
    }
}

/// Live supply that re-derives exactly to `sqrt_price` with 1e18 liquidity.
fn supply_at(sqrt_price: u128) -> BaseSupply {
    let (leverage, debt) =
        compute_mint(sqrt_price, EDGE_LOW, EDGE_HIGH, 1_000_000_000_000_000_000).unwrap();
    BaseSupply::new(debt, leverage)
}

#[cfg(test)]
mod discount_tests {
    use super::*;

    #[test]
    fn test_discount_is_unit_at_par() {
        assert_eq!(
            get_debt_price_discount(EDGE_LOW, EDGE_HIGH, Q96, Q96).unwrap(),
            Q96
        );
    }

    #[test]
    fn test_discount_above_par() {
        // debt ratio 0.5 at par vs 1.0 at sqrt price 1.5
        assert_eq!(
            get_debt_price_discount(EDGE_LOW, EDGE_HIGH, 3 * Q96 / 2, Q96).unwrap(),
            Q96 / 2
        );
    }

    #[test]
    fn test_discount_target_is_clamped_into_edges() {
        assert_eq!(
            get_debt_price_discount(EDGE_LOW, EDGE_HIGH, Q96, Q96 / 4).unwrap(),
            0
        );
    }

    #[test]
    fn test_discount_undefined_at_lower_edge() {
        assert_eq!(
            get_debt_price_discount(EDGE_LOW, EDGE_HIGH, EDGE_LOW, Q96).unwrap_err(),
            ErrorCode::ZeroLiquidity.into()
        );
    }

    #[test]
    fn test_capped_discount() {
        let engine = engine();
        // Below par the raw factor exceeds 1
        assert_eq!(
            get_debt_price_discount(EDGE_LOW, EDGE_HIGH, 3 * Q96 / 4, Q96).unwrap(),
            2 * Q96
        );
        assert_eq!(capped_debt_discount(&engine, 3 * Q96 / 4).unwrap(), Q96);
        assert_eq!(capped_debt_discount(&engine, EDGE_LOW).unwrap(), Q96);
        assert_eq!(capped_debt_discount(&engine, 3 * Q96 / 2).unwrap(), Q96 / 2);
    }
}

#[cfg(test)]
mod convergence_tests {
    use super::*;

    #[test]
    fn test_decay_factor_at_half_life_multiples() {
        let config = market_config(0);
        assert_eq!(decay_factor(0, &config).unwrap(), Q96);
        assert_eq!(decay_factor(DAY, &config).unwrap(), Q96 / 2);
        assert_eq!(decay_factor(2 * DAY, &config).unwrap(), Q96 / 4);
        assert_eq!(decay_factor(96 * DAY, &config).unwrap(), 0);
        assert_eq!(decay_factor(u64::MAX, &config).unwrap(), 0);
    }

    #[test]
    fn test_rate_bias_scales_half_life() {
        // +100% bias: two halvings per duration
        assert_eq!(decay_factor(DAY, &market_config(10_000)).unwrap(), Q96 / 4);
        // -50% bias: half a halving per duration
        assert_eq!(
            decay_factor(DAY, &market_config(-5_000)).unwrap(),
            0xb504f333f9de6484597d89b3
        );
    }

    #[test]
    fn test_half_converged_after_one_half_life() {
        let config = market_config(0);
        let target = 9 * Q96 / 10;
        let next = converge_debt_notional_price(Q96, target, DAY, &config).unwrap();

        assert_eq!(next, target + (Q96 - target) / 2);
        assert_eq!(next, 19 * Q96 / 20);
    }

    #[test]
    fn test_convergence_over_two_half_lives() {
        let config = market_config(0);
        let target = 9 * Q96 / 10;
        let next = converge_debt_notional_price(Q96, target, 2 * DAY, &config).unwrap();
        assert_eq!(next, target + (Q96 - target) / 4);
    }

    #[test]
    fn test_convergence_from_below() {
        let config = market_config(0);
        let start = 9 * Q96 / 10;
        let next = converge_debt_notional_price(start, Q96, DAY, &config).unwrap();
        assert_eq!(next, Q96 - (Q96 - start) / 2);
    }

    #[test]
    fn test_no_elapsed_time_keeps_notional() {
        let config = market_config(0);
        assert_eq!(
            converge_debt_notional_price(Q96, Q96 / 2, 0, &config).unwrap(),
            Q96
        );
    }
}

#[cfg(test)]
mod ratio_tests {
    use super::*;

    fn state_at(sqrt_price: u128) -> LexFullState {
        let engine = engine();
        let config = market_config(0);
        let state = LexMarketState {
            last_sqrt_price: sqrt_price,
            last_debt_notional_price: Q96,
            last_update_ts: 0,
        };
        calculate_market_state(&config, &engine, &state, BaseSupply::default(), 0, false)
            .unwrap()
    }

    #[test]
    fn test_ratios_at_par() {
        let engine = engine();
        let full = state_at(Q96);
        assert_eq!(
            calc_ratio(&engine, &full, AssetType::Debt, AssetType::Base).unwrap(),
            2 * Q96
        );
        assert_eq!(
            calc_ratio(&engine, &full, AssetType::Leverage, AssetType::Debt).unwrap(),
            Q96
        );
        assert_eq!(
            calc_ratio(&engine, &full, AssetType::Base, AssetType::Leverage).unwrap(),
            Q96 / 2
        );
    }

    #[test]
    fn test_identical_assets_are_unsupported() {
        let engine = engine();
        let full = state_at(Q96);
        for asset in [AssetType::Base, AssetType::Debt, AssetType::Leverage] {
            assert_eq!(
                calc_ratio(&engine, &full, asset, asset).unwrap_err(),
                ErrorCode::UnsupportedAsset.into()
            );
        }
    }

    #[test]
    fn test_ratio_from_empty_side_fails() {
        let engine = engine();
        let full = state_at(EDGE_LOW);
        assert_eq!(
            calc_ratio(&engine, &full, AssetType::Debt, AssetType::Base).unwrap_err(),
            ErrorCode::ZeroLiquidity.into()
        );
    }
}

#[cfg(test)]
mod calculate_market_state_tests {
    use super::*;

    #[test]
    fn test_empty_market_uses_committed_price() {
        let engine = engine();
        let state = LexMarketState::new(&engine, 10);
        let full = calculate_market_state(
            &market_config(0),
            &engine,
            &state,
            BaseSupply::default(),
            10,
            true,
        )
        .unwrap();

        assert_eq!(full.sqrt_price, Q96);
        assert_eq!(full.liquidity, 0);
        assert_eq!(full.ltv, 2 * Q96 / 3);
        assert!(!full.under_collateralized);
        assert_eq!(full.debt_price_discount, Q96);
        assert_eq!(full.debt_notional_price, Q96);
        assert_eq!(full.debt_value, 0);
        assert_eq!(full.leverage_value, 0);
        assert_eq!(full.timestamp, 10);
    }

    #[test]
    fn test_price_rederived_from_live_supply() {
        let engine = engine();
        let state = LexMarketState::new(&engine, 0);
        let full = calculate_market_state(
            &market_config(0),
            &engine,
            &state,
            supply_at(Q96),
            0,
            false,
        )
        .unwrap();

        assert_eq!(full.sqrt_price, Q96);
        assert_eq!(full.liquidity, 1_000_000_000_000_000_000);
        assert_eq!(full.debt_value, 500_000_000_000_000_000);
        assert_eq!(full.leverage_value, 500_000_000_000_000_000);
    }

    #[test]
    fn test_limit_flags_and_strict_mode() {
        let engine = engine();
        let state = LexMarketState::new(&engine, 0);
        let config = market_config(0);

        let full =
            calculate_market_state(&config, &engine, &state, supply_at(3 * Q96 / 2), 0, false)
                .unwrap();
        assert_eq!(full.sqrt_price, engine.lim_high);
        assert!(full.under_collateralized);

        let result =
            calculate_market_state(&config, &engine, &state, supply_at(3 * Q96 / 2), 0, true);
        assert_eq!(result.unwrap_err(), ErrorCode::UnderCollateralized.into());

        let below = engine.lim_high - 1_000_000_000_000;
        let full = calculate_market_state(&config, &engine, &state, supply_at(below), 0, true)
            .unwrap();
        assert!(full.sqrt_price < engine.lim_high);
        assert!(!full.under_collateralized);
    }

    #[test]
    fn test_notional_converges_with_elapsed_time() {
        let engine = engine();
        let state = LexMarketState::new(&engine, 0);
        let full = calculate_market_state(
            &market_config(0),
            &engine,
            &state,
            supply_at(3 * Q96 / 2),
            DAY as i64,
            false,
        )
        .unwrap();

        // Target is par * 0.5; one half-life closes half the gap
        assert_eq!(full.debt_price_discount, Q96 / 2);
        assert_eq!(full.debt_notional_price, 3 * Q96 / 4);
        assert_eq!(full.debt_value, 750_000_000_000_000_000);
        assert_eq!(full.leverage_value, 416_666_666_666_666_667);
        // Nothing was written back
        assert_eq!(state.last_debt_notional_price, Q96);
    }

    #[test]
    fn test_time_before_last_update_fails() {
        let engine = engine();
        let state = LexMarketState::new(&engine, 100);
        let result = calculate_market_state(
            &market_config(0),
            &engine,
            &state,
            BaseSupply::default(),
            99,
            false,
        );
        assert_eq!(result.unwrap_err(), ErrorCode::InvalidTimestamp.into());
    }
}
