#![no_main]

use anchor_lang::prelude::Pubkey;
use arbitrary::Arbitrary;
use honggfuzz::fuzz;
use lex_core::constants::Q96;
use lex_core::market_state::{converge_debt_notional_price, decay_factor};
use lex_core::state::MarketConfig;

#[derive(Debug, Clone, Arbitrary)]
struct DecayInput {
    notional: u64,
    target: u64,
    elapsed: u64,
    debt_duration: u32,
    rate_bias_bps: i16,
}

fn fuzz_decay(input: DecayInput) {
    let config = MarketConfig {
        base_token: Pubkey::default(),
        base_decimals: 6,
        fee_bps: 0,
        debt_duration: input.debt_duration as u64 + 1,
        rate_bias_bps: input.rate_bias_bps as i32,
    };
    if config.validate().is_err() {
        return;
    }

    let factor = decay_factor(input.elapsed, &config).unwrap();
    assert!(factor <= Q96);

    // Scale the raw inputs into the Q96 price domain
    let notional = input.notional as u128 * (Q96 >> 63);
    let target = input.target as u128 * (Q96 >> 63);
    let next = converge_debt_notional_price(notional, target, input.elapsed, &config).unwrap();

    let (low, high) = if notional <= target {
        (notional, target)
    } else {
        (target, notional)
    };
    assert!(next >= low && next <= high);
}

fn main() {
    loop {
        fuzz!(|data: DecayInput| {
            fuzz_decay(data);
        });
    }
}
