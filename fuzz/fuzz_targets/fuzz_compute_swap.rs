#![no_main]

use anchor_lang::error::Error;
use arbitrary::{Arbitrary, Unstructured};
use honggfuzz::fuzz;
use lex_core::asset::AssetType;
use lex_core::constants::Q96;
use lex_core::curve_math::compute_swap;
use lex_core::errors::ErrorCode;

/// Par-centred range shared by every fuzz case
const EDGE_LOW: u128 = Q96 / 2;
const EDGE_HIGH: u128 = 2 * Q96;

#[derive(Debug, Clone)]
struct SwapInput {
    liquidity: u128,
    sqrt_price: u128,
    asset: AssetType,
    amount: u128,
    is_exact_in: bool,
}

impl<'a> Arbitrary<'a> for SwapInput {
    fn arbitrary(u: &mut Unstructured<'a>) -> arbitrary::Result<Self> {
        let asset = match u.int_in_range(0u8..=2)? {
            0 => AssetType::Base,
            1 => AssetType::Debt,
            _ => AssetType::Leverage,
        };
        Ok(SwapInput {
            liquidity: u.int_in_range(0..=u64::MAX as u128 * 1_000_000)?,
            sqrt_price: u.int_in_range(EDGE_LOW..=EDGE_HIGH)?,
            asset,
            amount: u.arbitrary::<u64>()? as u128,
            is_exact_in: u.arbitrary()?,
        })
    }
}

fn fuzz_swap_step(input: SwapInput) {
    let SwapInput {
        liquidity,
        sqrt_price,
        asset,
        amount,
        is_exact_in,
    } = input;
    let unsupported: Error = ErrorCode::UnsupportedAsset.into();
    let zero_liquidity: Error = ErrorCode::ZeroLiquidity.into();

    match compute_swap(
        liquidity,
        sqrt_price,
        EDGE_LOW,
        EDGE_HIGH,
        asset,
        amount,
        is_exact_in,
    ) {
        Ok(step) => {
            assert!(asset != AssetType::Base);
            assert!(step.next_sqrt_price >= EDGE_LOW && step.next_sqrt_price <= EDGE_HIGH);
            assert!(step.amount_specified_used <= amount);
            if !step.limited_by_range {
                assert_eq!(step.amount_specified_used, amount);
            }
        }
        Err(e) => {
            assert!(e == unsupported || e == zero_liquidity);
            if e == zero_liquidity {
                assert_eq!(liquidity, 0);
            }
        }
    }
}

fn main() {
    loop {
        fuzz!(|data: SwapInput| {
            fuzz_swap_step(data);
        });
    }
}
