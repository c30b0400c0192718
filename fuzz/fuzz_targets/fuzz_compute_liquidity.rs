#![no_main]

use anchor_lang::error::Error;
use arbitrary::{Arbitrary, Unstructured};
use honggfuzz::fuzz;
use lex_core::constants::{MAX_EDGE_SQRT_PRICE, MIN_EDGE_SQRT_PRICE};
use lex_core::curve_math::{compute_liquidity, compute_mint, compute_sqrt_price};
use lex_core::errors::ErrorCode;

#[derive(Debug, Clone)]
struct RangeInput {
    edge_low: u128,
    edge_high: u128,
    sqrt_price: u128,
    liquidity: u128,
}

impl<'a> Arbitrary<'a> for RangeInput {
    fn arbitrary(u: &mut Unstructured<'a>) -> arbitrary::Result<Self> {
        let raw_a = u.int_in_range(MIN_EDGE_SQRT_PRICE..=MAX_EDGE_SQRT_PRICE)?;
        let raw_b = u.int_in_range(MIN_EDGE_SQRT_PRICE..=MAX_EDGE_SQRT_PRICE)?;
        let (edge_low, edge_high) = match raw_a.cmp(&raw_b) {
            std::cmp::Ordering::Less => (raw_a, raw_b),
            std::cmp::Ordering::Greater => (raw_b, raw_a),
            std::cmp::Ordering::Equal => (raw_a - 1, raw_a),
        };
        let sqrt_price = u.int_in_range(edge_low..=edge_high)?;
        let liquidity = u.int_in_range(1..=u64::MAX as u128)?;

        Ok(RangeInput {
            edge_low,
            edge_high,
            sqrt_price,
            liquidity,
        })
    }
}

#[derive(Debug, Clone, Arbitrary)]
enum LiquidityOp {
    MintRoundTrip,
    RawAmounts { leverage: u64, debt: u64 },
}

#[derive(Debug, Clone, Arbitrary)]
struct LiquidityTest {
    input: RangeInput,
    operation: LiquidityOp,
}

fn fuzz_liquidity_calculations(test: LiquidityTest) {
    let LiquidityTest { input, operation } = test;
    let RangeInput {
        edge_low,
        edge_high,
        sqrt_price,
        liquidity,
    } = input;
    let invalid_range: Error = ErrorCode::InvalidRange.into();
    let zero_liquidity: Error = ErrorCode::ZeroLiquidity.into();

    match operation {
        LiquidityOp::MintRoundTrip => {
            let (leverage, debt) = match compute_mint(sqrt_price, edge_low, edge_high, liquidity) {
                Ok(amounts) => amounts,
                Err(e) => {
                    assert!(e != invalid_range);
                    return;
                }
            };
            match compute_liquidity(edge_low, edge_high, leverage, debt) {
                // Rounding never credits more liquidity than was minted
                Ok(recovered) => assert!(recovered <= liquidity),
                Err(e) => assert!(e != invalid_range),
            }
        }

        LiquidityOp::RawAmounts { leverage, debt } => {
            match compute_liquidity(edge_low, edge_high, leverage as u128, debt as u128) {
                Ok(liquidity) => {
                    assert!(liquidity > 0);
                    if let Ok(price) = compute_sqrt_price(
                        edge_low,
                        edge_high,
                        leverage as u128,
                        debt as u128,
                        liquidity,
                    ) {
                        assert!(price >= edge_low && price <= edge_high);
                    }
                }
                Err(e) => {
                    assert!(e != invalid_range);
                    if leverage == 0 && debt == 0 {
                        assert!(e == zero_liquidity);
                    }
                }
            }
        }
    }
}

fn main() {
    loop {
        fuzz!(|data: LiquidityTest| {
            fuzz_liquidity_calculations(data);
        });
    }
}
