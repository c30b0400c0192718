#![no_main]

use anchor_lang::error::Error;
use arbitrary::Arbitrary;
use honggfuzz::fuzz;
use lex_core::errors::ErrorCode;
use lex_core::math::{mul_div, mul_div_round_up, mul_div_rounding, Rounding};

#[derive(Debug, Clone, Arbitrary)]
struct MulDivInput {
    a: u128,
    b: u128,
    c: u128,
}

#[derive(Debug, Clone, Arbitrary)]
enum MulDivOp {
    Normal,
    RoundUp,
    Rounded,
}

#[derive(Debug, Clone, Arbitrary)]
struct MulDivTest {
    input: MulDivInput,
    operation: MulDivOp,
}

fn fuzz_mul_div_operations(test: MulDivTest) {
    let MulDivTest { input, operation } = test;
    let MulDivInput { a, b, c } = input;
    let division_by_zero: Error = ErrorCode::DivisionByZero.into();
    let overflow: Error = ErrorCode::ArithmeticOverflow.into();

    match operation {
        MulDivOp::Normal => match mul_div(a, b, c) {
            Ok(value) => {
                assert!(c != 0);
                if a == 0 || b == 0 {
                    assert_eq!(value, 0);
                }
                if c == 1 {
                    if let Some(expected) = a.checked_mul(b) {
                        assert_eq!(value, expected);
                    }
                }
            }
            Err(e) => {
                assert!(e == division_by_zero || e == overflow);
                if e == division_by_zero {
                    assert_eq!(c, 0);
                }
            }
        },

        MulDivOp::RoundUp => match mul_div_round_up(a, b, c) {
            Ok(value) => {
                assert!(c != 0);
                // Round up is never below round down and at most one above it
                if let Ok(down) = mul_div(a, b, c) {
                    assert!(value >= down);
                    assert!(value <= down + 1);
                }
                if a == 0 || b == 0 {
                    assert_eq!(value, 0);
                }
            }
            Err(e) => {
                assert!(e == division_by_zero || e == overflow);
            }
        },

        MulDivOp::Rounded => {
            // Explicit rounding agrees with the dedicated helpers
            let down = mul_div_rounding(a, b, c, Rounding::Down);
            let up = mul_div_rounding(a, b, c, Rounding::Up);
            assert_eq!(down, mul_div(a, b, c));
            assert_eq!(up, mul_div_round_up(a, b, c));
            if let (Ok(down), Ok(up)) = (down, up) {
                assert!(up >= down && up - down <= 1);
            }
        }
    }
}

fn main() {
    loop {
        fuzz!(|data: MulDivTest| {
            fuzz_mul_div_operations(data);
        });
    }
}
