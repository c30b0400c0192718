use crate::constants::*;
use crate::errors::ErrorCode;
use crate::math::*;

#[cfg(test)]
mod mul_div_tests {
    use super::*;

    #[test]
    fn test_mul_div_basic() {
        assert_eq!(mul_div(10, 20, 5).unwrap(), 40);
        assert_eq!(mul_div(7, 3, 2).unwrap(), 10);
        assert_eq!(mul_div_round_up(7, 3, 2).unwrap(), 11);
        assert_eq!(mul_div_round_up(8, 3, 2).unwrap(), 12);
    }

    #[test]
    fn test_mul_div_wide_intermediate() {
        // Q96 * Q96 overflows u128 but the quotient fits
        assert_eq!(mul_div(Q96, Q96, Q96).unwrap(), Q96);
        assert_eq!(mul_q96(Q96 * 3, Q96 / 2).unwrap(), Q96 * 3 / 2);
    }

    #[test]
    fn test_mul_div_errors() {
        assert_eq!(mul_div(1, 1, 0).unwrap_err(), ErrorCode::DivisionByZero.into());
        assert_eq!(
            mul_div_round_up(1, 1, 0).unwrap_err(),
            ErrorCode::DivisionByZero.into()
        );
        assert_eq!(
            mul_div(u128::MAX, 2, 1).unwrap_err(),
            ErrorCode::ArithmeticOverflow.into()
        );
        assert_eq!(
            mul_div_round_up(u128::MAX, 3, 2).unwrap_err(),
            ErrorCode::ArithmeticOverflow.into()
        );
    }

    #[test]
    fn test_mul_div_rounding_directions() {
        assert_eq!(mul_div_rounding(10, 1, 3, Rounding::Down).unwrap(), 3);
        assert_eq!(mul_div_rounding(10, 1, 3, Rounding::Up).unwrap(), 4);
        // Exact division never rounds up
        assert_eq!(mul_div_rounding(9, 1, 3, Rounding::Up).unwrap(), 3);
    }

    #[test]
    fn test_signed_delta() {
        assert_eq!(signed_delta(10, 4), (6, false));
        assert_eq!(signed_delta(4, 10), (6, true));
        assert_eq!(signed_delta(5, 5), (0, false));
    }
}

#[cfg(test)]
mod decay_tests {
    use super::*;

    const ONE_Q64: u128 = 1u128 << 64;

    #[test]
    fn test_neg_pow2_whole_exponents_are_exact() {
        assert_eq!(neg_pow2_q96(0).unwrap(), Q96);
        assert_eq!(neg_pow2_q96(ONE_Q64).unwrap(), Q96 / 2);
        assert_eq!(neg_pow2_q96(2 * ONE_Q64).unwrap(), Q96 / 4);
        assert_eq!(neg_pow2_q96(10 * ONE_Q64).unwrap(), Q96 >> 10);
    }

    #[test]
    fn test_neg_pow2_saturates_to_zero() {
        assert_eq!(neg_pow2_q96(MAX_DECAY_HALVINGS * ONE_Q64).unwrap(), 0);
        assert_eq!(neg_pow2_q96(u128::MAX).unwrap(), 0);
    }

    #[test]
    fn test_neg_pow2_half_exponent() {
        // 2^(-1/2) = 0.70710678...
        let result = neg_pow2_q96(ONE_Q64 / 2).unwrap();
        assert_eq!(result, 0xb504f333f9de6484597d89b3);

        // 2^(-3/2) is the same factor shifted once more
        let result = neg_pow2_q96(ONE_Q64 + ONE_Q64 / 2).unwrap();
        assert_eq!(result, 0xb504f333f9de6484597d89b3 >> 1);
    }

    #[test]
    fn test_neg_pow2_is_non_increasing() {
        let mut previous = neg_pow2_q96(0).unwrap();
        for step in 1..=64u128 {
            let current = neg_pow2_q96(step * (ONE_Q64 / 16)).unwrap();
            assert!(current <= previous, "decay increased at step {}", step);
            previous = current;
        }
    }
}
