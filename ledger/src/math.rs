//! # Fixed-Point Arithmetic Helpers
//!
//! Every asset/share conversion and fee computation in Trellis goes through
//! the two functions in this module. There is no floating point anywhere in
//! the ledger — amounts are `u128` integers in smallest-unit denomination,
//! and the *rounding direction* of each division is part of the protocol:
//!
//! - **Fees round up** ([`mul_div_ceil`]) — the protocol never undercharges.
//! - **Share/asset previews round down** ([`mul_div_floor`]) — the vault
//!   never over-issues.
//!
//! Mixing the two directions for the same computation is a correctness bug,
//! not a style preference. If you are adding a new money path, decide which
//! party absorbs the rounding loss and pick the helper accordingly.
//!
//! Both helpers use checked arithmetic throughout. An overflow here means a
//! caller fed in amounts beyond anything the ledger is configured to hold,
//! and the operation must abort before any state is touched.

use thiserror::Error;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors from the fixed-point helpers.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum MathError {
    /// The intermediate product `a * b` exceeded `u128::MAX`.
    #[error("arithmetic overflow in mul_div({a}, {b}, {denominator})")]
    Overflow {
        /// Left factor.
        a: u128,
        /// Right factor.
        b: u128,
        /// The denominator the product would have been divided by.
        denominator: u128,
    },

    /// Division by zero.
    #[error("division by zero in mul_div({a}, {b}, 0)")]
    DivisionByZero {
        /// Left factor.
        a: u128,
        /// Right factor.
        b: u128,
    },
}

// ---------------------------------------------------------------------------
// mul_div
// ---------------------------------------------------------------------------

/// Computes `ceil(a * b / denominator)` with checked arithmetic.
///
/// This is the fee-side helper: the result is rounded *up*, so a nonzero
/// input always produces a nonzero fee. The ceiling is taken on the exact
/// rational value (quotient plus one iff the remainder is nonzero), which
/// avoids the classic `(product + d - 1)` overflow trap.
///
/// # Errors
///
/// [`MathError::Overflow`] if `a * b` does not fit in a `u128`;
/// [`MathError::DivisionByZero`] if `denominator == 0`.
///
/// # Example
///
/// ```
/// use trellis_ledger::math::mul_div_ceil;
///
/// // 1.5% of 1000, rounded up: ceil(1000 * 150 / 10_000) = 15
/// assert_eq!(mul_div_ceil(1000, 150, 10_000).unwrap(), 15);
/// // ceil(1 * 150 / 10_000) = 1 — a nonzero base never escapes fee-free
/// assert_eq!(mul_div_ceil(1, 150, 10_000).unwrap(), 1);
/// ```
pub fn mul_div_ceil(a: u128, b: u128, denominator: u128) -> Result<u128, MathError> {
    if denominator == 0 {
        return Err(MathError::DivisionByZero { a, b });
    }
    let product = a.checked_mul(b).ok_or(MathError::Overflow {
        a,
        b,
        denominator,
    })?;
    let quotient = product / denominator;
    if product % denominator == 0 {
        Ok(quotient)
    } else {
        // quotient < product / denominator <= u128::MAX here, so +1 cannot wrap.
        Ok(quotient + 1)
    }
}

/// Computes `floor(a * b / denominator)` with checked arithmetic.
///
/// The preview-side helper: share issuance and asset payouts are rounded
/// *down*, so rounding dust stays in the vault rather than leaking out.
///
/// # Errors
///
/// [`MathError::Overflow`] if `a * b` does not fit in a `u128`;
/// [`MathError::DivisionByZero`] if `denominator == 0`.
pub fn mul_div_floor(a: u128, b: u128, denominator: u128) -> Result<u128, MathError> {
    if denominator == 0 {
        return Err(MathError::DivisionByZero { a, b });
    }
    let product = a.checked_mul(b).ok_or(MathError::Overflow {
        a,
        b,
        denominator,
    })?;
    Ok(product / denominator)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ceil_exact_division_has_no_bump() {
        assert_eq!(mul_div_ceil(100, 50, 10).unwrap(), 500);
        assert_eq!(mul_div_ceil(10_000, 250, 10_000).unwrap(), 250);
    }

    #[test]
    fn ceil_rounds_up_on_remainder() {
        // 7 * 3 / 2 = 10.5 -> 11
        assert_eq!(mul_div_ceil(7, 3, 2).unwrap(), 11);
        // The smallest possible nonzero fee still charges one unit.
        assert_eq!(mul_div_ceil(1, 1, 10_000).unwrap(), 1);
    }

    #[test]
    fn floor_rounds_down_on_remainder() {
        assert_eq!(mul_div_floor(7, 3, 2).unwrap(), 10);
        assert_eq!(mul_div_floor(1, 1, 10_000).unwrap(), 0);
    }

    #[test]
    fn zero_base_is_zero_both_directions() {
        assert_eq!(mul_div_ceil(0, 999, 10_000).unwrap(), 0);
        assert_eq!(mul_div_floor(0, 999, 10_000).unwrap(), 0);
    }

    #[test]
    fn division_by_zero_rejected() {
        assert!(matches!(
            mul_div_ceil(1, 1, 0),
            Err(MathError::DivisionByZero { .. })
        ));
        assert!(matches!(
            mul_div_floor(1, 1, 0),
            Err(MathError::DivisionByZero { .. })
        ));
    }

    #[test]
    fn overflow_rejected() {
        let result = mul_div_ceil(u128::MAX, 2, 1);
        assert!(matches!(result, Err(MathError::Overflow { .. })));
    }

    #[test]
    fn ceil_at_u128_boundary_does_not_wrap() {
        // product == u128::MAX with a remainder would be the dangerous case
        // for the naive (p + d - 1) formulation; the quotient+1 form is safe.
        assert_eq!(mul_div_ceil(u128::MAX, 1, 2).unwrap(), u128::MAX / 2 + 1);
    }

    #[test]
    fn ceil_is_monotone_in_base() {
        // Fee monotonicity: charging on x is never less than charging on x-1.
        let bps = 137;
        let mut prev = 0;
        for base in 1..5_000u128 {
            let fee = mul_div_ceil(base, bps, 10_000).unwrap();
            assert!(fee >= prev, "fee dropped at base {}", base);
            prev = fee;
        }
    }

    #[test]
    fn ceil_never_below_floor() {
        for (a, b, d) in [(7u128, 3u128, 2u128), (1, 1, 3), (100, 333, 10_000)] {
            assert!(mul_div_ceil(a, b, d).unwrap() >= mul_div_floor(a, b, d).unwrap());
        }
    }
}
