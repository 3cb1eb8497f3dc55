//! Fixed-point accrual arithmetic.
//!
//! Balances and rates are `u128`, but `principal * factor` routinely
//! exceeds 128 bits at a `1e36` scale, so products are formed at 256 bits
//! and divided back down.

use crate::error::LedgerError;

const LOW_MASK: u128 = u64::MAX as u128;

/// Full 256-bit product of two `u128`s as `(high, low)` halves.
pub fn widening_mul(a: u128, b: u128) -> (u128, u128) {
    let (a_hi, a_lo) = (a >> 64, a & LOW_MASK);
    let (b_hi, b_lo) = (b >> 64, b & LOW_MASK);

    let lo_lo = a_lo * b_lo;
    let lo_hi = a_lo * b_hi;
    let hi_lo = a_hi * b_lo;
    let hi_hi = a_hi * b_hi;

    // At most 3 * (2^64 - 1); cannot overflow.
    let mid = (lo_lo >> 64) + (lo_hi & LOW_MASK) + (hi_lo & LOW_MASK);

    let low = (lo_lo & LOW_MASK) | (mid << 64);
    let high = hi_hi + (lo_hi >> 64) + (hi_lo >> 64) + (mid >> 64);
    (high, low)
}

/// `floor(a * b / denominator)` without intermediate overflow.
///
/// Fails when the denominator is zero or the quotient does not fit in
/// `u128`.
pub fn mul_div(a: u128, b: u128, denominator: u128) -> Result<u128, LedgerError> {
    if denominator == 0 {
        return Err(LedgerError::Overflow("division by zero"));
    }
    let (high, low) = widening_mul(a, b);
    if high == 0 {
        return Ok(low / denominator);
    }
    if high >= denominator {
        return Err(LedgerError::Overflow("mul_div quotient exceeds u128"));
    }

    // Restoring long division of (high:low) by denominator; remainder
    // starts below the denominator so the quotient fits in 128 bits.
    let mut remainder = high;
    let mut quotient: u128 = 0;
    for bit in (0..128).rev() {
        let carry = remainder >> 127;
        remainder = (remainder << 1) | ((low >> bit) & 1);
        quotient <<= 1;
        if carry == 1 || remainder >= denominator {
            remainder = remainder.wrapping_sub(denominator);
            quotient |= 1;
        }
    }
    Ok(quotient)
}

/// Linear accrual factor `scale + rate * elapsed`.
pub fn accrual_factor(scale: u128, rate: u128, elapsed: u64) -> Result<u128, LedgerError> {
    rate.checked_mul(u128::from(elapsed))
        .and_then(|interest| interest.checked_add(scale))
        .ok_or(LedgerError::Overflow("accrual factor"))
}

/// Accrued balance `principal * (scale + rate * elapsed) / scale`, rounded down.
///
/// Never less than `principal`.
pub fn accrued_balance(
    principal: u128,
    rate: u128,
    elapsed: u64,
    scale: u128,
) -> Result<u128, LedgerError> {
    if principal == 0 || rate == 0 || elapsed == 0 {
        return Ok(principal);
    }
    let factor = accrual_factor(scale, rate, elapsed)?;
    mul_div(principal, factor, scale)
}
