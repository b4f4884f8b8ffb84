//! Unit types for token amounts and wall-clock time.
//!
//! Amounts are integer base units of a token (a token with 18 decimals
//! represents `1.0` as `1_000_000_000_000_000_000`). Signed deltas used by
//! the pool manager's flash accounting are `i128`.

use crate::{Result, ZerobondError};

/// Token amount in base units.
pub type Amount = u128;

/// Unix timestamp in seconds.
pub type Timestamp = u64;

/// Convert an amount into a signed delta.
///
/// # Errors
/// Returns [`ZerobondError::AmountOverflow`] if the amount exceeds `i128::MAX`.
pub fn to_delta(amount: Amount) -> Result<i128> {
    i128::try_from(amount).map_err(|_| ZerobondError::AmountOverflow)
}

/// Checked addition that reports overflow as a protocol error.
pub fn checked_add(a: Amount, b: Amount) -> Result<Amount> {
    a.checked_add(b).ok_or(ZerobondError::AmountOverflow)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn to_delta_in_range() {
        assert_eq!(to_delta(50).unwrap(), 50);
        assert_eq!(to_delta(0).unwrap(), 0);
    }

    #[test]
    fn to_delta_overflow() {
        let err = to_delta(u128::MAX).unwrap_err();
        assert!(matches!(err, ZerobondError::AmountOverflow));
    }

    #[test]
    fn checked_add_overflow() {
        assert_eq!(checked_add(1, 2).unwrap(), 3);
        assert!(checked_add(u128::MAX, 1).is_err());
    }
}
