//! Simple-interest discounting.
//!
//! ```text
//! rate            = apr_bps / 10_000 × ttm / SECONDS_PER_YEAR
//! principal_price = 1 / (1 + rate)        (truncated to 18 dp)
//! yield_price     = 1 − principal_price
//! ```
//!
//! Both multiplications happen before the single division so that short
//! maturities and low rates do not lose precision to an early truncation.

use rust_decimal::{Decimal, RoundingStrategy};
use zerobond_types::{Result, ZerobondError, constants};

fn overflow(reason: &str) -> ZerobondError {
    ZerobondError::MathOverflow {
        reason: reason.to_string(),
    }
}

/// Discount rate accumulated over `time_to_maturity` seconds at `apr_bps`.
pub fn discount_rate(apr_bps: u32, time_to_maturity: u64) -> Result<Decimal> {
    let numerator = Decimal::from(apr_bps)
        .checked_mul(Decimal::from(time_to_maturity))
        .ok_or_else(|| overflow("apr × time to maturity"))?;
    let denominator = Decimal::from(constants::BPS_DENOMINATOR * constants::SECONDS_PER_YEAR);
    numerator
        .checked_div(denominator)
        .ok_or_else(|| overflow("discount rate division"))
}

/// Present value of one unit of principal due in `time_to_maturity` seconds.
///
/// At maturity the price is exactly one; the division is skipped.
pub fn principal_price(apr_bps: u32, time_to_maturity: u64) -> Result<Decimal> {
    if time_to_maturity == 0 {
        return Ok(Decimal::ONE);
    }
    let growth = Decimal::ONE
        .checked_add(discount_rate(apr_bps, time_to_maturity)?)
        .ok_or_else(|| overflow("1 + discount rate"))?;
    let price = Decimal::ONE
        .checked_div(growth)
        .ok_or_else(|| overflow("present value division"))?;
    Ok(price.round_dp_with_strategy(constants::PRICE_DECIMALS, RoundingStrategy::ToZero))
}

/// Value of the yield claim per unit: the complement of the principal price.
pub fn yield_price(apr_bps: u32, time_to_maturity: u64) -> Result<Decimal> {
    Ok(Decimal::ONE - principal_price(apr_bps, time_to_maturity)?)
}
