//! Splitting deposit value into principal and yield claims.
//!
//! `principal = floor(amount × principal_price)` and
//! `yield = amount − principal`. Deriving yield as the residual keeps
//! `principal + yield == amount` exact for every input; two independent
//! multiplications could round in different directions.
//!
//! The product is taken in integers: the 18-dp price becomes a WAD-scaled
//! integer and `amount × price_wad / WAD` is floored with a 256-bit
//! intermediate, so no amount is ever rounded up.

use rust_decimal::Decimal;
use zerobond_types::{
    Amount, BondMarket, ClaimSplit, Result, Timestamp, ZerobondError, constants, mul_div,
};

use crate::discount::principal_price;

/// Split `amount` at `apr_bps` with `time_to_maturity` seconds left.
pub fn split(amount: Amount, apr_bps: u32, time_to_maturity: u64) -> Result<ClaimSplit> {
    if amount == 0 {
        return Ok(ClaimSplit::all_principal(0));
    }
    let price = principal_price(apr_bps, time_to_maturity)?;
    if price == Decimal::ONE {
        return Ok(ClaimSplit::all_principal(amount));
    }

    let price_wad = to_wad(price)?;
    let principal = mul_div(amount, price_wad, constants::WAD)
        .ok_or_else(|| overflow(format!("{amount} × {price}")))?
        .min(amount);

    tracing::trace!(
        amount = %amount,
        apr_bps,
        time_to_maturity,
        %price,
        principal = %principal,
        "split computed"
    );

    Ok(ClaimSplit {
        principal,
        yield_amount: amount - principal,
    })
}

/// `price` as an integer scaled by [`constants::WAD`]. Prices carry at most
/// [`constants::PRICE_DECIMALS`] places, so the conversion is exact.
fn to_wad(price: Decimal) -> Result<Amount> {
    let mantissa = u128::try_from(price.mantissa())
        .map_err(|_| overflow(format!("negative price {price}")))?;
    let shift = constants::PRICE_DECIMALS
        .checked_sub(price.scale())
        .ok_or_else(|| overflow(format!("price {price} exceeds 18 dp")))?;
    mantissa
        .checked_mul(10u128.pow(shift))
        .ok_or_else(|| overflow(format!("price {price} out of range")))
}

/// Present-value split of `amount` in `market` at `now`, using its frozen rate.
pub fn market_split(market: &BondMarket, amount: Amount, now: Timestamp) -> Result<ClaimSplit> {
    split(amount, market.initial_apr_bps, market.time_to_maturity(now))
}

/// Claims needed to redeem `amount` from `market` at `now`.
///
/// Expired markets need principal only. Before expiry the split is
/// re-priced at `now`, not at the time the claims were minted.
pub fn redemption_split(market: &BondMarket, amount: Amount, now: Timestamp) -> Result<ClaimSplit> {
    if market.is_expired(now) {
        return Ok(ClaimSplit::all_principal(amount));
    }
    market_split(market, amount, now)
}

fn overflow(reason: String) -> ZerobondError {
    ZerobondError::MathOverflow { reason }
}
