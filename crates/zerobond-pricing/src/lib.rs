//! # zerobond-pricing
//!
//! **Pure deterministic pricing engine for ZeroBond.**
//!
//! Given a market's frozen annual rate and the time left to maturity, it
//! computes the present value of one unit of principal under simple
//! interest, and splits a deposit into principal and yield claims. It has:
//!
//! - **Zero side effects**: no balances, no clock, no storage
//! - **Deterministic output**: prices are truncated to 18 decimal places
//! - **Exact conservation**: yield is always the residual of principal

pub mod discount;
pub mod split;

pub use discount::{discount_rate, principal_price, yield_price};
pub use split::{market_split, redemption_split, split};
