//! # zerobond-registry
//!
//! The **Market Registry**: creates one bond market per (yield-bearing
//! asset, underlying, expiry), holds deposits of the yield-bearing asset
//! in custody, and mints/burns the principal and yield claims against them.
//!
//! ## Flow
//!
//! ```text
//! create_market → deploy PT + YT (registry is sole minter)
//! mint(amount)  → pull YBT → split at present value → mint PT + YT
//! redeem(amount) → burn PT (+ YT before expiry) → release YBT
//! ```
//!
//! After every operation `custody(market) == supply(PT) + supply(YT)`;
//! see [`CustodyLedger`].

pub mod custody;
pub mod registry;

pub use custody::CustodyLedger;
pub use registry::{MarketRedeemer, MarketRegistry};
