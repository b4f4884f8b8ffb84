//! # zerobond-types
//!
//! Shared types, errors, and configuration for the **ZeroBond** protocol.
//!
//! This crate is the leaf dependency of the workspace; every other crate
//! depends on it. It defines:
//!
//! - **Identifiers**: [`AccountId`], [`AssetId`], [`MarketId`], [`PoolId`]
//! - **Units**: [`Amount`], [`Timestamp`], and [`mul_div`] for wide fixed-point math
//! - **Market model**: [`BondMarket`], [`MarketPhase`], [`ClaimSplit`], [`PoolBinding`]
//! - **Swap model**: [`PoolKey`], [`SwapParams`], [`BalanceDelta`], [`BeforeSwapDelta`],
//!   [`BeforeSwapOutcome`]
//! - **Events**: [`Event`]
//! - **Configuration**: [`EngineConfig`], [`DeploymentConfig`]
//! - **Errors**: [`ZerobondError`] with `ZB_ERR_` prefix codes
//! - **Constants**: protocol-wide limits and defaults

pub mod amount;
pub mod config;
pub mod constants;
pub mod error;
pub mod events;
pub mod ids;
pub mod market;
pub mod math;
pub mod swap;

// Re-export all primary types at crate root for ergonomic imports:
//   use zerobond_types::{BondMarket, MarketId, PoolKey, ...};

pub use amount::*;
pub use config::*;
pub use error::*;
pub use events::*;
pub use ids::*;
pub use market::*;
pub use math::mul_div;
pub use swap::*;

// Constants are accessed via `zerobond_types::constants::FOO`
// (not re-exported to avoid name collisions).
