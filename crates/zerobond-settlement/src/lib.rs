//! # zerobond-settlement
//!
//! The **Settlement Engine** and the deployment that wires it up.
//!
//! - [`SettlementEngine`]: pool ↔ market bindings, the expiry-aware
//!   before-swap decision, and the claim-balance liquidity path
//! - [`BondHook`]: lends the engine and a registry to the pool manager as
//!   its [`zerobond_ledger::SwapHook`]
//! - [`Deployment`]: owns every component; each mutating call is atomic
//!
//! ## Expired Swap
//!
//! ```text
//! swapper ──PT──▶ PoolManager ──take PT──▶ Engine ──redeem──▶ Registry
//!                     ▲                      │                    │
//!                     └──────settle YBT──────┘◀──────YBT──────────┘
//! ```

pub mod deployment;
pub mod engine;
pub mod hook;

pub use deployment::Deployment;
pub use engine::SettlementEngine;
pub use hook::BondHook;
