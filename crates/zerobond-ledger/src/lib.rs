//! # zerobond-ledger
//!
//! The external collaborators ZeroBond is built against, implemented
//! in memory so the core can be driven end-to-end:
//!
//! 1. **TokenLedger**: fungible balances and allowances for every asset,
//!    with minting and burning gated to each asset's single minter
//! 2. **PoolManager**: AMM pools with flash accounting (`take` / `settle`),
//!    an internal claim-balance ledger, dynamic fees, and hook callbacks
//! 3. **SwapHook**: the callback surface a pool's hook implements
//! 4. **MockVault** (`test-helpers`): a yield-bearing share vault whose
//!    exchange rate accrues on demand
//!
//! ## Swap Flow
//!
//! ```text
//! PoolManager.swap() → hook.before_swap() → native curve (remainder)
//!     → swapper settles input / takes output → all deltas net to zero
//! ```

pub mod hook;
pub mod pool_manager;
pub mod token_ledger;
#[cfg(any(test, feature = "test-helpers"))]
pub mod vault;

pub use hook::SwapHook;
pub use pool_manager::{Pool, PoolManager};
pub use token_ledger::{AssetMetadata, TokenLedger};
#[cfg(any(test, feature = "test-helpers"))]
pub use vault::MockVault;
