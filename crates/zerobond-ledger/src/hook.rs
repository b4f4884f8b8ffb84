//! Callback surface for pool hooks.
//!
//! A pool whose key names a hook address only accepts calls that pass a
//! hook with that address. The pool manager invokes the callbacks below at
//! fixed points of its own operations; an error from any callback aborts
//! the whole operation.

use zerobond_types::{AccountId, BeforeSwapOutcome, PoolKey, Result, SwapParams, Timestamp};

use crate::{PoolManager, TokenLedger};

pub trait SwapHook {
    /// Address the hook is registered under in pool keys.
    fn address(&self) -> AccountId;

    /// Runs after the pool is stored, before `initialize` returns.
    fn after_initialize(&mut self, _pool_manager: &mut PoolManager, _key: &PoolKey) -> Result<()> {
        Ok(())
    }

    /// Runs before native liquidity is added to the pool.
    fn before_add_liquidity(&mut self, _key: &PoolKey) -> Result<()> {
        Ok(())
    }

    /// Runs before the native curve. The returned delta is the part of the
    /// swap the hook fills itself; the hook must have settled its own side
    /// of that delta with the pool manager before returning.
    fn before_swap(
        &mut self,
        pool_manager: &mut PoolManager,
        tokens: &mut TokenLedger,
        sender: AccountId,
        key: &PoolKey,
        params: &SwapParams,
        now: Timestamp,
    ) -> Result<BeforeSwapOutcome>;
}
