//! Binds the settlement engine and a registry into a pool hook.

use zerobond_ledger::{PoolManager, SwapHook, TokenLedger};
use zerobond_registry::MarketRedeemer;
use zerobond_types::{
    AccountId, BeforeSwapOutcome, PoolKey, Result, SwapParams, Timestamp, ZerobondError,
};

use crate::SettlementEngine;

/// Borrowed view handed to the pool manager for the length of one call.
pub struct BondHook<'a, R: MarketRedeemer> {
    engine: &'a mut SettlementEngine,
    registry: &'a mut R,
}

impl<'a, R: MarketRedeemer> BondHook<'a, R> {
    pub fn new(engine: &'a mut SettlementEngine, registry: &'a mut R) -> Self {
        Self { engine, registry }
    }
}

impl<R: MarketRedeemer> SwapHook for BondHook<'_, R> {
    fn address(&self) -> AccountId {
        self.engine.address()
    }

    fn after_initialize(&mut self, pool_manager: &mut PoolManager, key: &PoolKey) -> Result<()> {
        self.engine.on_pool_initialized(pool_manager, key)
    }

    /// Native liquidity is never accepted; deposits go through the engine.
    fn before_add_liquidity(&mut self, key: &PoolKey) -> Result<()> {
        Err(ZerobondError::NativeLiquidityDisabled(key.id()))
    }

    fn before_swap(
        &mut self,
        pool_manager: &mut PoolManager,
        tokens: &mut TokenLedger,
        _sender: AccountId,
        key: &PoolKey,
        params: &SwapParams,
        now: Timestamp,
    ) -> Result<BeforeSwapOutcome> {
        self.engine
            .before_swap(self.registry, pool_manager, tokens, key, params, now)
    }
}
