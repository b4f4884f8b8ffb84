//! A complete ZeroBond deployment behind one atomic entry point.
//!
//! Owns the token ledger, the pool manager, the registry and the engine.
//! Every mutating call runs inside [`Deployment::atomically`]: the whole
//! state is snapshotted first and restored if the call fails, so a failed
//! multi-step operation (a swap whose nested redemption pays short, a
//! liquidity add that cannot settle) leaves no partial effects.

use zerobond_ledger::{PoolManager, TokenLedger};
use zerobond_registry::{MarketRedeemer, MarketRegistry};
use zerobond_types::{
    AccountId, Amount, AssetId, BalanceDelta, ClaimSplit, DeploymentConfig, MarketId, PoolBinding,
    PoolId, PoolKey, Result, SwapParams, Timestamp, constants,
};

use crate::{BondHook, SettlementEngine};

#[derive(Debug, Clone)]
pub struct Deployment<R = MarketRegistry> {
    tokens: TokenLedger,
    pool_manager: PoolManager,
    registry: R,
    engine: SettlementEngine,
}

impl Deployment<MarketRegistry> {
    /// Fresh deployment with component addresses derived from `config`.
    pub fn new(config: &DeploymentConfig) -> Result<Self> {
        config.validate()?;
        Self::with_registry(config, MarketRegistry::new(config.registry_address()))
    }

    pub fn create_market(
        &mut self,
        yield_bearing_asset: AssetId,
        underlying_asset: AssetId,
        expiry: Timestamp,
        initial_apr_bps: u32,
        now: Timestamp,
    ) -> Result<MarketId> {
        self.with_registry_mut(|registry, tokens| {
            registry.create_market(
                tokens,
                yield_bearing_asset,
                underlying_asset,
                expiry,
                initial_apr_bps,
                now,
            )
        })
    }

    pub fn mint(
        &mut self,
        caller: AccountId,
        market: MarketId,
        amount: Amount,
        now: Timestamp,
    ) -> Result<ClaimSplit> {
        self.with_registry_mut(|registry, tokens| {
            registry.mint(tokens, caller, market, amount, now)
        })
    }

    pub fn redeem(
        &mut self,
        caller: AccountId,
        market: MarketId,
        amount: Amount,
        now: Timestamp,
    ) -> Result<ClaimSplit> {
        self.with_registry_mut(|registry, tokens| {
            registry.redeem(tokens, caller, market, amount, now)
        })
    }

    pub fn verify_conservation(&self, market: MarketId) -> Result<()> {
        self.registry.verify_conservation(&self.tokens, market)
    }
}

impl<R: MarketRedeemer + Clone> Deployment<R> {
    /// Deployment around a caller-supplied registry.
    pub fn with_registry(config: &DeploymentConfig, registry: R) -> Result<Self> {
        config.validate()?;
        let engine = SettlementEngine::new(config.engine_address(), &config.engine);
        tracing::info!(
            registry = %registry.address(),
            engine = %engine.address(),
            pool_manager = %config.pool_manager_address(),
            version = constants::VERSION,
            "{} deployment created",
            constants::PROTOCOL_NAME
        );
        Ok(Self {
            tokens: TokenLedger::new(),
            pool_manager: PoolManager::new(config.pool_manager_address()),
            registry,
            engine,
        })
    }

    #[must_use]
    pub fn tokens(&self) -> &TokenLedger {
        &self.tokens
    }

    /// Direct ledger access for funding accounts and approvals.
    pub fn tokens_mut(&mut self) -> &mut TokenLedger {
        &mut self.tokens
    }

    #[must_use]
    pub fn pool_manager(&self) -> &PoolManager {
        &self.pool_manager
    }

    #[must_use]
    pub fn registry(&self) -> &R {
        &self.registry
    }

    #[must_use]
    pub fn engine(&self) -> &SettlementEngine {
        &self.engine
    }

    /// Run `op`, restoring the pre-call state if it fails.
    pub fn atomically<T>(&mut self, op: impl FnOnce(&mut Self) -> Result<T>) -> Result<T> {
        let snapshot = self.clone();
        let result = op(self);
        if let Err(err) = &result {
            tracing::warn!(error = %err, "Operation failed, state rolled back");
            *self = snapshot;
        }
        result
    }

    /// Run a registry operation atomically.
    pub fn with_registry_mut<T>(
        &mut self,
        op: impl FnOnce(&mut R, &mut TokenLedger) -> Result<T>,
    ) -> Result<T> {
        self.atomically(|d| op(&mut d.registry, &mut d.tokens))
    }

    // -----------------------------------------------------------------------
    // Pools
    // -----------------------------------------------------------------------

    /// Key of the dynamic-fee pool for `a`/`b` hooked by this engine.
    pub fn hooked_pool_key(&self, a: AssetId, b: AssetId) -> Result<PoolKey> {
        PoolKey::new(a, b, constants::DYNAMIC_FEE_FLAG, Some(self.engine.address()))
    }

    pub fn initialize_pool(&mut self, key: PoolKey) -> Result<PoolId> {
        self.atomically(|d| {
            if key.hooks == Some(d.engine.address()) {
                let mut hook = BondHook::new(&mut d.engine, &mut d.registry);
                d.pool_manager.initialize(key, Some(&mut hook))
            } else {
                d.pool_manager.initialize(key, None)
            }
        })
    }

    pub fn set_pool_mapping(
        &mut self,
        caller: AccountId,
        pool: PoolId,
        market: MarketId,
    ) -> Result<()> {
        self.atomically(|d| d.engine.set_pool_mapping(&d.registry, caller, pool, market))
    }

    #[must_use]
    pub fn market_id_for_pool(&self, pool: PoolId) -> PoolBinding {
        self.engine.market_id_for_pool(pool)
    }

    /// Deposit through the engine's liquidity path.
    pub fn add_liquidity(
        &mut self,
        caller: AccountId,
        pool: PoolId,
        amount_each: Amount,
    ) -> Result<()> {
        self.atomically(|d| {
            d.engine
                .add_liquidity(&mut d.pool_manager, &mut d.tokens, caller, pool, amount_each)
        })
    }

    /// Deposit straight into the pool manager's native reserves.
    pub fn add_native_liquidity(
        &mut self,
        provider: AccountId,
        key: &PoolKey,
        amount0: Amount,
        amount1: Amount,
    ) -> Result<()> {
        self.atomically(|d| {
            if key.hooks == Some(d.engine.address()) {
                let mut hook = BondHook::new(&mut d.engine, &mut d.registry);
                d.pool_manager
                    .add_liquidity(&mut d.tokens, Some(&mut hook), provider, key, amount0, amount1)
            } else {
                d.pool_manager
                    .add_liquidity(&mut d.tokens, None, provider, key, amount0, amount1)
            }
        })
    }

    #[must_use]
    pub fn claim_balance(&self, asset: AssetId) -> Amount {
        self.engine.claim_balance(&self.pool_manager, asset)
    }

    /// Swap for `sender`, who must have approved the pool manager for the input.
    pub fn swap(
        &mut self,
        sender: AccountId,
        key: &PoolKey,
        params: &SwapParams,
        now: Timestamp,
    ) -> Result<BalanceDelta> {
        self.atomically(|d| {
            if key.hooks == Some(d.engine.address()) {
                let mut hook = BondHook::new(&mut d.engine, &mut d.registry);
                d.pool_manager
                    .swap(&mut d.tokens, Some(&mut hook), sender, key, params, now)
            } else {
                d.pool_manager
                    .swap(&mut d.tokens, None, sender, key, params, now)
            }
        })
    }
}
