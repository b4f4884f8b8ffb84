//! Settlement engine.
//!
//! Sits in front of hooked pools as their swap hook. Pools are bound to
//! bond markets by the operator; unbound pools, and pools whose market is
//! still active, pass straight through to the native curve.
//!
//! Once a bound market has expired, principal claims are worth exactly one
//! unit of the deposit asset, so the engine fills PT → deposit-asset swaps
//! itself:
//!
//! 1. Take the incoming principal from the pool manager
//! 2. Redeem it through the registry
//! 3. Confirm the registry paid in full
//! 4. Settle the deposit asset back into the pool manager
//!
//! and reports a one-for-one delta so the native curve sees nothing.
//!
//! The engine also provides the pools' liquidity path: deposits are held
//! as claim balances on the pool manager instead of native reserves.

use std::collections::BTreeMap;

use zerobond_ledger::{PoolManager, TokenLedger};
use zerobond_registry::MarketRedeemer;
use zerobond_types::{
    AccountId, Amount, AssetId, BeforeSwapDelta, BeforeSwapOutcome, BondMarket, EngineConfig,
    Event, MarketId, PoolBinding, PoolId, PoolKey, Result, SwapParams, Timestamp, ZerobondError,
};

#[derive(Debug, Clone)]
pub struct SettlementEngine {
    address: AccountId,
    operator: AccountId,
    initial_pool_fee: u32,
    pool_markets: BTreeMap<PoolId, MarketId>,
    events: Vec<Event>,
}

impl SettlementEngine {
    #[must_use]
    pub fn new(address: AccountId, config: &EngineConfig) -> Self {
        Self {
            address,
            operator: config.operator,
            initial_pool_fee: config.initial_pool_fee,
            pool_markets: BTreeMap::new(),
            events: Vec::new(),
        }
    }

    #[must_use]
    pub fn address(&self) -> AccountId {
        self.address
    }

    #[must_use]
    pub fn operator(&self) -> AccountId {
        self.operator
    }

    #[must_use]
    pub fn events(&self) -> &[Event] {
        &self.events
    }

    // -----------------------------------------------------------------------
    // Pool ↔ market bindings
    // -----------------------------------------------------------------------

    /// Bind `pool` to `market`, replacing any earlier binding. Operator only.
    pub fn set_pool_mapping<R: MarketRedeemer>(
        &mut self,
        registry: &R,
        caller: AccountId,
        pool: PoolId,
        market: MarketId,
    ) -> Result<()> {
        if caller != self.operator {
            return Err(ZerobondError::Unauthorized {
                caller,
                reason: "only the operator may map pools".into(),
            });
        }
        if registry.market(market).is_none() {
            return Err(ZerobondError::MarketNotFound(market));
        }
        let previous = self.pool_markets.insert(pool, market);
        tracing::info!(%pool, %market, replaced = previous.is_some(), "Pool mapped to market");
        self.events.push(Event::PoolMarketMappingSet { pool, market });
        Ok(())
    }

    #[must_use]
    pub fn market_id_for_pool(&self, pool: PoolId) -> PoolBinding {
        self.pool_markets.get(&pool).copied().into()
    }

    pub fn bond_market_for_pool<'r, R: MarketRedeemer>(
        &self,
        registry: &'r R,
        pool: PoolId,
    ) -> Option<&'r BondMarket> {
        self.market_id_for_pool(pool)
            .market_id()
            .and_then(|id| registry.market(id))
    }

    // -----------------------------------------------------------------------
    // Hook callbacks
    // -----------------------------------------------------------------------

    /// Give a freshly initialized pool its starting LP fee.
    pub fn on_pool_initialized(
        &mut self,
        pool_manager: &mut PoolManager,
        key: &PoolKey,
    ) -> Result<()> {
        if !key.is_dynamic_fee() {
            return Err(ZerobondError::InvalidPoolKey {
                reason: "hooked pools must use a dynamic fee".into(),
            });
        }
        pool_manager.set_dynamic_fee(self.address, key.id(), self.initial_pool_fee)
    }

    /// Decide how a swap on a hooked pool executes.
    pub fn before_swap<R: MarketRedeemer>(
        &mut self,
        registry: &mut R,
        pool_manager: &mut PoolManager,
        tokens: &mut TokenLedger,
        key: &PoolKey,
        params: &SwapParams,
        now: Timestamp,
    ) -> Result<BeforeSwapOutcome> {
        let pool = key.id();
        let Some(market) = self.bond_market_for_pool(registry, pool).cloned() else {
            tracing::debug!(%pool, "Unmapped pool, passing through");
            return Ok(BeforeSwapOutcome::pass_through());
        };
        if !market.is_expired(now) {
            tracing::debug!(%pool, market = %market.id, now, "Market active, passing through");
            return Ok(BeforeSwapOutcome::pass_through());
        }

        let principal = market.principal_token;
        if !key.contains(principal) {
            return Err(ZerobondError::InvalidMarketMapping {
                pool,
                reason: format!("pool does not trade principal token {principal}"),
            });
        }
        let counterpart = if key.currency0 == principal {
            key.currency1
        } else {
            key.currency0
        };
        if counterpart != market.yield_bearing_asset {
            return Err(ZerobondError::InvalidMarketMapping {
                pool,
                reason: format!(
                    "principal paired with {counterpart}, market deposit asset is {}",
                    market.yield_bearing_asset
                ),
            });
        }

        let (input, _) = key.swap_currencies(params.zero_for_one);
        if input != principal {
            tracing::warn!(%pool, market = %market.id, "Rejected swap into principal after expiry");
            return Err(ZerobondError::UnsupportedDirection(pool));
        }
        let amount = params.amount();
        if amount == 0 {
            return Err(ZerobondError::ZeroAmount);
        }

        self.redeem_through_pool(registry, pool_manager, tokens, &market, amount, now)?;

        tracing::info!(
            %pool,
            market = %market.id,
            amount = %amount,
            exact_input = params.is_exact_input(),
            "Expired swap settled through redemption"
        );
        Ok(BeforeSwapOutcome {
            delta: BeforeSwapDelta::one_for_one(params),
            fee_override: 0,
        })
    }

    fn redeem_through_pool<R: MarketRedeemer>(
        &self,
        registry: &mut R,
        pool_manager: &mut PoolManager,
        tokens: &mut TokenLedger,
        market: &BondMarket,
        amount: Amount,
        now: Timestamp,
    ) -> Result<()> {
        let deposit_asset = market.yield_bearing_asset;

        pool_manager.take(
            tokens,
            self.address,
            market.principal_token,
            self.address,
            amount,
            false,
        )?;
        self.ensure_allowance(tokens, market.principal_token, registry.address(), amount)?;

        let before = tokens.balance_of(deposit_asset, self.address);
        registry.redeem(tokens, self.address, market.id, amount, now)?;
        let received = tokens
            .balance_of(deposit_asset, self.address)
            .saturating_sub(before);
        if received < amount {
            tracing::error!(
                market = %market.id,
                expected = %amount,
                received = %received,
                "Redemption paid short"
            );
            return Err(ZerobondError::RedemptionFailed {
                expected: amount,
                received,
            });
        }

        self.ensure_allowance(tokens, deposit_asset, pool_manager.address(), amount)?;
        pool_manager.settle(tokens, self.address, deposit_asset, self.address, amount, false)
    }

    /// Top `spender` up to an unlimited allowance when it cannot cover `amount`.
    fn ensure_allowance(
        &self,
        tokens: &mut TokenLedger,
        asset: AssetId,
        spender: AccountId,
        amount: Amount,
    ) -> Result<()> {
        if tokens.allowance(asset, self.address, spender) < amount {
            tokens.approve(asset, self.address, spender, Amount::MAX)?;
        }
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Liquidity
    // -----------------------------------------------------------------------

    /// Deposit `amount_each` of both pool assets from `caller` into the
    /// engine's claim balances. `caller` must have approved the engine.
    pub fn add_liquidity(
        &mut self,
        pool_manager: &mut PoolManager,
        tokens: &mut TokenLedger,
        caller: AccountId,
        pool: PoolId,
        amount_each: Amount,
    ) -> Result<()> {
        let key = pool_manager.pool_key(pool)?;
        if key.hooks != Some(self.address) {
            return Err(ZerobondError::InvalidPoolKey {
                reason: format!("pool {pool} is not hooked by this engine"),
            });
        }
        if amount_each == 0 {
            return Err(ZerobondError::ZeroAmount);
        }
        for asset in [key.currency0, key.currency1] {
            let allowed = tokens.allowance(asset, caller, self.address);
            if allowed < amount_each {
                return Err(ZerobondError::InsufficientAllowance {
                    asset,
                    needed: amount_each,
                    available: allowed,
                });
            }
            let available = tokens.balance_of(asset, caller);
            if available < amount_each {
                return Err(ZerobondError::InsufficientBalance {
                    asset,
                    needed: amount_each,
                    available,
                });
            }
        }

        for asset in [key.currency0, key.currency1] {
            pool_manager.settle(tokens, self.address, asset, caller, amount_each, false)?;
            pool_manager.take(tokens, self.address, asset, self.address, amount_each, true)?;
        }
        pool_manager.ensure_settled()?;

        tracing::info!(%pool, %caller, amount_each = %amount_each, "Liquidity added");
        Ok(())
    }

    /// The engine's claim balance of `asset` on the pool manager.
    #[must_use]
    pub fn claim_balance(&self, pool_manager: &PoolManager, asset: AssetId) -> Amount {
        pool_manager.claim_balance_of(self.address, asset)
    }
}

#[cfg(test)]
mod tests {
    use zerobond_ledger::AssetMetadata;
    use zerobond_registry::MarketRegistry;
    use zerobond_types::constants::{DYNAMIC_FEE_FLAG, INITIAL_POOL_FEE, SECONDS_PER_YEAR};

    use super::*;

    const WAD: Amount = 1_000_000_000_000_000_000;
    const START: Timestamp = 1_700_000_000;
    const EXPIRY: Timestamp = START + SECONDS_PER_YEAR;

    struct Fixture {
        tokens: TokenLedger,
        registry: MarketRegistry,
        pm: PoolManager,
        engine: SettlementEngine,
        operator: AccountId,
        ybt: AssetId,
        market: MarketId,
        key: PoolKey,
    }

    fn fixture() -> Fixture {
        let mut tokens = TokenLedger::new();
        let issuer = AccountId::derived("issuer");
        let underlying = tokens.deploy_new(AssetMetadata::new("Ether", "ETH", 18, issuer));
        let ybt = tokens.deploy_new(AssetMetadata::new("Staked Ether", "stETH", 18, issuer));
        let mut registry = MarketRegistry::new(AccountId::derived("registry"));
        let market = registry
            .create_market(&mut tokens, ybt, underlying, EXPIRY, 500, START)
            .unwrap();
        let operator = AccountId::derived("operator");
        let engine =
            SettlementEngine::new(AccountId::derived("engine"), &EngineConfig::new(operator));
        let pt = registry.market(market).unwrap().principal_token;
        let key = PoolKey::new(pt, ybt, DYNAMIC_FEE_FLAG, Some(engine.address())).unwrap();
        Fixture {
            tokens,
            registry,
            pm: PoolManager::new(AccountId::derived("pool-manager")),
            engine,
            operator,
            ybt,
            market,
            key,
        }
    }

    fn pt_in(f: &Fixture, amount: Amount) -> SwapParams {
        let pt = f.registry.market(f.market).unwrap().principal_token;
        SwapParams::exact_input(f.key.currency0 == pt, amount).unwrap()
    }

    #[test]
    fn mapping_is_operator_only() {
        let mut f = fixture();
        let pool = f.key.id();
        let err = f
            .engine
            .set_pool_mapping(&f.registry, AccountId::new(), pool, f.market)
            .unwrap_err();
        assert!(matches!(err, ZerobondError::Unauthorized { .. }));
        assert_eq!(f.engine.market_id_for_pool(pool), PoolBinding::Unmapped);

        f.engine
            .set_pool_mapping(&f.registry, f.operator, pool, f.market)
            .unwrap();
        assert_eq!(f.engine.market_id_for_pool(pool), PoolBinding::Mapped(f.market));
        assert_eq!(
            f.engine.bond_market_for_pool(&f.registry, pool).map(|m| m.id),
            Some(f.market)
        );
        assert_eq!(
            f.engine.events(),
            &[Event::PoolMarketMappingSet {
                pool,
                market: f.market
            }]
        );
    }

    #[test]
    fn mapping_requires_known_market_and_overwrites() {
        let mut f = fixture();
        let pool = f.key.id();
        let ghost = MarketId([0xee; 32]);
        assert_eq!(
            f.engine
                .set_pool_mapping(&f.registry, f.operator, pool, ghost)
                .unwrap_err(),
            ZerobondError::MarketNotFound(ghost)
        );

        let underlying = f.registry.market(f.market).unwrap().underlying_asset;
        let other = f
            .registry
            .create_market(&mut f.tokens, f.ybt, underlying, EXPIRY + 1, 500, START)
            .unwrap();
        f.engine.set_pool_mapping(&f.registry, f.operator, pool, f.market).unwrap();
        f.engine.set_pool_mapping(&f.registry, f.operator, pool, other).unwrap();
        assert_eq!(f.engine.market_id_for_pool(pool), PoolBinding::Mapped(other));
        assert_eq!(f.engine.events().len(), 2);
    }

    #[test]
    fn initialization_sets_initial_fee() {
        let mut f = fixture();
        let pool = f.key.id();
        assert!(f.pm.initialize(f.key, None).is_err());

        struct Probe<'a>(&'a mut SettlementEngine);
        impl zerobond_ledger::SwapHook for Probe<'_> {
            fn address(&self) -> AccountId {
                self.0.address()
            }
            fn after_initialize(&mut self, pm: &mut PoolManager, key: &PoolKey) -> Result<()> {
                self.0.on_pool_initialized(pm, key)
            }
            fn before_swap(
                &mut self,
                _: &mut PoolManager,
                _: &mut TokenLedger,
                _: AccountId,
                _: &PoolKey,
                _: &SwapParams,
                _: Timestamp,
            ) -> Result<BeforeSwapOutcome> {
                Ok(BeforeSwapOutcome::pass_through())
            }
        }

        f.pm.initialize(f.key, Some(&mut Probe(&mut f.engine))).unwrap();
        assert_eq!(f.pm.pool(pool).unwrap().lp_fee, INITIAL_POOL_FEE);
    }

    #[test]
    fn static_fee_pool_rejected_on_initialize() {
        let mut f = fixture();
        let key = PoolKey::new(
            f.key.currency0,
            f.key.currency1,
            3_000,
            Some(f.engine.address()),
        )
        .unwrap();
        let err = f.engine.on_pool_initialized(&mut f.pm, &key).unwrap_err();
        assert!(matches!(err, ZerobondError::InvalidPoolKey { .. }));
    }

    #[test]
    fn unmapped_and_active_pools_pass_through() {
        let mut f = fixture();
        let params = pt_in(&f, WAD);
        let outcome = f
            .engine
            .before_swap(&mut f.registry, &mut f.pm, &mut f.tokens, &f.key, &params, EXPIRY)
            .unwrap();
        assert!(outcome.is_pass_through());

        f.engine
            .set_pool_mapping(&f.registry, f.operator, f.key.id(), f.market)
            .unwrap();
        let outcome = f
            .engine
            .before_swap(&mut f.registry, &mut f.pm, &mut f.tokens, &f.key, &params, EXPIRY - 1)
            .unwrap();
        assert!(outcome.is_pass_through());
        assert_eq!(outcome.fee_override, 0);
    }

    #[test]
    fn expired_swap_shapes_are_validated() {
        let mut f = fixture();
        f.engine
            .set_pool_mapping(&f.registry, f.operator, f.key.id(), f.market)
            .unwrap();

        let reverse = SwapParams::exact_input(!pt_in(&f, WAD).zero_for_one, WAD).unwrap();
        let err = f
            .engine
            .before_swap(&mut f.registry, &mut f.pm, &mut f.tokens, &f.key, &reverse, EXPIRY)
            .unwrap_err();
        assert_eq!(err, ZerobondError::UnsupportedDirection(f.key.id()));

        let zero = SwapParams {
            zero_for_one: pt_in(&f, WAD).zero_for_one,
            amount_specified: 0,
        };
        let err = f
            .engine
            .before_swap(&mut f.registry, &mut f.pm, &mut f.tokens, &f.key, &zero, EXPIRY)
            .unwrap_err();
        assert_eq!(err, ZerobondError::ZeroAmount);
    }

    #[test]
    fn mismatched_pool_is_invalid_mapping() {
        let mut f = fixture();
        let stranger = f
            .tokens
            .deploy_new(AssetMetadata::new("Other", "OTH", 18, AccountId::new()));
        let pt = f.registry.market(f.market).unwrap().principal_token;
        let key = PoolKey::new(pt, stranger, DYNAMIC_FEE_FLAG, Some(f.engine.address())).unwrap();
        f.engine
            .set_pool_mapping(&f.registry, f.operator, key.id(), f.market)
            .unwrap();
        let params = SwapParams::exact_input(key.currency0 == pt, WAD).unwrap();
        let err = f
            .engine
            .before_swap(&mut f.registry, &mut f.pm, &mut f.tokens, &key, &params, EXPIRY)
            .unwrap_err();
        assert!(matches!(err, ZerobondError::InvalidMarketMapping { .. }));

        let no_pt =
            PoolKey::new(f.ybt, stranger, DYNAMIC_FEE_FLAG, Some(f.engine.address())).unwrap();
        f.engine
            .set_pool_mapping(&f.registry, f.operator, no_pt.id(), f.market)
            .unwrap();
        let err = f
            .engine
            .before_swap(&mut f.registry, &mut f.pm, &mut f.tokens, &no_pt, &params, EXPIRY)
            .unwrap_err();
        assert!(matches!(err, ZerobondError::InvalidMarketMapping { .. }));
    }

    #[test]
    fn add_liquidity_requires_engine_hook() {
        let mut f = fixture();
        let plain = PoolKey::new(f.key.currency0, f.key.currency1, 3_000, None).unwrap();
        let pool = f.pm.initialize(plain, None).unwrap();
        let err = f
            .engine
            .add_liquidity(&mut f.pm, &mut f.tokens, AccountId::new(), pool, WAD)
            .unwrap_err();
        assert!(matches!(err, ZerobondError::InvalidPoolKey { .. }));

        let err = f
            .engine
            .add_liquidity(&mut f.pm, &mut f.tokens, AccountId::new(), f.key.id(), WAD)
            .unwrap_err();
        assert!(matches!(err, ZerobondError::PoolNotFound(_)));
    }
}
