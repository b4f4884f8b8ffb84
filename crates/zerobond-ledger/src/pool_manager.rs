//! Hooked AMM pool manager with flash accounting.
//!
//! Every pool lives inside one manager, which holds the real token
//! balances for all of them. During an operation each participant
//! accumulates a signed per-asset delta (negative: owes the manager,
//! positive: is owed by it). `take` pays out and debits the delta,
//! `settle` pays in and credits it. Before a public operation returns,
//! every delta must be back at zero.
//!
//! The manager also keeps a claim-balance ledger: `take(.., as_claim)`
//! credits an internal balance instead of transferring tokens out, so
//! the tokens stay in the manager's custody.
//!
//! The native curve is constant-product, exact-input only, with the LP
//! fee charged on the input.

use std::collections::HashMap;

use zerobond_types::{
    AccountId, Amount, AssetId, BalanceDelta, BeforeSwapOutcome, PoolId, PoolKey, Result,
    SwapParams, Timestamp, ZerobondError, checked_add, constants, mul_div, to_delta,
};

use crate::{SwapHook, TokenLedger};

/// State of one initialized pool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pool {
    pub key: PoolKey,
    /// Current LP fee in pips. Zero until a hook sets it on dynamic-fee pools.
    pub lp_fee: u32,
    pub reserve0: Amount,
    pub reserve1: Amount,
}

impl Pool {
    fn reserves(&self, zero_for_one: bool) -> (Amount, Amount) {
        if zero_for_one {
            (self.reserve0, self.reserve1)
        } else {
            (self.reserve1, self.reserve0)
        }
    }
}

#[derive(Debug, Clone)]
pub struct PoolManager {
    address: AccountId,
    pools: HashMap<PoolId, Pool>,
    claims: HashMap<(AccountId, AssetId), Amount>,
    deltas: HashMap<(AccountId, AssetId), i128>,
}

impl PoolManager {
    #[must_use]
    pub fn new(address: AccountId) -> Self {
        Self {
            address,
            pools: HashMap::new(),
            claims: HashMap::new(),
            deltas: HashMap::new(),
        }
    }

    /// Account holding the manager's token balances.
    #[must_use]
    pub fn address(&self) -> AccountId {
        self.address
    }

    #[must_use]
    pub fn pool(&self, pool_id: PoolId) -> Option<&Pool> {
        self.pools.get(&pool_id)
    }

    pub fn pool_key(&self, pool_id: PoolId) -> Result<PoolKey> {
        self.pools
            .get(&pool_id)
            .map(|p| p.key)
            .ok_or(ZerobondError::PoolNotFound(pool_id))
    }

    #[must_use]
    pub fn claim_balance_of(&self, holder: AccountId, asset: AssetId) -> Amount {
        self.claims.get(&(holder, asset)).copied().unwrap_or(0)
    }

    /// Outstanding flash delta of `account` in `asset`.
    #[must_use]
    pub fn delta_of(&self, account: AccountId, asset: AssetId) -> i128 {
        self.deltas.get(&(account, asset)).copied().unwrap_or(0)
    }

    // -----------------------------------------------------------------------
    // Pools
    // -----------------------------------------------------------------------

    /// Create a pool and run the hook's `after_initialize` callback.
    pub fn initialize(
        &mut self,
        key: PoolKey,
        hook: Option<&mut dyn SwapHook>,
    ) -> Result<PoolId> {
        if key.currency0 >= key.currency1 {
            return Err(ZerobondError::InvalidPoolKey {
                reason: "currencies must be sorted and distinct".into(),
            });
        }
        if !key.is_dynamic_fee() && key.fee > constants::MAX_LP_FEE {
            return Err(ZerobondError::InvalidPoolKey {
                reason: format!("fee {} exceeds {}", key.fee, constants::MAX_LP_FEE),
            });
        }
        check_hook(&key, hook.as_deref())?;

        let pool_id = key.id();
        if self.pools.contains_key(&pool_id) {
            return Err(ZerobondError::PoolAlreadyInitialized(pool_id));
        }

        let lp_fee = if key.is_dynamic_fee() { 0 } else { key.fee };
        self.pools.insert(
            pool_id,
            Pool {
                key,
                lp_fee,
                reserve0: 0,
                reserve1: 0,
            },
        );

        if let Some(hook) = hook {
            if let Err(err) = hook.after_initialize(self, &key) {
                self.pools.remove(&pool_id);
                return Err(err);
            }
        }

        tracing::info!(pool = %pool_id, %key, "Pool initialized");
        Ok(pool_id)
    }

    /// Update the LP fee of a dynamic-fee pool. Only the pool's hook may call.
    pub fn set_dynamic_fee(&mut self, caller: AccountId, pool_id: PoolId, fee: u32) -> Result<()> {
        let pool = self
            .pools
            .get_mut(&pool_id)
            .ok_or(ZerobondError::PoolNotFound(pool_id))?;
        if pool.key.hooks != Some(caller) {
            return Err(ZerobondError::Unauthorized {
                caller,
                reason: "only the pool's hook may set its fee".into(),
            });
        }
        if !pool.key.is_dynamic_fee() {
            return Err(ZerobondError::InvalidPoolKey {
                reason: "pool does not use a dynamic fee".into(),
            });
        }
        if fee > constants::MAX_LP_FEE {
            return Err(ZerobondError::InvalidPoolKey {
                reason: format!("fee {fee} exceeds {}", constants::MAX_LP_FEE),
            });
        }
        pool.lp_fee = fee;
        tracing::debug!(pool = %pool_id, fee, "Dynamic LP fee updated");
        Ok(())
    }

    /// Deposit native liquidity. `provider` must have approved the manager.
    pub fn add_liquidity(
        &mut self,
        tokens: &mut TokenLedger,
        hook: Option<&mut dyn SwapHook>,
        provider: AccountId,
        key: &PoolKey,
        amount0: Amount,
        amount1: Amount,
    ) -> Result<()> {
        let pool_id = key.id();
        if !self.pools.contains_key(&pool_id) {
            return Err(ZerobondError::PoolNotFound(pool_id));
        }
        check_hook(key, hook.as_deref())?;
        if let Some(hook) = hook {
            hook.before_add_liquidity(key)?;
        }

        for (asset, amount) in [(key.currency0, amount0), (key.currency1, amount1)] {
            self.ensure_can_pull(tokens, asset, provider, amount)?;
        }
        let manager = self.address;
        tokens.transfer_from(key.currency0, manager, provider, manager, amount0)?;
        tokens.transfer_from(key.currency1, manager, provider, manager, amount1)?;

        if let Some(pool) = self.pools.get_mut(&pool_id) {
            pool.reserve0 = checked_add(pool.reserve0, amount0)?;
            pool.reserve1 = checked_add(pool.reserve1, amount1)?;
        }
        tracing::info!(
            pool = %pool_id,
            %provider,
            amount0 = %amount0,
            amount1 = %amount1,
            "Native liquidity added"
        );
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Flash accounting
    // -----------------------------------------------------------------------

    /// Pay `amount` of `asset` out to `recipient`, debiting `caller`'s delta.
    ///
    /// With `as_claim` the recipient's claim balance is credited instead of
    /// transferring tokens out of the manager.
    pub fn take(
        &mut self,
        tokens: &mut TokenLedger,
        caller: AccountId,
        asset: AssetId,
        recipient: AccountId,
        amount: Amount,
        as_claim: bool,
    ) -> Result<()> {
        let delta = to_delta(amount)?;
        if as_claim {
            let balance = checked_add(self.claim_balance_of(recipient, asset), amount)?;
            self.claims.insert((recipient, asset), balance);
        } else {
            tokens.transfer(asset, self.address, recipient, amount)?;
        }
        self.account_delta(caller, asset, -delta);
        Ok(())
    }

    /// Pay `amount` of `asset` in from `payer`, crediting `caller`'s delta.
    ///
    /// When `payer` is the caller, the manager pulls with its own allowance
    /// from the caller; otherwise the caller moves the payer's tokens with
    /// the caller's allowance. With `from_claim` the caller's own claim
    /// balance is burned instead.
    pub fn settle(
        &mut self,
        tokens: &mut TokenLedger,
        caller: AccountId,
        asset: AssetId,
        payer: AccountId,
        amount: Amount,
        from_claim: bool,
    ) -> Result<()> {
        let delta = to_delta(amount)?;
        if from_claim {
            if payer != caller {
                return Err(ZerobondError::Unauthorized {
                    caller,
                    reason: "claim balances can only be settled by their holder".into(),
                });
            }
            let available = self.claim_balance_of(payer, asset);
            if available < amount {
                return Err(ZerobondError::InsufficientBalance {
                    asset,
                    needed: amount,
                    available,
                });
            }
            self.claims.insert((payer, asset), available - amount);
        } else {
            let spender = if payer == caller { self.address } else { caller };
            tokens.transfer_from(asset, spender, payer, self.address, amount)?;
        }
        self.account_delta(caller, asset, delta);
        Ok(())
    }

    /// Fail unless every flash delta is zero; clears the delta table.
    pub fn ensure_settled(&mut self) -> Result<()> {
        let mut outstanding: Vec<_> = self
            .deltas
            .iter()
            .filter(|(_, delta)| **delta != 0)
            .map(|(key, delta)| (*key, *delta))
            .collect();
        outstanding.sort_unstable_by_key(|((account, asset), _)| (*account, *asset));
        if let Some(((account, asset), delta)) = outstanding.first() {
            return Err(ZerobondError::CurrencyNotSettled {
                account: *account,
                asset: *asset,
                delta: *delta,
            });
        }
        self.deltas.clear();
        Ok(())
    }

    fn account_delta(&mut self, account: AccountId, asset: AssetId, change: i128) {
        if change == 0 {
            return;
        }
        *self.deltas.entry((account, asset)).or_insert(0) += change;
    }

    // -----------------------------------------------------------------------
    // Swaps
    // -----------------------------------------------------------------------

    /// Route a swap for `sender` and settle it on the sender's behalf.
    ///
    /// The hook's `before_swap` runs first; whatever it does not fill goes
    /// through the native curve. The sender then pays every negative delta
    /// (manager pulls with its allowance) and receives every positive one.
    /// Returns the sender's delta.
    pub fn swap(
        &mut self,
        tokens: &mut TokenLedger,
        hook: Option<&mut dyn SwapHook>,
        sender: AccountId,
        key: &PoolKey,
        params: &SwapParams,
        now: Timestamp,
    ) -> Result<BalanceDelta> {
        if params.amount_specified == 0 {
            return Err(ZerobondError::InvalidSwap {
                reason: "amount specified is zero".into(),
            });
        }
        let pool_id = key.id();
        if !self.pools.contains_key(&pool_id) {
            return Err(ZerobondError::PoolNotFound(pool_id));
        }
        check_hook(key, hook.as_deref())?;

        let (hook_address, outcome) = match hook {
            Some(hook) => {
                let outcome = hook.before_swap(self, tokens, sender, key, params, now)?;
                (Some(hook.address()), outcome)
            }
            None => (None, BeforeSwapOutcome::pass_through()),
        };

        let amount_to_swap = params
            .amount_specified
            .checked_add(outcome.delta.specified)
            .ok_or(ZerobondError::AmountOverflow)?;
        let native = if amount_to_swap == 0 {
            BalanceDelta::ZERO
        } else {
            self.swap_native(pool_id, params.zero_for_one, amount_to_swap, outcome.fee_override)?
        };

        let specified = params.specified_currency(key);
        let mut hook_delta = BalanceDelta::ZERO;
        for (asset, amount) in [
            (specified, outcome.delta.specified),
            (params.unspecified_currency(key), outcome.delta.unspecified),
        ] {
            if asset == key.currency0 {
                hook_delta.amount0 = amount;
            } else {
                hook_delta.amount1 = amount;
            }
        }
        let swapper = BalanceDelta::new(
            native
                .amount0
                .checked_sub(hook_delta.amount0)
                .ok_or(ZerobondError::AmountOverflow)?,
            native
                .amount1
                .checked_sub(hook_delta.amount1)
                .ok_or(ZerobondError::AmountOverflow)?,
        );

        if let Some(hook_address) = hook_address {
            self.account_delta(hook_address, key.currency0, hook_delta.amount0);
            self.account_delta(hook_address, key.currency1, hook_delta.amount1);
        }
        self.account_delta(sender, key.currency0, swapper.amount0);
        self.account_delta(sender, key.currency1, swapper.amount1);

        let legs = [
            (key.currency0, swapper.amount0),
            (key.currency1, swapper.amount1),
        ];
        for (asset, amount) in legs {
            let magnitude = amount.unsigned_abs();
            if amount < 0 {
                self.settle(tokens, sender, asset, sender, magnitude, false)?;
            } else if amount > 0 {
                self.take(tokens, sender, asset, sender, magnitude, false)?;
            }
        }
        self.ensure_settled()?;

        tracing::debug!(
            pool = %pool_id,
            %sender,
            amount0 = %swapper.amount0,
            amount1 = %swapper.amount1,
            hooked = !outcome.is_pass_through(),
            "Swap settled"
        );
        Ok(swapper)
    }

    /// Constant-product exact-input swap against the pool's reserves.
    fn swap_native(
        &mut self,
        pool_id: PoolId,
        zero_for_one: bool,
        amount_to_swap: i128,
        fee_override: u32,
    ) -> Result<BalanceDelta> {
        if amount_to_swap > 0 {
            return Err(ZerobondError::InvalidSwap {
                reason: "native curve only supports exact-input swaps".into(),
            });
        }
        let pool = self
            .pools
            .get_mut(&pool_id)
            .ok_or(ZerobondError::PoolNotFound(pool_id))?;

        let fee = if fee_override & constants::OVERRIDE_FEE_FLAG == 0 {
            pool.lp_fee
        } else {
            fee_override & !constants::OVERRIDE_FEE_FLAG
        };
        if fee > constants::MAX_LP_FEE {
            return Err(ZerobondError::InvalidSwap {
                reason: format!("fee {fee} exceeds {}", constants::MAX_LP_FEE),
            });
        }

        let amount_in = amount_to_swap.unsigned_abs();
        let (reserve_in, reserve_out) = pool.reserves(zero_for_one);
        let denominator = Amount::from(constants::FEE_DENOMINATOR);
        let after_fee = mul_div(amount_in, denominator - Amount::from(fee), denominator)
            .ok_or(ZerobondError::AmountOverflow)?;
        let amount_out = mul_div(reserve_out, after_fee, checked_add(reserve_in, after_fee)?)
            .ok_or(ZerobondError::InsufficientLiquidity(pool_id))?;
        if amount_out == 0 || amount_out >= reserve_out {
            return Err(ZerobondError::InsufficientLiquidity(pool_id));
        }

        let new_in = checked_add(reserve_in, amount_in)?;
        let new_out = reserve_out - amount_out;
        if zero_for_one {
            pool.reserve0 = new_in;
            pool.reserve1 = new_out;
        } else {
            pool.reserve1 = new_in;
            pool.reserve0 = new_out;
        }

        let paid = -to_delta(amount_in)?;
        let received = to_delta(amount_out)?;
        Ok(if zero_for_one {
            BalanceDelta::new(paid, received)
        } else {
            BalanceDelta::new(received, paid)
        })
    }

    fn ensure_can_pull(
        &self,
        tokens: &TokenLedger,
        asset: AssetId,
        owner: AccountId,
        amount: Amount,
    ) -> Result<()> {
        let allowed = tokens.allowance(asset, owner, self.address);
        if allowed < amount {
            return Err(ZerobondError::InsufficientAllowance {
                asset,
                needed: amount,
                available: allowed,
            });
        }
        let available = tokens.balance_of(asset, owner);
        if available < amount {
            return Err(ZerobondError::InsufficientBalance {
                asset,
                needed: amount,
                available,
            });
        }
        Ok(())
    }
}

/// The supplied hook must be exactly the one the key names.
fn check_hook(key: &PoolKey, hook: Option<&dyn SwapHook>) -> Result<()> {
    match (key.hooks, hook.map(SwapHook::address)) {
        (None, None) => Ok(()),
        (Some(expected), Some(actual)) if expected == actual => Ok(()),
        (expected, actual) => Err(ZerobondError::InvalidPoolKey {
            reason: format!("hook mismatch: key names {expected:?}, call supplied {actual:?}"),
        }),
    }
}

#[cfg(test)]
mod tests {
    use zerobond_types::BeforeSwapDelta;

    use super::*;
    use crate::AssetMetadata;

    const WAD: Amount = 1_000_000_000_000_000_000;

    struct Fixture {
        tokens: TokenLedger,
        pm: PoolManager,
        issuer: AccountId,
        a: AssetId,
        b: AssetId,
    }

    fn fixture() -> Fixture {
        let mut tokens = TokenLedger::new();
        let issuer = AccountId::derived("issuer");
        let a = tokens.deploy_new(AssetMetadata::new("Alpha", "A", 18, issuer));
        let b = tokens.deploy_new(AssetMetadata::new("Beta", "B", 18, issuer));
        Fixture {
            tokens,
            pm: PoolManager::new(AccountId::derived("pool-manager")),
            issuer,
            a,
            b,
        }
    }

    impl Fixture {
        fn fund(&mut self, who: AccountId, amount: Amount) {
            for asset in [self.a, self.b] {
                self.tokens.mint(self.issuer, asset, who, amount).unwrap();
                self.tokens
                    .approve(asset, who, self.pm.address(), Amount::MAX)
                    .unwrap();
            }
        }
    }

    /// Fills every swap one-for-one out of its own token balance.
    struct OneForOneHook {
        address: AccountId,
        calls: usize,
    }

    impl SwapHook for OneForOneHook {
        fn address(&self) -> AccountId {
            self.address
        }

        fn before_swap(
            &mut self,
            pm: &mut PoolManager,
            tokens: &mut TokenLedger,
            _sender: AccountId,
            key: &PoolKey,
            params: &SwapParams,
            _now: Timestamp,
        ) -> Result<BeforeSwapOutcome> {
            self.calls += 1;
            let (input, output) = key.swap_currencies(params.zero_for_one);
            let amount = params.amount();
            pm.take(tokens, self.address, input, self.address, amount, false)?;
            pm.settle(tokens, self.address, output, self.address, amount, false)?;
            Ok(BeforeSwapOutcome {
                delta: BeforeSwapDelta::one_for_one(params),
                fee_override: 0,
            })
        }
    }

    #[test]
    fn initialize_rejects_duplicates() {
        let mut f = fixture();
        let key = PoolKey::new(f.a, f.b, 3_000, None).unwrap();
        let id = f.pm.initialize(key, None).unwrap();
        assert_eq!(f.pm.pool(id).unwrap().lp_fee, 3_000);
        assert!(matches!(
            f.pm.initialize(key, None).unwrap_err(),
            ZerobondError::PoolAlreadyInitialized(_)
        ));
    }

    #[test]
    fn initialize_requires_matching_hook() {
        let mut f = fixture();
        let mut hook = OneForOneHook {
            address: AccountId::derived("hook"),
            calls: 0,
        };
        let key = PoolKey::new(f.a, f.b, 3_000, Some(AccountId::derived("other"))).unwrap();
        let err = f.pm.initialize(key, Some(&mut hook)).unwrap_err();
        assert!(matches!(err, ZerobondError::InvalidPoolKey { .. }));

        let key = PoolKey::new(f.a, f.b, 3_000, Some(hook.address)).unwrap();
        assert!(f.pm.initialize(key, None).is_err());
        assert!(f.pm.initialize(key, Some(&mut hook)).is_ok());
    }

    #[test]
    fn dynamic_fee_only_set_by_hook() {
        let mut f = fixture();
        let hook_addr = AccountId::derived("hook");
        let mut hook = OneForOneHook {
            address: hook_addr,
            calls: 0,
        };
        let key = PoolKey::new(f.a, f.b, constants::DYNAMIC_FEE_FLAG, Some(hook_addr)).unwrap();
        let id = f.pm.initialize(key, Some(&mut hook)).unwrap();
        assert_eq!(f.pm.pool(id).unwrap().lp_fee, 0);

        let err = f.pm.set_dynamic_fee(AccountId::new(), id, 500).unwrap_err();
        assert!(matches!(err, ZerobondError::Unauthorized { .. }));
        f.pm.set_dynamic_fee(hook_addr, id, 500).unwrap();
        assert_eq!(f.pm.pool(id).unwrap().lp_fee, 500);
        assert!(f.pm.set_dynamic_fee(hook_addr, id, constants::MAX_LP_FEE + 1).is_err());
    }

    #[test]
    fn take_and_settle_must_net_to_zero() {
        let mut f = fixture();
        let alice = AccountId::new();
        f.fund(alice, 10 * WAD);
        let asset = f.a;

        f.pm
            .settle(&mut f.tokens, alice, asset, alice, 4 * WAD, false)
            .unwrap();
        assert_eq!(f.pm.delta_of(alice, asset), 4 * WAD as i128);
        let err = f.pm.ensure_settled().unwrap_err();
        assert!(matches!(err, ZerobondError::CurrencyNotSettled { .. }));

        f.pm
            .take(&mut f.tokens, alice, asset, alice, 4 * WAD, true)
            .unwrap();
        assert_eq!(f.pm.claim_balance_of(alice, asset), 4 * WAD);
        f.pm.ensure_settled().unwrap();
        assert_eq!(f.tokens.balance_of(asset, f.pm.address()), 4 * WAD);
    }

    #[test]
    fn settle_from_claim_burns_claims() {
        let mut f = fixture();
        let alice = AccountId::new();
        f.fund(alice, WAD);
        let asset = f.b;
        f.pm.settle(&mut f.tokens, alice, asset, alice, WAD, false).unwrap();
        f.pm.take(&mut f.tokens, alice, asset, alice, WAD, true).unwrap();
        f.pm.ensure_settled().unwrap();

        f.pm.settle(&mut f.tokens, alice, asset, alice, WAD, true).unwrap();
        f.pm.take(&mut f.tokens, alice, asset, alice, WAD, false).unwrap();
        f.pm.ensure_settled().unwrap();
        assert_eq!(f.pm.claim_balance_of(alice, asset), 0);
        assert_eq!(f.tokens.balance_of(asset, alice), WAD);
    }

    #[test]
    fn native_swap_constant_product() {
        let mut f = fixture();
        let lp = AccountId::new();
        let trader = AccountId::new();
        f.fund(lp, 100 * WAD);
        f.fund(trader, 10 * WAD);
        let key = PoolKey::new(f.a, f.b, 0, None).unwrap();
        f.pm.initialize(key, None).unwrap();
        f.pm
            .add_liquidity(&mut f.tokens, None, lp, &key, 100 * WAD, 100 * WAD)
            .unwrap();

        let params = SwapParams::exact_input(true, 10 * WAD).unwrap();
        let delta = f.pm.swap(&mut f.tokens, None, trader, &key, &params, 0).unwrap();
        // 100 × 10 / 110 = 9.0909...
        assert_eq!(delta.amount0, -(10 * WAD as i128));
        assert_eq!(delta.amount1, 9_090_909_090_909_090_909);
        assert_eq!(f.tokens.balance_of(key.currency0, trader), 0);
        assert_eq!(
            f.tokens.balance_of(key.currency1, trader),
            10 * WAD + 9_090_909_090_909_090_909
        );
    }

    #[test]
    fn native_curve_rejects_exact_output() {
        let mut f = fixture();
        let lp = AccountId::new();
        f.fund(lp, 100 * WAD);
        let key = PoolKey::new(f.a, f.b, 3_000, None).unwrap();
        f.pm.initialize(key, None).unwrap();
        f.pm
            .add_liquidity(&mut f.tokens, None, lp, &key, 100 * WAD, 100 * WAD)
            .unwrap();
        let params = SwapParams::exact_output(true, WAD).unwrap();
        let err = f.pm.swap(&mut f.tokens, None, lp, &key, &params, 0).unwrap_err();
        assert!(matches!(err, ZerobondError::InvalidSwap { .. }));
    }

    #[test]
    fn empty_pool_has_no_liquidity() {
        let mut f = fixture();
        let trader = AccountId::new();
        f.fund(trader, WAD);
        let key = PoolKey::new(f.a, f.b, 3_000, None).unwrap();
        f.pm.initialize(key, None).unwrap();
        let params = SwapParams::exact_input(false, WAD).unwrap();
        let err = f.pm.swap(&mut f.tokens, None, trader, &key, &params, 0).unwrap_err();
        assert!(matches!(err, ZerobondError::InsufficientLiquidity(_)));
    }

    #[test]
    fn hook_fills_swap_one_for_one() {
        let mut f = fixture();
        let hook_addr = AccountId::derived("hook");
        let mut hook = OneForOneHook {
            address: hook_addr,
            calls: 0,
        };
        let trader = AccountId::new();
        f.fund(trader, 5 * WAD);
        f.fund(hook_addr, 5 * WAD);
        // The manager needs inventory of the input side for the hook's take.
        let seed = AccountId::new();
        f.fund(seed, 5 * WAD);
        for asset in [f.a, f.b] {
            f.tokens.transfer(asset, seed, f.pm.address(), 5 * WAD).unwrap();
        }

        let key = PoolKey::new(f.a, f.b, 3_000, Some(hook_addr)).unwrap();
        f.pm.initialize(key, Some(&mut hook)).unwrap();

        let params = SwapParams::exact_input(true, 2 * WAD).unwrap();
        let delta = f
            .pm
            .swap(&mut f.tokens, Some(&mut hook), trader, &key, &params, 0)
            .unwrap();
        assert_eq!(hook.calls, 1);
        assert_eq!(delta, BalanceDelta::new(-(2 * WAD as i128), 2 * WAD as i128));
        assert_eq!(f.tokens.balance_of(key.currency0, trader), 3 * WAD);
        assert_eq!(f.tokens.balance_of(key.currency1, trader), 7 * WAD);
        assert_eq!(f.tokens.balance_of(key.currency0, hook_addr), 7 * WAD);
        assert_eq!(f.tokens.balance_of(key.currency1, hook_addr), 3 * WAD);
        assert_eq!(f.tokens.balance_of(key.currency0, f.pm.address()), 5 * WAD);
    }

    #[test]
    fn add_liquidity_checks_before_moving_tokens() {
        let mut f = fixture();
        let lp = AccountId::new();
        f.fund(lp, WAD);
        let key = PoolKey::new(f.a, f.b, 3_000, None).unwrap();
        f.pm.initialize(key, None).unwrap();
        let err = f
            .pm
            .add_liquidity(&mut f.tokens, None, lp, &key, WAD, 2 * WAD)
            .unwrap_err();
        assert!(matches!(err, ZerobondError::InsufficientBalance { .. }));
        assert_eq!(f.tokens.balance_of(key.currency0, lp), WAD);
    }
}
