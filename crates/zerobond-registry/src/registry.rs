//! Market registry.
//!
//! Owns every [`BondMarket`], takes deposits of the yield-bearing asset
//! into custody, and is the sole minter of each market's claim tokens.
//!
//! Every mutating operation checks all of its preconditions before its
//! first write to the token ledger, so a failed call leaves both the
//! registry and the ledger untouched.

use std::collections::BTreeMap;

use zerobond_ledger::{AssetMetadata, TokenLedger};
use zerobond_pricing::{market_split, redemption_split};
use zerobond_types::{
    AccountId, Amount, AssetId, BondMarket, ClaimKind, ClaimSplit, Event, MarketId, Result,
    Timestamp, ZerobondError, checked_add,
};

use crate::custody::CustodyLedger;

/// The registry surface the settlement engine depends on.
pub trait MarketRedeemer {
    /// Account that holds custody and pulls claims on redemption.
    fn address(&self) -> AccountId;

    fn market(&self, id: MarketId) -> Option<&BondMarket>;

    /// Burn the claims for `amount` and pay `amount` of the deposit asset to `caller`.
    fn redeem(
        &mut self,
        tokens: &mut TokenLedger,
        caller: AccountId,
        market: MarketId,
        amount: Amount,
        now: Timestamp,
    ) -> Result<ClaimSplit>;
}

#[derive(Debug, Clone)]
pub struct MarketRegistry {
    address: AccountId,
    markets: BTreeMap<MarketId, BondMarket>,
    custody: CustodyLedger,
    events: Vec<Event>,
}

impl MarketRegistry {
    #[must_use]
    pub fn new(address: AccountId) -> Self {
        Self {
            address,
            markets: BTreeMap::new(),
            custody: CustodyLedger::new(),
            events: Vec::new(),
        }
    }

    #[must_use]
    pub fn address(&self) -> AccountId {
        self.address
    }

    // -----------------------------------------------------------------------
    // Market lifecycle
    // -----------------------------------------------------------------------

    /// Register a market and deploy its principal and yield tokens.
    ///
    /// `expiry` is taken as given; a market created with an expiry in the
    /// past starts out expired.
    pub fn create_market(
        &mut self,
        tokens: &mut TokenLedger,
        yield_bearing_asset: AssetId,
        underlying_asset: AssetId,
        expiry: Timestamp,
        initial_apr_bps: u32,
        now: Timestamp,
    ) -> Result<MarketId> {
        let id = MarketId::compute(yield_bearing_asset, underlying_asset, expiry);
        if self.markets.contains_key(&id) {
            return Err(ZerobondError::MarketAlreadyExists(id));
        }
        let decimals = tokens.metadata(yield_bearing_asset)?.decimals;
        let underlying = tokens.metadata(underlying_asset)?.clone();

        let market = BondMarket {
            id,
            yield_bearing_asset,
            underlying_asset,
            principal_token: AssetId::claim(&id, ClaimKind::Principal),
            yield_token: AssetId::claim(&id, ClaimKind::Yield),
            expiry,
            initial_apr_bps,
            creation_timestamp: now,
        };
        for kind in [ClaimKind::Principal, ClaimKind::Yield] {
            let token = market.claim_token(kind);
            if tokens.is_deployed(token) {
                return Err(ZerobondError::AssetAlreadyExists(token));
            }
        }

        let maturity = market.expiry_datetime().map_or_else(
            || expiry.to_string(),
            |dt| dt.format("%Y-%m-%d").to_string(),
        );
        for kind in [ClaimKind::Principal, ClaimKind::Yield] {
            let label = match kind {
                ClaimKind::Principal => "Principal Token",
                ClaimKind::Yield => "Yield Token",
            };
            tokens.deploy(
                market.claim_token(kind),
                AssetMetadata::new(
                    format!("{} {label} ({maturity})", underlying.name),
                    format!("{}-{}", kind.symbol_prefix(), underlying.symbol),
                    decimals,
                    self.address,
                ),
            )?;
        }

        tracing::info!(
            market = %id,
            ybt = %yield_bearing_asset,
            underlying = %underlying_asset,
            expiry,
            apr_bps = initial_apr_bps,
            "Market created"
        );
        self.events.push(Event::MarketCreated {
            market: id,
            yield_bearing_asset,
            underlying_asset,
            expiry,
        });
        self.markets.insert(id, market);
        Ok(id)
    }

    // -----------------------------------------------------------------------
    // Lookups
    // -----------------------------------------------------------------------

    #[must_use]
    pub fn market(&self, id: MarketId) -> Option<&BondMarket> {
        self.markets.get(&id)
    }

    #[must_use]
    pub fn market_by_terms(
        &self,
        yield_bearing_asset: AssetId,
        underlying_asset: AssetId,
        expiry: Timestamp,
    ) -> Option<&BondMarket> {
        self.market(MarketId::compute(yield_bearing_asset, underlying_asset, expiry))
    }

    pub fn require_market(&self, id: MarketId) -> Result<&BondMarket> {
        self.markets.get(&id).ok_or(ZerobondError::MarketNotFound(id))
    }

    /// All markets, ordered by id.
    pub fn markets(&self) -> impl Iterator<Item = &BondMarket> {
        self.markets.values()
    }

    #[must_use]
    pub fn custody(&self) -> &CustodyLedger {
        &self.custody
    }

    #[must_use]
    pub fn events(&self) -> &[Event] {
        &self.events
    }

    // -----------------------------------------------------------------------
    // Minting
    // -----------------------------------------------------------------------

    /// The split [`Self::mint`] would produce, without moving anything.
    pub fn preview_mint(&self, id: MarketId, amount: Amount, now: Timestamp) -> Result<ClaimSplit> {
        let market = self.require_market(id)?;
        if market.is_expired(now) {
            return Err(ZerobondError::MarketExpired {
                market: id,
                expiry: market.expiry,
                now,
            });
        }
        if amount == 0 {
            return Err(ZerobondError::ZeroAmount);
        }
        market_split(market, amount, now)
    }

    /// Deposit `amount` of the yield-bearing asset and mint claims at `now`.
    ///
    /// `caller` must have approved the registry for `amount`.
    pub fn mint(
        &mut self,
        tokens: &mut TokenLedger,
        caller: AccountId,
        id: MarketId,
        amount: Amount,
        now: Timestamp,
    ) -> Result<ClaimSplit> {
        let split = self.preview_mint(id, amount, now)?;
        let market = self.require_market(id)?.clone();

        self.custody.check_deposit(id, amount)?;
        checked_add(tokens.total_supply(market.principal_token), split.principal)?;
        checked_add(tokens.total_supply(market.yield_token), split.yield_amount)?;

        tokens.transfer_from(
            market.yield_bearing_asset,
            self.address,
            caller,
            self.address,
            amount,
        )?;
        tokens.mint(self.address, market.principal_token, caller, split.principal)?;
        tokens.mint(self.address, market.yield_token, caller, split.yield_amount)?;
        self.custody.record_deposit(id, amount)?;

        tracing::info!(
            market = %id,
            %caller,
            amount = %amount,
            principal = %split.principal,
            yield_amount = %split.yield_amount,
            "Tokens deposited"
        );
        self.events.push(Event::TokensDeposited {
            market: id,
            caller,
            amount,
            principal: split.principal,
            yield_amount: split.yield_amount,
        });
        Ok(split)
    }

    // -----------------------------------------------------------------------
    // Redemption
    // -----------------------------------------------------------------------

    /// Claims that [`Self::redeem`] would burn for `amount` at `now`.
    pub fn calculate_redemption(
        &self,
        id: MarketId,
        amount: Amount,
        now: Timestamp,
    ) -> Result<ClaimSplit> {
        redemption_split(self.require_market(id)?, amount, now)
    }

    /// Burn claims and release `amount` of the yield-bearing asset to `caller`.
    pub fn redeem(
        &mut self,
        tokens: &mut TokenLedger,
        caller: AccountId,
        id: MarketId,
        amount: Amount,
        now: Timestamp,
    ) -> Result<ClaimSplit> {
        let market = self.require_market(id)?.clone();
        if amount == 0 {
            return Err(ZerobondError::ZeroAmount);
        }
        let split = redemption_split(&market, amount, now)?;

        let mut required = vec![(market.principal_token, split.principal)];
        if split.yield_amount > 0 {
            required.push((market.yield_token, split.yield_amount));
        }
        for (asset, needed) in required {
            let available = tokens.balance_of(asset, caller);
            if available < needed {
                return Err(ZerobondError::InsufficientBalance {
                    asset,
                    needed,
                    available,
                });
            }
        }
        self.custody.check_withdrawal(id, amount)?;
        let held = tokens.balance_of(market.yield_bearing_asset, self.address);
        if held < amount {
            return Err(ZerobondError::CustodyInvariantViolation {
                reason: format!(
                    "registry holds {held} of {}, owes {amount}",
                    market.yield_bearing_asset
                ),
            });
        }

        tokens.burn(self.address, market.principal_token, caller, split.principal)?;
        if split.yield_amount > 0 {
            tokens.burn(self.address, market.yield_token, caller, split.yield_amount)?;
        }
        tokens.transfer(market.yield_bearing_asset, self.address, caller, amount)?;
        self.custody.record_withdrawal(id, amount)?;

        tracing::info!(
            market = %id,
            %caller,
            amount = %amount,
            principal = %split.principal,
            yield_amount = %split.yield_amount,
            expired = market.is_expired(now),
            "Tokens redeemed"
        );
        self.events.push(Event::TokensRedeemed {
            market: id,
            caller,
            amount,
        });
        Ok(split)
    }

    // -----------------------------------------------------------------------
    // Conservation
    // -----------------------------------------------------------------------

    /// Check that custody backs the outstanding claims of `id`, and that the
    /// registry's balance of the deposit asset equals total custody over
    /// every market using it.
    pub fn verify_conservation(&self, tokens: &TokenLedger, id: MarketId) -> Result<()> {
        let market = self.require_market(id)?;
        let outstanding = checked_add(
            tokens.total_supply(market.principal_token),
            tokens.total_supply(market.yield_token),
        )?;
        self.custody.verify(id, outstanding)?;

        let mut custodied: Amount = 0;
        for other in self
            .markets
            .values()
            .filter(|m| m.yield_bearing_asset == market.yield_bearing_asset)
        {
            custodied = checked_add(custodied, self.custody.expected_custody(other.id))?;
        }
        let held = tokens.balance_of(market.yield_bearing_asset, self.address);
        if held != custodied {
            tracing::error!(
                asset = %market.yield_bearing_asset,
                held = %held,
                custodied = %custodied,
                "Registry balance diverged from custody"
            );
            return Err(ZerobondError::CustodyInvariantViolation {
                reason: format!(
                    "registry holds {held} of {} but custody totals {custodied}",
                    market.yield_bearing_asset
                ),
            });
        }
        Ok(())
    }
}

impl MarketRedeemer for MarketRegistry {
    fn address(&self) -> AccountId {
        self.address
    }

    fn market(&self, id: MarketId) -> Option<&BondMarket> {
        self.markets.get(&id)
    }

    fn redeem(
        &mut self,
        tokens: &mut TokenLedger,
        caller: AccountId,
        market: MarketId,
        amount: Amount,
        now: Timestamp,
    ) -> Result<ClaimSplit> {
        MarketRegistry::redeem(self, tokens, caller, market, amount, now)
    }
}
