//! Fungible token ledger.
//!
//! Tracks per-(asset, holder) balances, per-(asset, owner, spender)
//! allowances and per-asset supply. Every mutation validates first and
//! writes second: either the full operation succeeds or nothing changes.
//!
//! Each asset has exactly one minter. For claim tokens that is the market
//! registry; no other account can create or destroy supply.

use std::collections::HashMap;

use zerobond_types::{AccountId, Amount, AssetId, Result, ZerobondError, checked_add};

/// Descriptive data and mint authority for an asset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetMetadata {
    pub name: String,
    pub symbol: String,
    pub decimals: u8,
    /// The only account allowed to mint and burn.
    pub minter: AccountId,
}

impl AssetMetadata {
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        symbol: impl Into<String>,
        decimals: u8,
        minter: AccountId,
    ) -> Self {
        Self {
            name: name.into(),
            symbol: symbol.into(),
            decimals,
            minter,
        }
    }
}

/// In-memory multi-asset token ledger.
#[derive(Debug, Clone, Default)]
pub struct TokenLedger {
    assets: HashMap<AssetId, AssetMetadata>,
    balances: HashMap<(AssetId, AccountId), Amount>,
    /// Keyed by (asset, owner, spender). `Amount::MAX` is an unlimited approval.
    allowances: HashMap<(AssetId, AccountId, AccountId), Amount>,
    supply: HashMap<AssetId, Amount>,
}

impl TokenLedger {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Deploy an asset under a caller-chosen id.
    pub fn deploy(&mut self, id: AssetId, metadata: AssetMetadata) -> Result<()> {
        if self.assets.contains_key(&id) {
            return Err(ZerobondError::AssetAlreadyExists(id));
        }
        tracing::debug!(
            asset = %id,
            symbol = %metadata.symbol,
            minter = %metadata.minter,
            "Asset deployed"
        );
        self.assets.insert(id, metadata);
        Ok(())
    }

    /// Deploy an asset under a fresh random id.
    pub fn deploy_new(&mut self, metadata: AssetMetadata) -> AssetId {
        let id = AssetId::new();
        self.assets.insert(id, metadata);
        id
    }

    pub fn metadata(&self, asset: AssetId) -> Result<&AssetMetadata> {
        self.assets
            .get(&asset)
            .ok_or(ZerobondError::UnknownAsset(asset))
    }

    #[must_use]
    pub fn is_deployed(&self, asset: AssetId) -> bool {
        self.assets.contains_key(&asset)
    }

    #[must_use]
    pub fn balance_of(&self, asset: AssetId, holder: AccountId) -> Amount {
        self.balances.get(&(asset, holder)).copied().unwrap_or(0)
    }

    #[must_use]
    pub fn total_supply(&self, asset: AssetId) -> Amount {
        self.supply.get(&asset).copied().unwrap_or(0)
    }

    #[must_use]
    pub fn allowance(&self, asset: AssetId, owner: AccountId, spender: AccountId) -> Amount {
        self.allowances
            .get(&(asset, owner, spender))
            .copied()
            .unwrap_or(0)
    }

    /// Set `spender`'s allowance over `owner`'s `asset` to `amount`.
    pub fn approve(
        &mut self,
        asset: AssetId,
        owner: AccountId,
        spender: AccountId,
        amount: Amount,
    ) -> Result<()> {
        self.metadata(asset)?;
        self.allowances.insert((asset, owner, spender), amount);
        Ok(())
    }

    /// Move `amount` from `from` to `to`, authorized by `from` itself.
    pub fn transfer(
        &mut self,
        asset: AssetId,
        from: AccountId,
        to: AccountId,
        amount: Amount,
    ) -> Result<()> {
        self.metadata(asset)?;
        self.ensure_balance(asset, from, amount)?;
        self.move_balance(asset, from, to, amount);
        Ok(())
    }

    /// Move `amount` from `from` to `to`, spending `spender`'s allowance.
    pub fn transfer_from(
        &mut self,
        asset: AssetId,
        spender: AccountId,
        from: AccountId,
        to: AccountId,
        amount: Amount,
    ) -> Result<()> {
        self.metadata(asset)?;
        let allowed = self.allowance(asset, from, spender);
        if allowed < amount {
            return Err(ZerobondError::InsufficientAllowance {
                asset,
                needed: amount,
                available: allowed,
            });
        }
        self.ensure_balance(asset, from, amount)?;

        if allowed != Amount::MAX {
            self.allowances
                .insert((asset, from, spender), allowed - amount);
        }
        self.move_balance(asset, from, to, amount);
        Ok(())
    }

    /// Create `amount` of new supply for `to`. Minter only.
    pub fn mint(
        &mut self,
        caller: AccountId,
        asset: AssetId,
        to: AccountId,
        amount: Amount,
    ) -> Result<()> {
        self.ensure_minter(caller, asset)?;
        let new_supply = checked_add(self.total_supply(asset), amount)?;
        // Individual balances never exceed supply, so the credit cannot overflow.
        self.supply.insert(asset, new_supply);
        *self.balances.entry((asset, to)).or_insert(0) += amount;
        Ok(())
    }

    /// Destroy `amount` of `from`'s balance. Minter only.
    pub fn burn(
        &mut self,
        caller: AccountId,
        asset: AssetId,
        from: AccountId,
        amount: Amount,
    ) -> Result<()> {
        self.ensure_minter(caller, asset)?;
        self.ensure_balance(asset, from, amount)?;
        *self.balances.entry((asset, from)).or_insert(0) -= amount;
        *self.supply.entry(asset).or_insert(0) -= amount;
        Ok(())
    }

    fn ensure_minter(&self, caller: AccountId, asset: AssetId) -> Result<()> {
        let meta = self.metadata(asset)?;
        if meta.minter != caller {
            return Err(ZerobondError::Unauthorized {
                caller,
                reason: format!("only the minter of {} may mint or burn", meta.symbol),
            });
        }
        Ok(())
    }

    fn ensure_balance(&self, asset: AssetId, holder: AccountId, amount: Amount) -> Result<()> {
        let available = self.balance_of(asset, holder);
        if available < amount {
            return Err(ZerobondError::InsufficientBalance {
                asset,
                needed: amount,
                available,
            });
        }
        Ok(())
    }

    fn move_balance(&mut self, asset: AssetId, from: AccountId, to: AccountId, amount: Amount) {
        *self.balances.entry((asset, from)).or_insert(0) -= amount;
        *self.balances.entry((asset, to)).or_insert(0) += amount;
    }
}
