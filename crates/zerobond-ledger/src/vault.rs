//! Yield-bearing share vault fixture.
//!
//! Deposits underlying and mints shares at the current exchange rate
//! (1:1 while empty). Yield is simulated by minting underlying straight
//! into the vault with [`MockVault::accrue`], which raises the value of
//! every outstanding share.

use zerobond_types::{AccountId, Amount, AssetId, Result, ZerobondError, mul_div};

use crate::{AssetMetadata, TokenLedger};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MockVault {
    address: AccountId,
    asset: AssetId,
    shares: AssetId,
}

impl MockVault {
    /// Deploy a share token over `asset`, minted by the vault.
    pub fn deploy(
        tokens: &mut TokenLedger,
        asset: AssetId,
        name: &str,
        symbol: &str,
    ) -> Result<Self> {
        let decimals = tokens.metadata(asset)?.decimals;
        let address = AccountId::new();
        let shares = tokens.deploy_new(AssetMetadata::new(name, symbol, decimals, address));
        Ok(Self {
            address,
            asset,
            shares,
        })
    }

    #[must_use]
    pub fn address(&self) -> AccountId {
        self.address
    }

    /// The underlying asset.
    #[must_use]
    pub fn asset(&self) -> AssetId {
        self.asset
    }

    /// The share token.
    #[must_use]
    pub fn shares(&self) -> AssetId {
        self.shares
    }

    #[must_use]
    pub fn total_assets(&self, tokens: &TokenLedger) -> Amount {
        tokens.balance_of(self.asset, self.address)
    }

    pub fn convert_to_shares(&self, tokens: &TokenLedger, assets: Amount) -> Result<Amount> {
        let supply = tokens.total_supply(self.shares);
        let total = self.total_assets(tokens);
        if supply == 0 || total == 0 {
            return Ok(assets);
        }
        mul_div(assets, supply, total).ok_or(ZerobondError::AmountOverflow)
    }

    pub fn convert_to_assets(&self, tokens: &TokenLedger, shares: Amount) -> Result<Amount> {
        let supply = tokens.total_supply(self.shares);
        if supply == 0 {
            return Ok(shares);
        }
        mul_div(shares, self.total_assets(tokens), supply).ok_or(ZerobondError::AmountOverflow)
    }

    /// Deposit `assets` of underlying for shares. Caller must have approved the vault.
    pub fn deposit(
        &self,
        tokens: &mut TokenLedger,
        caller: AccountId,
        assets: Amount,
    ) -> Result<Amount> {
        if assets == 0 {
            return Err(ZerobondError::ZeroAmount);
        }
        let shares = self.convert_to_shares(tokens, assets)?;
        tokens.transfer_from(self.asset, self.address, caller, self.address, assets)?;
        tokens.mint(self.address, self.shares, caller, shares)?;
        Ok(shares)
    }

    /// Burn `shares` for their current value in underlying.
    pub fn redeem(
        &self,
        tokens: &mut TokenLedger,
        caller: AccountId,
        shares: Amount,
    ) -> Result<Amount> {
        if shares == 0 {
            return Err(ZerobondError::ZeroAmount);
        }
        let assets = self.convert_to_assets(tokens, shares)?;
        tokens.burn(self.address, self.shares, caller, shares)?;
        tokens.transfer(self.asset, self.address, caller, assets)?;
        Ok(assets)
    }

    /// Simulate yield: `issuer` (the underlying's minter) mints into the vault.
    pub fn accrue(
        &self,
        tokens: &mut TokenLedger,
        issuer: AccountId,
        amount: Amount,
    ) -> Result<()> {
        tokens.mint(issuer, self.asset, self.address, amount)
    }
}
