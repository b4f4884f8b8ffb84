//! Custody conservation tracking.
//!
//! Invariant, checked per market:
//! ```text
//! custody(market) == Σ deposits − Σ withdrawals == supply(PT) + supply(YT)
//! ```
//!
//! Minting adds `principal + yield == amount` of claims for `amount` of
//! custody. Redeeming before expiry burns both legs for the same total;
//! after expiry it burns `amount` of principal only, and yield claims that
//! remain outstanding keep their share of custody. Either way the two
//! sides move together.

use std::collections::BTreeMap;

use zerobond_types::{Amount, MarketId, Result, ZerobondError, checked_add};

/// Per-market deposit and withdrawal totals.
#[derive(Debug, Clone, Default)]
pub struct CustodyLedger {
    deposits: BTreeMap<MarketId, Amount>,
    withdrawals: BTreeMap<MarketId, Amount>,
}

impl CustodyLedger {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a deposit of `amount` can be recorded without overflow.
    pub fn check_deposit(&self, market: MarketId, amount: Amount) -> Result<()> {
        checked_add(self.total_deposits(market), amount).map(|_| ())
    }

    pub fn record_deposit(&mut self, market: MarketId, amount: Amount) -> Result<()> {
        let total = checked_add(self.total_deposits(market), amount)?;
        self.deposits.insert(market, total);
        Ok(())
    }

    /// Whether `amount` can leave custody.
    pub fn check_withdrawal(&self, market: MarketId, amount: Amount) -> Result<()> {
        let held = self.expected_custody(market);
        if held < amount {
            return Err(ZerobondError::CustodyInvariantViolation {
                reason: format!("market {market}: withdrawal {amount} exceeds custody {held}"),
            });
        }
        Ok(())
    }

    pub fn record_withdrawal(&mut self, market: MarketId, amount: Amount) -> Result<()> {
        self.check_withdrawal(market, amount)?;
        *self.withdrawals.entry(market).or_insert(0) += amount;
        Ok(())
    }

    /// Deposit asset currently held for `market`.
    #[must_use]
    pub fn expected_custody(&self, market: MarketId) -> Amount {
        self.total_deposits(market)
            .saturating_sub(self.total_withdrawals(market))
    }

    #[must_use]
    pub fn total_deposits(&self, market: MarketId) -> Amount {
        self.deposits.get(&market).copied().unwrap_or(0)
    }

    #[must_use]
    pub fn total_withdrawals(&self, market: MarketId) -> Amount {
        self.withdrawals.get(&market).copied().unwrap_or(0)
    }

    /// Compare custody against the outstanding claim supply of `market`.
    ///
    /// # Errors
    /// Returns [`ZerobondError::CustodyInvariantViolation`] if they differ.
    pub fn verify(&self, market: MarketId, outstanding_claims: Amount) -> Result<()> {
        let expected = self.expected_custody(market);
        if outstanding_claims != expected {
            return Err(ZerobondError::CustodyInvariantViolation {
                reason: format!(
                    "market {market}: claims {outstanding_claims} != custody {expected} \
                     (deposits={}, withdrawals={})",
                    self.total_deposits(market),
                    self.total_withdrawals(market),
                ),
            });
        }
        Ok(())
    }
}
