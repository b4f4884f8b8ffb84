//! Bond market model.
//!
//! A [`BondMarket`] is created once per (yield-bearing asset, underlying,
//! expiry) triple and never mutated afterwards. Its pricing parameter
//! (`initial_apr_bps`) is frozen at creation; price is a function of that
//! rate and wall-clock time only.
//!
//! ## Phase
//!
//! ```text
//!   ┌────────┐  now >= expiry  ┌─────────┐
//!   │ ACTIVE ├────────────────▶│ EXPIRED │
//!   └────────┘                 └─────────┘
//! ```
//!
//! The phase is derived from the caller-supplied clock on every call and
//! is never stored, so it cannot go backwards for a monotonic clock.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{Amount, AssetId, ClaimKind, MarketId, Timestamp};

/// Trading/pricing phase of a market at a given instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MarketPhase {
    /// Before expiry: claims are priced at present value.
    Active,
    /// At or after expiry: principal is worth exactly one unit, yield zero.
    Expired,
}

impl fmt::Display for MarketPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Active => write!(f, "ACTIVE"),
            Self::Expired => write!(f, "EXPIRED"),
        }
    }
}

/// A registered zero-coupon bond market.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BondMarket {
    /// Deterministic id, see [`MarketId::compute`].
    pub id: MarketId,
    /// The deposit asset (vault shares).
    pub yield_bearing_asset: AssetId,
    /// The base asset the deposit asset accrues in.
    pub underlying_asset: AssetId,
    /// Principal claim token, deployed with the market.
    pub principal_token: AssetId,
    /// Yield claim token, deployed with the market.
    pub yield_token: AssetId,
    /// Maturity (unix seconds).
    pub expiry: Timestamp,
    /// Annualized discount rate in basis points, fixed at creation.
    pub initial_apr_bps: u32,
    /// When the market was created (informational).
    pub creation_timestamp: Timestamp,
}

impl BondMarket {
    /// Phase at `now`.
    #[must_use]
    pub fn phase(&self, now: Timestamp) -> MarketPhase {
        if now >= self.expiry {
            MarketPhase::Expired
        } else {
            MarketPhase::Active
        }
    }

    #[must_use]
    pub fn is_expired(&self, now: Timestamp) -> bool {
        self.phase(now) == MarketPhase::Expired
    }

    /// Seconds left until maturity, zero once expired.
    #[must_use]
    pub fn time_to_maturity(&self, now: Timestamp) -> u64 {
        self.expiry.saturating_sub(now)
    }

    /// The claim token for `kind`.
    #[must_use]
    pub fn claim_token(&self, kind: ClaimKind) -> AssetId {
        match kind {
            ClaimKind::Principal => self.principal_token,
            ClaimKind::Yield => self.yield_token,
        }
    }

    /// Expiry as a calendar date-time, if representable.
    #[must_use]
    pub fn expiry_datetime(&self) -> Option<DateTime<Utc>> {
        i64::try_from(self.expiry)
            .ok()
            .and_then(|secs| DateTime::from_timestamp(secs, 0))
    }

    /// A market with fresh random assets, for tests.
    #[cfg(any(test, feature = "test-helpers"))]
    #[must_use]
    pub fn dummy(expiry: Timestamp, initial_apr_bps: u32) -> Self {
        let yield_bearing_asset = AssetId::new();
        let underlying_asset = AssetId::new();
        let id = MarketId::compute(yield_bearing_asset, underlying_asset, expiry);
        Self {
            id,
            yield_bearing_asset,
            underlying_asset,
            principal_token: AssetId::claim(&id, ClaimKind::Principal),
            yield_token: AssetId::claim(&id, ClaimKind::Yield),
            expiry,
            initial_apr_bps,
            creation_timestamp: 0,
        }
    }
}

impl fmt::Display for BondMarket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "BondMarket[{}] ybt={} expiry={} apr={}bps",
            self.id, self.yield_bearing_asset, self.expiry, self.initial_apr_bps
        )
    }
}

/// How an amount of deposit value divides between the two claims.
///
/// `principal + yield_amount` always equals the amount that was split.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaimSplit {
    pub principal: Amount,
    pub yield_amount: Amount,
}

impl ClaimSplit {
    /// Split where the whole amount is principal (expired markets).
    #[must_use]
    pub fn all_principal(amount: Amount) -> Self {
        Self {
            principal: amount,
            yield_amount: 0,
        }
    }

    /// Sum of both legs.
    #[must_use]
    pub fn total(&self) -> Option<Amount> {
        self.principal.checked_add(self.yield_amount)
    }
}

/// Association of a pool with a bond market.
///
/// Pools without a binding are never touched by the settlement engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PoolBinding {
    Mapped(MarketId),
    Unmapped,
}

impl PoolBinding {
    #[must_use]
    pub fn market_id(&self) -> Option<MarketId> {
        match self {
            Self::Mapped(id) => Some(*id),
            Self::Unmapped => None,
        }
    }

    #[must_use]
    pub fn is_mapped(&self) -> bool {
        matches!(self, Self::Mapped(_))
    }
}

impl From<Option<MarketId>> for PoolBinding {
    fn from(id: Option<MarketId>) -> Self {
        id.map_or(Self::Unmapped, Self::Mapped)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phase_transitions_at_expiry() {
        let m = BondMarket::dummy(1_000, 500);
        assert_eq!(m.phase(999), MarketPhase::Active);
        assert_eq!(m.phase(1_000), MarketPhase::Expired);
        assert_eq!(m.phase(5_000), MarketPhase::Expired);
        assert!(!m.is_expired(0));
    }

    #[test]
    fn time_to_maturity_saturates() {
        let m = BondMarket::dummy(1_000, 500);
        assert_eq!(m.time_to_maturity(400), 600);
        assert_eq!(m.time_to_maturity(1_000), 0);
        assert_eq!(m.time_to_maturity(2_000), 0);
    }

    #[test]
    fn claim_token_lookup() {
        let m = BondMarket::dummy(1_000, 500);
        assert_eq!(m.claim_token(ClaimKind::Principal), m.principal_token);
        assert_eq!(m.claim_token(ClaimKind::Yield), m.yield_token);
        assert_ne!(m.principal_token, m.yield_token);
    }

    #[test]
    fn expiry_datetime_formats() {
        let m = BondMarket::dummy(1_767_225_600, 500); // 2026-01-01T00:00:00Z
        let dt = m.expiry_datetime().unwrap();
        assert_eq!(dt.format("%Y-%m-%d").to_string(), "2026-01-01");
        assert!(BondMarket::dummy(u64::MAX, 0).expiry_datetime().is_none());
    }

    #[test]
    fn pool_binding_from_option() {
        let id = MarketId([3u8; 32]);
        assert_eq!(PoolBinding::from(Some(id)), PoolBinding::Mapped(id));
        assert_eq!(PoolBinding::from(None), PoolBinding::Unmapped);
        assert_eq!(PoolBinding::Mapped(id).market_id(), Some(id));
        assert!(!PoolBinding::Unmapped.is_mapped());
    }

    #[test]
    fn claim_split_total() {
        let s = ClaimSplit {
            principal: 909,
            yield_amount: 91,
        };
        assert_eq!(s.total(), Some(1_000));
        assert_eq!(ClaimSplit::all_principal(5).yield_amount, 0);
    }

    #[test]
    fn market_serde_roundtrip() {
        let m = BondMarket::dummy(1_000, 1_000);
        let json = serde_json::to_string(&m).unwrap();
        let back: BondMarket = serde_json::from_str(&json).unwrap();
        assert_eq!(m, back);
    }
}
