//! Identifiers used throughout ZeroBond.
//!
//! Accounts and assets are UUIDs: random UUIDv7 for externally created
//! entities, SHA-256-derived for protocol-owned ones so that every
//! deployment computes the same id. Markets and pools are full 32-byte
//! SHA-256 commitments to the terms that define them.

use std::fmt;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::Timestamp;

fn derive_uuid(domain: &[u8], parts: &[&[u8]]) -> Uuid {
    let mut hasher = Sha256::new();
    hasher.update(domain);
    for part in parts {
        hasher.update((part.len() as u64).to_le_bytes());
        hasher.update(part);
    }
    let hash = hasher.finalize();
    let mut bytes = [0u8; 16];
    bytes.copy_from_slice(&hash[..16]);
    Uuid::from_bytes(bytes)
}

// ---------------------------------------------------------------------------
// AccountId
// ---------------------------------------------------------------------------

/// Identity of a balance holder: a user, the registry, the settlement
/// engine, the pool manager, or a vault.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct AccountId(pub Uuid);

impl AccountId {
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    /// Deterministic account id for a protocol component, from a label.
    #[must_use]
    pub fn derived(label: &str) -> Self {
        Self(derive_uuid(b"zerobond:account:v1:", &[label.as_bytes()]))
    }

    #[must_use]
    pub fn as_bytes(&self) -> &[u8; 16] {
        self.0.as_bytes()
    }
}

impl Default for AccountId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "acct:{}", hex::encode(&self.0.as_bytes()[..8]))
    }
}

// ---------------------------------------------------------------------------
// AssetId
// ---------------------------------------------------------------------------

/// Which of the two claims a claim token represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ClaimKind {
    Principal,
    Yield,
}

impl ClaimKind {
    /// Symbol prefix used when naming claim tokens.
    #[must_use]
    pub fn symbol_prefix(self) -> &'static str {
        match self {
            Self::Principal => "PT",
            Self::Yield => "YT",
        }
    }
}

impl fmt::Display for ClaimKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Principal => write!(f, "PRINCIPAL"),
            Self::Yield => write!(f, "YIELD"),
        }
    }
}

/// Identity of a fungible asset on the token ledger.
///
/// Ordering is meaningful: pool keys sort their two currencies by `AssetId`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct AssetId(pub Uuid);

impl AssetId {
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    /// Deterministic asset id from a label.
    #[must_use]
    pub fn derived(label: &str) -> Self {
        Self(derive_uuid(b"zerobond:asset:v1:", &[label.as_bytes()]))
    }

    /// Deterministic id of the claim token a market deploys for `kind`.
    #[must_use]
    pub fn claim(market: &MarketId, kind: ClaimKind) -> Self {
        Self(derive_uuid(
            b"zerobond:claim:v1:",
            &[&market.0, kind.symbol_prefix().as_bytes()],
        ))
    }

    #[must_use]
    pub fn as_bytes(&self) -> &[u8; 16] {
        self.0.as_bytes()
    }
}

impl Default for AssetId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for AssetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "asset:{}", hex::encode(&self.0.as_bytes()[..8]))
    }
}

// ---------------------------------------------------------------------------
// MarketId
// ---------------------------------------------------------------------------

/// Deterministic market identifier: a hash of the market's defining terms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct MarketId(pub [u8; 32]);

impl MarketId {
    /// `sha256("zerobond:market_id:v1:" || ybt || underlying || expiry)`.
    ///
    /// The same terms always produce the same id, which is what makes a
    /// duplicate creation detectable.
    #[must_use]
    pub fn compute(
        yield_bearing_asset: AssetId,
        underlying_asset: AssetId,
        expiry: Timestamp,
    ) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(b"zerobond:market_id:v1:");
        hasher.update(yield_bearing_asset.as_bytes());
        hasher.update(underlying_asset.as_bytes());
        hasher.update(expiry.to_le_bytes());
        let hash = hasher.finalize();
        let mut id = [0u8; 32];
        id.copy_from_slice(&hash);
        Self(id)
    }

    #[must_use]
    pub fn short(&self) -> String {
        hex::encode(&self.0[..4])
    }
}

impl fmt::Display for MarketId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "market:{}", hex::encode(&self.0[..8]))
    }
}

// ---------------------------------------------------------------------------
// PoolId
// ---------------------------------------------------------------------------

/// Identity of a pool on the pool manager: a hash of its [`crate::PoolKey`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct PoolId(pub [u8; 32]);

impl PoolId {
    #[must_use]
    pub fn short(&self) -> String {
        hex::encode(&self.0[..4])
    }
}

impl fmt::Display for PoolId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "pool:{}", hex::encode(&self.0[..8]))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
