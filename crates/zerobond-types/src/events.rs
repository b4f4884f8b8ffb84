//! Protocol events.
//!
//! Components append events to their own log as state changes happen.
//! Events are part of component state: a rolled-back operation leaves no
//! event behind.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{AccountId, Amount, AssetId, MarketId, PoolId, Timestamp};

/// Something observable that happened in the registry or settlement engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Event {
    /// A market and its two claim tokens were created.
    MarketCreated {
        market: MarketId,
        yield_bearing_asset: AssetId,
        underlying_asset: AssetId,
        expiry: Timestamp,
    },
    /// Deposit asset was taken into custody and claims were minted.
    TokensDeposited {
        market: MarketId,
        caller: AccountId,
        amount: Amount,
        principal: Amount,
        yield_amount: Amount,
    },
    /// Claims were burned and deposit asset released from custody.
    TokensRedeemed {
        market: MarketId,
        caller: AccountId,
        amount: Amount,
    },
    /// A pool was bound to a market.
    PoolMarketMappingSet { pool: PoolId, market: MarketId },
}

impl Event {
    /// The market the event concerns.
    #[must_use]
    pub fn market(&self) -> MarketId {
        match self {
            Self::MarketCreated { market, .. }
            | Self::TokensDeposited { market, .. }
            | Self::TokensRedeemed { market, .. }
            | Self::PoolMarketMappingSet { market, .. } => *market,
        }
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MarketCreated { market, expiry, .. } => {
                write!(f, "MARKET_CREATED {market} expiry={expiry}")
            }
            Self::TokensDeposited {
                market,
                caller,
                amount,
                ..
            } => write!(f, "TOKENS_DEPOSITED {market} {caller} {amount}"),
            Self::TokensRedeemed {
                market,
                caller,
                amount,
            } => write!(f, "TOKENS_REDEEMED {market} {caller} {amount}"),
            Self::PoolMarketMappingSet { pool, market } => {
                write!(f, "POOL_MARKET_MAPPING_SET {pool} -> {market}")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_market_accessor() {
        let market = MarketId([9u8; 32]);
        let ev = Event::PoolMarketMappingSet {
            pool: PoolId([1u8; 32]),
            market,
        };
        assert_eq!(ev.market(), market);
    }

    #[test]
    fn event_display() {
        let ev = Event::TokensRedeemed {
            market: MarketId([9u8; 32]),
            caller: AccountId::derived("alice"),
            amount: 42,
        };
        let s = format!("{ev}");
        assert!(s.starts_with("TOKENS_REDEEMED"));
        assert!(s.contains("42"));
    }

    #[test]
    fn event_serde_roundtrip() {
        let ev = Event::TokensDeposited {
            market: MarketId([9u8; 32]),
            caller: AccountId::new(),
            amount: 1_000,
            principal: 909,
            yield_amount: 91,
        };
        let json = serde_json::to_string(&ev).unwrap();
        let back: Event = serde_json::from_str(&json).unwrap();
        assert_eq!(ev, back);
    }
}
