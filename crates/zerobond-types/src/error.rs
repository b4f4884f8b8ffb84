//! Error types for the ZeroBond protocol.
//!
//! All errors use the `ZB_ERR_` prefix convention for easy grepping in logs.
//! Error codes are grouped by subsystem:
//! - 1xx: Market errors
//! - 2xx: Balance / token ledger errors
//! - 3xx: Pricing math errors
//! - 4xx: Pool manager errors
//! - 5xx: Settlement engine errors
//! - 9xx: General / internal errors

use thiserror::Error;

use crate::{AccountId, Amount, AssetId, MarketId, PoolId, Timestamp};

/// Central error enum for all ZeroBond operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ZerobondError {
    // =================================================================
    // Market Errors (1xx)
    // =================================================================
    /// A market with the same (yield-bearing asset, underlying, expiry) exists.
    #[error("ZB_ERR_100: Market already exists: {0}")]
    MarketAlreadyExists(MarketId),

    /// No market is registered under this id.
    #[error("ZB_ERR_101: Market not found: {0}")]
    MarketNotFound(MarketId),

    /// Minting was attempted at or after the market's expiry.
    #[error("ZB_ERR_102: Market {market} expired at {expiry} (now {now})")]
    MarketExpired {
        market: MarketId,
        expiry: Timestamp,
        now: Timestamp,
    },

    /// Operations on zero amounts are rejected.
    #[error("ZB_ERR_103: Amount must be greater than zero")]
    ZeroAmount,

    // =================================================================
    // Balance / Ledger Errors (2xx)
    // =================================================================
    /// Not enough balance to perform the operation.
    #[error("ZB_ERR_200: Insufficient balance of {asset}: need {needed}, have {available}")]
    InsufficientBalance {
        asset: AssetId,
        needed: Amount,
        available: Amount,
    },

    /// Spender has not been approved for enough of the owner's balance.
    #[error("ZB_ERR_201: Insufficient allowance of {asset}: need {needed}, have {available}")]
    InsufficientAllowance {
        asset: AssetId,
        needed: Amount,
        available: Amount,
    },

    /// The asset is not deployed on the token ledger.
    #[error("ZB_ERR_202: Unknown asset: {0}")]
    UnknownAsset(AssetId),

    /// An asset with this id is already deployed.
    #[error("ZB_ERR_203: Asset already exists: {0}")]
    AssetAlreadyExists(AssetId),

    /// The caller is not allowed to perform this operation.
    #[error("ZB_ERR_204: Unauthorized caller {caller}: {reason}")]
    Unauthorized { caller: AccountId, reason: String },

    /// A balance or supply computation overflowed.
    #[error("ZB_ERR_205: Amount overflow")]
    AmountOverflow,

    // =================================================================
    // Pricing Errors (3xx)
    // =================================================================
    /// Decimal arithmetic overflowed while pricing.
    #[error("ZB_ERR_300: Pricing math overflow: {reason}")]
    MathOverflow { reason: String },

    // =================================================================
    // Pool Manager Errors (4xx)
    // =================================================================
    /// The pool has not been initialized.
    #[error("ZB_ERR_400: Pool not found: {0}")]
    PoolNotFound(PoolId),

    /// The pool has already been initialized.
    #[error("ZB_ERR_401: Pool already initialized: {0}")]
    PoolAlreadyInitialized(PoolId),

    /// The pool key is malformed or does not fit the operation.
    #[error("ZB_ERR_402: Invalid pool key: {reason}")]
    InvalidPoolKey { reason: String },

    /// Flash-accounting deltas did not net to zero before the call returned.
    #[error("ZB_ERR_403: Currency not settled: {account} has delta {delta} in {asset}")]
    CurrencyNotSettled {
        account: AccountId,
        asset: AssetId,
        delta: i128,
    },

    /// The native curve cannot fill the swap.
    #[error("ZB_ERR_404: Insufficient liquidity in pool {0}")]
    InsufficientLiquidity(PoolId),

    /// Native liquidity additions are disabled for this pool.
    #[error("ZB_ERR_405: Native liquidity disabled for pool {0}; use the hook's deposit path")]
    NativeLiquidityDisabled(PoolId),

    /// The swap request is malformed.
    #[error("ZB_ERR_406: Invalid swap: {reason}")]
    InvalidSwap { reason: String },

    // =================================================================
    // Settlement Engine Errors (5xx)
    // =================================================================
    /// The pool's assets do not match the market it is mapped to.
    #[error("ZB_ERR_500: Invalid market mapping for pool {pool}: {reason}")]
    InvalidMarketMapping { pool: PoolId, reason: String },

    /// Only principal-in / yield-bearing-out swaps are allowed after expiry.
    #[error("ZB_ERR_501: Unsupported swap direction on expired pool {0}")]
    UnsupportedDirection(PoolId),

    /// The nested redemption delivered less than contracted.
    #[error("ZB_ERR_502: Redemption failed: expected {expected}, received {received}")]
    RedemptionFailed { expected: Amount, received: Amount },

    /// Custodied deposits diverged from outstanding claims. Critical alert.
    #[error("ZB_ERR_503: Custody invariant violation: {reason}")]
    CustodyInvariantViolation { reason: String },

    // =================================================================
    // General / Internal (9xx)
    // =================================================================
    /// Unrecoverable internal error.
    #[error("ZB_ERR_900: Internal error: {0}")]
    Internal(String),

    /// Serialization / deserialization error.
    #[error("ZB_ERR_901: Serialization error: {0}")]
    Serialization(String),

    /// Configuration error (invalid config file, missing fields, etc.).
    #[error("ZB_ERR_902: Configuration error: {0}")]
    Configuration(String),
}

/// Crate-wide `Result` alias.
pub type Result<T> = std::result::Result<T, ZerobondError>;

impl From<serde_json::Error> for ZerobondError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}
