//! Pool and swap types shared between the pool manager and its hooks.
//!
//! Sign conventions follow flash accounting: a **negative** amount is owed
//! *to* the pool manager by the account, a **positive** amount is owed *by*
//! the pool manager to the account.

use std::fmt;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::{AccountId, Amount, AssetId, PoolId, Result, ZerobondError, constants, to_delta};

// ---------------------------------------------------------------------------
// PoolKey
// ---------------------------------------------------------------------------

/// Defining terms of a pool. `currency0 < currency1` always holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PoolKey {
    pub currency0: AssetId,
    pub currency1: AssetId,
    /// Static LP fee in pips, or [`constants::DYNAMIC_FEE_FLAG`].
    pub fee: u32,
    /// Hook receiving callbacks for this pool, if any.
    pub hooks: Option<AccountId>,
}

impl PoolKey {
    /// Build a key, ordering the two currencies.
    ///
    /// # Errors
    /// Returns [`ZerobondError::InvalidPoolKey`] if both currencies are the same.
    pub fn new(a: AssetId, b: AssetId, fee: u32, hooks: Option<AccountId>) -> Result<Self> {
        if a == b {
            return Err(ZerobondError::InvalidPoolKey {
                reason: format!("identical currencies {a}"),
            });
        }
        let (currency0, currency1) = if a < b { (a, b) } else { (b, a) };
        Ok(Self {
            currency0,
            currency1,
            fee,
            hooks,
        })
    }

    /// `sha256("zerobond:pool_id:v1:" || currency0 || currency1 || fee || hooks)`.
    #[must_use]
    pub fn id(&self) -> PoolId {
        let mut hasher = Sha256::new();
        hasher.update(b"zerobond:pool_id:v1:");
        hasher.update(self.currency0.as_bytes());
        hasher.update(self.currency1.as_bytes());
        hasher.update(self.fee.to_le_bytes());
        match &self.hooks {
            Some(hook) => {
                hasher.update([1u8]);
                hasher.update(hook.as_bytes());
            }
            None => hasher.update([0u8]),
        }
        let hash = hasher.finalize();
        let mut id = [0u8; 32];
        id.copy_from_slice(&hash);
        PoolId(id)
    }

    #[must_use]
    pub fn is_dynamic_fee(&self) -> bool {
        self.fee == constants::DYNAMIC_FEE_FLAG
    }

    #[must_use]
    pub fn contains(&self, asset: AssetId) -> bool {
        self.currency0 == asset || self.currency1 == asset
    }

    /// `(input, output)` currencies for a swap direction.
    #[must_use]
    pub fn swap_currencies(&self, zero_for_one: bool) -> (AssetId, AssetId) {
        if zero_for_one {
            (self.currency0, self.currency1)
        } else {
            (self.currency1, self.currency0)
        }
    }
}

impl fmt::Display for PoolKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{} fee={}", self.currency0, self.currency1, self.fee)
    }
}

// ---------------------------------------------------------------------------
// SwapParams
// ---------------------------------------------------------------------------

/// A swap request against a pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwapParams {
    /// `true` sells `currency0` for `currency1`.
    pub zero_for_one: bool,
    /// Negative for exact input, positive for exact output.
    pub amount_specified: i128,
}

impl SwapParams {
    /// Sell exactly `amount` of the input currency.
    pub fn exact_input(zero_for_one: bool, amount: Amount) -> Result<Self> {
        Ok(Self {
            zero_for_one,
            amount_specified: -to_delta(amount)?,
        })
    }

    /// Buy exactly `amount` of the output currency.
    pub fn exact_output(zero_for_one: bool, amount: Amount) -> Result<Self> {
        Ok(Self {
            zero_for_one,
            amount_specified: to_delta(amount)?,
        })
    }

    #[must_use]
    pub fn is_exact_input(&self) -> bool {
        self.amount_specified < 0
    }

    /// Unsigned size of the request.
    #[must_use]
    pub fn amount(&self) -> Amount {
        self.amount_specified.unsigned_abs()
    }

    /// The currency whose amount was specified: input for exact-in, output for exact-out.
    #[must_use]
    pub fn specified_currency(&self, key: &PoolKey) -> AssetId {
        let (input, output) = key.swap_currencies(self.zero_for_one);
        if self.is_exact_input() { input } else { output }
    }

    /// The currency the pool computes the amount of.
    #[must_use]
    pub fn unspecified_currency(&self, key: &PoolKey) -> AssetId {
        let (input, output) = key.swap_currencies(self.zero_for_one);
        if self.is_exact_input() { output } else { input }
    }
}

// ---------------------------------------------------------------------------
// Deltas
// ---------------------------------------------------------------------------

/// Per-currency amounts for a swap, from the swapper's point of view.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceDelta {
    pub amount0: i128,
    pub amount1: i128,
}

impl BalanceDelta {
    pub const ZERO: Self = Self {
        amount0: 0,
        amount1: 0,
    };

    #[must_use]
    pub fn new(amount0: i128, amount1: i128) -> Self {
        Self { amount0, amount1 }
    }

    /// Delta for `asset` within `key`.
    #[must_use]
    pub fn for_currency(&self, key: &PoolKey, asset: AssetId) -> i128 {
        if asset == key.currency0 {
            self.amount0
        } else if asset == key.currency1 {
            self.amount1
        } else {
            0
        }
    }
}

/// The portion of a swap a hook fills itself, from the hook's point of view.
///
/// `specified` is in the specified currency, `unspecified` in the other.
/// The pool manager credits these to the hook and debits the swapper with
/// the complement; the native curve only sees what is left over.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BeforeSwapDelta {
    pub specified: i128,
    pub unspecified: i128,
}

impl BeforeSwapDelta {
    pub const ZERO: Self = Self {
        specified: 0,
        unspecified: 0,
    };

    /// Hook fills the whole request one-for-one.
    #[must_use]
    pub fn one_for_one(params: &SwapParams) -> Self {
        Self {
            specified: -params.amount_specified,
            unspecified: params.amount_specified,
        }
    }
}

/// Result of a before-swap callback.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BeforeSwapOutcome {
    pub delta: BeforeSwapDelta,
    /// LP fee override; honoured only when [`constants::OVERRIDE_FEE_FLAG`] is set.
    pub fee_override: u32,
}

impl BeforeSwapOutcome {
    /// Leave the swap to the pool's native curve.
    #[must_use]
    pub fn pass_through() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn is_pass_through(&self) -> bool {
        self.delta == BeforeSwapDelta::ZERO
    }
}
