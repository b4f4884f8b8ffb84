//! Protocol-wide constants for ZeroBond.

/// Seconds in a (non-leap) year, the day-count basis for discounting.
pub const SECONDS_PER_YEAR: u64 = 365 * 24 * 60 * 60;

/// One day in seconds.
pub const SECONDS_PER_DAY: u64 = 24 * 60 * 60;

/// Basis points in 100%.
pub const BPS_DENOMINATOR: u64 = 10_000;

/// Decimal places prices are quantized to (the 1e18 fixed-point scale).
pub const PRICE_DECIMALS: u32 = 18;

/// One unit at [`PRICE_DECIMALS`]: prices as integers are scaled by this.
pub const WAD: u128 = 1_000_000_000_000_000_000;

/// LP fees are expressed in pips: hundredths of a basis point.
pub const FEE_DENOMINATOR: u32 = 1_000_000;

/// Maximum LP fee (100%).
pub const MAX_LP_FEE: u32 = FEE_DENOMINATOR;

/// Marks a pool key whose LP fee is set by its hook rather than fixed.
pub const DYNAMIC_FEE_FLAG: u32 = 0x80_0000;

/// Set on a before-swap fee override for the pool manager to honour it.
pub const OVERRIDE_FEE_FLAG: u32 = 0x40_0000;

/// Fee the settlement engine assigns to a pool when it is initialized (0.30%).
pub const INITIAL_POOL_FEE: u32 = 3_000;

/// Default label the registry's account id is derived from.
pub const DEFAULT_REGISTRY_LABEL: &str = "zerobond:market-registry";

/// Default label the settlement engine's account id is derived from.
pub const DEFAULT_ENGINE_LABEL: &str = "zerobond:settlement-engine";

/// Default label the pool manager's account id is derived from.
pub const DEFAULT_POOL_MANAGER_LABEL: &str = "zerobond:pool-manager";

/// Version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Protocol name.
pub const PROTOCOL_NAME: &str = "ZeroBond";
