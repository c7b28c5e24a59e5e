// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// FEW DEX - CORE MODULE
//
// Shared building blocks for the wrapped-token DEX engine.
// - 20-byte addresses and content-addressed contract identities
// - Error taxonomy (input, liquidity, invariant, registry, arithmetic)
// - Checked / 256-bit / 512-bit integer math
// - Constant-product pricing formulas
// - Events and engine configuration
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

pub mod address;
pub mod amm;
pub mod config;
pub mod error;
pub mod events;
pub mod math;

pub use address::{derive_id, template_hash, Address};
pub use config::DexConfig;
pub use error::{DexError, DexResult};
pub use events::{DexEvent, LoggedEvent};
pub use math::{SafeMath, SwapFee, U256, U512};

/// Liquidity shares permanently locked at `Address::ZERO` on a pair's first mint.
pub const MINIMUM_LIQUIDITY: u128 = 1_000;

/// Sentinel allowance that is never decremented by `transfer_from`.
pub const MAX_ALLOWANCE: u128 = u128::MAX;

/// Template names hashed into deterministic contract addresses.
pub const WRAPPED_TOKEN_TEMPLATE: &str = "FewWrappedToken";
pub const PAIR_TEMPLATE: &str = "FewV1Pair";

/// Base unit scale for 18-decimal tokens.
pub const E18: u128 = 1_000_000_000_000_000_000;
