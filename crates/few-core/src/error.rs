// SPDX-License-Identifier: AGPL-3.0-only
//! Error taxonomy shared by the ledger, pairs, factories and routers.
//!
//! Every failure aborts the whole logical operation; the caller sees one of
//! these tags and no partial state survives.

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DexError {
    // ── Input validation ──
    InsufficientAmount,
    InsufficientInputAmount,
    InsufficientOutputAmount,
    InvalidPath,
    Expired,
    InvalidTo,

    // ── Liquidity bounds ──
    InsufficientLiquidity,
    InsufficientLiquidityMinted,
    InsufficientLiquidityBurned,
    InsufficientAAmount,
    InsufficientBAmount,
    ExcessiveInputAmount,

    // ── Invariant violation ──
    K,

    // ── Registry state ──
    AlreadyExists,
    NotDeployed,
    PairNotFound,
    IdenticalAddresses,
    ZeroAddress,
    NotWrappedToken,

    // ── Ledger ──
    InsufficientBalance,
    InsufficientAllowance,
    InvalidSignature,
    Forbidden,
    InsufficientNativeValue,
    NativeDust,

    // ── Arithmetic ──
    Arithmetic,
}

impl DexError {
    /// Stable screaming-case tag, matched on by callers.
    pub fn tag(&self) -> &'static str {
        match self {
            DexError::InsufficientAmount => "INSUFFICIENT_AMOUNT",
            DexError::InsufficientInputAmount => "INSUFFICIENT_INPUT_AMOUNT",
            DexError::InsufficientOutputAmount => "INSUFFICIENT_OUTPUT_AMOUNT",
            DexError::InvalidPath => "INVALID_PATH",
            DexError::Expired => "EXPIRED",
            DexError::InvalidTo => "INVALID_TO",
            DexError::InsufficientLiquidity => "INSUFFICIENT_LIQUIDITY",
            DexError::InsufficientLiquidityMinted => "INSUFFICIENT_LIQUIDITY_MINTED",
            DexError::InsufficientLiquidityBurned => "INSUFFICIENT_LIQUIDITY_BURNED",
            DexError::InsufficientAAmount => "INSUFFICIENT_A_AMOUNT",
            DexError::InsufficientBAmount => "INSUFFICIENT_B_AMOUNT",
            DexError::ExcessiveInputAmount => "EXCESSIVE_INPUT_AMOUNT",
            DexError::K => "K",
            DexError::AlreadyExists => "ALREADY_EXISTS",
            DexError::NotDeployed => "NOT_DEPLOYED",
            DexError::PairNotFound => "PAIR_NOT_FOUND",
            DexError::IdenticalAddresses => "IDENTICAL_ADDRESSES",
            DexError::ZeroAddress => "ZERO_ADDRESS",
            DexError::NotWrappedToken => "NOT_WRAPPED_TOKEN",
            DexError::InsufficientBalance => "INSUFFICIENT_BALANCE",
            DexError::InsufficientAllowance => "INSUFFICIENT_ALLOWANCE",
            DexError::InvalidSignature => "INVALID_SIGNATURE",
            DexError::Forbidden => "FORBIDDEN",
            DexError::InsufficientNativeValue => "INSUFFICIENT_NATIVE_VALUE",
            DexError::NativeDust => "NATIVE_DUST",
            DexError::Arithmetic => "ARITHMETIC_OVERFLOW",
        }
    }
}

impl std::fmt::Display for DexError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.tag())
    }
}

impl std::error::Error for DexError {}

pub type DexResult<T> = Result<T, DexError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_uses_tag() {
        assert_eq!(DexError::K.to_string(), "K");
        assert_eq!(
            DexError::InsufficientOutputAmount.to_string(),
            "INSUFFICIENT_OUTPUT_AMOUNT"
        );
        assert_eq!(DexError::Arithmetic.to_string(), "ARITHMETIC_OVERFLOW");
    }

    #[test]
    fn test_boxed_error() {
        let err: Box<dyn std::error::Error> = Box::new(DexError::Expired);
        assert_eq!(err.to_string(), "EXPIRED");
    }
}
