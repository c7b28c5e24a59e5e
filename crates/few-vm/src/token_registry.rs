// SPDX-License-Identifier: AGPL-3.0-only
//! # Token Registry
//!
//! Read-only helpers for discovering and describing tokens held in the
//! ledger's token table.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use few_vm::token_registry;
//!
//! let info = token_registry::query_token_info(&ledger, &token)?;
//! let wrapped = token_registry::list_wrapped_tokens(&ledger);
//! ```
//!
//! A token that was never deployed yields [`DexError::NotDeployed`]; a
//! deployed token whose name and symbol are empty resolves normally.

use crate::{Ledger, TokenKind};
use few_core::{Address, DexResult};
use serde::{Deserialize, Serialize};

/// Summary of a token row (no balances).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenInfo {
    /// Token address
    pub address: Address,
    /// Human-readable name (may be empty)
    pub name: String,
    /// Ticker symbol (may be empty)
    pub symbol: String,
    /// Decimal places
    pub decimals: u8,
    /// Current total supply in base units
    #[serde(with = "few_core::events::u128_str")]
    pub total_supply: u128,
    /// Transfer / wrapping behaviour
    pub kind: TokenKind,
}

/// Describe a deployed token.
pub fn query_token_info(ledger: &Ledger, token: &Address) -> DexResult<TokenInfo> {
    let t = ledger.token(token)?;
    Ok(TokenInfo {
        address: *token,
        name: t.metadata.name.clone(),
        symbol: t.metadata.symbol.clone(),
        decimals: t.metadata.decimals,
        total_supply: t.total_supply,
        kind: t.kind,
    })
}

/// Underlying token of a wrapper, `None` for any other kind of token.
pub fn underlying_of(ledger: &Ledger, token: &Address) -> Option<Address> {
    match ledger.token_kind(token) {
        Ok(TokenKind::Wrapped { underlying }) => Some(underlying),
        _ => None,
    }
}

pub fn is_wrapped_token(ledger: &Ledger, token: &Address) -> bool {
    underlying_of(ledger, token).is_some()
}

/// All tokens, ordered by address.
pub fn list_tokens(ledger: &Ledger) -> Vec<TokenInfo> {
    ledger
        .tokens
        .keys()
        .filter_map(|addr| query_token_info(ledger, addr).ok())
        .collect()
}

pub fn list_wrapped_tokens(ledger: &Ledger) -> Vec<TokenInfo> {
    list_tokens(ledger)
        .into_iter()
        .filter(|t| matches!(t.kind, TokenKind::Wrapped { .. }))
        .collect()
}
