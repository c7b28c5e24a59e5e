//! Path helpers shared by the pair factory and routers.

use crate::DexState;
use few_core::{amm, derive_id, template_hash, Address, DexError, DexResult, PAIR_TEMPLATE};

/// Canonical ordering of a token pair.
pub fn sort_tokens(token_a: &Address, token_b: &Address) -> DexResult<(Address, Address)> {
    if token_a == token_b {
        return Err(DexError::IdenticalAddresses);
    }
    let (token0, token1) = if token_a < token_b {
        (*token_a, *token_b)
    } else {
        (*token_b, *token_a)
    };
    if token0.is_zero() {
        return Err(DexError::ZeroAddress);
    }
    Ok((token0, token1))
}

/// Salt used for a pair's deterministic address.
pub fn pair_salt(token0: &Address, token1: &Address) -> [u8; 40] {
    let mut salt = [0u8; 40];
    salt[..20].copy_from_slice(token0.as_bytes());
    salt[20..].copy_from_slice(token1.as_bytes());
    salt
}

/// Address of the pair for `(token_a, token_b)` without any ledger lookup.
pub fn pair_for(factory: &Address, token_a: &Address, token_b: &Address) -> DexResult<Address> {
    let (token0, token1) = sort_tokens(token_a, token_b)?;
    Ok(derive_id(
        factory,
        &pair_salt(&token0, &token1),
        &template_hash(PAIR_TEMPLATE),
    ))
}

/// Reserves of an existing pair, ordered as `(token_a, token_b)`.
pub fn get_reserves(state: &DexState, token_a: &Address, token_b: &Address) -> DexResult<(u128, u128)> {
    let (token0, _) = sort_tokens(token_a, token_b)?;
    let pair_addr = state.pairs.get_pair(token_a, token_b);
    if pair_addr.is_zero() {
        return Err(DexError::PairNotFound);
    }
    let pair = state.pairs.pair(&pair_addr)?;
    if *token_a == token0 {
        Ok((pair.reserve0, pair.reserve1))
    } else {
        Ok((pair.reserve1, pair.reserve0))
    }
}

fn hop_reserves(state: &DexState, path: &[Address]) -> DexResult<Vec<(u128, u128)>> {
    if path.len() < 2 {
        return Err(DexError::InvalidPath);
    }
    path.windows(2)
        .map(|w| get_reserves(state, &w[0], &w[1]))
        .collect()
}

pub fn get_amounts_out(state: &DexState, amount_in: u128, path: &[Address]) -> DexResult<Vec<u128>> {
    let hops = hop_reserves(state, path)?;
    amm::amounts_out(amount_in, &hops, state.swap_fee())
}

pub fn get_amounts_in(state: &DexState, amount_out: u128, path: &[Address]) -> DexResult<Vec<u128>> {
    let hops = hop_reserves(state, path)?;
    amm::amounts_in(amount_out, &hops, state.swap_fee())
}
