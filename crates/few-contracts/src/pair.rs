// SPDX-License-Identifier: AGPL-3.0-only
//! # Constant-Product Pair
//!
//! A pool of two tokens whose reserves obey `reserve0 · reserve1 = k`
//! (non-decreasing across swaps, net of fee). The pair's liquidity shares are
//! a ledger token living at the pair's own address.
//!
//! ## Flow
//! ```text
//! mint(to):    tokens already transferred in  ─► shares to `to`
//! burn(to):    shares already transferred in  ─► pro-rata tokens to `to`
//! swap(o0,o1): input already transferred in   ─► optimistic transfer-out,
//!              measure balances, enforce K, commit reserves
//! ```
//!
//! ## State Layout
//!
//! | Field                   | Type | Description                               |
//! |-------------------------|------|-------------------------------------------|
//! | token0 / token1         | Address | token0 < token1                        |
//! | reserve0 / reserve1     | u128 | last synced balances                      |
//! | block_timestamp_last    | u32  | ledger time (mod 2^32) of last update     |
//! | price{0,1}_cumulative   | U256 | Σ UQ112.112 price × seconds, wrapping     |
//!
//! On the first mint `MINIMUM_LIQUIDITY` shares go to `Address::ZERO`
//! forever, so total supply never returns to zero once initialised.

use crate::DexState;
use few_core::math::{encode_price, isqrt, mul_div, narrow_u256, wide};
use few_core::{Address, DexError, DexEvent, DexResult, SafeMath, U256, MINIMUM_LIQUIDITY};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pair {
    pub address: Address,
    pub factory: Address,
    pub token0: Address,
    pub token1: Address,
    pub reserve0: u128,
    pub reserve1: u128,
    pub block_timestamp_last: u32,
    pub price0_cumulative_last: U256,
    pub price1_cumulative_last: U256,
}

impl Pair {
    pub fn new(address: Address, factory: Address, token0: Address, token1: Address) -> Self {
        Pair {
            address,
            factory,
            token0,
            token1,
            reserve0: 0,
            reserve1: 0,
            block_timestamp_last: 0,
            price0_cumulative_last: U256::zero(),
            price1_cumulative_last: U256::zero(),
        }
    }

    pub fn get_reserves(&self) -> (u128, u128, u32) {
        (self.reserve0, self.reserve1, self.block_timestamp_last)
    }
}

// ─────────────────────────────────────────────────────────────
// INTERNALS
// ─────────────────────────────────────────────────────────────

fn check_caller(state: &DexState, sender: &Address) -> DexResult<()> {
    if state.config.access.restrict_pair_callers && !state.pairs.is_permitted(sender) {
        return Err(DexError::Forbidden);
    }
    Ok(())
}

fn balances(state: &DexState, pair: &Pair) -> (u128, u128) {
    (
        state.ledger.balance_of(&pair.token0, &pair.address),
        state.ledger.balance_of(&pair.token1, &pair.address),
    )
}

/// Commit balances as reserves and advance the price accumulators.
fn update(state: &mut DexState, pair: &Address, balance0: u128, balance1: u128) -> DexResult<()> {
    let now = (state.ledger.timestamp() % (1u64 << 32)) as u32;
    let p = state.pairs.pair_mut(pair)?;
    let elapsed = now.wrapping_sub(p.block_timestamp_last);
    if elapsed > 0 && p.reserve0 != 0 && p.reserve1 != 0 {
        let elapsed = U256::from(elapsed);
        // overflow is intended: consumers diff two observations
        let p0 = encode_price(p.reserve1, p.reserve0)?.overflowing_mul(elapsed).0;
        let p1 = encode_price(p.reserve0, p.reserve1)?.overflowing_mul(elapsed).0;
        p.price0_cumulative_last = p.price0_cumulative_last.overflowing_add(p0).0;
        p.price1_cumulative_last = p.price1_cumulative_last.overflowing_add(p1).0;
    }
    p.reserve0 = balance0;
    p.reserve1 = balance1;
    p.block_timestamp_last = now;
    state.ledger.emit(
        *pair,
        DexEvent::Sync {
            reserve0: balance0,
            reserve1: balance1,
        },
    );
    Ok(())
}

// ─────────────────────────────────────────────────────────────
// OPERATIONS
// ─────────────────────────────────────────────────────────────

pub fn get_reserves(state: &DexState, pair: &Address) -> DexResult<(u128, u128, u32)> {
    Ok(state.pairs.pair(pair)?.get_reserves())
}

/// Mint shares for whatever was transferred in since the last update.
pub fn mint(state: &mut DexState, pair: &Address, sender: &Address, to: &Address) -> DexResult<u128> {
    state.transact(|s| {
        check_caller(s, sender)?;
        let p = s.pairs.pair(pair)?.clone();
        let (balance0, balance1) = balances(s, &p);
        let amount0 = balance0.safe_sub(p.reserve0)?;
        let amount1 = balance1.safe_sub(p.reserve1)?;

        let total_supply = s.ledger.total_supply(pair);
        let liquidity = if total_supply == 0 {
            let product = U256::from(amount0).safe_mul(U256::from(amount1))?;
            let root = narrow_u256(isqrt(product))?;
            s.ledger.mint(pair, &Address::ZERO, MINIMUM_LIQUIDITY)?;
            root.safe_sub(MINIMUM_LIQUIDITY)?
        } else {
            std::cmp::min(
                mul_div(amount0, total_supply, p.reserve0)?,
                mul_div(amount1, total_supply, p.reserve1)?,
            )
        };
        if liquidity == 0 {
            return Err(DexError::InsufficientLiquidityMinted);
        }
        s.ledger.mint(pair, to, liquidity)?;

        update(s, pair, balance0, balance1)?;
        s.ledger.emit(
            *pair,
            DexEvent::Mint {
                sender: *sender,
                amount0,
                amount1,
            },
        );
        log::debug!("pair {} mint {} shares to {} ({}, {})", pair, liquidity, to, amount0, amount1);
        Ok(liquidity)
    })
}

/// Burn the shares held by the pair itself and pay out pro-rata.
pub fn burn(
    state: &mut DexState,
    pair: &Address,
    sender: &Address,
    to: &Address,
) -> DexResult<(u128, u128)> {
    state.transact(|s| {
        check_caller(s, sender)?;
        let p = s.pairs.pair(pair)?.clone();
        let (balance0, balance1) = balances(s, &p);
        let liquidity = s.ledger.balance_of(pair, pair);
        let total_supply = s.ledger.total_supply(pair);
        if total_supply == 0 {
            return Err(DexError::InsufficientLiquidityBurned);
        }

        let amount0 = mul_div(liquidity, balance0, total_supply)?;
        let amount1 = mul_div(liquidity, balance1, total_supply)?;
        if amount0 == 0 || amount1 == 0 {
            return Err(DexError::InsufficientLiquidityBurned);
        }
        s.ledger.burn(pair, pair, liquidity)?;
        s.ledger.transfer(&p.token0, pair, to, amount0)?;
        s.ledger.transfer(&p.token1, pair, to, amount1)?;

        let (balance0, balance1) = balances(s, &p);
        update(s, pair, balance0, balance1)?;
        s.ledger.emit(
            *pair,
            DexEvent::Burn {
                sender: *sender,
                amount0,
                amount1,
                to: *to,
            },
        );
        log::debug!("pair {} burn {} shares ({}, {}) to {}", pair, liquidity, amount0, amount1, to);
        Ok((amount0, amount1))
    })
}

/// Send out the requested amounts, then require the fee-adjusted product of
/// the new balances to cover the old reserves.
pub fn swap(
    state: &mut DexState,
    pair: &Address,
    sender: &Address,
    amount0_out: u128,
    amount1_out: u128,
    to: &Address,
) -> DexResult<()> {
    state.transact(|s| {
        check_caller(s, sender)?;
        if amount0_out == 0 && amount1_out == 0 {
            return Err(DexError::InsufficientOutputAmount);
        }
        let p = s.pairs.pair(pair)?.clone();
        if amount0_out >= p.reserve0 || amount1_out >= p.reserve1 {
            return Err(DexError::InsufficientLiquidity);
        }
        if *to == p.token0 || *to == p.token1 {
            return Err(DexError::InvalidTo);
        }

        if amount0_out > 0 {
            s.ledger.transfer(&p.token0, pair, to, amount0_out)?;
        }
        if amount1_out > 0 {
            s.ledger.transfer(&p.token1, pair, to, amount1_out)?;
        }
        let (balance0, balance1) = balances(s, &p);

        let kept0 = p.reserve0 - amount0_out;
        let kept1 = p.reserve1 - amount1_out;
        let amount0_in = balance0.saturating_sub(kept0);
        let amount1_in = balance1.saturating_sub(kept1);
        if amount0_in == 0 && amount1_in == 0 {
            return Err(DexError::InsufficientInputAmount);
        }

        let fee = s.swap_fee();
        let scale = wide(fee.denominator);
        let charged = wide(fee.charged());
        let adjusted0 = wide(balance0)
            .safe_mul(scale)?
            .safe_sub(wide(amount0_in).safe_mul(charged)?)?;
        let adjusted1 = wide(balance1)
            .safe_mul(scale)?
            .safe_sub(wide(amount1_in).safe_mul(charged)?)?;
        let k_after = adjusted0.safe_mul(adjusted1)?;
        let k_before = wide(p.reserve0)
            .safe_mul(wide(p.reserve1))?
            .safe_mul(scale.safe_mul(scale)?)?;
        if k_after < k_before {
            return Err(DexError::K);
        }

        update(s, pair, balance0, balance1)?;
        s.ledger.emit(
            *pair,
            DexEvent::Swap {
                sender: *sender,
                amount0_in,
                amount1_in,
                amount0_out,
                amount1_out,
                to: *to,
            },
        );
        log::debug!(
            "pair {} swap in ({}, {}) out ({}, {}) to {}",
            pair,
            amount0_in,
            amount1_in,
            amount0_out,
            amount1_out,
            to
        );
        Ok(())
    })
}

/// Force reserves to match balances.
pub fn sync(state: &mut DexState, pair: &Address) -> DexResult<()> {
    state.transact(|s| {
        let p = s.pairs.pair(pair)?.clone();
        let (balance0, balance1) = balances(s, &p);
        update(s, pair, balance0, balance1)
    })
}

/// Send any balance above the reserves to `to`.
pub fn skim(state: &mut DexState, pair: &Address, to: &Address) -> DexResult<()> {
    state.transact(|s| {
        let p = s.pairs.pair(pair)?.clone();
        let (balance0, balance1) = balances(s, &p);
        let excess0 = balance0.safe_sub(p.reserve0)?;
        let excess1 = balance1.safe_sub(p.reserve1)?;
        if excess0 > 0 {
            s.ledger.transfer(&p.token0, pair, to, excess0)?;
        }
        if excess1 > 0 {
            s.ledger.transfer(&p.token1, pair, to, excess1)?;
        }
        Ok(())
    })
}

// ─────────────────────────────────────────────────────────────
// TESTS
// ─────────────────────────────────────────────────────────────
