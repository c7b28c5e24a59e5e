// SPDX-License-Identifier: AGPL-3.0-only
//! # Checked & Wide Integer Math
//!
//! Token amounts and reserves are `u128`. Products of two amounts are taken
//! in `U256`, products of three factors (amount × reserve × fee scale) in
//! `U512`, and every narrowing back to `u128` is checked. Any overflow or
//! underflow surfaces as [`DexError::Arithmetic`].

use crate::error::{DexError, DexResult};
use serde::{Deserialize, Serialize};
use std::panic::Location;

pub use primitive_types::{U256, U512};

/// Fixed-point resolution of the price accumulators (UQ112.112).
pub const Q112_SHIFT: usize = 112;

// ─────────────────────────────────────────────────────────────
// SAFE MATH
// ─────────────────────────────────────────────────────────────

pub trait SafeMath: Sized {
    fn safe_add(self, rhs: Self) -> DexResult<Self>;
    fn safe_sub(self, rhs: Self) -> DexResult<Self>;
    fn safe_mul(self, rhs: Self) -> DexResult<Self>;
    fn safe_div(self, rhs: Self) -> DexResult<Self>;
}

#[track_caller]
fn overflow_at() -> DexError {
    let caller = Location::caller();
    log::debug!("math error thrown at {}:{}", caller.file(), caller.line());
    DexError::Arithmetic
}

macro_rules! checked_impl {
    ($t:ty) => {
        impl SafeMath for $t {
            #[track_caller]
            fn safe_add(self, v: $t) -> DexResult<$t> {
                self.checked_add(v).ok_or_else(overflow_at)
            }

            #[track_caller]
            fn safe_sub(self, v: $t) -> DexResult<$t> {
                self.checked_sub(v).ok_or_else(overflow_at)
            }

            #[track_caller]
            fn safe_mul(self, v: $t) -> DexResult<$t> {
                self.checked_mul(v).ok_or_else(overflow_at)
            }

            #[track_caller]
            fn safe_div(self, v: $t) -> DexResult<$t> {
                self.checked_div(v).ok_or_else(overflow_at)
            }
        }
    };
}

checked_impl!(u128);
checked_impl!(U256);
checked_impl!(U512);

// ─────────────────────────────────────────────────────────────
// WIDENING / NARROWING
// ─────────────────────────────────────────────────────────────

pub fn wide(v: u128) -> U512 {
    U512::from(v)
}

/// Narrow a 512-bit intermediate back to a token amount.
pub fn narrow(v: U512) -> DexResult<u128> {
    if v > U512::from(u128::MAX) {
        return Err(DexError::Arithmetic);
    }
    Ok(v.low_u128())
}

pub fn narrow_u256(v: U256) -> DexResult<u128> {
    if v > U256::from(u128::MAX) {
        return Err(DexError::Arithmetic);
    }
    Ok(v.low_u128())
}

/// `a * b / denominator` with a 256-bit product and floor division.
pub fn mul_div(a: u128, b: u128, denominator: u128) -> DexResult<u128> {
    if denominator == 0 {
        return Err(DexError::Arithmetic);
    }
    let product = U256::from(a).safe_mul(U256::from(b))?;
    narrow_u256(product / U256::from(denominator))
}

/// Integer square root (floor) via Newton's method.
pub fn isqrt(n: U256) -> U256 {
    if n.is_zero() {
        return U256::zero();
    }
    let mut x = n;
    let mut y = (x >> 1) + (x & U256::one());
    while y < x {
        x = y;
        y = (x + n / x) >> 1;
    }
    x
}

// ─────────────────────────────────────────────────────────────
// SWAP FEE
// ─────────────────────────────────────────────────────────────

/// Swap fee as the retained fraction `numerator / denominator` (997/1000 = 0.3% fee).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwapFee {
    pub numerator: u128,
    pub denominator: u128,
}

impl SwapFee {
    pub const DEFAULT: SwapFee = SwapFee {
        numerator: 997,
        denominator: 1000,
    };

    pub fn validate(&self) -> Result<(), String> {
        if self.denominator == 0 {
            return Err("swap fee denominator cannot be zero".to_string());
        }
        if self.numerator == 0 || self.numerator > self.denominator {
            return Err(format!(
                "swap fee numerator must be in 1..={} (got {})",
                self.denominator, self.numerator
            ));
        }
        Ok(())
    }

    /// The charged part per `denominator` units (3 for 997/1000).
    pub fn charged(&self) -> u128 {
        self.denominator - self.numerator
    }
}

impl Default for SwapFee {
    fn default() -> Self {
        Self::DEFAULT
    }
}

// ─────────────────────────────────────────────────────────────
// PRICE ENCODING
// ─────────────────────────────────────────────────────────────

/// `numerator / denominator` as UQ112.112.
pub fn encode_price(numerator: u128, denominator: u128) -> DexResult<U256> {
    if denominator == 0 {
        return Err(DexError::Arithmetic);
    }
    Ok((U256::from(numerator) << Q112_SHIFT) / U256::from(denominator))
}
