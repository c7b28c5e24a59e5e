// SPDX-License-Identifier: AGPL-3.0-only
//! # Constant-Product Pricing
//!
//! Pure pricing formulas for an `x · y = k` pool that charges its fee on the
//! input side. Nothing here touches a ledger; pairs and routers feed in the
//! reserves they read.
//!
//! ```text
//! amount_out = amount_in·997·R_out / (R_in·1000 + amount_in·997)
//! amount_in  = R_in·amount_out·1000 / ((R_out − amount_out)·997) + 1
//! quote      = amount_a·R_b / R_a
//! ```

use crate::error::{DexError, DexResult};
use crate::math::{narrow, wide, SafeMath, SwapFee, U256, U512};

/// Equivalent amount of the other asset at the current reserve ratio.
pub fn quote(amount_a: u128, reserve_a: u128, reserve_b: u128) -> DexResult<u128> {
    if amount_a == 0 {
        return Err(DexError::InsufficientAmount);
    }
    if reserve_a == 0 || reserve_b == 0 {
        return Err(DexError::InsufficientLiquidity);
    }
    let product = U256::from(amount_a).safe_mul(U256::from(reserve_b))?;
    crate::math::narrow_u256(product / U256::from(reserve_a))
}

/// Maximum output for an exact input, fee 0.3%.
pub fn get_amount_out(amount_in: u128, reserve_in: u128, reserve_out: u128) -> DexResult<u128> {
    get_amount_out_with_fee(amount_in, reserve_in, reserve_out, SwapFee::DEFAULT)
}

/// Minimum input for an exact output, fee 0.3%.
pub fn get_amount_in(amount_out: u128, reserve_in: u128, reserve_out: u128) -> DexResult<u128> {
    get_amount_in_with_fee(amount_out, reserve_in, reserve_out, SwapFee::DEFAULT)
}

pub fn get_amount_out_with_fee(
    amount_in: u128,
    reserve_in: u128,
    reserve_out: u128,
    fee: SwapFee,
) -> DexResult<u128> {
    if amount_in == 0 {
        return Err(DexError::InsufficientInputAmount);
    }
    if reserve_in == 0 || reserve_out == 0 {
        return Err(DexError::InsufficientLiquidity);
    }
    let amount_in_with_fee = wide(amount_in).safe_mul(wide(fee.numerator))?;
    let numerator = amount_in_with_fee.safe_mul(wide(reserve_out))?;
    let denominator = wide(reserve_in)
        .safe_mul(wide(fee.denominator))?
        .safe_add(amount_in_with_fee)?;
    narrow(numerator / denominator)
}

pub fn get_amount_in_with_fee(
    amount_out: u128,
    reserve_in: u128,
    reserve_out: u128,
    fee: SwapFee,
) -> DexResult<u128> {
    if amount_out == 0 {
        return Err(DexError::InsufficientOutputAmount);
    }
    if reserve_in == 0 || reserve_out == 0 || amount_out >= reserve_out {
        return Err(DexError::InsufficientLiquidity);
    }
    let numerator = wide(reserve_in)
        .safe_mul(wide(amount_out))?
        .safe_mul(wide(fee.denominator))?;
    let denominator = wide(reserve_out - amount_out).safe_mul(wide(fee.numerator))?;
    let amount_in: U512 = (numerator / denominator).safe_add(U512::one())?;
    narrow(amount_in)
}

/// Outputs along a chain of `(reserve_in, reserve_out)` hops. `result[0] == amount_in`.
pub fn amounts_out(amount_in: u128, hops: &[(u128, u128)], fee: SwapFee) -> DexResult<Vec<u128>> {
    if hops.is_empty() {
        return Err(DexError::InvalidPath);
    }
    let mut amounts = Vec::with_capacity(hops.len() + 1);
    amounts.push(amount_in);
    for (reserve_in, reserve_out) in hops {
        let last = amounts[amounts.len() - 1];
        amounts.push(get_amount_out_with_fee(last, *reserve_in, *reserve_out, fee)?);
    }
    Ok(amounts)
}

/// Inputs along a chain of hops, computed backward from `amount_out`.
/// `result[last] == amount_out`.
pub fn amounts_in(amount_out: u128, hops: &[(u128, u128)], fee: SwapFee) -> DexResult<Vec<u128>> {
    if hops.is_empty() {
        return Err(DexError::InvalidPath);
    }
    let mut amounts = vec![0u128; hops.len() + 1];
    amounts[hops.len()] = amount_out;
    for i in (0..hops.len()).rev() {
        let (reserve_in, reserve_out) = hops[i];
        amounts[i] = get_amount_in_with_fee(amounts[i + 1], reserve_in, reserve_out, fee)?;
    }
    Ok(amounts)
}
