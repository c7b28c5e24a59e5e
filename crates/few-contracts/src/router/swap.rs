//! Multi-hop swaps: exact-in / exact-out, token and native variants.

use super::Router;
use crate::library;
use crate::DexState;
use few_core::{Address, DexError, DexResult, SafeMath};

#[allow(clippy::too_many_arguments)]
impl Router {
    /// Pull the input into the first pair and return the hop amounts. When
    /// fee-on-transfer aware, the amounts are recomputed from what arrived.
    fn fund_exact_in(
        &self,
        s: &mut DexState,
        caller: &Address,
        path: &[Address],
        amount_in: u128,
        amount_out_min: u128,
    ) -> DexResult<Vec<u128>> {
        let first_pair = self.pair_address(s, &path[0], &path[1])?;
        let amounts = if self.config.fee_on_transfer_aware {
            let sent = self.pull_and_wrap(s, caller, &path[0], amount_in, &first_pair, true)?;
            library::get_amounts_out(s, sent, path)?
        } else {
            let amounts = library::get_amounts_out(s, amount_in, path)?;
            self.pull_and_wrap(s, caller, &path[0], amount_in, &first_pair, false)?;
            amounts
        };
        if last(&amounts) < amount_out_min {
            return Err(DexError::InsufficientOutputAmount);
        }
        Ok(amounts)
    }

    fn fund_exact_out(&self, s: &mut DexState, caller: &Address, path: &[Address], amounts: &[u128]) -> DexResult<()> {
        let first_pair = self.pair_address(s, &path[0], &path[1])?;
        let measure = self.config.fee_on_transfer_aware;
        let sent = self.pull_and_wrap(s, caller, &path[0], amounts[0], &first_pair, measure)?;
        if sent < amounts[0] {
            return Err(DexError::InsufficientInputAmount);
        }
        Ok(())
    }

    fn require_starts_with_fw_weth(&self, path: &[Address]) -> DexResult<()> {
        if path[0] != self.fw_weth {
            return Err(DexError::InvalidPath);
        }
        Ok(())
    }

    fn require_ends_with_fw_weth(&self, path: &[Address]) -> DexResult<()> {
        if last(path) != self.fw_weth {
            return Err(DexError::InvalidPath);
        }
        Ok(())
    }

    pub fn swap_exact_tokens_for_tokens(
        &self,
        state: &mut DexState,
        caller: &Address,
        amount_in: u128,
        amount_out_min: u128,
        path: &[Address],
        to: &Address,
        deadline: u64,
    ) -> DexResult<Vec<u128>> {
        self.execute(state, caller, deadline, |s| {
            let path = self.resolve_path(s, path)?;
            let amounts = self.fund_exact_in(s, caller, &path, amount_in, amount_out_min)?;
            self.swap_hops(s, &amounts, &path, &self.address)?;
            self.unwrap_to_user(s, &last(&path), last(&amounts), to)?;
            Ok(amounts)
        })
    }

    pub fn swap_tokens_for_exact_tokens(
        &self,
        state: &mut DexState,
        caller: &Address,
        amount_out: u128,
        amount_in_max: u128,
        path: &[Address],
        to: &Address,
        deadline: u64,
    ) -> DexResult<Vec<u128>> {
        self.execute(state, caller, deadline, |s| {
            let path = self.resolve_path(s, path)?;
            let amounts = library::get_amounts_in(s, amount_out, &path)?;
            if amounts[0] > amount_in_max {
                return Err(DexError::ExcessiveInputAmount);
            }
            self.fund_exact_out(s, caller, &path, &amounts)?;
            self.swap_hops(s, &amounts, &path, &self.address)?;
            self.unwrap_to_user(s, &last(&path), amount_out, to)?;
            Ok(amounts)
        })
    }

    /// Spend all of `value` native; `path` must start with fwWETH (or WETH).
    pub fn swap_exact_eth_for_tokens(
        &self,
        state: &mut DexState,
        caller: &Address,
        amount_out_min: u128,
        path: &[Address],
        to: &Address,
        deadline: u64,
        value: u128,
    ) -> DexResult<Vec<u128>> {
        self.execute(state, caller, deadline, |s| {
            let path = self.resolve_path(s, path)?;
            self.require_starts_with_fw_weth(&path)?;
            let amounts = library::get_amounts_out(s, value, &path)?;
            if last(&amounts) < amount_out_min {
                return Err(DexError::InsufficientOutputAmount);
            }
            self.take_native(s, caller, value)?;
            let first_pair = self.pair_address(s, &path[0], &path[1])?;
            self.wrap_native(s, amounts[0], &first_pair)?;
            self.swap_hops(s, &amounts, &path, &self.address)?;
            self.unwrap_to_user(s, &last(&path), last(&amounts), to)?;
            Ok(amounts)
        })
    }

    /// Receive exactly `amount_out` native; `path` must end with fwWETH.
    pub fn swap_tokens_for_exact_eth(
        &self,
        state: &mut DexState,
        caller: &Address,
        amount_out: u128,
        amount_in_max: u128,
        path: &[Address],
        to: &Address,
        deadline: u64,
    ) -> DexResult<Vec<u128>> {
        self.execute(state, caller, deadline, |s| {
            let path = self.resolve_path(s, path)?;
            self.require_ends_with_fw_weth(&path)?;
            let amounts = library::get_amounts_in(s, amount_out, &path)?;
            if amounts[0] > amount_in_max {
                return Err(DexError::ExcessiveInputAmount);
            }
            self.fund_exact_out(s, caller, &path, &amounts)?;
            self.swap_hops(s, &amounts, &path, &self.address)?;
            self.unwrap_native(s, amount_out, to)?;
            Ok(amounts)
        })
    }

    pub fn swap_exact_tokens_for_eth(
        &self,
        state: &mut DexState,
        caller: &Address,
        amount_in: u128,
        amount_out_min: u128,
        path: &[Address],
        to: &Address,
        deadline: u64,
    ) -> DexResult<Vec<u128>> {
        self.execute(state, caller, deadline, |s| {
            let path = self.resolve_path(s, path)?;
            self.require_ends_with_fw_weth(&path)?;
            let amounts = self.fund_exact_in(s, caller, &path, amount_in, amount_out_min)?;
            self.swap_hops(s, &amounts, &path, &self.address)?;
            self.unwrap_native(s, last(&amounts), to)?;
            Ok(amounts)
        })
    }

    /// Buy exactly `amount_out` tokens with native; the unspent part of
    /// `value` is refunded to `caller`.
    pub fn swap_eth_for_exact_tokens(
        &self,
        state: &mut DexState,
        caller: &Address,
        amount_out: u128,
        path: &[Address],
        to: &Address,
        deadline: u64,
        value: u128,
    ) -> DexResult<Vec<u128>> {
        self.execute(state, caller, deadline, |s| {
            let path = self.resolve_path(s, path)?;
            self.require_starts_with_fw_weth(&path)?;
            let amounts = library::get_amounts_in(s, amount_out, &path)?;
            if amounts[0] > value {
                return Err(DexError::ExcessiveInputAmount);
            }
            self.take_native(s, caller, value)?;
            let first_pair = self.pair_address(s, &path[0], &path[1])?;
            self.wrap_native(s, amounts[0], &first_pair)?;
            self.swap_hops(s, &amounts, &path, &self.address)?;
            self.unwrap_to_user(s, &last(&path), amount_out, to)?;

            let refund = value.safe_sub(amounts[0])?;
            if refund > 0 {
                s.ledger.send_native(&self.address, caller, refund)?;
            }
            Ok(amounts)
        })
    }
}

fn last<T: Copy>(items: &[T]) -> T {
    items[items.len() - 1]
}
