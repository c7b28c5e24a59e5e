//! Swaps and removals for underlying tokens that tax their own transfers.
//!
//! Nothing here trusts a nominal amount: each hop prices the input the pair
//! actually holds above its reserve, and slippage is checked against what
//! the recipient actually gained.
//!
//! ```text
//! amount_input  = balance_of(input, pair) − reserve_input
//! amount_output = get_amount_out(amount_input, reserve_input, reserve_output)
//! ```

use super::Router;
use crate::{pair, wrapped_token, DexState};
use few_core::{amm, Address, DexError, DexResult, SafeMath};
use few_vm::PermitSignature;

#[allow(clippy::too_many_arguments)]
impl Router {
    /// Hop loop driven by measured pair balances instead of precomputed amounts.
    fn swap_hops_measured(&self, s: &mut DexState, path: &[Address], to: &Address) -> DexResult<()> {
        for i in 0..path.len() - 1 {
            let (input, output) = (path[i], path[i + 1]);
            let pair_addr = self.pair_address(s, &input, &output)?;
            let p = s.pairs.pair(&pair_addr)?.clone();
            let (reserve_input, reserve_output) = if input == p.token0 {
                (p.reserve0, p.reserve1)
            } else {
                (p.reserve1, p.reserve0)
            };
            let amount_input = s.ledger.balance_of(&input, &pair_addr).safe_sub(reserve_input)?;
            let amount_output =
                amm::get_amount_out_with_fee(amount_input, reserve_input, reserve_output, s.swap_fee())?;
            let (amount0_out, amount1_out) = if input == p.token0 {
                (0, amount_output)
            } else {
                (amount_output, 0)
            };
            let recipient = if i < path.len() - 2 {
                self.pair_address(s, &output, &path[i + 2])?
            } else {
                *to
            };
            pair::swap(s, &pair_addr, &self.address, amount0_out, amount1_out, &recipient)?;
        }
        Ok(())
    }

    /// Run the hops to the router and release the output wrapper's
    /// underlying to `to`. Returns what `to` actually gained.
    fn swap_measured_to_user(&self, s: &mut DexState, path: &[Address], to: &Address) -> DexResult<u128> {
        let out = path[path.len() - 1];
        let held = s.ledger.balance_of(&out, &self.address);
        self.swap_hops_measured(s, path, &self.address)?;
        let amount = s.ledger.balance_of(&out, &self.address).safe_sub(held)?;

        let token = wrapped_token::underlying(&s.ledger, &out)?;
        let before = s.ledger.balance_of(&token, to);
        self.unwrap_to_user(s, &out, amount, to)?;
        s.ledger.balance_of(&token, to).safe_sub(before)
    }

    /// Returns the underlying amount `to` received.
    pub fn swap_exact_tokens_for_tokens_supporting_fee_on_transfer_tokens(
        &self,
        state: &mut DexState,
        caller: &Address,
        amount_in: u128,
        amount_out_min: u128,
        path: &[Address],
        to: &Address,
        deadline: u64,
    ) -> DexResult<u128> {
        self.execute(state, caller, deadline, |s| {
            let path = self.resolve_path(s, path)?;
            let first_pair = self.pair_address(s, &path[0], &path[1])?;
            self.pull_and_wrap(s, caller, &path[0], amount_in, &first_pair, true)?;
            let received = self.swap_measured_to_user(s, &path, to)?;
            if received < amount_out_min {
                return Err(DexError::InsufficientOutputAmount);
            }
            Ok(received)
        })
    }

    pub fn swap_exact_eth_for_tokens_supporting_fee_on_transfer_tokens(
        &self,
        state: &mut DexState,
        caller: &Address,
        amount_out_min: u128,
        path: &[Address],
        to: &Address,
        deadline: u64,
        value: u128,
    ) -> DexResult<u128> {
        self.execute(state, caller, deadline, |s| {
            let path = self.resolve_path(s, path)?;
            if path[0] != self.fw_weth {
                return Err(DexError::InvalidPath);
            }
            self.take_native(s, caller, value)?;
            let first_pair = self.pair_address(s, &path[0], &path[1])?;
            self.wrap_native(s, value, &first_pair)?;
            let received = self.swap_measured_to_user(s, &path, to)?;
            if received < amount_out_min {
                return Err(DexError::InsufficientOutputAmount);
            }
            Ok(received)
        })
    }

    /// Returns the native amount sent to `to`.
    pub fn swap_exact_tokens_for_eth_supporting_fee_on_transfer_tokens(
        &self,
        state: &mut DexState,
        caller: &Address,
        amount_in: u128,
        amount_out_min: u128,
        path: &[Address],
        to: &Address,
        deadline: u64,
    ) -> DexResult<u128> {
        self.execute(state, caller, deadline, |s| {
            let path = self.resolve_path(s, path)?;
            if path[path.len() - 1] != self.fw_weth {
                return Err(DexError::InvalidPath);
            }
            let first_pair = self.pair_address(s, &path[0], &path[1])?;
            self.pull_and_wrap(s, caller, &path[0], amount_in, &first_pair, true)?;

            let held = s.ledger.balance_of(&self.fw_weth, &self.address);
            self.swap_hops_measured(s, &path, &self.address)?;
            let amount_out = s.ledger.balance_of(&self.fw_weth, &self.address).safe_sub(held)?;
            if amount_out < amount_out_min {
                return Err(DexError::InsufficientOutputAmount);
            }
            self.unwrap_native(s, amount_out, to)?;
            Ok(amount_out)
        })
    }

    fn remove_eth_measured(
        &self,
        s: &mut DexState,
        caller: &Address,
        token: &Address,
        liquidity: u128,
        amount_token_min: u128,
        amount_eth_min: u128,
        to: &Address,
    ) -> DexResult<u128> {
        let wrapped = self.resolve_existing(s, token)?;
        let fw_weth = self.fw_weth;
        let (amount_token, amount_eth) = self.burn_to_router(
            s,
            caller,
            &wrapped,
            &fw_weth,
            liquidity,
            amount_token_min,
            amount_eth_min,
        )?;

        // unwrap into the router first; forward only what actually arrived
        let underlying = wrapped_token::underlying(&s.ledger, &wrapped)?;
        let before = s.ledger.balance_of(&underlying, &self.address);
        wrapped_token::unwrap_to(&mut s.ledger, &wrapped, &self.address, amount_token, &self.address)?;
        let arrived = s.ledger.balance_of(&underlying, &self.address).safe_sub(before)?;
        if arrived > 0 {
            s.ledger.transfer(&underlying, &self.address, to, arrived)?;
        }
        self.unwrap_native(s, amount_eth, to)?;
        Ok(amount_eth)
    }

    /// Returns the native amount sent to `to`.
    pub fn remove_liquidity_eth_supporting_fee_on_transfer_tokens(
        &self,
        state: &mut DexState,
        caller: &Address,
        token: &Address,
        liquidity: u128,
        amount_token_min: u128,
        amount_eth_min: u128,
        to: &Address,
        deadline: u64,
    ) -> DexResult<u128> {
        self.execute(state, caller, deadline, |s| {
            self.remove_eth_measured(s, caller, token, liquidity, amount_token_min, amount_eth_min, to)
        })
    }

    pub fn remove_liquidity_eth_with_permit_supporting_fee_on_transfer_tokens(
        &self,
        state: &mut DexState,
        caller: &Address,
        token: &Address,
        liquidity: u128,
        amount_token_min: u128,
        amount_eth_min: u128,
        to: &Address,
        deadline: u64,
        approve_max: bool,
        sig: &PermitSignature,
    ) -> DexResult<u128> {
        self.execute(state, caller, deadline, |s| {
            let wrapped = self.resolve_existing(s, token)?;
            let pair = self.pair_address(s, &wrapped, &self.fw_weth)?;
            self.permit_shares(s, caller, &pair, liquidity, deadline, approve_max, sig)?;
            self.remove_eth_measured(s, caller, token, liquidity, amount_token_min, amount_eth_min, to)
        })
    }
}
