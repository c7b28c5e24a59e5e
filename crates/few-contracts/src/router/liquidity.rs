//! Liquidity entry points: add / remove, ETH variants and permit variants.

use super::Router;
use crate::library::{self, sort_tokens};
use crate::{pair, DexState};
use few_core::{amm, Address, DexError, DexResult, SafeMath};
use few_vm::PermitSignature;

#[allow(clippy::too_many_arguments)]
impl Router {
    /// Deposit amounts honouring the current pool ratio. Creates the pair
    /// when it does not exist yet.
    fn liquidity_amounts(
        &self,
        s: &mut DexState,
        wrapped_a: &Address,
        wrapped_b: &Address,
        amount_a_desired: u128,
        amount_b_desired: u128,
        amount_a_min: u128,
        amount_b_min: u128,
    ) -> DexResult<(u128, u128)> {
        if s.pairs.get_pair(wrapped_a, wrapped_b).is_zero() {
            s.create_pair(wrapped_a, wrapped_b)?;
        }
        let (reserve_a, reserve_b) = library::get_reserves(s, wrapped_a, wrapped_b)?;
        if reserve_a == 0 && reserve_b == 0 {
            return Ok((amount_a_desired, amount_b_desired));
        }
        let amount_b_optimal = amm::quote(amount_a_desired, reserve_a, reserve_b)?;
        if amount_b_optimal <= amount_b_desired {
            if amount_b_optimal < amount_b_min {
                return Err(DexError::InsufficientBAmount);
            }
            return Ok((amount_a_desired, amount_b_optimal));
        }
        let amount_a_optimal = amm::quote(amount_b_desired, reserve_b, reserve_a)?;
        if amount_a_optimal > amount_a_desired || amount_a_optimal < amount_a_min {
            return Err(DexError::InsufficientAAmount);
        }
        Ok((amount_a_optimal, amount_b_desired))
    }

    /// Returns `(amount_a, amount_b, liquidity)` where the amounts are the
    /// wrapper units that reached the pair.
    pub fn add_liquidity(
        &self,
        state: &mut DexState,
        caller: &Address,
        token_a: &Address,
        token_b: &Address,
        amount_a_desired: u128,
        amount_b_desired: u128,
        amount_a_min: u128,
        amount_b_min: u128,
        to: &Address,
        deadline: u64,
    ) -> DexResult<(u128, u128, u128)> {
        self.execute(state, caller, deadline, |s| {
            let wrapped_a = self.resolve(s, token_a)?;
            let wrapped_b = self.resolve(s, token_b)?;
            let (amount_a, amount_b) = self.liquidity_amounts(
                s,
                &wrapped_a,
                &wrapped_b,
                amount_a_desired,
                amount_b_desired,
                amount_a_min,
                amount_b_min,
            )?;
            let pair = self.pair_address(s, &wrapped_a, &wrapped_b)?;
            let measure = self.config.fee_on_transfer_aware;
            let sent_a = self.pull_and_wrap(s, caller, &wrapped_a, amount_a, &pair, measure)?;
            let sent_b = self.pull_and_wrap(s, caller, &wrapped_b, amount_b, &pair, measure)?;
            let liquidity = pair::mint(s, &pair, &self.address, to)?;
            Ok((sent_a, sent_b, liquidity))
        })
    }

    /// `value` native is the ETH budget; the unused part is refunded to `caller`.
    pub fn add_liquidity_eth(
        &self,
        state: &mut DexState,
        caller: &Address,
        token: &Address,
        amount_token_desired: u128,
        amount_token_min: u128,
        amount_eth_min: u128,
        to: &Address,
        deadline: u64,
        value: u128,
    ) -> DexResult<(u128, u128, u128)> {
        self.execute(state, caller, deadline, |s| {
            self.take_native(s, caller, value)?;
            let wrapped = self.resolve(s, token)?;
            let fw_weth = self.fw_weth;
            let (amount_token, amount_eth) = self.liquidity_amounts(
                s,
                &wrapped,
                &fw_weth,
                amount_token_desired,
                value,
                amount_token_min,
                amount_eth_min,
            )?;
            let pair = self.pair_address(s, &wrapped, &fw_weth)?;
            let measure = self.config.fee_on_transfer_aware;
            let sent_token = self.pull_and_wrap(s, caller, &wrapped, amount_token, &pair, measure)?;
            self.wrap_native(s, amount_eth, &pair)?;
            let liquidity = pair::mint(s, &pair, &self.address, to)?;

            let refund = value.safe_sub(amount_eth)?;
            if refund > 0 {
                s.ledger.send_native(&self.address, caller, refund)?;
            }
            Ok((sent_token, amount_eth, liquidity))
        })
    }

    /// Move `liquidity` shares from `caller` into the pair and burn them to
    /// the router. Returns wrapper amounts ordered as `(wrapped_a, wrapped_b)`.
    pub(super) fn burn_to_router(
        &self,
        s: &mut DexState,
        caller: &Address,
        wrapped_a: &Address,
        wrapped_b: &Address,
        liquidity: u128,
        amount_a_min: u128,
        amount_b_min: u128,
    ) -> DexResult<(u128, u128)> {
        let pair = self.pair_address(s, wrapped_a, wrapped_b)?;
        s.ledger
            .transfer_from(&pair, &self.address, caller, &pair, liquidity)?;
        let (amount0, amount1) = pair::burn(s, &pair, &self.address, &self.address)?;
        let (token0, _) = sort_tokens(wrapped_a, wrapped_b)?;
        let (amount_a, amount_b) = if *wrapped_a == token0 {
            (amount0, amount1)
        } else {
            (amount1, amount0)
        };
        if amount_a < amount_a_min {
            return Err(DexError::InsufficientAAmount);
        }
        if amount_b < amount_b_min {
            return Err(DexError::InsufficientBAmount);
        }
        Ok((amount_a, amount_b))
    }

    fn remove_inner(
        &self,
        s: &mut DexState,
        caller: &Address,
        token_a: &Address,
        token_b: &Address,
        liquidity: u128,
        amount_a_min: u128,
        amount_b_min: u128,
        to: &Address,
    ) -> DexResult<(u128, u128)> {
        let wrapped_a = self.resolve_existing(s, token_a)?;
        let wrapped_b = self.resolve_existing(s, token_b)?;
        let (amount_a, amount_b) = self.burn_to_router(
            s,
            caller,
            &wrapped_a,
            &wrapped_b,
            liquidity,
            amount_a_min,
            amount_b_min,
        )?;
        self.unwrap_to_user(s, &wrapped_a, amount_a, to)?;
        self.unwrap_to_user(s, &wrapped_b, amount_b, to)?;
        Ok((amount_a, amount_b))
    }

    fn remove_eth_inner(
        &self,
        s: &mut DexState,
        caller: &Address,
        token: &Address,
        liquidity: u128,
        amount_token_min: u128,
        amount_eth_min: u128,
        to: &Address,
    ) -> DexResult<(u128, u128)> {
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
        self.unwrap_to_user(s, &wrapped, amount_token, to)?;
        self.unwrap_native(s, amount_eth, to)?;
        Ok((amount_token, amount_eth))
    }

    /// Apply a signed share approval from `caller` to this router.
    pub(super) fn permit_shares(
        &self,
        s: &mut DexState,
        caller: &Address,
        pair: &Address,
        liquidity: u128,
        deadline: u64,
        approve_max: bool,
        sig: &PermitSignature,
    ) -> DexResult<()> {
        let value = if approve_max { u128::MAX } else { liquidity };
        s.ledger
            .permit(pair, caller, &self.address, value, deadline, sig)
    }

    pub fn remove_liquidity(
        &self,
        state: &mut DexState,
        caller: &Address,
        token_a: &Address,
        token_b: &Address,
        liquidity: u128,
        amount_a_min: u128,
        amount_b_min: u128,
        to: &Address,
        deadline: u64,
    ) -> DexResult<(u128, u128)> {
        self.execute(state, caller, deadline, |s| {
            self.remove_inner(s, caller, token_a, token_b, liquidity, amount_a_min, amount_b_min, to)
        })
    }

    /// Returns `(amount_token, amount_eth)`; the ETH side arrives as native value.
    pub fn remove_liquidity_eth(
        &self,
        state: &mut DexState,
        caller: &Address,
        token: &Address,
        liquidity: u128,
        amount_token_min: u128,
        amount_eth_min: u128,
        to: &Address,
        deadline: u64,
    ) -> DexResult<(u128, u128)> {
        self.execute(state, caller, deadline, |s| {
            self.remove_eth_inner(s, caller, token, liquidity, amount_token_min, amount_eth_min, to)
        })
    }

    pub fn remove_liquidity_with_permit(
        &self,
        state: &mut DexState,
        caller: &Address,
        token_a: &Address,
        token_b: &Address,
        liquidity: u128,
        amount_a_min: u128,
        amount_b_min: u128,
        to: &Address,
        deadline: u64,
        approve_max: bool,
        sig: &PermitSignature,
    ) -> DexResult<(u128, u128)> {
        self.execute(state, caller, deadline, |s| {
            let wrapped_a = self.resolve_existing(s, token_a)?;
            let wrapped_b = self.resolve_existing(s, token_b)?;
            let pair = self.pair_address(s, &wrapped_a, &wrapped_b)?;
            self.permit_shares(s, caller, &pair, liquidity, deadline, approve_max, sig)?;
            self.remove_inner(s, caller, token_a, token_b, liquidity, amount_a_min, amount_b_min, to)
        })
    }

    pub fn remove_liquidity_eth_with_permit(
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
    ) -> DexResult<(u128, u128)> {
        self.execute(state, caller, deadline, |s| {
            let wrapped = self.resolve_existing(s, token)?;
            let pair = self.pair_address(s, &wrapped, &self.fw_weth)?;
            self.permit_shares(s, caller, &pair, liquidity, deadline, approve_max, sig)?;
            self.remove_eth_inner(s, caller, token, liquidity, amount_token_min, amount_eth_min, to)
        })
    }
}
