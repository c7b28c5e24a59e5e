// SPDX-License-Identifier: AGPL-3.0-only
//! # Router
//!
//! User-facing entry point: liquidity management and multi-hop swaps over
//! wrapped tokens. Callers deal in underlying tokens (or native value); the
//! router wraps on the way in and unwraps on the way out.
//!
//! ```text
//! caller ─underlying─► router ─wrap_to(pair)─► pair₀ ─► pair₁ ─► … ─► router
//!                                                                   │
//! to ◄──────────────────────── unwrap_to(to) ◄───────────────────────┘
//! ```
//!
//! Tokens may be named by their underlying address or by their wrapper
//! address; both resolve to the wrapper. ETH variants take native value,
//! route it through WETH → fwWETH, and require the path to start (or end)
//! with fwWETH.
//!
//! Every operation:
//! - runs atomically in [`DexState::transact`];
//! - fails `Expired` when `deadline < now`;
//! - ends with the router holding no native value (`NativeDust` otherwise).

mod fee_on_transfer;
mod liquidity;
mod swap;

use crate::library::{self, sort_tokens};
use crate::{wrapped_token, DexState};
use few_core::config::RouterSettings;
use few_core::{amm, derive_id, template_hash, Address, DexError, DexResult, SafeMath};
use few_vm::TokenKind;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

pub const ROUTER_TEMPLATE: &str = "FewV1Router";

/// Per-router behaviour switches.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouterConfig {
    /// Use measured deltas (not nominal amounts) after every pull
    pub fee_on_transfer_aware: bool,
    /// Only permitted accounts may call
    pub restrict_accounts: bool,
}

impl From<&RouterSettings> for RouterConfig {
    fn from(settings: &RouterSettings) -> Self {
        RouterConfig {
            fee_on_transfer_aware: settings.fee_on_transfer_aware,
            restrict_accounts: settings.restrict_accounts,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Router {
    pub address: Address,
    pub owner: Address,
    pub config: RouterConfig,
    fw_weth: Address,
    permitted_accounts: BTreeSet<Address>,
}

impl Router {
    /// Deploy a router named `label`, creating the fwWETH wrapper if needed.
    pub fn deploy(state: &mut DexState, label: &str, config: RouterConfig) -> DexResult<Router> {
        let address = derive_id(&Address::ZERO, label.as_bytes(), &template_hash(ROUTER_TEMPLATE));
        let weth = state.weth;
        let fw_weth = state.get_or_create_wrapper(&weth)?;
        log::info!(
            "router '{}' at {} (fee_on_transfer_aware={}, restrict_accounts={})",
            label,
            address,
            config.fee_on_transfer_aware,
            config.restrict_accounts
        );
        Ok(Router {
            address,
            owner: state.pairs.owner,
            config,
            fw_weth,
            permitted_accounts: BTreeSet::new(),
        })
    }

    // ── Queries ──

    /// Pair factory.
    pub fn factory(&self, state: &DexState) -> Address {
        state.pairs.address
    }

    /// Wrapper factory.
    pub fn few_factory(&self, state: &DexState) -> Address {
        state.wrappers.address
    }

    pub fn weth(&self, state: &DexState) -> Address {
        state.weth
    }

    pub fn fw_weth(&self) -> Address {
        self.fw_weth
    }

    pub fn set_permitted_account(
        &mut self,
        caller: &Address,
        account: &Address,
        permitted: bool,
    ) -> DexResult<()> {
        if *caller != self.owner {
            return Err(DexError::Forbidden);
        }
        if permitted {
            self.permitted_accounts.insert(*account);
        } else {
            self.permitted_accounts.remove(account);
        }
        Ok(())
    }

    pub fn is_permitted_account(&self, account: &Address) -> bool {
        self.permitted_accounts.contains(account)
    }

    // ── Pricing ──

    pub fn quote(&self, amount_a: u128, reserve_a: u128, reserve_b: u128) -> DexResult<u128> {
        amm::quote(amount_a, reserve_a, reserve_b)
    }

    pub fn get_amount_out(
        &self,
        state: &DexState,
        amount_in: u128,
        reserve_in: u128,
        reserve_out: u128,
    ) -> DexResult<u128> {
        amm::get_amount_out_with_fee(amount_in, reserve_in, reserve_out, state.swap_fee())
    }

    pub fn get_amount_in(
        &self,
        state: &DexState,
        amount_out: u128,
        reserve_in: u128,
        reserve_out: u128,
    ) -> DexResult<u128> {
        amm::get_amount_in_with_fee(amount_out, reserve_in, reserve_out, state.swap_fee())
    }

    pub fn get_amounts_out(&self, state: &DexState, amount_in: u128, path: &[Address]) -> DexResult<Vec<u128>> {
        let path = self.existing_path(state, path)?;
        library::get_amounts_out(state, amount_in, &path)
    }

    pub fn get_amounts_in(&self, state: &DexState, amount_out: u128, path: &[Address]) -> DexResult<Vec<u128>> {
        let path = self.existing_path(state, path)?;
        library::get_amounts_in(state, amount_out, &path)
    }

    // ─────────────────────────────────────────────────────────
    // INTERNALS
    // ─────────────────────────────────────────────────────────

    /// Atomic envelope shared by every state-changing entry point.
    fn execute<T, F>(&self, state: &mut DexState, caller: &Address, deadline: u64, op: F) -> DexResult<T>
    where
        F: FnOnce(&mut DexState) -> DexResult<T>,
    {
        state.transact(|s| {
            if self.config.restrict_accounts && !self.is_permitted_account(caller) {
                return Err(DexError::Forbidden);
            }
            if deadline < s.ledger.timestamp() {
                return Err(DexError::Expired);
            }
            let out = op(s)?;
            if s.ledger.native_balance(&self.address) != 0 {
                return Err(DexError::NativeDust);
            }
            Ok(out)
        })
    }

    /// Wrapper for `token`, creating it on first use.
    fn resolve(&self, s: &mut DexState, token: &Address) -> DexResult<Address> {
        if let TokenKind::Wrapped { .. } = s.ledger.token_kind(token)? {
            return Ok(*token);
        }
        s.get_or_create_wrapper(token)
    }

    /// Wrapper for `token` without creating anything.
    fn resolve_existing(&self, state: &DexState, token: &Address) -> DexResult<Address> {
        if let Ok(TokenKind::Wrapped { .. }) = state.ledger.token_kind(token) {
            return Ok(*token);
        }
        let wrapper = state.wrappers.get_wrapped_token(token);
        if wrapper.is_zero() {
            return Err(DexError::PairNotFound);
        }
        Ok(wrapper)
    }

    fn resolve_path(&self, s: &mut DexState, path: &[Address]) -> DexResult<Vec<Address>> {
        if path.len() < 2 {
            return Err(DexError::InvalidPath);
        }
        path.iter().map(|t| self.resolve(s, t)).collect()
    }

    fn existing_path(&self, state: &DexState, path: &[Address]) -> DexResult<Vec<Address>> {
        if path.len() < 2 {
            return Err(DexError::InvalidPath);
        }
        path.iter().map(|t| self.resolve_existing(state, t)).collect()
    }

    fn pair_address(&self, state: &DexState, a: &Address, b: &Address) -> DexResult<Address> {
        let pair = state.pairs.get_pair(a, b);
        if pair.is_zero() {
            return Err(DexError::PairNotFound);
        }
        Ok(pair)
    }

    /// Pull `amount` underlying of `wrapper` from `caller` and wrap it into
    /// `dest`. Returns the wrapper units minted to `dest`.
    ///
    /// Only what this pull delivered is forwarded; tokens already sitting in
    /// the router are never spent. Without `measure` the delivery must be the
    /// full nominal `amount`.
    fn pull_and_wrap(
        &self,
        s: &mut DexState,
        caller: &Address,
        wrapper: &Address,
        amount: u128,
        dest: &Address,
        measure: bool,
    ) -> DexResult<u128> {
        let token = wrapped_token::underlying(&s.ledger, wrapper)?;
        let before = s.ledger.balance_of(&token, &self.address);
        s.ledger
            .transfer_from(&token, &self.address, caller, &self.address, amount)?;
        let pulled = s.ledger.balance_of(&token, &self.address).safe_sub(before)?;
        if !measure && pulled != amount {
            return Err(DexError::InsufficientInputAmount);
        }
        s.ledger.approve(&token, &self.address, wrapper, pulled)?;
        wrapped_token::wrap_to(&mut s.ledger, wrapper, &self.address, pulled, dest)
    }

    /// Take `value` native from `caller` into the router.
    fn take_native(&self, s: &mut DexState, caller: &Address, value: u128) -> DexResult<()> {
        if s.ledger.native_balance(caller) < value {
            return Err(DexError::InsufficientNativeValue);
        }
        s.ledger.send_native(caller, &self.address, value)
    }

    /// Router native → WETH → fwWETH minted to `dest`.
    fn wrap_native(&self, s: &mut DexState, amount: u128, dest: &Address) -> DexResult<u128> {
        let weth = s.weth;
        s.ledger.deposit_native(&weth, &self.address, amount)?;
        s.ledger.approve(&weth, &self.address, &self.fw_weth, amount)?;
        wrapped_token::wrap_to(&mut s.ledger, &self.fw_weth, &self.address, amount, dest)
    }

    /// Router fwWETH → WETH → native sent to `to`.
    fn unwrap_native(&self, s: &mut DexState, amount: u128, to: &Address) -> DexResult<()> {
        let weth = s.weth;
        wrapped_token::unwrap_to(&mut s.ledger, &self.fw_weth, &self.address, amount, &self.address)?;
        s.ledger.withdraw_native(&weth, &self.address, amount)?;
        s.ledger.send_native(&self.address, to, amount)
    }

    /// Release router-held wrapper units as underlying to `to`.
    fn unwrap_to_user(&self, s: &mut DexState, wrapper: &Address, amount: u128, to: &Address) -> DexResult<()> {
        wrapped_token::unwrap_to(&mut s.ledger, wrapper, &self.address, amount, to)
    }

    /// Walk the path with precomputed `amounts`; each hop's output goes
    /// straight into the next pair, the last one to `to`.
    fn swap_hops(&self, s: &mut DexState, amounts: &[u128], path: &[Address], to: &Address) -> DexResult<()> {
        for i in 0..path.len() - 1 {
            let (input, output) = (path[i], path[i + 1]);
            let (token0, _) = sort_tokens(&input, &output)?;
            let amount_out = amounts[i + 1];
            let (amount0_out, amount1_out) = if input == token0 {
                (0, amount_out)
            } else {
                (amount_out, 0)
            };
            let recipient = if i < path.len() - 2 {
                self.pair_address(s, &output, &path[i + 2])?
            } else {
                *to
            };
            let pair = self.pair_address(s, &input, &output)?;
            crate::pair::swap(s, &pair, &self.address, amount0_out, amount1_out, &recipient)?;
        }
        Ok(())
    }
}

// ─────────────────────────────────────────────────────────────
// TEST FIXTURES
// ─────────────────────────────────────────────────────────────
