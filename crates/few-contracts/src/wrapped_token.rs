// SPDX-License-Identifier: AGPL-3.0-only
//! # Few Wrapped Token
//!
//! A wrapper unit represents one unit of an underlying token held in the
//! wrapper's custody. Wrapping measures what actually arrived, so a token
//! that taxes its own transfers yields fewer wrapper units than requested.
//!
//! ```text
//! wrap_to(caller, amount, to):
//!   before = underlying.balance_of(wrapper)
//!   underlying.transfer_from(caller → wrapper, amount)
//!   d = underlying.balance_of(wrapper) − before     (d > 0)
//!   mint d wrapper units to `to`
//!
//! unwrap_to(caller, amount, to):
//!   burn amount wrapper units from caller
//!   underlying.transfer(wrapper → to, amount)
//! ```
//!
//! Ordinary token operations (transfer, approve, permit, ...) are the
//! ledger's own; the wrapper only adds the custody moves above.

use few_core::{Address, DexError, DexEvent, DexResult, SafeMath};
use few_vm::{Ledger, TokenKind};

/// Underlying token backing `wrapper`.
pub fn underlying(ledger: &Ledger, wrapper: &Address) -> DexResult<Address> {
    match ledger.token_kind(wrapper)? {
        TokenKind::Wrapped { underlying } => Ok(underlying),
        _ => Err(DexError::NotWrappedToken),
    }
}

/// Underlying units held by the wrapper, including un-swept deposits.
pub fn custody(ledger: &Ledger, wrapper: &Address) -> DexResult<u128> {
    let token = underlying(ledger, wrapper)?;
    Ok(ledger.balance_of(&token, wrapper))
}

pub fn wrap(ledger: &mut Ledger, wrapper: &Address, caller: &Address, amount: u128) -> DexResult<u128> {
    wrap_to(ledger, wrapper, caller, amount, caller)
}

/// Pull `amount` underlying from `caller` and mint the measured delta to `to`.
pub fn wrap_to(
    ledger: &mut Ledger,
    wrapper: &Address,
    caller: &Address,
    amount: u128,
    to: &Address,
) -> DexResult<u128> {
    ledger.transact(|l| {
        let token = underlying(l, wrapper)?;
        let before = l.balance_of(&token, wrapper);
        l.transfer_from(&token, wrapper, caller, wrapper, amount)?;
        let received = l.balance_of(&token, wrapper).safe_sub(before)?;
        if received == 0 {
            return Err(DexError::InsufficientInputAmount);
        }
        l.mint(wrapper, to, received)?;
        l.emit(
            *wrapper,
            DexEvent::Wrap {
                sender: *caller,
                amount: received,
                to: *to,
            },
        );
        log::debug!("wrap {} of {} via {} to {}", received, token, wrapper, to);
        Ok(received)
    })
}

pub fn unwrap(ledger: &mut Ledger, wrapper: &Address, caller: &Address, amount: u128) -> DexResult<()> {
    unwrap_to(ledger, wrapper, caller, amount, caller)
}

/// Burn `amount` wrapper units from `caller` and release the underlying to `to`.
pub fn unwrap_to(
    ledger: &mut Ledger,
    wrapper: &Address,
    caller: &Address,
    amount: u128,
    to: &Address,
) -> DexResult<()> {
    ledger.transact(|l| release(l, wrapper, caller, caller, amount, to))
}

/// Operator variant: burns `owner`'s units against `owner`'s allowance to `operator`.
pub fn unwrap_from(
    ledger: &mut Ledger,
    wrapper: &Address,
    operator: &Address,
    owner: &Address,
    amount: u128,
    to: &Address,
) -> DexResult<()> {
    ledger.transact(|l| {
        l.spend_allowance(wrapper, owner, operator, amount)?;
        release(l, wrapper, operator, owner, amount, to)
    })
}

fn release(
    l: &mut Ledger,
    wrapper: &Address,
    sender: &Address,
    owner: &Address,
    amount: u128,
    to: &Address,
) -> DexResult<()> {
    let token = underlying(l, wrapper)?;
    l.burn(wrapper, owner, amount)?;
    l.transfer(&token, wrapper, to, amount)?;
    l.emit(
        *wrapper,
        DexEvent::Unwrap {
            sender: *sender,
            amount,
            to: *to,
        },
    );
    log::debug!("unwrap {} of {} via {} to {}", amount, token, wrapper, to);
    Ok(())
}

// ─────────────────────────────────────────────────────────────
// TESTS
// ─────────────────────────────────────────────────────────────
