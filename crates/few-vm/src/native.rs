//! Native-asset wrapper (WETH-style): native value in, 1:1 token units out.

use crate::{Ledger, TokenKind};
use few_core::{Address, DexError, DexEvent, DexResult, SafeMath};

impl Ledger {
    fn require_native_wrapper(&self, weth: &Address) -> DexResult<()> {
        match self.token_kind(weth)? {
            TokenKind::NativeWrapper => Ok(()),
            _ => Err(DexError::Forbidden),
        }
    }

    /// Lock `amount` native from `caller` in the wrapper and credit the same
    /// number of wrapper units.
    pub fn deposit_native(&mut self, weth: &Address, caller: &Address, amount: u128) -> DexResult<()> {
        self.require_native_wrapper(weth)?;
        self.send_native(caller, weth, amount)?;
        let t = self.tokens.get_mut(weth).ok_or(DexError::NotDeployed)?;
        t.total_supply = t.total_supply.safe_add(amount)?;
        let bal = t.balance_of(caller).safe_add(amount)?;
        t.balances.insert(*caller, bal);
        self.emit(
            *weth,
            DexEvent::Deposit {
                dst: *caller,
                amount,
            },
        );
        Ok(())
    }

    /// Burn `amount` wrapper units from `caller` and release the native value.
    pub fn withdraw_native(&mut self, weth: &Address, caller: &Address, amount: u128) -> DexResult<()> {
        self.require_native_wrapper(weth)?;
        let t = self.tokens.get_mut(weth).ok_or(DexError::NotDeployed)?;
        let bal = t.balance_of(caller);
        if bal < amount {
            return Err(DexError::InsufficientBalance);
        }
        t.balances.insert(*caller, bal - amount);
        t.total_supply = t.total_supply.safe_sub(amount)?;
        self.send_native(weth, caller, amount)?;
        self.emit(
            *weth,
            DexEvent::Withdrawal {
                src: *caller,
                amount,
            },
        );
        Ok(())
    }
}
