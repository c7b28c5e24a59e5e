//! Native value ⇄ fwWETH in a single call.
//!
//! ```text
//! wrap:   native ─deposit─► WETH ─wrap_to(to)─► fwWETH
//! unwrap: fwWETH ─unwrap─► WETH ─withdraw─► native ─► to
//! ```

use crate::{wrapped_token, DexState};
use few_core::{derive_id, template_hash, Address, DexError, DexResult};

pub const ETH_WRAPPER_TEMPLATE: &str = "FewETHWrapper";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EthWrapper {
    pub address: Address,
    pub weth: Address,
    pub fw_weth: Address,
}

impl EthWrapper {
    pub fn deploy(state: &mut DexState) -> DexResult<EthWrapper> {
        let address = derive_id(
            &state.wrappers.address,
            ETH_WRAPPER_TEMPLATE.as_bytes(),
            &template_hash(ETH_WRAPPER_TEMPLATE),
        );
        let weth = state.weth;
        let fw_weth = state.get_or_create_wrapper(&weth)?;
        log::info!("eth wrapper at {} for {}", address, fw_weth);
        Ok(EthWrapper {
            address,
            weth,
            fw_weth,
        })
    }

    /// Turn `value` of `caller`'s native balance into fwWETH for `to`.
    pub fn wrap_eth_to_fw_weth(
        &self,
        state: &mut DexState,
        caller: &Address,
        to: &Address,
        value: u128,
    ) -> DexResult<u128> {
        state.transact(|s| {
            if s.ledger.native_balance(caller) < value {
                return Err(DexError::InsufficientNativeValue);
            }
            s.ledger.send_native(caller, &self.address, value)?;
            s.ledger.deposit_native(&self.weth, &self.address, value)?;
            s.ledger.approve(&self.weth, &self.address, &self.fw_weth, value)?;
            let minted = wrapped_token::wrap_to(&mut s.ledger, &self.fw_weth, &self.address, value, to)?;
            self.ensure_empty(s)?;
            Ok(minted)
        })
    }

    /// Pull `amount` fwWETH from `caller` (allowance to this helper) and send
    /// the native value to `to`.
    pub fn unwrap_fw_weth_to_eth(
        &self,
        state: &mut DexState,
        caller: &Address,
        amount: u128,
        to: &Address,
    ) -> DexResult<()> {
        state.transact(|s| {
            s.ledger
                .transfer_from(&self.fw_weth, &self.address, caller, &self.address, amount)?;
            wrapped_token::unwrap_to(&mut s.ledger, &self.fw_weth, &self.address, amount, &self.address)?;
            s.ledger.withdraw_native(&self.weth, &self.address, amount)?;
            s.ledger.send_native(&self.address, to, amount)?;
            self.ensure_empty(s)
        })
    }

    fn ensure_empty(&self, s: &DexState) -> DexResult<()> {
        if s.ledger.native_balance(&self.address) != 0 {
            return Err(DexError::NativeDust);
        }
        Ok(())
    }
}
