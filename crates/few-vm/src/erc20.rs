// SPDX-License-Identifier: AGPL-3.0-only
//! # Fungible Token Ledger
//!
//! Every token in the system (plain tokens, transfer-taxed tokens, the native
//! wrapper, wrapped tokens and pair liquidity shares) is a row in the ledger's
//! token table with ERC-20 semantics.
//!
//! ## State Layout
//!
//! | Field        | Type                                 | Notes                          |
//! |--------------|--------------------------------------|--------------------------------|
//! | metadata     | name / symbol / decimals             | empty strings allowed          |
//! | kind         | [`TokenKind`]                        | transfer & wrapping behaviour  |
//! | total_supply | u128                                 | == Σ balances                  |
//! | balances     | Address → u128                       |                                |
//! | allowances   | (owner, spender) → u128              | `u128::MAX` never decremented  |
//! | nonces       | Address → u128                       | permit replay protection       |
//!
//! ## Permit
//!
//! ```text
//! digest = keccak256(0x19 0x01 ‖ DOMAIN_SEPARATOR ‖
//!            keccak256(PERMIT_TYPEHASH ‖ owner ‖ spender ‖ value ‖ nonce ‖ deadline))
//! ```
//! The signature is Ed25519 over `digest`; the owner must be the address
//! derived from the signing public key.

use crate::Ledger;
use few_core::{Address, DexError, DexEvent, DexResult, SafeMath, MAX_ALLOWANCE};
use few_crypto::{keccak256, public_key_to_address, sign_message, verify_signature, KeyPair};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Version string bound into every domain separator.
pub const PERMIT_VERSION: &str = "1";

// ─────────────────────────────────────────────────────────────
// TOKEN STATE
// ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum TokenKind {
    /// Plain fungible token
    Standard,
    /// Burns `amount / burn_divisor` from the sender on every transfer
    Deflating { burn_divisor: u128 },
    /// Native-asset wrapper (deposit / withdraw)
    NativeWrapper,
    /// Wrapper unit backed by an underlying token
    Wrapped { underlying: Address },
    /// Pair liquidity share
    PoolShare,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenMetadata {
    pub name: String,
    pub symbol: String,
    pub decimals: u8,
}

impl TokenMetadata {
    pub fn new(name: &str, symbol: &str, decimals: u8) -> Self {
        TokenMetadata {
            name: name.to_string(),
            symbol: symbol.to_string(),
            decimals,
        }
    }
}

#[derive(Debug, Clone)]
pub struct TokenState {
    pub metadata: TokenMetadata,
    pub kind: TokenKind,
    pub total_supply: u128,
    pub balances: BTreeMap<Address, u128>,
    pub allowances: BTreeMap<(Address, Address), u128>,
    pub nonces: BTreeMap<Address, u128>,
}

impl TokenState {
    fn new(metadata: TokenMetadata, kind: TokenKind) -> Self {
        TokenState {
            metadata,
            kind,
            total_supply: 0,
            balances: BTreeMap::new(),
            allowances: BTreeMap::new(),
            nonces: BTreeMap::new(),
        }
    }

    pub fn balance_of(&self, owner: &Address) -> u128 {
        self.balances.get(owner).copied().unwrap_or(0)
    }

    fn credit(&mut self, to: &Address, amount: u128) -> DexResult<()> {
        let bal = self.balance_of(to).safe_add(amount)?;
        self.balances.insert(*to, bal);
        Ok(())
    }

    fn debit(&mut self, from: &Address, amount: u128) -> DexResult<()> {
        let bal = self.balance_of(from);
        if bal < amount {
            return Err(DexError::InsufficientBalance);
        }
        self.balances.insert(*from, bal - amount);
        Ok(())
    }
}

/// Signature material for [`Ledger::permit`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PermitSignature {
    pub public_key: Vec<u8>,
    pub signature: Vec<u8>,
}

pub fn permit_typehash() -> [u8; 32] {
    keccak256(b"Permit(address owner,address spender,uint256 value,uint256 nonce,uint256 deadline)")
}

fn domain_typehash() -> [u8; 32] {
    keccak256(b"EIP712Domain(string name,string version,uint256 chainId,address verifyingContract)")
}

fn word_address(a: &Address) -> [u8; 32] {
    let mut w = [0u8; 32];
    w[12..].copy_from_slice(a.as_bytes());
    w
}

fn word_u128(v: u128) -> [u8; 32] {
    let mut w = [0u8; 32];
    w[16..].copy_from_slice(&v.to_be_bytes());
    w
}

// ─────────────────────────────────────────────────────────────
// LEDGER TOKEN OPERATIONS
// ─────────────────────────────────────────────────────────────

impl Ledger {
    pub fn deploy_token(
        &mut self,
        address: Address,
        metadata: TokenMetadata,
        kind: TokenKind,
    ) -> DexResult<()> {
        if address.is_zero() {
            return Err(DexError::ZeroAddress);
        }
        if self.tokens.contains_key(&address) {
            return Err(DexError::AlreadyExists);
        }
        if let TokenKind::Deflating { burn_divisor: 0 } = kind {
            return Err(DexError::Arithmetic);
        }
        log::debug!("deploy token {} ({}) at {}", metadata.symbol, metadata.name, address);
        self.tokens.insert(address, TokenState::new(metadata, kind));
        Ok(())
    }

    pub fn is_deployed(&self, token: &Address) -> bool {
        self.tokens.contains_key(token)
    }

    pub fn token(&self, token: &Address) -> DexResult<&TokenState> {
        self.tokens.get(token).ok_or(DexError::NotDeployed)
    }

    fn token_mut(&mut self, token: &Address) -> DexResult<&mut TokenState> {
        self.tokens.get_mut(token).ok_or(DexError::NotDeployed)
    }

    pub fn token_kind(&self, token: &Address) -> DexResult<TokenKind> {
        Ok(self.token(token)?.kind)
    }

    // ── Read-only queries ──

    /// Zero for unknown tokens or holders.
    pub fn balance_of(&self, token: &Address, owner: &Address) -> u128 {
        self.tokens
            .get(token)
            .map(|t| t.balance_of(owner))
            .unwrap_or(0)
    }

    pub fn total_supply(&self, token: &Address) -> u128 {
        self.tokens.get(token).map(|t| t.total_supply).unwrap_or(0)
    }

    pub fn allowance(&self, token: &Address, owner: &Address, spender: &Address) -> u128 {
        self.tokens
            .get(token)
            .and_then(|t| t.allowances.get(&(*owner, *spender)).copied())
            .unwrap_or(0)
    }

    pub fn nonce(&self, token: &Address, owner: &Address) -> u128 {
        self.tokens
            .get(token)
            .and_then(|t| t.nonces.get(owner).copied())
            .unwrap_or(0)
    }

    // ── Supply ──

    pub fn mint(&mut self, token: &Address, to: &Address, amount: u128) -> DexResult<()> {
        let t = self.token_mut(token)?;
        t.total_supply = t.total_supply.safe_add(amount)?;
        t.credit(to, amount)?;
        self.emit(
            *token,
            DexEvent::Transfer {
                from: Address::ZERO,
                to: *to,
                amount,
            },
        );
        Ok(())
    }

    pub fn burn(&mut self, token: &Address, from: &Address, amount: u128) -> DexResult<()> {
        let t = self.token_mut(token)?;
        t.debit(from, amount)?;
        t.total_supply = t.total_supply.safe_sub(amount)?;
        self.emit(
            *token,
            DexEvent::Transfer {
                from: *from,
                to: Address::ZERO,
                amount,
            },
        );
        Ok(())
    }

    // ── Transfers ──

    pub fn approve(
        &mut self,
        token: &Address,
        owner: &Address,
        spender: &Address,
        amount: u128,
    ) -> DexResult<()> {
        let t = self.token_mut(token)?;
        t.allowances.insert((*owner, *spender), amount);
        self.emit(
            *token,
            DexEvent::Approval {
                owner: *owner,
                spender: *spender,
                amount,
            },
        );
        Ok(())
    }

    /// Move `amount` from `from`. A transfer-taxed token burns its cut from
    /// the moved amount, so `to` may receive less than `amount`.
    pub fn transfer(
        &mut self,
        token: &Address,
        from: &Address,
        to: &Address,
        amount: u128,
    ) -> DexResult<()> {
        let t = self.token_mut(token)?;
        let burned = match t.kind {
            TokenKind::Deflating { burn_divisor } => amount / burn_divisor,
            _ => 0,
        };
        t.debit(from, amount)?;
        if burned > 0 {
            t.total_supply = t.total_supply.safe_sub(burned)?;
        }
        let received = amount - burned;
        t.credit(to, received)?;

        if burned > 0 {
            self.emit(
                *token,
                DexEvent::Transfer {
                    from: *from,
                    to: Address::ZERO,
                    amount: burned,
                },
            );
        }
        self.emit(
            *token,
            DexEvent::Transfer {
                from: *from,
                to: *to,
                amount: received,
            },
        );
        Ok(())
    }

    pub fn transfer_from(
        &mut self,
        token: &Address,
        spender: &Address,
        from: &Address,
        to: &Address,
        amount: u128,
    ) -> DexResult<()> {
        self.spend_allowance(token, from, spender, amount)?;
        self.transfer(token, from, to, amount)
    }

    /// Consume `amount` of `owner`'s allowance to `spender`.
    pub fn spend_allowance(
        &mut self,
        token: &Address,
        owner: &Address,
        spender: &Address,
        amount: u128,
    ) -> DexResult<()> {
        let t = self.token_mut(token)?;
        let allowed = t.allowances.get(&(*owner, *spender)).copied().unwrap_or(0);
        if allowed != MAX_ALLOWANCE {
            if allowed < amount {
                return Err(DexError::InsufficientAllowance);
            }
            t.allowances.insert((*owner, *spender), allowed - amount);
        }
        Ok(())
    }

    // ── Permit ──

    pub fn domain_separator(&self, token: &Address) -> DexResult<[u8; 32]> {
        let t = self.token(token)?;
        let mut buf = Vec::with_capacity(160);
        buf.extend_from_slice(&domain_typehash());
        buf.extend_from_slice(&keccak256(t.metadata.name.as_bytes()));
        buf.extend_from_slice(&keccak256(PERMIT_VERSION.as_bytes()));
        buf.extend_from_slice(&word_u128(self.chain_id() as u128));
        buf.extend_from_slice(&word_address(token));
        Ok(keccak256(&buf))
    }

    pub fn permit_digest(
        &self,
        token: &Address,
        owner: &Address,
        spender: &Address,
        value: u128,
        nonce: u128,
        deadline: u64,
    ) -> DexResult<[u8; 32]> {
        let mut inner = Vec::with_capacity(192);
        inner.extend_from_slice(&permit_typehash());
        inner.extend_from_slice(&word_address(owner));
        inner.extend_from_slice(&word_address(spender));
        inner.extend_from_slice(&word_u128(value));
        inner.extend_from_slice(&word_u128(nonce));
        inner.extend_from_slice(&word_u128(deadline as u128));

        let mut outer = Vec::with_capacity(66);
        outer.extend_from_slice(&[0x19, 0x01]);
        outer.extend_from_slice(&self.domain_separator(token)?);
        outer.extend_from_slice(&keccak256(&inner));
        Ok(keccak256(&outer))
    }

    /// Sign a permit for the current nonce of the key's owner address.
    pub fn sign_permit(
        &self,
        keys: &KeyPair,
        token: &Address,
        spender: &Address,
        value: u128,
        deadline: u64,
    ) -> DexResult<PermitSignature> {
        let owner = Address::from(keys.address_bytes());
        let nonce = self.nonce(token, &owner);
        let digest = self.permit_digest(token, &owner, spender, value, nonce, deadline)?;
        let signature =
            sign_message(&digest, &keys.secret_key).map_err(|_| DexError::InvalidSignature)?;
        Ok(PermitSignature {
            public_key: keys.public_key.clone(),
            signature,
        })
    }

    /// Signed approval: sets `allowance(owner, spender) = value`.
    pub fn permit(
        &mut self,
        token: &Address,
        owner: &Address,
        spender: &Address,
        value: u128,
        deadline: u64,
        sig: &PermitSignature,
    ) -> DexResult<()> {
        if deadline < self.timestamp() {
            return Err(DexError::Expired);
        }
        if Address::from(public_key_to_address(&sig.public_key)) != *owner {
            return Err(DexError::InvalidSignature);
        }
        let nonce = self.nonce(token, owner);
        let digest = self.permit_digest(token, owner, spender, value, nonce, deadline)?;
        verify_signature(&digest, &sig.signature, &sig.public_key)
            .map_err(|_| DexError::InvalidSignature)?;

        let t = self.token_mut(token)?;
        t.nonces.insert(*owner, nonce.safe_add(1)?);
        self.approve(token, owner, spender, value)
    }
}

// ─────────────────────────────────────────────────────────────
// TESTS
// ─────────────────────────────────────────────────────────────
