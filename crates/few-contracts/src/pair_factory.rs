//! Pair factory: one constant-product pair per unordered token pair, plus
//! the permission list consulted when pair callers are restricted.

use crate::library::{pair_for, sort_tokens};
use crate::pair::Pair;
use few_core::{Address, DexError, DexEvent, DexResult};
use few_vm::{Ledger, TokenKind, TokenMetadata};
use std::collections::{BTreeMap, BTreeSet};

/// Liquidity share token metadata.
pub const SHARE_NAME: &str = "Few V1 LP";
pub const SHARE_SYMBOL: &str = "FEW-V1-LP";
pub const SHARE_DECIMALS: u8 = 18;

#[derive(Debug, Clone)]
pub struct PairFactory {
    pub address: Address,
    pub owner: Address,
    /// Pair table keyed by pair address
    pairs: BTreeMap<Address, Pair>,
    /// (token0, token1) → pair address
    index: BTreeMap<(Address, Address), Address>,
    all: Vec<Address>,
    permitted: BTreeSet<Address>,
}

impl PairFactory {
    pub fn new(address: Address, owner: Address) -> Self {
        PairFactory {
            address,
            owner,
            pairs: BTreeMap::new(),
            index: BTreeMap::new(),
            all: Vec::new(),
            permitted: BTreeSet::new(),
        }
    }

    pub fn create_pair(
        &mut self,
        ledger: &mut Ledger,
        token_a: &Address,
        token_b: &Address,
    ) -> DexResult<Address> {
        let (token0, token1) = sort_tokens(token_a, token_b)?;
        if self.index.contains_key(&(token0, token1)) {
            return Err(DexError::AlreadyExists);
        }
        let pair_addr = pair_for(&self.address, &token0, &token1)?;
        ledger.deploy_token(
            pair_addr,
            TokenMetadata::new(SHARE_NAME, SHARE_SYMBOL, SHARE_DECIMALS),
            TokenKind::PoolShare,
        )?;

        self.pairs
            .insert(pair_addr, Pair::new(pair_addr, self.address, token0, token1));
        self.index.insert((token0, token1), pair_addr);
        self.all.push(pair_addr);
        let count = self.all.len() as u64;
        ledger.emit(
            self.address,
            DexEvent::PairCreated {
                token0,
                token1,
                pair: pair_addr,
                count,
            },
        );
        log::info!("pair #{} {}/{} created at {}", count, token0, token1, pair_addr);
        Ok(pair_addr)
    }

    /// Pair for the two tokens in either order, or `Address::ZERO`.
    pub fn get_pair(&self, token_a: &Address, token_b: &Address) -> Address {
        match sort_tokens(token_a, token_b) {
            Ok(key) => self.index.get(&key).copied().unwrap_or(Address::ZERO),
            Err(_) => Address::ZERO,
        }
    }

    pub fn pair(&self, pair: &Address) -> DexResult<&Pair> {
        self.pairs.get(pair).ok_or(DexError::PairNotFound)
    }

    pub(crate) fn pair_mut(&mut self, pair: &Address) -> DexResult<&mut Pair> {
        self.pairs.get_mut(pair).ok_or(DexError::PairNotFound)
    }

    pub fn all_pairs(&self, index: usize) -> Option<Address> {
        self.all.get(index).copied()
    }

    pub fn all_pairs_length(&self) -> usize {
        self.all.len()
    }

    // ── Permissions ──

    pub fn set_permitted_contract(
        &mut self,
        caller: &Address,
        contract: &Address,
        permitted: bool,
    ) -> DexResult<()> {
        if *caller != self.owner {
            return Err(DexError::Forbidden);
        }
        if permitted {
            self.permitted.insert(*contract);
        } else {
            self.permitted.remove(contract);
        }
        Ok(())
    }

    pub fn is_permitted(&self, contract: &Address) -> bool {
        self.permitted.contains(contract)
    }
}
