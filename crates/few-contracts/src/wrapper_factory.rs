// SPDX-License-Identifier: AGPL-3.0-only
//! # Wrapper Factory
//!
//! Registry mapping each underlying token to its single wrapper. Wrapper
//! addresses are content-addressed, so they can be computed before creation:
//!
//! ```text
//! wrapper = derive_id(factory, underlying, template_hash("FewWrappedToken"))
//! ```
//!
//! `create_token` is single-use per underlying (`AlreadyExists` on repeat);
//! `get_wrapped_token` never fails and returns `Address::ZERO` when absent.

use few_core::config::WrapperConfig;
use few_core::{
    derive_id, template_hash, Address, DexError, DexEvent, DexResult, WRAPPED_TOKEN_TEMPLATE,
};
use few_vm::{token_registry, Ledger, TokenKind, TokenMetadata};
use std::collections::BTreeMap;

#[derive(Debug, Clone)]
pub struct WrapperFactory {
    pub address: Address,
    pub owner: Address,
    wrapped: BTreeMap<Address, Address>,
    all: Vec<Address>,
}

/// Wrapper address for `underlying` under `factory` (pure).
pub fn compute_wrapped_token_address(factory: &Address, underlying: &Address) -> Address {
    derive_id(
        factory,
        underlying.as_bytes(),
        &template_hash(WRAPPED_TOKEN_TEMPLATE),
    )
}

impl WrapperFactory {
    pub fn new(address: Address, owner: Address) -> Self {
        WrapperFactory {
            address,
            owner,
            wrapped: BTreeMap::new(),
            all: Vec::new(),
        }
    }

    pub fn compute_address(&self, underlying: &Address) -> Address {
        compute_wrapped_token_address(&self.address, underlying)
    }

    /// Registered wrapper, or `Address::ZERO`.
    pub fn get_wrapped_token(&self, underlying: &Address) -> Address {
        self.wrapped.get(underlying).copied().unwrap_or(Address::ZERO)
    }

    pub fn all_wrapped_tokens(&self, index: usize) -> Option<Address> {
        self.all.get(index).copied()
    }

    pub fn all_wrapped_tokens_length(&self) -> usize {
        self.all.len()
    }

    /// Deploy the wrapper for `underlying`.
    pub fn create_token(
        &mut self,
        ledger: &mut Ledger,
        config: &WrapperConfig,
        underlying: &Address,
    ) -> DexResult<Address> {
        if underlying.is_zero() {
            return Err(DexError::ZeroAddress);
        }
        if self.wrapped.contains_key(underlying) {
            return Err(DexError::AlreadyExists);
        }
        let info = token_registry::query_token_info(ledger, underlying)?;

        let wrapper = self.compute_address(underlying);
        ledger.deploy_token(
            wrapper,
            TokenMetadata {
                name: format!("{}{}", config.name_prefix, info.name),
                symbol: format!("{}{}", config.symbol_prefix, info.symbol),
                decimals: info.decimals,
            },
            TokenKind::Wrapped {
                underlying: *underlying,
            },
        )?;

        self.wrapped.insert(*underlying, wrapper);
        self.all.push(wrapper);
        let count = self.all.len() as u64;
        ledger.emit(
            self.address,
            DexEvent::WrappedTokenCreated {
                underlying: *underlying,
                wrapped_token: wrapper,
                count,
            },
        );
        log::info!("wrapped token #{} for {} created at {}", count, underlying, wrapper);
        Ok(wrapper)
    }

    pub fn get_or_create(
        &mut self,
        ledger: &mut Ledger,
        config: &WrapperConfig,
        underlying: &Address,
    ) -> DexResult<Address> {
        match self.wrapped.get(underlying) {
            Some(wrapper) => Ok(*wrapper),
            None => self.create_token(ledger, config, underlying),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup() -> (Ledger, WrapperFactory, WrapperConfig, Address) {
        let mut ledger = Ledger::new(1);
        let token = Address::from_seed("token-a");
        ledger
            .deploy_token(token, TokenMetadata::new("Test Token", "TT", 18), TokenKind::Standard)
            .unwrap();
        let factory = WrapperFactory::new(Address::from_seed("few-factory"), Address::from_seed("owner"));
        (ledger, factory, WrapperConfig::default(), token)
    }

    #[test]
    fn test_create_token() {
        let (mut ledger, mut factory, config, token) = setup();
        let expected = factory.compute_address(&token);
        let mark = ledger.event_count();

        let wrapper = factory.create_token(&mut ledger, &config, &token).unwrap();
        assert_eq!(wrapper, expected);
        assert_eq!(factory.get_wrapped_token(&token), wrapper);
        assert_eq!(factory.all_wrapped_tokens(0), Some(wrapper));
        assert_eq!(factory.all_wrapped_tokens_length(), 1);
        assert_eq!(
            ledger.events_since(mark).last().map(|e| e.event.clone()),
            Some(DexEvent::WrappedTokenCreated {
                underlying: token,
                wrapped_token: wrapper,
                count: 1
            })
        );

        let info = token_registry::query_token_info(&ledger, &wrapper).unwrap();
        assert_eq!(info.name, "Few Wrapped Test Token");
        assert_eq!(info.symbol, "fwTT");
        assert_eq!(info.decimals, 18);
    }

    #[test]
    fn test_create_token_twice_fails() {
        let (mut ledger, mut factory, config, token) = setup();
        factory.create_token(&mut ledger, &config, &token).unwrap();
        assert_eq!(
            factory.create_token(&mut ledger, &config, &token),
            Err(DexError::AlreadyExists)
        );
        // lookups still resolve
        assert!(!factory.get_wrapped_token(&token).is_zero());
        assert_eq!(
            factory.get_or_create(&mut ledger, &config, &token).unwrap(),
            factory.get_wrapped_token(&token)
        );
        assert_eq!(factory.all_wrapped_tokens_length(), 1);
    }

    #[test]
    fn test_create_token_not_deployed() {
        let (mut ledger, mut factory, config, _) = setup();
        assert_eq!(
            factory.create_token(&mut ledger, &config, &Address::from_seed("ghost")),
            Err(DexError::NotDeployed)
        );
        assert_eq!(factory.all_wrapped_tokens_length(), 0);
    }

    #[test]
    fn test_create_token_empty_metadata() {
        let (mut ledger, mut factory, config, _) = setup();
        let blank = Address::from_seed("blank");
        ledger
            .deploy_token(blank, TokenMetadata::new("", "", 0), TokenKind::Standard)
            .unwrap();
        let wrapper = factory.create_token(&mut ledger, &config, &blank).unwrap();
        let info = token_registry::query_token_info(&ledger, &wrapper).unwrap();
        assert_eq!(info.name, "Few Wrapped ");
        assert_eq!(info.symbol, "fw");
    }

    #[test]
    fn test_lookup_absent_is_zero() {
        let (_, factory, _, token) = setup();
        assert!(factory.get_wrapped_token(&token).is_zero());
        assert_eq!(factory.all_wrapped_tokens(0), None);
    }

    #[test]
    fn test_counter_increments() {
        let (mut ledger, mut factory, config, token) = setup();
        let second = Address::from_seed("token-b");
        ledger
            .deploy_token(second, TokenMetadata::new("Second", "SND", 6), TokenKind::Standard)
            .unwrap();
        factory.create_token(&mut ledger, &config, &token).unwrap();
        factory.get_or_create(&mut ledger, &config, &second).unwrap();
        assert_eq!(factory.all_wrapped_tokens_length(), 2);
        assert_eq!(
            ledger.events().last().map(|e| e.event.clone()),
            Some(DexEvent::WrappedTokenCreated {
                underlying: second,
                wrapped_token: factory.compute_address(&second),
                count: 2
            })
        );
    }
}
