//! # Few DEX Contracts
//!
//! In-process contracts of the wrapped-token DEX, all operating on one
//! explicit [`DexState`] store.
//!
//! ## Contracts
//!
//! | Contract          | Module              | Description                                          |
//! |-------------------|---------------------|------------------------------------------------------|
//! | Wrapped Token     | `wrapped_token`     | 1:1 (fee-adjusted) wrapper over any underlying token |
//! | Wrapper Factory   | `wrapper_factory`   | Deterministic underlying → wrapper registry          |
//! | Pair              | `pair`              | Constant product AMM (x·y=k) pool                    |
//! | Pair Factory      | `pair_factory`      | One pair per unordered token pair                    |
//! | Router            | `router`            | Liquidity & multi-hop swaps over wrapped tokens      |
//! | ETH Wrapper       | `eth_wrapper`       | Native value ⇄ wrapped-WETH in one call              |
//!
//! ## Architecture
//!
//! ```text
//!  user ──► Router ──► WrapperFactory (lazy wrapper creation)
//!              │
//!              ├──► WrappedToken.wrap_to(pair) ──► Pair.mint / Pair.swap
//!              └──◄ WrappedToken.unwrap_to(user) ◄── Pair.burn / Pair.swap
//! ```
//!
//! Every public operation is atomic: it runs inside [`DexState::transact`]
//! and leaves no trace when it fails.

pub mod eth_wrapper;
pub mod library;
pub mod pair;
pub mod pair_factory;
pub mod router;
pub mod wrapped_token;
pub mod wrapper_factory;

pub use eth_wrapper::EthWrapper;
pub use pair::Pair;
pub use pair_factory::PairFactory;
pub use router::{Router, RouterConfig};
pub use wrapper_factory::WrapperFactory;

use few_core::{derive_id, template_hash, Address, DexConfig, DexResult, SwapFee};
use few_vm::{Ledger, TokenKind, TokenMetadata};

/// The whole engine: ledger plus the contract tables that live on it.
#[derive(Debug, Clone)]
pub struct DexState {
    pub ledger: Ledger,
    pub config: DexConfig,
    pub wrappers: WrapperFactory,
    pub pairs: PairFactory,
    /// Native-asset wrapper token
    pub weth: Address,
}

impl DexState {
    /// Bootstrap the ledger, deploy the native wrapper and both factories.
    pub fn new(config: DexConfig, owner: Address) -> Result<Self, String> {
        config.validate()?;
        let mut ledger = Ledger::new(config.chain_id);

        let weth = derive_id(&owner, b"WETH9", &template_hash("WETH9"));
        ledger
            .deploy_token(
                weth,
                TokenMetadata::new("Wrapped Ether", "WETH", 18),
                TokenKind::NativeWrapper,
            )
            .map_err(|e| format!("failed to deploy native wrapper: {}", e))?;

        let wrappers = WrapperFactory::new(
            derive_id(&owner, b"FewFactory", &template_hash("FewFactory")),
            owner,
        );
        let pairs = PairFactory::new(
            derive_id(&owner, b"FewV1Factory", &template_hash("FewV1Factory")),
            owner,
        );
        log::info!(
            "dex state ready: chain {} wrapper factory {} pair factory {} weth {}",
            config.chain_id,
            wrappers.address,
            pairs.address,
            weth
        );

        Ok(DexState {
            ledger,
            config,
            wrappers,
            pairs,
            weth,
        })
    }

    pub fn swap_fee(&self) -> SwapFee {
        self.config.swap_fee()
    }

    /// Run `op` atomically over the whole store. The ledger's event log is
    /// rolled back by truncation, never copied.
    pub fn transact<T, F>(&mut self, op: F) -> DexResult<T>
    where
        F: FnOnce(&mut DexState) -> DexResult<T>,
    {
        let ledger = self.ledger.checkpoint();
        let tables = (self.config.clone(), self.wrappers.clone(), self.pairs.clone());
        match op(self) {
            Ok(value) => Ok(value),
            Err(e) => {
                log::warn!("transaction reverted: {}", e);
                self.ledger.restore(ledger);
                (self.config, self.wrappers, self.pairs) = tables;
                Err(e)
            }
        }
    }

    /// Wrapper for `underlying`, created on first use.
    pub fn get_or_create_wrapper(&mut self, underlying: &Address) -> DexResult<Address> {
        let DexState {
            ledger,
            config,
            wrappers,
            ..
        } = self;
        wrappers.get_or_create(ledger, &config.wrapper, underlying)
    }

    pub fn create_pair(&mut self, token_a: &Address, token_b: &Address) -> DexResult<Address> {
        let DexState { ledger, pairs, .. } = self;
        pairs.create_pair(ledger, token_a, token_b)
    }
}
