// ============================================================================
// SHARED FIXTURES — FEW DEX INTEGRATION TESTS
// ============================================================================
#![allow(dead_code)]

use few_contracts::{DexState, Router, RouterConfig};
use few_core::{Address, DexConfig, E18};
use few_crypto::{generate_keypair_from_seed, KeyPair};
use few_vm::{TokenKind, TokenMetadata};

pub const SUPPLY: u128 = 10_000 * E18;
pub const NATIVE: u128 = 1_000 * E18;
pub const DEADLINE: u64 = u64::MAX;

pub struct World {
    pub state: DexState,
    pub router: Router,
    pub fot_router: Router,
    pub wallet: Address,
    /// Signing keys behind `wallet`, for permits
    pub keys: KeyPair,
}

impl World {
    pub fn new() -> Self {
        Self::with_config(DexConfig::default())
    }

    pub fn with_config(config: DexConfig) -> Self {
        let owner = Address::from_seed("owner");
        let keys = generate_keypair_from_seed(b"few-e2e-wallet");
        let wallet = Address::from(keys.address_bytes());
        let mut state = DexState::new(config, owner).expect("valid config");
        state.ledger.fund_native(&wallet, NATIVE).unwrap();
        let router = Router::deploy(&mut state, "router", RouterConfig::default()).unwrap();
        let fot_router = Router::deploy(
            &mut state,
            "router-fee-on-transfer",
            RouterConfig {
                fee_on_transfer_aware: true,
                restrict_accounts: false,
            },
        )
        .unwrap();
        let weth = state.weth;
        let mut world = World {
            state,
            router,
            fot_router,
            wallet,
            keys,
        };
        world.approve_routers(&weth);
        world
    }

    /// Deploy a token, mint the full supply to the wallet and approve both routers.
    pub fn token(&mut self, symbol: &str, kind: TokenKind) -> Address {
        let token = Address::from_seed(symbol);
        self.state
            .ledger
            .deploy_token(token, TokenMetadata::new(symbol, symbol, 18), kind)
            .unwrap();
        self.state.ledger.mint(&token, &self.wallet, SUPPLY).unwrap();
        self.approve_routers(&token);
        token
    }

    pub fn approve_routers(&mut self, token: &Address) {
        for spender in [self.router.address, self.fot_router.address] {
            self.state
                .ledger
                .approve(token, &self.wallet, &spender, u128::MAX)
                .unwrap();
        }
    }

    pub fn balance(&self, token: &Address) -> u128 {
        self.state.ledger.balance_of(token, &self.wallet)
    }

    pub fn native(&self) -> u128 {
        self.state.ledger.native_balance(&self.wallet)
    }

    pub fn wrapper(&self, token: &Address) -> Address {
        self.state.wrappers.get_wrapped_token(token)
    }

    pub fn pair(&self, a: &Address, b: &Address) -> Address {
        self.state.pairs.get_pair(&self.wrapper(a), &self.wrapper(b))
    }

    pub fn routers_hold_no_native(&self) -> bool {
        self.state.ledger.native_balance(&self.router.address) == 0
            && self.state.ledger.native_balance(&self.fot_router.address) == 0
    }
}
