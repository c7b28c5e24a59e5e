// ============================================================================
// E2E WRAPPED TOKEN & FACTORY TEST — FEW DEX
// ============================================================================
//
// End-to-end tests for the wrapped-token layer: the wrapper factory, the
// wrap / unwrap custody moves, ordinary token operations on wrapper units,
// signed permits, the native-value helper, event encoding and config files.
//
// Test Scenarios:
//   1.  Factory — deterministic address, metadata, counter, duplicates
//   2.  Factory — undeployed and metadata-less underlyings
//   3.  Wrap — custody, supply, Transfer + Wrap events
//   4.  Unwrap — burn, underlying release, Unwrap event
//   5.  Wrap of a transfer-taxed token — only the measured delta is minted
//   6.  Wrapper units — approve, transfer, transferFrom, max allowance
//   7.  Permit — typehash, nonce, replay and expiry
//   8.  ETH wrapper helper — native ⇄ fwWETH
//   9.  Event log JSON encoding
//   10. Config TOML loading and atomic rollback
//
// Run:
//   cargo test --release --test e2e_wrapped_token -- --test-threads=1 --nocapture
//
// ============================================================================

mod common;

use common::*;
use few_contracts::{wrapped_token, wrapper_factory, EthWrapper};
use few_core::{Address, DexConfig, DexError, DexEvent, E18, MAX_ALLOWANCE};
use few_vm::{permit_typehash, token_registry, TokenKind, TokenMetadata};

fn to_hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

/// Events emitted by `emitter` after `mark`.
fn events_of(world: &World, emitter: &Address, mark: usize) -> Vec<DexEvent> {
    world
        .state
        .ledger
        .events_since(mark)
        .iter()
        .filter(|e| e.emitter == *emitter)
        .map(|e| e.event.clone())
        .collect()
}

fn wrap(world: &mut World, token: &Address, amount: u128) -> (Address, u128) {
    let wrapper = world.state.get_or_create_wrapper(token).unwrap();
    let wallet = world.wallet;
    world
        .state
        .ledger
        .approve(token, &wallet, &wrapper, amount)
        .unwrap();
    let minted = wrapped_token::wrap(&mut world.state.ledger, &wrapper, &wallet, amount).unwrap();
    (wrapper, minted)
}

// ============================================================================
// TEST 1: FACTORY — DETERMINISTIC CREATION
// ============================================================================
// Verifies: the wrapper lands at the precomputed address, carries prefixed
// metadata, bumps the counter and cannot be created twice.

#[test]
fn test_01_factory_create_token() {
    println!("\n=== TEST 1: Wrapper Factory Creation ===\n");
    let mut world = World::new();
    let token = Address::from_seed("test-token");
    world
        .state
        .ledger
        .deploy_token(token, TokenMetadata::new("Test Token", "TT", 18), TokenKind::Standard)
        .unwrap();

    // fwWETH exists from router deployment
    let before = world.state.wrappers.all_wrapped_tokens_length();
    assert_eq!(before, 1);

    let expected = wrapper_factory::compute_wrapped_token_address(&world.state.wrappers.address, &token);
    let mark = world.state.ledger.event_count();
    let factory = world.state.wrappers.address;
    let DexStateParts { ledger, wrappers, config } = parts(&mut world);
    let wrapper = wrappers.create_token(ledger, config, &token).unwrap();
    assert_eq!(wrapper, expected);
    println!("  wrapper: {}", wrapper);

    assert_eq!(
        events_of(&world, &factory, mark),
        vec![DexEvent::WrappedTokenCreated {
            underlying: token,
            wrapped_token: wrapper,
            count: 2,
        }]
    );
    assert_eq!(world.state.wrappers.get_wrapped_token(&token), wrapper);
    assert_eq!(world.state.wrappers.all_wrapped_tokens(1), Some(wrapper));
    assert_eq!(world.state.wrappers.all_wrapped_tokens_length(), 2);

    let info = token_registry::query_token_info(&world.state.ledger, &wrapper).unwrap();
    assert_eq!(info.name, "Few Wrapped Test Token");
    assert_eq!(info.symbol, "fwTT");
    assert_eq!(info.decimals, 18);
    assert_eq!(info.total_supply, 0);
    assert_eq!(wrapped_token::underlying(&world.state.ledger, &wrapper).unwrap(), token);
    println!("  metadata: {} / {}", info.name, info.symbol);

    let DexStateParts { ledger, wrappers, config } = parts(&mut world);
    assert_eq!(
        wrappers.create_token(ledger, config, &token),
        Err(DexError::AlreadyExists)
    );
    assert_eq!(world.state.wrappers.all_wrapped_tokens_length(), 2);
    println!("  duplicate creation rejected: PASS\n");
}

/// Split borrows of the state for direct factory calls.
struct DexStateParts<'a> {
    ledger: &'a mut few_vm::Ledger,
    wrappers: &'a mut few_contracts::WrapperFactory,
    config: &'a few_core::config::WrapperConfig,
}

fn parts(world: &mut World) -> DexStateParts<'_> {
    let state = &mut world.state;
    DexStateParts {
        ledger: &mut state.ledger,
        wrappers: &mut state.wrappers,
        config: &state.config.wrapper,
    }
}

// ============================================================================
// TEST 2: FACTORY — UNDEPLOYED AND BLANK UNDERLYINGS
// ============================================================================
// Verifies: an address with no token fails with NotDeployed, while a token
// with empty metadata still gets a wrapper with bare prefixes.

#[test]
fn test_02_factory_edge_underlyings() {
    println!("\n=== TEST 2: Factory Edge Cases ===\n");
    let mut world = World::new();

    let ghost = Address::from_seed("never-deployed");
    assert_eq!(
        world.state.get_or_create_wrapper(&ghost),
        Err(DexError::NotDeployed)
    );
    assert!(world.state.wrappers.get_wrapped_token(&ghost).is_zero());
    println!("  undeployed underlying: NotDeployed");

    assert_eq!(
        world.state.get_or_create_wrapper(&Address::ZERO),
        Err(DexError::ZeroAddress)
    );

    let blank = Address::from_seed("blank-token");
    world
        .state
        .ledger
        .deploy_token(blank, TokenMetadata::new("", "", 0), TokenKind::Standard)
        .unwrap();
    let wrapper = world.state.get_or_create_wrapper(&blank).unwrap();
    let info = token_registry::query_token_info(&world.state.ledger, &wrapper).unwrap();
    assert_eq!(info.name, "Few Wrapped ");
    assert_eq!(info.symbol, "fw");
    assert_eq!(info.decimals, 0);
    println!("  blank metadata wrapper: '{}' / '{}'", info.name, info.symbol);
    println!("  factory edge cases: PASS\n");
}

// ============================================================================
// TEST 3: WRAP
// ============================================================================
// Verifies: wrapping moves the underlying into custody, mints the same
// number of wrapper units and logs Transfer(0 → wallet) then Wrap.

#[test]
fn test_03_wrap() {
    println!("\n=== TEST 3: Wrap ===\n");
    let mut world = World::new();
    let token = world.token("TT", TokenKind::Standard);
    let wrapper = world.state.get_or_create_wrapper(&token).unwrap();
    let wallet = world.wallet;
    let amount = 5 * E18;

    // a stray direct transfer is custody, not wrapper supply
    world
        .state
        .ledger
        .transfer(&token, &wallet, &wrapper, amount)
        .unwrap();
    world.state.ledger.approve(&token, &wallet, &wrapper, amount).unwrap();

    let mark = world.state.ledger.event_count();
    let minted = wrapped_token::wrap(&mut world.state.ledger, &wrapper, &wallet, amount).unwrap();
    assert_eq!(minted, amount);
    assert_eq!(
        events_of(&world, &wrapper, mark),
        vec![
            DexEvent::Transfer {
                from: Address::ZERO,
                to: wallet,
                amount,
            },
            DexEvent::Wrap {
                sender: wallet,
                amount,
                to: wallet,
            },
        ]
    );

    assert_eq!(world.state.ledger.total_supply(&wrapper), amount);
    assert_eq!(world.balance(&wrapper), amount);
    assert_eq!(world.balance(&token), SUPPLY - 2 * amount);
    assert_eq!(world.state.ledger.balance_of(&token, &wrapper), 2 * amount);
    assert_eq!(wrapped_token::custody(&world.state.ledger, &wrapper).unwrap(), 2 * amount);
    println!("  wrapped {} units, custody {}", minted, 2 * amount);

    // no allowance left
    assert_eq!(
        wrapped_token::wrap(&mut world.state.ledger, &wrapper, &wallet, 1),
        Err(DexError::InsufficientAllowance)
    );
    println!("  wrap: PASS\n");
}

// ============================================================================
// TEST 4: UNWRAP
// ============================================================================
// Verifies: unwrapping burns the caller's units, returns the underlying and
// logs the burn, the underlying transfer and Unwrap.

#[test]
fn test_04_unwrap() {
    println!("\n=== TEST 4: Unwrap ===\n");
    let mut world = World::new();
    let token = world.token("TT", TokenKind::Standard);
    let amount = 3 * E18;
    let (wrapper, _) = wrap(&mut world, &token, amount);
    let wallet = world.wallet;

    assert_eq!(world.balance(&wrapper), amount);
    assert_eq!(world.balance(&token), SUPPLY - amount);
    assert_eq!(world.state.ledger.balance_of(&wrapper, &wrapper), 0);
    assert_eq!(world.state.ledger.balance_of(&token, &wrapper), amount);

    let mark = world.state.ledger.event_count();
    wrapped_token::unwrap(&mut world.state.ledger, &wrapper, &wallet, amount).unwrap();
    assert_eq!(
        events_of(&world, &wrapper, mark),
        vec![
            DexEvent::Transfer {
                from: wallet,
                to: Address::ZERO,
                amount,
            },
            DexEvent::Unwrap {
                sender: wallet,
                amount,
                to: wallet,
            },
        ]
    );
    assert_eq!(
        events_of(&world, &token, mark),
        vec![DexEvent::Transfer {
            from: wrapper,
            to: wallet,
            amount,
        }]
    );

    assert_eq!(world.balance(&wrapper), 0);
    assert_eq!(world.state.ledger.total_supply(&wrapper), 0);
    assert_eq!(world.state.ledger.balance_of(&token, &wrapper), 0);
    assert_eq!(world.balance(&token), world.state.ledger.total_supply(&token));

    assert_eq!(
        wrapped_token::unwrap(&mut world.state.ledger, &wrapper, &wallet, 1),
        Err(DexError::InsufficientBalance)
    );
    println!("  unwrap: PASS\n");
}

// ============================================================================
// TEST 5: WRAP OF A TRANSFER-TAXED TOKEN
// ============================================================================
// Verifies: a 1% transfer tax reaches custody reduced and the wrapper mints
// only what arrived; unwrapping is taxed again on the way out.

#[test]
fn test_05_wrap_deflating() {
    println!("\n=== TEST 5: Wrap Deflating Token ===\n");
    let mut world = World::new();
    let dtt = world.token("DTT", TokenKind::Deflating { burn_divisor: 100 });
    let amount = 100 * E18;

    let (wrapper, minted) = wrap(&mut world, &dtt, amount);
    assert_eq!(minted, 99 * E18);
    assert_eq!(world.balance(&wrapper), 99 * E18);
    assert_eq!(world.state.ledger.balance_of(&dtt, &wrapper), 99 * E18);
    println!("  wrapped {} of {} requested", minted, amount);

    let wallet = world.wallet;
    let held = world.balance(&dtt);
    wrapped_token::unwrap(&mut world.state.ledger, &wrapper, &wallet, 99 * E18).unwrap();
    assert_eq!(world.balance(&dtt) - held, 99 * E18 - 99 * E18 / 100);
    assert_eq!(world.state.ledger.balance_of(&dtt, &wrapper), 0);
    assert_eq!(world.state.ledger.total_supply(&wrapper), 0);
    println!("  deflating wrap/unwrap: PASS\n");
}

// ============================================================================
// TEST 6: WRAPPER UNITS AS A TOKEN
// ============================================================================
// Verifies: approve / transfer / transferFrom on wrapper units, including the
// unlimited allowance that is never decremented.

#[test]
fn test_06_wrapper_token_operations() {
    println!("\n=== TEST 6: Wrapper Token Operations ===\n");
    let mut world = World::new();
    let token = world.token("TT", TokenKind::Standard);
    let test_amount = 10 * E18;
    let (wrapper, _) = wrap(&mut world, &token, 2 * test_amount);
    let wallet = world.wallet;
    let other = Address::from_seed("other");

    let mark = world.state.ledger.event_count();
    world.state.ledger.approve(&wrapper, &wallet, &other, test_amount).unwrap();
    assert_eq!(
        events_of(&world, &wrapper, mark),
        vec![DexEvent::Approval {
            owner: wallet,
            spender: other,
            amount: test_amount,
        }]
    );
    assert_eq!(world.state.ledger.allowance(&wrapper, &wallet, &other), test_amount);

    // transfer
    world.state.ledger.transfer(&wrapper, &wallet, &other, test_amount).unwrap();
    assert_eq!(world.balance(&wrapper), test_amount);
    assert_eq!(world.state.ledger.balance_of(&wrapper, &other), test_amount);
    assert_eq!(
        world.state.ledger.transfer(&wrapper, &wallet, &other, 2 * test_amount),
        Err(DexError::InsufficientBalance)
    );
    println!("  transfer: ok");

    // transferFrom consumes the allowance
    world
        .state
        .ledger
        .transfer_from(&wrapper, &other, &wallet, &other, test_amount)
        .unwrap();
    assert_eq!(world.state.ledger.allowance(&wrapper, &wallet, &other), 0);
    assert_eq!(world.balance(&wrapper), 0);
    assert_eq!(world.state.ledger.balance_of(&wrapper, &other), 2 * test_amount);
    println!("  transferFrom: ok");

    // max allowance stays max
    world.state.ledger.approve(&wrapper, &other, &wallet, MAX_ALLOWANCE).unwrap();
    world
        .state
        .ledger
        .transfer_from(&wrapper, &wallet, &other, &wallet, test_amount)
        .unwrap();
    assert_eq!(world.state.ledger.allowance(&wrapper, &other, &wallet), MAX_ALLOWANCE);
    assert_eq!(world.balance(&wrapper), test_amount);
    println!("  transferFrom with max allowance: PASS\n");
}

// ============================================================================
// TEST 7: PERMIT
// ============================================================================
// Verifies: the permit typehash, a signed approval bumping the nonce, and the
// rejection of replayed and expired permits.

#[test]
fn test_07_permit() {
    println!("\n=== TEST 7: Permit ===\n");
    assert_eq!(
        to_hex(&permit_typehash()),
        "6e71edae12b1b97f4d1f60370fef10105fa2faae0126114a169c64845d6126c9"
    );

    let mut world = World::new();
    let token = world.token("TT", TokenKind::Standard);
    let (wrapper, _) = wrap(&mut world, &token, E18);
    let wallet = world.wallet;
    let other = Address::from_seed("other");
    let value = 10 * E18;

    assert_eq!(world.state.ledger.nonce(&wrapper, &wallet), 0);
    let sig = world
        .state
        .ledger
        .sign_permit(&world.keys, &wrapper, &other, value, DEADLINE)
        .unwrap();
    world
        .state
        .ledger
        .permit(&wrapper, &wallet, &other, value, DEADLINE, &sig)
        .unwrap();
    assert_eq!(world.state.ledger.allowance(&wrapper, &wallet, &other), value);
    assert_eq!(world.state.ledger.nonce(&wrapper, &wallet), 1);
    println!("  permit accepted, nonce 1");

    // same signature against the bumped nonce
    assert_eq!(
        world
            .state
            .ledger
            .permit(&wrapper, &wallet, &other, value, DEADLINE, &sig),
        Err(DexError::InvalidSignature)
    );

    // signed for someone else
    let sig = world
        .state
        .ledger
        .sign_permit(&world.keys, &wrapper, &other, value, DEADLINE)
        .unwrap();
    assert_eq!(
        world
            .state
            .ledger
            .permit(&wrapper, &other, &other, value, DEADLINE, &sig),
        Err(DexError::InvalidSignature)
    );

    let stale = world.state.ledger.timestamp() - 1;
    let sig = world
        .state
        .ledger
        .sign_permit(&world.keys, &wrapper, &other, value, stale)
        .unwrap();
    assert_eq!(
        world
            .state
            .ledger
            .permit(&wrapper, &wallet, &other, value, stale, &sig),
        Err(DexError::Expired)
    );
    assert_eq!(world.state.ledger.nonce(&wrapper, &wallet), 1);
    println!("  replay / foreign owner / expiry rejected: PASS\n");
}

// ============================================================================
// TEST 8: ETH WRAPPER HELPER
// ============================================================================
// Verifies: native value becomes fwWETH in one call (shared with the router)
// and comes back as native value.

#[test]
fn test_08_eth_wrapper() {
    println!("\n=== TEST 8: ETH Wrapper Helper ===\n");
    let mut world = World::new();
    let helper = EthWrapper::deploy(&mut world.state).unwrap();
    assert_eq!(helper.fw_weth, world.router.fw_weth());
    let wallet = world.wallet;

    let minted = helper
        .wrap_eth_to_fw_weth(&mut world.state, &wallet, &wallet, 5 * E18)
        .unwrap();
    assert_eq!(minted, 5 * E18);
    assert_eq!(world.balance(&helper.fw_weth), 5 * E18);
    assert_eq!(world.native(), NATIVE - 5 * E18);
    println!("  wrapped 5 ETH into fwWETH");

    world
        .state
        .ledger
        .approve(&helper.fw_weth, &wallet, &helper.address, 2 * E18)
        .unwrap();
    let receiver = Address::from_seed("receiver");
    helper
        .unwrap_fw_weth_to_eth(&mut world.state, &wallet, 2 * E18, &receiver)
        .unwrap();
    assert_eq!(world.state.ledger.native_balance(&receiver), 2 * E18);
    assert_eq!(world.balance(&helper.fw_weth), 3 * E18);
    assert_eq!(world.state.ledger.native_balance(&helper.address), 0);

    // allowance exhausted; nothing moves
    assert_eq!(
        helper.unwrap_fw_weth_to_eth(&mut world.state, &wallet, E18, &receiver),
        Err(DexError::InsufficientAllowance)
    );
    assert_eq!(world.balance(&helper.fw_weth), 3 * E18);
    println!("  eth wrapper: PASS\n");
}

// ============================================================================
// TEST 9: EVENT LOG ENCODING
// ============================================================================
// Verifies: logged events serialize as flat JSON objects tagged by "event"
// with amounts as decimal strings.

#[test]
fn test_09_event_log_json() {
    println!("\n=== TEST 9: Event Log JSON ===\n");
    let mut world = World::new();
    let token = world.token("TT", TokenKind::Standard);
    let mark = world.state.ledger.event_count();
    let (wrapper, _) = wrap(&mut world, &token, 7 * E18);

    let logged = world
        .state
        .ledger
        .events_since(mark)
        .iter()
        .find(|e| matches!(e.event, DexEvent::Wrap { .. }))
        .cloned()
        .expect("wrap event");
    assert_eq!(logged.emitter, wrapper);

    let value = serde_json::to_value(&logged).unwrap();
    assert_eq!(value["event"], "Wrap");
    assert_eq!(value["amount"], (7 * E18).to_string());
    assert_eq!(value["timestamp"], world.state.ledger.timestamp());

    let back: few_core::LoggedEvent = serde_json::from_value(value.clone()).unwrap();
    assert_eq!(back, logged);
    println!("  {}", value);
    println!("  event encoding: PASS\n");
}

// ============================================================================
// TEST 10: CONFIG & ROLLBACK
// ============================================================================
// Verifies: a TOML config drives wrapper metadata, and a failed operation
// inside a transaction leaves no wrapper, balance or event behind.

#[test]
fn test_10_config_and_rollback() {
    println!("\n=== TEST 10: Config & Rollback ===\n");
    let config = DexConfig::from_toml_str(
        r#"
        chain_id = 31337

        [wrapper]
        name_prefix = "Wrapped "
        symbol_prefix = "w"
        "#,
    )
    .unwrap();
    assert_eq!(config.chain_id, 31337);
    assert!(DexConfig::from_toml_str("chain_id = 0").is_err());

    let mut world = World::with_config(config);
    let token = world.token("TT", TokenKind::Standard);
    let wrapper = world.state.get_or_create_wrapper(&token).unwrap();
    let info = token_registry::query_token_info(&world.state.ledger, &wrapper).unwrap();
    assert_eq!(info.name, "Wrapped TT");
    assert_eq!(info.symbol, "wTT");
    println!("  configured metadata: {} / {}", info.name, info.symbol);

    let other = world.token("OTHER", TokenKind::Standard);
    let wallet = world.wallet;
    let events = world.state.ledger.event_count();
    let wrappers = world.state.wrappers.all_wrapped_tokens_length();
    let result: Result<(), DexError> = world.state.transact(|s| {
        let w = s.get_or_create_wrapper(&other)?;
        s.ledger.approve(&other, &wallet, &w, E18)?;
        wrapped_token::wrap(&mut s.ledger, &w, &wallet, E18)?;
        Err(DexError::K)
    });
    assert_eq!(result, Err(DexError::K));
    assert!(world.wrapper(&other).is_zero());
    assert_eq!(world.state.wrappers.all_wrapped_tokens_length(), wrappers);
    assert_eq!(world.balance(&other), SUPPLY);
    assert_eq!(world.state.ledger.event_count(), events);
    println!("  failed transaction rolled back: PASS\n");
}
