// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// FEW DEX - LEDGER EXECUTION ENVIRONMENT
//
// The single-threaded, deterministic "chain" every contract runs against.
// - Fungible token table (balances, allowances, permits, transfer taxes)
// - Native-asset balances and the native wrapper (deposit / withdraw)
// - Ledger clock used for deadlines and price accumulators
// - Append-only event log
// - All-or-nothing transactions (snapshot / rollback)
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

pub mod erc20;
pub mod native;
pub mod token_registry;

pub use erc20::{permit_typehash, PermitSignature, TokenKind, TokenMetadata, TokenState};

use few_core::{Address, DexError, DexEvent, DexResult, LoggedEvent, SafeMath};
use std::collections::BTreeMap;

/// Default ledger start time (seconds).
pub const GENESIS_TIMESTAMP: u64 = 1_700_000_000;

#[derive(Debug, Clone)]
pub struct Ledger {
    chain_id: u64,
    timestamp: u64,
    pub(crate) tokens: BTreeMap<Address, TokenState>,
    native: BTreeMap<Address, u128>,
    events: Vec<LoggedEvent>,
}

impl Ledger {
    pub fn new(chain_id: u64) -> Self {
        Ledger {
            chain_id,
            timestamp: GENESIS_TIMESTAMP,
            tokens: BTreeMap::new(),
            native: BTreeMap::new(),
            events: Vec::new(),
        }
    }

    pub fn chain_id(&self) -> u64 {
        self.chain_id
    }

    // ── Clock ──

    pub fn timestamp(&self) -> u64 {
        self.timestamp
    }

    pub fn set_timestamp(&mut self, timestamp: u64) {
        self.timestamp = timestamp;
    }

    pub fn advance_time(&mut self, seconds: u64) {
        self.timestamp = self.timestamp.saturating_add(seconds);
    }

    // ── Events ──

    pub fn emit(&mut self, emitter: Address, event: DexEvent) {
        self.events.push(LoggedEvent {
            emitter,
            timestamp: self.timestamp,
            event,
        });
    }

    pub fn events(&self) -> &[LoggedEvent] {
        &self.events
    }

    /// Events logged after the given `event_count()` mark.
    pub fn events_since(&self, mark: usize) -> &[LoggedEvent] {
        &self.events[mark.min(self.events.len())..]
    }

    pub fn event_count(&self) -> usize {
        self.events.len()
    }

    // ── Native asset ──

    pub fn native_balance(&self, owner: &Address) -> u128 {
        self.native.get(owner).copied().unwrap_or(0)
    }

    /// Credit native balance out of thin air (genesis allocation / test faucet).
    pub fn fund_native(&mut self, owner: &Address, amount: u128) -> DexResult<()> {
        let bal = self.native_balance(owner).safe_add(amount)?;
        self.native.insert(*owner, bal);
        Ok(())
    }

    pub fn send_native(&mut self, from: &Address, to: &Address, amount: u128) -> DexResult<()> {
        let from_bal = self.native_balance(from);
        if from_bal < amount {
            return Err(DexError::InsufficientBalance);
        }
        self.native.insert(*from, from_bal - amount);
        let to_bal = self.native_balance(to).safe_add(amount)?;
        self.native.insert(*to, to_bal);
        Ok(())
    }

    // ── Transactions ──

    /// Capture the mutable ledger state. The event log is append-only, so
    /// only its length is recorded.
    pub fn checkpoint(&self) -> Checkpoint {
        Checkpoint {
            timestamp: self.timestamp,
            tokens: self.tokens.clone(),
            native: self.native.clone(),
            event_mark: self.events.len(),
        }
    }

    /// Return to `checkpoint`, dropping every event logged since.
    pub fn restore(&mut self, checkpoint: Checkpoint) {
        self.timestamp = checkpoint.timestamp;
        self.tokens = checkpoint.tokens;
        self.native = checkpoint.native;
        self.events.truncate(checkpoint.event_mark);
    }

    /// Run `op` atomically: on error every mutation (balances, events,
    /// clock) is rolled back to the state before the call.
    pub fn transact<T, F>(&mut self, op: F) -> DexResult<T>
    where
        F: FnOnce(&mut Ledger) -> DexResult<T>,
    {
        let checkpoint = self.checkpoint();
        match op(self) {
            Ok(value) => Ok(value),
            Err(e) => {
                log::warn!("ledger transaction reverted: {}", e);
                self.restore(checkpoint);
                Err(e)
            }
        }
    }
}

/// Ledger state saved by [`Ledger::checkpoint`].
#[derive(Debug, Clone)]
pub struct Checkpoint {
    timestamp: u64,
    tokens: BTreeMap<Address, TokenState>,
    native: BTreeMap<Address, u128>,
    event_mark: usize,
}

impl Checkpoint {
    /// Event count at the time of the checkpoint.
    pub fn event_mark(&self) -> usize {
        self.event_mark
    }
}
