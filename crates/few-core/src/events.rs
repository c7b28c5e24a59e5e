// SPDX-License-Identifier: AGPL-3.0-only
//! Observable events for indexers and tests.
//!
//! Amounts are serialized as decimal strings since JSON numbers cannot hold
//! 128-bit integers.

use crate::address::Address;
use serde::{Deserialize, Serialize};

// ─────────────────────────────────────────────────────────────
// u128 ↔ String serialization
// ─────────────────────────────────────────────────────────────

pub mod u128_str {
    use serde::{self, Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(val: &u128, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&val.to_string())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<u128, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse::<u128>().map_err(serde::de::Error::custom)
    }
}

// ─────────────────────────────────────────────────────────────
// EVENTS
// ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event")]
pub enum DexEvent {
    // ── Fungible tokens ──
    Transfer {
        from: Address,
        to: Address,
        #[serde(with = "u128_str")]
        amount: u128,
    },
    Approval {
        owner: Address,
        spender: Address,
        #[serde(with = "u128_str")]
        amount: u128,
    },

    // ── Native wrapper ──
    Deposit {
        dst: Address,
        #[serde(with = "u128_str")]
        amount: u128,
    },
    Withdrawal {
        src: Address,
        #[serde(with = "u128_str")]
        amount: u128,
    },

    // ── Wrapped tokens ──
    Wrap {
        sender: Address,
        #[serde(with = "u128_str")]
        amount: u128,
        to: Address,
    },
    Unwrap {
        sender: Address,
        #[serde(with = "u128_str")]
        amount: u128,
        to: Address,
    },
    WrappedTokenCreated {
        underlying: Address,
        wrapped_token: Address,
        count: u64,
    },

    // ── Pairs ──
    PairCreated {
        token0: Address,
        token1: Address,
        pair: Address,
        count: u64,
    },
    Mint {
        sender: Address,
        #[serde(with = "u128_str")]
        amount0: u128,
        #[serde(with = "u128_str")]
        amount1: u128,
    },
    Burn {
        sender: Address,
        #[serde(with = "u128_str")]
        amount0: u128,
        #[serde(with = "u128_str")]
        amount1: u128,
        to: Address,
    },
    Swap {
        sender: Address,
        #[serde(with = "u128_str")]
        amount0_in: u128,
        #[serde(with = "u128_str")]
        amount1_in: u128,
        #[serde(with = "u128_str")]
        amount0_out: u128,
        #[serde(with = "u128_str")]
        amount1_out: u128,
        to: Address,
    },
    Sync {
        #[serde(with = "u128_str")]
        reserve0: u128,
        #[serde(with = "u128_str")]
        reserve1: u128,
    },
}

/// An event together with the contract that emitted it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggedEvent {
    pub emitter: Address,
    pub timestamp: u64,
    #[serde(flatten)]
    pub event: DexEvent,
}
