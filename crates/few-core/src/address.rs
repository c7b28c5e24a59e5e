// SPDX-License-Identifier: AGPL-3.0-only
//! # Addresses & Deterministic Identity Derivation
//!
//! Every account, token, pair, factory and router is identified by a 20-byte
//! [`Address`]. Contract addresses are never allocated sequentially: they are
//! content-addressed from `(deployer, input, template_hash)` so that a
//! wrapper or pair address can be computed off-ledger before it exists.
//!
//! ```text
//! derive_id(registry, input, template)
//!   = blake3( 0xff ‖ registry ‖ blake3(input) ‖ template )[12..32]
//! ```

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Length of an address in bytes.
pub const ADDRESS_LEN: usize = 20;

/// 20-byte account / contract identity.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Address(pub [u8; ADDRESS_LEN]);

impl Address {
    /// Burn sentinel and "absent" registry result.
    pub const ZERO: Address = Address([0u8; ADDRESS_LEN]);

    pub fn is_zero(&self) -> bool {
        *self == Self::ZERO
    }

    pub fn as_bytes(&self) -> &[u8; ADDRESS_LEN] {
        &self.0
    }

    /// Deterministic externally-owned account address from a human label.
    /// Used for fixtures and tooling; contract addresses come from [`derive_id`].
    pub fn from_seed(seed: &str) -> Self {
        let hash = blake3::hash(format!("few:account:{}", seed).as_bytes());
        Self::from_hash_tail(hash.as_bytes())
    }

    /// Take the trailing 20 bytes of a 32-byte digest.
    pub fn from_hash_tail(hash: &[u8; 32]) -> Self {
        let mut out = [0u8; ADDRESS_LEN];
        out.copy_from_slice(&hash[32 - ADDRESS_LEN..]);
        Address(out)
    }

    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.0))
    }

    pub fn from_hex(s: &str) -> Result<Self, String> {
        let stripped = s.strip_prefix("0x").unwrap_or(s);
        let bytes = hex::decode(stripped).map_err(|e| format!("invalid address hex: {}", e))?;
        if bytes.len() != ADDRESS_LEN {
            return Err(format!(
                "invalid address length: expected {} bytes, got {}",
                ADDRESS_LEN,
                bytes.len()
            ));
        }
        let mut out = [0u8; ADDRESS_LEN];
        out.copy_from_slice(&bytes);
        Ok(Address(out))
    }
}

impl From<[u8; ADDRESS_LEN]> for Address {
    fn from(bytes: [u8; ADDRESS_LEN]) -> Self {
        Address(bytes)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Address({})", self.to_hex())
    }
}

impl FromStr for Address {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Address::from_hex(s)
    }
}

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Address::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

// ─────────────────────────────────────────────────────────────
// DETERMINISTIC DERIVATION
// ─────────────────────────────────────────────────────────────

/// Hash identifying a contract template ("bytecode hash").
pub fn template_hash(template_name: &str) -> [u8; 32] {
    *blake3::hash(format!("few:template:{}", template_name).as_bytes()).as_bytes()
}

/// Content-addressed identity of a contract instance.
///
/// Pure: depends only on its arguments, never on ledger state.
pub fn derive_id(registry: &Address, input: &[u8], template_hash: &[u8; 32]) -> Address {
    let salt = blake3::hash(input);
    let mut hasher = blake3::Hasher::new();
    hasher.update(&[0xff]);
    hasher.update(registry.as_bytes());
    hasher.update(salt.as_bytes());
    hasher.update(template_hash);
    Address::from_hash_tail(hasher.finalize().as_bytes())
}

// ─────────────────────────────────────────────────────────────
// TESTS
// ─────────────────────────────────────────────────────────────
