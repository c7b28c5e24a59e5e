// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// FEW DEX - CRYPTOGRAPHY MODULE
//
// Signatures for off-ledger approvals (permits).
// - Ed25519 key generation (random and deterministic from a seed)
// - Message signing and verification
// - Account address derivation (last 20 bytes of Keccak-256(public key))
// - Keccak-256 hashing for typed-data digests
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

use ed25519_dalek::{Signature, Signer, SigningKey, Verifier, VerifyingKey};
use serde::{Deserialize, Serialize};
use sha3::{Digest, Keccak256};
use zeroize::Zeroize;

#[derive(Debug)]
pub enum CryptoError {
    InvalidKey,
    InvalidSignature,
    VerificationFailed,
}

impl std::fmt::Display for CryptoError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            CryptoError::InvalidKey => write!(f, "Invalid key format"),
            CryptoError::InvalidSignature => write!(f, "Invalid signature encoding"),
            CryptoError::VerificationFailed => write!(f, "Signature verification failed"),
        }
    }
}

impl std::error::Error for CryptoError {}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct KeyPair {
    pub public_key: Vec<u8>,
    pub secret_key: Vec<u8>,
}

/// Zeroize secret key from memory on drop.
impl Drop for KeyPair {
    fn drop(&mut self) {
        self.secret_key.zeroize();
    }
}

impl KeyPair {
    fn from_signing_key(sk: SigningKey) -> Self {
        KeyPair {
            public_key: sk.verifying_key().to_bytes().to_vec(),
            secret_key: sk.to_bytes().to_vec(),
        }
    }

    /// 20-byte account address controlled by this key.
    pub fn address_bytes(&self) -> [u8; 20] {
        public_key_to_address(&self.public_key)
    }
}

/// Generate a new random Ed25519 key pair
pub fn generate_keypair() -> KeyPair {
    let mut rng = rand::rngs::OsRng;
    KeyPair::from_signing_key(SigningKey::generate(&mut rng))
}

/// Generate a DETERMINISTIC key pair from arbitrary seed bytes.
///
/// Domain separation:
///   secret = Keccak-256("few-ed25519-keygen-v1" || seed)
///
/// Same seed ALWAYS produces the same keypair and address.
pub fn generate_keypair_from_seed(seed: &[u8]) -> KeyPair {
    let mut hasher = Keccak256::new();
    hasher.update(b"few-ed25519-keygen-v1");
    hasher.update(seed);
    let mut secret: [u8; 32] = hasher.finalize().into();
    let sk = SigningKey::from_bytes(&secret);
    secret.zeroize();
    KeyPair::from_signing_key(sk)
}

/// Sign a message with a raw 32-byte secret key
pub fn sign_message(message: &[u8], secret_key_bytes: &[u8]) -> Result<Vec<u8>, CryptoError> {
    let secret: [u8; 32] = secret_key_bytes
        .try_into()
        .map_err(|_| CryptoError::InvalidKey)?;
    let sk = SigningKey::from_bytes(&secret);
    Ok(sk.sign(message).to_bytes().to_vec())
}

/// Verify an Ed25519 signature.
pub fn verify_signature(
    message: &[u8],
    signature_bytes: &[u8],
    public_key_bytes: &[u8],
) -> Result<(), CryptoError> {
    let pk_array: [u8; 32] = public_key_bytes
        .try_into()
        .map_err(|_| CryptoError::InvalidKey)?;
    let vk = VerifyingKey::from_bytes(&pk_array).map_err(|_| CryptoError::InvalidKey)?;
    let sig = Signature::from_slice(signature_bytes).map_err(|_| CryptoError::InvalidSignature)?;
    vk.verify(message, &sig)
        .map_err(|_| CryptoError::VerificationFailed)
}

/// Keccak-256 digest.
pub fn keccak256(data: &[u8]) -> [u8; 32] {
    Keccak256::digest(data).into()
}

/// Address = last 20 bytes of Keccak-256(public key).
pub fn public_key_to_address(public_key_bytes: &[u8]) -> [u8; 20] {
    let hash = keccak256(public_key_bytes);
    let mut out = [0u8; 20];
    out.copy_from_slice(&hash[12..]);
    out
}
