//! Wallet management for the riddle client
//!
//! Handles mnemonic generation, import/export, and data item signing.
//!
//! AO accepts data items signed with an Ethereum-style secp256k1 key, so the
//! wallet derives one from a BIP-39 mnemonic and signs with EIP-191
//! `personal_sign`.

use bip32::secp256k1::ecdsa::SigningKey;
use bip32::{DerivationPath, XPrv};
use bip39::{Language, Mnemonic};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tiny_keccak::{Hasher, Keccak};

/// Default derivation path for Ethereum-compatible keys
const DERIVATION_PATH: &str = "m/44'/60'/0'/0/0";

/// Prefix for EIP-191 signed messages
const PERSONAL_MESSAGE_PREFIX: &str = "\x19Ethereum Signed Message:\n";

#[derive(Error, Debug)]
pub enum WalletError {
    #[error("Failed to generate mnemonic: {0}")]
    MnemonicGeneration(String),

    #[error("Invalid mnemonic phrase: {0}")]
    InvalidMnemonic(String),

    #[error("Derivation error: {0}")]
    Derivation(String),

    #[error("Signing failed: {0}")]
    Signing(String),

    #[error("File I/O error: {0}")]
    FileError(#[from] std::io::Error),
}

/// ANS-104 signature schemes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u16)]
pub enum SignatureType {
    Arweave = 1,
    Ed25519 = 2,
    Ethereum = 3,
    Solana = 4,
}

impl SignatureType {
    /// Wire value written at the start of a data item
    pub fn code(self) -> u16 {
        self as u16
    }

    /// Signature length in bytes
    pub fn signature_len(self) -> usize {
        match self {
            SignatureType::Arweave => 512,
            SignatureType::Ed25519 => 64,
            SignatureType::Ethereum => 65,
            SignatureType::Solana => 64,
        }
    }

    /// Owner (public key) length in bytes
    pub fn owner_len(self) -> usize {
        match self {
            SignatureType::Arweave => 512,
            SignatureType::Ed25519 => 32,
            SignatureType::Ethereum => 65,
            SignatureType::Solana => 32,
        }
    }
}

/// Signing capability handed to operations that write to a process
///
/// Commitment hashing never needs one; only message submission does.
pub trait Signer: Send + Sync {
    /// Scheme used by [`Signer::sign`]
    fn signature_type(&self) -> SignatureType;

    /// Raw public key written into the data item's owner field
    fn owner(&self) -> Vec<u8>;

    /// Human-readable address of the owner
    fn address(&self) -> String;

    /// Sign a data item's deep hash
    fn sign(&self, message: &[u8]) -> Result<Vec<u8>, WalletError>;
}

/// A wallet containing a mnemonic and derived keys
pub struct Wallet {
    mnemonic: Mnemonic,
    signing_key: SigningKey,
    address: String,
}

impl Wallet {
    /// Create a new wallet with a random mnemonic
    pub fn new() -> Result<Self, WalletError> {
        // Generate 32 bytes of entropy for 24-word mnemonic
        let mut entropy = [0u8; 32];
        getrandom::getrandom(&mut entropy)
            .map_err(|e| WalletError::MnemonicGeneration(e.to_string()))?;

        let mnemonic = Mnemonic::from_entropy_in(Language::English, &entropy)
            .map_err(|e| WalletError::MnemonicGeneration(e.to_string()))?;

        Self::from_mnemonic(mnemonic)
    }

    /// Create a wallet from an existing mnemonic phrase
    pub fn from_phrase(phrase: &str) -> Result<Self, WalletError> {
        let mnemonic = Mnemonic::parse_in(Language::English, phrase)
            .map_err(|e| WalletError::InvalidMnemonic(e.to_string()))?;

        Self::from_mnemonic(mnemonic)
    }

    /// Create a wallet from a Mnemonic
    fn from_mnemonic(mnemonic: Mnemonic) -> Result<Self, WalletError> {
        let seed = mnemonic.to_seed("");

        let path: DerivationPath = DERIVATION_PATH
            .parse()
            .map_err(|e: bip32::Error| WalletError::Derivation(e.to_string()))?;

        let xprv = XPrv::derive_from_path(seed, &path)
            .map_err(|e| WalletError::Derivation(e.to_string()))?;

        let signing_key = xprv.private_key().clone();
        let public_key = uncompressed_public_key(&signing_key);
        let address = address_from_public_key(&public_key);

        Ok(Self {
            mnemonic,
            signing_key,
            address,
        })
    }

    /// Get the mnemonic phrase
    pub fn mnemonic(&self) -> String {
        self.mnemonic.to_string()
    }

    /// Get the EIP-55 checksummed address
    pub fn address(&self) -> &str {
        &self.address
    }

    /// Get the signing key
    pub fn signing_key(&self) -> &SigningKey {
        &self.signing_key
    }

    /// Save wallet mnemonic to a file
    pub fn save_to_file(&self, path: &Path) -> Result<(), WalletError> {
        fs::write(path, self.mnemonic())?;
        Ok(())
    }

    /// Load wallet from a file
    pub fn load_from_file(path: &Path) -> Result<Self, WalletError> {
        let content = fs::read_to_string(path)?;
        let phrase = content.trim();
        Self::from_phrase(phrase)
    }
}

impl Signer for Wallet {
    fn signature_type(&self) -> SignatureType {
        SignatureType::Ethereum
    }

    fn owner(&self) -> Vec<u8> {
        uncompressed_public_key(&self.signing_key).to_vec()
    }

    fn address(&self) -> String {
        self.address.clone()
    }

    fn sign(&self, message: &[u8]) -> Result<Vec<u8>, WalletError> {
        let digest = personal_message_hash(message);
        let (signature, recovery_id) = self
            .signing_key
            .sign_prehash_recoverable(&digest)
            .map_err(|e| WalletError::Signing(e.to_string()))?;

        // r || s || v, with v in the legacy 27/28 form
        let mut out = Vec::with_capacity(65);
        out.extend_from_slice(&signature.to_bytes());
        out.push(27 + recovery_id.to_byte());
        Ok(out)
    }
}

impl std::fmt::Debug for Wallet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Wallet")
            .field("address", &self.address)
            .finish_non_exhaustive()
    }
}

fn keccak256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Keccak::v256();
    hasher.update(data);
    let mut out = [0u8; 32];
    hasher.finalize(&mut out);
    out
}

/// EIP-191 hash of a message: keccak256(prefix || len || message)
pub fn personal_message_hash(message: &[u8]) -> [u8; 32] {
    let mut prefixed = Vec::with_capacity(PERSONAL_MESSAGE_PREFIX.len() + 20 + message.len());
    prefixed.extend_from_slice(PERSONAL_MESSAGE_PREFIX.as_bytes());
    prefixed.extend_from_slice(message.len().to_string().as_bytes());
    prefixed.extend_from_slice(message);
    keccak256(&prefixed)
}

fn uncompressed_public_key(signing_key: &SigningKey) -> [u8; 65] {
    let point = signing_key.verifying_key().to_encoded_point(false);
    let mut out = [0u8; 65];
    out.copy_from_slice(point.as_bytes());
    out
}

/// Checksummed address of an uncompressed secp256k1 public key
pub fn address_from_public_key(public_key: &[u8; 65]) -> String {
    let hash = keccak256(&public_key[1..]);
    checksum_address(&hash[12..])
}

/// EIP-55 mixed-case rendering of a 20-byte address
pub fn checksum_address(address: &[u8]) -> String {
    let lower = hex::encode(address);
    let hash = keccak256(lower.as_bytes());

    let mut out = String::with_capacity(2 + lower.len());
    out.push_str("0x");
    for (i, ch) in lower.chars().enumerate() {
        let nibble = (hash[i / 2] >> (if i % 2 == 0 { 4 } else { 0 })) & 0x0f;
        if ch.is_ascii_alphabetic() && nibble >= 8 {
            out.push(ch.to_ascii_uppercase());
        } else {
            out.push(ch);
        }
    }
    out
}

/// Get the default wallet file path
#[cfg(feature = "cli")]
pub fn default_wallet_path() -> PathBuf {
    let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
    home.join(".riddle").join("wallet.txt")
}

/// Ensure the wallet directory exists
#[cfg(feature = "cli")]
pub fn ensure_wallet_dir(wallet_path: &Path) -> Result<PathBuf, WalletError> {
    if let Some(parent) = wallet_path.parent() {
        fs::create_dir_all(parent)?;
    }
    Ok(wallet_path.to_path_buf())
}
