//! Field-level encryption for connection secrets.
//!
//! SFTP passwords, Salesforce consumer secrets and cached access tokens are
//! sealed with AES-256-GCM before they are written to SQLite. Stored format
//! is hex(nonce || ciphertext || tag).

use anyhow::{Context, Result};
use ring::aead::{Aad, LessSafeKey, Nonce, UnboundKey, AES_256_GCM, NONCE_LEN};
use ring::rand::{SecureRandom, SystemRandom};
use secrecy::{ExposeSecret, SecretString};
use zeroize::Zeroizing;

/// Size of the master key (32 bytes = 256 bits).
pub const KEY_SIZE: usize = 32;

/// Seals and opens secret column values.
pub struct FieldEncryptor {
    key: LessSafeKey,
    rng: SystemRandom,
}

impl FieldEncryptor {
    /// Create an encryptor from a raw 256-bit master key.
    pub fn new(master_key: &[u8; KEY_SIZE]) -> Result<Self> {
        let unbound = UnboundKey::new(&AES_256_GCM, master_key)
            .map_err(|_| anyhow::anyhow!("Failed to create encryption key"))?;

        Ok(Self {
            key: LessSafeKey::new(unbound),
            rng: SystemRandom::new(),
        })
    }

    /// Create an encryptor from a 64-character hex master key.
    pub fn from_hex_key(hex_key: &str) -> Result<Self> {
        let bytes = Zeroizing::new(
            hex::decode(hex_key.trim()).context("Master key is not valid hex")?,
        );
        let key: Zeroizing<[u8; KEY_SIZE]> = Zeroizing::new(
            bytes
                .as_slice()
                .try_into()
                .map_err(|_| anyhow::anyhow!("Master key must be {} bytes", KEY_SIZE))?,
        );
        Self::new(&key)
    }

    /// Encrypt a secret for storage.
    pub fn seal(&self, secret: &SecretString) -> Result<String> {
        let mut nonce_bytes = [0u8; NONCE_LEN];
        self.rng
            .fill(&mut nonce_bytes)
            .map_err(|_| anyhow::anyhow!("Failed to generate nonce"))?;

        let mut in_out = secret.expose_secret().as_bytes().to_vec();
        self.key
            .seal_in_place_append_tag(
                Nonce::assume_unique_for_key(nonce_bytes),
                Aad::empty(),
                &mut in_out,
            )
            .map_err(|_| anyhow::anyhow!("Encryption failed"))?;

        let mut sealed = nonce_bytes.to_vec();
        sealed.extend_from_slice(&in_out);
        Ok(hex::encode(sealed))
    }

    /// Decrypt a stored value.
    pub fn open(&self, sealed_hex: &str) -> Result<SecretString> {
        let sealed = hex::decode(sealed_hex).context("Invalid hex encoding")?;
        if sealed.len() < NONCE_LEN + AES_256_GCM.tag_len() {
            anyhow::bail!("Ciphertext too short");
        }

        let (nonce_bytes, encrypted) = sealed.split_at(NONCE_LEN);
        let nonce = Nonce::try_assume_unique_for_key(nonce_bytes)
            .map_err(|_| anyhow::anyhow!("Invalid nonce"))?;

        let mut in_out = Zeroizing::new(encrypted.to_vec());
        let plaintext = self
            .key
            .open_in_place(nonce, Aad::empty(), &mut in_out)
            .map_err(|_| anyhow::anyhow!("Decryption failed - wrong key or corrupted data"))?;

        let text = std::str::from_utf8(plaintext).context("Decrypted data is not valid UTF-8")?;
        Ok(SecretString::from(text.to_string()))
    }

    /// Seal an optional secret column.
    pub fn seal_optional(&self, secret: Option<&SecretString>) -> Result<Option<String>> {
        secret.map(|s| self.seal(s)).transpose()
    }

    /// Open an optional secret column.
    pub fn open_optional(&self, sealed_hex: Option<&str>) -> Result<Option<SecretString>> {
        sealed_hex.map(|s| self.open(s)).transpose()
    }
}

/// Generate a random master key.
pub fn generate_master_key() -> Result<Zeroizing<[u8; KEY_SIZE]>> {
    let mut key = Zeroizing::new([0u8; KEY_SIZE]);
    SystemRandom::new()
        .fill(&mut key[..])
        .map_err(|_| anyhow::anyhow!("Failed to generate random key"))?;
    Ok(key)
}
