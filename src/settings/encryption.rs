//! AES-256-GCM sealing of stored secret strings.
//!
//! Every write draws a fresh random nonce. The master key is 32 bytes, supplied
//! base64-encoded through `SPAPI_ENCRYPTION_KEY`.

use aes_gcm::{
    aead::{Aead, AeadCore, KeyInit, OsRng},
    Aes256Gcm, Nonce,
};
use anyhow::{anyhow, Context, Result};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};

pub const KEY_SIZE: usize = 32;

const NONCE_SIZE: usize = 12;

/// Decode a base64 master key and check it is exactly [`KEY_SIZE`] bytes.
pub fn decode_key(key_base64: &str) -> Result<Vec<u8>> {
    let key = BASE64
        .decode(key_base64.trim())
        .context("Failed to decode base64 encryption key")?;

    if key.len() != KEY_SIZE {
        return Err(anyhow!(
            "Encryption key must be {} bytes (256 bits), got {} bytes",
            KEY_SIZE,
            key.len()
        ));
    }

    Ok(key)
}

/// Seal `plaintext`, returning `(ciphertext, nonce)` both base64-encoded.
pub fn seal(plaintext: &str, key: &[u8]) -> Result<(String, String)> {
    let cipher = cipher(key)?;
    let nonce = Aes256Gcm::generate_nonce(&mut OsRng);

    let sealed = cipher
        .encrypt(&nonce, plaintext.as_bytes())
        .map_err(|e| anyhow!("Encryption failed: {}", e))?;

    Ok((BASE64.encode(sealed), BASE64.encode(nonce)))
}

/// Open a value produced by [`seal`]. Fails on a wrong key or tampered data.
pub fn open(ciphertext: &str, nonce: &str, key: &[u8]) -> Result<String> {
    let cipher = cipher(key)?;

    let sealed = BASE64
        .decode(ciphertext)
        .context("Failed to decode ciphertext")?;
    let nonce = BASE64.decode(nonce).context("Failed to decode nonce")?;
    if nonce.len() != NONCE_SIZE {
        return Err(anyhow!(
            "Invalid nonce size: expected {}, got {}",
            NONCE_SIZE,
            nonce.len()
        ));
    }

    let plaintext = cipher
        .decrypt(Nonce::from_slice(&nonce), sealed.as_ref())
        .map_err(|e| anyhow!("Decryption failed (wrong key or corrupted data): {}", e))?;

    String::from_utf8(plaintext).context("Decrypted secret is not valid UTF-8")
}

fn cipher(key: &[u8]) -> Result<Aes256Gcm> {
    if key.len() != KEY_SIZE {
        return Err(anyhow!("Encryption key must be {} bytes", KEY_SIZE));
    }
    Aes256Gcm::new_from_slice(key).map_err(|e| anyhow!("Failed to create cipher: {}", e))
}
