//! Hybrid public-key payload encryption
//!
//! A fresh AES-256-GCM key encrypts the payload and RSA-OAEP (SHA-256)
//! wraps that key. Wire layout:
//!
//! `u16 BE wrapped-key length || wrapped key || 12-byte nonce || ciphertext+tag`

use crate::utils::error::{MetricError, Result};
use aes_gcm::{
    Aes256Gcm, Key, Nonce,
    aead::{Aead, KeyInit},
};
use rand::RngCore;
use rsa::pkcs1::{DecodeRsaPrivateKey, DecodeRsaPublicKey};
use rsa::pkcs8::{DecodePrivateKey, DecodePublicKey};
use rsa::{Oaep, RsaPrivateKey, RsaPublicKey};
use sha2::Sha256;
use std::path::Path;

/// Header value announcing an encrypted body
pub const ENCRYPTION_SCHEME: &str = "rsa-oaep+aes-256-gcm";

/// Request header carrying [`ENCRYPTION_SCHEME`]
pub const ENCRYPTION_HEADER: &str = "x-encryption";

const AES_GCM_NONCE_SIZE: usize = 12;
const AES_KEY_SIZE: usize = 32;
const LENGTH_PREFIX: usize = 2;

/// Encrypts payloads for a server holding the matching private key
#[derive(Debug, Clone)]
pub struct PayloadEncryptor {
    public_key: RsaPublicKey,
}

impl PayloadEncryptor {
    /// Parse a PEM public key (SPKI or PKCS#1)
    pub fn from_pem(pem: &str) -> Result<Self> {
        let public_key = RsaPublicKey::from_public_key_pem(pem)
            .or_else(|_| RsaPublicKey::from_pkcs1_pem(pem))
            .map_err(|e| MetricError::crypto(format!("Invalid public key: {}", e)))?;
        Ok(Self { public_key })
    }

    /// Load a PEM public key from disk
    pub async fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let pem = tokio::fs::read_to_string(path).await?;
        Self::from_pem(&pem)
    }

    /// Encrypt a payload
    pub fn encrypt(&self, plaintext: &[u8]) -> Result<Vec<u8>> {
        let mut rng = rand::thread_rng();

        let mut key_bytes = [0u8; AES_KEY_SIZE];
        rng.fill_bytes(&mut key_bytes);
        let mut nonce_bytes = [0u8; AES_GCM_NONCE_SIZE];
        rng.fill_bytes(&mut nonce_bytes);

        let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(&key_bytes));
        let ciphertext = cipher
            .encrypt(Nonce::from_slice(&nonce_bytes), plaintext)
            .map_err(|e| MetricError::crypto(format!("Encryption failed: {}", e)))?;

        let wrapped_key = self
            .public_key
            .encrypt(&mut rng, Oaep::new::<Sha256>(), &key_bytes)
            .map_err(|e| MetricError::crypto(format!("Key wrapping failed: {}", e)))?;
        let wrapped_len = u16::try_from(wrapped_key.len())
            .map_err(|_| MetricError::crypto("Wrapped key too large"))?;

        let mut output = Vec::with_capacity(
            LENGTH_PREFIX + wrapped_key.len() + AES_GCM_NONCE_SIZE + ciphertext.len(),
        );
        output.extend_from_slice(&wrapped_len.to_be_bytes());
        output.extend_from_slice(&wrapped_key);
        output.extend_from_slice(&nonce_bytes);
        output.extend_from_slice(&ciphertext);
        Ok(output)
    }
}

/// Decrypts payloads produced by [`PayloadEncryptor`]
#[derive(Debug, Clone)]
pub struct PayloadDecryptor {
    private_key: RsaPrivateKey,
}

impl PayloadDecryptor {
    /// Parse a PEM private key (PKCS#8 or PKCS#1)
    pub fn from_pem(pem: &str) -> Result<Self> {
        let private_key = RsaPrivateKey::from_pkcs8_pem(pem)
            .or_else(|_| RsaPrivateKey::from_pkcs1_pem(pem))
            .map_err(|e| MetricError::crypto(format!("Invalid private key: {}", e)))?;
        Ok(Self { private_key })
    }

    /// Load a PEM private key from disk
    pub async fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let pem = tokio::fs::read_to_string(path).await?;
        Self::from_pem(&pem)
    }

    /// Decrypt a payload
    pub fn decrypt(&self, payload: &[u8]) -> Result<Vec<u8>> {
        if payload.len() < LENGTH_PREFIX {
            return Err(MetricError::Validation("Encrypted payload too short".to_string()));
        }
        let wrapped_len = u16::from_be_bytes([payload[0], payload[1]]) as usize;
        let body = &payload[LENGTH_PREFIX..];

        // nonce plus at least the 16-byte tag
        if body.len() < wrapped_len + AES_GCM_NONCE_SIZE + 16 {
            return Err(MetricError::Validation(
                "Encrypted payload truncated".to_string(),
            ));
        }
        let (wrapped_key, rest) = body.split_at(wrapped_len);
        let (nonce_bytes, ciphertext) = rest.split_at(AES_GCM_NONCE_SIZE);

        let key_bytes = self
            .private_key
            .decrypt(Oaep::new::<Sha256>(), wrapped_key)
            .map_err(|e| MetricError::Validation(format!("Key unwrapping failed: {}", e)))?;
        if key_bytes.len() != AES_KEY_SIZE {
            return Err(MetricError::Validation("Unexpected content key size".to_string()));
        }

        let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(&key_bytes));
        cipher
            .decrypt(Nonce::from_slice(nonce_bytes), ciphertext)
            .map_err(|_| {
                MetricError::Validation(
                    "Decryption failed - payload corrupted or tampered".to_string(),
                )
            })
    }
}
