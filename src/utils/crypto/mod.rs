//! Cryptographic helpers: metric signing and payload encryption

pub mod encryption;
pub mod hmac;

pub use encryption::{ENCRYPTION_HEADER, ENCRYPTION_SCHEME, PayloadDecryptor, PayloadEncryptor};
pub use hmac::{create_hmac_signature, verify_hmac_signature};
