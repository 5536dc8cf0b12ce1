//! Cryptographic service provider used by the enclave.
//!
//! The [`Csp`] trait is the seam where a hardware-backed provider can replace the
//! software [`DefaultCsp`]. Key usage classes are kept apart by type: a
//! [`SigningKey`] only signs, a [`DecryptionKey`] only opens key-transport
//! messages, and symmetric keys are plain zeroizing byte buffers.

use aes_gcm::{
    aead::{Aead, KeyInit},
    Aes256Gcm, Nonce,
};
use displaydoc::Display;
use k256::ecdsa::{
    signature::{Signer, Verifier},
    Signature, SigningKey, VerifyingKey,
};
use rand::{rngs::OsRng, RngCore};
use sha2::{Digest, Sha256};
use thiserror::Error;
use zeroize::Zeroizing;

/// Length in bytes of a symmetric (AES-256-GCM) key.
pub const SYMMETRIC_KEY_LEN: usize = 32;

const NONCE_LEN: usize = 12;

pub type SymmetricKey = Zeroizing<Vec<u8>>;

#[derive(Debug, Display, Error)]
pub enum CspError {
    /// invalid key
    InvalidKey,
    /// ciphertext too short
    ShortCiphertext,
    /// authenticated encryption failed
    Aead,
    /// ECIES operation failed
    Ecies,
    /// signing failed
    Signing,
    /// invalid signature
    BadSignature,
    /// randomness unavailable
    Rng,
}

/// Secret half of the chaincode encryption keypair (ECIES over secp256k1).
#[derive(Clone)]
pub struct DecryptionKey(SigningKey);

impl DecryptionKey {
    /// SEC1 encoding of the public half, handed out to clients.
    pub fn public_key(&self) -> Vec<u8> {
        VerifyingKey::from(&self.0).to_sec1_bytes().into()
    }
}

impl std::fmt::Debug for DecryptionKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("DecryptionKey").field(&"<redacted>").finish()
    }
}

pub trait Csp: Send + Sync + 'static {
    fn new_signing_keys(&self) -> Result<SigningKey, CspError>;

    fn new_encryption_keys(&self) -> Result<DecryptionKey, CspError>;

    fn new_symmetric_key(&self) -> Result<SymmetricKey, CspError>;

    fn pk_encrypt(&self, public_key: &[u8], msg: &[u8]) -> Result<Vec<u8>, CspError>;

    fn pk_decrypt(&self, key: &DecryptionKey, ciphertext: &[u8]) -> Result<Vec<u8>, CspError>;

    fn encrypt(&self, key: &[u8], msg: &[u8]) -> Result<Vec<u8>, CspError>;

    fn decrypt(&self, key: &[u8], ciphertext: &[u8]) -> Result<Vec<u8>, CspError>;

    fn sign(&self, key: &SigningKey, msg: &[u8]) -> Result<Vec<u8>, CspError>;

    fn verify(&self, public_key: &[u8], msg: &[u8], signature: &[u8]) -> Result<(), CspError>;
}

/// Software provider: ECDSA and ECIES on secp256k1, AES-256-GCM with a random nonce
/// prepended to each ciphertext.
#[derive(Clone, Copy, Debug, Default)]
pub struct DefaultCsp;

impl Csp for DefaultCsp {
    fn new_signing_keys(&self) -> Result<SigningKey, CspError> {
        Ok(SigningKey::random(&mut OsRng))
    }

    fn new_encryption_keys(&self) -> Result<DecryptionKey, CspError> {
        Ok(DecryptionKey(SigningKey::random(&mut OsRng)))
    }

    fn new_symmetric_key(&self) -> Result<SymmetricKey, CspError> {
        let mut key = Zeroizing::new(vec![0u8; SYMMETRIC_KEY_LEN]);
        OsRng
            .try_fill_bytes(key.as_mut_slice())
            .map_err(|_| CspError::Rng)?;
        Ok(key)
    }

    fn pk_encrypt(&self, public_key: &[u8], msg: &[u8]) -> Result<Vec<u8>, CspError> {
        ecies::encrypt(public_key, msg).map_err(|_| CspError::Ecies)
    }

    fn pk_decrypt(&self, key: &DecryptionKey, ciphertext: &[u8]) -> Result<Vec<u8>, CspError> {
        let sk = Zeroizing::new(key.0.to_bytes().to_vec());
        ecies::decrypt(&sk, ciphertext).map_err(|_| CspError::Ecies)
    }

    fn encrypt(&self, key: &[u8], msg: &[u8]) -> Result<Vec<u8>, CspError> {
        let cipher = Aes256Gcm::new_from_slice(key).map_err(|_| CspError::InvalidKey)?;

        let mut nonce = [0u8; NONCE_LEN];
        OsRng
            .try_fill_bytes(&mut nonce)
            .map_err(|_| CspError::Rng)?;
        let ciphertext = cipher
            .encrypt(Nonce::from_slice(&nonce), msg)
            .map_err(|_| CspError::Aead)?;

        let mut sealed = Vec::with_capacity(NONCE_LEN + ciphertext.len());
        sealed.extend_from_slice(&nonce);
        sealed.extend_from_slice(&ciphertext);
        Ok(sealed)
    }

    fn decrypt(&self, key: &[u8], ciphertext: &[u8]) -> Result<Vec<u8>, CspError> {
        if ciphertext.len() < NONCE_LEN {
            return Err(CspError::ShortCiphertext);
        }
        let cipher = Aes256Gcm::new_from_slice(key).map_err(|_| CspError::InvalidKey)?;

        let (nonce, ciphertext) = ciphertext.split_at(NONCE_LEN);
        cipher
            .decrypt(Nonce::from_slice(nonce), ciphertext)
            .map_err(|_| CspError::Aead)
    }

    fn sign(&self, key: &SigningKey, msg: &[u8]) -> Result<Vec<u8>, CspError> {
        let signature = Signer::<Signature>::try_sign(key, msg).map_err(|_| CspError::Signing)?;
        Ok(signature.to_bytes().to_vec())
    }

    fn verify(&self, public_key: &[u8], msg: &[u8], signature: &[u8]) -> Result<(), CspError> {
        let vk = VerifyingKey::from_sec1_bytes(public_key).map_err(|_| CspError::InvalidKey)?;
        let signature = Signature::from_slice(signature).map_err(|_| CspError::BadSignature)?;
        vk.verify(msg, &signature)
            .map_err(|_| CspError::BadSignature)
    }
}

/// SHA-256 digest of `data`.
pub fn hash(data: &[u8]) -> [u8; 32] {
    Sha256::digest(data).into()
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;

    /// Generates signing and encryption keys but fails on the state key.
    pub(crate) struct FailingStateKeyCsp;

    impl Csp for FailingStateKeyCsp {
        fn new_signing_keys(&self) -> Result<SigningKey, CspError> {
            DefaultCsp.new_signing_keys()
        }

        fn new_encryption_keys(&self) -> Result<DecryptionKey, CspError> {
            DefaultCsp.new_encryption_keys()
        }

        fn new_symmetric_key(&self) -> Result<SymmetricKey, CspError> {
            Err(CspError::Rng)
        }

        fn pk_encrypt(&self, public_key: &[u8], msg: &[u8]) -> Result<Vec<u8>, CspError> {
            DefaultCsp.pk_encrypt(public_key, msg)
        }

        fn pk_decrypt(&self, key: &DecryptionKey, ciphertext: &[u8]) -> Result<Vec<u8>, CspError> {
            DefaultCsp.pk_decrypt(key, ciphertext)
        }

        fn encrypt(&self, key: &[u8], msg: &[u8]) -> Result<Vec<u8>, CspError> {
            DefaultCsp.encrypt(key, msg)
        }

        fn decrypt(&self, key: &[u8], ciphertext: &[u8]) -> Result<Vec<u8>, CspError> {
            DefaultCsp.decrypt(key, ciphertext)
        }

        fn sign(&self, key: &SigningKey, msg: &[u8]) -> Result<Vec<u8>, CspError> {
            DefaultCsp.sign(key, msg)
        }

        fn verify(&self, public_key: &[u8], msg: &[u8], signature: &[u8]) -> Result<(), CspError> {
            DefaultCsp.verify(public_key, msg, signature)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_symmetric_round_trip() {
        let csp = DefaultCsp;
        let key = csp.new_symmetric_key().unwrap();
        assert_eq!(key.len(), SYMMETRIC_KEY_LEN);

        let ciphertext = csp.encrypt(&key, b"some value").unwrap();
        assert_ne!(&ciphertext[NONCE_LEN..], b"some value");
        assert_eq!(csp.decrypt(&key, &ciphertext).unwrap(), b"some value");
    }

    #[test]
    fn test_symmetric_decrypt_with_wrong_key_fails() {
        let csp = DefaultCsp;
        let key = csp.new_symmetric_key().unwrap();
        let other = csp.new_symmetric_key().unwrap();

        let ciphertext = csp.encrypt(&key, b"some value").unwrap();
        assert!(matches!(
            csp.decrypt(&other, &ciphertext),
            Err(CspError::Aead)
        ));
        assert!(matches!(
            csp.decrypt(&key, &ciphertext[..4]),
            Err(CspError::ShortCiphertext)
        ));
        assert!(matches!(
            csp.encrypt(&key[..16], b"x"),
            Err(CspError::InvalidKey)
        ));
    }

    #[test]
    fn test_asymmetric_round_trip() {
        let csp = DefaultCsp;
        let key = csp.new_encryption_keys().unwrap();

        let ciphertext = csp.pk_encrypt(&key.public_key(), b"transport keys").unwrap();
        assert_eq!(csp.pk_decrypt(&key, &ciphertext).unwrap(), b"transport keys");

        let other = csp.new_encryption_keys().unwrap();
        assert!(csp.pk_decrypt(&other, &ciphertext).is_err());
    }

    #[test]
    fn test_sign_and_verify() {
        let csp = DefaultCsp;
        let sk = csp.new_signing_keys().unwrap();
        let vk: Vec<u8> = sk.verifying_key().to_sec1_bytes().into();

        let signature = csp.sign(&sk, b"response").unwrap();
        assert!(csp.verify(&vk, b"response", &signature).is_ok());
        assert!(matches!(
            csp.verify(&vk, b"tampered", &signature),
            Err(CspError::BadSignature)
        ));
    }

    #[test]
    fn test_debug_redacts_decryption_key() {
        let key = DefaultCsp.new_encryption_keys().unwrap();
        assert_eq!(format!("{key:?}"), "DecryptionKey(\"<redacted>\")");
    }
}
