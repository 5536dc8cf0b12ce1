use std::fmt::{Debug, Formatter};

use k256::ecdsa::SigningKey;
use log::debug;

use crate::{
    csp::{hash, Csp, DecryptionKey, SymmetricKey},
    error::Error,
};

/// Derives the enclave id: the upper-case hex SHA-256 of the SEC1 verifying key.
pub fn enclave_id(enclave_vk: &[u8]) -> String {
    hex::encode_upper(hash(enclave_vk))
}

/// Key material held by an initialized enclave.
///
/// Private keys are only reachable from within this crate; the key types zeroize
/// themselves on drop.
pub struct EnclaveKeys {
    signing_key: SigningKey,
    enclave_vk: Vec<u8>,
    enclave_id: String,
    chaincode_key: DecryptionKey,
    state_key: SymmetricKey,
}

impl EnclaveKeys {
    /// Generates the signing keypair, the chaincode encryption keypair and the state
    /// key, in that order. Nothing is returned unless all three succeed.
    pub fn generate(csp: &impl Csp) -> Result<Self, Error> {
        let signing_key = csp.new_signing_keys().map_err(Error::KeyGeneration)?;
        let chaincode_key = csp.new_encryption_keys().map_err(Error::KeyGeneration)?;
        let state_key = csp.new_symmetric_key().map_err(Error::KeyGeneration)?;

        let enclave_vk: Vec<u8> = signing_key.verifying_key().to_sec1_bytes().into();
        let enclave_id = enclave_id(&enclave_vk);
        debug!("Derived enclave id {enclave_id}");

        Ok(Self {
            signing_key,
            enclave_vk,
            enclave_id,
            chaincode_key,
            state_key,
        })
    }

    pub fn enclave_vk(&self) -> &[u8] {
        &self.enclave_vk
    }

    pub fn enclave_id(&self) -> &str {
        &self.enclave_id
    }

    pub fn chaincode_ek(&self) -> Vec<u8> {
        self.chaincode_key.public_key()
    }

    pub(crate) fn signing_key(&self) -> &SigningKey {
        &self.signing_key
    }

    pub(crate) fn chaincode_key(&self) -> &DecryptionKey {
        &self.chaincode_key
    }

    pub(crate) fn state_key(&self) -> &[u8] {
        &self.state_key
    }
}

impl Debug for EnclaveKeys {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EnclaveKeys")
            .field("enclave_id", &self.enclave_id)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::csp::{testing::FailingStateKeyCsp, CspError, DefaultCsp};

    #[test]
    fn test_enclave_id_is_upper_hex_hash_of_vk() {
        let keys = EnclaveKeys::generate(&DefaultCsp).unwrap();
        let expected = hex::encode(hash(keys.enclave_vk())).to_uppercase();

        assert_eq!(keys.enclave_id(), expected);
        assert_eq!(keys.enclave_id().len(), 64);
        assert_eq!(enclave_id(keys.enclave_vk()), expected);
    }

    #[test]
    fn test_generated_keys_are_independent() {
        let keys = EnclaveKeys::generate(&DefaultCsp).unwrap();
        assert_ne!(keys.enclave_vk(), keys.chaincode_ek().as_slice());
    }

    #[test]
    fn test_generation_failure_yields_no_keys() {
        let err = EnclaveKeys::generate(&FailingStateKeyCsp).unwrap_err();
        assert!(matches!(err, Error::KeyGeneration(CspError::Rng)));
    }

    #[test]
    fn test_debug_omits_secrets() {
        let keys = EnclaveKeys::generate(&DefaultCsp).unwrap();
        let debug = format!("{keys:?}");
        assert!(debug.contains(keys.enclave_id()));
        assert!(!debug.contains("state_key"));
        assert!(!debug.contains("signing_key"));
    }
}
