//! Host-side ledger access as seen from inside the enclave.

use std::collections::BTreeMap;

use displaydoc::Display;
use fpc_proto::fabric::SignedProposal;
use thiserror::Error;

#[derive(Clone, Debug, Display, Error, PartialEq, Eq)]
pub enum LedgerError {
    /// no signed proposal available
    NoProposal,
    /// ledger access failed: {0}
    Access(String),
}

/// The peer-provided stub through which the enclave reaches the ledger.
///
/// Values handed to and returned from this trait are exactly what is stored on the
/// ledger, i.e. ciphertext for private chaincode state.
pub trait ChaincodeStub {
    fn get_state(&self, key: &str) -> Result<Option<Vec<u8>>, LedgerError>;

    fn put_state(&mut self, key: &str, value: Vec<u8>) -> Result<(), LedgerError>;

    fn del_state(&mut self, key: &str) -> Result<(), LedgerError>;

    fn get_signed_proposal(&self) -> Result<SignedProposal, LedgerError>;
}

impl<T: ChaincodeStub + ?Sized> ChaincodeStub for &mut T {
    fn get_state(&self, key: &str) -> Result<Option<Vec<u8>>, LedgerError> {
        (**self).get_state(key)
    }

    fn put_state(&mut self, key: &str, value: Vec<u8>) -> Result<(), LedgerError> {
        (**self).put_state(key, value)
    }

    fn del_state(&mut self, key: &str) -> Result<(), LedgerError> {
        (**self).del_state(key)
    }

    fn get_signed_proposal(&self) -> Result<SignedProposal, LedgerError> {
        (**self).get_signed_proposal()
    }
}

/// An in-memory ledger for tests and simulated deployments.
#[derive(Clone, Debug, Default)]
pub struct MockStub {
    state: BTreeMap<String, Vec<u8>>,
    proposal: Option<SignedProposal>,
    writes: usize,
}

impl MockStub {
    pub fn with_proposal(proposal: SignedProposal) -> Self {
        Self {
            proposal: Some(proposal),
            ..Default::default()
        }
    }

    pub fn state(&self) -> &BTreeMap<String, Vec<u8>> {
        &self.state
    }

    /// Number of puts and deletes performed so far.
    pub fn writes(&self) -> usize {
        self.writes
    }
}

impl ChaincodeStub for MockStub {
    fn get_state(&self, key: &str) -> Result<Option<Vec<u8>>, LedgerError> {
        Ok(self.state.get(key).cloned())
    }

    fn put_state(&mut self, key: &str, value: Vec<u8>) -> Result<(), LedgerError> {
        self.writes += 1;
        self.state.insert(key.to_string(), value);
        Ok(())
    }

    fn del_state(&mut self, key: &str) -> Result<(), LedgerError> {
        self.writes += 1;
        self.state.remove(key);
        Ok(())
    }

    fn get_signed_proposal(&self) -> Result<SignedProposal, LedgerError> {
        self.proposal.clone().ok_or(LedgerError::NoProposal)
    }
}
