//! The state-access façade the enclave puts between business logic and the ledger.

use fpc_proto::{
    fabric::{KvRead, KvRwSet, KvWrite, SignedProposal},
    fpc::FpcKvSet,
};
use log::debug;

use crate::{
    chaincode::{ChaincodeError, StateAccess},
    csp::{hash, Csp},
    ledger::ChaincodeStub,
};

/// Encrypts state under the enclave's state key and records every access.
///
/// Reads are recorded as key plus SHA-256 of the value as stored on the ledger;
/// writes as key plus the stored (encrypted) value. Both keep call order.
pub struct FpcStub<'a, S, C> {
    stub: S,
    csp: &'a C,
    state_key: &'a [u8],
    function: String,
    args: Vec<String>,
    reads: Vec<KvRead>,
    read_value_hashes: Vec<Vec<u8>>,
    writes: Vec<KvWrite>,
}

impl<'a, S, C> FpcStub<'a, S, C>
where
    S: ChaincodeStub,
    C: Csp,
{
    pub fn new(
        stub: S,
        csp: &'a C,
        state_key: &'a [u8],
        function: String,
        args: Vec<String>,
    ) -> Self {
        Self {
            stub,
            csp,
            state_key,
            function,
            args,
            reads: vec![],
            read_value_hashes: vec![],
            writes: vec![],
        }
    }

    /// The effect record accumulated so far.
    pub fn into_kv_set(self) -> FpcKvSet {
        FpcKvSet {
            rw_set: Some(KvRwSet {
                reads: self.reads,
                writes: self.writes,
            }),
            read_value_hashes: self.read_value_hashes,
        }
    }
}

impl<S, C> StateAccess for FpcStub<'_, S, C>
where
    S: ChaincodeStub,
    C: Csp,
{
    fn get_state(&mut self, key: &str) -> Result<Vec<u8>, ChaincodeError> {
        let stored = self
            .stub
            .get_state(key)
            .map_err(|e| ChaincodeError::State(e.to_string()))?
            .unwrap_or_default();

        self.reads.push(KvRead {
            key: key.to_string(),
            version: None,
        });
        self.read_value_hashes.push(hash(&stored).to_vec());
        debug!("get state");

        if stored.is_empty() {
            return Ok(vec![]);
        }
        self.csp
            .decrypt(self.state_key, &stored)
            .map_err(|_| ChaincodeError::State(format!("cannot decrypt value of `{key}`")))
    }

    fn put_state(&mut self, key: &str, value: &[u8]) -> Result<(), ChaincodeError> {
        let encrypted = self
            .csp
            .encrypt(self.state_key, value)
            .map_err(|_| ChaincodeError::State(format!("cannot encrypt value of `{key}`")))?;

        self.stub
            .put_state(key, encrypted.clone())
            .map_err(|e| ChaincodeError::State(e.to_string()))?;
        self.writes.push(KvWrite {
            key: key.to_string(),
            is_delete: false,
            value: encrypted,
        });
        debug!("put state");
        Ok(())
    }

    fn del_state(&mut self, key: &str) -> Result<(), ChaincodeError> {
        self.stub
            .del_state(key)
            .map_err(|e| ChaincodeError::State(e.to_string()))?;
        self.writes.push(KvWrite {
            key: key.to_string(),
            is_delete: true,
            value: vec![],
        });
        debug!("del state");
        Ok(())
    }

    fn get_signed_proposal(&self) -> Result<SignedProposal, ChaincodeError> {
        self.stub
            .get_signed_proposal()
            .map_err(|e| ChaincodeError::State(e.to_string()))
    }

    fn function_and_parameters(&self) -> (String, Vec<String>) {
        (self.function.clone(), self.args.clone())
    }
}
