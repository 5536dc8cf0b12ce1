use displaydoc::Display;
use fpc_proto::fabric::SignedProposal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod kv;
pub mod simple;

/// Errors raised by business logic. They end up, signed, in the enclave's response
/// rather than failing the invocation.
#[derive(Clone, Debug, Display, Error, PartialEq, Eq)]
pub enum ChaincodeError {
    /// unknown function `{0}`
    UnknownFunction(String),
    /// incorrect number of arguments, expecting {0}
    ArgumentCount(usize),
    /// invalid argument: {0}
    InvalidArgument(String),
    /// state access failed: {0}
    State(String),
    /// {0}
    Failed(String),
}

impl ChaincodeError {
    /// Variant name only; the message may carry request arguments.
    pub fn kind(&self) -> &'static str {
        match self {
            ChaincodeError::UnknownFunction(_) => "unknown function",
            ChaincodeError::ArgumentCount(_) => "argument count",
            ChaincodeError::InvalidArgument(_) => "invalid argument",
            ChaincodeError::State(_) => "state access",
            ChaincodeError::Failed(_) => "failed",
        }
    }
}

/// The state-access capability handed to business logic.
///
/// Implementations mediate every ledger access of one invocation; values seen here
/// are cleartext.
pub trait StateAccess {
    fn get_state(&mut self, key: &str) -> Result<Vec<u8>, ChaincodeError>;

    fn put_state(&mut self, key: &str, value: &[u8]) -> Result<(), ChaincodeError>;

    fn del_state(&mut self, key: &str) -> Result<(), ChaincodeError>;

    fn get_signed_proposal(&self) -> Result<SignedProposal, ChaincodeError>;

    /// The invoked function name and its arguments.
    fn function_and_parameters(&self) -> (String, Vec<String>);
}

/// Business logic protected by the enclave.
pub trait Chaincode: Send + Sync + 'static {
    fn init(&self, stub: &mut dyn StateAccess) -> Result<Vec<u8>, ChaincodeError>;

    fn invoke(&self, stub: &mut dyn StateAccess) -> Result<Vec<u8>, ChaincodeError>;
}

/// Selects which bundled business logic an enclave runs.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChaincodeKind {
    #[default]
    Simple,
    Kv,
}

impl ChaincodeKind {
    pub fn build(self) -> Box<dyn Chaincode> {
        match self {
            ChaincodeKind::Simple => Box::new(simple::SimpleChaincode),
            ChaincodeKind::Kv => Box::new(kv::KvChaincode),
        }
    }
}

pub(crate) fn expect_args(args: &[String], n: usize) -> Result<(), ChaincodeError> {
    if args.len() != n {
        return Err(ChaincodeError::ArgumentCount(n));
    }
    Ok(())
}
