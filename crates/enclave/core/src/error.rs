use displaydoc::Display;
use fpc_proto::DecodeError;
use thiserror::Error;

use crate::{csp::CspError, ledger::LedgerError};

/// Errors returned by the enclave entry points.
///
/// Messages name the failing protocol step only; they never carry key material or
/// plaintext request/response content.
#[derive(Debug, Display, Error)]
pub enum Error {
    /// failed to decode {0}: {1}
    Decode(&'static str, #[source] DecodeError),
    /// key generation failed: {0}
    KeyGeneration(#[source] CspError),
    /// decryption of {0} failed
    Decryption(&'static str),
    /// encryption of {0} failed
    Encryption(&'static str),
    /// signing failed
    Signing,
    /// missing field: {0}
    MissingField(&'static str),
    /// malformed request: {0}
    MalformedRequest(&'static str),
    /// attestation failed: {0}
    Attestation(String),
    /// enclave is already initialized
    AlreadyInitialized,
    /// enclave is not initialized
    NotInitialized,
    /// operation not supported: {0}
    Unsupported(&'static str),
    /// invalid invocation: {0}
    InvalidInvocation(String),
    /// ledger error: {0}
    Ledger(#[from] LedgerError),
    /// configuration error: {0}
    Config(String),
    /// response verification failed: {0}
    Verification(&'static str),
}
