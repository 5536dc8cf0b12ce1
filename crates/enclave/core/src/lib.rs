#![doc = include_str!("../README.md")]
#![forbid(unsafe_code)]
#![warn(
    clippy::checked_conversions,
    clippy::panic,
    clippy::panic_in_result_fn,
    trivial_casts,
    trivial_numeric_casts,
    rust_2018_idioms,
    unused_lifetimes,
    unused_import_braces,
    unused_qualifications
)]

pub mod attestor;
pub mod chaincode;
pub mod client;
pub mod config;
pub mod credentials;
pub mod csp;
pub mod enclave;
pub mod error;
pub mod handler;
pub mod host;
pub mod identity;
pub mod ledger;
pub mod shared;
pub mod stub;

pub use crate::{
    client::EncryptionContext,
    config::EnclaveConfig,
    enclave::EnclaveStub,
    error::Error,
    host::EnclaveRequest,
    shared::SharedEnclave,
};
