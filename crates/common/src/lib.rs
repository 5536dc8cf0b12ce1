#[cfg(feature = "enclave")]
pub use fpc_enclave_core as enclave;
#[cfg(feature = "proto")]
pub use fpc_proto as proto;
