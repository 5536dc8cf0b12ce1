use std::sync::Arc;

use tokio::sync::Mutex;

use crate::{
    attestor::Attestor, csp::Csp, enclave::EnclaveStub, error::Error, ledger::ChaincodeStub,
};

/// A thread-safe wrapper for an enclave.
///
/// At most one `init` or `invoke` runs at a time per wrapped enclave.
pub struct SharedEnclave<C, A> {
    pub inner: Arc<Mutex<EnclaveStub<C, A>>>,
}

impl<C, A> Clone for SharedEnclave<C, A> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<C: Csp, A: Attestor> SharedEnclave<C, A> {
    pub fn wrapping(enclave: EnclaveStub<C, A>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(enclave)),
        }
    }

    pub async fn init(
        &self,
        serialized_cc_params: &[u8],
        serialized_host_params: &[u8],
        attestation_params: &[u8],
    ) -> Result<Vec<u8>, Error> {
        self.inner.lock().await.init(
            serialized_cc_params,
            serialized_host_params,
            attestation_params,
        )
    }

    pub async fn invoke<S: ChaincodeStub>(
        &self,
        stub: S,
        request_bytes: &[u8],
    ) -> Result<Vec<u8>, Error> {
        self.inner.lock().await.invoke(stub, request_bytes)
    }

    pub async fn enclave_id(&self) -> Result<String, Error> {
        self.inner.lock().await.enclave_id()
    }

    pub async fn is_initialized(&self) -> bool {
        self.inner.lock().await.is_initialized()
    }
}
