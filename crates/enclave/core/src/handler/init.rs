use fpc_proto::{
    fpc::{HostParameters, InitEnclaveMessage},
    Message,
};

use crate::{
    attestor::Attestor, csp::Csp, error::Error, handler::Handler, shared::SharedEnclave,
};

/// `__initEnclave`: the three serialized initialization blobs.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct InitEnclaveRequest {
    pub serialized_cc_params: Vec<u8>,
    pub serialized_host_params: Vec<u8>,
    pub attestation_params: Vec<u8>,
}

impl InitEnclaveRequest {
    /// Builds the request from the peer's view of the deployment and a serialized
    /// `InitEnclaveMessage`, whose endpoint completes `host_params`.
    pub fn from_init_message(
        serialized_cc_params: Vec<u8>,
        mut host_params: HostParameters,
        serialized_init_message: &[u8],
    ) -> Result<Self, Error> {
        let message = InitEnclaveMessage::decode(serialized_init_message)
            .map_err(|e| Error::Decode("init enclave message", e))?;
        host_params.peer_endpoint = message.peer_endpoint;

        Ok(Self {
            serialized_cc_params,
            serialized_host_params: host_params.encode_to_vec(),
            attestation_params: message.attestation_params,
        })
    }
}

#[async_trait::async_trait]
impl<C: Csp, A: Attestor> Handler<SharedEnclave<C, A>> for InitEnclaveRequest {
    type Error = Error;
    type Response = Vec<u8>;

    async fn handle(self, ctx: &SharedEnclave<C, A>) -> Result<Self::Response, Self::Error> {
        ctx.init(
            &self.serialized_cc_params,
            &self.serialized_host_params,
            &self.attestation_params,
        )
        .await
    }
}
