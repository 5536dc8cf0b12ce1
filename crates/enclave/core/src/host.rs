//! Host-side dispatch of named enclave calls.

use log::debug;

use crate::{
    attestor::Attestor,
    csp::Csp,
    error::Error,
    handler::{init::InitEnclaveRequest, invoke::InvokeRequest, Handler},
    ledger::ChaincodeStub,
    shared::SharedEnclave,
};

pub const INIT_ENCLAVE_FUNCTION: &str = "__initEnclave";
pub const INVOKE_FUNCTION: &str = "__invoke";

/// A call addressed to the enclave by the peer.
#[derive(Debug)]
pub enum EnclaveRequest<S> {
    Init(InitEnclaveRequest),
    Invoke(InvokeRequest<S>),
}

impl<S: ChaincodeStub> EnclaveRequest<S> {
    /// Routes a peer-level function call to the matching enclave request.
    ///
    /// `__initEnclave` takes the serialized chaincode parameters, host parameters and
    /// attestation parameters; `__invoke` takes the serialized request message.
    pub fn from_function(function: &str, args: Vec<Vec<u8>>, stub: S) -> Result<Self, Error> {
        debug!("Routing `{function}` with {} argument(s)", args.len());
        match function {
            INIT_ENCLAVE_FUNCTION => {
                let [serialized_cc_params, serialized_host_params, attestation_params] =
                    take_args(function, args)?;
                Ok(Self::Init(InitEnclaveRequest {
                    serialized_cc_params,
                    serialized_host_params,
                    attestation_params,
                }))
            }
            INVOKE_FUNCTION => {
                let [request] = take_args(function, args)?;
                Ok(Self::Invoke(InvokeRequest { stub, request }))
            }
            _ => Err(Error::InvalidInvocation(format!(
                "unknown enclave function `{function}`"
            ))),
        }
    }
}

fn take_args<const N: usize>(function: &str, args: Vec<Vec<u8>>) -> Result<[Vec<u8>; N], Error> {
    args.try_into().map_err(|args: Vec<Vec<u8>>| {
        Error::InvalidInvocation(format!(
            "{function} expects {N} argument(s), got {}",
            args.len()
        ))
    })
}

#[async_trait::async_trait]
impl<S, C, A> Handler<SharedEnclave<C, A>> for EnclaveRequest<S>
where
    S: ChaincodeStub + Send,
    C: Csp,
    A: Attestor,
{
    type Error = Error;
    type Response = Vec<u8>;

    async fn handle(self, ctx: &SharedEnclave<C, A>) -> Result<Self::Response, Self::Error> {
        match self {
            EnclaveRequest::Init(request) => request.handle(ctx).await,
            EnclaveRequest::Invoke(request) => request.handle(ctx).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use fpc_proto::{fpc::CcParameters, Message};

    use super::*;
    use crate::{
        attestor::MockAttestor, chaincode::ChaincodeKind, csp::DefaultCsp, enclave::EnclaveStub,
        ledger::MockStub,
    };

    #[test]
    fn test_routes_known_functions() {
        let request = EnclaveRequest::from_function(
            INIT_ENCLAVE_FUNCTION,
            vec![b"cc".to_vec(), b"host".to_vec(), b"att".to_vec()],
            MockStub::default(),
        )
        .unwrap();
        assert!(matches!(
            request,
            EnclaveRequest::Init(InitEnclaveRequest { ref serialized_cc_params, .. })
                if serialized_cc_params == b"cc"
        ));

        let request = EnclaveRequest::from_function(
            INVOKE_FUNCTION,
            vec![b"req".to_vec()],
            MockStub::default(),
        )
        .unwrap();
        assert!(matches!(
            request,
            EnclaveRequest::Invoke(InvokeRequest { ref request, .. }) if request == b"req"
        ));
    }

    #[test]
    fn test_rejects_unknown_function_and_bad_arity() {
        assert!(matches!(
            EnclaveRequest::from_function("__rotateKeys", vec![], MockStub::default()),
            Err(Error::InvalidInvocation(_))
        ));
        assert!(matches!(
            EnclaveRequest::from_function(INVOKE_FUNCTION, vec![], MockStub::default()),
            Err(Error::InvalidInvocation(_))
        ));
        assert!(matches!(
            EnclaveRequest::from_function(
                INIT_ENCLAVE_FUNCTION,
                vec![b"cc".to_vec()],
                MockStub::default()
            ),
            Err(Error::InvalidInvocation(_))
        ));
    }

    #[tokio::test]
    async fn test_dispatches_to_enclave() {
        let enclave = SharedEnclave::wrapping(EnclaveStub::new(
            DefaultCsp,
            MockAttestor,
            ChaincodeKind::Simple.build(),
        ));
        let cc_params = CcParameters {
            chaincode_id: "SomeChaincodeId".to_string(),
            ..Default::default()
        };

        let request = EnclaveRequest::from_function(
            INIT_ENCLAVE_FUNCTION,
            vec![cc_params.encode_to_vec(), vec![], vec![]],
            MockStub::default(),
        )
        .unwrap();
        let credentials = request.handle(&enclave).await.unwrap();
        assert!(!credentials.is_empty());
        assert!(enclave.is_initialized().await);

        let request =
            EnclaveRequest::from_function(INVOKE_FUNCTION, vec![vec![]], MockStub::default())
                .unwrap();
        assert!(matches!(
            request.handle(&enclave).await,
            Err(Error::MissingField(_))
        ));
    }
}
