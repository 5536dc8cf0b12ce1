//! The enclave: one-time credential issuance and the secure invocation pipeline.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use fpc_proto::{
    fabric::{ChaincodeInput, Response},
    fpc::{
        CcParameters, ChaincodeRequestMessage, ChaincodeResponseMessage, CleartextChaincodeRequest,
        FpcKvSet, HostParameters, KeyTransportMessage, SignedChaincodeResponseMessage,
    },
    Message,
};
use log::{debug, info, warn};
use zeroize::Zeroizing;

use crate::{
    attestor::{Attestor, ConfiguredAttestor, MockAttestor},
    chaincode::{Chaincode, StateAccess},
    config::EnclaveConfig,
    credentials,
    csp::{hash, Csp, DefaultCsp, SYMMETRIC_KEY_LEN},
    error::Error,
    identity::EnclaveKeys,
    ledger::ChaincodeStub,
    stub::FpcStub,
};

/// Per-call symmetric keys recovered from a [`KeyTransportMessage`].
struct TransportKeys {
    request_key: Zeroizing<Vec<u8>>,
    response_key: Zeroizing<Vec<u8>>,
}

/// A cleartext invocation: function name, arguments and whether it is an init call.
struct Invocation {
    function: String,
    args: Vec<String>,
    is_init: bool,
}

/// The trusted side of a private chaincode.
///
/// Holds the enclave's key material for its whole lifetime. All operations take
/// `&mut self`; use [`crate::shared::SharedEnclave`] to share an instance between
/// concurrent callers.
pub struct EnclaveStub<C = DefaultCsp, A = MockAttestor> {
    csp: C,
    attestor: A,
    chaincode: Box<dyn Chaincode>,
    keys: Option<EnclaveKeys>,
}

impl<C: Csp, A: Attestor> EnclaveStub<C, A> {
    pub fn new(csp: C, attestor: A, chaincode: Box<dyn Chaincode>) -> Self {
        Self {
            csp,
            attestor,
            chaincode,
            keys: None,
        }
    }

    pub fn is_initialized(&self) -> bool {
        self.keys.is_some()
    }

    fn keys(&self) -> Result<&EnclaveKeys, Error> {
        self.keys.as_ref().ok_or(Error::NotInitialized)
    }

    /// Generates the enclave keys and issues attestable credentials.
    ///
    /// Returns the serialized `Credentials`. May succeed only once per instance.
    pub fn init(
        &mut self,
        serialized_cc_params: &[u8],
        serialized_host_params: &[u8],
        attestation_params: &[u8],
    ) -> Result<Vec<u8>, Error> {
        if self.keys.is_some() {
            return Err(Error::AlreadyInitialized);
        }

        let host_params = HostParameters::decode(serialized_host_params)
            .map_err(|e| Error::Decode("host parameters", e))?;
        let cc_params = CcParameters::decode(serialized_cc_params)
            .map_err(|e| Error::Decode("chaincode parameters", e))?;

        let keys = EnclaveKeys::generate(&self.csp)?;
        let credentials = credentials::issue(
            &keys,
            cc_params,
            host_params,
            &self.attestor,
            attestation_params,
        )?;

        info!("Enclave {} initialized", keys.enclave_id());
        self.keys = Some(keys);
        Ok(credentials.encode_to_vec())
    }

    /// Runs one encrypted invocation against `stub` and returns the serialized
    /// `SignedChaincodeResponseMessage`.
    pub fn invoke<S: ChaincodeStub>(
        &mut self,
        stub: S,
        request_bytes: &[u8],
    ) -> Result<Vec<u8>, Error> {
        let keys = self.keys()?;
        debug!("ChaincodeInvoke");

        let request = unwrap_request(request_bytes)?;
        let transport_keys = self.recover_transport_keys(keys, &request)?;
        let invocation = self.recover_invocation(&request, &transport_keys)?;

        let proposal = stub.get_signed_proposal()?;
        let (response, kv_set) = self.dispatch(keys, stub, invocation);

        let encrypted_response = self.seal_response(&response, &transport_keys)?;
        let response = ChaincodeResponseMessage {
            encrypted_response,
            fpc_rw_set: Some(kv_set),
            proposal: Some(proposal),
            chaincode_request_message_hash: hash(request_bytes).to_vec(),
            enclave_id: keys.enclave_id().to_string(),
        };
        self.sign_response(keys, &response)
    }

    /// The hex-encoded hash of the enclave's verifying key.
    pub fn enclave_id(&self) -> Result<String, Error> {
        Ok(self.keys()?.enclave_id().to_string())
    }

    pub fn generate_cc_keys(&mut self) -> Result<Vec<u8>, Error> {
        Err(Error::Unsupported("generate chaincode keys"))
    }

    pub fn export_cc_keys(&mut self, _credentials: &[u8]) -> Result<Vec<u8>, Error> {
        Err(Error::Unsupported("export chaincode keys"))
    }

    pub fn import_cc_keys(&mut self) -> Result<Vec<u8>, Error> {
        Err(Error::Unsupported("import chaincode keys"))
    }

    fn recover_transport_keys(
        &self,
        keys: &EnclaveKeys,
        request: &ChaincodeRequestMessage,
    ) -> Result<TransportKeys, Error> {
        let key_transport_bytes = Zeroizing::new(
            self.csp
                .pk_decrypt(keys.chaincode_key(), &request.encrypted_key_transport_message)
                .map_err(|_| Error::Decryption("key transport message"))?,
        );
        let key_transport = KeyTransportMessage::decode(key_transport_bytes.as_slice())
            .map_err(|e| Error::Decode("key transport message", e))?;

        // check that we have both, request and response encryption key
        if key_transport.request_encryption_key.is_empty() {
            return Err(Error::MissingField("request encryption key"));
        }
        if key_transport.response_encryption_key.is_empty() {
            return Err(Error::MissingField("response encryption key"));
        }
        // a key the response cannot be sealed with must not reach dispatch
        if key_transport.request_encryption_key.len() != SYMMETRIC_KEY_LEN {
            return Err(Error::MalformedRequest("request encryption key length"));
        }
        if key_transport.response_encryption_key.len() != SYMMETRIC_KEY_LEN {
            return Err(Error::MalformedRequest("response encryption key length"));
        }

        Ok(TransportKeys {
            request_key: Zeroizing::new(key_transport.request_encryption_key),
            response_key: Zeroizing::new(key_transport.response_encryption_key),
        })
    }

    fn recover_invocation(
        &self,
        request: &ChaincodeRequestMessage,
        transport_keys: &TransportKeys,
    ) -> Result<Invocation, Error> {
        let cleartext = Zeroizing::new(
            self.csp
                .decrypt(&transport_keys.request_key, &request.encrypted_request)
                .map_err(|_| Error::Decryption("request"))?,
        );
        let cleartext = CleartextChaincodeRequest::decode(cleartext.as_slice())
            .map_err(|_| Error::MalformedRequest("cleartext request does not decode"))?;

        let ChaincodeInput { args, is_init } = cleartext
            .input
            .ok_or(Error::MalformedRequest("no chaincode input"))?;
        let mut args = args
            .into_iter()
            .map(String::from_utf8)
            .collect::<Result<Vec<_>, _>>()
            .map_err(|_| Error::MalformedRequest("arguments are not utf-8"))?;
        if args.is_empty() {
            return Err(Error::MalformedRequest("no function name"));
        }
        let function = args.remove(0);

        Ok(Invocation {
            function,
            args,
            is_init,
        })
    }

    /// Runs the business logic. Its failures become an error `Response` so that they
    /// are signed like any other outcome.
    fn dispatch<S: ChaincodeStub>(
        &self,
        keys: &EnclaveKeys,
        stub: S,
        invocation: Invocation,
    ) -> (Response, FpcKvSet) {
        let Invocation {
            function,
            args,
            is_init,
        } = invocation;
        debug!("Dispatching chaincode (init: {is_init})");

        let mut fpc_stub = FpcStub::new(stub, &self.csp, keys.state_key(), function, args);
        let result = {
            let state: &mut dyn StateAccess = &mut fpc_stub;
            if is_init {
                self.chaincode.init(state)
            } else {
                self.chaincode.invoke(state)
            }
        };

        let response = match result {
            Ok(payload) => Response::success(payload),
            Err(e) => {
                warn!("Chaincode returned an error ({})", e.kind());
                Response::error(e.to_string())
            }
        };
        (response, fpc_stub.into_kv_set())
    }

    fn seal_response(
        &self,
        response: &Response,
        transport_keys: &TransportKeys,
    ) -> Result<Vec<u8>, Error> {
        // response must be encoded
        let encoded = Zeroizing::new(STANDARD.encode(response.encode_to_vec()));
        self.csp
            .encrypt(&transport_keys.response_key, encoded.as_bytes())
            .map_err(|_| Error::Encryption("response"))
    }

    fn sign_response(
        &self,
        keys: &EnclaveKeys,
        response: &ChaincodeResponseMessage,
    ) -> Result<Vec<u8>, Error> {
        let response_bytes = response.encode_to_vec();
        let signature = self
            .csp
            .sign(keys.signing_key(), &response_bytes)
            .map_err(|_| Error::Signing)?;

        let signed_response = SignedChaincodeResponseMessage {
            chaincode_response_message: response_bytes,
            signature,
        };
        Ok(signed_response.encode_to_vec())
    }
}

impl EnclaveStub<DefaultCsp, ConfiguredAttestor> {
    pub fn from_config(config: &EnclaveConfig) -> Self {
        info!(
            "Creating enclave with {:?} chaincode and {:?} attestation",
            config.chaincode, config.attestation
        );
        Self::new(DefaultCsp, config.attestor(), config.chaincode.build())
    }
}

fn unwrap_request(request_bytes: &[u8]) -> Result<ChaincodeRequestMessage, Error> {
    let request = ChaincodeRequestMessage::decode(request_bytes)
        .map_err(|e| Error::Decode("chaincode request message", e))?;

    if request.encrypted_request.is_empty() {
        return Err(Error::MissingField("encrypted request"));
    }
    if request.encrypted_key_transport_message.is_empty() {
        return Err(Error::MissingField("encrypted key transport message"));
    }
    Ok(request)
}
