//! Client side of the encrypted invocation protocol.
//!
//! An [`EncryptionContext`] is built from an enclave's credentials. It conceals
//! invocations for that enclave and reveals the signed responses it returns.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use fpc_proto::{
    fabric::{ChaincodeInput, Response},
    fpc::{
        ChaincodeRequestMessage, ChaincodeResponseMessage, CleartextChaincodeRequest,
        Credentials, KeyTransportMessage, SignedChaincodeResponseMessage,
    },
    Message,
};
use zeroize::Zeroizing;

use crate::{
    credentials,
    csp::{hash, Csp, DefaultCsp, SymmetricKey},
    error::Error,
    identity::enclave_id,
};

pub struct EncryptionContext<C = DefaultCsp> {
    csp: C,
    chaincode_ek: Vec<u8>,
    enclave_vk: Vec<u8>,
    enclave_id: String,
    pending: Option<PendingRequest>,
}

/// What a concealed request leaves behind to reveal its response.
struct PendingRequest {
    response_key: SymmetricKey,
    request_hash: [u8; 32],
}

impl EncryptionContext<DefaultCsp> {
    pub fn new(credentials_bytes: &[u8]) -> Result<Self, Error> {
        Self::with_csp(DefaultCsp, credentials_bytes)
    }
}

impl<C: Csp> EncryptionContext<C> {
    /// Reads the chaincode encryption key and enclave verifying key from serialized
    /// `Credentials`.
    pub fn with_csp(csp: C, credentials_bytes: &[u8]) -> Result<Self, Error> {
        let credentials = Credentials::decode(credentials_bytes)
            .map_err(|e| Error::Decode("credentials", e))?;
        let attested_data = credentials::attested_data(&credentials)?;
        if attested_data.chaincode_ek.is_empty() {
            return Err(Error::MissingField("chaincode encryption key"));
        }
        if attested_data.enclave_vk.is_empty() {
            return Err(Error::MissingField("enclave verifying key"));
        }

        Ok(Self {
            enclave_id: enclave_id(&attested_data.enclave_vk),
            chaincode_ek: attested_data.chaincode_ek,
            enclave_vk: attested_data.enclave_vk,
            csp,
            pending: None,
        })
    }

    /// Id of the enclave this context talks to.
    pub fn enclave_id(&self) -> &str {
        &self.enclave_id
    }

    /// Builds a serialized `ChaincodeRequestMessage` invoking `function` with `args`.
    pub fn conceal(&mut self, function: &str, args: &[&str]) -> Result<Vec<u8>, Error> {
        self.conceal_input(ChaincodeInput::from_function(function, args))
    }

    /// Like [`Self::conceal`], but routed to the business logic's init entry point.
    pub fn conceal_init(&mut self, args: &[&str]) -> Result<Vec<u8>, Error> {
        let mut input = ChaincodeInput::from_function("init", args);
        input.is_init = true;
        self.conceal_input(input)
    }

    /// Each request travels under its own request and response keys. Only the
    /// response to the latest request can be revealed.
    fn conceal_input(&mut self, input: ChaincodeInput) -> Result<Vec<u8>, Error> {
        let request_key = self.csp.new_symmetric_key().map_err(Error::KeyGeneration)?;
        let response_key = self.csp.new_symmetric_key().map_err(Error::KeyGeneration)?;

        let cleartext = Zeroizing::new(
            CleartextChaincodeRequest { input: Some(input) }.encode_to_vec(),
        );
        let encrypted_request = self
            .csp
            .encrypt(&request_key, &cleartext)
            .map_err(|_| Error::Encryption("request"))?;

        let key_transport = Zeroizing::new(
            KeyTransportMessage {
                request_encryption_key: request_key.to_vec(),
                response_encryption_key: response_key.to_vec(),
            }
            .encode_to_vec(),
        );
        let encrypted_key_transport_message = self
            .csp
            .pk_encrypt(&self.chaincode_ek, &key_transport)
            .map_err(|_| Error::Encryption("key transport message"))?;

        let request = ChaincodeRequestMessage {
            encrypted_request,
            encrypted_key_transport_message,
        }
        .encode_to_vec();
        self.pending = Some(PendingRequest {
            response_key,
            request_hash: hash(&request),
        });
        Ok(request)
    }

    /// Verifies a serialized `SignedChaincodeResponseMessage` against the enclave
    /// identity and the last concealed request, then decrypts its response.
    pub fn reveal(&self, signed_response_bytes: &[u8]) -> Result<Response, Error> {
        let signed = SignedChaincodeResponseMessage::decode(signed_response_bytes)
            .map_err(|e| Error::Decode("signed response message", e))?;
        self.csp
            .verify(
                &self.enclave_vk,
                &signed.chaincode_response_message,
                &signed.signature,
            )
            .map_err(|_| Error::Verification("signature"))?;

        let response =
            ChaincodeResponseMessage::decode(signed.chaincode_response_message.as_slice())
                .map_err(|e| Error::Decode("response message", e))?;
        if response.enclave_id != self.enclave_id {
            return Err(Error::Verification("enclave id"));
        }
        let pending = self
            .pending
            .as_ref()
            .ok_or(Error::Verification("no request was concealed"))?;
        if response.chaincode_request_message_hash != pending.request_hash {
            return Err(Error::Verification("request hash"));
        }

        let encoded = Zeroizing::new(
            self.csp
                .decrypt(&pending.response_key, &response.encrypted_response)
                .map_err(|_| Error::Decryption("response"))?,
        );
        let decoded = Zeroizing::new(
            STANDARD
                .decode(encoded.as_slice())
                .map_err(|_| Error::Verification("response encoding"))?,
        );
        Response::decode(decoded.as_slice()).map_err(|e| Error::Decode("response", e))
    }
}
