//! Messages exchanged with the chaincode enclave.

use prost::Message;

use crate::{
    fabric::{ChaincodeInput, KvRwSet, SignedProposal},
    protobuf::Any,
};

/// Type URL under which [`AttestedData`] is packed into [`Credentials`].
pub const ATTESTED_DATA_TYPE_URL: &str = "type.googleapis.com/fpc.AttestedData";

#[derive(Clone, PartialEq, Message)]
pub struct CcParameters {
    #[prost(string, tag = "1")]
    pub chaincode_id: String,
    #[prost(string, tag = "2")]
    pub version: String,
    #[prost(int64, tag = "3")]
    pub sequence: i64,
    #[prost(string, tag = "4")]
    pub channel_id: String,
}

#[derive(Clone, PartialEq, Message)]
pub struct HostParameters {
    #[prost(string, tag = "1")]
    pub peer_msp_id: String,
    #[prost(string, tag = "2")]
    pub peer_endpoint: String,
    #[prost(bytes = "vec", tag = "3")]
    pub certificate: Vec<u8>,
}

#[derive(Clone, PartialEq, Message)]
pub struct InitEnclaveMessage {
    #[prost(string, tag = "1")]
    pub peer_endpoint: String,
    #[prost(bytes = "vec", tag = "2")]
    pub attestation_params: Vec<u8>,
}

/// The public facts an enclave vouches for in its [`Credentials`].
#[derive(Clone, PartialEq, Message)]
pub struct AttestedData {
    #[prost(bytes = "vec", tag = "1")]
    pub enclave_vk: Vec<u8>,
    #[prost(message, optional, tag = "2")]
    pub cc_params: Option<CcParameters>,
    #[prost(message, optional, tag = "3")]
    pub host_params: Option<HostParameters>,
    #[prost(bytes = "vec", tag = "4")]
    pub chaincode_ek: Vec<u8>,
}

#[derive(Clone, PartialEq, Message)]
pub struct Credentials {
    /// Scheme-tagged attestation evidence (JSON).
    #[prost(bytes = "vec", tag = "1")]
    pub attestation: Vec<u8>,
    #[prost(message, optional, tag = "2")]
    pub serialized_attested_data: Option<Any>,
}

#[derive(Clone, PartialEq, Message)]
pub struct ChaincodeRequestMessage {
    #[prost(bytes = "vec", tag = "1")]
    pub encrypted_request: Vec<u8>,
    #[prost(bytes = "vec", tag = "2")]
    pub encrypted_key_transport_message: Vec<u8>,
}

#[derive(Clone, PartialEq, Message)]
pub struct KeyTransportMessage {
    #[prost(bytes = "vec", tag = "1")]
    pub request_encryption_key: Vec<u8>,
    #[prost(bytes = "vec", tag = "2")]
    pub response_encryption_key: Vec<u8>,
}

#[derive(Clone, PartialEq, Message)]
pub struct CleartextChaincodeRequest {
    #[prost(message, optional, tag = "1")]
    pub input: Option<ChaincodeInput>,
}

/// Confidential read/write set: read values are replaced by their hashes.
#[derive(Clone, PartialEq, Message)]
pub struct FpcKvSet {
    #[prost(message, optional, tag = "1")]
    pub rw_set: Option<KvRwSet>,
    /// One hash per entry of `rw_set.reads`, in the same order.
    #[prost(bytes = "vec", repeated, tag = "2")]
    pub read_value_hashes: Vec<Vec<u8>>,
}

#[derive(Clone, PartialEq, Message)]
pub struct ChaincodeResponseMessage {
    #[prost(bytes = "vec", tag = "1")]
    pub encrypted_response: Vec<u8>,
    #[prost(message, optional, tag = "2")]
    pub fpc_rw_set: Option<FpcKvSet>,
    #[prost(message, optional, tag = "3")]
    pub proposal: Option<SignedProposal>,
    #[prost(bytes = "vec", tag = "4")]
    pub chaincode_request_message_hash: Vec<u8>,
    #[prost(string, tag = "5")]
    pub enclave_id: String,
}

#[derive(Clone, PartialEq, Message)]
pub struct SignedChaincodeResponseMessage {
    #[prost(bytes = "vec", tag = "1")]
    pub chaincode_response_message: Vec<u8>,
    #[prost(bytes = "vec", tag = "2")]
    pub signature: Vec<u8>,
}
