//! Ledger and peer types referenced by the private chaincode messages.
//!
//! Field numbers follow the Fabric protos (`peer/proposal.proto`,
//! `peer/chaincode.proto`, `peer/proposal_response.proto` and
//! `ledger/rwset/kvrwset/kv_rwset.proto`).

use prost::Message;

/// Status code of a successful chaincode [`Response`].
pub const OK: i32 = 200;
/// Status code of a failed chaincode [`Response`].
pub const ERROR: i32 = 500;

#[derive(Clone, PartialEq, Message)]
pub struct SignedProposal {
    #[prost(bytes = "vec", tag = "1")]
    pub proposal_bytes: Vec<u8>,
    #[prost(bytes = "vec", tag = "2")]
    pub signature: Vec<u8>,
}

/// Arguments of a chaincode call. By convention `args[0]` is the function name.
#[derive(Clone, PartialEq, Message)]
pub struct ChaincodeInput {
    #[prost(bytes = "vec", repeated, tag = "1")]
    pub args: Vec<Vec<u8>>,
    #[prost(bool, tag = "3")]
    pub is_init: bool,
}

impl ChaincodeInput {
    pub fn from_function(function: &str, args: &[&str]) -> Self {
        Self {
            args: std::iter::once(function)
                .chain(args.iter().copied())
                .map(|a| a.as_bytes().to_vec())
                .collect(),
            is_init: false,
        }
    }
}

#[derive(Clone, PartialEq, Message)]
pub struct Response {
    #[prost(int32, tag = "1")]
    pub status: i32,
    #[prost(string, tag = "2")]
    pub message: String,
    #[prost(bytes = "vec", tag = "3")]
    pub payload: Vec<u8>,
}

impl Response {
    pub fn success(payload: Vec<u8>) -> Self {
        Self {
            status: OK,
            message: String::new(),
            payload,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: ERROR,
            message: message.into(),
            payload: Vec::new(),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.status == OK
    }
}

#[derive(Clone, PartialEq, Message)]
pub struct Version {
    #[prost(uint64, tag = "1")]
    pub block_num: u64,
    #[prost(uint64, tag = "2")]
    pub tx_num: u64,
}

#[derive(Clone, PartialEq, Message)]
pub struct KvRead {
    #[prost(string, tag = "1")]
    pub key: String,
    #[prost(message, optional, tag = "2")]
    pub version: Option<Version>,
}

#[derive(Clone, PartialEq, Message)]
pub struct KvWrite {
    #[prost(string, tag = "1")]
    pub key: String,
    #[prost(bool, tag = "2")]
    pub is_delete: bool,
    #[prost(bytes = "vec", tag = "3")]
    pub value: Vec<u8>,
}

#[derive(Clone, PartialEq, Message)]
pub struct KvRwSet {
    #[prost(message, repeated, tag = "1")]
    pub reads: Vec<KvRead>,
    #[prost(message, repeated, tag = "3")]
    pub writes: Vec<KvWrite>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chaincode_input_puts_function_first() {
        let input = ChaincodeInput::from_function("invoke", &["a", "b", "10"]);
        assert_eq!(
            input.args,
            vec![
                b"invoke".to_vec(),
                b"a".to_vec(),
                b"b".to_vec(),
                b"10".to_vec()
            ]
        );
        assert!(!input.is_init);
    }

    #[test]
    fn test_response_status() {
        assert!(Response::success(b"100".to_vec()).is_ok());

        let err = Response::error("no such account");
        assert!(!err.is_ok());
        assert_eq!(err.status, ERROR);
        assert!(err.payload.is_empty());
    }
}
