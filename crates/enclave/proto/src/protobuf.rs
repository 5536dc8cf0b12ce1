use prost::{DecodeError, Message};

/// `google.protobuf.Any`: a serialized message tagged with its type URL.
#[derive(Clone, PartialEq, Message)]
pub struct Any {
    #[prost(string, tag = "1")]
    pub type_url: String,
    #[prost(bytes = "vec", tag = "2")]
    pub value: Vec<u8>,
}

impl Any {
    pub fn pack<M: Message>(type_url: impl Into<String>, msg: &M) -> Self {
        Self {
            type_url: type_url.into(),
            value: msg.encode_to_vec(),
        }
    }

    /// Decodes the wrapped message, failing if the type URL is not `type_url`.
    pub fn unpack<M: Message + Default>(&self, type_url: &str) -> Result<M, DecodeError> {
        if self.type_url != type_url {
            return Err(DecodeError::new(format!(
                "unexpected type url `{}`, expected `{}`",
                self.type_url, type_url
            )));
        }
        M::decode(self.value.as_slice())
    }
}
