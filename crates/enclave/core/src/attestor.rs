use std::{
    fs::{read, File},
    io::{Error as IoError, Write},
    path::PathBuf,
};

use base64::{engine::general_purpose::STANDARD, Engine as _};
use fpc_proto::{fpc::AttestedData, Message};
use log::debug;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Report data bound into a quote.
pub type UserData = [u8; 64];

/// Evidence of the `simulated` scheme: base64 of `"0"`.
pub const SIMULATED_ATTESTATION: &str = "MA==";

/// Types whose contents can be bound into an attestation.
pub trait HasUserData {
    fn user_data(&self) -> UserData;
}

impl HasUserData for AttestedData {
    fn user_data(&self) -> UserData {
        let digest: [u8; 32] = Sha256::digest(self.encode_to_vec()).into();

        let mut user_data = [0u8; 64];
        user_data[0..32].copy_from_slice(&digest);
        user_data
    }
}

/// Scheme-tagged attestation evidence, serialized as
/// `{"attestation_type": "<scheme>", "attestation": "<base64>"}`.
///
/// Hardware schemes are added as new variants; the `Credentials` shape is unaffected.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "attestation_type")]
pub enum Evidence {
    #[serde(rename = "simulated")]
    Simulated { attestation: String },
    #[serde(rename = "gramine-dcap")]
    GramineDcap { attestation: String },
}

impl Evidence {
    pub fn scheme(&self) -> &'static str {
        match self {
            Evidence::Simulated { .. } => "simulated",
            Evidence::GramineDcap { .. } => "gramine-dcap",
        }
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(self)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(bytes)
    }
}

/// The trait defines the interface for generating attestation evidence from within an
/// enclave.
pub trait Attestor: Send + Sync + 'static {
    type Error: ToString;

    /// Produces evidence binding `user_data`. `params` are the opaque attestation
    /// parameters supplied by the host at initialization.
    fn evidence(&self, params: &[u8], user_data: impl HasUserData)
        -> Result<Evidence, Self::Error>;
}

/// An `Attestor` for generating DCAP quotes for Gramine based enclaves.
#[derive(Clone, PartialEq, Debug)]
pub struct DcapAttestor {
    pub attestation_dir: PathBuf,
}

impl Default for DcapAttestor {
    fn default() -> Self {
        Self {
            attestation_dir: PathBuf::from("/dev/attestation"),
        }
    }
}

impl DcapAttestor {
    fn quote(&self, user_data: UserData) -> Result<Vec<u8>, IoError> {
        let mut user_report_data = File::create(self.attestation_dir.join("user_report_data"))?;
        user_report_data.write_all(user_data.as_slice())?;
        user_report_data.flush()?;
        read(self.attestation_dir.join("quote"))
    }
}

impl Attestor for DcapAttestor {
    type Error = IoError;

    fn evidence(
        &self,
        params: &[u8],
        user_data: impl HasUserData,
    ) -> Result<Evidence, Self::Error> {
        debug!("Requesting DCAP quote ({} bytes of attestation params)", params.len());
        let quote = self.quote(user_data.user_data())?;
        Ok(Evidence::GramineDcap {
            attestation: STANDARD.encode(quote),
        })
    }
}

/// A mock `Attestor` for non-hardware deployments: returns the fixed `simulated`
/// evidence. (only meant for testing purposes)
#[derive(Clone, PartialEq, Debug, Default)]
pub struct MockAttestor;

impl Attestor for MockAttestor {
    type Error = String;

    fn evidence(
        &self,
        _params: &[u8],
        _user_data: impl HasUserData,
    ) -> Result<Evidence, Self::Error> {
        Ok(Evidence::Simulated {
            attestation: SIMULATED_ATTESTATION.to_string(),
        })
    }
}

/// The attestor selected by configuration.
#[derive(Clone, PartialEq, Debug)]
pub enum ConfiguredAttestor {
    Mock(MockAttestor),
    Dcap(DcapAttestor),
}

impl Attestor for ConfiguredAttestor {
    type Error = String;

    fn evidence(
        &self,
        params: &[u8],
        user_data: impl HasUserData,
    ) -> Result<Evidence, Self::Error> {
        match self {
            ConfiguredAttestor::Mock(attestor) => attestor.evidence(params, user_data),
            ConfiguredAttestor::Dcap(attestor) => attestor
                .evidence(params, user_data)
                .map_err(|e| e.to_string()),
        }
    }
}
