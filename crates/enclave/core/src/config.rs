use std::path::{Path, PathBuf};

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::{
    attestor::{ConfiguredAttestor, DcapAttestor, MockAttestor},
    chaincode::ChaincodeKind,
    error::Error,
};

/// Prefix of environment variables overriding the configuration file.
pub const ENV_PREFIX: &str = "FPC_";

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttestationKind {
    /// Simulated evidence; no SGX processor required.
    #[default]
    Mock,
    /// DCAP quotes through Gramine's `/dev/attestation` interface.
    Dcap,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnclaveConfig {
    /// Attestation scheme used when issuing credentials
    #[serde(default)]
    pub attestation: AttestationKind,

    /// Directory of the Gramine attestation pseudo-files (DCAP only)
    #[serde(default = "default_attestation_dir")]
    pub attestation_dir: PathBuf,

    /// Business logic bound to the enclave
    #[serde(default)]
    pub chaincode: ChaincodeKind,
}

fn default_attestation_dir() -> PathBuf {
    PathBuf::from("/dev/attestation")
}

impl Default for EnclaveConfig {
    fn default() -> Self {
        Self {
            attestation: AttestationKind::default(),
            attestation_dir: default_attestation_dir(),
            chaincode: ChaincodeKind::default(),
        }
    }
}

impl EnclaveConfig {
    /// Loads the configuration from defaults, then the optional TOML file at `path`,
    /// then `FPC_`-prefixed environment variables.
    pub fn load(path: Option<&Path>) -> Result<Self, Error> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));
        if let Some(path) = path {
            figment = figment.merge(Toml::file(path));
        }
        figment
            .merge(Env::prefixed(ENV_PREFIX))
            .extract()
            .map_err(|e| Error::Config(e.to_string()))
    }

    pub fn attestor(&self) -> ConfiguredAttestor {
        match self.attestation {
            AttestationKind::Mock => ConfiguredAttestor::Mock(MockAttestor),
            AttestationKind::Dcap => ConfiguredAttestor::Dcap(DcapAttestor {
                attestation_dir: self.attestation_dir.clone(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn test_defaults() {
        let config = EnclaveConfig::default();
        assert_eq!(config.attestation, AttestationKind::Mock);
        assert_eq!(config.chaincode, ChaincodeKind::Simple);
        assert_eq!(config.attestor(), ConfiguredAttestor::Mock(MockAttestor));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "attestation = \"dcap\"\nattestation_dir = \"/tmp/attestation\"\nchaincode = \"kv\""
        )
        .unwrap();

        let config = EnclaveConfig::load(Some(file.path())).unwrap();
        assert_eq!(config.chaincode, ChaincodeKind::Kv);
        assert_eq!(
            config.attestor(),
            ConfiguredAttestor::Dcap(DcapAttestor {
                attestation_dir: PathBuf::from("/tmp/attestation"),
            })
        );
    }

    #[test]
    fn test_invalid_file_is_a_config_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "chaincode = \"auction\"").unwrap();

        assert!(matches!(
            EnclaveConfig::load(Some(file.path())),
            Err(Error::Config(_))
        ));
    }
}
