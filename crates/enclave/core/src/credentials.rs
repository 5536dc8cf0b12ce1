//! Credential issuance: binds the enclave's public facts to attestation evidence.

use fpc_proto::{
    fpc::{AttestedData, CcParameters, Credentials, HostParameters, ATTESTED_DATA_TYPE_URL},
    protobuf::Any,
};
use log::info;

use crate::{
    attestor::{Attestor, Evidence},
    error::Error,
    identity::EnclaveKeys,
};

/// Builds the [`AttestedData`] for `keys` and wraps it together with evidence from
/// `attestor` into [`Credentials`].
pub fn issue<A: Attestor>(
    keys: &EnclaveKeys,
    cc_params: CcParameters,
    host_params: HostParameters,
    attestor: &A,
    attestation_params: &[u8],
) -> Result<Credentials, Error> {
    let attested_data = AttestedData {
        enclave_vk: keys.enclave_vk().to_vec(),
        cc_params: Some(cc_params),
        host_params: Some(host_params),
        chaincode_ek: keys.chaincode_ek(),
    };

    let evidence = attestor
        .evidence(attestation_params, attested_data.clone())
        .map_err(|e| Error::Attestation(e.to_string()))?;
    let attestation = evidence
        .to_bytes()
        .map_err(|e| Error::Attestation(e.to_string()))?;
    info!(
        "Issued credentials for enclave {} ({} attestation)",
        keys.enclave_id(),
        evidence.scheme()
    );

    Ok(Credentials {
        attestation,
        serialized_attested_data: Some(Any::pack(ATTESTED_DATA_TYPE_URL, &attested_data)),
    })
}

/// Extracts the [`AttestedData`] embedded in `credentials`.
pub fn attested_data(credentials: &Credentials) -> Result<AttestedData, Error> {
    credentials
        .serialized_attested_data
        .as_ref()
        .ok_or(Error::MissingField("serialized attested data"))?
        .unpack(ATTESTED_DATA_TYPE_URL)
        .map_err(|e| Error::Decode("attested data", e))
}

/// Parses the scheme-tagged evidence carried by `credentials`.
pub fn evidence(credentials: &Credentials) -> Result<Evidence, Error> {
    Evidence::from_bytes(&credentials.attestation)
        .map_err(|_| Error::Attestation("unrecognized evidence".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        attestor::{MockAttestor, SIMULATED_ATTESTATION},
        csp::DefaultCsp,
    };

    #[test]
    fn test_issue_embeds_public_facts_only() {
        let keys = EnclaveKeys::generate(&DefaultCsp).unwrap();
        let cc_params = CcParameters {
            chaincode_id: "SomeChaincodeId".to_string(),
            ..Default::default()
        };

        let credentials = issue(
            &keys,
            cc_params.clone(),
            HostParameters::default(),
            &MockAttestor,
            b"someAttestationParams",
        )
        .unwrap();

        let attested_data = attested_data(&credentials).unwrap();
        assert_eq!(attested_data.enclave_vk, keys.enclave_vk());
        assert_eq!(attested_data.chaincode_ek, keys.chaincode_ek());
        assert_eq!(attested_data.cc_params, Some(cc_params));
        assert_eq!(attested_data.host_params, Some(HostParameters::default()));

        assert_eq!(
            evidence(&credentials).unwrap(),
            Evidence::Simulated {
                attestation: SIMULATED_ATTESTATION.to_string()
            }
        );
    }

    struct UnavailableAttestor;

    impl Attestor for UnavailableAttestor {
        type Error = String;

        fn evidence(
            &self,
            _params: &[u8],
            _user_data: impl crate::attestor::HasUserData,
        ) -> Result<Evidence, Self::Error> {
            Err("no attestation device".to_string())
        }
    }

    #[test]
    fn test_attestation_failure_is_reported() {
        let keys = EnclaveKeys::generate(&DefaultCsp).unwrap();
        let err = issue(
            &keys,
            CcParameters::default(),
            HostParameters::default(),
            &UnavailableAttestor,
            b"",
        )
        .unwrap_err();

        assert!(matches!(err, Error::Attestation(ref msg) if msg == "no attestation device"));
    }

    #[test]
    fn test_evidence_round_trips_through_credentials() {
        let evidence = Evidence::GramineDcap {
            attestation: "cXVvdGU=".to_string(),
        };
        let credentials = Credentials {
            attestation: evidence.to_bytes().unwrap(),
            serialized_attested_data: None,
        };
        assert_eq!(super::evidence(&credentials).unwrap(), evidence);
    }

    #[test]
    fn test_attested_data_requires_payload() {
        let err = attested_data(&Credentials::default()).unwrap_err();
        assert!(matches!(err, Error::MissingField(_)));
    }
}
