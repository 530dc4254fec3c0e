//! # Test Utilities
//!
//! An in-memory Ed25519 keyring used to sign and proof check Credential JWTs
//! in tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{PoisonError, RwLock};

use anyhow::{Result, anyhow, bail};
use base64ct::{Base64UrlUnpadded, Encoding};
use credibil_vc_jwt::{Algorithm, Jws, ProofChecker, Signer};
use dashmap::DashMap;
use ed25519_dalek::{Signature, Signer as _, SigningKey, Verifier as _};
use rand::rngs::OsRng;

/// Issuer DID used by test keyrings.
pub const ISSUER_DID: &str = "did:example:76e12ec712ebc6f1c221ebfeb1f";

/// A v1.1 University Degree Credential.
pub const V1_VALID_CREDENTIAL: &str = r#"{
  "@context": [
    "https://www.w3.org/2018/credentials/v1",
    "https://www.w3.org/2018/credentials/examples/v1"
  ],
  "id": "http://example.edu/credentials/1872",
  "type": ["VerifiableCredential", "UniversityDegreeCredential"],
  "credentialSubject": {
    "id": "did:example:ebfeb1f712ebc6f1c276e12ec21",
    "degree": {
      "type": "BachelorDegree",
      "university": "MIT"
    },
    "name": "Jayden Doe",
    "spouse": "did:example:c276e12ec21ebfeb1f712ebc6f1"
  },
  "issuer": {
    "id": "did:example:76e12ec712ebc6f1c221ebfeb1f",
    "name": "Example University"
  },
  "issuanceDate": "2010-01-01T19:23:24Z",
  "expirationDate": "2020-01-01T19:23:24Z",
  "credentialStatus": {
    "id": "https://example.edu/status/24",
    "type": "CredentialStatusList2017"
  },
  "evidence": [{
    "id": "https://example.edu/evidence/f2aeec97-fc0d-42bf-8ca7-0548192d4231",
    "type": ["DocumentVerification"],
    "verifier": "https://example.edu/issuers/14",
    "evidenceDocument": "DriversLicense",
    "subjectPresence": "Physical",
    "documentPresence": "Physical"
  }],
  "termsOfUse": [{
    "type": "IssuerPolicy",
    "id": "http://example.com/policies/credential/4",
    "profile": "http://example.com/profiles/credential",
    "prohibition": [{
      "assigner": "https://example.edu/issuers/14",
      "assignee": "AllVerifiers",
      "target": "http://example.edu/credentials/3732",
      "action": ["Archival"]
    }]
  }],
  "refreshService": {
    "id": "https://example.edu/refresh/3732",
    "type": "ManualRefreshService2018"
  }
}"#;

/// A v2.0 Employment Credential with an array subject and no `id`.
pub const V2_CREDENTIAL: &str = r#"{
  "@context": [
    "https://www.w3.org/ns/credentials/v2",
    "https://www.w3.org/ns/credentials/examples/v2"
  ],
  "type": ["VerifiableCredential", "EmployeeIDCredential"],
  "issuer": "did:example:76e12ec712ebc6f1c221ebfeb1f",
  "validFrom": "2023-06-01T00:00:00Z",
  "validUntil": "2033-06-01T00:00:00Z",
  "credentialSubject": [{
    "id": "did:example:ebfeb1f712ebc6f1c276e12ec21",
    "employeeId": "A-123456",
    "jobTitle": "Software Engineer"
  }]
}"#;

/// Ed25519 keys for a single controller, addressed by key ID.
///
/// Signs with the active key and checks proofs against any key it holds, so
/// JWTs signed before a rotation still verify. Shared references can rotate
/// and revoke keys.
pub struct Keyring {
    controller: String,
    active: RwLock<String>,
    generation: AtomicUsize,
    keys: DashMap<String, SigningKey>,
}

impl Keyring {
    /// Create a keyring for `controller` holding one freshly generated key.
    #[must_use]
    pub fn new(controller: impl Into<String>) -> Self {
        let keys = DashMap::new();
        keys.insert("key-0".to_string(), SigningKey::generate(&mut OsRng));
        Self {
            controller: controller.into(),
            active: RwLock::new("key-0".to_string()),
            generation: AtomicUsize::new(1),
            keys,
        }
    }

    /// Generate a new active key. Previous keys are retained for verification.
    pub fn rotate(&self) {
        let key_id = format!("key-{}", self.generation.fetch_add(1, Ordering::Relaxed));
        self.keys.insert(key_id.clone(), SigningKey::generate(&mut OsRng));
        *self.active.write().unwrap_or_else(PoisonError::into_inner) = key_id;
    }

    /// Remove a key so that proofs made with it can no longer be checked.
    pub fn revoke(&self, key_id: &str) {
        self.keys.remove(key_id);
    }

    /// The active key's ID.
    #[must_use]
    pub fn active_key_id(&self) -> String {
        self.active.read().unwrap_or_else(PoisonError::into_inner).clone()
    }
}

impl Signer for Keyring {
    async fn try_sign(&self, msg: &[u8]) -> Result<Vec<u8>> {
        let key_id = self.active_key_id();
        let key = self.keys.get(&key_id).ok_or_else(|| anyhow!("active key not found: {key_id}"))?;
        Ok(key.sign(msg).to_bytes().to_vec())
    }

    fn algorithm(&self) -> Algorithm {
        Algorithm::EdDSA
    }

    async fn verification_method(&self) -> Result<String> {
        Ok(format!("{}#{}", self.controller, self.active_key_id()))
    }
}

impl ProofChecker for Keyring {
    async fn check(&self, jws: &Jws) -> Result<()> {
        let header = jws.header()?;
        if header.alg != Algorithm::EdDSA {
            bail!("unsupported algorithm: {}", header.alg);
        }

        let Some(kid) = header.kid else {
            bail!("missing key ID in JWS header");
        };
        let Some((controller, key_id)) = kid.split_once('#') else {
            bail!("key ID is not a DID URL: {kid}");
        };
        if controller != self.controller {
            bail!("unknown controller: {controller}");
        }

        let key = self.keys.get(key_id).ok_or_else(|| anyhow!("key not found: {key_id}"))?;
        let sig_bytes = Base64UrlUnpadded::decode_vec(&jws.signature)
            .map_err(|e| anyhow!("issue decoding signature: {e}"))?;
        let signature = Signature::from_slice(&sig_bytes)
            .map_err(|e| anyhow!("unable to build signature: {e}"))?;

        key.verifying_key()
            .verify(jws.signing_input().as_bytes(), &signature)
            .map_err(|e| anyhow!("unable to verify signature: {e}"))
    }
}
