//! # Credential JWT Claims
//!
//! Builds the JWT claims set carrying a Credential: registered claims derived
//! from the Credential's own fields, plus the Credential itself under the
//! reserved `vc` claim.
//!
//! | Claim | Credential field                        |
//! |-------|-----------------------------------------|
//! | `iss` | `issuer` or `issuer.id`                 |
//! | `sub` | `credentialSubject.id` (single subject) |
//! | `nbf` | `issuanceDate` / `validFrom`            |
//! | `iat` | `issuanceDate` / `validFrom`            |
//! | `exp` | `expirationDate` / `validUntil`         |
//! | `jti` | `id`                                    |

use chrono::{DateTime, SecondsFormat};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::jose::jws;
use crate::jose::jwt::RegisteredClaims;
use crate::vc::ClaimsOptions;
use crate::vc::credential::{self, Credential};
use crate::{Error, Result, Signer};

/// Claims set for a Credential carried as a JWT.
///
/// The `vc` slot is an unconstrained JSON value. Claims built from a
/// [`Credential`] always hold a JSON object there; claims received from
/// elsewhere must be checked (see [`crate::decode_credential_claims`]).
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
pub struct JwtClaims {
    /// Registered claims derived from the Credential.
    #[serde(flatten)]
    pub registered: RegisteredClaims,

    /// The Verifiable Credential.
    pub vc: Value,
}

impl JwtClaims {
    /// Encode and sign the claims, returning a compact JWT.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Serialization`] if the claims cannot be serialized and
    /// [`Error::Signing`] if the signer fails.
    pub async fn marshal_secured(&self, signer: &impl Signer) -> Result<String> {
        jws::encode(self, signer).await
    }

    /// Encode the claims as an unsecured compact JWT (`alg` is `none`, the
    /// signature segment is empty).
    ///
    /// # Errors
    ///
    /// Returns [`Error::Serialization`] if the claims cannot be serialized.
    pub fn marshal_unsecured(&self) -> Result<String> {
        jws::encode_unsecured(self)
    }
}

/// Build the JWT claims set for a Credential, embedding the full Credential
/// under `vc`.
///
/// # Errors
///
/// Returns [`Error::InvalidCredential`] if a field used for a registered claim
/// has the wrong shape.
pub fn build_claims(credential: &Credential) -> Result<JwtClaims> {
    credential.to_claims(&ClaimsOptions::default())
}

impl Credential {
    /// Transform the `Credential` into JWT claims.
    ///
    /// When `ClaimsOptions::minimize` is set, fields duplicated by registered
    /// claims are removed from the embedded Credential. They are restored when
    /// the JWT is decoded.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidCredential`] if a field used for a registered
    /// claim has the wrong shape.
    pub fn to_claims(&self, options: &ClaimsOptions) -> Result<JwtClaims> {
        tracing::debug!("build_claims");

        let nbf = self.valid_from()?.map(|dt| dt.timestamp());
        let registered = RegisteredClaims {
            iss: self.issuer()?.map(ToString::to_string),
            sub: self.subject_id()?.map(ToString::to_string),
            nbf,
            iat: nbf,
            exp: self.valid_until()?.map(|dt| dt.timestamp()),
            jti: self.id()?.map(ToString::to_string),
        };

        let mut vc = self.as_object().clone();
        if options.minimize {
            minimize(&mut vc, &registered);
        }

        Ok(JwtClaims {
            registered,
            vc: Value::Object(vc),
        })
    }
}

// Remove fields whose values are carried by registered claims.
fn minimize(vc: &mut Map<String, Value>, registered: &RegisteredClaims) {
    if registered.jti.is_some() {
        vc.remove("id");
    }
    if registered.iss.is_some() {
        match vc.get_mut("issuer") {
            Some(Value::Object(issuer)) => {
                issuer.remove("id");
            }
            Some(_) => {
                vc.remove("issuer");
            }
            None => {}
        }
    }
    if let Some(nbf) = registered.nbf {
        let key = credential::issuance_key(vc);
        remove_restorable_date(vc, key, nbf);
    }
    if let Some(exp) = registered.exp {
        let key = credential::expiration_key(vc);
        remove_restorable_date(vc, key, exp);
    }
    if registered.sub.is_some()
        && let Some(subject) = credential::single_subject_mut(vc)
    {
        subject.remove("id");
    }
}

// Dates are only removed when `refine` rebuilds the identical string: whole
// seconds, UTC, `Z` suffix. Anything else stays in the Credential.
fn remove_restorable_date(vc: &mut Map<String, Value>, key: &str, secs: i64) {
    let Ok(restored) = to_rfc3339(key, secs) else {
        return;
    };
    if vc.get(key).and_then(Value::as_str) == Some(restored.as_str()) {
        vc.remove(key);
    }
}

/// Restore Credential fields from registered claims where the embedded
/// Credential omits them.
///
/// # Errors
///
/// Returns [`Error::DecodeClaims`] if a date claim is out of range.
pub(crate) fn refine(vc: &mut Map<String, Value>, registered: &RegisteredClaims) -> Result<()> {
    if let Some(jti) = &registered.jti
        && !vc.contains_key("id")
    {
        vc.insert("id".into(), Value::String(jti.clone()));
    }

    if let Some(iss) = &registered.iss {
        match vc.get_mut("issuer") {
            None => {
                vc.insert("issuer".into(), Value::String(iss.clone()));
            }
            Some(Value::Object(issuer)) if !issuer.contains_key("id") => {
                issuer.insert("id".into(), Value::String(iss.clone()));
            }
            Some(_) => {}
        }
    }

    if let Some(nbf) = registered.nbf {
        let key = credential::issuance_key(vc);
        if !vc.contains_key(key) {
            vc.insert(key.into(), Value::String(to_rfc3339("nbf", nbf)?));
        }
    }

    if let Some(exp) = registered.exp {
        let key = credential::expiration_key(vc);
        if !vc.contains_key(key) {
            vc.insert(key.into(), Value::String(to_rfc3339("exp", exp)?));
        }
    }

    if let Some(sub) = &registered.sub
        && let Some(subject) = credential::single_subject_mut(vc)
        && !subject.contains_key("id")
    {
        subject.insert("id".into(), Value::String(sub.clone()));
    }

    Ok(())
}

fn to_rfc3339(claim: &str, secs: i64) -> Result<String> {
    let dt = DateTime::from_timestamp(secs, 0)
        .ok_or_else(|| Error::DecodeClaims(format!("`{claim}` is out of range")))?;
    Ok(dt.to_rfc3339_opts(SecondsFormat::Secs, true))
}

#[cfg(test)]
mod test {
    use serde_json::json;

    use super::*;

    fn university_degree() -> Credential {
        Credential::try_from(json!({
            "@context": [
                "https://www.w3.org/2018/credentials/v1",
                "https://www.w3.org/2018/credentials/examples/v1"
            ],
            "id": "http://example.edu/credentials/1872",
            "type": ["VerifiableCredential", "UniversityDegreeCredential"],
            "issuer": {"id": "did:example:76e12ec712ebc6f1c221ebfeb1f", "name": "Example University"},
            "issuanceDate": "2010-01-01T19:23:24Z",
            "expirationDate": "2020-01-01T19:23:24Z",
            "credentialSubject": {
                "id": "did:example:ebfeb1f712ebc6f1c276e12ec21",
                "degree": {"type": "BachelorDegree", "name": "Bachelor of Science and Arts"}
            }
        }))
        .expect("should be an object")
    }

    #[test]
    fn registered_claims() {
        let vc = university_degree();
        let claims = build_claims(&vc).expect("should build");

        assert_eq!(claims.registered.iss.as_deref(), Some("did:example:76e12ec712ebc6f1c221ebfeb1f"));
        assert_eq!(claims.registered.sub.as_deref(), Some("did:example:ebfeb1f712ebc6f1c276e12ec21"));
        assert_eq!(claims.registered.jti.as_deref(), Some("http://example.edu/credentials/1872"));
        assert_eq!(claims.registered.nbf, Some(1_262_373_804));
        assert_eq!(claims.registered.iat, Some(1_262_373_804));
        assert_eq!(claims.registered.exp, Some(1_577_906_604));
        assert_eq!(claims.vc, Value::Object(vc.into_object()));
    }

    #[test]
    fn absent_fields() {
        let vc = Credential::try_from(json!({"type": ["VerifiableCredential"]})).expect("should be an object");
        let claims = build_claims(&vc).expect("should build");
        assert_eq!(claims.registered, RegisteredClaims::default());

        let payload = serde_json::to_value(&claims).expect("should serialize");
        assert_eq!(payload, json!({"vc": {"type": ["VerifiableCredential"]}}));
    }

    #[test]
    fn invalid_field() {
        let vc = Credential::try_from(json!({"id": 1872})).expect("should be an object");
        let err = build_claims(&vc).expect_err("should fail");
        assert!(matches!(err, Error::InvalidCredential(_)));
    }

    #[test]
    fn minimize_then_refine() {
        let vc = university_degree();
        let claims = vc.to_claims(&ClaimsOptions::default().minimize(true)).expect("should build");

        let Value::Object(mut minimized) = claims.vc else {
            panic!("should be an object");
        };
        assert!(!minimized.contains_key("id"));
        assert!(!minimized.contains_key("issuanceDate"));
        assert!(!minimized.contains_key("expirationDate"));
        assert_eq!(minimized["issuer"], json!({"name": "Example University"}));
        assert!(minimized["credentialSubject"].get("id").is_none());

        refine(&mut minimized, &claims.registered).expect("should refine");
        assert_eq!(minimized, vc.into_object());
    }

    #[test]
    fn minimize_keeps_lossy_dates() {
        let vc = Credential::try_from(json!({
            "@context": ["https://www.w3.org/ns/credentials/v2"],
            "issuer": "did:example:123",
            "validFrom": "2010-01-01T19:23:24.5Z",
            "validUntil": "2030-01-01T00:00:00+01:00"
        }))
        .expect("should be an object");
        let claims = vc.to_claims(&ClaimsOptions::default().minimize(true)).expect("should build");
        assert_eq!(claims.registered.nbf, Some(1_262_373_804));
        assert_eq!(claims.registered.exp, Some(1_893_452_400));

        let Value::Object(mut minimized) = claims.vc else {
            panic!("should be an object");
        };
        assert!(!minimized.contains_key("issuer"));
        assert_eq!(minimized["validFrom"], "2010-01-01T19:23:24.5Z");
        assert_eq!(minimized["validUntil"], "2030-01-01T00:00:00+01:00");

        refine(&mut minimized, &claims.registered).expect("should refine");
        assert_eq!(minimized, vc.into_object());
    }

    #[test]
    fn refine_keeps_existing() {
        let vc = university_degree();
        let mut obj = vc.as_object().clone();
        let registered = RegisteredClaims {
            jti: Some("urn:uuid:other".into()),
            ..RegisteredClaims::default()
        };

        refine(&mut obj, &registered).expect("should refine");
        assert_eq!(&obj, vc.as_object());
    }
}
