//! # Credential JWT Decoding
//!
//! Decodes a compact JWT and validates its `vc` claim before any bytes are
//! handed to a Credential parser.
//!
//! The `vc` claim is untyped on the wire. It is decoded as a JSON value and
//! matched: only an object is accepted. A number, string, array, boolean, or
//! null is rejected with [`Error::DecodeClaims`].

use serde_json::{Map, Value};

use crate::jose::jws::Jws;
use crate::jose::jwt::RegisteredClaims;
use crate::vc::credential::{self, Credential};
use crate::vc::{ParseOptions, claims};
use crate::{Error, ProofChecker, Result};

/// Decode a compact JWT and return the embedded Credential as canonical
/// (JCS) JSON bytes.
///
/// The header is not interpreted and the signature is not verified.
///
/// # Errors
///
/// - [`Error::MalformedJwt`] if the input is not three `.`-separated segments,
///   or the payload is not base64url-encoded JSON object.
/// - [`Error::MissingCredentialClaim`] if the payload has no `vc` claim.
/// - [`Error::DecodeClaims`] if the `vc` claim is not a JSON object or a
///   registered claim has the wrong type.
pub fn decode_credential_claims(raw: &str) -> Result<Vec<u8>> {
    tracing::debug!("decode_credential_claims");

    let jws: Jws = raw.parse()?;
    let vc = credential_object(&jws)?;
    serde_json_canonicalizer::to_vec(&Value::Object(vc)).map_err(Error::Serialization)
}

/// Parse a Credential from a compact JWT, checking the JWT's proof unless
/// disabled in `options`.
///
/// # Errors
///
/// Returns [`Error::ProofCheck`] if proof checking is enabled and the JWT is
/// unsecured or fails the checker. Otherwise, returns the errors of
/// [`decode_credential_claims`].
pub async fn parse_jwt(
    raw: &str, options: &ParseOptions, checker: &impl ProofChecker,
) -> Result<Credential> {
    tracing::debug!("parse_jwt");

    let jws: Jws = raw.parse()?;

    if !options.disable_proof_check {
        if jws.is_unsecured() || jws.header()?.alg.is_none() {
            return Err(Error::ProofCheck("unsecured JWT cannot be proof checked".into()));
        }
        checker.check(&jws).await.map_err(|e| Error::ProofCheck(format!("{e:#}")))?;
    }

    Ok(Credential::from(credential_object(&jws)?))
}

// Extract and type-check the `vc` claim, restoring any fields carried only by
// registered claims.
fn credential_object(jws: &Jws) -> Result<Map<String, Value>> {
    let mut payload: Map<String, Value> = jws.claims()?;

    let mut vc = match payload.remove("vc") {
        None => return Err(Error::MissingCredentialClaim),
        Some(Value::Object(vc)) => vc,
        Some(other) => {
            return Err(Error::DecodeClaims(format!(
                "\"vc\" claim must be a JSON object, found {}",
                credential::json_kind(&other)
            )));
        }
    };

    let registered: RegisteredClaims = serde_json::from_value(Value::Object(payload))
        .map_err(|e| Error::DecodeClaims(format!("invalid registered claims: {e}")))?;
    claims::refine(&mut vc, &registered)?;

    Ok(vc)
}
