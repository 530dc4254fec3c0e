//! # Credential Document
//!
//! A Verifiable Credential held as an opaque JSON object. Only the fields
//! that populate JWT registered claims are interpreted: `id`, `issuer`,
//! `credentialSubject.id`, and the validity window.
//!
//! Both data model versions are recognized. A credential whose `@context`
//! includes [`CONTEXT_V2`] uses `validFrom`/`validUntil`; otherwise
//! `issuanceDate`/`expirationDate` are used.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::{Error, Result};

/// The base context of the Verifiable Credentials Data Model v2.0.
pub const CONTEXT_V2: &str = "https://www.w3.org/ns/credentials/v2";

/// A Verifiable Credential document.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct Credential(Map<String, Value>);

impl Credential {
    /// Parse a credential from JSON bytes.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidCredential`] if the bytes are not a JSON object.
    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        match serde_json::from_slice(bytes) {
            Ok(Value::Object(obj)) => Ok(Self(obj)),
            Ok(other) => Err(Error::InvalidCredential(format!(
                "expected a JSON object, found {}",
                json_kind(&other)
            ))),
            Err(e) => Err(Error::InvalidCredential(format!("issue deserializing credential: {e}"))),
        }
    }

    /// Serialize the credential to JSON bytes.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Serialization`] if the credential cannot be serialized.
    pub fn to_vec(&self) -> Result<Vec<u8>> {
        serde_json::to_vec(&self.0).map_err(Error::Serialization)
    }

    /// The credential as a JSON object.
    #[must_use]
    pub const fn as_object(&self) -> &Map<String, Value> {
        &self.0
    }

    /// Consume the credential, returning the underlying JSON object.
    #[must_use]
    pub fn into_object(self) -> Map<String, Value> {
        self.0
    }

    /// The credential's `id`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidCredential`] if `id` is not a string.
    pub fn id(&self) -> Result<Option<&str>> {
        optional_str(&self.0, "id")
    }

    /// The issuer identifier: `issuer` when a string, `issuer.id` when an
    /// object.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidCredential`] if `issuer` is neither a string nor
    /// an object, or `issuer.id` is not a string.
    pub fn issuer(&self) -> Result<Option<&str>> {
        match self.0.get("issuer") {
            None => Ok(None),
            Some(Value::String(id)) => Ok(Some(id)),
            Some(Value::Object(issuer)) => optional_str(issuer, "id"),
            Some(other) => Err(Error::InvalidCredential(format!(
                "`issuer` must be a string or object, found {}",
                json_kind(other)
            ))),
        }
    }

    /// The `id` of the credential subject, when there is exactly one subject.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidCredential`] if the subject's `id` is not a
    /// string.
    pub fn subject_id(&self) -> Result<Option<&str>> {
        match single_subject(&self.0) {
            Some(subject) => optional_str(subject, "id"),
            None => Ok(None),
        }
    }

    /// Returns `true` when the credential uses the v2.0 data model.
    #[must_use]
    pub fn is_v2(&self) -> bool {
        is_v2(&self.0)
    }

    /// The start of the validity period.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidCredential`] if the date is not an RFC 3339
    /// string.
    pub fn valid_from(&self) -> Result<Option<DateTime<Utc>>> {
        optional_date(&self.0, issuance_key(&self.0))
    }

    /// The end of the validity period.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidCredential`] if the date is not an RFC 3339
    /// string.
    pub fn valid_until(&self) -> Result<Option<DateTime<Utc>>> {
        optional_date(&self.0, expiration_key(&self.0))
    }
}

impl From<Map<String, Value>> for Credential {
    fn from(obj: Map<String, Value>) -> Self {
        Self(obj)
    }
}

impl TryFrom<Value> for Credential {
    type Error = Error;

    fn try_from(value: Value) -> Result<Self> {
        match value {
            Value::Object(obj) => Ok(Self(obj)),
            other => Err(Error::InvalidCredential(format!(
                "expected a JSON object, found {}",
                json_kind(&other)
            ))),
        }
    }
}

pub(crate) fn is_v2(obj: &Map<String, Value>) -> bool {
    match obj.get("@context") {
        Some(Value::String(ctx)) => ctx == CONTEXT_V2,
        Some(Value::Array(ctxs)) => ctxs.iter().any(|c| c.as_str() == Some(CONTEXT_V2)),
        _ => false,
    }
}

pub(crate) fn issuance_key(obj: &Map<String, Value>) -> &'static str {
    if is_v2(obj) { "validFrom" } else { "issuanceDate" }
}

pub(crate) fn expiration_key(obj: &Map<String, Value>) -> &'static str {
    if is_v2(obj) { "validUntil" } else { "expirationDate" }
}

// An object subject, or the only element of a subject array.
pub(crate) fn single_subject(obj: &Map<String, Value>) -> Option<&Map<String, Value>> {
    match obj.get("credentialSubject")? {
        Value::Object(subject) => Some(subject),
        Value::Array(subjects) if subjects.len() == 1 => subjects[0].as_object(),
        _ => None,
    }
}

pub(crate) fn single_subject_mut(obj: &mut Map<String, Value>) -> Option<&mut Map<String, Value>> {
    match obj.get_mut("credentialSubject")? {
        Value::Object(subject) => Some(subject),
        Value::Array(subjects) if subjects.len() == 1 => subjects[0].as_object_mut(),
        _ => None,
    }
}

pub(crate) const fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn optional_str<'a>(obj: &'a Map<String, Value>, key: &str) -> Result<Option<&'a str>> {
    match obj.get(key) {
        None => Ok(None),
        Some(Value::String(s)) => Ok(Some(s)),
        Some(other) => Err(Error::InvalidCredential(format!(
            "`{key}` must be a string, found {}",
            json_kind(other)
        ))),
    }
}

fn optional_date(obj: &Map<String, Value>, key: &str) -> Result<Option<DateTime<Utc>>> {
    let Some(date) = optional_str(obj, key)? else {
        return Ok(None);
    };
    let date = DateTime::parse_from_rfc3339(date)
        .map_err(|e| Error::InvalidCredential(format!("`{key}` is not an RFC 3339 date: {e}")))?;
    Ok(Some(date.with_timezone(&Utc)))
}

#[cfg(test)]
mod test {
    use serde_json::json;

    use super::*;

    fn credential(value: Value) -> Credential {
        Credential::try_from(value).expect("should be an object")
    }

    #[test]
    fn issuer_forms() {
        let vc = credential(json!({"issuer": "did:example:76e12ec712ebc6f1c221ebfeb1f"}));
        assert_eq!(vc.issuer().expect("should read"), Some("did:example:76e12ec712ebc6f1c221ebfeb1f"));

        let vc = credential(json!({"issuer": {"id": "did:example:123", "name": "Example University"}}));
        assert_eq!(vc.issuer().expect("should read"), Some("did:example:123"));

        let vc = credential(json!({"issuer": 42}));
        assert!(matches!(vc.issuer(), Err(Error::InvalidCredential(_))));
    }

    #[test]
    fn subject_forms() {
        let vc = credential(json!({"credentialSubject": {"id": "did:example:abc"}}));
        assert_eq!(vc.subject_id().expect("should read"), Some("did:example:abc"));

        let vc = credential(json!({"credentialSubject": [{"id": "did:example:abc"}]}));
        assert_eq!(vc.subject_id().expect("should read"), Some("did:example:abc"));

        let vc = credential(json!({"credentialSubject": [{"id": "a"}, {"id": "b"}]}));
        assert_eq!(vc.subject_id().expect("should read"), None);
    }

    #[test]
    fn validity_by_version() {
        let v1 = credential(json!({
            "@context": ["https://www.w3.org/2018/credentials/v1"],
            "issuanceDate": "2010-01-01T19:23:24Z",
            "validFrom": "2020-01-01T00:00:00Z"
        }));
        let from = v1.valid_from().expect("should parse").expect("should be present");
        assert_eq!(from.timestamp(), 1_262_373_804);

        let v2 = credential(json!({
            "@context": [CONTEXT_V2],
            "issuanceDate": "2010-01-01T19:23:24Z",
            "validFrom": "2020-01-01T00:00:00Z",
            "validUntil": "2030-01-01T00:00:00+01:00"
        }));
        assert!(v2.is_v2());
        let from = v2.valid_from().expect("should parse").expect("should be present");
        assert_eq!(from.timestamp(), 1_577_836_800);
        let until = v2.valid_until().expect("should parse").expect("should be present");
        assert_eq!(until.timestamp(), 1_893_452_400);
    }

    #[test]
    fn bad_date() {
        let vc = credential(json!({"issuanceDate": "yesterday"}));
        assert!(matches!(vc.valid_from(), Err(Error::InvalidCredential(_))));
    }

    #[test]
    fn not_an_object() {
        let err = Credential::from_slice(b"[1, 2]").expect_err("should fail");
        assert!(err.to_string().contains("found array"));
    }
}
