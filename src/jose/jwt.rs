//! # JSON Web Token (JWT)
//!
//! JSON Web Token (JWT) is a compact, URL-safe means of representing
//! claims to be transferred between two parties.  The claims in a JWT
//! are encoded as a JSON object that is used as the payload of a JSON
//! Web Signature (JWS) structure, enabling the claims to be digitally
//! signed, or left unsecured when the algorithm is `none`.

use serde::{Deserialize, Serialize};

use crate::jose::jws::Protected;

/// Represents a decoded JWT.
#[derive(Clone, Debug, Default, Serialize, PartialEq, Eq)]
pub struct Jwt<T> {
    /// The JWT header.
    pub header: Protected,

    /// The JWT claims.
    pub claims: T,
}

/// Registered claim names ([RFC7519 section 4.1]) used when carrying a
/// Credential.
///
/// Dates are `NumericDate` values: seconds since the Unix epoch. Fractional
/// seconds are accepted when deserializing and truncated to whole seconds.
///
/// [RFC7519 section 4.1]: https://www.rfc-editor.org/rfc/rfc7519#section-4.1
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct RegisteredClaims {
    /// Issuer of the JWT.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub iss: Option<String>,

    /// Subject of the JWT.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sub: Option<String>,

    /// Time before which the JWT must not be accepted.
    #[serde(default, deserialize_with = "numeric_date::deserialize")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nbf: Option<i64>,

    /// Time at which the JWT was issued.
    #[serde(default, deserialize_with = "numeric_date::deserialize")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub iat: Option<i64>,

    /// Time on or after which the JWT must not be accepted.
    #[serde(default, deserialize_with = "numeric_date::deserialize")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exp: Option<i64>,

    /// Unique identifier for the JWT.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub jti: Option<String>,
}

mod numeric_date {
    use serde::de::{Deserialize, Deserializer, Error};
    use serde_json::Number;

    // Any JSON number, truncated toward zero.
    #[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let Some(number) = Option::<Number>::deserialize(deserializer)? else {
            return Ok(None);
        };
        if let Some(secs) = number.as_i64() {
            return Ok(Some(secs));
        }

        let secs = number.as_f64().map(f64::trunc).unwrap_or(f64::NAN);
        if !secs.is_finite() || secs < i64::MIN as f64 || secs >= i64::MAX as f64 {
            return Err(D::Error::custom(format!("NumericDate out of range: {number}")));
        }
        Ok(Some(secs as i64))
    }
}
