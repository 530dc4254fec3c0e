//! # JSON Web Signature (JWS)
//!
//! JWS ([RFC7515]) represents content secured with digital signatures using
//! JSON-based data structures. Cryptographic algorithms and identifiers for use
//! with this specification are described in the JWA ([RFC7518]) specification.
//!
//! Only the compact serialization is supported. Signature verification is not
//! performed here: see [`crate::ProofChecker`].
//!
//! [RFC7515]: https://www.rfc-editor.org/rfc/rfc7515
//! [RFC7518]: https://www.rfc-editor.org/rfc/rfc7518

use std::fmt::{self, Display};
use std::str::FromStr;

use base64ct::{Base64UrlUnpadded, Encoding};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::jose::jwa::Algorithm;
use crate::jose::jwt::Jwt;
use crate::{Error, Result, Signer};

/// Encode the provided claims payload and sign, returning a JWT in compact
/// JWS form.
///
/// # Errors
///
/// Returns [`Error::Serialization`] if the header or payload cannot be
/// serialized, and [`Error::Signing`] if the signer fails.
pub async fn encode<T>(payload: &T, signer: &impl Signer) -> Result<String>
where
    T: Serialize + Send + Sync,
{
    tracing::debug!("encode");

    let jws = JwsBuilder::new().payload(payload).add_signer(signer).build().await?;
    Ok(jws.to_string())
}

/// Encode the provided claims payload as an unsecured JWT: the header declares
/// the `none` algorithm and the signature segment is empty.
///
/// # Errors
///
/// Returns [`Error::Serialization`] if the payload cannot be serialized.
pub fn encode_unsecured<T: Serialize>(payload: &T) -> Result<String> {
    tracing::debug!("encode_unsecured");

    let protected = Protected {
        alg: Algorithm::None,
        ..Protected::default()
    };

    Ok(Jws {
        protected: encode_json(&protected)?,
        payload: encode_json(payload)?,
        signature: String::new(),
    }
    .to_string())
}

/// Decode the compact JWT and return its header and claims.
///
/// The signature is NOT verified.
///
/// # Errors
///
/// Returns [`Error::MalformedJwt`] if the token is not a compact JWS or its
/// header or payload cannot be decoded into the requested type.
pub fn decode<T: DeserializeOwned>(compact_jws: &str) -> Result<Jwt<T>> {
    tracing::debug!("decode");

    let jws: Jws = compact_jws.parse()?;
    Ok(Jwt {
        header: jws.header()?,
        claims: jws.claims()?,
    })
}

/// A JWS in compact serialization, held as its three base64url segments.
///
/// Segments are decoded on demand so that a caller interested only in the
/// payload does not depend on the header's content.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Jws {
    /// The base64url-encoded protected header.
    pub protected: String,

    /// The base64url-encoded payload.
    pub payload: String,

    /// The base64url-encoded signature. Empty for an unsecured JWS.
    pub signature: String,
}

impl Jws {
    /// Decode the protected header.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MalformedJwt`] if the header is not base64url-encoded
    /// JSON describing a known algorithm.
    pub fn header(&self) -> Result<Protected> {
        let decoded = Base64UrlUnpadded::decode_vec(&self.protected)
            .map_err(|e| Error::malformed(format!("issue decoding header: {e}"), &self.protected))?;
        serde_json::from_slice(&decoded)
            .map_err(|e| Error::malformed(format!("issue deserializing header: {e}"), &self.protected))
    }

    /// Decode the payload into raw bytes.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MalformedJwt`] if the payload is not base64url-encoded.
    pub fn payload_bytes(&self) -> Result<Vec<u8>> {
        Base64UrlUnpadded::decode_vec(&self.payload)
            .map_err(|e| Error::malformed(format!("issue decoding payload: {e}"), &self.payload))
    }

    /// Decode and deserialize the payload.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MalformedJwt`] if the payload cannot be decoded into
    /// `T`.
    pub fn claims<T: DeserializeOwned>(&self) -> Result<T> {
        let decoded = self.payload_bytes()?;
        serde_json::from_slice(&decoded)
            .map_err(|e| Error::malformed(format!("issue deserializing claims: {e}"), &self.payload))
    }

    /// Decode the signature into raw bytes.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MalformedJwt`] if the signature is not
    /// base64url-encoded.
    pub fn signature_bytes(&self) -> Result<Vec<u8>> {
        Base64UrlUnpadded::decode_vec(&self.signature)
            .map_err(|e| Error::malformed(format!("issue decoding signature: {e}"), &self.signature))
    }

    /// The JWS Signing Input: `header "." payload`.
    #[must_use]
    pub fn signing_input(&self) -> String {
        format!("{}.{}", self.protected, self.payload)
    }

    /// Returns `true` when the JWS carries no signature.
    #[must_use]
    pub const fn is_unsecured(&self) -> bool {
        self.signature.is_empty()
    }
}

impl FromStr for Jws {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let parts = s.split('.').collect::<Vec<&str>>();
        let [protected, payload, signature] = parts.as_slice() else {
            return Err(Error::malformed(
                format!("expected 3 segments, found {}", parts.len()),
                s,
            ));
        };
        if protected.is_empty() {
            return Err(Error::malformed("empty header segment", s));
        }
        if payload.is_empty() {
            return Err(Error::malformed("empty payload segment", s));
        }

        Ok(Self {
            protected: (*protected).to_string(),
            payload: (*payload).to_string(),
            signature: (*signature).to_string(),
        })
    }
}

impl Display for Jws {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.protected, self.payload, self.signature)
    }
}

/// JWS protected header.
///
/// N.B. The following headers are not included as they are unnecessary
/// for carrying Credentials: `jku`, `jwk`, `x5u`, `x5c`, `x5t`, `x5t#S256`,
/// `cty`, `crit`.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Protected {
    /// Digital signature algorithm identifier as per IANA "JSON Web Signature
    /// and Encryption Algorithms" registry.
    pub alg: Algorithm,

    /// Used to declare the media type [IANA.MediaTypes] of the JWS.
    ///
    /// [IANA.MediaTypes]: (http://www.iana.org/assignments/media-types)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub typ: Option<String>,

    /// Identifies the key used to sign the JWS. When the Credential issuer is
    /// a DID, this is a DID URL referencing a verification method.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kid: Option<String>,
}

/// Builds and signs a [`Jws`].
#[derive(Clone, Debug, Default)]
pub struct JwsBuilder<P, S> {
    jwt_type: String,
    payload: P,
    signer: S,
}

#[doc(hidden)]
/// Typestate generic for a JWS builder with no payload.
pub struct NoPayload;
#[doc(hidden)]
/// Typestate generic for a JWS builder with a payload.
pub struct Payload<T: Serialize + Send>(T);

#[doc(hidden)]
/// Typestate generic for a JWS builder with no signer.
pub struct NoSigner;
#[doc(hidden)]
/// Typestate generic for a JWS builder with a signer.
pub struct WithSigner<'a, S: Signer>(&'a S);

impl JwsBuilder<NoPayload, NoSigner> {
    /// Returns a new [`JwsBuilder`].
    #[must_use]
    pub fn new() -> Self {
        Self {
            jwt_type: "JWT".into(),
            payload: NoPayload,
            signer: NoSigner,
        }
    }

    /// Set the payload to be signed.
    #[must_use]
    pub fn payload<T: Serialize + Send>(self, payload: T) -> JwsBuilder<Payload<T>, NoSigner> {
        JwsBuilder {
            jwt_type: self.jwt_type,
            payload: Payload(payload),
            signer: NoSigner,
        }
    }
}

impl<P, S> JwsBuilder<P, S> {
    /// Specify JWT `typ` header.
    #[must_use]
    pub fn jwt_type(mut self, jwt_type: impl Into<String>) -> Self {
        self.jwt_type = jwt_type.into();
        self
    }

    /// Capture the signer for use in the final build step.
    #[must_use]
    pub fn add_signer<T: Signer>(self, signer: &T) -> JwsBuilder<P, WithSigner<'_, T>> {
        JwsBuilder {
            jwt_type: self.jwt_type,
            payload: self.payload,
            signer: WithSigner(signer),
        }
    }
}

impl<T, S> JwsBuilder<Payload<T>, WithSigner<'_, S>>
where
    T: Serialize + Send,
    S: Signer,
{
    /// Generate the JWS.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Serialization`] if the header or payload cannot be
    /// serialized, and [`Error::Signing`] if the signer fails to provide its
    /// verification method or a signature.
    pub async fn build(self) -> Result<Jws> {
        let signer = self.signer.0;

        let kid = signer.verification_method().await.map_err(|e| Error::Signing(format!("{e:#}")))?;
        let protected = Protected {
            alg: signer.algorithm(),
            typ: Some(self.jwt_type),
            kid: Some(kid),
        };

        let header = encode_json(&protected)?;
        let payload = encode_json(&self.payload.0)?;
        let sig = signer
            .try_sign(format!("{header}.{payload}").as_bytes())
            .await
            .map_err(|e| Error::Signing(format!("{e:#}")))?;

        Ok(Jws {
            protected: header,
            payload,
            signature: Base64UrlUnpadded::encode_string(&sig),
        })
    }
}

// Serialize to JSON and base64url-encode.
fn encode_json<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    let bytes = serde_json::to_vec(value).map_err(Error::Serialization)?;
    Ok(Base64UrlUnpadded::encode_string(&bytes))
}

#[cfg(test)]
mod test {
    use std::collections::BTreeMap;

    use anyhow::anyhow;
    use serde_json::{Value, json};

    use super::*;

    struct MockSigner {
        fail: bool,
    }

    impl Signer for MockSigner {
        async fn try_sign(&self, msg: &[u8]) -> anyhow::Result<Vec<u8>> {
            if self.fail {
                return Err(anyhow!("key unavailable"));
            }
            Ok(msg.iter().rev().copied().collect())
        }

        fn algorithm(&self) -> Algorithm {
            Algorithm::EdDSA
        }

        async fn verification_method(&self) -> anyhow::Result<String> {
            Ok("did:example:123#key-0".to_string())
        }
    }

    #[test]
    fn unsecured_header() {
        let token = encode_unsecured(&json!({"iss": "did:example:123"})).expect("should encode");
        assert!(token.ends_with('.'));

        let jws: Jws = token.parse().expect("should parse");
        assert!(jws.is_unsecured());

        let header = Base64UrlUnpadded::decode_vec(&jws.protected).expect("should decode");
        let header: Value = serde_json::from_slice(&header).expect("should deserialize");
        assert_eq!(header, json!({"alg": "none"}));
    }

    #[tokio::test]
    async fn secured_round_trip() {
        let signer = MockSigner { fail: false };
        let token = encode(&json!({"iss": "did:example:123"}), &signer).await.expect("should encode");

        let jwt: Jwt<Value> = decode(&token).expect("should decode");
        assert_eq!(jwt.header.alg, Algorithm::EdDSA);
        assert_eq!(jwt.header.typ.as_deref(), Some("JWT"));
        assert_eq!(jwt.header.kid.as_deref(), Some("did:example:123#key-0"));
        assert_eq!(jwt.claims, json!({"iss": "did:example:123"}));

        let jws: Jws = token.parse().expect("should parse");
        let expected: Vec<u8> = jws.signing_input().bytes().rev().collect();
        assert_eq!(jws.signature_bytes().expect("should decode"), expected);
    }

    #[tokio::test]
    async fn custom_type_header() {
        let signer = MockSigner { fail: false };
        let jws = JwsBuilder::new()
            .payload(json!({"iss": "did:example:123"}))
            .jwt_type("vc+jwt")
            .add_signer(&signer)
            .build()
            .await
            .expect("should build");

        let header = jws.header().expect("should decode header");
        assert_eq!(header.typ.as_deref(), Some("vc+jwt"));
        assert_eq!(header.kid.as_deref(), Some("did:example:123#key-0"));
    }

    #[test]
    fn es256k_header() {
        let protected = Protected {
            alg: Algorithm::Es256K,
            typ: Some("JWT".into()),
            kid: Some("did:example:123#key-1".into()),
        };
        let jws = Jws {
            protected: encode_json(&protected).expect("should encode"),
            payload: encode_json(&json!({})).expect("should encode"),
            signature: "c2ln".into(),
        };

        let parsed: Jws = jws.to_string().parse().expect("should parse");
        assert_eq!(parsed.header().expect("should decode header"), protected);
    }

    #[tokio::test]
    async fn signer_failure() {
        let signer = MockSigner { fail: true };
        let err = encode(&json!({}), &signer).await.expect_err("should fail");
        assert!(matches!(err, Error::Signing(_)));
        assert!(err.to_string().contains("key unavailable"));
    }

    #[test]
    fn unserializable_payload() {
        // JSON object keys must be strings
        let mut payload = BTreeMap::new();
        payload.insert(vec![1u8, 2], 3);

        let err = encode_unsecured(&payload).expect_err("should fail");
        assert!(matches!(err, Error::Serialization(_)));
    }

    #[test]
    fn segment_count() {
        for input in ["parse JWT", "a.b", "a.b.c.d", ".b.c", "a..c"] {
            let err = input.parse::<Jws>().expect_err("should fail");
            assert!(matches!(err, Error::MalformedJwt { .. }));
            assert!(err.to_string().contains(input));
        }
    }

    #[test]
    fn corrupt_header() {
        let jws: Jws = "bm90IGpzb24.e30.".parse().expect("should parse");
        let err = jws.header().expect_err("should fail");
        assert!(err.to_string().contains("issue deserializing header"));
    }
}
