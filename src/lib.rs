//! # Verifiable Credentials as JWTs
//!
//! This crate transcodes a Verifiable Credential into and out of the JWT
//! claims envelope, either secured (signed by a delegated [`Signer`]) or
//! unsecured (algorithm `none`, empty signature segment).
//!
//! ```text
//! Credential -> build_claims -> JwtClaims -> marshal_(un)secured -> compact JWT
//! compact JWT -> decode_credential_claims -> credential JSON bytes
//! ```
//!
//! Decoding rejects a structurally valid JWT whose `vc` claim is not a JSON
//! object, so the bytes handed to a credential parser are always an object.
//!
//! Signature verification is delegated to a [`ProofChecker`]; see
//! [`vc::parse_jwt`].

pub mod error;
pub mod jose;
pub mod vc;

pub use crate::error::{Error, Result};
pub use crate::jose::jwa::Algorithm;
pub use crate::jose::jws::Jws;
pub use crate::jose::jwt::Jwt;
pub use crate::vc::{
    ClaimsOptions, Credential, JwtClaims, ParseOptions, build_claims, decode_credential_claims,
    parse_jwt,
};

/// Signer is used by implementers to provide signing functionality for
/// secured Credential JWTs.
pub trait Signer: Send + Sync {
    /// `TrySign` signs the JWS Signing Input, returning the raw signature.
    fn try_sign(&self, msg: &[u8]) -> impl Future<Output = anyhow::Result<Vec<u8>>> + Send;

    /// Signature algorithm used by the signer.
    fn algorithm(&self) -> Algorithm;

    /// The verification method the verifier should use to verify the signer's
    /// signature. This is typically a DID URL + # + verification key ID.
    ///
    /// Async and fallible because the client may need to access key information
    /// to construct the method reference.
    fn verification_method(&self) -> impl Future<Output = anyhow::Result<String>> + Send;
}

/// `ProofChecker` verifies the signature of a secured Credential JWT.
///
/// Implementers resolve the key referenced by the header's `kid` and check
/// the signature over [`Jws::signing_input`].
pub trait ProofChecker: Send + Sync {
    /// Verify the JWS signature.
    fn check(&self, jws: &Jws) -> impl Future<Output = anyhow::Result<()>> + Send;
}
