//! # Errors
//!
//! Every failure in this crate is returned to the caller as an [`Error`].
//! Nothing is recovered locally and no partial result is produced: decoding
//! either yields the full credential or an error.

use thiserror::Error;

/// Maximum number of characters of offending input echoed back in a
/// [`Error::MalformedJwt`] message.
const MAX_ECHO: usize = 128;

/// Result type for credential JWT operations.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Errors returned when building, encoding, or decoding credential JWTs.
#[derive(Error, Debug)]
pub enum Error {
    /// The claims set, or the credential embedded in it, could not be
    /// rendered as JSON.
    #[error("serialize JWT claims: {0}")]
    Serialization(#[source] serde_json::Error),

    /// The delegated signer failed.
    #[error("sign JWT: {0}")]
    Signing(String),

    /// The input is not a compact JWT, or one of its segments could not be
    /// decoded.
    #[error("malformed JWT ({reason}): {input}")]
    MalformedJwt {
        /// What failed.
        reason: String,

        /// The offending input, truncated when long.
        input: String,
    },

    /// The payload is well-formed but carries no `vc` claim.
    #[error("missing \"vc\" claim in JWT payload")]
    MissingCredentialClaim,

    /// The `vc` claim is present but is not a JSON object.
    #[error("decode JWT claims from payload: {0}")]
    DecodeClaims(String),

    /// The credential document has a field of the wrong shape.
    #[error("invalid credential: {0}")]
    InvalidCredential(String),

    /// The proof checker rejected the JWT.
    #[error("check JWT proof: {0}")]
    ProofCheck(String),
}

impl Error {
    /// Construct a [`Error::MalformedJwt`], echoing (a truncated form of) the
    /// input that failed.
    pub(crate) fn malformed(reason: impl Into<String>, input: &str) -> Self {
        let input = if input.chars().count() > MAX_ECHO {
            let head: String = input.chars().take(MAX_ECHO).collect();
            format!("{head}...")
        } else {
            input.to_string()
        };
        Self::MalformedJwt {
            reason: reason.into(),
            input,
        }
    }
}
