//! # JSON Web Algorithms (JWA)
//!
//! Digital signature algorithm identifiers as registered in the IANA "JSON
//! Web Signature and Encryption Algorithms" registry ([RFC7518]).
//!
//! [RFC7518]: https://www.rfc-editor.org/rfc/rfc7518

use std::fmt::Display;

use serde::{Deserialize, Serialize};

/// The signing algorithm declared in a JWS protected header.
#[derive(Clone, Copy, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
pub enum Algorithm {
    /// Algorithm for the secp256k1 curve
    #[serde(rename = "ES256K")]
    Es256K,

    /// Algorithm for the Ed25519 curve
    #[default]
    #[serde(rename = "EdDSA")]
    EdDSA,

    /// No digital signature. Used for unsecured JWTs ([RFC7519 section 6]).
    ///
    /// [RFC7519 section 6]: https://www.rfc-editor.org/rfc/rfc7519#section-6
    #[serde(rename = "none")]
    None,
}

impl Algorithm {
    /// Returns `true` when the algorithm is the `none` sentinel.
    #[must_use]
    pub const fn is_none(self) -> bool {
        matches!(self, Self::None)
    }
}

impl Display for Algorithm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Es256K => write!(f, "ES256K"),
            Self::EdDSA => write!(f, "EdDSA"),
            Self::None => write!(f, "none"),
        }
    }
}
