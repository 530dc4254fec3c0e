//! # Verifiable Credentials
//!
//! Transcodes a Credential into the JWT claims envelope and back again.

mod claims;
pub mod credential;
mod decode;

pub use claims::{JwtClaims, build_claims};
pub use credential::Credential;
pub use decode::{decode_credential_claims, parse_jwt};

/// Options applied when building JWT claims from a Credential.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ClaimsOptions {
    /// Remove Credential fields duplicated by registered claims (`id`,
    /// `issuer`, the validity dates, and `credentialSubject.id`).
    pub minimize: bool,
}

impl ClaimsOptions {
    /// Set whether the embedded Credential is minimized.
    #[must_use]
    pub const fn minimize(mut self, minimize: bool) -> Self {
        self.minimize = minimize;
        self
    }
}

/// Options applied when parsing a Credential from a JWT.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ParseOptions {
    /// Skip JWT proof checking. Intended for test fixtures and
    /// pre-validated data.
    pub disable_proof_check: bool,
}

impl ParseOptions {
    /// Disable JWT proof checking.
    #[must_use]
    pub const fn disable_proof_check(mut self) -> Self {
        self.disable_proof_check = true;
        self
    }
}
