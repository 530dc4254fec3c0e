//! # JSON Object Signing and Encryption (JOSE)
//!
//! [JOSE] envelopes for Credentials based on JWT [RFC7519] and JWS [RFC7515].
//!
//! In the case of JOSE, the Credential is carried in the "payload". This is
//! preceded by a protected header naming the signing algorithm. Both are
//! base64url-encoded and concatenated with the (possibly empty) signature to
//! form the compact serialization:
//!
//! ```text
//! base64url(header) "." base64url(payload) "." base64url(signature)
//! ```
//!
//! An unsecured JWT declares the algorithm `none` and carries an empty
//! signature segment, so its compact form ends with a trailing `.`.
//!
//! [JOSE]: https://datatracker.ietf.org/wg/jose/about
//! [RFC7515]: https://www.rfc-editor.org/rfc/rfc7515
//! [RFC7519]: https://www.rfc-editor.org/rfc/rfc7519

pub mod jwa;
pub mod jws;
pub mod jwt;

pub use jwa::Algorithm;
pub use jws::{Jws, JwsBuilder, Protected};
pub use jwt::{Jwt, RegisteredClaims};
