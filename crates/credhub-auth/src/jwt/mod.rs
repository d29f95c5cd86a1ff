//! Credential encoding, verification, and claims.

pub mod claims;
pub mod issuer;
pub mod verifier;

pub use claims::{Claims, Role};
pub use issuer::{IssuedToken, TokenIssuer};
pub use verifier::TokenVerifier;
