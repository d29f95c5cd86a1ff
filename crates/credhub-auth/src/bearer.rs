//! Bearer-token header extraction.
//!
//! An absent or malformed header is reported before any cryptographic
//! work is attempted, and is a distinct failure from signature or expiry
//! problems.

use credhub_core::error::AppError;
use credhub_core::result::AppResult;

/// Scheme prefix for bearer credentials.
const BEARER_PREFIX: &str = "Bearer ";

/// Extracts the token from an `Authorization` header value.
pub fn extract(header: Option<&str>) -> AppResult<&str> {
    let header =
        header.ok_or_else(|| AppError::missing_credential("Authentication required"))?;

    let token = header
        .strip_prefix(BEARER_PREFIX)
        .ok_or_else(|| AppError::malformed_credential("Authorization header must be a bearer token"))?;

    if token.is_empty() {
        return Err(AppError::malformed_credential(
            "Authorization header must be a bearer token",
        ));
    }

    Ok(token)
}

#[cfg(test)]
mod tests {
    use super::*;
    use credhub_core::ErrorKind;

    #[test]
    fn extracts_token_from_bearer_header() {
        assert_eq!(extract(Some("Bearer abc.def.ghi")).unwrap(), "abc.def.ghi");
    }

    #[test]
    fn missing_header_is_distinct_from_malformed() {
        assert_eq!(extract(None).unwrap_err().kind, ErrorKind::MissingCredential);
        assert_eq!(
            extract(Some("Basic dXNlcg==")).unwrap_err().kind,
            ErrorKind::MalformedCredential
        );
        assert_eq!(
            extract(Some("Bearer ")).unwrap_err().kind,
            ErrorKind::MalformedCredential
        );
    }
}
