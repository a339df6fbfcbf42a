use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use jsonwebtoken::errors::ErrorKind;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Key generation failed: {0}")]
    KeyGeneration(String),
    #[error("Failed to sign the token: {0}")]
    Signing(String),
    #[error("The provided JWT has expired")]
    TokenExpired,
    #[error("The provided JWT is not active yet")]
    TokenNotActive,
    #[error("The provided JWT is malformed: {0}")]
    TokenMalformed(String),
    #[error("The signature of the provided JWT does not match the public key")]
    SignatureInvalid,
    #[error("The '{claim}' of the provided JWT does not satisfy the verification options")]
    ClaimMismatch { claim: String },
    #[error("'{0}' is not a valid time span")]
    InvalidTimeSpan(String),
    #[error("No token supplied in {0}")]
    MissingToken(&'static str),
    #[error(
        "No audiences configured - at least one expected audience must be configured for security"
    )]
    NoAudiencesConfigured,
}

impl Error {
    /// True for every outcome of a rejected verification
    pub fn is_verification_failure(&self) -> bool {
        matches!(
            self,
            Error::TokenExpired
                | Error::TokenNotActive
                | Error::TokenMalformed(_)
                | Error::SignatureInvalid
                | Error::ClaimMismatch { .. }
        )
    }
}

pub(crate) fn claim_mismatch(claim: impl Into<String>) -> Error {
    Error::ClaimMismatch {
        claim: claim.into(),
    }
}

pub(crate) fn signing_error(error: jsonwebtoken::errors::Error) -> Error {
    Error::Signing(error.to_string())
}

pub(crate) fn key_error(error: impl std::fmt::Display) -> Error {
    Error::KeyGeneration(error.to_string())
}

/// Translate a `jsonwebtoken` decode failure into a distinct verification outcome
pub(crate) fn verification_error(error: jsonwebtoken::errors::Error, token: &str) -> Error {
    match error.kind() {
        ErrorKind::ExpiredSignature => Error::TokenExpired,
        ErrorKind::ImmatureSignature => Error::TokenNotActive,
        ErrorKind::InvalidSignature => Error::SignatureInvalid,
        ErrorKind::InvalidIssuer => claim_mismatch("iss"),
        ErrorKind::InvalidAudience => claim_mismatch("aud"),
        ErrorKind::InvalidSubject => claim_mismatch("sub"),
        ErrorKind::InvalidAlgorithm | ErrorKind::MissingAlgorithm => claim_mismatch("alg"),
        ErrorKind::MissingRequiredClaim(claim) => claim_mismatch(claim.as_str()),
        // Header and payload decoded, so the base64 failure is in the signature segment
        ErrorKind::Base64(_) if signed_parts_decode(token) => Error::SignatureInvalid,
        _ => Error::TokenMalformed(error.to_string()),
    }
}

fn signed_parts_decode(token: &str) -> bool {
    let parts: Vec<&str> = token.split('.').collect();

    if parts.len() != 3 {
        return false;
    }

    parts[..2]
        .iter()
        .all(|part| URL_SAFE_NO_PAD.decode(part).is_ok())
}
