use jsonwebtoken::Algorithm;
use serde::Deserialize;

use crate::error::Error;
use crate::error::Result;
use crate::keys::check_modulus_length;
use crate::keys::DEFAULT_MODULUS_LENGTH;
use crate::options::Audience;
use crate::options::SignOptions;
use crate::options::TimeSpan;
use crate::options::VerifyOptions;

/// Configuration for a token service
///
/// Holds the service's canonical sign and verify defaults, written once per
/// deployment and applied to every call.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TokenServiceConfig {
    /// RSA modulus length of the generated key pair (default: 2048)
    pub(crate) modulus_length: usize,
    /// Defaults merged under every create call
    pub(crate) sign_defaults: SignOptions,
    /// Defaults merged under every verify call
    pub(crate) verify_defaults: VerifyOptions,
}

const DEFAULT_LIFETIME_SECS: i64 = 600;

impl Default for TokenServiceConfig {
    fn default() -> Self {
        Self {
            modulus_length: DEFAULT_MODULUS_LENGTH,
            sign_defaults: SignOptions::new().algorithm(Algorithm::RS256),
            verify_defaults: VerifyOptions::new().algorithms(vec![Algorithm::RS256]),
        }
    }
}

impl TokenServiceConfig {
    /// Create a new configuration with the given issuer and a single audience
    ///
    /// Tokens are signed with RS256, carry the issuer and audience, and live ten
    /// minutes. Verification accepts only RS256 and requires the same issuer and audience.
    pub fn new(issuer: impl Into<String>, audience: impl Into<String>) -> Self {
        let issuer = issuer.into();
        let audience = Audience::Single(audience.into());
        let defaults = Self::default();

        Self {
            sign_defaults: defaults
                .sign_defaults
                .issuer(issuer.clone())
                .audience(audience.clone())
                .expires_in(DEFAULT_LIFETIME_SECS),
            verify_defaults: defaults.verify_defaults.issuer(issuer).audience(audience),
            ..defaults
        }
    }

    /// Create a new configuration with the given issuer and multiple audiences
    /// A verified token must carry at least one of them
    ///
    /// # Errors
    /// Returns `Error::NoAudiencesConfigured` if the audiences vector is empty
    pub fn new_with_audiences(issuer: impl Into<String>, audiences: Vec<String>) -> Result<Self> {
        Self::new(issuer, String::new()).with_audiences(audiences)
    }

    /// Set the audiences tokens are issued for and verified against
    ///
    /// # Errors
    /// Returns `Error::NoAudiencesConfigured` if the audiences vector is empty
    pub fn with_audiences(mut self, audiences: Vec<String>) -> Result<Self> {
        if audiences.is_empty() {
            return Err(Error::NoAudiencesConfigured);
        }

        let audience = Audience::Multiple(audiences);
        self.sign_defaults.audience = Some(audience.clone());
        self.verify_defaults.audience = Some(audience);
        Ok(self)
    }

    /// Set the subject on both sides
    pub fn with_subject(mut self, subject: impl Into<String>) -> Self {
        let subject = subject.into();
        self.sign_defaults.subject = Some(subject.clone());
        self.verify_defaults.subject = Some(subject);
        self
    }

    /// Set the token lifetime
    pub fn with_expires_in(mut self, span: impl Into<TimeSpan>) -> Self {
        self.sign_defaults.expires_in = Some(span.into());
        self
    }

    /// Set the RSA modulus length
    ///
    /// # Errors
    /// Returns `Error::KeyGeneration` below the minimum accepted modulus
    pub fn with_modulus_length(mut self, modulus_length: usize) -> Result<Self> {
        check_modulus_length(modulus_length)?;
        self.modulus_length = modulus_length;
        Ok(self)
    }

    /// Replace the sign defaults
    pub fn with_sign_defaults(mut self, defaults: SignOptions) -> Self {
        self.sign_defaults = defaults;
        self
    }

    /// Replace the verify defaults
    pub fn with_verify_defaults(mut self, defaults: VerifyOptions) -> Self {
        self.verify_defaults = defaults;
        self
    }

    pub fn modulus_length(&self) -> usize {
        self.modulus_length
    }

    pub fn sign_defaults(&self) -> &SignOptions {
        &self.sign_defaults
    }

    pub fn verify_defaults(&self) -> &VerifyOptions {
        &self.verify_defaults
    }
}
