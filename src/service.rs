use async_trait::async_trait;

use crate::claims::ClaimSet;
use crate::config::TokenServiceConfig;
use crate::error::Result;
use crate::factory::CreateToken;
use crate::factory::TokenCreator;
use crate::factory::TokenFactory;
use crate::factory::TokenVerifier;
use crate::factory::VerifyToken;
use crate::options::SignOptions;
use crate::options::VerifyOptions;

/// A service's token issuer and verifier, bound to its own fresh key pair
///
/// Built once at startup from a [`TokenServiceConfig`]; every call reuses the
/// configured defaults.
#[derive(Clone, Debug)]
pub struct TokenService {
    factory: TokenFactory,
    creator: TokenCreator,
    verifier: TokenVerifier,
}

impl TokenService {
    /// Create a new token service, generating its key pair on the blocking pool
    pub async fn new(config: TokenServiceConfig) -> Result<Self> {
        let factory = TokenFactory::generate_async(config.modulus_length).await?;

        Ok(Self::with_factory(factory, config))
    }

    /// Create a new token service with simple configuration
    ///
    /// This is a convenience constructor for [`TokenServiceConfig::new`].
    pub async fn with_issuer(
        issuer: impl Into<String>,
        audience: impl Into<String>,
    ) -> Result<Self> {
        Self::new(TokenServiceConfig::new(issuer, audience)).await
    }

    /// Build the service on an existing factory; `config.modulus_length` is ignored
    pub fn with_factory(factory: TokenFactory, config: TokenServiceConfig) -> Self {
        let creator = factory.create_token(config.sign_defaults);
        let verifier = factory.verify_token(config.verify_defaults);

        Self {
            factory,
            creator,
            verifier,
        }
    }

    pub fn public_key(&self) -> &str {
        self.factory.public_key()
    }

    pub fn factory(&self) -> &TokenFactory {
        &self.factory
    }

    pub fn creator(&self) -> &TokenCreator {
        &self.creator
    }

    pub fn verifier(&self) -> &TokenVerifier {
        &self.verifier
    }
}

#[async_trait]
impl CreateToken for TokenService {
    async fn create_with(&self, payload: &ClaimSet, overrides: &SignOptions) -> Result<String> {
        self.creator.create_with(payload, overrides).await
    }
}

#[async_trait]
impl VerifyToken for TokenService {
    async fn verify_with(&self, token: &str, overrides: &VerifyOptions) -> Result<ClaimSet> {
        self.verifier.verify_with(token, overrides).await
    }
}
