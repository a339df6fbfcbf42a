use std::sync::Arc;

use async_trait::async_trait;
use jsonwebtoken::DecodingKey;
use jsonwebtoken::EncodingKey;

use crate::claims::ClaimSet;
use crate::codec;
use crate::error::Result;
use crate::keys::KeyPair;
use crate::options::Merge;
use crate::options::SignOptions;
use crate::options::VerifyOptions;

/// Trait for token creation
#[async_trait]
pub trait CreateToken: Sync {
    /// Sign `payload` with the bound defaults shallow-merged with `overrides`
    async fn create_with(&self, payload: &ClaimSet, overrides: &SignOptions) -> Result<String>;

    /// Sign `payload` with the bound defaults
    async fn create(&self, payload: &ClaimSet) -> Result<String> {
        self.create_with(payload, &SignOptions::default()).await
    }
}

/// Trait for token verification
#[async_trait]
pub trait VerifyToken: Sync {
    /// Verify `token` against the bound defaults shallow-merged with `overrides`
    async fn verify_with(&self, token: &str, overrides: &VerifyOptions) -> Result<ClaimSet>;

    /// Verify `token` against the bound defaults
    async fn verify(&self, token: &str) -> Result<ClaimSet> {
        self.verify_with(token, &VerifyOptions::default()).await
    }
}

/// Owner of one RSA key pair, handing out create and verify handles bound to it
///
/// Cloning is cheap and every clone shares the same keys.
#[derive(Clone)]
pub struct TokenFactory {
    encoding_key: Arc<EncodingKey>,
    decoding_key: Arc<DecodingKey>,
    public_key: Arc<str>,
}

impl TokenFactory {
    /// Bind a key pair, consuming it so the private PEM is wiped right away
    ///
    /// # Errors
    /// Returns `Error::KeyGeneration` if either PEM is not a usable RSA key
    pub fn bind(key_pair: KeyPair) -> Result<Self> {
        let encoding_key = codec::encoding_key(key_pair.private_key())?;
        let decoding_key = codec::decoding_key(key_pair.public_key())?;

        tracing::debug!("bound RSA key pair to token factory");

        Ok(Self {
            encoding_key: Arc::new(encoding_key),
            decoding_key: Arc::new(decoding_key),
            public_key: Arc::from(key_pair.public_key()),
        })
    }

    /// Generate a key pair and bind it, blocking the current thread
    pub fn generate(modulus_length: usize) -> Result<Self> {
        Self::bind(KeyPair::generate(modulus_length)?)
    }

    /// Generate a key pair on the blocking pool and bind it
    pub async fn generate_async(modulus_length: usize) -> Result<Self> {
        Self::bind(KeyPair::generate_async(modulus_length).await?)
    }

    /// A creator with `defaults` applied to every token it signs
    pub fn create_token(&self, defaults: SignOptions) -> TokenCreator {
        TokenCreator {
            key: Arc::clone(&self.encoding_key),
            defaults,
        }
    }

    /// A verifier with `defaults` applied to every token it checks
    pub fn verify_token(&self, defaults: VerifyOptions) -> TokenVerifier {
        TokenVerifier {
            key: Arc::clone(&self.decoding_key),
            defaults,
        }
    }

    /// PEM (SPKI) public key, safe to hand to other services
    pub fn public_key(&self) -> &str {
        &self.public_key
    }
}

impl std::fmt::Debug for TokenFactory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenFactory")
            .field("public_key", &self.public_key)
            .finish_non_exhaustive()
    }
}

/// Signs tokens with the factory's private key
#[derive(Clone)]
pub struct TokenCreator {
    key: Arc<EncodingKey>,
    defaults: SignOptions,
}

impl TokenCreator {
    pub fn defaults(&self) -> &SignOptions {
        &self.defaults
    }
}

#[async_trait]
impl CreateToken for TokenCreator {
    async fn create_with(&self, payload: &ClaimSet, overrides: &SignOptions) -> Result<String> {
        let options = self.defaults.merge(overrides);
        codec::sign(payload, &self.key, &options)
    }
}

/// Verifies tokens against the factory's public key
#[derive(Clone)]
pub struct TokenVerifier {
    key: Arc<DecodingKey>,
    defaults: VerifyOptions,
}

impl TokenVerifier {
    pub fn defaults(&self) -> &VerifyOptions {
        &self.defaults
    }
}

#[async_trait]
impl VerifyToken for TokenVerifier {
    async fn verify_with(&self, token: &str, overrides: &VerifyOptions) -> Result<ClaimSet> {
        let options = self.defaults.merge(overrides);

        codec::verify(token, &self.key, &options).inspect_err(|error| {
            tracing::debug!(%error, "token verification rejected");
        })
    }
}

impl std::fmt::Debug for TokenCreator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenCreator")
            .field("defaults", self.defaults())
            .finish_non_exhaustive()
    }
}

impl std::fmt::Debug for TokenVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenVerifier")
            .field("defaults", self.defaults())
            .finish_non_exhaustive()
    }
}
