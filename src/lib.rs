//! # jwts
//!
//! Create and verify JSON Web Tokens with an RSA key pair generated at startup.
//!
//! A [`TokenFactory`] owns one freshly generated key pair. From it a service derives a
//! [`TokenCreator`] and a [`TokenVerifier`] with its canonical sign and verify options
//! bound in, then passes only per-call overrides on each request. The private key never
//! leaves the factory; the PEM public key can be handed to other services.
//!
//! ## Features
//!
//! - RS256 signing (any RSA algorithm on request) with an ephemeral key pair
//! - Default options per service, shallow-merged with per-call overrides
//! - Distinct verification failures: expired, not yet active, malformed, bad signature,
//!   claim mismatch
//! - Bearer token, `jwt` cookie and CSRF token extraction from `http` requests
//!
//! ## Example
//!
//! ```rust,no_run
//! use jwts::{CreateToken, SignOptions, TokenService, TokenServiceConfig, VerifyToken};
//! use serde_json::json;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = TokenServiceConfig::new("Mysoft corp", "auth-service")
//!         .with_subject("some@user.com")
//!         .with_expires_in("10m".parse::<jwts::TimeSpan>()?);
//!
//!     let service = TokenService::new(config).await?;
//!
//!     let user = jwts::to_claim_set(&json!({"id": 1, "username": "brad", "role": "user"}))?;
//!     let token = service.create(&user).await?;
//!
//!     let claims = service.verify(&token).await?;
//!     println!("Role: {}", claims["role"]);
//!
//!     // Overrides win over the defaults for this call only
//!     let token = service
//!         .create_with(&user, &SignOptions::new().subject("bryan@gmail.com"))
//!         .await?;
//!     println!("Token: {token}");
//!
//!     Ok(())
//! }
//! ```

mod claims;
pub mod codec;
mod config;
mod error;
mod extractor;
mod factory;
mod keys;
mod options;
mod service;
pub mod sources;

// Re-exports for public API
pub use claims::from_claim_set;
pub use claims::to_claim_set;
pub use claims::ClaimSet;
pub use claims::RegisteredClaims;
pub use config::TokenServiceConfig;
pub use error::Error;
pub use error::Result;
pub use extractor::extract_csrf_token;
pub use extractor::extract_from_cookie;
pub use extractor::extract_from_header;
pub use extractor::extract_token;
pub use extractor::TokenSource;
pub use factory::CreateToken;
pub use factory::TokenCreator;
pub use factory::TokenFactory;
pub use factory::TokenVerifier;
pub use factory::VerifyToken;
pub use jsonwebtoken::Algorithm;
pub use keys::KeyPair;
pub use keys::DEFAULT_MODULUS_LENGTH;
pub use keys::MIN_MODULUS_LENGTH;
pub use options::Audience;
pub use options::Merge;
pub use options::SignOptions;
pub use options::TimeSpan;
pub use options::VerifyOptions;
pub use service::TokenService;
