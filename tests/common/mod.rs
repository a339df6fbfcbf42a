#![allow(dead_code)]

use std::sync::OnceLock;

use jwts::{ClaimSet, SignOptions, TokenFactory, VerifyOptions};
use serde_json::json;

/// Modulus used in tests, small enough to generate quickly
pub const TEST_MODULUS_LENGTH: usize = 1024;

/// A factory shared by every test in the binary
pub fn shared_factory() -> TokenFactory {
    static FACTORY: OnceLock<TokenFactory> = OnceLock::new();

    FACTORY
        .get_or_init(|| {
            TokenFactory::generate(TEST_MODULUS_LENGTH).expect("Failed to generate test key pair")
        })
        .clone()
}

/// A factory with its own key pair
pub fn fresh_factory() -> TokenFactory {
    TokenFactory::generate(TEST_MODULUS_LENGTH).expect("Failed to generate test key pair")
}

/// User record used as the private claims of test tokens
pub fn user_claims() -> ClaimSet {
    json!({
        "id": 1,
        "username": "brad",
        "email": "brad@gmail.com",
        "role": "user",
    })
    .as_object()
    .cloned()
    .expect("user claims are an object")
}

/// Sign defaults of a typical service
pub fn sign_defaults() -> SignOptions {
    SignOptions::new()
        .issuer("Mysoft corp")
        .subject("some@user.com")
        .audience(vec!["auth-service", "user-service"])
        .expires_in("10m".parse::<jwts::TimeSpan>().expect("valid time span"))
}

/// Verify defaults matching [`sign_defaults`]
pub fn verify_defaults() -> VerifyOptions {
    VerifyOptions::new()
        .issuer("Mysoft corp")
        .subject("some@user.com")
        .audience(vec!["auth-service", "user-service"])
        .algorithms(vec![jwts::Algorithm::RS256])
}

/// Replace the character at `index` of `token` with a different base64url character
pub fn flip_char(token: &str, index: usize) -> String {
    let mut chars: Vec<char> = token.chars().collect();
    chars[index] = if chars[index] == 'A' { 'B' } else { 'A' };
    chars.into_iter().collect()
}

/// Index of the first character of the signature segment
pub fn signature_start(token: &str) -> usize {
    token.rfind('.').expect("token has three segments") + 1
}
