//! Signing and verification over `jsonwebtoken`
//!
//! These are the primitives behind [`TokenCreator`](crate::TokenCreator) and
//! [`TokenVerifier`](crate::TokenVerifier). They are public so that another service
//! holding only the PEM public key can verify tokens with the same semantics:
//!
//! ```rust,no_run
//! use jwts::codec;
//! use jwts::VerifyOptions;
//!
//! # fn example(public_pem: &str, token: &str) -> jwts::Result<()> {
//! let key = codec::decoding_key(public_pem)?;
//! let claims = codec::verify(token, &key, &VerifyOptions::new().issuer("Mysoft corp"))?;
//! # Ok(())
//! # }
//! ```

use chrono::Utc;
use jsonwebtoken::decode;
use jsonwebtoken::encode;
use jsonwebtoken::Algorithm;
use jsonwebtoken::DecodingKey;
use jsonwebtoken::EncodingKey;
use jsonwebtoken::Header;
use jsonwebtoken::Validation;
use serde_json::Value;

use crate::claims;
use crate::claims::ClaimSet;
use crate::claims::RegisteredClaims;
use crate::error::claim_mismatch;
use crate::error::key_error;
use crate::error::signing_error;
use crate::error::verification_error;
use crate::error::Error;
use crate::error::Result;
use crate::options::SignOptions;
use crate::options::VerifyOptions;

/// Algorithm used for signing when the options leave it unset
pub const DEFAULT_ALGORITHM: Algorithm = Algorithm::RS256;

/// Algorithms accepted by verification when the options leave them unset
pub const RSA_ALGORITHMS: [Algorithm; 6] = [
    Algorithm::RS256,
    Algorithm::RS384,
    Algorithm::RS512,
    Algorithm::PS256,
    Algorithm::PS384,
    Algorithm::PS512,
];

/// Build a signing key from a PKCS#8 (or PKCS#1) PEM private key
pub fn encoding_key(private_pem: &str) -> Result<EncodingKey> {
    EncodingKey::from_rsa_pem(private_pem.as_bytes()).map_err(key_error)
}

/// Build a verification key from an SPKI (or PKCS#1) PEM public key
pub fn decoding_key(public_pem: &str) -> Result<DecodingKey> {
    DecodingKey::from_rsa_pem(public_pem.as_bytes()).map_err(key_error)
}

/// Sign `payload` merged with the registered claims derived from `options`
///
/// # Errors
/// Returns `Error::Signing` when the payload conflicts with the options, carries
/// time claims verification could not read, or the key does not fit the algorithm
pub fn sign(payload: &ClaimSet, key: &EncodingKey, options: &SignOptions) -> Result<String> {
    let claims = signed_claims(payload, options, Utc::now().timestamp())?;

    let mut header = Header::new(options.algorithm.unwrap_or(DEFAULT_ALGORITHM));
    header.kid = options.key_id.clone();

    encode(&header, &claims, key).map_err(signing_error)
}

/// Verify the signature of `token`, then its claims against `options`
///
/// # Errors
/// Returns one of `Error::TokenExpired`, `Error::TokenNotActive`,
/// `Error::TokenMalformed`, `Error::SignatureInvalid` or `Error::ClaimMismatch`
pub fn verify(token: &str, key: &DecodingKey, options: &VerifyOptions) -> Result<ClaimSet> {
    let validation = validation_for(options);

    let token_data =
        decode::<ClaimSet>(token, key, &validation).map_err(|e| verification_error(e, token))?;

    check_remaining_claims(&token_data.claims, options, Utc::now().timestamp())?;

    Ok(token_data.claims)
}

fn signed_claims(payload: &ClaimSet, options: &SignOptions, now: i64) -> Result<ClaimSet> {
    if let Some(value) = payload.get(claims::ISSUED_AT) {
        if !value.is_number() {
            return Err(Error::Signing(
                "\"iat\" should be a number of seconds".to_string(),
            ));
        }
    }

    // Verification reads `exp` and `nbf` as unsigned whole seconds
    for claim in [claims::EXPIRES_AT, claims::NOT_BEFORE] {
        if let Some(value) = payload.get(claim) {
            if value.as_u64().is_none() {
                return Err(unverifiable_time_claim(claim));
            }
        }
    }

    let conflicts = [
        (options.expires_in.is_some(), claims::EXPIRES_AT, "expiresIn"),
        (options.not_before.is_some(), claims::NOT_BEFORE, "notBefore"),
        (options.audience.is_some(), claims::AUDIENCE, "audience"),
        (options.issuer.is_some(), claims::ISSUER, "issuer"),
        (options.subject.is_some(), claims::SUBJECT, "subject"),
        (options.jwt_id.is_some(), claims::JWT_ID, "jwtid"),
    ];
    for (set, claim, option) in conflicts {
        if set && payload.contains_key(claim) {
            return Err(Error::Signing(format!(
                "Bad \"options.{option}\" option, the payload already has an \"{claim}\" property"
            )));
        }
    }

    let mut signed = payload.clone();
    let timestamp = payload.iat().unwrap_or(now);

    if options.no_timestamp.unwrap_or(false) {
        signed.remove(claims::ISSUED_AT);
    } else if !payload.contains_key(claims::ISSUED_AT) {
        signed.insert(claims::ISSUED_AT.to_string(), Value::from(timestamp));
    }

    if let Some(span) = options.not_before {
        signed.insert(
            claims::NOT_BEFORE.to_string(),
            resolved_time_claim(claims::NOT_BEFORE, span.resolve(timestamp))?,
        );
    }
    if let Some(span) = options.expires_in {
        signed.insert(
            claims::EXPIRES_AT.to_string(),
            resolved_time_claim(claims::EXPIRES_AT, span.resolve(timestamp))?,
        );
    }
    if let Some(audience) = &options.audience {
        signed.insert(claims::AUDIENCE.to_string(), audience.to_claim());
    }
    if let Some(issuer) = &options.issuer {
        signed.insert(claims::ISSUER.to_string(), Value::from(issuer.as_str()));
    }
    if let Some(subject) = &options.subject {
        signed.insert(claims::SUBJECT.to_string(), Value::from(subject.as_str()));
    }
    if let Some(jwt_id) = &options.jwt_id {
        signed.insert(claims::JWT_ID.to_string(), Value::from(jwt_id.as_str()));
    }

    Ok(signed)
}

fn unverifiable_time_claim(claim: &str) -> Error {
    Error::Signing(format!(
        "\"{claim}\" should be a non-negative whole number of seconds"
    ))
}

fn resolved_time_claim(claim: &str, seconds: i64) -> Result<Value> {
    u64::try_from(seconds)
        .map(Value::from)
        .map_err(|_| unverifiable_time_claim(claim))
}

fn validation_for(options: &VerifyOptions) -> Validation {
    let mut validation = Validation::new(DEFAULT_ALGORITHM);
    let tolerance = options.clock_tolerance.unwrap_or(0);

    validation.algorithms = options
        .algorithms
        .clone()
        .unwrap_or_else(|| RSA_ALGORITHMS.to_vec());
    validation.leeway = tolerance;
    validation.validate_exp = !options.ignore_expiration.unwrap_or(false);
    validation.validate_nbf = !options.ignore_not_before.unwrap_or(false);

    let mut required = Vec::new();

    match &options.audience {
        Some(audience) => {
            validation.set_audience(&audience.values());
            required.push(claims::AUDIENCE);
        }
        None => validation.validate_aud = false,
    }

    if let Some(issuers) = &options.issuer {
        validation.set_issuer(issuers.as_slice());
        required.push(claims::ISSUER);
    }

    if let Some(subject) = &options.subject {
        validation.sub = Some(subject.clone());
        required.push(claims::SUBJECT);
    }

    validation.set_required_spec_claims(&required);
    validation
}

/// Checks `jsonwebtoken` does not cover: `jti` and `max_age`
fn check_remaining_claims(token_claims: &ClaimSet, options: &VerifyOptions, now: i64) -> Result<()> {
    if let Some(expected) = &options.jwt_id {
        if token_claims.jti() != Some(expected.as_str()) {
            return Err(claim_mismatch(claims::JWT_ID));
        }
    }

    if let Some(max_age) = options.max_age {
        let issued_at = token_claims
            .iat()
            .ok_or_else(|| claim_mismatch(claims::ISSUED_AT))?;
        let tolerance = i64::try_from(options.clock_tolerance.unwrap_or(0)).unwrap_or(i64::MAX);

        // Same boundary as `exp`: valid through the last second
        if now > max_age.resolve(issued_at).saturating_add(tolerance) {
            return Err(Error::TokenExpired);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::options::TimeSpan;

    fn payload(value: Value) -> ClaimSet {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn registered_claims_come_from_options() {
        let options = SignOptions::new()
            .issuer("Mysoft corp")
            .subject("some@user.com")
            .audience(vec!["auth-service", "user-service"])
            .expires_in("10m".parse::<TimeSpan>().unwrap())
            .jwt_id("abc");

        let claims = signed_claims(&payload(json!({"role": "user"})), &options, 1_000).unwrap();

        assert_eq!(
            Value::Object(claims),
            json!({
                "role": "user",
                "iat": 1_000,
                "exp": 1_600,
                "iss": "Mysoft corp",
                "sub": "some@user.com",
                "aud": ["auth-service", "user-service"],
                "jti": "abc",
            })
        );
    }

    #[test]
    fn payload_iat_is_the_time_base() {
        let options = SignOptions::new()
            .expires_in(TimeSpan::from_secs(60))
            .not_before(TimeSpan::from_secs(10));

        let claims = signed_claims(&payload(json!({"iat": 500})), &options, 1_000).unwrap();

        assert_eq!(claims.iat(), Some(500));
        assert_eq!(claims.exp(), Some(560));
        assert_eq!(claims.nbf(), Some(510));
    }

    #[test]
    fn no_timestamp_drops_iat() {
        let options = SignOptions::new().no_timestamp();

        let claims = signed_claims(&payload(json!({"iat": 500})), &options, 1_000).unwrap();

        assert_eq!(claims.iat(), None);
    }

    #[test]
    fn payload_and_options_must_not_both_set_a_claim() {
        let options = SignOptions::new().issuer("Mysoft corp");

        let result = signed_claims(&payload(json!({"iss": "someone"})), &options, 1_000);

        assert!(matches!(result, Err(Error::Signing(_))));
    }

    #[test]
    fn payload_time_claims_must_be_numbers() {
        let result = signed_claims(&payload(json!({"exp": "tomorrow"})), &SignOptions::new(), 1);

        assert!(matches!(result, Err(Error::Signing(_))));
    }

    #[test]
    fn fractional_payload_iat_is_kept_and_floored_as_time_base() {
        let options = SignOptions::new().expires_in(TimeSpan::from_secs(10));

        let claims = signed_claims(&payload(json!({"iat": 1000.5})), &options, 5_000).unwrap();

        assert_eq!(claims["iat"], json!(1000.5));
        assert_eq!(claims.exp(), Some(1_010));
    }

    #[test]
    fn payload_exp_and_nbf_must_be_unsigned_whole_seconds() {
        for claims in [json!({"exp": -1}), json!({"exp": 10.5}), json!({"nbf": -30})] {
            let result = signed_claims(&payload(claims.clone()), &SignOptions::new(), 1);

            assert!(matches!(result, Err(Error::Signing(_))), "{claims}");
        }
    }

    #[test]
    fn negative_resolved_exp_is_a_signing_error() {
        let options = SignOptions::new().expires_in(TimeSpan::from_secs(-60));

        let result = signed_claims(&payload(json!({"iat": 10})), &options, 1_000);

        assert!(matches!(result, Err(Error::Signing(_))));
    }

    #[test]
    fn payload_claims_pass_through_without_options() {
        let claims =
            signed_claims(&payload(json!({"sub": "brad", "exp": 9})), &SignOptions::new(), 1)
                .unwrap();

        assert_eq!(claims.sub(), Some("brad"));
        assert_eq!(claims.exp(), Some(9));
    }

    #[test]
    fn validation_requires_only_configured_claims() {
        let validation = validation_for(&VerifyOptions::new());

        assert!(validation.required_spec_claims.is_empty());
        assert!(!validation.validate_aud);
        assert!(validation.validate_exp);
        assert!(validation.validate_nbf);
        assert_eq!(validation.leeway, 0);
        assert_eq!(validation.algorithms, RSA_ALGORITHMS.to_vec());

        let validation = validation_for(
            &VerifyOptions::new()
                .issuer("Mysoft corp")
                .audience("auth-service")
                .subject("some@user.com")
                .algorithms(vec![Algorithm::RS256])
                .clock_tolerance(5),
        );

        assert_eq!(validation.required_spec_claims.len(), 3);
        assert!(validation.validate_aud);
        assert_eq!(validation.sub.as_deref(), Some("some@user.com"));
        assert_eq!(validation.algorithms, vec![Algorithm::RS256]);
        assert_eq!(validation.leeway, 5);
    }

    #[test]
    fn ignore_flags_disable_time_checks() {
        let validation =
            validation_for(&VerifyOptions::new().ignore_expiration().ignore_not_before());

        assert!(!validation.validate_exp);
        assert!(!validation.validate_nbf);
    }

    #[test]
    fn jwt_id_must_match() {
        let claims = payload(json!({"jti": "abc"}));

        assert!(check_remaining_claims(&claims, &VerifyOptions::new().jwt_id("abc"), 0).is_ok());
        assert!(matches!(
            check_remaining_claims(&claims, &VerifyOptions::new().jwt_id("xyz"), 0),
            Err(Error::ClaimMismatch { claim }) if claim == "jti"
        ));
    }

    #[test]
    fn max_age_is_measured_from_iat() {
        let claims = payload(json!({"iat": 1_000}));
        let options = VerifyOptions::new().max_age(TimeSpan::from_secs(60));

        assert!(check_remaining_claims(&claims, &options, 1_060).is_ok());
        assert!(matches!(
            check_remaining_claims(&claims, &options, 1_061),
            Err(Error::TokenExpired)
        ));

        let tolerant = options.clone().clock_tolerance(5);
        assert!(check_remaining_claims(&claims, &tolerant, 1_065).is_ok());
    }

    #[test]
    fn max_age_saturates_at_the_end_of_time() {
        let claims = payload(json!({"iat": i64::MAX}));
        let options = VerifyOptions::new()
            .max_age(TimeSpan::from_secs(60))
            .clock_tolerance(5);

        assert!(check_remaining_claims(&claims, &options, 1_000).is_ok());

        let huge_tolerance = VerifyOptions::new()
            .max_age(TimeSpan::from_secs(60))
            .clock_tolerance(u64::MAX);
        let old = payload(json!({"iat": 1_000}));
        assert!(check_remaining_claims(&old, &huge_tolerance, 1_000_000).is_ok());
    }

    #[test]
    fn max_age_needs_iat() {
        let options = VerifyOptions::new().max_age(TimeSpan::from_secs(60));

        let result = check_remaining_claims(&ClaimSet::new(), &options, 0);

        assert!(matches!(result, Err(Error::ClaimMismatch { claim }) if claim == "iat"));
    }
}
