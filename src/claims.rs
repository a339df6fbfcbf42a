use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Map;
use serde_json::Value;

use crate::error::Error;
use crate::error::Result;

/// Claims of a token: private claims plus the registered ones added at signing
pub type ClaimSet = Map<String, Value>;

pub const ISSUER: &str = "iss";
pub const SUBJECT: &str = "sub";
pub const AUDIENCE: &str = "aud";
pub const EXPIRES_AT: &str = "exp";
pub const NOT_BEFORE: &str = "nbf";
pub const ISSUED_AT: &str = "iat";
pub const JWT_ID: &str = "jti";

/// Read access to the registered JWT claims
///
/// Accessors return `None` when a claim is absent or has the wrong JSON type.
pub trait RegisteredClaims {
    /// Get the issuer (iss) claim
    fn iss(&self) -> Option<&str>;

    /// Get the subject (sub) claim
    fn sub(&self) -> Option<&str>;

    /// Get the audience (aud) claim, a single audience is returned as a one-element list
    fn aud(&self) -> Vec<&str>;

    /// Get the expiration time (exp) claim as a Unix timestamp
    fn exp(&self) -> Option<i64>;

    /// Get the not-before (nbf) claim as a Unix timestamp
    fn nbf(&self) -> Option<i64>;

    /// Get the issued at (iat) claim as a Unix timestamp
    fn iat(&self) -> Option<i64>;

    /// Get the token id (jti) claim
    fn jti(&self) -> Option<&str>;
}

impl RegisteredClaims for ClaimSet {
    fn iss(&self) -> Option<&str> {
        self.get(ISSUER).and_then(Value::as_str)
    }

    fn sub(&self) -> Option<&str> {
        self.get(SUBJECT).and_then(Value::as_str)
    }

    fn aud(&self) -> Vec<&str> {
        match self.get(AUDIENCE) {
            Some(Value::String(audience)) => vec![audience.as_str()],
            Some(Value::Array(audiences)) => audiences.iter().filter_map(Value::as_str).collect(),
            _ => Vec::new(),
        }
    }

    fn exp(&self) -> Option<i64> {
        self.get(EXPIRES_AT).and_then(timestamp)
    }

    fn nbf(&self) -> Option<i64> {
        self.get(NOT_BEFORE).and_then(timestamp)
    }

    fn iat(&self) -> Option<i64> {
        self.get(ISSUED_AT).and_then(timestamp)
    }

    fn jti(&self) -> Option<&str> {
        self.get(JWT_ID).and_then(Value::as_str)
    }
}

/// Whole seconds of a numeric claim, fractional timestamps are floored
fn timestamp(value: &Value) -> Option<i64> {
    value
        .as_i64()
        .or_else(|| value.as_f64().map(|seconds| seconds.floor() as i64))
}

/// Turn any serializable payload into a claim set
///
/// # Errors
/// Returns `Error::Signing` unless the payload serializes to a JSON object
pub fn to_claim_set<T: Serialize>(payload: &T) -> Result<ClaimSet> {
    match serde_json::to_value(payload) {
        Ok(Value::Object(claims)) => Ok(claims),
        Ok(other) => Err(Error::Signing(format!(
            "payload must be a JSON object, got {other}"
        ))),
        Err(error) => Err(Error::Signing(error.to_string())),
    }
}

/// Deserialize verified claims into an application type
///
/// # Errors
/// Returns `Error::TokenMalformed` when the claims do not fit `T`
pub fn from_claim_set<T: DeserializeOwned>(claims: ClaimSet) -> Result<T> {
    serde_json::from_value(Value::Object(claims))
        .map_err(|error| Error::TokenMalformed(error.to_string()))
}

#[cfg(test)]
mod tests {
    use serde::Deserialize;
    use serde_json::json;

    use super::*;

    #[derive(Debug, Serialize, Deserialize, PartialEq)]
    struct User {
        id: u32,
        role: String,
    }

    #[test]
    fn registered_claims_are_read_from_the_set() {
        let claims = json!({
            "iss": "Mysoft corp",
            "sub": "some@user.com",
            "aud": ["auth-service", "user-service"],
            "exp": 1_700_000_600,
            "iat": 1_700_000_000,
        });
        let claims = claims.as_object().unwrap();

        assert_eq!(claims.iss(), Some("Mysoft corp"));
        assert_eq!(claims.sub(), Some("some@user.com"));
        assert_eq!(claims.aud(), vec!["auth-service", "user-service"]);
        assert_eq!(claims.exp(), Some(1_700_000_600));
        assert_eq!(claims.iat(), Some(1_700_000_000));
        assert_eq!(claims.nbf(), None);
        assert_eq!(claims.jti(), None);
    }

    #[test]
    fn fractional_timestamps_are_floored() {
        let claims = json!({"iat": 1000.5, "exp": 1060.9, "nbf": "soon"});
        let claims = claims.as_object().unwrap();

        assert_eq!(claims.iat(), Some(1000));
        assert_eq!(claims.exp(), Some(1060));
        assert_eq!(claims.nbf(), None);
    }

    #[test]
    fn single_audience_reads_as_list() {
        let claims = json!({"aud": "auth-service"});

        assert_eq!(claims.as_object().unwrap().aud(), vec!["auth-service"]);
    }

    #[test]
    fn payload_must_be_an_object() {
        assert!(to_claim_set(&User { id: 1, role: "user".into() }).is_ok());
        assert!(matches!(to_claim_set(&"brad"), Err(Error::Signing(_))));
        assert!(matches!(to_claim_set(&vec![1, 2]), Err(Error::Signing(_))));
    }

    #[test]
    fn claims_convert_back_into_application_types() {
        let claims = to_claim_set(&json!({"id": 1, "role": "user", "iat": 1})).unwrap();

        let user: User = from_claim_set(claims).unwrap();
        assert_eq!(user, User { id: 1, role: "user".into() });

        let missing = to_claim_set(&json!({"id": 1})).unwrap();
        assert!(matches!(
            from_claim_set::<User>(missing),
            Err(Error::TokenMalformed(_))
        ));
    }
}
