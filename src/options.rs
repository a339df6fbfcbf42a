use std::str::FromStr;
use std::time::Duration;

use jsonwebtoken::Algorithm;
use serde::Deserialize;

use crate::claims::ClaimSet;
use crate::error::Error;

/// Shallow, one-level merge of a defaults record with a per-call override record
///
/// Anything set in `overrides` replaces the same entry of `self`, entries only present
/// in `self` pass through. Nested values are replaced wholesale, never merged recursively.
pub trait Merge {
    fn merge(&self, overrides: &Self) -> Self;
}

impl Merge for ClaimSet {
    fn merge(&self, overrides: &Self) -> Self {
        let mut merged = self.clone();
        for (key, value) in overrides {
            merged.insert(key.clone(), value.clone());
        }
        merged
    }
}

/// A relative span of time used by `expires_in`, `not_before` and `max_age`
///
/// Integers are seconds. Strings follow the `ms` notation (`"10m"`, `"2 days"`, `"1.5h"`)
/// and a string without unit counts milliseconds, so `"120"` is 120ms and not two minutes.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(try_from = "RawTimeSpan")]
pub struct TimeSpan {
    millis: f64,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawTimeSpan {
    Seconds(f64),
    Text(String),
}

impl TryFrom<RawTimeSpan> for TimeSpan {
    type Error = Error;

    fn try_from(raw: RawTimeSpan) -> Result<Self, Self::Error> {
        match raw {
            RawTimeSpan::Seconds(seconds) => Ok(Self::from_secs_f64(seconds)),
            RawTimeSpan::Text(text) => text.parse(),
        }
    }
}

const SECOND: f64 = 1000.0;
const MINUTE: f64 = SECOND * 60.0;
const HOUR: f64 = MINUTE * 60.0;
const DAY: f64 = HOUR * 24.0;
const WEEK: f64 = DAY * 7.0;
const YEAR: f64 = DAY * 365.25;

impl TimeSpan {
    pub fn from_secs(seconds: i64) -> Self {
        Self {
            millis: seconds as f64 * SECOND,
        }
    }

    pub fn from_secs_f64(seconds: f64) -> Self {
        Self {
            millis: seconds * SECOND,
        }
    }

    pub fn from_millis(millis: f64) -> Self {
        Self { millis }
    }

    pub fn as_millis(&self) -> f64 {
        self.millis
    }

    /// Resolve the span against a unix timestamp, flooring to whole seconds
    pub fn resolve(&self, timestamp: i64) -> i64 {
        (timestamp as f64 + self.millis / SECOND).floor() as i64
    }
}

impl From<i64> for TimeSpan {
    fn from(seconds: i64) -> Self {
        Self::from_secs(seconds)
    }
}

impl From<Duration> for TimeSpan {
    fn from(duration: Duration) -> Self {
        Self::from_millis(duration.as_secs_f64() * SECOND)
    }
}

impl FromStr for TimeSpan {
    type Err = Error;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let invalid = || Error::InvalidTimeSpan(text.to_string());

        let trimmed = text.trim();
        let split = trimmed
            .find(|c: char| !(c.is_ascii_digit() || c == '.' || c == '-'))
            .unwrap_or(trimmed.len());
        let (number, unit) = trimmed.split_at(split);

        let value: f64 = number.parse().map_err(|_| invalid())?;
        let factor = match unit.trim().to_ascii_lowercase().as_str() {
            "" | "ms" | "msec" | "msecs" | "millisecond" | "milliseconds" => 1.0,
            "s" | "sec" | "secs" | "second" | "seconds" => SECOND,
            "m" | "min" | "mins" | "minute" | "minutes" => MINUTE,
            "h" | "hr" | "hrs" | "hour" | "hours" => HOUR,
            "d" | "day" | "days" => DAY,
            "w" | "week" | "weeks" => WEEK,
            "y" | "yr" | "yrs" | "year" | "years" => YEAR,
            _ => return Err(invalid()),
        };

        Ok(Self::from_millis(value * factor))
    }
}

/// One audience or a list of audiences
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum Audience {
    Single(String),
    Multiple(Vec<String>),
}

impl Audience {
    pub fn values(&self) -> Vec<&str> {
        match self {
            Audience::Single(audience) => vec![audience.as_str()],
            Audience::Multiple(audiences) => audiences.iter().map(String::as_str).collect(),
        }
    }

    pub(crate) fn to_claim(&self) -> serde_json::Value {
        match self {
            Audience::Single(audience) => serde_json::Value::from(audience.as_str()),
            Audience::Multiple(audiences) => serde_json::Value::from(audiences.clone()),
        }
    }
}

impl From<&str> for Audience {
    fn from(audience: &str) -> Self {
        Audience::Single(audience.to_string())
    }
}

impl From<String> for Audience {
    fn from(audience: String) -> Self {
        Audience::Single(audience)
    }
}

impl From<Vec<String>> for Audience {
    fn from(audiences: Vec<String>) -> Self {
        Audience::Multiple(audiences)
    }
}

impl From<Vec<&str>> for Audience {
    fn from(audiences: Vec<&str>) -> Self {
        Audience::Multiple(audiences.into_iter().map(str::to_string).collect())
    }
}

/// Options applied when signing a token
///
/// Every field is optional so that a per-call record only carries what it overrides.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SignOptions {
    /// Signing algorithm, RS256 when unset
    pub algorithm: Option<Algorithm>,
    pub expires_in: Option<TimeSpan>,
    pub not_before: Option<TimeSpan>,
    pub audience: Option<Audience>,
    pub issuer: Option<String>,
    pub subject: Option<String>,
    #[serde(rename = "jwtid")]
    pub jwt_id: Option<String>,
    /// Written to the `kid` header
    #[serde(rename = "keyid")]
    pub key_id: Option<String>,
    /// Leave `iat` out of the claims
    pub no_timestamp: Option<bool>,
}

impl SignOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn algorithm(mut self, algorithm: Algorithm) -> Self {
        self.algorithm = Some(algorithm);
        self
    }

    pub fn expires_in(mut self, span: impl Into<TimeSpan>) -> Self {
        self.expires_in = Some(span.into());
        self
    }

    pub fn not_before(mut self, span: impl Into<TimeSpan>) -> Self {
        self.not_before = Some(span.into());
        self
    }

    pub fn audience(mut self, audience: impl Into<Audience>) -> Self {
        self.audience = Some(audience.into());
        self
    }

    pub fn issuer(mut self, issuer: impl Into<String>) -> Self {
        self.issuer = Some(issuer.into());
        self
    }

    pub fn subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = Some(subject.into());
        self
    }

    pub fn jwt_id(mut self, jwt_id: impl Into<String>) -> Self {
        self.jwt_id = Some(jwt_id.into());
        self
    }

    pub fn key_id(mut self, key_id: impl Into<String>) -> Self {
        self.key_id = Some(key_id.into());
        self
    }

    pub fn no_timestamp(mut self) -> Self {
        self.no_timestamp = Some(true);
        self
    }
}

impl Merge for SignOptions {
    fn merge(&self, overrides: &Self) -> Self {
        Self {
            algorithm: overrides.algorithm.or(self.algorithm),
            expires_in: overrides.expires_in.or(self.expires_in),
            not_before: overrides.not_before.or(self.not_before),
            audience: overrides.audience.clone().or_else(|| self.audience.clone()),
            issuer: overrides.issuer.clone().or_else(|| self.issuer.clone()),
            subject: overrides.subject.clone().or_else(|| self.subject.clone()),
            jwt_id: overrides.jwt_id.clone().or_else(|| self.jwt_id.clone()),
            key_id: overrides.key_id.clone().or_else(|| self.key_id.clone()),
            no_timestamp: overrides.no_timestamp.or(self.no_timestamp),
        }
    }
}

/// Options applied when verifying a token
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct VerifyOptions {
    /// Accepted algorithms, the RSA family when unset
    pub algorithms: Option<Vec<Algorithm>>,
    /// The token must carry at least one of these audiences
    pub audience: Option<Audience>,
    /// The token must carry one of these issuers
    pub issuer: Option<Vec<String>>,
    pub subject: Option<String>,
    #[serde(rename = "jwtid")]
    pub jwt_id: Option<String>,
    /// Seconds of clock skew tolerated on `exp`, `nbf` and `max_age`
    pub clock_tolerance: Option<u64>,
    /// Maximum token age, measured from `iat`
    pub max_age: Option<TimeSpan>,
    pub ignore_expiration: Option<bool>,
    pub ignore_not_before: Option<bool>,
}

impl VerifyOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn algorithms(mut self, algorithms: Vec<Algorithm>) -> Self {
        self.algorithms = Some(algorithms);
        self
    }

    pub fn audience(mut self, audience: impl Into<Audience>) -> Self {
        self.audience = Some(audience.into());
        self
    }

    pub fn issuer(mut self, issuer: impl Into<String>) -> Self {
        self.issuer = Some(vec![issuer.into()]);
        self
    }

    pub fn issuers(mut self, issuers: Vec<String>) -> Self {
        self.issuer = Some(issuers);
        self
    }

    pub fn subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = Some(subject.into());
        self
    }

    pub fn jwt_id(mut self, jwt_id: impl Into<String>) -> Self {
        self.jwt_id = Some(jwt_id.into());
        self
    }

    pub fn clock_tolerance(mut self, seconds: u64) -> Self {
        self.clock_tolerance = Some(seconds);
        self
    }

    pub fn max_age(mut self, span: impl Into<TimeSpan>) -> Self {
        self.max_age = Some(span.into());
        self
    }

    pub fn ignore_expiration(mut self) -> Self {
        self.ignore_expiration = Some(true);
        self
    }

    pub fn ignore_not_before(mut self) -> Self {
        self.ignore_not_before = Some(true);
        self
    }
}

impl Merge for VerifyOptions {
    fn merge(&self, overrides: &Self) -> Self {
        Self {
            algorithms: overrides
                .algorithms
                .clone()
                .or_else(|| self.algorithms.clone()),
            audience: overrides.audience.clone().or_else(|| self.audience.clone()),
            issuer: overrides.issuer.clone().or_else(|| self.issuer.clone()),
            subject: overrides.subject.clone().or_else(|| self.subject.clone()),
            jwt_id: overrides.jwt_id.clone().or_else(|| self.jwt_id.clone()),
            clock_tolerance: overrides.clock_tolerance.or(self.clock_tolerance),
            max_age: overrides.max_age.or(self.max_age),
            ignore_expiration: overrides.ignore_expiration.or(self.ignore_expiration),
            ignore_not_before: overrides.ignore_not_before.or(self.ignore_not_before),
        }
    }
}
