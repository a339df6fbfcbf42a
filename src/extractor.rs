use crate::error::Error;
use crate::error::Result;

pub const AUTHORIZATION_HEADER: &str = "authorization";
pub const CSRF_HEADER: &str = "x-csrf-token";
pub const TOKEN_COOKIE: &str = "jwt";

/// Trait for reading the transport-layer parts of a request
///
/// Implementations exist for the `http` crate's request types and for
/// [`RequestRecord`](crate::sources::RequestRecord). Header lookup must be
/// case-insensitive.
pub trait TokenSource {
    /// Value of the header `name`, if present and valid UTF-8
    fn header(&self, name: &str) -> Option<&str>;

    /// Value of the cookie `name`, if present
    fn cookie(&self, name: &str) -> Option<&str>;
}

/// Token from an `Authorization: Bearer <token>` header
///
/// The header value is split on a single space and the second segment returned.
/// The scheme itself is not checked.
///
/// # Errors
/// Returns `Error::MissingToken` if the header is absent or carries no second segment
pub fn extract_from_header<S: TokenSource + ?Sized>(request: &S) -> Result<&str> {
    request
        .header(AUTHORIZATION_HEADER)
        .and_then(|value| value.split(' ').nth(1))
        .filter(|token| !token.is_empty())
        .ok_or(Error::MissingToken("authorization header"))
}

/// Token from the `jwt` cookie
///
/// # Errors
/// Returns `Error::MissingToken` if the cookie is absent
pub fn extract_from_cookie<S: TokenSource + ?Sized>(request: &S) -> Result<&str> {
    request
        .cookie(TOKEN_COOKIE)
        .filter(|token| !token.is_empty())
        .ok_or(Error::MissingToken("cookie 'jwt'"))
}

/// CSRF token from the `x-csrf-token` header
///
/// # Errors
/// Returns `Error::MissingToken` if the header is absent
pub fn extract_csrf_token<S: TokenSource + ?Sized>(request: &S) -> Result<&str> {
    request
        .header(CSRF_HEADER)
        .filter(|token| !token.is_empty())
        .ok_or(Error::MissingToken("x-csrf-token header"))
}

/// Token from the authorization header, falling back to the `jwt` cookie
///
/// # Errors
/// Returns `Error::MissingToken` if neither carries a token
pub fn extract_token<S: TokenSource + ?Sized>(request: &S) -> Result<&str> {
    extract_from_header(request)
        .or_else(|_| extract_from_cookie(request))
        .map_err(|_| Error::MissingToken("authorization header or cookie 'jwt'"))
}
