//! [`TokenSource`] for the `http` crate's request types

use http::header::COOKIE;
use http::request::Parts;
use http::HeaderMap;
use http::Request;

use crate::extractor::TokenSource;

impl TokenSource for HeaderMap {
    fn header(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(|value| value.to_str().ok())
    }

    fn cookie(&self, name: &str) -> Option<&str> {
        self.get_all(COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .find_map(|header| find_cookie(header, name))
    }
}

impl<B> TokenSource for Request<B> {
    fn header(&self, name: &str) -> Option<&str> {
        self.headers().header(name)
    }

    fn cookie(&self, name: &str) -> Option<&str> {
        self.headers().cookie(name)
    }
}

impl TokenSource for Parts {
    fn header(&self, name: &str) -> Option<&str> {
        self.headers.header(name)
    }

    fn cookie(&self, name: &str) -> Option<&str> {
        self.headers.cookie(name)
    }
}

/// Find `name` in a `Cookie` header value (`a=1; b=2`), stripping optional quotes
fn find_cookie<'a>(header: &'a str, name: &str) -> Option<&'a str> {
    header
        .split(';')
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| key.trim() == name)
        .map(|(_, value)| {
            let value = value.trim();
            value
                .strip_prefix('"')
                .and_then(|inner| inner.strip_suffix('"'))
                .unwrap_or(value)
        })
}
