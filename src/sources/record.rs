use std::collections::HashMap;

use crate::extractor::TokenSource;

/// A framework-agnostic request: header and cookie maps
///
/// Header names are stored lowercase so lookups are case-insensitive.
#[derive(Debug, Clone, Default)]
pub struct RequestRecord {
    headers: HashMap<String, String>,
    cookies: HashMap<String, String>,
}

impl RequestRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_header(mut self, name: impl AsRef<str>, value: impl Into<String>) -> Self {
        self.headers
            .insert(name.as_ref().to_ascii_lowercase(), value.into());
        self
    }

    pub fn with_cookie(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.cookies.insert(name.into(), value.into());
        self
    }
}

impl TokenSource for RequestRecord {
    fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    fn cookie(&self, name: &str) -> Option<&str> {
        self.cookies.get(name).map(String::as_str)
    }
}
