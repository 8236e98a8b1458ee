use std::fmt;

use http::Method;

/// Identity of a logical request: method plus target URL.
///
/// Keys collide on purpose. Two requests with the same method and URL are
/// duplicates of one another; the registry uses that to cancel the older of
/// the pair.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RequestKey(String);

impl RequestKey {
    #[must_use]
    pub fn new(method: &Method, url: &str) -> Self {
        Self(format!("{}-{}", method.as_str(), url))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RequestKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
