//! Server base URL type.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use url::Url;

use crate::error::{Error, InvalidInputError};

/// A validated base URL for the application server.
///
/// HTTPS is required for remote hosts; plain HTTP is allowed for
/// localhost so tests and local development can run without TLS.
///
/// # Example
///
/// ```
/// use vestibule::ServerUrl;
///
/// let server = ServerUrl::new("https://app.example.com").unwrap();
/// assert_eq!(
///     server.endpoint_url("/auth/login"),
///     "https://app.example.com/auth/login"
/// );
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ServerUrl(Url);

impl ServerUrl {
    /// Create a new server URL from a string, validating the format.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL cannot be parsed, uses an unsupported
    /// scheme, or uses plain HTTP for a non-local host.
    pub fn new(s: impl AsRef<str>) -> Result<Self, Error> {
        let s = s.as_ref();
        let url = Url::parse(s).map_err(|e| InvalidInputError::ServerUrl {
            value: s.to_string(),
            reason: e.to_string(),
        })?;

        Self::validate(&url, s)?;

        // Normalize: remove trailing slash
        let normalized = if url.path() == "/" {
            let mut u = url.clone();
            u.set_path("");
            u
        } else {
            url
        };

        Ok(Self(normalized))
    }

    fn validate(url: &Url, original: &str) -> Result<(), Error> {
        match url.scheme() {
            "https" => Ok(()),
            "http" => {
                let host = url.host_str().unwrap_or("");
                if host == "localhost" || host == "127.0.0.1" || host == "::1" {
                    Ok(())
                } else {
                    Err(InvalidInputError::ServerUrl {
                        value: original.to_string(),
                        reason: "plain HTTP is only allowed for localhost".to_string(),
                    }
                    .into())
                }
            }
            other => Err(InvalidInputError::ServerUrl {
                value: original.to_string(),
                reason: format!("unsupported scheme '{}'", other),
            }
            .into()),
        }
    }

    /// Returns the full URL for a given endpoint path.
    pub fn endpoint_url(&self, path: &str) -> String {
        // The URL crate always adds a trailing slash to root paths,
        // so trim before joining the endpoint path.
        let base = self.0.as_str().trim_end_matches('/');
        format!("{}{}", base, path)
    }

    /// Returns the base URL as a string.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// Returns the host string.
    pub fn host(&self) -> Option<&str> {
        self.0.host_str()
    }
}

impl fmt::Display for ServerUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ServerUrl {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl Serialize for ServerUrl {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.0.as_str())
    }
}

impl<'de> Deserialize<'de> for ServerUrl {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        ServerUrl::new(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_https() {
        let url = ServerUrl::new("https://app.example.com").unwrap();
        assert_eq!(url.host(), Some("app.example.com"));
    }

    #[test]
    fn accepts_http_localhost() {
        assert!(ServerUrl::new("http://localhost:3000").is_ok());
        assert!(ServerUrl::new("http://127.0.0.1:8080").is_ok());
    }

    #[test]
    fn rejects_http_remote() {
        assert!(ServerUrl::new("http://app.example.com").is_err());
    }

    #[test]
    fn rejects_unsupported_scheme() {
        assert!(ServerUrl::new("ftp://app.example.com").is_err());
        assert!(ServerUrl::new("not a url").is_err());
    }

    #[test]
    fn endpoint_url_joins_path() {
        let url = ServerUrl::new("https://app.example.com/").unwrap();
        assert_eq!(
            url.endpoint_url("/auth/me"),
            "https://app.example.com/auth/me"
        );
    }
}
