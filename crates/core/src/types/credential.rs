//! Bearer credential issued by the catalog API.

use core::fmt;

use secrecy::{ExposeSecret, SecretString};

/// Opaque bearer token proving the signed-in identity.
///
/// The token is held as a [`SecretString`] so it never appears in `Debug`
/// output or logs. Use [`Credential::expose`] only at the points where the
/// raw value must leave the process (HTTP header, durable storage).
#[derive(Clone)]
pub struct Credential(SecretString);

impl Credential {
    /// Wrap a raw token.
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self(SecretString::from(token.into()))
    }

    /// Returns the raw token.
    #[must_use]
    pub fn expose(&self) -> &str {
        self.0.expose_secret()
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential([REDACTED])")
    }
}

impl From<SecretString> for Credential {
    fn from(secret: SecretString) -> Self {
        Self(secret)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_redacts_token() {
        let credential = Credential::new("eyJhbGciOi.secret");
        let debug = format!("{credential:?}");
        assert!(!debug.contains("secret"));
        assert!(debug.contains("REDACTED"));
    }

    #[test]
    fn test_expose_returns_raw_token() {
        assert_eq!(Credential::new("abc").expose(), "abc");
    }
}
