//! Email address type for the SMTP envelope.

use crate::error::{Error, Result};

/// Email address used in `MAIL FROM` and `RCPT TO`.
///
/// Validation is deliberately shallow: the address is supplied pre-formed
/// by the caller, so only the shape needed to build a syntactically valid
/// envelope command is checked.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Address(String);

impl Address {
    /// Creates a new address from a string.
    ///
    /// # Errors
    ///
    /// Returns an error if the address is empty, lacks an `@`, or has an
    /// empty local or domain part.
    pub fn new(addr: impl Into<String>) -> Result<Self> {
        let addr = addr.into();
        Self::validate(&addr)?;
        Ok(Self(addr))
    }

    /// Returns the address as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn validate(addr: &str) -> Result<()> {
        if addr.is_empty() {
            return Err(Error::InvalidAddress("address cannot be empty".into()));
        }

        let Some((local, domain)) = addr.split_once('@') else {
            return Err(Error::InvalidAddress(format!("missing @ in {addr}")));
        };

        if local.is_empty() || domain.is_empty() || domain.contains('@') {
            return Err(Error::InvalidAddress(format!("malformed address {addr}")));
        }

        // Angle brackets or line breaks would corrupt the envelope command.
        if addr.bytes().any(|b| matches!(b, b'<' | b'>' | b'\r' | b'\n')) {
            return Err(Error::InvalidAddress(format!(
                "forbidden character in {addr}"
            )));
        }

        Ok(())
    }
}

impl std::fmt::Display for Address {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
