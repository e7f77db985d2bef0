//! WiFi credentials.
//!
//! Platform-independent credential type with the same length rules the
//! ESP-IDF driver enforces, so bad input is rejected before the radio is
//! touched.
//!
//! # Example
//!
//! ```
//! use inkquote_net::config::Credentials;
//!
//! let creds = Credentials::new("MyNetwork", "MyPassword").unwrap();
//! assert!(!creds.is_open());
//!
//! let open = Credentials::new("CafeGuest", "").unwrap();
//! assert!(open.is_open());
//! ```

use std::fmt;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Maximum SSID length per IEEE 802.11 standard.
pub const MAX_SSID_LEN: usize = 32;

/// Maximum passphrase length for WPA2.
pub const MAX_PASSPHRASE_LEN: usize = 64;

/// Minimum passphrase length for WPA2.
pub const MIN_PASSPHRASE_LEN: usize = 8;

/// Credentials for associating with an access point.
///
/// Both fields are wiped from memory when the value is dropped.
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct Credentials {
    ssid: String,
    passphrase: String,
}

impl Credentials {
    /// Create validated credentials.
    ///
    /// An empty passphrase selects an open network.
    pub fn new(
        ssid: impl Into<String>,
        passphrase: impl Into<String>,
    ) -> Result<Self, CredentialError> {
        let creds = Self {
            ssid: ssid.into(),
            passphrase: passphrase.into(),
        };
        creds.validate()?;
        Ok(creds)
    }

    /// Validate SSID and passphrase lengths.
    pub fn validate(&self) -> Result<(), CredentialError> {
        if self.ssid.is_empty() {
            return Err(CredentialError::SsidEmpty);
        }
        if self.ssid.len() > MAX_SSID_LEN {
            return Err(CredentialError::SsidTooLong {
                len: self.ssid.len(),
                max: MAX_SSID_LEN,
            });
        }

        // Empty is fine (open network)
        if !self.passphrase.is_empty() && self.passphrase.len() < MIN_PASSPHRASE_LEN {
            return Err(CredentialError::PassphraseTooShort {
                len: self.passphrase.len(),
                min: MIN_PASSPHRASE_LEN,
            });
        }
        if self.passphrase.len() > MAX_PASSPHRASE_LEN {
            return Err(CredentialError::PassphraseTooLong {
                len: self.passphrase.len(),
                max: MAX_PASSPHRASE_LEN,
            });
        }

        Ok(())
    }

    /// Network SSID.
    pub fn ssid(&self) -> &str {
        &self.ssid
    }

    /// Network passphrase (empty for open networks).
    pub fn passphrase(&self) -> &str {
        &self.passphrase
    }

    /// Check if this is an open network (no passphrase).
    pub fn is_open(&self) -> bool {
        self.passphrase.is_empty()
    }
}

// Keep the passphrase out of logs.
impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("ssid", &self.ssid)
            .field("passphrase", &"<redacted>")
            .finish()
    }
}

/// Errors raised while validating credentials.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CredentialError {
    /// SSID is empty.
    SsidEmpty,
    /// SSID exceeds maximum length.
    SsidTooLong { len: usize, max: usize },
    /// Passphrase is too short for WPA2.
    PassphraseTooShort { len: usize, min: usize },
    /// Passphrase exceeds maximum length.
    PassphraseTooLong { len: usize, max: usize },
}

impl fmt::Display for CredentialError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SsidEmpty => write!(f, "SSID cannot be empty"),
            Self::SsidTooLong { len, max } => {
                write!(f, "SSID too long: {} bytes (max {})", len, max)
            }
            Self::PassphraseTooShort { len, min } => {
                write!(f, "passphrase too short: {} bytes (min {})", len, min)
            }
            Self::PassphraseTooLong { len, max } => {
                write!(f, "passphrase too long: {} bytes (max {})", len, max)
            }
        }
    }
}

impl std::error::Error for CredentialError {}
