//! Expiry Options Module
//!
//! Relative or absolute expiry requested by a caller, resolved to a TTL.

use std::time::Duration;

use chrono::{DateTime, Utc};

use crate::error::{CacheError, Result};

// == Expiry ==
/// Expiry requested for a write, given as a duration or as a point in time.
///
/// At most one form may be set. With neither, the store's default TTL applies.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Expiry {
    expires_in: Option<Duration>,
    expires_at: Option<DateTime<Utc>>,
}

impl Expiry {
    /// No explicit expiry: the store default applies.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds an expiry from optional parts, rejecting both at once.
    pub fn from_parts(
        expires_in: Option<Duration>,
        expires_at: Option<DateTime<Utc>>,
    ) -> Result<Self> {
        let expiry = Self {
            expires_in,
            expires_at,
        };
        expiry.validate()?;
        Ok(expiry)
    }

    /// Expire `ttl` after the write.
    pub fn expires_in(mut self, ttl: Duration) -> Self {
        self.expires_in = Some(ttl);
        self
    }

    /// Expire at an absolute time.
    pub fn expires_at(mut self, at: DateTime<Utc>) -> Self {
        self.expires_at = Some(at);
        self
    }

    // == Validate ==
    /// Fails with an argument error if both a duration and a time are set.
    pub fn validate(&self) -> Result<()> {
        if self.expires_in.is_some() && self.expires_at.is_some() {
            return Err(CacheError::Argument(
                "expires_in and expires_at are mutually exclusive".to_string(),
            ));
        }
        Ok(())
    }

    // == Resolve ==
    /// Resolves to a TTL relative to `now`.
    ///
    /// A time already in the past resolves to a zero TTL, which stores an
    /// entry that no read will return.
    pub fn ttl_at(&self, now: DateTime<Utc>) -> Result<Option<Duration>> {
        self.validate()?;
        Ok(match (self.expires_in, self.expires_at) {
            (Some(ttl), _) => Some(ttl),
            (None, Some(at)) => Some((at - now).to_std().unwrap_or(Duration::ZERO)),
            (None, None) => None,
        })
    }

    /// Resolves to a TTL relative to the current time.
    pub fn ttl(&self) -> Result<Option<Duration>> {
        self.ttl_at(Utc::now())
    }
}
