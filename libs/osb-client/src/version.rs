use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use crate::error::{ClientError, NotAllowedReason};

/// A released version of the Open Service Broker API.
///
/// Ordered by `(major, minor)`, never by label text. Only versions this
/// client knows how to speak are representable; parsing any other label
/// fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ApiVersion {
    V2_11,
    V2_12,
    V2_13,
    V2_14,
}

impl ApiVersion {
    /// Every supported version, oldest first.
    pub const ALL: [Self; 4] = [Self::V2_11, Self::V2_12, Self::V2_13, Self::V2_14];

    /// The newest version supported by this release of the client.
    pub const LATEST: Self = Self::V2_14;

    /// The value sent in the `X-Broker-Api-Version` header.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::V2_11 => "2.11",
            Self::V2_12 => "2.12",
            Self::V2_13 => "2.13",
            Self::V2_14 => "2.14",
        }
    }

    const fn numeric(self) -> (u8, u8) {
        match self {
            Self::V2_11 => (2, 11),
            Self::V2_12 => (2, 12),
            Self::V2_13 => (2, 13),
            Self::V2_14 => (2, 14),
        }
    }

    #[must_use]
    pub fn at_least(self, other: Self) -> bool {
        self >= other
    }

    #[must_use]
    pub fn is_less_than(self, other: Self) -> bool {
        !self.at_least(other)
    }

    /// Gate an operation on a minimum version.
    ///
    /// The returned error carries no operation context; callers wrap it via
    /// [`ClientError::not_allowed`] to say which operation was refused.
    ///
    /// # Errors
    /// Returns [`NotAllowedReason::ApiVersion`] when `self` is older than `minimum`.
    pub fn require_at_least(self, minimum: Self) -> Result<(), NotAllowedReason> {
        if self.at_least(minimum) {
            Ok(())
        } else {
            Err(NotAllowedReason::ApiVersion {
                required: minimum,
                current: self,
            })
        }
    }
}

impl Ord for ApiVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        self.numeric().cmp(&other.numeric())
    }
}

impl PartialOrd for ApiVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Default for ApiVersion {
    fn default() -> Self {
        Self::LATEST
    }
}

impl fmt::Display for ApiVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for ApiVersion {
    type Err = ClientError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|v| v.label() == s.trim())
            .ok_or_else(|| ClientError::BuildError(format!("unsupported API version: {s}")))
    }
}
