//! Strongly-typed business keys used across the ledger.
//!
//! Both keys are human-assigned strings (account codes like `"1111"`, entry
//! numbers like `"JV-2024-001"`), validated once at the boundary so the rest
//! of the domain can trust them.

use core::str::FromStr;
use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// Unique code of an account in the chart of accounts.
///
/// Immutable after creation; doubles as the hierarchy edge (a child stores
/// its parent's code).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccountCode(String);

/// Unique human-assigned identifier of a journal entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntryNumber(String);

macro_rules! impl_code_newtype {
    ($t:ty, $name:literal) => {
        impl $t {
            /// Validate and wrap a raw code.
            ///
            /// Leading/trailing whitespace is trimmed; the result must be
            /// non-empty.
            pub fn new(raw: impl AsRef<str>) -> Result<Self, DomainError> {
                let trimmed = raw.as_ref().trim();
                if trimmed.is_empty() {
                    return Err(DomainError::validation(concat!($name, " must not be empty")));
                }
                Ok(Self(trimmed.to_string()))
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl core::fmt::Display for $t {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl FromStr for $t {
            type Err = DomainError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::new(s)
            }
        }

        impl AsRef<str> for $t {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

impl_code_newtype!(AccountCode, "AccountCode");
impl_code_newtype!(EntryNumber, "EntryNumber");

impl EntryNumber {
    /// Number used for the automatically created reversing entry.
    pub fn reversal(&self) -> EntryNumber {
        EntryNumber(format!("{}-R", self.0))
    }
}
