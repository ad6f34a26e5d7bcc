//! Reference number formatting.
//!
//! Pure string functions over a civil date-time; the only side effect lives
//! in [`ReferenceScheme::issue`], which draws from a [`SerialAllocator`].

use jiff::civil::DateTime;
use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::serial::SerialAllocator;

/// `"<prefix><MM>-<YYYY>-CR<serial>"`, e.g. `BKR07-2024-CR42`.
pub fn format_business_reference(prefix: &str, serial: u64, now: DateTime) -> String {
    format!("{prefix}{:02}-{:04}-CR{serial}", now.month(), now.year())
}

/// 14-digit timestamp `DDMMYYYYHHMMSS`, used as an invoice id.
pub fn format_unique_reference(now: DateTime) -> String {
    format!(
        "{:02}{:02}{:04}{:02}{:02}{:02}",
        now.day(),
        now.month(),
        now.year(),
        now.hour(),
        now.minute(),
        now.second()
    )
}

/// How a template obtains its reference number.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ReferenceScheme {
    /// Prefixed month/year reference backed by the serial counter.
    Business { prefix: String },
    /// Timestamp id; no counter involved.
    Unique,
}

impl ReferenceScheme {
    /// Produce a reference for `now`. Business references consume one serial
    /// and fail with [`CoreError::NoSerialCounter`] when `allocator` is `None`;
    /// see [`ReferenceScheme::needs_allocator`].
    pub fn issue(
        &self,
        allocator: Option<&SerialAllocator>,
        now: DateTime,
    ) -> Result<String, CoreError> {
        match self {
            ReferenceScheme::Business { prefix } => {
                let allocator = allocator.ok_or(CoreError::NoSerialCounter)?;
                let serial = allocator.allocate_next()?;
                Ok(format_business_reference(prefix, serial, now))
            }
            ReferenceScheme::Unique => Ok(format_unique_reference(now)),
        }
    }

    /// Whether [`ReferenceScheme::issue`] draws from the serial counter.
    pub fn needs_allocator(&self) -> bool {
        matches!(self, ReferenceScheme::Business { .. })
    }
}
