//! Internal utilities.

pub mod validation;

use chrono::{DateTime, SecondsFormat, Utc};

pub use validation::Validator;

/// Fixed-width RFC 3339 rendering; stored timestamps compare correctly as text.
pub fn timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub fn now() -> String {
    timestamp(Utc::now())
}
