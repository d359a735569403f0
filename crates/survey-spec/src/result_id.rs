use std::fmt;

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// Identifier of one physical survey visit.
///
/// Either handed out by the backend, which lets a retried submission reuse it, or
/// derived locally as `S` + `YYYYMMDDHHMMSS`. Two local ids minted in the same
/// second on the same device collide.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResultId(String);

impl ResultId {
    /// Wraps an identifier supplied by the backend.
    pub fn supplied(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Derives the identifier for `instant`, UTC fields.
    pub fn from_instant(instant: OffsetDateTime) -> Self {
        let instant = instant.to_offset(time::UtcOffset::UTC);
        Self(format!(
            "S{:04}{:02}{:02}{:02}{:02}{:02}",
            instant.year(),
            u8::from(instant.month()),
            instant.day(),
            instant.hour(),
            instant.minute(),
            instant.second()
        ))
    }

    pub fn generate() -> Self {
        Self::from_instant(OffsetDateTime::now_utc())
    }

    /// Prefers a non-blank backend id, otherwise derives one from `instant`.
    pub fn resolve(supplied: Option<&str>, instant: OffsetDateTime) -> Self {
        match supplied.map(str::trim).filter(|id| !id.is_empty()) {
            Some(id) => Self::supplied(id),
            None => Self::from_instant(instant),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ResultId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
