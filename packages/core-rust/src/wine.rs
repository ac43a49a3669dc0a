//! The wine record and its identity.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::form::{FormErrors, WineForm};

/// Identity of a persisted wine.
///
/// Assigned by the store at creation and never reassigned or reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WineId(i64);

impl WineId {
    /// Wraps a raw identity value produced by a store.
    #[must_use]
    pub const fn new(raw: i64) -> Self {
        Self(raw)
    }

    /// Returns the raw identity value.
    #[must_use]
    pub const fn get(self) -> i64 {
        self.0
    }
}

impl fmt::Display for WineId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Error returned when a path segment is not a wine identity.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("not a wine id: {input:?}")]
pub struct ParseWineIdError {
    input: String,
}

impl FromStr for WineId {
    type Err = ParseWineIdError;

    /// Accepts only non-empty runs of ASCII digits that fit in an `i64`.
    /// Signs, whitespace and anything else are rejected.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParseWineIdError {
            input: s.to_string(),
        };
        if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
            return Err(err());
        }
        s.parse::<i64>().map(Self).map_err(|_| err())
    }
}

/// The four user-editable fields of a wine.
///
/// [`WineFields::new`] and [`WineForm::validate`] are the only checked
/// constructors. [`WineFields::from_trusted_row`] and `Deserialize` skip
/// validation and exist for store backends reading back their own rows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WineFields {
    wine_name: String,
    price: String,
    varietal: String,
    description: String,
}

impl WineFields {
    /// Validates and builds a field set.
    ///
    /// Values are stripped of surrounding whitespace first, exactly as a
    /// submitted [`WineForm`] would be.
    ///
    /// # Errors
    ///
    /// Returns the per-field validation messages if any value is missing
    /// or too long.
    pub fn new(
        wine_name: impl Into<String>,
        price: impl Into<String>,
        varietal: impl Into<String>,
        description: impl Into<String>,
    ) -> Result<Self, FormErrors> {
        WineForm {
            wine_name: wine_name.into(),
            price: price.into(),
            varietal: varietal.into(),
            description: description.into(),
        }
        .validate()
    }

    /// Rebuilds a field set without validation.
    ///
    /// Only for store backends reading rows that were written from
    /// validated fields.
    #[doc(hidden)]
    #[must_use]
    pub fn from_trusted_row(
        wine_name: String,
        price: String,
        varietal: String,
        description: String,
    ) -> Self {
        Self {
            wine_name,
            price,
            varietal,
            description,
        }
    }

    #[must_use]
    pub fn wine_name(&self) -> &str {
        &self.wine_name
    }

    /// Free-text price. Not numeric; no arithmetic or ordering applies.
    #[must_use]
    pub fn price(&self) -> &str {
        &self.price
    }

    #[must_use]
    pub fn varietal(&self) -> &str {
        &self.varietal
    }

    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }
}

/// A persisted wine record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Wine {
    /// Store-assigned identity.
    pub id: WineId,
    /// Current field values.
    #[serde(flatten)]
    pub fields: WineFields,
}

impl Wine {
    #[must_use]
    pub fn new(id: WineId, fields: WineFields) -> Self {
        Self { id, fields }
    }
}

/// A wine displays as its name.
impl fmt::Display for Wine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.fields.wine_name)
    }
}
