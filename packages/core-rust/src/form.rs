//! User-submitted wine input and its validation.
//!
//! [`WineForm`] carries the raw values of exactly the four editable fields.
//! Validation is driven entirely by the declarations in
//! [`WINE_FIELDS`](crate::schema::WINE_FIELDS): required-ness and maximum
//! length. Every text field also refuses NUL characters.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use crate::schema::{FieldDef, WINE_FIELDS};
use crate::wine::{Wine, WineFields};

/// Raw values submitted through the create or edit form.
///
/// Missing inputs deserialize as empty strings so that they surface as
/// "required" errors instead of a rejected request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WineForm {
    pub wine_name: String,
    pub price: String,
    pub varietal: String,
    pub description: String,
}

impl WineForm {
    /// Builds a form from decoded `key=value` pairs.
    ///
    /// A repeated key keeps its last value. Keys that are not wine fields
    /// are ignored.
    #[must_use]
    pub fn from_pairs<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut form = Self::default();
        for (key, value) in pairs {
            let slot = match key.as_ref() {
                "wine_name" => &mut form.wine_name,
                "price" => &mut form.price,
                "varietal" => &mut form.varietal,
                "description" => &mut form.description,
                _ => continue,
            };
            *slot = value.into();
        }
        form
    }

    /// Raw submitted values, in [`WINE_FIELDS`] order.
    fn raw(&self) -> [&str; 4] {
        [
            &self.wine_name,
            &self.price,
            &self.varietal,
            &self.description,
        ]
    }

    /// Cleans and validates the submitted values.
    ///
    /// Each value is stripped of leading and trailing whitespace, then
    /// checked against its field declaration.
    ///
    /// # Errors
    ///
    /// Returns every failing field with its messages. Nothing should be
    /// persisted when this fails.
    pub fn validate(&self) -> Result<WineFields, FormErrors> {
        let cleaned = self.raw().map(str::trim);

        let mut errors = FormErrors::default();
        for (field, value) in WINE_FIELDS.iter().zip(cleaned) {
            for message in check(field, value) {
                errors.add(field.name, message);
            }
        }
        if !errors.is_empty() {
            return Err(errors);
        }

        let [wine_name, price, varietal, description] = cleaned.map(str::to_string);
        Ok(WineFields::from_trusted_row(wine_name, price, varietal, description))
    }
}

/// Pre-fills the edit form with a record's current values.
impl From<&Wine> for WineForm {
    fn from(wine: &Wine) -> Self {
        Self {
            wine_name: wine.fields.wine_name().to_string(),
            price: wine.fields.price().to_string(),
            varietal: wine.fields.varietal().to_string(),
            description: wine.fields.description().to_string(),
        }
    }
}

/// Messages for one cleaned value. A missing value gets only the
/// "required" message; otherwise the length and NUL checks both run.
fn check(field: &FieldDef, value: &str) -> Vec<String> {
    if value.is_empty() {
        return if field.required {
            vec!["This field is required.".to_string()]
        } else {
            Vec::new()
        };
    }

    let mut messages = Vec::new();
    if let Some(max) = field.max_length {
        let len = value.chars().count();
        if len > max {
            messages.push(format!(
                "Ensure this value has at most {max} characters (it has {len})."
            ));
        }
    }
    if value.contains('\0') {
        messages.push("Null characters are not allowed.".to_string());
    }
    messages
}

/// Validation messages keyed by field name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FormErrors {
    by_field: BTreeMap<&'static str, Vec<String>>,
}

impl FormErrors {
    fn add(&mut self, field: &'static str, message: String) {
        self.by_field.entry(field).or_default().push(message);
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_field.is_empty()
    }

    /// Messages for one field, if it failed.
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.by_field.get(field).map(Vec::as_slice)
    }

    /// Names of the fields that failed.
    pub fn fields(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.by_field.keys().copied()
    }
}

impl fmt::Display for FormErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, messages) in &self.by_field {
            for message in messages {
                if !first {
                    f.write_str("; ")?;
                }
                write!(f, "{field}: {message}")?;
                first = false;
            }
        }
        Ok(())
    }
}

impl std::error::Error for FormErrors {}
