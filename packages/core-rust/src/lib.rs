//! Cellar Core: wine record types, field declarations, and form validation.

pub mod form;
pub mod schema;
pub mod wine;

pub use form::{FormErrors, WineForm};
pub use schema::{FieldDef, Widget, WINE_FIELDS};
pub use wine::{ParseWineIdError, Wine, WineFields, WineId};
