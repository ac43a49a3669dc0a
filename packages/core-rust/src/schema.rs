use serde::Serialize;

/// Maximum length of [`WineFields::wine_name`](crate::WineFields::wine_name), in characters.
pub const WINE_NAME_MAX_LENGTH: usize = 50;
/// Maximum length of [`WineFields::price`](crate::WineFields::price), in characters.
pub const PRICE_MAX_LENGTH: usize = 10;
/// Maximum length of [`WineFields::varietal`](crate::WineFields::varietal), in characters.
pub const VARIETAL_MAX_LENGTH: usize = 50;

/// How a field is presented in an HTML form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Widget {
    /// Single-line `<input type="text">`.
    Text,
    /// Multi-line `<textarea>`.
    Textarea,
}

/// Declaration of a single persisted, user-editable field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FieldDef {
    /// Field name, used as the form input name and the storage column.
    pub name: &'static str,
    /// Human-readable label shown next to the input.
    pub label: &'static str,
    /// Maximum length in characters. `None` means unbounded.
    pub max_length: Option<usize>,
    /// Whether the field must be non-empty.
    pub required: bool,
    /// Input widget used when rendering the form.
    pub widget: Widget,
}

/// The four mutable fields of a wine, in declaration order.
///
/// Identity is deliberately absent: it is never accepted from input.
pub const WINE_FIELDS: [FieldDef; 4] = [
    FieldDef {
        name: "wine_name",
        label: "Wine name",
        max_length: Some(WINE_NAME_MAX_LENGTH),
        required: true,
        widget: Widget::Text,
    },
    FieldDef {
        name: "price",
        label: "Price",
        max_length: Some(PRICE_MAX_LENGTH),
        required: true,
        widget: Widget::Text,
    },
    FieldDef {
        name: "varietal",
        label: "Varietal",
        max_length: Some(VARIETAL_MAX_LENGTH),
        required: true,
        widget: Widget::Text,
    },
    FieldDef {
        name: "description",
        label: "Description",
        max_length: None,
        required: true,
        widget: Widget::Textarea,
    },
];

/// Looks up a field declaration by name.
#[must_use]
pub fn field(name: &str) -> Option<&'static FieldDef> {
    WINE_FIELDS.iter().find(|f| f.name == name)
}
