//! HTML page rendering with Tera.
//!
//! Templates live in the crate's `templates/` directory and are embedded
//! into the binary at compile time. Every template name ends in `.html`, so
//! Tera auto-escapes all interpolated record values.

use cellar_core::{FormErrors, Widget, Wine, WineForm, WineId, WINE_FIELDS};
use rust_embed::RustEmbed;
use serde::Serialize;
use tera::{Context, Tera};

#[derive(RustEmbed)]
#[folder = "templates/"]
struct EmbeddedTemplates;

/// Whether a form page creates a new wine or edits an existing one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormMode {
    /// `POST /new`.
    Create,
    /// `POST /{id}/edit`.
    Edit(WineId),
}

impl FormMode {
    fn heading(self) -> &'static str {
        match self {
            Self::Create => "New wine",
            Self::Edit(_) => "Edit wine",
        }
    }

    fn action(self) -> String {
        match self {
            Self::Create => "/new".to_string(),
            Self::Edit(id) => format!("/{id}/edit"),
        }
    }

    fn cancel(self) -> String {
        match self {
            Self::Create => "/".to_string(),
            Self::Edit(id) => format!("/{id}"),
        }
    }
}

/// One input row of the wine form.
#[derive(Debug, Serialize)]
struct FieldView<'a> {
    name: &'static str,
    label: &'static str,
    widget: Widget,
    max_length: Option<usize>,
    value: &'a str,
    errors: &'a [String],
}

/// Renders every page of the application.
///
/// Cheap to share behind an `Arc`; rendering takes `&self`.
pub struct Views {
    tera: Tera,
}

impl Views {
    /// Loads and compiles the embedded templates.
    ///
    /// # Errors
    ///
    /// Returns an error if a template is not UTF-8 or fails to parse.
    pub fn new() -> Result<Self, tera::Error> {
        let mut sources = Vec::new();
        for name in EmbeddedTemplates::iter() {
            let Some(file) = EmbeddedTemplates::get(&name) else {
                continue;
            };
            let source = String::from_utf8(file.data.into_owned())
                .map_err(|e| tera::Error::msg(format!("template {name} is not UTF-8: {e}")))?;
            sources.push((name.into_owned(), source));
        }

        let mut tera = Tera::default();
        // Added together so `{% extends %}` resolves regardless of order.
        tera.add_raw_templates(sources)?;
        Ok(Self { tera })
    }

    /// `GET /`: every wine, in store order.
    pub fn wine_list(&self, wines: &[Wine]) -> Result<String, tera::Error> {
        let mut ctx = Context::new();
        ctx.insert("wines", wines);
        self.tera.render("wine_list.html", &ctx)
    }

    /// `GET /{id}`.
    pub fn wine_detail(&self, wine: &Wine) -> Result<String, tera::Error> {
        let mut ctx = Context::new();
        ctx.insert("wine", wine);
        self.tera.render("wine_detail.html", &ctx)
    }

    /// Create or edit form, pre-filled with `form` and annotated with `errors`.
    pub fn wine_form(
        &self,
        mode: FormMode,
        form: &WineForm,
        errors: Option<&FormErrors>,
    ) -> Result<String, tera::Error> {
        let values = [
            form.wine_name.as_str(),
            form.price.as_str(),
            form.varietal.as_str(),
            form.description.as_str(),
        ];
        let fields: Vec<FieldView<'_>> = WINE_FIELDS
            .iter()
            .zip(values)
            .map(|(def, value)| FieldView {
                name: def.name,
                label: def.label,
                widget: def.widget,
                max_length: def.max_length,
                value,
                errors: errors.and_then(|e| e.get(def.name)).unwrap_or_default(),
            })
            .collect();

        let mut ctx = Context::new();
        ctx.insert("heading", mode.heading());
        ctx.insert("action", &mode.action());
        ctx.insert("cancel", &mode.cancel());
        ctx.insert("fields", &fields);
        self.tera.render("wine_form.html", &ctx)
    }

    /// `GET /{id}/delete`.
    pub fn delete_confirm(&self, wine: &Wine) -> Result<String, tera::Error> {
        let mut ctx = Context::new();
        ctx.insert("wine", wine);
        self.tera.render("wine_confirm_delete.html", &ctx)
    }

    pub fn not_found(&self) -> Result<String, tera::Error> {
        self.tera.render("not_found.html", &Context::new())
    }

    pub fn server_error(&self) -> Result<String, tera::Error> {
        self.tera.render("server_error.html", &Context::new())
    }
}
