//! Explicit model schemas
//!
//! Instead of runtime introspection, every admin model declares its fields
//! once through a [`ModelSchema`]: an ordered list of [`FieldSpec`]s carrying
//! the field name, its value kind and the HTML input widget to render for it.
//! The schema drives the scaffold generator, the form binder and the store.

use serde::de::DeserializeOwned;
use serde::{Serialize, Serializer};

/// Value kind of a schema field
///
/// This is the set the default form binder understands, plus [`Json`] for
/// structured columns that can be listed and stored but not bound from a
/// plain form field.
///
/// [`Json`]: FieldKind::Json
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// UTF-8 string
    Text,
    /// Signed 64-bit integer
    Int,
    /// Unsigned 64-bit integer
    UInt,
    /// 32-bit float
    Float32,
    /// 64-bit float
    Float64,
    /// Boolean
    Bool,
    /// Arbitrary JSON value (not form-bindable)
    Json,
}

impl FieldKind {
    /// Stable lowercase name, used in templates and error messages
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Int => "int",
            Self::UInt => "uint",
            Self::Float32 => "float32",
            Self::Float64 => "float64",
            Self::Bool => "bool",
            Self::Json => "json",
        }
    }
}

impl std::fmt::Display for FieldKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl Serialize for FieldKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// HTML input widget hint for a schema field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InputKind {
    /// Plain text input (default)
    #[default]
    Text,
    /// Multi-line textarea
    Textarea,
    /// Markdown editor (rendered as a textarea with a marker class)
    Markdown,
    /// Raw HTML editor (rendered as a textarea with a marker class)
    Html,
    /// Number input
    Number,
    /// Checkbox
    Checkbox,
    /// Date and time input
    DateTime,
    /// Hidden input
    Hidden,
    /// Password input
    Password,
    /// Email input
    Email,
    /// URL input
    Url,
    /// Color picker
    Color,
    /// Range slider
    Range,
    /// Search input
    Search,
}

impl InputKind {
    /// The HTML `type` attribute value (or widget name for non-input widgets)
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Textarea => "textarea",
            Self::Markdown => "markdown",
            Self::Html => "html",
            Self::Number => "number",
            Self::Checkbox => "checkbox",
            Self::DateTime => "datetime-local",
            Self::Hidden => "hidden",
            Self::Password => "password",
            Self::Email => "email",
            Self::Url => "url",
            Self::Color => "color",
            Self::Range => "range",
            Self::Search => "search",
        }
    }
}

impl std::fmt::Display for InputKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl Serialize for InputKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// One field of a model schema
#[derive(Debug, Clone, Serialize)]
pub struct FieldSpec {
    /// Field name, matching the struct field and the form input name
    pub name: String,
    /// Value kind
    pub kind: FieldKind,
    /// Input widget hint
    pub input: InputKind,
    /// Label text (falls back to the field name in templates)
    pub label: Option<String>,
    /// Placeholder text
    pub placeholder: Option<String>,
}

impl FieldSpec {
    fn new(name: impl Into<String>, kind: FieldKind, input: InputKind) -> Self {
        Self {
            name: name.into(),
            kind,
            input,
            label: None,
            placeholder: None,
        }
    }

    /// A text field
    #[must_use]
    pub fn text(name: impl Into<String>) -> Self {
        Self::new(name, FieldKind::Text, InputKind::Text)
    }

    /// A signed integer field
    #[must_use]
    pub fn int(name: impl Into<String>) -> Self {
        Self::new(name, FieldKind::Int, InputKind::Number)
    }

    /// An unsigned integer field
    #[must_use]
    pub fn uint(name: impl Into<String>) -> Self {
        Self::new(name, FieldKind::UInt, InputKind::Number)
    }

    /// A 32-bit float field
    #[must_use]
    pub fn float32(name: impl Into<String>) -> Self {
        Self::new(name, FieldKind::Float32, InputKind::Number)
    }

    /// A 64-bit float field
    #[must_use]
    pub fn float64(name: impl Into<String>) -> Self {
        Self::new(name, FieldKind::Float64, InputKind::Number)
    }

    /// A boolean field
    #[must_use]
    pub fn bool(name: impl Into<String>) -> Self {
        Self::new(name, FieldKind::Bool, InputKind::Checkbox)
    }

    /// A JSON field (displayed but not form-bindable)
    #[must_use]
    pub fn json(name: impl Into<String>) -> Self {
        Self::new(name, FieldKind::Json, InputKind::Textarea)
    }

    /// Override the input widget
    #[must_use]
    pub const fn input(mut self, input: InputKind) -> Self {
        self.input = input;
        self
    }

    /// Set the label text
    #[must_use]
    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Set the placeholder text
    #[must_use]
    pub fn placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = Some(placeholder.into());
        self
    }
}

/// Schema descriptor for one admin model
#[derive(Debug, Clone, Serialize)]
pub struct ModelSchema {
    /// Model name as shown in headings and menus (e.g. "Car")
    pub name: String,
    /// Ordered field list; the record id is implicit and never listed here
    pub fields: Vec<FieldSpec>,
}

impl ModelSchema {
    /// Create an empty schema for the named model
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: Vec::new(),
        }
    }

    /// Append a field
    #[must_use]
    pub fn field(mut self, field: FieldSpec) -> Self {
        self.fields.push(field);
        self
    }

    /// Lowercased model name, used for paths and template file names
    #[must_use]
    pub fn slug(&self) -> String {
        self.name.to_lowercase()
    }

    /// Template file name for the list view
    #[must_use]
    pub fn list_template(&self) -> String {
        format!("{}-list.html", self.slug())
    }

    /// Template file name for the detail view
    #[must_use]
    pub fn detail_template(&self) -> String {
        format!("{}.html", self.slug())
    }

    /// Template file name for the form view
    #[must_use]
    pub fn form_template(&self) -> String {
        format!("{}-form.html", self.slug())
    }

    /// Look up a field by name
    #[must_use]
    pub fn field_named(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }
}

/// A model that can be administered by a [`CrudCtrl`]
///
/// Implementors declare their schema once and expose the record id; serde
/// carries the field values everywhere else.
///
/// [`CrudCtrl`]: crate::controller::CrudCtrl
pub trait AdminModel:
    Serialize + DeserializeOwned + Default + Send + Sync + 'static
{
    /// The model's schema descriptor
    fn schema() -> ModelSchema;

    /// Record id, `None` for unsaved records
    fn id(&self) -> Option<i64>;

    /// Set the record id
    fn set_id(&mut self, id: i64);
}
