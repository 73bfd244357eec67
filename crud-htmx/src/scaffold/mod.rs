//! Template scaffolding
//!
//! Generates the per-model admin templates (list, detail, form) plus the
//! shared layout and site index from built-in skeletons. Skeletons are themselves minijinja
//! templates with `[[ ]]` / `[% %]` delimiters, so the `{{ }}` and `{% %}`
//! constructs they emit survive generation untouched and run later in the
//! runtime engine.
//!
//! Whether an output file is written is governed by the configured
//! [`ScaffoldStrategy`]: overwrite every time, fill gaps only, or never.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use minijinja::syntax::SyntaxConfig;
use minijinja::value::Value;
use minijinja::{context, AutoEscape, Environment, Error, ErrorKind};
use serde::Serialize;
use tracing::{debug, info};

use crate::config::{CrudConfig, ScaffoldStrategy};
use crate::error::CrudError;
use crate::schema::ModelSchema;

/// One entry of the generated navigation menu
#[derive(Debug, Clone, Serialize)]
pub struct MenuEntry {
    /// Link text
    pub title: String,
    /// Link target
    pub path: String,
}

impl MenuEntry {
    /// Create a menu entry
    pub fn new(title: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            path: path.into(),
        }
    }
}

/// Which template a skeleton produces
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScaffoldKind {
    /// Shared page layout
    Layout,
    /// Site index page
    Index,
    /// Model list view
    List,
    /// Single record view
    Detail,
    /// Create/edit form
    Form,
}

impl ScaffoldKind {
    /// All kinds, in export order
    pub const ALL: [Self; 5] = [
        Self::Layout,
        Self::Index,
        Self::List,
        Self::Detail,
        Self::Form,
    ];

    /// Skeleton file name used by export and overrides
    #[must_use]
    pub const fn file_name(&self) -> &'static str {
        match self {
            Self::Layout => "layout.html",
            Self::Index => "index.html",
            Self::List => "list.html",
            Self::Detail => "detail.html",
            Self::Form => "form.html",
        }
    }
}

/// The five skeleton sources the scaffolder renders from
#[derive(Debug, Clone)]
pub struct ScaffoldSet {
    layout: String,
    index: String,
    list: String,
    detail: String,
    form: String,
}

impl Default for ScaffoldSet {
    fn default() -> Self {
        Self {
            layout: include_str!("skeletons/layout.html").to_string(),
            index: include_str!("skeletons/index.html").to_string(),
            list: include_str!("skeletons/list.html").to_string(),
            detail: include_str!("skeletons/detail.html").to_string(),
            form: include_str!("skeletons/form.html").to_string(),
        }
    }
}

impl ScaffoldSet {
    /// The skeleton source for a kind
    #[must_use]
    pub fn source(&self, kind: ScaffoldKind) -> &str {
        match kind {
            ScaffoldKind::Layout => &self.layout,
            ScaffoldKind::Index => &self.index,
            ScaffoldKind::List => &self.list,
            ScaffoldKind::Detail => &self.detail,
            ScaffoldKind::Form => &self.form,
        }
    }

    /// Replace the skeleton source for a kind
    pub fn set_source(&mut self, kind: ScaffoldKind, source: impl Into<String>) {
        let source = source.into();
        match kind {
            ScaffoldKind::Layout => self.layout = source,
            ScaffoldKind::Index => self.index = source,
            ScaffoldKind::List => self.list = source,
            ScaffoldKind::Detail => self.detail = source,
            ScaffoldKind::Form => self.form = source,
        }
    }

    /// Load overrides from a directory
    ///
    /// Any of `layout.html`, `index.html`, `list.html`, `detail.html`,
    /// `form.html` found in
    /// `dir` replaces the built-in skeleton; missing files keep the default.
    pub fn overridden_from(mut self, dir: impl AsRef<Path>) -> Result<Self, CrudError> {
        for kind in ScaffoldKind::ALL {
            let path = dir.as_ref().join(kind.file_name());
            if path.is_file() {
                debug!(skeleton = kind.file_name(), "using skeleton override");
                self.set_source(kind, std::fs::read_to_string(&path)?);
            }
        }
        Ok(self)
    }

    /// Write the skeleton sources to a directory for customization
    ///
    /// Refuses to overwrite existing files unless `force` is set.
    pub fn export(&self, dir: impl AsRef<Path>, force: bool) -> Result<Vec<PathBuf>, CrudError> {
        std::fs::create_dir_all(dir.as_ref())?;
        let mut written = Vec::new();
        for kind in ScaffoldKind::ALL {
            let path = dir.as_ref().join(kind.file_name());
            if path.exists() && !force {
                return Err(CrudError::Config(format!(
                    "refusing to overwrite {} (pass force to replace it)",
                    path.display()
                )));
            }
            std::fs::write(&path, self.source(kind))?;
            info!(path = %path.display(), "exported skeleton");
            written.push(path);
        }
        Ok(written)
    }
}

/// Renders skeletons into concrete template files
#[derive(Debug, Clone)]
pub struct Scaffolder {
    config: Arc<CrudConfig>,
    set: ScaffoldSet,
}

impl Scaffolder {
    /// Scaffolder with the built-in skeleton set
    #[must_use]
    pub fn new(config: Arc<CrudConfig>) -> Self {
        Self {
            config,
            set: ScaffoldSet::default(),
        }
    }

    /// Scaffolder with a custom skeleton set
    #[must_use]
    pub const fn with_set(config: Arc<CrudConfig>, set: ScaffoldSet) -> Self {
        Self { config, set }
    }

    /// Generate the list, detail and form templates for a model
    ///
    /// Returns the paths actually written; an empty vec means the strategy
    /// skipped everything.
    pub fn scaffold_model(
        &self,
        schema: &ModelSchema,
        base: &str,
    ) -> Result<Vec<PathBuf>, CrudError> {
        let ctx = context! {
            model => schema.name,
            slug => schema.slug(),
            base => base,
            fields => schema.fields,
        };
        let jobs = [
            (ScaffoldKind::List, schema.list_template()),
            (ScaffoldKind::Detail, schema.detail_template()),
            (ScaffoldKind::Form, schema.form_template()),
        ];

        let mut written = Vec::new();
        for (kind, file_name) in jobs {
            if let Some(path) = self.write(kind, &file_name, &ctx)? {
                written.push(path);
            }
        }
        Ok(written)
    }

    /// Generate templates for several models at once
    ///
    /// Each model's base path defaults to `/{slug}`. Returns every path
    /// written across all models.
    pub fn scaffold_all<'a, I>(&self, schemas: I) -> Result<Vec<PathBuf>, CrudError>
    where
        I: IntoIterator<Item = &'a ModelSchema>,
    {
        let mut written = Vec::new();
        for schema in schemas {
            let base = format!("/{}", schema.slug());
            written.extend(self.scaffold_model(schema, &base)?);
        }
        Ok(written)
    }

    /// Generate the shared layout template
    ///
    /// No-op when the configuration has no layout.
    pub fn scaffold_layout(
        &self,
        title: &str,
        menu: &[MenuEntry],
    ) -> Result<Option<PathBuf>, CrudError> {
        let Some(layout) = self.config.layout.clone() else {
            return Ok(None);
        };
        let ctx = context! { title => title, menu => menu };
        self.write(ScaffoldKind::Layout, &layout, &ctx)
    }

    /// Generate the site index template with one link per menu entry
    pub fn scaffold_index(
        &self,
        title: &str,
        menu: &[MenuEntry],
    ) -> Result<Option<PathBuf>, CrudError> {
        let ctx = context! { title => title, menu => menu };
        self.write(ScaffoldKind::Index, "index.html", &ctx)
    }

    fn write(
        &self,
        kind: ScaffoldKind,
        file_name: &str,
        ctx: &Value,
    ) -> Result<Option<PathBuf>, CrudError> {
        let path = self.config.scaffold_dir.join(file_name);
        if !should_scaffold(self.config.scaffold_strategy, &path) {
            debug!(path = %path.display(), strategy = %self.config.scaffold_strategy, "skipping scaffold");
            return Ok(None);
        }
        let rendered = generation_env().render_str(self.set.source(kind), ctx)?;
        std::fs::create_dir_all(&self.config.scaffold_dir)?;
        std::fs::write(&path, rendered)?;
        info!(path = %path.display(), "scaffolded template");
        Ok(Some(path))
    }
}

/// Whether the strategy allows writing this path
#[must_use]
pub fn should_scaffold(strategy: ScaffoldStrategy, path: &Path) -> bool {
    match strategy {
        ScaffoldStrategy::Always => true,
        ScaffoldStrategy::IfNotExists => !path.exists(),
        ScaffoldStrategy::Never => false,
    }
}

/// The generation-time environment
///
/// Uses `[[ ]]` / `[% %]` / `[# #]` delimiters so runtime `{{ }}` syntax in
/// skeletons passes through as literal text, and escapes nothing since the
/// output is itself a template.
fn generation_env() -> Environment<'static> {
    let mut env = Environment::new();
    let syntax = SyntaxConfig::builder()
        .block_delimiters("[%", "%]")
        .variable_delimiters("[[", "]]")
        .comment_delimiters("[#", "#]")
        .build()
        .unwrap_or_default();
    env.set_syntax(syntax);
    env.set_auto_escape_callback(|_| AutoEscape::None);
    env.add_function("input_for", input_for);
    env
}

/// Emit the form widget for one schema field
///
/// The returned HTML contains runtime `{{ }}` / `{% %}` constructs binding
/// the widget to `item.<field>`.
fn input_for(field: Value) -> Result<String, Error> {
    let attr = |name: &str| -> Result<Option<String>, Error> {
        let v = field.get_attr(name)?;
        Ok(v.as_str().map(ToString::to_string))
    };
    let name = attr("name")?.ok_or_else(|| {
        Error::new(ErrorKind::MissingArgument, "field has no name attribute")
    })?;
    let input = attr("input")?.unwrap_or_else(|| "text".to_string());
    let label = attr("label")?.unwrap_or_else(|| name.clone());
    let placeholder = attr("placeholder")?
        .map(|p| format!(" placeholder=\"{p}\""))
        .unwrap_or_default();

    let widget = match input.as_str() {
        "textarea" | "markdown" | "html" => format!(
            "<textarea id=\"{name}\" name=\"{name}\" class=\"input-{input}\"{placeholder}>{{{{ item.{name} }}}}</textarea>"
        ),
        "checkbox" => format!(
            "<input type=\"checkbox\" id=\"{name}\" name=\"{name}\" value=\"true\" {{% if item.{name} %}}checked{{% endif %}}>"
        ),
        other => format!(
            "<input type=\"{other}\" id=\"{name}\" name=\"{name}\" value=\"{{{{ item.{name} }}}}\"{placeholder}>"
        ),
    };
    Ok(format!(
        "<label for=\"{name}\">{label}</label>\n  {widget}"
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{FieldSpec, InputKind};

    fn car_schema() -> ModelSchema {
        ModelSchema::new("Car")
            .field(FieldSpec::text("name").label("Name"))
            .field(FieldSpec::int("year"))
            .field(FieldSpec::bool("electric"))
            .field(FieldSpec::text("notes").input(InputKind::Textarea))
    }

    fn config_in(dir: &Path, strategy: ScaffoldStrategy) -> Arc<CrudConfig> {
        Arc::new(
            CrudConfig::new()
                .with_scaffold_dir(dir)
                .with_scaffold_strategy(strategy),
        )
    }

    #[test]
    fn scaffolds_all_three_model_templates() {
        let dir = tempfile::tempdir().unwrap();
        let scaffolder = Scaffolder::new(config_in(dir.path(), ScaffoldStrategy::Always));
        let written = scaffolder.scaffold_model(&car_schema(), "/admin/car").unwrap();
        assert_eq!(written.len(), 3);
        assert!(dir.path().join("car-list.html").is_file());
        assert!(dir.path().join("car.html").is_file());
        assert!(dir.path().join("car-form.html").is_file());
    }

    #[test]
    fn generated_list_keeps_runtime_syntax() {
        let dir = tempfile::tempdir().unwrap();
        let scaffolder = Scaffolder::new(config_in(dir.path(), ScaffoldStrategy::Always));
        scaffolder.scaffold_model(&car_schema(), "/admin/car").unwrap();
        let list = std::fs::read_to_string(dir.path().join("car-list.html")).unwrap();
        assert!(list.contains("{% for item in items %}"));
        assert!(list.contains("{{ item.year }}"));
        assert!(list.contains("<th>Name</th>"));
        assert!(list.contains("hx-get=\"/admin/car/new\""));
        assert!(!list.contains("[["), "generation delimiters must not survive: {list}");
    }

    #[test]
    fn generated_form_picks_widgets_per_field() {
        let dir = tempfile::tempdir().unwrap();
        let scaffolder = Scaffolder::new(config_in(dir.path(), ScaffoldStrategy::Always));
        scaffolder.scaffold_model(&car_schema(), "/admin/car").unwrap();
        let form = std::fs::read_to_string(dir.path().join("car-form.html")).unwrap();
        assert!(form.contains("hx-put=\"/admin/car/new\""));
        assert!(form.contains("hx-post=\"/admin/car/{{ item.id }}\""));
        assert!(form.contains("<input type=\"number\" id=\"year\""));
        assert!(form.contains("type=\"checkbox\" id=\"electric\""));
        assert!(form.contains("{% if item.electric %}checked{% endif %}"));
        assert!(form.contains("<textarea id=\"notes\""));
    }

    #[test]
    fn if_not_exists_preserves_existing_files() {
        let dir = tempfile::tempdir().unwrap();
        let custom = dir.path().join("car-list.html");
        std::fs::write(&custom, "hand edited").unwrap();
        let scaffolder = Scaffolder::new(config_in(dir.path(), ScaffoldStrategy::IfNotExists));
        let written = scaffolder.scaffold_model(&car_schema(), "/admin/car").unwrap();
        assert_eq!(written.len(), 2);
        assert_eq!(std::fs::read_to_string(&custom).unwrap(), "hand edited");
    }

    #[test]
    fn never_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let scaffolder = Scaffolder::new(config_in(dir.path(), ScaffoldStrategy::Never));
        let written = scaffolder.scaffold_model(&car_schema(), "/admin/car").unwrap();
        assert!(written.is_empty());
    }

    #[test]
    fn scaffold_all_covers_every_model() {
        let dir = tempfile::tempdir().unwrap();
        let scaffolder = Scaffolder::new(config_in(dir.path(), ScaffoldStrategy::Always));
        let plane = ModelSchema::new("Plane").field(FieldSpec::text("name"));
        let written = scaffolder.scaffold_all([&car_schema(), &plane]).unwrap();
        assert_eq!(written.len(), 6);
        assert!(dir.path().join("plane-form.html").is_file());
    }

    #[test]
    fn layout_carries_menu_entries() {
        let dir = tempfile::tempdir().unwrap();
        let scaffolder = Scaffolder::new(config_in(dir.path(), ScaffoldStrategy::Always));
        let path = scaffolder
            .scaffold_layout("Admin", &[MenuEntry::new("Cars", "/admin/car")])
            .unwrap()
            .unwrap();
        let layout = std::fs::read_to_string(path).unwrap();
        assert!(layout.contains("<title>Admin</title>"));
        assert!(layout.contains("<a href=\"/admin/car\">Cars</a>"));
        assert!(layout.contains("{{ content }}"));
    }

    #[test]
    fn index_links_every_menu_entry() {
        let dir = tempfile::tempdir().unwrap();
        let scaffolder = Scaffolder::new(config_in(dir.path(), ScaffoldStrategy::Always));
        let path = scaffolder
            .scaffold_index(
                "Admin",
                &[
                    MenuEntry::new("Cars", "/admin/car"),
                    MenuEntry::new("Planes", "/admin/plane"),
                ],
            )
            .unwrap()
            .unwrap();
        let index = std::fs::read_to_string(path).unwrap();
        assert!(index.contains("<h1>Admin</h1>"));
        assert!(index.contains("<a href=\"/admin/car\">Cars</a>"));
        assert!(index.contains("<a href=\"/admin/plane\">Planes</a>"));
    }

    #[test]
    fn export_then_override_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let set = ScaffoldSet::default();
        set.export(dir.path(), false).unwrap();
        assert!(set.export(dir.path(), false).is_err());
        set.export(dir.path(), true).unwrap();

        std::fs::write(dir.path().join("form.html"), "custom form").unwrap();
        let overridden = ScaffoldSet::default().overridden_from(dir.path()).unwrap();
        assert_eq!(overridden.source(ScaffoldKind::Form), "custom form");
        assert_eq!(
            overridden.source(ScaffoldKind::List),
            ScaffoldSet::default().source(ScaffoldKind::List)
        );
    }
}
