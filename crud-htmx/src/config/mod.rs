//! Library configuration
//!
//! A [`CrudConfig`] is built explicitly by the host application and handed to
//! every controller; there is no process-global state. Values can also be
//! layered from a TOML file and `CRUD_`-prefixed environment variables
//! through figment.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;

use figment::providers::{Env, Format, Toml};
use figment::Figment;
use serde::Deserialize;
use serde_json::Value;

use crate::error::CrudError;

/// When the scaffolder writes generated template files
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScaffoldStrategy {
    /// Overwrite generated templates on every startup
    Always,
    /// Write only templates that do not exist yet (default)
    #[default]
    #[serde(rename = "newonly")]
    IfNotExists,
    /// Never write; templates are expected to already exist
    Never,
}

impl ScaffoldStrategy {
    /// Spelling used in config files
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Always => "always",
            Self::IfNotExists => "newonly",
            Self::Never => "never",
        }
    }
}

impl std::fmt::Display for ScaffoldStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ScaffoldStrategy {
    type Err = CrudError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "always" => Ok(Self::Always),
            "newonly" => Ok(Self::IfNotExists),
            "never" => Ok(Self::Never),
            other => Err(CrudError::Config(format!(
                "unknown scaffold strategy {other:?} (expected always, newonly or never)"
            ))),
        }
    }
}

/// Callback that contributes extra values to full-page render contexts
pub type LayoutContextFn =
    Arc<dyn Fn(&mut serde_json::Map<String, Value>) + Send + Sync>;

/// File-loadable subset of [`CrudConfig`]
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
struct FileConfig {
    scaffold_strategy: ScaffoldStrategy,
    scaffold_dir: PathBuf,
    template_dirs: Vec<PathBuf>,
    layout: Option<String>,
    layout_on_full_page: bool,
    has_ui: bool,
    has_api: bool,
    auto_scaffold: bool,
}

impl Default for FileConfig {
    fn default() -> Self {
        Self {
            scaffold_strategy: ScaffoldStrategy::default(),
            scaffold_dir: PathBuf::from("templates/gen"),
            template_dirs: vec![PathBuf::from("templates"), PathBuf::from("templates/gen")],
            layout: Some("layout.html".to_string()),
            layout_on_full_page: true,
            has_ui: true,
            has_api: true,
            auto_scaffold: false,
        }
    }
}

/// Shared configuration for controllers, scaffolder and responder
#[derive(Clone)]
pub struct CrudConfig {
    /// Write policy for generated templates
    pub scaffold_strategy: ScaffoldStrategy,
    /// Directory generated templates are written to
    pub scaffold_dir: PathBuf,
    /// Directories the runtime template engine loads from, in priority order
    pub template_dirs: Vec<PathBuf>,
    /// Layout template name, `None` to disable layout wrapping entirely
    pub layout: Option<String>,
    /// Wrap full-page (non-HTMX) responses in the layout
    pub layout_on_full_page: bool,
    /// Serve HTML responses
    pub has_ui: bool,
    /// Serve JSON responses
    pub has_api: bool,
    /// Run the scaffolder automatically when a controller is built
    pub auto_scaffold: bool,
    /// Extra values merged into every full-page render context
    pub layout_context: Option<LayoutContextFn>,
}

impl std::fmt::Debug for CrudConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CrudConfig")
            .field("scaffold_strategy", &self.scaffold_strategy)
            .field("scaffold_dir", &self.scaffold_dir)
            .field("template_dirs", &self.template_dirs)
            .field("layout", &self.layout)
            .field("layout_on_full_page", &self.layout_on_full_page)
            .field("has_ui", &self.has_ui)
            .field("has_api", &self.has_api)
            .field("auto_scaffold", &self.auto_scaffold)
            .field("layout_context", &self.layout_context.as_ref().map(|_| "<fn>"))
            .finish()
    }
}

impl Default for CrudConfig {
    fn default() -> Self {
        Self::from_file_config(FileConfig::default())
    }
}

impl CrudConfig {
    /// Configuration with all defaults
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn from_file_config(fc: FileConfig) -> Self {
        Self {
            scaffold_strategy: fc.scaffold_strategy,
            scaffold_dir: fc.scaffold_dir,
            template_dirs: fc.template_dirs,
            layout: fc.layout,
            layout_on_full_page: fc.layout_on_full_page,
            has_ui: fc.has_ui,
            has_api: fc.has_api,
            auto_scaffold: fc.auto_scaffold,
            layout_context: None,
        }
    }

    /// Load from a TOML file, then override from `CRUD_`-prefixed environment
    /// variables
    ///
    /// A missing file is not an error; defaults apply for anything unset.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, CrudError> {
        let fc: FileConfig = Figment::new()
            .merge(Toml::file(path.as_ref()))
            .merge(Env::prefixed("CRUD_"))
            .extract()
            .map_err(|e| CrudError::Config(e.to_string()))?;
        Ok(Self::from_file_config(fc))
    }

    /// Set the scaffold write policy
    #[must_use]
    pub const fn with_scaffold_strategy(mut self, strategy: ScaffoldStrategy) -> Self {
        self.scaffold_strategy = strategy;
        self
    }

    /// Set the directory generated templates are written to
    #[must_use]
    pub fn with_scaffold_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.scaffold_dir = dir.into();
        self
    }

    /// Replace the runtime template search directories
    #[must_use]
    pub fn with_template_dirs(mut self, dirs: Vec<PathBuf>) -> Self {
        self.template_dirs = dirs;
        self
    }

    /// Set the layout template name
    #[must_use]
    pub fn with_layout(mut self, layout: impl Into<String>) -> Self {
        self.layout = Some(layout.into());
        self
    }

    /// Disable layout wrapping entirely
    #[must_use]
    pub fn without_layout(mut self) -> Self {
        self.layout = None;
        self
    }

    /// Control layout wrapping of full-page responses
    #[must_use]
    pub const fn with_layout_on_full_page(mut self, enabled: bool) -> Self {
        self.layout_on_full_page = enabled;
        self
    }

    /// Enable or disable HTML responses
    #[must_use]
    pub const fn with_ui(mut self, enabled: bool) -> Self {
        self.has_ui = enabled;
        self
    }

    /// Enable or disable JSON responses
    #[must_use]
    pub const fn with_api(mut self, enabled: bool) -> Self {
        self.has_api = enabled;
        self
    }

    /// Run the scaffolder automatically when a controller is built
    #[must_use]
    pub const fn with_auto_scaffold(mut self, enabled: bool) -> Self {
        self.auto_scaffold = enabled;
        self
    }

    /// Install a callback that adds values to full-page render contexts
    #[must_use]
    pub fn with_layout_context<F>(mut self, f: F) -> Self
    where
        F: Fn(&mut serde_json::Map<String, Value>) + Send + Sync + 'static,
    {
        self.layout_context = Some(Arc::new(f));
        self
    }

    /// Static key/value pairs for full-page render contexts
    #[must_use]
    pub fn with_layout_values(self, values: BTreeMap<String, Value>) -> Self {
        self.with_layout_context(move |ctx| {
            for (k, v) in &values {
                ctx.insert(k.clone(), v.clone());
            }
        })
    }
}
