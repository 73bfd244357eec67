//! Runtime template engine
//!
//! A thin wrapper around a shared minijinja [`Environment`] that loads every
//! `*.html` file from the configured directories. Directories are searched in
//! priority order, so a hand-edited template in `templates/` shadows the
//! generated copy in `templates/gen/`. [`TemplateEngine::reload`] rebuilds
//! the environment in place, which is how freshly scaffolded templates become
//! visible without restarting.

use std::path::PathBuf;
use std::sync::Arc;

use minijinja::{Environment, UndefinedBehavior};
use parking_lot::RwLock;
use serde::Serialize;
use tracing::{debug, warn};

use crate::error::CrudError;

/// Shared, reloadable template environment
#[derive(Clone)]
pub struct TemplateEngine {
    env: Arc<RwLock<Environment<'static>>>,
    dirs: Arc<Vec<PathBuf>>,
}

impl std::fmt::Debug for TemplateEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TemplateEngine")
            .field("dirs", &self.dirs)
            .finish_non_exhaustive()
    }
}

impl TemplateEngine {
    /// Build an engine over the given directories, highest priority first
    ///
    /// Missing directories are skipped with a warning so a fresh project
    /// works before its first scaffold run.
    pub fn new(dirs: Vec<PathBuf>) -> Result<Self, CrudError> {
        let engine = Self {
            env: Arc::new(RwLock::new(Environment::empty())),
            dirs: Arc::new(dirs),
        };
        engine.reload()?;
        Ok(engine)
    }

    /// Rebuild the environment from the directories on disk
    pub fn reload(&self) -> Result<(), CrudError> {
        let mut env = Environment::new();
        env.set_undefined_behavior(UndefinedBehavior::Chainable);

        for dir in self.dirs.iter() {
            if !dir.is_dir() {
                warn!(dir = %dir.display(), "template directory missing, skipping");
                continue;
            }
            for entry in std::fs::read_dir(dir)? {
                let entry = entry?;
                let path = entry.path();
                if path.extension().is_none_or(|ext| ext != "html") {
                    continue;
                }
                let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
                    continue;
                };
                // First directory wins; later dirs only fill gaps.
                if env.get_template(name).is_ok() {
                    continue;
                }
                let source = std::fs::read_to_string(&path)?;
                env.add_template_owned(name.to_string(), source)?;
                debug!(template = name, dir = %dir.display(), "loaded template");
            }
        }

        *self.env.write() = env;
        Ok(())
    }

    /// Whether a template with this file name is loaded
    #[must_use]
    pub fn has_template(&self, name: &str) -> bool {
        self.env.read().get_template(name).is_ok()
    }

    /// Render the named template with the given context
    pub fn render<S: Serialize>(&self, name: &str, ctx: S) -> Result<String, CrudError> {
        let env = self.env.read();
        let tmpl = env
            .get_template(name)
            .map_err(|_| CrudError::NotFound(format!("template {name}")))?;
        Ok(tmpl.render(ctx)?)
    }
}
