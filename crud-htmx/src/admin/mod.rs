//! Admin site assembly
//!
//! An [`AdminSite`] collects one [`CrudCtrl`] per model, nests each under
//! `/{slug}`, scaffolds the shared layout with a menu entry per model, and
//! serves an index page at `/`. This is the one-stop entry point; apps that
//! need different routing can wire [`CrudCtrl`] routers by hand instead.

use std::sync::Arc;

use axum::response::{Html, IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use minijinja::context;
use tracing::info;

use crate::config::CrudConfig;
use crate::controller::CrudCtrl;
use crate::error::CrudError;
use crate::scaffold::{MenuEntry, Scaffolder};
use crate::schema::AdminModel;
use crate::store::ModelStore;
use crate::template::TemplateEngine;

/// Builder that assembles controllers into one admin router
pub struct AdminSite {
    title: String,
    store: Arc<dyn ModelStore>,
    config: Arc<CrudConfig>,
    engine: TemplateEngine,
    mount: String,
    menu: Vec<MenuEntry>,
    router: Router,
}

impl std::fmt::Debug for AdminSite {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdminSite")
            .field("title", &self.title)
            .field("menu", &self.menu)
            .finish_non_exhaustive()
    }
}

impl AdminSite {
    /// Start a site over a store and configuration
    ///
    /// The template engine is built from the configured directories.
    pub fn new(
        title: impl Into<String>,
        store: Arc<dyn ModelStore>,
        config: CrudConfig,
    ) -> Result<Self, CrudError> {
        let config = Arc::new(config);
        let engine = TemplateEngine::new(config.template_dirs.clone())?;
        Ok(Self {
            title: title.into(),
            store,
            config,
            engine,
            mount: String::new(),
            menu: Vec::new(),
            router: Router::new(),
        })
    }

    /// Set the path prefix the site's router will be nested under
    ///
    /// Generated links and redirects are absolute, so this must match the
    /// outer `Router::nest` call. Set it before registering models.
    #[must_use]
    pub fn with_mount(mut self, mount: impl Into<String>) -> Self {
        self.mount = mount.into().trim_end_matches('/').to_string();
        self
    }

    /// Register a model: scaffold its templates and mount its controller
    pub fn register<M: AdminModel>(mut self) -> Result<Self, CrudError> {
        let slug = M::schema().slug();
        let ctrl = CrudCtrl::<M>::at(
            Arc::clone(&self.store),
            Arc::clone(&self.config),
            self.engine.clone(),
            format!("{}/{slug}", self.mount),
        )?;
        ctrl.scaffold()?;
        let base = ctrl.base().to_string();
        info!(model = %ctrl.schema().name, base, "registered admin model");
        self.menu
            .push(MenuEntry::new(ctrl.schema().name.clone(), base.clone()));
        self.router = std::mem::take(&mut self.router).nest(&format!("/{slug}"), ctrl.router());
        Ok(self)
    }

    /// The models registered so far, as menu entries
    #[must_use]
    pub fn menu(&self) -> &[MenuEntry] {
        &self.menu
    }

    /// Scaffold the layout and index, reload templates and produce the router
    pub fn into_router(self) -> Result<Router, CrudError> {
        let scaffolder = Scaffolder::new(Arc::clone(&self.config));
        scaffolder.scaffold_layout(&self.title, &self.menu)?;
        scaffolder.scaffold_index(&self.title, &self.menu)?;
        self.engine.reload()?;

        let index = IndexPage {
            engine: self.engine,
            config: self.config,
        };
        let router = self
            .router
            .route("/", get(move || index_handler(index.clone())));
        Ok(router)
    }
}

#[derive(Clone)]
struct IndexPage {
    engine: TemplateEngine,
    config: Arc<CrudConfig>,
}

async fn index_handler(page: IndexPage) -> Result<Response, CrudError> {
    let content = page.engine.render("index.html", context! {})?;
    let body = match page.config.layout.as_deref() {
        Some(layout) if page.engine.has_template(layout) => page.engine.render(
            layout,
            context! { content => minijinja::Value::from_safe_string(content) },
        )?,
        _ => content,
    };
    Ok(Html(body).into_response())
}
