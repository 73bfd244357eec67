//! Generic CRUD controller
//!
//! A [`CrudCtrl`] turns one [`AdminModel`] into a ready-to-nest axum
//! [`Router`]:
//!
//! | Method | Path         | Handler                        |
//! |--------|--------------|--------------------------------|
//! | GET    | `/`          | list                           |
//! | GET    | `/new`       | empty form (UI only)           |
//! | PUT    | `/new`       | create                         |
//! | GET    | `/{id}`      | details                        |
//! | POST   | `/{id}`      | update                         |
//! | DELETE | `/{id}`      | delete                         |
//! | GET    | `/{id}/edit` | populated form (UI only)       |
//!
//! List, details and the form views negotiate JSON or HTML through the
//! [`Responder`]; create, update and delete always answer with an
//! `HX-Redirect` so the client lands on the detail view (or the list after a
//! delete).

use std::collections::HashMap;
use std::sync::Arc;

use axum::extract::rejection::{PathRejection, QueryRejection};
use axum::extract::{Form, Path, Query, State};
use axum::http::HeaderMap;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use axum_htmx::{HxRedirect, HxRequest};
use serde_json::Value;
use tracing::info;

use crate::config::CrudConfig;
use crate::error::CrudError;
use crate::forms::{apply_form, FormBinder};
use crate::respond::Responder;
use crate::scaffold::Scaffolder;
use crate::schema::{AdminModel, ModelSchema};
use crate::store::{ModelStore, SearchArgs};
use crate::template::TemplateEngine;

/// CRUD controller for one admin model
pub struct CrudCtrl<M: AdminModel> {
    schema: Arc<ModelSchema>,
    store: Arc<dyn ModelStore>,
    config: Arc<CrudConfig>,
    responder: Responder,
    base: String,
    binder: FormBinder<M>,
}

impl<M: AdminModel> Clone for CrudCtrl<M> {
    fn clone(&self) -> Self {
        Self {
            schema: Arc::clone(&self.schema),
            store: Arc::clone(&self.store),
            config: Arc::clone(&self.config),
            responder: self.responder.clone(),
            base: self.base.clone(),
            binder: Arc::clone(&self.binder),
        }
    }
}

impl<M: AdminModel> std::fmt::Debug for CrudCtrl<M> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CrudCtrl")
            .field("schema", &self.schema.name)
            .field("base", &self.base)
            .finish_non_exhaustive()
    }
}

impl<M: AdminModel> CrudCtrl<M> {
    /// Build a controller, scaffolding templates first when configured
    ///
    /// The base path defaults to `/{slug}` and must match where the router is
    /// nested, since redirects and generated links are absolute.
    pub fn new(
        store: Arc<dyn ModelStore>,
        config: Arc<CrudConfig>,
        engine: TemplateEngine,
    ) -> Result<Self, CrudError> {
        let base = format!("/{}", M::schema().slug());
        Self::at(store, config, engine, base)
    }

    /// Build a controller with an explicit base path
    ///
    /// Use this instead of [`new`](Self::new) + [`with_base`](Self::with_base)
    /// when the router will be nested under a prefix, so templates written by
    /// auto-scaffolding carry the right links from the start.
    pub fn at(
        store: Arc<dyn ModelStore>,
        config: Arc<CrudConfig>,
        engine: TemplateEngine,
        base: impl Into<String>,
    ) -> Result<Self, CrudError> {
        let ctrl = Self {
            schema: Arc::new(M::schema()),
            store,
            responder: Responder::new(engine, Arc::clone(&config)),
            config,
            base: base.into(),
            binder: Arc::new(apply_form::<M>),
        };
        if ctrl.config.auto_scaffold {
            ctrl.scaffold()?;
        }
        Ok(ctrl)
    }

    /// Override the base path the router will be nested under
    ///
    /// Templates scaffolded before this call carry the old base in their
    /// links; call [`scaffold`](Self::scaffold) again after overriding.
    #[must_use]
    pub fn with_base(mut self, base: impl Into<String>) -> Self {
        self.base = base.into();
        self
    }

    /// Replace the default form binder
    #[must_use]
    pub fn with_form_binder<F>(mut self, binder: F) -> Self
    where
        F: Fn(&HashMap<String, String>, &mut M) -> Result<(), crate::forms::BindError>
            + Send
            + Sync
            + 'static,
    {
        self.binder = Arc::new(binder);
        self
    }

    /// The model schema this controller serves
    #[must_use]
    pub fn schema(&self) -> &ModelSchema {
        &self.schema
    }

    /// The base path redirects and links are built from
    #[must_use]
    pub fn base(&self) -> &str {
        &self.base
    }

    /// Generate this model's templates and make them visible to the engine
    pub fn scaffold(&self) -> Result<(), CrudError> {
        let written = Scaffolder::new(Arc::clone(&self.config))
            .scaffold_model(&self.schema, &self.base)?;
        if !written.is_empty() {
            info!(model = %self.schema.name, count = written.len(), "scaffolded model templates");
            self.responder.engine().reload()?;
        }
        Ok(())
    }

    /// The routes of this controller, ready to nest at the base path
    #[must_use]
    pub fn router(self) -> Router {
        let ui = self.config.has_ui;
        let new_route = if ui {
            axum::routing::put(Self::create).get(Self::new_form)
        } else {
            axum::routing::put(Self::create)
        };
        let mut router = Router::new()
            .route("/", get(Self::list))
            .route("/new", new_route)
            .route(
                "/{id}",
                get(Self::details).post(Self::update).delete(Self::remove),
            );
        if ui {
            router = router.route("/{id}/edit", get(Self::edit_form));
        }
        router.with_state(self)
    }

    fn base_data(&self) -> serde_json::Map<String, Value> {
        let mut data = serde_json::Map::new();
        data.insert("schema".to_string(), serde_json::json!(&*self.schema));
        data.insert("base".to_string(), Value::String(self.base.clone()));
        data
    }

    fn detail_path(&self, id: i64) -> String {
        format!("{}/{id}", self.base)
    }

    async fn list(
        State(ctrl): State<Self>,
        HxRequest(hx): HxRequest,
        headers: HeaderMap,
        query: Result<Query<SearchArgs>, QueryRejection>,
    ) -> Result<Response, CrudError> {
        let Query(args) = query.map_err(|e| CrudError::BadRequest(e.to_string()))?;
        let items = ctrl.store.list(&ctrl.schema, &args).await?;
        let mut data = ctrl.base_data();
        data.insert("items".to_string(), Value::Array(items));
        if let Some(term) = args.term() {
            data.insert("search".to_string(), Value::String(term.to_string()));
        }
        data.insert("page".to_string(), Value::from(args.page));
        data.insert("limit".to_string(), Value::from(args.limit()));
        ctrl.responder
            .respond(&headers, hx, &ctrl.schema.list_template(), data)
    }

    async fn details(
        State(ctrl): State<Self>,
        HxRequest(hx): HxRequest,
        headers: HeaderMap,
        id: Result<Path<i64>, PathRejection>,
    ) -> Result<Response, CrudError> {
        let Path(id) = id.map_err(|e| CrudError::BadRequest(e.to_string()))?;
        let item = ctrl
            .store
            .find(&ctrl.schema, id)
            .await?
            .ok_or_else(|| CrudError::NotFound(format!("{} {id}", ctrl.schema.slug())))?;
        let mut data = ctrl.base_data();
        data.insert("item".to_string(), item);
        ctrl.responder
            .respond(&headers, hx, &ctrl.schema.detail_template(), data)
    }

    async fn new_form(
        State(ctrl): State<Self>,
        HxRequest(hx): HxRequest,
        headers: HeaderMap,
    ) -> Result<Response, CrudError> {
        let mut data = ctrl.base_data();
        data.insert("item".to_string(), serde_json::to_value(M::default())?);
        ctrl.responder
            .respond(&headers, hx, &ctrl.schema.form_template(), data)
    }

    async fn edit_form(
        State(ctrl): State<Self>,
        HxRequest(hx): HxRequest,
        headers: HeaderMap,
        id: Result<Path<i64>, PathRejection>,
    ) -> Result<Response, CrudError> {
        let Path(id) = id.map_err(|e| CrudError::BadRequest(e.to_string()))?;
        let item = ctrl
            .store
            .find(&ctrl.schema, id)
            .await?
            .ok_or_else(|| CrudError::NotFound(format!("{} {id}", ctrl.schema.slug())))?;
        let mut data = ctrl.base_data();
        data.insert("item".to_string(), item);
        ctrl.responder
            .respond(&headers, hx, &ctrl.schema.form_template(), data)
    }

    async fn create(
        State(ctrl): State<Self>,
        Form(form): Form<HashMap<String, String>>,
    ) -> Result<Response, CrudError> {
        let mut model = M::default();
        (ctrl.binder)(&form, &mut model)?;
        let mut record = serde_json::to_value(&model)?;
        if let Some(obj) = record.as_object_mut() {
            // The store assigns the id; anything smuggled in is discarded.
            obj.remove("id");
        }
        let id = ctrl.store.save(&ctrl.schema, record).await?;
        info!(model = %ctrl.schema.name, id, "created record");
        Ok((HxRedirect::from(ctrl.detail_path(id).as_str()), "Saved").into_response())
    }

    async fn update(
        State(ctrl): State<Self>,
        id: Result<Path<i64>, PathRejection>,
        Form(form): Form<HashMap<String, String>>,
    ) -> Result<Response, CrudError> {
        let Path(id) = id.map_err(|e| CrudError::BadRequest(e.to_string()))?;
        let existing = ctrl
            .store
            .find(&ctrl.schema, id)
            .await?
            .ok_or_else(|| CrudError::NotFound(format!("{} {id}", ctrl.schema.slug())))?;
        let mut model: M = serde_json::from_value(existing)?;
        (ctrl.binder)(&form, &mut model)?;
        model.set_id(id);
        let saved = ctrl
            .store
            .save(&ctrl.schema, serde_json::to_value(&model)?)
            .await?;
        info!(model = %ctrl.schema.name, id = saved, "updated record");
        Ok((HxRedirect::from(ctrl.detail_path(saved).as_str()), "Saved").into_response())
    }

    async fn remove(
        State(ctrl): State<Self>,
        id: Result<Path<i64>, PathRejection>,
    ) -> Result<Response, CrudError> {
        let Path(id) = id.map_err(|e| CrudError::BadRequest(e.to_string()))?;
        ctrl.store.delete(&ctrl.schema, id).await?;
        info!(model = %ctrl.schema.name, id, "deleted record");
        Ok((HxRedirect::from(ctrl.base.as_str()), "Deleted").into_response())
    }
}
