//! crud-htmx: CRUD admin scaffolding for axum + HTMX applications
//!
//! Declare a schema for each model you want to administer, hand it to an
//! [`AdminSite`](admin::AdminSite), and get a full admin surface: generated
//! HTML templates, HTMX-aware list/detail/form routes, a JSON API on the same
//! paths, and a type-converting form binder.
//!
//! # Design Principles
//!
//! 1. **Explicit over reflective**: models declare a [`ModelSchema`](schema::ModelSchema)
//!    instead of being introspected at runtime
//! 2. **Scaffold, then own**: generated templates are plain minijinja files
//!    you can edit; the write policy keeps your edits safe
//! 3. **One route, two formats**: every read endpoint negotiates HTML or JSON
//!    from the `Accept` and `Hx-Request` headers
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use crud_htmx::prelude::*;
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Debug, Clone, Serialize, Deserialize, Default)]
//! struct Car {
//!     id: Option<i64>,
//!     name: String,
//!     year: i64,
//! }
//!
//! impl AdminModel for Car {
//!     fn schema() -> ModelSchema {
//!         ModelSchema::new("Car")
//!             .field(FieldSpec::text("name"))
//!             .field(FieldSpec::int("year"))
//!     }
//!     fn id(&self) -> Option<i64> { self.id }
//!     fn set_id(&mut self, id: i64) { self.id = Some(id); }
//! }
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let store = Arc::new(MemoryStore::new());
//!     let app = AdminSite::new("Admin", store, CrudConfig::default())?
//!         .register::<Car>()?
//!         .into_router()?;
//!
//!     let listener = tokio::net::TcpListener::bind("127.0.0.1:3000").await?;
//!     axum::serve(listener, app).await?;
//!     Ok(())
//! }
//! ```
//!
//! # Features
//!
//! - `postgres` - `PostgreSQL` storage backend via sqlx (default)

// Lint configuration is handled at the workspace level in Cargo.toml
#![allow(clippy::missing_errors_doc)]

pub mod admin;
pub mod config;
pub mod controller;
pub mod error;
pub mod forms;
pub mod respond;
pub mod scaffold;
pub mod schema;
pub mod store;
pub mod template;

pub mod prelude {
    //! Convenience re-exports for common types and traits
    //!
    //! ```rust
    //! use crud_htmx::prelude::*;
    //! ```

    pub use crate::admin::AdminSite;
    pub use crate::config::{CrudConfig, ScaffoldStrategy};
    pub use crate::controller::CrudCtrl;
    pub use crate::error::CrudError;
    pub use crate::forms::{apply_form, BindError};
    pub use crate::respond::{negotiate, Capabilities, Disposition, Responder};
    pub use crate::scaffold::{MenuEntry, ScaffoldKind, ScaffoldSet, Scaffolder};
    pub use crate::schema::{AdminModel, FieldKind, FieldSpec, InputKind, ModelSchema};
    #[cfg(feature = "postgres")]
    pub use crate::store::PgStore;
    pub use crate::store::{MemoryStore, ModelStore, SearchArgs};
    pub use crate::template::TemplateEngine;

    pub use axum_htmx::{HxRedirect, HxRequest};
}
