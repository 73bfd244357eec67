//! Minimal admin site over an in-memory store
//!
//! Run with `cargo run --example admin_demo`, then open
//! <http://127.0.0.1:3000/admin/>. Generated templates land in
//! `templates/gen/` on first start; edit copies in `templates/` to override
//! them.

use std::sync::Arc;

use crud_htmx::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
struct Car {
    id: Option<i64>,
    name: String,
    year: i64,
    mileage: f64,
    electric: bool,
}

impl AdminModel for Car {
    fn schema() -> ModelSchema {
        ModelSchema::new("Car")
            .field(FieldSpec::text("name").label("Name").placeholder("Model name"))
            .field(FieldSpec::int("year").label("Year"))
            .field(FieldSpec::float64("mileage").label("Mileage"))
            .field(FieldSpec::bool("electric").label("Electric"))
    }

    fn id(&self) -> Option<i64> {
        self.id
    }

    fn set_id(&mut self, id: i64) {
        self.id = Some(id);
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
struct Driver {
    id: Option<i64>,
    name: String,
    licensed: bool,
}

impl AdminModel for Driver {
    fn schema() -> ModelSchema {
        ModelSchema::new("Driver")
            .field(FieldSpec::text("name").label("Name"))
            .field(FieldSpec::bool("licensed").label("Licensed"))
    }

    fn id(&self) -> Option<i64> {
        self.id
    }

    fn set_id(&mut self, id: i64) {
        self.id = Some(id);
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,crud_htmx=debug".into()),
        )
        .init();

    let store = Arc::new(MemoryStore::new());
    let admin = AdminSite::new("Garage Admin", store, CrudConfig::default())?
        .with_mount("/admin")
        .register::<Car>()?
        .register::<Driver>()?
        .into_router()?;

    let app = axum::Router::new().nest("/admin", admin);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:3000").await?;
    tracing::info!("admin site on http://127.0.0.1:3000/admin/");
    axum::serve(listener, app).await?;
    Ok(())
}
