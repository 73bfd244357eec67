//! Integration tests for scaffold generation feeding the runtime engine
//!
//! Verifies the two-phase pipeline: skeletons render to template files, the
//! engine loads those files, and the runtime render binds real records.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use crud_htmx::prelude::*;
use minijinja::context;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tower::ServiceExt;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
struct Car {
    id: Option<i64>,
    name: String,
    year: i64,
    electric: bool,
}

impl AdminModel for Car {
    fn schema() -> ModelSchema {
        ModelSchema::new("Car")
            .field(FieldSpec::text("name").label("Name"))
            .field(FieldSpec::int("year"))
            .field(FieldSpec::bool("electric"))
    }

    fn id(&self) -> Option<i64> {
        self.id
    }

    fn set_id(&mut self, id: i64) {
        self.id = Some(id);
    }
}

#[test]
fn generated_list_renders_records() {
    let dir = tempfile::tempdir().unwrap();
    let config = Arc::new(
        CrudConfig::new()
            .with_scaffold_dir(dir.path())
            .with_scaffold_strategy(ScaffoldStrategy::Always),
    );
    Scaffolder::new(Arc::clone(&config))
        .scaffold_model(&Car::schema(), "/car")
        .unwrap();

    let engine = TemplateEngine::new(vec![dir.path().to_path_buf()]).unwrap();
    let html = engine
        .render(
            "car-list.html",
            context! {
                items => vec![
                    json!({"id": 1, "name": "Tesla", "year": 2020, "electric": true}),
                    json!({"id": 2, "name": "Fiat", "year": 2005, "electric": false}),
                ],
            },
        )
        .unwrap();
    assert!(html.contains("<td>Tesla</td>"));
    assert!(html.contains("<td>2005</td>"));
    assert!(html.contains("href=\"/car/2\""));
    assert!(html.contains("<th>Name</th>"));
}

#[test]
fn generated_form_renders_for_new_and_edit() {
    let dir = tempfile::tempdir().unwrap();
    let config = Arc::new(
        CrudConfig::new()
            .with_scaffold_dir(dir.path())
            .with_scaffold_strategy(ScaffoldStrategy::Always),
    );
    Scaffolder::new(Arc::clone(&config))
        .scaffold_model(&Car::schema(), "/car")
        .unwrap();
    let engine = TemplateEngine::new(vec![dir.path().to_path_buf()]).unwrap();

    let blank = engine
        .render("car-form.html", context! { item => json!({}) })
        .unwrap();
    assert!(blank.contains("hx-put=\"/car/new\""));
    assert!(blank.contains("name=\"year\""));

    let edit = engine
        .render(
            "car-form.html",
            context! { item => json!({"id": 7, "name": "Tesla", "electric": true}) },
        )
        .unwrap();
    assert!(edit.contains("hx-post=\"/car/7\""));
    assert!(edit.contains("value=\"Tesla\""));
    assert!(edit.contains("checked"));
}

#[tokio::test]
async fn hand_edited_template_survives_newonly_scaffolding() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("car-list.html"),
        "<section id=\"custom-list\">mine</section>",
    )
    .unwrap();

    let config = CrudConfig::new()
        .with_scaffold_dir(dir.path())
        .with_template_dirs(vec![dir.path().to_path_buf()])
        .with_scaffold_strategy(ScaffoldStrategy::IfNotExists);
    let app = AdminSite::new("Admin", Arc::new(MemoryStore::new()), config)
        .unwrap()
        .register::<Car>()
        .unwrap()
        .into_router()
        .unwrap();

    let resp = app
        .oneshot(
            Request::builder()
                .uri("/car")
                .header(header::ACCEPT, "text/html")
                .header("HX-Request", "true")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(resp.into_body(), 64 * 1024).await.unwrap();
    let html = String::from_utf8(bytes.to_vec()).unwrap();
    assert!(html.contains("custom-list"), "expected the hand-edited template: {html}");
}

#[test]
fn skeleton_overrides_change_generated_output() {
    let skeleton_dir = tempfile::tempdir().unwrap();
    let out_dir = tempfile::tempdir().unwrap();
    std::fs::write(
        skeleton_dir.path().join("list.html"),
        "<h1>[[ model ]] custom skeleton</h1>",
    )
    .unwrap();

    let set = ScaffoldSet::default()
        .overridden_from(skeleton_dir.path())
        .unwrap();
    let config = Arc::new(
        CrudConfig::new()
            .with_scaffold_dir(out_dir.path())
            .with_scaffold_strategy(ScaffoldStrategy::Always),
    );
    Scaffolder::with_set(config, set)
        .scaffold_model(&Car::schema(), "/car")
        .unwrap();

    let list = std::fs::read_to_string(out_dir.path().join("car-list.html")).unwrap();
    assert_eq!(list, "<h1>Car custom skeleton</h1>");
}
