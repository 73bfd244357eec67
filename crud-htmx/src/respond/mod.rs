//! Content negotiation
//!
//! Every controller handler funnels its result through [`Responder::respond`],
//! which picks JSON, an HTML fragment or a layout-wrapped HTML page from the
//! request's `Accept` header, the `Hx-Request` header and the configured
//! capabilities. The decision itself lives in [`negotiate`] so it can be
//! tested without a running router.

use std::sync::Arc;

use axum::http::{header, HeaderMap};
use axum::response::{Html, IntoResponse, Json, Response};
use minijinja::context;
use serde_json::Value;

use crate::config::CrudConfig;
use crate::error::CrudError;
use crate::template::TemplateEngine;

/// Which response formats a controller may produce
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capabilities {
    /// JSON responses enabled
    pub api: bool,
    /// HTML responses enabled
    pub ui: bool,
}

impl Capabilities {
    /// Capabilities as configured
    #[must_use]
    pub const fn from_config(config: &CrudConfig) -> Self {
        Self {
            api: config.has_api,
            ui: config.has_ui,
        }
    }
}

/// Outcome of content negotiation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    /// Serialize the data as JSON
    Json,
    /// Render the template bare
    Fragment,
    /// Render the template, then wrap it in the layout
    Page,
    /// No capability matches the Accept header
    Reject,
}

/// Decide the response format for a request
///
/// JSON wins when the API is enabled and the client asked for
/// `application/json`, sent no `Accept` header at all, or the UI is disabled.
/// HTML wins when the UI is enabled and the client accepts `text/html` or
/// `*/*`, or the API is disabled. A full page is produced only for non-HTMX
/// requests when a layout is in play; everything else that negotiates to HTML
/// is a fragment. Requests that match neither capability are rejected.
#[must_use]
pub fn negotiate(
    accept: Option<&str>,
    hx_request: bool,
    has_layout: bool,
    caps: &Capabilities,
) -> Disposition {
    let accept = accept.unwrap_or("");
    if caps.api && (accept.contains("application/json") || accept.is_empty() || !caps.ui) {
        return Disposition::Json;
    }
    if caps.ui && (accept.contains("text/html") || accept.contains("*/*") || !caps.api) {
        if !hx_request && has_layout {
            return Disposition::Page;
        }
        return Disposition::Fragment;
    }
    Disposition::Reject
}

/// Renders negotiated responses for a controller
#[derive(Debug, Clone)]
pub struct Responder {
    engine: TemplateEngine,
    config: Arc<CrudConfig>,
}

impl Responder {
    /// Create a responder over a template engine and configuration
    #[must_use]
    pub const fn new(engine: TemplateEngine, config: Arc<CrudConfig>) -> Self {
        Self { engine, config }
    }

    /// The underlying template engine
    #[must_use]
    pub const fn engine(&self) -> &TemplateEngine {
        &self.engine
    }

    /// Produce the negotiated response for this request
    ///
    /// `data` is both the JSON payload and the template render context.
    pub fn respond(
        &self,
        headers: &HeaderMap,
        hx_request: bool,
        template: &str,
        data: serde_json::Map<String, Value>,
    ) -> Result<Response, CrudError> {
        let accept = headers
            .get(header::ACCEPT)
            .and_then(|v| v.to_str().ok());
        let caps = Capabilities::from_config(&self.config);
        let has_layout = self.config.layout.is_some() && self.config.layout_on_full_page;

        match negotiate(accept, hx_request, has_layout, &caps) {
            Disposition::Json => Ok(Json(Value::Object(data)).into_response()),
            Disposition::Fragment => {
                let html = self.engine.render(template, &data)?;
                Ok(Html(html).into_response())
            }
            Disposition::Page => self.render_page(template, data),
            Disposition::Reject => {
                Err(CrudError::NotAcceptable(accept.unwrap_or("").to_string()))
            }
        }
    }

    fn render_page(
        &self,
        template: &str,
        mut data: serde_json::Map<String, Value>,
    ) -> Result<Response, CrudError> {
        let Some(layout) = self.config.layout.as_deref() else {
            // Page is only negotiated with a layout configured.
            let html = self.engine.render(template, &data)?;
            return Ok(Html(html).into_response());
        };
        if let Some(extra) = &self.config.layout_context {
            extra(&mut data);
        }
        let content = self.engine.render(template, &data)?;
        let base = minijinja::Value::from_serialize(&data);
        let ctx = context! {
            content => minijinja::Value::from_safe_string(content),
            ..base
        };
        let html = self.engine.render(layout, ctx)?;
        Ok(Html(html).into_response())
    }
}
