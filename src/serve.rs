//! Local HTTP surface for the dashboard.
//!
//! SYSTEM CONTEXT
//! ==============
//! `GET /` renders the current store snapshot as a full HTML page. Every
//! button on that page is a form posting to `/events/{name}`; the handler
//! runs the event to completion and redirects back to `/`, so the next page
//! load already shows the result. Background polling runs independently and
//! the page's meta refresh picks up whatever it has written.
//!
//! Events mutate the backend, and a plain form POST needs no CORS preflight,
//! so `/events/*` refuses requests another site's page could have sent: a
//! `Sec-Fetch-Site` other than `same-origin`/`none`, or an `Origin` whose
//! authority differs from `Host`. Requests carrying neither header (the CLI,
//! curl) are accepted.

use std::sync::Arc;

use axum::Router;
use axum::extract::{Form, Path, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum::routing::{get, post};
use serde::Deserialize;
use tower_http::trace::TraceLayer;
use tracing::warn;

use crate::dashboard::Dashboard;
use crate::dashboard::events::{EventError, EventTable};
use crate::render::render_page;

#[derive(Clone)]
pub struct ServeState {
    pub dashboard: Arc<Dashboard>,
    pub events: Arc<EventTable>,
    /// Meta refresh period for the page; 0 disables it.
    pub refresh_secs: u64,
}

#[derive(Debug, Default, Deserialize)]
pub struct EventForm {
    #[serde(default)]
    pub value: String,
}

pub fn app(state: ServeState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/healthz", get(healthz))
        .route("/events/{name}", post(event))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn index(State(state): State<ServeState>) -> Html<String> {
    let page = state
        .dashboard
        .store()
        .read(|view| render_page(view, state.refresh_secs));
    Html(page)
}

async fn healthz() -> &'static str {
    "ok"
}

async fn event(
    State(state): State<ServeState>,
    Path(name): Path<String>,
    headers: HeaderMap,
    Form(form): Form<EventForm>,
) -> Response {
    if is_cross_site(&headers) {
        warn!(event = %name, "rejecting cross-site event");
        return (StatusCode::FORBIDDEN, "cross-site event rejected").into_response();
    }
    match state.events.dispatch(&state.dashboard, &name, &form.value).await {
        Ok(()) => Redirect::to("/").into_response(),
        Err(e @ EventError::UnknownEvent(_)) => (StatusCode::NOT_FOUND, e.to_string()).into_response(),
    }
}

/// Whether the browser says this request came from another site.
fn is_cross_site(headers: &HeaderMap) -> bool {
    if let Some(site) = headers.get("sec-fetch-site") {
        if !matches!(site.to_str(), Ok("same-origin" | "none")) {
            return true;
        }
    }
    let Some(origin) = headers.get(header::ORIGIN) else {
        return false;
    };
    let origin_authority = origin
        .to_str()
        .ok()
        .and_then(|o| o.split_once("://"))
        .map(|(_, authority)| authority.trim_end_matches('/'));
    let host = headers.get(header::HOST).and_then(|h| h.to_str().ok());
    match (origin_authority, host) {
        (Some(origin), Some(host)) => !origin.eq_ignore_ascii_case(host),
        _ => true,
    }
}

#[cfg(test)]
#[path = "serve_test.rs"]
mod serve_test;
