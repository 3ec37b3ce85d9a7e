//! Built-in health route merged into every HTTP adapter.

use axum::routing::get;
use axum::{Json, Router};
use serde_json::json;

use hexarc::AdapterContext;

/// Build the `/healthz` router for an adapter.
///
/// The response names the component coordinates so a probe can tell which
/// adapter of which service answered.
pub(crate) fn router(ctx: &AdapterContext) -> Router {
    let body = json!({
        "status": "ok",
        "service": ctx.service(),
        "port": ctx.port(),
        "adapter": ctx.adapter(),
    });

    Router::new().route("/healthz", get(move || async move { Json(body) }))
}
