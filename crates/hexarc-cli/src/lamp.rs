//! The bundled sample service: a switchable lamp.
//!
//! The lamp shows the pattern end to end. [`LampPort`] is the port,
//! [`LampSwitch`] the model implementing it, and an
//! [`HttpAdapter`](hexarc_http::HttpAdapter) the technology binding that
//! exposes the model over HTTP.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};

use hexarc::{PortBinding, Result, Service};
use hexarc_http::HttpAdapter;

/// Name of the sample service.
pub const SERVICE_NAME: &str = "lamp";

/// Port for a switchable lamp.
pub trait LampPort: Send + Sync {
    /// Turn the lamp on.
    fn switch_on(&self);

    /// Turn the lamp off.
    fn switch_off(&self);

    /// Flip the lamp, returning the new state.
    fn toggle(&self) -> bool;

    /// Whether the lamp is currently on.
    fn is_on(&self) -> bool;
}

/// The lamp model: pure business logic with no knowledge of HTTP.
#[derive(Debug, Default)]
pub struct LampSwitch {
    on: AtomicBool,
}

impl LampSwitch {
    /// Create a lamp that starts switched off.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl LampPort for LampSwitch {
    fn switch_on(&self) {
        self.on.store(true, Ordering::SeqCst);
    }

    fn switch_off(&self) {
        self.on.store(false, Ordering::SeqCst);
    }

    fn toggle(&self) -> bool {
        !self.on.fetch_xor(true, Ordering::SeqCst)
    }

    fn is_on(&self) -> bool {
        self.on.load(Ordering::SeqCst)
    }
}

async fn state(State(lamp): State<Arc<dyn LampPort>>) -> Json<Value> {
    Json(json!({"on": lamp.is_on()}))
}

async fn switch_on(State(lamp): State<Arc<dyn LampPort>>) -> Json<Value> {
    lamp.switch_on();
    Json(json!({"on": true}))
}

async fn switch_off(State(lamp): State<Arc<dyn LampPort>>) -> Json<Value> {
    lamp.switch_off();
    Json(json!({"on": false}))
}

async fn toggle(State(lamp): State<Arc<dyn LampPort>>) -> Json<Value> {
    Json(json!({"on": lamp.toggle()}))
}

/// Build the HTTP routes for a lamp model.
#[must_use]
pub fn lamp_router(lamp: Arc<dyn LampPort>) -> Router {
    Router::new()
        .route("/lamp", get(state))
        .route("/lamp/on", post(switch_on))
        .route("/lamp/off", post(switch_off))
        .route("/lamp/toggle", post(toggle))
        .with_state(lamp)
}

/// Assemble the lamp service, bound to the given address.
///
/// # Errors
///
/// Returns an error if the service definition is invalid.
pub fn lamp_service(bind: SocketAddr) -> Result<Service> {
    let model: Arc<dyn LampPort> = Arc::new(LampSwitch::new());
    Service::builder(SERVICE_NAME)
        .port(PortBinding::new("lamp", model).adapter(HttpAdapter::new(bind, lamp_router)))
        .build()
}

/// Describe the sample service structure.
#[must_use]
pub fn describe() -> Value {
    json!({
        "service": SERVICE_NAME,
        "ports": [
            {
                "name": "lamp",
                "model": "LampSwitch",
                "adapters": [
                    {
                        "name": "http",
                        "routes": [
                            "GET /lamp",
                            "POST /lamp/on",
                            "POST /lamp/off",
                            "POST /lamp/toggle",
                            "GET /healthz",
                        ],
                    }
                ],
            }
        ],
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lamp_starts_off() {
        let lamp = LampSwitch::new();
        assert!(!lamp.is_on());
    }

    #[test]
    fn test_switch_on_and_off() {
        let lamp = LampSwitch::new();

        lamp.switch_on();
        assert!(lamp.is_on());

        lamp.switch_off();
        assert!(!lamp.is_on());
    }

    #[test]
    fn test_switch_on_is_idempotent() {
        let lamp = LampSwitch::new();
        lamp.switch_on();
        lamp.switch_on();
        assert!(lamp.is_on());
    }

    #[test]
    fn test_toggle_flips_and_reports_new_state() {
        let lamp = LampSwitch::new();

        assert!(lamp.toggle());
        assert!(lamp.is_on());

        assert!(!lamp.toggle());
        assert!(!lamp.is_on());
    }

    #[test]
    fn test_lamp_service_structure() {
        let service = lamp_service("127.0.0.1:0".parse().unwrap()).unwrap();
        assert_eq!(service.name(), SERVICE_NAME);
        assert_eq!(service.port_names(), vec!["lamp"]);
        assert_eq!(service.adapter_count(), 1);
    }

    #[test]
    fn test_lamp_router_builds() {
        let model: Arc<dyn LampPort> = Arc::new(LampSwitch::new());
        let _router = lamp_router(model);
    }

    #[test]
    fn test_describe_names_the_service() {
        let description = describe();
        assert_eq!(description["service"], json!(SERVICE_NAME));
        assert_eq!(description["ports"][0]["name"], json!("lamp"));
        assert!(description["ports"][0]["adapters"][0]["routes"]
            .as_array()
            .is_some_and(|routes| routes.len() == 5));
    }
}
