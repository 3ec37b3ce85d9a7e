//! Deployment of services onto the async runtime.
//!
//! A [`DeploymentGroup`] owns a set of running services. Deploying starts
//! every adapter of every port in declaration order; a start failure rolls
//! back the already-started adapters in reverse and leaves the group
//! unchanged. Undeploying stops adapters in reverse order, and group
//! shutdown undeploys services in reverse deployment order. All services in
//! a group share one event bus.

mod state;

pub use state::{ServiceHandle, ServiceState};

use std::fmt;
use std::time::Duration;

use tokio::sync::watch;

use crate::bus::EventBus;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::service::{AdapterContext, PortRuntime, Service};

/// Tunables for a deployment group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeploymentConfig {
    /// Upper bound for a single adapter start.
    pub ready_timeout: Duration,
    /// Upper bound for a single adapter stop.
    pub stop_timeout: Duration,
    /// Buffered events per bus address.
    pub bus_capacity: usize,
}

impl Default for DeploymentConfig {
    fn default() -> Self {
        Self {
            ready_timeout: Duration::from_secs(10),
            stop_timeout: Duration::from_secs(5),
            bus_capacity: crate::bus::DEFAULT_CAPACITY,
        }
    }
}

impl From<&Config> for DeploymentConfig {
    fn from(config: &Config) -> Self {
        Self {
            ready_timeout: config.ready_timeout(),
            stop_timeout: config.stop_timeout(),
            bus_capacity: config.deployment.bus_capacity,
        }
    }
}

struct DeployedService {
    handle: ServiceHandle,
    ports: Vec<Box<dyn PortRuntime>>,
    /// Adapters actually started, as (port, adapter) indices in start order.
    started: Vec<(usize, usize)>,
    shutdown_tx: watch::Sender<bool>,
}

/// A group of deployed services sharing one event bus.
///
/// # Examples
///
/// ```no_run
/// use std::sync::Arc;
/// use hexarc::deployment::DeploymentGroup;
/// use hexarc::service::{PortBinding, Service};
///
/// # trait Port: Send + Sync {}
/// # struct Model;
/// # impl Port for Model {}
/// # async fn example() -> hexarc::Result<()> {
/// let model: Arc<dyn Port> = Arc::new(Model);
/// let service = Service::builder("example")
///     .port(PortBinding::new("port", model))
///     .build()?;
///
/// let mut group = DeploymentGroup::new();
/// let handle = group.deploy(service).await?;
/// assert!(handle.state().is_ready());
///
/// group.shutdown().await?;
/// # Ok(())
/// # }
/// ```
pub struct DeploymentGroup {
    config: DeploymentConfig,
    bus: EventBus,
    services: Vec<DeployedService>,
}

impl DeploymentGroup {
    /// Create a group with default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(DeploymentConfig::default())
    }

    /// Create a group with explicit configuration.
    #[must_use]
    pub fn with_config(config: DeploymentConfig) -> Self {
        let bus = EventBus::new(config.bus_capacity);
        Self {
            config,
            bus,
            services: Vec::new(),
        }
    }

    /// The group's shared event bus.
    #[must_use]
    pub fn bus(&self) -> &EventBus {
        &self.bus
    }

    /// The group's configuration.
    #[must_use]
    pub fn config(&self) -> &DeploymentConfig {
        &self.config
    }

    /// Check whether a service with this name is deployed.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.services.iter().any(|s| s.handle.name() == name)
    }

    /// Handle of a deployed service, if present.
    #[must_use]
    pub fn handle(&self, name: &str) -> Option<ServiceHandle> {
        self.services
            .iter()
            .find(|s| s.handle.name() == name)
            .map(|s| s.handle.clone())
    }

    /// Names of deployed services, in deployment order.
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        self.services.iter().map(|s| s.handle.name()).collect()
    }

    /// Number of deployed services.
    #[must_use]
    pub fn len(&self) -> usize {
        self.services.len()
    }

    /// Check whether no services are deployed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.services.is_empty()
    }

    /// Deploy a service.
    ///
    /// Starts every adapter of every port in declaration order. Each start
    /// is bounded by the configured ready timeout. On the first failure the
    /// already-started adapters are stopped in reverse order, the service is
    /// not added to the group, and the start error is returned.
    ///
    /// # Errors
    ///
    /// Returns [`Error::AlreadyDeployed`] if the group already holds a
    /// service with this name, or [`Error::AdapterStart`] if an adapter
    /// fails or times out while starting.
    pub async fn deploy(&mut self, service: Service) -> Result<ServiceHandle> {
        let (name, mut ports) = service.into_parts();
        if self.contains(&name) {
            return Err(Error::AlreadyDeployed { service: name });
        }

        let handle = ServiceHandle::new(&name);
        handle.set_state(ServiceState::Starting);
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let mut started: Vec<(usize, usize)> = Vec::new();
        let mut failure: Option<Error> = None;

        'ports: for port_idx in 0..ports.len() {
            for adapter_idx in 0..ports[port_idx].adapter_count() {
                let port_name = ports[port_idx].name().to_string();
                let adapter_name = ports[port_idx]
                    .adapter_name(adapter_idx)
                    .unwrap_or("unknown")
                    .to_string();
                let ctx = AdapterContext::new(
                    &name,
                    &port_name,
                    &adapter_name,
                    self.bus.clone(),
                    shutdown_rx.clone(),
                );

                let outcome = tokio::time::timeout(
                    self.config.ready_timeout,
                    ports[port_idx].start_adapter(adapter_idx, ctx),
                )
                .await
                .unwrap_or_else(|_| {
                    Err(Error::adapter_start(
                        &name,
                        &port_name,
                        &adapter_name,
                        format!(
                            "start did not complete within {:?}",
                            self.config.ready_timeout
                        ),
                    ))
                });

                match outcome {
                    Ok(()) => {
                        tracing::debug!(
                            service = %name,
                            port = %port_name,
                            adapter = %adapter_name,
                            "adapter started"
                        );
                        started.push((port_idx, adapter_idx));
                    }
                    Err(err) => {
                        failure = Some(start_error(&name, &port_name, &adapter_name, err));
                        break 'ports;
                    }
                }
            }
        }

        if let Some(err) = failure {
            tracing::warn!(service = %name, error = %err, "deploy failed, rolling back");
            let _ = shutdown_tx.send(true);
            for &(port_idx, adapter_idx) in started.iter().rev() {
                let rollback = tokio::time::timeout(
                    self.config.stop_timeout,
                    ports[port_idx].stop_adapter(adapter_idx),
                )
                .await;
                match rollback {
                    Ok(Ok(())) => {}
                    Ok(Err(stop_err)) => {
                        tracing::warn!(service = %name, error = %stop_err, "rollback stop failed");
                    }
                    Err(_) => {
                        tracing::warn!(service = %name, "rollback stop timed out");
                    }
                }
            }
            handle.set_state(ServiceState::Failed(err.to_string()));
            return Err(err);
        }

        handle.set_state(ServiceState::Ready);
        tracing::info!(
            service = %name,
            ports = ?ports.iter().map(|p| p.name()).collect::<Vec<_>>(),
            adapters = started.len(),
            "service deployed"
        );

        self.services.push(DeployedService {
            handle: handle.clone(),
            ports,
            started,
            shutdown_tx,
        });
        Ok(handle)
    }

    /// Undeploy a service by name.
    ///
    /// Signals shutdown to the service's adapters, then stops them in
    /// reverse start order, each stop bounded by the configured stop
    /// timeout. The service is removed from the group even when a stop
    /// fails; in that case the first stop error is returned after every
    /// adapter has been attempted.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ServiceNotFound`] if no such service is deployed,
    /// or [`Error::AdapterStop`] for the first adapter that failed to stop.
    pub async fn undeploy(&mut self, name: &str) -> Result<()> {
        let position = self
            .services
            .iter()
            .position(|s| s.handle.name() == name)
            .ok_or_else(|| Error::service_not_found(name))?;
        let mut service = self.services.remove(position);

        service.handle.set_state(ServiceState::Stopping);
        let _ = service.shutdown_tx.send(true);

        let mut first_error: Option<Error> = None;
        for &(port_idx, adapter_idx) in service.started.iter().rev() {
            let port_name = service.ports[port_idx].name().to_string();
            let adapter_name = service.ports[port_idx]
                .adapter_name(adapter_idx)
                .unwrap_or("unknown")
                .to_string();

            let outcome = tokio::time::timeout(
                self.config.stop_timeout,
                service.ports[port_idx].stop_adapter(adapter_idx),
            )
            .await
            .unwrap_or_else(|_| {
                Err(Error::adapter_stop(
                    name,
                    &port_name,
                    &adapter_name,
                    format!(
                        "stop did not complete within {:?}",
                        self.config.stop_timeout
                    ),
                ))
            });

            match outcome {
                Ok(()) => {
                    tracing::debug!(
                        service = %name,
                        port = %port_name,
                        adapter = %adapter_name,
                        "adapter stopped"
                    );
                }
                Err(err) => {
                    let err = stop_error(name, &port_name, &adapter_name, err);
                    tracing::warn!(
                        service = %name,
                        port = %port_name,
                        adapter = %adapter_name,
                        error = %err,
                        "adapter stop failed"
                    );
                    first_error.get_or_insert(err);
                }
            }
        }

        service.handle.set_state(ServiceState::Stopped);
        match first_error {
            None => {
                tracing::info!(service = %name, "service undeployed");
                Ok(())
            }
            Some(err) => Err(err),
        }
    }

    /// Undeploy every service, newest first.
    ///
    /// All services are undeployed even when one of them reports a stop
    /// error; the first error is returned after the sweep.
    ///
    /// # Errors
    ///
    /// Returns the first stop error encountered, if any.
    pub async fn shutdown(&mut self) -> Result<()> {
        let mut first_error: Option<Error> = None;
        while let Some(name) = self.services.last().map(|s| s.handle.name().to_string()) {
            if let Err(err) = self.undeploy(&name).await {
                first_error.get_or_insert(err);
            }
        }
        match first_error {
            None => Ok(()),
            Some(err) => Err(err),
        }
    }
}

impl Default for DeploymentGroup {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for DeploymentGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeploymentGroup")
            .field("services", &self.names())
            .field("config", &self.config)
            .finish()
    }
}

/// Keep adapter start errors as-is; wrap anything else with coordinates.
fn start_error(service: &str, port: &str, adapter: &str, err: Error) -> Error {
    match err {
        already @ Error::AdapterStart { .. } => already,
        other => Error::adapter_start(service, port, adapter, other.to_string()),
    }
}

fn stop_error(service: &str, port: &str, adapter: &str, err: Error) -> Error {
    match err {
        already @ Error::AdapterStop { .. } => already,
        other => Error::adapter_stop(service, port, adapter, other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::{Adapter, PortBinding};
    use async_trait::async_trait;
    use std::sync::{Arc, Mutex};

    struct NullModel;

    /// What a test adapter should do when driven through its lifecycle.
    #[derive(Debug, Clone, Default)]
    struct Behavior {
        fail_start: bool,
        fail_stop: bool,
        hang_start: bool,
        hang_stop: bool,
        publish_on_start: Option<String>,
    }

    struct TestAdapter {
        name: String,
        behavior: Behavior,
        log: Arc<Mutex<Vec<String>>>,
        ctx: Option<AdapterContext>,
    }

    impl TestAdapter {
        fn new(name: &str, log: &Arc<Mutex<Vec<String>>>) -> Self {
            Self::with_behavior(name, log, Behavior::default())
        }

        fn with_behavior(name: &str, log: &Arc<Mutex<Vec<String>>>, behavior: Behavior) -> Self {
            Self {
                name: name.to_string(),
                behavior,
                log: Arc::clone(log),
                ctx: None,
            }
        }

        fn record(&self, what: &str) {
            self.log
                .lock()
                .unwrap()
                .push(format!("{}:{}", self.name, what));
        }
    }

    #[async_trait]
    impl Adapter<NullModel> for TestAdapter {
        fn name(&self) -> &str {
            &self.name
        }

        async fn start(&mut self, _model: Arc<NullModel>, ctx: AdapterContext) -> Result<()> {
            if self.behavior.hang_start {
                tokio::time::sleep(Duration::from_secs(3600)).await;
            }
            if self.behavior.fail_start {
                return Err(Error::adapter_start(
                    ctx.service(),
                    ctx.port(),
                    &self.name,
                    "refused",
                ));
            }
            if let Some(address) = &self.behavior.publish_on_start {
                ctx.bus().publish(address, &serde_json::json!({"from": self.name}))?;
            }
            self.ctx = Some(ctx);
            self.record("start");
            Ok(())
        }

        async fn stop(&mut self) -> Result<()> {
            if self.behavior.hang_stop {
                tokio::time::sleep(Duration::from_secs(3600)).await;
            }
            let saw_shutdown = self
                .ctx
                .as_ref()
                .is_some_and(AdapterContext::shutdown_requested);
            if saw_shutdown {
                self.record("stop:signalled");
            } else {
                self.record("stop");
            }
            if self.behavior.fail_stop {
                return Err(Error::internal("stop refused"));
            }
            Ok(())
        }
    }

    fn entries(log: &Arc<Mutex<Vec<String>>>) -> Vec<String> {
        log.lock().unwrap().clone()
    }

    fn quick_config() -> DeploymentConfig {
        DeploymentConfig {
            ready_timeout: Duration::from_millis(100),
            stop_timeout: Duration::from_millis(100),
            bus_capacity: 8,
        }
    }

    #[tokio::test]
    async fn test_deploy_starts_adapters_in_declaration_order() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let service = Service::builder("ordered")
            .port(
                PortBinding::new("first", Arc::new(NullModel))
                    .adapter(TestAdapter::new("alpha", &log))
                    .adapter(TestAdapter::new("beta", &log)),
            )
            .port(
                PortBinding::new("second", Arc::new(NullModel))
                    .adapter(TestAdapter::new("gamma", &log)),
            )
            .build()
            .unwrap();

        let mut group = DeploymentGroup::new();
        let handle = group.deploy(service).await.unwrap();

        assert!(handle.state().is_ready());
        assert!(group.contains("ordered"));
        assert_eq!(group.names(), vec!["ordered"]);
        assert_eq!(
            entries(&log),
            vec!["alpha:start", "beta:start", "gamma:start"]
        );
    }

    #[tokio::test]
    async fn test_deploy_rejects_duplicate_name() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut group = DeploymentGroup::new();

        let first = Service::builder("lamp")
            .port(PortBinding::new("p", Arc::new(NullModel)).adapter(TestAdapter::new("a", &log)))
            .build()
            .unwrap();
        group.deploy(first).await.unwrap();

        let second = Service::builder("lamp")
            .port(PortBinding::new("p", Arc::new(NullModel)).adapter(TestAdapter::new("b", &log)))
            .build()
            .unwrap();
        let err = group.deploy(second).await.unwrap_err();

        assert!(matches!(err, Error::AlreadyDeployed { .. }));
        assert_eq!(group.len(), 1);
    }

    #[tokio::test]
    async fn test_deploy_rolls_back_started_adapters_on_failure() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let service = Service::builder("doomed")
            .port(
                PortBinding::new("good", Arc::new(NullModel))
                    .adapter(TestAdapter::new("alpha", &log))
                    .adapter(TestAdapter::new("beta", &log)),
            )
            .port(
                PortBinding::new("bad", Arc::new(NullModel)).adapter(TestAdapter::with_behavior(
                    "gamma",
                    &log,
                    Behavior {
                        fail_start: true,
                        ..Behavior::default()
                    },
                )),
            )
            .build()
            .unwrap();

        let mut group = DeploymentGroup::new();
        let err = group.deploy(service).await.unwrap_err();

        assert!(matches!(err, Error::AdapterStart { .. }));
        assert!(err.to_string().contains("gamma"));
        assert!(!group.contains("doomed"));
        assert!(group.is_empty());
        // Rollback stopped the started adapters newest-first, after the
        // shutdown signal was flipped
        assert_eq!(
            entries(&log),
            vec![
                "alpha:start",
                "beta:start",
                "beta:stop:signalled",
                "alpha:stop:signalled"
            ]
        );
    }

    #[tokio::test]
    async fn test_deploy_start_timeout() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let service = Service::builder("sluggish")
            .port(
                PortBinding::new("p", Arc::new(NullModel)).adapter(TestAdapter::with_behavior(
                    "slow",
                    &log,
                    Behavior {
                        hang_start: true,
                        ..Behavior::default()
                    },
                )),
            )
            .build()
            .unwrap();

        let mut group = DeploymentGroup::with_config(quick_config());
        let err = group.deploy(service).await.unwrap_err();

        assert!(matches!(err, Error::AdapterStart { .. }));
        assert!(err.to_string().contains("did not complete"));
        assert!(group.is_empty());
    }

    #[tokio::test]
    async fn test_undeploy_stops_in_reverse_order() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let service = Service::builder("ordered")
            .port(
                PortBinding::new("p", Arc::new(NullModel))
                    .adapter(TestAdapter::new("alpha", &log))
                    .adapter(TestAdapter::new("beta", &log)),
            )
            .build()
            .unwrap();

        let mut group = DeploymentGroup::new();
        let handle = group.deploy(service).await.unwrap();
        group.undeploy("ordered").await.unwrap();

        assert_eq!(handle.state(), ServiceState::Stopped);
        assert!(group.is_empty());
        // Shutdown was signalled before any stop ran
        assert_eq!(
            entries(&log),
            vec![
                "alpha:start",
                "beta:start",
                "beta:stop:signalled",
                "alpha:stop:signalled"
            ]
        );
    }

    #[tokio::test]
    async fn test_undeploy_unknown_service() {
        let mut group = DeploymentGroup::new();
        let err = group.undeploy("ghost").await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_undeploy_continues_past_stop_failure() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let service = Service::builder("stubborn")
            .port(
                PortBinding::new("p", Arc::new(NullModel))
                    .adapter(TestAdapter::with_behavior(
                        "alpha",
                        &log,
                        Behavior {
                            fail_stop: true,
                            ..Behavior::default()
                        },
                    ))
                    .adapter(TestAdapter::new("beta", &log)),
            )
            .build()
            .unwrap();

        let mut group = DeploymentGroup::new();
        let handle = group.deploy(service).await.unwrap();
        let err = group.undeploy("stubborn").await.unwrap_err();

        // The failing adapter is reported, but every adapter was attempted
        // and the service is gone from the group
        assert!(matches!(err, Error::AdapterStop { .. }));
        assert!(err.to_string().contains("alpha"));
        assert!(group.is_empty());
        assert_eq!(handle.state(), ServiceState::Stopped);
        let log_entries = entries(&log);
        assert!(log_entries.contains(&"beta:stop:signalled".to_string()));
        assert!(log_entries.contains(&"alpha:stop:signalled".to_string()));
    }

    #[tokio::test]
    async fn test_undeploy_stop_timeout() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let service = Service::builder("wedged")
            .port(
                PortBinding::new("p", Arc::new(NullModel)).adapter(TestAdapter::with_behavior(
                    "stuck",
                    &log,
                    Behavior {
                        hang_stop: true,
                        ..Behavior::default()
                    },
                )),
            )
            .build()
            .unwrap();

        let mut group = DeploymentGroup::with_config(quick_config());
        group.deploy(service).await.unwrap();
        let err = group.undeploy("wedged").await.unwrap_err();

        assert!(matches!(err, Error::AdapterStop { .. }));
        assert!(err.to_string().contains("did not complete"));
        assert!(group.is_empty());
    }

    #[tokio::test]
    async fn test_redeploy_after_undeploy() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut group = DeploymentGroup::new();

        let first = Service::builder("lamp")
            .port(PortBinding::new("p", Arc::new(NullModel)).adapter(TestAdapter::new("a", &log)))
            .build()
            .unwrap();
        group.deploy(first).await.unwrap();
        group.undeploy("lamp").await.unwrap();

        let second = Service::builder("lamp")
            .port(PortBinding::new("p", Arc::new(NullModel)).adapter(TestAdapter::new("b", &log)))
            .build()
            .unwrap();
        let handle = group.deploy(second).await.unwrap();
        assert!(handle.state().is_ready());
    }

    #[tokio::test]
    async fn test_shutdown_undeploys_in_reverse_deployment_order() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut group = DeploymentGroup::new();

        for name in ["one", "two", "three"] {
            let service = Service::builder(name)
                .port(
                    PortBinding::new("p", Arc::new(NullModel))
                        .adapter(TestAdapter::new(name, &log)),
                )
                .build()
                .unwrap();
            group.deploy(service).await.unwrap();
        }
        assert_eq!(group.names(), vec!["one", "two", "three"]);

        group.shutdown().await.unwrap();
        assert!(group.is_empty());

        let stops: Vec<String> = entries(&log)
            .into_iter()
            .filter(|entry| entry.contains("stop"))
            .collect();
        assert_eq!(
            stops,
            vec![
                "three:stop:signalled",
                "two:stop:signalled",
                "one:stop:signalled"
            ]
        );
    }

    #[tokio::test]
    async fn test_shutdown_reports_first_error_after_sweeping() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut group = DeploymentGroup::new();

        let failing = Service::builder("failing")
            .port(
                PortBinding::new("p", Arc::new(NullModel)).adapter(TestAdapter::with_behavior(
                    "bad",
                    &log,
                    Behavior {
                        fail_stop: true,
                        ..Behavior::default()
                    },
                )),
            )
            .build()
            .unwrap();
        let clean = Service::builder("clean")
            .port(PortBinding::new("p", Arc::new(NullModel)).adapter(TestAdapter::new("good", &log)))
            .build()
            .unwrap();

        group.deploy(failing).await.unwrap();
        group.deploy(clean).await.unwrap();

        let err = group.shutdown().await.unwrap_err();
        assert!(matches!(err, Error::AdapterStop { .. }));
        // Both services were removed despite the error
        assert!(group.is_empty());
        assert!(entries(&log).contains(&"good:stop:signalled".to_string()));
    }

    #[tokio::test]
    async fn test_adapters_share_the_group_bus() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut group = DeploymentGroup::new();
        let mut sub = group.bus().subscribe("boot");

        let service = Service::builder("announcer")
            .port(
                PortBinding::new("p", Arc::new(NullModel)).adapter(TestAdapter::with_behavior(
                    "speaker",
                    &log,
                    Behavior {
                        publish_on_start: Some("boot".to_string()),
                        ..Behavior::default()
                    },
                )),
            )
            .build()
            .unwrap();
        group.deploy(service).await.unwrap();

        let event = sub.recv().await.unwrap();
        assert_eq!(event.payload()["from"], "speaker");
    }

    #[tokio::test]
    async fn test_handle_lookup() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut group = DeploymentGroup::new();

        let service = Service::builder("lamp")
            .port(PortBinding::new("p", Arc::new(NullModel)).adapter(TestAdapter::new("a", &log)))
            .build()
            .unwrap();
        group.deploy(service).await.unwrap();

        let handle = group.handle("lamp").unwrap();
        assert!(handle.state().is_ready());
        assert!(group.handle("missing").is_none());
    }

    #[test]
    fn test_deployment_config_default() {
        let config = DeploymentConfig::default();
        assert_eq!(config.ready_timeout, Duration::from_secs(10));
        assert_eq!(config.stop_timeout, Duration::from_secs(5));
        assert_eq!(config.bus_capacity, crate::bus::DEFAULT_CAPACITY);
    }

    #[test]
    fn test_deployment_config_from_config() {
        let mut app_config = Config::default();
        app_config.deployment.ready_timeout_ms = 1_500;
        app_config.deployment.stop_timeout_ms = 750;
        app_config.deployment.bus_capacity = 16;

        let config = DeploymentConfig::from(&app_config);
        assert_eq!(config.ready_timeout, Duration::from_millis(1_500));
        assert_eq!(config.stop_timeout, Duration::from_millis(750));
        assert_eq!(config.bus_capacity, 16);
    }

    #[test]
    fn test_group_debug() {
        let group = DeploymentGroup::new();
        let debug_str = format!("{group:?}");
        assert!(debug_str.contains("DeploymentGroup"));
    }
}
