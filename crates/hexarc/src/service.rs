//! Core service types for hexarc.
//!
//! A service is a named bundle of ports. Each port pairs a model (the
//! business-logic implementation of a port trait) with the adapters that
//! expose it to a technology, following the Hexagonal Architecture pattern:
//! the model knows nothing about the adapters, and adapters reach the model
//! only through the port trait.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::watch;

use crate::bus::EventBus;
use crate::error::{Error, Result};

/// Runtime context handed to an adapter when it starts.
///
/// Carries the component coordinates (service, port, adapter), a handle to
/// the deployment group's event bus, and the shutdown signal the group flips
/// when the service is undeployed.
#[derive(Debug, Clone)]
pub struct AdapterContext {
    service: Arc<str>,
    port: Arc<str>,
    adapter: Arc<str>,
    bus: EventBus,
    shutdown: watch::Receiver<bool>,
}

impl AdapterContext {
    /// Create a context.
    ///
    /// Contexts are normally created by a
    /// [`DeploymentGroup`](crate::deployment::DeploymentGroup); building one
    /// directly is useful for driving an adapter in tests.
    #[must_use]
    pub fn new(
        service: &str,
        port: &str,
        adapter: &str,
        bus: EventBus,
        shutdown: watch::Receiver<bool>,
    ) -> Self {
        Self {
            service: Arc::from(service),
            port: Arc::from(port),
            adapter: Arc::from(adapter),
            bus,
            shutdown,
        }
    }

    /// Name of the service being deployed.
    #[must_use]
    pub fn service(&self) -> &str {
        &self.service
    }

    /// Name of the port the adapter is bound to.
    #[must_use]
    pub fn port(&self) -> &str {
        &self.port
    }

    /// Name of the adapter itself.
    #[must_use]
    pub fn adapter(&self) -> &str {
        &self.adapter
    }

    /// The deployment group's event bus.
    #[must_use]
    pub fn bus(&self) -> &EventBus {
        &self.bus
    }

    /// Whether shutdown has been requested for this service.
    #[must_use]
    pub fn shutdown_requested(&self) -> bool {
        *self.shutdown.borrow()
    }

    /// Wait until shutdown is requested for this service.
    ///
    /// Resolves immediately if shutdown was already requested, and also when
    /// the owning deployment group is dropped.
    pub async fn shutdown_signal(&self) {
        let mut shutdown = self.shutdown.clone();
        if *shutdown.borrow() {
            return;
        }
        loop {
            if shutdown.changed().await.is_err() {
                // Group dropped without undeploying; treat as shutdown.
                return;
            }
            if *shutdown.borrow() {
                return;
            }
        }
    }

    /// The tracing span for work done on behalf of this adapter.
    #[must_use]
    pub fn span(&self) -> tracing::Span {
        crate::logging::component_span(&self.service, &self.port, &self.adapter)
    }
}

/// Trait for technology adapters bound to a port.
///
/// Implementors connect a port model to a concrete technology: an HTTP
/// server routing requests to the model, a queue consumer feeding it, a
/// scheduler polling it. The deployment group drives the lifecycle; an
/// adapter only has to start serving and stop cleanly.
#[async_trait]
pub trait Adapter<P: ?Sized + Send + Sync>: Send {
    /// The name of this adapter (for logging and error context).
    fn name(&self) -> &str;

    /// Start serving the model.
    ///
    /// Must return only once the adapter is ready to accept traffic. Work
    /// that outlives the call (accept loops, pollers) should be spawned and
    /// tied to `ctx.shutdown_signal()`.
    ///
    /// # Errors
    ///
    /// Returns an error if the adapter cannot start, such as when a socket
    /// cannot be bound or a broker is unreachable.
    async fn start(&mut self, model: Arc<P>, ctx: AdapterContext) -> Result<()>;

    /// Stop serving.
    ///
    /// Called at most once after a successful start, but implementations
    /// are expected to tolerate a stop without a prior start.
    ///
    /// # Errors
    ///
    /// Returns an error if the adapter fails to stop cleanly.
    async fn stop(&mut self) -> Result<()>;
}

/// A port of a service: one model plus the adapters exposing it.
///
/// The type parameter is the port trait (usually a `dyn Trait`), so every
/// adapter added here speaks to the model through the same interface.
pub struct PortBinding<P: ?Sized + Send + Sync> {
    name: String,
    model: Arc<P>,
    adapters: Vec<Box<dyn Adapter<P>>>,
}

impl<P: ?Sized + Send + Sync + 'static> PortBinding<P> {
    /// Create a port binding for a model.
    #[must_use]
    pub fn new(name: impl Into<String>, model: Arc<P>) -> Self {
        Self {
            name: name.into(),
            model,
            adapters: Vec::new(),
        }
    }

    /// Add an adapter to this port.
    ///
    /// Adapters start in the order they are added and stop in reverse.
    #[must_use]
    pub fn adapter(mut self, adapter: impl Adapter<P> + 'static) -> Self {
        self.adapters.push(Box::new(adapter));
        self
    }

    /// The port name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// How many adapters are bound to this port.
    #[must_use]
    pub fn adapter_count(&self) -> usize {
        self.adapters.len()
    }
}

impl<P: ?Sized + Send + Sync> fmt::Debug for PortBinding<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PortBinding")
            .field("name", &self.name)
            .field("adapters", &self.adapters.iter().map(|a| a.name()).collect::<Vec<_>>())
            .finish()
    }
}

/// Type-erased view of a port binding.
///
/// Lets a service hold ports of different trait types while the deployment
/// group addresses individual adapters by index, which keeps start order and
/// reverse-order stop exact.
#[async_trait]
pub(crate) trait PortRuntime: Send {
    fn name(&self) -> &str;
    fn adapter_count(&self) -> usize;
    fn adapter_name(&self, index: usize) -> Option<&str>;
    async fn start_adapter(&mut self, index: usize, ctx: AdapterContext) -> Result<()>;
    async fn stop_adapter(&mut self, index: usize) -> Result<()>;
}

#[async_trait]
impl<P: ?Sized + Send + Sync + 'static> PortRuntime for PortBinding<P> {
    fn name(&self) -> &str {
        &self.name
    }

    fn adapter_count(&self) -> usize {
        self.adapters.len()
    }

    fn adapter_name(&self, index: usize) -> Option<&str> {
        self.adapters.get(index).map(|adapter| adapter.name())
    }

    async fn start_adapter(&mut self, index: usize, ctx: AdapterContext) -> Result<()> {
        let model = Arc::clone(&self.model);
        match self.adapters.get_mut(index) {
            Some(adapter) => adapter.start(model, ctx).await,
            None => Err(Error::internal(format!(
                "adapter index {index} out of range on port '{}'",
                self.name
            ))),
        }
    }

    async fn stop_adapter(&mut self, index: usize) -> Result<()> {
        match self.adapters.get_mut(index) {
            Some(adapter) => adapter.stop().await,
            None => Err(Error::internal(format!(
                "adapter index {index} out of range on port '{}'",
                self.name
            ))),
        }
    }
}

/// A named bundle of ports, ready to be deployed.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use hexarc::service::{PortBinding, Service};
///
/// trait Greeter: Send + Sync {
///     fn greet(&self) -> String;
/// }
///
/// struct English;
/// impl Greeter for English {
///     fn greet(&self) -> String {
///         "hello".to_string()
///     }
/// }
///
/// let model: Arc<dyn Greeter> = Arc::new(English);
/// let service = Service::builder("greeter")
///     .port(PortBinding::new("greeting", model))
///     .build()
///     .unwrap();
/// assert_eq!(service.name(), "greeter");
/// ```
pub struct Service {
    name: String,
    ports: Vec<Box<dyn PortRuntime>>,
}

impl Service {
    /// Start building a service with the given name.
    #[must_use]
    pub fn builder(name: impl Into<String>) -> ServiceBuilder {
        ServiceBuilder {
            name: name.into(),
            ports: Vec::new(),
        }
    }

    /// The service name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Names of the declared ports, in declaration order.
    #[must_use]
    pub fn port_names(&self) -> Vec<&str> {
        self.ports.iter().map(|port| port.name()).collect()
    }

    /// Total number of adapters across all ports.
    #[must_use]
    pub fn adapter_count(&self) -> usize {
        self.ports.iter().map(|port| port.adapter_count()).sum()
    }

    pub(crate) fn into_parts(self) -> (String, Vec<Box<dyn PortRuntime>>) {
        (self.name, self.ports)
    }
}

impl fmt::Debug for Service {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Service")
            .field("name", &self.name)
            .field("ports", &self.port_names())
            .finish()
    }
}

/// Builder for [`Service`].
pub struct ServiceBuilder {
    name: String,
    ports: Vec<Box<dyn PortRuntime>>,
}

impl ServiceBuilder {
    /// Add a port binding to the service.
    ///
    /// Ports deploy in declaration order and stop in reverse.
    #[must_use]
    pub fn port<P: ?Sized + Send + Sync + 'static>(mut self, binding: PortBinding<P>) -> Self {
        self.ports.push(Box::new(binding));
        self
    }

    /// Finish building the service.
    ///
    /// # Errors
    ///
    /// Returns [`Error::EmptyService`] if no ports were declared, or
    /// [`Error::DuplicatePort`] if two ports share a name.
    pub fn build(self) -> Result<Service> {
        if self.ports.is_empty() {
            return Err(Error::EmptyService { service: self.name });
        }

        for (i, port) in self.ports.iter().enumerate() {
            if self.ports[..i].iter().any(|p| p.name() == port.name()) {
                return Err(Error::DuplicatePort {
                    service: self.name,
                    port: port.name().to_string(),
                });
            }
        }

        Ok(Service {
            name: self.name,
            ports: self.ports,
        })
    }
}

impl fmt::Debug for ServiceBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceBuilder")
            .field("name", &self.name)
            .field("ports", &self.ports.iter().map(|p| p.name()).collect::<Vec<_>>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    trait Counter: Send + Sync {
        fn increment(&self) -> usize;
        fn value(&self) -> usize;
    }

    #[derive(Default)]
    struct CounterModel {
        count: AtomicUsize,
    }

    impl Counter for CounterModel {
        fn increment(&self) -> usize {
            self.count.fetch_add(1, Ordering::SeqCst) + 1
        }

        fn value(&self) -> usize {
            self.count.load(Ordering::SeqCst)
        }
    }

    /// Records lifecycle calls so tests can assert ordering.
    struct RecordingAdapter {
        name: String,
        log: Arc<Mutex<Vec<String>>>,
    }

    impl RecordingAdapter {
        fn new(name: &str, log: Arc<Mutex<Vec<String>>>) -> Self {
            Self {
                name: name.to_string(),
                log,
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
    impl Adapter<dyn Counter> for RecordingAdapter {
        fn name(&self) -> &str {
            &self.name
        }

        async fn start(&mut self, model: Arc<dyn Counter>, _ctx: AdapterContext) -> Result<()> {
            model.increment();
            self.record("start");
            Ok(())
        }

        async fn stop(&mut self) -> Result<()> {
            self.record("stop");
            Ok(())
        }
    }

    fn test_context() -> (AdapterContext, watch::Sender<bool>) {
        let (tx, rx) = watch::channel(false);
        let ctx = AdapterContext::new("svc", "port", "adapter", EventBus::new(8), rx);
        (ctx, tx)
    }

    #[test]
    fn test_context_accessors() {
        let (ctx, _tx) = test_context();
        assert_eq!(ctx.service(), "svc");
        assert_eq!(ctx.port(), "port");
        assert_eq!(ctx.adapter(), "adapter");
        assert!(!ctx.shutdown_requested());
    }

    #[tokio::test]
    async fn test_context_shutdown_signal() {
        let (ctx, tx) = test_context();
        assert!(!ctx.shutdown_requested());

        tx.send(true).unwrap();
        ctx.shutdown_signal().await;
        assert!(ctx.shutdown_requested());
    }

    #[tokio::test]
    async fn test_context_shutdown_signal_on_drop() {
        let (ctx, tx) = test_context();
        drop(tx);
        // Resolves rather than hanging once the sender is gone
        ctx.shutdown_signal().await;
    }

    #[tokio::test]
    async fn test_context_bus_wired() {
        let (ctx, _tx) = test_context();
        let mut sub = ctx.bus().subscribe("ping");
        ctx.bus().publish("ping", &serde_json::json!(1)).unwrap();
        assert_eq!(sub.recv().await.unwrap().payload(), 1);
    }

    #[test]
    fn test_port_binding_accessors() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let model: Arc<dyn Counter> = Arc::new(CounterModel::default());
        let binding = PortBinding::new("counter", model)
            .adapter(RecordingAdapter::new("a", Arc::clone(&log)))
            .adapter(RecordingAdapter::new("b", log));

        assert_eq!(binding.name(), "counter");
        assert_eq!(binding.adapter_count(), 2);
    }

    #[tokio::test]
    async fn test_port_runtime_start_and_stop_by_index() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let model: Arc<dyn Counter> = Arc::new(CounterModel::default());
        let mut binding: Box<dyn PortRuntime> = Box::new(
            PortBinding::new("counter", Arc::clone(&model))
                .adapter(RecordingAdapter::new("a", Arc::clone(&log)))
                .adapter(RecordingAdapter::new("b", Arc::clone(&log))),
        );

        assert_eq!(binding.adapter_name(0), Some("a"));
        assert_eq!(binding.adapter_name(1), Some("b"));
        assert_eq!(binding.adapter_name(2), None);

        let (ctx, _tx) = test_context();
        binding.start_adapter(0, ctx.clone()).await.unwrap();
        binding.start_adapter(1, ctx).await.unwrap();
        binding.stop_adapter(1).await.unwrap();
        binding.stop_adapter(0).await.unwrap();

        let entries = log.lock().unwrap().clone();
        assert_eq!(entries, vec!["a:start", "b:start", "b:stop", "a:stop"]);
        // Each start touched the shared model through the port trait
        assert_eq!(model.value(), 2);
    }

    #[tokio::test]
    async fn test_port_runtime_index_out_of_range() {
        let model: Arc<dyn Counter> = Arc::new(CounterModel::default());
        let mut binding: Box<dyn PortRuntime> = Box::new(PortBinding::<dyn Counter>::new(
            "counter",
            model,
        ));

        let (ctx, _tx) = test_context();
        let err = binding.start_adapter(0, ctx).await.unwrap_err();
        assert!(matches!(err, Error::Internal(_)));
    }

    #[test]
    fn test_service_builder() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let model: Arc<dyn Counter> = Arc::new(CounterModel::default());

        let service = Service::builder("counting")
            .port(
                PortBinding::new("counter", model)
                    .adapter(RecordingAdapter::new("a", log)),
            )
            .build()
            .unwrap();

        assert_eq!(service.name(), "counting");
        assert_eq!(service.port_names(), vec!["counter"]);
        assert_eq!(service.adapter_count(), 1);
    }

    #[test]
    fn test_service_builder_rejects_empty() {
        let result = Service::builder("ghost").build();
        assert!(matches!(result, Err(Error::EmptyService { .. })));
    }

    #[test]
    fn test_service_builder_rejects_duplicate_port() {
        let first: Arc<dyn Counter> = Arc::new(CounterModel::default());
        let second: Arc<dyn Counter> = Arc::new(CounterModel::default());

        let result = Service::builder("twice")
            .port(PortBinding::new("counter", first))
            .port(PortBinding::new("counter", second))
            .build();

        assert!(matches!(
            result,
            Err(Error::DuplicatePort { ref port, .. }) if port == "counter"
        ));
    }

    #[test]
    fn test_service_with_heterogeneous_ports() {
        // A second, unrelated port trait sharing one service
        trait Clock: Send + Sync {
            fn now_ms(&self) -> u64;
        }
        struct FixedClock;
        impl Clock for FixedClock {
            fn now_ms(&self) -> u64 {
                42
            }
        }

        let counter: Arc<dyn Counter> = Arc::new(CounterModel::default());
        let clock: Arc<dyn Clock> = Arc::new(FixedClock);

        let service = Service::builder("mixed")
            .port(PortBinding::new("counter", counter))
            .port(PortBinding::new("clock", clock))
            .build()
            .unwrap();

        assert_eq!(service.port_names(), vec!["counter", "clock"]);
    }

    #[test]
    fn test_service_debug() {
        let model: Arc<dyn Counter> = Arc::new(CounterModel::default());
        let service = Service::builder("debugged")
            .port(PortBinding::new("counter", model))
            .build()
            .unwrap();

        let debug_str = format!("{service:?}");
        assert!(debug_str.contains("debugged"));
        assert!(debug_str.contains("counter"));
    }

    #[test]
    fn test_concrete_model_port() {
        // Ports can also be typed by the concrete model
        struct EchoAdapter;

        #[async_trait]
        impl Adapter<CounterModel> for EchoAdapter {
            fn name(&self) -> &str {
                "echo"
            }

            async fn start(
                &mut self,
                model: Arc<CounterModel>,
                _ctx: AdapterContext,
            ) -> Result<()> {
                model.increment();
                Ok(())
            }

            async fn stop(&mut self) -> Result<()> {
                Ok(())
            }
        }

        let binding = PortBinding::new("direct", Arc::new(CounterModel::default()))
            .adapter(EchoAdapter);
        assert_eq!(binding.adapter_count(), 1);
    }
}
