//! The HTTP adapter itself.

use std::fmt;
use std::net::SocketAddr;
use std::sync::Arc;

use async_trait::async_trait;
use axum::Router;
use tokio::net::TcpListener;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, Instrument};

use hexarc::{Adapter, AdapterContext, Error, Result};

use crate::health;

/// Bus address on which every HTTP adapter announces its bound socket.
///
/// The payload carries the component coordinates and the address as a
/// string, which is how callers discover the real port after binding to
/// port 0.
pub const BOUND_ADDRESS: &str = "hexarc.http.bound";

/// An [`Adapter`] exposing a port model over HTTP.
///
/// The caller supplies a router factory turning the model into axum routes;
/// the adapter owns everything else: binding the socket, merging in a
/// `/healthz` route, announcing the bound address on the event bus, and
/// draining the server when the service is undeployed.
pub struct HttpAdapter<P: ?Sized> {
    name: String,
    bind: SocketAddr,
    make_router: Box<dyn Fn(Arc<P>) -> Router + Send + Sync>,
    running: Option<RunningServer>,
}

/// State held between start and stop.
struct RunningServer {
    local_addr: SocketAddr,
    shutdown_tx: watch::Sender<bool>,
    task: JoinHandle<()>,
    ctx: AdapterContext,
}

impl<P: ?Sized + Send + Sync + 'static> HttpAdapter<P> {
    /// Create an HTTP adapter serving the routes built by `make_router`.
    ///
    /// Binding to port 0 picks a free port; the actual address is available
    /// from [`local_addr`](Self::local_addr) once started and is announced
    /// on the bus at [`BOUND_ADDRESS`].
    pub fn new(
        bind: SocketAddr,
        make_router: impl Fn(Arc<P>) -> Router + Send + Sync + 'static,
    ) -> Self {
        Self {
            name: "http".to_string(),
            bind,
            make_router: Box::new(make_router),
            running: None,
        }
    }

    /// Rename the adapter, for services exposing several HTTP surfaces.
    #[must_use]
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// The address the server is bound to, if started.
    #[must_use]
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.running.as_ref().map(|running| running.local_addr)
    }
}

#[async_trait]
impl<P: ?Sized + Send + Sync + 'static> Adapter<P> for HttpAdapter<P> {
    fn name(&self) -> &str {
        &self.name
    }

    async fn start(&mut self, model: Arc<P>, ctx: AdapterContext) -> Result<()> {
        if self.running.is_some() {
            return Err(Error::adapter_start(
                ctx.service(),
                ctx.port(),
                ctx.adapter(),
                "already started",
            ));
        }

        let router = (self.make_router)(model).merge(health::router(&ctx));

        let listener = TcpListener::bind(self.bind).await.map_err(|error| {
            Error::adapter_start(
                ctx.service(),
                ctx.port(),
                ctx.adapter(),
                format!("failed to bind {}: {error}", self.bind),
            )
        })?;
        let local_addr = listener.local_addr().map_err(|error| {
            Error::adapter_start(
                ctx.service(),
                ctx.port(),
                ctx.adapter(),
                format!("failed to read bound address: {error}"),
            )
        })?;

        // Drain on our own stop signal or on service undeploy
        let (shutdown_tx, mut shutdown_rx) = watch::channel(false);
        let drain_ctx = ctx.clone();
        let shutdown = async move {
            tokio::select! {
                _ = shutdown_rx.changed() => {}
                () = drain_ctx.shutdown_signal() => {}
            }
        };

        let task = tokio::spawn(
            async move {
                if let Err(error) = axum::serve(listener, router)
                    .with_graceful_shutdown(shutdown)
                    .await
                {
                    error!("HTTP server error: {error}");
                }
                debug!("HTTP server drained");
            }
            .instrument(ctx.span()),
        );

        info!("HTTP server listening on {local_addr}");
        ctx.bus().publish(
            BOUND_ADDRESS,
            &serde_json::json!({
                "service": ctx.service(),
                "port": ctx.port(),
                "adapter": ctx.adapter(),
                "addr": local_addr.to_string(),
            }),
        )?;

        self.running = Some(RunningServer {
            local_addr,
            shutdown_tx,
            task,
            ctx,
        });
        Ok(())
    }

    async fn stop(&mut self) -> Result<()> {
        let Some(running) = self.running.take() else {
            return Ok(());
        };

        let _ = running.shutdown_tx.send(true);
        running.task.await.map_err(|error| {
            Error::adapter_stop(
                running.ctx.service(),
                running.ctx.port(),
                running.ctx.adapter(),
                format!("server task failed: {error}"),
            )
        })?;

        debug!("HTTP server on {} stopped", running.local_addr);
        Ok(())
    }
}

impl<P: ?Sized> fmt::Debug for HttpAdapter<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpAdapter")
            .field("name", &self.name)
            .field("bind", &self.bind)
            .field(
                "local_addr",
                &self.running.as_ref().map(|running| running.local_addr),
            )
            .finish()
    }
}
