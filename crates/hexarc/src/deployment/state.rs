//! Service lifecycle state tracking.
//!
//! Every deployed service carries a [`ServiceHandle`] through which its
//! lifecycle can be observed from anywhere in the process. State changes are
//! broadcast over a watch channel, so waiting for readiness costs nothing
//! until the state actually changes.

use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::watch;

use crate::error::{Error, Result};

/// State of a service in its deployment lifecycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServiceState {
    /// Service is not deployed.
    Stopped,
    /// Adapters are starting in declaration order.
    Starting,
    /// All adapters started; the service is serving traffic.
    Ready,
    /// Adapters are stopping in reverse order.
    Stopping,
    /// Deployment failed and the service was rolled back.
    Failed(String),
}

impl ServiceState {
    /// Check if the service is serving traffic.
    #[must_use]
    pub fn is_ready(&self) -> bool {
        matches!(self, Self::Ready)
    }

    /// Check if the service reached a terminal state.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Stopped | Self::Failed(_))
    }

    /// Check if the service failed to deploy.
    #[must_use]
    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed(_))
    }
}

impl fmt::Display for ServiceState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Stopped => write!(f, "stopped"),
            Self::Starting => write!(f, "starting"),
            Self::Ready => write!(f, "ready"),
            Self::Stopping => write!(f, "stopping"),
            Self::Failed(reason) => write!(f, "failed: {reason}"),
        }
    }
}

/// Observable handle to one deployed service.
///
/// Cheap to clone; all clones observe the same service. Handles stay valid
/// after the service is undeployed and simply report [`ServiceState::Stopped`].
#[derive(Clone)]
pub struct ServiceHandle {
    inner: Arc<HandleInner>,
}

struct HandleInner {
    name: String,
    tx: watch::Sender<ServiceState>,
    deployed_at: Instant,
}

impl ServiceHandle {
    pub(crate) fn new(name: impl Into<String>) -> Self {
        let (tx, _rx) = watch::channel(ServiceState::Stopped);
        Self {
            inner: Arc::new(HandleInner {
                name: name.into(),
                tx,
                deployed_at: Instant::now(),
            }),
        }
    }

    /// The service name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// The current state.
    #[must_use]
    pub fn state(&self) -> ServiceState {
        self.inner.tx.borrow().clone()
    }

    pub(crate) fn set_state(&self, state: ServiceState) {
        tracing::debug!(service = %self.inner.name, state = %state, "service state change");
        self.inner.tx.send_replace(state);
    }

    /// Subscribe to state changes.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<ServiceState> {
        self.inner.tx.subscribe()
    }

    /// Wait until the service is ready, it fails, or the timeout elapses.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ServiceFailed`] if the service enters the failed
    /// state, or [`Error::ReadyTimeout`] if it is not ready in time.
    pub async fn wait_ready(&self, timeout: Duration) -> Result<()> {
        let mut rx = self.subscribe();
        let deadline = tokio::time::sleep(timeout);
        tokio::pin!(deadline);

        // Check the current state before waiting
        match rx.borrow_and_update().clone() {
            ServiceState::Ready => return Ok(()),
            ServiceState::Failed(reason) => {
                return Err(Error::ServiceFailed {
                    service: self.inner.name.clone(),
                    message: reason,
                });
            }
            _ => {}
        }

        loop {
            tokio::select! {
                () = &mut deadline => {
                    return Err(Error::ReadyTimeout {
                        service: self.inner.name.clone(),
                        waited_ms: u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
                    });
                }
                changed = rx.changed() => {
                    if changed.is_err() {
                        return Err(Error::internal(format!(
                            "state channel for service '{}' closed",
                            self.inner.name
                        )));
                    }
                    match rx.borrow().clone() {
                        ServiceState::Ready => return Ok(()),
                        ServiceState::Failed(reason) => {
                            return Err(Error::ServiceFailed {
                                service: self.inner.name.clone(),
                                message: reason,
                            });
                        }
                        _ => {}
                    }
                }
            }
        }
    }

    /// Elapsed time since the handle was created at deploy.
    #[must_use]
    pub fn uptime(&self) -> Duration {
        self.inner.deployed_at.elapsed()
    }
}

impl fmt::Debug for ServiceHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceHandle")
            .field("name", &self.inner.name)
            .field("state", &self.state())
            .finish()
    }
}
