//! Process lifecycle: start, wait for a stop signal, shut down in bounded time.
//!
//! ```text
//! Starting ──► Running ──► ShuttingDown ──► Stopped
//!    │            │                            ▲
//!    │ bind error └──── listener failure ──────┤
//!    └─────────────────────────────────────────┘
//! ```
//!
//! The state only moves forward. Observers can follow it through
//! [`Lifecycle::subscribe`].

use std::fmt;
use std::future::Future;

use tokio::sync::watch;
use tracing::info;

use crate::server::{Server, ServerError};
use crate::shutdown::{wait_for_os_signal, ShutdownSignal};

/// Lifecycle states, in the order they are entered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LifecycleState {
    /// Binding the listener.
    Starting,
    /// Accepting connections.
    Running,
    /// Draining in-flight requests.
    ShuttingDown,
    /// Done, cleanly or not.
    Stopped,
}

impl LifecycleState {
    /// Returns the state name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Starting => "starting",
            Self::Running => "running",
            Self::ShuttingDown => "shutting_down",
            Self::Stopped => "stopped",
        }
    }
}

impl fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Drives a [`Server`] through its lifecycle.
#[derive(Debug)]
pub struct Lifecycle {
    state: watch::Sender<LifecycleState>,
    shutdown: ShutdownSignal,
}

impl Default for Lifecycle {
    fn default() -> Self {
        Self::new()
    }
}

impl Lifecycle {
    /// Creates a lifecycle in the `Starting` state.
    #[must_use]
    pub fn new() -> Self {
        let (state, _) = watch::channel(LifecycleState::Starting);
        Self {
            state,
            shutdown: ShutdownSignal::new(),
        }
    }

    /// Returns the current state.
    #[must_use]
    pub fn state(&self) -> LifecycleState {
        *self.state.borrow()
    }

    /// Subscribes to state changes.
    pub fn subscribe(&self) -> watch::Receiver<LifecycleState> {
        self.state.subscribe()
    }

    /// The shutdown signal shared with the server.
    ///
    /// Triggering it has the same effect as an OS signal.
    pub fn shutdown_signal(&self) -> ShutdownSignal {
        self.shutdown.clone()
    }

    /// Runs `server` until SIGINT or SIGTERM, then shuts it down.
    ///
    /// # Errors
    ///
    /// See [`Lifecycle::run`].
    pub async fn run_until_signal(&self, server: Server) -> Result<(), ServerError> {
        self.run(server, wait_for_os_signal()).await
    }

    /// Runs `server` until `stop` completes or the shutdown signal is
    /// triggered, then shuts it down.
    ///
    /// # Errors
    ///
    /// Returns the bind error, a listener failure, a failure of `stop`, or
    /// `ServerError::ShutdownTimeout` if draining missed the deadline.
    pub async fn run<F>(&self, server: Server, stop: F) -> Result<(), ServerError>
    where
        F: Future<Output = std::io::Result<()>>,
    {
        let bound = match server.bind().await {
            Ok(bound) => bound,
            Err(e) => {
                self.advance(LifecycleState::Stopped);
                return Err(e);
            }
        };

        let mut serving = tokio::spawn(bound.serve(self.shutdown.clone()));
        self.advance(LifecycleState::Running);

        let stopped = tokio::select! {
            result = stop => result.map_err(ServerError::Signal),
            () = self.shutdown.recv() => Ok(()),
            joined = &mut serving => {
                // The server ended without being asked to.
                self.advance(LifecycleState::Stopped);
                return flatten(joined);
            }
        };

        self.advance(LifecycleState::ShuttingDown);
        info!("Shutting down server...");
        self.shutdown.trigger();

        let result = flatten(serving.await).and(stopped);
        self.advance(LifecycleState::Stopped);
        if result.is_ok() {
            info!("Server exiting");
        }
        result
    }

    fn advance(&self, next: LifecycleState) {
        let moved = self.state.send_if_modified(|state| {
            if next > *state {
                *state = next;
                true
            } else {
                false
            }
        });
        if moved {
            info!(state = %next, "Lifecycle state changed");
        }
    }
}

fn flatten(
    joined: Result<Result<(), ServerError>, tokio::task::JoinError>,
) -> Result<(), ServerError> {
    joined.map_err(|e| ServerError::Task(e.to_string()))?
}
