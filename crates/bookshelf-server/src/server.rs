//! HTTP server implementation.
//!
//! Binds a TCP listener, accepts connections and serves each on its own
//! task with hyper's HTTP/1 connection driver. When the shutdown signal
//! fires the accept loop stops, every connection finishes its in-flight
//! request and closes, and the server waits for them up to the configured
//! deadline.
//!
//! # Example
//!
//! ```rust,ignore
//! use bookshelf_server::{App, Server, ServerConfig, ShutdownSignal};
//!
//! let server = Server::new(ServerConfig::default(), app);
//! let shutdown = ShutdownSignal::new();
//! server.run_with_shutdown(shutdown).await?;
//! ```

use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::TokioIo;
use thiserror::Error;
use tokio::net::{TcpListener, TcpStream};
use tracing::{debug, error, info, warn};

use crate::app::App;
use crate::config::ServerConfig;
use crate::shutdown::{ConnectionTracker, ShutdownSignal};

/// Errors that stop the server.
#[derive(Debug, Error)]
pub enum ServerError {
    /// The configured address is not a socket address.
    #[error("Invalid address '{addr}': {source}")]
    InvalidAddress {
        /// The configured address.
        addr: String,
        /// Parse error.
        #[source]
        source: std::net::AddrParseError,
    },

    /// The listener could not be bound.
    #[error("Could not listen on {addr}: {source}")]
    Bind {
        /// The address that failed.
        addr: SocketAddr,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// The listener failed while accepting connections.
    #[error("Server failed: {0}")]
    Accept(#[source] std::io::Error),

    /// Connections were still open when the shutdown deadline passed.
    #[error("Could not gracefully shut down the server: {active} connection(s) still open after {timeout:?}")]
    ShutdownTimeout {
        /// The configured deadline.
        timeout: Duration,
        /// Connections still open at the deadline.
        active: usize,
    },

    /// Waiting for the OS shutdown signal failed.
    #[error("Failed to listen for shutdown signals: {0}")]
    Signal(#[source] std::io::Error),

    /// The serving task panicked or was cancelled.
    #[error("Server task failed: {0}")]
    Task(String),
}

/// The HTTP server, before binding.
#[derive(Debug)]
pub struct Server {
    config: ServerConfig,
    app: Arc<App>,
}

impl Server {
    /// Creates a server for `app`.
    pub fn new(config: ServerConfig, app: App) -> Self {
        Self {
            config,
            app: Arc::new(app),
        }
    }

    /// Returns the server configuration.
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Returns the application.
    pub fn app(&self) -> &Arc<App> {
        &self.app
    }

    /// Binds the listener.
    ///
    /// # Errors
    ///
    /// Returns `ServerError::InvalidAddress` or `ServerError::Bind`.
    pub async fn bind(self) -> Result<BoundServer, ServerError> {
        let addr: SocketAddr =
            self.config
                .socket_addr()
                .map_err(|source| ServerError::InvalidAddress {
                    addr: self.config.http_addr().to_string(),
                    source,
                })?;

        let listener = TcpListener::bind(addr)
            .await
            .map_err(|source| ServerError::Bind { addr, source })?;
        let local_addr = listener
            .local_addr()
            .map_err(|source| ServerError::Bind { addr, source })?;

        Ok(BoundServer {
            listener,
            local_addr,
            config: self.config,
            app: self.app,
        })
    }

    /// Binds, then serves until `shutdown` is triggered.
    ///
    /// # Errors
    ///
    /// See [`Server::bind`] and [`BoundServer::serve`].
    pub async fn run_with_shutdown(self, shutdown: ShutdownSignal) -> Result<(), ServerError> {
        self.bind().await?.serve(shutdown).await
    }
}

/// A server whose listener is bound.
#[derive(Debug)]
pub struct BoundServer {
    listener: TcpListener,
    local_addr: SocketAddr,
    config: ServerConfig,
    app: Arc<App>,
}

impl BoundServer {
    /// The address the listener is bound to.
    ///
    /// Differs from the configured address when that used port `0`.
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Accepts connections until `shutdown` is triggered, then drains.
    ///
    /// # Errors
    ///
    /// Returns `ServerError::Accept` if the listener fails, or
    /// `ServerError::ShutdownTimeout` if connections are still open when
    /// the shutdown deadline passes.
    pub async fn serve(self, shutdown: ShutdownSignal) -> Result<(), ServerError> {
        let tracker = ConnectionTracker::new();
        info!(addr = %self.local_addr, "Server starting");

        loop {
            tokio::select! {
                result = self.listener.accept() => {
                    match result {
                        Ok((stream, remote_addr)) => {
                            let token = tracker.acquire();
                            let app = Arc::clone(&self.app);
                            let shutdown = shutdown.clone();

                            tokio::spawn(async move {
                                let _token = token;
                                if let Err(e) = serve_connection(stream, app, shutdown).await {
                                    debug!(%remote_addr, error = %e, "Connection error");
                                }
                            });
                        }
                        Err(e) if is_transient_accept_error(&e) => {
                            warn!(error = %e, "Failed to accept connection");
                        }
                        Err(e) => {
                            error!(error = %e, "Listener failed");
                            return Err(ServerError::Accept(e));
                        }
                    }
                }
                () = shutdown.recv() => {
                    break;
                }
            }
        }

        drop(self.listener);

        let timeout = self.config.shutdown_timeout();
        info!(
            active_connections = tracker.active_connections(),
            timeout_ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
            "Stopped accepting connections, draining"
        );

        if tokio::time::timeout(timeout, tracker.wait_for_shutdown())
            .await
            .is_err()
        {
            let active = tracker.active_connections();
            error!(active_connections = active, "Shutdown deadline exceeded");
            return Err(ServerError::ShutdownTimeout { timeout, active });
        }

        info!("All connections closed");
        Ok(())
    }
}

/// Serves one connection, closing it gracefully on shutdown.
async fn serve_connection(
    stream: TcpStream,
    app: Arc<App>,
    shutdown: ShutdownSignal,
) -> Result<(), hyper::Error> {
    let io = TokioIo::new(stream);
    let service = service_fn(move |request| {
        let app = Arc::clone(&app);
        async move { Ok::<_, Infallible>(app.handle(request).await) }
    });

    let conn = http1::Builder::new().serve_connection(io, service);
    tokio::pin!(conn);

    tokio::select! {
        result = conn.as_mut() => result,
        () = shutdown.recv() => {
            // Finish the in-flight request, then close.
            conn.as_mut().graceful_shutdown();
            conn.await
        }
    }
}

/// Accept errors that affect one connection, not the listener.
fn is_transient_accept_error(e: &std::io::Error) -> bool {
    use std::io::ErrorKind;

    matches!(
        e.kind(),
        ErrorKind::ConnectionAborted
            | ErrorKind::ConnectionReset
            | ErrorKind::ConnectionRefused
            | ErrorKind::Interrupted
            | ErrorKind::WouldBlock
    )
}
