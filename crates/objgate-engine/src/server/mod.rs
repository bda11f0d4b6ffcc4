//! TCP server
//!
//! Accepts connections and spawns a handler thread for each. Every
//! connection gets its own [`Session`](crate::gateway::Session) over the
//! shared [`Gateway`]; commands on one connection run strictly in order.

mod connection;
mod listener;

pub use connection::Connection;
pub use listener::GatewayServerListener;

use std::io::BufReader;
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread;

use dashmap::DashMap;

use crate::commands::{AuthCommand, CommandRegistry};
use crate::config::GatewayConfig;
use crate::error::{GatewayError, GatewayResult};
use crate::gateway::Gateway;
use listener::Listeners;

/// Listening gateway server
pub struct GatewayServer {
    gateway: Arc<Gateway>,
    listener: TcpListener,
    commands: Arc<CommandRegistry>,
    auth: Option<Arc<AuthCommand>>,
    connections: Arc<DashMap<u64, SocketAddr>>,
    next_connection: AtomicU64,
    listeners: Listeners,
}

impl GatewayServer {
    /// Bind the configured address
    pub fn bind(gateway: Arc<Gateway>, config: &GatewayConfig) -> GatewayResult<Self> {
        let addr = config
            .socket_addr()
            .map_err(|e| GatewayError::Invalid(e.to_string()))?;
        let listener = TcpListener::bind(addr)?;
        let local = listener.local_addr()?;
        gateway.shutdown_signal().arm(local);
        tracing::info!(address = %local, auth = config.requires_auth(), "gateway listening");

        Ok(Self {
            gateway,
            listener,
            commands: Arc::new(CommandRegistry::standard()),
            auth: config.auth_token.as_deref().map(|t| Arc::new(AuthCommand::new(t))),
            connections: Arc::new(DashMap::new()),
            next_connection: AtomicU64::new(1),
            listeners: Listeners::default(),
        })
    }

    /// Register a lifecycle listener
    pub fn add_listener(&self, listener: Arc<dyn GatewayServerListener>) {
        self.listeners.add(listener);
    }

    /// Unregister a listener. Returns false if it was not registered.
    pub fn remove_listener(&self, listener: &Arc<dyn GatewayServerListener>) -> bool {
        self.listeners.remove(listener)
    }

    /// Address actually bound
    pub fn local_addr(&self) -> GatewayResult<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// Shared gateway
    pub fn gateway(&self) -> &Arc<Gateway> {
        &self.gateway
    }

    /// Number of live connections
    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }

    /// Accept connections until the gateway shuts down. In-flight
    /// connections finish their current command and stop on their own.
    pub fn serve(&self) -> GatewayResult<()> {
        let local = self.local_addr()?;
        self.listeners.notify("server_started", |l| l.server_started(local));

        for stream in self.listener.incoming() {
            if self.gateway.is_shutting_down() {
                break;
            }
            match stream {
                Ok(stream) => self.spawn_connection(stream),
                Err(e) => {
                    tracing::warn!(error = %e, "accept error");
                    let err = GatewayError::Io(e);
                    self.listeners.notify("server_error", |l| l.server_error(&err));
                }
            }
        }

        self.listeners.notify("server_pre_shutdown", |l| l.server_pre_shutdown());
        tracing::info!(live = self.connections.len(), "gateway stopped accepting");
        self.listeners.notify("server_stopped", |l| l.server_stopped());
        self.listeners.notify("server_post_shutdown", |l| l.server_post_shutdown());
        Ok(())
    }

    fn spawn_connection(&self, stream: TcpStream) {
        let id = self.next_connection.fetch_add(1, Ordering::Relaxed);
        let peer = match stream.peer_addr() {
            Ok(peer) => peer,
            Err(e) => {
                tracing::warn!(error = %e, "dropping connection without peer address");
                return;
            }
        };
        let reader = match stream.try_clone() {
            Ok(r) => BufReader::new(r),
            Err(e) => {
                tracing::error!(error = %e, "failed to clone stream");
                return;
            }
        };

        self.connections.insert(id, peer);
        tracing::info!(connection = id, peer = %peer, live = self.connections.len(), "connection opened");
        self.listeners.notify("connection_started", |l| l.connection_started(id, peer));

        let session = self.gateway.session();
        let commands = self.commands.clone();
        let auth = self.auth.clone();
        let connections = self.connections.clone();
        let listeners = self.listeners.clone();
        thread::spawn(move || {
            let mut connection = Connection::new(id, session, commands, auth, reader, stream);
            if let Err(e) = connection.run() {
                if e.is_channel_failure() {
                    tracing::debug!(connection = id, error = %e, "channel closed");
                } else {
                    tracing::warn!(connection = id, error = %e, "connection closed on error");
                }
                listeners.notify("connection_error", |l| l.connection_error(id, &e));
            }
            // Listeners hear about the stop before the peer sees the close
            listeners.notify("connection_stopped", |l| l.connection_stopped(id));
            drop(connection);
            connections.remove(&id);
            tracing::info!(connection = id, live = connections.len(), "connection closed");
        });
    }
}
