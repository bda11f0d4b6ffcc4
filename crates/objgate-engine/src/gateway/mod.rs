//! Gateway state
//!
//! The [`Gateway`] is created once and shared by every connection through
//! an `Arc`. It owns the reflection engine, the default import view, the
//! optional entry point and the shutdown signal. Each connection works
//! through its own [`Session`], which owns the reference ids handed out on
//! that connection.

pub mod registry;
pub mod session;
pub mod view;

use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr, TcpStream};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;

use crate::error::ReflectError;
use crate::reflect::{ClassRef, ClassRegistry, ReflectionEngine};
use crate::value::Object;

pub use registry::ObjectRegistry;
pub use session::Session;
pub use view::{JvmView, DEFAULT_STAR_IMPORT, DEFAULT_VIEW_ID};

/// Stop flag shared by the accept loop and every connection handler
#[derive(Default)]
pub struct ShutdownSignal {
    stopped: AtomicBool,
    wake_addr: Mutex<Option<SocketAddr>>,
}

impl ShutdownSignal {
    /// Flip the stop flag and wake the accept loop
    pub fn trigger(&self) {
        if self.stopped.swap(true, Ordering::SeqCst) {
            return;
        }
        if let Some(addr) = *self.wake_addr.lock() {
            // The accept loop re-checks the flag when this connection lands
            let _ = TcpStream::connect(addr);
        }
    }

    /// Whether shutdown was requested
    pub fn is_triggered(&self) -> bool {
        self.stopped.load(Ordering::SeqCst)
    }

    /// Record the listener address to connect to on trigger
    pub(crate) fn arm(&self, mut addr: SocketAddr) {
        if addr.ip().is_unspecified() {
            addr.set_ip(match addr.ip() {
                IpAddr::V4(_) => IpAddr::V4(Ipv4Addr::LOCALHOST),
                IpAddr::V6(_) => IpAddr::V6(Ipv6Addr::LOCALHOST),
            });
        }
        *self.wake_addr.lock() = Some(addr);
    }
}

/// Shared gateway state
pub struct Gateway {
    engine: ReflectionEngine,
    default_view: Object,
    entry_point: Option<Object>,
    shutdown: ShutdownSignal,
}

impl Gateway {
    /// Create a gateway over a class registry
    pub fn new(classes: Arc<ClassRegistry>) -> Self {
        let view = Arc::new(JvmView::new(view::DEFAULT_VIEW_NAME, DEFAULT_VIEW_ID));
        let default_view = classes.new_view(view);
        Self {
            engine: ReflectionEngine::new(classes),
            default_view,
            entry_point: None,
            shutdown: ShutdownSignal::default(),
        }
    }

    /// Bind an entry point object, visible as `t` in every session
    pub fn with_entry_point(mut self, entry_point: Object) -> Self {
        self.entry_point = Some(entry_point);
        self
    }

    /// Reflection engine
    pub fn engine(&self) -> &ReflectionEngine {
        &self.engine
    }

    /// Class registry
    pub fn classes(&self) -> &Arc<ClassRegistry> {
        self.engine.classes()
    }

    /// Entry point object
    pub fn entry_point(&self) -> Option<&Object> {
        self.entry_point.as_ref()
    }

    /// Default view object, bound as `j` in every session
    pub fn default_view_object(&self) -> &Object {
        &self.default_view
    }

    /// Default import view
    pub fn default_view(&self) -> Option<&Arc<JvmView>> {
        self.default_view.as_view()
    }

    /// Shutdown signal
    pub fn shutdown_signal(&self) -> &ShutdownSignal {
        &self.shutdown
    }

    /// Request server shutdown
    pub fn shutdown(&self) {
        tracing::info!("gateway shutdown requested");
        self.shutdown.trigger();
    }

    /// Whether shutdown was requested
    pub fn is_shutting_down(&self) -> bool {
        self.shutdown.is_triggered()
    }

    /// Open a session for a new connection
    pub fn session(self: &Arc<Self>) -> Session {
        Session::new(self.clone())
    }

    /// Resolve a class name as written by a client: fully qualified, nested
    /// with dots (`demo.Outer.Inner`), or a simple name imported into `view`.
    pub fn resolve_class(&self, name: &str, view: Option<&JvmView>) -> Result<ClassRef, ReflectError> {
        let classes = self.classes();
        if let Some(class) = classes.get(name) {
            return Ok(class);
        }

        let imported = |simple: &str| -> Option<String> {
            let view = view?;
            if let Some(fqn) = view.single_import(simple) {
                return Some(fqn);
            }
            view.star_imports()
                .into_iter()
                .map(|package| format!("{}.{}", package, simple))
                .find(|fqn| classes.contains(fqn))
        };

        let found = match name.split_once('.') {
            None => imported(name).and_then(|fqn| classes.get(&fqn)),
            Some((head, rest)) => {
                let mut candidate = name.to_string();
                let mut found = None;
                while let Some(idx) = candidate.rfind('.') {
                    candidate.replace_range(idx..idx + 1, "$");
                    if let Some(class) = classes.get(&candidate) {
                        found = Some(class);
                        break;
                    }
                }
                found.or_else(|| {
                    let outer = imported(head)?;
                    classes.get(&format!("{}${}", outer, rest.replace('.', "$")))
                })
            }
        };
        found.ok_or_else(|| ReflectError::NoSuchClass(name.to_string()))
    }
}
