//! Server lifecycle listeners

use std::net::SocketAddr;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

use parking_lot::RwLock;

use crate::error::GatewayError;

/// Observer of server and connection lifecycle events.
///
/// Every hook defaults to a no-op. Hooks run on the thread that raised the
/// event: the accept loop for server events, the connection's handler
/// thread for connection events.
pub trait GatewayServerListener: Send + Sync {
    /// The accept loop is about to take connections
    fn server_started(&self, _addr: SocketAddr) {}

    /// A connection was accepted and its handler spawned
    fn connection_started(&self, _id: u64, _peer: SocketAddr) {}

    /// A connection ended on a fatal or channel error
    fn connection_error(&self, _id: u64, _error: &GatewayError) {}

    /// A connection's handler finished
    fn connection_stopped(&self, _id: u64) {}

    /// The accept loop failed to take a connection
    fn server_error(&self, _error: &GatewayError) {}

    /// Shutdown was requested; the accept loop is stopping
    fn server_pre_shutdown(&self) {}

    /// The accept loop has stopped taking connections
    fn server_stopped(&self) {}

    /// Shutdown finished
    fn server_post_shutdown(&self) {}
}

/// Listener list shared by the accept loop and connection threads
#[derive(Clone, Default)]
pub(crate) struct Listeners(Arc<RwLock<Vec<Arc<dyn GatewayServerListener>>>>);

impl Listeners {
    pub(crate) fn add(&self, listener: Arc<dyn GatewayServerListener>) {
        self.0.write().push(listener);
    }

    pub(crate) fn remove(&self, listener: &Arc<dyn GatewayServerListener>) -> bool {
        let mut listeners = self.0.write();
        let before = listeners.len();
        listeners.retain(|l| !Arc::ptr_eq(l, listener));
        listeners.len() != before
    }

    /// Call `event` on every listener. A panicking listener is logged and
    /// does not stop the others.
    pub(crate) fn notify(&self, event: &str, f: impl Fn(&dyn GatewayServerListener)) {
        let snapshot: Vec<_> = self.0.read().clone();
        for listener in snapshot {
            if catch_unwind(AssertUnwindSafe(|| f(listener.as_ref()))).is_err() {
                tracing::warn!(event, "server listener panicked");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;

    #[derive(Default)]
    struct Recorder(Mutex<Vec<u64>>);

    impl GatewayServerListener for Recorder {
        fn connection_stopped(&self, id: u64) {
            self.0.lock().push(id);
        }
    }

    struct Panicky;

    impl GatewayServerListener for Panicky {
        fn connection_stopped(&self, _id: u64) {
            panic!("listener bug");
        }
    }

    #[test]
    fn test_panicking_listener_does_not_stop_others() {
        let listeners = Listeners::default();
        let recorder = Arc::new(Recorder::default());
        let panicky: Arc<dyn GatewayServerListener> = Arc::new(Panicky);
        listeners.add(panicky.clone());
        listeners.add(recorder.clone());

        listeners.notify("connection_stopped", |l| l.connection_stopped(7));
        assert_eq!(*recorder.0.lock(), vec![7]);

        assert!(listeners.remove(&panicky));
        assert!(!listeners.remove(&panicky));
        listeners.notify("connection_stopped", |l| l.connection_stopped(8));
        assert_eq!(*recorder.0.lock(), vec![7, 8]);
    }
}
