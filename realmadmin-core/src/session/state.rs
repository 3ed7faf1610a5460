//! Observable connection state
//!
//! A single record of whether a directory session is open, plus two ways to
//! hear about changes: observers called synchronously in registration order,
//! and a broadcast channel of `ConnectionEvent`s for async consumers.

use serde::Serialize;
use tokio::sync::broadcast;
use uuid::Uuid;

use crate::directory::DirectoryClient;

/// Capacity of the event channel; slow receivers see `Lagged`
const EVENT_CHANNEL_CAPACITY: usize = 32;

/// Read-only view of the connection state handed to observers
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ConnectionSnapshot {
    /// Whether a bound session is open
    pub connected: bool,
    /// Realm of the open session
    pub realm: Option<String>,
    /// Description of the most recent failed connect
    pub last_failure: Option<String>,
    /// Correlation ID of the open session
    pub session_id: Option<Uuid>,
}

/// Change notification published on the broadcast channel
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionEvent {
    /// A session was opened
    Connected {
        /// Session correlation ID
        session_id: Uuid,
        /// Realm of the session
        realm: String,
    },
    /// A session was closed
    Disconnected {
        /// Session correlation ID
        session_id: Uuid,
    },
    /// A connect attempt failed and the state was cleared
    ConnectFailed {
        /// Failure description
        reason: String,
    },
}

/// Receives connection state changes
pub trait ConnectionObserver: Send {
    /// Called after every connect, disconnect and failed connect
    fn state_changed(&self, snapshot: &ConnectionSnapshot);
}

impl<F> ConnectionObserver for F
where
    F: Fn(&ConnectionSnapshot) + Send,
{
    fn state_changed(&self, snapshot: &ConnectionSnapshot) {
        self(snapshot);
    }
}

/// Connection record, observers and event channel
pub struct ConnectionState {
    snapshot: ConnectionSnapshot,
    client: Option<Box<dyn DirectoryClient>>,
    observers: Vec<Box<dyn ConnectionObserver>>,
    events: broadcast::Sender<ConnectionEvent>,
}

impl ConnectionState {
    /// Creates a disconnected state with no observers
    #[must_use]
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            snapshot: ConnectionSnapshot::default(),
            client: None,
            observers: Vec::new(),
            events,
        }
    }

    /// Current state
    #[must_use]
    pub const fn snapshot(&self) -> &ConnectionSnapshot {
        &self.snapshot
    }

    /// Whether a bound session is open
    #[must_use]
    pub const fn is_connected(&self) -> bool {
        self.snapshot.connected
    }

    /// Realm of the open session
    #[must_use]
    pub fn realm(&self) -> Option<&str> {
        self.snapshot.realm.as_deref()
    }

    /// Description of the most recent failed connect
    #[must_use]
    pub fn last_failure(&self) -> Option<&str> {
        self.snapshot.last_failure.as_deref()
    }

    /// Correlation ID of the open session
    #[must_use]
    pub const fn session_id(&self) -> Option<Uuid> {
        self.snapshot.session_id
    }

    /// Adds an observer; observers are kept across connect cycles
    pub fn register_observer(&mut self, observer: impl ConnectionObserver + 'static) {
        self.observers.push(Box::new(observer));
    }

    /// Subscribes to the event channel
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<ConnectionEvent> {
        self.events.subscribe()
    }

    pub(crate) fn client_mut(&mut self) -> Option<&mut (dyn DirectoryClient + 'static)> {
        self.client.as_deref_mut()
    }

    /// Records an open session and notifies; returns the new session ID
    pub(crate) fn mark_connected(
        &mut self,
        realm: String,
        client: Box<dyn DirectoryClient>,
    ) -> Uuid {
        let session_id = Uuid::new_v4();
        self.client = Some(client);
        self.snapshot = ConnectionSnapshot {
            connected: true,
            realm: Some(realm.clone()),
            last_failure: None,
            session_id: Some(session_id),
        };
        self.publish(ConnectionEvent::Connected { session_id, realm });
        session_id
    }

    /// Clears the session and hands back its handle for closing
    ///
    /// Observers are notified only if a session was open.
    pub(crate) fn mark_disconnected(&mut self) -> Option<Box<dyn DirectoryClient>> {
        let client = self.client.take();
        let previous = self.snapshot.session_id.take();
        self.snapshot.connected = false;
        self.snapshot.realm = None;
        if let Some(session_id) = previous {
            self.publish(ConnectionEvent::Disconnected { session_id });
        }
        client
    }

    /// Clears everything after a failed connect and records the reason
    pub(crate) fn mark_failed(&mut self, reason: String) {
        self.client = None;
        self.snapshot = ConnectionSnapshot {
            connected: false,
            realm: None,
            last_failure: Some(reason.clone()),
            session_id: None,
        };
        self.publish(ConnectionEvent::ConnectFailed { reason });
    }

    fn publish(&self, event: ConnectionEvent) {
        for observer in &self.observers {
            observer.state_changed(&self.snapshot);
        }
        // No receivers is not an error
        let _ = self.events.send(event);
    }
}

impl Default for ConnectionState {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ConnectionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionState")
            .field("snapshot", &self.snapshot)
            .field("has_client", &self.client.is_some())
            .field("observers", &self.observers.len())
            .finish()
    }
}
