use std::fmt;
use std::sync::atomic::{AtomicU8, Ordering};

/// Server lifecycle state.
///
/// Transitions are `Stopped -> Starting -> Running -> Stopping -> Stopped`,
/// driven only by [`UtcServer::start`](crate::server::UtcServer::start) and
/// [`UtcServer::stop`](crate::server::UtcServer::stop). A failed start goes
/// straight from `Starting` back to `Stopped`.
#[repr(u8)]
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub enum ServerState {
    /// No listener, no workers.
    #[default]
    Stopped = 0,
    /// Binding the listener and spawning threads.
    Starting = 1,
    /// Accepting and serving connections.
    Running = 2,
    /// Draining queued connections; no new accepts.
    Stopping = 3,
}

impl ServerState {
    fn from_u8(value: u8) -> ServerState {
        match value {
            1 => ServerState::Starting,
            2 => ServerState::Running,
            3 => ServerState::Stopping,
            _ => ServerState::Stopped,
        }
    }
}

impl fmt::Display for ServerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ServerState::Stopped => "stopped",
            ServerState::Starting => "starting",
            ServerState::Running => "running",
            ServerState::Stopping => "stopping",
        };
        f.write_str(name)
    }
}

/// Atomic cell holding a [`ServerState`], shared with the accept thread.
#[derive(Debug, Default)]
pub(crate) struct StateCell(AtomicU8);

impl StateCell {
    pub(crate) fn get(&self) -> ServerState {
        ServerState::from_u8(self.0.load(Ordering::Acquire))
    }

    pub(crate) fn set(&self, state: ServerState) {
        self.0.store(state as u8, Ordering::Release);
    }

    /// Move from `from` to `to`; returns the observed state on mismatch.
    pub(crate) fn transition(&self, from: ServerState, to: ServerState) -> Result<(), ServerState> {
        self.0
            .compare_exchange(from as u8, to as u8, Ordering::AcqRel, Ordering::Acquire)
            .map(|_| ())
            .map_err(ServerState::from_u8)
    }
}
