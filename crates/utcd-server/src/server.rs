// Copyright 2026 U.S. Federal Government (in countries where recognized)
// SPDX-License-Identifier: Apache-2.0

//! Threaded Time Protocol server.
//!
//! Answers every TCP connection with the current time as a 4-byte
//! big-endian count of seconds since the Unix epoch, then closes it.
//!
//! # Architecture
//!
//! One accept thread feeds accepted connections into a bounded queue drained
//! by a fixed pool of worker threads. A full queue blocks the accept thread
//! until a worker frees a slot. There is no async runtime in the server.
//!
//! [`UtcServer::stop()`] wakes the accept thread, which queues every client
//! still waiting in the listen backlog and then drops the listener so later
//! connection attempts are refused. `stop()` then waits for the workers to
//! serve everything queued.
//!
//! # Examples
//!
//! ```no_run
//! use utc_server::server::UtcServer;
//!
//! # fn example() -> Result<(), utc_server::error::UtcServerError> {
//! let server = UtcServer::builder()
//!     .listen("0.0.0.0")
//!     .port(37)
//!     .worker_threads(4)
//!     .build();
//!
//! let addr = server.start()?;
//! println!("serving time on {addr}");
//! // ...
//! server.stop();
//! # Ok(())
//! # }
//! ```

use std::io;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr, TcpListener, TcpStream};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use socket2::{Domain, Protocol, SockAddr, Socket, Type};

use crate::connection::{Connection, client_address};
use crate::dispatcher::{Dispatcher, Submitter};
use crate::error::UtcServerError;
use crate::server_common::{
    AccessRules, Observer, ServerConfig, ServerState, ServerStats, StateCell, StatsSnapshot,
    TracingObserver,
};

pub use crate::server_common::UtcServerBuilder;

/// Pause after a failed `accept()` before trying again.
const ACCEPT_BACKOFF: Duration = Duration::from_millis(10);

/// How long `stop()` waits for its wake-up connection.
const WAKE_TIMEOUT: Duration = Duration::from_millis(500);

/// A Time Protocol server.
///
/// Created in the `Stopped` state; [`start()`](Self::start) binds and spawns
/// the threads, [`stop()`](Self::stop) tears them down. Dropping a running
/// server stops it.
pub struct UtcServer {
    config: ServerConfig,
    rules: Arc<AccessRules>,
    stats: Arc<ServerStats>,
    observer: Arc<dyn Observer>,
    state: Arc<StateCell>,
    running: Mutex<Option<Running>>,
}

/// Resources owned while the server is running.
struct Running {
    local_addr: SocketAddr,
    accept: JoinHandle<()>,
    dispatcher: Dispatcher<TcpStream>,
    wake_peer: WakePeer,
}

/// Source address of the connection `stop()` opens to unblock `accept()`,
/// recorded before it connects so the accept loop can tell it from clients.
type WakePeer = Arc<Mutex<Option<SocketAddr>>>;

/// Everything the accept thread needs.
struct AcceptLoop {
    listener: TcpListener,
    submitter: Submitter<TcpStream>,
    state: Arc<StateCell>,
    rules: Arc<AccessRules>,
    stats: Arc<ServerStats>,
    observer: Arc<dyn Observer>,
    io_timeout: Option<Duration>,
    wake_peer: WakePeer,
}

impl UtcServer {
    /// Create a builder with default settings.
    pub fn builder() -> UtcServerBuilder {
        UtcServerBuilder::new()
    }

    /// Create a stopped server from a ready settings object.
    pub fn new(config: ServerConfig, observer: Arc<dyn Observer>) -> Self {
        Self::with_stats(config, observer, Arc::new(ServerStats::new()))
    }

    pub(crate) fn with_stats(
        config: ServerConfig,
        observer: Arc<dyn Observer>,
        stats: Arc<ServerStats>,
    ) -> Self {
        UtcServer {
            rules: Arc::new(config.access_rules()),
            config,
            stats,
            observer,
            state: Arc::new(StateCell::default()),
            running: Mutex::new(None),
        }
    }

    /// Bind the listener and start serving.
    ///
    /// Returns the bound address, which differs from the configured one when
    /// port 0 was requested. On any failure the server is back in `Stopped`
    /// with nothing left running.
    pub fn start(&self) -> Result<SocketAddr, UtcServerError> {
        self.state
            .transition(ServerState::Stopped, ServerState::Starting)
            .map_err(UtcServerError::AlreadyStarted)?;

        let mut slot = self.lock_running();
        match self.launch() {
            Ok(running) => {
                let addr = running.local_addr;
                let workers = running.dispatcher.worker_count();
                *slot = Some(running);
                self.observer.info(&format!(
                    "time server listening on {addr} ({workers} workers, stratum {}, reference {})",
                    self.config.stratum,
                    self.config.reference_id,
                ));
                Ok(addr)
            }
            Err(e) => {
                self.state.set(ServerState::Stopped);
                self.observer.error(&format!("failed to start: {e}"));
                Err(e)
            }
        }
    }

    fn launch(&self) -> Result<Running, UtcServerError> {
        let addr = self.config.socket_addr()?;
        let bind_err = |source: io::Error| UtcServerError::Bind {
            address: addr.to_string(),
            source,
        };
        let listener = bind_listener(addr, &self.config).map_err(bind_err)?;
        let local_addr = listener.local_addr().map_err(bind_err)?;

        let mut dispatcher = Dispatcher::spawn(
            self.config.worker_threads,
            self.config.max_connections,
            self.stats.clone(),
            self.observer.clone(),
        )
        .map_err(|source| UtcServerError::Spawn {
            role: "worker",
            source,
        })?;
        let Some(submitter) = dispatcher.submitter() else {
            return Err(UtcServerError::Spawn {
                role: "worker",
                source: io::Error::other("worker queue closed"),
            });
        };

        // The accept thread exits on its first accept unless it sees Running.
        self.state.set(ServerState::Running);
        let wake_peer = WakePeer::default();
        let accept_loop = AcceptLoop {
            listener,
            submitter,
            state: self.state.clone(),
            rules: self.rules.clone(),
            stats: self.stats.clone(),
            observer: self.observer.clone(),
            io_timeout: self.config.io_timeout.filter(|t| !t.is_zero()),
            wake_peer: wake_peer.clone(),
        };
        let accept = thread::Builder::new()
            .name("utcd-accept".to_string())
            .spawn(move || accept_loop.run());
        match accept {
            Ok(accept) => Ok(Running {
                local_addr,
                accept,
                dispatcher,
                wake_peer,
            }),
            Err(source) => {
                dispatcher.shutdown();
                Err(UtcServerError::Spawn {
                    role: "accept",
                    source,
                })
            }
        }
    }

    /// Stop accepting, serve every connection already accepted by the kernel,
    /// and join all threads.
    ///
    /// Blocks until the workers have drained the queue. Does nothing unless
    /// the server is running.
    pub fn stop(&self) {
        if self
            .state
            .transition(ServerState::Running, ServerState::Stopping)
            .is_err()
        {
            return;
        }
        self.observer.info("time server stopping");

        let running = self.lock_running().take();
        if let Some(Running {
            local_addr,
            accept,
            mut dispatcher,
            wake_peer,
        }) = running
        {
            wake_accept(local_addr, &wake_peer, self.observer.as_ref());
            if accept.join().is_err() {
                self.observer.error("accept thread terminated abnormally");
            }
            dispatcher.shutdown();
        }

        self.state.set(ServerState::Stopped);
        let snap = self.stats.snapshot();
        self.observer.info(&format!(
            "time server stopped: {} connections, {} packets sent",
            snap.total_connections, snap.packets_sent
        ));
    }

    fn lock_running(&self) -> MutexGuard<'_, Option<Running>> {
        self.running.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Whether the server is accepting connections.
    pub fn is_running(&self) -> bool {
        self.state.get() == ServerState::Running
    }

    /// Current lifecycle state.
    pub fn state(&self) -> ServerState {
        self.state.get()
    }

    /// Bound address while running.
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.lock_running().as_ref().map(|r| r.local_addr)
    }

    /// Settings the server was built with.
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Access rules applied to every client.
    pub fn access_rules(&self) -> &AccessRules {
        &self.rules
    }

    /// Shared statistics.
    pub fn stats(&self) -> &Arc<ServerStats> {
        &self.stats
    }

    /// Snapshot of all statistics.
    pub fn stats_snapshot(&self) -> StatsSnapshot {
        self.stats.snapshot()
    }

    /// Connections accepted and not yet finished.
    pub fn active_connections(&self) -> u64 {
        self.stats.snapshot().active_connections
    }

    /// Connections accepted since creation.
    pub fn total_connections(&self) -> u64 {
        self.stats.snapshot().total_connections
    }

    /// Time packets sent since creation.
    pub fn packets_sent(&self) -> u64 {
        self.stats.snapshot().packets_sent
    }

    /// Time packets received since creation.
    pub fn packets_received(&self) -> u64 {
        self.stats.snapshot().packets_received
    }
}

impl Default for UtcServer {
    fn default() -> Self {
        UtcServer::new(ServerConfig::default(), Arc::new(TracingObserver))
    }
}

impl Drop for UtcServer {
    fn drop(&mut self) {
        self.stop();
    }
}

impl std::fmt::Debug for UtcServer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UtcServer")
            .field("config", &self.config)
            .field("state", &self.state.get())
            .field("stats", &self.stats.snapshot())
            .finish_non_exhaustive()
    }
}

impl AcceptLoop {
    fn run(self) {
        loop {
            match self.listener.accept() {
                Ok((stream, peer)) => {
                    if self.state.get() != ServerState::Running {
                        self.drain_backlog(Some((stream, peer)));
                        break;
                    }
                    if !self.dispatch(stream, peer) {
                        break;
                    }
                }
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => {
                    if self.state.get() != ServerState::Running {
                        self.drain_backlog(None);
                        break;
                    }
                    self.observer.error(&format!("accept failed: {e}"));
                    thread::sleep(ACCEPT_BACKOFF);
                }
            }
        }

        // Refuse new connections before the workers drain the queue.
        drop(self.listener);
        self.observer.debug("accept loop exiting");
    }

    /// Queue every connection the kernel has already completed, skipping the
    /// wake-up connection, then return without blocking.
    fn drain_backlog(&self, mut next: Option<(TcpStream, SocketAddr)>) {
        let nonblocking = self.listener.set_nonblocking(true);
        if let Err(e) = &nonblocking {
            self.observer
                .warn(&format!("cannot drain pending connections: {e}"));
        }
        loop {
            if let Some((stream, peer)) = next.take()
                && !self.is_wake_peer(peer)
            {
                // Accepted sockets inherit O_NONBLOCK on some platforms.
                if let Err(e) = stream.set_nonblocking(false) {
                    self.observer
                        .warn(&format!("failed to reset blocking mode for {peer}: {e}"));
                }
                if !self.dispatch(stream, peer) {
                    return;
                }
            }
            if nonblocking.is_err() {
                return;
            }
            match self.listener.accept() {
                Ok(pair) => next = Some(pair),
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(_) => return,
            }
        }
    }

    /// Hand one accepted stream to the workers. `false` once the queue is
    /// closed.
    fn dispatch(&self, stream: TcpStream, peer: SocketAddr) -> bool {
        self.stats.connection_opened();
        if let Err(e) = apply_timeouts(&stream, self.io_timeout) {
            self.observer
                .warn(&format!("failed to set timeouts for {peer}: {e}"));
        }
        let conn = Connection::new(
            stream,
            client_address(&peer),
            self.rules.clone(),
            self.stats.clone(),
            self.observer.clone(),
        );
        match self.submitter.submit(conn) {
            Ok(()) => true,
            Err(conn) => {
                drop(conn);
                self.stats.connection_finished();
                false
            }
        }
    }

    fn is_wake_peer(&self, peer: SocketAddr) -> bool {
        *self.wake_peer.lock().unwrap_or_else(PoisonError::into_inner) == Some(peer)
    }
}

fn bind_listener(addr: SocketAddr, config: &ServerConfig) -> io::Result<TcpListener> {
    let socket = Socket::new(Domain::for_address(addr), Type::STREAM, Some(Protocol::TCP))?;
    socket.set_reuse_address(true)?;
    if addr.is_ipv6() {
        socket.set_only_v6(!config.dual_stack)?;
    }
    socket.bind(&addr.into())?;
    socket.listen(i32::try_from(config.backlog).unwrap_or(i32::MAX))?;
    Ok(socket.into())
}

fn apply_timeouts(stream: &TcpStream, timeout: Option<Duration>) -> io::Result<()> {
    stream.set_read_timeout(timeout)?;
    stream.set_write_timeout(timeout)
}

/// Unblock the accept thread with a throwaway connection.
///
/// The connection's source address is stored in `wake_peer` before it
/// connects.
fn wake_accept(
    local_addr: SocketAddr,
    wake_peer: &Mutex<Option<SocketAddr>>,
    observer: &dyn Observer,
) {
    let ip = match local_addr.ip() {
        IpAddr::V4(ip) if ip.is_unspecified() => IpAddr::V4(Ipv4Addr::LOCALHOST),
        IpAddr::V6(ip) if ip.is_unspecified() => IpAddr::V6(Ipv6Addr::LOCALHOST),
        ip => ip,
    };
    let target = SocketAddr::new(ip, local_addr.port());
    match wake_connect(target, wake_peer) {
        Ok(_) => {}
        // The accept loop may already have drained the backlog and exited.
        Err(e)
            if matches!(
                e.kind(),
                io::ErrorKind::ConnectionRefused | io::ErrorKind::ConnectionReset
            ) =>
        {
            observer.debug(&format!("accept loop already closed at {target}"));
        }
        Err(e) => {
            observer.warn(&format!("failed to wake accept loop via {target}: {e}"));
        }
    }
}

fn wake_connect(
    target: SocketAddr,
    wake_peer: &Mutex<Option<SocketAddr>>,
) -> io::Result<Socket> {
    let socket = Socket::new(Domain::for_address(target), Type::STREAM, Some(Protocol::TCP))?;
    socket.bind(&SocketAddr::new(target.ip(), 0).into())?;
    let source = socket
        .local_addr()?
        .as_socket()
        .ok_or_else(|| io::Error::other("wake socket has no inet address"))?;
    *wake_peer.lock().unwrap_or_else(PoisonError::into_inner) = Some(source);
    socket.connect_timeout(&SockAddr::from(target), WAKE_TIMEOUT)?;
    Ok(socket)
}
