// Copyright 2026 U.S. Federal Government (in countries where recognized)
// SPDX-License-Identifier: Apache-2.0

//! One accepted client connection.
//!
//! A [`Connection`] owns its stream exclusively and serves it once: check the
//! client against the [`AccessRules`], write the current time as a 4-byte
//! packet, close. Sends and receives loop until the whole packet has moved,
//! retrying interrupted calls, so a socket that accepts one byte per write
//! still delivers the full timestamp.
//!
//! The stream is any [`ClientStream`]; the server uses [`TcpStream`].

use std::io::{self, Read, Write};
use std::net::{Shutdown, SocketAddr, TcpStream};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::error::ConnectionError;
use crate::protocol::{self, ConstPackedSizeBytes, TimePacket};
use crate::server_common::{AccessResult, AccessRules, Observer, ServerStats};

/// Byte stream a [`Connection`] can serve.
pub trait ClientStream: Read + Write + Send {
    /// Shut down both directions. Called once from [`Connection::close()`].
    fn shutdown(&self) -> io::Result<()> {
        Ok(())
    }
}

impl ClientStream for TcpStream {
    fn shutdown(&self) -> io::Result<()> {
        TcpStream::shutdown(self, Shutdown::Both)
    }
}

/// Outcome of [`Connection::serve()`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ServeOutcome {
    /// A time packet was written.
    Served,
    /// Access control rejected the client; nothing was written.
    Denied,
}

/// Render a peer address the way access lists spell it.
///
/// IPv4-mapped IPv6 peers (`::ffff:1.2.3.4`) seen on dual-stack listeners
/// become plain `1.2.3.4`.
pub fn client_address(peer: &SocketAddr) -> String {
    peer.ip().to_canonical().to_string()
}

/// A single client connection and its counters.
pub struct Connection<S: ClientStream = TcpStream> {
    stream: Option<S>,
    client_address: String,
    connected: bool,
    packets_sent: AtomicU64,
    packets_received: AtomicU64,
    bytes_sent: AtomicU64,
    bytes_received: AtomicU64,
    rules: Arc<AccessRules>,
    stats: Arc<ServerStats>,
    observer: Arc<dyn Observer>,
}

impl<S: ClientStream> Connection<S> {
    /// Wrap an accepted stream. The connection starts connected.
    pub fn new(
        stream: S,
        client_address: impl Into<String>,
        rules: Arc<AccessRules>,
        stats: Arc<ServerStats>,
        observer: Arc<dyn Observer>,
    ) -> Self {
        let client_address = client_address.into();
        observer.info(&format!("accepted connection from {client_address}"));
        Connection {
            stream: Some(stream),
            client_address,
            connected: true,
            packets_sent: AtomicU64::new(0),
            packets_received: AtomicU64::new(0),
            bytes_sent: AtomicU64::new(0),
            bytes_received: AtomicU64::new(0),
            rules,
            stats,
            observer,
        }
    }

    /// Serve the client: access check, then one time packet.
    ///
    /// A denied client is closed immediately and gets zero bytes. A write
    /// failure leaves the connection disconnected; the caller still closes it.
    pub fn serve(&mut self) -> Result<ServeOutcome, ConnectionError> {
        let verdict = self.rules.check(&self.client_address);
        if verdict != AccessResult::Allow {
            let reason = match verdict {
                AccessResult::Deny => "deny list",
                _ => "not on allow list",
            };
            self.observer.warn(&format!(
                "access denied for {} ({reason})",
                self.client_address
            ));
            self.stats.inc_denied();
            self.close();
            return Ok(ServeOutcome::Denied);
        }

        self.send_packet(&TimePacket::now())?;
        Ok(ServeOutcome::Served)
    }

    /// Write one packet in full. Returns the number of bytes written.
    pub fn send_packet(&mut self, packet: &TimePacket) -> Result<usize, ConnectionError> {
        if !self.connected {
            return Err(ConnectionError::NotConnected);
        }
        let wire = packet.to_wire();
        match self.send_all(&wire) {
            Ok(n) => {
                self.packets_sent.fetch_add(1, Ordering::Relaxed);
                self.bytes_sent.fetch_add(n as u64, Ordering::Relaxed);
                self.stats.record_sent(n);
                self.observer
                    .debug(&format!("sent {packet} to {}", self.client_address));
                Ok(n)
            }
            Err(e) => Err(self.io_failed("send", e)),
        }
    }

    /// Read exactly one packet and decode it.
    ///
    /// A decode failure is returned as [`ConnectionError::Decode`] and leaves
    /// the connection open. A peer close or read error disconnects it.
    pub fn receive_packet(&mut self) -> Result<TimePacket, ConnectionError> {
        if !self.connected {
            return Err(ConnectionError::NotConnected);
        }
        let mut buf = [0u8; TimePacket::PACKED_SIZE_BYTES];
        match self.recv_all(&mut buf) {
            Ok(()) => {}
            Err(ConnectionError::PeerClosed) => {
                self.connected = false;
                self.observer
                    .debug(&format!("{} closed the connection", self.client_address));
                return Err(ConnectionError::PeerClosed);
            }
            Err(e) => return Err(self.io_failed("receive", e)),
        }

        // Only packets that decode are counted.
        let packet = protocol::decode(&buf)?;
        self.packets_received.fetch_add(1, Ordering::Relaxed);
        self.bytes_received
            .fetch_add(buf.len() as u64, Ordering::Relaxed);
        self.stats.record_received(buf.len());
        self.observer
            .debug(&format!("received {packet} from {}", self.client_address));
        Ok(packet)
    }

    fn send_all(&mut self, buf: &[u8]) -> Result<usize, ConnectionError> {
        let stream = self.stream.as_mut().ok_or(ConnectionError::NotConnected)?;
        let mut written = 0;
        while written < buf.len() {
            match stream.write(&buf[written..]) {
                Ok(0) => {
                    return Err(ConnectionError::WriteZero {
                        written,
                        total: buf.len(),
                    });
                }
                Ok(n) => written += n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        }
        stream.flush()?;
        Ok(written)
    }

    fn recv_all(&mut self, buf: &mut [u8]) -> Result<(), ConnectionError> {
        let stream = self.stream.as_mut().ok_or(ConnectionError::NotConnected)?;
        let mut filled = 0;
        while filled < buf.len() {
            match stream.read(&mut buf[filled..]) {
                Ok(0) => return Err(ConnectionError::PeerClosed),
                Ok(n) => filled += n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        }
        Ok(())
    }

    fn io_failed(&mut self, op: &str, err: ConnectionError) -> ConnectionError {
        self.connected = false;
        self.stats.inc_io_errors();
        self.observer
            .error(&format!("{op} failed for {}: {err}", self.client_address));
        err
    }

    /// Release the stream and report the connection's counters.
    ///
    /// Idempotent: only the first call shuts the stream down.
    pub fn close(&mut self) {
        let Some(stream) = self.stream.take() else {
            return;
        };
        self.connected = false;
        if let Err(e) = stream.shutdown()
            && e.kind() != io::ErrorKind::NotConnected
        {
            self.observer.debug(&format!(
                "shutdown of {} failed: {e}",
                self.client_address
            ));
        }
        drop(stream);
        self.observer.info(&format!(
            "closed connection from {}: {} packets sent, {} received, {} bytes sent, {} bytes received",
            self.client_address,
            self.packets_sent(),
            self.packets_received(),
            self.bytes_sent(),
            self.bytes_received(),
        ));
    }

    /// Whether the stream is still usable.
    pub fn is_connected(&self) -> bool {
        self.connected
    }

    /// Peer address as matched against the access lists.
    pub fn client_address(&self) -> &str {
        &self.client_address
    }

    /// Packets written on this connection.
    pub fn packets_sent(&self) -> u64 {
        self.packets_sent.load(Ordering::Relaxed)
    }

    /// Packets read on this connection.
    pub fn packets_received(&self) -> u64 {
        self.packets_received.load(Ordering::Relaxed)
    }

    /// Bytes written on this connection.
    pub fn bytes_sent(&self) -> u64 {
        self.bytes_sent.load(Ordering::Relaxed)
    }

    /// Bytes read on this connection.
    pub fn bytes_received(&self) -> u64 {
        self.bytes_received.load(Ordering::Relaxed)
    }
}

impl<S: ClientStream> Drop for Connection<S> {
    fn drop(&mut self) {
        self.close();
    }
}

impl<S: ClientStream> std::fmt::Debug for Connection<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Connection")
            .field("client_address", &self.client_address)
            .field("connected", &self.connected)
            .field("packets_sent", &self.packets_sent())
            .field("packets_received", &self.packets_received())
            .finish_non_exhaustive()
    }
}
