// Copyright 2026 U.S. Federal Government (in countries where recognized)
// SPDX-License-Identifier: Apache-2.0

//! Fixed worker pool fed by a bounded queue of accepted connections.
//!
//! Submitting blocks while the queue is full, which pushes back on the accept
//! loop. Shutdown drops the sending half: workers finish everything already
//! queued and exit when the channel reports disconnection.

use std::io;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crossbeam::channel::{Receiver, Sender, bounded};

use crate::connection::{ClientStream, Connection};
use crate::server_common::{Observer, ServerStats};

pub(crate) struct Dispatcher<S: ClientStream + 'static> {
    sender: Option<Sender<Connection<S>>>,
    workers: Vec<JoinHandle<()>>,
    observer: Arc<dyn Observer>,
}

impl<S: ClientStream + 'static> Dispatcher<S> {
    /// Spawn `worker_threads` workers (at least one) over a queue holding at
    /// most `capacity` connections (at least one).
    pub(crate) fn spawn(
        worker_threads: usize,
        capacity: usize,
        stats: Arc<ServerStats>,
        observer: Arc<dyn Observer>,
    ) -> io::Result<Self> {
        let (sender, receiver) = bounded::<Connection<S>>(capacity.max(1));
        let mut dispatcher = Dispatcher {
            sender: Some(sender),
            workers: Vec::with_capacity(worker_threads.max(1)),
            observer: observer.clone(),
        };

        for id in 0..worker_threads.max(1) {
            let receiver = receiver.clone();
            let stats = stats.clone();
            let observer = observer.clone();
            let spawned = thread::Builder::new()
                .name(format!("utcd-worker-{id}"))
                .spawn(move || worker_loop(id, receiver, &stats, observer.as_ref()));
            match spawned {
                Ok(handle) => dispatcher.workers.push(handle),
                Err(e) => {
                    // Joins the workers that did start.
                    dispatcher.shutdown();
                    return Err(e);
                }
            }
        }
        Ok(dispatcher)
    }

    /// Queue a connection, blocking while the queue is full.
    ///
    /// Hands the connection back if the pool is shut down.
    #[cfg(test)]
    pub(crate) fn submit(&self, conn: Connection<S>) -> Result<(), Connection<S>> {
        match &self.sender {
            Some(sender) => sender.send(conn).map_err(|e| e.into_inner()),
            None => Err(conn),
        }
    }

    /// A cloneable handle for queueing from another thread. `None` after
    /// shutdown.
    pub(crate) fn submitter(&self) -> Option<Submitter<S>> {
        self.sender.clone().map(Submitter)
    }

    /// Workers still attached to the queue.
    pub(crate) fn worker_count(&self) -> usize {
        self.workers.len()
    }

    /// Close the queue, let workers drain it, and join them.
    pub(crate) fn shutdown(&mut self) {
        drop(self.sender.take());
        for handle in self.workers.drain(..) {
            let name = handle.thread().name().unwrap_or("worker").to_string();
            if handle.join().is_err() {
                self.observer.error(&format!("{name} terminated abnormally"));
            }
        }
    }
}

/// Sending half of the queue, held by the accept loop.
///
/// Workers only see the queue close once every `Submitter` is dropped as well
/// as the [`Dispatcher`]'s own sender.
pub(crate) struct Submitter<S: ClientStream>(Sender<Connection<S>>);

impl<S: ClientStream> Submitter<S> {
    /// Queue a connection, blocking while the queue is full.
    pub(crate) fn submit(&self, conn: Connection<S>) -> Result<(), Connection<S>> {
        self.0.send(conn).map_err(|e| e.into_inner())
    }
}

impl<S: ClientStream + 'static> Drop for Dispatcher<S> {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn worker_loop<S: ClientStream>(
    id: usize,
    receiver: Receiver<Connection<S>>,
    stats: &ServerStats,
    observer: &dyn Observer,
) {
    while let Ok(mut conn) = receiver.recv() {
        let client = conn.client_address().to_string();
        let served = catch_unwind(AssertUnwindSafe(|| {
            // Failures were already reported by the connection.
            let _ = conn.serve();
            conn.close();
        }));
        if served.is_err() {
            observer.error(&format!(
                "worker {id} recovered from a panic while serving {client}"
            ));
        }
        // Drop closes the stream if the panic skipped close().
        drop(conn);
        stats.connection_finished();
    }
    observer.debug(&format!("worker {id} exiting"));
}
