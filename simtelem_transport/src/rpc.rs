//! RPC-stream transport: line-delimited JSON [`SimulationCycle`] records
//! over TCP.
//!
//! Reuses the same serde-derived [`SimulationCycle`] the file transport
//! parses into, framed one JSON object per newline-terminated line. A
//! background thread accepts any number of simulator connections and
//! forwards decoded cycles onto a single channel; [`RpcTransport::recv_timeout`]
//! is just a timed receive off that channel, so it composes with the ingest
//! orchestrator's poll loop exactly like [`crate::file::FileDropTransport`]
//! does.

use std::io::{BufRead, BufReader};
use std::net::{TcpListener, TcpStream};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::thread;
use std::time::Duration;

use simtelem_common::{EngineError, EngineResult};

use crate::cycle::SimulationCycle;
use crate::source::CycleSource;

/// Listens on a TCP socket and decodes incoming simulator connections
/// into a single stream of [`SimulationCycle`] records.
pub struct RpcTransport {
    rx: Receiver<SimulationCycle>,
    local_addr: std::net::SocketAddr,
}

impl RpcTransport {
    /// Binds `addr` and spawns the accept loop. Returns once bound, so a
    /// caller can observe a bind failure (e.g. port already in use)
    /// synchronously instead of it surfacing later as a silent timeout.
    pub fn bind(addr: &str) -> EngineResult<Self> {
        let listener = TcpListener::bind(addr).map_err(|source| EngineError::TransportDirectory {
            path: addr.to_string(),
            source,
        })?;
        let local_addr = listener.local_addr().map_err(|source| EngineError::TransportDirectory {
            path: addr.to_string(),
            source,
        })?;
        let (tx, rx) = mpsc::channel();
        thread::spawn(move || Self::accept_loop(listener, tx));
        Ok(Self { rx, local_addr })
    }

    /// The address actually bound — useful when `addr` requested an
    /// ephemeral port (`:0`).
    pub fn local_addr(&self) -> std::net::SocketAddr {
        self.local_addr
    }

    fn accept_loop(listener: TcpListener, tx: Sender<SimulationCycle>) {
        for incoming in listener.incoming() {
            let stream = match incoming {
                Ok(stream) => stream,
                Err(err) => {
                    tracing::warn!(error = %err, "failed to accept simulator connection");
                    continue;
                }
            };
            let tx = tx.clone();
            thread::spawn(move || Self::read_connection(stream, tx));
        }
    }

    fn read_connection(stream: TcpStream, tx: Sender<SimulationCycle>) {
        let peer = stream
            .peer_addr()
            .map(|a| a.to_string())
            .unwrap_or_else(|_| "<unknown>".to_string());
        let reader = BufReader::new(stream);
        for line in reader.lines() {
            let line = match line {
                Ok(line) => line,
                Err(err) => {
                    tracing::warn!(peer = %peer, error = %err, "simulator connection read error");
                    return;
                }
            };
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str::<SimulationCycle>(&line) {
                Ok(cycle) => {
                    if tx.send(cycle).is_err() {
                        // Receiving half dropped (engine shutting down).
                        return;
                    }
                }
                Err(err) => {
                    tracing::warn!(peer = %peer, error = %err, "skipping malformed cycle record");
                }
            }
        }
        tracing::debug!(peer = %peer, "simulator connection closed");
    }
}

impl CycleSource for RpcTransport {
    fn recv_timeout(&mut self, timeout: Duration) -> EngineResult<Option<SimulationCycle>> {
        match self.rx.recv_timeout(timeout) {
            Ok(cycle) => Ok(Some(cycle)),
            Err(RecvTimeoutError::Timeout) => Ok(None),
            Err(RecvTimeoutError::Disconnected) => Ok(None),
        }
    }
}
