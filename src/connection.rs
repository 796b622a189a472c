//! Matrix connection management
//!
//! Owns the socket lifecycle: dialing, the reader task that drives the wire
//! codec into the mirror, teardown on configuration change, and status
//! reporting. The core invariant is that a manager has at most one live
//! socket at any instant; entering `Connecting` always tears the previous
//! one down first.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::config::DeviceConfig;
use crate::mirror::DeviceMirror;
use crate::protocol::{self, LineBuffer};
use crate::surface::SurfaceBridge;

/// Queries issued over every freshly established connection so the device
/// pushes its current channel and preset lists
const STARTUP_QUERIES: [&str; 2] = ["get virtual_channels", "get presets"];

/// Connection status reported to the host surface on every transition
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionStatus {
    Ok,
    Connecting,
    Error(String),
    Disconnected(String),
}

/// Connection lifecycle states
///
/// `Destroyed` is terminal; no transition leaves it. There is no automatic
/// retry: leaving `Disconnected` requires an explicit reconnect with a
/// (possibly unchanged) configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Idle,
    Connecting,
    Connected,
    Disconnected,
    Destroyed,
}

struct Shared {
    state: Mutex<ConnectionState>,
    last_status: Mutex<Option<ConnectionStatus>>,
    /// Bumped on every teardown; a reader task only applies events while its
    /// own generation is still current
    generation: AtomicU64,
    writer: tokio::sync::Mutex<Option<OwnedWriteHalf>>,
    mirror: DeviceMirror,
    bridge: SurfaceBridge,
}

impl Shared {
    fn is_current(&self, generation: u64) -> bool {
        self.generation.load(Ordering::SeqCst) == generation
    }

    fn set_status(&self, status: ConnectionStatus) {
        *self.last_status.lock() = Some(status.clone());
        self.bridge.status(status);
    }

    fn transition_disconnected(&self, status: ConnectionStatus) {
        *self.state.lock() = ConnectionState::Disconnected;
        match &status {
            ConnectionStatus::Error(msg) => warn!("Matrix transport error: {}", msg),
            _ => info!("🛑 Matrix connection closed"),
        }
        self.set_status(status);
    }
}

/// Manages exactly one connection to the matrix device
pub struct ConnectionManager {
    shared: Arc<Shared>,
    reader: Mutex<Option<JoinHandle<()>>>,
}

impl ConnectionManager {
    pub fn new(mirror: DeviceMirror, bridge: SurfaceBridge) -> Self {
        Self {
            shared: Arc::new(Shared {
                state: Mutex::new(ConnectionState::Idle),
                last_status: Mutex::new(None),
                generation: AtomicU64::new(0),
                writer: tokio::sync::Mutex::new(None),
                mirror,
                bridge,
            }),
            reader: Mutex::new(None),
        }
    }

    pub fn state(&self) -> ConnectionState {
        *self.shared.state.lock()
    }

    /// Last status reported to the surface, if any
    pub fn status(&self) -> Option<ConnectionStatus> {
        self.shared.last_status.lock().clone()
    }

    /// Tear down any live socket, then dial `config` if it is complete
    ///
    /// With an incomplete config this settles in `Idle` without reporting
    /// anything; the host is expected to re-supply configuration.
    pub async fn reconnect(&self, config: &DeviceConfig) {
        if self.state() == ConnectionState::Destroyed {
            debug!("Ignoring reconnect on destroyed connection manager");
            return;
        }

        self.teardown().await;

        if !config.is_complete() {
            debug!("Connection suppressed: host/port not configured");
            return;
        }

        *self.shared.state.lock() = ConnectionState::Connecting;
        self.shared.set_status(ConnectionStatus::Connecting);
        info!("🔌 Connecting to matrix at {}:{}", config.host, config.port);

        match TcpStream::connect((config.host.as_str(), config.port)).await {
            Ok(stream) => {
                let (read_half, write_half) = stream.into_split();
                *self.shared.writer.lock().await = Some(write_half);

                let generation = self.shared.generation.load(Ordering::SeqCst);
                *self.reader.lock() =
                    Some(spawn_reader(Arc::clone(&self.shared), read_half, generation));

                *self.shared.state.lock() = ConnectionState::Connected;
                self.shared.set_status(ConnectionStatus::Ok);
                info!("✅ Matrix connection established");

                for query in STARTUP_QUERIES {
                    self.send_command(query).await;
                }
            }
            Err(e) => {
                warn!("Matrix connection failed: {}", e);
                *self.shared.state.lock() = ConnectionState::Disconnected;
                self.shared.set_status(ConnectionStatus::Error(e.to_string()));
            }
        }
    }

    /// Fire-and-forget command send
    ///
    /// A no-op unless connected: the command is neither queued nor does the
    /// caller receive a failure signal, only a local error log.
    pub async fn send_command(&self, cmd: &str) {
        if self.state() != ConnectionState::Connected {
            error!("Cannot send {:?}: not connected", cmd);
            return;
        }

        let mut guard = self.shared.writer.lock().await;
        match guard.as_mut() {
            Some(writer) => {
                if let Err(e) = writer.write_all(&protocol::encode_command(cmd)).await {
                    error!("Failed to send {:?}: {}", cmd, e);
                }
            }
            None => error!("Cannot send {:?}: no live socket", cmd),
        }
    }

    /// Final teardown; the manager accepts no further transitions
    pub async fn destroy(&self) {
        self.teardown().await;
        *self.shared.state.lock() = ConnectionState::Destroyed;
        debug!("Connection manager destroyed");
    }

    /// Forcibly close the current socket, if any
    ///
    /// Invalidates the reader generation before the socket goes away so no
    /// event from the old connection can be applied after a replacement
    /// connects.
    async fn teardown(&self) {
        self.shared.generation.fetch_add(1, Ordering::SeqCst);

        let handle = self.reader.lock().take();
        if let Some(handle) = handle {
            handle.abort();
        }

        if let Some(mut writer) = self.shared.writer.lock().await.take() {
            let _ = writer.shutdown().await;
        }

        let mut state = self.shared.state.lock();
        if *state != ConnectionState::Destroyed {
            *state = ConnectionState::Idle;
        }
    }
}

/// Reader task: pulls chunks off the socket, reassembles lines, and applies
/// decoded events to the mirror
fn spawn_reader(
    shared: Arc<Shared>,
    mut read_half: OwnedReadHalf,
    generation: u64,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut buffer = LineBuffer::new();
        let mut chunk = [0u8; 4096];

        loop {
            match read_half.read(&mut chunk).await {
                Ok(0) => {
                    if shared.is_current(generation) {
                        shared.transition_disconnected(ConnectionStatus::Disconnected(
                            "connection closed by device".to_string(),
                        ));
                    }
                    break;
                }
                Ok(n) => {
                    if !shared.is_current(generation) {
                        break;
                    }
                    for line in buffer.push(&chunk[..n]) {
                        if let Some(change) = shared.mirror.apply(protocol::decode_line(&line)) {
                            shared.bridge.notify(change);
                        }
                    }
                }
                Err(e) => {
                    if shared.is_current(generation) {
                        shared.transition_disconnected(ConnectionStatus::Error(e.to_string()));
                    }
                    break;
                }
            }
        }
    })
}
