//! Host-facing adapter lifecycle
//!
//! The enclosing host drives `init`, `config_updated` and `destroy`; action,
//! feedback and variable consumers read the mirrored device state through
//! the accessors. One adapter owns one connection manager, which owns at
//! most one live socket.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::debug;

use crate::config::DeviceConfig;
use crate::connection::{ConnectionManager, ConnectionState, ConnectionStatus};
use crate::mirror::{DeviceMirror, MirrorSnapshot};
use crate::surface::{ControlSurface, SurfaceBridge};

/// Adapter between the matrix device and a control surface
pub struct MatrixAdapter {
    config: RwLock<Option<DeviceConfig>>,
    mirror: DeviceMirror,
    manager: ConnectionManager,
}

impl MatrixAdapter {
    pub fn new(surface: Arc<dyn ControlSurface>) -> Self {
        let mirror = DeviceMirror::new();
        let bridge = SurfaceBridge::new(surface);
        let manager = ConnectionManager::new(mirror.clone(), bridge);
        Self {
            config: RwLock::new(None),
            mirror,
            manager,
        }
    }

    /// Host entry point: initial configuration
    pub async fn init(&self, config: DeviceConfig) {
        *self.config.write() = Some(config.clone());
        self.manager.reconnect(&config).await;
    }

    /// Host entry point: configuration changed, replace the session
    pub async fn config_updated(&self, config: DeviceConfig) {
        *self.config.write() = Some(config.clone());
        self.manager.reconnect(&config).await;
    }

    /// Re-dial with the current configuration
    pub async fn reconnect(&self) {
        let config = self.config.read().clone();
        match config {
            Some(config) => self.manager.reconnect(&config).await,
            None => debug!("Reconnect requested before any configuration"),
        }
    }

    /// Host entry point: final teardown
    pub async fn destroy(&self) {
        self.manager.destroy().await;
    }

    /// Send a raw command to the device (fire-and-forget)
    pub async fn send_command(&self, cmd: &str) {
        self.manager.send_command(cmd).await;
    }

    pub fn state(&self) -> ConnectionState {
        self.manager.state()
    }

    /// Last status reported to the surface, if any
    pub fn status(&self) -> Option<ConnectionStatus> {
        self.manager.status()
    }

    pub fn channels(&self) -> Vec<String> {
        self.mirror.channels()
    }

    pub fn presets(&self) -> Vec<String> {
        self.mirror.presets()
    }

    pub fn channel_mutes(&self) -> HashMap<String, u8> {
        self.mirror.channel_mutes()
    }

    pub fn crosspoint_mutes(&self) -> HashMap<(String, String), u8> {
        self.mirror.crosspoint_mutes()
    }

    pub fn channel_mute(&self, channel: &str) -> Option<u8> {
        self.mirror.channel_mute(channel)
    }

    pub fn crosspoint_mute(&self, input: &str, output: &str) -> Option<u8> {
        self.mirror.crosspoint_mute(input, output)
    }

    /// Full copy of the mirror for display/serialization
    pub fn snapshot(&self) -> MirrorSnapshot {
        self.mirror.snapshot()
    }
}
