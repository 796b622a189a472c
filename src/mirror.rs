//! In-memory mirror of the device's dynamic configuration
//!
//! Holds the virtual channel list, preset list and both mute maps. The mirror
//! is written only by the connection reader applying decoded protocol events;
//! consumers read cloned snapshots through the accessors.

use parking_lot::RwLock;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;

use crate::protocol::ProtocolEvent;

/// Which slice of the mirror an applied event touched
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StateChange {
    ChannelList,
    PresetList,
    ChannelMute,
    CrosspointMute,
}

#[derive(Default)]
struct MirrorInner {
    channels: Vec<String>,
    presets: Vec<String>,
    channel_mutes: HashMap<String, u8>,
    crosspoint_mutes: HashMap<(String, String), u8>,
}

/// Shared mirror of channel names, preset names and mute states
///
/// Cloning is cheap and shares the underlying state.
#[derive(Clone, Default)]
pub struct DeviceMirror {
    inner: Arc<RwLock<MirrorInner>>,
}

/// Read-only copy of the full mirror, serializable for display
#[derive(Debug, Clone, Serialize)]
pub struct MirrorSnapshot {
    pub channels: Vec<String>,
    pub presets: Vec<String>,
    pub channel_mutes: HashMap<String, u8>,
    /// Crosspoint keys flattened to `"<input>:<output>"`
    pub crosspoint_mutes: HashMap<String, u8>,
}

impl DeviceMirror {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply a decoded event, returning which slice changed (`None` for NoOp)
    ///
    /// List events replace wholesale; mute events upsert one entry. Mute maps
    /// are never bulk-cleared, so entries for channels that have since
    /// disappeared from the channel list persist until overwritten.
    pub fn apply(&self, event: ProtocolEvent) -> Option<StateChange> {
        let mut inner = self.inner.write();
        match event {
            ProtocolEvent::ChannelList(names) => {
                inner.channels = names;
                Some(StateChange::ChannelList)
            }
            ProtocolEvent::PresetList(names) => {
                inner.presets = names;
                Some(StateChange::PresetList)
            }
            ProtocolEvent::ChannelMute { channel, muted } => {
                inner.channel_mutes.insert(channel, muted);
                Some(StateChange::ChannelMute)
            }
            ProtocolEvent::CrosspointMute {
                input,
                output,
                muted,
            } => {
                inner.crosspoint_mutes.insert((input, output), muted);
                Some(StateChange::CrosspointMute)
            }
            ProtocolEvent::NoOp => None,
        }
    }

    pub fn channels(&self) -> Vec<String> {
        self.inner.read().channels.clone()
    }

    pub fn presets(&self) -> Vec<String> {
        self.inner.read().presets.clone()
    }

    pub fn channel_mutes(&self) -> HashMap<String, u8> {
        self.inner.read().channel_mutes.clone()
    }

    pub fn crosspoint_mutes(&self) -> HashMap<(String, String), u8> {
        self.inner.read().crosspoint_mutes.clone()
    }

    /// Mute state for one channel, if the device has reported it
    pub fn channel_mute(&self, channel: &str) -> Option<u8> {
        self.inner.read().channel_mutes.get(channel).copied()
    }

    /// Mute state for one crosspoint, if the device has reported it
    pub fn crosspoint_mute(&self, input: &str, output: &str) -> Option<u8> {
        self.inner
            .read()
            .crosspoint_mutes
            .get(&(input.to_string(), output.to_string()))
            .copied()
    }

    /// Full copy of the mirror for display/serialization
    pub fn snapshot(&self) -> MirrorSnapshot {
        let inner = self.inner.read();
        MirrorSnapshot {
            channels: inner.channels.clone(),
            presets: inner.presets.clone(),
            channel_mutes: inner.channel_mutes.clone(),
            crosspoint_mutes: inner
                .crosspoint_mutes
                .iter()
                .map(|((input, output), muted)| (format!("{input}:{output}"), *muted))
                .collect(),
        }
    }
}
