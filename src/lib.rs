//! AudioMatrix GW core library
//!
//! Maintains a persistent text-protocol TCP connection to an audio routing
//! matrix, mirrors the device's dynamic configuration (virtual channels,
//! presets, channel and crosspoint mute states), and exposes that mirror
//! plus command sending to a control surface.
//!
//! The flow is: [`connection::ConnectionManager`] owns the socket and feeds
//! inbound chunks through [`protocol::LineBuffer`] and
//! [`protocol::decode_line`]; decoded events land in [`mirror::DeviceMirror`]
//! and changes fan out to the surface via [`surface::SurfaceBridge`]. The
//! host drives everything through [`adapter::MatrixAdapter`].

pub mod adapter;
pub mod cli;
pub mod config;
pub mod connection;
pub mod mirror;
pub mod protocol;
pub mod surface;

pub use adapter::MatrixAdapter;
pub use config::{AppConfig, ConfigError, DeviceConfig};
pub use connection::{ConnectionManager, ConnectionState, ConnectionStatus};
pub use mirror::{DeviceMirror, MirrorSnapshot, StateChange};
pub use protocol::{decode_line, encode_command, LineBuffer, ProtocolEvent};
pub use surface::{ConsoleSurface, ControlSurface, FeedbackKind, SurfaceBridge};
