//! Control-surface notification bridge
//!
//! Translates mirror state changes into the refresh hooks a control surface
//! exposes. Invalidation is targeted: a change only triggers the hooks whose
//! output it can affect, never a blanket re-evaluation.

use std::sync::Arc;

use crate::connection::ConnectionStatus;
use crate::mirror::StateChange;

pub mod console;

pub use console::ConsoleSurface;

/// Feedback families a surface can re-evaluate independently
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FeedbackKind {
    ChannelMuteStatus,
    CrosspointMuteStatus,
}

impl FeedbackKind {
    /// Identifier used by surfaces that key their feedbacks by name
    pub fn id(&self) -> &'static str {
        match self {
            FeedbackKind::ChannelMuteStatus => "channelMuteStatus",
            FeedbackKind::CrosspointMuteStatus => "crosspointMuteStatus",
        }
    }
}

/// Hooks a control surface exposes to the adapter
///
/// All methods default to no-ops so a surface only implements what it
/// actually renders.
pub trait ControlSurface: Send + Sync {
    /// Rebuild action definitions (the channel/preset lists feed dynamic
    /// action dropdowns)
    fn update_actions(&self) {}

    /// Re-evaluate the feedbacks of one kind
    fn check_feedbacks(&self, _kind: FeedbackKind) {}

    /// Rebuild variable definitions from the current channel/preset lists
    fn update_variable_definitions(&self) {}

    /// Connection status changed
    fn connection_status(&self, _status: ConnectionStatus) {}
}

/// Routes mirror changes and status transitions to the surface hooks
#[derive(Clone)]
pub struct SurfaceBridge {
    surface: Arc<dyn ControlSurface>,
}

impl SurfaceBridge {
    pub fn new(surface: Arc<dyn ControlSurface>) -> Self {
        Self { surface }
    }

    /// Fan a mirror change out to the hooks it can affect, and nothing else
    pub fn notify(&self, change: StateChange) {
        match change {
            StateChange::ChannelList | StateChange::PresetList => {
                self.surface.update_actions();
                self.surface.update_variable_definitions();
            }
            StateChange::ChannelMute => {
                self.surface.check_feedbacks(FeedbackKind::ChannelMuteStatus);
            }
            StateChange::CrosspointMute => {
                self.surface
                    .check_feedbacks(FeedbackKind::CrosspointMuteStatus);
            }
        }
    }

    /// Forward a connection status transition
    pub fn status(&self, status: ConnectionStatus) {
        self.surface.connection_status(status);
    }
}
