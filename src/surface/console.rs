//! Console surface - logs all refresh signals for testing and debugging
//!
//! Useful for running the gateway against a real device without a control
//! surface attached, and for watching the notification flow during
//! development.

use std::sync::atomic::{AtomicU64, Ordering};

use tracing::{debug, info};

use crate::connection::ConnectionStatus;
use crate::surface::{ControlSurface, FeedbackKind};

/// Surface implementation that logs every hook invocation
#[derive(Default)]
pub struct ConsoleSurface {
    refresh_count: AtomicU64,
}

impl ConsoleSurface {
    pub fn new() -> Self {
        Self::default()
    }

    fn next_refresh(&self) -> u64 {
        self.refresh_count.fetch_add(1, Ordering::SeqCst) + 1
    }
}

impl ControlSurface for ConsoleSurface {
    fn update_actions(&self) {
        info!(
            "🔄 [{}] Action definitions rebuilt [refresh #{}]",
            chrono::Local::now().format("%H:%M:%S%.3f"),
            self.next_refresh()
        );
    }

    fn check_feedbacks(&self, kind: FeedbackKind) {
        debug!(
            feedback = kind.id(),
            refresh = self.next_refresh(),
            "Feedback re-evaluation requested"
        );
    }

    fn update_variable_definitions(&self) {
        debug!(
            refresh = self.next_refresh(),
            "Variable definitions rebuilt"
        );
    }

    fn connection_status(&self, status: ConnectionStatus) {
        match &status {
            ConnectionStatus::Ok => info!("✅ Matrix connection ok"),
            ConnectionStatus::Connecting => info!("🔌 Matrix connecting..."),
            ConnectionStatus::Error(msg) => info!("⚠️  Matrix connection error: {}", msg),
            ConnectionStatus::Disconnected(msg) => info!("🛑 Matrix disconnected: {}", msg),
        }
    }
}
