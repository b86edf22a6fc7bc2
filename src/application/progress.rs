use tokio::sync::watch;

use crate::domain::{InstallPhase, InstallProgress};

/// Receives status and progress updates from the installation task.
///
/// Implementations must not block: updates are posted from the background
/// task and only the most recent value matters to the presentation layer.
pub trait ProgressSink: Send + Sync {
    fn status(&self, text: &str);

    fn progress(&self, percent: f32);

    fn phase(&self, _phase: InstallPhase) {}
}

/// Single-slot, latest-value-wins channel into the UI.
pub struct ProgressChannel {
    tx: watch::Sender<InstallProgress>,
}

impl ProgressChannel {
    pub fn new() -> (Self, watch::Receiver<InstallProgress>) {
        let (tx, rx) = watch::channel(InstallProgress::default());
        (Self { tx }, rx)
    }
}

impl ProgressSink for ProgressChannel {
    fn status(&self, text: &str) {
        self.tx.send_modify(|p| p.status = text.to_string());
    }

    fn progress(&self, percent: f32) {
        self.tx.send_modify(|p| p.percent = percent.clamp(0.0, 100.0));
    }

    fn phase(&self, phase: InstallPhase) {
        self.tx.send_modify(|p| p.phase = phase);
    }
}
