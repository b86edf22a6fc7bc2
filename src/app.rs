use std::sync::Arc;

use iced::Task;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use crate::application::{InstallPipeline, ProgressChannel};
use crate::config::InstallerConfig;
use crate::domain::{InstallError, InstallOutcome, InstallPhase, InstallProgress, InstallTarget};
use crate::ui::{Page, WizardMessage, WizardView};
use crate::utils::current_username;

pub struct InstallerApp {
    view: WizardView,
    config: Arc<InstallerConfig>,
    // Set while an installation attempt is running
    cancel: Option<CancellationToken>,
}

impl InstallerApp {
    pub fn new(config: Arc<InstallerConfig>) -> Self {
        Self {
            view: WizardView::default(),
            config,
            cancel: None,
        }
    }

    fn resolve_target(&self) -> Result<InstallTarget, InstallError> {
        let username = current_username().ok_or_else(|| {
            InstallError::Filesystem("could not determine the current user".to_string())
        })?;

        Ok(InstallTarget::resolve(
            &self.config.layout.users_root,
            &self.config.layout.plugins_root,
            &username,
            &self.config.plugin.app_name,
        ))
    }

    fn finish(&mut self, outcome: &InstallOutcome) {
        let title = match outcome {
            InstallOutcome::Finished { .. } => "Installation Complete!",
            InstallOutcome::AlreadyUpToDate { .. } => "Already Up To Date",
            InstallOutcome::Aborted => "Installation Cancelled",
            InstallOutcome::Failed(_) => "Installation Failed",
        };

        self.cancel = None;
        self.view.phase = outcome.phase();
        self.view.page = Page::Done {
            title: title.to_string(),
            message: outcome.message(),
        };
    }
}

#[derive(Debug, Clone)]
pub enum Message {
    UiMessage(WizardMessage),
    /// Latest snapshot from the installation task
    Progress(InstallProgress),
    /// Terminal result of the installation task
    InstallCompleted(InstallOutcome),
}

pub fn update(app: &mut InstallerApp, message: Message) -> Task<Message> {
    match message {
        Message::UiMessage(ui_msg) => {
            app.view.update(&ui_msg);

            match ui_msg {
                WizardMessage::InstallPressed
                    if app.view.license_accepted && app.cancel.is_none() =>
                {
                    return start_installation(app);
                }
                WizardMessage::CancelPressed => {
                    if let Some(cancel) = &app.cancel {
                        info!("cancellation requested");
                        cancel.cancel();
                    }
                }
                WizardMessage::FinishPressed => return iced::exit(),
                _ => {}
            }
        }
        Message::Progress(progress) => {
            if app.view.page == Page::Installing {
                app.view.progress = progress.percent;
                app.view.phase = progress.phase;
                // Keep "Cancelling..." visible until the pipeline reports back
                let cancelling = app.cancel.as_ref().is_some_and(|c| c.is_cancelled());
                if !cancelling || progress.phase.is_terminal() {
                    app.view.status_message = progress.status;
                }
            }
        }
        Message::InstallCompleted(outcome) => {
            info!(outcome = ?outcome.phase(), "installation attempt finished");
            app.finish(&outcome);
        }
    }
    Task::none()
}

fn start_installation(app: &mut InstallerApp) -> Task<Message> {
    let target = match app.resolve_target() {
        Ok(target) => target,
        Err(e) => {
            error!(error = %e, "cannot resolve install locations");
            app.finish(&InstallOutcome::Failed(e));
            return Task::none();
        }
    };

    let cancel = CancellationToken::new();
    let (channel, rx) = ProgressChannel::new();
    let pipeline = InstallPipeline::new(
        app.config.clone(),
        target,
        cancel.clone(),
        Arc::new(channel),
    );

    app.cancel = Some(cancel);
    app.view.page = Page::Installing;
    app.view.progress = 0.0;
    app.view.phase = InstallPhase::Idle;
    app.view.status_message = "Starting...".to_string();

    // iced Task::perform runs in the background tokio executor
    let run = Task::perform(pipeline.run(), Message::InstallCompleted);

    // Drain the latest-value channel until the pipeline drops its sender
    let progress = Task::stream(futures::stream::unfold(rx, |mut rx| async move {
        rx.changed().await.ok()?;
        let snapshot = rx.borrow_and_update().clone();
        Some((Message::Progress(snapshot), rx))
    }));

    Task::batch([progress, run])
}

pub fn view(app: &InstallerApp) -> iced::Element<'_, Message> {
    app.view.view().map(Message::UiMessage)
}
