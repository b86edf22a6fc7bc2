use std::path::{Path, PathBuf};
use std::sync::Arc;

use tempfile::TempDir;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use super::progress::ProgressSink;
use super::{archive, descriptor, Fetcher};
use crate::api::ReleaseClient;
use crate::config::InstallerConfig;
use crate::domain::{
    Artifact, InstallError, InstallOutcome, InstallPhase, InstallTarget, ProgressRange,
    ReleaseInfo,
};

const RESOURCE_RANGE: ProgressRange = ProgressRange::new(0.0, 40.0);
const PLUGIN_RANGE: ProgressRange = ProgressRange::new(40.0, 80.0);
const EXTRACTED_PERCENT: f32 = 90.0;
const DESCRIPTOR_PERCENT: f32 = 95.0;

/// One installation attempt: resolve, download, extract, write the descriptor.
///
/// Only the private working directory is rolled back on abort or failure.
/// Files already extracted into the permanent locations stay where they are.
pub struct InstallPipeline {
    config: Arc<InstallerConfig>,
    target: InstallTarget,
    client: ReleaseClient,
    fetcher: Fetcher,
    cancel: CancellationToken,
    sink: Arc<dyn ProgressSink>,
    phase: InstallPhase,
}

/// Result of the steps before cleanup.
enum Completed {
    Installed(String),
    UpToDate(String),
}

impl InstallPipeline {
    pub fn new(
        config: Arc<InstallerConfig>,
        target: InstallTarget,
        cancel: CancellationToken,
        sink: Arc<dyn ProgressSink>,
    ) -> Self {
        let client = ReleaseClient::new(config.release.clone());
        let fetcher = Fetcher::new(client.clone());

        Self {
            config,
            target,
            client,
            fetcher,
            cancel,
            sink,
            phase: InstallPhase::Idle,
        }
    }

    /// Drive the attempt to a terminal state. The working directory, if one
    /// was created, is gone by the time this returns.
    pub async fn run(mut self) -> InstallOutcome {
        let mut workspace: Option<TempDir> = None;
        let result = self.execute(&mut workspace).await;
        remove_workspace(workspace);

        let outcome = match result {
            Ok(Completed::Installed(version)) => {
                self.sink.progress(100.0);
                self.sink.status("Installation complete!");
                InstallOutcome::Finished { version }
            }
            Ok(Completed::UpToDate(version)) => {
                self.sink.status("Latest version already installed.");
                InstallOutcome::AlreadyUpToDate { version }
            }
            Err(InstallError::Cancelled) => {
                info!("installation cancelled");
                self.sink.status(&InstallError::Cancelled.to_string());
                InstallOutcome::Aborted
            }
            Err(e) => {
                error!(error = %e, phase = ?self.phase, "installation failed");
                self.sink.status(&e.to_string());
                InstallOutcome::Failed(e)
            }
        };

        self.enter(outcome.phase());
        outcome
    }

    async fn execute(
        &mut self,
        workspace: &mut Option<TempDir>,
    ) -> Result<Completed, InstallError> {
        // Step 1: resolve the release and compare with what is installed
        self.enter(InstallPhase::ResolvingRelease);
        self.checkpoint()?;
        self.sink.status("Fetching release info...");
        let release = self.client.latest_release().await?;

        if let Some(installed) = descriptor::installed_version(&self.target.descriptor_path) {
            if installed == release.version {
                info!(version = %installed, "already up to date");
                return Ok(Completed::UpToDate(release.version));
            }
            info!(installed = %installed, latest = %release.version, "upgrading");
        }

        // Step 2 & 3: both archives into a private working directory
        self.checkpoint()?;
        let dir = workspace.insert(self.create_workspace()?);
        let resource_zip = dir.path().join(Artifact::Resource.temp_file_name());
        let plugin_zip = dir.path().join(Artifact::Plugin.temp_file_name());

        self.download(&release, Artifact::Resource, &resource_zip, RESOURCE_RANGE)
            .await?;
        self.download(&release, Artifact::Plugin, &plugin_zip, PLUGIN_RANGE)
            .await?;

        // Step 4: extraction runs to completion once started
        self.enter(InstallPhase::Extracting);
        self.checkpoint()?;
        self.sink.status("Extracting files...");
        extract_blocking(resource_zip, self.target.resource_dir.clone()).await?;
        extract_blocking(plugin_zip, self.target.binary_dir.clone()).await?;
        self.sink.progress(EXTRACTED_PERCENT);

        // Step 5: descriptor
        self.enter(InstallPhase::WritingDescriptor);
        self.checkpoint()?;
        self.sink.status("Writing PackageContents.xml...");
        let module_path = self
            .config
            .plugin
            .module_path(&self.config.release.plugin_asset_prefix, &release.version);
        descriptor::write(
            &self.target.bundle_dir,
            &self.config.plugin,
            &release.version,
            &module_path,
        )?;
        self.sink.progress(DESCRIPTOR_PERCENT);

        Ok(Completed::Installed(release.version))
    }

    async fn download(
        &mut self,
        release: &ReleaseInfo,
        artifact: Artifact,
        destination: &Path,
        range: ProgressRange,
    ) -> Result<(), InstallError> {
        self.enter(InstallPhase::Downloading(artifact));
        self.checkpoint()?;
        self.sink.status(&format!("Downloading {}...", artifact));

        let asset = release.asset(artifact);
        self.fetcher
            .fetch(&asset.url, destination, range, &self.cancel, self.sink.as_ref())
            .await?;
        Ok(())
    }

    fn create_workspace(&self) -> Result<TempDir, InstallError> {
        let mut builder = tempfile::Builder::new();
        builder.prefix("streetview-setup-");

        let dir = match &self.config.temp_root {
            Some(root) => builder.tempdir_in(root),
            None => builder.tempdir(),
        }
        .map_err(|e| InstallError::filesystem("Failed to create temporary directory", e))?;

        info!(path = %dir.path().display(), "created working directory");
        Ok(dir)
    }

    fn checkpoint(&self) -> Result<(), InstallError> {
        if self.cancel.is_cancelled() {
            return Err(InstallError::Cancelled);
        }
        Ok(())
    }

    fn enter(&mut self, phase: InstallPhase) {
        info!(from = ?self.phase, to = ?phase, "phase transition");
        self.phase = phase;
        self.sink.phase(phase);
    }
}

async fn extract_blocking(
    archive_path: PathBuf,
    destination: PathBuf,
) -> Result<usize, InstallError> {
    tokio::task::spawn_blocking(move || archive::extract(&archive_path, &destination))
        .await
        .map_err(|e| InstallError::Archive(format!("extraction task failed: {}", e)))?
}

/// Best-effort removal; failures are logged, never escalated.
fn remove_workspace(workspace: Option<TempDir>) {
    if let Some(dir) = workspace {
        let path = dir.path().to_path_buf();
        match dir.close() {
            Ok(()) => info!(path = %path.display(), "removed working directory"),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "failed to remove working directory")
            }
        }
    }
}
