use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

use super::InstallError;

/// A downloadable file attached to a release.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetRef {
    pub name: String,
    pub url: String,
}

/// Latest published release, resolved once per installation attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseInfo {
    /// Normalised version, e.g. `2.1` for tag `StreetViewLocate_V2.1`.
    pub version: String,
    /// Every asset on the release, name -> download URL.
    pub assets: BTreeMap<String, String>,
    pub resource: AssetRef,
    pub plugin: AssetRef,
}

impl ReleaseInfo {
    pub fn asset(&self, artifact: Artifact) -> &AssetRef {
        match artifact {
            Artifact::Resource => &self.resource,
            Artifact::Plugin => &self.plugin,
        }
    }
}

/// The two archives every installation downloads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Artifact {
    /// Shared block/resource files, extracted into the per-user data directory.
    Resource,
    /// The plugin module itself, extracted into the bundle's `Contents/Win64`.
    Plugin,
}

impl Artifact {
    pub fn temp_file_name(self) -> &'static str {
        match self {
            Artifact::Resource => "file1.zip",
            Artifact::Plugin => "file2.zip",
        }
    }
}

impl fmt::Display for Artifact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Artifact::Resource => write!(f, "resources"),
            Artifact::Plugin => write!(f, "plugin"),
        }
    }
}

/// Where the pipeline currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstallPhase {
    Idle,
    ResolvingRelease,
    Downloading(Artifact),
    Extracting,
    WritingDescriptor,
    Finished,
    AlreadyUpToDate,
    Aborted,
    Failed,
}

impl InstallPhase {
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            InstallPhase::Finished
                | InstallPhase::AlreadyUpToDate
                | InstallPhase::Aborted
                | InstallPhase::Failed
        )
    }
}

/// Latest progress snapshot, as seen by the presentation layer.
#[derive(Debug, Clone, PartialEq)]
pub struct InstallProgress {
    /// Overall completion in `[0, 100]`.
    pub percent: f32,
    pub status: String,
    pub phase: InstallPhase,
}

impl Default for InstallProgress {
    fn default() -> Self {
        Self {
            percent: 0.0,
            status: String::new(),
            phase: InstallPhase::Idle,
        }
    }
}

/// Slice of the overall progress scale owned by one sub-step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProgressRange {
    pub start: f32,
    pub end: f32,
}

impl ProgressRange {
    pub const fn new(start: f32, end: f32) -> Self {
        Self { start, end }
    }

    /// Maps a completion fraction onto this range. Out-of-range fractions are clamped.
    pub fn at(&self, fraction: f64) -> f32 {
        let fraction = fraction.clamp(0.0, 1.0) as f32;
        self.start + (self.end - self.start) * fraction
    }
}

/// Final result of one installation attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum InstallOutcome {
    Finished { version: String },
    AlreadyUpToDate { version: String },
    Aborted,
    Failed(InstallError),
}

impl InstallOutcome {
    pub fn phase(&self) -> InstallPhase {
        match self {
            InstallOutcome::Finished { .. } => InstallPhase::Finished,
            InstallOutcome::AlreadyUpToDate { .. } => InstallPhase::AlreadyUpToDate,
            InstallOutcome::Aborted => InstallPhase::Aborted,
            InstallOutcome::Failed(_) => InstallPhase::Failed,
        }
    }

    /// Human-readable summary for the result page.
    pub fn message(&self) -> String {
        match self {
            InstallOutcome::Finished { version } => {
                format!("StreetViewLocate {} has been installed successfully.", version)
            }
            InstallOutcome::AlreadyUpToDate { version } => {
                format!("Latest version ({}) already installed.", version)
            }
            InstallOutcome::Aborted => InstallError::Cancelled.to_string(),
            InstallOutcome::Failed(e) => e.to_string(),
        }
    }
}

/// Resolved install locations for one user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallTarget {
    /// Per-user directory receiving the shared resource archive.
    pub resource_dir: PathBuf,
    /// `<AppName>.bundle` directory recognised by the host application.
    pub bundle_dir: PathBuf,
    /// `Contents/Win64` inside the bundle, receiving the plugin archive.
    pub binary_dir: PathBuf,
    /// `PackageContents.xml` at the bundle root.
    pub descriptor_path: PathBuf,
}

impl InstallTarget {
    pub fn resolve(users_root: &Path, plugins_root: &Path, username: &str, app_name: &str) -> Self {
        let resource_dir = users_root.join(username).join("AppData").join("Local");
        let bundle_dir = plugins_root.join(format!("{}.bundle", app_name));
        let binary_dir = bundle_dir.join("Contents").join("Win64");
        let descriptor_path = bundle_dir.join("PackageContents.xml");

        Self {
            resource_dir,
            bundle_dir,
            binary_dir,
            descriptor_path,
        }
    }
}
