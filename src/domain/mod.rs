pub mod error;
pub mod model;

pub use error::InstallError;
pub use model::{
    Artifact, AssetRef, InstallOutcome, InstallPhase, InstallProgress, InstallTarget, ProgressRange,
    ReleaseInfo,
};
