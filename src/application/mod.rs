pub mod archive;
pub mod descriptor;
pub mod fetcher;
pub mod pipeline;
pub mod progress;

pub use fetcher::Fetcher;
pub use pipeline::InstallPipeline;
pub use progress::ProgressChannel;
