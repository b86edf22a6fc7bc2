use std::path::PathBuf;

use tracing::warn;
use url::Url;

const DEFAULT_RELEASE_URL: &str =
    "https://api.github.com/repos/BHUTUU/streetViewLocate/releases/latest";

/// How the release endpoint is queried and how its assets are recognised.
#[derive(Debug, Clone)]
pub struct ReleaseConfig {
    pub endpoint: Url,
    pub user_agent: String,
    /// Exact name of the shared resource archive.
    pub resource_asset: String,
    /// Prefix of the versioned plugin archive, also stripped from the tag.
    pub plugin_asset_prefix: String,
}

/// Metadata rendered into `PackageContents.xml`.
#[derive(Debug, Clone)]
pub struct PluginManifest {
    pub app_name: String,
    pub description: String,
    pub app_description: String,
    pub author: String,
    pub autodesk_product: String,
    pub company_name: String,
    pub company_url: String,
    pub series_min: String,
    pub series_max: String,
    pub module_file: String,
}

impl PluginManifest {
    /// Module path relative to the bundle root for a given release version.
    pub fn module_path(&self, plugin_asset_prefix: &str, version: &str) -> String {
        format!(
            "./Contents/Win64/{}{}/{}",
            plugin_asset_prefix, version, self.module_file
        )
    }
}

/// Fixed roots of the Windows install layout.
#[derive(Debug, Clone)]
pub struct LayoutConfig {
    pub users_root: PathBuf,
    pub plugins_root: PathBuf,
}

/// Everything the installer needs, built once in `main` and shared read-only.
#[derive(Debug, Clone)]
pub struct InstallerConfig {
    pub release: ReleaseConfig,
    pub plugin: PluginManifest,
    pub layout: LayoutConfig,
    /// Parent for the per-attempt working directory. System temp dir when unset.
    pub temp_root: Option<PathBuf>,
}

impl Default for InstallerConfig {
    fn default() -> Self {
        Self {
            release: ReleaseConfig {
                endpoint: Url::parse(DEFAULT_RELEASE_URL).expect("default release URL is valid"),
                user_agent: format!("streetview-setup/{}", env!("CARGO_PKG_VERSION")),
                resource_asset: "StreetViewBySumanKumarBHUTUU.zip".to_string(),
                plugin_asset_prefix: "StreetViewLocate_V".to_string(),
            },
            plugin: PluginManifest {
                app_name: "StreetViewLocate".to_string(),
                description: "Street View Locate Plugin for AutoCAD".to_string(),
                app_description: "StreetView Locate".to_string(),
                author: "Suman Kumar".to_string(),
                autodesk_product: "AutoCAD|Civil3D".to_string(),
                company_name: "BHUTUU Technologies".to_string(),
                company_url: "https://github.com/BHUTUU".to_string(),
                series_min: "R24.2".to_string(),
                series_max: "R25.1".to_string(),
                module_file: "StreetViewLocate.dll".to_string(),
            },
            layout: LayoutConfig {
                users_root: PathBuf::from("C:\\Users"),
                plugins_root: PathBuf::from("C:\\ProgramData\\Autodesk\\ApplicationPlugins"),
            },
            temp_root: None,
        }
    }
}

impl InstallerConfig {
    /// Defaults with `STREETVIEW_SETUP_*` environment overrides applied.
    ///
    /// An override that does not parse is logged and skipped; the rest still apply.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(raw) = lookup("STREETVIEW_SETUP_RELEASE_URL") {
            match Url::parse(&raw) {
                Ok(url) => config.release.endpoint = url,
                Err(e) => {
                    warn!(value = %raw, error = %e, "ignoring invalid STREETVIEW_SETUP_RELEASE_URL")
                }
            }
        }
        if let Some(dir) = lookup("STREETVIEW_SETUP_USERS_ROOT") {
            config.layout.users_root = PathBuf::from(dir);
        }
        if let Some(dir) = lookup("STREETVIEW_SETUP_PLUGINS_ROOT") {
            config.layout.plugins_root = PathBuf::from(dir);
        }
        if let Some(dir) = lookup("STREETVIEW_SETUP_TEMP_ROOT") {
            config.temp_root = Some(PathBuf::from(dir));
        }

        config
    }
}
