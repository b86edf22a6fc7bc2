use std::collections::BTreeMap;

use futures::Stream;
use futures::TryStreamExt;
use reqwest::header::{ACCEPT, USER_AGENT};
use reqwest::Client;
use thiserror::Error;
use tracing::{debug, info};

use super::models::GitHubRelease;
use crate::config::ReleaseConfig;
use crate::domain::{AssetRef, InstallError, ReleaseInfo};
use crate::utils::normalize_version;

const GITHUB_JSON: &str = "application/vnd.github+json";

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("Release endpoint returned HTTP {0}")]
    Status(reqwest::StatusCode),

    #[error("Invalid response format: {0}")]
    InvalidResponse(String),

    #[error("Asset not found on release: {0}")]
    MissingAsset(String),
}

pub type Result<T> = std::result::Result<T, ApiError>;

impl From<ApiError> for InstallError {
    fn from(err: ApiError) -> Self {
        match err {
            ApiError::RequestError(_) | ApiError::Status(_) => {
                InstallError::Network(err.to_string())
            }
            ApiError::InvalidResponse(_) | ApiError::MissingAsset(_) => {
                InstallError::ReleaseFormat(err.to_string())
            }
        }
    }
}

#[derive(Clone)]
pub struct ReleaseClient {
    config: ReleaseConfig,
    client: Client,
}

impl ReleaseClient {
    pub fn new(config: ReleaseConfig) -> Self {
        Self {
            config,
            client: Client::new(),
        }
    }

    /// Query the release endpoint and pick out the two installer archives.
    pub async fn latest_release(&self) -> Result<ReleaseInfo> {
        info!(endpoint = %self.config.endpoint, "fetching latest release");

        let response = self
            .client
            .get(self.config.endpoint.clone())
            .header(USER_AGENT, &self.config.user_agent)
            .header(ACCEPT, GITHUB_JSON)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ApiError::Status(response.status()));
        }

        let body = response.bytes().await?;
        let release: GitHubRelease = serde_json::from_slice(&body)
            .map_err(|e| ApiError::InvalidResponse(format!("JSON decode error: {}", e)))?;

        let info = resolve_assets(&release, &self.config)?;
        info!(version = %info.version, "resolved latest release");
        Ok(info)
    }

    /// Open a download stream for an asset URL.
    /// Returns (declared content length, chunk stream)
    pub async fn download_stream(
        &self,
        download_url: &str,
    ) -> Result<(Option<u64>, impl Stream<Item = Result<bytes::Bytes>>)> {
        debug!(url = download_url, "opening download stream");

        let response = self
            .client
            .get(download_url)
            .header(USER_AGENT, &self.config.user_agent)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ApiError::Status(response.status()));
        }

        let total_size = response.content_length();
        let stream = response.bytes_stream().map_err(ApiError::RequestError);

        Ok((total_size, stream))
    }
}

/// Match the resource archive by exact name and the plugin archive by prefix.
///
/// When several plugin archives are attached, the one named after the release
/// version wins, otherwise the last prefix match.
pub fn resolve_assets(release: &GitHubRelease, config: &ReleaseConfig) -> Result<ReleaseInfo> {
    let version = normalize_version(&release.tag_name, &config.plugin_asset_prefix);
    if version.is_empty() {
        return Err(ApiError::InvalidResponse("release has no tag_name".to_string()));
    }

    let assets: BTreeMap<String, String> = release
        .assets
        .iter()
        .map(|a| (a.name.clone(), a.browser_download_url.clone()))
        .collect();

    let resource = assets
        .get_key_value(&config.resource_asset)
        .map(|(name, url)| AssetRef {
            name: name.clone(),
            url: url.clone(),
        })
        .ok_or_else(|| ApiError::MissingAsset(config.resource_asset.clone()))?;

    let versioned_name = format!("{}{}.zip", config.plugin_asset_prefix, version);
    let plugin = release
        .assets
        .iter()
        .find(|a| a.name == versioned_name)
        .or_else(|| {
            release
                .assets
                .iter()
                .rev()
                .find(|a| a.name.starts_with(&config.plugin_asset_prefix))
        })
        .map(|a| AssetRef {
            name: a.name.clone(),
            url: a.browser_download_url.clone(),
        })
        .ok_or_else(|| ApiError::MissingAsset(format!("{}*", config.plugin_asset_prefix)))?;

    Ok(ReleaseInfo {
        version,
        assets,
        resource,
        plugin,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::models::GitHubAsset;
    use crate::config::InstallerConfig;
    use serde_json::json;

    fn asset(name: &str) -> GitHubAsset {
        GitHubAsset {
            name: name.to_string(),
            browser_download_url: format!("https://example.test/{}", name),
            size: 0,
        }
    }

    fn release_config(endpoint: &str) -> ReleaseConfig {
        let mut config = InstallerConfig::default().release;
        config.endpoint = endpoint.parse().unwrap();
        config
    }

    #[test]
    fn test_resolve_assets_matches_exact_and_prefix() {
        let release = GitHubRelease {
            tag_name: "StreetViewLocate_V2.1".to_string(),
            assets: vec![
                asset("README.txt"),
                asset("StreetViewBySumanKumarBHUTUU.zip"),
                asset("StreetViewLocate_V2.1.zip"),
            ],
        };
        let info = resolve_assets(&release, &InstallerConfig::default().release).unwrap();

        assert_eq!(info.version, "2.1");
        assert_eq!(info.resource.name, "StreetViewBySumanKumarBHUTUU.zip");
        assert_eq!(info.plugin.url, "https://example.test/StreetViewLocate_V2.1.zip");
        assert_eq!(info.assets.len(), 3);
    }

    #[test]
    fn test_resolve_assets_requires_both_archives() {
        let config = InstallerConfig::default().release;

        let no_plugin = GitHubRelease {
            tag_name: "2.1".to_string(),
            assets: vec![asset("StreetViewBySumanKumarBHUTUU.zip")],
        };
        let err = resolve_assets(&no_plugin, &config).unwrap_err();
        assert!(matches!(
            InstallError::from(err),
            InstallError::ReleaseFormat(_)
        ));

        // Resource archive must match exactly, a prefix is not enough
        let no_resource = GitHubRelease {
            tag_name: "2.1".to_string(),
            assets: vec![
                asset("StreetViewBySumanKumarBHUTUU_old.zip"),
                asset("StreetViewLocate_V2.1.zip"),
            ],
        };
        let err = resolve_assets(&no_resource, &config).unwrap_err();
        assert!(matches!(err, ApiError::MissingAsset(_)));
    }

    #[test]
    fn test_resolve_assets_prefers_plugin_matching_version() {
        let config = InstallerConfig::default().release;
        let release = GitHubRelease {
            tag_name: "StreetViewLocate_V2.1".to_string(),
            assets: vec![
                asset("StreetViewBySumanKumarBHUTUU.zip"),
                asset("StreetViewLocate_V2.1.zip"),
                asset("StreetViewLocate_V2.0.zip"),
            ],
        };
        let info = resolve_assets(&release, &config).unwrap();
        assert_eq!(info.plugin.name, "StreetViewLocate_V2.1.zip");

        // No archive named after the tag: the last prefix match is used
        let release = GitHubRelease {
            tag_name: "StreetViewLocate_V2.2".to_string(),
            assets: vec![
                asset("StreetViewBySumanKumarBHUTUU.zip"),
                asset("StreetViewLocate_V2.0.zip"),
                asset("StreetViewLocate_V2.1.zip"),
            ],
        };
        let info = resolve_assets(&release, &config).unwrap();
        assert_eq!(info.plugin.name, "StreetViewLocate_V2.1.zip");
    }

    #[tokio::test]
    async fn test_latest_release_parses_github_payload() {
        let mut server = mockito::Server::new_async().await;
        let body = json!({
            "tag_name": "StreetViewLocate_V2.1",
            "assets": [
                {"name": "StreetViewBySumanKumarBHUTUU.zip", "browser_download_url": "https://dl.test/a.zip", "size": 10},
                {"name": "StreetViewLocate_V2.1.zip", "browser_download_url": "https://dl.test/b.zip", "size": 20}
            ]
        });
        let mock = server
            .mock("GET", "/releases/latest")
            .match_header("user-agent", mockito::Matcher::Any)
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(body.to_string())
            .create_async()
            .await;

        let client = ReleaseClient::new(release_config(&format!(
            "{}/releases/latest",
            server.url()
        )));
        let info = client.latest_release().await.unwrap();

        mock.assert_async().await;
        assert_eq!(info.version, "2.1");
        assert_eq!(info.resource.url, "https://dl.test/a.zip");
        assert_eq!(info.plugin.url, "https://dl.test/b.zip");
    }

    #[tokio::test]
    async fn test_latest_release_http_error_is_network_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/releases/latest")
            .with_status(503)
            .create_async()
            .await;

        let client = ReleaseClient::new(release_config(&format!(
            "{}/releases/latest",
            server.url()
        )));
        let err = client.latest_release().await.unwrap_err();
        assert!(matches!(InstallError::from(err), InstallError::Network(_)));
    }

    #[tokio::test]
    async fn test_latest_release_garbage_body_is_format_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/releases/latest")
            .with_status(200)
            .with_body("<html>rate limited</html>")
            .create_async()
            .await;

        let client = ReleaseClient::new(release_config(&format!(
            "{}/releases/latest",
            server.url()
        )));
        let err = client.latest_release().await.unwrap_err();
        assert!(matches!(
            InstallError::from(err),
            InstallError::ReleaseFormat(_)
        ));
    }
}
