//! `PackageContents.xml`: the manifest the host application reads to load the plugin.

use std::path::{Path, PathBuf};

use quick_xml::escape::escape;
use quick_xml::events::Event;
use quick_xml::Reader;
use tracing::{info, warn};

use crate::config::PluginManifest;
use crate::domain::InstallError;

pub const DESCRIPTOR_FILE: &str = "PackageContents.xml";

const ROOT_ELEMENT: &[u8] = b"ApplicationPackage";
const VERSION_ATTR: &[u8] = b"AppVersion";

/// Render the descriptor for `version`, pointing at `module_path` (relative to the bundle).
pub fn render(manifest: &PluginManifest, version: &str, module_path: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="utf-8"?>
<ApplicationPackage
    SchemaVersion="1.0"
    AutodeskProduct="{product}"
    Name="{name}"
    Description="{description}"
    AppVersion="{version}"
    Author="{author}"
    ProductType="Application">

  <CompanyDetails Name="{company}" Url="{company_url}" />

  <Components>

    <RuntimeRequirements
        OS="Win64"
        SeriesMin="{series_min}"
        SeriesMax="{series_max}" />

    <ComponentEntry
        AppName="{name}"
        ModuleName="{module}"
        AppDescription="{app_description}"
        LoadOnAutoCADStartup="True" />

  </Components>

</ApplicationPackage>
"#,
        product = escape(&manifest.autodesk_product),
        name = escape(&manifest.app_name),
        description = escape(&manifest.description),
        version = escape(version),
        author = escape(&manifest.author),
        company = escape(&manifest.company_name),
        company_url = escape(&manifest.company_url),
        series_min = escape(&manifest.series_min),
        series_max = escape(&manifest.series_max),
        module = escape(module_path),
        app_description = escape(&manifest.app_description),
    )
}

/// Write the descriptor into `bundle_dir`, replacing any existing one.
pub fn write(
    bundle_dir: &Path,
    manifest: &PluginManifest,
    version: &str,
    module_path: &str,
) -> Result<PathBuf, InstallError> {
    std::fs::create_dir_all(bundle_dir)
        .map_err(|e| InstallError::filesystem("Failed to create bundle directory", e))?;

    let path = bundle_dir.join(DESCRIPTOR_FILE);
    std::fs::write(&path, render(manifest, version, module_path))
        .map_err(|e| InstallError::filesystem("Failed to write PackageContents.xml", e))?;

    info!(path = %path.display(), version, "descriptor written");
    Ok(path)
}

/// `AppVersion` of the root element, if the descriptor exists and declares one.
pub fn read_version(path: &Path) -> Result<Option<String>, InstallError> {
    let xml = match std::fs::read_to_string(path) {
        Ok(xml) => xml,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(InstallError::filesystem("Failed to read descriptor", e)),
    };
    parse_version(&xml)
}

/// Version of the currently installed plugin. An unreadable descriptor counts as not installed.
pub fn installed_version(path: &Path) -> Option<String> {
    match read_version(path) {
        Ok(version) => version,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "ignoring unreadable descriptor");
            None
        }
    }
}

fn parse_version(xml: &str) -> Result<Option<String>, InstallError> {
    let mut reader = Reader::from_str(xml);
    reader.trim_text(true);

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) | Ok(Event::Empty(e)) => {
                // Only the root element is inspected
                if e.name().as_ref() != ROOT_ELEMENT {
                    return Ok(None);
                }
                for attr in e.attributes() {
                    let attr = attr.map_err(|e| {
                        InstallError::filesystem("Malformed descriptor attribute", e)
                    })?;
                    if attr.key.as_ref() == VERSION_ATTR {
                        let value = attr.unescape_value().map_err(|e| {
                            InstallError::filesystem("Malformed descriptor attribute", e)
                        })?;
                        return Ok(Some(value.into_owned()));
                    }
                }
                return Ok(None);
            }
            Ok(Event::Eof) => return Ok(None),
            Ok(_) => {}
            Err(e) => return Err(InstallError::filesystem("Malformed descriptor", e)),
        }
    }
}
