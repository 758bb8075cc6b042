use serde::Deserialize;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Extracts a version string from a configuration file of the app.
pub(crate) trait VersionParser {
    /// Returns an empty string when the file exists but does not declare a version.
    fn parse_version(&self, path: &Path) -> Result<String, VersionParseError>;
}

/// Reads `engines.node` from a `package.json` file.
pub(crate) struct PackageJsonParser;

/// Reads `yarn.version` from a `buildpack.yml` file.
pub(crate) struct BuildpackYmlParser;

#[derive(Deserialize)]
struct PackageJson {
    engines: Option<Engines>,
}

#[derive(Deserialize)]
struct Engines {
    node: Option<String>,
}

#[derive(Deserialize)]
struct BuildpackYml {
    yarn: Option<YarnConfig>,
}

#[derive(Deserialize)]
struct YarnConfig {
    // Plain scalars such as `1.10` deserialize to their source text.
    version: Option<String>,
}

impl VersionParser for PackageJsonParser {
    fn parse_version(&self, path: &Path) -> Result<String, VersionParseError> {
        let contents = read_file(path)?;

        let package_json: PackageJson =
            serde_json::from_str(&contents).map_err(|source| VersionParseError::Json {
                path: path.to_path_buf(),
                source,
            })?;

        Ok(package_json
            .engines
            .and_then(|engines| engines.node)
            .unwrap_or_default())
    }
}

impl VersionParser for BuildpackYmlParser {
    fn parse_version(&self, path: &Path) -> Result<String, VersionParseError> {
        let contents = read_file(path)?;

        if contents.trim().is_empty() {
            return Ok(String::new());
        }

        let buildpack_yml: BuildpackYml =
            serde_yaml::from_str(&contents).map_err(|source| VersionParseError::Yaml {
                path: path.to_path_buf(),
                source,
            })?;

        Ok(buildpack_yml
            .yarn
            .and_then(|yarn| yarn.version)
            .unwrap_or_default())
    }
}

fn read_file(path: &Path) -> Result<String, VersionParseError> {
    fs::read_to_string(path).map_err(|source| {
        if source.kind() == io::ErrorKind::NotFound {
            VersionParseError::NotFound {
                path: path.to_path_buf(),
            }
        } else {
            VersionParseError::Io {
                path: path.to_path_buf(),
                source,
            }
        }
    })
}

#[derive(thiserror::Error, Debug)]
pub(crate) enum VersionParseError {
    #[error("failed to read {}: no such file", path.display())]
    NotFound { path: PathBuf },

    #[error("failed to read {}: {source}", path.display())]
    Io { path: PathBuf, source: io::Error },

    #[error("failed to parse {}: {source}", path.display())]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("failed to parse {}: {source}", path.display())]
    Yaml {
        path: PathBuf,
        source: serde_yaml::Error,
    },
}

impl VersionParseError {
    pub(crate) fn is_not_found(&self) -> bool {
        matches!(self, VersionParseError::NotFound { .. })
    }
}
