//! Resolves and installs the dependencies listed in `buildpack.toml`.
//!
//! Dependencies are declared as `[[metadata.dependencies]]` entries:
//!
//! ```toml
//! [[metadata.dependencies]]
//! id = "yarn"
//! name = "Yarn"
//! version = "1.22.19"
//! uri = "https://github.com/yarnpkg/yarn/releases/download/v1.22.19/yarn-v1.22.19.tar.gz"
//! sha256 = "732620bac8b1690d507274f025f3c6cfdc3627a84d9642e38a07452cc00e0f2e"
//! stacks = ["io.buildpacks.stacks.jammy"]
//! strip-components = 1
//! ```

use crate::digest::DigestingReader;
use crate::download::{DownloadError, Downloader};
use crate::tgz;
use cnb_lifecycle::read_toml_file;
use cnb_lifecycle::TomlFileError;
use semver::{Version, VersionReq};
use serde::Deserialize;
use std::collections::HashMap;
use std::fs::File;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

/// A dependency that can be installed into a layer.
#[derive(Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct Dependency {
    pub id: String,
    #[serde(default)]
    pub name: String,
    pub version: String,
    pub sha256: String,
    #[serde(default)]
    pub source_sha256: String,
    pub uri: String,
    #[serde(default)]
    pub source: String,
    #[serde(default)]
    pub stacks: Vec<String>,
    #[serde(default, rename = "strip-components")]
    pub strip_components: usize,
}

#[derive(Deserialize, Debug, Default)]
struct BuildpackToml {
    #[serde(default)]
    metadata: Metadata,
}

#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "kebab-case")]
struct Metadata {
    #[serde(default)]
    dependencies: Vec<Dependency>,
    #[serde(default)]
    default_versions: HashMap<String, String>,
}

#[derive(Debug, Clone, Default)]
pub struct Service {
    downloader: Downloader,
}

impl Service {
    #[must_use]
    pub fn new(downloader: Downloader) -> Self {
        Self { downloader }
    }

    /// Picks the highest version of dependency `id` that supports `stack` and satisfies the
    /// `version` constraint. `"*"`, `""` and `"default"` accept any version, `"default"` prefers
    /// the constraint from `[metadata.default-versions]` when one is declared for `id`.
    pub fn resolve(
        &self,
        path: &Path,
        id: &str,
        version: &str,
        stack: &str,
    ) -> Result<Dependency, Error> {
        let buildpack_toml = read_toml_file::<BuildpackToml>(path).map_err(|source| {
            Error::ReadBuildpackToml {
                path: path.to_path_buf(),
                source,
            }
        })?;

        let constraint = match version {
            "default" => buildpack_toml
                .metadata
                .default_versions
                .get(id)
                .map_or("*", String::as_str),
            "" => "*",
            other => other,
        };

        let version_req =
            VersionReq::parse(constraint).map_err(|source| Error::InvalidVersionConstraint {
                constraint: String::from(constraint),
                source,
            })?;

        let mut candidates = Vec::new();
        for dependency in buildpack_toml.metadata.dependencies {
            if dependency.id != id {
                continue;
            }

            let parsed_version = Version::parse(&dependency.version).map_err(|source| {
                Error::InvalidDependencyVersion {
                    id: dependency.id.clone(),
                    version: dependency.version.clone(),
                    source,
                }
            })?;

            candidates.push((parsed_version, dependency));
        }

        let supported_versions = candidates
            .iter()
            .filter(|(_, dependency)| supports_stack(dependency, stack))
            .map(|(_, dependency)| dependency.version.clone())
            .collect::<Vec<_>>();

        candidates
            .into_iter()
            .filter(|(parsed_version, dependency)| {
                supports_stack(dependency, stack) && version_req.matches(parsed_version)
            })
            .max_by(|(a, _), (b, _)| a.cmp(b))
            .map(|(_, dependency)| dependency)
            .ok_or_else(|| Error::NoCompatibleVersion {
                id: String::from(id),
                constraint: String::from(version),
                stack: String::from(stack),
                supported_versions,
            })
    }

    /// Unpacks the dependency archive into `layer_path` and verifies its checksum.
    ///
    /// The archive is read from `<cnb_path>/dependencies/<sha256>/<file name of uri>` when the
    /// buildpack ships it, otherwise it is downloaded from the dependency URI.
    pub fn install(
        &self,
        dependency: &Dependency,
        cnb_path: &Path,
        layer_path: &Path,
    ) -> Result<(), Error> {
        let offline_path = offline_archive_path(dependency, cnb_path);

        let archive: Box<dyn Read> = if offline_path.is_file() {
            Box::new(File::open(&offline_path).map_err(Error::ReadArchive)?)
        } else {
            Box::new(self.downloader.open(&dependency.uri)?)
        };

        let mut reader = DigestingReader::new(archive);
        tgz::extract(&mut reader, layer_path, dependency.strip_components)?;
        // The decompressor can stop before the end of the archive, the digest needs all of it.
        io::copy(&mut reader, &mut io::sink()).map_err(Error::ReadArchive)?;

        let actual = reader.hex_digest();
        if actual == dependency.sha256 {
            Ok(())
        } else {
            Err(Error::ChecksumMismatch {
                expected: dependency.sha256.clone(),
                actual,
            })
        }
    }
}

fn supports_stack(dependency: &Dependency, stack: &str) -> bool {
    dependency
        .stacks
        .iter()
        .any(|supported| supported == stack || supported == "*")
}

fn offline_archive_path(dependency: &Dependency, cnb_path: &Path) -> PathBuf {
    let file_name = dependency
        .uri
        .split(['?', '#'])
        .next()
        .and_then(|uri| uri.rsplit('/').next())
        .unwrap_or_default();

    cnb_path
        .join("dependencies")
        .join(&dependency.sha256)
        .join(file_name)
}

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("failed to parse buildpack.toml: {}: {source}", path.display())]
    ReadBuildpackToml {
        path: PathBuf,
        source: TomlFileError,
    },

    #[error("failed to parse version constraint {constraint:?}: {source}")]
    InvalidVersionConstraint {
        constraint: String,
        source: semver::Error,
    },

    #[error("failed to parse version {version:?} of dependency {id:?}: {source}")]
    InvalidDependencyVersion {
        id: String,
        version: String,
        source: semver::Error,
    },

    #[error(
        "failed to satisfy {id:?} dependency version constraint {constraint:?}: no compatible versions on {stack:?} stack. Supported versions are: [{}]",
        supported_versions.join(", ")
    )]
    NoCompatibleVersion {
        id: String,
        constraint: String,
        stack: String,
        supported_versions: Vec<String>,
    },

    #[error("failed to fetch dependency: {0}")]
    Download(#[from] DownloadError),

    #[error("failed to read dependency archive: {0}")]
    ReadArchive(io::Error),

    #[error("failed to extract dependency archive: {0}")]
    Extract(#[from] tgz::Error),

    #[error("checksum does not match: expected {expected}, got {actual}")]
    ChecksumMismatch { expected: String, actual: String },
}
