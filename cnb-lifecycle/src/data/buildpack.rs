//! Data structures for the Buildpack descriptor (buildpack.toml).

use serde::Deserialize;
use std::fmt::{self, Display, Formatter};
use toml::value::Table;

/// Representation of [buildpack.toml](https://github.com/buildpacks/spec/blob/buildpack/v0.4/buildpack.md#buildpacktoml-toml).
///
/// # Example:
/// ```
/// use cnb_lifecycle::data::buildpack::BuildpackDescriptor;
///
/// let toml_str = r#"
/// api = "0.4"
///
/// [buildpack]
/// id = "cnb/yarn"
/// name = "Yarn Buildpack"
/// version = "0.1.0"
///
/// [[stacks]]
/// id = "*"
/// "#;
///
/// let descriptor = toml::from_str::<BuildpackDescriptor>(toml_str).unwrap();
/// assert_eq!(descriptor.buildpack.name, "Yarn Buildpack");
/// ```
#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct BuildpackDescriptor {
    pub api: BuildpackApi,
    pub buildpack: Buildpack,
    #[serde(default)]
    pub stacks: Vec<Stack>,
    #[serde(default)]
    pub metadata: Table,
}

#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub struct Buildpack {
    pub id: String,
    pub name: String,
    pub version: String,
    pub homepage: Option<String>,
    #[serde(default)]
    pub clear_env: bool,
}

#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Stack {
    pub id: String,
    #[serde(default)]
    pub mixins: Vec<String>,
}

/// The Buildpack API version.
///
/// This MUST be in form `<major>.<minor>` or `<major>`, where `<major>` is equivalent to `<major>.0`.
#[derive(Deserialize, Debug, Clone, Copy, Eq, PartialEq)]
#[serde(try_from = "String")]
pub struct BuildpackApi {
    pub major: u32,
    pub minor: u32,
}

impl TryFrom<String> for BuildpackApi {
    type Error = BuildpackApiError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::try_from(value.as_str())
    }
}

impl TryFrom<&str> for BuildpackApi {
    type Error = BuildpackApiError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        // If no minor version is specified, it defaults to `0`.
        let (major, minor) = value.split_once('.').unwrap_or((value, "0"));
        let invalid = || BuildpackApiError::InvalidBuildpackApi(String::from(value));

        Ok(Self {
            major: major.parse().map_err(|_| invalid())?,
            minor: minor.parse().map_err(|_| invalid())?,
        })
    }
}

impl Display for BuildpackApi {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        write!(formatter, "{}.{}", self.major, self.minor)
    }
}

#[derive(thiserror::Error, Debug)]
pub enum BuildpackApiError {
    #[error("Invalid Buildpack API version: `{0}`")]
    InvalidBuildpackApi(String),
}
