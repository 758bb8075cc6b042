//! Layers of a build and the metadata persisted next to them.

use crate::data::layer_content_metadata::LayerContentMetadata;
use crate::environment::Environment;
use crate::toml_file::{read_toml_file, write_toml_file, TomlFileError};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use toml::value::Table;

/// The layers directory of the current build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layers {
    pub path: PathBuf,
}

/// Used to specify layer availability based on buildpack phase.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct LayerTypes {
    pub launch: bool,
    pub build: bool,
    pub cache: bool,
}

impl LayerTypes {
    pub const LAUNCH: LayerTypes = LayerTypes {
        launch: true,
        build: false,
        cache: false,
    };
}

impl Layers {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Returns a handle to the layer with the given name.
    ///
    /// Flags and metadata are restored from `<layers>/<name>.toml` when that file exists, the
    /// requested types are then enabled on top. The layer directory is not created.
    pub fn get(&self, name: &str, types: LayerTypes) -> Result<Layer, LayerError> {
        let metadata_path = self.path.join(format!("{name}.toml"));

        let content_metadata = match read_toml_file::<LayerContentMetadata>(&metadata_path) {
            Err(TomlFileError::IoError(io_error))
                if io_error.kind() == std::io::ErrorKind::NotFound =>
            {
                LayerContentMetadata::default()
            }
            other => other.map_err(|source| LayerError::ReadLayerMetadata {
                path: metadata_path,
                source,
            })?,
        };

        Ok(Layer {
            name: String::from(name),
            path: self.path.join(name),
            metadata: content_metadata.metadata,
            shared_env: Environment::new(),
            build_env: Environment::new(),
            launch_env: Environment::new(),
            launch: content_metadata.launch || types.launch,
            build: content_metadata.build || types.build,
            cache: content_metadata.cache || types.cache,
        })
    }
}

/// A layer of the current build.
///
/// Modifications are kept in memory and persisted by the runtime once the build returns, with the
/// exception of [`Layer::reset`] which also clears the layer directory right away.
#[derive(Debug, Clone, PartialEq)]
pub struct Layer {
    pub name: String,
    pub path: PathBuf,
    pub metadata: Table,
    pub shared_env: Environment,
    pub build_env: Environment,
    pub launch_env: Environment,
    pub launch: bool,
    pub build: bool,
    pub cache: bool,
}

impl Layer {
    /// Clears metadata and environments and replaces the layer directory with an empty one.
    /// Layer types are kept.
    pub fn reset(&mut self) -> Result<(), LayerError> {
        self.metadata = Table::new();
        self.shared_env = Environment::new();
        self.build_env = Environment::new();
        self.launch_env = Environment::new();

        recreate_dir(&self.path).map_err(|source| LayerError::ResetLayer {
            path: self.path.clone(),
            source,
        })
    }

    /// Writes `<layers>/<name>.toml` and the environment directories of this layer.
    pub(crate) fn write(&self, layers_dir: &Path) -> Result<(), LayerError> {
        let metadata_path = layers_dir.join(format!("{}.toml", self.name));

        write_toml_file(
            &LayerContentMetadata {
                launch: self.launch,
                build: self.build,
                cache: self.cache,
                metadata: self.metadata.clone(),
            },
            &metadata_path,
        )
        .map_err(|source| LayerError::WriteLayerMetadata {
            path: metadata_path,
            source,
        })?;

        for (dir_name, environment) in [
            ("env", &self.shared_env),
            ("env.build", &self.build_env),
            ("env.launch", &self.launch_env),
        ] {
            let env_dir = self.path.join(dir_name);

            environment
                .write_to_env_dir(&env_dir)
                .map_err(|source| LayerError::WriteLayerEnvironment {
                    path: env_dir,
                    source,
                })?;
        }

        Ok(())
    }
}

/// Replaces `path` with an empty directory. A missing directory is created.
fn recreate_dir(path: &Path) -> io::Result<()> {
    match fs::remove_dir_all(path) {
        Err(error) if error.kind() != io::ErrorKind::NotFound => Err(error),
        _ => fs::create_dir_all(path),
    }
}

#[derive(thiserror::Error, Debug)]
pub enum LayerError {
    #[error("failed to parse layer content metadata: {}: {source}", path.display())]
    ReadLayerMetadata {
        path: PathBuf,
        source: TomlFileError,
    },

    #[error("failed to reset layer: {}: {source}", path.display())]
    ResetLayer {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to write layer content metadata: {}: {source}", path.display())]
    WriteLayerMetadata {
        path: PathBuf,
        source: TomlFileError,
    },

    #[error("failed to write layer environment: {}: {source}", path.display())]
    WriteLayerEnvironment {
        path: PathBuf,
        source: std::io::Error,
    },
}
