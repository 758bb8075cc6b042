use serde::{Deserialize, Serialize};
use toml::value::Table;

/// Describes the `<layers>/<layer>.toml` file.
///
/// Buildpack API 0.4 keeps the layer flags at the top level of the file, next to the
/// `[metadata]` table.
///
/// ```
/// use cnb_lifecycle::data::layer_content_metadata::LayerContentMetadata;
///
/// let layer: LayerContentMetadata = toml::from_str(
///     r#"
///     launch = true
///
///     [metadata]
///     cache_sha = "abc"
///     "#,
/// )
/// .unwrap();
///
/// assert!(layer.launch);
/// assert!(!layer.cache);
/// assert_eq!(layer.metadata.get("cache_sha").and_then(toml::Value::as_str), Some("abc"));
/// ```
#[derive(Debug, Default, Clone, PartialEq, Deserialize, Serialize)]
pub struct LayerContentMetadata {
    /// Whether the layer is intended for launch.
    #[serde(default)]
    pub launch: bool,

    /// Whether the layer is intended for build.
    #[serde(default)]
    pub build: bool,

    /// Whether the layer is cached.
    #[serde(default)]
    pub cache: bool,

    /// Metadata that describes the layer contents.
    #[serde(default)]
    pub metadata: Table,
}
