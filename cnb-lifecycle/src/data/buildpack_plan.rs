use serde::{Deserialize, Serialize};
use toml::value::Table;

/// The buildpack plan handed to build, filtered down to the entries this buildpack provides.
#[derive(Serialize, Deserialize, Debug, Default, Clone, PartialEq)]
pub struct BuildpackPlan {
    #[serde(default)]
    pub entries: Vec<Entry>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Entry {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default)]
    pub metadata: Table,
}

impl Entry {
    /// Deserializes Metadata to a type T that implements Deserialize
    pub fn metadata<'de, T>(&self) -> Result<T, toml::de::Error>
    where
        T: Deserialize<'de>,
    {
        // serde::de::Deserializer is not implemented for toml::map::Map, so need to clone() here
        toml::Value::Table(self.metadata.clone()).try_into()
    }
}
