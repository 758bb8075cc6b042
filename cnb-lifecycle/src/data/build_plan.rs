use serde::{Deserialize, Serialize};
use toml::value::Table;

/// The build plan written by detect.
#[derive(Serialize, Deserialize, Debug, Default, Clone, PartialEq)]
#[must_use]
pub struct BuildPlan {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub provides: Vec<Provide>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub requires: Vec<Require>,
}

impl BuildPlan {
    pub fn new() -> Self {
        Self::default()
    }
}

#[derive(Default)]
#[must_use]
pub struct BuildPlanBuilder {
    provides: Vec<Provide>,
    requires: Vec<Require>,
}

impl BuildPlanBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn provides(mut self, name: impl Into<String>) -> Self {
        self.provides.push(Provide::new(name));
        self
    }

    pub fn requires(mut self, require: Require) -> Self {
        self.requires.push(require);
        self
    }

    pub fn build(self) -> BuildPlan {
        BuildPlan {
            provides: self.provides,
            requires: self.requires,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Provide {
    pub name: String,
}

impl Provide {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Require {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default, skip_serializing_if = "Table::is_empty")]
    pub metadata: Table,
}

impl Require {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: None,
            metadata: Table::new(),
        }
    }

    #[must_use]
    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    /// Convert a Serializable struct and store it as a toml Table for metadata
    pub fn metadata<T: Serialize>(&mut self, metadata: T) -> Result<(), toml::ser::Error> {
        if let toml::Value::Table(table) = toml::Value::try_from(metadata)? {
            self.metadata = table;

            Ok(())
        } else {
            Err(<toml::ser::Error as serde::ser::Error>::custom(
                "Could not be serialized as a map.",
            ))
        }
    }
}
