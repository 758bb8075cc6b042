//! In-memory environment variable modifications of a layer.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// Environment variable modifications of a Cloud Native Buildpack layer.
///
/// Entries are keyed by `<NAME>.<behavior>`, which is also the name of the file the runtime writes
/// to the matching `env`, `env.build` or `env.launch` directory of the layer. Supported behaviors
/// are `append`, `prepend`, `override`, `default` and `delim`.
///
/// ```
/// use cnb_lifecycle::environment::Environment;
///
/// let mut environment = Environment::new();
/// environment.append("PATH", "/layers/yarn", ":");
///
/// assert_eq!(environment.get("PATH.append"), Some("/layers/yarn"));
/// assert_eq!(environment.get("PATH.delim"), Some(":"));
/// ```
#[derive(Eq, PartialEq, Debug, Default, Clone)]
pub struct Environment(BTreeMap<String, String>);

impl Environment {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `value` to the variable `name`, separated from any previous value by `delim`.
    pub fn append(&mut self, name: &str, value: impl Into<String>, delim: impl Into<String>) {
        self.insert(name, "append", value);
        self.insert(name, "delim", delim);
    }

    /// Prepends `value` to the variable `name`, separated from any previous value by `delim`.
    pub fn prepend(&mut self, name: &str, value: impl Into<String>, delim: impl Into<String>) {
        self.insert(name, "prepend", value);
        self.insert(name, "delim", delim);
    }

    /// Sets the variable `name` to `value`, replacing any previous value.
    pub fn override_value(&mut self, name: &str, value: impl Into<String>) {
        self.insert(name, "override", value);
    }

    /// Sets the variable `name` to `value` unless it is already set.
    pub fn default_value(&mut self, name: &str, value: impl Into<String>) {
        self.insert(name, "default", value);
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(key, value)| (key.as_str(), value.as_str()))
    }

    /// Writes one file per entry into the given directory, creating it if necessary.
    ///
    /// Files in the directory that have no matching entry are left untouched. Nothing is written
    /// for an empty environment.
    pub fn write_to_env_dir(&self, path: impl AsRef<Path>) -> Result<(), std::io::Error> {
        if self.is_empty() {
            return Ok(());
        }

        fs::create_dir_all(path.as_ref())?;

        for (file_name, value) in &self.0 {
            fs::write(path.as_ref().join(file_name), value)?;
        }

        Ok(())
    }

    fn insert(&mut self, name: &str, behavior: &str, value: impl Into<String>) {
        self.0.insert(format!("{name}.{behavior}"), value.into());
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Environment {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self(
            iter.into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        )
    }
}
