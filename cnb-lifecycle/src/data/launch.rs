use serde::{Deserialize, Serialize};

/// Data Structure for the launch.toml file.
#[derive(Deserialize, Serialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct Launch {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub processes: Vec<Process>,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct Process {
    pub r#type: String,
    pub command: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub args: Vec<String>,
    #[serde(default)]
    pub direct: bool,
}

impl Process {
    /// Constructs a process that the lifecycle runs through a shell, without extra arguments.
    pub fn new(r#type: impl Into<String>, command: impl Into<String>) -> Self {
        Self {
            r#type: r#type.into(),
            command: command.into(),
            args: Vec::new(),
            direct: false,
        }
    }
}
