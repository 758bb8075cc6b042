//! Provides build phase specific types and helpers.

use crate::data::buildpack::BuildpackDescriptor;
use crate::data::buildpack_plan::BuildpackPlan;
use crate::data::launch::Process;
use crate::layer::{Layer, Layers};
use std::path::PathBuf;

/// Context for the build phase execution.
#[derive(Debug, Clone)]
pub struct BuildContext {
    pub app_dir: PathBuf,
    pub buildpack_dir: PathBuf,
    pub stack_id: String,
    pub layers: Layers,
    pub buildpack_plan: BuildpackPlan,
    pub buildpack_descriptor: BuildpackDescriptor,
}

/// Describes the result of the build phase.
///
/// The runtime persists the returned layers, writes `launch.toml` for the processes and echoes the
/// plan back to the lifecycle.
#[derive(Debug, Clone, PartialEq)]
#[must_use]
pub struct BuildResult {
    pub plan: BuildpackPlan,
    pub layers: Vec<Layer>,
    pub processes: Vec<Process>,
}

impl BuildResult {
    pub fn new(plan: BuildpackPlan) -> Self {
        Self {
            plan,
            layers: Vec::new(),
            processes: Vec::new(),
        }
    }

    pub fn layer(mut self, layer: Layer) -> Self {
        self.layers.push(layer);
        self
    }

    pub fn process(mut self, process: Process) -> Self {
        self.processes.push(process);
        self
    }
}
