//! Provides detect phase specific types and helpers.

use crate::data::build_plan::BuildPlan;
use crate::data::buildpack::BuildpackDescriptor;
use std::path::PathBuf;

/// Context for the detect phase execution.
#[derive(Debug, Clone)]
pub struct DetectContext {
    pub app_dir: PathBuf,
    pub buildpack_dir: PathBuf,
    pub stack_id: String,
    pub buildpack_descriptor: BuildpackDescriptor,
}

/// Describes the result of the detect phase.
///
/// Besides indicating passing or failing detection, it also contains detect phase output such as
/// the build plan.
#[derive(Debug, Clone, PartialEq)]
#[must_use]
pub enum DetectResult {
    Pass { build_plan: Option<BuildPlan> },
    Fail,
}

impl DetectResult {
    /// Detection passed without a build plan.
    pub fn pass() -> Self {
        DetectResult::Pass { build_plan: None }
    }

    /// Detection passed with the given build plan.
    pub fn pass_with_build_plan(build_plan: BuildPlan) -> Self {
        DetectResult::Pass {
            build_plan: Some(build_plan),
        }
    }

    /// This buildpack does not participate in the build.
    pub fn fail() -> Self {
        DetectResult::Fail
    }
}
