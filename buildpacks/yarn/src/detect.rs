use crate::version_parser::VersionParser;
use crate::YarnBuildpackError;
use cnb_lifecycle::data::build_plan::{BuildPlanBuilder, Require};
use cnb_lifecycle::detect::{DetectContext, DetectResult};
use serde::{Deserialize, Serialize};

pub(crate) const PLAN_DEPENDENCY_YARN: &str = "yarn";
pub(crate) const PLAN_DEPENDENCY_NODE: &str = "node";

/// Metadata of the `node` requirement.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub(crate) struct BuildPlanMetadata {
    #[serde(rename = "version-source", skip_serializing_if = "Option::is_none")]
    pub(crate) version_source: Option<String>,
    pub(crate) build: bool,
    pub(crate) launch: bool,
}

pub(crate) fn detect(
    context: &DetectContext,
    package_json_parser: &impl VersionParser,
    buildpack_yml_parser: &impl VersionParser,
) -> Result<DetectResult, YarnBuildpackError> {
    let mut build_plan = BuildPlanBuilder::new().provides(PLAN_DEPENDENCY_YARN);

    let yarn_version =
        match buildpack_yml_parser.parse_version(&context.app_dir.join("buildpack.yml")) {
            Err(error) if error.is_not_found() => String::new(),
            other => other?,
        };

    if !yarn_version.is_empty() {
        build_plan = build_plan.requires(Require::new(PLAN_DEPENDENCY_YARN).version(yarn_version));
    }

    let node_version =
        match package_json_parser.parse_version(&context.app_dir.join("package.json")) {
            Err(error) if error.is_not_found() => return Ok(DetectResult::fail()),
            other => other?,
        };

    let mut node_requirement = Require::new(PLAN_DEPENDENCY_NODE);
    let mut metadata = BuildPlanMetadata {
        version_source: None,
        build: true,
        launch: true,
    };

    if !node_version.is_empty() {
        node_requirement = node_requirement.version(node_version);
        metadata.version_source = Some(String::from("package.json"));
    }

    node_requirement.metadata(metadata)?;

    Ok(DetectResult::pass_with_build_plan(
        build_plan.requires(node_requirement).build(),
    ))
}
