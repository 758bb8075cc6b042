use crate::cache::CacheMatcher;
use crate::clock::{format_timestamp, Clock};
use crate::detect::PLAN_DEPENDENCY_YARN;
use crate::log_emitter::LogEmitter;
use crate::YarnBuildpackError;
use cnb_commons::postal::{self, Dependency};
use cnb_lifecycle::build::{BuildContext, BuildResult};
use cnb_lifecycle::data::launch::Process;
use cnb_lifecycle::layer::LayerTypes;
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::Path;
use toml::value::Table;

const YARN_LAYER_NAME: &str = "yarn";
const CACHE_SHA_KEY: &str = "cache_sha";

#[cfg(target_family = "windows")]
const PATH_LIST_SEPARATOR: &str = ";";
#[cfg(not(target_family = "windows"))]
const PATH_LIST_SEPARATOR: &str = ":";

/// Resolves dependencies from `buildpack.toml` and installs them into layers.
pub(crate) trait DependencyService {
    fn resolve(
        &self,
        path: &Path,
        name: &str,
        version: &str,
        stack: &str,
    ) -> Result<Dependency, postal::Error>;

    fn install(
        &self,
        dependency: &Dependency,
        cnb_path: &Path,
        layer_path: &Path,
    ) -> Result<(), postal::Error>;
}

impl DependencyService for postal::Service {
    fn resolve(
        &self,
        path: &Path,
        name: &str,
        version: &str,
        stack: &str,
    ) -> Result<Dependency, postal::Error> {
        postal::Service::resolve(self, path, name, version, stack)
    }

    fn install(
        &self,
        dependency: &Dependency,
        cnb_path: &Path,
        layer_path: &Path,
    ) -> Result<(), postal::Error> {
        postal::Service::install(self, dependency, cnb_path, layer_path)
    }
}

/// Metadata of the yarn layer, stored in `yarn.toml`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub(crate) struct YarnLayerMetadata {
    pub(crate) built_at: String,
    pub(crate) cache_sha: String,
}

impl YarnLayerMetadata {
    fn into_table(self) -> Result<Table, toml::ser::Error> {
        match toml::Value::try_from(self)? {
            toml::Value::Table(table) => Ok(table),
            _ => Err(<toml::ser::Error as serde::ser::Error>::custom(
                "layer metadata must serialize to a table",
            )),
        }
    }
}

pub(crate) fn build<W: Write>(
    context: &BuildContext,
    dependency_service: &impl DependencyService,
    cache_matcher: &impl CacheMatcher,
    clock: &Clock,
    log_emitter: &mut LogEmitter<W>,
) -> Result<BuildResult, YarnBuildpackError> {
    log_emitter.buildpack_title(
        &context.buildpack_descriptor.buildpack.name,
        &context.buildpack_descriptor.buildpack.version,
    );

    let mut yarn_layer = context.layers.get(YARN_LAYER_NAME, LayerTypes::LAUNCH)?;

    // Any version. A yarn version pinned through buildpack.yml is not honored here.
    let dependency = dependency_service.resolve(
        &context.buildpack_dir.join("buildpack.toml"),
        PLAN_DEPENDENCY_YARN,
        "*",
        &context.stack_id,
    )?;

    if cache_matcher.matches(&yarn_layer.metadata, CACHE_SHA_KEY, &dependency.sha256) {
        log_emitter.reusing_layer(&yarn_layer.path);
    } else {
        yarn_layer.reset()?;

        log_emitter.process("Executing build process");
        log_emitter.subprocess(format!("Installing Yarn {}", dependency.version));

        let then = clock.now();
        dependency_service.install(&dependency, &context.buildpack_dir, &yarn_layer.path)?;
        log_emitter.completion_time((clock.now() - then).to_std().unwrap_or_default());

        yarn_layer.metadata = YarnLayerMetadata {
            built_at: format_timestamp(&clock.now()),
            cache_sha: dependency.sha256,
        }
        .into_table()?;

        yarn_layer.shared_env.append(
            "PATH",
            yarn_layer.path.to_string_lossy(),
            PATH_LIST_SEPARATOR,
        );
    }

    Ok(BuildResult::new(context.buildpack_plan.clone())
        .layer(yarn_layer)
        .process(Process::new("web", "yarn start")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::CacheHandler;
    use crate::test_support::{buildpack_descriptor, FakeCacheMatcher, FakeDependencyService};
    use chrono::{DateTime, TimeZone, Utc};
    use cnb_commons::log::Logger;
    use cnb_lifecycle::data::buildpack_plan::{BuildpackPlan, Entry};
    use cnb_lifecycle::environment::Environment;
    use cnb_lifecycle::layer::{Layer, Layers};
    use std::fs;
    use std::path::PathBuf;
    use tempfile::TempDir;

    struct TestDirs {
        layers: TempDir,
        app: TempDir,
        cnb: TempDir,
    }

    impl TestDirs {
        fn new() -> Self {
            Self {
                layers: tempfile::tempdir().unwrap(),
                app: tempfile::tempdir().unwrap(),
                cnb: tempfile::tempdir().unwrap(),
            }
        }

        fn context(&self) -> BuildContext {
            BuildContext {
                app_dir: self.app.path().to_path_buf(),
                buildpack_dir: self.cnb.path().to_path_buf(),
                stack_id: String::from("some-stack"),
                layers: Layers::new(self.layers.path()),
                buildpack_plan: plan(),
                buildpack_descriptor: buildpack_descriptor(),
            }
        }

        fn yarn_layer_path(&self) -> PathBuf {
            self.layers.path().join("yarn")
        }
    }

    fn plan() -> BuildpackPlan {
        BuildpackPlan {
            entries: vec![Entry {
                name: String::from("yarn"),
                version: None,
                metadata: Table::new(),
            }],
        }
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2020, 3, 1, 12, 30, 0).unwrap()
    }

    fn fixed_clock() -> Clock {
        Clock::new(now)
    }

    fn emitter() -> LogEmitter<Vec<u8>> {
        LogEmitter::new(Logger::new(Vec::new()))
    }

    fn output(emitter: LogEmitter<Vec<u8>>) -> String {
        String::from_utf8(emitter.into_inner()).unwrap()
    }

    fn dependency() -> Dependency {
        Dependency {
            id: String::from("yarn"),
            name: String::from("Yarn"),
            sha256: String::from("some-sha"),
            source: String::from("some-source"),
            source_sha256: String::from("some-source-sha"),
            stacks: vec![String::from("some-stack")],
            uri: String::from("some-uri"),
            version: String::from("some-version"),
            strip_components: 0,
        }
    }

    #[test]
    fn installs_yarn_into_a_fresh_layer() {
        let dirs = TestDirs::new();
        let dependency_service = FakeDependencyService::resolving(dependency());
        let mut log_emitter = emitter();

        let result = build(
            &dirs.context(),
            &dependency_service,
            &FakeCacheMatcher::returning(false),
            &fixed_clock(),
            &mut log_emitter,
        )
        .unwrap();

        let layer_path = dirs.yarn_layer_path();
        let mut metadata = Table::new();
        metadata.insert(
            String::from("built_at"),
            toml::Value::String(String::from("2020-03-01T12:30:00.000000000Z")),
        );
        metadata.insert(
            String::from("cache_sha"),
            toml::Value::String(String::from("some-sha")),
        );

        assert_eq!(
            result,
            BuildResult {
                plan: plan(),
                layers: vec![Layer {
                    name: String::from("yarn"),
                    path: layer_path.clone(),
                    metadata,
                    shared_env: Environment::from_iter([
                        ("PATH.append", layer_path.to_string_lossy().to_string()),
                        ("PATH.delim", String::from(":")),
                    ]),
                    build_env: Environment::new(),
                    launch_env: Environment::new(),
                    launch: true,
                    build: false,
                    cache: false,
                }],
                processes: vec![Process::new("web", "yarn start")],
            }
        );

        assert_eq!(
            dependency_service.resolve_calls(),
            vec![(
                dirs.cnb.path().join("buildpack.toml"),
                String::from("yarn"),
                String::from("*"),
                String::from("some-stack"),
            )]
        );
        assert_eq!(
            dependency_service.install_calls(),
            vec![(dependency(), dirs.cnb.path().to_path_buf(), layer_path.clone())]
        );

        assert_eq!(
            output(log_emitter),
            "Yarn Buildpack 1.2.3\n  Executing build process\n    Installing Yarn some-version\n      Completed in 0s\n\n"
        );
    }

    #[test]
    fn cache_matcher_receives_layer_metadata_and_dependency_sha() {
        let dirs = TestDirs::new();
        fs::write(
            dirs.layers.path().join("yarn.toml"),
            "launch = true\n\n[metadata]\ncache_sha = \"previous-sha\"\n",
        )
        .unwrap();
        let cache_matcher = FakeCacheMatcher::returning(false);

        build(
            &dirs.context(),
            &FakeDependencyService::resolving(dependency()),
            &cache_matcher,
            &fixed_clock(),
            &mut emitter(),
        )
        .unwrap();

        let mut previous_metadata = Table::new();
        previous_metadata.insert(
            String::from("cache_sha"),
            toml::Value::String(String::from("previous-sha")),
        );

        assert_eq!(
            cache_matcher.calls(),
            vec![(
                previous_metadata,
                String::from("cache_sha"),
                String::from("some-sha")
            )]
        );
    }

    #[test]
    fn reuses_a_layer_with_matching_sha() {
        let dirs = TestDirs::new();
        fs::write(
            dirs.layers.path().join("yarn.toml"),
            "launch = true\n\n[metadata]\nbuilt_at = \"2019-01-01T00:00:00Z\"\ncache_sha = \"some-sha\"\n",
        )
        .unwrap();
        fs::create_dir_all(dirs.yarn_layer_path().join("bin")).unwrap();
        fs::write(dirs.yarn_layer_path().join("bin").join("yarn"), "").unwrap();

        let dependency_service = FakeDependencyService::resolving(dependency());
        let mut log_emitter = emitter();

        let result = build(
            &dirs.context(),
            &dependency_service,
            &CacheHandler,
            &fixed_clock(),
            &mut log_emitter,
        )
        .unwrap();

        let layer = &result.layers[0];
        assert_eq!(
            layer.metadata.get("built_at"),
            Some(&toml::Value::String(String::from("2019-01-01T00:00:00Z")))
        );
        assert_eq!(
            layer.metadata.get("cache_sha"),
            Some(&toml::Value::String(String::from("some-sha")))
        );
        assert!(layer.shared_env.is_empty());
        assert!(layer.launch);
        assert_eq!(result.processes, vec![Process::new("web", "yarn start")]);
        assert!(dirs.yarn_layer_path().join("bin").join("yarn").exists());

        assert_eq!(dependency_service.resolve_calls().len(), 1);
        assert!(dependency_service.install_calls().is_empty());

        assert_eq!(
            output(log_emitter),
            format!(
                "Yarn Buildpack 1.2.3\n  Reusing cached layer {}\n\n",
                dirs.yarn_layer_path().display()
            )
        );
    }

    #[test]
    fn reinstalls_when_the_sha_changed() {
        let dirs = TestDirs::new();
        fs::write(
            dirs.layers.path().join("yarn.toml"),
            "launch = true\n\n[metadata]\nbuilt_at = \"2019-01-01T00:00:00Z\"\ncache_sha = \"previous-sha\"\nextra = \"stale\"\n",
        )
        .unwrap();
        fs::create_dir_all(dirs.yarn_layer_path()).unwrap();
        fs::write(dirs.yarn_layer_path().join("stale-file"), "").unwrap();

        let dependency_service = FakeDependencyService::resolving(dependency());

        let result = build(
            &dirs.context(),
            &dependency_service,
            &CacheHandler,
            &fixed_clock(),
            &mut emitter(),
        )
        .unwrap();

        assert!(!dirs.yarn_layer_path().join("stale-file").exists());
        assert!(dirs.yarn_layer_path().is_dir());
        assert_eq!(dependency_service.install_calls().len(), 1);

        let layer = &result.layers[0];
        assert_eq!(layer.metadata.len(), 2);
        assert_eq!(
            layer.metadata.get("cache_sha"),
            Some(&toml::Value::String(String::from("some-sha")))
        );
        assert_eq!(
            layer.metadata.get("built_at"),
            Some(&toml::Value::String(String::from(
                "2020-03-01T12:30:00.000000000Z"
            )))
        );
    }

    #[test]
    fn second_build_reuses_the_installed_layer() {
        let dirs = TestDirs::new();
        let dependency_service = FakeDependencyService::resolving(dependency());

        let first = build(
            &dirs.context(),
            &dependency_service,
            &CacheHandler,
            &fixed_clock(),
            &mut emitter(),
        )
        .unwrap();

        // Persist the layer the way the lifecycle restores it for the next build.
        fs::write(
            dirs.layers.path().join("yarn.toml"),
            toml::to_string(&cnb_lifecycle::data::layer_content_metadata::LayerContentMetadata {
                launch: true,
                build: false,
                cache: false,
                metadata: first.layers[0].metadata.clone(),
            })
            .unwrap(),
        )
        .unwrap();

        let second = build(
            &dirs.context(),
            &dependency_service,
            &CacheHandler,
            &fixed_clock(),
            &mut emitter(),
        )
        .unwrap();

        assert_eq!(dependency_service.install_calls().len(), 1);
        assert_eq!(second.layers[0].metadata, first.layers[0].metadata);
    }

    #[test]
    fn layer_metadata_errors_are_returned() {
        let dirs = TestDirs::new();
        fs::write(dirs.layers.path().join("yarn.toml"), "not = [valid").unwrap();

        let error = build(
            &dirs.context(),
            &FakeDependencyService::resolving(dependency()),
            &FakeCacheMatcher::returning(false),
            &fixed_clock(),
            &mut emitter(),
        )
        .unwrap_err();

        let message = error.to_string();
        assert!(message.contains("failed to parse layer content metadata:"));
        assert!(message.contains("yarn.toml"));
    }

    #[test]
    fn resolve_errors_are_returned_verbatim() {
        let dirs = TestDirs::new();
        let dependency_service = FakeDependencyService::failing_resolve(no_compatible_version());

        let error = build(
            &dirs.context(),
            &dependency_service,
            &FakeCacheMatcher::returning(false),
            &fixed_clock(),
            &mut emitter(),
        )
        .unwrap_err();

        assert_eq!(error.to_string(), no_compatible_version().to_string());
        assert!(dependency_service.install_calls().is_empty());
    }

    #[test]
    fn install_errors_are_returned_verbatim() {
        let dirs = TestDirs::new();
        let dependency_service =
            FakeDependencyService::resolving(dependency()).failing_install(checksum_mismatch());

        let error = build(
            &dirs.context(),
            &dependency_service,
            &FakeCacheMatcher::returning(false),
            &fixed_clock(),
            &mut emitter(),
        )
        .unwrap_err();

        assert_eq!(error.to_string(), checksum_mismatch().to_string());
    }

    #[test]
    fn reset_errors_are_returned() {
        let dirs = TestDirs::new();
        // A file in place of the layer directory cannot be removed as a directory.
        fs::write(dirs.yarn_layer_path(), "").unwrap();

        let dependency_service = FakeDependencyService::resolving(dependency());

        let error = build(
            &dirs.context(),
            &dependency_service,
            &FakeCacheMatcher::returning(false),
            &fixed_clock(),
            &mut emitter(),
        )
        .unwrap_err();

        assert!(matches!(error, YarnBuildpackError::Layer(_)));
        assert!(error.to_string().starts_with("failed to reset layer:"));
        assert!(dependency_service.install_calls().is_empty());
    }

    fn no_compatible_version() -> postal::Error {
        postal::Error::NoCompatibleVersion {
            id: String::from("yarn"),
            constraint: String::from("*"),
            stack: String::from("some-stack"),
            supported_versions: Vec::new(),
        }
    }

    fn checksum_mismatch() -> postal::Error {
        postal::Error::ChecksumMismatch {
            expected: String::from("some-sha"),
            actual: String::from("other-sha"),
        }
    }
}
